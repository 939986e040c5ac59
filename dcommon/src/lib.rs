//! Shared strongly-typed values for the daisy workspace crates.
//!
//! ```rust
//! use dcommon::{SessionId, UserId};
//!
//! let session = SessionId::from("session-1");
//! let user = UserId::new("user-42");
//!
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(user.to_string(), "user-42");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use dcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Conversation and caller identifier newtypes.
    //!
    //! ```rust
    //! use dcommon::SessionId;
    //!
    //! let first = SessionId::generate();
    //! let second = SessionId::generate();
    //!
    //! assert!(first.as_str().starts_with("session-"));
    //! assert_ne!(first, second);
    //! ```

    use std::fmt::{Display, Formatter};

    use uuid::Uuid;

    /// Opaque conversation identifier sent with every backend request.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        /// Creates a fresh, collision-resistant identifier.
        pub fn generate() -> Self {
            Self(format!("session-{}", Uuid::new_v4().simple()))
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct UserId(String);

    impl UserId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn anonymous() -> Self {
            Self("anonymous".to_string())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for UserId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for UserId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for UserId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub use context::{SessionId, UserId};
pub use future::BoxFuture;

#[cfg(test)]
mod tests {
    use super::{SessionId, UserId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("session-1");
        let user = UserId::from("user-1");

        assert_eq!(session.as_str(), "session-1");
        assert_eq!(user.as_str(), "user-1");
        assert_eq!(session.to_string(), "session-1");
        assert_eq!(user.to_string(), "user-1");
    }

    #[test]
    fn generated_session_ids_are_prefixed_and_distinct() {
        let ids = (0..32).map(|_| SessionId::generate()).collect::<Vec<_>>();

        for id in &ids {
            assert!(id.as_str().starts_with("session-"));
            assert!(id.as_str().len() > "session-".len());
        }

        let mut unique = ids.iter().map(SessionId::as_str).collect::<Vec<_>>();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn anonymous_user_has_stable_name() {
        assert_eq!(UserId::anonymous().as_str(), "anonymous");
    }
}
