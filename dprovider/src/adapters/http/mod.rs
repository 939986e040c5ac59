mod auth;
mod serde_api;
mod tests;
mod transport;

pub use auth::{CLOUD_PLATFORM_SCOPE, GcpServiceTokenExchange};
pub use transport::HttpBackendTransport;
