//! Agent engine resource naming and endpoint construction.
//!
//! ```rust
//! use dprovider::AgentEngineResource;
//!
//! let resource = AgentEngineResource::new("music-staging", "us-central1", "8470637580386304");
//! assert_eq!(
//!     resource.stream_query_url(None),
//!     "https://us-central1-aiplatform.googleapis.com/v1beta1/projects/music-staging/locations/us-central1/reasoningEngines/8470637580386304:streamQuery"
//! );
//! ```

use crate::ProviderError;

pub const DEFAULT_LOCATION: &str = "us-central1";

pub fn default_api_base(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEngineResource {
    pub project_id: String,
    pub location: String,
    pub engine_id: String,
}

impl AgentEngineResource {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            engine_id: engine_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        for (field, value) in [
            ("project_id", &self.project_id),
            ("location", &self.location),
            ("engine_id", &self.engine_id),
        ] {
            if value.trim().is_empty() {
                return Err(ProviderError::invalid_request(format!(
                    "agent engine {field} must not be empty"
                )));
            }

            if value.contains('/') {
                return Err(ProviderError::invalid_request(format!(
                    "agent engine {field} must not contain '/'"
                )));
            }
        }

        Ok(())
    }

    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/reasoningEngines/{}",
            self.project_id, self.location, self.engine_id
        )
    }

    /// Streaming query URL under `api_base`, or the regional default.
    pub fn stream_query_url(&self, api_base: Option<&str>) -> String {
        let base = api_base
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_api_base(&self.location));

        format!("{base}/v1beta1/{}:streamQuery", self.resource_name())
    }
}
