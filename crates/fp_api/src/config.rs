use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_STORAGE_URL: &str = "http://localhost:54321/storage/v1";
pub const DEFAULT_BUCKET: &str = "mappings";

/// Where the registry API and the object store live, and how to talk to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_base_url: Url,
    pub storage_url: Url,
    pub bucket: String,
    /// Sent as bearer token and `apikey` header when present.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub cache_control_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default api url is valid"),
            storage_url: Url::parse(DEFAULT_STORAGE_URL).expect("default storage url is valid"),
            bucket: DEFAULT_BUCKET.to_string(),
            api_key: None,
            timeout_secs: 30,
            cache_control_secs: 3600,
        }
    }
}

impl ApiConfig {
    /// HTTP agent shared by both clients. The timeout applies to whole requests.
    pub fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }

    /// Prefix of every public object URL of the bucket.
    pub fn public_objects_url(&self) -> Result<Url, url::ParseError> {
        crate::endpoint(&self.storage_url, &format!("object/public/{}", self.bucket))
    }
}
