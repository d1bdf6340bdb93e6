//! Clients for the services a floor-plan mapping is published to, and the
//! pipeline tying them together.
//!
//! 1. [`storage`] writes the mapping package to an object store, never overwriting.
//! 2. [`registry`] registers the resulting location with the HTTP API.
//! 3. [`pipeline`] runs both in order for one named mapping.
//!
//! All calls are blocking. Callers that must stay responsive run them on a
//! background worker.

pub mod config;
pub mod id;
pub mod pipeline;
pub mod registry;
pub mod storage;

pub use config::ApiConfig;
pub use id::{IdGenerator, RandomIds};
pub use pipeline::{LocationUploader, PublishedLocation, UploadError};
pub use registry::{HttpLocationRegistry, LocationRegistry, TransportError};
pub use storage::{HttpObjectStore, MemoryObjectStore, ObjectStore, StorageError, StoredObject};

/// Appends `path` to `base`, keeping whatever path `base` already has.
pub(crate) fn endpoint(base: &url::Url, path: &str) -> Result<url::Url, url::ParseError> {
    url::Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod test {
    use super::endpoint;
    use rstest::rstest;
    use url::Url;

    #[rstest]
    #[case("https://api.example.com", "/locations", "https://api.example.com/locations")]
    #[case("https://api.example.com/v1/", "locations", "https://api.example.com/v1/locations")]
    #[case(
        "http://localhost:54321/storage/v1",
        "object/mappings/locations/a.json",
        "http://localhost:54321/storage/v1/object/mappings/locations/a.json"
    )]
    fn joins_paths(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let base = Url::parse(base).unwrap();
        assert_eq!(endpoint(&base, path).unwrap().as_str(), expected);
    }
}
