use std::{
    io::Read,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{config::ApiConfig, endpoint};

#[derive(Debug, Error, Diagnostic)]
pub enum StorageError {
    #[error("an object already exists at `{path}`")]
    #[diagnostic(
        code(floorplan::storage::already_exists),
        help("objects are never overwritten, upload under a new identifier")
    )]
    AlreadyExists { path: String },

    #[error("no object at `{path}`")]
    #[diagnostic(code(floorplan::storage::not_found))]
    NotFound { path: String },

    #[error("object store refused `{path}` with status {status}: {body}")]
    #[diagnostic(code(floorplan::storage::rejected))]
    Rejected {
        path: String,
        status: u16,
        body: String,
    },

    #[error("object store unreachable while accessing `{path}`")]
    #[diagnostic(code(floorplan::storage::unreachable))]
    Unreachable {
        path: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("failed to read object `{path}`")]
    #[diagnostic(code(floorplan::storage::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("object store is unavailable: {reason}")]
    #[diagnostic(code(floorplan::storage::unavailable))]
    Unavailable { reason: String },

    #[error("invalid object store url")]
    #[diagnostic(code(floorplan::storage::url))]
    InvalidUrl(#[from] url::ParseError),
}

/// A content-addressed object store that refuses to replace existing objects.
pub trait ObjectStore: Send + Sync {
    /// Creates the object at `path`. Fails with [`StorageError::AlreadyExists`]
    /// when something is already stored there.
    fn put_new(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Publicly resolvable address of the object at `path`.
    fn public_url(&self, path: &str) -> Result<Url, StorageError>;

    fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn put_new(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        (**self).put_new(path, bytes, content_type)
    }
    fn public_url(&self, path: &str) -> Result<Url, StorageError> {
        (**self).public_url(path)
    }
    fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).get(path)
    }
}

/// Client of a Supabase compatible storage REST API.
pub struct HttpObjectStore {
    agent: ureq::Agent,
    storage_url: Url,
    bucket: String,
    api_key: Option<String>,
    cache_control_secs: u64,
}

impl HttpObjectStore {
    pub fn new(agent: ureq::Agent, storage_url: Url, bucket: impl Into<String>) -> Self {
        Self {
            agent,
            storage_url,
            bucket: bucket.into(),
            api_key: None,
            cache_control_secs: 3600,
        }
    }

    pub fn from_config(config: &ApiConfig, agent: ureq::Agent) -> Self {
        Self {
            api_key: config.api_key.clone(),
            cache_control_secs: config.cache_control_secs,
            ..Self::new(agent, config.storage_url.clone(), config.bucket.clone())
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn object_url(&self, path: &str) -> Result<Url, StorageError> {
        Ok(endpoint(
            &self.storage_url,
            &format!("object/{}/{}", self.bucket, path),
        )?)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.api_key {
            Some(key) => request
                .set("authorization", &format!("Bearer {key}"))
                .set("apikey", key),
            None => request,
        }
    }
}

/// The storage API answers a duplicate upload either with 409 or with a 400
/// whose body names the conflict.
fn is_duplicate(status: u16, body: &str) -> bool {
    status == 409 || (status == 400 && (body.contains("Duplicate") || body.contains("already exists")))
}

impl ObjectStore for HttpObjectStore {
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    fn put_new(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let url = self.object_url(path)?;
        let request = self
            .authorize(self.agent.post(url.as_str()))
            .set("content-type", content_type)
            .set("cache-control", &format!("max-age={}", self.cache_control_secs))
            .set("x-upsert", "false");
        match request.send_bytes(bytes) {
            Ok(response) => {
                info!(status = response.status(), "object stored");
                Ok(())
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                if is_duplicate(status, &body) {
                    warn!(status, "refusing to overwrite an existing object");
                    Err(StorageError::AlreadyExists {
                        path: path.to_string(),
                    })
                } else {
                    warn!(status, %body, "object store rejected the upload");
                    Err(StorageError::Rejected {
                        path: path.to_string(),
                        status,
                        body,
                    })
                }
            }
            Err(e) => Err(StorageError::Unreachable {
                path: path.to_string(),
                source: Box::new(e),
            }),
        }
    }

    fn public_url(&self, path: &str) -> Result<Url, StorageError> {
        Ok(endpoint(
            &self.storage_url,
            &format!("object/public/{}/{}", self.bucket, path),
        )?)
    }

    #[instrument(skip(self))]
    fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.object_url(path)?;
        match self.authorize(self.agent.get(url.as_str())).call() {
            Ok(response) => {
                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut bytes)
                    .map_err(|source| StorageError::Read {
                        path: path.to_string(),
                        source,
                    })?;
                debug!(bytes = bytes.len(), "object read");
                Ok(bytes)
            }
            Err(ureq::Error::Status(404, _)) => Err(StorageError::NotFound {
                path: path.to_string(),
            }),
            Err(ureq::Error::Status(status, response)) => Err(StorageError::Rejected {
                path: path.to_string(),
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(StorageError::Unreachable {
                path: path.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process object store with the same no-overwrite rule as the real one.
///
/// Used for dry runs and tests. Writes can be switched off to simulate an
/// unavailable store.
pub struct MemoryObjectStore {
    public_base: Url,
    objects: Mutex<IndexMap<String, StoredObject>>,
    reject_writes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(public_base: Url) -> Self {
        Self {
            public_base,
            objects: Mutex::new(IndexMap::new()),
            reject_writes: AtomicBool::new(false),
        }
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, IndexMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put_new(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "writes are disabled".to_string(),
            });
        }
        let mut objects = self.objects();
        if objects.contains_key(path) {
            return Err(StorageError::AlreadyExists {
                path: path.to_string(),
            });
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        debug!(path, bytes = bytes.len(), "object stored in memory");
        Ok(())
    }

    fn public_url(&self, path: &str) -> Result<Url, StorageError> {
        Ok(endpoint(&self.public_base, path)?)
    }

    fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.objects()
            .get(path)
            .map(|object| object.bytes.clone())
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }
}
