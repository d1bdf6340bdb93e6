use std::sync::Arc;

use fp_models::{
    LocationRequest, LocationResponse, MappingDocument, StoredLocation, UploadResult,
    ValidationError,
};
use miette::Diagnostic;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::{
    id::{IdGenerator, RandomIds},
    registry::{LocationRegistry, TransportError},
    storage::{ObjectStore, StorageError},
};

pub const PACKAGE_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error, Diagnostic)]
pub enum UploadError {
    #[error(transparent)]
    #[diagnostic(code(floorplan::upload::validation))]
    Validation(#[from] ValidationError),

    #[error("a location needs a non empty name")]
    #[diagnostic(code(floorplan::upload::name))]
    EmptyLocationName,

    #[error("failed to serialize the location package")]
    #[diagnostic(code(floorplan::upload::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("storage step failed")]
    #[diagnostic(code(floorplan::upload::storage))]
    Storage(#[from] StorageError),

    #[error("registry step failed")]
    #[diagnostic(code(floorplan::upload::transport))]
    Transport(#[from] TransportError),

    #[error("registry rejected the location: {message}")]
    #[diagnostic(code(floorplan::upload::rejected))]
    Rejected { message: String },
}

/// Outcome of a full publish: where the package lives and what the registry said.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedLocation {
    pub upload: UploadResult,
    pub response: LocationResponse,
}

/// Packages named mappings, stores them and registers them.
///
/// The store write always happens before the registry call, and a failed
/// write means the registry is never contacted.
pub struct LocationUploader<S, R> {
    store: S,
    registry: R,
    ids: Arc<dyn IdGenerator>,
}

impl<S: ObjectStore, R: LocationRegistry> LocationUploader<S, R> {
    pub fn new(store: S, registry: R) -> Self {
        Self {
            store,
            registry,
            ids: Arc::new(RandomIds),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Writes the mapping under a fresh identifier and returns its public URL.
    #[instrument(skip(self, document), fields(entities = document.entities.len()))]
    pub fn upload(
        &self,
        location_name: &str,
        document: &MappingDocument,
    ) -> Result<UploadResult, UploadError> {
        let location_name = location_name.trim();
        if location_name.is_empty() {
            return Err(UploadError::EmptyLocationName);
        }
        document.validate()?;

        let uuid = self.ids.next_id();
        let _span = info_span!("location", %uuid).entered();
        let package = StoredLocation {
            uuid,
            location_name: location_name.to_string(),
            mapping_data: document.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        let bytes = serde_json::to_vec_pretty(&package)?;
        let path = StoredLocation::storage_path(&uuid);
        let public_url = self.store.public_url(&path)?;

        if let Err(e) = self.store.put_new(&path, &bytes, PACKAGE_CONTENT_TYPE) {
            error!(%path, error = %e, "failed to store location package");
            return Err(e.into());
        }
        info!(%path, %public_url, "location package stored");
        Ok(UploadResult {
            uuid,
            path,
            public_url,
        })
    }

    /// [`Self::upload`] followed by the registry `create` call.
    #[instrument(skip(self, document))]
    pub fn publish(
        &self,
        location_name: &str,
        document: &MappingDocument,
    ) -> Result<PublishedLocation, UploadError> {
        let upload = self.upload(location_name, document)?;
        let request = LocationRequest {
            uuid: upload.uuid,
            location_name: location_name.trim().to_string(),
            json_url: upload.public_url.clone(),
        };
        let response = self.registry.create(&request).map_err(|e| {
            // the stored package stays in place, its url is still valid
            error!(uuid = %upload.uuid, error = %e, "registry call failed after upload");
            UploadError::from(e)
        })?;
        if !response.success {
            warn!(uuid = %upload.uuid, message = %response.message, "registry rejected location");
            return Err(UploadError::Rejected {
                message: response.message,
            });
        }
        info!(uuid = %upload.uuid, "location published");
        Ok(PublishedLocation { upload, response })
    }

    /// Reads back a package previously written by [`Self::upload`].
    pub fn fetch_stored(&self, uuid: &Uuid) -> Result<StoredLocation, UploadError> {
        let bytes = self.store.get(&StoredLocation::storage_path(uuid))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
