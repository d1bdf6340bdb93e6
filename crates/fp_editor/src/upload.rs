use std::sync::mpsc::TryRecvError;

use fp_api::{LocationRegistry, LocationUploader, ObjectStore, PublishedLocation, UploadError};
use fp_core::task::AsyncTaskGuard;
use fp_models::MappingDocument;
use tracing::{error, info, info_span};

use crate::error::EditorError;

pub struct UploadRequest {
    pub location_name: String,
    pub document: MappingDocument,
}

pub type UploadOutcome = Result<PublishedLocation, UploadError>;

/// Runs publishes on a background worker, one at a time.
///
/// The toolbar polls [`UploadQueue::is_uploading`] to disable the upload
/// trigger and [`UploadQueue::try_result`] to pick up the outcome.
pub struct UploadQueue {
    worker: AsyncTaskGuard<UploadRequest, UploadOutcome>,
}

impl UploadQueue {
    pub fn new<S, R>(uploader: LocationUploader<S, R>) -> Self
    where
        S: ObjectStore + 'static,
        R: LocationRegistry + 'static,
    {
        let worker = AsyncTaskGuard::new(move |request: UploadRequest| {
            let _span = info_span!("upload", location = %request.location_name).entered();
            let outcome = uploader.publish(&request.location_name, &request.document);
            match &outcome {
                Ok(published) => info!(uuid = %published.upload.uuid, "upload finished"),
                Err(e) => error!(error = %e, "upload failed"),
            }
            outcome
        });
        Self { worker }
    }

    pub fn is_uploading(&self) -> bool {
        self.worker.is_running()
    }

    /// Queues a publish. Refused while another one is in flight.
    pub fn enqueue(
        &self,
        location_name: &str,
        document: MappingDocument,
    ) -> Result<(), EditorError> {
        if self.is_uploading() {
            return Err(EditorError::UploadInProgress);
        }
        self.worker
            .send(UploadRequest {
                location_name: location_name.to_string(),
                document,
            })
            .map_err(|_| EditorError::WorkerStopped)
    }

    /// Outcome of a finished upload, if one is waiting.
    pub fn try_result(&self) -> Option<UploadOutcome> {
        match self.worker.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("upload worker is gone");
                None
            }
        }
    }

    /// Blocks until the next upload finishes.
    pub fn wait_result(&self) -> Result<UploadOutcome, EditorError> {
        self.worker.recv().map_err(|_| EditorError::WorkerStopped)
    }
}
