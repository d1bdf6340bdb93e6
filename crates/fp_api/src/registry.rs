use std::sync::Arc;

use fp_models::{LocationRequest, LocationResponse};
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::{config::ApiConfig, endpoint};

#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    #[error("request to `{url}` failed")]
    #[diagnostic(
        code(floorplan::registry::request),
        help("check that the registry API is running and reachable")
    )]
    Request {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("registry answered `{url}` with status {status}: {body}")]
    #[diagnostic(code(floorplan::registry::status))]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("registry sent a malformed body for `{url}`")]
    #[diagnostic(code(floorplan::registry::body))]
    MalformedBody {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry url")]
    #[diagnostic(code(floorplan::registry::url))]
    InvalidUrl(#[from] url::ParseError),
}

/// The location registry API.
///
/// Every call is a single request. Nothing is retried or cached.
pub trait LocationRegistry: Send + Sync {
    fn create(&self, request: &LocationRequest) -> Result<LocationResponse, TransportError>;
    fn get(&self, uuid: &Uuid) -> Result<LocationResponse, TransportError>;
    fn list(&self) -> Result<LocationResponse, TransportError>;
}

impl<T: LocationRegistry + ?Sized> LocationRegistry for Arc<T> {
    fn create(&self, request: &LocationRequest) -> Result<LocationResponse, TransportError> {
        (**self).create(request)
    }
    fn get(&self, uuid: &Uuid) -> Result<LocationResponse, TransportError> {
        (**self).get(uuid)
    }
    fn list(&self) -> Result<LocationResponse, TransportError> {
        (**self).list()
    }
}

pub struct HttpLocationRegistry {
    agent: ureq::Agent,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpLocationRegistry {
    pub fn new(agent: ureq::Agent, base_url: Url) -> Self {
        Self {
            agent,
            base_url,
            api_key: None,
        }
    }

    pub fn from_config(config: &ApiConfig, agent: ureq::Agent) -> Self {
        Self {
            api_key: config.api_key.clone(),
            ..Self::new(agent, config.api_base_url.clone())
        }
    }

    fn request(&self, method: &str, path: &str) -> Result<(String, ureq::Request), TransportError> {
        let url = endpoint(&self.base_url, path)?.to_string();
        let mut request = self
            .agent
            .request(method, &url)
            .set("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.set("authorization", &format!("Bearer {key}"));
        }
        Ok((url, request))
    }
}

/// Turns the outcome of a request into a decoded registry response.
fn read_response(
    url: String,
    outcome: Result<ureq::Response, ureq::Error>,
) -> Result<LocationResponse, TransportError> {
    match outcome {
        Ok(response) => {
            debug!(status = response.status(), %url, "registry answered");
            response
                .into_json::<LocationResponse>()
                .map_err(|source| TransportError::MalformedBody { url, source })
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            warn!(status, %url, %body, "registry returned an error status");
            Err(TransportError::Status { url, status, body })
        }
        Err(e) => {
            warn!(%url, error = %e, "registry unreachable");
            Err(TransportError::Request {
                url,
                source: Box::new(e),
            })
        }
    }
}

impl LocationRegistry for HttpLocationRegistry {
    #[instrument(skip(self, request), fields(uuid = %request.uuid))]
    fn create(&self, request: &LocationRequest) -> Result<LocationResponse, TransportError> {
        let (url, call) = self.request("POST", "add-location")?;
        let response = read_response(url, call.send_json(request))?;
        info!(success = response.success, message = %response.message, "location registered");
        Ok(response)
    }

    #[instrument(skip(self))]
    fn get(&self, uuid: &Uuid) -> Result<LocationResponse, TransportError> {
        let (url, call) = self.request("GET", &format!("location/{uuid}"))?;
        read_response(url, call.call())
    }

    #[instrument(skip(self))]
    fn list(&self) -> Result<LocationResponse, TransportError> {
        let (url, call) = self.request("GET", "locations")?;
        read_response(url, call.call())
    }
}
