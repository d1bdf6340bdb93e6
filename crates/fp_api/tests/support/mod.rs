#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
};

use fp_api::{IdGenerator, LocationRegistry, MemoryObjectStore, ObjectStore, TransportError};
use fp_core::Vec2;
use fp_models::{
    Beacon, LocationRecord, LocationRequest, LocationResponse, MappingDocument, MappingEntity,
    StoredLocation,
};
use url::Url;
use uuid::Uuid;

pub fn public_base() -> Url {
    Url::parse("https://cdn.example.com/storage/v1/object/public/mappings").unwrap()
}

pub fn memory_store() -> Arc<MemoryObjectStore> {
    Arc::new(MemoryObjectStore::new(public_base()))
}

pub fn one_beacon() -> MappingDocument {
    MappingDocument::new(vec![MappingEntity::Beacon(Beacon {
        id: Uuid::from_u128(1),
        position: Vec2::new(10.0, 20.0),
        name: "wifi-1".to_string(),
        ssid: None,
        tx_power: None,
    })])
}

/// Hands out the same identifier on every call.
pub struct FixedIds(pub Uuid);

impl IdGenerator for FixedIds {
    fn next_id(&self) -> Uuid {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct CreateCall {
    pub request: LocationRequest,
    /// Whether the package was already readable from the store when the
    /// registry was called.
    pub object_present: bool,
}

/// Registry double that records every `create` and answers from memory.
pub struct RecordingRegistry {
    store: Option<Arc<MemoryObjectStore>>,
    accept: bool,
    calls: Mutex<Vec<CreateCall>>,
}

impl RecordingRegistry {
    pub fn accepting() -> Self {
        Self {
            store: None,
            accept: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }

    pub fn observing(mut self, store: Arc<MemoryObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn calls(&self) -> Vec<CreateCall> {
        self.calls.lock().unwrap().clone()
    }

    fn records(&self) -> Vec<LocationRecord> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| LocationRecord {
                uuid: call.request.uuid,
                location_name: call.request.location_name.clone(),
                json_url: call.request.json_url.clone(),
                created_at: None,
            })
            .collect()
    }
}

impl LocationRegistry for RecordingRegistry {
    fn create(&self, request: &LocationRequest) -> Result<LocationResponse, TransportError> {
        let object_present = self
            .store
            .as_ref()
            .map(|store| store.get(&StoredLocation::storage_path(&request.uuid)).is_ok())
            .unwrap_or(false);
        self.calls.lock().unwrap().push(CreateCall {
            request: request.clone(),
            object_present,
        });
        Ok(if self.accept {
            LocationResponse {
                success: true,
                message: "Location added".to_string(),
                data: Some(serde_json::to_value(request).unwrap()),
            }
        } else {
            LocationResponse {
                success: false,
                message: "location name already taken".to_string(),
                data: None,
            }
        })
    }

    fn get(&self, uuid: &Uuid) -> Result<LocationResponse, TransportError> {
        let record = self.records().into_iter().find(|r| &r.uuid == uuid);
        Ok(LocationResponse {
            success: record.is_some(),
            message: String::new(),
            data: record.map(|r| serde_json::to_value(r).unwrap()),
        })
    }

    fn list(&self) -> Result<LocationResponse, TransportError> {
        Ok(LocationResponse {
            success: true,
            message: String::new(),
            data: Some(serde_json::to_value(self.records()).unwrap()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A one-connection-per-response HTTP server on localhost.
///
/// Each accepted connection gets the next canned response, then is closed.
pub struct MockServer {
    pub base: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub fn start(prefix: &str, responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        thread::spawn(move || {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                handle(stream, status, &body, &recorded);
            }
        });
        Self {
            base: Url::parse(&format!("http://127.0.0.1:{port}{prefix}")).unwrap(),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(stream: TcpStream, status: u16, body: &str, recorded: &Mutex<Vec<RecordedRequest>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }
    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut request_body = vec![0; length];
    reader.read_exact(&mut request_body).unwrap();

    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body: request_body,
    });

    let mut stream = reader.into_inner();
    let response = format!(
        "HTTP/1.1 {status} Mock\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).unwrap();
    stream.flush().unwrap();
}
