mod support;

use std::net::TcpListener;

use fp_api::{
    ApiConfig, HttpLocationRegistry, HttpObjectStore, LocationRegistry, LocationUploader,
    ObjectStore, StorageError, TransportError, UploadError,
};
use fp_models::LocationRequest;
use rstest::rstest;
use serde_json::json;
use support::{one_beacon, MockServer};
use url::Url;
use uuid::Uuid;

fn config(api: &MockServer, storage: Option<&MockServer>) -> ApiConfig {
    ApiConfig {
        api_base_url: api.base.clone(),
        storage_url: storage
            .map(|s| s.base.clone())
            .unwrap_or_else(|| api.base.clone()),
        api_key: Some("secret-key".to_string()),
        timeout_secs: 5,
        ..ApiConfig::default()
    }
}

fn registry_for(server: &MockServer) -> HttpLocationRegistry {
    let config = config(server, None);
    HttpLocationRegistry::from_config(&config, config.agent())
}

fn store_for(server: &MockServer) -> HttpObjectStore {
    let config = config(server, Some(server));
    HttpObjectStore::from_config(&config, config.agent())
}

fn record_json(uuid: u128, name: &str) -> serde_json::Value {
    json!({
        "uuid": Uuid::from_u128(uuid),
        "locationName": name,
        "jsonUrl": format!("https://cdn.example.com/locations/{}.json", Uuid::from_u128(uuid)),
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

#[test]
fn create_posts_the_location() {
    let answer = json!({ "success": true, "message": "Location added", "data": record_json(3, "Lab") });
    let server = MockServer::start("/api", vec![(201, answer.to_string())]);
    let request = LocationRequest {
        uuid: Uuid::from_u128(3),
        location_name: "Lab".to_string(),
        json_url: Url::parse("https://cdn.example.com/locations/3.json").unwrap(),
    };

    let response = registry_for(&server).create(&request).unwrap();

    assert!(response.success);
    assert_eq!(response.record().unwrap().unwrap().location_name, "Lab");
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/add-location");
    assert_eq!(requests[0].header("authorization"), Some("Bearer secret-key"));
    assert_eq!(
        requests[0].json(),
        json!({
            "uuid": "00000000-0000-0000-0000-000000000003",
            "locationName": "Lab",
            "jsonUrl": "https://cdn.example.com/locations/3.json"
        })
    );
}

#[test]
fn get_reads_one_location_and_is_idempotent() {
    let answer = json!({ "success": true, "message": "", "data": record_json(5, "Depot") }).to_string();
    let server = MockServer::start("/api", vec![(200, answer.clone()), (200, answer)]);
    let registry = registry_for(&server);
    let uuid = Uuid::from_u128(5);

    let first = registry.get(&uuid).unwrap();
    let second = registry.get(&uuid).unwrap();

    assert_eq!(first, second);
    let record = first.record().unwrap().unwrap();
    assert_eq!(record.uuid, uuid);
    assert!(record.created_at.is_some());
    let requests = server.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, format!("/api/location/{uuid}"));
}

#[test]
fn list_reads_every_location() {
    let answer = json!({
        "success": true,
        "message": "",
        "data": [record_json(1, "Lab"), record_json(2, "Depot")]
    });
    let server = MockServer::start("/api", vec![(200, answer.to_string())]);

    let records = registry_for(&server).list().unwrap().records().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].location_name, "Depot");
    assert_eq!(server.requests()[0].path, "/api/locations");
}

#[rstest]
#[case(404)]
#[case(500)]
fn error_status_is_a_transport_error(#[case] status: u16) {
    let server = MockServer::start(
        "/api",
        vec![(status, r#"{"success":false,"message":"boom"}"#.to_string())],
    );
    match registry_for(&server).list() {
        Err(TransportError::Status { status: got, body, .. }) => {
            assert_eq!(got, status);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn malformed_body_is_a_transport_error() {
    let server = MockServer::start("/api", vec![(200, "<html>oops</html>".to_string())]);
    assert!(matches!(
        registry_for(&server).list(),
        Err(TransportError::MalformedBody { .. })
    ));
}

#[test]
fn unreachable_registry_is_a_transport_error() {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let registry = HttpLocationRegistry::new(
        ureq::agent(),
        Url::parse(&format!("http://127.0.0.1:{port}/api")).unwrap(),
    );
    assert!(matches!(
        registry.list(),
        Err(TransportError::Request { .. })
    ));
}

#[test]
fn storage_write_sends_the_expected_headers() {
    let server = MockServer::start(
        "/storage/v1",
        vec![(200, r#"{"Key":"mappings/locations/a.json"}"#.to_string())],
    );

    store_for(&server)
        .put_new("locations/a.json", br#"{"uuid":"a"}"#, "application/json")
        .unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/storage/v1/object/mappings/locations/a.json");
    assert_eq!(request.header("x-upsert"), Some("false"));
    assert_eq!(request.header("cache-control"), Some("max-age=3600"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("authorization"), Some("Bearer secret-key"));
    assert_eq!(request.header("apikey"), Some("secret-key"));
    assert_eq!(request.body, br#"{"uuid":"a"}"#.to_vec());
}

#[rstest]
#[case::conflict(409, r#"{"error":"conflict"}"#)]
#[case::duplicate(400, r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#)]
fn storage_conflict_is_already_exists(#[case] status: u16, #[case] body: &str) {
    let server = MockServer::start("/storage/v1", vec![(status, body.to_string())]);
    assert!(matches!(
        store_for(&server).put_new("locations/a.json", b"{}", "application/json"),
        Err(StorageError::AlreadyExists { .. })
    ));
}

#[test]
fn storage_refusal_is_rejected() {
    let server = MockServer::start(
        "/storage/v1",
        vec![(403, r#"{"error":"Unauthorized"}"#.to_string())],
    );
    assert!(matches!(
        store_for(&server).put_new("locations/a.json", b"{}", "application/json"),
        Err(StorageError::Rejected { status: 403, .. })
    ));
}

#[test]
fn storage_read_of_a_missing_object() {
    let server = MockServer::start("/storage/v1", vec![(404, "{}".to_string())]);
    assert!(matches!(
        store_for(&server).get("locations/missing.json"),
        Err(StorageError::NotFound { .. })
    ));
}

#[test]
fn publish_over_http() {
    let storage = MockServer::start("/storage/v1", vec![(200, "{}".to_string())]);
    let api = MockServer::start(
        "/api",
        vec![(201, json!({ "success": true, "message": "Location added" }).to_string())],
    );
    let config = config(&api, Some(&storage));
    let uploader = LocationUploader::new(
        HttpObjectStore::from_config(&config, config.agent()),
        HttpLocationRegistry::from_config(&config, config.agent()),
    );

    let published = uploader.publish("Lab", &one_beacon()).unwrap();

    let stored = &storage.requests()[0];
    assert_eq!(
        stored.path,
        format!("/storage/v1/object/mappings/locations/{}.json", published.upload.uuid)
    );
    assert_eq!(stored.json()["locationName"], "Lab");
    let registered = api.requests()[0].json();
    assert_eq!(registered["uuid"], published.upload.uuid.to_string());
    assert_eq!(
        registered["jsonUrl"],
        format!(
            "{}/object/public/mappings/locations/{}.json",
            storage.base, published.upload.uuid
        )
    );
}

#[test]
fn failed_storage_write_skips_the_registry() {
    let storage = MockServer::start("/storage/v1", vec![(500, "{}".to_string())]);
    let api = MockServer::start("/api", vec![]);
    let config = config(&api, Some(&storage));
    let uploader = LocationUploader::new(
        HttpObjectStore::from_config(&config, config.agent()),
        HttpLocationRegistry::from_config(&config, config.agent()),
    );

    let err = uploader.publish("Lab", &one_beacon()).unwrap_err();

    assert!(matches!(
        err,
        UploadError::Storage(StorageError::Rejected { status: 500, .. })
    ));
    assert!(api.requests().is_empty());
}
