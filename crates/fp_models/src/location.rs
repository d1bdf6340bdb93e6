use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::document::MappingDocument;

/// Directory of the object store holding published mappings.
pub const LOCATIONS_DIRECTORY: &str = "locations";

/// Package written to the object store for every published location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLocation {
    pub uuid: Uuid,
    pub location_name: String,
    pub mapping_data: MappingDocument,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StoredLocation {
    /// Object path of the package, derived from its identifier only.
    pub fn storage_path(uuid: &Uuid) -> String {
        format!("{LOCATIONS_DIRECTORY}/{uuid}.json")
    }
}

/// Body of the registry `create` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub uuid: Uuid,
    pub location_name: String,
    pub json_url: Url,
}

/// A location as known by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub uuid: Uuid,
    #[serde(alias = "location_name")]
    pub location_name: String,
    #[serde(alias = "json_url")]
    pub json_url: Url,
    #[serde(
        default,
        alias = "created_at",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

/// Tagged result every registry endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl LocationResponse {
    /// Reads `data` as a single record, `None` when the server sent no data.
    pub fn record(&self) -> Result<Option<LocationRecord>, serde_json::Error> {
        match &self.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(data) => LocationRecord::deserialize(data).map(Some),
        }
    }

    /// Reads `data` as a list of records, empty when the server sent no data.
    pub fn records(&self) -> Result<Vec<LocationRecord>, serde_json::Error> {
        match &self.data {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(data) => Vec::<LocationRecord>::deserialize(data),
        }
    }
}

/// What the object store hands back after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub uuid: Uuid,
    pub path: String,
    pub public_url: Url,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn storage_path_is_derived_from_the_id() {
        let uuid = Uuid::from_u128(0xabc);
        assert_eq!(
            StoredLocation::storage_path(&uuid),
            "locations/00000000-0000-0000-0000-000000000abc.json"
        );
    }

    #[test]
    fn stored_location_wire_names() {
        let stored = StoredLocation {
            uuid: Uuid::from_u128(1),
            location_name: "campus".to_string(),
            mapping_data: MappingDocument::default(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            value,
            json!({
                "uuid": "00000000-0000-0000-0000-000000000001",
                "locationName": "campus",
                "mappingData": { "version": 1, "entities": [] },
                "createdAt": "1970-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn request_wire_names() {
        let request = LocationRequest {
            uuid: Uuid::from_u128(2),
            location_name: "warehouse".to_string(),
            json_url: Url::parse("https://cdn.example.com/locations/2.json").unwrap(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["locationName"], "warehouse");
        assert_eq!(value["jsonUrl"], "https://cdn.example.com/locations/2.json");
    }

    #[test]
    fn response_with_a_list() {
        let response: LocationResponse = serde_json::from_value(json!({
            "success": true,
            "message": "ok",
            "data": [
                {
                    "uuid": "00000000-0000-0000-0000-000000000001",
                    "locationName": "campus",
                    "jsonUrl": "https://cdn.example.com/a.json",
                    "createdAt": "2024-05-01T10:00:00Z"
                },
                {
                    "uuid": "00000000-0000-0000-0000-000000000002",
                    "location_name": "office",
                    "json_url": "https://cdn.example.com/b.json"
                }
            ]
        }))
        .unwrap();
        let records = response.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].location_name, "office");
        assert!(records[0].created_at.is_some());
        assert!(records[1].created_at.is_none());
    }

    #[test]
    fn response_without_data() {
        let response: LocationResponse =
            serde_json::from_str(r#"{"success": false, "message": "not found"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.record().unwrap(), None);
        assert!(response.records().unwrap().is_empty());
    }
}
