//! Data model of a floor-plan mapping and of the locations it is published to.

pub mod document;
pub mod entity;
pub mod error;
pub mod location;

pub use document::{is_xml_char, BackgroundImage, MappingDocument, FORMAT_VERSION};
pub use entity::{
    Beacon, EntityKind, MappingEntity, Marker, MarkerKind, Measurement, NavPath, Polygon, Venue,
};
pub use error::ValidationError;
pub use fp_core::Vec2;
pub use location::{
    LocationRecord, LocationRequest, LocationResponse, StoredLocation, UploadResult,
};
