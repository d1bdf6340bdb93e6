//! Serializing and deserializing mapping documents.
//!

mod deserialize;
mod json;
mod names;
mod serialize;

pub(crate) use deserialize::mapping_from_xml;
pub(crate) use json::{mapping_from_json, mapping_to_json};
pub(crate) use serialize::mapping_to_xml;
