use fp_models::MappingDocument;

use crate::CodecError;

pub(crate) fn mapping_to_json(document: &MappingDocument) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub(crate) fn mapping_from_json(content: &str) -> Result<MappingDocument, CodecError> {
    Ok(serde_json::from_str(content)?)
}
