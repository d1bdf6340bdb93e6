//! Export and import of floor-plan mappings.
//!
//! Both formats carry the same [`MappingDocument`] schema. Every function here
//! is pure: documents are validated before they are written and after they are
//! read, and nothing touches the file system or the network.

mod error;
mod format;
pub(crate) mod io;

pub use error::CodecError;
pub use format::{ExportFormat, EXPORT_FILE_STEM};

use fp_models::MappingDocument;
use tracing::{info, instrument};

/// A serialized document ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Serializes a document, refusing to emit anything for an invalid one.
#[instrument(skip(document), fields(entities = document.entities.len()))]
pub fn to_string(document: &MappingDocument, format: ExportFormat) -> Result<String, CodecError> {
    document.validate()?;
    match format {
        ExportFormat::Json => io::mapping_to_json(document),
        ExportFormat::Xml => io::mapping_to_xml(document),
    }
}

/// Parses a document and checks it holds the same invariants as an exported one.
#[instrument(skip(content), fields(bytes = content.len()))]
pub fn from_str(content: &str, format: ExportFormat) -> Result<MappingDocument, CodecError> {
    let document = match format {
        ExportFormat::Json => io::mapping_from_json(content)?,
        ExportFormat::Xml => io::mapping_from_xml(content)?,
    };
    document.validate()?;
    Ok(document)
}

/// Serializes a document together with its canonical file name and MIME type.
pub fn export(document: &MappingDocument, format: ExportFormat) -> Result<ExportedFile, CodecError> {
    let content = to_string(document, format)?;
    let file = ExportedFile {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        content,
    };
    info!(file_name = %file.file_name, bytes = file.content.len(), "mapping exported");
    Ok(file)
}
