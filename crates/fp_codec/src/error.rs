use fp_models::ValidationError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed JSON mapping document")]
    #[diagnostic(code(floorplan::codec::json))]
    Json(#[from] serde_json::Error),

    #[error("malformed XML mapping document: {0}")]
    #[diagnostic(code(floorplan::codec::xml))]
    Xml(String),

    #[error("XML mapping document does not follow the schema: {0}")]
    #[diagnostic(
        code(floorplan::codec::schema),
        help("the root element must be <FloorPlanMapping version=\"1\">")
    )]
    Schema(String),
}

impl CodecError {
    pub(crate) fn xml(e: xot::Error) -> Self {
        CodecError::Xml(format!("{e:?}"))
    }
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        CodecError::Schema(message.into())
    }
}
