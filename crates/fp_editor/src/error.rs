use fp_codec::CodecError;
use fp_models::EntityKind;
use miette::Diagnostic;
use thiserror::Error;

/// Input the editor refuses before touching its state.
#[derive(Debug, Error, Diagnostic)]
pub enum UserInputError {
    #[error("`{name}` ({mime_type}) is not an image")]
    #[diagnostic(
        code(floorplan::editor::unsupported_file),
        help("select a PNG, JPG, GIF or SVG file")
    )]
    UnsupportedFile { name: String, mime_type: String },

    #[error("`{name}` is empty")]
    #[diagnostic(code(floorplan::editor::empty_file))]
    EmptyFile { name: String },

    #[error("failed to load image `{name}`")]
    #[diagnostic(
        code(floorplan::editor::image),
        help("try a different file")
    )]
    UndecodableImage {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("click position is not a finite coordinate")]
    #[diagnostic(code(floorplan::editor::position))]
    NonFinitePosition,
}

#[derive(Debug, Error, Diagnostic)]
pub enum EditorError {
    #[error("no mapping data to export")]
    #[diagnostic(code(floorplan::editor::nothing_to_export))]
    NothingToExport,

    #[error("an export is already running")]
    #[diagnostic(code(floorplan::editor::export_running))]
    ExportInProgress,

    #[error("an upload is already running")]
    #[diagnostic(code(floorplan::editor::upload_running))]
    UploadInProgress,

    #[error("the upload worker has stopped")]
    #[diagnostic(code(floorplan::editor::worker))]
    WorkerStopped,

    #[error("{kind} needs at least {min} points, it has {found}")]
    #[diagnostic(code(floorplan::editor::incomplete_shape))]
    IncompleteShape {
        kind: EntityKind,
        min: usize,
        found: usize,
    },

    #[error("failed to export mapping data")]
    #[diagnostic(code(floorplan::editor::export))]
    Export(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Input(#[from] UserInputError),
}
