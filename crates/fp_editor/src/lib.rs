//! State behind the floor-plan editor toolbar.
//!
//! [`NavigationStore`] owns the mapping being edited. Toolbar buttons become
//! [`ToolbarAction`]s, canvas clicks go through [`NavigationStore::click`].
//! Exports are synchronous, uploads run on the [`UploadQueue`] worker.

mod background;
mod error;
mod store;
mod tool;
mod upload;

pub use background::{data_url, load_background, BackgroundFile};
pub use error::{EditorError, UserInputError};
pub use store::{
    ClickOutcome, NavigationStore, COPY_OFFSET, DEFAULT_FLOOR, DEFAULT_LOCATION, PICK_RADIUS,
};
pub use tool::{Tool, ToolbarAction, EXPORT_FORMATS};
pub use upload::{UploadOutcome, UploadQueue, UploadRequest};
