use base64::Engine;
use fp_models::BackgroundImage;
use tracing::{debug, warn};

use crate::error::UserInputError;

pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    base64::engine::GeneralPurposeConfig::new(),
);

const SVG_MIME_TYPE: &str = "image/svg+xml";

/// A file picked by the user as floor-plan background.
#[derive(Debug, Clone)]
pub struct BackgroundFile {
    pub name: String,
    /// As reported by the picker, may be empty.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl BackgroundFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_svg(&self) -> bool {
        self.mime_type == SVG_MIME_TYPE || self.name.to_ascii_lowercase().ends_with(".svg")
    }

    /// `image/*` files and anything named `*.svg`.
    pub fn is_supported(&self) -> bool {
        self.mime_type.starts_with("image/") || self.is_svg()
    }
}

/// Turns a picked file into an embeddable background.
///
/// Raster images are decoded to learn their size. SVG files are embedded as is,
/// their size is left to the renderer.
pub fn load_background(file: &BackgroundFile) -> Result<BackgroundImage, UserInputError> {
    if !file.is_supported() {
        warn!(name = %file.name, mime_type = %file.mime_type, "refusing non image background");
        return Err(UserInputError::UnsupportedFile {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }
    if file.bytes.is_empty() {
        return Err(UserInputError::EmptyFile {
            name: file.name.clone(),
        });
    }

    let (mime_type, width, height) = if file.is_svg() {
        (SVG_MIME_TYPE, None, None)
    } else {
        let img = image::load_from_memory(&file.bytes).map_err(|source| {
            UserInputError::UndecodableImage {
                name: file.name.clone(),
                source,
            }
        })?;
        (file.mime_type.as_str(), Some(img.width()), Some(img.height()))
    };
    debug!(name = %file.name, ?width, ?height, "background loaded");
    Ok(BackgroundImage {
        source: data_url(mime_type, &file.bytes),
        width,
        height,
    })
}

pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", BASE64_ENGINE.encode(bytes))
}
