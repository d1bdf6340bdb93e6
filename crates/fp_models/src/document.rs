use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{entity::MappingEntity, error::ValidationError};

/// Version written into every exported document.
pub const FORMAT_VERSION: u32 = 1;

/// Whether `c` is allowed in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_exportable_text(text: &str) -> bool {
    text.chars().all(is_xml_char)
}

/// Floor-plan image the entities are drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    /// URL or `data:` URL of the image.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// The exportable unit: every entity of one floor plus its background.
///
/// Built from the live editor state at export/upload time, never kept around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundImage>,
    #[serde(default)]
    pub entities: Vec<MappingEntity>,
}

impl Default for MappingDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            background: None,
            entities: Vec::new(),
        }
    }
}

impl MappingDocument {
    pub fn new(entities: Vec<MappingEntity>) -> Self {
        Self {
            entities,
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: BackgroundImage) -> Self {
        self.background = Some(background);
        self
    }

    pub fn has_mapping_data(&self) -> bool {
        !self.entities.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&MappingEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Checks the invariants every serialized document must hold.
    ///
    /// 1. the version is the one this crate writes
    /// 2. entity ids are unique
    /// 3. every coordinate is finite
    /// 4. paths and polygons have enough points to be drawn
    /// 5. every string only holds characters both formats can carry
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version != FORMAT_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.version,
                expected: FORMAT_VERSION,
            });
        }
        if let Some(background) = &self.background {
            if !is_exportable_text(&background.source) {
                return Err(ValidationError::InvalidBackgroundSource);
            }
        }
        let mut seen = HashSet::with_capacity(self.entities.len());
        for entity in &self.entities {
            let id = entity.id();
            if !seen.insert(id) {
                return Err(ValidationError::DuplicateId(id));
            }
            let points = entity.points();
            if points.iter().any(|p| !p.is_finite()) {
                return Err(ValidationError::NonFiniteCoordinate {
                    kind: entity.kind(),
                    id,
                });
            }
            if let Some((field, _)) = entity
                .texts()
                .into_iter()
                .find(|(_, text)| !is_exportable_text(text))
            {
                return Err(ValidationError::InvalidText {
                    kind: entity.kind(),
                    id,
                    field,
                });
            }
            if let Some(min) = entity.min_points() {
                if points.len() < min {
                    return Err(ValidationError::DegenerateShape {
                        kind: entity.kind(),
                        id,
                        min,
                        found: points.len(),
                    });
                }
            }
        }
        debug!(entities = self.entities.len(), "mapping document is valid");
        Ok(())
    }
}
