use miette::Diagnostic;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::EntityKind;

/// The mapping state cannot be turned into a document.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("{kind} {id} has a coordinate that is not a finite number")]
    #[diagnostic(code(floorplan::validation::non_finite_coordinate))]
    NonFiniteCoordinate { kind: EntityKind, id: Uuid },

    #[error("entity id {0} is used more than once")]
    #[diagnostic(code(floorplan::validation::duplicate_id))]
    DuplicateId(Uuid),

    #[error("{kind} {id} needs at least {min} points, it has {found}")]
    #[diagnostic(code(floorplan::validation::degenerate_shape))]
    DegenerateShape {
        kind: EntityKind,
        id: Uuid,
        min: usize,
        found: usize,
    },

    #[error("{kind} {id} has a `{field}` with a character that cannot be exported")]
    #[diagnostic(
        code(floorplan::validation::invalid_text),
        help("control characters other than tab, line feed and carriage return are not allowed")
    )]
    InvalidText {
        kind: EntityKind,
        id: Uuid,
        field: &'static str,
    },

    #[error("the background source has a character that cannot be exported")]
    #[diagnostic(code(floorplan::validation::invalid_text))]
    InvalidBackgroundSource,

    #[error("mapping format version {found} is not supported, expected {expected}")]
    #[diagnostic(
        code(floorplan::validation::unsupported_version),
        help("export the mapping again with this version of the editor")
    )]
    UnsupportedVersion { found: u32, expected: u32 },
}
