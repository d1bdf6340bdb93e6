//! Shared building blocks of the floor-plan toolkit.
//!
//! `serde_glam` carries the serde representation of floor-plan positions,
//! `task` the background worker used to keep blocking network calls off the
//! caller's thread.

pub mod serde_glam;
pub mod task;

pub use serde_glam::Vec2;
