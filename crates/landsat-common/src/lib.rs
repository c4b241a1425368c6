//! Common types shared across the landsat-tools workspace.

pub mod bbox;
pub mod crs;
pub mod scene;

pub use bbox::BoundingBox;
pub use crs::SrsCode;
pub use scene::{SceneId, SceneIdParseError, Sensor};
