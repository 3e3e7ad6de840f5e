//! Land parcel: a shape plus membership flags

use serde::{Deserialize, Serialize};

use crate::geom::Polygon;

/// A polygonal parcel of land.
///
/// Identity is the [`PatchId`](crate::core::types::PatchId) the owning
/// [`Model`](super::Model) hands out; two patches with equal shapes are still
/// different patches. The shape is only rewritten through the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub(crate) shape: Polygon,
    pub within_city: bool,
    pub within_walls: bool,
}

impl Patch {
    pub fn new(shape: Polygon) -> Self {
        Self {
            shape,
            within_city: false,
            within_walls: false,
        }
    }

    pub fn shape(&self) -> &Polygon {
        &self.shape
    }
}
