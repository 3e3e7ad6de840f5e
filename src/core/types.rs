//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable handle to a patch stored in a [`Model`](crate::building::Model).
///
/// Handles stay valid after the patch is replaced in the registry; the old
/// patch simply stops being live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchId(pub u32);

impl PatchId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}
