use thiserror::Error;

use crate::core::types::PatchId;
use crate::geom::Point;

#[derive(Error, Debug)]
pub enum GeomError {
    /// The walled area cannot produce a fortification (no entrances, no gates).
    #[error("Bad walled area shape: {0}")]
    BadWallShape(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Point ({}, {}) is not a vertex of the polygon", .0.x, .0.y)]
    NotAVertex(Point),

    #[error("Patch not found: {0:?}")]
    UnknownPatch(PatchId),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl GeomError {
    /// True for failures the settlement generator answers by reseeding.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GeomError::BadWallShape(_) | GeomError::DegenerateGeometry(_))
    }
}

pub type Result<T> = std::result::Result<T, GeomError>;
