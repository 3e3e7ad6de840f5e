//! Geometry configuration with documented constants
//!
//! All magic numbers of the wall and subdivision passes are collected here
//! with explanations of their purpose and how they interact with each other.
//! Every section can be loaded from TOML; missing keys fall back to defaults.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::error::{GeomError, Result};

/// Configuration for curtain wall construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Numerator of the circumference smoothing factor
    ///
    /// Each non-reserved wall vertex is smoothed with
    /// `min(1, smoothing_divisor / patch_count)`. With the default of 40,
    /// any wall built from 40 patches or fewer is fully smoothed; larger
    /// cities keep more of their polygonal outline.
    pub smoothing_divisor: f64,

    /// Gate selection continues while at least this many entrances remain
    ///
    /// Each pick removes the chosen entrance and its two neighbours, so 3 is
    /// the smallest value that still guarantees gate spacing.
    pub min_entrances: usize,

    /// Minimum vertex count of an outer patch before it is carved into a bastion
    ///
    /// Triangles cannot be split into two valid polygons through a vertex.
    pub min_bastion_vertices: usize,

    /// Honour the `real` constructor argument instead of forcing it on
    ///
    /// Off by default: walls always smooth, carve bastions and place towers,
    /// regardless of what the caller passed.
    pub honor_real_flag: bool,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            smoothing_divisor: 40.0,
            min_entrances: 3,
            min_bastion_vertices: 4,
            honor_real_flag: false,
        }
    }
}

impl WallConfig {
    /// Check the wall tunables on their own, for callers that bypass
    /// [`GeomConfig::validate`]
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.smoothing_divisor <= 0.0 {
            return Err(format!(
                "wall.smoothing_divisor ({}) must be positive",
                self.smoothing_divisor
            ));
        }

        // Fewer than 3 would let two gates land on neighbouring entrances
        if self.min_entrances < 3 {
            return Err(format!(
                "wall.min_entrances ({}) must be at least 3",
                self.min_entrances
            ));
        }

        if self.min_bastion_vertices < 4 {
            return Err(format!(
                "wall.min_bastion_vertices ({}) must be at least 4",
                self.min_bastion_vertices
            ));
        }

        Ok(())
    }

    /// Smoothing factor for a wall built from `patch_count` patches
    pub fn smoothing_factor(&self, patch_count: usize) -> f64 {
        if patch_count == 0 {
            return 1.0;
        }
        (self.smoothing_divisor / patch_count as f64).min(1.0)
    }
}

/// Street widths used when insetting city blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetConfig {
    /// Width of streets running along the wall and the plaza
    pub main_street: f64,
    /// Width of streets between inner patches
    pub regular_street: f64,
    /// Width of alleys between lots and around outer patches
    pub alley: f64,
}

impl Default for StreetConfig {
    fn default() -> Self {
        Self {
            main_street: 2.0,
            regular_street: 1.0,
            alley: 0.6,
        }
    }
}

/// Parameters for recursive lot subdivision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    /// Lots smaller than this area are not split further
    pub min_area: f64,
    /// 0 = perfectly regular grid, 1 = cut ratio and angle vary freely
    pub grid_chaos: f64,
    /// Spread of the per-lot size threshold (exponent scale)
    pub size_chaos: f64,
    /// Probability that a finished lot is left empty
    pub empty_prob: f64,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            min_area: 40.0,
            grid_chaos: 0.4,
            size_chaos: 0.6,
            empty_prob: 0.04,
        }
    }
}

/// Top-level configuration, one section per pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeomConfig {
    pub wall: WallConfig,
    pub streets: StreetConfig,
    pub lots: LotConfig,
}

impl GeomConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GeomConfig = toml::from_str(content)?;
        config.validate().map_err(GeomError::Config)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.wall.validate()?;

        let s = &self.streets;
        if s.main_street < 0.0 || s.regular_street < 0.0 || s.alley < 0.0 {
            return Err("Street widths must not be negative".into());
        }

        if self.lots.min_area <= 0.0 {
            return Err("lots.min_area must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.lots.empty_prob) {
            return Err(format!(
                "lots.empty_prob ({}) must be within [0, 1]",
                self.lots.empty_prob
            ));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

static CONFIG: OnceLock<GeomConfig> = OnceLock::new();

/// Get the global geometry config (initializes with defaults if not set)
pub fn config() -> &'static GeomConfig {
    CONFIG.get_or_init(GeomConfig::default)
}

/// Set the global geometry config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: GeomConfig) -> std::result::Result<(), GeomConfig> {
    CONFIG.set(config)
}
