pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::{config, GeomConfig, LotConfig, StreetConfig, WallConfig};
pub use error::{GeomError, Result};
pub use rng::{IndexRng, SeededRng};
pub use types::PatchId;
