//! Settlement layer: parcels, their registry and the curtain wall

pub mod block;
mod model;
mod patch;
pub mod settlement;
mod wall;

pub use block::city_block;
pub use model::Model;
pub use patch::Patch;
pub use settlement::{generate_settlement, Settlement, SettlementConfig, SettlementSummary};
pub use wall::CurtainWall;
