//! Citadel Walls - settlement boundary geometry
//!
//! Builds the curtain wall around a set of city patches: the enclosing
//! outline, gates at patch junctions, bastions carved from the patches just
//! outside, and towers on the defended corners. The [`cutter`] toolkit and
//! [`building::city_block`] turn patches into blocks and lots.

pub mod building;
pub mod core;
pub mod cutter;
pub mod geom;
