//! Plane geometry: points, vertex rings and line helpers

mod point;
mod polygon;
pub mod utils;

pub use point::{Point, PointKey};
pub use polygon::Polygon;
