//! 2D point with vector arithmetic

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// 2D coordinate. Equality is by value, never by identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    /// Counter-clockwise quarter turn: `(x, y) -> (-y, x)`
    pub fn rotate90(&self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    /// Rescale to length `len`. Zero vectors stay zero.
    pub fn norm(&self, len: f64) -> Self {
        let l = self.length();
        if l > 0.0 {
            *self * (len / l)
        } else {
            Self::ZERO
        }
    }

    /// Hashable key for set/map membership by value
    pub fn key(&self) -> PointKey {
        PointKey(OrderedFloat(self.x), OrderedFloat(self.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// Value key for a [`Point`], usable in `AHashSet`/`AHashMap`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(OrderedFloat<f64>, OrderedFloat<f64>);
