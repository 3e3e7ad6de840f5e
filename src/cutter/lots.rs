//! Recursive lot subdivision built on [`bisect`](super::bisect) and `cut`

use std::f64::consts::PI;

use crate::core::config::LotConfig;
use crate::core::error::Result;
use crate::core::rng::IndexRng;
use crate::geom::utils::lerp;
use crate::geom::{Point, Polygon};

/// Recursion guard; real blocks bottom out far earlier
const MAX_DEPTH: u32 = 24;

/// Start of the longest edge, first one on ties
fn longest_edge(poly: &Polygon) -> Option<Point> {
    let mut best: Option<(Point, f64)> = None;
    for (v0, v1) in poly.edges() {
        let len = v0.distance(v1);
        if best.map_or(true, |(_, l)| len > l) {
            best = Some((v0, len));
        }
    }
    best.map(|(v, _)| v)
}

fn keep_lot(poly: Polygon, keep_prob: f64, rng: &mut impl IndexRng) -> Vec<Polygon> {
    if rng.chance(keep_prob) {
        vec![poly]
    } else {
        Vec::new()
    }
}

/// Split a block into lots separated by alleys.
///
/// Each step bisects across the longest edge at a jittered ratio and angle
/// (scaled by `grid_chaos`). Halves below a randomised size threshold become
/// lots; the rest recurse. `alley` is the gap left between halves, 0 for
/// none.
pub fn create_alleys(
    poly: &Polygon,
    lots: &LotConfig,
    alley: f64,
    rng: &mut impl IndexRng,
) -> Result<Vec<Polygon>> {
    alleys_inner(poly, lots, alley, rng, 0)
}

fn alleys_inner(
    poly: &Polygon,
    lots: &LotConfig,
    alley: f64,
    rng: &mut impl IndexRng,
    depth: u32,
) -> Result<Vec<Polygon>> {
    let area = poly.area();
    if area < lots.min_area || depth >= MAX_DEPTH {
        return Ok(keep_lot(poly.clone(), 1.0 - lots.empty_prob, rng));
    }

    let Some(v) = longest_edge(poly) else {
        return Ok(Vec::new());
    };

    let spread = 0.8 * lots.grid_chaos;
    let ratio = (1.0 - spread) / 2.0 + rng.next_float() * spread;

    // Small blocks are cut straight
    let angle_spread = if area < lots.min_area * 4.0 {
        0.0
    } else {
        PI / 6.0 * lots.grid_chaos
    };
    let angle = (rng.next_float() - 0.5) * angle_spread;

    let halves = super::bisect(poly, v, ratio, angle, alley)?;
    if halves.len() < 2 {
        return Ok(keep_lot(poly.clone(), 1.0 - lots.empty_prob, rng));
    }

    let mut buildings = Vec::new();
    for half in halves {
        if half.validate().is_err() || half.area() <= 0.0 {
            continue;
        }

        let threshold = lots.min_area * 2f64.powf(4.0 * lots.size_chaos * (rng.next_float() - 0.5));
        if half.area() < threshold {
            buildings.extend(keep_lot(half, 1.0 - lots.empty_prob, rng));
        } else {
            buildings.extend(alleys_inner(&half, lots, alley, rng, depth + 1)?);
        }
    }
    Ok(buildings)
}

/// Slice a block into a rectilinear set of buildings.
///
/// Cuts always run along one of two fixed directions taken from the block's
/// longest edge, so the result reads as an orthogonal grid. Each finished
/// piece is kept with probability `fill`.
pub fn create_ortho_building(
    poly: &Polygon,
    min_block_area: f64,
    fill: f64,
    rng: &mut impl IndexRng,
) -> Result<Vec<Polygon>> {
    if poly.area() < min_block_area {
        return Ok(keep_lot(poly.clone(), fill, rng));
    }

    let Some(start) = longest_edge(poly) else {
        return Ok(Vec::new());
    };
    let c1 = poly.vector(start)?;
    let c2 = c1.rotate90();

    let blocks = ortho_slice(poly, c1, c2, min_block_area, fill, rng, 0)?;
    if blocks.is_empty() {
        Ok(keep_lot(poly.clone(), fill, rng))
    } else {
        Ok(blocks)
    }
}

fn ortho_slice(
    poly: &Polygon,
    c1: Point,
    c2: Point,
    min_block_area: f64,
    fill: f64,
    rng: &mut impl IndexRng,
    depth: u32,
) -> Result<Vec<Polygon>> {
    if depth > 10 || poly.area() < min_block_area * 0.1 {
        return Ok(keep_lot(poly.clone(), fill, rng));
    }

    let Some(v0) = longest_edge(poly) else {
        return Ok(Vec::new());
    };
    let v1 = poly.next(v0)?;
    let v = v1 - v0;

    let ratio = 0.4 + rng.next_float() * 0.2;
    let p1 = lerp(v0, v1, ratio);

    // Cut along whichever axis is closer to perpendicular to this edge
    let c = if v.dot(c1).abs() < v.dot(c2).abs() { c1 } else { c2 };

    let halves = poly.cut(p1, p1 + c, 0.0)?;
    if halves.len() < 2 {
        return Ok(keep_lot(poly.clone(), fill, rng));
    }

    let mut buildings = Vec::new();
    for half in halves {
        if half.validate().is_err() || half.area() <= 0.0 {
            continue;
        }

        let threshold = min_block_area * 2f64.powf(rng.next_normal() * 2.0 - 1.0);
        if half.area() < threshold {
            buildings.extend(keep_lot(half, fill, rng));
        } else {
            buildings.extend(ortho_slice(&half, c1, c2, min_block_area, fill, rng, depth + 1)?);
        }
    }
    Ok(buildings)
}
