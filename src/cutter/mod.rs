//! Polygon subdivision toolkit
//!
//! Pure functions over any [`Polygon`]: nothing here touches a
//! [`Model`](crate::building::Model) or keeps state between calls.

pub mod lots;

pub use lots::{create_alleys, create_ortho_building};

use crate::core::error::Result;
use crate::geom::utils::lerp;
use crate::geom::{Point, Polygon};

/// Cut `poly` with a line through the edge starting at `vertex`.
///
/// The line starts `ratio` of the way along that edge and runs perpendicular
/// to it, rotated by `angle` radians. A positive `gap` leaves an empty strip
/// of that width between the halves. When the line cannot separate the ring
/// the result is the input polygon alone.
pub fn bisect(
    poly: &Polygon,
    vertex: Point,
    ratio: f64,
    angle: f64,
    gap: f64,
) -> Result<Vec<Polygon>> {
    let next = poly.next(vertex)?;

    let p1 = lerp(vertex, next, ratio);
    let d = next - vertex;

    let (sin_b, cos_b) = angle.sin_cos();
    let vx = d.x * cos_b - d.y * sin_b;
    let vy = d.y * cos_b + d.x * sin_b;
    let p2 = Point::new(p1.x - vy, p1.y + vx);

    tracing::trace!(ratio, angle, gap, "bisect");
    poly.cut(p1, p2, gap)
}

/// One triangle `(center, v0, v1)` per edge.
///
/// `center` defaults to the area centroid. With a positive `gap` the two
/// radial sides of each sector are pulled in by `gap / 2`.
pub fn radial(poly: &Polygon, center: Option<Point>, gap: f64) -> Result<Vec<Polygon>> {
    let center = center.unwrap_or_else(|| poly.centroid());

    let mut sectors = Vec::with_capacity(poly.len());
    for (v0, v1) in poly.edges() {
        let mut sector = Polygon::new(vec![center, v0, v1]);
        if gap > 0.0 {
            sector = sector.shrink(&[gap / 2.0, 0.0, gap / 2.0])?;
        }
        sectors.push(sector);
    }
    Ok(sectors)
}

/// Like [`radial`], fanning out from a vertex.
///
/// `center` defaults to the vertex nearest the centroid. Edges touching the
/// center would give zero-area sectors and are skipped. The gap is applied
/// only to radial sides that are not already edges of `poly`.
pub fn semi_radial(poly: &Polygon, center: Option<Point>, gap: f64) -> Result<Vec<Polygon>> {
    let center = match center {
        Some(c) => c,
        None => {
            let centroid = poly.centroid();
            poly.max_by_score(|v| -v.distance(centroid))
                .unwrap_or(centroid)
        }
    };

    let gap = gap / 2.0;

    let mut sectors = Vec::with_capacity(poly.len());
    for (v0, v1) in poly.edges() {
        if v0 == center || v1 == center {
            continue;
        }
        let mut sector = Polygon::new(vec![center, v0, v1]);
        if gap > 0.0 {
            let insets = [
                if poly.find_edge(center, v0).is_none() { gap } else { 0.0 },
                0.0,
                if poly.find_edge(v1, center).is_none() { gap } else { 0.0 },
            ];
            sector = sector.shrink(&insets)?;
        }
        sectors.push(sector);
    }
    Ok(sectors)
}

/// Peel strips of width `thickness` off every edge of `poly`.
///
/// Returns the peeled strips in cutting order; see [`ring_with_remainder`]
/// for the core that is left over.
pub fn ring(poly: &Polygon, thickness: f64) -> Result<Vec<Polygon>> {
    ring_with_remainder(poly, thickness).map(|(peel, _)| peel)
}

/// [`ring`] plus the remaining inner polygon.
///
/// Chords are cut shortest source edge first, which keeps the offsets at
/// acute corners from crossing each other.
pub fn ring_with_remainder(poly: &Polygon, thickness: f64) -> Result<(Vec<Polygon>, Polygon)> {
    poly.validate()?;

    struct Slice {
        p1: Point,
        p2: Point,
        len: f64,
    }

    let mut slices: Vec<Slice> = poly
        .edges()
        .map(|(v1, v2)| {
            let v = v2 - v1;
            let n = v.rotate90().norm(thickness);
            Slice {
                p1: v1 + n,
                p2: v2 + n,
                len: v.length(),
            }
        })
        .collect();

    slices.sort_by(|a, b| a.len.total_cmp(&b.len));

    let mut peel = Vec::with_capacity(slices.len());
    let mut p = poly.clone();
    for slice in &slices {
        let mut halves = p.cut(slice.p1, slice.p2, 0.0)?;
        if halves.len() == 2 {
            if let Some(strip) = halves.pop() {
                peel.push(strip);
            }
        }
        p = halves.swap_remove(0);
    }

    tracing::trace!(strips = peel.len(), thickness, "ring peeled");
    Ok((peel, p))
}
