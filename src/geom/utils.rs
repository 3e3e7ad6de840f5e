//! Line and vector helpers shared by the polygon operations

use super::Point;

const PARALLEL_EPSILON: f64 = 1e-12;

/// 2D cross product (z component of `a × b`)
pub fn cross(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    x1 * y2 - y1 * x2
}

/// Point at `ratio` of the way from `a` to `b`
pub fn lerp(a: Point, b: Point, ratio: f64) -> Point {
    a + (b - a) * ratio
}

/// Signed distance from `p` to the line through `p0` along `d`.
///
/// Positive on the left of `d`, which is the inside of a counter-clockwise
/// ring edge.
pub fn distance_to_line(p0: Point, d: Point, p: Point) -> f64 {
    let rel = p - p0;
    cross(d.x, d.y, rel.x, rel.y) / d.length()
}

/// Intersect the lines `p1 + t1 * d1` and `p2 + t2 * d2`.
///
/// Returns `(t1, t2)`, or `None` for parallel lines.
pub fn intersect_lines(p1: Point, d1: Point, p2: Point, d2: Point) -> Option<(f64, f64)> {
    let d = d1.x * d2.y - d1.y * d2.x;
    if d.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t2 = (d1.y * (p2.x - p1.x) - d1.x * (p2.y - p1.y)) / d;
    // Solve for t1 along the dominant axis of d1
    let t1 = if d1.x.abs() >= d1.y.abs() {
        (p2.x - p1.x + d2.x * t2) / d1.x
    } else {
        (p2.y - p1.y + d2.y * t2) / d1.y
    };
    Some((t1, t2))
}
