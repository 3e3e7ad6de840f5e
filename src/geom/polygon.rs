//! Closed vertex ring and its edge-indexed operations
//!
//! Edge `i` runs from vertex `i` to vertex `(i + 1) % n`. Rings are expected
//! to be counter-clockwise (positive signed area): "left of an edge" is the
//! inside, which is what `cut`, `peel` and `shrink` rely on.
//!
//! Edge direction is part of the contract. Two patches that share a border
//! traverse it in opposite directions, so [`Polygon::find_directed_edge`]
//! tells which side of a shared edge a ring lies on.

use geo::ConvexHull;
use geo_types::{Coord, LineString, MultiPoint, Polygon as GeoPolygon};
use serde::{Deserialize, Serialize};

use super::utils::{cross, intersect_lines};
use super::Point;
use crate::core::error::{GeomError, Result};

/// Vertices closer than this are treated as one
const VERTEX_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&c| Point::from(c)).collect())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn index_of(&self, v: Point) -> Option<usize> {
        self.vertices.iter().position(|p| *p == v)
    }

    pub fn has_vertex(&self, v: Point) -> bool {
        self.index_of(v).is_some()
    }

    /// Move every occurrence of `old` to `new`. Returns true if anything moved.
    pub(crate) fn replace_vertex(&mut self, old: Point, new: Point) -> bool {
        let mut moved = false;
        for v in self.vertices.iter_mut().filter(|v| **v == old) {
            *v = new;
            moved = true;
        }
        moved
    }

    /// Edges as `(start, end)` pairs, edge `i` first at position `i`
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Reject rings that cannot bound an area
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() < 3 {
            return Err(GeomError::DegenerateGeometry(format!(
                "polygon has {} vertices, at least 3 required",
                self.vertices.len()
            )));
        }
        if let Some(i) = self
            .edges()
            .position(|(a, b)| a.distance(b) < VERTEX_EPSILON)
        {
            return Err(GeomError::DegenerateGeometry(format!(
                "edge {i} has zero length"
            )));
        }
        if self.vertices.iter().any(|v| !v.is_finite()) {
            return Err(GeomError::DegenerateGeometry(
                "polygon has non-finite coordinates".into(),
            ));
        }
        Ok(())
    }

    fn vertex_index(&self, v: Point) -> Result<usize> {
        self.index_of(v).ok_or(GeomError::NotAVertex(v))
    }

    pub fn next(&self, v: Point) -> Result<Point> {
        let i = self.vertex_index(v)?;
        Ok(self.vertices[(i + 1) % self.vertices.len()])
    }

    pub fn prev(&self, v: Point) -> Result<Point> {
        let i = self.vertex_index(v)?;
        let n = self.vertices.len();
        Ok(self.vertices[(i + n - 1) % n])
    }

    /// Vector of the edge starting at `v`
    pub fn vector(&self, v: Point) -> Result<Point> {
        Ok(self.next(v)? - v)
    }

    /// Vector of edge `i`
    pub fn vectori(&self, i: usize) -> Point {
        let n = self.vertices.len();
        self.vertices[(i + 1) % n] - self.vertices[i]
    }

    /// Index of the edge `v0 -> v1` in exactly that direction
    pub fn find_directed_edge(&self, v0: Point, v1: Point) -> Option<usize> {
        let i = self.index_of(v0)?;
        (self.vertices[(i + 1) % self.vertices.len()] == v1).then_some(i)
    }

    /// Index of the edge `v0 -> v1`, falling back to the reverse edge `v1 -> v0`
    pub fn find_edge(&self, v0: Point, v1: Point) -> Option<usize> {
        self.find_directed_edge(v0, v1)
            .or_else(|| self.find_directed_edge(v1, v0))
    }

    /// Point-in-polygon test by ray casting
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n.wrapping_sub(1);
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y)
                && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Signed area, positive for counter-clockwise rings
    pub fn area(&self) -> f64 {
        self.edges()
            .map(|(a, b)| cross(a.x, a.y, b.x, b.y))
            .sum::<f64>()
            / 2.0
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| a.distance(b)).sum()
    }

    /// Mean of the vertices
    pub fn center(&self) -> Point {
        if self.vertices.is_empty() {
            return Point::ZERO;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Point::ZERO, |acc, v| acc + *v);
        sum * (1.0 / self.vertices.len() as f64)
    }

    /// Area centroid. Falls back to the vertex mean for zero-area rings.
    pub fn centroid(&self) -> Point {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut a = 0.0;
        for (v0, v1) in self.edges() {
            let f = cross(v0.x, v0.y, v1.x, v1.y);
            a += f;
            x += (v0.x + v1.x) * f;
            y += (v0.y + v1.y) * f;
        }
        if a.abs() < VERTEX_EPSILON {
            return self.center();
        }
        let s6 = 1.0 / (3.0 * a);
        Point::new(s6 * x, s6 * y)
    }

    /// `4πA / P²`: 1 for a circle, lower for elongated shapes
    pub fn compactness(&self) -> f64 {
        let p = self.perimeter();
        if p == 0.0 {
            return 0.0;
        }
        4.0 * std::f64::consts::PI * self.area() / (p * p)
    }

    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| {
            let prev = self.vertices[(i + n - 1) % n];
            let v = self.vertices[i];
            let next = self.vertices[(i + 1) % n];
            let a = v - prev;
            let b = next - v;
            cross(a.x, a.y, b.x, b.y) > -VERTEX_EPSILON
        })
    }

    /// Distance from `p` to the nearest vertex
    pub fn distance(&self, p: Point) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Inverse-distance weight of each vertex for `p`, summing to 1.
    ///
    /// A point on a vertex gets all of the weight.
    pub fn interpolate(&self, p: Point) -> Vec<f64> {
        if let Some(i) = self.vertices.iter().position(|v| v.distance(p) < VERTEX_EPSILON) {
            let mut weights = vec![0.0; self.len()];
            weights[i] = 1.0;
            return weights;
        }
        let inverse: Vec<f64> = self.vertices.iter().map(|v| 1.0 / v.distance(p)).collect();
        let sum: f64 = inverse.iter().sum();
        inverse.into_iter().map(|d| d / sum).collect()
    }

    /// True if the two rings share at least one edge, in either direction
    pub fn borders(&self, other: &Polygon) -> bool {
        let len2 = other.len();
        self.edges().any(|(v, next)| match other.index_of(v) {
            Some(j) => {
                next == other.vertices[(j + 1) % len2]
                    || next == other.vertices[(j + len2 - 1) % len2]
            }
            None => false,
        })
    }

    /// Move `v` toward the mean of itself and its two neighbours.
    ///
    /// `factor` 1 lands on the mean, 0 leaves `v` unchanged.
    pub fn smooth_vertex(&self, v: Point, factor: f64) -> Result<Point> {
        let prev = self.prev(v)?;
        let next = self.next(v)?;
        let mean = (prev + v + next) * (1.0 / 3.0);
        Ok(v + (mean - v) * factor)
    }

    /// Vertex with the highest score; ties keep the first occurrence
    pub fn max_by_score<F>(&self, mut score: F) -> Option<Point>
    where
        F: FnMut(Point) -> f64,
    {
        let mut best: Option<(Point, f64)> = None;
        for &v in &self.vertices {
            let s = score(v);
            match best {
                Some((_, b)) if !(s > b) => {}
                _ => best = Some((v, s)),
            }
        }
        best.map(|(v, _)| v)
    }

    /// Split along the vertex path between `v1` and `v2`
    pub fn split(&self, v1: Point, v2: Point) -> Result<(Polygon, Polygon)> {
        let i1 = self.vertex_index(v1)?;
        let i2 = self.vertex_index(v2)?;
        self.split_at(i1, i2)
    }

    /// Split between vertex indices; both halves keep the shared chord
    pub fn split_at(&self, i1: usize, i2: usize) -> Result<(Polygon, Polygon)> {
        self.validate()?;
        let (i1, i2) = if i1 > i2 { (i2, i1) } else { (i1, i2) };
        if i1 == i2 {
            return Err(GeomError::DegenerateGeometry(
                "cannot split a polygon at a single vertex".into(),
            ));
        }

        let first = self.vertices[i1..=i2].to_vec();
        let mut second = self.vertices[i2..].to_vec();
        second.extend_from_slice(&self.vertices[..=i1]);

        if first.len() < 3 || second.len() < 3 {
            return Err(GeomError::DegenerateGeometry(format!(
                "split between neighbouring vertices {i1} and {i2}"
            )));
        }
        Ok((Polygon::new(first), Polygon::new(second)))
    }

    /// Cut the ring with the infinite line through `p1` and `p2`.
    ///
    /// Returns the ring unchanged when the line does not cross it exactly
    /// twice. Otherwise returns two rings, the one left of `p1 -> p2` first.
    /// A positive `gap` peels `gap / 2` off each half along the cut.
    pub fn cut(&self, p1: Point, p2: Point, gap: f64) -> Result<Vec<Polygon>> {
        self.validate()?;
        if p1.distance(p2) < VERTEX_EPSILON {
            return Err(GeomError::DegenerateGeometry(
                "cut line endpoints coincide".into(),
            ));
        }

        let d1 = p2 - p1;
        let n = self.vertices.len();
        let mut hits: Vec<(usize, f64)> = Vec::with_capacity(2);
        let mut count = 0;
        for i in 0..n {
            let v0 = self.vertices[i];
            let v1 = self.vertices[(i + 1) % n];
            if let Some((t1, t2)) = intersect_lines(p1, d1, v0, v1 - v0) {
                if (0.0..=1.0).contains(&t2) {
                    if hits.len() < 2 {
                        hits.push((i, t1));
                    }
                    count += 1;
                }
            }
        }

        if count != 2 {
            return Ok(vec![self.clone()]);
        }

        let (edge1, ratio1) = hits[0];
        let (edge2, ratio2) = hits[1];
        let point1 = p1 + d1 * ratio1;
        let point2 = p1 + d1 * ratio2;
        // Tangent line through a single vertex
        if point1.distance(point2) < VERTEX_EPSILON {
            return Ok(vec![self.clone()]);
        }

        let mut half1 = vec![point1];
        half1.extend_from_slice(&self.vertices[edge1 + 1..=edge2]);
        half1.push(point2);

        let mut half2 = vec![point2];
        half2.extend_from_slice(&self.vertices[edge2 + 1..]);
        half2.extend_from_slice(&self.vertices[..=edge1]);
        half2.push(point1);

        let mut half1 = Polygon::new(dedup_ring(half1));
        let mut half2 = Polygon::new(dedup_ring(half2));
        if half1.len() < 3 || half2.len() < 3 {
            return Ok(vec![self.clone()]);
        }

        if gap > 0.0 {
            half1 = half1.peel(point2, gap / 2.0)?;
            half2 = half2.peel(point1, gap / 2.0)?;
        }

        let v = self.vectori(edge1);
        if cross(d1.x, d1.y, v.x, v.y) > 0.0 {
            Ok(vec![half1, half2])
        } else {
            Ok(vec![half2, half1])
        }
    }

    /// Trim a strip of width `d` off the inside of the edge starting at `v1`
    pub fn peel(&self, v1: Point, d: f64) -> Result<Polygon> {
        let v2 = self.next(v1)?;
        let n = (v2 - v1).rotate90().norm(d);
        let mut halves = self.cut(v1 + n, v2 + n, 0.0)?;
        Ok(halves.swap_remove(0))
    }

    /// Offset each edge inward by its own distance (`insets[i]` for edge `i`)
    pub fn shrink(&self, insets: &[f64]) -> Result<Polygon> {
        self.validate()?;
        if insets.len() != self.len() {
            return Err(GeomError::DegenerateGeometry(format!(
                "{} insets given for {} edges",
                insets.len(),
                self.len()
            )));
        }

        let mut q = self.clone();
        for ((v1, v2), &dd) in self.edges().zip(insets) {
            if dd > 0.0 {
                let n = (v2 - v1).rotate90().norm(dd);
                let mut halves = q.cut(v1 + n, v2 + n, 0.0)?;
                q = halves.swap_remove(0);
            }
        }
        Ok(q)
    }

    /// Offset every edge inward by `d`
    pub fn shrink_eq(&self, d: f64) -> Result<Polygon> {
        self.shrink(&vec![d; self.len()])
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.area() > 0.0
    }

    /// Same ring with counter-clockwise winding
    pub fn into_counter_clockwise(mut self) -> Polygon {
        if self.area() < 0.0 {
            self.vertices.reverse();
        }
        self
    }

    pub fn to_geo(&self) -> GeoPolygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .vertices
            .iter()
            .map(|v| Coord { x: v.x, y: v.y })
            .collect();
        GeoPolygon::new(LineString::from(coords), vec![])
    }

    /// Counter-clockwise convex hull of a point set
    pub fn convex_hull(points: &[Point]) -> Polygon {
        let multi = MultiPoint::from(
            points
                .iter()
                .map(|p| (p.x, p.y))
                .collect::<Vec<(f64, f64)>>(),
        );
        let hull = multi.convex_hull();
        let mut vertices: Vec<Point> = hull
            .exterior()
            .coords()
            .map(|c| Point::new(c.x, c.y))
            .collect();
        // geo rings repeat the first coordinate at the end
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Polygon::new(vertices).into_counter_clockwise()
    }
}

/// Drop consecutive duplicates (including the wrap-around pair)
fn dedup_ring(mut vertices: Vec<Point>) -> Vec<Point> {
    vertices.dedup_by(|a, b| a.distance(*b) < VERTEX_EPSILON);
    while vertices.len() > 1 {
        let first = vertices[0];
        let last = vertices[vertices.len() - 1];
        if first.distance(last) < VERTEX_EPSILON {
            vertices.pop();
        } else {
            break;
        }
    }
    vertices
}
