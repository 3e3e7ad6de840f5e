//! Curtain wall: enclosing shape, gates, bastions and towers
//!
//! A wall is built once from a set of patches and a set of reserved vertices
//! (corners that must stay where they are and never become gates). Gate
//! selection may carve the single outer patch touching a gate into two
//! halves, a bastion, through [`Model::replace`]. After construction the wall
//! is read-only apart from [`CurtainWall::build_towers`].

use ahash::AHashSet;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::Model;
use crate::core::config::{config, WallConfig};
use crate::core::error::{GeomError, Result};
use crate::core::rng::IndexRng;
use crate::core::types::PatchId;
use crate::geom::{Point, PointKey, Polygon};

#[derive(Debug, Clone, Serialize)]
pub struct CurtainWall {
    shape: Polygon,
    segments: Vec<bool>,
    gates: Vec<Point>,
    towers: Vec<Point>,
    real: bool,
    patches: Vec<PatchId>,
}

impl CurtainWall {
    /// Build a wall with the global [`WallConfig`]
    pub fn new(
        real: bool,
        model: &mut Model,
        patches: &[PatchId],
        reserved: &[Point],
        rng: &mut impl IndexRng,
    ) -> Result<Self> {
        Self::with_config(real, model, patches, reserved, rng, &config().wall)
    }

    /// Build a wall around `patches`.
    ///
    /// Unless `config.honor_real_flag` is set, `real` is ignored and the wall
    /// is always real: smoothed, with bastions, and eligible for towers.
    ///
    /// Fails with [`GeomError::BadWallShape`] when no vertex can hold a gate
    /// and with [`GeomError::Config`] when `config` does not validate.
    pub fn with_config(
        real: bool,
        model: &mut Model,
        patches: &[PatchId],
        reserved: &[Point],
        rng: &mut impl IndexRng,
        config: &WallConfig,
    ) -> Result<Self> {
        config.validate().map_err(GeomError::Config)?;
        if patches.is_empty() {
            return Err(GeomError::BadWallShape("wall needs at least one patch".into()));
        }

        let real = if config.honor_real_flag { real } else { true };
        let reserved: AHashSet<PointKey> = reserved.iter().map(Point::key).collect();

        let shape = if let [only] = patches {
            model.get(*only)?.shape().clone()
        } else {
            let outline = model.find_circumference(patches)?;
            if real {
                let factor = config.smoothing_factor(patches.len());
                smooth_outline(model, &outline, &reserved, factor)?
            } else {
                outline
            }
        };

        let mut wall = CurtainWall {
            segments: vec![true; shape.len()],
            shape,
            gates: Vec::new(),
            towers: Vec::new(),
            real,
            patches: patches.to_vec(),
        };
        wall.build_gates(model, &reserved, rng, config)?;

        info!(
            patches = wall.patches.len(),
            vertices = wall.shape.len(),
            gates = wall.gates.len(),
            real = wall.real,
            "built curtain wall"
        );
        Ok(wall)
    }

    fn build_gates(
        &mut self,
        model: &mut Model,
        reserved: &AHashSet<PointKey>,
        rng: &mut impl IndexRng,
        config: &WallConfig,
    ) -> Result<()> {
        let free = |v: &Point| !reserved.contains(&v.key());

        // Junctions between two wall patches are the plausible gate sites
        let mut entrances: Vec<Point> = if self.patches.len() > 1 {
            let mut junctions = Vec::new();
            for &v in self.shape.vertices() {
                if !free(&v) {
                    continue;
                }
                let mut claims = 0;
                for &id in &self.patches {
                    if model.get(id)?.shape().has_vertex(v) {
                        claims += 1;
                    }
                }
                if claims > 1 {
                    junctions.push(v);
                }
            }
            junctions
        } else {
            self.shape.vertices().iter().copied().filter(free).collect()
        };

        if entrances.is_empty() {
            warn!(vertices = self.shape.len(), "no entrance candidates on wall");
            return Err(GeomError::BadWallShape("no entrance candidates".into()));
        }
        debug!(entrances = entrances.len(), "selecting gates");

        // At least one gate, then more while enough entrances are left
        loop {
            let index = rng.next_int(0, entrances.len());
            let gate = entrances[index];
            self.gates.push(gate);
            debug!(?gate, index, remaining = entrances.len(), "gate selected");

            if self.real {
                self.carve_bastion(model, gate, reserved, config)?;
            }

            entrances = prune_entrances(&entrances, index);
            if entrances.is_empty() || entrances.len() < config.min_entrances {
                break;
            }
        }

        // Soften the wall right at each opening
        if self.real {
            for i in 0..self.gates.len() {
                let gate = self.gates[i];
                let smoothed = self.shape.smooth_vertex(gate, 1.0)?;
                self.shape.replace_vertex(gate, smoothed);
                model.move_vertex(gate, smoothed);
                self.gates[i] = smoothed;
            }
        }

        Ok(())
    }

    /// Split the only outer patch at `gate` toward its most outward vertex
    fn carve_bastion(
        &self,
        model: &mut Model,
        gate: Point,
        reserved: &AHashSet<PointKey>,
        config: &WallConfig,
    ) -> Result<()> {
        let outer_wards: Vec<PatchId> = model
            .patch_by_vertex(gate)
            .into_iter()
            .filter(|id| !self.patches.contains(id))
            .collect();
        let [outer] = outer_wards.as_slice() else {
            return Ok(());
        };
        let outer = *outer;

        let (outer_shape, within_city, within_walls) = {
            let patch = model.get(outer)?;
            (patch.shape().clone(), patch.within_city, patch.within_walls)
        };
        if outer_shape.len() < config.min_bastion_vertices {
            return Ok(());
        }

        let wall = self.shape.next(gate)? - self.shape.prev(gate)?;
        // Outward normal of a counter-clockwise ring
        let out = Point::new(wall.y, -wall.x);

        let score = |v: Point| {
            if self.shape.has_vertex(v) || reserved.contains(&v.key()) {
                f64::NEG_INFINITY
            } else {
                let dir = v - gate;
                dir.dot(out) / dir.length()
            }
        };

        let Some(farthest) = outer_shape.max_by_score(&score) else {
            return Ok(());
        };
        if !score(farthest).is_finite() {
            debug!(?gate, ?outer, "outer patch has no free vertex for a bastion");
            return Ok(());
        }
        if outer_shape.next(gate)? == farthest || outer_shape.prev(gate)? == farthest {
            debug!(?gate, ?outer, "bastion vertex is adjacent to the gate");
            return Ok(());
        }

        let (half1, half2) = outer_shape.split(gate, farthest)?;
        let halves = [model.create_patch(half1), model.create_patch(half2)];
        for &id in &halves {
            if let Some(p) = model.patch_mut(id) {
                p.within_city = within_city;
                p.within_walls = within_walls;
            }
        }
        model.replace(outer, &halves);
        debug!(?gate, ?outer, ?farthest, "carved bastion");
        Ok(())
    }

    /// Place a tower on every defended corner that is not a gate
    pub fn build_towers(&mut self) {
        self.towers.clear();
        if !self.real {
            return;
        }
        let len = self.shape.len();
        for (i, &t) in self.shape.vertices().iter().enumerate() {
            if !self.gates.contains(&t) && (self.segments[(i + len - 1) % len] || self.segments[i]) {
                self.towers.push(t);
            }
        }
        debug!(towers = self.towers.len(), "built towers");
    }

    /// Largest distance of a wall vertex from the origin
    pub fn get_radius(&self) -> f64 {
        self.shape
            .vertices()
            .iter()
            .map(Point::length)
            .fold(0.0, f64::max)
    }

    /// Is the edge `v0 -> v1` of `patch` a defended wall segment?
    ///
    /// Patches inside the wall run along the wall in its own direction,
    /// patches outside run against it.
    pub fn borders_by(&self, patch: PatchId, v0: Point, v1: Point) -> bool {
        let index = if self.patches.contains(&patch) {
            self.shape.find_directed_edge(v0, v1)
        } else {
            self.shape.find_directed_edge(v1, v0)
        };
        matches!(index, Some(i) if self.segments[i])
    }

    /// Does any defended segment run along an edge of `patch`?
    pub fn borders(&self, model: &Model, patch: PatchId) -> Result<bool> {
        let within_walls = self.patches.contains(&patch);
        let shape = model.get(patch)?.shape();

        Ok(self
            .shape
            .edges()
            .zip(&self.segments)
            .any(|((v0, v1), &defended)| {
                defended
                    && if within_walls {
                        shape.find_directed_edge(v0, v1).is_some()
                    } else {
                        shape.find_directed_edge(v1, v0).is_some()
                    }
            }))
    }

    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    pub fn segments(&self) -> &[bool] {
        &self.segments
    }

    pub fn gates(&self) -> &[Point] {
        &self.gates
    }

    pub fn towers(&self) -> &[Point] {
        &self.towers
    }

    pub fn is_real(&self) -> bool {
        self.real
    }

    /// Patches enclosed by this wall
    pub fn patches(&self) -> &[PatchId] {
        &self.patches
    }
}

/// Smooth every non-reserved outline vertex, moving the shared corners of
/// the model's patches along with it.
fn smooth_outline(
    model: &mut Model,
    outline: &Polygon,
    reserved: &AHashSet<PointKey>,
    factor: f64,
) -> Result<Polygon> {
    let smoothed = outline
        .vertices()
        .iter()
        .map(|&v| {
            if reserved.contains(&v.key()) {
                Ok(v)
            } else {
                outline.smooth_vertex(v, factor)
            }
        })
        .collect::<Result<Vec<Point>>>()?;

    for (&old, &new) in outline.vertices().iter().zip(&smoothed) {
        model.move_vertex(old, new);
    }
    Ok(Polygon::new(smoothed))
}

/// Remove the entrance at `index` together with its two ring neighbours.
///
/// The list is treated as a ring, so the first and last entries are
/// neighbours. Lists of one or two entries are emptied.
fn prune_entrances(entrances: &[Point], index: usize) -> Vec<Point> {
    let last = entrances.len() - 1;
    let removed: [usize; 3] = if index == 0 {
        // {0, 1} plus the wrapped-around neighbour {last}
        [0, 1, last]
    } else if index == last {
        // {last - 1, last} plus the wrapped-around neighbour {0}
        [last - 1, last, 0]
    } else {
        // {index - 1, index, index + 1}
        [index - 1, index, index + 1]
    };

    entrances
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, &v)| v)
        .collect()
}
