//! Demo settlement: a jittered grid of patches walled in around the origin
//!
//! Ties the passes together end to end: patch layout, curtain wall with gates
//! and bastions, towers, city blocks and lots. Layouts that leave the wall
//! without a usable gate are retried with the next seed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{city_block, CurtainWall, Model};
use crate::core::config::GeomConfig;
use crate::core::error::{GeomError, Result};
use crate::core::rng::{IndexRng, SeededRng};
use crate::core::types::PatchId;
use crate::cutter::create_alleys;
use crate::geom::{Point, Polygon};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub cols: usize,
    /// Side of an unjittered cell
    pub cell_size: f64,
    /// Interior node displacement as a fraction of the cell size, below 0.5
    pub jitter: f64,
    /// Cells whose center lies within this many cell sizes of the origin are
    /// inside the city
    pub inner_radius: f64,
    /// Reserve a citadel patch just outside the inner patches
    pub citadel: bool,
    /// Passed to the wall as its `real` flag
    pub walls: bool,
    /// Leave the most central inner patch open as a plaza
    pub plaza: bool,
    /// Layouts tried (with consecutive seeds) before giving up
    pub max_attempts: u32,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            cell_size: 20.0,
            jitter: 0.3,
            inner_radius: 2.5,
            citadel: true,
            walls: true,
            plaza: true,
            max_attempts: 8,
        }
    }
}

impl SettlementConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GeomError::Config("grid needs at least one row and column".into()));
        }
        if !(self.cell_size > 0.0) {
            return Err(GeomError::Config("cell_size must be positive".into()));
        }
        if !(0.0..0.5).contains(&self.jitter) {
            return Err(GeomError::Config("jitter must be in [0, 0.5)".into()));
        }
        if self.max_attempts == 0 {
            return Err(GeomError::Config("max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// A generated settlement
#[derive(Debug, Clone)]
pub struct Settlement {
    pub model: Model,
    pub wall: CurtainWall,
    pub inner: Vec<PatchId>,
    pub citadel: Option<PatchId>,
    pub plaza: Option<PatchId>,
    pub lots: Vec<Polygon>,
    /// Seed of the layout that succeeded
    pub seed: u64,
    /// Number of patches laid out on the grid, before bastions
    pub grid_patches: usize,
}

/// Headline numbers of a settlement, for reports and the CLI
#[derive(Debug, Clone, Serialize)]
pub struct SettlementSummary {
    pub seed: u64,
    pub patches: usize,
    pub inner: usize,
    pub enclosed: usize,
    pub bastions: usize,
    pub wall_vertices: usize,
    pub radius: f64,
    pub gates: Vec<Point>,
    pub towers: usize,
    pub lots: usize,
    pub citadel: bool,
    pub plaza: bool,
}

impl Settlement {
    pub fn summary(&self) -> Result<SettlementSummary> {
        let mut enclosed = 0;
        for &id in self.model.patches() {
            if self.model.is_enclosed(id)? {
                enclosed += 1;
            }
        }

        Ok(SettlementSummary {
            seed: self.seed,
            patches: self.model.len(),
            inner: self.inner.len(),
            enclosed,
            // Each bastion turns one patch into two
            bastions: self.model.len().saturating_sub(self.grid_patches),
            wall_vertices: self.wall.shape().len(),
            radius: self.wall.get_radius(),
            gates: self.wall.gates().to_vec(),
            towers: self.wall.towers().len(),
            lots: self.lots.len(),
            citadel: self.citadel.is_some(),
            plaza: self.plaza.is_some(),
        })
    }
}

/// Generate a settlement, retrying with `seed + 1, seed + 2, ...` while the
/// layout fails with a retryable error.
pub fn generate_settlement(
    settings: &SettlementConfig,
    geom: &GeomConfig,
    seed: u64,
) -> Result<Settlement> {
    settings.validate()?;

    let mut last_error = None;
    for attempt in 0..settings.max_attempts {
        let attempt_seed = seed.wrapping_add(u64::from(attempt));
        match build_settlement(settings, geom, attempt_seed) {
            Ok(settlement) => {
                info!(
                    seed = attempt_seed,
                    attempt,
                    patches = settlement.model.len(),
                    gates = settlement.wall.gates().len(),
                    lots = settlement.lots.len(),
                    "generated settlement"
                );
                return Ok(settlement);
            }
            Err(e) if e.is_retryable() => {
                warn!(seed = attempt_seed, attempt, error = %e, "layout rejected, retrying");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| GeomError::Config("no attempts made".into())))
}

fn build_settlement(settings: &SettlementConfig, geom: &GeomConfig, seed: u64) -> Result<Settlement> {
    let mut rng = SeededRng::new(seed);
    let mut model = Model::from_shapes(grid_patches(settings, &mut rng));
    let grid_patches = model.len();

    // Inner patches by distance of their center from the origin
    let radius = settings.inner_radius * settings.cell_size;
    let mut by_distance: Vec<(PatchId, f64)> = model
        .iter()
        .map(|(id, p)| (id, p.shape().center().length()))
        .collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut inner: Vec<PatchId> = by_distance
        .iter()
        .filter(|(_, d)| *d < radius)
        .map(|(id, _)| *id)
        .collect();
    if inner.is_empty() {
        inner.push(by_distance[0].0);
    }
    for &id in &inner {
        if let Some(p) = model.patch_mut(id) {
            p.within_city = true;
            p.within_walls = settings.walls;
        }
    }

    let citadel = if settings.citadel {
        by_distance
            .iter()
            .map(|(id, _)| *id)
            .find(|id| !inner.contains(id))
    } else {
        None
    };
    let reserved: Vec<Point> = match citadel {
        Some(id) => {
            if let Some(p) = model.patch_mut(id) {
                p.within_city = true;
            }
            model.get(id)?.shape().vertices().to_vec()
        }
        None => Vec::new(),
    };
    debug!(inner = inner.len(), ?citadel, reserved = reserved.len(), "laid out patches");

    let mut wall = CurtainWall::with_config(settings.walls, &mut model, &inner, &reserved, &mut rng, &geom.wall)?;
    wall.build_towers();

    let plaza = if settings.plaza && inner.len() > 1 {
        Some(inner[0])
    } else {
        None
    };

    // An unwalled city lays out its streets as if the wall were not there
    let street_wall = settings.walls.then_some(&wall);
    let mut lots = Vec::new();
    for &id in &inner {
        if Some(id) == plaza {
            continue;
        }
        let block = match city_block(&model, street_wall, id, plaza, &geom.streets) {
            Ok(block) => block,
            Err(GeomError::DegenerateGeometry(reason)) => {
                debug!(?id, %reason, "patch too small for a block");
                continue;
            }
            Err(e) => return Err(e),
        };
        lots.extend(create_alleys(&block, &geom.lots, geom.streets.alley, &mut rng)?);
    }

    Ok(Settlement {
        model,
        wall,
        inner,
        citadel,
        plaza,
        lots,
        seed,
        grid_patches,
    })
}

/// Counter-clockwise quads over a grid centered on the origin.
///
/// Interior nodes are displaced by up to `jitter` cells on each axis; the
/// outer boundary stays a rectangle. Row-major from the bottom-left cell.
fn grid_patches(settings: &SettlementConfig, rng: &mut impl IndexRng) -> Vec<Polygon> {
    let (rows, cols) = (settings.rows, settings.cols);
    let size = settings.cell_size;
    let origin = Point::new(-(cols as f64) * size / 2.0, -(rows as f64) * size / 2.0);

    let mut nodes = Vec::with_capacity((rows + 1) * (cols + 1));
    for r in 0..=rows {
        for c in 0..=cols {
            let mut node = origin + Point::new(c as f64 * size, r as f64 * size);
            if r > 0 && r < rows && c > 0 && c < cols {
                let dx = (rng.next_float() * 2.0 - 1.0) * settings.jitter * size;
                let dy = (rng.next_float() * 2.0 - 1.0) * settings.jitter * size;
                node = node + Point::new(dx, dy);
            }
            nodes.push(node);
        }
    }

    let node = |r: usize, c: usize| nodes[r * (cols + 1) + c];
    let mut patches = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            patches.push(Polygon::new(vec![
                node(r, c),
                node(r, c + 1),
                node(r + 1, c + 1),
                node(r + 1, c),
            ]));
        }
    }
    patches
}
