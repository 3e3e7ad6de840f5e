//! Integration tests for curtain wall construction
//!
//! These tests drive the public API end to end:
//! - Gate selection on a single patch, with and without gate smoothing
//! - Rejection of walls with no entrance at all, and of bad configs
//! - Bastion carving of the single outer patch touching a gate
//! - Wall adjacency queries used by street layout

use std::collections::VecDeque;

use citadel_walls::building::{CurtainWall, Model};
use citadel_walls::core::config::WallConfig;
use citadel_walls::core::error::GeomError;
use citadel_walls::core::rng::IndexRng;
use citadel_walls::core::types::PatchId;
use citadel_walls::geom::{Point, Polygon};

/// Replays a fixed list of indices, then keeps returning 0
struct ScriptedRng {
    draws: VecDeque<usize>,
}

impl ScriptedRng {
    fn new(draws: &[usize]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }
}

impl IndexRng for ScriptedRng {
    fn next_int(&mut self, min: usize, max: usize) -> usize {
        let draw = self.draws.pop_front().unwrap_or(0);
        (min + draw).min(max.saturating_sub(1)).max(min)
    }

    fn next_float(&mut self) -> f64 {
        0.0
    }
}

fn square(x: f64, y: f64) -> Polygon {
    Polygon::from_coords(&[(x, y), (x + 10.0, y), (x + 10.0, y + 10.0), (x, y + 10.0)])
}

fn honouring() -> WallConfig {
    WallConfig {
        honor_real_flag: true,
        ..WallConfig::default()
    }
}

fn close(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-9
}

// ============================================================================
// Single Patch
// ============================================================================

/// A single square, index 1 drawn: the gate goes on (10, 0) and is then
/// smoothed toward its neighbours; the other three corners get towers.
#[test]
fn test_square_gate_and_towers() {
    let mut model = Model::new();
    let id = model.add_patch(square(0.0, 0.0));

    let mut wall = CurtainWall::with_config(
        true,
        &mut model,
        &[id],
        &[],
        &mut ScriptedRng::new(&[1]),
        &WallConfig::default(),
    )
    .unwrap();

    let gate = Point::new(20.0 / 3.0, 10.0 / 3.0);
    assert_eq!(wall.gates().len(), 1);
    assert!(close(wall.gates()[0], gate));
    assert_eq!(wall.segments(), &[true, true, true, true]);

    // The patch corner moved with the wall
    let shape = model.get(id).unwrap().shape();
    assert_eq!(shape, wall.shape());

    assert!(wall.towers().is_empty());
    wall.build_towers();
    assert_eq!(
        wall.towers(),
        &[Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
    );
}

/// With the `real` flag honoured and off, the wall is the patch itself and
/// the gate stays exactly on the drawn vertex.
#[test]
fn test_unreal_wall_keeps_patch_shape() {
    let mut model = Model::new();
    let id = model.add_patch(square(0.0, 0.0));

    let mut wall = CurtainWall::with_config(
        false,
        &mut model,
        &[id],
        &[],
        &mut ScriptedRng::new(&[1]),
        &honouring(),
    )
    .unwrap();

    assert!(!wall.is_real());
    assert_eq!(wall.gates(), &[Point::new(10.0, 0.0)]);
    assert_eq!(wall.shape(), &square(0.0, 0.0));
    assert!((wall.get_radius() - 200f64.sqrt()).abs() < 1e-9);

    wall.build_towers();
    assert!(wall.towers().is_empty());
}

#[test]
fn test_fully_reserved_square_is_rejected() {
    let mut model = Model::new();
    let shape = square(0.0, 0.0);
    let id = model.add_patch(shape.clone());

    let result = CurtainWall::with_config(
        true,
        &mut model,
        &[id],
        shape.vertices(),
        &mut ScriptedRng::new(&[]),
        &WallConfig::default(),
    );
    assert!(matches!(result, Err(GeomError::BadWallShape(_))));
}

/// Two entrances are fewer than the three needed to continue, but the first
/// gate is always placed.
#[test]
fn test_two_entrances_still_give_one_gate() {
    let mut model = Model::new();
    let id = model.add_patch(square(0.0, 0.0));

    let wall = CurtainWall::with_config(
        false,
        &mut model,
        &[id],
        &[Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
        &mut ScriptedRng::new(&[1]),
        &honouring(),
    )
    .unwrap();
    assert_eq!(wall.gates(), &[Point::new(0.0, 10.0)]);
}

#[test]
fn test_zero_min_entrances_is_rejected() {
    let mut model = Model::new();
    let id = model.add_patch(square(0.0, 0.0));
    let config = WallConfig {
        min_entrances: 0,
        ..WallConfig::default()
    };

    let result = CurtainWall::with_config(true, &mut model, &[id], &[], &mut ScriptedRng::new(&[]), &config);
    assert!(matches!(result, Err(GeomError::Config(_))));
}

#[test]
fn test_empty_patch_set_is_rejected() {
    let mut model = Model::new();
    let result = CurtainWall::with_config(
        true,
        &mut model,
        &[],
        &[],
        &mut ScriptedRng::new(&[]),
        &WallConfig::default(),
    );
    assert!(matches!(result, Err(GeomError::BadWallShape(_))));
}

// ============================================================================
// Multiple Patches
// ============================================================================

/// 2x2 block of squares over [0, 20]^2, registry order SW, SE, NW, NE
fn block(model: &mut Model) -> Vec<PatchId> {
    [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]
        .into_iter()
        .map(|(x, y)| model.add_patch(square(x, y)))
        .collect()
}

#[test]
fn test_gates_only_on_junctions() {
    let mut model = Model::new();
    let inner = block(&mut model);

    let wall = CurtainWall::with_config(
        false,
        &mut model,
        &inner,
        &[],
        &mut ScriptedRng::new(&[2]),
        &honouring(),
    )
    .unwrap();

    // Outline of the block, corners included
    assert_eq!(wall.shape().len(), 8);
    assert_eq!(wall.segments().len(), wall.shape().len());
    assert!((wall.shape().area() - 400.0).abs() < 1e-9);

    // Junctions are the edge midpoints; corners belong to one patch only
    let midpoints = [(10.0, 0.0), (20.0, 10.0), (10.0, 20.0), (0.0, 10.0)].map(Point::from);
    assert_eq!(wall.gates().len(), 1);
    assert!(midpoints.contains(&wall.gates()[0]));
}

/// Two neighbouring parcels only meet at two junctions
#[test]
fn test_two_patch_wall_gets_one_gate() {
    let mut model = Model::new();
    let left = model.add_patch(square(0.0, 0.0));
    let right = model.add_patch(square(10.0, 0.0));

    let wall = CurtainWall::with_config(
        true,
        &mut model,
        &[left, right],
        &[],
        &mut ScriptedRng::new(&[0]),
        &WallConfig::default(),
    )
    .unwrap();

    // Junction (10, 0) pulled toward the smoothed corners beside it
    assert_eq!(wall.gates().len(), 1);
    assert!(close(wall.gates()[0], Point::new(10.0, 20.0 / 9.0)));
    assert!(model.get(left).unwrap().shape().has_vertex(wall.gates()[0]));
    assert!(model.get(right).unwrap().shape().has_vertex(wall.gates()[0]));

    let mut model = Model::new();
    let left = model.add_patch(square(0.0, 0.0));
    let right = model.add_patch(square(10.0, 0.0));
    let unreal = CurtainWall::with_config(
        false,
        &mut model,
        &[left, right],
        &[],
        &mut ScriptedRng::new(&[1]),
        &honouring(),
    )
    .unwrap();
    assert_eq!(unreal.gates(), &[Point::new(10.0, 10.0)]);
}

#[test]
fn test_smoothing_keeps_patches_attached_to_wall() {
    let mut model = Model::new();
    let inner = block(&mut model);

    let wall = CurtainWall::with_config(
        true,
        &mut model,
        &inner,
        &[],
        &mut ScriptedRng::new(&[0]),
        &WallConfig::default(),
    )
    .unwrap();

    // Corner (0, 0) is pulled in to the mean of itself and its neighbours
    let corner = Point::new(10.0 / 3.0, 10.0 / 3.0);
    assert!(wall.shape().vertices().iter().any(|&v| close(v, corner)));
    assert!(model.get(inner[0]).unwrap().shape().vertices().iter().any(|&v| close(v, corner)));

    // Every wall vertex is still a vertex of some inner patch
    for &v in wall.shape().vertices() {
        assert!(!model.patch_by_vertex(v).is_empty(), "{v:?} detached");
    }
    for &id in &inner {
        assert!(wall.borders(&model, id).unwrap());
    }
}

#[test]
fn test_bastion_splits_outer_patch() {
    let mut model = Model::new();
    let inner = block(&mut model);
    let outer = model.add_patch(Polygon::from_coords(&[
        (0.0, -10.0),
        (20.0, -10.0),
        (20.0, 0.0),
        (10.0, 0.0),
        (0.0, 0.0),
    ]));
    model.patch_mut(outer).unwrap().within_city = true;

    let wall = CurtainWall::with_config(
        true,
        &mut model,
        &inner,
        &[],
        &mut ScriptedRng::new(&[0]),
        &WallConfig::default(),
    )
    .unwrap();

    // The first junction is (10, 0), shared with the outer patch
    assert_eq!(wall.gates().len(), 1);
    let gate = wall.gates()[0];
    assert!(close(gate, Point::new(10.0, 20.0 / 9.0)));

    assert!(!model.is_live(outer));
    assert_eq!(model.len(), 6);

    let halves: Vec<PatchId> = model
        .patches()
        .iter()
        .copied()
        .filter(|id| !inner.contains(id))
        .collect();
    assert_eq!(halves.len(), 2);
    for id in halves {
        let half = model.get(id).unwrap();
        assert!(half.within_city);
        assert!(half.shape().has_vertex(gate));
        assert!(half.shape().has_vertex(Point::new(0.0, -10.0)));
        assert!(half.shape().area() > 0.0);
    }
}

#[test]
fn test_bastion_skipped_for_shared_gate() {
    let mut model = Model::new();
    let inner = block(&mut model);
    // Two outer squares meet below the gate at (10, 0)
    let left = model.add_patch(square(0.0, -10.0));
    let right = model.add_patch(square(10.0, -10.0));

    CurtainWall::with_config(
        true,
        &mut model,
        &inner,
        &[],
        &mut ScriptedRng::new(&[0]),
        &WallConfig::default(),
    )
    .unwrap();

    assert!(model.is_live(left));
    assert!(model.is_live(right));
    assert_eq!(model.len(), 6);
}

// ============================================================================
// Adjacency Queries
// ============================================================================

#[test]
fn test_borders_respect_edge_direction() {
    let mut model = Model::new();
    let inside = model.add_patch(square(0.0, 0.0));
    let outside = model.add_patch(square(10.0, 0.0));
    let far = model.add_patch(square(30.0, 0.0));

    let wall = CurtainWall::with_config(
        false,
        &mut model,
        &[inside],
        &[],
        &mut ScriptedRng::new(&[0]),
        &honouring(),
    )
    .unwrap();

    assert!(wall.borders_by(inside, Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
    assert!(!wall.borders_by(inside, Point::new(10.0, 0.0), Point::new(0.0, 0.0)));
    assert!(wall.borders_by(outside, Point::new(10.0, 10.0), Point::new(10.0, 0.0)));
    assert!(!wall.borders_by(outside, Point::new(10.0, 0.0), Point::new(10.0, 10.0)));

    assert!(wall.borders(&model, inside).unwrap());
    assert!(wall.borders(&model, outside).unwrap());
    assert!(!wall.borders(&model, far).unwrap());
    assert!(matches!(
        wall.borders(&model, PatchId::new(99)),
        Err(GeomError::UnknownPatch(_))
    ));
}

#[test]
fn test_wall_serializes_to_json() {
    let mut model = Model::new();
    let id = model.add_patch(square(0.0, 0.0));
    let wall = CurtainWall::with_config(
        false,
        &mut model,
        &[id],
        &[],
        &mut ScriptedRng::new(&[0]),
        &honouring(),
    )
    .unwrap();

    let json = serde_json::to_value(&wall).unwrap();
    assert_eq!(json["gates"][0]["x"], 0.0);
    assert_eq!(json["segments"].as_array().unwrap().len(), 4);
}
