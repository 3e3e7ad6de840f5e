//! Buildable block of a patch: its shape inset by the surrounding streets

use crate::core::config::StreetConfig;
use crate::core::error::Result;
use crate::core::types::PatchId;
use crate::geom::Polygon;

use super::{CurtainWall, Model};

/// Inset `patch` by half the width of the street along each edge.
///
/// Edges on a defended wall segment keep half a main street clear of the
/// wall; edges facing the plaza get half a main street too. Other edges get
/// half a regular street inside the city (or everywhere when there is no
/// wall) and half an alley outside it. Non-convex patches are inset
/// uniformly by the narrowest street so the cuts cannot cross a reflex
/// corner.
pub fn city_block(
    model: &Model,
    wall: Option<&CurtainWall>,
    patch: PatchId,
    plaza: Option<PatchId>,
    streets: &StreetConfig,
) -> Result<Polygon> {
    let p = model.get(patch)?;
    let shape = p.shape();
    let inner_patch = wall.is_none() || p.within_walls;
    let plaza_shape = match plaza {
        Some(id) => Some(model.get(id)?.shape()),
        None => None,
    };

    let insets: Vec<f64> = shape
        .edges()
        .map(|(v0, v1)| {
            if wall.map_or(false, |w| w.borders_by(patch, v0, v1)) {
                return streets.main_street / 2.0;
            }
            let on_plaza = inner_patch
                && plaza_shape.map_or(false, |s| s.find_directed_edge(v1, v0).is_some());
            let width = if on_plaza {
                streets.main_street
            } else if inner_patch {
                streets.regular_street
            } else {
                streets.alley
            };
            width / 2.0
        })
        .collect();

    if shape.is_convex() {
        shape.shrink(&insets)
    } else {
        let narrowest = insets.iter().copied().fold(f64::INFINITY, f64::min);
        shape.shrink_eq(narrowest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WallConfig;
    use crate::core::rng::SeededRng;

    fn square(x: f64, y: f64) -> Polygon {
        Polygon::from_coords(&[(x, y), (x + 10.0, y), (x + 10.0, y + 10.0), (x, y + 10.0)])
    }

    #[test]
    fn test_block_without_wall_uses_regular_streets() {
        let mut model = Model::new();
        let id = model.add_patch(square(0.0, 0.0));
        let block = city_block(&model, None, id, None, &StreetConfig::default()).unwrap();
        assert!((block.area() - 81.0).abs() < 1e-9);
    }

    #[test]
    fn test_block_keeps_clear_of_wall() {
        let mut model = Model::new();
        let id = model.add_patch(square(0.0, 0.0));
        model.patch_mut(id).unwrap().within_walls = true;

        let config = WallConfig {
            honor_real_flag: true,
            ..WallConfig::default()
        };
        let wall = CurtainWall::with_config(false, &mut model, &[id], &[], &mut SeededRng::new(5), &config)
            .unwrap();

        let block = city_block(&model, Some(&wall), id, None, &StreetConfig::default()).unwrap();
        assert!((block.area() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_block_facing_plaza_gets_main_street() {
        let mut model = Model::new();
        let id = model.add_patch(square(0.0, 0.0));
        let plaza = model.add_patch(square(10.0, 0.0));
        let block = city_block(&model, None, id, Some(plaza), &StreetConfig::default()).unwrap();
        // Three edges at 0.5, the plaza edge at 1.0
        assert!((block.area() - 9.0 * 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_outer_patch_uses_alleys() {
        let mut model = Model::new();
        let inner = model.add_patch(square(0.0, 0.0));
        let outer = model.add_patch(square(10.0, 0.0));
        model.patch_mut(inner).unwrap().within_walls = true;

        let config = WallConfig {
            honor_real_flag: true,
            ..WallConfig::default()
        };
        let wall = CurtainWall::with_config(false, &mut model, &[inner], &[], &mut SeededRng::new(2), &config)
            .unwrap();

        let block = city_block(&model, Some(&wall), outer, None, &StreetConfig::default()).unwrap();
        // Shared edge faces the wall (1.0), the other three are alleys (0.3)
        assert!((block.area() - 9.4 * 8.7).abs() < 1e-9);
    }
}
