//! Patch registry
//!
//! Patches live in an arena and are referred to by [`PatchId`]. The ordered
//! list of live handles is the registry proper; `replace` swaps one handle's
//! slot for several new ones without invalidating handles held elsewhere.

use tracing::debug;

use super::Patch;
use crate::core::error::{GeomError, Result};
use crate::core::types::PatchId;
use crate::geom::{Point, Polygon};

#[derive(Debug, Clone, Default)]
pub struct Model {
    arena: Vec<Patch>,
    live: Vec<PatchId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one live patch per shape, in iteration order
    pub fn from_shapes(shapes: impl IntoIterator<Item = Polygon>) -> Self {
        let mut model = Self::new();
        for shape in shapes {
            model.add_patch(shape);
        }
        model
    }

    /// Create a patch and append it to the registry
    pub fn add_patch(&mut self, shape: Polygon) -> PatchId {
        let id = self.create_patch(shape);
        self.live.push(id);
        id
    }

    /// Create a patch without registering it; pair with [`Model::replace`]
    pub fn create_patch(&mut self, shape: Polygon) -> PatchId {
        let id = PatchId::new(self.arena.len() as u32);
        self.arena.push(Patch::new(shape));
        id
    }

    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.arena.get(id.index())
    }

    pub fn get(&self, id: PatchId) -> Result<&Patch> {
        self.patch(id).ok_or(GeomError::UnknownPatch(id))
    }

    /// Mutable access to flags; the shape stays under the model's control
    pub fn patch_mut(&mut self, id: PatchId) -> Option<&mut Patch> {
        self.arena.get_mut(id.index())
    }

    /// Live patches in registry order
    pub fn patches(&self) -> &[PatchId] {
        &self.live
    }

    pub fn iter(&self) -> impl Iterator<Item = (PatchId, &Patch)> + '_ {
        self.live.iter().map(move |&id| (id, &self.arena[id.index()]))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_live(&self, id: PatchId) -> bool {
        self.live.contains(&id)
    }

    /// Swap `old` for `new` at the same registry position.
    ///
    /// Silently does nothing when `old` is not live.
    pub fn replace(&mut self, old: PatchId, new: &[PatchId]) {
        if let Some(index) = self.live.iter().position(|&id| id == old) {
            self.live.splice(index..=index, new.iter().copied());
            debug!(?old, ?new, index, "replaced patch");
        }
    }

    /// Move a shared vertex in every live patch that has it.
    ///
    /// Neighbouring patches share corner coordinates; this keeps them
    /// coherent when a pass relocates a corner. Returns the number of
    /// patches touched.
    pub fn move_vertex(&mut self, old: Point, new: Point) -> usize {
        if old == new {
            return 0;
        }
        let mut moved = 0;
        for &id in &self.live {
            if self.arena[id.index()].shape.replace_vertex(old, new) {
                moved += 1;
            }
        }
        moved
    }

    /// Live patches having `v` as a vertex
    pub fn patch_by_vertex(&self, v: Point) -> Vec<PatchId> {
        self.iter()
            .filter(|(_, p)| p.shape.has_vertex(v))
            .map(|(id, _)| id)
            .collect()
    }

    /// Patch on the other side of the edge starting at `v` in `patch`
    pub fn get_neighbour(&self, patch: PatchId, v: Point) -> Result<Option<PatchId>> {
        let next = self.get(patch)?.shape.next(v)?;
        Ok(self
            .iter()
            .find(|(_, p)| p.shape.find_directed_edge(next, v).is_some())
            .map(|(id, _)| id))
    }

    /// Live patches sharing at least one edge with `patch`
    pub fn get_neighbours(&self, patch: PatchId) -> Result<Vec<PatchId>> {
        let shape = &self.get(patch)?.shape;
        Ok(self
            .iter()
            .filter(|(id, p)| *id != patch && p.shape.borders(shape))
            .map(|(id, _)| id)
            .collect())
    }

    /// Inside the city and either walled in or surrounded by city patches
    pub fn is_enclosed(&self, patch: PatchId) -> Result<bool> {
        let p = self.get(patch)?;
        if !p.within_city {
            return Ok(false);
        }
        if p.within_walls {
            return Ok(true);
        }
        let neighbours = self.get_neighbours(patch)?;
        Ok(neighbours
            .iter()
            .all(|&n| self.arena[n.index()].within_city))
    }

    /// Outer boundary of a patch set.
    ///
    /// Traces the edges no other patch of the set runs back along. If they
    /// do not form one closed loop (holes, disconnected sets) the convex hull
    /// of all vertices is used instead.
    pub fn find_circumference(&self, patches: &[PatchId]) -> Result<Polygon> {
        let shapes = patches
            .iter()
            .map(|&id| self.get(id).map(|p| &p.shape))
            .collect::<Result<Vec<&Polygon>>>()?;

        match shapes.as_slice() {
            [] => {
                return Err(GeomError::DegenerateGeometry(
                    "circumference of an empty patch set".into(),
                ))
            }
            [only] => return Ok((*only).clone()),
            _ => {}
        }

        let mut starts = Vec::new();
        let mut ends = Vec::new();
        for w1 in &shapes {
            for (a, b) in w1.edges() {
                let inner = shapes.iter().any(|w2| w2.find_directed_edge(b, a).is_some());
                if !inner {
                    starts.push(a);
                    ends.push(b);
                }
            }
        }

        if !starts.is_empty() {
            let mut ring = Vec::with_capacity(starts.len());
            let mut index = 0;
            loop {
                ring.push(starts[index]);
                match starts.iter().position(|p| *p == ends[index]) {
                    Some(next) => index = next,
                    None => break,
                }
                if index == 0 || ring.len() > starts.len() {
                    break;
                }
            }

            if index == 0 && ring.len() == starts.len() && ring.len() >= 3 {
                return Ok(Polygon::new(ring).into_counter_clockwise());
            }
        }

        debug!(
            patches = patches.len(),
            outer_edges = starts.len(),
            "outer edges do not form one loop, using convex hull"
        );
        let all: Vec<Point> = shapes
            .iter()
            .flat_map(|s| s.vertices().iter().copied())
            .collect();
        Ok(Polygon::convex_hull(&all))
    }
}
