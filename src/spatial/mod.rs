use glam::Vec3;

use crate::ecs::components::{BehaviorState, Personality};

/// Snapshot of a creature's state for cross-entity queries.
/// Stored alongside the spatial hash to avoid ECS lookups in hot paths.
#[derive(Debug, Clone, Copy)]
pub struct FenSnapshot {
    pub entity: hecs::Entity,
    pub pos: Vec3,
    pub vel: Vec3,
    pub state: BehaviorState,
    pub personality: Personality,
    pub radius: f32,
}

/// Spatial hash grid over the pasture plane (X/Z) for cheap neighbor queries.
///
/// Cell size must be at least the largest query radius — the 3x3 walk in
/// `query_neighbors` only guarantees coverage out to one cell width.
/// Uses multiplicative hash for even distribution.
pub struct SpatialHash {
    inv_cell_size: f32,
    table_size: usize,
    /// Each bucket holds snapshot indices. Pre-allocated, cleared each tick.
    buckets: Vec<Vec<u32>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            // Pre-allocate each bucket to avoid allocs during rebuild.
            buckets.push(Vec::with_capacity(8));
        }
        Self {
            inv_cell_size: 1.0 / cell_size,
            table_size,
            buckets,
        }
    }

    /// Clear all buckets. Call at start of each rebuild.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear(); // Keeps allocation.
        }
    }

    /// Insert a snapshot index at the given position.
    pub fn insert(&mut self, pos: Vec3, index: u32) {
        let hash = self.hash(pos);
        self.buckets[hash].push(index);
    }

    /// Query all indices in the same cell and 8 surrounding cells.
    pub fn query_neighbors(&self, pos: Vec3, mut callback: impl FnMut(u32)) {
        let (cx, cz) = self.cell_coords(pos);
        for dz in -1i32..=1 {
            for dx in -1i32..=1 {
                let hash = self.hash_cell(cx.wrapping_add(dx), cz.wrapping_add(dz));
                for &index in &self.buckets[hash] {
                    callback(index);
                }
            }
        }
    }

    fn cell_coords(&self, pos: Vec3) -> (i32, i32) {
        let cx = (pos.x * self.inv_cell_size).floor() as i32;
        let cz = (pos.z * self.inv_cell_size).floor() as i32;
        (cx, cz)
    }

    fn hash(&self, pos: Vec3) -> usize {
        let (cx, cz) = self.cell_coords(pos);
        self.hash_cell(cx, cz)
    }

    fn hash_cell(&self, cx: i32, cz: i32) -> usize {
        // Multiplicative spatial hash — good distribution for grid data.
        let h = (cx as u32).wrapping_mul(73856093) ^ (cz as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}
