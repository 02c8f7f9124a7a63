// World access for the pathfinder.
//
// `BlockView` is the seam between the engine and whatever stores blocks. It
// answers synchronous, side-effect-free queries: the block and fluid at a
// cell, the world's vertical floor, its sea level, and whether a box is free
// of collisions. A world may also hand out a `PathTypeCache`; when it does,
// the classifier reads raw classifications through it.
//
// `VoxelWorld` is a dense reference implementation used by the tests, the
// bench and the demo. Storage is a flat `Vec<BlockState>` indexed by
// `x + z * size_x + y * size_x * size_z` relative to the world's origin.
// Out-of-bounds reads return air; out-of-bounds writes are no-ops. Every
// write invalidates the written cell in the attached cache.
//
// The cache sits in a `RefCell`, so a `VoxelWorld` is not `Sync`. Sharing
// one world (and its cache) between threads needs an external lock or one
// world per thread.
//
// See also: `cache.rs` for the cache, `classify.rs` for its consumer,
// `block.rs` for collision heights.

use crate::block::BlockState;
use crate::cache::PathTypeCache;
use crate::types::{Aabb, BlockPos};
use std::cell::RefCell;

/// Read-only view of a block world.
pub trait BlockView {
    /// Block and fluid occupying `pos`.
    fn block_state(&self, pos: BlockPos) -> BlockState;

    /// Lowest buildable Y. Cells below it are treated as the void.
    fn min_build_height(&self) -> i32;

    fn sea_level(&self) -> i32;

    /// True when no block collision shape overlaps `aabb`.
    fn no_collision(&self, aabb: &Aabb) -> bool {
        blocks_clear(self, aabb)
    }

    /// Long-lived raw classification cache, if the world keeps one.
    fn path_type_cache(&self) -> Option<&RefCell<PathTypeCache>> {
        None
    }
}

/// Collision test built on `block_state` and per-block collision heights.
///
/// Scans one extra layer below the box because fences and walls reach 1.5
/// blocks up into the cell above them.
pub fn blocks_clear<W: BlockView + ?Sized>(world: &W, aabb: &Aabb) -> bool {
    let x0 = aabb.min_x.floor() as i32;
    let x1 = aabb.max_x.ceil() as i32;
    let y0 = aabb.min_y.floor() as i32 - 1;
    let y1 = aabb.max_y.ceil() as i32;
    let z0 = aabb.min_z.floor() as i32;
    let z1 = aabb.max_z.ceil() as i32;
    for y in y0..y1 {
        for z in z0..z1 {
            for x in x0..x1 {
                let height = world.block_state(BlockPos::new(x, y, z)).collision_height();
                if height <= 0.0 {
                    continue;
                }
                let (fx, fy, fz) = (x as f64, y as f64, z as f64);
                let shape = Aabb::new(fx, fy, fz, fx + 1.0, fy + height, fz + 1.0);
                if shape.intersects(aabb) {
                    return false;
                }
            }
        }
    }
    true
}

/// Height an agent standing in `pos` would have its feet at: the top of the
/// collision shape of the block below.
pub fn floor_level<W: BlockView + ?Sized>(world: &W, pos: BlockPos) -> f64 {
    let below = pos.below();
    below.y as f64 + world.block_state(below).collision_height()
}

// ---------------------------------------------------------------------------
// Dense reference world
// ---------------------------------------------------------------------------

/// Dense 3D block grid with an attached classification cache.
#[derive(Clone, Debug, Default)]
pub struct VoxelWorld {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    blocks: Vec<BlockState>,
    /// World coordinates of the storage's (0, 0, 0) cell.
    pub origin: BlockPos,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub sea_level: i32,
    cache: RefCell<PathTypeCache>,
}

impl VoxelWorld {
    /// Create a world filled with air, spanning `size` cells from `origin`.
    pub fn new(origin: BlockPos, size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            blocks: vec![BlockState::AIR; total],
            origin,
            size_x,
            size_y,
            size_z,
            sea_level: origin.y + size_y as i32 / 2,
            cache: RefCell::new(PathTypeCache::new()),
        }
    }

    pub fn with_sea_level(mut self, sea_level: i32) -> Self {
        self.sea_level = sea_level;
        self
    }

    fn index(&self, pos: BlockPos) -> Option<usize> {
        let x = pos.x - self.origin.x;
        let y = pos.y - self.origin.y;
        let z = pos.z - self.origin.z;
        if x < 0
            || y < 0
            || z < 0
            || x as u32 >= self.size_x
            || y as u32 >= self.size_y
            || z as u32 >= self.size_z
        {
            return None;
        }
        let sx = self.size_x as usize;
        let sz = self.size_z as usize;
        Some(x as usize + z as usize * sx + y as usize * sx * sz)
    }

    /// Read a cell. Returns air for out-of-bounds coordinates.
    pub fn get(&self, pos: BlockPos) -> BlockState {
        self.index(pos)
            .map(|i| self.blocks[i])
            .unwrap_or(BlockState::AIR)
    }

    /// Write a cell and invalidate its cached classification. No-op for
    /// out-of-bounds coordinates.
    pub fn set(&mut self, pos: BlockPos, state: BlockState) {
        if let Some(i) = self.index(pos) {
            self.blocks[i] = state;
            self.cache.get_mut().invalidate(pos);
        }
    }

    /// Fill the inclusive box between two corners.
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, state: BlockState) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for z in from.z.min(to.z)..=from.z.max(to.z) {
                for x in from.x.min(to.x)..=from.x.max(to.x) {
                    self.set(BlockPos::new(x, y, z), state);
                }
            }
        }
    }
}

impl BlockView for VoxelWorld {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        self.get(pos)
    }

    fn min_build_height(&self) -> i32 {
        self.origin.y
    }

    fn sea_level(&self) -> i32 {
        self.sea_level
    }

    fn path_type_cache(&self) -> Option<&RefCell<PathTypeCache>> {
        Some(&self.cache)
    }
}
