// Core spatial types shared across the engine.
//
// Defines grid coordinates (`BlockPos`), axis-aligned bounding boxes (`Aabb`)
// used for agent bounds and collision probes, and the six grid directions
// (`Direction`). All types derive `Serialize`/`Deserialize` so configs, paths
// and test fixtures can be round-tripped through JSON.
//
// The coordinate system follows the usual block-world convention:
// - X: east  (positive) / west  (negative)
// - Y: up    (positive) / down  (negative)
// - Z: south (positive) / north (negative)
//
// See also: `node.rs` for the per-search `Node` keyed by `BlockPos`,
// `cache.rs` which hashes `BlockPos::as_long()` into cache slots.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Grid positions
// ---------------------------------------------------------------------------

/// A cell of the block grid. Each component is in block units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

const PACKED_X_BITS: u32 = 26;
const PACKED_Z_BITS: u32 = 26;
const PACKED_Y_BITS: u32 = 64 - PACKED_X_BITS - PACKED_Z_BITS;
const PACKED_X_OFFSET: u32 = PACKED_Y_BITS + PACKED_Z_BITS;
const PACKED_Z_OFFSET: u32 = PACKED_Y_BITS;

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing the given world-space point.
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self::new(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub const fn relative(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.step();
        self.offset(dx, dy, dz)
    }

    /// Manhattan (L1) distance between two cells.
    pub fn manhattan_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Squared straight-line distance between two cells.
    pub fn distance_sq(self, other: Self) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        let dz = (other.z - self.z) as f32;
        dx * dx + dy * dy + dz * dz
    }

    /// Straight-line (Euclidean) distance between two cells.
    pub fn distance_to(self, other: Self) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Pack the coordinate into a single `u64`: 26 bits of X, 26 bits of Z
    /// and 12 bits of Y. Coordinates outside those ranges wrap, so two
    /// distant cells can share a packed value; callers that key on it must
    /// tolerate collisions.
    pub fn as_long(self) -> u64 {
        let x = (self.x as i64 as u64) & ((1 << PACKED_X_BITS) - 1);
        let y = (self.y as i64 as u64) & ((1 << PACKED_Y_BITS) - 1);
        let z = (self.z as i64 as u64) & ((1 << PACKED_Z_BITS) - 1);
        (x << PACKED_X_OFFSET) | (z << PACKED_Z_OFFSET) | y
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// One of the six face directions of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    /// Horizontal directions in clockwise order starting at north.
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit step `(dx, dy, dz)` for this direction.
    pub const fn step(self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, 0, -1),
            Direction::East => (1, 0, 0),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
        }
    }

    /// The next horizontal direction clockwise (seen from above). Vertical
    /// directions are returned unchanged.
    pub const fn clockwise(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Bounding boxes
// ---------------------------------------------------------------------------

/// An axis-aligned box in world space (block units).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Aabb {
    /// Build a box from two opposite corners in any order.
    pub fn new(x0: f64, y0: f64, z0: f64, x1: f64, y1: f64, z1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            min_z: z0.min(z1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
            max_z: z0.max(z1),
        }
    }

    /// A box of the given footprint width and height standing on the point
    /// `(x, y, z)`, horizontally centered on it.
    pub fn standing_at(x: f64, y: f64, z: f64, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self::new(x - half, y, z - half, x + half, y + height, z + half)
    }

    pub fn x_size(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn y_size(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn z_size(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Mean edge length.
    pub fn size(&self) -> f64 {
        (self.x_size() + self.y_size() + self.z_size()) / 3.0
    }

    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            min_z: self.min_z + dz,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
            max_z: self.max_z + dz,
        }
    }

    /// True when the two boxes overlap with positive volume. Touching faces
    /// do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
            && self.min_z < other.max_z
            && self.max_z > other.min_z
    }

    pub fn is_finite(&self) -> bool {
        [
            self.min_x, self.min_y, self.min_z, self.max_x, self.max_y, self.max_z,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = BlockPos::new(0, 64, 0);
        let b = BlockPos::new(3, 60, -5);
        assert_eq!(a.manhattan_distance(b), 12);
        assert_eq!(b.manhattan_distance(a), 12);
    }

    #[test]
    fn euclidean_distance() {
        let a = BlockPos::new(0, 0, 0);
        assert_eq!(a.distance_to(BlockPos::new(3, 4, 0)), 5.0);
        assert!((a.distance_to(BlockPos::new(1, 0, 1)) - std::f32::consts::SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn containing_floors_negative_coordinates() {
        assert_eq!(BlockPos::containing(-0.5, 63.9, 2.0), BlockPos::new(-1, 63, 2));
    }

    #[test]
    fn packed_long_distinguishes_neighbors() {
        let origin = BlockPos::new(0, 64, 0);
        let mut seen = std::collections::BTreeSet::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    assert!(seen.insert(origin.offset(dx, dy, dz).as_long()));
                }
            }
        }
    }

    #[test]
    fn packed_long_layout() {
        assert_eq!(BlockPos::new(0, 0, 0).as_long(), 0);
        assert_eq!(BlockPos::new(0, 1, 0).as_long(), 1);
        assert_eq!(BlockPos::new(0, 0, 1).as_long(), 1 << 12);
        assert_eq!(BlockPos::new(1, 0, 0).as_long(), 1 << 38);
    }

    #[test]
    fn clockwise_cycles_horizontals() {
        for (i, dir) in Direction::HORIZONTAL.iter().enumerate() {
            assert_eq!(dir.clockwise(), Direction::HORIZONTAL[(i + 1) % 4]);
        }
        assert_eq!(Direction::Up.clockwise(), Direction::Up);
    }

    #[test]
    fn standing_box_is_centered() {
        let bb = Aabb::standing_at(0.5, 64.0, 0.5, 0.6, 1.95);
        assert!((bb.min_x - 0.2).abs() < 1e-9);
        assert!((bb.max_x - 0.8).abs() < 1e-9);
        assert_eq!(bb.min_y, 64.0);
        assert!((bb.y_size() - 1.95).abs() < 1e-9);
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let b = a.translated(1.0, 0.0, 0.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&a.translated(0.5, 0.0, 0.0)));
    }
}
