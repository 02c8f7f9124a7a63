// Terrain classifications and their default cost penalties.
//
// A `PathType` is the engine's view of a cell: what kind of terrain an agent
// would be moving through if it occupied it. Each type carries a default
// malus — the extra cost added to an edge that ends in such a cell. A
// negative malus marks the type as forbidden. Agents may override the
// defaults per type (see `agent.rs`).
//
// The variant order is significant: when an agent's footprint spans several
// cells, the evaluators pick the highest-malus type and break ties in favor
// of the later variant. `PathTypeSet` iterates in this order.
//
// See also: `classify.rs` for how cells are classified, `agent.rs` for the
// per-agent malus table.

use serde::{Deserialize, Serialize};

/// Terrain classification of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathType {
    Blocked,
    Open,
    Walkable,
    WalkableDoor,
    Trapdoor,
    PowderSnow,
    DangerPowderSnow,
    Fence,
    Lava,
    Water,
    WaterBorder,
    Rail,
    UnpassableRail,
    DangerFire,
    DamageFire,
    DangerOther,
    DamageOther,
    DoorOpen,
    DoorWoodClosed,
    DoorIronClosed,
    Breach,
    Leaves,
    StickyHoney,
    Cocoa,
    DamageCautious,
    DangerTrapdoor,
}

impl PathType {
    pub const COUNT: usize = 26;

    /// Every variant, in declaration order.
    pub const ALL: [PathType; PathType::COUNT] = [
        PathType::Blocked,
        PathType::Open,
        PathType::Walkable,
        PathType::WalkableDoor,
        PathType::Trapdoor,
        PathType::PowderSnow,
        PathType::DangerPowderSnow,
        PathType::Fence,
        PathType::Lava,
        PathType::Water,
        PathType::WaterBorder,
        PathType::Rail,
        PathType::UnpassableRail,
        PathType::DangerFire,
        PathType::DamageFire,
        PathType::DangerOther,
        PathType::DamageOther,
        PathType::DoorOpen,
        PathType::DoorWoodClosed,
        PathType::DoorIronClosed,
        PathType::Breach,
        PathType::Leaves,
        PathType::StickyHoney,
        PathType::Cocoa,
        PathType::DamageCautious,
        PathType::DangerTrapdoor,
    ];

    /// Position of the variant in `ALL`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Malus applied when the agent has no override for this type.
    pub const fn default_malus(self) -> f32 {
        match self {
            PathType::Blocked
            | PathType::PowderSnow
            | PathType::Fence
            | PathType::Lava
            | PathType::UnpassableRail
            | PathType::DamageOther
            | PathType::DoorWoodClosed
            | PathType::DoorIronClosed
            | PathType::Leaves => -1.0,
            PathType::Open
            | PathType::Walkable
            | PathType::WalkableDoor
            | PathType::Trapdoor
            | PathType::DangerPowderSnow
            | PathType::Rail
            | PathType::DoorOpen
            | PathType::Cocoa
            | PathType::DamageCautious
            | PathType::DangerTrapdoor => 0.0,
            PathType::Breach => 4.0,
            PathType::Water
            | PathType::WaterBorder
            | PathType::DangerFire
            | PathType::DangerOther
            | PathType::StickyHoney => 8.0,
            PathType::DamageFire => 16.0,
        }
    }

    /// Types whose block only partially fills the cell but still stops a
    /// walking agent: fences and closed doors. Leaving such a cell requires
    /// a clear sweep of the agent's bounding box.
    pub const fn has_partial_collision(self) -> bool {
        matches!(
            self,
            PathType::Fence | PathType::DoorWoodClosed | PathType::DoorIronClosed
        )
    }
}

/// A small set of path types, iterated in declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathTypeSet(u32);

impl PathTypeSet {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, t: PathType) {
        self.0 |= 1 << t.index();
    }

    pub const fn contains(&self, t: PathType) -> bool {
        self.0 & (1 << t.index()) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = PathType> + '_ {
        PathType::ALL.into_iter().filter(|t| self.contains(*t))
    }
}
