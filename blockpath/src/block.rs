// Block descriptors — what the world reports about a single cell.
//
// The engine never looks at block storage directly. A world collaborator
// answers `block_state(pos)` with a `BlockState`: the block occupying the
// cell plus the fluid in it (waterlogged fences, seagrass in water, and so
// on). Everything the classifier needs is derived from these two enums:
// collision height, whether the block burns, whether land or water agents
// can path through it.
//
// `BlockKind::Unknown` exists for worlds that cannot describe a block; it
// collides like a full cube and classifies as `Blocked`.
//
// See also: `classify.rs` for the mapping from `BlockState` to `PathType`,
// `world.rs` for the `BlockView` trait that serves these descriptors.

use serde::{Deserialize, Serialize};

/// Material of a door, deciding whether agents can open it by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorMaterial {
    Wood,
    Iron,
}

/// The block occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlockKind {
    #[default]
    Air,
    /// Any full, opaque cube (stone, dirt, planks).
    Solid,
    /// Bottom half slab.
    Slab,
    Fence,
    Wall,
    FenceGate {
        open: bool,
    },
    Door {
        material: DoorMaterial,
        open: bool,
    },
    Trapdoor {
        open: bool,
    },
    Rail,
    Leaves,
    Fire,
    Campfire {
        lit: bool,
    },
    MagmaBlock,
    Cactus,
    SweetBerryBush,
    WitherRose,
    PointedDripstone,
    PowderSnow,
    Cocoa,
    HoneyBlock,
    LilyPad,
    /// Non-colliding vegetation: grass, flowers, seagrass, kelp.
    Plant,
    /// A block that is itself a fluid (a water or lava source/flow).
    FluidBlock,
    /// A block the world could not describe.
    Unknown,
}

/// Fluid present in a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Fluid {
    #[default]
    Empty,
    Water,
    Lava,
}

/// Block + fluid descriptor for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockState {
    pub block: BlockKind,
    pub fluid: Fluid,
}

impl BlockState {
    pub const AIR: BlockState = BlockState::of(BlockKind::Air);
    pub const SOLID: BlockState = BlockState::of(BlockKind::Solid);
    pub const WATER: BlockState = BlockState {
        block: BlockKind::FluidBlock,
        fluid: Fluid::Water,
    };
    pub const LAVA: BlockState = BlockState {
        block: BlockKind::FluidBlock,
        fluid: Fluid::Lava,
    };

    /// A dry block with no fluid.
    pub const fn of(block: BlockKind) -> Self {
        Self {
            block,
            fluid: Fluid::Empty,
        }
    }

    /// The same block with water in it.
    pub const fn waterlogged(block: BlockKind) -> Self {
        Self {
            block,
            fluid: Fluid::Water,
        }
    }

    pub fn is_air(&self) -> bool {
        self.block == BlockKind::Air
    }

    pub fn is_water(&self) -> bool {
        self.fluid == Fluid::Water
    }

    pub fn is_lava(&self) -> bool {
        self.fluid == Fluid::Lava
    }

    pub fn is_rail(&self) -> bool {
        self.block == BlockKind::Rail
    }

    /// Height of the top of this block's collision shape above the cell's
    /// floor, in blocks. Zero means the block does not collide at all.
    /// Fences and walls reach 1.5 and so poke into the cell above.
    pub fn collision_height(&self) -> f64 {
        match self.block {
            BlockKind::Air
            | BlockKind::Rail
            | BlockKind::Fire
            | BlockKind::SweetBerryBush
            | BlockKind::WitherRose
            | BlockKind::PowderSnow
            | BlockKind::Plant
            | BlockKind::FluidBlock => 0.0,
            BlockKind::Solid
            | BlockKind::Leaves
            | BlockKind::MagmaBlock
            | BlockKind::Unknown => 1.0,
            BlockKind::Slab => 0.5,
            BlockKind::Fence | BlockKind::Wall => 1.5,
            BlockKind::FenceGate { open } => {
                if open {
                    0.0
                } else {
                    1.5
                }
            }
            BlockKind::Door { open, .. } => {
                if open {
                    0.0
                } else {
                    1.0
                }
            }
            BlockKind::Trapdoor { open } => {
                if open {
                    0.0
                } else {
                    0.1875
                }
            }
            BlockKind::Campfire { .. } => 0.4375,
            BlockKind::Cactus | BlockKind::HoneyBlock => 0.9375,
            BlockKind::PointedDripstone => 0.6875,
            BlockKind::Cocoa => 0.75,
            BlockKind::LilyPad => 0.09375,
        }
    }

    pub fn has_collision(&self) -> bool {
        self.collision_height() > 0.0
    }

    /// Whether the collision shape is a full unit cube.
    pub fn is_full_cube(&self) -> bool {
        matches!(
            self.block,
            BlockKind::Solid | BlockKind::Leaves | BlockKind::MagmaBlock | BlockKind::Unknown
        )
    }

    /// Whether a land agent may treat the cell as passable space.
    /// Lava is never passable. Slabs and campfires are solid enough to stand
    /// on but not to stand in; other blocks short of a full cube are passable.
    pub fn is_pathfindable_for_land(&self) -> bool {
        match self.block {
            BlockKind::FluidBlock => !self.is_lava(),
            BlockKind::Slab | BlockKind::Campfire { .. } => false,
            _ => !self.is_full_cube(),
        }
    }

    /// Whether a swimming agent may treat the cell as open water.
    pub fn is_pathfindable_for_water(&self) -> bool {
        self.is_water() && !self.is_full_cube()
    }

    /// Blocks that set agents on fire when touched.
    pub fn is_burning(&self) -> bool {
        matches!(
            self.block,
            BlockKind::Fire | BlockKind::MagmaBlock | BlockKind::Campfire { lit: true }
        ) || (self.block == BlockKind::FluidBlock && self.is_lava())
    }
}
