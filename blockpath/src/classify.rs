// Cell classification: block descriptors → `PathType`.
//
// Classification happens in two layers.
//
// **Raw** (`raw_path_type`) looks at nothing but the block and fluid in the
// cell. It is cheap, position-independent, and is the only thing the
// world's long-lived `PathTypeCache` stores.
//
// **Refined** (`walkable_path_type`, `flying_path_type`,
// `amphibious_path_type`) starts from the raw type and, for open cells above
// the world floor, looks at the raw type of the cell below (is there a floor
// to stand on, and is it hazardous?) and at the raw types of the 24 lateral
// cells of the surrounding 3×3×3 box (is the cell next to fire, cacti,
// water?). Refinement reads only raw neighbor types, so it is exactly one
// level deep. Every raw read goes through `raw_at`, which uses the world's
// cache when it has one, so classifying the same cell twice costs zero world
// queries the second time.
//
// Agent-relative classification (footprint scans, door and rail rules) lives
// in the evaluators; see `evaluator/ground.rs` and `evaluator/swimming.rs`.

use crate::block::{BlockKind, BlockState, DoorMaterial};
use crate::path_type::PathType;
use crate::types::{BlockPos, Direction};
use crate::world::BlockView;

/// What the long-lived cache remembers about a cell: its raw type and
/// whether water is present. Waterlogged blocks keep their own raw type, so
/// the fluid is tracked separately for the water-border check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawCell {
    pub path_type: PathType,
    pub has_water: bool,
}

impl RawCell {
    pub fn of(state: &BlockState) -> Self {
        Self {
            path_type: raw_path_type(state),
            has_water: state.is_water(),
        }
    }
}

/// Classify a cell from its own block and fluid alone.
pub fn raw_path_type(state: &BlockState) -> PathType {
    match state.block {
        BlockKind::Air => return PathType::Open,
        BlockKind::Trapdoor { .. } | BlockKind::LilyPad => return PathType::Trapdoor,
        BlockKind::PowderSnow => return PathType::PowderSnow,
        BlockKind::Cactus | BlockKind::SweetBerryBush => return PathType::DamageOther,
        BlockKind::HoneyBlock => return PathType::StickyHoney,
        BlockKind::Cocoa => return PathType::Cocoa,
        BlockKind::WitherRose | BlockKind::PointedDripstone => return PathType::DamageCautious,
        _ => {}
    }
    if state.is_lava() {
        return PathType::Lava;
    }
    if state.is_burning() {
        return PathType::DamageFire;
    }
    match state.block {
        BlockKind::Door { open: true, .. } => PathType::DoorOpen,
        BlockKind::Door {
            material: DoorMaterial::Wood,
            open: false,
        } => PathType::DoorWoodClosed,
        BlockKind::Door {
            material: DoorMaterial::Iron,
            open: false,
        } => PathType::DoorIronClosed,
        BlockKind::Rail => PathType::Rail,
        BlockKind::Leaves => PathType::Leaves,
        BlockKind::Fence | BlockKind::Wall | BlockKind::FenceGate { open: false } => {
            PathType::Fence
        }
        _ if !state.is_pathfindable_for_land() => PathType::Blocked,
        _ if state.is_water() => PathType::Water,
        _ => PathType::Open,
    }
}

/// Raw classification of `pos`, read through the world's cache if present.
pub fn raw_at<W: BlockView + ?Sized>(world: &W, pos: BlockPos) -> PathType {
    raw_cell_at(world, pos).path_type
}

/// Raw type and water presence of `pos`, through the cache if present.
pub fn raw_cell_at<W: BlockView + ?Sized>(world: &W, pos: BlockPos) -> RawCell {
    match world.path_type_cache() {
        Some(cache) => cache
            .borrow_mut()
            .get_or_compute_cell(pos, |p| world.block_state(p)),
        None => RawCell::of(&world.block_state(pos)),
    }
}

/// Classification of a single cell for a walking agent.
pub fn walkable_path_type<W: BlockView + ?Sized>(world: &W, pos: BlockPos) -> PathType {
    let raw = raw_at(world, pos);
    if raw != PathType::Open || pos.y < world.min_build_height() + 1 {
        return raw;
    }
    match raw_at(world, pos.below()) {
        PathType::Open | PathType::Water | PathType::Lava | PathType::Walkable => PathType::Open,
        PathType::DamageFire => PathType::DamageFire,
        PathType::DamageOther => PathType::DamageOther,
        PathType::StickyHoney => PathType::StickyHoney,
        PathType::PowderSnow => PathType::DangerPowderSnow,
        PathType::DamageCautious => PathType::DamageCautious,
        PathType::Trapdoor => PathType::DangerTrapdoor,
        _ => neighbour_hazard(world, pos, PathType::Walkable),
    }
}

/// Scan the 24 lateral cells of the 3×3×3 box around `pos` for hazards.
/// Returns the danger variant of the first hazard found, or `fallback`.
pub fn neighbour_hazard<W: BlockView + ?Sized>(
    world: &W,
    pos: BlockPos,
    fallback: PathType,
) -> PathType {
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let cell = raw_cell_at(world, pos.offset(dx, dy, dz));
                match cell.path_type {
                    PathType::DamageOther => return PathType::DangerOther,
                    PathType::DamageFire | PathType::Lava => return PathType::DangerFire,
                    PathType::Water => return PathType::WaterBorder,
                    PathType::DamageCautious => return PathType::DamageCautious,
                    _ if cell.has_water => return PathType::WaterBorder,
                    _ => {}
                }
            }
        }
    }
    fallback
}

/// Classification of a single cell for a flying agent. `agent_pos` is the
/// cell the agent currently occupies; a fence directly below it does not
/// mark that cell as a fence.
pub fn flying_path_type<W: BlockView + ?Sized>(
    world: &W,
    pos: BlockPos,
    agent_pos: BlockPos,
) -> PathType {
    let mut path_type = raw_at(world, pos);
    if path_type == PathType::Open && pos.y >= world.min_build_height() + 1 {
        path_type = match raw_at(world, pos.below()) {
            PathType::DamageFire | PathType::Lava => PathType::DamageFire,
            PathType::DamageOther => PathType::DamageOther,
            PathType::Cocoa => PathType::Cocoa,
            PathType::Fence if pos != agent_pos => PathType::Fence,
            PathType::Fence => PathType::Open,
            PathType::Walkable | PathType::Open | PathType::Water => PathType::Open,
            _ => PathType::Walkable,
        };
    }
    if matches!(path_type, PathType::Walkable | PathType::Open) {
        path_type = neighbour_hazard(world, pos, path_type);
    }
    path_type
}

/// Classification of a single cell for an amphibious agent. Water touching
/// a blocked face is shoreline; dry cells classify as for walkers.
pub fn amphibious_path_type<W: BlockView + ?Sized>(world: &W, pos: BlockPos) -> PathType {
    if raw_at(world, pos) != PathType::Water {
        return walkable_path_type(world, pos);
    }
    let touches_blocked = Direction::ALL
        .iter()
        .any(|dir| raw_at(world, pos.relative(*dir)) == PathType::Blocked);
    if touches_blocked {
        PathType::WaterBorder
    } else {
        PathType::Water
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Fluid;
    use crate::cache::PathTypeCache;
    use crate::world::VoxelWorld;
    use std::cell::{Cell, RefCell};

    /// Wraps a `VoxelWorld` and counts block queries.
    struct CountingWorld {
        inner: VoxelWorld,
        queries: Cell<usize>,
    }

    impl BlockView for CountingWorld {
        fn block_state(&self, pos: BlockPos) -> BlockState {
            self.queries.set(self.queries.get() + 1);
            self.inner.block_state(pos)
        }
        fn min_build_height(&self) -> i32 {
            self.inner.min_build_height()
        }
        fn sea_level(&self) -> i32 {
            self.inner.sea_level()
        }
        fn path_type_cache(&self) -> Option<&RefCell<PathTypeCache>> {
            self.inner.path_type_cache()
        }
    }

    fn flat_world() -> VoxelWorld {
        let mut world = VoxelWorld::new(BlockPos::new(0, 0, 0), 16, 16, 16);
        world.fill(BlockPos::new(0, 0, 0), BlockPos::new(15, 1, 15), BlockState::SOLID);
        world
    }

    #[test]
    fn raw_classification_order() {
        assert_eq!(raw_path_type(&BlockState::AIR), PathType::Open);
        assert_eq!(raw_path_type(&BlockState::SOLID), PathType::Blocked);
        assert_eq!(raw_path_type(&BlockState::WATER), PathType::Water);
        assert_eq!(raw_path_type(&BlockState::LAVA), PathType::Lava);
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::Fire)),
            PathType::DamageFire
        );
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::MagmaBlock)),
            PathType::DamageFire
        );
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::LilyPad)),
            PathType::Trapdoor
        );
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::FenceGate { open: true })),
            PathType::Open
        );
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::Wall)),
            PathType::Fence
        );
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::Unknown)),
            PathType::Blocked
        );
        assert_eq!(
            raw_path_type(&BlockState::of(BlockKind::Slab)),
            PathType::Blocked
        );
    }

    #[test]
    fn doors_classify_by_material_and_state() {
        let door = |material, open| BlockState::of(BlockKind::Door { material, open });
        assert_eq!(
            raw_path_type(&door(DoorMaterial::Wood, false)),
            PathType::DoorWoodClosed
        );
        assert_eq!(
            raw_path_type(&door(DoorMaterial::Iron, false)),
            PathType::DoorIronClosed
        );
        assert_eq!(
            raw_path_type(&door(DoorMaterial::Iron, true)),
            PathType::DoorOpen
        );
    }

    #[test]
    fn waterlogged_blocks_keep_their_own_type() {
        assert_eq!(
            raw_path_type(&BlockState::waterlogged(BlockKind::Fence)),
            PathType::Fence
        );
        assert_eq!(
            raw_path_type(&BlockState::waterlogged(BlockKind::Plant)),
            PathType::Water
        );
        let lava_plant = BlockState {
            block: BlockKind::Plant,
            fluid: Fluid::Lava,
        };
        assert_eq!(raw_path_type(&lava_plant), PathType::Lava);
    }

    #[test]
    fn floor_makes_cell_walkable() {
        let world = flat_world();
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 2, 5)),
            PathType::Walkable
        );
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 3, 5)),
            PathType::Open
        );
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 1, 5)),
            PathType::Blocked
        );
    }

    #[test]
    fn nothing_below_the_world_floor_refines() {
        let world = VoxelWorld::new(BlockPos::new(0, 0, 0), 4, 4, 4);
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(1, 0, 1)),
            PathType::Open
        );
    }

    #[test]
    fn hazard_below_overrides_walkable() {
        let mut world = flat_world();
        world.set(BlockPos::new(5, 1, 5), BlockState::of(BlockKind::MagmaBlock));
        world.set(BlockPos::new(7, 1, 7), BlockState::of(BlockKind::HoneyBlock));
        world.set(BlockPos::new(9, 1, 9), BlockState::of(BlockKind::PowderSnow));
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 2, 5)),
            PathType::DamageFire
        );
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(7, 2, 7)),
            PathType::StickyHoney
        );
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(9, 2, 9)),
            PathType::DangerPowderSnow
        );
    }

    #[test]
    fn lateral_hazards_mark_danger() {
        let mut world = flat_world();
        world.set(BlockPos::new(4, 2, 5), BlockState::of(BlockKind::Cactus));
        world.set(BlockPos::new(10, 2, 10), BlockState::of(BlockKind::Fire));
        world.set(BlockPos::new(12, 1, 3), BlockState::WATER);
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 2, 5)),
            PathType::DangerOther
        );
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(11, 2, 11)),
            PathType::DangerFire
        );
        // Water one level down on a diagonal still counts.
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(13, 2, 4)),
            PathType::WaterBorder
        );
    }

    #[test]
    fn waterlogged_neighbors_mark_water_border() {
        let mut world = flat_world();
        world.set(BlockPos::new(4, 2, 5), BlockState::waterlogged(BlockKind::Slab));
        world.set(BlockPos::new(10, 2, 9), BlockState::waterlogged(BlockKind::Fence));
        world.set(BlockPos::new(13, 2, 13), BlockState::of(BlockKind::Slab));
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 2, 5)),
            PathType::WaterBorder
        );
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(10, 2, 10)),
            PathType::WaterBorder
        );
        // A dry slab is not water.
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(12, 2, 12)),
            PathType::Walkable
        );
    }

    #[test]
    fn vertical_column_is_not_a_neighbor() {
        let mut world = flat_world();
        world.set(BlockPos::new(5, 3, 5), BlockState::of(BlockKind::Fire));
        assert_eq!(
            walkable_path_type(&world, BlockPos::new(5, 2, 5)),
            PathType::Walkable
        );
    }

    #[test]
    fn second_classification_costs_no_world_queries() {
        let world = CountingWorld {
            inner: flat_world(),
            queries: Cell::new(0),
        };
        let pos = BlockPos::new(6, 2, 6);
        let mut slots = std::collections::BTreeSet::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    slots.insert(PathTypeCache::slot_index(pos.offset(dx, dy, dz)));
                }
            }
        }
        assert_eq!(slots.len(), 27, "test position must not self-collide");

        let first = walkable_path_type(&world, pos);
        assert!(world.queries.get() > 0);
        world.queries.set(0);
        let second = walkable_path_type(&world, pos);
        assert_eq!(first, second);
        assert_eq!(world.queries.get(), 0);
    }

    #[test]
    fn flying_ignores_fence_under_own_cell() {
        let mut world = flat_world();
        world.set(BlockPos::new(5, 2, 5), BlockState::of(BlockKind::Fence));
        let above = BlockPos::new(5, 3, 5);
        assert_eq!(flying_path_type(&world, above, above), PathType::Open);
        assert_eq!(
            flying_path_type(&world, above, BlockPos::new(0, 3, 0)),
            PathType::Fence
        );
    }

    #[test]
    fn flying_over_ground_is_walkable() {
        let world = flat_world();
        let agent = BlockPos::new(0, 5, 0);
        assert_eq!(
            flying_path_type(&world, BlockPos::new(5, 2, 5), agent),
            PathType::Walkable
        );
        assert_eq!(
            flying_path_type(&world, BlockPos::new(5, 4, 5), agent),
            PathType::Open
        );
    }

    #[test]
    fn amphibious_shoreline() {
        let mut world = flat_world();
        world.fill(BlockPos::new(2, 2, 2), BlockPos::new(8, 6, 8), BlockState::WATER);
        assert_eq!(
            amphibious_path_type(&world, BlockPos::new(5, 4, 5)),
            PathType::Water
        );
        // Bottom layer touches the stone floor.
        assert_eq!(
            amphibious_path_type(&world, BlockPos::new(5, 2, 5)),
            PathType::WaterBorder
        );
        assert_eq!(
            amphibious_path_type(&world, BlockPos::new(12, 2, 12)),
            PathType::Walkable
        );
    }
}
