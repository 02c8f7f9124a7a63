// Ground locomotion: walking, stepping up, dropping down.
//
// From a node the agent may move to the four cardinal cells and the four
// diagonal cells at the same height. Each candidate is resolved by
// `find_accepted_node`:
//
// - A cell whose floor is higher than the agent can jump is rejected.
// - An acceptable cell (malus ≥ 0) becomes a node; walkable cells are
//   accepted as they are.
// - A forbidden or missing cell is retried one block up, as long as the
//   step budget allows and the terrain isn't something one cannot climb
//   onto (fences for most agents, unpassable rails, trapdoors, powder
//   snow). Narrow agents also need headroom for the step.
// - Open air is scanned downward for ground, up to `max_fall_distance`.
// - Sinking agents in water are carried down to the bottom of the column.
// - A fence or closed door with no node becomes a closed node so nothing
//   else tries it.
//
// A diagonal is only tried when both flanking cardinals resolved to nodes
// no higher than the current one, neither is a walkable door, and both are
// allowed (two fences still let agents narrower than half a block squeeze
// between them). This stops agents cutting corners through walls.
//
// The amphibious evaluator reuses all of this with `amphibious` set, which
// switches the single-cell classifier to the water-aware variant and
// treats water cells like walkable ones.

use crate::agent::Agent;
use crate::classify::{amphibious_path_type, walkable_path_type};
use crate::evaluator::{
    EvaluatorBase, EvaluatorSettings, FootprintRules, Neighbors, SearchContext, blocked_node,
    closed_node, is_open_candidate, node_with_cost,
};
use crate::node::{NodeId, NodePool};
use crate::path_type::PathType;
use crate::types::{Aabb, BlockPos, Direction};
use crate::world::{self, BlockView};

#[derive(Debug)]
pub struct GroundEvaluator {
    pub(crate) base: EvaluatorBase,
    amphibious: bool,
}

fn cell_type<W: BlockView + ?Sized>(world: &W, pos: BlockPos, amphibious: bool) -> PathType {
    if amphibious {
        amphibious_path_type(world, pos)
    } else {
        walkable_path_type(world, pos)
    }
}

/// Highest floor difference a step or jump can clear.
fn jump_height(agent: &Agent) -> f64 {
    (agent.capabilities.max_up_step as f64).max(1.125)
}

impl GroundEvaluator {
    pub fn new(settings: EvaluatorSettings) -> Self {
        Self {
            base: EvaluatorBase::new(settings),
            amphibious: false,
        }
    }

    pub(crate) fn amphibious(settings: EvaluatorSettings) -> Self {
        Self {
            base: EvaluatorBase::new(settings),
            amphibious: true,
        }
    }

    pub(crate) fn prepare(&mut self, agent: &Agent) {
        self.base.prepare(agent);
    }

    pub(crate) fn done(&mut self) {
        self.base.done();
    }

    /// Agent-relative classification of the footprint at `pos`, cached for
    /// the rest of the search.
    pub(crate) fn path_type<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pos: BlockPos,
    ) -> PathType {
        if let Some(&t) = self.base.type_cache.get(&pos) {
            return t;
        }
        let amphibious = self.amphibious;
        let t = self
            .base
            .classify_footprint(ctx, pos, FootprintRules::Walking, |p| {
                cell_type(ctx.world, p, amphibious)
            });
        self.base.type_cache.insert(pos, t);
        t
    }

    /// Height of the agent's feet when standing in `pos`. Floating agents
    /// ride half a block up in water.
    pub(crate) fn floor_level<W: BlockView + ?Sized>(
        &self,
        ctx: SearchContext<'_, W>,
        pos: BlockPos,
    ) -> f64 {
        let floats = ctx.agent.capabilities.can_float || self.amphibious;
        if floats && ctx.world.block_state(pos).is_water() {
            pos.y as f64 + 0.5
        } else {
            world::floor_level(ctx.world, pos)
        }
    }

    /// How many blocks the agent may climb from a node of type `here` with
    /// `above` over its head.
    pub(crate) fn step_limit<W: BlockView + ?Sized>(
        &self,
        ctx: SearchContext<'_, W>,
        above: PathType,
        here: PathType,
    ) -> i32 {
        if ctx.malus(above) >= 0.0 && here != PathType::StickyHoney {
            ctx.agent.capabilities.max_up_step.max(1.0).floor() as i32
        } else {
            0
        }
    }

    fn can_start_at<W: BlockView + ?Sized>(&mut self, ctx: SearchContext<'_, W>, pos: BlockPos) -> bool {
        let t = self.path_type(ctx, pos);
        t != PathType::Open && ctx.malus(t) >= 0.0
    }

    pub(crate) fn start_pos<W: BlockView + ?Sized>(&mut self, ctx: SearchContext<'_, W>) -> BlockPos {
        let agent = ctx.agent;
        let (x, y, z) = agent.position();
        let block = agent.block_pos();
        let mut level = block.y;

        if agent.capabilities.can_float && agent.in_water {
            while ctx.world.block_state(BlockPos::new(block.x, level, block.z)).is_water() {
                level += 1;
            }
            level -= 1;
        } else if agent.on_ground {
            level = (y + 0.5).floor() as i32;
        } else {
            let min = ctx.world.min_build_height();
            let mut probe = BlockPos::containing(x, y + 1.0, z);
            while probe.y > min {
                level = probe.y;
                probe = probe.below();
                let state = ctx.world.block_state(probe);
                if !state.is_air() && !state.is_pathfindable_for_land() {
                    break;
                }
            }
        }

        let anchor = BlockPos::new(block.x, level, block.z);
        if !self.can_start_at(ctx, anchor) {
            let bb = agent.bounding_box;
            let corners = [
                (bb.min_x, bb.min_z),
                (bb.min_x, bb.max_z),
                (bb.max_x, bb.min_z),
                (bb.max_x, bb.max_z),
            ];
            for (cx, cz) in corners {
                let corner = BlockPos::containing(cx, level as f64, cz);
                if self.can_start_at(ctx, corner) {
                    log::trace!("start {anchor} unusable, starting from corner {corner}");
                    return corner;
                }
            }
        }
        anchor
    }

    pub(crate) fn get_neighbors<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        node: NodeId,
        out: &mut Neighbors,
    ) {
        let pos = pool[node].pos;
        let above = self.path_type(ctx, pos.above());
        let here = self.path_type(ctx, pos);
        let limit = self.step_limit(ctx, above, here);
        let node_floor = self.floor_level(ctx, pos);

        let mut cardinals = [None; 4];
        for (i, dir) in Direction::HORIZONTAL.into_iter().enumerate() {
            let candidate =
                self.find_accepted_node(ctx, pool, pos.relative(dir), limit, node_floor, dir, here);
            cardinals[i] = candidate;
            if is_open_candidate(pool, candidate) {
                out.extend(candidate);
            }
        }

        for (i, dir) in Direction::HORIZONTAL.into_iter().enumerate() {
            let side = dir.clockwise();
            if !self.is_diagonal_valid(ctx, pool, node, cardinals[i], cardinals[(i + 1) % 4]) {
                continue;
            }
            let target = pos.relative(dir).relative(side);
            let candidate = self.find_accepted_node(ctx, pool, target, limit, node_floor, dir, here);
            if let Some(id) = candidate {
                let n = &pool[id];
                if !n.closed && n.path_type != PathType::WalkableDoor && n.cost_malus >= 0.0 {
                    out.push(id);
                }
            }
        }
    }

    fn is_diagonal_valid<W: BlockView + ?Sized>(
        &self,
        ctx: SearchContext<'_, W>,
        pool: &NodePool,
        root: NodeId,
        a: Option<NodeId>,
        b: Option<NodeId>,
    ) -> bool {
        let (Some(a), Some(b)) = (a, b) else {
            return false;
        };
        let root_y = pool[root].pos.y;
        let (a, b) = (&pool[a], &pool[b]);
        if a.pos.y > root_y || b.pos.y > root_y {
            return false;
        }
        if a.path_type == PathType::WalkableDoor || b.path_type == PathType::WalkableDoor {
            return false;
        }
        let fence_gap = a.path_type == PathType::Fence
            && b.path_type == PathType::Fence
            && ctx.agent.bb_width() < 0.5;
        (a.cost_malus >= 0.0 || fence_gap) && (b.cost_malus >= 0.0 || fence_gap)
    }

    /// Resolve the cell at `pos` into the node the agent would actually end
    /// up in, or `None` if it can't go there.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn find_accepted_node<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        pos: BlockPos,
        limit: i32,
        node_floor: f64,
        dir: Direction,
        from: PathType,
    ) -> Option<NodeId> {
        if self.floor_level(ctx, pos) - node_floor > jump_height(ctx.agent) {
            return None;
        }
        let t = self.path_type(ctx, pos);
        let malus = ctx.malus(t);
        let mut node = (malus >= 0.0).then(|| node_with_cost(pool, pos, t, malus));

        if from.has_partial_collision()
            && node.is_some_and(|id| pool[id].cost_malus >= 0.0)
            && !self.can_reach_without_collision(ctx, pos)
        {
            node = None;
        }

        if t == PathType::Walkable || (self.amphibious && t == PathType::Water) {
            return node;
        }

        let caps = &ctx.agent.capabilities;
        let forbidden = node.is_none_or(|id| pool[id].cost_malus < 0.0);
        let climbable = (t != PathType::Fence || caps.can_walk_over_fences)
            && !matches!(
                t,
                PathType::UnpassableRail | PathType::Trapdoor | PathType::PowderSnow
            );
        if forbidden && limit > 0 && climbable {
            self.try_jump_on(ctx, pool, pos, limit, node_floor, dir, from)
        } else if !self.amphibious && t == PathType::Water && !caps.can_float {
            self.first_non_water_below(ctx, pool, pos, node)
        } else if t == PathType::Open {
            Some(self.first_ground_below(ctx, pool, pos))
        } else if t.has_partial_collision() && node.is_none() {
            Some(closed_node(pool, pos, t))
        } else {
            node
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn try_jump_on<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        pos: BlockPos,
        limit: i32,
        node_floor: f64,
        dir: Direction,
        from: PathType,
    ) -> Option<NodeId> {
        let above = self.find_accepted_node(ctx, pool, pos.above(), limit - 1, node_floor, dir, from)?;
        let width = ctx.agent.bb_width();
        if width >= 1.0 {
            return Some(above);
        }
        if !matches!(pool[above].path_type, PathType::Open | PathType::Walkable) {
            return Some(above);
        }

        // Headroom check: the agent's box, standing where it came from,
        // raised to the new floor.
        let (sx, _, sz) = dir.step();
        let cx = (pos.x - sx) as f64 + 0.5;
        let cz = (pos.z - sz) as f64 + 0.5;
        let half = width / 2.0;
        let from_cell = BlockPos::containing(cx, (pos.y + 1) as f64, cz);
        let landing = pool[above].pos;
        let bb = Aabb::new(
            cx - half,
            self.floor_level(ctx, from_cell) + 0.001,
            cz - half,
            cx + half,
            ctx.agent.bb_height() + self.floor_level(ctx, landing) - 0.002,
            cz + half,
        );
        ctx.world.no_collision(&bb).then_some(above)
    }

    fn first_non_water_below<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        pos: BlockPos,
        mut node: Option<NodeId>,
    ) -> Option<NodeId> {
        let min = ctx.world.min_build_height();
        let mut y = pos.y - 1;
        while y > min {
            let p = BlockPos::new(pos.x, y, pos.z);
            let t = self.path_type(ctx, p);
            if t != PathType::Water {
                return node;
            }
            let malus = ctx.malus(t);
            if malus < 0.0 {
                return Some(blocked_node(pool, p));
            }
            node = Some(node_with_cost(pool, p, t, malus));
            y -= 1;
        }
        node
    }

    fn first_ground_below<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        pos: BlockPos,
    ) -> NodeId {
        let min = ctx.world.min_build_height();
        let max_fall = ctx.agent.capabilities.max_fall_distance;
        let mut y = pos.y - 1;
        while y >= min {
            let p = BlockPos::new(pos.x, y, pos.z);
            if pos.y - y > max_fall {
                return blocked_node(pool, p);
            }
            let t = self.path_type(ctx, p);
            if t != PathType::Open {
                let malus = ctx.malus(t);
                return if malus >= 0.0 {
                    node_with_cost(pool, p, t, malus)
                } else {
                    blocked_node(pool, p)
                };
            }
            y -= 1;
        }
        blocked_node(pool, pos)
    }

    /// Sweep the agent's box from where it stands now toward `target` in
    /// box-sized steps, failing on the first collision.
    fn can_reach_without_collision<W: BlockView + ?Sized>(
        &self,
        ctx: SearchContext<'_, W>,
        target: BlockPos,
    ) -> bool {
        let bb = ctx.agent.bounding_box;
        let (ax, ay, az) = ctx.agent.position();
        let vx = target.x as f64 - ax + bb.x_size() / 2.0;
        let vy = target.y as f64 - ay + bb.y_size() / 2.0;
        let vz = target.z as f64 - az + bb.z_size() / 2.0;
        let length = (vx * vx + vy * vy + vz * vz).sqrt();
        let size = bb.size();
        if size <= 0.0 {
            return true;
        }
        let steps = (length / size).ceil() as i32;
        if steps <= 0 {
            return true;
        }
        let (sx, sy, sz) = (vx / steps as f64, vy / steps as f64, vz / steps as f64);
        let mut probe = bb;
        for _ in 0..steps {
            probe = probe.translated(sx, sy, sz);
            if !ctx.world.no_collision(&probe) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentProfile;
    use crate::block::{BlockKind, BlockState, DoorMaterial};
    use crate::world::VoxelWorld;

    /// Stone from y=0 to y=3; agents stand at y=4.
    fn floor_world() -> VoxelWorld {
        let mut world = VoxelWorld::new(BlockPos::new(-8, 0, -8), 16, 16, 16);
        world.fill(BlockPos::new(-8, 0, -8), BlockPos::new(7, 3, 7), BlockState::SOLID);
        world
    }

    fn neighbors_of(world: &VoxelWorld, agent: &Agent, pos: BlockPos) -> Vec<BlockPos> {
        let mut evaluator = GroundEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(agent);
        let ctx = SearchContext::new(world, agent);
        let mut pool = NodePool::new();
        let node = pool.get_or_create(pos);
        pool[node].path_type = evaluator.path_type(ctx, pos);
        let mut out = Neighbors::new();
        evaluator.get_neighbors(ctx, &mut pool, node, &mut out);
        evaluator.done();
        let mut positions: Vec<_> = out.iter().map(|&id| pool[id].pos).collect();
        positions.sort();
        positions
    }

    fn walker_at(x: i32, y: i32, z: i32) -> Agent {
        AgentProfile::walker().spawn(x as f64 + 0.5, y as f64, z as f64 + 0.5)
    }

    #[test]
    fn flat_ground_has_eight_neighbors() {
        let world = floor_world();
        let neighbors = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.iter().all(|p| p.y == 4));
    }

    #[test]
    fn wall_flank_removes_adjacent_diagonals() {
        let mut world = floor_world();
        world.fill(BlockPos::new(1, 4, 0), BlockPos::new(1, 6, 0), BlockState::SOLID);
        let neighbors = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert!(!neighbors.contains(&BlockPos::new(1, 4, 0)));
        assert!(!neighbors.contains(&BlockPos::new(1, 4, -1)));
        assert!(!neighbors.contains(&BlockPos::new(1, 4, 1)));
        assert!(neighbors.contains(&BlockPos::new(-1, 4, -1)));
        assert!(neighbors.contains(&BlockPos::new(-1, 4, 1)));
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn steps_up_one_block() {
        let mut world = floor_world();
        world.set(BlockPos::new(1, 4, 0), BlockState::SOLID);
        let neighbors = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert!(neighbors.contains(&BlockPos::new(1, 5, 0)));
        // A raised flank also rules out the diagonals next to it.
        assert!(!neighbors.contains(&BlockPos::new(1, 4, 1)));
    }

    #[test]
    fn low_ceiling_blocks_step_up() {
        let mut world = floor_world();
        world.set(BlockPos::new(1, 4, 0), BlockState::SOLID);
        world.set(BlockPos::new(0, 6, 0), BlockState::SOLID);
        let neighbors = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert!(!neighbors.contains(&BlockPos::new(1, 5, 0)));
    }

    #[test]
    fn fall_is_bounded_by_max_fall_distance() {
        let mut world = VoxelWorld::new(BlockPos::new(-4, 0, -4), 8, 12, 8);
        world.fill(BlockPos::new(-4, 0, -4), BlockPos::new(3, 0, 3), BlockState::SOLID);
        world.fill(BlockPos::new(0, 1, 0), BlockPos::new(0, 5, 0), BlockState::SOLID);
        let pillar_top = BlockPos::new(0, 6, 0);

        let cautious = walker_at(0, 6, 0);
        assert!(neighbors_of(&world, &cautious, pillar_top).is_empty());

        let mut profile = AgentProfile::walker();
        profile.capabilities.max_fall_distance = 10;
        let daring = profile.spawn(0.5, 6.0, 0.5);
        let neighbors = neighbors_of(&world, &daring, pillar_top);
        assert!(neighbors.contains(&BlockPos::new(1, 1, 0)));
        assert!(neighbors.iter().all(|p| p.y == 1));
    }

    #[test]
    fn doors_depend_on_capabilities() {
        let mut world = floor_world();
        world.fill(BlockPos::new(1, 4, -3), BlockPos::new(1, 6, 3), BlockState::SOLID);
        let door = BlockState::of(BlockKind::Door {
            material: DoorMaterial::Wood,
            open: false,
        });
        world.set(BlockPos::new(1, 4, 0), door);
        world.set(BlockPos::new(1, 5, 0), door);
        let doorway = BlockPos::new(1, 4, 0);

        let walker = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert!(!walker.contains(&doorway));

        let villager_agent = AgentProfile::villager().spawn(0.5, 4.0, 0.5);
        let villager = neighbors_of(&world, &villager_agent, BlockPos::new(0, 4, 0));
        assert!(villager.contains(&doorway));
        // Never cut diagonally past a door.
        assert!(!villager.contains(&BlockPos::new(1, 4, 1)));
    }

    #[test]
    fn fence_is_closed_not_climbed() {
        let mut world = floor_world();
        world.set(BlockPos::new(1, 4, 0), BlockState::of(BlockKind::Fence));
        let neighbors = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert!(!neighbors.contains(&BlockPos::new(1, 4, 0)));
        assert!(!neighbors.contains(&BlockPos::new(1, 5, 0)));
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn fence_walkers_step_over() {
        let mut world = floor_world();
        world.set(BlockPos::new(1, 4, 0), BlockState::of(BlockKind::Fence));
        let mut profile = AgentProfile::walker();
        profile.capabilities.can_walk_over_fences = true;
        profile.capabilities.max_up_step = 1.5;
        let agent = profile.spawn(0.5, 4.0, 0.5);
        let neighbors = neighbors_of(&world, &agent, BlockPos::new(0, 4, 0));
        assert!(neighbors.contains(&BlockPos::new(1, 5, 0)));
    }

    #[test]
    fn sticky_honey_prevents_stepping_up() {
        let mut world = floor_world();
        world.set(BlockPos::new(0, 3, 0), BlockState::of(BlockKind::HoneyBlock));
        world.set(BlockPos::new(1, 4, 0), BlockState::SOLID);
        let neighbors = neighbors_of(&world, &walker_at(0, 4, 0), BlockPos::new(0, 4, 0));
        assert!(!neighbors.contains(&BlockPos::new(1, 5, 0)));
        assert!(neighbors.contains(&BlockPos::new(-1, 4, 0)));
    }

    #[test]
    fn ground_start_on_floor() {
        let world = floor_world();
        let agent = walker_at(2, 4, -3);
        let mut evaluator = GroundEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&agent);
        assert_eq!(
            evaluator.start_pos(SearchContext::new(&world, &agent)),
            BlockPos::new(2, 4, -3)
        );
    }

    #[test]
    fn airborne_start_scans_down_to_ground() {
        let world = floor_world();
        let agent = walker_at(1, 9, 1).with_on_ground(false);
        let mut evaluator = GroundEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&agent);
        assert_eq!(
            evaluator.start_pos(SearchContext::new(&world, &agent)),
            BlockPos::new(1, 4, 1)
        );
    }

    #[test]
    fn floating_start_rises_to_the_surface() {
        let mut world = floor_world();
        world.fill(BlockPos::new(-2, 4, -2), BlockPos::new(2, 7, 2), BlockState::WATER);
        let agent = AgentProfile::villager()
            .spawn(0.5, 5.0, 0.5)
            .with_in_water(true)
            .with_on_ground(false);
        let mut evaluator = GroundEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&agent);
        assert_eq!(
            evaluator.start_pos(SearchContext::new(&world, &agent)),
            BlockPos::new(0, 7, 0)
        );
    }
}
