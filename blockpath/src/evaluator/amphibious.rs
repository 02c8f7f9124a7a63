// Amphibious locomotion: walking on land, swimming in any direction in
// water.
//
// Built on the ground evaluator in its amphibious mode (water-aware cell
// classifier, water cells accepted like walkable ones, floor level at the
// water surface). On top of the ground moves, a node may move straight up
// or down into another water cell, except downward out of a trapdoor.
//
// For the duration of a search the agent's malus table is rewritten so
// water is free, land costs `amphibious_walkable_malus` and shoreline costs
// `amphibious_water_border_malus`. `done` puts the saved table back.
//
// Water nodes in the band within `amphibious_shallow_depth` of sea level
// cost one extra; agents with `prefers_shallow_swimming` pay that for the
// water below the band instead.

use crate::agent::{Agent, MalusTable};
use crate::evaluator::{
    EvaluatorSettings, GroundEvaluator, Neighbors, SearchContext, is_open_candidate,
};
use crate::node::{NodeId, NodePool};
use crate::path_type::PathType;
use crate::types::{BlockPos, Direction};
use crate::world::BlockView;

#[derive(Debug)]
pub struct AmphibiousEvaluator {
    ground: GroundEvaluator,
    saved_malus: Option<MalusTable>,
}

impl AmphibiousEvaluator {
    pub fn new(settings: EvaluatorSettings) -> Self {
        Self {
            ground: GroundEvaluator::amphibious(settings),
            saved_malus: None,
        }
    }

    pub(crate) fn prepare(&mut self, agent: &mut Agent) {
        self.ground.prepare(agent);
        let settings = &self.ground.base.settings;
        self.saved_malus = Some(agent.malus_table().clone());
        agent.set_malus(PathType::Water, 0.0);
        agent.set_malus(PathType::Walkable, settings.amphibious_walkable_malus);
        agent.set_malus(PathType::WaterBorder, settings.amphibious_water_border_malus);
    }

    pub(crate) fn done(&mut self, agent: &mut Agent) {
        if let Some(table) = self.saved_malus.take() {
            agent.replace_malus_table(table);
        }
        self.ground.done();
    }

    pub(crate) fn path_type<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pos: BlockPos,
    ) -> PathType {
        self.ground.path_type(ctx, pos)
    }

    pub(crate) fn start_pos<W: BlockView + ?Sized>(&mut self, ctx: SearchContext<'_, W>) -> BlockPos {
        if !ctx.agent.in_water {
            return self.ground.start_pos(ctx);
        }
        let bb = ctx.agent.bounding_box;
        BlockPos::new(
            bb.min_x.floor() as i32,
            (bb.min_y + 0.5).floor() as i32,
            bb.min_z.floor() as i32,
        )
    }

    pub(crate) fn get_neighbors<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        node: NodeId,
        out: &mut Neighbors,
    ) {
        let first_new = out.len();
        self.ground.get_neighbors(ctx, pool, node, out);

        let pos = pool[node].pos;
        let above = self.ground.path_type(ctx, pos.above());
        let here = self.ground.path_type(ctx, pos);
        let limit = self.ground.step_limit(ctx, above, here);
        let node_floor = self.ground.floor_level(ctx, pos);

        let up = self.ground.find_accepted_node(
            ctx,
            pool,
            pos.above(),
            (limit - 1).max(0),
            node_floor,
            Direction::Up,
            here,
        );
        let down = self.ground.find_accepted_node(
            ctx,
            pool,
            pos.below(),
            limit,
            node_floor,
            Direction::Down,
            here,
        );
        let is_water = |id: Option<NodeId>| {
            is_open_candidate(pool, id) && id.is_some_and(|id| pool[id].path_type == PathType::Water)
        };
        if is_water(up) {
            out.extend(up);
        }
        if is_water(down) && here != PathType::Trapdoor {
            out.extend(down);
        }

        let band_floor = ctx.world.sea_level() - self.ground.base.settings.amphibious_shallow_depth;
        let prefers_shallow = ctx.agent.capabilities.prefers_shallow_swimming;
        let penalized = ctx.malus(PathType::Water) + 1.0;
        for &id in &out[first_new..] {
            let n = &mut pool[id];
            if n.path_type != PathType::Water {
                continue;
            }
            let in_band = n.pos.y >= band_floor;
            if in_band != prefers_shallow {
                n.cost_malus = n.cost_malus.max(penalized);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentProfile;
    use crate::block::{BlockKind, BlockState};
    use crate::world::VoxelWorld;

    /// Stone floor up to y=2, water from y=3 to y=8, sea level 8.
    fn pond() -> VoxelWorld {
        let mut world = VoxelWorld::new(BlockPos::new(0, 0, 0), 16, 16, 16);
        world.fill(BlockPos::new(0, 0, 0), BlockPos::new(15, 2, 15), BlockState::SOLID);
        world.fill(BlockPos::new(0, 3, 0), BlockPos::new(15, 8, 15), BlockState::WATER);
        world
    }

    fn expand(
        world: &VoxelWorld,
        agent: &mut Agent,
        pos: BlockPos,
    ) -> (Vec<BlockPos>, NodePool) {
        let mut evaluator = AmphibiousEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(agent);
        let mut pool = NodePool::new();
        let node = pool.get_or_create(pos);
        let mut out = Neighbors::new();
        evaluator.get_neighbors(SearchContext::new(world, agent), &mut pool, node, &mut out);
        evaluator.done(agent);
        (out.iter().map(|&id| pool[id].pos).collect(), pool)
    }

    #[test]
    fn swims_straight_up_and_down() {
        let world = pond();
        let pos = BlockPos::new(8, 5, 8);
        let mut agent = AgentProfile::amphibian().spawn(8.5, 5.0, 8.5).with_in_water(true);
        let (neighbors, _) = expand(&world, &mut agent, pos);
        assert!(neighbors.contains(&pos.above()));
        assert!(neighbors.contains(&pos.below()));
        assert!(neighbors.contains(&pos.relative(Direction::East)));
    }

    #[test]
    fn water_near_the_surface_costs_one() {
        let world = pond();
        let pos = BlockPos::new(8, 5, 8);
        let mut agent = AgentProfile::amphibian().spawn(8.5, 5.0, 8.5).with_in_water(true);
        let (_, pool) = expand(&world, &mut agent, pos);
        let up = pool.get(pos.above()).unwrap();
        assert_eq!(pool[up].path_type, PathType::Water);
        assert_eq!(pool[up].cost_malus, 1.0);
    }

    #[test]
    fn shallow_swimmers_pay_only_for_deep_water() {
        let world = pond();
        let pos = BlockPos::new(8, 5, 8);
        let mut profile = AgentProfile::amphibian();
        profile.capabilities.prefers_shallow_swimming = true;
        let mut agent = profile.spawn(8.5, 5.0, 8.5).with_in_water(true);
        let (_, pool) = expand(&world, &mut agent, pos);
        let up = pool.get(pos.above()).unwrap();
        assert_eq!(pool[up].cost_malus, 0.0);
    }

    #[test]
    fn malus_table_is_restored_after_the_search() {
        let world = pond();
        let mut agent = AgentProfile::amphibian().spawn(8.5, 5.0, 8.5);
        let before = agent.malus_table().clone();

        let mut evaluator = AmphibiousEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&mut agent);
        assert_eq!(agent.malus_for(PathType::Water), 0.0);
        assert_eq!(agent.malus_for(PathType::Walkable), 6.0);
        assert_eq!(agent.malus_for(PathType::WaterBorder), 4.0);
        let _ = evaluator.path_type(SearchContext::new(&world, &agent), BlockPos::new(8, 5, 8));
        evaluator.done(&mut agent);

        assert_eq!(agent.malus_table(), &before);
    }

    #[test]
    fn never_dives_out_of_a_trapdoor() {
        let mut world = pond();
        let pos = BlockPos::new(8, 8, 8);
        let mut agent = AgentProfile::amphibian().spawn(8.5, 8.0, 8.5).with_in_water(true);
        let (neighbors, _) = expand(&world, &mut agent, pos);
        assert!(neighbors.contains(&pos.below()));

        world.set(pos, BlockState::waterlogged(BlockKind::Trapdoor { open: false }));
        let mut agent = AgentProfile::amphibian().spawn(8.5, 8.0, 8.5).with_in_water(true);
        let (neighbors, _) = expand(&world, &mut agent, pos);
        assert!(!neighbors.contains(&pos.below()));
    }

    #[test]
    fn start_in_water_uses_the_box_corner_cell() {
        let world = pond();
        let agent = AgentProfile::amphibian().spawn(4.5, 6.2, 4.5).with_in_water(true);
        let mut evaluator = AmphibiousEvaluator::new(EvaluatorSettings::default());
        let start = evaluator.start_pos(SearchContext::new(&world, &agent));
        assert_eq!(start, BlockPos::new(4, 6, 4));
    }
}
