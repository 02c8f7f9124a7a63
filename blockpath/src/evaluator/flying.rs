// Flying locomotion: free movement through the full 3×3×3 neighborhood.
//
// Every one of the 26 surrounding cells is a candidate: 6 faces, 12 edge
// diagonals and 8 corner diagonals. A diagonal is only offered when every
// lower-order cell it passes next to is passable too. An edge needs its two
// faces; a corner needs its three faces and three edges. That way a flyer
// never slips through the crack between two blocks, in any plane.
//
// Flyers prefer open air: a cell with ground directly under it
// (`Walkable`) costs `fly_walkable_penalty` on top of the agent's malus.
//
// Start: the cell at the agent's feet (rounded), or the first non-water
// cell above it for floating agents in water. If that cell is forbidden,
// fall back to the candidates from `EvaluatorBase::start_candidates`.

use crate::agent::Agent;
use crate::classify::flying_path_type;
use crate::evaluator::{
    EvaluatorBase, EvaluatorSettings, FootprintRules, Neighbors, SearchContext, has_malus,
    is_open_candidate, node_with_cost,
};
use crate::node::{NodeId, NodePool};
use crate::path_type::PathType;
use crate::types::BlockPos;
use crate::world::BlockView;

#[derive(Debug)]
pub struct FlyingEvaluator {
    pub(crate) base: EvaluatorBase,
}

type Grid = [[[Option<NodeId>; 3]; 3]; 3];

fn slot(grid: &Grid, dx: i32, dy: i32, dz: i32) -> Option<NodeId> {
    grid[(dx + 1) as usize][(dy + 1) as usize][(dz + 1) as usize]
}

impl FlyingEvaluator {
    pub fn new(settings: EvaluatorSettings) -> Self {
        Self {
            base: EvaluatorBase::new(settings),
        }
    }

    pub(crate) fn prepare(&mut self, agent: &Agent) {
        self.base.prepare(agent);
    }

    pub(crate) fn done(&mut self) {
        self.base.done();
    }

    pub(crate) fn path_type<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pos: BlockPos,
    ) -> PathType {
        if let Some(&t) = self.base.type_cache.get(&pos) {
            return t;
        }
        let agent_pos = self.base.agent_pos;
        let t = self
            .base
            .classify_footprint(ctx, pos, FootprintRules::Flying, |p| {
                flying_path_type(ctx.world, p, agent_pos)
            });
        self.base.type_cache.insert(pos, t);
        t
    }

    fn can_start_at<W: BlockView + ?Sized>(&mut self, ctx: SearchContext<'_, W>, pos: BlockPos) -> bool {
        let t = self.path_type(ctx, pos);
        ctx.malus(t) >= 0.0
    }

    pub(crate) fn start_pos<W: BlockView + ?Sized>(&mut self, ctx: SearchContext<'_, W>) -> BlockPos {
        let agent = ctx.agent;
        let block = agent.block_pos();
        let level = if agent.capabilities.can_float && agent.in_water {
            let mut level = block.y;
            while ctx.world.block_state(BlockPos::new(block.x, level, block.z)).is_water() {
                level += 1;
            }
            level
        } else {
            (agent.position().1 + 0.5).floor() as i32
        };

        let anchor = BlockPos::new(block.x, level, block.z);
        if self.can_start_at(ctx, anchor) {
            return anchor;
        }
        for candidate in self.base.start_candidates(agent) {
            if self.can_start_at(ctx, candidate) {
                log::trace!("flying start {anchor} unusable, using candidate {candidate}");
                return candidate;
            }
        }
        anchor
    }

    fn find_accepted_node<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        pos: BlockPos,
    ) -> Option<NodeId> {
        let t = self.path_type(ctx, pos);
        let malus = ctx.malus(t);
        if malus < 0.0 {
            return None;
        }
        let penalty = if t == PathType::Walkable {
            self.base.settings.fly_walkable_penalty
        } else {
            0.0
        };
        Some(node_with_cost(pool, pos, t, malus + penalty))
    }

    pub(crate) fn get_neighbors<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        node: NodeId,
        out: &mut Neighbors,
    ) {
        let pos = pool[node].pos;
        let mut grid = Grid::default();

        // Faces first, then edges, then corners, so every diagonal's
        // components are resolved before it is judged.
        for order in 1..=3 {
            for dx in -1..=1i32 {
                for dy in -1..=1i32 {
                    for dz in -1..=1i32 {
                        let nonzero = (dx != 0) as i32 + (dy != 0) as i32 + (dz != 0) as i32;
                        if nonzero != order {
                            continue;
                        }
                        let candidate = self.find_accepted_node(ctx, pool, pos.offset(dx, dy, dz));
                        grid[(dx + 1) as usize][(dy + 1) as usize][(dz + 1) as usize] = candidate;
                        let components_clear = (1..7u8).all(|mask| {
                            let (cx, cy, cz) = (
                                if mask & 1 != 0 { dx } else { 0 },
                                if mask & 2 != 0 { dy } else { 0 },
                                if mask & 4 != 0 { dz } else { 0 },
                            );
                            let is_self_or_empty =
                                (cx, cy, cz) == (dx, dy, dz) || (cx, cy, cz) == (0, 0, 0);
                            is_self_or_empty || has_malus(pool, slot(&grid, cx, cy, cz))
                        });
                        if components_clear && is_open_candidate(pool, candidate) {
                            out.extend(candidate);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentProfile;
    use crate::block::BlockState;
    use crate::world::VoxelWorld;

    fn sky() -> VoxelWorld {
        VoxelWorld::new(BlockPos::new(0, 0, 0), 16, 16, 16)
    }

    fn neighbors_of(world: &VoxelWorld, pos: BlockPos) -> (Vec<BlockPos>, NodePool) {
        let agent = AgentProfile::flyer().spawn(pos.x as f64 + 0.5, pos.y as f64, pos.z as f64 + 0.5);
        let mut evaluator = FlyingEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&agent);
        let ctx = SearchContext::new(world, &agent);
        let mut pool = NodePool::new();
        let node = pool.get_or_create(pos);
        let mut out = Neighbors::new();
        evaluator.get_neighbors(ctx, &mut pool, node, &mut out);
        evaluator.done();
        (out.iter().map(|&id| pool[id].pos).collect(), pool)
    }

    #[test]
    fn open_air_offers_all_26() {
        let world = sky();
        let (neighbors, _) = neighbors_of(&world, BlockPos::new(8, 8, 8));
        assert_eq!(neighbors.len(), 26);
    }

    #[test]
    fn faces_come_before_diagonals() {
        let world = sky();
        let center = BlockPos::new(8, 8, 8);
        let (neighbors, _) = neighbors_of(&world, center);
        assert!(neighbors[..6].iter().all(|p| p.manhattan_distance(center) == 1));
        assert!(neighbors[18..].iter().all(|p| p.manhattan_distance(center) == 3));
    }

    #[test]
    fn solid_face_blocks_every_diagonal_through_it() {
        let mut world = sky();
        let center = BlockPos::new(8, 8, 8);
        world.set(center.offset(1, 0, 0), BlockState::SOLID);
        let (neighbors, _) = neighbors_of(&world, center);
        assert_eq!(neighbors.len(), 17);
        assert!(neighbors.iter().all(|p| p.x <= center.x));
    }

    #[test]
    fn solid_edge_blocks_only_its_corners() {
        let mut world = sky();
        let center = BlockPos::new(8, 8, 8);
        world.set(center.offset(1, 1, 0), BlockState::SOLID);
        let (neighbors, _) = neighbors_of(&world, center);
        // The edge itself and its two corners are gone.
        assert_eq!(neighbors.len(), 23);
        assert!(!neighbors.contains(&center.offset(1, 1, 1)));
        assert!(!neighbors.contains(&center.offset(1, 1, -1)));
        assert!(neighbors.contains(&center.offset(1, 0, 1)));
    }

    #[test]
    fn cells_over_ground_pay_the_walkable_penalty() {
        let mut world = sky();
        let center = BlockPos::new(8, 8, 8);
        world.set(center.offset(0, -2, 0), BlockState::SOLID);
        let (_, pool) = neighbors_of(&world, center);
        let over_ground = pool.get(center.offset(0, -1, 0)).unwrap();
        assert_eq!(pool[over_ground].path_type, PathType::Walkable);
        assert_eq!(pool[over_ground].cost_malus, 1.0);
        let open = pool.get(center.offset(0, 1, 0)).unwrap();
        assert_eq!(pool[open].cost_malus, 0.0);
    }

    #[test]
    fn forbidden_water_is_never_offered() {
        let mut world = sky();
        let center = BlockPos::new(8, 8, 8);
        world.set(center.offset(0, 0, 1), BlockState::WATER);
        let (neighbors, _) = neighbors_of(&world, center);
        assert!(!neighbors.contains(&center.offset(0, 0, 1)));
    }

    #[test]
    fn start_rounds_feet_to_nearest_cell() {
        let world = sky();
        let agent = AgentProfile::flyer().spawn(3.5, 6.6, 3.5).with_on_ground(false);
        let mut evaluator = FlyingEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&agent);
        let start = evaluator.start_pos(SearchContext::new(&world, &agent));
        assert_eq!(start, BlockPos::new(3, 7, 3));
    }

    #[test]
    fn blocked_start_falls_back_to_a_nearby_cell() {
        let mut world = sky();
        world.set(BlockPos::new(3, 7, 3), BlockState::SOLID);
        let agent = AgentProfile::flyer().spawn(3.5, 6.6, 3.5).with_on_ground(false);
        let mut evaluator = FlyingEvaluator::new(EvaluatorSettings::default());
        evaluator.prepare(&agent);
        let start = evaluator.start_pos(SearchContext::new(&world, &agent));
        assert_ne!(start, BlockPos::new(3, 7, 3));
        assert!(start.manhattan_distance(BlockPos::new(3, 7, 3)) <= 6);
    }
}
