// Swimming locomotion: movement confined to water.
//
// Footprint classification ignores the walking rules entirely. A cell that
// is plain air counts as `Breach` (the surface), any other cell without
// water is `Blocked`, and a footprint of water cells is `Water` as long as
// its last cell is swimmable.
//
// Neighbors are the six faces plus the four horizontal diagonals. A
// diagonal needs both of its flanking faces to be enterable. Only `Water`
// cells are accepted, plus `Breach` cells for agents allowed to surface;
// a cell with no fluid at all costs `swim_breach_penalty` extra.

use crate::agent::Agent;
use crate::block::Fluid;
use crate::evaluator::{
    EvaluatorBase, EvaluatorSettings, Neighbors, SearchContext, has_malus, node_with_cost,
};
use crate::node::{NodeId, NodePool};
use crate::path_type::PathType;
use crate::types::{BlockPos, Direction};
use crate::world::BlockView;

#[derive(Debug)]
pub struct SwimmingEvaluator {
    pub(crate) base: EvaluatorBase,
    allow_breaching: bool,
}

impl SwimmingEvaluator {
    pub fn new(settings: EvaluatorSettings, allow_breaching: bool) -> Self {
        Self {
            base: EvaluatorBase::new(settings),
            allow_breaching,
        }
    }

    pub fn allow_breaching(&self) -> bool {
        self.allow_breaching
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
        let mut last = None;
        let mut result = None;
        for p in self.base.footprint(pos) {
            let state = ctx.world.block_state(p);
            if state.fluid == Fluid::Empty && state.is_air() {
                result = Some(PathType::Breach);
                break;
            }
            if !state.is_water() {
                result = Some(PathType::Blocked);
                break;
            }
            last = Some(state);
        }
        let t = result.unwrap_or_else(|| {
            if last.is_some_and(|s| s.is_pathfindable_for_water()) {
                PathType::Water
            } else {
                PathType::Blocked
            }
        });
        self.base.type_cache.insert(pos, t);
        t
    }

    pub(crate) fn start_pos<W: BlockView + ?Sized>(&mut self, ctx: SearchContext<'_, W>) -> BlockPos {
        let agent = ctx.agent;
        let bb = agent.bounding_box;
        let anchor = BlockPos::new(
            bb.min_x.floor() as i32,
            (bb.min_y + 0.5).floor() as i32,
            bb.min_z.floor() as i32,
        );
        let t = self.path_type(ctx, anchor);
        if ctx.malus(t) >= 0.0 {
            return anchor;
        }
        for candidate in self.base.start_candidates(agent) {
            let t = self.path_type(ctx, candidate);
            if ctx.malus(t) >= 0.0 {
                log::trace!("swimming start {anchor} unusable, using candidate {candidate}");
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
        let enterable = t == PathType::Water || (self.allow_breaching && t == PathType::Breach);
        if !enterable {
            return None;
        }
        let malus = ctx.malus(t);
        if malus < 0.0 {
            return None;
        }
        let penalty = if ctx.world.block_state(pos).fluid == Fluid::Empty {
            self.base.settings.swim_breach_penalty
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
        let mut faces = [None; 6];
        for (i, dir) in Direction::ALL.into_iter().enumerate() {
            let candidate = self.find_accepted_node(ctx, pool, pos.relative(dir));
            faces[i] = candidate;
            if candidate.is_some_and(|id| !pool[id].closed) {
                out.extend(candidate);
            }
        }

        // HORIZONTAL is the first four entries of ALL.
        for (i, dir) in Direction::HORIZONTAL.into_iter().enumerate() {
            if !has_malus(pool, faces[i]) || !has_malus(pool, faces[(i + 1) % 4]) {
                continue;
            }
            let candidate = self.find_accepted_node(ctx, pool, pos.relative(dir).relative(dir.clockwise()));
            if candidate.is_some_and(|id| !pool[id].closed) {
                out.extend(candidate);
            }
        }
    }
}
