// Node evaluators: the locomotion models.
//
// An evaluator answers three questions for the search driver: where does
// the agent start, what kind of terrain is a cell for this agent, and which
// cells can it move to from a given node. There is one evaluator per
// `Locomotion` (ground, flying, swimming, amphibious), collected in the
// closed enum `NodeEvaluator` and dispatched with `match`.
//
// Lifecycle per search: `prepare(&mut agent)` → any number of `get_start`,
// `get_target`, `get_neighbors`, `get_path_type` calls → `done(&mut agent)`.
// The driver always calls `done`, including on early exits. `prepare` may
// rewrite entries of the agent's malus table (the amphibious evaluator
// does); `done` restores them.
//
// Each evaluator owns an `EvaluatorBase` holding what lives for exactly one
// search: the agent's footprint in cells, a position → agent-relative
// `PathType` cache, the agent's block position at prepare time, and a PRNG
// for start-candidate sampling, re-seeded at every prepare from the config
// seed and that position.
//
// Candidate nodes come from the driver's `NodePool`; evaluators create and
// annotate nodes (type, malus, closed) but never link them. A candidate
// whose malus for this agent is negative is never returned as a neighbor.
//
// See also: `ground.rs`, `flying.rs`, `swimming.rs`, `amphibious.rs` for
// the per-mode rules, `classify.rs` for single-cell classification,
// `pathfinder.rs` for the driver.

pub mod amphibious;
pub mod flying;
pub mod ground;
pub mod swimming;

pub use amphibious::AmphibiousEvaluator;
pub use flying::FlyingEvaluator;
pub use ground::GroundEvaluator;
pub use swimming::SwimmingEvaluator;

use crate::agent::{Agent, Locomotion};
use crate::config::PathfindingConfig;
use crate::node::{NodeId, NodePool, Target};
use crate::path_type::{PathType, PathTypeSet};
use crate::prng::SampleRng;
use crate::types::BlockPos;
use crate::world::BlockView;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Neighbor buffer. Flying fills at most 26 slots.
pub type Neighbors = SmallVec<[NodeId; 32]>;

/// What an evaluator may read during a search.
pub struct SearchContext<'a, W: BlockView + ?Sized> {
    pub world: &'a W,
    pub agent: &'a Agent,
}

impl<W: BlockView + ?Sized> Clone for SearchContext<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: BlockView + ?Sized> Copy for SearchContext<'_, W> {}

impl<'a, W: BlockView + ?Sized> SearchContext<'a, W> {
    pub fn new(world: &'a W, agent: &'a Agent) -> Self {
        Self { world, agent }
    }

    pub fn malus(&self, t: PathType) -> f32 {
        self.agent.malus_for(t)
    }
}

/// The subset of `PathfindingConfig` the evaluators read.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatorSettings {
    pub fly_walkable_penalty: f32,
    pub swim_breach_penalty: f32,
    pub amphibious_walkable_malus: f32,
    pub amphibious_water_border_malus: f32,
    pub amphibious_shallow_depth: i32,
    pub start_candidate_samples: u32,
    pub rng_seed: u64,
}

impl EvaluatorSettings {
    pub fn from_config(config: &PathfindingConfig) -> Self {
        Self {
            fly_walkable_penalty: config.fly_walkable_penalty,
            swim_breach_penalty: config.swim_breach_penalty,
            amphibious_walkable_malus: config.amphibious_walkable_malus,
            amphibious_water_border_malus: config.amphibious_water_border_malus,
            amphibious_shallow_depth: config.amphibious_shallow_depth,
            start_candidate_samples: config.start_candidate_samples,
            rng_seed: config.rng_seed,
        }
    }
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self::from_config(&PathfindingConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Shared per-search state
// ---------------------------------------------------------------------------

/// How a footprint scan resolves a mixed set of cell types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FootprintRules {
    /// Fences, then unpassable rails, win outright; wide agents never
    /// collapse to `Open`.
    Walking,
    /// Fences win outright; rails have no priority.
    Flying,
}

#[derive(Debug)]
pub(crate) struct EvaluatorBase {
    pub(crate) settings: EvaluatorSettings,
    /// Footprint in cells: floor(dimension + 1) on each axis.
    pub(crate) entity_width: i32,
    pub(crate) entity_height: i32,
    pub(crate) entity_depth: i32,
    /// Agent-relative classifications computed this search.
    pub(crate) type_cache: FxHashMap<BlockPos, PathType>,
    pub(crate) agent_pos: BlockPos,
    rng: SampleRng,
}

impl EvaluatorBase {
    pub(crate) fn new(settings: EvaluatorSettings) -> Self {
        let rng = SampleRng::from_seed(settings.rng_seed);
        Self {
            settings,
            entity_width: 1,
            entity_height: 1,
            entity_depth: 1,
            type_cache: FxHashMap::default(),
            agent_pos: BlockPos::new(0, 0, 0),
            rng,
        }
    }

    pub(crate) fn prepare(&mut self, agent: &Agent) {
        self.type_cache.clear();
        self.entity_width = (agent.bb_width() + 1.0).floor() as i32;
        self.entity_height = (agent.bb_height() + 1.0).floor() as i32;
        self.entity_depth = (agent.bounding_box.z_size() + 1.0).floor() as i32;
        self.agent_pos = agent.block_pos();
        let p = self.agent_pos;
        self.rng = SampleRng::for_search(
            self.settings.rng_seed,
            &[p.x as i64, p.y as i64, p.z as i64],
        );
    }

    pub(crate) fn done(&mut self) {
        self.type_cache.clear();
    }

    /// Cells covered by an agent whose minimum corner is at `pos`.
    pub(crate) fn footprint(&self, pos: BlockPos) -> impl Iterator<Item = BlockPos> + use<> {
        let (w, h, d) = (self.entity_width, self.entity_height, self.entity_depth);
        (0..w).flat_map(move |dx| {
            (0..h).flat_map(move |dy| (0..d).map(move |dz| pos.offset(dx, dy, dz)))
        })
    }

    /// Classify the agent's whole footprint at `pos`, given a single-cell
    /// classifier for this locomotion mode.
    pub(crate) fn classify_footprint<W: BlockView + ?Sized>(
        &self,
        ctx: SearchContext<'_, W>,
        pos: BlockPos,
        rules: FootprintRules,
        cell: impl Fn(BlockPos) -> PathType,
    ) -> PathType {
        let caps = &ctx.agent.capabilities;
        let mut types = PathTypeSet::new();
        for p in self.footprint(pos) {
            let mut t = cell(p);
            if t == PathType::DoorWoodClosed && caps.can_open_doors && caps.can_pass_doors {
                t = PathType::WalkableDoor;
            }
            if t == PathType::DoorOpen && !caps.can_pass_doors {
                t = PathType::Blocked;
            }
            if t == PathType::Rail
                && cell(self.agent_pos) != PathType::Rail
                && cell(self.agent_pos.below()) != PathType::Rail
            {
                t = PathType::UnpassableRail;
            }
            types.insert(t);
        }

        if types.contains(PathType::Fence) {
            return PathType::Fence;
        }
        if rules == FootprintRules::Walking && types.contains(PathType::UnpassableRail) {
            return PathType::UnpassableRail;
        }
        let mut best = PathType::Blocked;
        for t in types.iter() {
            let malus = ctx.malus(t);
            if malus < 0.0 {
                return t;
            }
            if malus >= ctx.malus(best) {
                best = t;
            }
        }
        let narrow = rules == FootprintRules::Flying || self.entity_width <= 1;
        if narrow && best != PathType::Open && ctx.malus(best) == 0.0 && cell(pos) == PathType::Open
        {
            PathType::Open
        } else {
            best
        }
    }

    /// Fallback start cells for flyers and swimmers whose anchor cell is
    /// forbidden. Agents at least one block across try the four corners of
    /// their box; smaller ones sample random cells around it.
    pub(crate) fn start_candidates(&mut self, agent: &Agent) -> Vec<BlockPos> {
        let bb = agent.bounding_box;
        let y = agent.block_pos().y;
        if bb.size() >= 1.0 {
            log::trace!("start fallback: trying bounding-box corners at y={y}");
            return vec![
                BlockPos::containing(bb.min_x, y as f64, bb.min_z),
                BlockPos::containing(bb.min_x, y as f64, bb.max_z),
                BlockPos::containing(bb.max_x, y as f64, bb.min_z),
                BlockPos::containing(bb.max_x, y as f64, bb.max_z),
            ];
        }
        let dx = (1.5 - bb.x_size()).max(0.0);
        let dy = (1.5 - bb.y_size()).max(0.0);
        let dz = (1.5 - bb.z_size()).max(0.0);
        let low = BlockPos::containing(bb.min_x - dx, bb.min_y - dy, bb.min_z - dz);
        let high = BlockPos::containing(bb.max_x + dx, bb.max_y + dy, bb.max_z + dz);
        let samples = self.settings.start_candidate_samples;
        log::trace!("start fallback: sampling {samples} random cells in {low}..={high}");
        (0..samples)
            .map(|_| {
                let [x, y, z] = self.rng.cell_in([low.x, low.y, low.z], [high.x, high.y, high.z]);
                BlockPos::new(x, y, z)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Node helpers shared by the evaluators
// ---------------------------------------------------------------------------

/// Fetch the node at `pos`, record its type, and raise its malus to at
/// least `malus`.
pub(crate) fn node_with_cost(
    pool: &mut NodePool,
    pos: BlockPos,
    path_type: PathType,
    malus: f32,
) -> NodeId {
    let id = pool.get_or_create(pos);
    let node = &mut pool[id];
    node.path_type = path_type;
    node.cost_malus = node.cost_malus.max(malus);
    id
}

/// Mark the node at `pos` as forbidden.
pub(crate) fn blocked_node(pool: &mut NodePool, pos: BlockPos) -> NodeId {
    let id = pool.get_or_create(pos);
    let node = &mut pool[id];
    node.path_type = PathType::Blocked;
    node.cost_malus = -1.0;
    id
}

/// Mark the node at `pos` as already explored, so the search never enters
/// it.
pub(crate) fn closed_node(pool: &mut NodePool, pos: BlockPos, path_type: PathType) -> NodeId {
    let id = pool.get_or_create(pos);
    let node = &mut pool[id];
    node.closed = true;
    node.path_type = path_type;
    node.cost_malus = path_type.default_malus();
    id
}

/// A node exists, is not closed and is not forbidden.
pub(crate) fn is_open_candidate(pool: &NodePool, node: Option<NodeId>) -> bool {
    node.is_some_and(|id| !pool[id].closed && pool[id].cost_malus >= 0.0)
}

/// A node exists and is not forbidden.
pub(crate) fn has_malus(pool: &NodePool, node: Option<NodeId>) -> bool {
    node.is_some_and(|id| pool[id].cost_malus >= 0.0)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The four locomotion models.
#[derive(Debug)]
pub enum NodeEvaluator {
    Ground(GroundEvaluator),
    Flying(FlyingEvaluator),
    Swimming(SwimmingEvaluator),
    Amphibious(AmphibiousEvaluator),
}

impl NodeEvaluator {
    pub fn new(locomotion: Locomotion, settings: EvaluatorSettings) -> Self {
        match locomotion {
            Locomotion::Ground => NodeEvaluator::Ground(GroundEvaluator::new(settings)),
            Locomotion::Flying => NodeEvaluator::Flying(FlyingEvaluator::new(settings)),
            Locomotion::Swimming { allow_breaching } => {
                NodeEvaluator::Swimming(SwimmingEvaluator::new(settings, allow_breaching))
            }
            Locomotion::Amphibious => {
                NodeEvaluator::Amphibious(AmphibiousEvaluator::new(settings))
            }
        }
    }

    pub fn locomotion(&self) -> Locomotion {
        match self {
            NodeEvaluator::Ground(_) => Locomotion::Ground,
            NodeEvaluator::Flying(_) => Locomotion::Flying,
            NodeEvaluator::Swimming(e) => Locomotion::Swimming {
                allow_breaching: e.allow_breaching(),
            },
            NodeEvaluator::Amphibious(_) => Locomotion::Amphibious,
        }
    }

    /// Begin a search for `agent`. Must be paired with `done`.
    pub fn prepare(&mut self, agent: &mut Agent) {
        match self {
            NodeEvaluator::Ground(e) => e.prepare(agent),
            NodeEvaluator::Flying(e) => e.prepare(agent),
            NodeEvaluator::Swimming(e) => e.prepare(agent),
            NodeEvaluator::Amphibious(e) => e.prepare(agent),
        }
    }

    /// End the search: restore the agent and drop per-search caches.
    pub fn done(&mut self, agent: &mut Agent) {
        match self {
            NodeEvaluator::Ground(e) => e.done(),
            NodeEvaluator::Flying(e) => e.done(),
            NodeEvaluator::Swimming(e) => e.done(),
            NodeEvaluator::Amphibious(e) => e.done(agent),
        }
    }

    /// The node the search starts from, or `None` if the agent's position
    /// is not finite or lies below the world.
    pub fn get_start<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
    ) -> Option<NodeId> {
        if !ctx.agent.bounding_box.is_finite() {
            return None;
        }
        let pos = match self {
            NodeEvaluator::Ground(e) => e.start_pos(ctx),
            NodeEvaluator::Flying(e) => e.start_pos(ctx),
            NodeEvaluator::Swimming(e) => e.start_pos(ctx),
            NodeEvaluator::Amphibious(e) => e.start_pos(ctx),
        };
        if pos.y < ctx.world.min_build_height() {
            return None;
        }
        let path_type = self.get_path_type(ctx, pos);
        let id = pool.get_or_create(pos);
        pool[id].path_type = path_type;
        pool[id].cost_malus = ctx.malus(path_type);
        Some(id)
    }

    /// Wrap the node at `pos` as a goal.
    pub fn get_target(&mut self, pool: &mut NodePool, pos: BlockPos) -> Target {
        Target::new(pool.get_or_create(pos), pos)
    }

    /// Append the nodes reachable in one move from `node` to `out`.
    pub fn get_neighbors<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pool: &mut NodePool,
        node: NodeId,
        out: &mut Neighbors,
    ) {
        match self {
            NodeEvaluator::Ground(e) => e.get_neighbors(ctx, pool, node, out),
            NodeEvaluator::Flying(e) => e.get_neighbors(ctx, pool, node, out),
            NodeEvaluator::Swimming(e) => e.get_neighbors(ctx, pool, node, out),
            NodeEvaluator::Amphibious(e) => e.get_neighbors(ctx, pool, node, out),
        }
    }

    /// Classification of the agent's footprint at `pos` for this mode.
    pub fn get_path_type<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        pos: BlockPos,
    ) -> PathType {
        match self {
            NodeEvaluator::Ground(e) => e.path_type(ctx, pos),
            NodeEvaluator::Flying(e) => e.path_type(ctx, pos),
            NodeEvaluator::Swimming(e) => e.path_type(ctx, pos),
            NodeEvaluator::Amphibious(e) => e.path_type(ctx, pos),
        }
    }
}
