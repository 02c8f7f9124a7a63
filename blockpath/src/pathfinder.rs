// Multi-target A* search driver.
//
// One `Pathfinder` wraps one `NodeEvaluator` and runs searches for agents of
// that locomotion. A search:
//
// 1. `prepare`s the evaluator (which may rewrite the agent's malus table),
// 2. asks it for the start node and wraps every target cell,
// 3. repeatedly pops the lowest-`f` node from the open set, closes it, and
//    stops as soon as it lies within `accuracy` (Manhattan) of any target,
// 4. otherwise expands it, unless it is `max_range` or more from the start,
// 5. always `done`s the evaluator, whether or not a path was found.
//
// Edge cost is the Euclidean step length plus the destination's malus. The
// heuristic is the straight-line distance to the nearest target, scaled by
// `FUDGING`; that trades optimality for far fewer expansions. A node is
// relaxed only while the Euclidean length walked to reach it stays under
// `max_range`.
//
// Every heuristic evaluation also updates each target's closest approach.
// When no target is reached (budget spent or open set exhausted) the
// result is a partial path to the closest approach of the best target.
// Reached targets win over partial ones; among reached targets the shortest
// path wins, among partial ones the closest approach, then the shortest.
//
// The only failure is having no start node at all (non-finite agent
// position, or a start below the world floor); that returns `None`.
//
// See also: `evaluator/mod.rs` for the locomotion models, `open_set.rs` for
// the indexed heap, `node.rs` for the node arena, `path.rs` for the result.
//
// **Determinism.** Targets are visited in `BTreeSet` order, neighbor order
// is fixed per evaluator, and ties in the open set resolve by heap
// position, so equal inputs give equal paths.

use crate::agent::{Agent, Locomotion};
use crate::config::{PathfindingConfig, visited_budget};
use crate::evaluator::{EvaluatorSettings, Neighbors, NodeEvaluator, SearchContext};
use crate::node::{NodeId, NodePool, Target};
use crate::open_set::OpenSet;
use crate::path::Path;
use crate::types::BlockPos;
use crate::world::BlockView;
use std::collections::BTreeSet;

/// Heuristic inflation factor.
pub const FUDGING: f32 = 1.5;

/// Counters from the most recent search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Loop iterations, including the one that hit the budget.
    pub visited: u32,
    pub budget: u32,
    /// Nodes created in the arena.
    pub nodes: usize,
    pub reached: bool,
}

/// Everything a finished search leaves behind.
struct SearchState {
    pool: NodePool,
    open: OpenSet,
    goals: Vec<Target>,
    stats: SearchStats,
}

impl SearchState {
    fn path_for(&self, goal: &Target) -> Option<Path> {
        let end = goal.best_node()?;
        Some(Path::new(self.pool.trace_back(end), goal.pos, goal.reached()))
    }

    fn best_path(&self) -> Option<Path> {
        if self.stats.reached {
            self.goals
                .iter()
                .filter(|goal| goal.reached())
                .filter_map(|goal| self.path_for(goal))
                .min_by_key(Path::node_count)
        } else {
            self.goals
                .iter()
                .filter_map(|goal| self.path_for(goal))
                .min_by(|a, b| {
                    a.dist_to_target()
                        .total_cmp(&b.dist_to_target())
                        .then(a.node_count().cmp(&b.node_count()))
                })
        }
    }
}

/// Heuristic distance from `node` to the nearest goal, recording `node` as
/// each goal's closest approach where it is one.
fn best_h(pool: &NodePool, node: NodeId, goals: &mut [Target]) -> f32 {
    let mut best = f32::MAX;
    for goal in goals {
        let h = pool[node].distance_to(goal.pos);
        goal.update_best(h, node);
        best = best.min(h);
    }
    best
}

#[derive(Debug)]
pub struct Pathfinder {
    evaluator: NodeEvaluator,
    max_visited_nodes: u32,
    last_stats: Option<SearchStats>,
}

impl Pathfinder {
    pub fn new(evaluator: NodeEvaluator, max_visited_nodes: u32) -> Self {
        Self {
            evaluator,
            max_visited_nodes,
            last_stats: None,
        }
    }

    /// A pathfinder for `locomotion` with the config's budget and penalties.
    pub fn from_config(config: &PathfindingConfig, locomotion: Locomotion) -> Self {
        let evaluator = NodeEvaluator::new(locomotion, EvaluatorSettings::from_config(config));
        Self::new(evaluator, config.max_visited_nodes)
    }

    pub fn evaluator(&self) -> &NodeEvaluator {
        &self.evaluator
    }

    pub fn max_visited_nodes(&self) -> u32 {
        self.max_visited_nodes
    }

    pub fn set_max_visited_nodes(&mut self, max_visited_nodes: u32) {
        self.max_visited_nodes = max_visited_nodes;
    }

    /// Counters from the last search that produced a start node.
    pub fn last_stats(&self) -> Option<SearchStats> {
        self.last_stats
    }

    /// Search from `agent` toward the nearest reachable of `targets`.
    ///
    /// Returns a path to a reached target, or a partial path toward the
    /// most promising one. Returns `None` only when no start node exists
    /// or `targets` is empty.
    pub fn find_path<W: BlockView + ?Sized>(
        &mut self,
        world: &W,
        agent: &mut Agent,
        targets: &BTreeSet<BlockPos>,
        max_range: f32,
        accuracy: i32,
        search_depth_multiplier: f32,
    ) -> Option<Path> {
        self.last_stats = None;
        self.evaluator.prepare(agent);
        let state = self.run(
            SearchContext::new(world, agent),
            targets,
            max_range,
            accuracy,
            search_depth_multiplier,
        );
        self.evaluator.done(agent);

        let state = state?;
        debug_assert!(state.open.is_consistent(&state.pool));
        self.last_stats = Some(state.stats);
        let path = state.best_path();
        match &path {
            Some(path) => log::debug!(
                "search done: {} of {} visited, {} nodes, {}",
                state.stats.visited,
                state.stats.budget,
                state.stats.nodes,
                path
            ),
            None => log::debug!("search done: no targets"),
        }
        path
    }

    /// Single-target search with the config's range, accuracy and depth.
    pub fn find_path_to<W: BlockView + ?Sized>(
        &mut self,
        world: &W,
        agent: &mut Agent,
        target: BlockPos,
        config: &PathfindingConfig,
    ) -> Option<Path> {
        self.find_path(
            world,
            agent,
            &BTreeSet::from([target]),
            config.default_max_range,
            config.default_accuracy,
            config.search_depth_multiplier,
        )
    }

    fn run<W: BlockView + ?Sized>(
        &mut self,
        ctx: SearchContext<'_, W>,
        targets: &BTreeSet<BlockPos>,
        max_range: f32,
        accuracy: i32,
        search_depth_multiplier: f32,
    ) -> Option<SearchState> {
        let mut pool = NodePool::new();
        let mut open = OpenSet::new();

        let Some(start) = self.evaluator.get_start(ctx, &mut pool) else {
            log::warn!("no start node for agent at {:?}", ctx.agent.position());
            return None;
        };
        let mut goals: Vec<Target> = targets
            .iter()
            .map(|&pos| self.evaluator.get_target(&mut pool, pos))
            .collect();
        let start_pos = pool[start].pos;

        let h = best_h(&pool, start, &mut goals);
        pool[start].g = 0.0;
        pool[start].h = h;
        pool[start].f = h;
        open.insert(&mut pool, start);

        let budget = visited_budget(self.max_visited_nodes, search_depth_multiplier);
        let mut visited = 0u32;
        let mut reached = false;
        let mut neighbors = Neighbors::new();

        while !open.is_empty() {
            visited += 1;
            if visited >= budget {
                break;
            }
            let Some(current) = open.pop(&mut pool) else {
                break;
            };
            pool[current].closed = true;

            for goal in goals.iter_mut() {
                if pool[current].distance_manhattan(goal.pos) <= accuracy {
                    goal.set_reached(current);
                    reached = true;
                }
            }
            if reached {
                break;
            }

            if pool[current].distance_to(start_pos) >= max_range {
                continue;
            }

            neighbors.clear();
            self.evaluator.get_neighbors(ctx, &mut pool, current, &mut neighbors);
            for &next in &neighbors {
                if pool[next].closed {
                    continue;
                }
                let step = pool[current].distance_to(pool[next].pos);
                let walked = pool[current].walked_distance + step;
                let g = pool[current].g + step + pool[next].cost_malus;
                let queued = pool[next].in_open_set();
                if walked >= max_range || (queued && g >= pool[next].g) {
                    continue;
                }

                let h = best_h(&pool, next, &mut goals) * FUDGING;
                let node = &mut pool[next];
                node.came_from = Some(current);
                node.g = g;
                node.h = h;
                node.walked_distance = walked;
                if queued {
                    open.change_cost(&mut pool, next, g + h);
                } else {
                    node.f = g + h;
                    open.insert(&mut pool, next);
                }
            }
        }

        let stats = SearchStats {
            visited,
            budget,
            nodes: pool.len(),
            reached,
        };
        if goals.is_empty() {
            log::debug!("search from {start_pos} had no targets");
        }
        Some(SearchState {
            pool,
            open,
            goals,
            stats,
        })
    }
}
