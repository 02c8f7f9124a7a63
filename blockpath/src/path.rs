// The result of a search: an ordered list of cells plus a cursor.
//
// `nodes` runs from the agent's start cell to the last cell of the route.
// A path that reached its target ends within the requested accuracy of it;
// a partial path ends at the closest approach the search found, and
// `dist_to_target` says how far off that is (Manhattan, in blocks).
//
// Followers walk the path by reading `next_position()` and calling
// `advance()` once they arrive. The cursor is not part of a path's
// identity: two paths with the same cells, target and outcome compare
// equal wherever their cursors are.
//
// See also: `pathfinder.rs`, which builds these.

use crate::agent::Agent;
use crate::types::BlockPos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A route through the grid with a follower cursor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<BlockPos>,
    next_index: usize,
    target: BlockPos,
    /// Manhattan distance from the last node to `target`; `f32::MAX` for
    /// an empty path.
    dist_to_target: f32,
    reached: bool,
}

impl Path {
    pub fn new(nodes: Vec<BlockPos>, target: BlockPos, reached: bool) -> Self {
        let dist_to_target = nodes
            .last()
            .map_or(f32::MAX, |end| end.manhattan_distance(target) as f32);
        Self {
            nodes,
            next_index: 0,
            target,
            dist_to_target,
            reached,
        }
    }

    /// Move the cursor to the next node.
    pub fn advance(&mut self) {
        self.next_index += 1;
    }

    /// Whether the cursor has passed the last node.
    pub fn is_done(&self) -> bool {
        self.next_index >= self.nodes.len()
    }

    pub fn not_started(&self) -> bool {
        self.next_index == 0
    }

    pub fn node_at(&self, index: usize) -> Option<BlockPos> {
        self.nodes.get(index).copied()
    }

    pub fn nodes(&self) -> &[BlockPos] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn end_node(&self) -> Option<BlockPos> {
        self.nodes.last().copied()
    }

    /// The node the cursor points at.
    pub fn next_position(&self) -> Option<BlockPos> {
        self.node_at(self.next_index)
    }

    /// The node the follower last passed.
    pub fn previous_position(&self) -> Option<BlockPos> {
        self.next_index
            .checked_sub(1)
            .and_then(|i| self.node_at(i))
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn set_next_index(&mut self, index: usize) {
        self.next_index = index;
    }

    /// Replace the cell at `index`. Out-of-range indices are ignored.
    pub fn replace_node(&mut self, index: usize, pos: BlockPos) {
        if let Some(slot) = self.nodes.get_mut(index) {
            *slot = pos;
        }
    }

    /// Drop every node from `len` on.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Same cells in the same order, regardless of target or cursor.
    pub fn same_as(&self, other: &Path) -> bool {
        self.nodes == other.nodes
    }

    /// Whether the search reached the target.
    pub fn can_reach(&self) -> bool {
        self.reached
    }

    pub fn reached(&self) -> bool {
        self.reached
    }

    pub fn target(&self) -> BlockPos {
        self.target
    }

    pub fn dist_to_target(&self) -> f32 {
        self.dist_to_target
    }

    /// Where the agent's feet should be to stand centered in the node at
    /// `index`, in world coordinates.
    pub fn entity_pos_at_node(&self, agent: &Agent, index: usize) -> Option<(f64, f64, f64)> {
        let pos = self.node_at(index)?;
        let half = (agent.bb_width() + 1.0).floor() * 0.5;
        Some((pos.x as f64 + half, pos.y as f64, pos.z as f64 + half))
    }

    pub fn next_entity_pos(&self, agent: &Agent) -> Option<(f64, f64, f64)> {
        self.entity_pos_at_node(agent, self.next_index)
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.target == other.target
            && self.dist_to_target == other.dist_to_target
            && self.reached == other.reached
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Path[{} nodes, next {}, target {}, {}]",
            self.nodes.len(),
            self.next_index,
            self.target,
            if self.reached { "reached" } else { "partial" }
        )?;
        for pos in &self.nodes {
            write!(f, " {pos}")?;
        }
        Ok(())
    }
}
