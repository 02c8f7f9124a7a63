// Per-search node arena and goal tracking.
//
// A search creates at most one `Node` per grid position. Nodes live in a
// `NodePool` (a `Vec<Node>` plus a position → `NodeId` map) and refer to
// each other by `NodeId`, so back-pointers (`came_from`) are plain indices
// with no ownership. The pool is created per search and dropped with it.
//
// `heap_index` belongs to the open set (`open_set.rs`): it is `Some(i)`
// exactly while the node sits at slot `i` of the heap. Only the open set
// writes it.
//
// `Target` wraps the node at a goal position and remembers the node the
// search got closest to (by heuristic distance), which is where a partial
// path ends when the goal is never reached.

use crate::path_type::PathType;
use crate::types::BlockPos;
use rustc_hash::FxHashMap;
use std::ops::{Index, IndexMut};

/// Handle to a node in a `NodePool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Search state for one grid position.
#[derive(Clone, Debug)]
pub struct Node {
    pub pos: BlockPos,
    /// Cost of the best known route from the start.
    pub g: f32,
    /// Heuristic estimate of the remaining cost.
    pub h: f32,
    /// `g + h`; the open set's ordering key.
    pub f: f32,
    /// Euclidean length of the best known route from the start, without
    /// malus.
    pub walked_distance: f32,
    /// Terrain malus of entering this node. Negative means forbidden.
    pub cost_malus: f32,
    pub closed: bool,
    pub path_type: PathType,
    pub came_from: Option<NodeId>,
    pub(crate) heap_index: Option<usize>,
}

impl Node {
    pub fn new(pos: BlockPos) -> Self {
        Self {
            pos,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            walked_distance: 0.0,
            cost_malus: 0.0,
            closed: false,
            path_type: PathType::Blocked,
            came_from: None,
            heap_index: None,
        }
    }

    pub fn in_open_set(&self) -> bool {
        self.heap_index.is_some()
    }

    pub fn heap_index(&self) -> Option<usize> {
        self.heap_index
    }

    pub fn distance_to(&self, pos: BlockPos) -> f32 {
        self.pos.distance_to(pos)
    }

    pub fn distance_manhattan(&self, pos: BlockPos) -> i32 {
        self.pos.manhattan_distance(pos)
    }
}

/// Arena of the nodes created during one search.
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<Node>,
    by_pos: FxHashMap<BlockPos, NodeId>,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node at `pos`, created on first request.
    pub fn get_or_create(&mut self, pos: BlockPos) -> NodeId {
        if let Some(&id) = self.by_pos.get(&pos) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(pos));
        self.by_pos.insert(pos, id);
        id
    }

    pub fn get(&self, pos: BlockPos) -> Option<NodeId> {
        self.by_pos.get(&pos).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_pos.clear();
    }

    /// Positions from the start to `end`, following `came_from`.
    pub fn trace_back(&self, end: NodeId) -> Vec<BlockPos> {
        let mut positions = vec![self[end].pos];
        let mut current = end;
        while let Some(prev) = self[current].came_from {
            positions.push(self[prev].pos);
            current = prev;
        }
        positions.reverse();
        positions
    }
}

impl Index<NodeId> for NodePool {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }
}

impl IndexMut<NodeId> for NodePool {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// A goal of the search plus the closest approach seen so far.
#[derive(Clone, Debug)]
pub struct Target {
    pub node: NodeId,
    pub pos: BlockPos,
    best_h: f32,
    best_node: Option<NodeId>,
    reached: bool,
}

impl Target {
    pub fn new(node: NodeId, pos: BlockPos) -> Self {
        Self {
            node,
            pos,
            best_h: f32::MAX,
            best_node: None,
            reached: false,
        }
    }

    /// Record `node` as the closest approach if `h` beats the best so far.
    pub fn update_best(&mut self, h: f32, node: NodeId) {
        if h < self.best_h {
            self.best_h = h;
            self.best_node = Some(node);
        }
    }

    pub fn best_node(&self) -> Option<NodeId> {
        self.best_node
    }

    /// Mark the goal reached by `node`, which becomes the path's end.
    pub fn set_reached(&mut self, node: NodeId) {
        self.best_node = Some(node);
        self.reached = true;
    }

    pub fn reached(&self) -> bool {
        self.reached
    }
}
