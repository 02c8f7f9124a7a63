// Indexed binary min-heap of open nodes, ordered by `f`.
//
// Unlike `std::collections::BinaryHeap`, this heap supports removing an
// arbitrary node and changing a node's cost in place, which A* needs when
// it finds a cheaper route to a node that is already queued. To do that in
// O(log n) every node records its slot in `Node::heap_index`, and every
// operation that moves a node between slots updates it.
//
// Invariant: for every slot `i`, `pool[heap[i]].heap_index == Some(i)`, and
// a node outside the heap has `heap_index == None`. Violations are
// programming errors and panic.
//
// The heap stores `NodeId`s; node data lives in the caller's `NodePool`,
// which every operation borrows.

use crate::node::{NodeId, NodePool};

const INITIAL_CAPACITY: usize = 128;

#[derive(Debug)]
pub struct OpenSet {
    heap: Vec<NodeId>,
}

impl Default for OpenSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenSet {
    pub fn new() -> Self {
        Self {
            heap: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Lowest-`f` node without removing it.
    pub fn peek(&self) -> Option<NodeId> {
        self.heap.first().copied()
    }

    /// Queue a node that is not already queued.
    pub fn insert(&mut self, pool: &mut NodePool, id: NodeId) {
        assert!(
            pool[id].heap_index.is_none(),
            "node at {} is already in the open set",
            pool[id].pos
        );
        let idx = self.heap.len();
        self.heap.push(id);
        pool[id].heap_index = Some(idx);
        self.up_heap(pool, idx);
    }

    /// Remove and return the lowest-`f` node.
    pub fn pop(&mut self, pool: &mut NodePool) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        pool[top].heap_index = None;
        if !self.heap.is_empty() {
            let moved = self.heap[0];
            pool[moved].heap_index = Some(0);
            self.down_heap(pool, 0);
        }
        Some(top)
    }

    /// Remove a queued node from anywhere in the heap.
    pub fn remove(&mut self, pool: &mut NodePool, id: NodeId) {
        let idx = self.checked_index(pool, id);
        let removed_f = pool[id].f;
        self.heap.swap_remove(idx);
        pool[id].heap_index = None;
        if idx < self.heap.len() {
            let moved = self.heap[idx];
            pool[moved].heap_index = Some(idx);
            if pool[moved].f < removed_f {
                self.up_heap(pool, idx);
            } else {
                self.down_heap(pool, idx);
            }
        }
    }

    /// Set a queued node's `f` and restore heap order.
    pub fn change_cost(&mut self, pool: &mut NodePool, id: NodeId, f: f32) {
        let idx = self.checked_index(pool, id);
        let old = pool[id].f;
        pool[id].f = f;
        if f < old {
            self.up_heap(pool, idx);
        } else {
            self.down_heap(pool, idx);
        }
    }

    /// Empty the heap, detaching every queued node.
    pub fn clear(&mut self, pool: &mut NodePool) {
        for id in self.heap.drain(..) {
            pool[id].heap_index = None;
        }
    }

    /// Whether heap order and every node's `heap_index` are consistent.
    pub fn is_consistent(&self, pool: &NodePool) -> bool {
        self.heap.iter().enumerate().all(|(i, &id)| {
            let parent_ok = i == 0 || pool[self.heap[(i - 1) / 2]].f <= pool[id].f;
            parent_ok && pool[id].heap_index == Some(i)
        })
    }

    fn checked_index(&self, pool: &NodePool, id: NodeId) -> usize {
        let idx = pool[id]
            .heap_index
            .unwrap_or_else(|| panic!("node at {} is not in the open set", pool[id].pos));
        assert!(
            self.heap.get(idx) == Some(&id),
            "heap slot {idx} does not hold node at {}",
            pool[id].pos
        );
        idx
    }

    fn up_heap(&mut self, pool: &mut NodePool, mut idx: usize) {
        let id = self.heap[idx];
        let f = pool[id].f;
        while idx > 0 {
            let parent_idx = (idx - 1) >> 1;
            let parent = self.heap[parent_idx];
            if f >= pool[parent].f {
                break;
            }
            self.heap[idx] = parent;
            pool[parent].heap_index = Some(idx);
            idx = parent_idx;
        }
        self.heap[idx] = id;
        pool[id].heap_index = Some(idx);
    }

    fn down_heap(&mut self, pool: &mut NodePool, mut idx: usize) {
        let id = self.heap[idx];
        let f = pool[id].f;
        let len = self.heap.len();
        loop {
            let left = 1 + (idx << 1);
            let right = left + 1;
            if left >= len {
                break;
            }
            let left_f = pool[self.heap[left]].f;
            let right_f = if right < len {
                pool[self.heap[right]].f
            } else {
                f32::INFINITY
            };
            let child = if left_f < right_f { left } else { right };
            let child_f = left_f.min(right_f);
            if child_f >= f {
                break;
            }
            let child_id = self.heap[child];
            self.heap[idx] = child_id;
            pool[child_id].heap_index = Some(idx);
            idx = child;
        }
        self.heap[idx] = id;
        pool[id].heap_index = Some(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockPos;

    fn pool_with(costs: &[f32]) -> (NodePool, Vec<NodeId>) {
        let mut pool = NodePool::new();
        let ids = costs
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let id = pool.get_or_create(BlockPos::new(i as i32, 0, 0));
                pool[id].f = f;
                id
            })
            .collect();
        (pool, ids)
    }

    #[test]
    fn pops_in_cost_order() {
        let (mut pool, ids) = pool_with(&[5.0, 1.0, 4.0, 3.0, 2.0, 6.0, 0.5]);
        let mut open = OpenSet::new();
        for &id in &ids {
            open.insert(&mut pool, id);
            assert!(open.is_consistent(&pool));
        }
        let mut popped = Vec::new();
        while let Some(id) = open.pop(&mut pool) {
            assert!(open.is_consistent(&pool));
            assert_eq!(pool[id].heap_index(), None);
            popped.push(pool[id].f);
        }
        assert_eq!(popped, vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn remove_from_middle_keeps_invariants() {
        let (mut pool, ids) = pool_with(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let mut open = OpenSet::new();
        for &id in &ids {
            open.insert(&mut pool, id);
        }
        open.remove(&mut pool, ids[3]);
        assert!(open.is_consistent(&pool));
        assert!(!pool[ids[3]].in_open_set());
        assert_eq!(open.len(), 7);
        open.remove(&mut pool, ids[0]);
        assert!(open.is_consistent(&pool));
        assert_eq!(open.peek(), Some(ids[1]));
    }

    #[test]
    fn remove_last_slot() {
        let (mut pool, ids) = pool_with(&[1.0, 2.0]);
        let mut open = OpenSet::new();
        open.insert(&mut pool, ids[0]);
        open.insert(&mut pool, ids[1]);
        open.remove(&mut pool, ids[1]);
        assert_eq!(open.len(), 1);
        assert!(open.is_consistent(&pool));
    }

    #[test]
    fn change_cost_moves_both_ways() {
        let (mut pool, ids) = pool_with(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut open = OpenSet::new();
        for &id in &ids {
            open.insert(&mut pool, id);
        }
        open.change_cost(&mut pool, ids[4], 0.0);
        assert!(open.is_consistent(&pool));
        assert_eq!(open.peek(), Some(ids[4]));
        open.change_cost(&mut pool, ids[4], 10.0);
        assert!(open.is_consistent(&pool));
        assert_eq!(open.peek(), Some(ids[0]));
    }

    #[test]
    fn grows_past_initial_capacity() {
        let costs: Vec<f32> = (0..300).map(|i| ((i * 37) % 300) as f32).collect();
        let (mut pool, ids) = pool_with(&costs);
        let mut open = OpenSet::new();
        for &id in &ids {
            open.insert(&mut pool, id);
        }
        assert_eq!(open.len(), 300);
        assert!(open.is_consistent(&pool));
        assert_eq!(open.pop(&mut pool).map(|id| pool[id].f), Some(0.0));
    }

    #[test]
    fn clear_detaches_nodes() {
        let (mut pool, ids) = pool_with(&[1.0, 2.0, 3.0]);
        let mut open = OpenSet::new();
        for &id in &ids {
            open.insert(&mut pool, id);
        }
        open.clear(&mut pool);
        assert!(open.is_empty());
        assert!(ids.iter().all(|&id| !pool[id].in_open_set()));
    }

    #[test]
    #[should_panic(expected = "already in the open set")]
    fn double_insert_panics() {
        let (mut pool, ids) = pool_with(&[1.0]);
        let mut open = OpenSet::new();
        open.insert(&mut pool, ids[0]);
        open.insert(&mut pool, ids[0]);
    }

    #[test]
    #[should_panic(expected = "not in the open set")]
    fn removing_unqueued_node_panics() {
        let (mut pool, ids) = pool_with(&[1.0]);
        let mut open = OpenSet::new();
        open.remove(&mut pool, ids[0]);
    }
}
