// Direct-mapped cache of raw cell classifications.
//
// Classifying a walkable cell consults up to 26 raw classifications (the
// cell, the block below, and the lateral ring of the surrounding 3×3×3
// box). Neighboring cells share most of those lookups, so the world keeps a
// `PathTypeCache` alive across searches and the classifier reads raw types
// through it.
//
// Layout: 4096 slots, each holding the position it was computed for, the
// raw classification, and whether the cell holds water. The slot index is a
// multiplicative mix of the packed coordinate (`BlockPos::as_long`) masked
// to 12 bits. The packing is lossy for tall or far-flung worlds, so the
// slot keeps the full position and a lookup hits only when it matches
// exactly. A miss computes, then overwrites whatever was in the slot. There
// is no chaining and no growth.
//
// The cache has no notion of time. The world must call `invalidate(pos)`
// whenever the block or fluid at `pos` changes (`VoxelWorld::set` does).
// Because raw classification depends only on the cell itself, invalidating
// the changed cell is sufficient; refined classifications are never stored
// here.
//
// See also: `classify.rs` (`RawCell` and the refinement that reads
// through this cache), `world.rs` for the owning world.

use crate::block::BlockState;
use crate::classify::RawCell;
use crate::path_type::PathType;
use crate::types::BlockPos;

pub const CACHE_SIZE: usize = 4096;
const CACHE_MASK: u64 = CACHE_SIZE as u64 - 1;

/// 64-bit golden-ratio constant used to spread packed coordinates.
const LONG_PHI: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Copy, Debug)]
struct Slot {
    pos: BlockPos,
    cell: RawCell,
}

/// Fixed-capacity, direct-mapped position → raw classification cache.
#[derive(Clone, Debug)]
pub struct PathTypeCache {
    slots: Box<[Option<Slot>]>,
}

impl Default for PathTypeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTypeCache {
    pub fn new() -> Self {
        Self {
            slots: vec![None; CACHE_SIZE].into_boxed_slice(),
        }
    }

    /// Slot a position maps to.
    pub fn slot_index(pos: BlockPos) -> usize {
        (mix(pos.as_long()) & CACHE_MASK) as usize
    }

    /// Return the cached raw classification for `pos`, or compute it from
    /// `lookup(pos)` and store it, evicting any other position in the slot.
    pub fn get_or_compute(&mut self, pos: BlockPos, lookup: impl FnOnce(BlockPos) -> BlockState) -> PathType {
        self.get_or_compute_cell(pos, lookup).path_type
    }

    /// Like `get_or_compute`, but also reports whether the cell holds water.
    pub fn get_or_compute_cell(
        &mut self,
        pos: BlockPos,
        lookup: impl FnOnce(BlockPos) -> BlockState,
    ) -> RawCell {
        let idx = Self::slot_index(pos);
        if let Some(slot) = self.slots[idx].filter(|slot| slot.pos == pos) {
            return slot.cell;
        }
        let cell = RawCell::of(&lookup(pos));
        self.slots[idx] = Some(Slot { pos, cell });
        cell
    }

    /// Cached classification for `pos`, without computing.
    pub fn get(&self, pos: BlockPos) -> Option<PathType> {
        self.slots[Self::slot_index(pos)]
            .filter(|slot| slot.pos == pos)
            .map(|slot| slot.cell.path_type)
    }

    /// Forget `pos`. A slot that currently holds a different position (one
    /// that merely collided with `pos`) is left alone.
    pub fn invalidate(&mut self, pos: BlockPos) {
        let idx = Self::slot_index(pos);
        if self.slots[idx].is_some_and(|slot| slot.pos == pos) {
            self.slots[idx] = None;
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn mix(x: u64) -> u64 {
    let mut h = x.wrapping_mul(LONG_PHI);
    h ^= h >> 32;
    h ^ (h >> 16)
}
