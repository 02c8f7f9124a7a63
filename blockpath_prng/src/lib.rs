// Seeded sampling for start-cell fallback.
//
// The pathfinder draws random numbers in exactly one place: a flyer or
// swimmer whose anchor cell is not a valid start samples a few cells from
// its inflated bounding box and starts from the first usable one. Two
// searches from the same inputs must pick the same cell, so the generator is
// keyed per search by `SampleRng::for_search(seed, words)`, where the words
// are the agent's block coordinates. Nothing carries over between searches.
//
// The core is xoshiro256++ (Blackman & Vigna, 2019) with its state expanded
// by SplitMix64. Integer arithmetic only, no OS entropy.
//
// See also: `blockpath/src/evaluator/mod.rs` (`EvaluatorBase::start_candidates`).

use serde::{Deserialize, Serialize};

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic generator for start-candidate sampling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRng {
    s: [u64; 4],
}

impl SampleRng {
    /// Generator for one search. `words` are folded into `seed` one at a
    /// time, so every word changes the stream.
    pub fn for_search(seed: u64, words: &[i64]) -> Self {
        let mut key = SplitMix(seed);
        let mut folded = key.next();
        for &w in words {
            key.0 ^= w as u64;
            folded ^= key.next();
        }
        Self::from_seed(folded)
    }

    pub fn from_seed(seed: u64) -> Self {
        let mut sm = SplitMix(seed);
        Self {
            s: [sm.next(), sm.next(), sm.next(), sm.next()],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = &mut self.s;
        let out = s0.wrapping_add(*s3).rotate_left(23).wrapping_add(*s0);
        let t = *s1 << 17;
        *s2 ^= *s0;
        *s3 ^= *s1;
        *s1 ^= *s2;
        *s0 ^= *s3;
        *s2 ^= t;
        *s3 = s3.rotate_left(45);
        out
    }

    /// Uniform value in `0..span`. Panics if `span` is zero.
    pub fn below(&mut self, span: u64) -> u64 {
        assert!(span > 0, "below: empty span");
        if span.is_power_of_two() {
            return self.next_u64() & (span - 1);
        }
        // Reject the short tail so every residue is equally likely.
        let tail = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= tail {
                return r % span;
            }
        }
    }

    /// Uniform `i32` in `low..=high`. Panics if `low > high`.
    pub fn range_i32_inclusive(&mut self, low: i32, high: i32) -> i32 {
        assert!(low <= high, "range_i32_inclusive: {low} > {high}");
        let span = (high as i64 - low as i64 + 1) as u64;
        (low as i64 + self.below(span) as i64) as i32
    }

    /// A cell of the inclusive box `low..=high`, drawn x, then y, then z.
    pub fn cell_in(&mut self, low: [i32; 3], high: [i32; 3]) -> [i32; 3] {
        [
            self.range_i32_inclusive(low[0], high[0]),
            self.range_i32_inclusive(low[1], high[1]),
            self.range_i32_inclusive(low[2], high[2]),
        ]
    }
}

/// SplitMix64 stream, used only to derive xoshiro state.
struct SplitMix(u64);

impl SplitMix {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}
