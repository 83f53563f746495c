//! Longest-match search over the sliding window.
//!
//! Both finders return the longest run between a window position and the
//! look-ahead, preferring the smallest distance among runs of equal length.
//! [`ExhaustiveMatcher`] tries every distance in order and is the reference;
//! [`HashChainMatcher`] only visits positions sharing a short prefix with the
//! look-ahead, which yields the same choice for every run that is long enough
//! to be emitted.

/// A candidate back-reference. `length == 0` means no match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Match {
    pub distance: usize,
    pub length: usize,
}

impl Match {
    pub const NONE: Match = Match { distance: 0, length: 0 };
}

/// Strategy for finding the best back-reference at a scan position.
pub trait MatchFinder {
    /// Find the longest run starting at `pos` that repeats input starting
    /// between 1 and `window` bytes earlier, capped at `max_len`.
    fn longest_match(&mut self, pos: usize, window: usize, max_len: usize) -> Match;
}

/// Length of the common run of `input[older..]` and `input[pos..]`, capped at
/// `max_len`. The older run may overlap `pos`.
#[inline]
fn common_run(input: &[u8], older: usize, pos: usize, max_len: usize) -> usize {
    input[older..].iter().zip(&input[pos..pos + max_len]).take_while(|(a, b)| a == b).count()
}

/// Tries every distance from 1 to `window`
pub struct ExhaustiveMatcher<'a> {
    input: &'a [u8],
}

impl<'a> ExhaustiveMatcher<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }
}

impl MatchFinder for ExhaustiveMatcher<'_> {
    fn longest_match(&mut self, pos: usize, window: usize, max_len: usize) -> Match {
        let mut best = Match::NONE;

        for distance in 1..=window {
            let length = common_run(self.input, pos - distance, pos, max_len);
            // Strict improvement only: ties keep the nearer distance.
            if length > best.length {
                best = Match { distance, length };
                if length == max_len {
                    break;
                }
            }
        }
        best
    }
}

/// Marks an empty chain slot
const EMPTY: usize = usize::MAX;
/// Size of the chain head table (1 << HASH_BITS)
const HASH_BITS: u32 = 16;
/// Longest prefix hashed into the chains
const MAX_PREFIX: usize = 4;

/// Hash chains over fixed-length prefixes, walked nearest-first.
///
/// Every position whose prefix fits inside the input is linked into the
/// chain of its prefix hash. A run of at least `prefix` bytes must start with
/// the same prefix, so walking one chain visits every candidate that can
/// reach `min_match`. Collisions are harmless because run lengths are always
/// measured on the actual bytes.
pub struct HashChainMatcher<'a> {
    input: &'a [u8],
    /// Bytes hashed per position (1..=MAX_PREFIX)
    prefix: usize,
    /// Runs shorter than this are never reported
    min_match: usize,
    /// Most recent position per hash bucket
    head: Vec<usize>,
    /// Previous position with the same hash, per position
    prev: Vec<usize>,
    /// Next position to link into the chains
    next_insert: usize,
}

impl<'a> HashChainMatcher<'a> {
    pub fn new(input: &'a [u8], min_match: usize) -> Self {
        let min_match = min_match.max(1);
        Self {
            input,
            prefix: min_match.min(MAX_PREFIX),
            min_match,
            head: vec![EMPTY; 1 << HASH_BITS],
            prev: vec![EMPTY; input.len()],
            next_insert: 0,
        }
    }

    fn hash_at(&self, pos: usize) -> usize {
        let mut key = 0u32;
        for &byte in &self.input[pos..pos + self.prefix] {
            key = (key << 8) | byte as u32;
        }
        (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    /// Link every position before `pos` into the chains
    fn insert_until(&mut self, pos: usize) {
        let last = self.input.len().saturating_sub(self.prefix - 1);
        let end = pos.min(last);
        while self.next_insert < end {
            let idx = self.next_insert;
            let bucket = self.hash_at(idx);
            self.prev[idx] = self.head[bucket];
            self.head[bucket] = idx;
            self.next_insert += 1;
        }
        self.next_insert = self.next_insert.max(pos);
    }
}

impl MatchFinder for HashChainMatcher<'_> {
    fn longest_match(&mut self, pos: usize, window: usize, max_len: usize) -> Match {
        self.insert_until(pos);

        // Nothing shorter than `min_match` is ever emitted, so the chains
        // only need to be right about runs that reach it.
        if max_len < self.min_match || pos + self.prefix > self.input.len() {
            return Match::NONE;
        }

        let mut best = Match::NONE;
        let mut candidate = self.head[self.hash_at(pos)];

        while candidate != EMPTY {
            let distance = pos - candidate;
            if distance > window {
                break;
            }
            let length = common_run(self.input, candidate, pos, max_len);
            if length > best.length {
                best = Match { distance, length };
                if length == max_len {
                    break;
                }
            }
            candidate = self.prev[candidate];
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustive_prefers_nearest_on_tie() {
        let input = b"abcXabcYabc";
        let mut finder = ExhaustiveMatcher::new(input);
        let best = finder.longest_match(8, 8, 3);
        assert_eq!(best, Match { distance: 4, length: 3 });
    }

    #[test]
    fn test_exhaustive_overlapping_run() {
        let input = b"aaaaaaaaaa";
        let mut finder = ExhaustiveMatcher::new(input);
        let best = finder.longest_match(1, 1, 9);
        assert_eq!(best, Match { distance: 1, length: 9 });
    }

    #[test]
    fn test_exhaustive_respects_window() {
        let input = b"abcdefabc";
        let mut finder = ExhaustiveMatcher::new(input);
        assert_eq!(finder.longest_match(6, 5, 3).length, 0);
        assert_eq!(finder.longest_match(6, 6, 3), Match { distance: 6, length: 3 });
    }

    #[test]
    fn test_hash_chain_prefers_nearest_on_tie() {
        let input = b"abcXabcYabc";
        let mut finder = HashChainMatcher::new(input, 3);
        assert_eq!(finder.longest_match(8, 8, 3), Match { distance: 4, length: 3 });
    }

    #[test]
    fn test_hash_chain_longer_match_further_back() {
        let input = b"abcdeXabcYabcde";
        let mut finder = HashChainMatcher::new(input, 3);
        assert_eq!(finder.longest_match(10, 10, 5), Match { distance: 10, length: 5 });
    }

    #[test]
    fn test_hash_chain_skipped_positions_are_indexed() {
        // Jumping straight to a later position must still see earlier runs.
        let input = b"xyzxyzxyz";
        let mut finder = HashChainMatcher::new(input, 3);
        assert_eq!(finder.longest_match(6, 6, 3), Match { distance: 3, length: 3 });
    }

    #[test]
    fn test_hash_chain_short_lookahead() {
        let input = b"abab";
        let mut finder = HashChainMatcher::new(input, 3);
        assert_eq!(finder.longest_match(2, 2, 2), Match::NONE);
    }
}
