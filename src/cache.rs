//! Dense transition cache for small automata.
//!
//! For an NBW with `n` states there are `2^n` state subsets; when `n` is at
//! most [`CACHE_STATE_LIMIT`](crate::nbw::CACHE_STATE_LIMIT) it is cheap to
//! tabulate the set transition of every subset on every symbol once and
//! answer all later queries by lookup. The table is a pure function of the
//! transition rows and must be rebuilt from scratch whenever they change;
//! it is never patched in place.

use crate::bitset::BitSet;

/// Precomputed set transitions for every `(subset, symbol)` pair.
///
/// The entry for subset `S` (as a dense integer) and symbol `a` lives at
/// `S * alphabet_size + a`.
pub struct TransitionCache {
    table: Vec<BitSet>,
    alphabet_size: usize,
}

impl TransitionCache {
    /// Tabulates all subset transitions from the given rows.
    ///
    /// `rows[s * alphabet_size + a]` is the successor set of state `s` on
    /// symbol `a`.
    pub fn build(size: usize, alphabet_size: usize, rows: &[BitSet]) -> Self {
        assert!(size < usize::BITS as usize, "Automaton too large to cache");
        assert_eq!(rows.len(), size * alphabet_size);

        let subsets = 1usize << size;
        let mut table = Vec::with_capacity(subsets * alphabet_size);
        for subset in 0..subsets {
            let states = BitSet::from_value(size, subset as u64);
            for a in 0..alphabet_size {
                let mut targets = BitSet::new(size);
                for s in states.iter() {
                    targets |= &rows[s * alphabet_size + a];
                }
                table.push(targets);
            }
        }

        Self { table, alphabet_size }
    }

    /// Looks up the set transition of `states` on `symbol`.
    pub fn lookup(&self, states: &BitSet, symbol: usize) -> &BitSet {
        assert!(symbol < self.alphabet_size, "Symbol {} out of range", symbol);
        &self.table[states.as_index() * self.alphabet_size + symbol]
    }
}
