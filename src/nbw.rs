//! Nondeterministic Büchi automata over infinite words.
//!
//! An [`Nbw`] owns its transition rows (one state set per `(state, symbol)`
//! pair), its initial and accepting sets, and an optional dense transition
//! cache. All operations of the engine's Boolean layer live here: set
//! transition, trim, track projection, disjoint sum, product, two-copy
//! intersection, emptiness, determinization and complementation.
//!
//! The empty language is always represented by a canonical one-state
//! automaton with no transitions and no accepting state, so downstream
//! operations never see a zero-state machine.

use log::debug;
use rand::Rng;

use crate::bitset::BitSet;
use crate::cache::TransitionCache;
use crate::determinize::Safra;
use crate::drw::Drw;
use crate::scc;

/// Whether automata attempt to cache subset transitions by default.
pub const USE_TRANSITION_CACHE: bool = false;

/// The largest state count for which a dense subset cache is built.
///
/// The cache has `2^n * alphabet` entries; anywhere past 10 states or so it
/// stops paying for itself.
pub const CACHE_STATE_LIMIT: usize = 10;

/// A nondeterministic Büchi automaton.
pub struct Nbw {
    size: usize,
    alphabet_size: usize,
    /// Successor sets, indexed `state * alphabet_size + symbol`.
    rows: Vec<BitSet>,
    initial: BitSet,
    accepting: BitSet,
    num_transitions: usize,
    trimmed: bool,
    use_cache: bool,
    cache: Option<TransitionCache>,
    /// What each alphabet symbol stands for; used by serialization and dot
    /// output only. May be empty.
    pub char_labels: Vec<String>,
    /// Debug names for states; used by dot output only. May be empty.
    pub state_labels: Vec<String>,
}

impl Nbw {
    /// Builds an automaton from a list of `(from, symbol, to)` transitions.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range or the initial/accepting sets do
    /// not have width `size`.
    pub fn new(
        size: usize,
        alphabet_size: usize,
        transitions: &[(usize, usize, usize)],
        initial: BitSet,
        accepting: BitSet,
    ) -> Self {
        assert!(size > 0, "Automaton must have at least one state");
        assert!(alphabet_size > 0, "Alphabet must not be empty");
        assert_eq!(initial.width(), size, "Initial set has wrong width");
        assert_eq!(accepting.width(), size, "Accepting set has wrong width");

        let mut rows = vec![BitSet::new(size); size * alphabet_size];
        for &(from, symbol, to) in transitions {
            assert!(from < size, "Transition from out-of-range state {}", from);
            assert!(to < size, "Transition to out-of-range state {}", to);
            assert!(symbol < alphabet_size, "Transition on out-of-range symbol {}", symbol);
            rows[from * alphabet_size + symbol].insert(to);
        }

        Self::from_parts(size, alphabet_size, rows, initial, accepting)
    }

    /// Assembles an automaton from already-built transition rows.
    pub(crate) fn from_parts(
        size: usize,
        alphabet_size: usize,
        rows: Vec<BitSet>,
        initial: BitSet,
        accepting: BitSet,
    ) -> Self {
        assert_eq!(rows.len(), size * alphabet_size);
        let num_transitions = rows.iter().map(BitSet::count).sum();
        let mut nbw = Self {
            size,
            alphabet_size,
            rows,
            initial,
            accepting,
            num_transitions,
            trimmed: false,
            use_cache: USE_TRANSITION_CACHE,
            cache: None,
            char_labels: Vec::new(),
            state_labels: Vec::new(),
        };
        nbw.rebuild_cache();
        nbw
    }

    /// The canonical automaton of the empty language: one state, no
    /// transitions, not accepting.
    pub fn empty_language(alphabet_size: usize) -> Self {
        let mut nbw = Self::from_parts(
            1,
            alphabet_size,
            vec![BitSet::new(1); alphabet_size],
            BitSet::from_indices(1, &[0]),
            BitSet::new(1),
        );
        nbw.trimmed = true;
        nbw
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of alphabet symbols.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Number of `(from, symbol, to)` transitions.
    pub fn num_transitions(&self) -> usize {
        self.num_transitions
    }

    /// The initial state set.
    pub fn initial_states(&self) -> &BitSet {
        &self.initial
    }

    /// The accepting state set.
    pub fn accepting_states(&self) -> &BitSet {
        &self.accepting
    }

    /// Whether the automaton is known to contain only useful states.
    pub fn is_trimmed(&self) -> bool {
        self.trimmed
    }

    /// The successor set of a single state on a symbol.
    pub fn successors(&self, state: usize, symbol: usize) -> &BitSet {
        assert!(state < self.size, "State {} out of range", state);
        assert!(symbol < self.alphabet_size, "Symbol {} out of range", symbol);
        &self.rows[state * self.alphabet_size + symbol]
    }

    /// Enables or disables the dense subset cache.
    ///
    /// The cache is only actually built while the automaton has at most
    /// [`CACHE_STATE_LIMIT`] states; above that the flag is remembered but
    /// has no effect.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.use_cache = enabled;
        self.rebuild_cache();
    }

    fn rebuild_cache(&mut self) {
        self.cache = (self.use_cache && self.size <= CACHE_STATE_LIMIT)
            .then(|| TransitionCache::build(self.size, self.alphabet_size, &self.rows));
    }

    /// The set transition: union of the successors of every state in
    /// `states` on `symbol`.
    pub fn transition(&self, states: &BitSet, symbol: usize) -> BitSet {
        assert_eq!(states.width(), self.size, "State set has wrong width");
        assert!(symbol < self.alphabet_size, "Symbol {} out of range", symbol);

        if let Some(cache) = &self.cache {
            return cache.lookup(states, symbol).clone();
        }
        let mut targets = BitSet::new(self.size);
        for s in states.iter() {
            targets |= &self.rows[s * self.alphabet_size + symbol];
        }
        targets
    }

    /// Per-state successor sets with symbol labels erased.
    fn successor_unions(&self) -> Vec<BitSet> {
        (0..self.size)
            .map(|s| {
                let mut all = BitSet::new(self.size);
                for a in 0..self.alphabet_size {
                    all |= &self.rows[s * self.alphabet_size + a];
                }
                all
            })
            .collect()
    }

    /// States reachable from the initial set under any symbol sequence.
    pub fn accessible_states(&self) -> BitSet {
        let unions = self.successor_unions();
        let mut accessible = self.initial.clone();
        let mut queue: Vec<usize> = self.initial.iter().collect();
        let mut next = 0;
        while next < queue.len() {
            let s = queue[next];
            next += 1;
            for t in unions[s].iter() {
                if !accessible.contains(t) {
                    accessible.insert(t);
                    queue.push(t);
                }
            }
        }
        accessible
    }

    /// States that lie on some path visiting accepting states infinitely
    /// often.
    ///
    /// An accepting state is alive iff it has a self-loop or belongs to an
    /// SCC of size at least two; everything that reaches an alive state is
    /// coaccessible.
    pub fn coaccessible_states(&self) -> BitSet {
        let unions = self.successor_unions();
        let adjacency: Vec<Vec<usize>> = unions.iter().map(|u| u.iter().collect()).collect();
        let sccs = scc::components(&adjacency);
        let sizes = sccs.sizes();

        let mut alive = BitSet::new(self.size);
        for f in self.accepting.iter() {
            if sizes[sccs.component[f]] >= 2 || unions[f].contains(f) {
                alive.insert(f);
            }
        }

        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); self.size];
        for (s, targets) in adjacency.iter().enumerate() {
            for &t in targets {
                reverse[t].push(s);
            }
        }

        let mut queue: Vec<usize> = alive.iter().collect();
        let mut next = 0;
        while next < queue.len() {
            let v = queue[next];
            next += 1;
            for &p in &reverse[v] {
                if !alive.contains(p) {
                    alive.insert(p);
                    queue.push(p);
                }
            }
        }
        alive
    }

    /// Removes states that are not both accessible and coaccessible, and
    /// renumbers the rest densely.
    ///
    /// If nothing useful remains the automaton collapses to the canonical
    /// empty-language machine. Returns the number of states removed.
    /// Idempotent; state indices held by the caller are invalid afterwards.
    pub fn trim(&mut self) -> usize {
        if self.trimmed || self.size <= 1 {
            return 0;
        }

        let mut keep = self.accessible_states();
        keep &= &self.coaccessible_states();
        let new_size = keep.count();

        if new_size == 0 {
            let removed = self.size - 1;
            let char_labels = std::mem::take(&mut self.char_labels);
            *self = Self::empty_language(self.alphabet_size);
            self.char_labels = char_labels;
            debug!("trim: language is empty, collapsed {} states", removed);
            return removed;
        }

        let old_of_new: Vec<usize> = keep.iter().collect();
        let mut new_of_old = vec![usize::MAX; self.size];
        for (new, &old) in old_of_new.iter().enumerate() {
            new_of_old[old] = new;
        }

        let mut rows = Vec::with_capacity(new_size * self.alphabet_size);
        for &old in &old_of_new {
            for a in 0..self.alphabet_size {
                let mut row = BitSet::new(new_size);
                for t in self.rows[old * self.alphabet_size + a].iter() {
                    if keep.contains(t) {
                        row.insert(new_of_old[t]);
                    }
                }
                rows.push(row);
            }
        }

        let mut initial = BitSet::new(new_size);
        let mut accepting = BitSet::new(new_size);
        for (new, &old) in old_of_new.iter().enumerate() {
            if self.initial.contains(old) {
                initial.insert(new);
            }
            if self.accepting.contains(old) {
                accepting.insert(new);
            }
        }

        let state_labels = if self.state_labels.len() >= self.size {
            old_of_new.iter().map(|&old| self.state_labels[old].clone()).collect()
        } else {
            Vec::new()
        };

        let removed = self.size - new_size;
        debug!("trim: {} -> {} states", self.size, new_size);

        self.size = new_size;
        self.rows = rows;
        self.initial = initial;
        self.accepting = accepting;
        self.num_transitions = self.rows.iter().map(BitSet::count).sum();
        self.state_labels = state_labels;
        self.trimmed = true;
        self.rebuild_cache();

        removed
    }

    /// Erases track `k` of the alphabet: for every pair of symbols differing
    /// exactly in bit `k`, both get the union of the two successor sets.
    ///
    /// This is existential elimination of the `k`-th variable.
    pub fn project(&mut self, track: usize) {
        assert!(
            (1usize << track) < self.alphabet_size,
            "Track {} out of range for alphabet of {} symbols",
            track,
            self.alphabet_size
        );

        self.trimmed = false;
        for c1 in 0..self.alphabet_size {
            let c2 = c1 ^ (1 << track);
            if c2 > c1 {
                for s in 0..self.size {
                    let i1 = s * self.alphabet_size + c1;
                    let i2 = s * self.alphabet_size + c2;
                    let mut union = self.rows[i1].clone();
                    union |= &self.rows[i2];
                    self.rows[i1] = union.clone();
                    self.rows[i2] = union;
                }
            }
        }
        self.num_transitions = self.rows.iter().map(BitSet::count).sum();
        self.rebuild_cache();
    }

    /// The automaton recognizing `L(one) ∪ L(two)`, with `two`'s states
    /// shifted past `one`'s. Both inputs are trimmed first.
    pub fn disjoint_sum(one: &mut Nbw, two: &mut Nbw) -> Nbw {
        one.trim();
        two.trim();
        assert_eq!(
            one.alphabet_size, two.alphabet_size,
            "Disjoint sum requires matching alphabets"
        );

        let size = one.size + two.size;
        let alphabet_size = one.alphabet_size;

        let mut rows = Vec::with_capacity(size * alphabet_size);
        for s in 0..one.size {
            for a in 0..alphabet_size {
                rows.push(one.rows[s * alphabet_size + a].resized(size));
            }
        }
        for s in 0..two.size {
            for a in 0..alphabet_size {
                let mut row = BitSet::new(size);
                for t in two.rows[s * alphabet_size + a].iter() {
                    row.insert(t + one.size);
                }
                rows.push(row);
            }
        }

        let mut initial = one.initial.resized(size);
        let mut accepting = one.accepting.resized(size);
        for s in two.initial.iter() {
            initial.insert(s + one.size);
        }
        for s in two.accepting.iter() {
            accepting.insert(s + one.size);
        }

        let mut sum = Nbw::from_parts(size, alphabet_size, rows, initial, accepting);
        sum.char_labels = one.char_labels.clone();
        if one.state_labels.len() >= one.size && two.state_labels.len() >= two.size {
            sum.state_labels = one
                .state_labels
                .iter()
                .map(|l| format!("1-{}", l))
                .chain(two.state_labels.iter().map(|l| format!("2-{}", l)))
                .collect();
        }
        sum
    }

    /// The synchronous product, state `(i, j)` at index `i * two.size + j`.
    ///
    /// Correct for safety intersection only: a product run visits its
    /// accepting set when both components do so simultaneously, which is
    /// stronger than Büchi intersection. Use [`Nbw::intersection`] when the
    /// Büchi semantics is needed.
    pub fn product(one: &mut Nbw, two: &mut Nbw) -> Nbw {
        one.trim();
        two.trim();
        assert_eq!(
            one.alphabet_size, two.alphabet_size,
            "Product requires matching alphabets"
        );

        let size = one.size * two.size;
        let alphabet_size = one.alphabet_size;

        let mut rows = Vec::with_capacity(size * alphabet_size);
        for i in 0..one.size {
            for j in 0..two.size {
                for a in 0..alphabet_size {
                    let mut row = BitSet::new(size);
                    for x in one.rows[i * alphabet_size + a].iter() {
                        for y in two.rows[j * alphabet_size + a].iter() {
                            row.insert(x * two.size + y);
                        }
                    }
                    rows.push(row);
                }
            }
        }

        let mut initial = BitSet::new(size);
        let mut accepting = BitSet::new(size);
        for i in 0..one.size {
            for j in 0..two.size {
                if one.initial.contains(i) && two.initial.contains(j) {
                    initial.insert(i * two.size + j);
                }
                if one.accepting.contains(i) && two.accepting.contains(j) {
                    accepting.insert(i * two.size + j);
                }
            }
        }

        let mut product = Nbw::from_parts(size, alphabet_size, rows, initial, accepting);
        product.char_labels = one.char_labels.clone();
        if one.state_labels.len() >= one.size && two.state_labels.len() >= two.size {
            product.state_labels = (0..size)
                .map(|s| {
                    format!(
                        "{} & {}",
                        one.state_labels[s / two.size],
                        two.state_labels[s % two.size]
                    )
                })
                .collect();
        }
        product
    }

    /// Büchi intersection via the standard two-copy construction.
    ///
    /// State `(p, q, phase)` lives at `(p * two.size + q) * 2 + phase`.
    /// Phase 0 waits for `one` to accept, phase 1 for `two`; the phase
    /// flips when the awaited component's source state is accepting, and
    /// the accepting states are the phase-1 states whose second component
    /// accepts.
    pub fn intersection(one: &mut Nbw, two: &mut Nbw) -> Nbw {
        one.trim();
        two.trim();
        assert_eq!(
            one.alphabet_size, two.alphabet_size,
            "Intersection requires matching alphabets"
        );

        let alphabet_size = one.alphabet_size;
        let size = one.size * two.size * 2;
        let index = |p: usize, q: usize, phase: usize| (p * two.size + q) * 2 + phase;

        let mut rows = vec![BitSet::new(size); size * alphabet_size];
        for p in 0..one.size {
            for q in 0..two.size {
                for phase in 0..2 {
                    let next_phase = match phase {
                        0 if one.accepting.contains(p) => 1,
                        1 if two.accepting.contains(q) => 0,
                        other => other,
                    };
                    for a in 0..alphabet_size {
                        let row = &mut rows[index(p, q, phase) * alphabet_size + a];
                        for x in one.rows[p * alphabet_size + a].iter() {
                            for y in two.rows[q * alphabet_size + a].iter() {
                                row.insert(index(x, y, next_phase));
                            }
                        }
                    }
                }
            }
        }

        let mut initial = BitSet::new(size);
        for p in one.initial.iter() {
            for q in two.initial.iter() {
                initial.insert(index(p, q, 0));
            }
        }
        let mut accepting = BitSet::new(size);
        for p in 0..one.size {
            for q in two.accepting.iter() {
                accepting.insert(index(p, q, 1));
            }
        }

        let mut result = Nbw::from_parts(size, alphabet_size, rows, initial, accepting);
        result.char_labels = one.char_labels.clone();
        result
    }

    /// Returns true iff the recognized language is empty. Trims first.
    pub fn is_empty(&mut self) -> bool {
        self.trim();
        if self.size > 1 {
            return false;
        }
        !(self.initial.contains(0) && self.accepting.contains(0) && self.num_transitions > 0)
    }

    /// Determinizes into a Rabin automaton via Safra's construction.
    pub fn determinize(&self) -> Drw {
        Safra::new(self)
            .run()
            .expect("Determinization without a state limit cannot fail")
    }

    /// The automaton recognizing the complement language.
    ///
    /// Trims, determinizes, and complements the Rabin automaton.
    pub fn complement(&mut self) -> Nbw {
        self.trim();
        let det = self.determinize();
        det.complement()
    }

    /// Generates a random automaton for stress tests and benchmarks.
    ///
    /// State 0 is the lone initial state and is always accepting; every
    /// other state is accepting with probability `accepting_density`, and
    /// every `(from, symbol, to)` transition is present independently with
    /// probability `transition_density`.
    pub fn random(
        size: usize,
        alphabet_size: usize,
        transition_density: f64,
        accepting_density: f64,
        rng: &mut impl Rng,
    ) -> Nbw {
        assert!(size > 0, "Automaton must have at least one state");

        let mut accepting = BitSet::from_indices(size, &[0]);
        for s in 1..size {
            if rng.gen::<f64>() < accepting_density {
                accepting.insert(s);
            }
        }

        let mut rows = vec![BitSet::new(size); size * alphabet_size];
        for s in 0..size {
            for a in 0..alphabet_size {
                for t in 0..size {
                    if rng.gen::<f64>() < transition_density {
                        rows[s * alphabet_size + a].insert(t);
                    }
                }
            }
        }

        Nbw::from_parts(
            size,
            alphabet_size,
            rows,
            BitSet::from_indices(size, &[0]),
            accepting,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two states over {a, b}: accepts words with infinitely many a's.
    pub(crate) fn inf_often_a() -> Nbw {
        Nbw::new(
            2,
            2,
            &[(0, 0, 1), (0, 1, 0), (1, 0, 1), (1, 1, 0)],
            BitSet::from_indices(2, &[0]),
            BitSet::from_indices(2, &[1]),
        )
    }

    /// One state over {a, b}: accepts every word.
    pub(crate) fn universal() -> Nbw {
        Nbw::new(
            1,
            2,
            &[(0, 0, 0), (0, 1, 0)],
            BitSet::from_indices(1, &[0]),
            BitSet::from_indices(1, &[0]),
        )
    }

    #[test]
    fn test_transition() {
        let nbw = inf_often_a();
        let both = BitSet::from_indices(2, &[0, 1]);
        assert_eq!(nbw.transition(&both, 0), BitSet::from_indices(2, &[1]));
        assert_eq!(nbw.transition(&both, 1), BitSet::from_indices(2, &[0]));
    }

    #[test]
    fn test_cache_agrees_with_rows() {
        let mut nbw = inf_often_a();
        let sets: Vec<BitSet> = (0..4).map(|v| BitSet::from_value(2, v)).collect();
        let expected: Vec<Vec<BitSet>> = sets
            .iter()
            .map(|s| (0..2).map(|a| nbw.transition(s, a)).collect())
            .collect();

        nbw.set_cache_enabled(true);
        for (s, row) in sets.iter().zip(&expected) {
            for a in 0..2 {
                assert_eq!(&nbw.transition(s, a), &row[a]);
            }
        }
    }

    #[test]
    fn test_cache_rebuilt_after_project() {
        let mut nbw = Nbw::new(
            2,
            4,
            &[(0, 0, 0), (0, 1, 1), (1, 2, 1), (1, 3, 0)],
            BitSet::from_indices(2, &[0]),
            BitSet::from_indices(2, &[0, 1]),
        );
        nbw.set_cache_enabled(true);
        nbw.project(0);

        // Symbols 0 and 1 now share successors; the cache must agree.
        let s0 = BitSet::from_indices(2, &[0]);
        assert_eq!(nbw.transition(&s0, 0), BitSet::from_indices(2, &[0, 1]));
        assert_eq!(nbw.transition(&s0, 1), BitSet::from_indices(2, &[0, 1]));
    }

    #[test]
    fn test_accessible() {
        // State 2 is unreachable.
        let nbw = Nbw::new(
            3,
            1,
            &[(0, 0, 1), (1, 0, 0), (2, 0, 0)],
            BitSet::from_indices(3, &[0]),
            BitSet::from_indices(3, &[1]),
        );
        assert_eq!(nbw.accessible_states(), BitSet::from_indices(3, &[0, 1]));
    }

    #[test]
    fn test_coaccessible_needs_live_accepting() {
        // 0 -> 1 -> 2, accepting state 1 has no cycle: nothing is alive.
        let dead_end = Nbw::new(
            3,
            1,
            &[(0, 0, 1), (1, 0, 2)],
            BitSet::from_indices(3, &[0]),
            BitSet::from_indices(3, &[1]),
        );
        assert!(dead_end.coaccessible_states().none());

        // Accepting self-loop keeps the chain alive.
        let looped = Nbw::new(
            3,
            1,
            &[(0, 0, 1), (1, 0, 2), (2, 0, 2)],
            BitSet::from_indices(3, &[0]),
            BitSet::from_indices(3, &[2]),
        );
        assert_eq!(looped.coaccessible_states(), BitSet::from_indices(3, &[0, 1, 2]));
    }

    #[test]
    fn test_trim_removes_useless_states() {
        // State 2 is a reachable dead end, state 3 unreachable.
        let mut nbw = Nbw::new(
            4,
            2,
            &[(0, 0, 1), (1, 0, 1), (0, 1, 2), (3, 0, 1)],
            BitSet::from_indices(4, &[0]),
            BitSet::from_indices(4, &[1]),
        );
        let removed = nbw.trim();
        assert_eq!(removed, 2);
        assert_eq!(nbw.size(), 2);
        assert!(nbw.is_trimmed());
        assert_eq!(nbw.trim(), 0);
        assert!(!nbw.is_empty());
    }

    #[test]
    fn test_trim_collapses_empty() {
        // Accepting state unreachable: empty language.
        let mut nbw = Nbw::new(
            3,
            1,
            &[(0, 0, 0), (2, 0, 2)],
            BitSet::from_indices(3, &[0]),
            BitSet::from_indices(3, &[2]),
        );
        let removed = nbw.trim();
        assert_eq!(removed, 2);
        assert_eq!(nbw.size(), 1);
        assert_eq!(nbw.num_transitions(), 0);
        assert!(nbw.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(!inf_often_a().is_empty());
        assert!(!universal().is_empty());
        assert!(Nbw::empty_language(2).is_empty());
    }

    #[test]
    fn test_project() {
        // Track 0 of a 2-track alphabet (4 symbols); symbol = 2*t1 + t0.
        // Only symbol 1 (t0=1, t1=0) loops through the accepting state.
        let mut nbw = Nbw::new(
            1,
            4,
            &[(0, 1, 0)],
            BitSet::from_indices(1, &[0]),
            BitSet::from_indices(1, &[0]),
        );
        nbw.project(0);
        // Symbols 0 and 1 collapse; 2 and 3 stay empty.
        assert!(nbw.successors(0, 0).contains(0));
        assert!(nbw.successors(0, 1).contains(0));
        assert!(nbw.successors(0, 2).none());
        assert!(nbw.successors(0, 3).none());
        assert!(!nbw.is_trimmed());
    }

    #[test]
    fn test_disjoint_sum() {
        let mut a = inf_often_a();
        let mut empty = Nbw::empty_language(2);
        let mut sum = Nbw::disjoint_sum(&mut a, &mut empty);
        assert_eq!(sum.size(), 3);
        assert!(!sum.is_empty());

        let mut e1 = Nbw::empty_language(2);
        let mut e2 = Nbw::empty_language(2);
        let mut sum = Nbw::disjoint_sum(&mut e1, &mut e2);
        assert!(sum.is_empty());
    }

    #[test]
    #[should_panic(expected = "matching alphabets")]
    fn test_disjoint_sum_alphabet_mismatch() {
        let mut a = inf_often_a();
        let mut b = universal();
        let mut b3 = Nbw::new(
            1,
            3,
            &[(0, 0, 0)],
            b.initial_states().clone(),
            b.accepting_states().clone(),
        );
        Nbw::disjoint_sum(&mut a, &mut b3);
    }

    #[test]
    fn test_product_of_universal_is_identity() {
        let mut a = inf_often_a();
        let mut u = universal();
        let mut product = Nbw::product(&mut a, &mut u);
        assert!(!product.is_empty());
    }

    #[test]
    fn test_intersection_inf_a_and_inf_b() {
        // Infinitely many a's AND infinitely many b's: satisfiable, but the
        // two accepting sets are never hit simultaneously.
        let mut inf_a = inf_often_a();
        let mut inf_b = Nbw::new(
            2,
            2,
            &[(0, 1, 1), (0, 0, 0), (1, 1, 1), (1, 0, 0)],
            BitSet::from_indices(2, &[0]),
            BitSet::from_indices(2, &[1]),
        );
        let mut both = Nbw::intersection(&mut inf_a, &mut inf_b);
        assert!(!both.is_empty());
    }

    #[test]
    fn test_intersection_with_empty() {
        let mut a = inf_often_a();
        let mut empty = Nbw::empty_language(2);
        let mut result = Nbw::intersection(&mut a, &mut empty);
        assert!(result.is_empty());
    }

    #[test]
    fn test_random_is_well_formed() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let nbw = Nbw::random(6, 2, 0.3, 0.5, &mut rng);
        assert_eq!(nbw.size(), 6);
        assert!(nbw.initial_states().contains(0));
        assert!(nbw.accepting_states().contains(0));
    }
}
