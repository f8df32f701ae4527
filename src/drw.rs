//! Deterministic Rabin automata.
//!
//! A [`Drw`] has a total transition table, a single initial state and a list
//! of [`RabinPair`]s. A run is accepting iff for some pair it visits `fin`
//! finitely often and `inf` infinitely often. Every state is assumed
//! reachable, which holds for automata produced by Safra's construction and
//! is irrelevant for the ones read from files (unreachable states cannot
//! change emptiness of the reachable part explored from the initial state,
//! but we keep the original contract and analyse the whole graph).

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;

use log::debug;

use crate::bitset::BitSet;
use crate::nbw::Nbw;
use crate::safra::SafraTree;
use crate::scc;

/// One Rabin acceptance pair.
#[derive(Clone, Debug)]
pub struct RabinPair {
    /// States that may be visited only finitely often.
    pub fin: BitSet,
    /// States of which some must be visited infinitely often.
    pub inf: BitSet,
}

/// A deterministic Rabin automaton.
#[derive(Debug)]
pub struct Drw {
    size: usize,
    alphabet_size: usize,
    /// Target state, indexed `state * alphabet_size + symbol`. Total.
    delta: Vec<usize>,
    initial: usize,
    pairs: Vec<RabinPair>,
    /// What each alphabet symbol stands for; used by dot output only.
    pub char_labels: Vec<String>,
    /// The Safra trees behind each state, when the determinization was run
    /// with tree retention on.
    trees: Option<Vec<SafraTree>>,
}

impl Drw {
    /// Assembles an automaton from its parts.
    pub(crate) fn from_parts(
        size: usize,
        alphabet_size: usize,
        delta: Vec<usize>,
        initial: usize,
        pairs: Vec<RabinPair>,
        char_labels: Vec<String>,
        trees: Option<Vec<SafraTree>>,
    ) -> Self {
        assert_eq!(delta.len(), size * alphabet_size, "Transition table not total");
        assert!(initial < size, "Initial state out of range");
        for (i, target) in delta.iter().enumerate() {
            assert!(*target < size, "Transition {} targets out-of-range state", i);
        }
        for pair in &pairs {
            assert_eq!(pair.fin.width(), size, "Rabin pair has wrong width");
            assert_eq!(pair.inf.width(), size, "Rabin pair has wrong width");
        }
        Self {
            size,
            alphabet_size,
            delta,
            initial,
            pairs,
            char_labels,
            trees,
        }
    }

    /// Builds an automaton from an explicit table; mainly for tests and
    /// parsed files.
    pub fn new(
        size: usize,
        alphabet_size: usize,
        delta: Vec<usize>,
        initial: usize,
        pairs: Vec<RabinPair>,
    ) -> Self {
        Self::from_parts(size, alphabet_size, delta, initial, pairs, Vec::new(), None)
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of alphabet symbols.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// The initial state.
    pub fn initial_state(&self) -> usize {
        self.initial
    }

    /// The Rabin pairs.
    pub fn pairs(&self) -> &[RabinPair] {
        &self.pairs
    }

    /// The successor of `state` on `symbol`.
    pub fn transition(&self, state: usize, symbol: usize) -> usize {
        assert!(state < self.size, "State {} out of range", state);
        assert!(symbol < self.alphabet_size, "Symbol {} out of range", symbol);
        self.delta[state * self.alphabet_size + symbol]
    }

    /// The retained Safra trees, one per state, if the determinization kept
    /// them.
    pub fn trees(&self) -> Option<&[SafraTree]> {
        self.trees.as_deref()
    }

    /// Indented dump of the Safra tree behind every state, or `None` when
    /// tree data was not retained.
    pub fn tree_dump(&self) -> Option<String> {
        let trees = self.trees()?;
        let mut out = String::new();
        writeln!(out, "{} states:", self.size).expect("String write cannot fail");
        for (state, tree) in trees.iter().enumerate() {
            writeln!(out, "s{}:", state + 1).expect("String write cannot fail");
            write!(out, "{}", tree).expect("String write cannot fail");
        }
        Some(out)
    }

    /// Returns true iff no Rabin pair is satisfiable.
    ///
    /// A pair `(fin, inf)` is satisfiable iff the graph restricted to the
    /// states outside `fin` has an `inf`-state with a self-loop, or an SCC
    /// of size at least two containing an `inf`-state.
    pub fn is_empty(&self) -> bool {
        for pair in &self.pairs {
            // Fast path: a self-loop on an inf-state outside fin.
            for state in pair.inf.iter() {
                if pair.fin.contains(state) {
                    continue;
                }
                if (0..self.alphabet_size).any(|a| self.transition(state, a) == state) {
                    return false;
                }
            }

            // SCCs of the graph with fin-states removed.
            let adjacency: Vec<Vec<usize>> = (0..self.size)
                .map(|state| {
                    if pair.fin.contains(state) {
                        return Vec::new();
                    }
                    let mut targets: Vec<usize> = (0..self.alphabet_size)
                        .map(|a| self.transition(state, a))
                        .filter(|&t| !pair.fin.contains(t))
                        .collect();
                    targets.sort_unstable();
                    targets.dedup();
                    targets
                })
                .collect();
            let sccs = scc::components(&adjacency);
            let sizes = sccs.sizes();
            if pair.inf.iter().any(|s| !pair.fin.contains(s) && sizes[sccs.component[s]] >= 2) {
                return false;
            }
        }
        true
    }

    /// The NBW recognizing the complement language.
    ///
    /// States are either *initial-part* states `(q, -, -)` carrying only a
    /// Rabin state, or *tracking* states `(q, s1, s2)` where `s1` holds the
    /// pairs whose `fin` was hit and `s2` the pairs whose `inf` was hit
    /// since the last reset. When `s2` sinks into `s1` both are cleared of
    /// the common pairs; the accepting states are the tracking states with
    /// `s2` empty. A word is accepted iff every pair is disqualified along
    /// the run, which is exactly non-acceptance by the Rabin automaton.
    pub fn complement(&self) -> Nbw {
        #[derive(Clone, PartialEq, Eq, Hash)]
        struct CompState {
            rabin: usize,
            /// `None` in the initial part, `(s1, s2)` when tracking.
            tracking: Option<(BitSet, BitSet)>,
        }

        let num_pairs = self.pairs.len();
        let fresh = || (BitSet::new(num_pairs), BitSet::new(num_pairs));

        let mut states: Vec<CompState> = Vec::new();
        let mut index: HashMap<CompState, usize> = HashMap::new();
        let mut transitions: Vec<(usize, usize, usize)> = Vec::new();
        let mut queue: VecDeque<usize> = VecDeque::new();

        let mut intern = |state: CompState,
                          states: &mut Vec<CompState>,
                          queue: &mut VecDeque<usize>|
         -> usize {
            *index.entry(state.clone()).or_insert_with(|| {
                let i = states.len();
                states.push(state);
                queue.push_back(i);
                i
            })
        };

        let start = CompState {
            rabin: self.initial,
            tracking: None,
        };
        intern(start, &mut states, &mut queue);

        while let Some(current) = queue.pop_front() {
            let source = states[current].clone();
            for symbol in 0..self.alphabet_size {
                let q = self.transition(source.rabin, symbol);
                match &source.tracking {
                    None => {
                        // Stay in the initial part, or start tracking; both
                        // successors coexist nondeterministically.
                        let stay = intern(
                            CompState { rabin: q, tracking: None },
                            &mut states,
                            &mut queue,
                        );
                        transitions.push((current, symbol, stay));
                        let enter = intern(
                            CompState { rabin: q, tracking: Some(fresh()) },
                            &mut states,
                            &mut queue,
                        );
                        transitions.push((current, symbol, enter));
                    }
                    Some((s1, s2)) => {
                        let mut s1 = s1.clone();
                        let mut s2 = s2.clone();
                        for (i, pair) in self.pairs.iter().enumerate() {
                            if pair.fin.contains(q) {
                                s1.insert(i);
                            } else if pair.inf.contains(q) {
                                s2.insert(i);
                            }
                        }
                        // A fin hit extinguishes a pending inf hit.
                        if s2.is_subset_of(&s1) {
                            s1 -= &s2;
                            s2.clear();
                        }
                        let target = intern(
                            CompState { rabin: q, tracking: Some((s1, s2)) },
                            &mut states,
                            &mut queue,
                        );
                        transitions.push((current, symbol, target));
                    }
                }
            }
        }

        let size = states.len();
        debug!("complement: {} Rabin states -> {} Buchi states", self.size, size);

        let initial = BitSet::from_indices(size, &[0]);
        let mut accepting = BitSet::new(size);
        let mut state_labels = Vec::with_capacity(size);
        for (i, state) in states.iter().enumerate() {
            match &state.tracking {
                None => state_labels.push(format!("({}, initial)", state.rabin + 1)),
                Some((s1, s2)) => {
                    if s2.none() {
                        accepting.insert(i);
                    }
                    state_labels.push(format!("({},{},{})", state.rabin + 1, s1, s2));
                }
            }
        }

        let mut nbw = Nbw::new(size, self.alphabet_size, &transitions, initial, accepting);
        nbw.char_labels = self.char_labels.clone();
        nbw.state_labels = state_labels;
        nbw
    }
}
