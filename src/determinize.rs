//! Safra's determinization: NBW to deterministic Rabin automaton.
//!
//! The construction explores Safra trees breadth-first from the initial
//! tree. Each distinct tree becomes one DRW state; the FIFO discovery order
//! fixes the numbering, so equal inputs always produce identical automata.
//! Rabin pairs are read off the trajectory of node names across all reached
//! trees: name `k` yields the pair whose `Inf` holds the states where `k`
//! was just marked and whose `Fin` holds the states where `k` is not in
//! use.
//!
//! The whole exploration lives in a [`Safra`] runner; no state outlives the
//! call. Determinization is worst-case doubly exponential, so the runner
//! optionally enforces a state cap, reported as a [`StateLimitExceeded`]
//! value rather than a panic.

use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::fmt;

use log::debug;

use crate::bitset::BitSet;
use crate::drw::{Drw, RabinPair};
use crate::nbw::Nbw;
use crate::safra::SafraTree;

/// Whether determinization retains its Safra trees on the resulting
/// automaton for later inspection.
pub const SAVE_TREE_DATA: bool = true;

/// Soft failure of a capped determinization: the tree frontier outgrew the
/// configured state limit.
#[derive(Debug)]
pub struct StateLimitExceeded {
    /// The configured cap.
    pub limit: usize,
}

impl fmt::Display for StateLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Determinization exceeded the cap of {} states", self.limit)
    }
}

impl Error for StateLimitExceeded {}

/// A single determinization run.
pub struct Safra<'a> {
    nbw: &'a Nbw,
    state_limit: Option<usize>,
    save_trees: bool,
}

impl<'a> Safra<'a> {
    /// Prepares a determinization of `nbw` with default options.
    pub fn new(nbw: &'a Nbw) -> Self {
        Self {
            nbw,
            state_limit: None,
            save_trees: SAVE_TREE_DATA,
        }
    }

    /// Caps the number of DRW states; exceeding the cap aborts the run with
    /// a [`StateLimitExceeded`].
    pub fn state_limit(mut self, limit: usize) -> Self {
        self.state_limit = Some(limit);
        self
    }

    /// Controls whether the resulting automaton keeps its Safra trees.
    pub fn save_trees(mut self, save: bool) -> Self {
        self.save_trees = save;
        self
    }

    /// Runs the construction.
    pub fn run(self) -> Result<Drw, StateLimitExceeded> {
        let nbw = self.nbw;
        let alphabet_size = nbw.alphabet_size();

        let mut trees: Vec<SafraTree> = vec![SafraTree::initial(nbw)];
        // Digest-keyed candidate lists; candidates are confirmed by
        // structural equality.
        let mut canonical: HashMap<u64, Vec<usize>> = HashMap::new();
        canonical.insert(trees[0].digest(), vec![0]);

        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        let mut delta: Vec<usize> = Vec::new();

        while let Some(current) = queue.pop_front() {
            // FIFO discovery means states are popped in index order, so the
            // rows of `delta` line up with state numbers.
            debug_assert_eq!(delta.len(), current * alphabet_size);

            for symbol in 0..alphabet_size {
                let next = trees[current].transition(nbw, symbol);
                let existing = canonical
                    .get(&next.digest())
                    .and_then(|bucket| bucket.iter().copied().find(|&i| trees[i] == next));
                let target = match existing {
                    Some(index) => index,
                    None => {
                        let index = trees.len();
                        if let Some(limit) = self.state_limit {
                            if index >= limit {
                                return Err(StateLimitExceeded { limit });
                            }
                        }
                        canonical.entry(next.digest()).or_default().push(index);
                        trees.push(next);
                        queue.push_back(index);
                        if index % 1024 == 0 {
                            debug!(
                                "determinize: {} trees reached, {} queued",
                                index,
                                queue.len()
                            );
                        }
                        index
                    }
                };
                delta.push(target);
            }
        }

        let size = trees.len();
        debug!("determinize: done, {} Rabin states", size);

        // One candidate pair per node name; names that are never marked
        // anywhere cannot witness acceptance and are dropped.
        let mut pairs = Vec::new();
        for name_bit in 0..2 * nbw.size() {
            let mut fin = BitSet::new(size);
            let mut inf = BitSet::new(size);
            for (state, tree) in trees.iter().enumerate() {
                if tree.marked_names().contains(name_bit) {
                    inf.insert(state);
                } else if !tree.used_names().contains(name_bit) {
                    fin.insert(state);
                }
            }
            if inf.any() {
                pairs.push(RabinPair { fin, inf });
            }
        }

        Ok(Drw::from_parts(
            size,
            alphabet_size,
            delta,
            0,
            pairs,
            nbw.char_labels.clone(),
            self.save_trees.then_some(trees),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two states over {a, b}: infinitely many a's.
    fn inf_often_a() -> Nbw {
        Nbw::new(
            2,
            2,
            &[(0, 0, 1), (0, 1, 0), (1, 0, 1), (1, 1, 0)],
            BitSet::from_indices(2, &[0]),
            BitSet::from_indices(2, &[1]),
        )
    }

    fn universal() -> Nbw {
        Nbw::new(
            1,
            2,
            &[(0, 0, 0), (0, 1, 0)],
            BitSet::from_indices(1, &[0]),
            BitSet::from_indices(1, &[0]),
        )
    }

    fn check_tree_invariants(tree: &SafraTree, nbw_size: usize) {
        let Some(root) = tree.root() else {
            assert!(tree.used_names().none());
            return;
        };
        let mut names = Vec::new();
        walk(tree, root, nbw_size, &mut names);

        // Distinct names, and exactly the used-name mask.
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len(), "Duplicate node name in tree");
        let used: Vec<usize> = tree.used_names().iter().map(|i| i + 1).collect();
        assert_eq!(sorted, used);
    }

    fn walk(tree: &SafraTree, name: usize, nbw_size: usize, names: &mut Vec<usize>) {
        assert!(name >= 1 && name <= 2 * nbw_size, "Name {} out of range", name);
        names.push(name);
        let node = tree.node(name);
        assert!(node.label.any(), "Empty label");

        let mut claimed = BitSet::new(node.label.width());
        for &child in &node.children {
            let child_label = &tree.node(child).label;
            assert!(child_label.any(), "Empty child label");
            assert!(child_label.is_subset_of(&node.label), "Child exceeds parent");
            assert_ne!(child_label, &node.label, "Child equals parent");
            assert!(claimed.is_disjoint(child_label), "Sibling labels overlap");
            claimed |= child_label;
            walk(tree, child, nbw_size, names);
        }
    }

    #[test]
    fn test_inf_often_a_two_state_rabin() {
        let drw = inf_often_a().determinize();
        assert_eq!(drw.size(), 2);
        assert_eq!(drw.pairs().len(), 1);

        let pair = &drw.pairs()[0];
        assert!(pair.fin.none());
        assert_eq!(pair.inf, BitSet::from_indices(2, &[1]));

        // State 0 on 'a' reaches the marked tree, on 'b' stays put.
        assert_eq!(drw.transition(0, 0), 1);
        assert_eq!(drw.transition(0, 1), 0);
        assert_eq!(drw.transition(1, 0), 1);
        assert_eq!(drw.transition(1, 1), 0);
        assert!(!drw.is_empty());
    }

    #[test]
    fn test_universal_determinizes_nonempty() {
        let drw = universal().determinize();
        assert_eq!(drw.size(), 1);
        assert_eq!(drw.pairs().len(), 1);
        assert!(drw.pairs()[0].fin.none());
        assert!(drw.pairs()[0].inf.contains(0));
        assert!(!drw.is_empty());
    }

    #[test]
    fn test_empty_nbw_determinizes_empty() {
        let drw = Nbw::empty_language(2).determinize();
        assert!(drw.is_empty());
    }

    #[test]
    fn test_invariants_over_reached_trees() {
        let machines = vec![
            inf_often_a(),
            universal(),
            // Three states, branching structure.
            Nbw::new(
                3,
                2,
                &[
                    (0, 0, 1),
                    (0, 0, 2),
                    (0, 1, 0),
                    (1, 0, 1),
                    (1, 1, 2),
                    (2, 0, 0),
                    (2, 1, 2),
                ],
                BitSet::from_indices(3, &[0]),
                BitSet::from_indices(3, &[1, 2]),
            ),
        ];

        for nbw in &machines {
            let drw = Safra::new(nbw).run().expect("uncapped run");
            let trees = drw.trees().expect("tree data saved by default");
            assert_eq!(trees.len(), drw.size());
            for tree in trees {
                check_tree_invariants(tree, nbw.size());
            }
        }
    }

    #[test]
    fn test_state_limit_is_soft() {
        let nbw = inf_often_a();
        let err = Safra::new(&nbw).state_limit(1).run().unwrap_err();
        assert_eq!(err.limit, 1);
        assert!(Safra::new(&nbw).state_limit(16).run().is_ok());
    }

    #[test]
    fn test_tree_retention_flag() {
        let nbw = inf_often_a();
        let with = Safra::new(&nbw).run().expect("run");
        assert!(with.trees().is_some());
        let without = Safra::new(&nbw).save_trees(false).run().expect("run");
        assert!(without.trees().is_none());
    }

    #[test]
    fn test_deterministic_numbering() {
        let nbw = inf_often_a();
        let a = nbw.determinize();
        let b = nbw.determinize();
        assert_eq!(a.size(), b.size());
        for s in 0..a.size() {
            for c in 0..2 {
                assert_eq!(a.transition(s, c), b.transition(s, c));
            }
        }
    }
}
