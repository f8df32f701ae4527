//! Safra trees: the states of the determinized automaton.
//!
//! A Safra tree is an ordered rose tree whose nodes carry a subset of the
//! NBW's states (the label), a distinct name in `1..=2N`, and a marked flag
//! that is meaningful for one transition. The tree owns a node arena indexed
//! by `name - 1`; child lists are name lists, there are no parent pointers
//! and no pointers back to the tree.
//!
//! The single-symbol transition is one recursive descent that clones each
//! node, transitions its label, suppresses states claimed by left siblings,
//! spawns a child collecting freshly accepting states, and collapses a node
//! onto itself (marking it) when its children cover its whole label. Name
//! allocation follows the original discipline: a spawn name is reserved
//! before descending so sibling numbering is stable, and names reserved but
//! not consumed are released when the transition completes.
//!
//! Tree equality is the used-name mask plus structural comparison of names,
//! labels and child order; marked flags are deliberately not part of
//! equality. Two equal trees hash identically via a precomputed digest.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::bitset::BitSet;
use crate::nbw::Nbw;
use crate::utils::{hash_bits, hash_combine};

/// Whether a freshly spawned child starts out marked.
pub const MARK_NEW_CHILDREN: bool = true;

/// One node of a Safra tree.
#[derive(Clone, Debug)]
pub struct SafraNode {
    /// Subset of NBW states tracked by this node.
    pub label: BitSet,
    /// Set when the node collapsed (or was spawned marked) in the
    /// transition that produced this tree.
    pub marked: bool,
    /// Names of the children, left to right.
    pub children: Vec<usize>,
}

/// A Safra tree with its node arena and name bookkeeping.
#[derive(Clone, Debug)]
pub struct SafraTree {
    /// Name of the root node, or `None` for the dead tree.
    root: Option<usize>,
    /// Arena slot `name - 1` holds the node of that name.
    nodes: Vec<Option<SafraNode>>,
    /// Names currently carried by some node.
    used_names: BitSet,
    /// Names marked during the transition that produced this tree.
    marked_names: BitSet,
    /// Names reserved mid-transition, released when it completes.
    temp_names: BitSet,
    /// Precomputed structural digest.
    digest: u64,
}

impl SafraTree {
    fn blank(name_width: usize) -> Self {
        Self {
            root: None,
            nodes: vec![None; name_width],
            used_names: BitSet::new(name_width),
            marked_names: BitSet::new(name_width),
            temp_names: BitSet::new(name_width),
            digest: 0,
        }
    }

    /// The dead tree: no nodes, the target of every transition out of an
    /// empty state set.
    pub fn dead(name_width: usize) -> Self {
        Self::blank(name_width)
    }

    /// Builds the initial tree of a determinization.
    ///
    /// The root is labeled with the initial states; if some but not all of
    /// them are accepting, a marked child carries the accepting part, and if
    /// all of them are accepting the root itself is marked.
    pub fn initial(nbw: &Nbw) -> Self {
        let name_width = 2 * nbw.size();
        let mut tree = Self::blank(name_width);

        let initial = nbw.initial_states().clone();
        let mut overlap = initial.clone();
        overlap &= nbw.accepting_states();

        let root = tree.allocate_name();
        if overlap.none() {
            tree.place(root, initial, false, Vec::new());
        } else if initial.is_subset_of(nbw.accepting_states()) {
            tree.place(root, initial, true, Vec::new());
            tree.marked_names.insert(root - 1);
        } else {
            let child = tree.allocate_name();
            tree.place(child, overlap, true, Vec::new());
            tree.marked_names.insert(child - 1);
            tree.place(root, initial, false, vec![child]);
        }
        tree.root = Some(root);
        tree.digest = tree.compute_digest();
        tree
    }

    /// Name of the root node, if the tree is not dead.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Returns true for the dead tree.
    pub fn is_dead(&self) -> bool {
        self.root.is_none()
    }

    /// Width of the name universe (2N).
    pub fn name_width(&self) -> usize {
        self.used_names.width()
    }

    /// Names currently in use.
    pub fn used_names(&self) -> &BitSet {
        &self.used_names
    }

    /// Names marked by the last transition.
    pub fn marked_names(&self) -> &BitSet {
        &self.marked_names
    }

    /// The node carrying `name`.
    ///
    /// # Panics
    ///
    /// Panics if no live node carries `name`.
    pub fn node(&self, name: usize) -> &SafraNode {
        self.nodes[name - 1]
            .as_ref()
            .unwrap_or_else(|| panic!("No node named {}", name))
    }

    /// Lowest free name, claimed.
    fn allocate_name(&mut self) -> usize {
        let slot = self
            .used_names
            .first_zero()
            .expect("Safra name space exhausted");
        self.used_names.insert(slot);
        slot + 1
    }

    fn free_name(&mut self, name: usize) {
        self.used_names.remove(name - 1);
        self.marked_names.remove(name - 1);
    }

    fn mark(&mut self, name: usize) {
        self.marked_names.insert(name - 1);
    }

    fn place(&mut self, name: usize, label: BitSet, marked: bool, children: Vec<usize>) {
        self.nodes[name - 1] = Some(SafraNode { label, marked, children });
    }

    /// Reserves `name` until the end of the current transition, after which
    /// it is released.
    fn reserve_temp(&mut self, name: usize) {
        self.temp_names.insert(name - 1);
    }

    fn release_temp_names(&mut self) {
        self.used_names -= &self.temp_names;
        self.temp_names.clear();
    }

    /// Frees a subtree of this (in-progress) tree: names, marks, and arena
    /// slots.
    fn free_subtree(&mut self, name: usize) {
        let node = self.nodes[name - 1].take().unwrap_or_else(|| panic!("No node named {}", name));
        self.free_name(name);
        for child in node.children {
            self.free_subtree(child);
        }
    }

    /// Parks every name of an old subtree in the new tree's temporary set,
    /// so a dying branch cannot donate its names mid-transition.
    fn park_subtree_names(&self, name: usize, next: &mut SafraTree) {
        next.reserve_temp(name);
        for &child in &self.node(name).children {
            self.park_subtree_names(child, next);
        }
    }

    /// Computes the successor tree on `symbol`.
    pub fn transition(&self, nbw: &Nbw, symbol: usize) -> SafraTree {
        let Some(root) = self.root else {
            return Self::dead(self.name_width());
        };

        let mut next = Self::blank(self.name_width());
        next.used_names = self.used_names.clone();

        let mut kill_set = BitSet::new(nbw.size());
        match self.step(root, &mut next, nbw, symbol, &mut kill_set) {
            None => Self::dead(self.name_width()),
            Some(new_root) => {
                next.root = Some(new_root);
                next.release_temp_names();
                next.digest = next.compute_digest();
                next
            }
        }
    }

    /// One node of the recursive descent. Returns the name of the cloned
    /// node in `next`, or `None` if the subtree died.
    fn step(
        &self,
        name: usize,
        next: &mut SafraTree,
        nbw: &Nbw,
        symbol: usize,
        kill_set: &mut BitSet,
    ) -> Option<usize> {
        let old = self.node(name);
        let mut label = nbw.transition(&old.label, symbol);

        // Horizontal suppression: states claimed by left siblings are gone;
        // if nothing remains the whole subtree dies.
        if label.is_subset_of(kill_set) {
            self.park_subtree_names(name, next);
            return None;
        }

        // Reserve the spawn name before descending so that sibling naming
        // is independent of whether the spawn survives.
        let spawn_name = next.allocate_name();

        label -= kill_set;

        let mut children = Vec::with_capacity(old.children.len() + 1);
        for &child in &old.children {
            if let Some(cloned) = self.step(child, next, nbw, symbol, kill_set) {
                children.push(cloned);
            }
        }

        // States of this node that just became accepting spawn a rightmost
        // child, unless the node is about to collapse.
        let mut spawn_label = label.clone();
        spawn_label &= nbw.accepting_states();
        spawn_label -= kill_set;
        *kill_set |= &spawn_label;

        let mut marked = false;
        if label.is_subset_of(kill_set) {
            // Vertical collapse: the children cover the whole label.
            for &child in &children {
                next.free_subtree(child);
            }
            children.clear();
            marked = true;
            next.mark(name);
            next.reserve_temp(spawn_name);
        } else if spawn_label.any() {
            next.place(spawn_name, spawn_label, MARK_NEW_CHILDREN, Vec::new());
            if MARK_NEW_CHILDREN {
                next.mark(spawn_name);
            }
            children.push(spawn_name);
        } else {
            next.reserve_temp(spawn_name);
        }

        *kill_set |= &label;
        next.place(name, label, marked, children);
        Some(name)
    }

    fn compute_digest(&self) -> u64 {
        match self.root {
            None => 0,
            Some(root) => self.node_digest(root),
        }
    }

    fn node_digest(&self, name: usize) -> u64 {
        let node = self.node(name);
        let mut digest = hash_combine(0, name as u64);
        digest = hash_bits(digest, &node.label);
        for &child in &node.children {
            digest = hash_combine(digest, self.node_digest(child));
        }
        digest
    }

    /// The precomputed structural digest.
    pub fn digest(&self) -> u64 {
        self.digest
    }

    fn nodes_equal(&self, name: usize, other: &SafraTree, other_name: usize) -> bool {
        if name != other_name {
            return false;
        }
        let a = self.node(name);
        let b = other.node(other_name);
        if a.label != b.label || a.children.len() != b.children.len() {
            return false;
        }
        a.children
            .iter()
            .zip(&b.children)
            .all(|(&x, &y)| self.nodes_equal(x, other, y))
    }

    fn fmt_node(&self, name: usize, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..indent {
            write!(f, "     ")?;
        }
        if indent > 0 {
            write!(f, " +-> ")?;
        }
        let node = self.node(name);
        write!(f, "[{}|{:?}]", name, node.label)?;
        if node.marked {
            write!(f, "!")?;
        }
        writeln!(f)?;
        for &child in &node.children {
            self.fmt_node(child, indent + 1, f)?;
        }
        Ok(())
    }
}

impl PartialEq for SafraTree {
    fn eq(&self, other: &Self) -> bool {
        match (self.root, other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                self.digest == other.digest
                    && self.used_names == other.used_names
                    && self.nodes_equal(a, other, b)
            }
            _ => false,
        }
    }
}

impl Eq for SafraTree {}

impl Hash for SafraTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.digest);
    }
}

impl fmt::Display for SafraTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            None => writeln!(f, "(no nodes)"),
            Some(root) => self.fmt_node(root, 0, f),
        }
    }
}
