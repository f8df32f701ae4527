//! # buchi-rs: deciding first-order properties of cellular automata
//!
//! **`buchi-rs`** is an ω-automaton engine built around three constructions:
//! nondeterministic Büchi automata with the Boolean and projection
//! operations of a decision procedure, **Safra's determinization** into
//! deterministic Rabin automata, and **Rabin-to-Büchi complementation**.
//! On top sits a small logic layer that compiles a fragment of first-order
//! logic over orbits of elementary cellular automata (ECAs) into automata:
//! a closed formula is valid exactly when the compiled automaton's language
//! is nonempty.
//!
//! ## Quick start
//!
//! ```rust
//! use buchi_rs::compile::decide;
//! use buchi_rs::logic::{Boundary, Formula};
//!
//! // Under rule 0 every configuration reaches a fixed point in one step.
//! let formula = Formula::parse("Aa Eb ((a->b) & (b->b))", 0).unwrap();
//! assert!(decide(&formula, Boundary::Omega).unwrap());
//!
//! // Rule 110 has configurations that are not fixed points.
//! let formula = Formula::parse("Aa (a->a)", 110).unwrap();
//! assert!(!decide(&formula, Boundary::Omega).unwrap());
//! ```
//!
//! ## Core components
//!
//! - **[`nbw`]**: Büchi automata — set transition, trim, track projection,
//!   disjoint sum, product, two-copy intersection, emptiness.
//! - **[`safra`]**: the labeled ordered trees that become the states of the
//!   determinized automaton. The hardest code in the crate lives here.
//! - **[`determinize`]**: the worklist construction from trees to a
//!   deterministic Rabin automaton, with Rabin pairs read off node names.
//! - **[`drw`]**: Rabin automata — emptiness by per-pair SCC analysis, and
//!   complementation back into a Büchi automaton.
//! - **[`logic`]** and **[`compile`]**: the ECA formula fragment, its
//!   parser, and the quantifier-elimination pipeline.
//! - **[`io`]** and **[`dot`]**: serialized automata (BUECHI / RABIN /
//!   GASt) and Graphviz output.

pub mod bitset;
pub mod cache;
pub mod compile;
pub mod determinize;
pub mod dot;
pub mod drw;
pub mod io;
pub mod logic;
pub mod nbw;
pub mod safra;
pub mod scc;
pub mod utils;
