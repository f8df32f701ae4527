//! Compiling formulas into Büchi automata and deciding validity.
//!
//! A quantifier-free conjunction becomes an automaton whose states remember
//! the previous and current slice of every track (plus one sticky bit per
//! negative literal); the quantifier prefix is then eliminated innermost
//! first, each quantifier turning into a `project` with complements placed
//! by De Morgan, and the top-level conjuncts are disjoined. A closed
//! formula is valid exactly when the final automaton is nonempty.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use log::debug;

use crate::bitset::BitSet;
use crate::logic::{Boundary, Conjunction, Formula};
use crate::nbw::Nbw;

/// Compilation failures. These are about unsupported combinations, not
/// malformed input; parsing has its own error type.
#[derive(Debug)]
pub enum CompileError {
    /// Complementation over two-way-infinite orbits is not implemented, so
    /// a ZETA formula must not negate any quantifier.
    NegationUnderZeta,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::NegationUnderZeta => {
                write!(f, "Negation is not supported for zeta-automata")
            }
        }
    }
}

impl Error for CompileError {}

/// Compiles a formula into an automaton whose language is nonempty iff the
/// formula is valid.
pub fn compile(formula: &Formula, boundary: Boundary) -> Result<Nbw, CompileError> {
    if boundary == Boundary::Zeta && formula.has_negated_quantifier() {
        return Err(CompileError::NegationUnderZeta);
    }

    let tracks = formula.track_count();
    let mut result: Option<Nbw> = None;
    for conjunct in &formula.conjuncts {
        let base = conjunction_automaton(conjunct, tracks, boundary);
        debug!(
            "compile: conjunction automaton has {} states over {} symbols",
            base.size(),
            base.alphabet_size()
        );
        let mut eliminated = apply_quantifiers(base, conjunct);
        result = Some(match result {
            None => eliminated,
            Some(mut sum) => Nbw::disjoint_sum(&mut sum, &mut eliminated),
        });
    }
    Ok(result.expect("A formula has at least one conjunct"))
}

/// Decides a closed formula: true iff it is valid.
pub fn decide(formula: &Formula, boundary: Boundary) -> Result<bool, CompileError> {
    let mut nbw = compile(formula, boundary)?;
    Ok(!nbw.is_empty())
}

/// A state of the conjunction automaton: the previous and current slice,
/// and which negative literals have already been violated somewhere.
#[derive(Clone, PartialEq, Eq, Hash)]
struct SliceState {
    prev: BitSet,
    cur: BitSet,
    neg_sat: BitSet,
}

/// Builds the automaton of a quantifier-free conjunction.
///
/// State 0 is a transitionless rejecting sink for illegal next slices and
/// state 1 the bare initial state; slice states follow in discovery order.
fn conjunction_automaton(conjunct: &Conjunction, tracks: usize, boundary: Boundary) -> Nbw {
    let alphabet_size = 1usize << tracks;
    let slices: Vec<BitSet> = (0..alphabet_size)
        .map(|c| BitSet::from_value(tracks, c as u64))
        .collect();
    let neg_count = conjunct.negative.len();

    let mut keys: Vec<Option<SliceState>> = vec![None, None];
    let mut index: HashMap<SliceState, usize> = HashMap::new();
    let mut transitions: Vec<(usize, usize, usize)> = Vec::new();
    let mut queue: Vec<usize> = Vec::new();

    let mut intern = |key: SliceState,
                      keys: &mut Vec<Option<SliceState>>,
                      queue: &mut Vec<usize>|
     -> usize {
        *index.entry(key.clone()).or_insert_with(|| {
            let state = keys.len();
            keys.push(Some(key));
            queue.push(state);
            state
        })
    };

    // The first symbol read fills the current slice; in OMEGA mode the
    // previous slice starts all-zero, in ZETA mode every previous slice is
    // possible.
    let unsat = BitSet::new(neg_count);
    match boundary {
        Boundary::Omega => {
            let zeros = BitSet::new(tracks);
            for (c, slice) in slices.iter().enumerate() {
                let state = intern(
                    SliceState {
                        prev: zeros.clone(),
                        cur: slice.clone(),
                        neg_sat: unsat.clone(),
                    },
                    &mut keys,
                    &mut queue,
                );
                transitions.push((1, c, state));
            }
        }
        Boundary::Zeta => {
            for prev in &slices {
                for (c, cur) in slices.iter().enumerate() {
                    let state = intern(
                        SliceState {
                            prev: prev.clone(),
                            cur: cur.clone(),
                            neg_sat: unsat.clone(),
                        },
                        &mut keys,
                        &mut queue,
                    );
                    transitions.push((1, c, state));
                }
            }
        }
    }

    let mut next = 0;
    while next < queue.len() {
        let state = queue[next];
        next += 1;
        let key = keys[state].clone().expect("Slice states carry keys");
        for (c, z) in slices.iter().enumerate() {
            if conjunct.holds(&key.prev, &key.cur, z) {
                let mut neg_sat = key.neg_sat.clone();
                for (n, literal) in conjunct.negative.iter().enumerate() {
                    if !literal.holds(&key.prev, &key.cur, z) {
                        neg_sat.insert(n);
                    }
                }
                let target = intern(
                    SliceState {
                        prev: key.cur.clone(),
                        cur: z.clone(),
                        neg_sat,
                    },
                    &mut keys,
                    &mut queue,
                );
                transitions.push((state, c, target));
            } else {
                transitions.push((state, c, 0));
            }
        }
    }

    let size = keys.len();
    let initial = BitSet::from_indices(size, &[1]);
    let mut accepting = BitSet::new(size);
    for (state, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            if key.neg_sat.count() == neg_count {
                accepting.insert(state);
            }
        }
    }

    let mut nbw = Nbw::new(size, alphabet_size, &transitions, initial, accepting);
    nbw.char_labels = slices.iter().map(BitSet::to_bit_string).collect();
    nbw.state_labels = keys
        .iter()
        .enumerate()
        .map(|(state, key)| match key {
            None if state == 0 => "SINK".to_string(),
            None => "INITIAL".to_string(),
            Some(key) => format!("{}:{}", key.prev, key.cur),
        })
        .collect();
    nbw
}

/// Eliminates the quantifier prefix, innermost first.
///
/// The running automaton may denote the negation of the formula built so
/// far; `negated` tracks that polarity so each complement is placed by
/// De Morgan, and a final complement restores positive polarity.
fn apply_quantifiers(mut nbw: Nbw, conjunct: &Conjunction) -> Nbw {
    let mut negated = false;
    for q in conjunct.quantifiers.iter().rev() {
        match (q.universal, q.negated, negated) {
            // ~Ax ~p == Ex p
            (true, true, true) => {
                nbw.project(q.track);
                negated = false;
            }
            // ~Ax p == Ex ~p
            (true, true, false) => {
                nbw = nbw.complement();
                nbw.project(q.track);
                negated = false;
            }
            // Ax ~p == ~Ex p
            (true, false, true) => {
                nbw.project(q.track);
                negated = true;
            }
            // Ax p == ~Ex ~p
            (true, false, false) => {
                nbw = nbw.complement();
                nbw.project(q.track);
                negated = true;
            }
            // ~Ex ~p
            (false, true, true) => {
                nbw = nbw.complement();
                nbw.project(q.track);
                negated = true;
            }
            // ~Ex p
            (false, true, false) => {
                nbw.project(q.track);
                negated = true;
            }
            // Ex ~p
            (false, false, true) => {
                nbw = nbw.complement();
                nbw.project(q.track);
                negated = false;
            }
            // Ex p
            (false, false, false) => {
                nbw.project(q.track);
                negated = false;
            }
        }
        nbw.trim();
    }

    if negated {
        nbw = nbw.complement();
        nbw.trim();
    }
    nbw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(formula: &str, rule: u8) -> bool {
        let formula = Formula::parse(formula, rule).expect("formula parses");
        decide(&formula, Boundary::Omega).expect("omega formulas compile")
    }

    #[test]
    fn test_conjunction_automaton_shape() {
        let formula = Formula::parse("(a->a)", 204).expect("parse");
        let nbw = conjunction_automaton(&formula.conjuncts[0], 1, Boundary::Omega);
        // Sink, initial, and (prev, cur) slice pairs.
        assert_eq!(nbw.alphabet_size(), 2);
        assert!(nbw.size() >= 4);
        assert!(nbw.initial_states().contains(1));
        assert!(!nbw.accepting_states().contains(0));
        assert!(!nbw.accepting_states().contains(1));
    }

    #[test]
    fn test_rule_zero_is_nilpotent_at_level_one() {
        assert!(valid("Aa Eb ((a->b) & (b->b))", 0));
    }

    #[test]
    fn test_rule_110_is_not_nilpotent_at_level_zero() {
        assert!(!valid("Aa (a->a)", 110));
    }

    #[test]
    fn test_rule_204_every_configuration_is_fixed() {
        assert!(valid("Aa (a->a)", 204));
    }

    #[test]
    fn test_rule_204_is_surjective() {
        assert!(valid("Aa Eb (b->a)", 204));
    }

    #[test]
    fn test_rule_204_is_injective() {
        // No configuration has two distinct preimages.
        assert!(valid("~Ea Eb Ec ((b->a) & (c->a) & ~(b==c))", 204));
    }

    #[test]
    fn test_rule_zero_has_no_two_fixed_points() {
        // Rule 0 sends everything to the zero configuration, which is its
        // only fixed point, so distinct fixed points cannot exist.
        assert!(!valid("Ea Eb ((a->a) & (b->b) & ~(a==b))", 0));
    }

    #[test]
    fn test_projection_makes_universal() {
        // Ea (a->a) under rule 204 holds of every orbit; its negation of
        // nothing.
        assert!(valid("Ea (a->a)", 204));
        assert!(!valid("~Ea (a->a)", 204));
    }

    #[test]
    fn test_dnf_disjunction() {
        // An invalid disjunct does not spoil a valid one.
        assert!(valid("Aa (a->a) | Aa (a->a)", 204));
        assert!(valid("Aa (a->a) | Aa (a->a)", 0) == valid("Aa (a->a)", 0));
    }

    #[test]
    fn test_zeta_without_negation() {
        let formula = Formula::parse("Ea (a->a)", 204).expect("parse");
        assert!(decide(&formula, Boundary::Zeta).expect("zeta compiles"));
    }

    #[test]
    fn test_zeta_rejects_negated_quantifiers() {
        let formula = Formula::parse("~Ea (a->a)", 204).expect("parse");
        match compile(&formula, Boundary::Zeta) {
            Err(CompileError::NegationUnderZeta) => {}
            _ => panic!("ZETA negation must be rejected"),
        }
    }
}
