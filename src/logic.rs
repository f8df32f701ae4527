//! Formulas over ECA transition literals.
//!
//! The decidable fragment: a disjunction of conjunctions of literals
//! `x ->_r y` ("track x steps to track y under ECA rule r") and `x == y`
//! (equality, which is rule 204), each conjunction under its own prefix of
//! possibly negated existential/universal quantifiers.
//!
//! Concrete syntax, as accepted by [`Formula::parse`]:
//!
//! ```text
//! Aa Eb ((b->a) & ~(a==b)) | Ec (c->c)
//! ```
//!
//! `A`/`E` quantify the following track variable, `~` negates a quantifier
//! or a literal, `->` uses the default rule, `-110>` names a rule
//! explicitly, and `==` is the identity rule 204. Variables are single
//! lowercase letters; each formula carries its own symbol table.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::bitset::BitSet;
use crate::io::ParseError;

/// The identity cellular automaton; `x == y` literals use this rule.
pub const IDENTITY_RULE: u8 = 204;

/// Boundary conditions of the modeled cellular automaton.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// One-way-infinite orbits.
    Omega,
    /// Two-way-infinite orbits (experimental; negation unsupported).
    Zeta,
}

/// A single transition assertion between two tracks.
#[derive(Debug, Clone)]
pub struct Literal {
    /// Source track index.
    pub left: usize,
    /// Target track index.
    pub right: usize,
    /// The 8-bit ECA rule relating them.
    pub rule: u8,
    pub negated: bool,
}

impl Literal {
    pub fn new(left: usize, right: usize, rule: u8, negated: bool) -> Self {
        Self { left, right, rule, negated }
    }

    /// Whether the literal's body holds between consecutive slices,
    /// ignoring negation: the rule applied to the `left` track's
    /// neighborhood `(x, y, z)` must produce the `right` track's current
    /// cell.
    pub fn holds(&self, x: &BitSet, y: &BitSet, z: &BitSet) -> bool {
        let neighborhood = 4 * usize::from(x.contains(self.left))
            + 2 * usize::from(y.contains(self.left))
            + usize::from(z.contains(self.left));
        (self.rule >> neighborhood) & 1 == u8::from(y.contains(self.right))
    }
}

/// One quantifier of a prefix.
#[derive(Debug, Clone)]
pub struct Quantifier {
    pub negated: bool,
    pub universal: bool,
    /// The quantified track.
    pub track: usize,
}

/// A conjunction of literals under a quantifier prefix.
///
/// The prefix is stored outermost-first.
#[derive(Debug, Clone, Default)]
pub struct Conjunction {
    pub quantifiers: Vec<Quantifier>,
    pub positive: Vec<Literal>,
    pub negative: Vec<Literal>,
}

impl Conjunction {
    /// Adds a literal to the appropriate polarity list.
    pub fn add_literal(&mut self, literal: Literal) {
        if literal.negated {
            self.negative.push(literal);
        } else {
            self.positive.push(literal);
        }
    }

    /// Whether every positive literal holds between the given slices.
    /// Negative literals are not consulted.
    pub fn holds(&self, x: &BitSet, y: &BitSet, z: &BitSet) -> bool {
        self.positive.iter().all(|l| l.holds(x, y, z))
    }
}

/// A formula in disjunctive normal form with a per-formula symbol table.
#[derive(Debug, Clone)]
pub struct Formula {
    pub conjuncts: Vec<Conjunction>,
    /// Track variable names, indexed by track.
    pub variables: Vec<char>,
}

impl Formula {
    /// Number of track variables.
    pub fn track_count(&self) -> usize {
        self.variables.len()
    }

    /// Whether any quantifier anywhere carries a negation.
    pub fn has_negated_quantifier(&self) -> bool {
        self.conjuncts
            .iter()
            .flat_map(|c| &c.quantifiers)
            .any(|q| q.negated)
    }

    /// Parses the concrete syntax. Literals written with `->` get
    /// `default_rule`.
    pub fn parse(input: &str, default_rule: u8) -> Result<Formula, ParseError> {
        let mut parser = Parser {
            chars: input.chars().peekable(),
            variables: Vec::new(),
            default_rule,
        };
        let formula = parser.formula()?;
        parser.skip_whitespace();
        if let Some(c) = parser.chars.peek() {
            return Err(ParseError::format(format!("Unexpected character '{}'", c)));
        }
        Ok(formula)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, conjunct) in self.conjuncts.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            for q in &conjunct.quantifiers {
                if q.negated {
                    write!(f, "~")?;
                }
                write!(
                    f,
                    "{}{} ",
                    if q.universal { 'A' } else { 'E' },
                    self.variables[q.track]
                )?;
            }
            write!(f, "(")?;
            let all: Vec<&Literal> = conjunct.positive.iter().chain(&conjunct.negative).collect();
            for (j, literal) in all.iter().enumerate() {
                if j > 0 {
                    write!(f, " & ")?;
                }
                if literal.negated {
                    write!(f, "~(")?;
                }
                let op = if literal.rule == IDENTITY_RULE { "==" } else { "->" };
                write!(
                    f,
                    "{}{}{}",
                    self.variables[literal.left], op, self.variables[literal.right]
                )?;
                if literal.negated {
                    write!(f, ")")?;
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    variables: Vec<char>,
    default_rule: u8,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().copied()
    }

    fn eat(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.chars.next();
                Ok(())
            }
            Some(c) => Err(ParseError::format(format!(
                "Expected '{}', found '{}'",
                expected, c
            ))),
            None => Err(ParseError::format(format!(
                "Expected '{}', found end of input",
                expected
            ))),
        }
    }

    fn variable(&mut self) -> Result<usize, ParseError> {
        match self.peek() {
            Some(c) if c.is_ascii_lowercase() => {
                self.chars.next();
                Ok(self.track_of(c))
            }
            Some(c) => Err(ParseError::format(format!(
                "Expected a track variable, found '{}'",
                c
            ))),
            None => Err(ParseError::format("Expected a track variable, found end of input")),
        }
    }

    fn track_of(&mut self, var: char) -> usize {
        match self.variables.iter().position(|&v| v == var) {
            Some(i) => i,
            None => {
                self.variables.push(var);
                self.variables.len() - 1
            }
        }
    }

    fn formula(&mut self) -> Result<Formula, ParseError> {
        let mut conjuncts = vec![self.conjunct()?];
        while self.peek() == Some('|') {
            self.eat('|')?;
            conjuncts.push(self.conjunct()?);
        }
        Ok(Formula {
            conjuncts,
            variables: self.variables.clone(),
        })
    }

    fn conjunct(&mut self) -> Result<Conjunction, ParseError> {
        let mut conjunction = Conjunction::default();

        loop {
            match self.peek() {
                Some('(') => break,
                Some('~') => {
                    // A negation here may belong to a quantifier or open a
                    // negated-literal-only body; only the former is legal
                    // outside parentheses.
                    self.eat('~')?;
                    let universal = self.quantifier_kind()?;
                    let track = self.variable()?;
                    conjunction.quantifiers.push(Quantifier {
                        negated: true,
                        universal,
                        track,
                    });
                }
                Some('A') | Some('E') => {
                    let universal = self.quantifier_kind()?;
                    let track = self.variable()?;
                    conjunction.quantifiers.push(Quantifier {
                        negated: false,
                        universal,
                        track,
                    });
                }
                Some(c) => {
                    return Err(ParseError::format(format!(
                        "Expected a quantifier or '(', found '{}'",
                        c
                    )))
                }
                None => return Err(ParseError::format("Unexpected end of formula")),
            }
        }

        self.eat('(')?;
        self.literal(&mut conjunction)?;
        while self.peek() == Some('&') {
            self.eat('&')?;
            self.literal(&mut conjunction)?;
        }
        self.eat(')')?;
        Ok(conjunction)
    }

    fn quantifier_kind(&mut self) -> Result<bool, ParseError> {
        match self.peek() {
            Some('A') => {
                self.chars.next();
                Ok(true)
            }
            Some('E') => {
                self.chars.next();
                Ok(false)
            }
            Some(c) => Err(ParseError::format(format!(
                "Expected 'A' or 'E', found '{}'",
                c
            ))),
            None => Err(ParseError::format("Expected 'A' or 'E', found end of input")),
        }
    }

    fn literal(&mut self, conjunction: &mut Conjunction) -> Result<(), ParseError> {
        let negated = self.peek() == Some('~');
        if negated {
            self.eat('~')?;
            self.eat('(')?;
        } else if self.peek() == Some('(') {
            self.eat('(')?;
            let literal = self.atom(false)?;
            conjunction.add_literal(literal);
            self.eat(')')?;
            return Ok(());
        }

        let literal = self.atom(negated)?;
        conjunction.add_literal(literal);
        if negated {
            self.eat(')')?;
        }
        Ok(())
    }

    fn atom(&mut self, negated: bool) -> Result<Literal, ParseError> {
        let left = self.variable()?;
        let rule = match self.peek() {
            Some('-') => {
                self.eat('-')?;
                let mut digits = String::new();
                while self.chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    digits.push(self.chars.next().expect("digit present"));
                }
                if digits.is_empty() {
                    self.eat('>')?;
                    self.default_rule
                } else {
                    self.eat('>')?;
                    digits
                        .parse::<u8>()
                        .map_err(|_| ParseError::format(format!("Rule {} is not an 8-bit ECA", digits)))?
                }
            }
            Some('=') => {
                self.eat('=')?;
                self.eat('=')?;
                IDENTITY_RULE
            }
            Some(c) => {
                return Err(ParseError::format(format!(
                    "Expected '->', '-n>' or '==', found '{}'",
                    c
                )))
            }
            None => return Err(ParseError::format("Unexpected end of literal")),
        };
        let right = self.variable()?;
        Ok(Literal::new(left, right, rule, negated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantified_conjunction() {
        let f = Formula::parse("Aa Eb ((b->a) & ~(a==b))", 110).expect("parse");
        assert_eq!(f.conjuncts.len(), 1);
        assert_eq!(f.variables, vec!['a', 'b']);

        let c = &f.conjuncts[0];
        assert_eq!(c.quantifiers.len(), 2);
        assert!(c.quantifiers[0].universal);
        assert!(!c.quantifiers[0].negated);
        assert_eq!(c.quantifiers[0].track, 0);
        assert!(!c.quantifiers[1].universal);
        assert_eq!(c.quantifiers[1].track, 1);

        assert_eq!(c.positive.len(), 1);
        assert_eq!(c.positive[0].left, 1);
        assert_eq!(c.positive[0].right, 0);
        assert_eq!(c.positive[0].rule, 110);

        assert_eq!(c.negative.len(), 1);
        assert_eq!(c.negative[0].rule, IDENTITY_RULE);
        assert!(c.negative[0].negated);
    }

    #[test]
    fn test_parse_negated_quantifier_and_dnf() {
        let f = Formula::parse("~Ea (a->a) | (b->b)", 0).expect("parse");
        assert_eq!(f.conjuncts.len(), 2);
        assert!(f.conjuncts[0].quantifiers[0].negated);
        assert!(!f.conjuncts[0].quantifiers[0].universal);
        assert!(f.has_negated_quantifier());
        // Variables accumulate across conjuncts.
        assert_eq!(f.variables, vec!['a', 'b']);
    }

    #[test]
    fn test_parse_explicit_rule() {
        let f = Formula::parse("(a-110>b)", 0).expect("parse");
        assert_eq!(f.conjuncts[0].positive[0].rule, 110);
    }

    #[test]
    fn test_parse_bare_literal_body() {
        let f = Formula::parse("Ea (a->a)", 204).expect("parse");
        assert_eq!(f.conjuncts[0].positive[0].rule, 204);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Formula::parse("", 0).is_err());
        assert!(Formula::parse("Aa", 0).is_err());
        assert!(Formula::parse("(a->b", 0).is_err());
        assert!(Formula::parse("(a>b)", 0).is_err());
        assert!(Formula::parse("(a-999>b)", 0).is_err());
        assert!(Formula::parse("(a->b) trailing", 0).is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let f = Formula::parse("~Aa Eb ((b->a) & ~(a==b))", 0).expect("parse");
        let printed = f.to_string();
        assert_eq!(printed, "~Aa Eb (b->a & ~(a==b))");
        let again = Formula::parse(&printed, 0).expect("reparse");
        assert_eq!(again.conjuncts[0].positive.len(), 1);
        assert_eq!(again.conjuncts[0].negative.len(), 1);
    }

    #[test]
    fn test_literal_holds_identity() {
        // Rule 204 copies y: bit (4x + 2y + z) of 204 equals y.
        let literal = Literal::new(0, 1, IDENTITY_RULE, false);
        let k = 2;
        for xv in 0..2u64 {
            for yv in 0..4u64 {
                for zv in 0..2u64 {
                    let x = BitSet::from_value(k, xv);
                    let y = BitSet::from_value(k, yv);
                    let z = BitSet::from_value(k, zv);
                    // Holds iff y[0] == y[1].
                    let expected = y.contains(0) == y.contains(1);
                    assert_eq!(literal.holds(&x, &y, &z), expected);
                }
            }
        }
    }

    #[test]
    fn test_literal_holds_rule_zero() {
        // Rule 0 maps every neighborhood to 0, so the literal holds iff the
        // target cell is 0.
        let literal = Literal::new(0, 1, 0, false);
        let x = BitSet::from_value(2, 0);
        let z = BitSet::from_value(2, 0);
        assert!(literal.holds(&x, &BitSet::from_value(2, 0b00), &z));
        assert!(!literal.holds(&x, &BitSet::from_value(2, 0b10), &z));
    }
}
