//! Text formats for serialized automata.
//!
//! Three formats are supported, all line oriented with `#`-prefixed comment
//! lines ignored and 1-based state/symbol indices unless noted:
//!
//! # BUECHI (NBW)
//!
//! ```text
//! BUECHI
//! <N>
//! <sigma>
//! <M>                     # number of transitions
//! <from> > <symbol> > <to>
//! ...                     # M transition lines
//! <i1> <i2> ...           # initial states
//! <f1> <f2> ...           # accepting states
//! ```
//!
//! # RABIN (DRW)
//!
//! ```text
//! RABIN
//! <N>
//! <sigma>
//! <from> > <symbol> > <to>
//! ...                     # N * sigma transition lines
//! <q0>                    # initial state
//! <fins> | <infs>         # one line per Rabin pair
//! ```
//!
//! # GASt (NBW)
//!
//! A header-less variant: the state count, then an alphabet string whose
//! length is the alphabet size, then the single accepting state, then
//! `<from> <char> <to>` lines until the end. GASt indices are 0-based and
//! the first state is initial.
//!
//! Parsing the output of the writers yields an automaton with the same
//! transition relation and state sets.

use std::error::Error;
use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::bitset::BitSet;
use crate::drw::{Drw, RabinPair};
use crate::nbw::Nbw;

/// Error type for malformed input: files, serialized automata, or formulas.
#[derive(Debug)]
pub enum ParseError {
    /// File I/O error.
    Io(std::io::Error),
    /// Malformed content, with a message.
    Format(String),
}

impl ParseError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ParseError::Format(message.into())
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "I/O error: {}", e),
            ParseError::Format(message) => write!(f, "Parse error: {}", message),
        }
    }
}

impl Error for ParseError {}

/// Lines that carry data: comments and blank lines are skipped.
fn data_lines(input: &str) -> impl Iterator<Item = &str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn parse_usize(token: &str, what: &str) -> Result<usize, ParseError> {
    token
        .parse::<usize>()
        .map_err(|_| ParseError::format(format!("Expected {}, found '{}'", what, token)))
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<&'a str, ParseError> {
    lines
        .next()
        .ok_or_else(|| ParseError::format(format!("Unexpected end of input, expected {}", what)))
}

/// Parses a `<from> > <symbol> > <to>` line, 1-based.
fn parse_arrow_line(line: &str) -> Result<(usize, usize, usize), ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        &[from, arrow1, symbol, arrow2, to] if arrow1 == ">" && arrow2 == ">" => Ok((
            parse_usize(from, "a state")?,
            parse_usize(symbol, "a symbol")?,
            parse_usize(to, "a state")?,
        )),
        _ => Err(ParseError::format(format!("Malformed transition line '{}'", line))),
    }
}

fn parse_state_list(line: &str, size: usize, what: &str) -> Result<BitSet, ParseError> {
    let mut set = BitSet::new(size);
    for token in line.split_whitespace() {
        let state = parse_usize(token, what)?;
        if state == 0 || state > size {
            return Err(ParseError::format(format!(
                "{} {} out of range 1..={}",
                what, state, size
            )));
        }
        set.insert(state - 1);
    }
    Ok(set)
}

impl Nbw {
    /// Parses a serialized NBW, auto-detecting BUECHI/BUCHI vs GASt.
    pub fn parse_str(input: &str) -> Result<Nbw, ParseError> {
        let mut lines = data_lines(input);
        let first = next_line(&mut lines, "a format header")?;
        match first {
            "BUECHI" | "BUCHI" => Self::parse_buechi(&mut lines),
            other => Self::parse_gast(other, &mut lines),
        }
    }

    /// Reads an automaton from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Nbw, ParseError> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Writes the automaton to a file in BUECHI format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ParseError> {
        fs::write(path, self.to_buechi_string())?;
        Ok(())
    }

    fn parse_buechi<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Result<Nbw, ParseError> {
        let size = parse_usize(next_line(lines, "the state count")?, "the state count")?;
        let alphabet_size =
            parse_usize(next_line(lines, "the alphabet size")?, "the alphabet size")?;
        let count = parse_usize(
            next_line(lines, "the transition count")?,
            "the transition count",
        )?;
        if size == 0 {
            return Err(ParseError::format("Automaton must have at least one state"));
        }

        let mut transitions = Vec::with_capacity(count);
        for _ in 0..count {
            let (from, symbol, to) = parse_arrow_line(next_line(lines, "a transition")?)?;
            if from == 0 || from > size || to == 0 || to > size {
                return Err(ParseError::format(format!(
                    "Transition {} > {} > {} out of range",
                    from, symbol, to
                )));
            }
            if symbol == 0 || symbol > alphabet_size {
                return Err(ParseError::format(format!("Symbol {} out of range", symbol)));
            }
            transitions.push((from - 1, symbol - 1, to - 1));
        }

        let initial = parse_state_list(next_line(lines, "initial states")?, size, "Initial state")?;
        // An automaton without accepting states writes a blank line, which
        // the comment filter swallows; treat a missing line as the empty set.
        let accepting = match lines.next() {
            Some(line) => parse_state_list(line, size, "Accepting state")?,
            None => BitSet::new(size),
        };

        Ok(Nbw::new(size, alphabet_size, &transitions, initial, accepting))
    }

    /// GASt: `first` already holds the state count.
    fn parse_gast<'a>(
        first: &str,
        lines: &mut impl Iterator<Item = &'a str>,
    ) -> Result<Nbw, ParseError> {
        let size = parse_usize(first, "the state count")?;
        if size == 0 {
            return Err(ParseError::format("Automaton must have at least one state"));
        }
        let alphabet: Vec<char> = next_line(lines, "the alphabet string")?.chars().collect();
        let alphabet_size = alphabet.len();
        if alphabet_size == 0 {
            return Err(ParseError::format("Empty alphabet string"));
        }

        let accept = parse_usize(next_line(lines, "the accepting state")?, "the accepting state")?;
        if accept >= size {
            return Err(ParseError::format(format!("Accepting state {} out of range", accept)));
        }

        let mut transitions = Vec::new();
        for line in lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let &[from, symbol, to] = tokens.as_slice() else {
                return Err(ParseError::format(format!("Malformed GASt transition '{}'", line)));
            };
            let from = parse_usize(from, "a state")?;
            let to = parse_usize(to, "a state")?;
            if from >= size || to >= size {
                return Err(ParseError::format(format!(
                    "GASt transition {} {} {} out of range",
                    from, symbol, to
                )));
            }
            let mut chars = symbol.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(ParseError::format(format!("Malformed GASt symbol '{}'", symbol)));
            };
            let Some(symbol) = alphabet.iter().position(|&a| a == c) else {
                return Err(ParseError::format(format!("Symbol '{}' not in alphabet", c)));
            };
            transitions.push((from, symbol, to));
        }

        Ok(Nbw::new(
            size,
            alphabet_size,
            &transitions,
            BitSet::from_indices(size, &[0]),
            BitSet::from_indices(size, &[accept]),
        ))
    }

    /// Serializes in BUECHI format; [`Nbw::parse_str`] reads it back.
    pub fn to_buechi_string(&self) -> String {
        let mut out = String::new();
        let w = &mut out;
        writeln!(w, "#----- omega-automaton (NBW) -----").expect("String write cannot fail");
        writeln!(w, "BUECHI").expect("String write cannot fail");
        writeln!(w, "# Number of states:").expect("String write cannot fail");
        writeln!(w, "{}", self.size()).expect("String write cannot fail");
        for (i, label) in self.state_labels.iter().enumerate() {
            writeln!(w, "# {}:{}", i + 1, label).expect("String write cannot fail");
        }
        writeln!(w, "# Size of alphabet:").expect("String write cannot fail");
        writeln!(w, "{}", self.alphabet_size()).expect("String write cannot fail");
        for (i, label) in self.char_labels.iter().enumerate() {
            writeln!(w, "# {}:{}", i + 1, label).expect("String write cannot fail");
        }
        writeln!(w, "# Number of transitions:").expect("String write cannot fail");
        writeln!(w, "{}", self.num_transitions()).expect("String write cannot fail");
        writeln!(w, "# List of transitions:").expect("String write cannot fail");
        for from in 0..self.size() {
            for symbol in 0..self.alphabet_size() {
                for to in self.successors(from, symbol).iter() {
                    writeln!(w, "{} > {} > {}", from + 1, symbol + 1, to + 1)
                        .expect("String write cannot fail");
                }
            }
        }
        writeln!(w, "# Initial state(s)").expect("String write cannot fail");
        writeln!(w, "{}", join_states(self.initial_states())).expect("String write cannot fail");
        writeln!(w, "# Final state(s)").expect("String write cannot fail");
        writeln!(w, "{}", join_states(self.accepting_states())).expect("String write cannot fail");
        writeln!(w, "# EOF").expect("String write cannot fail");
        out
    }
}

fn join_states(set: &BitSet) -> String {
    set.iter()
        .map(|s| (s + 1).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Drw {
    /// Parses a serialized RABIN automaton.
    pub fn parse_str(input: &str) -> Result<Drw, ParseError> {
        let mut lines = data_lines(input);
        let header = next_line(&mut lines, "the RABIN header")?;
        if header != "RABIN" {
            return Err(ParseError::format(format!(
                "Expected RABIN header, found '{}'",
                header
            )));
        }

        let size = parse_usize(next_line(&mut lines, "the state count")?, "the state count")?;
        let alphabet_size = parse_usize(
            next_line(&mut lines, "the alphabet size")?,
            "the alphabet size",
        )?;
        if size == 0 {
            return Err(ParseError::format("Automaton must have at least one state"));
        }

        let mut delta = vec![usize::MAX; size * alphabet_size];
        for _ in 0..size * alphabet_size {
            let (from, symbol, to) = parse_arrow_line(next_line(&mut lines, "a transition")?)?;
            if from == 0 || from > size || to == 0 || to > size {
                return Err(ParseError::format(format!(
                    "Transition {} > {} > {} out of range",
                    from, symbol, to
                )));
            }
            if symbol == 0 || symbol > alphabet_size {
                return Err(ParseError::format(format!("Symbol {} out of range", symbol)));
            }
            delta[(from - 1) * alphabet_size + (symbol - 1)] = to - 1;
        }
        if delta.contains(&usize::MAX) {
            return Err(ParseError::format("Transition table is not total"));
        }

        let initial = parse_usize(next_line(&mut lines, "the initial state")?, "the initial state")?;
        if initial == 0 || initial > size {
            return Err(ParseError::format(format!("Initial state {} out of range", initial)));
        }

        let mut pairs = Vec::new();
        for line in lines {
            let Some((fins, infs)) = line.split_once('|') else {
                return Err(ParseError::format(format!("Malformed Rabin pair '{}'", line)));
            };
            pairs.push(RabinPair {
                fin: parse_state_list(fins, size, "Fin state")?,
                inf: parse_state_list(infs, size, "Inf state")?,
            });
        }

        Ok(Drw::new(size, alphabet_size, delta, initial - 1, pairs))
    }

    /// Reads an automaton from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Drw, ParseError> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Writes the automaton to a file in RABIN format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ParseError> {
        fs::write(path, self.to_rabin_string())?;
        Ok(())
    }

    /// Serializes in RABIN format; [`Drw::parse_str`] reads it back.
    pub fn to_rabin_string(&self) -> String {
        let mut out = String::new();
        let w = &mut out;
        writeln!(w, "#----- omega-automaton (DRW) -----").expect("String write cannot fail");
        writeln!(w, "RABIN").expect("String write cannot fail");
        writeln!(w, "# Number of states:").expect("String write cannot fail");
        writeln!(w, "{}", self.size()).expect("String write cannot fail");
        writeln!(w, "# Size of alphabet:").expect("String write cannot fail");
        writeln!(w, "{}", self.alphabet_size()).expect("String write cannot fail");
        writeln!(w, "# List of transitions:").expect("String write cannot fail");
        for from in 0..self.size() {
            for symbol in 0..self.alphabet_size() {
                writeln!(
                    w,
                    "{} > {} > {}",
                    from + 1,
                    symbol + 1,
                    self.transition(from, symbol) + 1
                )
                .expect("String write cannot fail");
            }
        }
        writeln!(w, "# Initial state").expect("String write cannot fail");
        writeln!(w, "{}", self.initial_state() + 1).expect("String write cannot fail");
        writeln!(w, "# Rabin pairs:").expect("String write cannot fail");
        for pair in self.pairs() {
            writeln!(w, "{} | {}", join_states(&pair.fin), join_states(&pair.inf))
                .expect("String write cannot fail");
        }
        writeln!(w, "# EOF").expect("String write cannot fail");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inf_often_a() -> Nbw {
        Nbw::new(
            2,
            2,
            &[(0, 0, 1), (0, 1, 0), (1, 0, 1), (1, 1, 0)],
            BitSet::from_indices(2, &[0]),
            BitSet::from_indices(2, &[1]),
        )
    }

    #[test]
    fn test_buechi_round_trip() {
        let nbw = inf_often_a();
        let text = nbw.to_buechi_string();
        let parsed = Nbw::parse_str(&text).expect("own output parses");

        assert_eq!(parsed.size(), nbw.size());
        assert_eq!(parsed.alphabet_size(), nbw.alphabet_size());
        assert_eq!(parsed.num_transitions(), nbw.num_transitions());
        assert_eq!(parsed.initial_states(), nbw.initial_states());
        assert_eq!(parsed.accepting_states(), nbw.accepting_states());
        for s in 0..nbw.size() {
            for a in 0..nbw.alphabet_size() {
                assert_eq!(parsed.successors(s, a), nbw.successors(s, a));
            }
        }
    }

    #[test]
    fn test_buchi_header_accepted() {
        let text = "BUCHI\n2\n1\n1\n1 > 1 > 2\n1\n2\n";
        let nbw = Nbw::parse_str(text).expect("parses");
        assert_eq!(nbw.size(), 2);
        assert!(nbw.successors(0, 0).contains(1));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let text = "# a comment\nBUECHI\n\n# states\n1\n1\n1\n1 > 1 > 1\n1\n1\n";
        let nbw = Nbw::parse_str(text).expect("parses");
        assert_eq!(nbw.size(), 1);
        assert!(!Nbw::parse_str(text).expect("parses").is_empty());
    }

    #[test]
    fn test_gast_round_trip_semantics() {
        // 2 states, alphabet "ab", accepting state 1, 0-based transitions.
        let text = "2\nab\n1\n0 a 1\n0 b 0\n1 a 1\n1 b 0\n";
        let nbw = Nbw::parse_str(text).expect("GASt parses");
        assert_eq!(nbw.size(), 2);
        assert_eq!(nbw.alphabet_size(), 2);
        assert!(nbw.initial_states().contains(0));
        assert!(nbw.accepting_states().contains(1));
        assert!(nbw.successors(0, 0).contains(1));
        assert!(nbw.successors(1, 1).contains(0));

        // The writer emits BUECHI; parsing that preserves the relation.
        let round = Nbw::parse_str(&nbw.to_buechi_string()).expect("parses");
        assert_eq!(round.successors(0, 0), nbw.successors(0, 0));
    }

    #[test]
    fn test_rabin_round_trip() {
        let drw = inf_often_a().determinize();
        let text = drw.to_rabin_string();
        let parsed = Drw::parse_str(&text).expect("own output parses");

        assert_eq!(parsed.size(), drw.size());
        assert_eq!(parsed.alphabet_size(), drw.alphabet_size());
        assert_eq!(parsed.initial_state(), drw.initial_state());
        assert_eq!(parsed.pairs().len(), drw.pairs().len());
        for (a, b) in parsed.pairs().iter().zip(drw.pairs()) {
            assert_eq!(a.fin, b.fin);
            assert_eq!(a.inf, b.inf);
        }
        for s in 0..drw.size() {
            for a in 0..drw.alphabet_size() {
                assert_eq!(parsed.transition(s, a), drw.transition(s, a));
            }
        }
        assert_eq!(parsed.is_empty(), drw.is_empty());
    }

    #[test]
    fn test_empty_language_round_trip() {
        let nbw = Nbw::empty_language(2);
        let parsed = Nbw::parse_str(&nbw.to_buechi_string()).expect("parses");
        assert_eq!(parsed.size(), 1);
        assert!(parsed.accepting_states().none());
        assert!(Nbw::parse_str(&nbw.to_buechi_string()).expect("parses").is_empty());
    }

    #[test]
    fn test_rabin_pair_with_empty_fin() {
        let text = "RABIN\n1\n1\n1 > 1 > 1\n1\n| 1\n";
        let drw = Drw::parse_str(text).expect("parses");
        assert_eq!(drw.pairs().len(), 1);
        assert!(drw.pairs()[0].fin.none());
        assert!(drw.pairs()[0].inf.contains(0));
        assert!(!drw.is_empty());
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        assert!(Nbw::parse_str("").is_err());
        assert!(Nbw::parse_str("BUECHI\n2\n1\n1\n1 2 3\n1\n2\n").is_err());
        assert!(Nbw::parse_str("BUECHI\n2\n1\n1\n9 > 1 > 1\n1\n2\n").is_err());
        assert!(Nbw::parse_str("BUECHI\n2\n1\n").is_err());
        assert!(Drw::parse_str("RABIN\n1\n1\n1 > 1 > 1\n1\nno bar\n").is_err());
        assert!(Drw::parse_str("RABIN\n2\n1\n1 > 1 > 2\n1\n").is_err());
    }
}
