//! Graphviz rendering for automata.
//!
//! Both automaton kinds render as a `digraph`: accepting states are
//! double-circled, initial states are fed by invisible source nodes, and
//! parallel edges collapse into one edge labeled with the comma-joined
//! symbols (or their labels, when the automaton carries any).

use std::fmt::Write as _;

use crate::drw::Drw;
use crate::nbw::Nbw;

fn symbol_label(char_labels: &[String], symbol: usize) -> String {
    char_labels
        .get(symbol)
        .cloned()
        .unwrap_or_else(|| (symbol + 1).to_string())
}

impl Nbw {
    /// Renders the automaton for Graphviz dot.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph buchi_automaton {{")?;
        writeln!(dot, "node [shape=circle];")?;

        for state in 0..self.size() {
            let mut attrs = Vec::new();
            if self.accepting_states().contains(state) {
                attrs.push("peripheries=2".to_string());
            }
            if let Some(label) = self.state_labels.get(state) {
                attrs.push(format!("label=\"{}\"", label));
            }
            if attrs.is_empty() {
                writeln!(dot, "{};", state + 1)?;
            } else {
                writeln!(dot, "{} [{}];", state + 1, attrs.join(","))?;
            }
        }

        for state in self.initial_states().iter() {
            writeln!(dot, "I{} [style=invis];", state + 1)?;
            writeln!(dot, "I{} -> {};", state + 1, state + 1)?;
        }

        for from in 0..self.size() {
            for to in 0..self.size() {
                let symbols: Vec<String> = (0..self.alphabet_size())
                    .filter(|&a| self.successors(from, a).contains(to))
                    .map(|a| symbol_label(&self.char_labels, a))
                    .collect();
                if !symbols.is_empty() {
                    writeln!(dot, "{} -> {} [label=\"{}\"];", from + 1, to + 1, symbols.join(","))?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl Drw {
    /// Renders the automaton for Graphviz dot.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph rabin_automaton {{")?;
        writeln!(dot, "    node [shape=circle];")?;

        writeln!(dot, "    initial_invis [style=invis];")?;
        writeln!(dot, "    initial_invis -> {};", self.initial_state() + 1)?;

        for from in 0..self.size() {
            for to in 0..self.size() {
                let symbols: Vec<String> = (0..self.alphabet_size())
                    .filter(|&a| self.transition(from, a) == to)
                    .map(|a| symbol_label(&self.char_labels, a))
                    .collect();
                if !symbols.is_empty() {
                    writeln!(
                        dot,
                        "    {} -> {} [label=\"{}\"];",
                        from + 1,
                        to + 1,
                        symbols.join(",")
                    )?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
