//! Graphviz rendering of automata.

use crate::dfa::Dfa;
use crate::nfa::Automaton;
use crate::symbol::Symbol;

/// Formatting policy for DOT export. Rendering takes the policy as an
/// explicit argument and never stores formatting state on the automaton.
#[derive(Debug, Clone)]
pub struct DotStyle {
    /// Graph layout direction.
    pub rankdir: &'static str,
    /// Shape for ordinary states.
    pub state_shape: &'static str,
    /// Shape for final states.
    pub final_shape: &'static str,
}

impl Default for DotStyle {
    fn default() -> Self {
        Self {
            rankdir: "LR",
            state_shape: "circle",
            final_shape: "doublecircle",
        }
    }
}

/// Render an automaton as a Graphviz digraph.
///
/// Nodes are states, edges carry their symbol (`ε` for epsilon moves),
/// final states use the distinguished shape, and an unlabeled synthetic
/// edge from a plaintext node marks the start state. The export is
/// read-only and deterministic: states ascending, symbols epsilon-first
/// then in vocabulary order. No algorithm in this crate depends on it.
pub fn automaton_to_dot(automaton: &Automaton, style: &DotStyle) -> String {
    let mut dot = String::new();
    dot.push_str("digraph automaton {\n");
    dot.push_str(&format!("    rankdir={};\n", style.rankdir));
    dot.push_str("    start [shape=plaintext, label=\"\"];\n");

    for state in 0..automaton.num_states() {
        let shape = if automaton.finals().contains(state) {
            style.final_shape
        } else {
            style.state_shape
        };
        dot.push_str(&format!("    {state} [shape={shape}];\n"));
    }

    dot.push_str(&format!("    start -> {} [style=dashed];\n", automaton.start()));

    let epsilon = Symbol::epsilon();
    for state in 0..automaton.num_states() {
        for symbol in std::iter::once(&epsilon).chain(automaton.vocabulary()) {
            if let Some(destinations) = automaton.destinations(state, symbol) {
                for dest in destinations.iter() {
                    dot.push_str(&format!("    {state} -> {dest} [label=\"{symbol}\"];\n"));
                }
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Render a DFA as a Graphviz digraph. See [`automaton_to_dot`].
pub fn dfa_to_dot(dfa: &Dfa, style: &DotStyle) -> String {
    automaton_to_dot(&Automaton::from(dfa), style)
}
