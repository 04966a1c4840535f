//! Regular-expression extraction by generalized-NFA state elimination.

use crate::nfa::Automaton;
use crate::state::StateId;
use crate::symbol::Symbol;
use itertools::Itertools;
use std::collections::HashMap;
use tracing::trace;

/// Extract a regular expression accepting exactly the automaton's language.
///
/// Builds a generalized NFA around the automaton (one fresh global start,
/// one fresh global final, regex-fragment edge labels) and eliminates the
/// intermediate states one at a time; the surviving start-to-final label is
/// the answer. Returns `None` for the empty language and `Some("")` for the
/// language containing only the empty string.
///
/// The output uses `|` for alternation, parenthesized grouping, and a
/// trailing `*` for repetition. Symbols are spliced in verbatim, without
/// escaping. The expression is correct but not necessarily minimal; it
/// follows the fixed elimination order of the construction.
pub fn to_regex(automaton: &Automaton) -> Option<String> {
    let mut gnfa = Gnfa::from_automaton(automaton);
    while gnfa.states.len() > 2 {
        gnfa.eliminate_second();
    }
    gnfa.label(gnfa.states[0], gnfa.states[1])
}

/// A transient generalized NFA.
///
/// `states` fixes the elimination order: the first entry is the global
/// start, the last is the global final, and the second entry is the next to
/// go. Edge labels are regex fragments; a pair with no entry has no
/// transition at all, and that absence is absorbing (concatenating with it
/// yields nothing, starring it leaves only the empty string, alternating
/// with it changes nothing), so dead paths can never reach the output. An
/// empty fragment is a direct epsilon path. The start has no incoming and
/// the final no outgoing edges.
struct Gnfa {
    states: Vec<StateId>,
    labels: HashMap<(StateId, StateId), String>,
}

impl Gnfa {
    fn from_automaton(automaton: &Automaton) -> Self {
        let offset = 1;
        let final_state = offset + automaton.num_states();

        let mut states = Vec::with_capacity(automaton.num_states() as usize + 2);
        states.push(0);
        states.extend((0..automaton.num_states()).map(|state| offset + state));
        states.push(final_state);

        let mut labels = HashMap::new();
        labels.insert((0, offset + automaton.start()), String::new());
        for state in automaton.finals().iter() {
            labels.insert((offset + state, final_state), String::new());
        }

        let epsilon = Symbol::epsilon();
        for from in 0..automaton.num_states() {
            for to in 0..automaton.num_states() {
                let mut symbols = automaton
                    .vocabulary()
                    .filter(|symbol| {
                        automaton
                            .destinations(from, symbol)
                            .is_some_and(|dests| dests.contains(to))
                    })
                    .map(Symbol::as_str)
                    .peekable();
                let mut label = if symbols.peek().is_some() {
                    Some(symbols.join("|"))
                } else {
                    None
                };
                if automaton
                    .destinations(from, &epsilon)
                    .is_some_and(|dests| dests.contains(to))
                {
                    // A direct epsilon path contributes the empty alternative.
                    label = alternation(label, Some(String::new()));
                }
                if let Some(label) = label {
                    labels.insert((offset + from, offset + to), label);
                }
            }
        }

        Self { states, labels }
    }

    fn label(&self, from: StateId, to: StateId) -> Option<String> {
        self.labels.get(&(from, to)).cloned()
    }

    /// Remove the second state `r` of the ordering, rerouting every
    /// remaining pair `(i, j)` with `i` not final and `j` not start through
    /// `((i→r)(r→r)*(r→j)) | (i→j)`: pass through `r` zero or more times
    /// via its self-loop, or skip it entirely.
    fn eliminate_second(&mut self) {
        let removed = self.states.remove(1);
        let self_loop = star(self.label(removed, removed));
        trace!(state = removed, "eliminating intermediate state");

        let sources: Vec<StateId> = self.states[..self.states.len() - 1].to_vec();
        let targets: Vec<StateId> = self.states[1..].to_vec();
        for &from in &sources {
            let into_removed = self.label(from, removed);
            for &to in &targets {
                let through = concatenation(
                    concatenation(into_removed.clone(), self_loop.clone()),
                    self.label(removed, to),
                );
                match alternation(through, self.label(from, to)) {
                    Some(label) => {
                        self.labels.insert((from, to), label);
                    }
                    None => {
                        self.labels.remove(&(from, to));
                    }
                }
            }
        }
    }
}

/// `a | b`. The absent label is the identity; equal branches collapse.
fn alternation(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (None, other) | (other, None) => other,
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(a), Some(b)) => Some(format!("{a}|{b}")),
    }
}

/// `a b`. The absent label absorbs the whole concatenation; the empty
/// fragment is the identity.
fn concatenation(a: Option<String>, b: Option<String>) -> Option<String> {
    let (a, b) = (a?, b?);
    if a.is_empty() {
        return Some(b);
    }
    if b.is_empty() {
        return Some(a);
    }
    Some(format!("({a})({b})"))
}

/// `a*`. Starring the absent label, or the empty fragment, leaves exactly
/// the empty string.
fn star(a: Option<String>) -> Option<String> {
    match a {
        Some(inner) if !inner.is_empty() => Some(format!("({inner})*")),
        _ => Some(String::new()),
    }
}
