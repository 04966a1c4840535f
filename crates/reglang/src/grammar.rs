//! Right-regular grammars and their conversion to automata.
//!
//! The grammar types here are the boundary this engine consumes: the set of
//! nonterminals, the designated start nonterminal, and the productions as
//! `(nonterminal, tagged symbol sequence)` pairs. Parsing grammar text into
//! this shape is someone else's job.

use crate::dfa::Dfa;
use crate::error::GrammarError;
use crate::state::StateId;
use indexmap::{IndexMap, IndexSet};

/// A grammar symbol tagged terminal or nonterminal, with its textual name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSymbol {
    Terminal(String),
    Nonterminal(String),
}

impl GrammarSymbol {
    /// A terminal symbol with the given name.
    pub fn terminal(name: impl Into<String>) -> Self {
        Self::Terminal(name.into())
    }

    /// A nonterminal symbol with the given name.
    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self::Nonterminal(name.into())
    }

    /// The symbol's textual name.
    pub fn name(&self) -> &str {
        match self {
            Self::Terminal(name) | Self::Nonterminal(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Self::Nonterminal(_))
    }
}

/// A production `head -> body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub head: String,
    pub body: Vec<GrammarSymbol>,
}

/// A grammar value: start nonterminal, nonterminal set, productions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start_symbol: String,
    nonterminals: IndexSet<String>,
    productions: Vec<Production>,
}

impl Grammar {
    /// Create a grammar with the given start nonterminal and no productions.
    pub fn new(start_symbol: impl Into<String>) -> Self {
        let start_symbol = start_symbol.into();
        let mut nonterminals = IndexSet::new();
        nonterminals.insert(start_symbol.clone());
        Self {
            start_symbol,
            nonterminals,
            productions: Vec::new(),
        }
    }

    /// Add a production, registering its head and any body nonterminals.
    pub fn add_production(&mut self, head: impl Into<String>, body: Vec<GrammarSymbol>) {
        let head = head.into();
        self.nonterminals.insert(head.clone());
        for symbol in &body {
            if let GrammarSymbol::Nonterminal(name) = symbol {
                self.nonterminals.insert(name.clone());
            }
        }
        self.productions.push(Production { head, body });
    }

    /// The designated start nonterminal.
    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    /// The nonterminals, in first-seen order.
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.nonterminals.iter().map(String::as_str)
    }

    /// All productions, in insertion order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }
}

/// `N -> t` or `N -> t M`: one terminal, optionally followed by exactly one
/// nonterminal.
fn has_right_regular_shape(production: &Production) -> bool {
    match production.body.as_slice() {
        [first] => first.is_terminal(),
        [first, second] => first.is_terminal() && second.is_nonterminal(),
        _ => false,
    }
}

/// Check that every production of the grammar is right-regular.
pub fn is_right_regular(grammar: &Grammar) -> bool {
    grammar.productions().iter().all(has_right_regular_shape)
}

/// Convert a right-regular grammar to an equivalent DFA.
///
/// The start nonterminal becomes state 0, every other nonterminal a
/// distinct state, and one extra final state stands for successful
/// termination: `N -> t` contributes `(state(N), t) -> final` and
/// `N -> t M` contributes `(state(N), t) -> state(M)`.
///
/// A grammar that is not right-regular is rejected, as is one whose
/// productions assign two destinations to a single `(state, terminal)`
/// pair — the conversion never silently picks one.
pub fn grammar_to_automaton(grammar: &Grammar) -> Result<Dfa, GrammarError> {
    if let Some(production) = grammar
        .productions()
        .iter()
        .find(|production| !has_right_regular_shape(production))
    {
        return Err(GrammarError::NotRightRegular {
            nonterminal: production.head.clone(),
        });
    }

    let mut state_of: IndexMap<&str, StateId> = IndexMap::new();
    state_of.insert(grammar.start_symbol(), 0);
    for name in grammar.nonterminals() {
        if name != grammar.start_symbol() {
            let next = state_of.len() as StateId;
            state_of.insert(name, next);
        }
    }
    let final_state = state_of.len() as StateId;

    let mut dfa = Dfa::new();
    for _ in 0..=final_state {
        dfa.add_state();
    }
    dfa.set_start(0);
    dfa.add_final(final_state);

    for production in grammar.productions() {
        let origin = state_of[production.head.as_str()];
        let destination = match production.body.get(1) {
            Some(next) => state_of[next.name()],
            None => final_state,
        };
        dfa.add_transition(origin, production.body[0].name(), destination)?;
    }

    Ok(dfa)
}
