//! Error types for automaton and grammar construction.

use crate::state::StateId;
use crate::symbol::Symbol;
use thiserror::Error;

/// Errors raised while constructing an automaton from explicit parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A start, final, or transition index referenced a state outside
    /// `[0, num_states)`.
    #[error("state {state} is out of range for an automaton with {num_states} states")]
    StateOutOfRange { state: StateId, num_states: StateId },

    /// A second, different destination was assigned to an existing
    /// `(state, symbol)` pair of a deterministic transition table.
    #[error(
        "conflicting transition from state {state} on '{symbol}': \
         already goes to {existing}, cannot also go to {duplicate}"
    )]
    ConflictingTransition {
        state: StateId,
        symbol: Symbol,
        existing: StateId,
        duplicate: StateId,
    },

    /// An epsilon transition was added to a deterministic transition table.
    #[error("epsilon transition from state {state} is not allowed in a deterministic automaton")]
    EpsilonTransition { state: StateId },
}

/// Errors raised while converting a grammar to an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A production of the named nonterminal is not of the form
    /// `N -> t` or `N -> t M`.
    #[error("grammar is not right-regular: production of '{nonterminal}' has the wrong shape")]
    NotRightRegular { nonterminal: String },

    /// The grammar's productions do not describe a deterministic automaton.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offenders() {
        let err = AutomatonError::ConflictingTransition {
            state: 1,
            symbol: Symbol::from('a'),
            existing: 2,
            duplicate: 3,
        };
        let text = err.to_string();
        assert!(text.contains("state 1"));
        assert!(text.contains("'a'"));

        let err = GrammarError::NotRightRegular {
            nonterminal: "Expr".into(),
        };
        assert!(err.to_string().contains("Expr"));
    }
}
