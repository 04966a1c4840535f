//! Nondeterministic finite automata with epsilon moves.

use crate::error::AutomatonError;
use crate::state::{StateId, StateSet};
use crate::symbol::Symbol;
use fixedbitset::FixedBitSet;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// A finite-state acceptor, possibly nondeterministic or with epsilon moves.
///
/// States are indices in `[0, num_states)`. The vocabulary is derived from
/// the transition table (epsilon excluded) and cannot be mutated on its own.
/// Automata are value objects: the transformation passes in this crate never
/// mutate their inputs and always return freshly numbered results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    /// Number of states (states are numbered 0..num_states).
    num_states: StateId,
    /// Start state.
    start: StateId,
    /// Final (accepting) states.
    finals: StateSet,
    /// Transitions: source -> symbol -> set of destination states.
    /// For epsilon transitions the symbol is the epsilon marker.
    transitions: HashMap<StateId, IndexMap<Symbol, StateSet>>,
    /// All symbols used, excluding epsilon, in first-seen order.
    vocabulary: IndexSet<Symbol>,
}

impl Automaton {
    /// Create an automaton with the given number of states, no transitions,
    /// no finals, and state 0 as the start.
    pub fn new(num_states: StateId) -> Self {
        assert!(num_states >= 1, "an automaton has at least one state");
        Self {
            num_states,
            start: 0,
            finals: StateSet::with_capacity(num_states as usize),
            transitions: HashMap::new(),
            vocabulary: IndexSet::new(),
        }
    }

    /// Build an automaton from an explicit transition table, validating that
    /// every referenced state is in range.
    pub fn from_parts<F, T>(
        num_states: StateId,
        start: StateId,
        finals: F,
        transitions: T,
    ) -> Result<Self, AutomatonError>
    where
        F: IntoIterator<Item = StateId>,
        T: IntoIterator<Item = ((StateId, Symbol), Vec<StateId>)>,
    {
        let check = |state: StateId| {
            if state < num_states {
                Ok(state)
            } else {
                Err(AutomatonError::StateOutOfRange { state, num_states })
            }
        };

        check(start)?;
        let mut automaton = Self::new(num_states);
        automaton.set_start(start);
        for state in finals {
            automaton.add_final(check(state)?);
        }
        for ((source, symbol), destinations) in transitions {
            check(source)?;
            for destination in destinations {
                check(destination)?;
                automaton.add_transition(source, symbol.clone(), destination);
            }
        }
        Ok(automaton)
    }

    /// Ensure a state exists, expanding num_states if needed.
    fn ensure_state(&mut self, state: StateId) {
        if state >= self.num_states {
            self.num_states = state + 1;
        }
    }

    /// Add a transition from source to destination on the given symbol.
    pub fn add_transition(&mut self, source: StateId, symbol: impl Into<Symbol>, destination: StateId) {
        let symbol = symbol.into();
        self.ensure_state(source);
        self.ensure_state(destination);

        if !symbol.is_epsilon() {
            self.vocabulary.insert(symbol.clone());
        }

        self.transitions
            .entry(source)
            .or_default()
            .entry(symbol)
            .or_insert_with(|| StateSet::with_capacity(0))
            .insert(destination);
    }

    /// Add an epsilon transition from source to destination.
    pub fn add_epsilon_transition(&mut self, source: StateId, destination: StateId) {
        self.add_transition(source, Symbol::epsilon(), destination);
    }

    /// Set the start state.
    pub fn set_start(&mut self, state: StateId) {
        self.ensure_state(state);
        self.start = state;
    }

    /// Add a final (accepting) state.
    pub fn add_final(&mut self, state: StateId) {
        self.ensure_state(state);
        self.finals.insert(state);
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    /// Get the start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Get the final states.
    pub fn finals(&self) -> &StateSet {
        &self.finals
    }

    /// Iterate over the vocabulary (all symbols except epsilon), in
    /// first-seen order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.vocabulary.iter()
    }

    /// The destinations reachable from `state` on `symbol` in one move, or
    /// `None` if the pair has no transition.
    pub fn destinations(&self, state: StateId, symbol: &Symbol) -> Option<&StateSet> {
        self.transitions.get(&state)?.get(symbol)
    }

    /// Iterate over all transitions as `(source, symbol, destination)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &Symbol, StateId)> + '_ {
        self.transitions.iter().flat_map(|(&source, by_symbol)| {
            by_symbol
                .iter()
                .flat_map(move |(symbol, dests)| dests.iter().map(move |dest| (source, symbol, dest)))
        })
    }

    /// Compute the epsilon closure of a set of states: the least fixed point
    /// under following epsilon moves. Epsilon cycles terminate through the
    /// closure membership check.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states as usize);
        let mut stack: Vec<StateId> = states.iter().collect();
        let epsilon = Symbol::epsilon();

        while let Some(state) = stack.pop() {
            if closure.contains(state) {
                continue;
            }
            closure.insert(state);

            if let Some(destinations) = self.destinations(state, &epsilon) {
                for dest in destinations.iter() {
                    if !closure.contains(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    /// The states reachable from a set of states on a given symbol,
    /// epsilon-closed.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: &Symbol) -> StateSet {
        assert!(!symbol.is_epsilon(), "use epsilon_closure for epsilon moves");

        let mut reached = StateSet::with_capacity(self.num_states as usize);
        for state in states.iter() {
            if let Some(destinations) = self.destinations(state, symbol) {
                reached.union_with(destinations);
            }
        }

        self.epsilon_closure(&reached)
    }

    /// Simulate the automaton on the given input symbols.
    ///
    /// The reachable set starts as the epsilon closure of the start state and
    /// is moved and re-closed per symbol. A symbol with no outgoing
    /// transition empties the set; the simulation then keeps consuming input
    /// over the empty set rather than failing.
    pub fn recognize<I>(&self, input: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let singleton = StateSet::singleton(self.start, self.num_states as usize);
        let mut current = self.epsilon_closure(&singleton);
        for symbol in input {
            current = self.move_on_symbol(&current, &symbol.into());
        }
        current.intersects(&self.finals)
    }

    /// A depth-first walk over the states reachable from the start state,
    /// following symbol and epsilon transitions alike.
    ///
    /// The walk is a non-owning view of the transition table; the visited
    /// set lives in the iterator, never on the automaton.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            automaton: self,
            stack: vec![self.start],
            visited: FixedBitSet::with_capacity(self.num_states as usize),
        }
    }

    /// Check if the automaton accepts no string at all.
    pub fn is_empty(&self) -> bool {
        !self.depth_first().any(|state| self.finals.contains(state))
    }
}

/// Depth-first iterator over reachable states. See [`Automaton::depth_first`].
///
/// Neighbors are visited epsilon moves first, then the vocabulary in
/// first-seen order, destinations ascending, so the walk is deterministic.
pub struct DepthFirst<'a> {
    automaton: &'a Automaton,
    stack: Vec<StateId>,
    visited: FixedBitSet,
}

impl Iterator for DepthFirst<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        while let Some(state) = self.stack.pop() {
            if self.visited.contains(state as usize) {
                continue;
            }
            self.visited.insert(state as usize);

            let mut neighbors: Vec<StateId> = Vec::new();
            let epsilon = Symbol::epsilon();
            if let Some(dests) = self.automaton.destinations(state, &epsilon) {
                neighbors.extend(dests.iter());
            }
            for symbol in self.automaton.vocabulary() {
                if let Some(dests) = self.automaton.destinations(state, symbol) {
                    neighbors.extend(dests.iter());
                }
            }
            for neighbor in neighbors.into_iter().rev() {
                if !self.visited.contains(neighbor as usize) {
                    self.stack.push(neighbor);
                }
            }

            return Some(state);
        }
        None
    }
}
