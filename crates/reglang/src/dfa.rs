//! Deterministic finite automata with partition-refinement minimization.

use crate::error::AutomatonError;
use crate::partition::Partition;
use crate::state::{StateId, StateSet};
use crate::symbol::Symbol;
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// A deterministic finite automaton: at most one destination per
/// `(state, symbol)` pair, no epsilon moves.
///
/// The transition function is partial; a missing entry is a normal,
/// representable outcome (a stuck run rejects, it does not fail). Assigning
/// a second destination to an existing pair is rejected at construction
/// because it would violate determinism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dfa {
    /// Number of states.
    num_states: StateId,
    /// Start state.
    start: StateId,
    /// Final (accepting) states.
    finals: StateSet,
    /// Transitions: source -> symbol -> destination.
    transitions: HashMap<StateId, IndexMap<Symbol, StateId>>,
    /// All symbols used, in first-seen order.
    vocabulary: IndexSet<Symbol>,
}

impl Dfa {
    /// Create a new empty DFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a DFA from an explicit transition table, validating state
    /// ranges, determinism, and the absence of epsilon moves.
    pub fn from_parts<F, T>(
        num_states: StateId,
        start: StateId,
        finals: F,
        transitions: T,
    ) -> Result<Self, AutomatonError>
    where
        F: IntoIterator<Item = StateId>,
        T: IntoIterator<Item = ((StateId, Symbol), StateId)>,
    {
        let check = |state: StateId| {
            if state < num_states {
                Ok(state)
            } else {
                Err(AutomatonError::StateOutOfRange { state, num_states })
            }
        };

        check(start)?;
        let mut dfa = Self::new();
        for _ in 0..num_states {
            dfa.add_state();
        }
        dfa.set_start(start);
        for state in finals {
            dfa.add_final(check(state)?);
        }
        for ((source, symbol), destination) in transitions {
            check(source)?;
            check(destination)?;
            dfa.add_transition(source, symbol, destination)?;
        }
        Ok(dfa)
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        id
    }

    /// Ensure a state exists, expanding num_states if needed.
    fn ensure_state(&mut self, state: StateId) {
        if state >= self.num_states {
            self.num_states = state + 1;
        }
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

    /// Add a transition.
    ///
    /// Rejects epsilon symbols and conflicting re-assignments of an existing
    /// `(state, symbol)` pair; re-inserting the identical destination is a
    /// no-op.
    pub fn add_transition(
        &mut self,
        source: StateId,
        symbol: impl Into<Symbol>,
        destination: StateId,
    ) -> Result<(), AutomatonError> {
        let symbol = symbol.into();
        if symbol.is_epsilon() {
            return Err(AutomatonError::EpsilonTransition { state: source });
        }
        if let Some(existing) = self.transition(source, &symbol) {
            if existing == destination {
                return Ok(());
            }
            return Err(AutomatonError::ConflictingTransition {
                state: source,
                symbol,
                existing,
                duplicate: destination,
            });
        }

        self.ensure_state(source);
        self.ensure_state(destination);
        self.vocabulary.insert(symbol.clone());
        self.transitions.entry(source).or_default().insert(symbol, destination);
        Ok(())
    }

    /// Get the transition from a state on a symbol.
    pub fn transition(&self, state: StateId, symbol: &Symbol) -> Option<StateId> {
        self.transitions.get(&state)?.get(symbol).copied()
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

    /// Iterate over the vocabulary, in first-seen order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.vocabulary.iter()
    }

    /// Iterate over all transitions as `(source, symbol, destination)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &Symbol, StateId)> + '_ {
        self.transitions.iter().flat_map(|(&source, by_symbol)| {
            by_symbol.iter().map(move |(symbol, &dest)| (source, symbol, dest))
        })
    }

    /// A cursor positioned at the start state, for incremental recognition.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            dfa: self,
            current: self.start,
        }
    }

    /// Walk the input one symbol at a time from the start state.
    ///
    /// A symbol with no defined transition gets the run stuck: the string is
    /// rejected immediately. That early exit is a designed rejection path,
    /// not an error.
    pub fn recognize<I>(&self, input: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let mut cursor = self.cursor();
        for symbol in input {
            if !cursor.step(&symbol.into()) {
                return false;
            }
        }
        cursor.is_accepting()
    }

    /// Check if the DFA accepts no strings.
    pub fn is_empty(&self) -> bool {
        if self.finals.is_empty() {
            return true;
        }

        let mut visited = StateSet::with_capacity(self.num_states as usize);
        let mut queue = VecDeque::new();
        queue.push_back(self.start);

        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);

            if self.finals.contains(state) {
                return false;
            }

            for symbol in self.vocabulary.iter() {
                if let Some(next) = self.transition(state, symbol) {
                    if !visited.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        true
    }

    /// Minimize the DFA by partition refinement.
    ///
    /// Starts from the finals/non-finals split and refines until a round
    /// preserves the group count, then quotients by the resulting partition.
    /// Unreachable states are carried through, not pruned; pruning is a
    /// separate reachability pass.
    pub fn minimize(&self) -> Dfa {
        if self.num_states == 0 {
            return Dfa::new();
        }

        let mut partition = Partition::new(self.num_states);
        partition.merge((0..self.num_states).filter(|&s| !self.finals.contains(s)));
        partition.merge(self.finals.iter());

        let mut rounds = 0u32;
        loop {
            rounds += 1;
            let mut refined = Partition::new(self.num_states);
            for group in partition.groups() {
                for subgroup in self.split_group(&group, &partition) {
                    refined.merge(subgroup);
                }
            }
            // Refinement only ever splits groups, so an unchanged count
            // means an unchanged partition: the fixpoint.
            if refined.len() == partition.len() {
                break;
            }
            partition = refined;
        }
        debug!(rounds, groups = partition.len(), "partition refinement reached a fixpoint");

        self.quotient(&partition)
    }

    /// Split a group into subgroups whose members agree, for every
    /// vocabulary symbol, on the group of their target (or on its absence).
    fn split_group(&self, group: &[StateId], partition: &Partition) -> Vec<Vec<StateId>> {
        let mut split: IndexMap<Vec<Option<StateId>>, Vec<StateId>> = IndexMap::new();
        for &state in group {
            let key: Vec<Option<StateId>> = self
                .vocabulary
                .iter()
                .map(|symbol| {
                    self.transition(state, symbol)
                        .map(|dest| partition.representative(dest))
                })
                .collect();
            split.entry(key).or_default().push(state);
        }
        split.into_values().collect()
    }

    /// Build the quotient DFA with one state per group of the partition.
    fn quotient(&self, partition: &Partition) -> Dfa {
        let groups = partition.groups();
        let mut index_of: HashMap<StateId, StateId> = HashMap::new();
        let mut quotient = Dfa::new();
        for (index, group) in groups.iter().enumerate() {
            index_of.insert(group[0], index as StateId);
            quotient.add_state();
        }

        quotient.set_start(index_of[&partition.representative(self.start)]);
        for (index, group) in groups.iter().enumerate() {
            let representative = group[0];
            if self.finals.contains(representative) {
                quotient.add_final(index as StateId);
            }
            for symbol in self.vocabulary.iter() {
                if let Some(dest) = self.transition(representative, symbol) {
                    let target = index_of[&partition.representative(dest)];
                    quotient
                        .add_transition(index as StateId, symbol.clone(), target)
                        .expect("quotient construction assigned a transition twice");
                }
            }
        }
        quotient
    }
}

/// View the deterministic table as a generalized automaton, e.g. for
/// regular-expression extraction or rendering. The converse direction goes
/// through [`crate::subset_construction`].
impl From<&Dfa> for crate::nfa::Automaton {
    fn from(dfa: &Dfa) -> Self {
        let mut automaton = crate::nfa::Automaton::new(dfa.num_states.max(1));
        automaton.set_start(dfa.start);
        for state in dfa.finals.iter() {
            automaton.add_final(state);
        }
        for (source, symbol, dest) in dfa.transitions() {
            automaton.add_transition(source, symbol.clone(), dest);
        }
        automaton
    }
}

/// A borrowed walker over a DFA, used for incremental recognition.
///
/// The walker owns the run state, so the automaton itself stays an
/// immutable value while strings are matched against it.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    dfa: &'a Dfa,
    current: StateId,
}

impl Cursor<'_> {
    /// Follow the transition on `symbol`. Returns false when the current
    /// state has no transition for it, leaving the cursor in place.
    pub fn step(&mut self, symbol: &Symbol) -> bool {
        match self.dfa.transition(self.current, symbol) {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// The state the cursor is currently in.
    pub fn current(&self) -> StateId {
        self.current
    }

    /// Check if the cursor is in a final state.
    pub fn is_accepting(&self) -> bool {
        self.dfa.finals().contains(self.current)
    }

    /// Move the cursor back to the start state for a new run.
    pub fn reset(&mut self) {
        self.current = self.dfa.start();
    }
}
