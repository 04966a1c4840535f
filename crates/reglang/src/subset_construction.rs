//! Subset construction for converting an automaton with epsilon moves to a DFA.

use crate::dfa::Dfa;
use crate::nfa::Automaton;
use crate::state::{StateId, StateSet};
use indexmap::IndexMap;
use tracing::debug;

/// Convert an automaton with epsilon or nondeterministic moves into an
/// equivalent DFA using the powerset construction.
///
/// Each DFA state is identified by the set of automaton states it stands
/// for; sets are deduplicated by content, and discovery order assigns the
/// sequential ids starting from the epsilon closure of the start state.
/// A symbol whose move leads nowhere emits no transition at all: the output
/// table is sparse, never padded with a sink.
pub fn subset_construction(nfa: &Automaton) -> Dfa {
    let mut dfa = Dfa::new();
    let mut discovered: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut worklist: Vec<StateSet> = Vec::new();

    let initial =
        nfa.epsilon_closure(&StateSet::singleton(nfa.start(), nfa.num_states() as usize));
    let initial_id = dfa.add_state();
    dfa.set_start(initial_id);
    if initial.intersects(nfa.finals()) {
        dfa.add_final(initial_id);
    }
    discovered.insert(initial.clone(), initial_id);
    worklist.push(initial);

    while let Some(current) = worklist.pop() {
        let current_id = *discovered
            .get(&current)
            .expect("worklist entries are always discovered first");

        for symbol in nfa.vocabulary() {
            let next = nfa.move_on_symbol(&current, symbol);
            if next.is_empty() {
                continue;
            }

            let next_id = match discovered.get(&next) {
                Some(&id) => id,
                None => {
                    let id = dfa.add_state();
                    if next.intersects(nfa.finals()) {
                        dfa.add_final(id);
                    }
                    discovered.insert(next.clone(), id);
                    worklist.push(next);
                    id
                }
            };

            // Every (set, symbol) pair is processed exactly once, so a
            // duplicate assignment here can only mean the construction
            // itself is broken.
            dfa.add_transition(current_id, symbol.clone(), next_id)
                .expect("subset construction assigned a transition twice");
        }
    }

    debug!(
        nfa_states = nfa.num_states(),
        dfa_states = dfa.num_states(),
        "subset construction finished"
    );
    dfa
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// All strings over `alphabet` of length at most `max_len`.
    fn all_strings(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut result = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for prefix in &frontier {
                for &ch in alphabet {
                    let mut word = prefix.clone();
                    word.push(ch);
                    next.push(word);
                }
            }
            result.extend(next.iter().cloned());
            frontier = next;
        }
        result
    }

    #[test]
    fn test_nondeterministic_paths_merge() {
        // 0 -a-> 1, 0 -a-> 2, 1 -b-> 3 (final), 2 -b-> 3 (final)
        let mut nfa = Automaton::new(4);
        nfa.add_transition(0, 'a', 1);
        nfa.add_transition(0, 'a', 2);
        nfa.add_transition(1, 'b', 3);
        nfa.add_transition(2, 'b', 3);
        nfa.add_final(3);

        let dfa = subset_construction(&nfa);
        // Composite states: {0}, {1,2}, {3}.
        assert_eq!(dfa.num_states(), 3);
        assert!(dfa.recognize("ab".chars()));
        assert!(!dfa.recognize("a".chars()));
        assert!(!dfa.recognize("abb".chars()));
    }

    #[test]
    fn test_epsilon_moves_fold_into_the_start() {
        // 0 -ε-> 1 -a-> 2 (final)
        let mut nfa = Automaton::new(3);
        nfa.add_epsilon_transition(0, 1);
        nfa.add_transition(1, 'a', 2);
        nfa.add_final(2);

        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 2);
        assert!(dfa.recognize("a".chars()));
        assert!(!dfa.recognize("".chars()));
    }

    #[test]
    fn test_rediscovered_sets_reuse_ids() {
        // Both symbols lead to the same composite state {1}.
        let mut nfa = Automaton::new(2);
        nfa.add_transition(0, 'a', 1);
        nfa.add_transition(0, 'b', 1);
        nfa.add_transition(1, 'a', 1);
        nfa.add_final(1);

        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 2);
        assert!(dfa.recognize("b".chars()));
        assert!(dfa.recognize("baaa".chars()));
    }

    #[test]
    fn test_final_start_when_closure_contains_a_final() {
        let mut nfa = Automaton::new(2);
        nfa.add_epsilon_transition(0, 1);
        nfa.add_transition(1, 'a', 1);
        nfa.add_final(1);

        let dfa = subset_construction(&nfa);
        assert!(dfa.recognize("".chars()));
        assert!(dfa.recognize("aa".chars()));
    }

    #[test]
    fn test_bounded_equivalence_on_an_epsilon_heavy_automaton() {
        // ε-cycle plus nondeterminism: 0 -ε-> 1, 1 -ε-> 0, 1 -a-> 2,
        // 2 -b-> 0, 2 final.
        let mut nfa = Automaton::new(3);
        nfa.add_epsilon_transition(0, 1);
        nfa.add_epsilon_transition(1, 0);
        nfa.add_transition(1, 'a', 2);
        nfa.add_transition(2, 'b', 0);
        nfa.add_final(2);

        let dfa = subset_construction(&nfa);
        for input in all_strings(&['a', 'b'], 4) {
            assert_eq!(
                dfa.recognize(input.chars()),
                nfa.recognize(input.chars()),
                "input {input:?}"
            );
        }
    }

    fn arb_automaton() -> impl Strategy<Value = Automaton> {
        (1u32..=4).prop_flat_map(|num_states| {
            let edges = prop::collection::vec((0..num_states, 0..3u8, 0..num_states), 0..12);
            let finals = prop::collection::vec(0..num_states, 0..=3);
            (Just(num_states), edges, finals).prop_map(|(num_states, edges, finals)| {
                let mut nfa = Automaton::new(num_states);
                for (source, symbol, dest) in edges {
                    match symbol {
                        0 => nfa.add_transition(source, 'a', dest),
                        1 => nfa.add_transition(source, 'b', dest),
                        _ => nfa.add_epsilon_transition(source, dest),
                    }
                }
                for state in finals {
                    nfa.add_final(state);
                }
                nfa
            })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_determinize_then_minimize_preserves_the_language(nfa in arb_automaton()) {
            let dfa = subset_construction(&nfa);
            let minimized = dfa.minimize();

            prop_assert!(minimized.num_states() <= dfa.num_states());
            prop_assert_eq!(minimized.minimize().num_states(), minimized.num_states());

            for input in all_strings(&['a', 'b'], 4) {
                let expected = nfa.recognize(input.chars());
                prop_assert_eq!(dfa.recognize(input.chars()), expected, "dfa disagrees on {:?}", input);
                prop_assert_eq!(
                    minimized.recognize(input.chars()),
                    expected,
                    "minimized dfa disagrees on {:?}",
                    input
                );
            }
        }
    }
}
