//! Automaton combinators: union, concatenation, and Kleene closure.
//!
//! Each combinator builds a fresh automaton with contiguous numbering by
//! relocating its inputs at fixed offsets and wiring them together with
//! epsilon moves. Inputs are never mutated, and calling a combinator twice
//! with the same inputs yields structurally equal results.

use crate::nfa::Automaton;
use crate::state::StateId;

/// Copy every transition of `source` into `target`, shifting both endpoints
/// by `offset`.
fn relocate(target: &mut Automaton, source: &Automaton, offset: StateId) {
    for (from, symbol, to) in source.transitions() {
        target.add_transition(from + offset, symbol.clone(), to + offset);
    }
}

/// An automaton accepting any string accepted by `a` or by `b`.
///
/// A new start state branches by epsilon into both relocated starts, and
/// every original final feeds a single new final state. The result has
/// `a.num_states() + b.num_states() + 2` states.
pub fn union(a: &Automaton, b: &Automaton) -> Automaton {
    let offset_a = 1;
    let offset_b = 1 + a.num_states();
    let final_state = offset_b + b.num_states();

    let mut result = Automaton::new(final_state + 1);
    relocate(&mut result, a, offset_a);
    relocate(&mut result, b, offset_b);

    result.add_epsilon_transition(0, offset_a + a.start());
    result.add_epsilon_transition(0, offset_b + b.start());
    for state in a.finals().iter() {
        result.add_epsilon_transition(offset_a + state, final_state);
    }
    for state in b.finals().iter() {
        result.add_epsilon_transition(offset_b + state, final_state);
    }
    result.add_final(final_state);
    result
}

/// An automaton accepting any string splittable into a prefix accepted by
/// `a` and a suffix accepted by `b`.
///
/// `a` keeps its numbering, `b` is shifted past it, and a single new final
/// state closes the chain; `a`'s finals stop being final and instead feed
/// `b`'s start by epsilon. The result has
/// `a.num_states() + b.num_states() + 1` states.
pub fn concatenation(a: &Automaton, b: &Automaton) -> Automaton {
    let offset_b = a.num_states();
    let final_state = offset_b + b.num_states();

    let mut result = Automaton::new(final_state + 1);
    result.set_start(a.start());
    relocate(&mut result, a, 0);
    relocate(&mut result, b, offset_b);

    for state in a.finals().iter() {
        result.add_epsilon_transition(state, offset_b + b.start());
    }
    for state in b.finals().iter() {
        result.add_epsilon_transition(offset_b + state, final_state);
    }
    result.add_final(final_state);
    result
}

/// An automaton accepting zero or more repetitions of strings accepted by
/// `a`.
///
/// The new start reaches the relocated start and, for the zero-repetition
/// case, the new final by epsilon; every original final loops back to the
/// new start, which is what permits further repetitions. The result has
/// `a.num_states() + 2` states.
pub fn closure(a: &Automaton) -> Automaton {
    let offset = 1;
    let final_state = offset + a.num_states();

    let mut result = Automaton::new(final_state + 1);
    relocate(&mut result, a, offset);

    result.add_epsilon_transition(0, offset + a.start());
    result.add_epsilon_transition(0, final_state);
    for state in a.finals().iter() {
        result.add_epsilon_transition(offset + state, 0);
    }
    result.add_final(final_state);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An automaton accepting exactly the given single symbol.
    fn symbol_automaton(symbol: char) -> Automaton {
        let mut automaton = Automaton::new(2);
        automaton.add_transition(0, symbol, 1);
        automaton.add_final(1);
        automaton
    }

    #[test]
    fn test_union_accepts_either_language() {
        let a = symbol_automaton('a');
        let b = symbol_automaton('b');
        let either = union(&a, &b);

        assert_eq!(either.num_states(), a.num_states() + b.num_states() + 2);
        assert!(either.recognize("a".chars()));
        assert!(either.recognize("b".chars()));
        assert!(!either.recognize("ab".chars()));
        assert!(!either.recognize("".chars()));
    }

    #[test]
    fn test_concatenation_accepts_the_split_language() {
        let a = symbol_automaton('a');
        let b = symbol_automaton('b');
        let chained = concatenation(&a, &b);

        assert_eq!(chained.num_states(), a.num_states() + b.num_states() + 1);
        assert!(chained.recognize("ab".chars()));
        // The first automaton's finals stop being final in the result.
        assert!(!chained.recognize("a".chars()));
        assert!(!chained.recognize("b".chars()));
        assert!(!chained.recognize("ba".chars()));
    }

    #[test]
    fn test_closure_accepts_repetitions() {
        let a = symbol_automaton('a');
        let repeated = closure(&a);

        assert_eq!(repeated.num_states(), a.num_states() + 2);
        assert!(repeated.recognize("".chars()));
        assert!(repeated.recognize("a".chars()));
        assert!(repeated.recognize("aa".chars()));
        assert!(repeated.recognize("aaa".chars()));
        assert!(!repeated.recognize("b".chars()));
    }

    #[test]
    fn test_combinators_compose() {
        // (a|b)(a*) recognizes a or b followed by any number of a's.
        let composed = concatenation(
            &union(&symbol_automaton('a'), &symbol_automaton('b')),
            &closure(&symbol_automaton('a')),
        );
        assert!(composed.recognize("a".chars()));
        assert!(composed.recognize("baaa".chars()));
        assert!(!composed.recognize("".chars()));
        assert!(!composed.recognize("ab".chars()));
    }

    #[test]
    fn test_inputs_are_left_untouched() {
        let a = symbol_automaton('a');
        let b = symbol_automaton('b');
        let before_a = a.clone();
        let before_b = b.clone();

        let _ = union(&a, &b);
        let _ = concatenation(&a, &b);
        let _ = closure(&a);

        assert_eq!(a, before_a);
        assert_eq!(b, before_b);
    }

    #[test]
    fn test_repeated_calls_build_equal_automata() {
        let a = symbol_automaton('a');
        let b = symbol_automaton('b');
        assert_eq!(union(&a, &b), union(&a, &b));
        assert_eq!(concatenation(&a, &b), concatenation(&a, &b));
        assert_eq!(closure(&a), closure(&a));
    }

    #[test]
    fn test_union_respects_shifted_starts() {
        // An input whose start is not state 0 still gets wired correctly.
        let mut shifted = Automaton::new(2);
        shifted.add_transition(1, 'c', 0);
        shifted.set_start(1);
        shifted.add_final(0);

        let either = union(&shifted, &symbol_automaton('b'));
        assert!(either.recognize("c".chars()));
        assert!(either.recognize("b".chars()));
        assert!(!either.recognize("cb".chars()));
    }
}
