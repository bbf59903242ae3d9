use std::{borrow::Borrow, collections::VecDeque};

use crate::math::OrderedSet;

use super::{Automaton, Label, State};

/// Computes the ε-closure of `states`, i.e. the smallest superset of `states` that is closed
/// under ε-transitions. The closure is computed by a breadth-first search, a state is only
/// enqueued when it is seen for the first time, so cycles of ε-transitions terminate.
pub fn epsilon_closure<I>(automaton: &Automaton, states: I) -> OrderedSet<State>
where
    I: IntoIterator,
    I::Item: Borrow<State>,
{
    let mut closure = OrderedSet::new();
    let mut queue = VecDeque::new();
    for q in states {
        let q = q.borrow();
        if closure.insert(q.clone()) {
            queue.push_back(q.clone());
        }
    }

    while let Some(q) = queue.pop_front() {
        for p in automaton.successors(&q, Label::Epsilon) {
            if closure.insert(p.clone()) {
                queue.push_back(p.clone());
            }
        }
    }
    closure
}

/// Collects all states that can be reached from a state in `states` by reading `symbol`,
/// without following ε-transitions afterwards.
pub fn move_on<I>(automaton: &Automaton, states: I, symbol: char) -> OrderedSet<State>
where
    I: IntoIterator,
    I::Item: Borrow<State>,
{
    states
        .into_iter()
        .flat_map(|q| {
            automaton
                .successors(q.borrow(), Label::Symbol(symbol))
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn states(names: &[&str]) -> math::OrderedSet<State> {
        names.iter().map(|q| State::from(*q)).collect()
    }

    #[test_log::test]
    fn closure_terminates_on_cycles() {
        let nfa = Automaton::builder()
            .with_epsilon_transitions([("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")])
            .with_transitions([("c", 'x', "d")])
            .into_nfa("a")
            .unwrap();
        assert_eq!(
            epsilon_closure(&nfa, [State::from("a")]),
            states(&["a", "b", "c"])
        );
        assert_eq!(
            epsilon_closure(&nfa, [State::from("d")]),
            states(&["a", "b", "c", "d"])
        );
        assert_eq!(epsilon_closure(&nfa, Vec::<State>::new()), states(&[]));
    }

    #[test_log::test]
    fn closure_is_order_independent() {
        let nfa = Automaton::builder()
            .with_epsilon_transitions([("p", "q"), ("r", "s")])
            .into_nfa("p")
            .unwrap();
        let forward = epsilon_closure(&nfa, [State::from("p"), State::from("r")]);
        let backward = epsilon_closure(&nfa, [State::from("r"), State::from("p")]);
        assert_eq!(forward, backward);
        assert_eq!(forward, states(&["p", "q", "r", "s"]));
    }

    #[test_log::test]
    fn move_without_transition_is_empty() {
        let nfa = Automaton::builder()
            .with_transitions([("p", 'a', "q"), ("p", 'a', "r"), ("q", 'b', "p")])
            .into_nfa("p")
            .unwrap();
        assert_eq!(move_on(&nfa, &states(&["p", "q"]), 'a'), states(&["q", "r"]));
        assert_eq!(move_on(&nfa, &states(&["r"]), 'a'), states(&[]));
    }
}
