use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
    automaton::{epsilon_closure, move_on, Automaton, Kind, Label, State, TransitionMap},
    math::{Bijection, IndexedSet, OrderedSet},
    trace::{StepTrace, TraceRecorder},
    ConversionError, Show,
};

/// Converts `nfa` into an equivalent DFA through the subset construction.
///
/// Every DFA state stands for the ε-closed set of NFA states it contains and is named after
/// that set, e.g. `{q0, q1}`. The start state is the ε-closure of the NFA start state, and a DFA
/// state accepts if one of its NFA states accepts. Sets are discovered breadth-first in the order
/// of the alphabet. An empty successor set is not materialized, the DFA simply has no transition
/// on that symbol, so the result is a partial DFA and unreachable NFA states never show up.
///
/// The trace holds one entry per discovered DFA state, one per resolved transition and a final
/// entry with the complete DFA.
pub fn nfa_to_dfa(nfa: &Automaton) -> Result<(Automaton, StepTrace), ConversionError> {
    nfa.validate()?;
    debug!(
        "starting subset construction on NFA with {} states over {}",
        nfa.size(),
        nfa.alphabet().show()
    );
    let (dfa, trace) = SubsetConstruction::new(nfa).run();
    debug!(
        "subset construction produced DFA with {} states in {} steps",
        dfa.size(),
        trace.len() - 1
    );
    Ok((dfa, trace))
}

/// Represents the subset construction while it is running. The canonical name of every DFA
/// state is kept in a bijection with the set of NFA states it represents, sets are ordered so
/// that equal sets collapse to the same DFA state regardless of the order of discovery.
struct SubsetConstruction<'a> {
    nfa: &'a Automaton,
    names: Bijection<OrderedSet<State>, State>,
    states: IndexedSet<State>,
    transitions: TransitionMap,
    accepting: OrderedSet<State>,
    queue: VecDeque<(State, OrderedSet<State>)>,
    recorder: TraceRecorder,
}

impl<'a> SubsetConstruction<'a> {
    fn new(nfa: &'a Automaton) -> Self {
        Self {
            nfa,
            names: Bijection::new(),
            states: IndexedSet::default(),
            transitions: TransitionMap::new(),
            accepting: OrderedSet::new(),
            queue: VecDeque::new(),
            recorder: TraceRecorder::new(
                "We start by creating the DFA from the NFA using the subset construction. \
                 Each DFA state will represent a set of NFA states.",
            ),
        }
    }

    /// Picks a name for `set` that is not used yet. Usually this is just the rendered set,
    /// primes are appended in the unlikely case that state names make two renderings collide.
    fn fresh_name(&self, set: &OrderedSet<State>) -> State {
        let mut name = set.show();
        while self.names.contains_right(&State::new(name.as_str())) {
            name.push('\'');
        }
        State::new(name)
    }

    fn snapshot(&self, start: &State) -> Automaton {
        Automaton::from_parts(
            Kind::Dfa,
            self.states.clone(),
            self.nfa.alphabet().clone(),
            self.transitions.clone(),
            start.clone(),
            self.accepting.clone(),
        )
    }

    /// Returns the DFA state for `set`, creating (and recording) it if it is new.
    fn lookup_or_discover(
        &mut self,
        set: OrderedSet<State>,
        start: &State,
        reason: String,
    ) -> State {
        if let Some(name) = self.names.get_by_left(&set) {
            return name.clone();
        }

        let name = self.fresh_name(&set);
        let accepting_members = set
            .iter()
            .filter(|q| self.nfa.is_accepting(q))
            .collect::<OrderedSet<_>>();
        let acceptance = if accepting_members.is_empty() {
            "It contains no accepting NFA state, so it is not accepting.".to_string()
        } else {
            self.accepting.insert(name.clone());
            format!(
                "It contains the accepting NFA state(s) {}, so it is accepting.",
                accepting_members.show()
            )
        };
        trace!("discovered DFA state {name}");
        self.names.insert(set.clone(), name.clone());
        self.states.insert(name.clone());
        self.queue.push_back((name.clone(), set));

        // the start state is only known after its own discovery
        let start = if self.states.len() == 1 { &name } else { start };
        let snapshot = self.snapshot(start);
        self.recorder.record(
            format!("Create DFA state {name}"),
            format!("{reason} {acceptance}"),
            snapshot,
        );
        name
    }

    fn run(mut self) -> (Automaton, StepTrace) {
        let nfa = self.nfa;
        let initial = epsilon_closure(nfa, [nfa.start()]);
        let reason = format!(
            "The initial DFA state is the ε-closure of the NFA start state {}, which is {}.",
            nfa.start(),
            initial.show()
        );
        let placeholder = State::new(String::new());
        let start = self.lookup_or_discover(initial, &placeholder, reason);

        while let Some((source, set)) = self.queue.pop_front() {
            for &symbol in nfa.alphabet() {
                let moved = move_on(nfa, &set, symbol);
                let target_set = epsilon_closure(nfa, &moved);
                if target_set.is_empty() {
                    trace!("{source} has no successor on {symbol}");
                    continue;
                }

                let reason = format!(
                    "From {source} on input '{symbol}' the NFA reaches {}, whose ε-closure is {}.",
                    moved.show(),
                    target_set.show()
                );
                let target = self.lookup_or_discover(target_set, &start, reason.clone());
                self.transitions
                    .entry((source.clone(), Label::Symbol(symbol)))
                    .or_default()
                    .insert(target.clone());
                let snapshot = self.snapshot(&start);
                self.recorder.record(
                    format!("δ({source}, {symbol}) = {target}"),
                    format!("{reason} Add this transition to the DFA."),
                    snapshot,
                );
            }
        }

        let dfa = self.snapshot(&start);
        self.recorder.record(
            "DFA construction complete",
            format!(
                "All {} DFA states have been processed. The resulting DFA is equivalent to the \
                 original NFA and accepts the same language.",
                dfa.size()
            ),
            dfa.clone(),
        );
        (dfa, self.recorder.finish())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn ending_with_01() -> Automaton {
        Automaton::builder()
            .with_transitions([
                ("q0", '0', "q0"),
                ("q0", '0', "q1"),
                ("q0", '1', "q0"),
                ("q1", '1', "q2"),
            ])
            .with_accepting(["q2"])
            .into_nfa("q0")
            .unwrap()
    }

    #[test_log::test]
    fn subset_construction() {
        let nfa = ending_with_01();
        let (dfa, trace) = nfa_to_dfa(&nfa).unwrap();

        assert_eq!(dfa.kind(), Kind::Dfa);
        assert!(dfa.is_deterministic());
        assert_eq!(
            dfa.states().map(|q| q.name()).collect::<Vec<_>>(),
            vec!["{q0}", "{q0, q1}", "{q0, q2}"]
        );
        assert_eq!(dfa.start().name(), "{q0}");
        assert_eq!(
            dfa.accepting().iter().map(|q| q.name()).collect::<Vec<_>>(),
            vec!["{q0, q2}"]
        );
        // placeholder, 3 states, 6 transitions, completion
        assert_eq!(trace.len(), 11);
        assert_eq!(trace.get(1).unwrap().label(), "Create DFA state {q0}");
        assert_eq!(
            trace.last().unwrap().snapshot(),
            Some(&Snapshot::Automaton(dfa.clone()))
        );

        for word in KleeneStar::new(nfa.alphabet()).take_while(|w| w.chars().count() <= 6) {
            assert_eq!(nfa.accepts(&word), dfa.accepts(&word), "disagree on {word:?}");
        }
    }

    #[test_log::test]
    fn epsilon_closure_in_start_and_targets() {
        let nfa = Automaton::builder()
            .with_transitions([("q0", 'a', "q2"), ("q1", 'b', "q3"), ("q2", 'a', "q3")])
            .with_epsilon_transitions([("q0", "q1")])
            .with_accepting(["q3"])
            .into_nfa("q0")
            .unwrap();
        let (dfa, _) = nfa_to_dfa(&nfa).unwrap();
        assert_eq!(dfa.start().name(), "{q0, q1}");
        assert!(dfa.accepts("b"));
        assert!(dfa.accepts("aa"));
        assert!(!dfa.accepts("a"));
        assert!(!dfa.accepts("ba"));
        // {q2} on b and {q3} on anything lead nowhere, no sink state is created
        assert_eq!(dfa.size(), 3);
        assert_eq!(dfa.transition_count(), 3);
    }

    #[test_log::test]
    fn unreachable_states_do_not_contribute() {
        let nfa = Automaton::builder()
            .with_transitions([("p", 'a', "p"), ("dead", 'a', "p"), ("dead", 'b', "dead")])
            .with_accepting(["p", "dead"])
            .into_nfa("p")
            .unwrap();
        let (dfa, _) = nfa_to_dfa(&nfa).unwrap();
        assert_eq!(dfa.size(), 1);
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("aaa"));
        assert!(!dfa.accepts("b"));
    }

    #[test_log::test]
    fn accepting_start() {
        let nfa = Automaton::builder()
            .with_transitions([("s", 'x', "t")])
            .with_epsilon_transitions([("s", "f")])
            .with_accepting(["f"])
            .into_nfa("s")
            .unwrap();
        let (dfa, trace) = nfa_to_dfa(&nfa).unwrap();
        assert!(dfa.is_accepting(dfa.start()));
        let Some(Snapshot::Automaton(first)) = trace.get(1).unwrap().snapshot() else {
            panic!("first step must carry an automaton");
        };
        assert!(first.is_accepting(first.start()));
    }

    #[test_log::test]
    fn equal_sets_collapse() {
        // both symbols lead to the same set, discovered in a different order
        let nfa = Automaton::builder()
            .with_transitions([
                ("s", 'a', "x"),
                ("s", 'a', "y"),
                ("s", 'b', "y"),
                ("s", 'b', "x"),
            ])
            .into_nfa("s")
            .unwrap();
        let (dfa, trace) = nfa_to_dfa(&nfa).unwrap();
        assert_eq!(dfa.size(), 2);
        // placeholder, 2 states, 2 transitions, completion
        assert_eq!(trace.len(), 6);
    }
}
