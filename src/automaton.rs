use std::fmt::Display;

use itertools::Itertools;

use crate::{
    error::AutomatonDefect,
    math::{IndexedSet, OrderedMap, OrderedSet},
    Show,
};

mod builder;
pub use builder::AutomatonBuilder;

mod closure;
pub use closure::{epsilon_closure, move_on};

/// Identifies a state within one automaton. States are compared by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State(String);

impl State {
    /// Creates a state with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Returns the name of the state.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for State {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&State> for State {
    fn from(value: &State) -> Self {
        value.clone()
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Show for State {
    fn show(&self) -> String {
        self.0.clone()
    }
}

/// The label of a transition, either a symbol of the alphabet or ε.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Reads the given symbol.
    Symbol(char),
    /// Moves without reading input.
    Epsilon,
}

impl Label {
    /// Returns the symbol if this is not an ε label.
    pub fn symbol(&self) -> Option<char> {
        match self {
            Label::Symbol(c) => Some(*c),
            Label::Epsilon => None,
        }
    }

    /// Returns true if and only if this is the ε label.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Symbol(c) => write!(f, "{c}"),
            Label::Epsilon => write!(f, "ε"),
        }
    }
}

impl Show for Label {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl From<char> for Label {
    fn from(value: char) -> Self {
        Label::Symbol(value)
    }
}

/// Whether an automaton is known to satisfy the DFA invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No restriction on the transitions.
    Nfa,
    /// At most one successor per state and symbol, no ε-transitions.
    Dfa,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Nfa => write!(f, "NFA"),
            Kind::Dfa => write!(f, "DFA"),
        }
    }
}

/// Transition relation of an automaton, mapping a state and a label to the set of successors.
pub(crate) type TransitionMap = OrderedMap<(State, Label), OrderedSet<State>>;

/// A finite automaton over an alphabet of `char`s. It consists of a set of states (which keeps
/// the order in which the states were declared), an alphabet, a transition relation that maps
/// a state and a [`Label`] to a set of successor states, a start state and a set of accepting
/// states.
///
/// Values of this type are immutable, conversions always produce a new automaton. They are
/// created through [`AutomatonBuilder`] which validates all invariants, so every `Automaton`
/// is well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    kind: Kind,
    states: IndexedSet<State>,
    alphabet: OrderedSet<char>,
    transitions: TransitionMap,
    start: State,
    accepting: OrderedSet<State>,
}

impl Automaton {
    /// Returns a fresh [`AutomatonBuilder`].
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::default()
    }

    /// Assembles an automaton from its parts without validating them. Engines use this for
    /// values that are well-formed by construction.
    pub(crate) fn from_parts(
        kind: Kind,
        states: IndexedSet<State>,
        alphabet: OrderedSet<char>,
        transitions: TransitionMap,
        start: State,
        accepting: OrderedSet<State>,
    ) -> Self {
        Self {
            kind,
            states,
            alphabet,
            transitions,
            start,
            accepting,
        }
    }

    /// Returns the same automaton tagged with `kind`, without checking the DFA invariants.
    pub(crate) fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this automaton is tagged as NFA or DFA.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Iterates over the states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    /// Returns true if `state` is a state of `self`.
    pub fn contains(&self, state: &State) -> bool {
        self.states.contains(state)
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// The alphabet, ε is never part of it.
    pub fn alphabet(&self) -> &OrderedSet<char> {
        &self.alphabet
    }

    /// The start state.
    pub fn start(&self) -> &State {
        &self.start
    }

    /// The set of accepting states.
    pub fn accepting(&self) -> &OrderedSet<State> {
        &self.accepting
    }

    /// Returns true if and only if `state` is accepting.
    pub fn is_accepting(&self, state: &State) -> bool {
        self.accepting.contains(state)
    }

    /// Iterates over the successors of `state` on `label`. A missing transition yields nothing.
    pub fn successors(&self, state: &State, label: Label) -> impl Iterator<Item = &State> + '_ {
        self.transitions
            .get(&(state.clone(), label))
            .into_iter()
            .flatten()
    }

    /// Iterates over all transitions as triples `(source, label, target)`, ordered by source,
    /// label and target.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, Label, &State)> + '_ {
        self.transitions
            .iter()
            .flat_map(|((from, label), targets)| targets.iter().map(move |to| (from, *label, to)))
    }

    /// The number of transitions, counting each target separately.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(|targets| targets.len()).sum()
    }

    /// Returns true if some transition is labeled with ε.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions.keys().any(|(_, label)| label.is_epsilon())
    }

    /// Checks the structural invariants: the start state and all accepting states are
    /// declared, and every transition connects declared states through a symbol of the
    /// alphabet or ε.
    pub fn validate(&self) -> Result<(), AutomatonDefect> {
        if !self.states.contains(&self.start) {
            return Err(AutomatonDefect::UnknownStart(self.start.clone()));
        }
        if let Some(q) = self.accepting.iter().find(|q| !self.states.contains(*q)) {
            return Err(AutomatonDefect::UnknownAccepting(q.clone()));
        }
        for ((from, label), targets) in &self.transitions {
            if !self.states.contains(from) {
                return Err(AutomatonDefect::UnknownSource(from.clone()));
            }
            if let Label::Symbol(symbol) = label {
                if !self.alphabet.contains(symbol) {
                    return Err(AutomatonDefect::UnknownSymbol {
                        from: from.clone(),
                        symbol: *symbol,
                    });
                }
            }
            if let Some(to) = targets.iter().find(|q| !self.states.contains(*q)) {
                return Err(AutomatonDefect::UnknownTarget {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks the structural invariants and additionally that there are no ε-transitions and
    /// that every state has at most one successor per symbol. Missing transitions are allowed.
    pub fn validate_deterministic(&self) -> Result<(), AutomatonDefect> {
        self.validate()?;
        for ((from, label), targets) in &self.transitions {
            match label {
                Label::Epsilon if !targets.is_empty() => {
                    return Err(AutomatonDefect::EpsilonInDfa(from.clone()))
                }
                Label::Symbol(symbol) if targets.len() > 1 => {
                    return Err(AutomatonDefect::Nondeterministic {
                        state: from.clone(),
                        symbol: *symbol,
                        count: targets.len(),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true if and only if `self` satisfies the DFA invariants.
    pub fn is_deterministic(&self) -> bool {
        self.validate_deterministic().is_ok()
    }

    /// Simulates the automaton on `word` and returns whether it ends in an accepting state.
    /// This works for nondeterministic automata as well, the simulation tracks the set of
    /// reachable states and follows ε-transitions.
    pub fn accepts(&self, word: &str) -> bool {
        let mut current = epsilon_closure(self, [&self.start]);
        for symbol in word.chars() {
            if current.is_empty() {
                return false;
            }
            current = epsilon_closure(self, move_on(self, &current, symbol));
        }
        current.iter().any(|q| self.is_accepting(q))
    }

    /// Renders the transition table with one row per state and one column per symbol (plus
    /// one for ε if needed). The start state is marked with `→`, accepting states with `*`.
    pub fn transition_table(&self) -> String {
        let mut labels = self.alphabet.iter().map(|c| Label::Symbol(*c)).collect_vec();
        if self.has_epsilon_transitions() {
            labels.push(Label::Epsilon);
        }

        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(labels.iter().map(|l| l.to_string())),
        );
        for state in &self.states {
            let marker = match (state == &self.start, self.is_accepting(state)) {
                (true, true) => "→*",
                (true, false) => "→",
                (false, true) => "*",
                (false, false) => "",
            };
            let mut row = vec![format!("{marker}{state}")];
            for label in &labels {
                match self.transitions.get(&(state.clone(), *label)) {
                    Some(targets) if !targets.is_empty() => row.push(targets.show()),
                    _ => row.push("-".to_string()),
                }
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} with {} states over {}",
            self.kind,
            self.size(),
            self.alphabet.show()
        )?;
        write!(f, "{}", self.transition_table())
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
    fn nfa_simulation() {
        let nfa = ending_with_01();
        assert!(nfa.accepts("01"));
        assert!(nfa.accepts("1101"));
        assert!(!nfa.accepts(""));
        assert!(!nfa.accepts("10"));
        assert!(!nfa.accepts("011"));
        assert!(!nfa.is_deterministic());
        assert_eq!(nfa.size(), 3);
        assert_eq!(nfa.transition_count(), 4);
    }

    #[test_log::test]
    fn epsilon_simulation() {
        let nfa = Automaton::builder()
            .with_transitions([("q0", 'a', "q2"), ("q1", 'b', "q3"), ("q2", 'a', "q3")])
            .with_epsilon_transitions([("q0", "q1")])
            .with_accepting(["q3"])
            .into_nfa("q0")
            .unwrap();
        assert!(nfa.accepts("b"));
        assert!(nfa.accepts("aa"));
        assert!(!nfa.accepts("ab"));
        assert!(!nfa.accepts("symbol outside of the alphabet"));
        assert!(nfa.has_epsilon_transitions());
    }

    #[test_log::test]
    fn malformed_start() {
        let result = Automaton::builder()
            .with_states(["A"])
            .with_accepting(["A"])
            .into_nfa("B");
        assert_eq!(
            result,
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::UnknownStart(State::from("B"))
            ))
        );
    }

    #[test_log::test]
    fn dfa_invariants() {
        let branching = Automaton::builder()
            .with_transitions([("p", 'a', "p"), ("p", 'a', "q")])
            .into_dfa("p");
        assert!(matches!(
            branching,
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::Nondeterministic { count: 2, .. }
            ))
        ));

        let epsilon = Automaton::builder()
            .with_epsilon_transitions([("p", "q")])
            .into_dfa("p");
        assert_eq!(
            epsilon,
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::EpsilonInDfa(State::from("p"))
            ))
        );

        let partial = Automaton::builder()
            .with_alphabet(['a', 'b'])
            .with_transitions([("p", 'a', "q")])
            .into_dfa("p")
            .unwrap();
        assert_eq!(partial.kind(), Kind::Dfa);
        assert!(!partial.accepts(""));
    }

    #[test_log::test]
    fn transition_table_marks_start_and_accepting() {
        let table = ending_with_01().transition_table();
        assert!(table.contains("→q0"));
        assert!(table.contains("*q2"));
        assert!(table.contains("{q0, q1}"));
    }
}
