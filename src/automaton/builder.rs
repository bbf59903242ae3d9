use tracing::trace;

use crate::{
    math::{IndexedSet, OrderedSet},
    ConversionError,
};

use super::{Automaton, Kind, Label, State, TransitionMap};

/// Helper struct for the construction of automata. It stores a list of transitions, the
/// accepting states and optionally an explicit declaration of states and alphabet.
///
/// If no states are declared, the states are collected from the transitions, the start state
/// and the accepting states in the order in which they first appear. If no alphabet is declared,
/// it consists of all symbols that appear on some transition. Declaring them explicitly means
/// that anything outside of the declaration is reported as malformed.
///
/// # Example
///
/// We want to create a DFA with two states A and B over the alphabet `['0', '1']` which accepts
/// all words with an even number of `0`s.
/// ```
/// use automata_convert::prelude::*;
///
/// let dfa = Automaton::builder()
///     .with_states(["A", "B"])
///     .with_transitions([("A", '0', "B"), ("A", '1', "A"), ("B", '0', "A"), ("B", '1', "B")])
///     .with_accepting(["A"])
///     .into_dfa("A") // A is the start state
///     .unwrap();
/// assert!(dfa.accepts("0110"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    states: Option<IndexedSet<State>>,
    alphabet: Option<OrderedSet<char>>,
    edges: Vec<(State, Label, State)>,
    accepting: Vec<State>,
}

impl AutomatonBuilder {
    /// Declares the states. Can be called multiple times, the declarations accumulate.
    pub fn with_states<I, S>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.states
            .get_or_insert_with(IndexedSet::default)
            .extend(iter.into_iter().map(Into::into));
        self
    }

    /// Declares the alphabet. Can be called multiple times, the declarations accumulate.
    pub fn with_alphabet<I: IntoIterator<Item = char>>(mut self, iter: I) -> Self {
        self.alphabet
            .get_or_insert_with(OrderedSet::default)
            .extend(iter);
        self
    }

    /// Adds transitions given as triples `(source, symbol, target)`.
    pub fn with_transitions<I, S, T>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<State>,
        T: Into<State>,
    {
        self.edges.extend(
            iter.into_iter()
                .map(|(p, c, q)| (p.into(), Label::Symbol(c), q.into())),
        );
        self
    }

    /// Adds ε-transitions given as pairs `(source, target)`.
    pub fn with_epsilon_transitions<I, S, T>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<State>,
        T: Into<State>,
    {
        self.edges.extend(
            iter.into_iter()
                .map(|(p, q)| (p.into(), Label::Epsilon, q.into())),
        );
        self
    }

    /// Marks the given states as accepting.
    pub fn with_accepting<I, S>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.accepting.extend(iter.into_iter().map(Into::into));
        self
    }

    fn assemble(self, kind: Kind, start: State) -> Automaton {
        let states = self.states.unwrap_or_else(|| {
            std::iter::once(start.clone())
                .chain(
                    self.edges
                        .iter()
                        .flat_map(|(p, _, q)| [p.clone(), q.clone()]),
                )
                .chain(self.accepting.iter().cloned())
                .collect()
        });
        let alphabet = self.alphabet.unwrap_or_else(|| {
            self.edges
                .iter()
                .filter_map(|(_, label, _)| label.symbol())
                .collect()
        });

        let mut transitions = TransitionMap::new();
        for (p, label, q) in self.edges {
            transitions.entry((p, label)).or_default().insert(q);
        }

        Automaton::from_parts(
            kind,
            states,
            alphabet,
            transitions,
            start,
            self.accepting.into_iter().collect(),
        )
    }

    /// Builds a (possibly) nondeterministic automaton with the given start state. Fails if the
    /// structural invariants are violated.
    pub fn into_nfa<S: Into<State>>(self, start: S) -> Result<Automaton, ConversionError> {
        let nfa = self.assemble(Kind::Nfa, start.into());
        nfa.validate()?;
        trace!(
            "built NFA with {} states and {} transitions",
            nfa.size(),
            nfa.transition_count()
        );
        Ok(nfa)
    }

    /// Builds a deterministic automaton with the given start state. Fails if the structural
    /// invariants are violated, if some state has an ε-transition or if some state has more
    /// than one successor on a symbol.
    pub fn into_dfa<S: Into<State>>(self, start: S) -> Result<Automaton, ConversionError> {
        let dfa = self.assemble(Kind::Dfa, start.into());
        dfa.validate_deterministic()?;
        trace!(
            "built DFA with {} states and {} transitions",
            dfa.size(),
            dfa.transition_count()
        );
        Ok(dfa)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn inferred_states_keep_first_appearance_order() {
        let nfa = Automaton::builder()
            .with_transitions([("b", 'x', "c"), ("a", 'x', "b")])
            .with_accepting(["d"])
            .into_nfa("a")
            .unwrap();
        assert_eq!(
            nfa.states().map(|q| q.name()).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
        assert_eq!(nfa.alphabet().iter().collect::<String>(), "x");
    }

    #[test_log::test]
    fn declared_alphabet_is_enforced() {
        let result = Automaton::builder()
            .with_alphabet(['0'])
            .with_transitions([("p", '1', "p")])
            .into_nfa("p");
        assert_eq!(
            result,
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::UnknownSymbol {
                    from: State::from("p"),
                    symbol: '1'
                }
            ))
        );
    }

    #[test_log::test]
    fn declared_states_are_enforced() {
        let unknown_target = Automaton::builder()
            .with_states(["p"])
            .with_transitions([("p", 'a', "q")])
            .into_nfa("p");
        assert_eq!(
            unknown_target,
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::UnknownTarget {
                    from: State::from("p"),
                    to: State::from("q")
                }
            ))
        );

        let unknown_accepting = Automaton::builder()
            .with_states(["p"])
            .with_accepting(["z"])
            .into_nfa("p");
        assert_eq!(
            unknown_accepting,
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::UnknownAccepting(State::from("z"))
            ))
        );
    }
}
