use std::fmt::Display;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    automaton::{Automaton, Label, State},
    math::{IndexedSet, OrderedMap},
    regex::RegexNode,
    trace::{StepTrace, TraceRecorder},
    ConversionError,
};

/// The result of state elimination. An automaton that accepts nothing has no regular expression
/// in the syntax of [`RegexNode`], which is reported as [`RegexOutcome::EmptyLanguage`]. This is
/// a legitimate outcome and not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexOutcome {
    /// A regular expression for the accepted language.
    Expression(RegexNode),
    /// The automaton accepts no word at all.
    EmptyLanguage,
}

impl RegexOutcome {
    /// Returns the expression unless the language is empty.
    pub fn expression(&self) -> Option<&RegexNode> {
        match self {
            RegexOutcome::Expression(e) => Some(e),
            RegexOutcome::EmptyLanguage => None,
        }
    }
}

impl Display for RegexOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegexOutcome::Expression(e) => write!(f, "{e}"),
            RegexOutcome::EmptyLanguage => write!(f, "∅"),
        }
    }
}

/// An automaton whose edges carry regular expressions, with a single start state that has no
/// incoming edges and a single accepting state without outgoing edges. Between any two states
/// there is at most one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralizedAutomaton {
    states: IndexedSet<State>,
    start: State,
    accept: State,
    edges: OrderedMap<(State, State), RegexNode>,
}

impl GeneralizedAutomaton {
    /// The remaining states, start first and accepting state last.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    /// The start state.
    pub fn start(&self) -> &State {
        &self.start
    }

    /// The accepting state.
    pub fn accept(&self) -> &State {
        &self.accept
    }

    /// The label of the edge from `from` to `to`, if there is one.
    pub fn edge(&self, from: &State, to: &State) -> Option<&RegexNode> {
        self.edges.get(&(from.clone(), to.clone()))
    }

    /// Iterates over all edges as `(from, to, label)`.
    pub fn edges(&self) -> impl Iterator<Item = (&State, &State, &RegexNode)> + '_ {
        self.edges.iter().map(|((p, q), label)| (p, q, label))
    }

    /// Adds an edge, a parallel edge is merged by union. Returns the label of the merged edge.
    fn add_edge(&mut self, from: State, to: State, label: RegexNode) -> RegexNode {
        let key = (from, to);
        let merged = match self.edges.remove(&key) {
            Some(existing) => union(existing, label),
            None => label,
        };
        self.edges.insert(key, merged.clone());
        merged
    }

    /// Removes `state` and folds every path `p → state → r` into an edge `p → r`. Returns the
    /// rewritten edges.
    fn eliminate(&mut self, state: &State) -> Vec<(State, State, RegexNode)> {
        let self_loop = self.edges.remove(&(state.clone(), state.clone()));
        let incoming = self
            .edges
            .iter()
            .filter(|((_, q), _)| q == state)
            .map(|((p, _), label)| (p.clone(), label.clone()))
            .collect_vec();
        let outgoing = self
            .edges
            .iter()
            .filter(|((p, _), _)| p == state)
            .map(|((_, r), label)| (r.clone(), label.clone()))
            .collect_vec();
        self.edges.retain(|(p, q), _| p != state && q != state);
        self.states.shift_remove(state);

        let mut rewritten = vec![];
        for ((p, into), (r, out_of)) in incoming.iter().cartesian_product(outgoing.iter()) {
            let through = match &self_loop {
                Some(loop_label) => concat(
                    concat(into.clone(), star(loop_label.clone())),
                    out_of.clone(),
                ),
                None => concat(into.clone(), out_of.clone()),
            };
            let merged = self.add_edge(p.clone(), r.clone(), through);
            trace!("rewrote {p} → {r} as {merged}");
            rewritten.push((p.clone(), r.clone(), merged));
        }
        rewritten
    }
}

impl Display for GeneralizedAutomaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "generalized NFA with states {}, start {}, accepting {}",
            self.states.iter().join(", "),
            self.start,
            self.accept
        )?;
        write!(
            f,
            "{}",
            self.edges
                .iter()
                .map(|((p, q), label)| format!("{p} --{label}--> {q}"))
                .join("\n")
        )
    }
}

// The smart constructors keep labels small and nest to the left, which is how they are printed
// without parentheses.

fn union(left: RegexNode, right: RegexNode) -> RegexNode {
    match (left, right) {
        (l, r) if l == r => l,
        (l, RegexNode::Union(a, b)) => union(union(l, *a), *b),
        (l, r) => RegexNode::union(l, r),
    }
}

fn concat(left: RegexNode, right: RegexNode) -> RegexNode {
    match (left, right) {
        (RegexNode::Epsilon, r) => r,
        (l, RegexNode::Epsilon) => l,
        (l, RegexNode::Concat(a, b)) => concat(concat(l, *a), *b),
        (l, r) => RegexNode::concat(l, r),
    }
}

fn star(inner: RegexNode) -> RegexNode {
    match inner {
        RegexNode::Epsilon => RegexNode::Epsilon,
        starred @ RegexNode::Star(_) => starred,
        other => RegexNode::star(other),
    }
}

/// Picks a name based on `base` that is not a state of `automaton`.
fn fresh_name(automaton: &Automaton, base: &str) -> State {
    let mut name = base.to_string();
    while automaton.contains(&State::new(name.as_str())) {
        name.push('\'');
    }
    State::new(name)
}

/// Computes a regular expression for the language of `automaton` by state elimination.
///
/// First a new start state with an ε-edge to the old start state and a new accepting state with
/// ε-edges from all old accepting states are added, and every transition label becomes a
/// [`RegexNode`]. Then the original states are eliminated one by one in declaration order:
/// for every pair of edges `p → q` labeled `R1` and `q → r` labeled `R2` an edge `p → r` labeled
/// `R1 R3* R2` is added, where `R3` is the label of the self loop on `q` (the star is left out
/// if there is none). This is Arden's rule `X = R3 X + R2 ⇒ X = R3* R2`. Parallel edges are
/// merged by union. When only the new start and accepting state are left, the label of the edge
/// between them is the result, and if there is no such edge the language is empty.
///
/// The trace holds an entry for the normalization, one per eliminated state and a final entry.
pub fn to_regex(automaton: &Automaton) -> Result<(RegexOutcome, StepTrace), ConversionError> {
    automaton.validate()?;
    debug!(
        "starting state elimination on {} with {} states",
        automaton.kind(),
        automaton.size()
    );

    let mut recorder = TraceRecorder::new(
        "We use the state elimination method to convert the automaton into a regular \
         expression. Transition labels become regular expressions that grow as states are \
         removed.",
    );

    let start = fresh_name(automaton, "start");
    let accept = fresh_name(automaton, "accept");
    let mut generalized = GeneralizedAutomaton {
        states: std::iter::once(start.clone())
            .chain(automaton.states().cloned())
            .chain(std::iter::once(accept.clone()))
            .collect(),
        start: start.clone(),
        accept: accept.clone(),
        edges: OrderedMap::new(),
    };
    generalized.add_edge(start.clone(), automaton.start().clone(), RegexNode::Epsilon);
    for (p, label, q) in automaton.transitions() {
        let label = match label {
            Label::Symbol(c) => RegexNode::Symbol(c),
            Label::Epsilon => RegexNode::Epsilon,
        };
        generalized.add_edge(p.clone(), q.clone(), label);
    }
    for q in automaton.accepting() {
        generalized.add_edge(q.clone(), accept.clone(), RegexNode::Epsilon);
    }
    recorder.record(
        "Add new start and accepting states",
        format!(
            "Add the new start state {start} with an ε-edge to the old start state {}, and the \
             new accepting state {accept} with ε-edges from the old accepting states. Parallel \
             transitions are merged into a single edge labeled with their union.",
            automaton.start()
        ),
        generalized.clone(),
    );

    for state in automaton.states() {
        let rewritten = generalized.eliminate(state);
        let explanation = if rewritten.is_empty() {
            format!(
                "Eliminate {state}. It does not lie on a path from {start} to {accept}, so its \
                 edges are simply dropped."
            )
        } else {
            format!(
                "Eliminate {state}, combining its incoming and outgoing edges by concatenation \
                 (with the starred self loop in between) and union: {}.",
                rewritten
                    .iter()
                    .map(|(p, r, label)| format!("{p} → {r} becomes {label}"))
                    .join("; ")
            )
        };
        recorder.record(format!("Eliminate {state}"), explanation, generalized.clone());
    }

    let outcome = match generalized.edge(&start, &accept) {
        Some(label) => {
            let label = label.clone();
            recorder.record(
                "Final regular expression obtained",
                format!(
                    "Only {start} and {accept} remain, connected by the regular expression \
                     {label}. It describes exactly the language accepted by the automaton."
                ),
                label.clone(),
            );
            RegexOutcome::Expression(label)
        }
        None => {
            recorder.record(
                "Language is empty",
                format!(
                    "Only {start} and {accept} remain and they are not connected, so the \
                     automaton accepts no word."
                ),
                generalized,
            );
            RegexOutcome::EmptyLanguage
        }
    };
    debug!("state elimination produced {outcome}");
    Ok((outcome, recorder.finish()))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn even_zeros() -> Automaton {
        Automaton::builder()
            .with_states(["A", "B"])
            .with_alphabet(['0', '1'])
            .with_transitions([
                ("A", '0', "B"),
                ("A", '1', "A"),
                ("B", '0', "A"),
                ("B", '1', "B"),
            ])
            .with_accepting(["A"])
            .into_dfa("A")
            .unwrap()
    }

    fn expression(automaton: &Automaton) -> RegexNode {
        let (outcome, _) = to_regex(automaton).unwrap();
        outcome.expression().cloned().expect("language should not be empty")
    }

    #[test_log::test]
    fn even_number_of_zeros() {
        let dfa = even_zeros();
        let regex = expression(&dfa);
        let (nfa, _) = regex_to_nfa(&regex);
        for word in ["", "11", "00", "0101", "010"] {
            assert!(dfa.accepts(word));
            assert!(nfa.accepts(word), "{regex} should accept {word:?}");
        }
        for word in ["0", "01", "000", "1011"] {
            assert!(!dfa.accepts(word));
            assert!(!nfa.accepts(word), "{regex} should reject {word:?}");
        }
        for word in KleeneStar::new(dfa.alphabet()).take_while(|w| w.len() <= 6) {
            assert_eq!(dfa.accepts(&word), nfa.accepts(&word), "{regex} on {word:?}");
        }
    }

    #[test_log::test]
    fn elimination_order_and_shape() {
        let (outcome, trace) = to_regex(&even_zeros()).unwrap();
        assert_eq!(
            trace.labels().collect::<Vec<_>>(),
            vec![
                "Initialized",
                "Add new start and accepting states",
                "Eliminate A",
                "Eliminate B",
                "Final regular expression obtained"
            ]
        );
        assert_eq!(outcome.to_string(), "1*|1*0(1|01*0)*01*");
        assert_eq!(
            trace.last().unwrap().snapshot(),
            outcome.expression().cloned().map(Snapshot::Regex).as_ref()
        );
    }

    #[test_log::test]
    fn normalization_snapshot() {
        let (_, trace) = to_regex(&even_zeros()).unwrap();
        let Some(Snapshot::Generalized(generalized)) = trace.get(1).unwrap().snapshot() else {
            panic!("expected a generalized automaton");
        };
        assert_eq!(
            generalized.states().map(|q| q.name()).collect::<Vec<_>>(),
            vec!["start", "A", "B", "accept"]
        );
        let start = State::from("start");
        let accept = State::from("accept");
        assert_eq!(
            generalized.edge(&start, &State::from("A")),
            Some(&RegexNode::Epsilon)
        );
        assert_eq!(
            generalized.edge(&State::from("A"), &accept),
            Some(&RegexNode::Epsilon)
        );
        assert!(generalized.edges().all(|(_, q, _)| q != &start));
        assert!(generalized.edges().all(|(p, _, _)| p != &accept));
    }

    #[test_log::test]
    fn empty_language_is_not_an_error() {
        let nfa = Automaton::builder()
            .with_transitions([("p", 'a', "q")])
            .with_accepting(["r"])
            .into_nfa("p")
            .unwrap();
        let (outcome, trace) = to_regex(&nfa).unwrap();
        assert_eq!(outcome, RegexOutcome::EmptyLanguage);
        assert_eq!(outcome.to_string(), "∅");
        assert_eq!(trace.len(), 1 + 1 + 3 + 1);
        assert_eq!(trace.last().unwrap().label(), "Language is empty");
    }

    #[test_log::test]
    fn parallel_edges_merge_and_names_stay_fresh() {
        let nfa = Automaton::builder()
            .with_transitions([("start", 'a', "accept"), ("start", 'b', "accept")])
            .with_accepting(["accept"])
            .into_nfa("start")
            .unwrap();
        let (outcome, trace) = to_regex(&nfa).unwrap();
        assert_eq!(outcome.to_string(), "a|b");
        let Some(Snapshot::Generalized(generalized)) = trace.get(1).unwrap().snapshot() else {
            panic!("expected a generalized automaton");
        };
        assert_eq!(generalized.start().name(), "start'");
        assert_eq!(generalized.accept().name(), "accept'");
    }

    #[test_log::test]
    fn epsilon_transitions_and_accepting_start() {
        let nfa = Automaton::builder()
            .with_transitions([("t0", 'a', "t0"), ("t1", 'b', "t2")])
            .with_epsilon_transitions([("t0", "t1"), ("t2", "t0")])
            .with_accepting(["t2"])
            .into_nfa("t0")
            .unwrap();
        let regex = expression(&nfa);
        let (back, _) = regex_to_nfa(&regex);
        for word in KleeneStar::new(nfa.alphabet()).take_while(|w| w.len() <= 6) {
            assert_eq!(nfa.accepts(&word), back.accepts(&word), "{regex} on {word:?}");
        }
    }
}
