use tracing::debug;

use crate::{
    automaton::{Automaton, Kind, Label, State, TransitionMap},
    math::{IndexedSet, OrderedSet},
    regex::RegexNode,
    trace::{StepTrace, TraceRecorder},
};

/// A partial NFA with a single start and a single accepting state, built for one subexpression.
#[derive(Debug, Clone)]
struct Fragment {
    start: State,
    accept: State,
    states: IndexedSet<State>,
    transitions: Vec<(State, Label, State)>,
}

impl Fragment {
    /// Wraps the children `parts` between a new start and a new accepting state.
    fn around(start: State, accept: State, parts: Vec<Fragment>) -> Self {
        let mut states = IndexedSet::default();
        let mut transitions = vec![];
        for part in parts {
            states.extend(part.states);
            transitions.extend(part.transitions);
        }
        states.insert(start.clone());
        states.insert(accept.clone());
        Self {
            start,
            accept,
            states,
            transitions,
        }
    }

    fn link(&mut self, from: &State, label: Label, to: &State) {
        self.transitions.push((from.clone(), label, to.clone()));
    }

    fn to_automaton(&self, alphabet: &OrderedSet<char>) -> Automaton {
        let mut transitions = TransitionMap::new();
        for (p, label, q) in &self.transitions {
            transitions
                .entry((p.clone(), *label))
                .or_default()
                .insert(q.clone());
        }
        Automaton::from_parts(
            Kind::Nfa,
            self.states.clone(),
            alphabet.clone(),
            transitions,
            self.start.clone(),
            [self.accept.clone()].into_iter().collect(),
        )
    }
}

/// Holds the state counter and the recorder, both are private to one construction.
struct Thompson {
    counter: usize,
    alphabet: OrderedSet<char>,
    recorder: TraceRecorder,
}

impl Thompson {
    fn fresh(&mut self) -> State {
        let state = State::new(format!("q{}", self.counter));
        self.counter += 1;
        state
    }

    /// Builds the fragment for `node` after building the fragments of its children. Every
    /// fragment gets two states that have not been used before.
    fn build(&mut self, node: &RegexNode) -> Fragment {
        let fragment = match node {
            RegexNode::Symbol(c) => {
                let (start, accept) = (self.fresh(), self.fresh());
                let mut fragment = Fragment::around(start.clone(), accept.clone(), vec![]);
                fragment.link(&start, Label::Symbol(*c), &accept);
                fragment
            }
            RegexNode::Epsilon => {
                let (start, accept) = (self.fresh(), self.fresh());
                let mut fragment = Fragment::around(start.clone(), accept.clone(), vec![]);
                fragment.link(&start, Label::Epsilon, &accept);
                fragment
            }
            RegexNode::Concat(l, r) => {
                let left = self.build(l);
                let right = self.build(r);
                let (start, accept) = (left.start.clone(), right.accept.clone());
                let bridge = (left.accept.clone(), right.start.clone());
                let mut fragment = Fragment::around(start, accept, vec![left, right]);
                fragment.link(&bridge.0, Label::Epsilon, &bridge.1);
                fragment
            }
            RegexNode::Union(l, r) => {
                let left = self.build(l);
                let right = self.build(r);
                let (start, accept) = (self.fresh(), self.fresh());
                let ends = [
                    (left.start.clone(), left.accept.clone()),
                    (right.start.clone(), right.accept.clone()),
                ];
                let mut fragment =
                    Fragment::around(start.clone(), accept.clone(), vec![left, right]);
                for (inner_start, inner_accept) in &ends {
                    fragment.link(&start, Label::Epsilon, inner_start);
                    fragment.link(inner_accept, Label::Epsilon, &accept);
                }
                fragment
            }
            RegexNode::Star(inner) => {
                let body = self.build(inner);
                let (start, accept) = (self.fresh(), self.fresh());
                let (inner_start, inner_accept) = (body.start.clone(), body.accept.clone());
                let mut fragment = Fragment::around(start.clone(), accept.clone(), vec![body]);
                fragment.link(&start, Label::Epsilon, &inner_start);
                fragment.link(&start, Label::Epsilon, &accept);
                fragment.link(&inner_accept, Label::Epsilon, &inner_start);
                fragment.link(&inner_accept, Label::Epsilon, &accept);
                fragment
            }
        };

        let explanation = match node {
            RegexNode::Symbol(c) => format!(
                "Create a basic NFA for the symbol '{c}': two states {} and {} linked by a \
                 transition on '{c}'.",
                fragment.start, fragment.accept
            ),
            RegexNode::Epsilon => format!(
                "Create a basic NFA for ε: two states {} and {} linked by an ε-transition.",
                fragment.start, fragment.accept
            ),
            RegexNode::Concat(l, r) => format!(
                "Concatenate the NFAs for {l} and {r} by an ε-transition from the accepting \
                 state of the first to the start state of the second."
            ),
            RegexNode::Union(l, r) => format!(
                "Combine the NFAs for {l} and {r} with a new start state {} that branches into \
                 both by ε-transitions and a new accepting state {} that both lead into.",
                fragment.start, fragment.accept
            ),
            RegexNode::Star(inner) => format!(
                "Apply the Kleene star to the NFA for {inner}: the new start state {} may skip \
                 to the new accepting state {}, and the accepting state of the inner NFA loops \
                 back to its start.",
                fragment.start, fragment.accept
            ),
        };
        let snapshot = fragment.to_automaton(&self.alphabet);
        self.recorder.record(
            format!("Build {} for {node}", node.operator()),
            explanation,
            snapshot,
        );
        fragment
    }
}

/// Builds an NFA for `ast` using Thompson's construction. The states are named `q0`, `q1`, ...
/// in order of creation, numbers are never reused. The result has exactly one accepting state,
/// and its alphabet consists of the symbols occurring in `ast`.
///
/// The trace holds one entry per node of the syntax tree in post-order, i.e. children before the
/// step that combines them, followed by an entry with the finished NFA.
pub fn regex_to_nfa(ast: &RegexNode) -> (Automaton, StepTrace) {
    debug!("running Thompson's construction on `{ast}`");
    let mut thompson = Thompson {
        counter: 0,
        alphabet: ast.alphabet(),
        recorder: TraceRecorder::new(format!(
            "Parsed the regular expression {ast}. We use Thompson's construction, which builds \
             the NFA fragment by fragment along the syntax tree."
        )),
    };

    let root = thompson.build(ast);
    let nfa = root.to_automaton(&thompson.alphabet);
    thompson.recorder.record(
        "NFA construction complete",
        format!(
            "The resulting NFA with {} states accepts exactly the language defined by the \
             regular expression {ast}.",
            nfa.size()
        ),
        nfa.clone(),
    );
    debug!("Thompson's construction produced {} states", nfa.size());
    (nfa, thompson.recorder.finish())
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn nfa_for(pattern: &str) -> (Automaton, StepTrace) {
        regex_to_nfa(&pattern.parse().unwrap())
    }

    #[test_log::test]
    fn symbol_fragment() {
        let (nfa, trace) = nfa_for("a");
        assert_eq!(nfa.size(), 2);
        assert_eq!(nfa.start().name(), "q0");
        assert_eq!(
            nfa.transitions()
                .map(|(p, l, q)| format!("{p}-{l}-{q}"))
                .collect::<Vec<_>>(),
            vec!["q0-a-q1"]
        );
        assert_eq!(trace.len(), 3);
    }

    #[test_log::test]
    fn post_order_trace() {
        let (nfa, trace) = nfa_for("a|b*");
        assert_eq!(
            trace.labels().collect::<Vec<_>>(),
            vec![
                "Initialized",
                "Build symbol for a",
                "Build symbol for b",
                "Build Kleene star for b*",
                "Build union for a|b*",
                "NFA construction complete"
            ]
        );
        // two fresh states per symbol, star and union
        assert_eq!(nfa.size(), 8);
        assert_eq!(nfa.accepting().len(), 1);
    }

    #[test_log::test]
    fn states_are_never_reused() {
        let ast: RegexNode = "(ab|c)*(a|ε)".parse().unwrap();
        let (nfa, _) = regex_to_nfa(&ast);
        let leaves_and_wrappers = 2 * ast.size();
        // concatenations reuse the states of their children
        let concats = 2;
        assert_eq!(nfa.size(), leaves_and_wrappers - 2 * concats);
        let names = nfa.states().collect::<math::OrderedSet<_>>();
        assert_eq!(names.len(), nfa.size());
    }

    #[test_log::test]
    fn star_accepts_repetitions() {
        let (nfa, _) = nfa_for("(ab)*");
        for word in ["", "ab", "abab", "ababab"] {
            assert!(nfa.accepts(word), "{word}");
        }
        for word in ["a", "ba", "aba", "abb"] {
            assert!(!nfa.accepts(word), "{word}");
        }
    }
}
