use std::fmt::Display;

use itertools::Itertools;
use tracing::trace;

use crate::{
    automaton::{Label, State},
    math::{IndexedSet, Map, OrderedSet},
    Show,
};

/// A transition of a pushdown automaton. It reads `input` (or nothing for ε), pops `pop` from
/// the stack (or nothing) and pushes `push`. The pushed sequence is written top-first, so after
/// pushing `aSb` the symbol `a` is on top of the stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdaTransition {
    /// Origin of the transition.
    pub from: State,
    /// The input symbol that is read, ε reads nothing.
    pub input: Label,
    /// The symbol that must be on top of the stack and is removed, `None` leaves the stack as is.
    pub pop: Option<char>,
    /// The symbols that are pushed, top-first.
    pub push: Vec<char>,
    /// Destination of the transition.
    pub to: State,
}

impl Display for PdaTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pop = self.pop.map_or("ε".to_string(), |c| c.to_string());
        let push = if self.push.is_empty() {
            "ε".to_string()
        } else {
            self.push.show()
        };
        write!(
            f,
            "{} --{}, {}→{}--> {}",
            self.from, self.input, pop, push, self.to
        )
    }
}

/// A nondeterministic pushdown automaton that accepts by final state. Transitions are kept in
/// the order in which they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushdownAutomaton {
    states: IndexedSet<State>,
    input_alphabet: OrderedSet<char>,
    stack_alphabet: OrderedSet<char>,
    transitions: Vec<PdaTransition>,
    start: State,
    accepting: OrderedSet<State>,
}

impl PushdownAutomaton {
    /// Creates a pushdown automaton without transitions. The start state and the accepting
    /// states are added to the states if they are not already contained in it.
    pub fn new<S, I, J, F>(
        states: S,
        input_alphabet: I,
        stack_alphabet: J,
        start: State,
        accepting: F,
    ) -> Self
    where
        S: IntoIterator<Item = State>,
        I: IntoIterator<Item = char>,
        J: IntoIterator<Item = char>,
        F: IntoIterator<Item = State>,
    {
        let accepting: OrderedSet<State> = accepting.into_iter().collect();
        let mut states: IndexedSet<State> = states.into_iter().collect();
        states.insert(start.clone());
        states.extend(accepting.iter().cloned());
        Self {
            states,
            input_alphabet: input_alphabet.into_iter().collect(),
            stack_alphabet: stack_alphabet.into_iter().collect(),
            transitions: vec![],
            start,
            accepting,
        }
    }

    /// Appends a transition.
    pub fn add_transition(&mut self, transition: PdaTransition) {
        trace!("adding PDA transition {transition}");
        self.transitions.push(transition);
    }

    /// The states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    /// The symbols that may be read from the input.
    pub fn input_alphabet(&self) -> &OrderedSet<char> {
        &self.input_alphabet
    }

    /// The symbols that may appear on the stack.
    pub fn stack_alphabet(&self) -> &OrderedSet<char> {
        &self.stack_alphabet
    }

    /// All transitions in the order in which they were added.
    pub fn transitions(&self) -> &[PdaTransition] {
        &self.transitions
    }

    /// The start state.
    pub fn start(&self) -> &State {
        &self.start
    }

    /// The accepting states.
    pub fn accepting(&self) -> &OrderedSet<State> {
        &self.accepting
    }

    /// Decides whether `word` is accepted, i.e. whether some run that starts in the start state
    /// with an empty stack reads all of `word` and ends in an accepting state. Whatever is left on
    /// the stack at that point does not matter.
    ///
    /// Rather than exploring configurations, of which there may be infinitely many, this
    /// computes summaries over the positions of `word`, similar to CYK parsing:
    /// - *pops* `(p, Z, i) ↦ (q, j)`: in state `p` with `Z` on top before position `i`, the
    ///   automaton can remove `Z` while reading `word[i..j]` and end up in `q`, without touching
    ///   the stack below `Z`.
    /// - *reaches* `(p, Z, i) ↦ (q, j)`: from the same situation the automaton can get to `q`
    ///   before position `j` without touching the stack below `Z`.
    ///
    /// Both are least fixpoints over a finite domain, so the computation terminates for every
    /// pushdown automaton, including those built from left recursive or nullable grammars. The
    /// empty stack is represented by a bottom symbol that is never removed, and a transition
    /// that pops nothing is applied as one that pops the top symbol and pushes it back.
    pub fn accepts(&self, word: &str) -> bool {
        let word = word.chars().collect_vec();
        let rules = self.rules();
        let pops = pop_summaries(&rules, &word);
        let reaches = reach_summaries(&rules, &pops, &word);

        let Some(start) = self.states.get_index_of(&self.start) else {
            return false;
        };
        let accepted = reached(&reaches, start, BOTTOM, 0)
            .into_iter()
            .any(|(q, j)| {
                j == word.len()
                    && self
                        .states
                        .get_index(q)
                        .is_some_and(|state| self.accepting.contains(state))
            });
        trace!(
            "{} {:?} with {} pop and {} reach summaries",
            if accepted { "accepted" } else { "rejected" },
            word.iter().collect::<String>(),
            pops.len(),
            reaches.len()
        );
        accepted
    }

    /// Lowers the transitions to rules that pop exactly one symbol, with states as indices.
    fn rules(&self) -> Vec<Rule> {
        let symbols = self
            .stack_alphabet
            .iter()
            .copied()
            .chain(
                self.transitions
                    .iter()
                    .flat_map(|t| t.pop.into_iter().chain(t.push.iter().copied())),
            )
            .map(Some)
            .chain(std::iter::once(BOTTOM))
            .collect::<OrderedSet<StackSymbol>>();

        let mut rules = vec![];
        for t in &self.transitions {
            let (Some(from), Some(to)) = (
                self.states.get_index_of(&t.from),
                self.states.get_index_of(&t.to),
            ) else {
                continue;
            };
            let pushed = t.push.iter().copied().map(Some).collect_vec();
            match t.pop {
                Some(top) => rules.push(Rule {
                    from,
                    input: t.input,
                    pop: Some(top),
                    push: pushed,
                    to,
                }),
                None => rules.extend(symbols.iter().map(|&top| Rule {
                    from,
                    input: t.input,
                    pop: top,
                    push: pushed.iter().copied().chain(std::iter::once(top)).collect(),
                    to,
                })),
            }
        }
        rules
    }
}

/// A stack symbol, [`BOTTOM`] stands for the empty stack.
type StackSymbol = Option<char>;

const BOTTOM: StackSymbol = None;

/// Maps a state, the symbol on top of the stack and an input position to the pairs of state
/// and input position that can follow.
type Summary = Map<(usize, StackSymbol, usize), OrderedSet<(usize, usize)>>;

/// A transition that pops exactly one symbol, states are given by their index.
#[derive(Debug, Clone)]
struct Rule {
    from: usize,
    input: Label,
    pop: StackSymbol,
    push: Vec<StackSymbol>,
    to: usize,
}

impl Rule {
    /// The input position after taking this rule at position `i`, if it can be taken there.
    fn advance(&self, word: &[char], i: usize) -> Option<usize> {
        match self.input {
            Label::Epsilon => Some(i),
            Label::Symbol(c) if word.get(i) == Some(&c) => Some(i + 1),
            Label::Symbol(_) => None,
        }
    }
}

/// Pops `symbols` one after the other, starting from `from`. The `k`-th entry of the result
/// holds where the automaton can be once the first `k` symbols are gone. The result is cut
/// short as soon as some symbol cannot be popped at all.
fn pop_frontiers(
    pops: &Summary,
    from: (usize, usize),
    symbols: &[StackSymbol],
) -> Vec<OrderedSet<(usize, usize)>> {
    let mut frontiers = vec![OrderedSet::from([from])];
    for &symbol in symbols {
        let next: OrderedSet<_> = frontiers
            .last()
            .into_iter()
            .flatten()
            .filter_map(|&(q, j)| pops.get(&(q, symbol, j)))
            .flatten()
            .copied()
            .collect();
        if next.is_empty() {
            break;
        }
        frontiers.push(next);
    }
    frontiers
}

/// Everything reachable from `(state, top, position)`, including the pair itself.
fn reached(
    reaches: &Summary,
    state: usize,
    top: StackSymbol,
    position: usize,
) -> OrderedSet<(usize, usize)> {
    let mut out = reaches
        .get(&(state, top, position))
        .cloned()
        .unwrap_or_default();
    out.insert((state, position));
    out
}

fn pop_summaries(rules: &[Rule], word: &[char]) -> Summary {
    let mut pops = Summary::default();
    let mut changed = true;
    while changed {
        changed = false;
        for rule in rules {
            for i in 0..=word.len() {
                let Some(next) = rule.advance(word, i) else {
                    continue;
                };
                let frontiers = pop_frontiers(&pops, (rule.to, next), &rule.push);
                if frontiers.len() <= rule.push.len() {
                    continue;
                }
                let outcomes = pops.entry((rule.from, rule.pop, i)).or_default();
                if let Some(popped) = frontiers.last() {
                    for &outcome in popped {
                        changed |= outcomes.insert(outcome);
                    }
                }
            }
        }
    }
    pops
}

fn reach_summaries(rules: &[Rule], pops: &Summary, word: &[char]) -> Summary {
    let mut reaches = Summary::default();
    let mut changed = true;
    while changed {
        changed = false;
        for rule in rules {
            for i in 0..=word.len() {
                let Some(next) = rule.advance(word, i) else {
                    continue;
                };
                let mut found = OrderedSet::new();
                for (k, frontier) in pop_frontiers(pops, (rule.to, next), &rule.push)
                    .into_iter()
                    .enumerate()
                {
                    match rule.push.get(k) {
                        // the k-th pushed symbol is on top
                        Some(&top) => {
                            for (q, j) in frontier {
                                found.extend(reached(&reaches, q, top, j));
                            }
                        }
                        None => found.extend(frontier),
                    }
                }
                let outcomes = reaches.entry((rule.from, rule.pop, i)).or_default();
                for outcome in found {
                    changed |= outcomes.insert(outcome);
                }
            }
        }
    }
    reaches
}

impl Display for PushdownAutomaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "PDA with states {}, start {}, accepting {}",
            self.states.iter().join(", "),
            self.start,
            self.accepting.show()
        )?;
        write!(f, "{}", self.transitions.iter().join("\n"))
    }
}
