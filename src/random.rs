use tracing::debug;

use crate::{
    automaton::{Automaton, Kind, Label, State, TransitionMap},
    math::{IndexedSet, OrderedSet},
};

fn alphabet_of_size(symbols: usize) -> OrderedSet<char> {
    ('a'..='z').take(symbols).collect()
}

/// Draws an NFA with `states` states named `q0, q1, ...` over the first `symbols` lowercase
/// letters. Every triple of source, symbol and target becomes a transition with probability
/// `density`, and every pair of distinct states is linked by an ε-transition with probability
/// `epsilon_density`. The start state is `q0` and each state is accepting with probability 1/2.
pub fn generate_random_nfa(
    states: usize,
    symbols: usize,
    density: f64,
    epsilon_density: f64,
) -> Automaton {
    let names: IndexedSet<State> = (0..states.max(1))
        .map(|i| State::new(format!("q{i}")))
        .collect();
    let alphabet = alphabet_of_size(symbols);
    let mut transitions = TransitionMap::new();

    for source in &names {
        for target in &names {
            for &symbol in &alphabet {
                if fastrand::f64() < density {
                    transitions
                        .entry((source.clone(), Label::Symbol(symbol)))
                        .or_default()
                        .insert(target.clone());
                }
            }
            if source != target && fastrand::f64() < epsilon_density {
                transitions
                    .entry((source.clone(), Label::Epsilon))
                    .or_default()
                    .insert(target.clone());
            }
        }
    }

    let accepting = names.iter().filter(|_| fastrand::bool()).cloned().collect();
    let start = State::new("q0");
    debug!(
        "generated random NFA with {} states and {} transition entries",
        names.len(),
        transitions.len()
    );
    Automaton::from_parts(Kind::Nfa, names, alphabet, transitions, start, accepting)
}

/// Uses a sprout-like algorithm to generate a random DFA in which every state is reachable.
/// Starting from a single state, the states are treated in order and for each symbol the
/// existing states are tried in order, each becoming the target with probability `probability`.
/// If none is picked, the edge leads to a new state unless there are already `max_states`,
/// in which case a uniformly drawn state is the target. States are accepting with probability
/// 1/2.
pub fn generate_random_dfa(symbols: usize, probability: f64, max_states: usize) -> Automaton {
    let alphabet = alphabet_of_size(symbols);
    let mut names: IndexedSet<State> = IndexedSet::default();
    names.insert(State::new("q0"));
    let mut transitions = TransitionMap::new();

    let mut current = 0;
    while current < names.len() {
        let source = names[current].clone();
        'symbols: for &symbol in &alphabet {
            for candidate in 0..=current {
                if fastrand::f64() < probability {
                    let target = names[candidate].clone();
                    transitions.insert((source.clone(), Label::Symbol(symbol)), [target].into());
                    continue 'symbols;
                }
            }
            let target = if names.len() < max_states.max(1) {
                let fresh = State::new(format!("q{}", names.len()));
                names.insert(fresh.clone());
                fresh
            } else {
                names[fastrand::usize(..names.len())].clone()
            };
            transitions.insert((source.clone(), Label::Symbol(symbol)), [target].into());
        }
        current += 1;
    }

    let accepting = names.iter().filter(|_| fastrand::bool()).cloned().collect();
    let start = State::new("q0");
    Automaton::from_parts(Kind::Dfa, names, alphabet, transitions, start, accepting)
}
