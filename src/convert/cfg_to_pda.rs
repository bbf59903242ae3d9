use itertools::Itertools;
use tracing::debug;

use crate::{
    automaton::{Label, State},
    grammar::{Grammar, END_MARKER},
    pda::{PdaTransition, PushdownAutomaton},
    trace::{StepTrace, TraceRecorder},
    ConversionError, Show,
};

const INIT: &str = "q0";
const LOOP: &str = "q1";
const ACCEPT: &str = "q2";

/// Translates `grammar` into an equivalent pushdown automaton with three states.
///
/// The automaton starts in `q0`, pushes the start symbol on top of the end marker `$` and moves
/// to `q1`. There it repeatedly either expands the nonterminal on top of the stack using one of
/// its productions or matches a terminal on top of the stack against the next input symbol.
/// Once only `$` is left it can move to the accepting state `q2`. Bodies are pushed such that
/// their first symbol ends up on top, and productions are added in declaration order.
///
/// Left recursive grammars are fine here, the resulting automaton is nondeterministic anyway.
pub fn cfg_to_pda(grammar: &Grammar) -> Result<(PushdownAutomaton, StepTrace), ConversionError> {
    grammar.validate()?;
    debug!(
        "translating grammar with {} productions into a PDA",
        grammar.productions().len()
    );

    let mut recorder = TraceRecorder::new(
        "We construct a pushdown automaton that simulates leftmost derivations of the grammar \
         on its stack.",
    );
    let (init, main, accept) = (State::new(INIT), State::new(LOOP), State::new(ACCEPT));
    let stack_alphabet = grammar
        .nonterminals()
        .iter()
        .chain(grammar.terminals().iter())
        .copied()
        .chain(std::iter::once(END_MARKER));
    let mut pda = PushdownAutomaton::new(
        [init.clone(), main.clone(), accept.clone()],
        grammar.terminals().iter().copied(),
        stack_alphabet,
        init.clone(),
        [accept.clone()],
    );

    let start = grammar.start();
    let setup = PdaTransition {
        from: init.clone(),
        input: Label::Epsilon,
        pop: None,
        push: vec![start, END_MARKER],
        to: main.clone(),
    };
    pda.add_transition(setup.clone());
    recorder.record(
        "Create states and push the start symbol",
        format!(
            "Create the start state {init}, the main state {main} and the accepting state \
             {accept}. The transition {setup} places the start symbol {start} on top of the \
             end marker {END_MARKER}."
        ),
        pda.clone(),
    );

    for production in grammar.productions() {
        let expand = PdaTransition {
            from: main.clone(),
            input: Label::Epsilon,
            pop: Some(production.head()),
            push: production.body().to_vec(),
            to: main.clone(),
        };
        pda.add_transition(expand.clone());
        recorder.record(
            format!("Add production {production}"),
            format!(
                "When {} is on top of the stack it may be replaced by {} without reading \
                 input, which is the transition {expand}.",
                production.head(),
                production.show_body()
            ),
            pda.clone(),
        );
    }

    let matches = grammar
        .terminals()
        .iter()
        .map(|&t| PdaTransition {
            from: main.clone(),
            input: Label::Symbol(t),
            pop: Some(t),
            push: vec![],
            to: main.clone(),
        })
        .collect_vec();
    for transition in &matches {
        pda.add_transition(transition.clone());
    }
    recorder.record(
        "Match terminals",
        format!(
            "For every terminal in {} add a transition that reads it from the input while \
             popping it from the stack: {}.",
            char::show_collection(grammar.terminals()),
            matches.iter().join(", ")
        ),
        pda.clone(),
    );

    let finish = PdaTransition {
        from: main.clone(),
        input: Label::Epsilon,
        pop: Some(END_MARKER),
        push: vec![],
        to: accept.clone(),
    };
    pda.add_transition(finish.clone());
    recorder.record(
        "Link the accepting state",
        format!(
            "Once only the end marker is left the whole input has been derived, so {finish} \
             leads to the accepting state."
        ),
        pda.clone(),
    );

    debug!(
        "constructed PDA with {} transitions",
        pda.transitions().len()
    );
    Ok((pda, recorder.finish()))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn balanced_as_and_bs() {
        let grammar: Grammar = "S → aSb | ε".parse().unwrap();
        let (pda, trace) = cfg_to_pda(&grammar).unwrap();
        for word in ["", "ab", "aabb", "aaabbb"] {
            assert!(pda.accepts(word), "should accept {word:?}");
        }
        for word in ["a", "abb", "ba", "aab"] {
            assert!(!pda.accepts(word), "should reject {word:?}");
        }
        assert_eq!(trace.len(), 1 + 1 + 2 + 1 + 1);
        assert_eq!(
            trace.labels().collect::<Vec<_>>(),
            vec![
                "Initialized",
                "Create states and push the start symbol",
                "Add production S → aSb",
                "Add production S → ε",
                "Match terminals",
                "Link the accepting state"
            ]
        );
    }

    #[test_log::test]
    fn transitions_in_declaration_order() {
        let grammar: Grammar = "S → aSb | ε".parse().unwrap();
        let (pda, _) = cfg_to_pda(&grammar).unwrap();
        let rendered = pda.transitions().iter().map(|t| t.to_string()).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                "q0 --ε, ε→S$--> q1",
                "q1 --ε, S→aSb--> q1",
                "q1 --ε, S→ε--> q1",
                "q1 --a, a→ε--> q1",
                "q1 --b, b→ε--> q1",
                "q1 --ε, $→ε--> q2",
            ]
        );
        assert_eq!(pda.start().name(), "q0");
        assert!(pda.accepting().contains(&State::from("q2")));
        assert!(pda.stack_alphabet().contains(&'$'));
        assert!(!pda.input_alphabet().contains(&'S'));
    }

    #[test_log::test]
    fn left_recursive_arithmetic() {
        let grammar: Grammar = "E → E+T | T; T → T*F | F; F → (E) | id".parse().unwrap();
        let (pda, _) = cfg_to_pda(&grammar).unwrap();
        for word in ["id", "id+id", "id*(id+id)"] {
            assert!(pda.accepts(word), "should accept {word:?}");
        }
        for word in ["", "id+", "(id", "+id"] {
            assert!(!pda.accepts(word), "should reject {word:?}");
        }
    }

    fn balanced(word: &str) -> bool {
        let mut depth = 0i32;
        for c in word.chars() {
            depth += if c == '(' { 1 } else { -1 };
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    fn pda_for(rules: &str) -> PushdownAutomaton {
        cfg_to_pda(&rules.parse().unwrap()).unwrap().0
    }

    #[test_log::test]
    fn deeply_nested_nullable_nonterminals() {
        let pda = pda_for("S → AA; A → BB; B → CC; C → DD; D → EE; E → ε");
        assert!(pda.accepts(""));
        assert!(!pda.accepts("a"));

        let pda = pda_for("S → aAA; A → BB; B → CC; C → DD; D → EE; E → ε | b");
        for word in ["a", "ab", "abbbb"] {
            assert!(pda.accepts(word), "should accept {word:?}");
        }
        assert!(!pda.accepts("b"));
    }

    #[test_log::test]
    fn balanced_parentheses() {
        let pda = pda_for("S → (S) | SS | ε");
        for word in ["", "()()", "(())()", "((()))"] {
            assert!(pda.accepts(word), "should accept {word:?}");
        }
        for word in KleeneStar::new(['(', ')']).take_while(|w| w.len() <= 6) {
            assert_eq!(pda.accepts(&word), balanced(&word), "on {word:?}");
        }
    }

    #[test_log::test]
    fn equal_number_of_as_and_bs() {
        let pda = pda_for("S → aSbS | bSaS | ε");
        for word in KleeneStar::new(['a', 'b']).take_while(|w| w.len() <= 6) {
            let (a, b) = (word.matches('a').count(), word.matches('b').count());
            assert_eq!(pda.accepts(&word), a == b, "on {word:?}");
        }
    }

    #[test_log::test]
    fn palindromes() {
        let pda = pda_for("S → aSa | bSb | a | b | ε");
        for word in KleeneStar::new(['a', 'b']).take_while(|w| w.len() <= 6) {
            let reversed: String = word.chars().rev().collect();
            assert_eq!(pda.accepts(&word), word == reversed, "on {word:?}");
        }
    }

    #[test_log::test]
    fn malformed_grammar_is_rejected() {
        let grammar = Grammar::new(['S'], ['a'], [Production::new('S', ['a'])], 'S').unwrap();
        assert!(cfg_to_pda(&grammar).is_ok());
        assert_eq!(
            "S → a$".parse::<Grammar>(),
            Err(GrammarDefect::Reserved('$'))
        );
    }
}
