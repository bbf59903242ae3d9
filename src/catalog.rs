use crate::{
    automaton::Automaton,
    convert::{Conversion, ConversionKind},
    grammar::Grammar,
    ConversionError,
};

/// A named demonstration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example<T> {
    /// Short name, unique within its conversion kind.
    pub name: &'static str,
    /// What the input describes.
    pub description: &'static str,
    /// The input itself.
    pub input: T,
}

type Edges<'a> = &'a [(&'a str, char, &'a [&'a str])];

/// Builds an automaton from a compact description. `ε` as a label stands for an ε-transition.
fn automaton(
    states: &[&str],
    alphabet: &str,
    edges: Edges<'_>,
    start: &str,
    accepting: &[&str],
    deterministic: bool,
) -> Result<Automaton, ConversionError> {
    let symbol_edges = edges
        .iter()
        .filter(|(_, label, _)| *label != 'ε')
        .flat_map(|(p, a, targets)| targets.iter().map(move |q| (*p, *a, *q)));
    let epsilon_edges = edges
        .iter()
        .filter(|(_, label, _)| *label == 'ε')
        .flat_map(|(p, _, targets)| targets.iter().map(move |q| (*p, *q)));
    let builder = Automaton::builder()
        .with_states(states.iter().copied())
        .with_alphabet(alphabet.chars())
        .with_transitions(symbol_edges)
        .with_epsilon_transitions(epsilon_edges)
        .with_accepting(accepting.iter().copied());
    if deterministic {
        builder.into_dfa(start)
    } else {
        builder.into_nfa(start)
    }
}

fn nfa_examples() -> Result<Vec<Example<Automaton>>, ConversionError> {
    Ok(vec![
        Example {
            name: "Binary strings ending with 01",
            description: "Accepts binary strings ending with '01'",
            input: automaton(
                &["q0", "q1", "q2"],
                "01",
                &[("q0", '0', &["q0", "q1"]), ("q0", '1', &["q0"]), ("q1", '1', &["q2"])],
                "q0",
                &["q2"],
                false,
            )?,
        },
        Example {
            name: "Contains substring 101",
            description: "Accepts strings containing substring '101'",
            input: automaton(
                &["q0", "q1", "q2", "q3"],
                "01",
                &[
                    ("q0", '0', &["q0"]),
                    ("q0", '1', &["q0", "q1"]),
                    ("q1", '0', &["q2"]),
                    ("q2", '1', &["q3"]),
                    ("q3", '0', &["q3"]),
                    ("q3", '1', &["q3"]),
                ],
                "q0",
                &["q3"],
                false,
            )?,
        },
        Example {
            name: "Strings starting with 1",
            description: "Accepts strings starting with '1'",
            input: automaton(
                &["q0", "q1", "q2"],
                "01",
                &[
                    ("q0", '1', &["q1"]),
                    ("q0", '0', &["q2"]),
                    ("q1", '0', &["q1"]),
                    ("q1", '1', &["q1"]),
                ],
                "q0",
                &["q1"],
                false,
            )?,
        },
        Example {
            name: "Even number of 0s",
            description: "Accepts strings with even number of 0s",
            input: automaton(
                &["q0", "q1"],
                "01",
                &[
                    ("q0", '0', &["q1"]),
                    ("q0", '1', &["q0"]),
                    ("q1", '0', &["q0"]),
                    ("q1", '1', &["q1"]),
                ],
                "q0",
                &["q0"],
                false,
            )?,
        },
        Example {
            name: "Epsilon transitions example",
            description: "NFA with epsilon transitions",
            input: automaton(
                &["q0", "q1", "q2", "q3"],
                "ab",
                &[
                    ("q0", 'ε', &["q1"]),
                    ("q0", 'a', &["q2"]),
                    ("q1", 'b', &["q3"]),
                    ("q2", 'a', &["q3"]),
                ],
                "q0",
                &["q3"],
                false,
            )?,
        },
    ])
}

fn dfa_examples() -> Result<Vec<Example<Automaton>>, ConversionError> {
    Ok(vec![
        Example {
            name: "Simple DFA - Even 0s",
            description: "DFA accepting even number of 0s",
            input: even_zeros(&["A"])?,
        },
        Example {
            name: "DFA - Ends with 10",
            description: "DFA accepting strings ending with '10'",
            input: automaton(
                &["q0", "q1", "q2"],
                "01",
                &[
                    ("q0", '0', &["q0"]),
                    ("q0", '1', &["q1"]),
                    ("q1", '0', &["q2"]),
                    ("q1", '1', &["q1"]),
                    ("q2", '0', &["q0"]),
                    ("q2", '1', &["q1"]),
                ],
                "q0",
                &["q2"],
                true,
            )?,
        },
        Example {
            name: "DFA - Divisible by 3",
            description: "DFA for binary numbers divisible by 3",
            input: divisible_by_three(["s0", "s1", "s2"])?,
        },
        Example {
            name: "DFA - Contains 11",
            description: "DFA accepting strings containing '11'",
            input: automaton(
                &["p0", "p1", "p2"],
                "01",
                &[
                    ("p0", '0', &["p0"]),
                    ("p0", '1', &["p1"]),
                    ("p1", '0', &["p0"]),
                    ("p1", '1', &["p2"]),
                    ("p2", '0', &["p2"]),
                    ("p2", '1', &["p2"]),
                ],
                "p0",
                &["p2"],
                true,
            )?,
        },
        Example {
            name: "DFA - Odd length",
            description: "DFA accepting strings of odd length",
            input: automaton(
                &["even", "odd"],
                "01",
                &[
                    ("even", '0', &["odd"]),
                    ("even", '1', &["odd"]),
                    ("odd", '0', &["even"]),
                    ("odd", '1', &["even"]),
                ],
                "even",
                &["odd"],
                true,
            )?,
        },
    ])
}

fn even_zeros(accepting: &[&str]) -> Result<Automaton, ConversionError> {
    automaton(
        &["A", "B"],
        "01",
        &[
            ("A", '0', &["B"]),
            ("A", '1', &["A"]),
            ("B", '0', &["A"]),
            ("B", '1', &["B"]),
        ],
        "A",
        accepting,
        true,
    )
}

fn divisible_by_three([zero, one, two]: [&str; 3]) -> Result<Automaton, ConversionError> {
    automaton(
        &[zero, one, two],
        "01",
        &[
            (zero, '0', &[zero]),
            (zero, '1', &[one]),
            (one, '0', &[two]),
            (one, '1', &[zero]),
            (two, '0', &[one]),
            (two, '1', &[two]),
        ],
        zero,
        &[zero],
        true,
    )
}

fn elimination_nfa_examples() -> Result<Vec<Example<Automaton>>, ConversionError> {
    Ok(vec![
        Example {
            name: "Simple NFA 1",
            description: "NFA to convert to regular expression",
            input: automaton(
                &["q0", "q1"],
                "ab",
                &[("q0", 'a', &["q0"]), ("q0", 'b', &["q1"]), ("q1", 'b', &["q1"])],
                "q0",
                &["q1"],
                false,
            )?,
        },
        Example {
            name: "Simple NFA 2",
            description: "Three-state NFA for RE conversion",
            input: automaton(
                &["p0", "p1", "p2"],
                "01",
                &[
                    ("p0", '0', &["p1"]),
                    ("p0", '1', &["p0"]),
                    ("p1", '1', &["p2"]),
                    ("p2", '0', &["p2"]),
                    ("p2", '1', &["p2"]),
                ],
                "p0",
                &["p2"],
                false,
            )?,
        },
        Example {
            name: "NFA with loops",
            description: "NFA with self-loops",
            input: automaton(
                &["s0", "s1"],
                "xy",
                &[("s0", 'x', &["s0", "s1"]), ("s0", 'y', &["s0"]), ("s1", 'y', &["s1"])],
                "s0",
                &["s1"],
                false,
            )?,
        },
        Example {
            name: "Complex NFA",
            description: "Four-state NFA for complex RE",
            input: automaton(
                &["r0", "r1", "r2", "r3"],
                "ab",
                &[
                    ("r0", 'a', &["r1"]),
                    ("r0", 'b', &["r0"]),
                    ("r1", 'a', &["r2"]),
                    ("r1", 'b', &["r1"]),
                    ("r2", 'a', &["r3"]),
                    ("r2", 'b', &["r2"]),
                    ("r3", 'a', &["r3"]),
                    ("r3", 'b', &["r3"]),
                ],
                "r0",
                &["r3"],
                false,
            )?,
        },
        Example {
            name: "Epsilon NFA",
            description: "NFA with epsilon transitions",
            input: automaton(
                &["t0", "t1", "t2"],
                "ab",
                &[
                    ("t0", 'ε', &["t1"]),
                    ("t0", 'a', &["t0"]),
                    ("t1", 'b', &["t2"]),
                    ("t2", 'ε', &["t0"]),
                ],
                "t0",
                &["t2"],
                false,
            )?,
        },
    ])
}

fn elimination_dfa_examples() -> Result<Vec<Example<Automaton>>, ConversionError> {
    Ok(vec![
        Example {
            name: "Two-state DFA",
            description: "Simple two-state DFA",
            input: even_zeros(&["B"])?,
        },
        Example {
            name: "Three-state DFA",
            description: "Three-state cyclic DFA",
            input: automaton(
                &["X", "Y", "Z"],
                "ab",
                &[
                    ("X", 'a', &["Y"]),
                    ("X", 'b', &["X"]),
                    ("Y", 'a', &["Z"]),
                    ("Y", 'b', &["Y"]),
                    ("Z", 'a', &["X"]),
                    ("Z", 'b', &["Z"]),
                ],
                "X",
                &["Z"],
                true,
            )?,
        },
        Example {
            name: "DFA for mod 3",
            description: "DFA for numbers divisible by 3",
            input: divisible_by_three(["0", "1", "2"])?,
        },
        Example {
            name: "String pattern DFA",
            description: "DFA recognizing pattern 'aba'",
            input: automaton(
                &["q0", "q1", "q2", "q3"],
                "ab",
                &[
                    ("q0", 'a', &["q1"]),
                    ("q0", 'b', &["q0"]),
                    ("q1", 'a', &["q1"]),
                    ("q1", 'b', &["q2"]),
                    ("q2", 'a', &["q3"]),
                    ("q2", 'b', &["q0"]),
                    ("q3", 'a', &["q1"]),
                    ("q3", 'b', &["q2"]),
                ],
                "q0",
                &["q3"],
                true,
            )?,
        },
        Example {
            name: "Alternating DFA",
            description: "DFA for even number of x's",
            input: automaton(
                &["even", "odd"],
                "x",
                &[("even", 'x', &["odd"]), ("odd", 'x', &["even"])],
                "even",
                &["even"],
                true,
            )?,
        },
    ])
}

const DFA_PATTERNS: [(&str, &str); 5] = [
    ("(0+1)*01", "Regular expression for strings ending with '01'"),
    ("1(0+1)*", "Regular expression for strings starting with '1'"),
    ("(00+11)*", "Regular expression for strings with even blocks"),
    ("0*1*", "Regular expression for 0s followed by 1s"),
    ("(0+1)*101(0+1)*", "Regular expression containing '101'"),
];

const NFA_PATTERNS: [(&str, &str); 5] = [
    ("a*b+", "Zero or more 'a's followed by one or more 'b's"),
    ("(a+b)*abb", "Any string ending with 'abb'"),
    ("a+b*a", "Either 'a', or zero or more 'b's followed by 'a'"),
    ("(ab+ba)*", "Zero or more occurrences of 'ab' or 'ba'"),
    ("a(a+b)*b", "Starts with 'a', ends with 'b'"),
];

const GRAMMARS: [(&str, &str, &str); 5] = [
    ("CFG: S → aSb | ε", "S → aSb | ε", "Context-free grammar for a^n b^n"),
    (
        "CFG: Palindromes",
        "S → aSa | bSb | a | b | ε",
        "CFG for palindromes over {a,b}",
    ),
    (
        "CFG: Balanced parentheses",
        "S → (S) | SS | ε",
        "CFG for balanced parentheses",
    ),
    (
        "CFG: Arithmetic expressions",
        "E → E+T | T; T → T*F | F; F → (E) | id",
        "CFG for arithmetic expressions",
    ),
    (
        "CFG: Nested structures",
        "S → aSbS | bSaS | ε",
        "CFG for nested a's and b's",
    ),
];

// Regex example names are the patterns themselves, which live as long as the constants.
fn regex_examples(
    patterns: &'static [(&'static str, &'static str)],
    wrap: fn(String) -> Conversion,
) -> Vec<Example<Conversion>> {
    patterns
        .iter()
        .map(|&(pattern, description)| Example {
            name: pattern,
            description,
            input: wrap(pattern.to_string()),
        })
        .collect()
}

fn wrap_all(
    examples: Vec<Example<Automaton>>,
    wrap: fn(Automaton) -> Conversion,
) -> Vec<Example<Conversion>> {
    examples
        .into_iter()
        .map(|e| Example {
            name: e.name,
            description: e.description,
            input: wrap(e.input),
        })
        .collect()
}

/// Returns the demonstration inputs for conversions of the given kind, ready to be run.
pub fn examples(kind: ConversionKind) -> Result<Vec<Example<Conversion>>, ConversionError> {
    Ok(match kind {
        ConversionKind::NfaToDfa => wrap_all(nfa_examples()?, Conversion::NfaToDfa),
        ConversionKind::DfaToNfa => wrap_all(dfa_examples()?, Conversion::DfaToNfa),
        ConversionKind::RegexToDfa => regex_examples(&DFA_PATTERNS, Conversion::RegexToDfa),
        ConversionKind::RegexToNfa => regex_examples(&NFA_PATTERNS, Conversion::RegexToNfa),
        ConversionKind::NfaToRegex => {
            wrap_all(elimination_nfa_examples()?, Conversion::NfaToRegex)
        }
        ConversionKind::DfaToRegex => {
            wrap_all(elimination_dfa_examples()?, Conversion::DfaToRegex)
        }
        ConversionKind::CfgToPda => GRAMMARS
            .iter()
            .map(|&(name, rules, description)| {
                Ok(Example {
                    name,
                    description,
                    input: Conversion::CfgToPda(rules.parse::<Grammar>()?),
                })
            })
            .collect::<Result<Vec<_>, ConversionError>>()?,
    })
}

/// Looks up the example called `name` among those of `kind`.
pub fn find(
    kind: ConversionKind,
    name: &str,
) -> Result<Option<Example<Conversion>>, ConversionError> {
    Ok(examples(kind)?.into_iter().find(|e| e.name == name))
}
