//! The conversion engines and a driver that dispatches on the kind of conversion.
//!
//! Every engine validates its input before it records anything, and afterwards it cannot fail.
//! The result is returned together with the [`StepTrace`] that documents how it was obtained.

use std::{fmt::Display, str::FromStr};

use tracing::debug;

use crate::{
    automaton::Automaton, grammar::Grammar, pda::PushdownAutomaton, regex::parse,
    trace::StepTrace, ConversionError,
};

mod cfg_to_pda;
mod elimination;
mod subset;
mod thompson;
mod widen;

pub use cfg_to_pda::cfg_to_pda;
pub use elimination::{to_regex, GeneralizedAutomaton, RegexOutcome};
pub use subset::nfa_to_dfa;
pub use thompson::regex_to_nfa;
pub use widen::dfa_to_nfa;

/// The label of the entry that separates the two halves of a regex to DFA trace.
pub const COMPOSITION_DELIMITER: &str = "--- Converting NFA to DFA ---";

/// The supported kinds of conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionKind {
    /// Subset construction.
    NfaToDfa,
    /// Reading a DFA as an NFA.
    DfaToNfa,
    /// Thompson's construction.
    RegexToNfa,
    /// Thompson's construction followed by subset construction.
    RegexToDfa,
    /// State elimination on an NFA.
    NfaToRegex,
    /// State elimination on a DFA.
    DfaToRegex,
    /// The three state pushdown automaton of a grammar.
    CfgToPda,
}

impl ConversionKind {
    /// All kinds in a fixed order.
    pub fn all() -> [ConversionKind; 7] {
        use ConversionKind::*;
        [
            NfaToDfa, DfaToNfa, RegexToNfa, RegexToDfa, NfaToRegex, DfaToRegex, CfgToPda,
        ]
    }

    /// The short name, for example `nfa-dfa`.
    pub fn name(&self) -> &'static str {
        match self {
            ConversionKind::NfaToDfa => "nfa-dfa",
            ConversionKind::DfaToNfa => "dfa-nfa",
            ConversionKind::RegexToNfa => "re-nfa",
            ConversionKind::RegexToDfa => "re-dfa",
            ConversionKind::NfaToRegex => "nfa-re",
            ConversionKind::DfaToRegex => "dfa-re",
            ConversionKind::CfgToPda => "cfg-pda",
        }
    }
}

impl Display for ConversionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ConversionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConversionKind::all()
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown conversion kind `{s}`"))
    }
}

/// A conversion together with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Determinize an NFA.
    NfaToDfa(Automaton),
    /// Widen a DFA into an NFA.
    DfaToNfa(Automaton),
    /// Build an NFA from the text of a regular expression.
    RegexToNfa(String),
    /// Build a DFA from the text of a regular expression.
    RegexToDfa(String),
    /// Compute a regular expression for an NFA.
    NfaToRegex(Automaton),
    /// Compute a regular expression for a DFA.
    DfaToRegex(Automaton),
    /// Translate a grammar into a pushdown automaton.
    CfgToPda(Grammar),
}

/// The final result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// An NFA or DFA.
    Automaton(Automaton),
    /// A regular expression, or the marker for the empty language.
    Regex(RegexOutcome),
    /// A pushdown automaton.
    Pushdown(PushdownAutomaton),
}

impl Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Automaton(automaton) => write!(f, "{automaton}"),
            Output::Regex(outcome) => write!(f, "{outcome}"),
            Output::Pushdown(pda) => write!(f, "{pda}"),
        }
    }
}

/// What a successful conversion produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    /// The final result.
    pub result: Output,
    /// How the result was obtained, step by step.
    pub trace: StepTrace,
}

impl Conversion {
    /// The kind of this conversion.
    pub fn kind(&self) -> ConversionKind {
        match self {
            Conversion::NfaToDfa(_) => ConversionKind::NfaToDfa,
            Conversion::DfaToNfa(_) => ConversionKind::DfaToNfa,
            Conversion::RegexToNfa(_) => ConversionKind::RegexToNfa,
            Conversion::RegexToDfa(_) => ConversionKind::RegexToDfa,
            Conversion::NfaToRegex(_) => ConversionKind::NfaToRegex,
            Conversion::DfaToRegex(_) => ConversionKind::DfaToRegex,
            Conversion::CfgToPda(_) => ConversionKind::CfgToPda,
        }
    }

    /// Runs the conversion. Malformed inputs are rejected before any step is recorded.
    pub fn run(&self) -> Result<Converted, ConversionError> {
        debug!("running {} conversion", self.kind());
        let (result, trace) = match self {
            Conversion::NfaToDfa(nfa) => {
                let (dfa, trace) = nfa_to_dfa(nfa)?;
                (Output::Automaton(dfa), trace)
            }
            Conversion::DfaToNfa(dfa) => {
                let (nfa, trace) = dfa_to_nfa(dfa)?;
                (Output::Automaton(nfa), trace)
            }
            Conversion::RegexToNfa(pattern) => {
                let (nfa, trace) = regex_to_nfa(&parse(pattern)?);
                (Output::Automaton(nfa), trace)
            }
            Conversion::RegexToDfa(pattern) => {
                let (nfa, first) = regex_to_nfa(&parse(pattern)?);
                // the NFA is well-formed by construction
                let (dfa, second) = nfa_to_dfa(&nfa)?;
                let trace = first.then(
                    COMPOSITION_DELIMITER,
                    "Now we convert the intermediate NFA to DFA.",
                    second,
                );
                (Output::Automaton(dfa), trace)
            }
            Conversion::NfaToRegex(nfa) => {
                let (outcome, trace) = to_regex(nfa)?;
                (Output::Regex(outcome), trace)
            }
            Conversion::DfaToRegex(dfa) => {
                dfa.validate_deterministic()?;
                let (outcome, trace) = to_regex(dfa)?;
                (Output::Regex(outcome), trace)
            }
            Conversion::CfgToPda(grammar) => {
                let (pda, trace) = cfg_to_pda(grammar)?;
                (Output::Pushdown(pda), trace)
            }
        };
        debug!(
            "{} conversion finished after {} steps",
            self.kind(),
            trace.len()
        );
        Ok(Converted { result, trace })
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Translates the notation of the catalog into the syntax of the `regex` crate.
    fn reference(pattern: &str) -> ::regex::Regex {
        let translated = pattern.replace('+', "|").replace('ε', "");
        ::regex::Regex::new(&format!("^(?:{translated})$")).unwrap()
    }

    fn automaton(converted: &Converted) -> &Automaton {
        match &converted.result {
            Output::Automaton(automaton) => automaton,
            other => panic!("expected an automaton, got {other}"),
        }
    }

    #[test_log::test]
    fn kinds_round_trip_through_names() {
        for kind in ConversionKind::all() {
            assert_eq!(kind.name().parse::<ConversionKind>(), Ok(kind));
        }
        assert!("nfa-pda".parse::<ConversionKind>().is_err());
    }

    #[test_log::test]
    fn regex_to_dfa_matches_reference() {
        for pattern in [
            "(0+1)*01",
            "1(0+1)*",
            "(00+11)*",
            "0*1*",
            "(0+1)*101(0+1)*",
            "(a+b)*abb",
            "(ab+ba)*",
            "a(a+b)*b",
        ] {
            let converted = Conversion::RegexToDfa(pattern.to_string()).run().unwrap();
            let dfa = automaton(&converted);
            assert!(dfa.is_deterministic());
            let reference = reference(pattern);
            let alphabet: Vec<char> = pattern.chars().filter(|c| c.is_alphanumeric()).collect();
            for word in KleeneStar::new(alphabet).take_while(|w| w.len() <= 6) {
                assert_eq!(
                    dfa.accepts(&word),
                    reference.is_match(&word),
                    "{pattern} on {word:?}"
                );
            }
        }
    }

    #[test_log::test]
    fn composite_trace_has_delimiter() {
        let pattern = "a|b";
        let (_, nfa_trace) = regex_to_nfa(&pattern.parse().unwrap());
        let converted = Conversion::RegexToDfa(pattern.to_string()).run().unwrap();
        let trace = &converted.trace;
        assert_eq!(trace.get(0).unwrap().label(), "Initialized");
        assert_eq!(
            trace.get(nfa_trace.len()).unwrap().label(),
            "--- Converting NFA to DFA ---"
        );
        assert_eq!(
            trace.labels().filter(|l| *l == "Initialized").count(),
            1
        );
        assert_eq!(trace.last().unwrap().label(), "DFA construction complete");
    }

    #[test_log::test]
    fn errors_surface_before_any_step() {
        assert!(matches!(
            Conversion::RegexToNfa("(ab".to_string()).run(),
            Err(ConversionError::RegexSyntax(_))
        ));
        let nfa = Automaton::builder()
            .with_transitions([("p", 'a', "q"), ("p", 'a', "p")])
            .with_accepting(["q"])
            .into_nfa("p")
            .unwrap();
        assert!(matches!(
            Conversion::DfaToRegex(nfa.clone()).run(),
            Err(ConversionError::MalformedAutomaton(
                AutomatonDefect::Nondeterministic { .. }
            ))
        ));
        assert!(matches!(
            Conversion::DfaToNfa(nfa.clone()).run(),
            Err(ConversionError::MalformedAutomaton(_))
        ));
        assert!(Conversion::NfaToRegex(nfa).run().is_ok());
    }

    #[test_log::test]
    fn dfa_round_trips() {
        let dfa = Automaton::builder()
            .with_transitions([
                ("s0", '0', "s0"),
                ("s0", '1', "s1"),
                ("s1", '0', "s2"),
                ("s1", '1', "s0"),
                ("s2", '0', "s1"),
                ("s2", '1', "s2"),
            ])
            .with_accepting(["s0"])
            .into_dfa("s0")
            .unwrap();

        let widened = Conversion::DfaToNfa(dfa.clone()).run().unwrap();
        let (back, _) = nfa_to_dfa(automaton(&widened)).unwrap();

        let Output::Regex(RegexOutcome::Expression(regex)) =
            Conversion::DfaToRegex(dfa.clone()).run().unwrap().result
        else {
            panic!("divisibility by three has a nonempty language");
        };
        let reparsed: RegexNode = regex.to_string().parse().unwrap();
        let (via_regex, _) = nfa_to_dfa(&regex_to_nfa(&reparsed).0).unwrap();

        for word in KleeneStar::new(dfa.alphabet()).take_while(|w| w.len() <= 7) {
            assert_eq!(dfa.accepts(&word), back.accepts(&word), "{word:?}");
            assert_eq!(dfa.accepts(&word), via_regex.accepts(&word), "{word:?}");
        }
    }
}
