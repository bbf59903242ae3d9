//! Conversion engine for finite automata, regular expressions and context-free grammars.
//!
//! Every conversion takes an immutable input and produces a new value together with a
//! [`trace::StepTrace`], an ordered list of intermediate snapshots with human readable
//! explanations. The supported conversions are
//! - NFA to DFA through the subset construction (see [`convert::nfa_to_dfa`]),
//! - DFA to NFA by widening every transition into a singleton set (see [`convert::dfa_to_nfa`]),
//! - regular expression to NFA through Thompson's construction (see [`convert::regex_to_nfa`]),
//! - NFA/DFA to regular expression through state elimination (see [`convert::to_regex`]),
//! - context-free grammar to pushdown automaton through the three state construction
//!   (see [`convert::cfg_to_pda`]).
//!
//! Composite conversions such as regex to DFA and the selection of a conversion kind at runtime
//! are handled by [`convert::Conversion`].
//!
//! Inputs are validated eagerly: a malformed automaton, regex or grammar is rejected with a
//! [`ConversionError`] before any step is recorded. Once validation passed, all engines are total.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_convert::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::{epsilon_closure, move_on, Automaton, AutomatonBuilder, Kind, Label, State},
        catalog::{self, Example},
        convert::{
            cfg_to_pda, dfa_to_nfa, nfa_to_dfa, regex_to_nfa, to_regex, Conversion,
            ConversionKind, Converted, GeneralizedAutomaton, Output, RegexOutcome,
        },
        error::{AutomatonDefect, ConversionError, GrammarDefect, RegexSyntaxError, SyntaxIssue},
        grammar::{Grammar, Production},
        kleene::KleeneStar,
        math,
        pda::{PdaTransition, PushdownAutomaton},
        regex::RegexNode,
        trace::{Snapshot, StepTrace, TraceEntry, TraceRecorder},
        Show,
    };
}

/// Set and map aliases used throughout the crate.
pub mod math;

mod show;
pub use show::Show;

/// Error types for malformed inputs.
pub mod error;
pub use error::ConversionError;

/// Finite automata (NFA and DFA), their construction and simulation.
pub mod automaton;

/// Abstract syntax of regular expressions and a parser for their textual form.
pub mod regex;

/// Context-free grammars.
pub mod grammar;

/// Pushdown automata as produced from context-free grammars.
pub mod pda;

/// Recording of conversion steps.
pub mod trace;

/// The conversion engines.
pub mod convert;

/// Demonstration inputs for every conversion kind.
pub mod catalog;

/// Enumeration of finite words.
pub mod kleene;

/// Generation of random automata. This is feature gated behind the `random` feature.
#[cfg(feature = "random")]
pub mod random;
