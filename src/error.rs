use thiserror::Error;

use crate::automaton::State;

/// The error returned when an input is rejected before a conversion runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The automaton violates one of its structural invariants.
    #[error("malformed automaton: {0}")]
    MalformedAutomaton(#[from] AutomatonDefect),
    /// The text of a regular expression could not be parsed.
    #[error(transparent)]
    RegexSyntax(#[from] RegexSyntaxError),
    /// The grammar violates one of its structural invariants.
    #[error("malformed grammar: {0}")]
    MalformedGrammar(#[from] GrammarDefect),
}

/// Describes which invariant of an automaton is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonDefect {
    /// The start state is not among the declared states.
    #[error("start state `{0}` is not a declared state")]
    UnknownStart(State),
    /// An accepting state is not among the declared states.
    #[error("accepting state `{0}` is not a declared state")]
    UnknownAccepting(State),
    /// A transition leaves a state that was never declared.
    #[error("transition leaves undeclared state `{0}`")]
    UnknownSource(State),
    /// A transition enters a state that was never declared.
    #[error("transition from `{from}` enters undeclared state `{to}`")]
    UnknownTarget {
        /// Origin of the offending transition.
        from: State,
        /// The undeclared destination.
        to: State,
    },
    /// A transition is labeled with a symbol outside of the alphabet.
    #[error("transition from `{from}` reads `{symbol}`, which is not in the alphabet")]
    UnknownSymbol {
        /// Origin of the offending transition.
        from: State,
        /// The symbol that is not part of the alphabet.
        symbol: char,
    },
    /// A state has more than one successor on a symbol although a DFA was required.
    #[error("state `{state}` has {count} successors on `{symbol}`, a DFA allows at most one")]
    Nondeterministic {
        /// The state with the ambiguous transition.
        state: State,
        /// The symbol on which the state branches.
        symbol: char,
        /// Number of successors.
        count: usize,
    },
    /// A state has an ε-transition although a DFA was required.
    #[error("state `{0}` has an ε-transition, which a DFA does not allow")]
    EpsilonInDfa(State),
}

/// A syntax error in the textual form of a regular expression. The position is counted in
/// characters (not bytes) from the start of the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("regex syntax error at position {position} near `{fragment}`: {issue}")]
pub struct RegexSyntaxError {
    /// Character offset of the offending position.
    pub position: usize,
    /// The remainder of the pattern starting at `position`, possibly shortened.
    pub fragment: String,
    /// What went wrong.
    pub issue: SyntaxIssue,
}

/// The kinds of regex syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxIssue {
    /// An operator has no operand to work on.
    #[error("operator `{0}` is missing an operand")]
    MissingOperand(char),
    /// A closing parenthesis without matching opening one.
    #[error("unbalanced `)`")]
    UnbalancedParenthesis,
    /// An opening parenthesis that is never closed.
    #[error("`(` is never closed")]
    UnclosedParenthesis,
}

/// Describes which invariant of a grammar is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarDefect {
    /// The grammar has no productions at all.
    #[error("grammar has no productions")]
    NoProductions,
    /// The start symbol is not a declared nonterminal.
    #[error("start symbol `{0}` is not a declared nonterminal")]
    UnknownStart(char),
    /// A production head is not a declared nonterminal.
    #[error("production head `{0}` is not a declared nonterminal")]
    UnknownHead(char),
    /// A production body uses a symbol that is neither terminal nor nonterminal.
    #[error("production for `{head}` uses undeclared symbol `{symbol}`")]
    UnknownSymbol {
        /// Head of the offending production.
        head: char,
        /// The undeclared symbol.
        symbol: char,
    },
    /// A symbol is declared both as terminal and nonterminal.
    #[error("`{0}` is declared as terminal and as nonterminal")]
    Overlapping(char),
    /// A reserved symbol is used in the grammar.
    #[error("`{0}` is reserved as the stack bottom marker")]
    Reserved(char),
    /// A textual rule could not be read.
    #[error("cannot read rule `{0}`, expected `A -> body | body`")]
    UnreadableRule(String),
}
