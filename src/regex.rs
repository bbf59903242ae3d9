use std::{fmt::Display, str::FromStr};

use crate::{error::RegexSyntaxError, math::OrderedSet};

mod parser;
pub use parser::parse;

/// The abstract syntax tree of a regular expression.
///
/// The textual form accepted by [`parse`] and produced by [`Display`] uses `|` for union
/// (an infix `+` is read as union as well), juxtaposition for concatenation, a postfix `*` for
/// the Kleene star and `ε` for the empty word. The star binds strongest, union weakest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegexNode {
    /// Matches exactly the given symbol.
    Symbol(char),
    /// Matches the empty word.
    Epsilon,
    /// Matches everything either side matches.
    Union(Box<RegexNode>, Box<RegexNode>),
    /// Matches a word of the left side followed by a word of the right side.
    Concat(Box<RegexNode>, Box<RegexNode>),
    /// Matches zero or more repetitions of the inner expression.
    Star(Box<RegexNode>),
}

impl RegexNode {
    /// Creates a node matching `symbol`.
    pub fn symbol(symbol: char) -> Self {
        RegexNode::Symbol(symbol)
    }

    /// Creates the union of `left` and `right`.
    pub fn union(left: RegexNode, right: RegexNode) -> Self {
        RegexNode::Union(Box::new(left), Box::new(right))
    }

    /// Creates the concatenation of `left` and `right`.
    pub fn concat(left: RegexNode, right: RegexNode) -> Self {
        RegexNode::Concat(Box::new(left), Box::new(right))
    }

    /// Creates the Kleene star of `inner`.
    pub fn star(inner: RegexNode) -> Self {
        RegexNode::Star(Box::new(inner))
    }

    /// Collects all symbols that occur in the expression.
    pub fn alphabet(&self) -> OrderedSet<char> {
        let mut symbols = OrderedSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut OrderedSet<char>) {
        match self {
            RegexNode::Symbol(c) => {
                symbols.insert(*c);
            }
            RegexNode::Epsilon => {}
            RegexNode::Union(l, r) | RegexNode::Concat(l, r) => {
                l.collect_symbols(symbols);
                r.collect_symbols(symbols);
            }
            RegexNode::Star(inner) => inner.collect_symbols(symbols),
        }
    }

    /// The number of nodes in the syntax tree.
    pub fn size(&self) -> usize {
        match self {
            RegexNode::Symbol(_) | RegexNode::Epsilon => 1,
            RegexNode::Union(l, r) | RegexNode::Concat(l, r) => 1 + l.size() + r.size(),
            RegexNode::Star(inner) => 1 + inner.size(),
        }
    }

    /// Name of the operator at the root, used when explaining construction steps.
    pub fn operator(&self) -> &'static str {
        match self {
            RegexNode::Symbol(_) => "symbol",
            RegexNode::Epsilon => "epsilon",
            RegexNode::Union(_, _) => "union",
            RegexNode::Concat(_, _) => "concatenation",
            RegexNode::Star(_) => "Kleene star",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            RegexNode::Union(_, _) => 0,
            RegexNode::Concat(_, _) => 1,
            RegexNode::Star(_) => 2,
            RegexNode::Symbol(_) | RegexNode::Epsilon => 3,
        }
    }

    // Operators are left associative in the parser, so right operands of the same operator
    // need parentheses for the output to parse back into the same tree.
    fn write_at(&self, f: &mut std::fmt::Formatter<'_>, required: u8) -> std::fmt::Result {
        if self.precedence() < required {
            write!(f, "(")?;
            self.write_at(f, 0)?;
            return write!(f, ")");
        }
        match self {
            RegexNode::Symbol(c) => write!(f, "{c}"),
            RegexNode::Epsilon => write!(f, "ε"),
            RegexNode::Union(l, r) => {
                l.write_at(f, 0)?;
                write!(f, "|")?;
                r.write_at(f, 1)
            }
            RegexNode::Concat(l, r) => {
                l.write_at(f, 1)?;
                r.write_at(f, 2)
            }
            RegexNode::Star(inner) => {
                inner.write_at(f, 3)?;
                write!(f, "*")
            }
        }
    }
}

impl Display for RegexNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_at(f, 0)
    }
}

impl FromStr for RegexNode {
    type Err = RegexSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn display_uses_minimal_parentheses() {
        let ab = RegexNode::concat(RegexNode::symbol('a'), RegexNode::symbol('b'));
        assert_eq!(RegexNode::star(ab.clone()).to_string(), "(ab)*");
        assert_eq!(
            RegexNode::union(ab.clone(), RegexNode::Epsilon).to_string(),
            "ab|ε"
        );
        assert_eq!(
            RegexNode::concat(
                RegexNode::union(RegexNode::symbol('0'), RegexNode::symbol('1')),
                RegexNode::star(RegexNode::symbol('0'))
            )
            .to_string(),
            "(0|1)0*"
        );
        assert_eq!(
            RegexNode::concat(RegexNode::symbol('a'), ab.clone()).to_string(),
            "a(ab)"
        );
    }

    #[test]
    fn display_parses_back() {
        for pattern in ["(0+1)*01", "a(b|c)*d", "((a|b)|c)(d(e))", "(a*)*", "ε|a", "x(y|z)**"] {
            let ast: RegexNode = pattern.parse().unwrap();
            let reparsed: RegexNode = ast.to_string().parse().unwrap();
            assert_eq!(ast, reparsed, "{pattern} was rendered as {ast}");
        }
    }

    #[test]
    fn alphabet_and_size() {
        let ast: RegexNode = "(a|b)*abb".parse().unwrap();
        assert_eq!(ast.alphabet().into_iter().collect::<String>(), "ab");
        assert_eq!(ast.size(), 10);
        assert_eq!(ast.operator(), "concatenation");
    }
}
