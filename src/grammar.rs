use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use tracing::trace;

use crate::{error::GrammarDefect, math::IndexedSet, Show};

/// Marks the bottom of the stack in pushdown automata, hence it cannot occur in a grammar.
pub const END_MARKER: char = '$';

/// A production `head → body`. An empty body denotes an ε-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    head: char,
    body: Vec<char>,
}

impl Production {
    /// Creates the production `head → body`.
    pub fn new<I: IntoIterator<Item = char>>(head: char, body: I) -> Self {
        Self {
            head,
            body: body.into_iter().collect(),
        }
    }

    /// The nonterminal on the left-hand side.
    pub fn head(&self) -> char {
        self.head
    }

    /// The symbols on the right-hand side, empty for an ε-production.
    pub fn body(&self) -> &[char] {
        &self.body
    }

    /// Returns true for an ε-production.
    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }

    /// Renders the body, `ε` if it is empty.
    pub fn show_body(&self) -> String {
        if self.body.is_empty() {
            "ε".to_string()
        } else {
            self.body.show()
        }
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.head, self.show_body())
    }
}

/// A context-free grammar with `char` symbols. Productions are kept in declaration order,
/// which determines the order of the transitions of the pushdown automaton built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: IndexedSet<char>,
    terminals: IndexedSet<char>,
    productions: Vec<Production>,
    start: char,
}

impl Grammar {
    /// Creates a grammar and checks that every production head is a nonterminal, that every
    /// body symbol is a terminal or nonterminal, that the start symbol is a nonterminal and
    /// that no symbol is both terminal and nonterminal.
    pub fn new<N, T, P>(
        nonterminals: N,
        terminals: T,
        productions: P,
        start: char,
    ) -> Result<Self, GrammarDefect>
    where
        N: IntoIterator<Item = char>,
        T: IntoIterator<Item = char>,
        P: IntoIterator<Item = Production>,
    {
        let grammar = Self {
            nonterminals: nonterminals.into_iter().collect(),
            terminals: terminals.into_iter().collect(),
            productions: productions.into_iter().collect(),
            start,
        };
        grammar.validate()?;
        Ok(grammar)
    }

    /// Checks the invariants listed in [`Grammar::new`].
    pub fn validate(&self) -> Result<(), GrammarDefect> {
        if self.productions.is_empty() {
            return Err(GrammarDefect::NoProductions);
        }
        if let Some(reserved) = self
            .nonterminals
            .iter()
            .chain(self.terminals.iter())
            .find(|c| **c == END_MARKER)
        {
            return Err(GrammarDefect::Reserved(*reserved));
        }
        if let Some(both) = self
            .nonterminals
            .iter()
            .find(|c| self.terminals.contains(*c))
        {
            return Err(GrammarDefect::Overlapping(*both));
        }
        if !self.is_nonterminal(self.start) {
            return Err(GrammarDefect::UnknownStart(self.start));
        }
        for production in &self.productions {
            if !self.is_nonterminal(production.head) {
                return Err(GrammarDefect::UnknownHead(production.head));
            }
            if let Some(symbol) = production
                .body
                .iter()
                .find(|c| !self.is_nonterminal(**c) && !self.terminals.contains(*c))
            {
                return Err(GrammarDefect::UnknownSymbol {
                    head: production.head,
                    symbol: *symbol,
                });
            }
        }
        Ok(())
    }

    /// The nonterminals in declaration order.
    pub fn nonterminals(&self) -> &IndexedSet<char> {
        &self.nonterminals
    }

    /// The terminals in declaration order.
    pub fn terminals(&self) -> &IndexedSet<char> {
        &self.terminals
    }

    /// All productions in declaration order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The productions with the given head, in declaration order.
    pub fn productions_of(&self, head: char) -> impl Iterator<Item = &Production> + '_ {
        self.productions.iter().filter(move |p| p.head == head)
    }

    /// The start symbol.
    pub fn start(&self) -> char {
        self.start
    }

    /// Returns true if `symbol` is a nonterminal.
    pub fn is_nonterminal(&self, symbol: char) -> bool {
        self.nonterminals.contains(&symbol)
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // group alternatives of the same head, heads in declaration order
        let heads = self.productions.iter().map(|p| p.head).unique();
        let rules = heads.map(|head| {
            format!(
                "{head} → {}",
                self.productions_of(head).map(|p| p.show_body()).join(" | ")
            )
        });
        write!(f, "{}", rules.format("\n"))
    }
}

/// Reads rules of the form `S -> aSb | ε` (`→` may be used instead of `->`), separated by
/// newlines or `;`. Uppercase ASCII letters are nonterminals, every other non-whitespace
/// character is a terminal, and the head of the first rule is the start symbol. An empty
/// alternative or `ε` denotes the empty body.
impl FromStr for Grammar {
    type Err = GrammarDefect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut productions = vec![];
        for rule in s.split(['\n', ';']).map(str::trim).filter(|r| !r.is_empty()) {
            let Some((head, bodies)) = rule.split_once("->").or_else(|| rule.split_once('→'))
            else {
                return Err(GrammarDefect::UnreadableRule(rule.to_string()));
            };
            let mut head = head.trim().chars();
            let (Some(head), None) = (head.next(), head.next()) else {
                return Err(GrammarDefect::UnreadableRule(rule.to_string()));
            };
            for body in bodies.split('|') {
                let body = body
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != 'ε')
                    .collect_vec();
                productions.push(Production::new(head, body));
            }
        }

        let start = productions
            .first()
            .map(|p| p.head)
            .ok_or(GrammarDefect::NoProductions)?;
        let symbols = productions
            .iter()
            .flat_map(|p| std::iter::once(p.head).chain(p.body.iter().copied()))
            .unique()
            .collect_vec();
        let (nonterminals, terminals): (Vec<_>, Vec<_>) = symbols
            .into_iter()
            .partition(|c| c.is_ascii_uppercase());

        trace!(
            "read grammar with {} productions over nonterminals {} and terminals {}",
            productions.len(),
            nonterminals.iter().collect::<String>(),
            terminals.iter().collect::<String>()
        );
        Grammar::new(nonterminals, terminals, productions, start)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn read_rules() {
        let grammar: Grammar = "S -> aSb | ε".parse().unwrap();
        assert_eq!(grammar.start(), 'S');
        assert_eq!(grammar.productions().len(), 2);
        assert_eq!(grammar.productions()[0].body(), &['a', 'S', 'b']);
        assert!(grammar.productions()[1].is_epsilon());
        assert_eq!(grammar.terminals().iter().collect::<String>(), "ab");
        assert_eq!(grammar.to_string(), "S → aSb | ε");
    }

    #[test_log::test]
    fn read_multiple_rules() {
        let grammar: Grammar = "E → E+T | T\nT → T*F | F; F → (E) | id".parse().unwrap();
        assert_eq!(grammar.start(), 'E');
        assert_eq!(grammar.nonterminals().iter().collect::<String>(), "ETF");
        assert_eq!(grammar.productions_of('F').count(), 2);
        assert!(grammar.terminals().contains(&'('));
        assert!(grammar.terminals().contains(&'i'));
    }

    #[test_log::test]
    fn defects() {
        assert_eq!(
            "S aSb".parse::<Grammar>(),
            Err(GrammarDefect::UnreadableRule("S aSb".to_string()))
        );
        assert_eq!("".parse::<Grammar>(), Err(GrammarDefect::NoProductions));
        assert_eq!(
            "S -> a$".parse::<Grammar>(),
            Err(GrammarDefect::Reserved('$'))
        );
        assert_eq!(
            Grammar::new(['S'], ['a'], [Production::new('S', ['a', 'b'])], 'S'),
            Err(GrammarDefect::UnknownSymbol {
                head: 'S',
                symbol: 'b'
            })
        );
        assert_eq!(
            Grammar::new(['S'], ['a'], [Production::new('T', ['a'])], 'S'),
            Err(GrammarDefect::UnknownHead('T'))
        );
        assert_eq!(
            Grammar::new(['S'], ['a'], [Production::new('S', ['a'])], 'X'),
            Err(GrammarDefect::UnknownStart('X'))
        );
        assert_eq!(
            Grammar::new(['S', 'a'], ['a'], [Production::new('S', ['a'])], 'S'),
            Err(GrammarDefect::Overlapping('a'))
        );
    }
}
