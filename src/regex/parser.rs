//! Recursive descent parser for the textual form of regular expressions.
//!
//! Grammar, from weakest to strongest binding:
//! - `union := concat (('|' | '+') concat)*`
//! - `concat := postfix+`
//! - `postfix := atom ('*' | '?' | '+')*`
//! - `atom := symbol | 'ε' | '(' union? ')'`
//!
//! A `+` is a union if an operand follows it and the postfix "one or more" operator
//! otherwise, so both `(0+1)*` and `a*b+` are understood. Whitespace is ignored.

use tracing::trace;

use crate::error::{RegexSyntaxError, SyntaxIssue};

use super::RegexNode;

const FRAGMENT_LENGTH: usize = 8;

/// Parses `pattern` into a [`RegexNode`]. The empty pattern denotes the empty word.
pub fn parse(pattern: &str) -> Result<RegexNode, RegexSyntaxError> {
    let tokens = pattern
        .chars()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .collect();
    let mut parser = Parser {
        pattern,
        tokens,
        cursor: 0,
    };

    let ast = parser.union()?;
    if let Some((_, c)) = parser.peek() {
        debug_assert_eq!(c, ')');
        return Err(parser.error_here(SyntaxIssue::UnbalancedParenthesis));
    }
    trace!("parsed regex `{pattern}` into `{ast}`");
    Ok(ast)
}

struct Parser<'a> {
    pattern: &'a str,
    tokens: Vec<(usize, char)>,
    cursor: usize,
}

fn is_operator(c: char) -> bool {
    matches!(c, '(' | ')' | '|' | '+' | '*' | '?')
}

fn starts_operand(c: char) -> bool {
    c == '(' || !is_operator(c)
}

impl Parser<'_> {
    fn peek(&self) -> Option<(usize, char)> {
        self.tokens.get(self.cursor).copied()
    }

    fn peek_second(&self) -> Option<(usize, char)> {
        self.tokens.get(self.cursor + 1).copied()
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn position(&self) -> usize {
        self.peek()
            .map(|(pos, _)| pos)
            .unwrap_or_else(|| self.pattern.chars().count())
    }

    fn error_at(&self, position: usize, issue: SyntaxIssue) -> RegexSyntaxError {
        RegexSyntaxError {
            position,
            fragment: self
                .pattern
                .chars()
                .skip(position)
                .take(FRAGMENT_LENGTH)
                .collect(),
            issue,
        }
    }

    fn error_here(&self, issue: SyntaxIssue) -> RegexSyntaxError {
        self.error_at(self.position(), issue)
    }

    /// Parses alternatives, an empty input (or empty group) yields ε.
    fn union(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let mut left = match self.peek() {
            None | Some((_, ')')) => return Ok(RegexNode::Epsilon),
            Some((_, c)) if !starts_operand(c) => {
                return Err(self.error_here(SyntaxIssue::MissingOperand(c)))
            }
            _ => self.concat()?,
        };

        while let Some((_, op)) = self.peek() {
            if op != '|' && op != '+' {
                break;
            }
            self.advance();
            match self.peek() {
                Some((_, c)) if starts_operand(c) => {}
                _ => {
                    let position = self.position();
                    return Err(self.error_at(position, SyntaxIssue::MissingOperand(op)));
                }
            }
            let right = self.concat()?;
            left = RegexNode::union(left, right);
        }
        Ok(left)
    }

    fn concat(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let mut node = self.postfix()?;
        while let Some((_, c)) = self.peek() {
            if !starts_operand(c) {
                break;
            }
            let next = self.postfix()?;
            node = RegexNode::concat(node, next);
        }
        Ok(node)
    }

    fn postfix(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let mut node = self.atom()?;
        while let Some((_, c)) = self.peek() {
            match c {
                '*' => node = RegexNode::star(node),
                '?' => node = RegexNode::union(node, RegexNode::Epsilon),
                '+' => match self.peek_second() {
                    // an operand follows, so this is a union handled by the caller
                    Some((_, next)) if starts_operand(next) => break,
                    _ => node = RegexNode::concat(node.clone(), RegexNode::star(node)),
                },
                _ => break,
            }
            self.advance();
        }
        Ok(node)
    }

    fn atom(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let Some((position, c)) = self.peek() else {
            return Err(self.error_here(SyntaxIssue::UnclosedParenthesis));
        };
        match c {
            '(' => {
                self.advance();
                let inner = self.union()?;
                match self.peek() {
                    Some((_, ')')) => {
                        self.advance();
                        Ok(inner)
                    }
                    _ => Err(self.error_at(position, SyntaxIssue::UnclosedParenthesis)),
                }
            }
            'ε' => {
                self.advance();
                Ok(RegexNode::Epsilon)
            }
            c if is_operator(c) => Err(self.error_here(SyntaxIssue::MissingOperand(c))),
            c => {
                self.advance();
                Ok(RegexNode::Symbol(c))
            }
        }
    }
}
