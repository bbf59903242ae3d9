use std::borrow::Borrow;

use itertools::Itertools;

/// Enumerates all words over a set of symbols in length-lexicographic order, starting with the
/// empty word. The iterator is infinite unless there are no symbols, so it is usually combined
/// with `take_while` on the length of the words.
pub struct KleeneStar {
    symbols: Vec<char>,
    current: Option<Vec<usize>>,
}

impl Iterator for KleeneStar {
    type Item = String;
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.as_mut()?;
        let out = current.iter().map(|i| self.symbols[*i]).collect();

        if self.symbols.is_empty() {
            self.current = None;
            return Some(out);
        }

        let mut carry = true;
        let mut i = current.len();
        while carry && i > 0 {
            i -= 1;
            current[i] += 1;
            if current[i] >= self.symbols.len() {
                current[i] = 0;
                carry = true;
            } else {
                carry = false;
            }
        }

        if carry {
            *current = vec![0; current.len() + 1];
        }

        Some(out)
    }
}

impl KleeneStar {
    /// Duplicates are removed and the symbols are sorted.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<char>,
    {
        Self {
            symbols: symbols
                .into_iter()
                .map(|c| *c.borrow())
                .sorted()
                .dedup()
                .collect(),
            current: Some(vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::kleene::KleeneStar;

    #[test]
    fn kleene_star() {
        assert_eq!(
            KleeneStar::new(['b', 'a', 'b'])
                .take_while(|e| e.len() <= 2)
                .collect::<Vec<_>>(),
            vec!["", "a", "b", "aa", "ab", "ba", "bb"]
        );
    }

    #[test]
    fn no_symbols() {
        assert_eq!(KleeneStar::new(Vec::<char>::new()).collect::<Vec<_>>(), vec![""]);
    }
}
