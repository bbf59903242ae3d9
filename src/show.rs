use itertools::Itertools;

use crate::math::OrderedSet;

/// Helper trait which can be used to display states, transitions and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state that should be
    /// for example q0, q1, q2, ... and for a transition (q0, a, q1) it should be (q0, a, q1).
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this should be {q0, q1, q2, ...}.
    /// An empty collection is shown as `∅`.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        let mut iter = iter.into_iter().peekable();
        if iter.peek().is_none() {
            return "∅".to_string();
        }
        format!("{{{}}}", iter.map(|x| x.show()).join(", "))
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl<S: Show> Show for OrderedSet<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        self.iter().map(|x| x.show()).join("")
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        self.as_slice().show()
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

#[cfg(test)]
mod tests {
    use super::Show;
    use crate::math::OrderedSet;

    #[test]
    fn show_sets() {
        let set: OrderedSet<char> = ['b', 'a'].into_iter().collect();
        assert_eq!(set.show(), "{a, b}");
        assert_eq!(OrderedSet::<char>::new().show(), "∅");
        assert_eq!(vec!['a', 'S', 'b'].show(), "aSb");
        assert_eq!(('a', 1usize).show(), "(a, 1)");
    }
}
