use std::collections::{BTreeMap, BTreeSet};

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// A set whose iteration order is given by `Ord`. Used wherever the result must not depend on
/// insertion order, for example for the sets of NFA states that make up a DFA state.
pub type OrderedSet<S> = BTreeSet<S>;
/// A map whose iteration order is given by `Ord` on the keys.
pub type OrderedMap<K, V> = BTreeMap<K, V>;
/// A set that remembers the order in which its elements were inserted.
pub type IndexedSet<S> = indexmap::IndexSet<S>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;
