/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;

/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Set with a defined iteration order, used wherever the order of traversal is
/// observable (begin/end sets, used-symbol sets, adjacency indices).
pub type OrderedSet<S> = std::collections::BTreeSet<S>;

/// Map with a defined iteration order, see [`OrderedSet`].
pub type OrderedMap<K, V> = std::collections::BTreeMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;
