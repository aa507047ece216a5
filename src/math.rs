/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa. Used to keep track of old and new state
/// indices whenever states are renumbered.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// Builds the order preserving renumbering of the states selected by `keep`, mapping every
/// kept old index to its new dense index.
pub fn dense_renumbering<I: IntoIterator<Item = usize>>(keep: I) -> Bijection<usize, usize> {
    keep.into_iter()
        .enumerate()
        .map(|(new, old)| (old, new))
        .collect()
}
