use std::fmt::Debug;

use itertools::Itertools;

use crate::{render::RenderOptions, Show, Symbol};

/// A set of symbols, stored as sorted, disjoint and non-adjacent inclusive ranges. As the
/// representation is canonical, two sets are equal precisely if they contain the same
/// symbols. This keeps markers like "every code point except a newline" small.
///
/// # Example
/// ```
/// use scanner_automata::prelude::*;
///
/// let mut set = SymbolSet::range(10, 20);
/// set.insert(21);
/// set.insert(5);
/// assert_eq!(set.ranges(), &[(5, 5), (10, 21)]);
/// assert_eq!(set.len(), 13);
/// assert!(set.contains(15) && !set.contains(9));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SymbolSet {
    ranges: Vec<(Symbol, Symbol)>,
}

impl SymbolSet {
    /// Creates the empty set.
    pub fn empty() -> Self {
        Self { ranges: vec![] }
    }

    /// Creates the set containing only `symbol`.
    pub fn singleton(symbol: Symbol) -> Self {
        Self {
            ranges: vec![(symbol, symbol)],
        }
    }

    /// Creates the set of all symbols in `lo..=hi`, which is empty if `lo > hi`.
    pub fn range(lo: Symbol, hi: Symbol) -> Self {
        if lo > hi {
            Self::empty()
        } else {
            Self {
                ranges: vec![(lo, hi)],
            }
        }
    }

    /// Creates the set of all symbols of an alphabet of the given size.
    pub fn full(alphabet_size: usize) -> Self {
        match alphabet_size {
            0 => Self::empty(),
            n => Self::range(0, (n - 1) as Symbol),
        }
    }

    /// Returns the ranges making up the set in ascending order.
    pub fn ranges(&self) -> &[(Symbol, Symbol)] {
        &self.ranges
    }

    /// Returns true if the set contains no symbol at all.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the number of symbols in the set.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|&(lo, hi)| (hi - lo) as usize + 1)
            .sum()
    }

    /// Returns the smallest symbol of the set.
    pub fn min(&self) -> Option<Symbol> {
        self.ranges.first().map(|&(lo, _)| lo)
    }

    /// Returns the largest symbol of the set.
    pub fn max(&self) -> Option<Symbol> {
        self.ranges.last().map(|&(_, hi)| hi)
    }

    /// Checks whether `symbol` is an element of the set.
    pub fn contains(&self, symbol: Symbol) -> bool {
        let idx = self.ranges.partition_point(|&(lo, _)| lo <= symbol);
        idx > 0 && self.ranges[idx - 1].1 >= symbol
    }

    /// Adds a single symbol, returns true if it was not present before.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if self.contains(symbol) {
            return false;
        }
        self.insert_range(symbol, symbol);
        true
    }

    /// Adds all symbols in `lo..=hi`, merging with overlapping or adjacent ranges.
    pub fn insert_range(&mut self, lo: Symbol, hi: Symbol) {
        if lo > hi {
            return;
        }
        // ranges in start..end overlap or touch the new one
        let start = self
            .ranges
            .partition_point(|&(_, h)| (h as u64) + 1 < lo as u64);
        let end = self
            .ranges
            .partition_point(|&(l, _)| (l as u64) <= (hi as u64) + 1);
        if start == end {
            self.ranges.insert(start, (lo, hi));
        } else {
            let merged = (
                lo.min(self.ranges[start].0),
                hi.max(self.ranges[end - 1].1),
            );
            self.ranges.splice(start..end, std::iter::once(merged));
        }
    }

    /// Computes the union of `self` and `other` as a new set.
    pub fn union(&self, other: &SymbolSet) -> SymbolSet {
        let mut out = self.clone();
        out.extend_from(other);
        out
    }

    /// Adds every symbol of `other` to `self`.
    pub fn extend_from(&mut self, other: &SymbolSet) {
        for &(lo, hi) in &other.ranges {
            self.insert_range(lo, hi);
        }
    }

    /// Returns all symbols of `[0, alphabet_size)` that are not in `self`.
    pub fn complement(&self, alphabet_size: usize) -> SymbolSet {
        let mut out = SymbolSet::empty();
        let mut next: u64 = 0;
        for &(lo, hi) in &self.ranges {
            if lo as u64 >= alphabet_size as u64 {
                break;
            }
            if (lo as u64) > next {
                out.ranges.push((next as Symbol, lo - 1));
            }
            next = hi as u64 + 1;
        }
        if next < alphabet_size as u64 {
            out.ranges.push((next as Symbol, (alphabet_size - 1) as Symbol));
        }
        out
    }

    /// Iterates over all symbols in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.ranges.iter().flat_map(|&(lo, hi)| lo..=hi)
    }

    /// Renders the set as a comma separated list of segments, using the symbol
    /// interpretation of the given `options`. Segments of three or more symbols are shown
    /// as `first-last`.
    pub fn show_with(&self, options: &RenderOptions) -> String {
        self.ranges
            .iter()
            .map(|&(lo, hi)| match hi - lo {
                0 => options.symbol(lo),
                1 => format!("{}, {}", options.symbol(lo), options.symbol(hi)),
                _ => format!("{}-{}", options.symbol(lo), options.symbol(hi)),
            })
            .join(", ")
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        let mut symbols = iter.into_iter().collect_vec();
        symbols.sort_unstable();
        symbols.dedup();
        let mut out = SymbolSet::empty();
        for symbol in symbols {
            match out.ranges.last_mut() {
                Some((_, hi)) if hi.checked_add(1) == Some(symbol) => *hi = symbol,
                _ => out.ranges.push((symbol, symbol)),
            }
        }
        out
    }
}

impl Extend<Symbol> for SymbolSet {
    fn extend<T: IntoIterator<Item = Symbol>>(&mut self, iter: T) {
        for symbol in iter {
            self.insert(symbol);
        }
    }
}

impl Show for SymbolSet {
    fn show(&self) -> String {
        self.show_with(&RenderOptions::default())
    }
}

impl Debug for SymbolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.ranges
                .iter()
                .map(|&(lo, hi)| if lo == hi {
                    lo.to_string()
                } else {
                    format!("{lo}-{hi}")
                })
                .join(", ")
        )
    }
}
