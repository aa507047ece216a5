use itertools::Itertools;
use tracing::{error, trace};

use crate::{
    dfa::TransitionTable,
    error::{check_alphabet_size, check_symbol},
    math::Map,
    render::RenderOptions,
    Error, Result, Symbol, SymbolSet,
};

/// A total function from the symbols `[0, domain_size)` onto the classes
/// `[0, class_count)`. Every class is the image of at least one symbol. Symbols in the same
/// class are meant to be indistinguishable for some automaton, which then only needs one
/// column per class in its transition table.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EquivalenceMap {
    class_of: Vec<Symbol>,
    class_count: usize,
}

impl EquivalenceMap {
    /// Creates a map from the given class assignment, verifying that it maps
    /// `[0, domain_size)` onto `[0, class_count)`.
    pub fn new(domain_size: usize, class_count: usize, class_of: Vec<Symbol>) -> Result<Self> {
        check_alphabet_size(domain_size)?;
        if class_of.len() != domain_size {
            return Err(Error::DimensionMismatch {
                what: "equivalence map domain",
                expected: domain_size,
                found: class_of.len(),
            });
        }
        let mut used = vec![false; class_count];
        for (symbol, &class) in class_of.iter().enumerate() {
            match used.get_mut(class as usize) {
                Some(seen) => *seen = true,
                None => {
                    return Err(Error::InvalidEquivalenceMap(format!(
                        "symbol {symbol} is mapped to class {class}, but there are only {class_count} classes"
                    )))
                }
            }
        }
        if let Some(unused) = used.iter().position(|seen| !seen) {
            error!("class {unused} of equivalence map has no symbols");
            return Err(Error::InvalidEquivalenceMap(format!(
                "class {unused} is not the image of any symbol"
            )));
        }
        Ok(Self {
            class_of,
            class_count,
        })
    }

    /// Builds a map from an arbitrary labelling of the domain, numbering the distinct labels
    /// densely in order of their first appearance.
    pub fn normalized<L: std::hash::Hash + Eq>(labels: impl IntoIterator<Item = L>) -> Result<Self> {
        let mut known: Map<L, Symbol> = Map::default();
        let class_of = labels
            .into_iter()
            .map(|label| {
                let next = known.len() as Symbol;
                *known.entry(label).or_insert(next)
            })
            .collect_vec();
        Self::new(class_of.len(), known.len(), class_of)
    }

    /// The map in which every symbol forms its own class.
    pub fn identity(domain_size: usize) -> Result<Self> {
        Self::new(
            domain_size,
            domain_size,
            (0..domain_size as Symbol).collect(),
        )
    }

    /// Number of symbols that are mapped.
    pub fn domain_size(&self) -> usize {
        self.class_of.len()
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.class_count
    }

    /// Returns the class of `symbol` or `None` if it lies outside of the domain.
    #[inline]
    pub fn get(&self, symbol: Symbol) -> Option<Symbol> {
        self.class_of.get(symbol as usize).copied()
    }

    /// Returns the class of `symbol`, failing if it lies outside of the domain.
    pub fn class_of(&self, symbol: Symbol) -> Result<Symbol> {
        check_symbol(symbol, self.domain_size())?;
        Ok(self.class_of[symbol as usize])
    }

    /// Returns, for every class, the set of symbols belonging to it.
    pub fn members(&self) -> Vec<SymbolSet> {
        let mut members = vec![SymbolSet::empty(); self.class_count];
        for (symbol, &class) in self.class_of.iter().enumerate() {
            members[class as usize].insert(symbol as Symbol);
        }
        members
    }

    /// Chains `self` with `second`: the result maps a symbol to the class that `second`
    /// assigns to the class of the symbol under `self`. Requires the classes of `self` to
    /// be the domain of `second`.
    pub fn compose(&self, second: &EquivalenceMap) -> Result<EquivalenceMap> {
        if self.class_count != second.domain_size() {
            return Err(Error::DimensionMismatch {
                what: "composed equivalence map domain",
                expected: self.class_count,
                found: second.domain_size(),
            });
        }
        Ok(EquivalenceMap {
            class_of: self
                .class_of
                .iter()
                .map(|&class| second.class_of[class as usize])
                .collect(),
            class_count: second.class_count,
        })
    }

    /// Collapses the columns of `table` (whose symbols are raw symbols from the domain of
    /// `self`) into one column per class.
    ///
    /// Fails with [`Error::InconsistentHint`] if two symbols of the same class lead to
    /// different targets in some state, as the compressed table could not represent both.
    pub fn compress_table(&self, table: &TransitionTable) -> Result<TransitionTable> {
        if table.alphabet_size() != self.domain_size() {
            return Err(Error::DimensionMismatch {
                what: "transition table width",
                expected: self.domain_size(),
                found: table.alphabet_size(),
            });
        }
        // the first symbol of every class, surjectivity guarantees that one exists
        let mut representative: Vec<Symbol> = vec![0; self.class_count];
        for (symbol, &class) in self.class_of.iter().enumerate().rev() {
            representative[class as usize] = symbol as Symbol;
        }

        let mut compressed =
            TransitionTable::filled(table.number_of_states(), self.class_count, 0);
        for state in 0..table.number_of_states() {
            let row = table.row(state);
            for (class, &left) in representative.iter().enumerate() {
                compressed.set(state, class as Symbol, row[left as usize]);
            }
            for (symbol, &target) in row.iter().enumerate() {
                let class = self.class_of[symbol];
                let left = representative[class as usize];
                if row[left as usize] != target {
                    error!(
                        "hint maps {left} and {symbol} to class {class}, but they differ in state {state}"
                    );
                    return Err(Error::InconsistentHint {
                        left,
                        right: symbol as Symbol,
                    });
                }
            }
        }
        Ok(compressed)
    }

    /// Given a `table` that was compressed under `self`, finds the classes whose columns
    /// coincide, i.e. that lead to the same target from every state. The result maps the
    /// classes of `self` onto these coarser classes, numbered in order of first appearance.
    /// Compose `self` with the result to obtain a map from raw symbols.
    pub fn refine(&self, table: &TransitionTable) -> Result<EquivalenceMap> {
        if table.alphabet_size() != self.class_count {
            return Err(Error::DimensionMismatch {
                what: "compressed transition table width",
                expected: self.class_count,
                found: table.alphabet_size(),
            });
        }
        let refined = EquivalenceMap::normalized(
            (0..self.class_count as Symbol).map(|class| table.column(class).collect_vec()),
        )?;
        trace!(
            "refined {} classes into {}",
            self.class_count,
            refined.class_count
        );
        Ok(refined)
    }

    /// Lists every class with its members, one class per line.
    pub fn show_with(&self, options: &RenderOptions) -> String {
        self.members()
            .iter()
            .enumerate()
            .map(|(class, members)| format!("{class}: {}", members.show_with(options)))
            .join("\n")
    }
}

impl std::fmt::Debug for EquivalenceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EquivalenceMap({} -> {}: {:?})",
            self.domain_size(),
            self.class_count,
            self.members()
        )
    }
}

/// Builds a cheap approximation of the symbol classes of an automaton from the symbols that
/// matter individually (the `pivots`, see [`crate::Nfa::mentioned_symbols`]). Every pivot gets
/// a class of its own, and every maximal run of symbols between two consecutive pivots (as
/// well as before the first and after the last one) is collapsed into one class.
///
/// # Example
/// ```
/// use scanner_automata::prelude::*;
///
/// let map = coarse_symbol_class_map([5, 2], 8)?;
/// assert_eq!(map.class_count(), 5);
/// let classes: Vec<_> = (0..8).map(|s| map.get(s).unwrap()).collect();
/// assert_eq!(classes, vec![0, 0, 1, 2, 2, 3, 4, 4]);
/// # Ok::<(), scanner_automata::Error>(())
/// ```
pub fn coarse_symbol_class_map<I>(pivots: I, alphabet_size: usize) -> Result<EquivalenceMap>
where
    I: IntoIterator<Item = Symbol>,
{
    check_alphabet_size(alphabet_size)?;
    let pivots = pivots.into_iter().sorted_unstable().dedup().collect_vec();
    for &pivot in &pivots {
        check_symbol(pivot, alphabet_size)?;
    }

    let mut class_of = Vec::with_capacity(alphabet_size);
    let mut class: Symbol = 0;
    for pivot in pivots {
        if class_of.len() < pivot as usize {
            class_of.resize(pivot as usize, class);
            class += 1;
        }
        class_of.push(class);
        class += 1;
    }
    if class_of.len() < alphabet_size {
        class_of.resize(alphabet_size, class);
        class += 1;
    }
    trace!(
        "coarse symbol classes: {} symbols into {} classes",
        alphabet_size,
        class
    );
    EquivalenceMap::new(alphabet_size, class as usize, class_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateIndex;

    fn table(rows: &[&[StateIndex]]) -> TransitionTable {
        TransitionTable::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn validation() {
        assert!(EquivalenceMap::new(3, 2, vec![0, 1, 1]).is_ok());
        assert!(matches!(
            EquivalenceMap::new(3, 3, vec![0, 1, 1]),
            Err(Error::InvalidEquivalenceMap(_))
        ));
        assert!(matches!(
            EquivalenceMap::new(3, 2, vec![0, 2, 1]),
            Err(Error::InvalidEquivalenceMap(_))
        ));
        assert!(matches!(
            EquivalenceMap::new(2, 2, vec![0, 1, 1]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert_eq!(
            EquivalenceMap::new(0, 0, vec![]),
            Err(Error::InvalidAlphabetSize)
        );
    }

    #[test]
    fn coarse_map_edges() {
        assert_eq!(
            coarse_symbol_class_map([], crate::END_OF_INPUT as usize + 1),
            Err(Error::InvalidAlphabetSize)
        );
        let none = coarse_symbol_class_map([], 4).unwrap();
        assert_eq!(none.class_count(), 1);
        let all = coarse_symbol_class_map([0, 1, 2, 3], 4).unwrap();
        assert_eq!(all, EquivalenceMap::identity(4).unwrap());
        let ends = coarse_symbol_class_map([0, 3, 3], 4).unwrap();
        assert_eq!(ends.members(), vec![
            SymbolSet::singleton(0),
            SymbolSet::range(1, 2),
            SymbolSet::singleton(3)
        ]);
        assert!(matches!(
            coarse_symbol_class_map([4], 4),
            Err(Error::SymbolOutOfRange { .. })
        ));
    }

    #[test]
    fn composition() {
        let first = EquivalenceMap::new(5, 3, vec![0, 0, 1, 2, 2]).unwrap();
        let second = EquivalenceMap::new(3, 2, vec![0, 1, 0]).unwrap();
        let composed = first.compose(&second).unwrap();
        assert_eq!(composed.domain_size(), 5);
        assert_eq!(composed.class_count(), 2);
        assert_eq!(
            (0..5).map(|s| composed.get(s).unwrap()).collect_vec(),
            vec![0, 0, 1, 0, 0]
        );
        assert!(matches!(
            second.compose(&first),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn compress_and_refine() {
        // symbols 0 and 3 behave alike, as do 1 and 2
        let raw = table(&[&[0, 1, 1, 0], &[1, 0, 0, 1]]);
        let identity = EquivalenceMap::identity(4).unwrap();
        let compressed = identity.compress_table(&raw).unwrap();
        assert_eq!(compressed, raw);
        let refined = identity.refine(&compressed).unwrap();
        assert_eq!(refined.class_count(), 2);
        assert_eq!(refined.get(3), Some(0));
        assert_eq!(refined.get(2), Some(1));

        let recompressed = refined.compress_table(&raw).unwrap();
        assert_eq!(recompressed, table(&[&[0, 1], &[1, 0]]));
    }

    #[test]
    fn inconsistent_hint_is_rejected() {
        let raw = table(&[&[0, 1, 1], &[1, 1, 1]]);
        let hint = EquivalenceMap::new(3, 2, vec![0, 0, 1]).unwrap();
        assert_eq!(
            hint.compress_table(&raw),
            Err(Error::InconsistentHint { left: 0, right: 1 })
        );
    }

    #[test]
    fn shows_members() {
        let map = EquivalenceMap::new(4, 2, vec![0, 1, 1, 0]).unwrap();
        assert_eq!(
            map.show_with(&RenderOptions::default()),
            "0: a_0, a_3\n1: a_1, a_2"
        );
    }
}
