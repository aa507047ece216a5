//! Symbols handled by the automata are plain integers from `[0, alphabet_size)`. Edge markers
//! group them into [`SymbolSet`]s and alphabet compression groups them into the classes of an
//! [`EquivalenceMap`].

mod symbol_set;
pub use symbol_set::SymbolSet;

mod equivalence;
pub use equivalence::{coarse_symbol_class_map, EquivalenceMap};

/// Markers that miss fewer than this many symbols of the alphabet are considered to be
/// complements when collecting the symbols that an automaton mentions, so near total sets
/// never have to be enumerated.
pub const SUBTRACTIVE_LIMIT: usize = 5;

/// Returns true if the `marker` is more conveniently described by the symbols it lacks.
pub fn is_subtractive(marker: &SymbolSet, alphabet_size: usize) -> bool {
    alphabet_size.saturating_sub(marker.len()) < SUBTRACTIVE_LIMIT
}
