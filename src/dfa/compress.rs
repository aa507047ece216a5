use tracing::debug;

use crate::{Dfa, EquivalenceMap, Result};

impl Dfa {
    /// Shrinks the alphabet to classes of symbols on which the automaton behaves identically
    /// in every state.
    ///
    /// The table is first compressed under `hint`, which must not merge symbols the automaton
    /// tells apart. The classes of the hint whose columns coincide are then merged and the
    /// table is compressed once more. Returns the map from raw symbols to the final classes
    /// together with the automaton over these classes.
    ///
    /// # Example
    /// ```
    /// use scanner_automata::prelude::*;
    ///
    /// let digit = Nfa::symbol_set_language(128, SymbolSet::range('0' as Symbol, '9' as Symbol))?;
    /// let dfa = digit.determinize(&Priorities::from_precedence([]))?;
    /// let (map, compressed) = dfa.compress(&EquivalenceMap::identity(128)?)?;
    /// assert_eq!(map.class_count(), 2);
    /// assert_eq!(compressed.alphabet_size(), 2);
    /// assert_eq!(map.get('3' as Symbol), map.get('7' as Symbol));
    /// # Ok::<(), scanner_automata::Error>(())
    /// ```
    pub fn compress(&self, hint: &EquivalenceMap) -> Result<(EquivalenceMap, Dfa)> {
        let coarse = hint.compress_table(self.table())?;
        let refinement = hint.refine(&coarse)?;
        let table = refinement.compress_table(&coarse)?;
        let map = hint.compose(&refinement)?;
        debug!(
            "compressed {} symbols into {} classes (hint had {})",
            map.domain_size(),
            map.class_count(),
            hint.class_count()
        );
        Ok((
            map,
            Dfa::new(self.initial_state(), self.labels().to_vec(), table)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::operators_and_identifiers;

    #[test_log::test]
    fn compression_keeps_transitions() {
        let (lexer, priorities) = operators_and_identifiers();
        let dfa = lexer.determinize(&priorities).unwrap().minimize().unwrap();
        let hint = coarse_symbol_class_map(
            lexer.remove_lambda_steps().unwrap().mentioned_symbols(),
            128,
        )
        .unwrap();
        let (map, compressed) = dfa.compress(&hint).unwrap();

        // '+', 'i', 'f', the other letters and everything else
        assert_eq!(map.class_count(), 5);
        assert_eq!(map.domain_size(), 128);
        for state in 0..dfa.size() {
            for symbol in 0..128 {
                let class = map.get(symbol).unwrap();
                assert_eq!(
                    dfa.transition(state, symbol).unwrap(),
                    compressed.transition(state, class).unwrap()
                );
            }
        }
    }

    #[test]
    fn identity_hint_yields_the_same_classes() {
        let (lexer, priorities) = operators_and_identifiers();
        let dfa = lexer.determinize(&priorities).unwrap().minimize().unwrap();
        let hint = coarse_symbol_class_map(
            lexer.remove_lambda_steps().unwrap().mentioned_symbols(),
            128,
        )
        .unwrap();
        let (from_coarse, _) = dfa.compress(&hint).unwrap();
        let (from_identity, _) = dfa.compress(&EquivalenceMap::identity(128).unwrap()).unwrap();
        assert_eq!(from_coarse.members(), from_identity.members());
    }

    #[test]
    fn bad_hint_is_rejected() {
        let dfa = Nfa::single_symbol_language(4, 1)
            .and_then(|n| n.determinize(&Priorities::from_precedence([])))
            .unwrap();
        let hint = EquivalenceMap::new(4, 2, vec![0, 0, 1, 1]).unwrap();
        assert_eq!(
            dfa.compress(&hint).map(|_| ()),
            Err(Error::InconsistentHint { left: 0, right: 1 })
        );
    }
}
