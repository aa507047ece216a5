use std::collections::{BTreeMap, VecDeque};

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{math::dense_renumbering, Nfa, Result, StateGraphBuilder, StateTag, SymbolSet};

impl Nfa {
    /// Computes the states that survive lambda elimination: the initial state and every state
    /// that is entered by a symbol edge out of the lambda closure of a surviving state.
    fn live_states(&self) -> BitSet {
        let mut live = BitSet::with_capacity(self.size());
        let mut queue = VecDeque::from([self.initial_state()]);
        live.insert(self.initial_state());
        while let Some(state) = queue.pop_front() {
            for member in self.lambda_closure([state]) {
                for (to, marker) in self.graph().targets(member) {
                    if !marker.is_lambda() && live.insert(to) {
                        queue.push_back(to);
                    }
                }
            }
        }
        live
    }

    /// Produces an equivalent automaton without lambda edges.
    ///
    /// Only the initial state and the states entered by consuming a symbol are kept, they are
    /// renumbered densely in their original order. A kept state `s` gets an edge to `t`
    /// labelled with the union of the direct symbol markers from any state of the lambda closure
    /// of `s` to `t`. It is tagged with the tag of the first accepting state found by a breadth
    /// first traversal of its closure, which starts at `s` itself.
    ///
    /// This provisional choice of tag is only visible on the returned automaton, determinization
    /// resolves all tags that meet in a subset by priority anyway. Applying the operation to its
    /// own output returns that output unchanged.
    ///
    /// ```
    /// use scanner_automata::prelude::*;
    ///
    /// let a = Nfa::single_symbol_language(2, 0)?;
    /// let nfa = a.iteration()?.remove_lambda_steps()?;
    /// assert!(!nfa.graph().has_lambda_edges());
    /// assert!(nfa.accepts(&[])? && nfa.accepts(&[0, 0])?);
    /// assert_eq!(nfa.remove_lambda_steps()?, nfa);
    /// # Ok::<(), scanner_automata::Error>(())
    /// ```
    pub fn remove_lambda_steps(&self) -> Result<Nfa> {
        let live = self.live_states();
        let renaming = dense_renumbering(live.iter());
        trace!(
            "keeping {} of {} states while removing lambda steps",
            renaming.len(),
            self.size()
        );

        let mut builder = StateGraphBuilder::new(renaming.len(), self.alphabet_size())?;
        let mut labels = Vec::with_capacity(renaming.len());
        for (&old, &new) in renaming.iter() {
            let closure = self.lambda_closure([old]);
            labels.push(
                closure
                    .iter()
                    .map(|&member| self.labels()[member])
                    .find(StateTag::is_final)
                    .unwrap_or(StateTag::NotFinal),
            );

            let mut markers: BTreeMap<usize, SymbolSet> = BTreeMap::new();
            for &member in &closure {
                for (to, marker) in self.graph().targets(member) {
                    if let Some(symbols) = marker.symbols() {
                        markers.entry(to).or_default().extend_from(symbols);
                    }
                }
            }
            for (to, symbols) in markers {
                if symbols.is_empty() {
                    continue;
                }
                // targets of symbol edges leaving live closures are live themselves
                if let Some(&to) = renaming.get_by_left(&to) {
                    builder.set_edge(new, to, symbols)?;
                }
            }
        }

        let initial = renaming
            .get_by_left(&self.initial_state())
            .copied()
            .unwrap_or_default();
        let out = Nfa::from_parts(initial, labels, builder.build())?;
        debug!(
            "removed lambda steps, {} states and {} edges remain",
            out.size(),
            out.graph().edge_count()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{operators_and_identifiers, words};

    #[test_log::test]
    fn a_plus_becomes_a_chain_with_loop() {
        let a_plus = Nfa::single_symbol_language(256, 'a' as Symbol)
            .and_then(|a| a.positive_iteration())
            .unwrap();
        let nfa = a_plus.remove_lambda_steps().unwrap();
        assert_eq!(nfa.size(), 3);
        assert_eq!(nfa.initial_state(), 0);
        assert_eq!(
            nfa.labels(),
            &[StateTag::NotFinal, StateTag::FinalDummy, StateTag::FinalDummy]
        );
        let a = SymbolSet::singleton('a' as Symbol);
        for (from, to) in [(0, 1), (1, 2), (2, 2)] {
            assert_eq!(
                nfa.graph().edge_marker(from, to).unwrap(),
                Some(&EdgeMarker::Symbols(a.clone()))
            );
        }
        assert_eq!(nfa.graph().edge_count(), 3);
    }

    #[test]
    fn first_accepting_tag_in_closure_is_taken() {
        let mut builder = StateGraphBuilder::new(3, 2).unwrap();
        builder.set_lambda_edge(0, 2).unwrap();
        builder.set_lambda_edge(0, 1).unwrap();
        let nfa = Nfa::new(
            3,
            2,
            0,
            [
                (0, StateTag::NotFinal),
                (1, StateTag::Token(1)),
                (2, StateTag::Token(0)),
            ],
            builder.build(),
        )
        .unwrap();
        let reduced = nfa.remove_lambda_steps().unwrap();
        // state 1 is discovered before state 2, targets are visited in ascending order
        assert_eq!(reduced.labels(), &[StateTag::Token(1)]);
        assert_eq!(reduced.graph().edge_count(), 0);
    }

    #[test]
    fn unreachable_scaffolding_is_dropped() {
        let mut builder = StateGraphBuilder::new(5, 2).unwrap();
        builder.add_symbol_to_edge(0, 1, 0).unwrap();
        // 2 is only reachable through lambda edges, 3 and 4 are unreachable
        builder.set_lambda_edge(1, 2).unwrap();
        builder.add_symbol_to_edge(2, 1, 1).unwrap();
        builder.add_symbol_to_edge(3, 4, 0).unwrap();
        let nfa = Nfa::new(
            5,
            2,
            0,
            (0..5).map(|q| (q, if q == 2 { StateTag::FinalDummy } else { StateTag::NotFinal })),
            builder.build(),
        )
        .unwrap();
        let reduced = nfa.remove_lambda_steps().unwrap();
        assert_eq!(reduced.size(), 2);
        assert_eq!(reduced.labels(), &[StateTag::NotFinal, StateTag::FinalDummy]);
        assert_eq!(
            reduced.graph().edge_marker(1, 1).unwrap(),
            Some(&EdgeMarker::Symbols(SymbolSet::singleton(1)))
        );
        for w in words(&[0, 1], 5) {
            assert_eq!(nfa.accepts(&w).unwrap(), reduced.accepts(&w).unwrap());
        }
    }

    #[test]
    fn empty_symbol_marker_is_eliminated_like_lambda() {
        let mut builder = StateGraphBuilder::new(2, 2).unwrap();
        builder
            .set_marker(0, 1, EdgeMarker::Symbols(SymbolSet::empty()))
            .unwrap();
        let nfa = Nfa::new(
            2,
            2,
            0,
            [(0, StateTag::NotFinal), (1, StateTag::FinalDummy)],
            builder.build(),
        )
        .unwrap();
        let reduced = nfa.remove_lambda_steps().unwrap();
        assert!(!reduced.graph().has_lambda_edges());
        assert_eq!(reduced.labels(), &[StateTag::FinalDummy]);
        assert_eq!(reduced.remove_lambda_steps().unwrap(), reduced);
        for w in words(&[0, 1], 3) {
            assert_eq!(nfa.accepts(&w).unwrap(), reduced.accepts(&w).unwrap(), "{w:?}");
        }
    }

    #[test_log::test]
    fn elimination_is_idempotent_and_preserves_tags() {
        let (lexer, _) = operators_and_identifiers();
        let reduced = lexer.remove_lambda_steps().unwrap();
        assert!(!reduced.graph().has_lambda_edges());
        assert_eq!(reduced.remove_lambda_steps().unwrap(), reduced);

        let symbols = ['+', 'i', 'f', 'x'].map(|c| c as Symbol);
        for w in words(&symbols, 4) {
            assert_eq!(lexer.accepts(&w).unwrap(), reduced.accepts(&w).unwrap(), "{w:?}");
        }
        let tags = reduced.reached_tags(&['i' as Symbol, 'f' as Symbol]).unwrap();
        assert!(!tags.is_empty());
    }
}
