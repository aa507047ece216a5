use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{math::Map, Dfa, Nfa, Priorities, Result, Show, StateIndex, Symbol, TransitionTable};

impl Nfa {
    /// Splits `[0, alphabet_size)` into maximal segments on which the image of `superstate`
    /// does not change and returns every segment as `(first, last, image)`. The images are
    /// sorted and free of duplicates.
    fn segment_images(&self, superstate: &[StateIndex]) -> Vec<(Symbol, Symbol, Vec<StateIndex>)> {
        let alphabet_size = self.alphabet_size() as u64;
        let edges = superstate
            .iter()
            .flat_map(|&state| self.graph().targets(state))
            .filter_map(|(to, marker)| marker.symbols().map(|set| (to, set)))
            .collect_vec();

        let mut cuts = vec![0u64, alphabet_size];
        for (_, set) in &edges {
            for &(lo, hi) in set.ranges() {
                cuts.push(lo as u64);
                cuts.push(hi as u64 + 1);
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        cuts.into_iter()
            .filter(|&cut| cut <= alphabet_size)
            .tuple_windows()
            .map(|(start, end)| {
                let first = start as Symbol;
                let image: BTreeSet<StateIndex> = edges
                    .iter()
                    .filter(|(_, set)| set.contains(first))
                    .map(|&(to, _)| to)
                    .collect();
                (first, (end - 1) as Symbol, image.into_iter().collect())
            })
            .collect()
    }

    /// Runs the subset construction on the lambda free version of `self` (see
    /// [`Nfa::remove_lambda_steps`]).
    ///
    /// Subsets of states are named in the order in which they are discovered, starting with
    /// the singleton of the initial state as `0` and exploring the symbols of each subset in
    /// ascending order. Every subset is tagged with the tag of smallest rank among its members,
    /// the empty subset is tagged [`crate::StateTag::NotFinal`]. Fails if some tag of the
    /// automaton has no rank in `priorities`.
    ///
    /// # Example
    /// ```
    /// use scanner_automata::prelude::*;
    ///
    /// let a = Nfa::single_symbol_language(3, 0)?;
    /// let b = Nfa::single_symbol_language(3, 1)?;
    /// let dfa = a.union(&b)?.determinize(&Priorities::from_precedence([]))?;
    /// assert!(dfa.accepts(&[0])? && dfa.accepts(&[1])?);
    /// assert!(!dfa.accepts(&[])? && !dfa.accepts(&[0, 1])? && !dfa.accepts(&[2])?);
    /// # Ok::<(), scanner_automata::Error>(())
    /// ```
    pub fn determinize(&self, priorities: &Priorities) -> Result<Dfa> {
        let nfa = self.remove_lambda_steps()?;
        for &tag in nfa.labels().iter().unique() {
            priorities.rank(tag)?;
        }

        let initial = vec![nfa.initial_state()];
        let mut names: Map<Vec<StateIndex>, StateIndex> = Map::default();
        names.insert(initial.clone(), 0);
        let mut superstates = vec![initial];
        let mut rows = Vec::new();

        let mut current = 0;
        while current < superstates.len() {
            let mut row = Vec::with_capacity(nfa.alphabet_size());
            for (first, last, image) in nfa.segment_images(&superstates[current]) {
                let target = match names.get(&image) {
                    Some(&name) => name,
                    None => {
                        let name = superstates.len();
                        trace!("discovered superstate {name} = {}", image.show());
                        names.insert(image.clone(), name);
                        superstates.push(image);
                        name
                    }
                };
                row.extend(std::iter::repeat(target).take((last - first) as usize + 1));
            }
            rows.push(row);
            current += 1;
        }

        let labels = superstates
            .iter()
            .map(|members| priorities.best_of(members.iter().map(|&state| nfa.labels()[state])))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "determinized {} states into {} superstates",
            nfa.size(),
            superstates.len()
        );
        Dfa::new(0, labels, TransitionTable::from_rows(rows)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{operators_and_identifiers, words};

    #[test_log::test]
    fn a_plus_subsets() {
        let a_plus = Nfa::single_symbol_language(256, 'a' as Symbol)
            .and_then(|a| a.positive_iteration())
            .unwrap();
        let priorities = Priorities::new([(StateTag::NotFinal, 0), (StateTag::FinalDummy, 1)]);
        let dfa = a_plus.determinize(&priorities).unwrap();
        // {0}, {}, {1}, {2}
        assert_eq!(dfa.size(), 4);
        assert_eq!(
            dfa.labels(),
            &[
                StateTag::NotFinal,
                StateTag::NotFinal,
                StateTag::FinalDummy,
                StateTag::FinalDummy
            ]
        );
        assert_eq!(dfa.transition(0, 'b' as Symbol).unwrap(), 1);
        assert_eq!(dfa.transition(0, 'a' as Symbol).unwrap(), 2);
        assert_eq!(dfa.transition(2, 'a' as Symbol).unwrap(), 3);
        assert_eq!(dfa.transition(3, 'a' as Symbol).unwrap(), 3);
        assert!((0..256).all(|s| dfa.transition(1, s).unwrap() == 1));
    }

    #[test]
    fn smallest_rank_wins() {
        let first = Nfa::single_symbol_language(4, 0)
            .unwrap()
            .set_all_final_states_to(StateTag::Token(1));
        let second = Nfa::symbol_set_language(4, SymbolSet::range(0, 1))
            .unwrap()
            .set_all_final_states_to(StateTag::Token(2));
        let both = first.union(&second).unwrap();

        let dfa = both
            .determinize(&Priorities::from_precedence([StateTag::Token(1), StateTag::Token(2)]))
            .unwrap();
        assert_eq!(dfa.reached_tag(&[0]).unwrap(), StateTag::Token(1));
        assert_eq!(dfa.reached_tag(&[1]).unwrap(), StateTag::Token(2));

        let dfa = both
            .determinize(&Priorities::from_precedence([StateTag::Token(2), StateTag::Token(1)]))
            .unwrap();
        assert_eq!(dfa.reached_tag(&[0]).unwrap(), StateTag::Token(2));
    }

    #[test]
    fn missing_priority_is_reported() {
        let token = Nfa::single_symbol_language(4, 0)
            .unwrap()
            .set_all_final_states_to(StateTag::Token(9));
        assert_eq!(
            token.determinize(&Priorities::from_precedence([])),
            Err(Error::MissingPriority(StateTag::Token(9)))
        );
    }

    #[test_log::test]
    fn lexer_is_deterministic_and_language_preserving() {
        let (lexer, priorities) = operators_and_identifiers();
        let dfa = lexer.determinize(&priorities).unwrap();
        assert_eq!(dfa.alphabet_size(), 128);
        assert_eq!(dfa.table().number_of_states(), dfa.size());

        let symbols = ['+', 'i', 'f', 'z', '0'].map(|c| c as Symbol);
        for w in words(&symbols, 4) {
            let expected = lexer
                .reached_tags(&w)
                .unwrap()
                .into_iter()
                .min_by_key(|&tag| priorities.rank(tag).unwrap())
                .unwrap_or(StateTag::NotFinal);
            assert_eq!(dfa.reached_tag(&w).unwrap(), expected, "{w:?}");
        }
        let keyword = ['i' as Symbol, 'f' as Symbol];
        assert_eq!(dfa.reached_tag(&keyword).unwrap(), StateTag::Token(1));
        assert_eq!(dfa.reached_tag(&keyword[..1]).unwrap(), StateTag::Token(2));
    }
}
