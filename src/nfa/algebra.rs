use tracing::{error, trace};

use crate::{Error, Nfa, Result, StateGraphBuilder, StateTag};

impl Nfa {
    fn check_alphabet(&self, other: &Nfa) -> Result<()> {
        if self.alphabet_size() != other.alphabet_size() {
            error!(
                "cannot combine automata over alphabets of size {} and {}",
                self.alphabet_size(),
                other.alphabet_size()
            );
            return Err(Error::AlphabetMismatch {
                left: self.alphabet_size(),
                right: other.alphabet_size(),
            });
        }
        Ok(())
    }

    /// Accepts the words accepted by `self` or by `other`. The states of `self` keep their
    /// indices, those of `other` are shifted behind them and a fresh initial state with
    /// lambda edges into both old initial states comes last.
    pub fn union(&self, other: &Nfa) -> Result<Nfa> {
        self.check_alphabet(other)?;
        let offset = self.size();
        let initial = offset + other.size();

        let mut builder = StateGraphBuilder::new(initial + 1, self.alphabet_size())?;
        builder.embed(self.graph(), 0)?;
        builder.embed(other.graph(), offset)?;
        builder.set_lambda_edge(initial, self.initial_state())?;
        builder.set_lambda_edge(initial, other.initial_state() + offset)?;

        let labels = self
            .labels()
            .iter()
            .chain(other.labels())
            .copied()
            .chain([StateTag::NotFinal])
            .collect();
        trace!("union of {} and {} states", self.size(), other.size());
        Nfa::from_parts(initial, labels, builder.build())
    }

    /// Accepts every word that splits into a word accepted by `self` followed by one accepted
    /// by `other`. The accepting states of `self` lose their tags and are linked to the
    /// initial state of `other` by lambda edges.
    pub fn concatenation(&self, other: &Nfa) -> Result<Nfa> {
        self.check_alphabet(other)?;
        let offset = self.size();

        let mut builder = StateGraphBuilder::new(offset + other.size(), self.alphabet_size())?;
        builder.embed(self.graph(), 0)?;
        builder.embed(other.graph(), offset)?;
        for state in self.accepting_states() {
            builder.set_lambda_edge(state, other.initial_state() + offset)?;
        }

        let labels = std::iter::repeat(StateTag::NotFinal)
            .take(offset)
            .chain(other.labels().iter().copied())
            .collect();
        trace!("concatenation of {} and {} states", self.size(), other.size());
        Nfa::from_parts(self.initial_state(), labels, builder.build())
    }

    /// Accepts any number of repetitions of words accepted by `self`, including none.
    ///
    /// A fresh initial state is added behind the existing ones. It has a lambda edge into the
    /// old initial state and every accepting state gets a lambda edge back to it. To accept the
    /// empty word, the fresh state carries the tag of the first accepting state. If `self`
    /// accepts nothing, the result is [`Nfa::empty_string_language`].
    pub fn iteration(&self) -> Result<Nfa> {
        let accepting = self.accepting_states();
        let Some(&first) = accepting.first() else {
            return Nfa::empty_string_language(self.alphabet_size());
        };
        let initial = self.size();

        let mut builder = StateGraphBuilder::new(initial + 1, self.alphabet_size())?;
        builder.embed(self.graph(), 0)?;
        builder.set_lambda_edge(initial, self.initial_state())?;
        for &state in &accepting {
            builder.set_lambda_edge(state, initial)?;
        }

        let mut labels = self.labels().to_vec();
        labels.push(self.labels()[first]);
        Nfa::from_parts(initial, labels, builder.build())
    }

    /// Accepts one or more repetitions, that is the concatenation of `self` with its
    /// [`Nfa::iteration`].
    pub fn positive_iteration(&self) -> Result<Nfa> {
        self.concatenation(&self.iteration()?)
    }

    /// Accepts exactly `n` repetitions. For `n == 0` this is the empty string language,
    /// otherwise `self` is concatenated with itself `n - 1` times, associating to the left.
    pub fn power(&self, n: usize) -> Result<Nfa> {
        if n == 0 {
            return Nfa::empty_string_language(self.alphabet_size());
        }
        let mut result = self.clone();
        for _ in 1..n {
            result = result.concatenation(self)?;
        }
        Ok(result)
    }

    /// Accepts the words of `self` and the empty word.
    pub fn optional(&self) -> Result<Nfa> {
        self.union(&Nfa::empty_string_language(self.alphabet_size())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::words;

    fn a() -> Nfa {
        Nfa::single_symbol_language(4, 0).unwrap()
    }

    fn b() -> Nfa {
        Nfa::single_symbol_language(4, 1).unwrap()
    }

    #[test]
    fn union_structure() {
        let union = a().union(&b()).unwrap();
        assert_eq!(union.size(), 5);
        assert_eq!(union.initial_state(), 4);
        assert!(union.graph().is_lambda_edge(4, 0).unwrap());
        assert!(union.graph().is_lambda_edge(4, 2).unwrap());
        assert!(union.graph().is_non_trivial_edge(2, 3).unwrap());
        assert_eq!(union.labels()[3], StateTag::FinalDummy);
        assert_eq!(union.labels()[4], StateTag::NotFinal);
    }

    #[test]
    fn union_of_single_symbols() {
        let union = a().union(&b()).unwrap();
        assert!(union.accepts(&[0]).unwrap());
        assert!(union.accepts(&[1]).unwrap());
        for rejected in [vec![], vec![0, 1], vec![2]] {
            assert!(!union.accepts(&rejected).unwrap());
        }
    }

    #[test]
    fn concatenation_discards_left_tags() {
        let left = a().set_all_final_states_to(StateTag::Token(1));
        let right = b().set_all_final_states_to(StateTag::Token(2));
        let ab = left.concatenation(&right).unwrap();
        assert_eq!(ab.size(), 4);
        assert_eq!(ab.initial_state(), 0);
        assert_eq!(
            ab.labels(),
            &[
                StateTag::NotFinal,
                StateTag::NotFinal,
                StateTag::NotFinal,
                StateTag::Token(2)
            ]
        );
        assert!(ab.graph().is_lambda_edge(1, 2).unwrap());
        assert!(ab.accepts(&[0, 1]).unwrap());
        assert!(!ab.accepts(&[0]).unwrap() && !ab.accepts(&[1]).unwrap());
    }

    #[test]
    fn iteration_languages() {
        let star = a().concatenation(&b()).unwrap().iteration().unwrap();
        for w in words(&[0, 1], 6) {
            let expected = w.len() % 2 == 0 && w.chunks(2).all(|c| c == [0, 1]);
            assert_eq!(star.accepts(&w).unwrap(), expected, "{w:?}");
        }
        let empty = Nfa::empty_language(4).unwrap().iteration().unwrap();
        assert_eq!(empty, Nfa::empty_string_language(4).unwrap());
    }

    #[test]
    fn iteration_does_not_skip_prefixes() {
        // accepts "a" and "ab", the accepting state after "a" has an outgoing edge
        let mut builder = StateGraphBuilder::new(3, 4).unwrap();
        builder.add_symbol_to_edge(0, 1, 0).unwrap();
        builder.add_symbol_to_edge(1, 2, 1).unwrap();
        let nfa = Nfa::new(
            3,
            4,
            0,
            [
                (0, StateTag::NotFinal),
                (1, StateTag::FinalDummy),
                (2, StateTag::FinalDummy),
            ],
            builder.build(),
        )
        .unwrap();
        let star = nfa.iteration().unwrap();
        assert!(star.accepts(&[]).unwrap());
        assert!(star.accepts(&[0, 1, 0]).unwrap());
        assert!(!star.accepts(&[1]).unwrap());
        assert!(!star.accepts(&[0, 1, 1]).unwrap());
    }

    #[test]
    fn powers_and_options() {
        let a = a();
        assert_eq!(a.power(0).unwrap(), Nfa::empty_string_language(4).unwrap());
        assert_eq!(a.power(1).unwrap(), a);
        let three = a.power(3).unwrap();
        for n in 0..6 {
            assert_eq!(three.accepts(&vec![0; n]).unwrap(), n == 3);
        }
        let plus = a.positive_iteration().unwrap();
        assert!(!plus.accepts(&[]).unwrap());
        assert!((1..6).all(|n| plus.accepts(&vec![0; n]).unwrap()));
        let maybe = a.optional().unwrap();
        assert!(maybe.accepts(&[]).unwrap() && maybe.accepts(&[0]).unwrap());
        assert!(!maybe.accepts(&[0, 0]).unwrap());
    }

    #[test]
    fn operands_are_left_untouched() {
        let left = a();
        let right = b();
        let (left_copy, right_copy) = (left.clone(), right.clone());
        let _ = left.union(&right).unwrap().iteration().unwrap();
        let _ = left.concatenation(&right).unwrap();
        assert_eq!(left, left_copy);
        assert_eq!(right, right_copy);
    }

    #[test]
    fn alphabet_mismatch_is_rejected() {
        let other = Nfa::single_symbol_language(5, 0).unwrap();
        assert_eq!(
            a().union(&other),
            Err(Error::AlphabetMismatch { left: 4, right: 5 })
        );
        assert!(a().concatenation(&other).unwrap_err().is_configuration());
    }
}
