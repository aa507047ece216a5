use tracing::debug;

use crate::prelude::*;

/// Share of generated edges that are lambda edges.
const LAMBDA_SHARE: f64 = 0.2;

/// Shape of the automata drawn by [`generate_random_nfa`].
#[derive(Debug, Clone)]
pub struct RandomNfaOptions {
    /// Size of the alphabet.
    pub alphabet_size: usize,
    /// Number of states.
    pub size: usize,
    /// Probability that a given pair of states is connected by an edge.
    pub density: f64,
    /// Probability that a state is accepting.
    pub accepting: f64,
    /// Tags handed to accepting states, [`StateTag::FinalDummy`] is used if this is empty.
    pub tags: Vec<StateTag>,
}

impl Default for RandomNfaOptions {
    fn default() -> Self {
        Self {
            alphabet_size: 4,
            size: 5,
            density: 0.3,
            accepting: 0.3,
            tags: vec![],
        }
    }
}

/// Draws a random automaton with state `0` as initial state. The algorithm is as follows:
/// 1. Start with `options.size` states and no edges.
/// 2. For every ordered pair of states, with probability `options.density` insert an edge.
///    A fifth of these edges are lambda edges, the others carry one to three random symbols.
/// 3. Every state becomes accepting with probability `options.accepting` and then receives a
///    tag drawn uniformly from `options.tags`.
///
/// Passing an [`fastrand::Rng`] created with [`fastrand::Rng::with_seed`] makes the result
/// reproducible.
pub fn generate_random_nfa(rng: &mut fastrand::Rng, options: &RandomNfaOptions) -> Result<Nfa> {
    let mut builder = StateGraphBuilder::new(options.size, options.alphabet_size)?;
    for from in 0..options.size {
        for to in 0..options.size {
            if rng.f64() >= options.density {
                continue;
            }
            if rng.f64() < LAMBDA_SHARE {
                builder.set_lambda_edge(from, to)?;
            } else {
                let count = rng.usize(1..=3);
                let symbols: SymbolSet = (0..count)
                    .map(|_| rng.u32(..options.alphabet_size as Symbol))
                    .collect();
                builder.set_edge(from, to, symbols)?;
            }
        }
    }

    let labels = (0..options.size).map(|state| {
        let tag = if rng.f64() >= options.accepting {
            StateTag::NotFinal
        } else if options.tags.is_empty() {
            StateTag::FinalDummy
        } else {
            options.tags[rng.usize(..options.tags.len())]
        };
        (state, tag)
    });
    let labels: Vec<_> = labels.collect();
    let graph = builder.build();
    debug!(
        "generated random automaton with {} states and {} edges",
        options.size,
        graph.edge_count()
    );
    Nfa::new(options.size, options.alphabet_size, 0, labels, graph)
}

/// Generate a random word over `[0, alphabet_size)` whose length is drawn uniformly from
/// `min_len..=max_len`.
pub fn generate_random_word(
    rng: &mut fastrand::Rng,
    alphabet_size: usize,
    min_len: usize,
    max_len: usize,
) -> Vec<Symbol> {
    let length = rng.usize(min_len..=max_len);
    (0..length)
        .map(|_| rng.u32(..alphabet_size as Symbol))
        .collect()
}

/// Generate `number` random words, see [`generate_random_word`].
pub fn generate_random_words(
    rng: &mut fastrand::Rng,
    number: usize,
    alphabet_size: usize,
    min_len: usize,
    max_len: usize,
) -> Vec<Vec<Symbol>> {
    (0..number)
        .map(|_| generate_random_word(rng, alphabet_size, min_len, max_len))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::words;

    fn options() -> RandomNfaOptions {
        RandomNfaOptions {
            tags: vec![StateTag::Token(0), StateTag::Token(1), StateTag::Token(2)],
            ..Default::default()
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_random_nfa(&mut fastrand::Rng::with_seed(7), &options()).unwrap();
        let second = generate_random_nfa(&mut fastrand::Rng::with_seed(7), &options()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.size(), 5);
        assert_eq!(first.alphabet_size(), 4);

        let mut rng = fastrand::Rng::with_seed(3);
        for word in generate_random_words(&mut rng, 20, 4, 1, 6) {
            assert!((1..=6).contains(&word.len()));
            assert!(word.iter().all(|&symbol| symbol < 4));
        }
    }

    #[test_log::test]
    fn pipeline_preserves_languages() {
        let priorities = Priorities::from_precedence([
            StateTag::Token(0),
            StateTag::Token(1),
            StateTag::Token(2),
        ]);
        let best = |tags: std::collections::BTreeSet<StateTag>| {
            tags.into_iter()
                .min_by_key(|&tag| priorities.rank(tag).unwrap())
                .unwrap_or(StateTag::NotFinal)
        };
        let all_words = words(&[0, 1, 2, 3], 4);

        for seed in 0..25 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let nfa = generate_random_nfa(&mut rng, &options()).unwrap();
            let lambda_free = nfa.remove_lambda_steps().unwrap();
            let dfa = lambda_free.determinize(&priorities).unwrap();
            let minimal = dfa.minimize().unwrap();
            let recognizer = Recognizer::from_nfa(&nfa, &priorities).unwrap();
            assert!(minimal.size() <= dfa.size());
            assert!(recognizer.number_of_states() <= minimal.size());

            for w in &all_words {
                let expected = best(lambda_free.reached_tags(w).unwrap());
                assert_eq!(expected.is_final(), nfa.accepts(w).unwrap(), "seed {seed}");
                assert_eq!(dfa.reached_tag(w).unwrap(), expected, "seed {seed}");
                assert_eq!(minimal.reached_tag(w).unwrap(), expected, "seed {seed}");
                let state = recognizer.run(w).unwrap();
                assert_eq!(recognizer.state_tag(state), expected, "seed {seed}, {w:?}");
            }
        }
    }
}
