//! Benchmarks the stages of the automaton pipeline on random automata and on a small lexer
//! over the full unicode alphabet.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use scanner_automata::prelude::*;
use scanner_automata::random::{generate_random_nfa, generate_random_words, RandomNfaOptions};

fn random_nfa(size: usize) -> Nfa {
    let options = RandomNfaOptions {
        alphabet_size: 64,
        size,
        density: 0.2,
        accepting: 0.2,
        tags: vec![StateTag::Token(0), StateTag::Token(1)],
    };
    generate_random_nfa(&mut fastrand::Rng::with_seed(size as u64), &options).unwrap()
}

fn priorities() -> Priorities {
    Priorities::from_precedence([StateTag::Token(0), StateTag::Token(1)])
}

/// Identifiers over ascii letters and digits, the keyword `let` and whitespace.
fn unicode_lexer() -> (Nfa, Priorities) {
    let size = UNICODE_ALPHABET_SIZE;
    let letter = SymbolSet::range('a' as Symbol, 'z' as Symbol)
        .union(&SymbolSet::range('A' as Symbol, 'Z' as Symbol));
    let mut alphanumeric = letter.clone();
    alphanumeric.insert_range('0' as Symbol, '9' as Symbol);

    let identifier = Nfa::symbol_set_language(size, letter)
        .and_then(|first| {
            Nfa::symbol_set_language(size, alphanumeric)?
                .iteration()
                .and_then(|rest| first.concatenation(&rest))
        })
        .unwrap()
        .set_all_final_states_to(StateTag::Token(1));
    let keyword = Nfa::word_language(size, &['l' as Symbol, 'e' as Symbol, 't' as Symbol])
        .unwrap()
        .set_all_final_states_to(StateTag::Token(0));
    let whitespace = Nfa::symbol_set_language(size, SymbolSet::from_iter([' ' as Symbol, '\n' as Symbol]))
        .and_then(|w| w.positive_iteration())
        .unwrap()
        .set_all_final_states_to(StateTag::Token(2));
    let lexer = keyword
        .union(&identifier)
        .and_then(|l| l.union(&whitespace))
        .unwrap();
    (
        lexer,
        Priorities::from_precedence([StateTag::Token(0), StateTag::Token(1), StateTag::Token(2)]),
    )
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/random");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for size in [4, 8, 16] {
        let nfa = random_nfa(size);
        let priorities = priorities();
        group.bench_with_input(BenchmarkId::new("remove_lambda_steps", size), &nfa, |b, nfa| {
            b.iter(|| nfa.remove_lambda_steps().unwrap())
        });
        let lambda_free = nfa.remove_lambda_steps().unwrap();
        group.bench_with_input(BenchmarkId::new("determinize", size), &lambda_free, |b, nfa| {
            b.iter(|| nfa.determinize(&priorities).unwrap())
        });
        let dfa = lambda_free.determinize(&priorities).unwrap();
        group.bench_with_input(BenchmarkId::new("minimize", size), &dfa, |b, dfa| {
            b.iter(|| dfa.minimize().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("recognizer", size), &nfa, |b, nfa| {
            b.iter(|| Recognizer::from_nfa(nfa, &priorities).unwrap())
        });
    }
    group.finish();
}

fn bench_unicode(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/unicode");
    // every state owns a row of 0x110000 cells before compression
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(10));

    let (lexer, priorities) = unicode_lexer();
    group.bench_function("recognizer", |b| {
        b.iter(|| Recognizer::from_nfa(&lexer, &priorities).unwrap())
    });

    let recognizer = Recognizer::from_nfa(&lexer, &priorities).unwrap();
    let words = generate_random_words(&mut fastrand::Rng::with_seed(0), 1000, 128, 1, 16);
    group.bench_function("transition", |b| {
        b.iter(|| {
            words
                .iter()
                .filter(|w| recognizer.state_tag(recognizer.run(w).unwrap()).is_final())
                .count()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_stages, bench_unicode);
criterion_main!(benches);
