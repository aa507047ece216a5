//! Finite automata for lexical scanner generation.
//!
//! The crate implements the automaton pipeline that sits underneath a scanner generator. Token
//! definitions are assembled as nondeterministic automata ([`Nfa`]) from a handful of primitive
//! languages and the algebraic operations union, concatenation, iteration and bounded repetition.
//! Every state of every automaton carries exactly one [`StateTag`], which is either
//! [`StateTag::NotFinal`], the anonymous accepting tag [`StateTag::FinalDummy`] or a caller
//! defined [`StateTag::Token`].
//!
//! From there, data flows strictly forward and every stage produces a fresh immutable value:
//! - [`Nfa::remove_lambda_steps`] eliminates epsilon (lambda) edges,
//! - [`Nfa::determinize`] runs the subset construction and resolves conflicting tags through
//!   caller supplied [`Priorities`] (the smallest rank wins),
//! - [`Dfa::minimize`] merges indistinguishable states without ever merging different tags,
//! - [`Dfa::compress`] collapses the (potentially huge) raw alphabet into classes of symbols that
//!   behave identically everywhere, described by an [`EquivalenceMap`],
//! - [`Recognizer::new`] strips the drain state and exposes the single step
//!   [`Recognizer::transition`] that a scanner driver calls in its loop.
//!
//! Mutable construction is confined to [`StateGraphBuilder`]; calling
//! [`StateGraphBuilder::build`] copies its contents into an immutable [`StateGraph`].
//!
//! ```
//! use scanner_automata::prelude::*;
//!
//! let a_plus = Nfa::single_symbol_language(256, 'a' as Symbol)?.positive_iteration()?;
//! let recognizer = Recognizer::from_nfa(&a_plus, &Priorities::from_precedence([]))?;
//!
//! let mut state = recognizer.initial_state();
//! for symbol in "aaa".chars() {
//!     state = recognizer.transition(state, symbol as Symbol);
//! }
//! assert_eq!(recognizer.state_tag(state), StateTag::FinalDummy);
//! assert_eq!(recognizer.transition(state, END_OF_INPUT), DEAD_END_STATE);
//! # Ok::<(), scanner_automata::Error>(())
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use scanner_automata::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{coarse_symbol_class_map, EquivalenceMap, SymbolSet},
        dfa::{Dfa, TransitionTable},
        dot::Dottable,
        graph::{EdgeMarker, StateGraph, StateGraphBuilder},
        nfa::Nfa,
        recognizer::Recognizer,
        render::RenderOptions,
        tag::{Priorities, Rank, StateTag},
        Error, Result, Show, StateIndex, Symbol, DEAD_END_STATE, END_OF_INPUT,
        UNICODE_ALPHABET_SIZE,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the
/// crate and do not really fit to the top level.
pub mod math;

mod error;
pub use error::{Error, Result};

/// Symbol sets and equivalence maps over (compressed) alphabets.
pub mod alphabet;
pub use alphabet::{EquivalenceMap, SymbolSet};

/// State tags and the priority ranks used to resolve conflicts between them.
pub mod tag;
pub use tag::{Priorities, StateTag};

/// The edge relation of nondeterministic automata, a mutable builder and its frozen form.
pub mod graph;
pub use graph::{EdgeMarker, StateGraph, StateGraphBuilder};

/// Nondeterministic automata, their algebra and epsilon elimination.
pub mod nfa;
pub use nfa::Nfa;

/// Deterministic automata with total transition tables, determinization, minimization
/// and alphabet compression.
pub mod dfa;
pub use dfa::{Dfa, TransitionTable};

/// The runtime table consumed by a scanner driver.
pub mod recognizer;
pub use recognizer::Recognizer;

/// Options for the textual and graphviz renderings of automata.
pub mod render;

/// Graphviz (DOT) representation of automata.
pub mod dot;

/// Implements the generation of random automata.
#[cfg(feature = "random")]
pub mod random;

/// A symbol is an index into an alphabet `[0, alphabet_size)`. Raw symbols (for example
/// unicode code points) and compressed equivalence classes share this representation.
pub type Symbol = u32;

/// States of all automata in this crate are numbered densely from zero.
pub type StateIndex = usize;

/// Sentinel symbol signalling the end of input. It lies outside of every alphabet.
pub const END_OF_INPUT: Symbol = Symbol::MAX;

/// Returned by [`Recognizer::transition`] once no further progress is possible.
pub const DEAD_END_STATE: StateIndex = StateIndex::MAX;

/// Number of unicode code points, `0..=0x10FFFF`.
pub const UNICODE_ALPHABET_SIZE: usize = 0x11_0000;

/// Helper trait which can be used to display states, symbol sets and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should be
    /// for example q0, q1, q2, ... Just use something that makes sense. This is mainly used
    /// for debugging purposes.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this should be
    /// {q0, q1, q2, ...}.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!(
            "{{{}}}",
            itertools::Itertools::join(&mut iter.into_iter().map(|x| x.show()), ", ")
        )
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for Symbol {
    fn show(&self) -> String {
        render::default_interpretation(*self)
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}
