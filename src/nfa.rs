use std::collections::{BTreeSet, VecDeque};
use std::fmt::Display;

use bit_set::BitSet;
use itertools::Itertools;
use tracing::error;

use crate::{
    alphabet::is_subtractive,
    error::{check_alphabet_size, check_state, check_symbol},
    math::Map,
    render::RenderOptions,
    Error, Result, StateGraph, StateGraphBuilder, StateIndex, StateTag, Symbol, SymbolSet,
};

mod algebra;
mod lambda;

/// A nondeterministic finite automaton whose states are `[0, size)`. Every state carries a
/// [`StateTag`] and pairs of states are connected by at most one edge, see [`StateGraph`].
///
/// Values of this type are immutable, every operation produces a new automaton with its own
/// freshly numbered states.
///
/// # Example
/// ```
/// use scanner_automata::prelude::*;
///
/// let ab = Nfa::word_language(128, &['a' as Symbol, 'b' as Symbol])?;
/// let c = Nfa::single_symbol_language(128, 'c' as Symbol)?;
/// let nfa = ab.union(&c)?.iteration()?;
/// assert!(nfa.accepts(&[])?);
/// assert!(nfa.accepts(&['a' as Symbol, 'b' as Symbol, 'c' as Symbol])?);
/// assert!(!nfa.accepts(&['a' as Symbol])?);
/// # Ok::<(), scanner_automata::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    initial: StateIndex,
    labels: Vec<StateTag>,
    graph: StateGraph,
}

impl Nfa {
    /// Creates an automaton after validating that the dimensions agree, that `initial_state`
    /// exists and that every state receives exactly one label.
    pub fn new<L>(
        number_of_states: usize,
        alphabet_size: usize,
        initial_state: StateIndex,
        labels: L,
        graph: StateGraph,
    ) -> Result<Self>
    where
        L: IntoIterator<Item = (StateIndex, StateTag)>,
    {
        if number_of_states == 0 {
            return Err(Error::InvalidStateCount);
        }
        check_alphabet_size(alphabet_size)?;
        if graph.size() != number_of_states {
            error!(
                "graph has {} states, automaton has {number_of_states}",
                graph.size()
            );
            return Err(Error::DimensionMismatch {
                what: "number of graph states",
                expected: number_of_states,
                found: graph.size(),
            });
        }
        if graph.alphabet_size() != alphabet_size {
            return Err(Error::DimensionMismatch {
                what: "graph alphabet size",
                expected: alphabet_size,
                found: graph.alphabet_size(),
            });
        }
        let mut given: Map<StateIndex, StateTag> = Map::default();
        for (state, tag) in labels {
            check_state(state, number_of_states)?;
            given.insert(state, tag);
        }
        let labels = (0..number_of_states)
            .map(|state| given.get(&state).copied().ok_or(Error::MissingLabel(state)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_parts(initial_state, labels, graph)
    }

    /// Assembles an automaton from a label per state, checking the remaining invariants.
    pub(crate) fn from_parts(
        initial: StateIndex,
        labels: Vec<StateTag>,
        graph: StateGraph,
    ) -> Result<Self> {
        if labels.len() != graph.size() {
            return Err(Error::DimensionMismatch {
                what: "number of labels",
                expected: graph.size(),
                found: labels.len(),
            });
        }
        if initial >= labels.len() {
            error!("initial state {initial} does not exist");
            return Err(Error::InitialStateOutOfRange {
                initial,
                size: labels.len(),
            });
        }
        Ok(Self {
            initial,
            labels,
            graph,
        })
    }

    /// The automaton with a single, non accepting state.
    pub fn empty_language(alphabet_size: usize) -> Result<Self> {
        Self::from_parts(
            0,
            vec![StateTag::NotFinal],
            StateGraph::without_edges(1, alphabet_size)?,
        )
    }

    /// The automaton accepting only the empty word, it consists of a single accepting state.
    pub fn empty_string_language(alphabet_size: usize) -> Result<Self> {
        Self::from_parts(
            0,
            vec![StateTag::FinalDummy],
            StateGraph::without_edges(1, alphabet_size)?,
        )
    }

    /// The automaton accepting precisely the word consisting of `symbol`.
    pub fn single_symbol_language(alphabet_size: usize, symbol: Symbol) -> Result<Self> {
        Self::symbol_set_language(alphabet_size, SymbolSet::singleton(symbol))
    }

    /// The automaton accepting every word of length one whose symbol is in `symbols`. The
    /// set must not be empty.
    pub fn symbol_set_language(alphabet_size: usize, symbols: SymbolSet) -> Result<Self> {
        if symbols.is_empty() {
            return Err(Error::DimensionMismatch {
                what: "number of accepted symbols",
                expected: 1,
                found: 0,
            });
        }
        let mut builder = StateGraphBuilder::new(2, alphabet_size)?;
        builder.set_edge(0, 1, symbols)?;
        Self::from_parts(
            0,
            vec![StateTag::NotFinal, StateTag::FinalDummy],
            builder.build(),
        )
    }

    /// The automaton accepting only `word`, built as a chain of `word.len() + 1` states.
    pub fn word_language(alphabet_size: usize, word: &[Symbol]) -> Result<Self> {
        let mut builder = StateGraphBuilder::new(word.len() + 1, alphabet_size)?;
        for (i, &symbol) in word.iter().enumerate() {
            builder.add_symbol_to_edge(i, i + 1, symbol)?;
        }
        let mut labels = vec![StateTag::NotFinal; word.len() + 1];
        labels[word.len()] = StateTag::FinalDummy;
        Self::from_parts(0, labels, builder.build())
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Size of the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.graph.alphabet_size()
    }

    /// The initial state.
    pub fn initial_state(&self) -> StateIndex {
        self.initial
    }

    /// The edge relation.
    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// The tags of all states, indexed by state.
    pub fn labels(&self) -> &[StateTag] {
        &self.labels
    }

    /// Returns the tag of `state`.
    pub fn state_tag(&self, state: StateIndex) -> Result<StateTag> {
        check_state(state, self.size())?;
        Ok(self.labels[state])
    }

    /// Returns all states whose tag is not [`StateTag::NotFinal`] in ascending order.
    pub fn accepting_states(&self) -> Vec<StateIndex> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(state, tag)| tag.is_final().then_some(state))
            .collect()
    }

    /// Replaces the labels of all states, every state has to be covered by `labels`.
    pub fn relabel_states<L>(&self, labels: L) -> Result<Self>
    where
        L: IntoIterator<Item = (StateIndex, StateTag)>,
    {
        Self::new(
            self.size(),
            self.alphabet_size(),
            self.initial,
            labels,
            self.graph.clone(),
        )
    }

    /// Gives every accepting state the tag `tag`. This is how the accepting states of an
    /// automaton assembled from primitives are assigned a token kind.
    pub fn set_all_final_states_to(&self, tag: StateTag) -> Self {
        Self {
            initial: self.initial,
            labels: self
                .labels
                .iter()
                .map(|old| if old.is_final() { tag } else { *old })
                .collect(),
            graph: self.graph.clone(),
        }
    }

    /// Collects the states reachable from `states` through lambda edges (including `states`
    /// themselves) in breadth first order.
    pub fn lambda_closure<I>(&self, states: I) -> Vec<StateIndex>
    where
        I: IntoIterator<Item = StateIndex>,
    {
        let mut visited = BitSet::with_capacity(self.size());
        let mut queue = VecDeque::new();
        for state in states {
            if state < self.size() && visited.insert(state) {
                queue.push_back(state);
            }
        }
        let mut order = Vec::with_capacity(queue.len());
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for (to, marker) in self.graph.targets(current) {
                if marker.is_lambda() && visited.insert(to) {
                    queue.push_back(to);
                }
            }
        }
        order
    }

    /// Returns the states reachable by consuming exactly `symbol` from one of `states`.
    fn step(&self, states: &[StateIndex], symbol: Symbol) -> BTreeSet<StateIndex> {
        states
            .iter()
            .flat_map(|&state| self.graph.targets(state))
            .filter_map(|(to, marker)| marker.consumes(symbol).then_some(to))
            .collect()
    }

    /// Computes the set of states the automaton may be in after reading `word`, taking
    /// lambda edges into account.
    pub fn reached_states(&self, word: &[Symbol]) -> Result<BTreeSet<StateIndex>> {
        let mut current = self.lambda_closure([self.initial]);
        for &symbol in word {
            check_symbol(symbol, self.alphabet_size())?;
            current = self.lambda_closure(self.step(&current, symbol));
        }
        Ok(current.into_iter().collect())
    }

    /// Returns the tags of all accepting states that can be reached by reading `word`.
    pub fn reached_tags(&self, word: &[Symbol]) -> Result<BTreeSet<StateTag>> {
        Ok(self
            .reached_states(word)?
            .into_iter()
            .map(|state| self.labels[state])
            .filter(StateTag::is_final)
            .collect())
    }

    /// Returns true if `word` leads to some accepting state.
    pub fn accepts(&self, word: &[Symbol]) -> Result<bool> {
        Ok(!self.reached_tags(word)?.is_empty())
    }

    /// Collects, in ascending order, the symbols that individually matter for this automaton:
    /// every symbol of every edge marker, except that for markers containing almost the whole
    /// alphabet (see [`crate::alphabet::SUBTRACTIVE_LIMIT`]) the missing symbols are taken.
    pub fn mentioned_symbols(&self) -> Vec<Symbol> {
        let alphabet_size = self.alphabet_size();
        let mut mentioned = SymbolSet::empty();
        for set in self.graph.edges().filter_map(|(_, _, marker)| marker.symbols()) {
            if is_subtractive(set, alphabet_size) {
                mentioned.extend_from(&set.complement(alphabet_size));
            } else {
                mentioned.extend_from(set);
            }
        }
        mentioned.iter().collect()
    }

    /// Renders the automaton as a list of rules, one per edge.
    pub fn show_with(&self, options: &RenderOptions) -> String {
        let mut lines = vec![
            format!(
                "Alphabet: {} - {}",
                options.symbol(0),
                options.symbol((self.alphabet_size() - 1) as Symbol)
            ),
            format!("States: q_0 - q_{}", self.size() - 1),
            format!("Initial state: q_{}", self.initial),
            format!(
                "Accepting states: {{{}}}",
                self.accepting_states()
                    .into_iter()
                    .map(|state| format!("q_{state}: {}", self.labels[state]))
                    .join(", ")
            ),
            "Rules:".to_string(),
        ];
        for (from, to, marker) in self.graph.edges() {
            lines.push(format!(
                "\tq_{from} {} --> q_{to}",
                marker.show_with(options)
            ));
        }
        lines.join("\n")
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show_with(&RenderOptions::default()))
    }
}
