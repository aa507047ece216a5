use std::fmt::Display;

use owo_colors::OwoColorize;
use tracing::error;

use crate::{
    error::{check_alphabet_size, check_state},
    render::RenderOptions,
    Error, Nfa, Result, StateGraphBuilder, StateIndex, StateTag, Symbol,
};

mod table;
pub use table::TransitionTable;

mod compress;
mod determinize;
mod minimize;

/// A deterministic finite automaton with a total transition function: every state has
/// exactly one successor for every symbol. Automata of this kind are produced by
/// [`Nfa::determinize`] and consumed by [`Dfa::minimize`], [`Dfa::compress`] and
/// [`crate::Recognizer::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    initial: StateIndex,
    labels: Vec<StateTag>,
    table: TransitionTable,
}

impl Dfa {
    /// Creates an automaton from a label per state and a total transition table, checking
    /// that dimensions agree and that every target exists.
    pub fn new(
        initial_state: StateIndex,
        labels: Vec<StateTag>,
        table: TransitionTable,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::InvalidStateCount);
        }
        check_alphabet_size(table.alphabet_size())?;
        if labels.len() != table.number_of_states() {
            return Err(Error::DimensionMismatch {
                what: "number of transition table rows",
                expected: labels.len(),
                found: table.number_of_states(),
            });
        }
        if initial_state >= labels.len() {
            return Err(Error::InitialStateOutOfRange {
                initial: initial_state,
                size: labels.len(),
            });
        }
        if let Some((state, symbol, target)) = table
            .cells()
            .find(|&(_, _, target)| target >= labels.len())
        {
            error!("transition ({state}, {symbol}) leads to missing state {target}");
            return Err(Error::StateOutOfRange {
                state: target,
                size: labels.len(),
            });
        }
        Ok(Self {
            initial: initial_state,
            labels,
            table,
        })
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Size of the alphabet, which is the number of table columns.
    pub fn alphabet_size(&self) -> usize {
        self.table.alphabet_size()
    }

    /// The initial state.
    pub fn initial_state(&self) -> StateIndex {
        self.initial
    }

    /// The tags of all states, indexed by state.
    pub fn labels(&self) -> &[StateTag] {
        &self.labels
    }

    /// The transition table.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the tag of `state`.
    pub fn state_tag(&self, state: StateIndex) -> Result<StateTag> {
        check_state(state, self.size())?;
        Ok(self.labels[state])
    }

    /// Returns the successor of `state` on `symbol`.
    pub fn transition(&self, state: StateIndex, symbol: Symbol) -> Result<StateIndex> {
        self.table.try_get(state, symbol)
    }

    /// Returns the state reached by reading `word` from the initial state.
    pub fn run(&self, word: &[Symbol]) -> Result<StateIndex> {
        word.iter()
            .try_fold(self.initial, |state, &symbol| self.transition(state, symbol))
    }

    /// Returns the tag of the state reached by reading `word`.
    pub fn reached_tag(&self, word: &[Symbol]) -> Result<StateTag> {
        Ok(self.labels[self.run(word)?])
    }

    /// Returns true if `word` leads to an accepting state.
    pub fn accepts(&self, word: &[Symbol]) -> Result<bool> {
        Ok(self.reached_tag(word)?.is_final())
    }

    /// Views the automaton as an [`Nfa`], labelling the edge between two states with all
    /// symbols that lead from one to the other.
    pub fn to_nfa(&self) -> Result<Nfa> {
        let mut builder = StateGraphBuilder::new(self.size(), self.alphabet_size())?;
        for (state, row) in self.table.rows().enumerate() {
            add_row_edges(&mut builder, state, row, Some)?;
        }
        Nfa::from_parts(self.initial, self.labels.clone(), builder.build())
    }

    /// Renders the transition table, accepting states are highlighted and suffixed with
    /// their tag.
    pub fn show_with(&self, options: &RenderOptions) -> String {
        transition_table_string(self.initial, &self.labels, &self.table, options)
    }
}

/// Adds the edges described by one table row, merging runs of consecutive symbols with the
/// same target into ranges. Targets for which `target` returns `None` are skipped.
pub(crate) fn add_row_edges<F>(
    builder: &mut StateGraphBuilder,
    state: StateIndex,
    row: &[StateIndex],
    target: F,
) -> Result<()>
where
    F: Fn(StateIndex) -> Option<StateIndex>,
{
    let mut start = 0;
    while start < row.len() {
        let mut end = start;
        while end + 1 < row.len() && row[end + 1] == row[start] {
            end += 1;
        }
        if let Some(to) = target(row[start]) {
            let mut marker = builder
                .edge_marker(state, to)?
                .and_then(|m| m.symbols().cloned())
                .unwrap_or_default();
            marker.insert_range(start as Symbol, end as Symbol);
            builder.set_edge(state, to, marker)?;
        }
        start = end + 1;
    }
    Ok(())
}

pub(crate) fn transition_table_string(
    initial: StateIndex,
    labels: &[StateTag],
    table: &TransitionTable,
    options: &RenderOptions,
) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(
        std::iter::once("State".to_string())
            .chain((0..table.alphabet_size() as Symbol).map(|symbol| options.symbol(symbol))),
    );
    for (state, row) in table.rows().enumerate() {
        let mut name = state.to_string();
        if state == initial {
            name = format!("→{name}");
        }
        let name = match labels.get(state) {
            Some(tag) if tag.is_final() => format!("{name} [{tag}]").green().to_string(),
            _ => name,
        };
        builder.push_record(std::iter::once(name).chain(row.iter().map(|&target| {
            if target == crate::DEAD_END_STATE {
                "-".to_string()
            } else {
                target.to_string()
            }
        })));
    }
    builder
        .build()
        .with(tabled::settings::Style::rounded())
        .to_string()
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show_with(&RenderOptions::default()))
    }
}
