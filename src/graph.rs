use std::collections::BTreeMap;

use tracing::error;

use crate::{
    error::{check_alphabet_size, check_state, check_symbol},
    render::RenderOptions,
    Error, Result, StateIndex, Symbol, SymbolSet,
};

/// The label of an edge. Lambda edges are structurally distinct from symbol edges, so an edge
/// can never be both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeMarker {
    /// The edge is taken without consuming input.
    Lambda,
    /// The edge consumes any one of the contained symbols. The set is never empty.
    Symbols(SymbolSet),
}

impl EdgeMarker {
    /// Returns true if this is a lambda (epsilon) marker.
    pub fn is_lambda(&self) -> bool {
        matches!(self, EdgeMarker::Lambda)
    }

    /// Returns the symbols of a symbol edge and `None` for a lambda edge.
    pub fn symbols(&self) -> Option<&SymbolSet> {
        match self {
            EdgeMarker::Lambda => None,
            EdgeMarker::Symbols(set) => Some(set),
        }
    }

    /// Returns true if the edge consumes `symbol`.
    pub fn consumes(&self, symbol: Symbol) -> bool {
        self.symbols().map_or(false, |set| set.contains(symbol))
    }

    /// Renders the marker, lambda edges are shown as `λ`.
    pub fn show_with(&self, options: &RenderOptions) -> String {
        match self {
            EdgeMarker::Lambda => "λ".to_string(),
            EdgeMarker::Symbols(set) => set.show_with(options),
        }
    }
}

impl From<SymbolSet> for EdgeMarker {
    /// The empty set denotes a lambda edge.
    fn from(value: SymbolSet) -> Self {
        if value.is_empty() {
            EdgeMarker::Lambda
        } else {
            EdgeMarker::Symbols(value)
        }
    }
}

type Adjacency = Vec<BTreeMap<StateIndex, EdgeMarker>>;

fn validate_dimensions(number_of_states: usize, alphabet_size: usize) -> Result<()> {
    if number_of_states == 0 {
        return Err(Error::InvalidStateCount);
    }
    check_alphabet_size(alphabet_size)
}

fn marker_at(
    adjacency: &Adjacency,
    from: StateIndex,
    to: StateIndex,
) -> Result<Option<&EdgeMarker>> {
    check_state(from, adjacency.len())?;
    check_state(to, adjacency.len())?;
    Ok(adjacency[from].get(&to))
}

/// The only mutable form of an edge relation. Every ordered pair of states carries at most one
/// edge. Once construction is done, [`StateGraphBuilder::build`] produces an independent
/// [`StateGraph`], the builder may be modified and built again afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGraphBuilder {
    alphabet_size: usize,
    adjacency: Adjacency,
}

impl StateGraphBuilder {
    /// Creates a builder without edges for the given number of states and alphabet size,
    /// both of which have to be positive.
    pub fn new(number_of_states: usize, alphabet_size: usize) -> Result<Self> {
        validate_dimensions(number_of_states, alphabet_size)?;
        Ok(Self {
            alphabet_size,
            adjacency: vec![BTreeMap::new(); number_of_states],
        })
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    /// Size of the alphabet that markers draw their symbols from.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Sets the edge from `from` to `to`, replacing any previous edge. An empty `marker`
    /// creates a lambda edge.
    pub fn set_edge(&mut self, from: StateIndex, to: StateIndex, marker: SymbolSet) -> Result<()> {
        self.set_marker(from, to, marker.into())
    }

    /// Sets a lambda edge from `from` to `to`, replacing any previous edge.
    pub fn set_lambda_edge(&mut self, from: StateIndex, to: StateIndex) -> Result<()> {
        self.set_marker(from, to, EdgeMarker::Lambda)
    }

    /// Sets the edge from `from` to `to` to the given marker, replacing any previous edge.
    /// A symbol marker with an empty set is stored as a lambda edge.
    pub fn set_marker(&mut self, from: StateIndex, to: StateIndex, marker: EdgeMarker) -> Result<()> {
        check_state(from, self.size())?;
        check_state(to, self.size())?;
        let marker = match marker {
            EdgeMarker::Symbols(set) => EdgeMarker::from(set),
            EdgeMarker::Lambda => EdgeMarker::Lambda,
        };
        if let Some(max) = marker.symbols().and_then(SymbolSet::max) {
            check_symbol(max, self.alphabet_size)?;
        }
        self.adjacency[from].insert(to, marker);
        Ok(())
    }

    /// Adds `symbol` to the edge from `from` to `to`, creating a symbol edge if there is none.
    /// Fails if the pair is connected by a lambda edge.
    pub fn add_symbol_to_edge(
        &mut self,
        from: StateIndex,
        to: StateIndex,
        symbol: Symbol,
    ) -> Result<()> {
        check_state(from, self.size())?;
        check_state(to, self.size())?;
        check_symbol(symbol, self.alphabet_size)?;
        match self.adjacency[from].get_mut(&to) {
            None => {
                self.adjacency[from].insert(to, EdgeMarker::Symbols(SymbolSet::singleton(symbol)));
            }
            Some(EdgeMarker::Symbols(set)) => {
                set.insert(symbol);
            }
            Some(EdgeMarker::Lambda) => {
                error!("cannot add symbol {symbol} to lambda edge ({from}, {to})");
                return Err(Error::LambdaEdgeConflict { from, to });
            }
        }
        Ok(())
    }

    /// Removes the edge from `from` to `to` and returns its marker, if there was one.
    pub fn remove_edge(&mut self, from: StateIndex, to: StateIndex) -> Result<Option<EdgeMarker>> {
        check_state(from, self.size())?;
        check_state(to, self.size())?;
        Ok(self.adjacency[from].remove(&to))
    }

    /// Copies every edge of `graph` into `self`, shifting all state indices by `offset`.
    pub(crate) fn embed(&mut self, graph: &StateGraph, offset: usize) -> Result<()> {
        if graph.alphabet_size() != self.alphabet_size {
            return Err(Error::AlphabetMismatch {
                left: self.alphabet_size,
                right: graph.alphabet_size(),
            });
        }
        check_state(offset + graph.size() - 1, self.size())?;
        for (from, to, marker) in graph.edges() {
            self.adjacency[from + offset].insert(to + offset, marker.clone());
        }
        Ok(())
    }

    /// Returns true if there is an edge from `from` to `to`.
    pub fn edge_exists(&self, from: StateIndex, to: StateIndex) -> Result<bool> {
        Ok(marker_at(&self.adjacency, from, to)?.is_some())
    }

    /// Returns true if there is a lambda edge from `from` to `to`.
    pub fn is_lambda_edge(&self, from: StateIndex, to: StateIndex) -> Result<bool> {
        Ok(marker_at(&self.adjacency, from, to)?.map_or(false, EdgeMarker::is_lambda))
    }

    /// Returns true if there is a symbol edge from `from` to `to`.
    pub fn is_non_trivial_edge(&self, from: StateIndex, to: StateIndex) -> Result<bool> {
        Ok(marker_at(&self.adjacency, from, to)?.map_or(false, |m| !m.is_lambda()))
    }

    /// Returns the marker of the edge from `from` to `to`, or `None` if there is no edge.
    pub fn edge_marker(&self, from: StateIndex, to: StateIndex) -> Result<Option<&EdgeMarker>> {
        marker_at(&self.adjacency, from, to)
    }

    /// Freezes the current contents into a [`StateGraph`] that does not share any data with
    /// the builder.
    pub fn build(&self) -> StateGraph {
        StateGraph {
            alphabet_size: self.alphabet_size,
            adjacency: self.adjacency.clone(),
        }
    }
}

/// An immutable edge relation over the states `[0, size)`, obtained from a
/// [`StateGraphBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGraph {
    alphabet_size: usize,
    adjacency: Adjacency,
}

impl StateGraph {
    /// Creates a graph without any edges.
    pub fn without_edges(number_of_states: usize, alphabet_size: usize) -> Result<Self> {
        Ok(StateGraphBuilder::new(number_of_states, alphabet_size)?.build())
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    /// Size of the alphabet that markers draw their symbols from.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Returns true if there is an edge from `from` to `to`.
    pub fn edge_exists(&self, from: StateIndex, to: StateIndex) -> Result<bool> {
        Ok(marker_at(&self.adjacency, from, to)?.is_some())
    }

    /// Returns true if there is a lambda edge from `from` to `to`.
    pub fn is_lambda_edge(&self, from: StateIndex, to: StateIndex) -> Result<bool> {
        Ok(marker_at(&self.adjacency, from, to)?.map_or(false, EdgeMarker::is_lambda))
    }

    /// Returns true if there is a symbol edge from `from` to `to`.
    pub fn is_non_trivial_edge(&self, from: StateIndex, to: StateIndex) -> Result<bool> {
        Ok(marker_at(&self.adjacency, from, to)?.map_or(false, |m| !m.is_lambda()))
    }

    /// Returns the marker of the edge from `from` to `to`, or `None` if there is no edge.
    pub fn edge_marker(&self, from: StateIndex, to: StateIndex) -> Result<Option<&EdgeMarker>> {
        marker_at(&self.adjacency, from, to)
    }

    /// Iterates over the outgoing edges of `from` as `(target, marker)` pairs, ordered by
    /// target.
    pub fn edges_from(
        &self,
        from: StateIndex,
    ) -> Result<impl Iterator<Item = (StateIndex, &EdgeMarker)> + '_> {
        check_state(from, self.size())?;
        Ok(self.targets(from))
    }

    /// Like [`StateGraph::edges_from`], but yields nothing for a state that does not exist.
    pub(crate) fn targets(
        &self,
        from: StateIndex,
    ) -> impl Iterator<Item = (StateIndex, &EdgeMarker)> + '_ {
        self.adjacency
            .get(from)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(&to, marker)| (to, marker)))
    }

    /// Iterates over all edges as `(source, target, marker)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (StateIndex, StateIndex, &EdgeMarker)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| targets.iter().map(move |(&to, m)| (from, to, m)))
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeMap::len).sum()
    }

    /// Returns true if at least one edge is a lambda edge.
    pub fn has_lambda_edges(&self) -> bool {
        self.edges().any(|(_, _, marker)| marker.is_lambda())
    }

    /// Creates a builder that starts out with a copy of the edges of `self`.
    pub fn to_builder(&self) -> StateGraphBuilder {
        StateGraphBuilder {
            alphabet_size: self.alphabet_size,
            adjacency: self.adjacency.clone(),
        }
    }
}
