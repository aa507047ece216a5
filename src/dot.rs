use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::{
    render::RenderOptions, Dfa, Nfa, Recognizer, StateIndex, StateTag, Symbol, SymbolSet,
    DEAD_END_STATE,
};

/// Automata that can be exported in the graphviz DOT format, see the
/// [graphviz documentation](https://graphviz.org/doc/info/lang.html).
///
/// Implementors only describe their states and edges, the layout is shared: states are laid
/// out from left to right, an invisible point shaped node points at the initial state and
/// accepting states are drawn as double circles.
pub trait Dottable {
    /// Name of the generated graph.
    fn dot_name(&self) -> String;

    /// Number of states, they are identified as `q0, q1, ...`.
    fn dot_size(&self) -> usize;

    /// The initial state, if there is one.
    fn dot_initial_state(&self) -> Option<StateIndex>;

    /// The tag of `state`.
    fn dot_state_tag(&self, state: StateIndex) -> StateTag;

    /// All edges as `(from, to, label)`.
    fn dot_edges(&self, options: &RenderOptions) -> Vec<(StateIndex, StateIndex, String)>;

    /// Compute the graphviz representation with default [`RenderOptions`].
    fn dot_representation(&self) -> String {
        self.dot_representation_with(&RenderOptions::default())
    }

    /// Compute the graphviz representation, rendering symbols and state labels according to
    /// `options`.
    fn dot_representation_with(&self, options: &RenderOptions) -> String {
        let header = [
            format!("digraph {} {{", self.dot_name()),
            "rankdir=LR;".to_string(),
        ];

        let input = self.dot_initial_state().into_iter().flat_map(|initial| {
            [
                "input [shape=\"point\", label=\"\"]".to_string(),
                format!("input -> {}", dot_state_ident(initial)),
            ]
        });

        let states = (0..self.dot_size()).map(|state| {
            let tag = self.dot_state_tag(state);
            let mut attributes = vec![DotStateAttribute::Shape(
                if tag.is_final() {
                    "doublecircle"
                } else {
                    "circle"
                }
                .into(),
            )];
            if tag.is_final() && options.prefix_final_states_with_tag_name {
                attributes.push(DotStateAttribute::Label(format!("{state}_{tag}")));
            } else {
                attributes.push(DotStateAttribute::Label(state.to_string()));
            }
            format!(
                "{} [{}]",
                dot_state_ident(state),
                attributes.iter().join(", ")
            )
        });

        let transitions = self.dot_edges(options).into_iter().map(|(from, to, label)| {
            format!(
                "{} -> {} [{}]",
                dot_state_ident(from),
                dot_state_ident(to),
                DotTransitionAttribute::Label(label)
            )
        });

        header
            .into_iter()
            .chain(input)
            .chain(states)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }
}

fn dot_state_ident(state: StateIndex) -> String {
    format!("q{state}")
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Groups the symbols of a table row by target, dropping dead ends.
fn row_edges(row: &[StateIndex]) -> BTreeMap<StateIndex, SymbolSet> {
    let mut edges: BTreeMap<StateIndex, SymbolSet> = BTreeMap::new();
    for (symbol, &target) in row.iter().enumerate() {
        if target != DEAD_END_STATE {
            edges.entry(target).or_default().insert(symbol as Symbol);
        }
    }
    edges
}

impl Dottable for Nfa {
    fn dot_name(&self) -> String {
        "NFA".into()
    }

    fn dot_size(&self) -> usize {
        self.size()
    }

    fn dot_initial_state(&self) -> Option<StateIndex> {
        Some(self.initial_state())
    }

    fn dot_state_tag(&self, state: StateIndex) -> StateTag {
        self.labels()[state]
    }

    fn dot_edges(&self, options: &RenderOptions) -> Vec<(StateIndex, StateIndex, String)> {
        self.graph()
            .edges()
            .map(|(from, to, marker)| (from, to, marker.show_with(options)))
            .collect()
    }
}

impl Dottable for Dfa {
    fn dot_name(&self) -> String {
        "DFA".into()
    }

    fn dot_size(&self) -> usize {
        self.size()
    }

    fn dot_initial_state(&self) -> Option<StateIndex> {
        Some(self.initial_state())
    }

    fn dot_state_tag(&self, state: StateIndex) -> StateTag {
        self.labels()[state]
    }

    fn dot_edges(&self, options: &RenderOptions) -> Vec<(StateIndex, StateIndex, String)> {
        self.table()
            .rows()
            .enumerate()
            .flat_map(|(from, row)| {
                row_edges(row)
                    .into_iter()
                    .map(move |(to, symbols)| (from, to, symbols.show_with(options)))
            })
            .collect()
    }
}

/// Edges are labelled with the raw symbols of the classes they are taken on.
impl Dottable for Recognizer {
    fn dot_name(&self) -> String {
        "Recognizer".into()
    }

    fn dot_size(&self) -> usize {
        self.number_of_states()
    }

    fn dot_initial_state(&self) -> Option<StateIndex> {
        Some(self.initial_state()).filter(|&initial| initial != DEAD_END_STATE)
    }

    fn dot_state_tag(&self, state: StateIndex) -> StateTag {
        self.state_tag(state)
    }

    fn dot_edges(&self, options: &RenderOptions) -> Vec<(StateIndex, StateIndex, String)> {
        let members = self.equivalence_map().members();
        self.table()
            .rows()
            .enumerate()
            .flat_map(|(from, row)| {
                let members = &members;
                row_edges(row).into_iter().map(move |(to, classes)| {
                    let mut symbols = SymbolSet::empty();
                    for class in classes.iter() {
                        symbols.extend_from(&members[class as usize]);
                    }
                    (from, to, symbols.show_with(options))
                })
            })
            .collect()
    }
}

/// Enum that abstracts attributes of nodes in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{}\"", escape(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape=\"{}\"", escape(s)),
        }
    }
}

/// Enum that abstracts attributes of edges in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    /// The label of an edge
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label=\"{}\"", escape(lbl)),
        }
    }
}
