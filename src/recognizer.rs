use std::fmt::Display;

use tracing::{debug, trace};

use crate::{
    alphabet::coarse_symbol_class_map,
    dfa::{add_row_edges, transition_table_string},
    error::check_state,
    math::dense_renumbering,
    render::RenderOptions,
    Dfa, EquivalenceMap, Nfa, Priorities, Result, StateGraphBuilder, StateIndex, StateTag,
    Symbol, TransitionTable, DEAD_END_STATE, END_OF_INPUT,
};

/// The table a scanner driver runs on. It is obtained from a minimized and alphabet compressed
/// [`Dfa`] by removing its drain state, the single non accepting state that can never be left.
/// Transitions into the drain are replaced by [`DEAD_END_STATE`].
///
/// A driver starts in [`Recognizer::initial_state`], feeds raw symbols to
/// [`Recognizer::transition`] and stops as soon as it receives [`DEAD_END_STATE`], remembering
/// the last accepting [`Recognizer::state_tag`] it passed for longest match extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognizer {
    map: EquivalenceMap,
    table: TransitionTable,
    labels: Vec<StateTag>,
    initial: StateIndex,
}

/// Finds the first non accepting state whose transitions all lead back to itself.
fn find_drain(dfa: &Dfa) -> Option<StateIndex> {
    (0..dfa.size()).find(|&state| {
        !dfa.labels()[state].is_final()
            && dfa.table().row(state).iter().all(|&target| target == state)
    })
}

impl Recognizer {
    /// Builds the recognizer for `dfa`. The automaton is minimized, its alphabet is compressed
    /// starting from `hint` (see [`Dfa::compress`]) and the drain state, if there is one, is
    /// removed. States before the drain keep their index, the ones after it move down by one.
    pub fn new(hint: &EquivalenceMap, dfa: &Dfa) -> Result<Self> {
        let minimal = dfa.minimize()?;
        let (map, compressed) = minimal.compress(hint)?;

        let Some(drain) = find_drain(&compressed) else {
            trace!("no drain state found");
            debug!(
                "recognizer has {} states and {} columns",
                compressed.size(),
                map.class_count()
            );
            return Ok(Self {
                map,
                table: compressed.table().clone(),
                labels: compressed.labels().to_vec(),
                initial: compressed.initial_state(),
            });
        };

        trace!("removing drain state {drain}");
        let renaming = dense_renumbering((0..compressed.size()).filter(|&state| state != drain));
        let rename = |state: StateIndex| {
            renaming
                .get_by_left(&state)
                .copied()
                .unwrap_or(DEAD_END_STATE)
        };

        let mut table = TransitionTable::filled(renaming.len(), map.class_count(), DEAD_END_STATE);
        let mut labels = Vec::with_capacity(renaming.len());
        for (&old, &new) in renaming.iter() {
            for (class, &target) in compressed.table().row(old).iter().enumerate() {
                table.set(new, class as Symbol, rename(target));
            }
            labels.push(compressed.labels()[old]);
        }
        debug!(
            "recognizer has {} states and {} columns",
            labels.len(),
            map.class_count()
        );
        Ok(Self {
            initial: rename(compressed.initial_state()),
            map,
            table,
            labels,
        })
    }

    /// Runs the whole pipeline on `nfa`: lambda elimination, determinization under
    /// `priorities`, and [`Recognizer::new`] with a hint built from the symbols the automaton
    /// mentions (see [`coarse_symbol_class_map`]).
    pub fn from_nfa(nfa: &Nfa, priorities: &Priorities) -> Result<Self> {
        let lambda_free = nfa.remove_lambda_steps()?;
        let dfa = lambda_free.determinize(priorities)?;
        let hint = coarse_symbol_class_map(lambda_free.mentioned_symbols(), nfa.alphabet_size())?;
        Self::new(&hint, &dfa)
    }

    /// The state a scan starts in. This is [`DEAD_END_STATE`] if the automaton accepts
    /// nothing at all.
    pub fn initial_state(&self) -> StateIndex {
        self.initial
    }

    /// Performs one step from `from`, which must not be [`DEAD_END_STATE`]. Returns
    /// [`DEAD_END_STATE`] for [`END_OF_INPUT`] and whenever no accepting state can be reached
    /// anymore.
    ///
    /// # Panics
    /// If `from` is not a state or `symbol` lies outside the alphabet, see
    /// [`Recognizer::try_transition`] for a checked version.
    #[inline]
    pub fn transition(&self, from: StateIndex, symbol: Symbol) -> StateIndex {
        if symbol == END_OF_INPUT {
            return DEAD_END_STATE;
        }
        match self.map.get(symbol) {
            Some(class) => self.table.row(from)[class as usize],
            None => panic!(
                "symbol {symbol} is outside of the alphabet of size {}",
                self.map.domain_size()
            ),
        }
    }

    /// Like [`Recognizer::transition`], but reports invalid states and symbols as errors.
    pub fn try_transition(&self, from: StateIndex, symbol: Symbol) -> Result<StateIndex> {
        if symbol == END_OF_INPUT {
            return Ok(DEAD_END_STATE);
        }
        check_state(from, self.number_of_states())?;
        let class = self.map.class_of(symbol)?;
        self.table.try_get(from, class)
    }

    /// Reads `word` from the initial state and returns the state the scan ends in, or
    /// [`DEAD_END_STATE`] if it got stuck.
    pub fn run(&self, word: &[Symbol]) -> Result<StateIndex> {
        let mut state = self.initial;
        for &symbol in word {
            if state == DEAD_END_STATE {
                break;
            }
            state = self.try_transition(state, symbol)?;
        }
        Ok(state)
    }

    /// Returns the tag of `state`. The dead end counts as [`StateTag::NotFinal`].
    ///
    /// # Panics
    /// If `state` is neither a state nor [`DEAD_END_STATE`].
    pub fn state_tag(&self, state: StateIndex) -> StateTag {
        if state == DEAD_END_STATE {
            StateTag::NotFinal
        } else {
            self.labels[state]
        }
    }

    /// Number of states, not counting the removed drain.
    pub fn number_of_states(&self) -> usize {
        self.labels.len()
    }

    /// Number of symbol classes, which is the width of the transition table.
    pub fn number_of_columns(&self) -> usize {
        self.map.class_count()
    }

    /// The map from raw symbols to table columns.
    pub fn equivalence_map(&self) -> &EquivalenceMap {
        &self.map
    }

    /// The transition table over symbol classes, which may contain [`DEAD_END_STATE`].
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Lists the raw symbols of every class, one class per line.
    pub fn display_equivalence_map(&self, options: &RenderOptions) -> String {
        self.map.show_with(options)
    }

    /// Views the recognizer as an automaton over symbol classes. Transitions into the dead end
    /// are omitted. Fails if no state is left.
    pub fn to_nfa(&self) -> Result<Nfa> {
        let mut builder = StateGraphBuilder::new(self.number_of_states(), self.number_of_columns())?;
        for (state, row) in self.table.rows().enumerate() {
            add_row_edges(&mut builder, state, row, |target| {
                (target != DEAD_END_STATE).then_some(target)
            })?;
        }
        Nfa::from_parts(self.initial, self.labels.clone(), builder.build())
    }
}

impl Display for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            transition_table_string(
                self.initial,
                &self.labels,
                &self.table,
                &RenderOptions::default()
            )
        )
    }
}
