use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{math::Map, Dfa, Result, StateIndex, StateTag, Symbol, TransitionTable};

/// Describes a row by the classes of its targets, as maximal runs `(first symbol, class)`.
fn class_runs(row: &[StateIndex], class_of: &[usize]) -> Vec<(Symbol, usize)> {
    let mut runs: Vec<(Symbol, usize)> = Vec::new();
    for (symbol, &target) in row.iter().enumerate() {
        let class = class_of[target];
        if runs.last().map_or(true, |&(_, last)| last != class) {
            runs.push((symbol as Symbol, class));
        }
    }
    runs
}

impl Dfa {
    fn reachable_states(&self) -> BitSet {
        let mut reachable = BitSet::with_capacity(self.size());
        let mut stack = vec![self.initial_state()];
        reachable.insert(self.initial_state());
        while let Some(state) = stack.pop() {
            let row = self.table().row(state);
            for (i, &target) in row.iter().enumerate() {
                if (i == 0 || row[i - 1] != target) && reachable.insert(target) {
                    stack.push(target);
                }
            }
        }
        reachable
    }

    /// Computes the equivalent automaton with the fewest states, where two states are only
    /// ever merged if they carry the same tag.
    ///
    /// Unreachable states are dropped first. The remaining states are partitioned by their
    /// tag and the partition is refined until no class contains two states whose successors
    /// on some symbol lie in different classes. Classes are numbered in order of their
    /// smallest member.
    pub fn minimize(&self) -> Result<Dfa> {
        let states: Vec<StateIndex> = self.reachable_states().iter().collect();
        let mut class_of = vec![usize::MAX; self.size()];

        let mut by_tag: Map<StateTag, usize> = Map::default();
        for &state in &states {
            let next = by_tag.len();
            class_of[state] = *by_tag.entry(self.labels()[state]).or_insert(next);
        }
        let mut count = by_tag.len();

        let mut round = 0;
        loop {
            let mut ids: Map<(usize, Vec<(Symbol, usize)>), usize> = Map::default();
            let mut refined = class_of.clone();
            for &state in &states {
                let signature = (
                    class_of[state],
                    class_runs(self.table().row(state), &class_of),
                );
                let next = ids.len();
                refined[state] = *ids.entry(signature).or_insert(next);
            }
            round += 1;
            trace!("refinement round {round}: {count} -> {} classes", ids.len());
            class_of = refined;
            if ids.len() == count {
                break;
            }
            count = ids.len();
        }

        // states are visited in ascending order, so the first member of each class comes first
        let mut representatives = Vec::with_capacity(count);
        for &state in &states {
            if class_of[state] == representatives.len() {
                representatives.push(state);
            }
        }

        let mut table = TransitionTable::filled(count, self.alphabet_size(), 0);
        for (class, &representative) in representatives.iter().enumerate() {
            for (symbol, &target) in self.table().row(representative).iter().enumerate() {
                table.set(class, symbol as Symbol, class_of[target]);
            }
        }
        let labels = representatives
            .iter()
            .map(|&state| self.labels()[state])
            .collect();
        debug!("minimized {} states into {count}", self.size());
        Dfa::new(class_of[self.initial_state()], labels, table)
    }
}
