use crate::{
    error::{check_alphabet_size, check_state, check_symbol},
    Error, Result, StateIndex, Symbol,
};

/// A dense transition table storing one target per state and symbol, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionTable {
    alphabet_size: usize,
    cells: Vec<StateIndex>,
}

impl TransitionTable {
    /// Creates a table for `number_of_states` rows and `alphabet_size` columns where every
    /// cell holds `target`.
    pub fn filled(number_of_states: usize, alphabet_size: usize, target: StateIndex) -> Self {
        Self {
            alphabet_size,
            cells: vec![target; number_of_states * alphabet_size],
        }
    }

    /// Creates a table from its rows, which must all have the same positive length.
    pub fn from_rows(rows: Vec<Vec<StateIndex>>) -> Result<Self> {
        let Some(alphabet_size) = rows.first().map(Vec::len) else {
            return Err(Error::InvalidStateCount);
        };
        check_alphabet_size(alphabet_size)?;
        let mut cells = Vec::with_capacity(rows.len() * alphabet_size);
        for row in rows {
            if row.len() != alphabet_size {
                return Err(Error::DimensionMismatch {
                    what: "transition table row length",
                    expected: alphabet_size,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Self {
            alphabet_size,
            cells,
        })
    }

    /// Number of rows.
    pub fn number_of_states(&self) -> usize {
        self.cells.len().checked_div(self.alphabet_size).unwrap_or(0)
    }

    /// Number of columns.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Returns the target of `state` on `symbol`, or `None` if the cell does not exist.
    #[inline]
    pub fn get(&self, state: StateIndex, symbol: Symbol) -> Option<StateIndex> {
        if (symbol as usize) < self.alphabet_size {
            self.cells
                .get(state * self.alphabet_size + symbol as usize)
                .copied()
        } else {
            None
        }
    }

    /// Like [`TransitionTable::get`], but reports which index is out of range.
    pub fn try_get(&self, state: StateIndex, symbol: Symbol) -> Result<StateIndex> {
        check_state(state, self.number_of_states())?;
        check_symbol(symbol, self.alphabet_size)?;
        Ok(self.cells[state * self.alphabet_size + symbol as usize])
    }

    /// Sets the target of `state` on `symbol`.
    ///
    /// # Panics
    /// If the cell does not exist.
    pub fn set(&mut self, state: StateIndex, symbol: Symbol, target: StateIndex) {
        assert!((symbol as usize) < self.alphabet_size, "symbol out of range");
        self.cells[state * self.alphabet_size + symbol as usize] = target;
    }

    /// Returns the targets of `state` for all symbols.
    ///
    /// # Panics
    /// If `state` does not exist.
    pub fn row(&self, state: StateIndex) -> &[StateIndex] {
        &self.cells[state * self.alphabet_size..(state + 1) * self.alphabet_size]
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[StateIndex]> + '_ {
        self.cells.chunks_exact(self.alphabet_size)
    }

    /// Iterates over the targets of all states for `symbol`, yielding nothing if the column
    /// does not exist.
    pub fn column(&self, symbol: Symbol) -> impl Iterator<Item = StateIndex> + '_ {
        let width = self.alphabet_size;
        let symbol = symbol as usize;
        self.cells
            .iter()
            .skip(symbol)
            .step_by(width)
            .take(if symbol < width { usize::MAX } else { 0 })
            .copied()
    }

    /// Iterates over all cells as `(state, symbol, target)`.
    pub fn cells(&self) -> impl Iterator<Item = (StateIndex, Symbol, StateIndex)> + '_ {
        self.rows().enumerate().flat_map(|(state, row)| {
            row.iter()
                .enumerate()
                .map(move |(symbol, &target)| (state, symbol as Symbol, target))
        })
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn rows_and_columns() {
        let mut table = TransitionTable::from_rows(vec![vec![0, 1, 2], vec![2, 2, 0]]).unwrap();
        assert_eq!(table.number_of_states(), 2);
        assert_eq!(table.alphabet_size(), 3);
        assert_eq!(table.row(1), &[2, 2, 0]);
        assert_eq!(table.column(2).collect_vec(), vec![2, 0]);
        assert_eq!(table.column(3).count(), 0);
        assert_eq!(table.get(1, 0), Some(2));
        assert_eq!(table.get(1, 3), None);
        assert!(table.try_get(2, 0).unwrap_err().is_index());
        table.set(0, 0, 1);
        assert_eq!(table.rows().next(), Some(&[1, 1, 2][..]));
        assert_eq!(table.cells().filter(|&(_, _, t)| t == 2).count(), 3);
    }

    #[test]
    fn malformed_rows() {
        assert_eq!(
            TransitionTable::from_rows(vec![]),
            Err(Error::InvalidStateCount)
        );
        assert_eq!(
            TransitionTable::from_rows(vec![vec![]]),
            Err(Error::InvalidAlphabetSize)
        );
        assert!(matches!(
            TransitionTable::from_rows(vec![vec![0, 0], vec![0]]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_table() {
        let table = TransitionTable::filled(0, 4, 0);
        assert_eq!(table.number_of_states(), 0);
        assert_eq!(table.rows().count(), 0);
    }
}
