#![allow(missing_docs)]

use thiserror::Error;

use crate::{Symbol, StateIndex, StateTag, END_OF_INPUT};

/// Type alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or transforming automata. None of these
/// are recoverable inside the pipeline, they are reported to the caller as soon as the
/// offending value is encountered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("number of states must be positive")]
    InvalidStateCount,
    #[error("alphabet size must lie in [1, {}]", END_OF_INPUT)]
    InvalidAlphabetSize,
    #[error("initial state {initial} is not in [0, {size})")]
    InitialStateOutOfRange { initial: StateIndex, size: usize },
    #[error("{what} mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("state {0} has no label")]
    MissingLabel(StateIndex),
    #[error("cannot combine automata over alphabets of size {left} and {right}")]
    AlphabetMismatch { left: usize, right: usize },
    #[error("no priority rank given for tag {0}")]
    MissingPriority(StateTag),
    #[error("malformed equivalence map: {0}")]
    InvalidEquivalenceMap(String),
    #[error("hint merges symbols {left} and {right} which the automaton distinguishes")]
    InconsistentHint { left: Symbol, right: Symbol },
    #[error("state {state} is out of range for {size} states")]
    StateOutOfRange { state: StateIndex, size: usize },
    #[error("symbol {symbol} is out of range for alphabet of size {alphabet_size}")]
    SymbolOutOfRange { symbol: Symbol, alphabet_size: usize },
    #[error("edge ({from}, {to}) is a lambda edge and cannot carry symbols")]
    LambdaEdgeConflict { from: StateIndex, to: StateIndex },
}

impl Error {
    /// Returns true for errors caused by invalid structural parameters.
    pub fn is_configuration(&self) -> bool {
        !self.is_index() && !matches!(self, Error::LambdaEdgeConflict { .. })
    }

    /// Returns true for errors caused by an out-of-range state or symbol.
    pub fn is_index(&self) -> bool {
        matches!(
            self,
            Error::StateOutOfRange { .. } | Error::SymbolOutOfRange { .. }
        )
    }
}

pub(crate) fn check_state(state: StateIndex, size: usize) -> Result<()> {
    if state < size {
        Ok(())
    } else {
        Err(Error::StateOutOfRange { state, size })
    }
}

/// Alphabets are non-empty and every symbol in them lies below [`END_OF_INPUT`].
pub(crate) fn check_alphabet_size(alphabet_size: usize) -> Result<()> {
    if alphabet_size == 0 || alphabet_size > END_OF_INPUT as usize {
        Err(Error::InvalidAlphabetSize)
    } else {
        Ok(())
    }
}

pub(crate) fn check_symbol(symbol: Symbol, alphabet_size: usize) -> Result<()> {
    if (symbol as usize) < alphabet_size {
        Ok(())
    } else {
        Err(Error::SymbolOutOfRange {
            symbol,
            alphabet_size,
        })
    }
}
