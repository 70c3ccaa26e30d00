//! Sparse, left-bounded tape.

use crate::types::BLANK_SYMBOL;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tape that only stores non-blank cells.
///
/// Cell 0 is the left end. Writing the blank symbol removes the cell, so two tapes with the
/// same visible content always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tape {
    cells: BTreeMap<usize, char>,
}

impl Tape {
    /// Creates a tape holding `input`, one character per cell starting at 0.
    ///
    /// `_` in the input is a blank cell.
    pub fn from_input(input: &str) -> Self {
        let mut tape = Self::default();
        for (index, symbol) in input.chars().enumerate() {
            tape.write(index, symbol);
        }
        tape
    }

    /// Symbol at `index`, blank if the cell was never written.
    pub fn read(&self, index: usize) -> char {
        self.cells.get(&index).copied().unwrap_or(BLANK_SYMBOL)
    }

    pub fn write(&mut self, index: usize, symbol: char) {
        if symbol == BLANK_SYMBOL {
            self.cells.remove(&index);
        } else {
            self.cells.insert(index, symbol);
        }
    }

    /// Non-blank cells in index order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.cells.iter().map(|(&index, &symbol)| (index, symbol))
    }

    /// Number of non-blank cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the rightmost non-blank cell.
    pub fn last_index(&self) -> Option<usize> {
        self.cells.keys().next_back().copied()
    }

    /// Renders cells `from..to` with `_` for blanks.
    pub fn render(&self, from: usize, to: usize) -> String {
        (from..to).map(|index| self.read(index)).collect()
    }
}

impl std::fmt::Display for Tape {
    /// Writes cells `0..=last_index`, or nothing for an all-blank tape.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = self.last_index().map_or(0, |last| last + 1);
        f.write_str(&self.render(0, end))
    }
}
