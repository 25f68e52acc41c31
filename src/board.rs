use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Number of cells on the board (3x3)
pub const CELL_COUNT: usize = 9;
pub const GRID_SIDE: usize = 3;

/// Identifier of one board cell. Displayed and parsed as "1".."9",
/// stored as the zero-based index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u8);

impl CellId {
    pub fn from_index(index: usize) -> Option<Self> {
        (index < CELL_COUNT).then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / GRID_SIDE
    }

    pub fn col(self) -> usize {
        self.index() % GRID_SIDE
    }

    pub fn all() -> impl Iterator<Item = CellId> {
        (0..CELL_COUNT).map(|i| CellId(i as u8))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

impl FromStr for CellId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(CellId::from_index)
            .ok_or_else(|| GameError::UnknownCell(s.to_string()))
    }
}
