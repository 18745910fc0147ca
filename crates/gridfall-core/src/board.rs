#![forbid(unsafe_code)]

//! Board snapshot model.
//!
//! The server owns the real grid; the client only mirrors the snapshot each
//! `/play` reply carries. Dimensions are not fixed — the server sizes the
//! grid per difficulty (6×7, 6×9 and 7×8 in the stock table), so everything
//! here is sized from the wire data.
//!
//! Wire cells arrive in two historical encodings: the server emits integers
//! (`0`/`1`/`2` for empty/player-one/player-two) while older page markup
//! compared string marks (`""`/`"R"`/`"J"`). [`WireCell`] accepts both and
//! normalizes into one [`CellState`].

use serde::{Deserialize, Serialize};

/// Upper bound on either grid dimension accepted from the wire.
///
/// The stock difficulty table tops out at 9 columns; anything near this limit
/// is a malformed or hostile reply, not a board.
pub const MAX_GRID_DIM: usize = 256;

/// Owner of a claimed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disc {
    Red,
    Yellow,
}

impl Disc {
    /// Single-letter mark rendered as the cell's text (`R` / `J`, matching
    /// the page's French naming: rouge / jaune).
    #[must_use]
    pub const fn mark(self) -> &'static str {
        match self {
            Self::Red => "R",
            Self::Yellow => "J",
        }
    }

    /// CSS class carried by a taken cell.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Red => "rouge",
            Self::Yellow => "jaune",
        }
    }

    /// Numeric player id used by the server (`1` / `2`).
    #[must_use]
    pub const fn player_id(self) -> u8 {
        match self {
            Self::Red => 1,
            Self::Yellow => 2,
        }
    }

    /// Map a server player id back to a disc. Ids outside `1..=2` are not
    /// players.
    #[must_use]
    pub const fn from_player_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Red),
            2 => Some(Self::Yellow),
            _ => None,
        }
    }
}

/// State of one grid cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Taken(Disc),
}

impl CellState {
    /// Text mark rendered into the cell; empty cells render as `""`.
    #[must_use]
    pub const fn mark(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Taken(disc) => disc.mark(),
        }
    }

    /// Owner CSS class, if any.
    #[must_use]
    pub const fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Taken(disc) => Some(disc.css_class()),
        }
    }
}

/// One cell as it appears on the wire.
///
/// Variants are tried in order: integer codes first (the server's encoding),
/// then string marks, then JSON `null` (treated as empty).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireCell {
    Code(i64),
    Mark(String),
    Null,
}

/// A wire cell that decodes to no known [`CellState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDecodeError {
    UnknownCode(i64),
    UnknownMark(String),
}

impl core::fmt::Display for CellDecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownCode(code) => write!(f, "unknown cell code: {code}"),
            Self::UnknownMark(mark) => write!(f, "unknown cell mark: {mark:?}"),
        }
    }
}

impl std::error::Error for CellDecodeError {}

impl WireCell {
    /// Normalize this wire cell into a [`CellState`].
    pub fn to_state(&self) -> Result<CellState, CellDecodeError> {
        match self {
            Self::Code(0) => Ok(CellState::Empty),
            Self::Code(1) => Ok(CellState::Taken(Disc::Red)),
            Self::Code(2) => Ok(CellState::Taken(Disc::Yellow)),
            Self::Code(other) => Err(CellDecodeError::UnknownCode(*other)),
            Self::Mark(mark) => match mark.as_str() {
                "" => Ok(CellState::Empty),
                "R" => Ok(CellState::Taken(Disc::Red)),
                "J" => Ok(CellState::Taken(Disc::Yellow)),
                other => Err(CellDecodeError::UnknownMark(other.to_owned())),
            },
            Self::Null => Ok(CellState::Empty),
        }
    }
}

/// Errors decoding a wire grid into a [`BoardSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardDecodeError {
    /// Zero rows, or a first row with zero cells.
    EmptyGrid,
    /// A row whose length disagrees with the first row's.
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    /// Either dimension exceeds [`MAX_GRID_DIM`].
    GridTooLarge { rows: usize, cols: usize },
    /// A cell that decodes to no known state.
    Cell {
        row: usize,
        col: usize,
        source: CellDecodeError,
    },
}

impl core::fmt::Display for BoardDecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "empty grid"),
            Self::RaggedRow { row, len, expected } => {
                write!(f, "ragged row {row}: {len} cells, expected {expected}")
            }
            Self::GridTooLarge { rows, cols } => {
                write!(f, "grid too large: {rows}x{cols} (max {MAX_GRID_DIM})")
            }
            Self::Cell { row, col, source } => {
                write!(f, "cell ({row}, {col}): {source}")
            }
        }
    }
}

impl std::error::Error for BoardDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cell { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Row-major snapshot of the grid as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    rows: u16,
    cols: u16,
    cells: Vec<CellState>,
}

impl BoardSnapshot {
    /// Decode a wire grid (outer array = rows, top row first).
    pub fn from_wire(grid: &[Vec<WireCell>]) -> Result<Self, BoardDecodeError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(BoardDecodeError::EmptyGrid);
        }
        if rows > MAX_GRID_DIM || cols > MAX_GRID_DIM {
            return Err(BoardDecodeError::GridTooLarge { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row_idx, row) in grid.iter().enumerate() {
            if row.len() != cols {
                return Err(BoardDecodeError::RaggedRow {
                    row: row_idx,
                    len: row.len(),
                    expected: cols,
                });
            }
            for (col_idx, cell) in row.iter().enumerate() {
                let state = cell.to_state().map_err(|source| BoardDecodeError::Cell {
                    row: row_idx,
                    col: col_idx,
                    source,
                })?;
                cells.push(state);
            }
        }

        Ok(Self {
            rows: rows as u16,
            cols: cols as u16,
            cells,
        })
    }

    /// An all-empty board, useful as a first-render baseline in tests.
    #[must_use]
    pub fn empty(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellState::Empty; usize::from(rows) * usize::from(cols)],
        }
    }

    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    #[must_use]
    pub const fn dims(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    /// Row-major cell slice; `cells().len() == rows * cols`.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Bounds-checked cell lookup.
    #[must_use]
    pub fn get(&self, row: u16, col: u16) -> Option<CellState> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells
            .get(usize::from(row) * usize::from(self.cols) + usize::from(col))
            .copied()
    }

    /// Whether `(row, col)` addresses a cell on this board.
    #[must_use]
    pub const fn contains(&self, row: u16, col: u16) -> bool {
        row < self.rows && col < self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn codes(rows: &[&[i64]]) -> Vec<Vec<WireCell>> {
        rows.iter()
            .map(|row| row.iter().map(|&code| WireCell::Code(code)).collect())
            .collect()
    }

    #[test]
    fn decode_integer_grid() {
        let grid = codes(&[&[0, 1], &[2, 0]]);
        let board = BoardSnapshot::from_wire(&grid).expect("decode");
        assert_eq!(board.dims(), (2, 2));
        assert_eq!(board.get(0, 1), Some(CellState::Taken(Disc::Red)));
        assert_eq!(board.get(1, 0), Some(CellState::Taken(Disc::Yellow)));
        assert_eq!(board.get(1, 1), Some(CellState::Empty));
    }

    #[test]
    fn decode_mark_grid() {
        let grid = vec![vec![
            WireCell::Mark(String::new()),
            WireCell::Mark("R".to_owned()),
            WireCell::Mark("J".to_owned()),
        ]];
        let board = BoardSnapshot::from_wire(&grid).expect("decode");
        assert_eq!(board.get(0, 0), Some(CellState::Empty));
        assert_eq!(board.get(0, 1), Some(CellState::Taken(Disc::Red)));
        assert_eq!(board.get(0, 2), Some(CellState::Taken(Disc::Yellow)));
    }

    #[test]
    fn null_cell_is_empty() {
        let grid = vec![vec![WireCell::Null, WireCell::Code(1)]];
        let board = BoardSnapshot::from_wire(&grid).expect("decode");
        assert_eq!(board.get(0, 0), Some(CellState::Empty));
    }

    #[test]
    fn ragged_row_is_an_error() {
        let grid = codes(&[&[0, 0, 0], &[0, 0]]);
        assert_eq!(
            BoardSnapshot::from_wire(&grid),
            Err(BoardDecodeError::RaggedRow {
                row: 1,
                len: 2,
                expected: 3,
            })
        );
    }

    #[test]
    fn empty_grid_is_an_error() {
        assert_eq!(
            BoardSnapshot::from_wire(&[]),
            Err(BoardDecodeError::EmptyGrid)
        );
        let zero_cols: Vec<Vec<WireCell>> = vec![Vec::new()];
        assert_eq!(
            BoardSnapshot::from_wire(&zero_cols),
            Err(BoardDecodeError::EmptyGrid)
        );
    }

    #[test]
    fn unknown_cell_names_the_offender() {
        let grid = codes(&[&[0, 7]]);
        assert_eq!(
            BoardSnapshot::from_wire(&grid),
            Err(BoardDecodeError::Cell {
                row: 0,
                col: 1,
                source: CellDecodeError::UnknownCode(7),
            })
        );
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let board = BoardSnapshot::empty(6, 7);
        assert_eq!(board.get(6, 0), None);
        assert_eq!(board.get(0, 7), None);
        assert!(board.contains(5, 6));
        assert!(!board.contains(5, 7));
    }

    #[test]
    fn player_id_roundtrip() {
        assert_eq!(Disc::from_player_id(1), Some(Disc::Red));
        assert_eq!(Disc::from_player_id(2), Some(Disc::Yellow));
        assert_eq!(Disc::from_player_id(0), None);
        assert_eq!(Disc::from_player_id(3), None);
        assert_eq!(Disc::Red.player_id(), 1);
        assert_eq!(Disc::Yellow.player_id(), 2);
    }

    proptest! {
        #[test]
        fn decode_never_panics_and_len_invariant_holds(
            grid in prop::collection::vec(
                prop::collection::vec(-3_i64..6, 0..12),
                0..12,
            )
        ) {
            let wire: Vec<Vec<WireCell>> = grid
                .iter()
                .map(|row| row.iter().map(|&code| WireCell::Code(code)).collect())
                .collect();
            if let Ok(board) = BoardSnapshot::from_wire(&wire) {
                prop_assert_eq!(
                    board.cells().len(),
                    usize::from(board.rows()) * usize::from(board.cols())
                );
            }
        }
    }
}
