//! The 3×3 board and win detection.

use std::fmt;

use noughts_protocol::{BOARD_CELLS, Cells, Symbol};

use crate::SessionError;

/// The eight winning lines, in the order they are checked:
/// rows top to bottom, columns left to right, then both diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Nine cells in row-major order. A cell, once marked, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: Cells,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mark at `index`, or `None` if empty or out of range.
    pub fn cell(&self, index: usize) -> Option<Symbol> {
        self.cells.get(index).copied().flatten()
    }

    /// Returns a copy of all nine cells.
    pub fn cells(&self) -> Cells {
        self.cells
    }

    /// Marks the cell at `position` with `symbol`.
    ///
    /// # Errors
    /// [`SessionError::InvalidMove`] if `position` is outside 0–8 or the
    /// cell is already marked. The board is unchanged on error.
    pub fn place(&mut self, position: i64, symbol: Symbol) -> Result<(), SessionError> {
        let index = Self::index_of(position).ok_or(SessionError::InvalidMove(position))?;
        let cell = &mut self.cells[index];
        if cell.is_some() {
            return Err(SessionError::InvalidMove(position));
        }
        *cell = Some(symbol);
        Ok(())
    }

    /// Returns the symbol of the first fully and uniformly marked line.
    pub fn winner(&self) -> Option<Symbol> {
        LINES.iter().find_map(|&[a, b, c]| {
            let first = self.cells[a]?;
            (self.cells[b] == Some(first) && self.cells[c] == Some(first)).then_some(first)
        })
    }

    /// Returns `true` when every cell is marked.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of unmarked cells.
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    fn index_of(position: i64) -> Option<usize> {
        usize::try_from(position).ok().filter(|&i| i < BOARD_CELLS)
    }
}

/// Renders `X|O|.` rows separated by `/`, compact enough for one log line.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }
            for (col, cell) in chunk.iter().enumerate() {
                if col > 0 {
                    f.write_str("|")?;
                }
                f.write_str(cell.map_or(".", Symbol::as_str))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(marks: &[(i64, Symbol)]) -> Board {
        let mut board = Board::new();
        for &(pos, sym) in marks {
            board.place(pos, sym).expect("test setup places on open cells");
        }
        board
    }

    #[test]
    fn test_place_marks_only_requested_cell() {
        let mut board = Board::new();
        board.place(4, Symbol::O).unwrap();

        for i in 0..BOARD_CELLS {
            let expected = if i == 4 { Some(Symbol::O) } else { None };
            assert_eq!(board.cell(i), expected, "cell {i}");
        }
        assert_eq!(board.empty_cells(), 8);
    }

    #[test]
    fn test_place_occupied_cell_returns_invalid_move() {
        let mut board = board_from(&[(0, Symbol::X)]);
        let before = board;

        let result = board.place(0, Symbol::O);

        assert!(matches!(result, Err(SessionError::InvalidMove(0))));
        assert_eq!(board, before);
    }

    #[test]
    fn test_place_out_of_range_returns_invalid_move() {
        let mut board = Board::new();
        assert!(matches!(board.place(9, Symbol::X), Err(SessionError::InvalidMove(9))));
        assert!(matches!(board.place(-1, Symbol::X), Err(SessionError::InvalidMove(-1))));
        assert!(matches!(
            board.place(i64::MAX, Symbol::X),
            Err(SessionError::InvalidMove(_))
        ));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_winner_detects_every_line() {
        for line in LINES {
            for sym in [Symbol::X, Symbol::O] {
                let marks: Vec<_> = line.iter().map(|&i| (i as i64, sym)).collect();
                let board = board_from(&marks);
                assert_eq!(board.winner(), Some(sym), "line {line:?}");
            }
        }
    }

    #[test]
    fn test_winner_none_for_mixed_or_partial_lines() {
        assert_eq!(Board::new().winner(), None);

        let two_in_row = board_from(&[(0, Symbol::X), (1, Symbol::X)]);
        assert_eq!(two_in_row.winner(), None);

        let mixed = board_from(&[(0, Symbol::X), (1, Symbol::O), (2, Symbol::X)]);
        assert_eq!(mixed.winner(), None);
    }

    #[test]
    fn test_winner_full_board_without_line_is_none() {
        //  X | O | X
        //  X | O | O
        //  O | X | X
        let board = board_from(&[
            (0, Symbol::X),
            (1, Symbol::O),
            (2, Symbol::X),
            (3, Symbol::X),
            (4, Symbol::O),
            (5, Symbol::O),
            (6, Symbol::O),
            (7, Symbol::X),
            (8, Symbol::X),
        ]);
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_winner_reports_first_line_in_check_order() {
        // Not reachable in play, but pins the scan order: row 0 before row 2.
        let board = board_from(&[
            (0, Symbol::X),
            (1, Symbol::X),
            (2, Symbol::X),
            (6, Symbol::O),
            (7, Symbol::O),
            (8, Symbol::O),
        ]);
        assert_eq!(board.winner(), Some(Symbol::X));
    }

    #[test]
    fn test_display_renders_rows() {
        let board = board_from(&[(0, Symbol::X), (4, Symbol::O), (8, Symbol::X)]);
        assert_eq!(board.to_string(), "X|.|./.|O|./.|.|X");
    }
}
