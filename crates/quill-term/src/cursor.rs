// SPDX-License-Identifier: MIT
//
// Cursor position with wrap-around motion.
//
// The cursor lives strictly inside the resolved geometry: every motion
// produces an in-bounds position by construction, so nothing downstream
// ever clamps an invalid state after the fact. Horizontal motion wraps
// onto the adjacent row (changing the row by at most one, clamped at the
// top and bottom edges); vertical motion wraps top-to-bottom without
// touching the column.

use crate::geometry::ScreenGeometry;

/// A cursor motion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A 0-indexed screen cell position, always within geometry bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub row: u16,
    pub col: u16,
}

impl CursorPosition {
    /// The top-left cell.
    pub const ORIGIN: Self = Self { row: 0, col: 0 };

    /// Move one cell in `direction`, wrapping at the screen edges.
    ///
    /// Wrap laws:
    /// - Left at column 0 → last column of the previous row (row clamped
    ///   at the top: no wrap past row 0).
    /// - Right at the last column → column 0 of the next row (row clamped
    ///   at the bottom).
    /// - Up at row 0 → last row, same column.
    /// - Down at the last row → row 0, same column.
    pub fn step(&mut self, direction: Direction, geometry: ScreenGeometry) {
        let last_row = geometry.rows - 1;
        let last_col = geometry.cols - 1;

        match direction {
            Direction::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else {
                    self.col = last_col;
                    self.row = self.row.saturating_sub(1);
                }
            }
            Direction::Right => {
                if self.col < last_col {
                    self.col += 1;
                } else {
                    self.col = 0;
                    self.row = (self.row + 1).min(last_row);
                }
            }
            Direction::Up => {
                self.row = if self.row == 0 { last_row } else { self.row - 1 };
            }
            Direction::Down => {
                self.row = if self.row == last_row { 0 } else { self.row + 1 };
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const GEOMETRY: ScreenGeometry = ScreenGeometry { rows: 3, cols: 10 };

    fn at(row: u16, col: u16) -> CursorPosition {
        CursorPosition { row, col }
    }

    fn stepped(mut pos: CursorPosition, direction: Direction) -> CursorPosition {
        pos.step(direction, GEOMETRY);
        pos
    }

    // ── Interior motion ─────────────────────────────────────────────

    #[test]
    fn interior_moves_one_cell() {
        assert_eq!(stepped(at(1, 5), Direction::Left), at(1, 4));
        assert_eq!(stepped(at(1, 5), Direction::Right), at(1, 6));
        assert_eq!(stepped(at(1, 5), Direction::Up), at(0, 5));
        assert_eq!(stepped(at(1, 5), Direction::Down), at(2, 5));
    }

    // ── Wrap laws ───────────────────────────────────────────────────

    #[test]
    fn left_at_column_zero_wraps_to_previous_row_end() {
        assert_eq!(stepped(at(2, 0), Direction::Left), at(1, 9));
    }

    #[test]
    fn left_at_origin_clamps_to_top_row() {
        assert_eq!(stepped(at(0, 0), Direction::Left), at(0, 9));
    }

    #[test]
    fn right_at_last_column_wraps_to_next_row_start() {
        assert_eq!(stepped(at(0, 9), Direction::Right), at(1, 0));
    }

    #[test]
    fn right_at_bottom_right_clamps_to_last_row() {
        assert_eq!(stepped(at(2, 9), Direction::Right), at(2, 0));
    }

    #[test]
    fn up_at_top_wraps_to_last_row_same_column() {
        assert_eq!(stepped(at(0, 4), Direction::Up), at(2, 4));
    }

    #[test]
    fn down_at_bottom_wraps_to_top_same_column() {
        assert_eq!(stepped(at(2, 4), Direction::Down), at(0, 4));
    }

    // ── Invariants ──────────────────────────────────────────────────

    #[test]
    fn every_motion_from_every_cell_stays_in_bounds() {
        let directions = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];
        for row in 0..GEOMETRY.rows {
            for col in 0..GEOMETRY.cols {
                for direction in directions {
                    let pos = stepped(at(row, col), direction);
                    assert!(
                        pos.row < GEOMETRY.rows && pos.col < GEOMETRY.cols,
                        "{direction:?} from ({row},{col}) escaped to ({},{})",
                        pos.row,
                        pos.col
                    );
                }
            }
        }
    }

    #[test]
    fn horizontal_wrap_changes_row_by_exactly_the_clamped_step() {
        for row in 0..GEOMETRY.rows {
            let left = stepped(at(row, 0), Direction::Left);
            assert_eq!(left, at(row.saturating_sub(1), GEOMETRY.cols - 1));

            let right = stepped(at(row, GEOMETRY.cols - 1), Direction::Right);
            assert_eq!(right, at((row + 1).min(GEOMETRY.rows - 1), 0));
        }
    }

    #[test]
    fn vertical_wrap_never_changes_column() {
        for col in 0..GEOMETRY.cols {
            assert_eq!(stepped(at(0, col), Direction::Up).col, col);
            assert_eq!(stepped(at(GEOMETRY.rows - 1, col), Direction::Down).col, col);
        }
    }

    #[test]
    fn single_cell_screen_is_a_fixed_point() {
        let unit = ScreenGeometry { rows: 1, cols: 1 };
        let directions = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];
        for direction in directions {
            let mut pos = CursorPosition::ORIGIN;
            pos.step(direction, unit);
            assert_eq!(pos, CursorPosition::ORIGIN);
        }
    }
}
