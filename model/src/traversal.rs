//! Per-direction cursor over the (source, target) cell pairs of one sweep.
//!
//! Cells on the edge a slide pulls towards are never a source, so each
//! direction walks the remaining band of the grid, starting next to that edge
//! and moving away from it. A tile is therefore evaluated after the cell in
//! front of it has already had its chance to move during the same sweep.

use crate::cell::{Cell, SlideDirection};
use crate::ensure;
use crate::error::Reason;

struct TraversalRules {
    min_rows: usize,
    min_cols: usize,
    first: fn(usize, usize) -> Cell,
    last: fn(usize, usize) -> Cell,
    advance: fn(Cell, usize, usize) -> Cell,
}

fn first_up(_rows: usize, _cols: usize) -> Cell {
    Cell::new(1, 0)
}
fn first_down(rows: usize, _cols: usize) -> Cell {
    Cell::new(rows as i32 - 2, 0)
}
fn first_left(_rows: usize, _cols: usize) -> Cell {
    Cell::new(0, 1)
}
fn first_right(_rows: usize, cols: usize) -> Cell {
    Cell::new(0, cols as i32 - 2)
}

fn last_bottom_right(rows: usize, cols: usize) -> Cell {
    Cell::new(rows as i32 - 1, cols as i32 - 1)
}
fn last_top_right(_rows: usize, cols: usize) -> Cell {
    Cell::new(0, cols as i32 - 1)
}
fn last_bottom_left(rows: usize, _cols: usize) -> Cell {
    Cell::new(rows as i32 - 1, 0)
}

// Row sweeps run left to right, column sweeps top to bottom.
fn advance_row_down(cell: Cell, _rows: usize, cols: usize) -> Cell {
    if (cell.col as usize) < cols - 1 {
        Cell::new(cell.row, cell.col + 1)
    } else {
        Cell::new(cell.row + 1, 0)
    }
}
fn advance_row_up(cell: Cell, _rows: usize, cols: usize) -> Cell {
    if (cell.col as usize) < cols - 1 {
        Cell::new(cell.row, cell.col + 1)
    } else {
        Cell::new(cell.row - 1, 0)
    }
}
fn advance_column_right(cell: Cell, rows: usize, _cols: usize) -> Cell {
    if (cell.row as usize) < rows - 1 {
        Cell::new(cell.row + 1, cell.col)
    } else {
        Cell::new(0, cell.col + 1)
    }
}
fn advance_column_left(cell: Cell, rows: usize, _cols: usize) -> Cell {
    if (cell.row as usize) < rows - 1 {
        Cell::new(cell.row + 1, cell.col)
    } else {
        Cell::new(0, cell.col - 1)
    }
}

// Indexed by `SlideDirection::index`.
static RULES: [TraversalRules; 4] = [
    TraversalRules {
        min_rows: 2,
        min_cols: 1,
        first: first_up,
        last: last_bottom_right,
        advance: advance_row_down,
    },
    TraversalRules {
        min_rows: 2,
        min_cols: 1,
        first: first_down,
        last: last_top_right,
        advance: advance_row_up,
    },
    TraversalRules {
        min_rows: 1,
        min_cols: 2,
        first: first_left,
        last: last_bottom_right,
        advance: advance_column_right,
    },
    TraversalRules {
        min_rows: 1,
        min_cols: 2,
        first: first_right,
        last: last_bottom_left,
        advance: advance_column_left,
    },
];

#[derive(Clone, Debug)]
pub struct CellTraversal {
    direction: SlideDirection,
    rows: usize,
    cols: usize,
    current: Cell,
    exhausted: bool,
}

impl CellTraversal {
    pub fn new(direction: SlideDirection, rows: usize, cols: usize) -> Self {
        Self {
            direction,
            rows,
            cols,
            current: Cell::INVALID,
            exhausted: false,
        }
    }

    pub fn direction(&self) -> SlideDirection {
        self.direction
    }

    fn rules(&self) -> &'static TraversalRules {
        &RULES[self.direction.index()]
    }

    pub fn reset(&mut self) {
        self.current = Cell::INVALID;
        self.exhausted = false;
    }

    /// Advances the cursor. Once this returns false the cursor is invalid
    /// again and stays exhausted until [`CellTraversal::reset`].
    pub fn move_next(&mut self) -> bool {
        let rules = self.rules();
        if self.exhausted || self.rows < rules.min_rows || self.cols < rules.min_cols {
            return false;
        }
        if !self.current.is_within(self.rows, self.cols) {
            self.current = (rules.first)(self.rows, self.cols);
            return true;
        }
        if self.current == (rules.last)(self.rows, self.cols) {
            self.current = Cell::INVALID;
            self.exhausted = true;
            return false;
        }
        self.current = (rules.advance)(self.current, self.rows, self.cols);
        true
    }

    /// The cell under the cursor and its neighbour in the slide direction.
    pub fn current_pair(&self) -> (Cell, Cell) {
        ensure!(
            self.current.is_within(self.rows, self.cols),
            Reason::InvalidOperation,
            "{} traversal has no current cell",
            self.direction
        );
        (self.current, self.current.neighbour(self.direction))
    }
}

impl Iterator for CellTraversal {
    type Item = (Cell, Cell);

    fn next(&mut self) -> Option<Self::Item> {
        if self.move_next() {
            Some(self.current_pair())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SlideDirection::{Down, Left, Right, Up};

    fn pairs(direction: SlideDirection, rows: usize, cols: usize) -> Vec<((i32, i32), (i32, i32))> {
        CellTraversal::new(direction, rows, cols)
            .map(|(s, t)| ((s.row, s.col), (t.row, t.col)))
            .collect()
    }

    #[test]
    fn slide_up() {
        #[rustfmt::skip]
        let expected = vec![
            ((1, 0), (0, 0)), ((1, 1), (0, 1)), ((1, 2), (0, 2)),
            ((2, 0), (1, 0)), ((2, 1), (1, 1)), ((2, 2), (1, 2)),
        ];
        assert_eq!(pairs(Up, 3, 3), expected);
    }

    #[test]
    fn slide_down() {
        #[rustfmt::skip]
        let expected = vec![
            ((1, 0), (2, 0)), ((1, 1), (2, 1)), ((1, 2), (2, 2)),
            ((0, 0), (1, 0)), ((0, 1), (1, 1)), ((0, 2), (1, 2)),
        ];
        assert_eq!(pairs(Down, 3, 3), expected);
    }

    #[test]
    fn slide_left() {
        #[rustfmt::skip]
        let expected = vec![
            ((0, 1), (0, 0)), ((1, 1), (1, 0)), ((2, 1), (2, 0)),
            ((0, 2), (0, 1)), ((1, 2), (1, 1)), ((2, 2), (2, 1)),
        ];
        assert_eq!(pairs(Left, 3, 3), expected);
    }

    #[test]
    fn slide_right() {
        #[rustfmt::skip]
        let expected = vec![
            ((0, 1), (0, 2)), ((1, 1), (1, 2)), ((2, 1), (2, 2)),
            ((0, 0), (0, 1)), ((1, 0), (1, 1)), ((2, 0), (2, 1)),
        ];
        assert_eq!(pairs(Right, 3, 3), expected);
    }

    #[test]
    fn too_small_grid_has_no_pairs() {
        assert!(pairs(Up, 1, 4).is_empty());
        assert!(pairs(Down, 1, 4).is_empty());
        assert!(pairs(Left, 4, 1).is_empty());
        assert!(pairs(Right, 4, 1).is_empty());
        assert!(pairs(Left, 1, 1).is_empty());
    }

    #[test]
    fn single_column_and_row() {
        assert_eq!(pairs(Up, 3, 1), vec![((1, 0), (0, 0)), ((2, 0), (1, 0))]);
        assert_eq!(pairs(Right, 1, 3), vec![((0, 1), (0, 2)), ((0, 0), (0, 1))]);
    }

    #[test]
    fn exhausted_traversal_stays_exhausted_until_reset() {
        let mut traversal = CellTraversal::new(Left, 1, 2);
        assert!(traversal.move_next());
        assert!(!traversal.move_next());
        assert!(!traversal.move_next());
        traversal.reset();
        assert!(traversal.move_next());
        assert_eq!(traversal.current_pair(), (Cell::new(0, 1), Cell::new(0, 0)));
    }

    #[test]
    #[should_panic(expected = "invalid operation")]
    fn pair_after_exhaustion_panics() {
        let mut traversal = CellTraversal::new(Up, 2, 1);
        assert!(traversal.move_next());
        assert!(!traversal.move_next());
        traversal.current_pair();
    }

    #[test]
    #[should_panic(expected = "invalid operation")]
    fn pair_before_move_next_panics() {
        CellTraversal::new(Down, 2, 2).current_pair();
    }
}
