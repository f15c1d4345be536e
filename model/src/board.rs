use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::cell::{Cell, SlideDirection};
use crate::change_notification::ChangeNotification;
use crate::ensure;
use crate::error::{violation, Reason};
use crate::get_next_id;
use crate::tile::Tile;
use crate::traversal::CellTraversal;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddRemoveReason {
    Added,
    Removed,
}

/// Called for every tile placed on or taken off the board.
pub type TileAddRemoveHandler = dyn Fn(&Tile, AddRemoveReason);

type Slot = (usize, usize);

enum Step {
    Hold,
    Move,
    Merge,
}

pub struct Board {
    id: usize,
    tiles: Array2<Option<Tile>>,
    traversals: [CellTraversal; 4],
    add_remove_listeners: ChangeNotification<TileAddRemoveHandler>,
    rng: RefCell<StdRng>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_rng(rows, cols, StdRng::from_entropy())
    }

    /// A board whose open cell choices are reproducible.
    pub fn with_seed(rows: usize, cols: usize, seed: u64) -> Self {
        Self::with_rng(rows, cols, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rows: usize, cols: usize, rng: StdRng) -> Self {
        ensure!(
            rows > 0 && cols > 0,
            Reason::ArgumentOutOfRange,
            "board must have at least one row and column, got {}x{}",
            rows,
            cols
        );
        let id = get_next_id();
        debug!("board {}: created {}x{}", id, rows, cols);
        Self {
            id,
            tiles: Array2::default((rows, cols)),
            traversals: SlideDirection::ALL.map(|d| CellTraversal::new(d, rows, cols)),
            add_remove_listeners: ChangeNotification::new(),
            rng: RefCell::new(rng),
        }
    }

    /// Builds a board from tile values, `0` meaning an empty cell.
    pub fn from_array(array: Array2<u32>) -> Self {
        let (rows, cols) = array.dim();
        let mut board = Self::new(rows, cols);
        for ((row, col), &value) in array.indexed_iter() {
            board.tiles[(row, col)] = match value {
                0 => None,
                v if v >= 2 && v.count_ones() == 1 => Some(Tile::with_value(row, col, v)),
                v => violation(
                    Reason::ArgumentOutOfRange,
                    format_args!("expected 0 or a power of two above 1, got {}", v),
                ),
            };
        }
        board
    }

    /// Tile values with `0` for empty cells.
    pub fn to_array(&self) -> Array2<u32> {
        self.tiles
            .map(|slot| slot.as_ref().map_or(0, |tile| tile.value()))
    }

    pub fn id(&self) -> usize {
        self.id
    }
    pub fn rows(&self) -> usize {
        self.tiles.nrows()
    }
    pub fn cols(&self) -> usize {
        self.tiles.ncols()
    }

    fn slot(&self, row: usize, col: usize) -> Slot {
        ensure!(
            row < self.rows(),
            Reason::ArgumentOutOfRange,
            "row {} outside board of {} rows",
            row,
            self.rows()
        );
        ensure!(
            col < self.cols(),
            Reason::ArgumentOutOfRange,
            "column {} outside board of {} columns",
            col,
            self.cols()
        );
        (row, col)
    }

    fn cell_slot(&self, cell: Cell) -> Slot {
        ensure!(
            self.is_valid_cell(cell),
            Reason::ArgumentOutOfRange,
            "cell {} outside {}x{} board",
            cell,
            self.rows(),
            self.cols()
        );
        (cell.row as usize, cell.col as usize)
    }

    pub fn is_valid_cell(&self, cell: Cell) -> bool {
        cell.is_within(self.rows(), self.cols())
    }

    pub fn get_tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.tiles[self.slot(row, col)].as_ref()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter_map(Option::as_ref)
    }

    pub fn can_add_tile(&self, row: usize, col: usize) -> bool {
        self.tiles[self.slot(row, col)].is_none()
    }

    pub fn add_tile(&mut self, row: usize, col: usize) {
        ensure!(
            self.can_add_tile(row, col),
            Reason::InvalidOperation,
            "cell ({}, {}) already holds a tile",
            row,
            col
        );
        debug!("board {}: new tile at ({}, {})", self.id, row, col);
        self.add_tile_core(Tile::new(row, col));
    }

    pub fn open_cells(&self) -> Vec<Cell> {
        self.tiles
            .indexed_iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| Cell::from(index))
            .collect()
    }

    /// A uniformly chosen empty cell, `None` once the board is full.
    pub fn try_get_open_cell(&self) -> Option<Cell> {
        let cells = self.open_cells();
        if cells.is_empty() {
            return None;
        }
        let index = self.rng.borrow_mut().gen_range(0..cells.len());
        Some(cells[index])
    }

    pub fn add_tile_add_remove_handler(&mut self, handler: Rc<TileAddRemoveHandler>) {
        self.add_remove_listeners.add(self.id, (), handler);
    }

    pub fn remove_tile_add_remove_handler(&mut self, handler: &Rc<TileAddRemoveHandler>) {
        self.add_remove_listeners.remove(self.id, handler);
    }

    fn notify(&self, tile: &Tile, reason: AddRemoveReason) {
        self.add_remove_listeners
            .notify_all(|_, _, handler| handler(tile, reason));
    }

    fn add_tile_core(&mut self, tile: Tile) {
        let slot = self.slot(tile.row(), tile.column());
        self.tiles[slot] = Some(tile);
        if let Some(tile) = &self.tiles[slot] {
            self.notify(tile, AddRemoveReason::Added);
        }
    }

    fn remove_tile(&mut self, slot: Slot) {
        if let Some(tile) = self.tiles[slot].take() {
            self.notify(&tile, AddRemoveReason::Removed);
        }
    }

    fn move_tile(&mut self, source: Slot, target: Slot) {
        let copy = match &self.tiles[source] {
            Some(tile) => tile.copy_to(target.0, target.1),
            None => return,
        };
        trace!("board {}: move {:?} -> {:?}", self.id, source, target);
        self.add_tile_core(copy);
        self.remove_tile(source);
    }

    /// Folds the tile at `source` into the one at `target`, returning the id
    /// of the tile that grew.
    fn merge_tiles(&mut self, source: Slot, target: Slot) -> usize {
        let absorbed = self.tiles[source].take();
        let merged_id = match (&absorbed, self.tiles[target].as_mut()) {
            (Some(absorbed), Some(tile)) => {
                tile.merge(absorbed);
                tile.id()
            }
            _ => violation(
                Reason::InvalidOperation,
                format_args!("merge {:?} -> {:?} needs two tiles", source, target),
            ),
        };
        trace!("board {}: merge {:?} -> {:?}", self.id, source, target);
        if let Some(absorbed) = absorbed {
            self.notify(&absorbed, AddRemoveReason::Removed);
        }
        merged_id
    }

    /// Slides every tile towards `direction`, merging equal neighbours.
    ///
    /// Sweeps repeat until one makes no change. Within a sweep a tile takes
    /// part in at most one merge; the merged set is cleared between sweeps.
    /// Returns whether anything moved or merged.
    pub fn try_slide(&mut self, direction: SlideDirection) -> bool {
        let d = direction.index();
        let mut merged: Vec<usize> = Vec::new();
        let mut did_slide = false;
        let mut sweeps = 0;
        loop {
            let mut slid_once = false;
            sweeps += 1;
            self.traversals[d].reset();
            while self.traversals[d].move_next() {
                let (source, target) = self.traversals[d].current_pair();
                let source = self.cell_slot(source);
                let target = self.cell_slot(target);
                let step = match (&self.tiles[source], &self.tiles[target]) {
                    (Some(_), None) => Step::Move,
                    (Some(s), Some(t))
                        if t.can_merge(s) && !merged.contains(&s.id()) && !merged.contains(&t.id()) =>
                    {
                        Step::Merge
                    }
                    _ => Step::Hold,
                };
                match step {
                    Step::Hold => {}
                    Step::Move => {
                        self.move_tile(source, target);
                        slid_once = true;
                    }
                    Step::Merge => {
                        merged.push(self.merge_tiles(source, target));
                        slid_once = true;
                    }
                }
            }
            if !slid_once {
                break;
            }
            did_slide = true;
            merged.clear();
        }
        debug!(
            "board {}: slide {} {} after {} sweeps",
            self.id,
            direction,
            if did_slide { "changed the board" } else { "had no effect" },
            sweeps
        );
        did_slide
    }
}
