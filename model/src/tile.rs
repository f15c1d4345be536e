use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::change_notification::ChangeNotification;
use crate::ensure;
use crate::error::{violation, Reason};
use crate::get_next_id;

/// Called with the tile whose value just changed.
pub type ValueChangeHandler = dyn Fn(&Tile);

type ValueChangeListeners = Rc<RefCell<ChangeNotification<ValueChangeHandler>>>;

const SPAWN_VALUE: u32 = 2;

pub struct Tile {
    id: usize,
    row: usize,
    column: usize,
    value: u32,
    value_changed: ValueChangeListeners,
}

fn adjacent(a: usize, b: usize) -> bool {
    a + 1 == b || b + 1 == a
}

impl Tile {
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            id: get_next_id(),
            row,
            column,
            value: SPAWN_VALUE,
            value_changed: Rc::default(),
        }
    }

    pub(crate) fn with_value(row: usize, column: usize, value: u32) -> Self {
        let mut tile = Self::new(row, column);
        tile.value = value;
        tile
    }

    pub fn id(&self) -> usize {
        self.id
    }
    pub fn row(&self) -> usize {
        self.row
    }
    pub fn column(&self) -> usize {
        self.column
    }
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn add_value_change_handler(&self, handler: Rc<ValueChangeHandler>) {
        self.value_changed.borrow_mut().add(self.id, (), handler);
    }

    pub fn remove_value_change_handler(&self, handler: &Rc<ValueChangeHandler>) {
        self.value_changed.borrow_mut().remove(self.id, handler);
    }

    pub fn value_change_handler_count(&self) -> usize {
        self.value_changed.borrow().len()
    }

    /// Tiles merge when they touch along a row or a column (never diagonally)
    /// and carry the same value.
    pub fn can_merge(&self, other: &Tile) -> bool {
        let touches = (self.row == other.row && adjacent(self.column, other.column))
            || (self.column == other.column && adjacent(self.row, other.row));
        touches && self.value == other.value
    }

    pub fn merge(&mut self, other: &Tile) {
        ensure!(
            self.can_merge(other),
            Reason::InvalidOperation,
            "tile {:?} can not merge {:?}",
            self,
            other
        );
        self.value = match self.value.checked_add(other.value) {
            Some(value) => value,
            None => violation(
                Reason::InvalidOperation,
                format_args!("merging {:?} into {:?} overflows", other, self),
            ),
        };
        let tile: &Tile = self;
        tile.value_changed
            .borrow()
            .notify_all(|_, _, handler| handler(tile));
    }

    /// Creates a tile with the same value at another position.
    ///
    /// A non-empty listener list is shared with the copy rather than cloned,
    /// so handlers registered on either tile afterwards are visible through
    /// both.
    pub fn copy_to(&self, row: usize, column: usize) -> Tile {
        let mut tile = Tile::with_value(row, column, self.value);
        if !self.value_changed.borrow().is_empty() {
            tile.value_changed = Rc::clone(&self.value_changed);
        }
        tile
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("id", &self.id)
            .field("row", &self.row)
            .field("column", &self.column)
            .field("value", &self.value)
            .finish()
    }
}
