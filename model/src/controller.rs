use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::board::{AddRemoveReason, Board, TileAddRemoveHandler};
use crate::cell::{Cell, SlideDirection};
use crate::scheduler::{self, ScheduledTask};
use crate::tile::{Tile, ValueChangeHandler};

/// Observer of everything a slide does to the board.
///
/// `begin_update` and `end_update` bracket the tile events caused by one
/// slide. Tiles spawned by the deferred task arrive as a lone `tile_added`.
/// Handlers must not borrow the board themselves: it is already borrowed
/// while they run.
pub trait GameUpdateHandler {
    fn begin_update(&self, _board: &Board) {}
    fn end_update(&self, _board: &Board) {}
    fn tile_added(&self, _tile: &Tile) {}
    fn tile_removed(&self, _tile: &Tile) {}
    fn tile_value_changed(&self, _tile: &Tile) {}
}

type UpdateHandlerSlot = Rc<RefCell<Option<Rc<dyn GameUpdateHandler>>>>;

fn current_handler(slot: &UpdateHandlerSlot) -> Option<Rc<dyn GameUpdateHandler>> {
    slot.borrow().clone()
}

/// Places a new tile on a random open cell, if any is left.
fn spawn_tile(board: &RefCell<Board>) -> Option<Cell> {
    let mut board = board.borrow_mut();
    match board.try_get_open_cell() {
        Some(cell) => {
            board.add_tile(cell.row as usize, cell.col as usize);
            Some(cell)
        }
        None => {
            warn!("board {}: no open cell left for a new tile", board.id());
            None
        }
    }
}

pub struct Controller {
    board: Rc<RefCell<Board>>,
    spawn_delay: Duration,
    update_handler: UpdateHandlerSlot,
    value_forwarder: Rc<ValueChangeHandler>,
    add_remove_forwarder: Rc<TileAddRemoveHandler>,
    pending: RefCell<Vec<ScheduledTask>>,
}

impl Controller {
    pub fn new(board: Rc<RefCell<Board>>, spawn_delay: Duration) -> Self {
        let update_handler: UpdateHandlerSlot = Rc::default();

        let value_forwarder: Rc<ValueChangeHandler> = {
            let slot = update_handler.clone();
            Rc::new(move |tile: &Tile| {
                if let Some(handler) = current_handler(&slot) {
                    handler.tile_value_changed(tile);
                }
            })
        };

        // Keeps a value forwarder on exactly the tiles that are on the board.
        let add_remove_forwarder: Rc<TileAddRemoveHandler> = {
            let slot = update_handler.clone();
            let value_forwarder = value_forwarder.clone();
            Rc::new(move |tile: &Tile, reason: AddRemoveReason| {
                let handler = current_handler(&slot);
                match reason {
                    AddRemoveReason::Added => {
                        if let Some(handler) = &handler {
                            handler.tile_added(tile);
                        }
                        tile.add_value_change_handler(value_forwarder.clone());
                    }
                    AddRemoveReason::Removed => {
                        if let Some(handler) = &handler {
                            handler.tile_removed(tile);
                        }
                        tile.remove_value_change_handler(&value_forwarder);
                    }
                }
            })
        };

        {
            let mut board = board.borrow_mut();
            for tile in board.tiles() {
                tile.add_value_change_handler(value_forwarder.clone());
            }
            board.add_tile_add_remove_handler(add_remove_forwarder.clone());
            debug!("board {}: controller attached", board.id());
        }

        Self {
            board,
            spawn_delay,
            update_handler,
            value_forwarder,
            add_remove_forwarder,
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn board(&self) -> &Rc<RefCell<Board>> {
        &self.board
    }

    pub fn set_game_update_handler(&self, handler: Rc<dyn GameUpdateHandler>) {
        *self.update_handler.borrow_mut() = Some(handler);
    }

    pub fn clear_game_update_handler(&self) {
        self.update_handler.borrow_mut().take();
    }

    /// Places a tile on a random open cell right away.
    pub fn spawn_tile(&self) -> Option<Cell> {
        spawn_tile(&self.board)
    }

    /// Number of deferred spawns that have neither run nor been cancelled.
    pub fn pending_spawns(&self) -> usize {
        self.pending
            .borrow()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    fn schedule_spawn(&self) {
        let board = Rc::downgrade(&self.board);
        let task = scheduler::schedule_after(self.spawn_delay, move || {
            if let Some(board) = board.upgrade() {
                if let Some(cell) = spawn_tile(&board) {
                    debug!("new tile spawned at {}", cell);
                }
            }
        });
        let mut pending = self.pending.borrow_mut();
        pending.retain(|task| !task.is_finished());
        pending.push(task);
    }

    pub fn handle_slide(&self, direction: SlideDirection) {
        let handler = current_handler(&self.update_handler);
        let mut board = self.board.borrow_mut();
        if let Some(handler) = &handler {
            handler.begin_update(&board);
        }

        let did_slide = board.try_slide(direction);
        let any_open_cell = board.try_get_open_cell().is_some();
        if did_slide && any_open_cell {
            debug!("board {}: new tile in {:?}", board.id(), self.spawn_delay);
            self.schedule_spawn();
        } else if !did_slide && !any_open_cell {
            // Another direction may still move tiles; nothing acts on this yet.
            info!(
                "board {}: full and slide {} did nothing, game may be over",
                board.id(),
                direction
            );
        }

        if let Some(handler) = &handler {
            handler.end_update(&board);
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.pending.borrow_mut().clear();
        match self.board.try_borrow_mut() {
            Ok(mut board) => {
                for tile in board.tiles() {
                    tile.remove_value_change_handler(&self.value_forwarder);
                }
                board.remove_tile_add_remove_handler(&self.add_remove_forwarder);
                debug!("board {}: controller detached", board.id());
            }
            Err(_) => warn!("controller dropped while its board was borrowed"),
        }
    }
}
