//! Board state machine for a 2048-style sliding tile game.
//!
//! [`board::Board`] owns the grid and runs the slide and merge sweeps,
//! [`controller::Controller`] turns a slide request into update notifications
//! and a deferred tile spawn, and [`game::Game`] ties both to a user interface.

use lazy_static::lazy_static;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod error;

pub mod board;
pub mod cell;
pub mod change_notification;
pub mod controller;
pub mod game;
pub mod scheduler;
pub mod tile;
pub mod traversal;

pub use board::{AddRemoveReason, Board, TileAddRemoveHandler};
pub use cell::{Cell, SlideDirection};
pub use controller::{Controller, GameUpdateHandler};
pub use game::{CreateUserInterface, Game, GameConfig, UserInterface};
pub use tile::{Tile, ValueChangeHandler};

lazy_static! {
    static ref NEXT_ID: AtomicUsize = AtomicUsize::new(0);
}

/// Identity used as the listener target of tiles and boards.
pub fn get_next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}
