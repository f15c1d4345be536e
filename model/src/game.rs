use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::info;

use crate::board::Board;
use crate::controller::Controller;
use crate::error::{violation, Reason};

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Delay between a successful slide and the tile it spawns.
    pub spawn_delay: Duration,
    /// Fixes the sequence of spawn cells when set.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            spawn_delay: Duration::from_millis(200),
            seed: None,
        }
    }
}

pub trait UserInterface {
    fn run(&mut self) -> anyhow::Result<()>;
}

/// Builds the user interface once the rest of the game exists. The interface
/// is expected to place the first tile.
pub type CreateUserInterface = Box<dyn FnOnce(&mut Game) -> Box<dyn UserInterface>>;

/// Owns the board, its controller and the user interface, creating each on
/// first use.
pub struct Game {
    config: GameConfig,
    // Fields drop in declaration order: interface, controller, board.
    user_interface: Option<Box<dyn UserInterface>>,
    create_user_interface: Option<CreateUserInterface>,
    controller: Option<Rc<Controller>>,
    board: Option<Rc<RefCell<Board>>>,
}

impl Game {
    pub fn new(config: GameConfig, create_user_interface: CreateUserInterface) -> Self {
        Self {
            config,
            user_interface: None,
            create_user_interface: Some(create_user_interface),
            controller: None,
            board: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&mut self) -> Rc<RefCell<Board>> {
        let config = &self.config;
        self.board
            .get_or_insert_with(|| {
                let board = match config.seed {
                    Some(seed) => Board::with_seed(config.rows, config.cols, seed),
                    None => Board::new(config.rows, config.cols),
                };
                Rc::new(RefCell::new(board))
            })
            .clone()
    }

    pub fn controller(&mut self) -> Rc<Controller> {
        if let Some(controller) = &self.controller {
            return controller.clone();
        }
        let controller = Rc::new(Controller::new(self.board(), self.config.spawn_delay));
        self.controller = Some(controller.clone());
        controller
    }

    pub fn user_interface(&mut self) -> &mut dyn UserInterface {
        if self.user_interface.is_none() {
            let create = match self.create_user_interface.take() {
                Some(create) => create,
                None => violation(
                    Reason::InvalidOperation,
                    format_args!("user interface requested while it is being created"),
                ),
            };
            let user_interface = create(self);
            self.user_interface = Some(user_interface);
        }
        match self.user_interface.as_deref_mut() {
            Some(user_interface) => user_interface,
            None => violation(
                Reason::InvalidOperation,
                format_args!("user interface missing after creation"),
            ),
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        info!(
            "starting {}x{} game, spawn delay {:?}",
            self.config.rows, self.config.cols, self.config.spawn_delay
        );
        self.user_interface().run()
    }
}
