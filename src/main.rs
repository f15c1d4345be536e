mod config;
mod console;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use model::Game;
use ratatui::{backend::CrosstermBackend, Terminal};

use config::Args;

fn run(args: &Args) -> Result<()> {
    args.validate().context("invalid arguments")?;
    let _raw = console::RawTerminal::enter()?;
    let terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("creating terminal")?;
    let events = std::iter::repeat_with(crossterm::event::read);
    let mut game = Game::new(args.game_config(), console::create_console(terminal, events));
    game.run()?;
    info!("game closed");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();
    run(&args)
}
