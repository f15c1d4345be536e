use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;
use model::GameConfig;

/// Slide and merge numbered tiles in the terminal.
#[derive(Parser, Debug)]
#[command(name = "game2048", version)]
pub struct Args {
    /// Number of board rows
    #[arg(long, default_value_t = 4, env = "GAME2048_ROWS")]
    pub rows: usize,

    /// Number of board columns
    #[arg(long, default_value_t = 4, env = "GAME2048_COLS")]
    pub cols: usize,

    /// Milliseconds between a slide and the tile it spawns
    #[arg(long, value_name = "MS", default_value_t = 200, env = "GAME2048_SPAWN_DELAY_MS")]
    pub spawn_delay_ms: u64,

    /// Log filter, e.g. `info` or `model=debug`
    #[arg(long, default_value = "info", env = "GAME2048_LOG_LEVEL")]
    pub log_level: String,

    /// Seed for reproducible tile placement
    #[arg(long, env = "GAME2048_SEED")]
    pub seed: Option<u64>,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.rows > 0, "--rows must be at least 1");
        ensure!(self.cols > 0, "--cols must be at least 1");
        Ok(())
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            rows: self.rows,
            cols: self.cols,
            spawn_delay: Duration::from_millis(self.spawn_delay_ms),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("game2048").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert!(args.validate().is_ok());
        assert_eq!(args.game_config(), GameConfig::default());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn explicit_values() {
        let args = parse(&["--rows", "3", "--cols", "5", "--spawn-delay-ms", "0", "--seed", "9"]);
        let config = args.game_config();
        assert_eq!((config.rows, config.cols), (3, 5));
        assert_eq!(config.spawn_delay, Duration::ZERO);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn zero_rows_rejected() {
        let err = parse(&["--rows", "0"]).validate().unwrap_err();
        assert!(err.to_string().contains("--rows"));
    }

    #[test]
    fn zero_cols_rejected() {
        let err = parse(&["--cols", "0"]).validate().unwrap_err();
        assert!(err.to_string().contains("--cols"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(Args::try_parse_from(["game2048", "--rows", "many"]).is_err());
    }
}
