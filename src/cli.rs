//! Command-line interface for reversi_match.

use crate::config::{GameMode, SeatKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reversi Match - play Reversi against people, local bots, LLMs or remote peers
#[derive(Parser, Debug)]
#[command(name = "reversi_match")]
#[command(about = "Reversi turn coordinator with pluggable move providers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Path to a match config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preset seat pair
        #[arg(short, long, value_enum)]
        mode: Option<GameMode>,

        /// Who plays Black (overrides mode)
        #[arg(long, value_enum)]
        black: Option<SeatKind>,

        /// Who plays White (overrides mode)
        #[arg(long, value_enum)]
        white: Option<SeatKind>,

        /// Provider timeout in milliseconds (0 disables)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Pause before each provider move in milliseconds
        #[arg(long)]
        think_delay_ms: Option<u64>,

        /// Seed for random and fallback moves
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the starting board and the opening moves
    Show,
}
