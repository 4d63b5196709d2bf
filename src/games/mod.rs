//! # Game Implementations Module
//!
//! This module contains the three games with computer opponents. Each game
//! implements the `GameState` trait to provide a consistent interface for the
//! search drivers and the game controller.
//!
//! ## Supported Games
//! - **Chess**: a simplified variant (no castling, auto-queen promotion),
//!   searched with alpha-beta minimax
//! - **Connect 4**: gravity-based 4-in-a-row on a 6x7 grid, played by a
//!   one-ply greedy opponent with tactical overrides
//! - **2048**: sliding-tile merge game, played by expectimax with iterative
//!   deepening under a wall-clock budget
//!
//! ## Adding New Games
//! To add a new game, create a new module and implement:
//! 1. A move type with `Display` and `FromStr`
//! 2. A game state type with the `GameState` trait
//! 3. `Adversarial` or `ChanceGame` so a search driver can play it
//! 4. A `best_move` entry point that picks the driver and its settings

use thiserror::Error;

pub mod chess;
pub mod connect4;
pub mod merge2048;

/// Errors produced when parsing a human-entered move
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("expected a move like `e2e4`, got `{0}`")]
    MalformedSquarePair(String),
    #[error("`{0}` is not a square between a1 and h8")]
    InvalidSquare(String),
    #[error("there is no piece on {0}")]
    EmptySquare(String),
    #[error("`{0}` is not a column number")]
    InvalidColumn(String),
    #[error("`{0}` is not a direction (up, down, left, right or w/a/s/d)")]
    UnknownDirection(String),
}
