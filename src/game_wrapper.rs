//! # Game Wrapper Module - Unified Game Interface
//!
//! This module provides the abstraction layer that lets the controller, the AI
//! worker and the CLI handle any supported game through a single interface.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ GameController  │◄──►│   GameWrapper    │◄──►│  Game-Specific  │
//! │                 │    │                  │    │ Implementations │
//! │ • History       │    │ • Unified API    │    │                 │
//! │ • Validation    │    │ • best_move      │    │ • ChessState    │
//! │ • Chance tiles  │    │ • Move parsing   │    │ • Connect4State │
//! └─────────────────┘    └──────────────────┘    │ • Merge2048State│
//!                                                └─────────────────┘
//! ```
//!
//! Using an enum rather than trait objects keeps dispatch static and lets the
//! controller match on a game when it needs game-specific behavior, such as
//! inserting 2048 tiles after a slide.
//!
//! ## Thread Safety
//! Both GameWrapper and MoveWrapper implement Send + Sync, so game states can
//! be handed to the AI worker thread by value.

use crate::config::AiConfig;
use crate::games::chess::{self, ChessMove, ChessState};
use crate::games::connect4::{self, Connect4Move, Connect4State};
use crate::games::merge2048::{self, Merge2048Move, Merge2048State};
use crate::games::MoveParseError;
use crate::search::SearchResult;
use crate::{GameState, GameStatus};
use clap::ValueEnum;
use log::warn;
use rand::Rng;
use std::fmt;

/// The games that can be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum GameKind {
    Chess,
    Connect4,
    #[value(name = "2048")]
    Merge2048,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::Chess => write!(f, "Chess"),
            GameKind::Connect4 => write!(f, "Connect 4"),
            GameKind::Merge2048 => write!(f, "2048"),
        }
    }
}

/// Wrapper enum for all supported game types
///
/// Each variant contains the complete game state for its respective game type.
#[derive(Debug, Clone, PartialEq)]
pub enum GameWrapper {
    /// Simplified chess, White is player 1
    ///
    /// - Fixed 8×8 board, no castling, auto-queen promotion
    /// - Searched with alpha-beta minimax at a difficulty-dependent depth
    Chess(ChessState),

    /// Connect 4 game state
    ///
    /// Gravity-based game where pieces fall to the lowest available position
    /// in each column. Players try to get four in a row.
    /// - 7 wide × 6 tall board
    /// - Played by a one-ply greedy opponent
    Connect4(Connect4State),

    /// 2048 game state
    ///
    /// Single player against random tile insertions on a 4×4 grid.
    /// - The player is 1, chance is -1
    /// - Searched with time-bounded expectimax
    Merge2048(Merge2048State),
}

/// Wrapper enum for all supported move types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveWrapper {
    /// Chess move: origin, destination and moving piece
    Chess(ChessMove),

    /// Connect4 move: column selection with gravity
    ///
    /// The actual row is determined by gravity (lowest available position).
    Connect4(Connect4Move),

    /// 2048 move: a slide, or a tile insertion on the chance turn
    Merge2048(Merge2048Move),
}

impl fmt::Display for MoveWrapper {
    /// Formats moves for display in the CLI and logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::Chess(m) => write!(f, "{}", m),
            MoveWrapper::Connect4(m) => write!(f, "C4({})", m),
            MoveWrapper::Merge2048(m) => write!(f, "{}", m),
        }
    }
}

impl fmt::Display for GameWrapper {
    /// Delegates to the specific game's Display implementation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameWrapper::Chess(g) => write!(f, "{}", g),
            GameWrapper::Connect4(g) => write!(f, "{}", g),
            GameWrapper::Merge2048(g) => write!(f, "{}", g),
        }
    }
}

macro_rules! impl_game_dispatch {
    ($($variant:ident),*) => {
        impl GameState for GameWrapper {
            type Move = MoveWrapper;

            fn get_current_player(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_current_player(),)*
                }
            }

            fn get_possible_moves(&self) -> Vec<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g
                        .get_possible_moves()
                        .into_iter()
                        .map(MoveWrapper::$variant)
                        .collect(),)*
                }
            }

            fn make_move(&mut self, mv: &Self::Move) {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.make_move(m),)*
                    (game, mv) => warn!("ignoring {} for a {} game", mv, game.kind()),
                }
            }

            fn get_status(&self) -> GameStatus {
                match self {
                    $(GameWrapper::$variant(g) => g.get_status(),)*
                }
            }

            fn is_legal(&self, mv: &Self::Move) -> bool {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.is_legal(m),)*
                    _ => false,
                }
            }
        }

        impl GameWrapper {
            /// Which game this is
            pub fn kind(&self) -> GameKind {
                match self {
                    $(GameWrapper::$variant(_) => GameKind::$variant,)*
                }
            }

            /// True if the move belongs to the same game as this state
            pub fn accepts(&self, mv: &MoveWrapper) -> bool {
                matches!((self, mv), $((GameWrapper::$variant(_), MoveWrapper::$variant(_)))|*)
            }
        }
    };
}

impl_game_dispatch!(Chess, Connect4, Merge2048);

impl GameWrapper {
    /// Creates a game in its starting position. 2048 places its two opening
    /// tiles with `rng`.
    pub fn new_game<R: Rng + ?Sized>(kind: GameKind, rng: &mut R) -> Self {
        match kind {
            GameKind::Chess => GameWrapper::Chess(ChessState::new()),
            GameKind::Connect4 => GameWrapper::Connect4(Connect4State::default()),
            GameKind::Merge2048 => GameWrapper::Merge2048(Merge2048State::new_game(rng)),
        }
    }

    /// Asks the game's computer opponent for a move.
    ///
    /// Returns no move only when the player to move has no legal moves.
    pub fn best_move<R: Rng + ?Sized>(&self, config: &AiConfig, rng: &mut R) -> SearchResult<MoveWrapper> {
        match self {
            GameWrapper::Chess(g) => chess::best_move(g, config, rng).map_move(MoveWrapper::Chess),
            GameWrapper::Connect4(g) => connect4::best_move(g).map_move(MoveWrapper::Connect4),
            GameWrapper::Merge2048(g) => merge2048::best_move(g, config, rng).map_move(MoveWrapper::Merge2048),
        }
    }

    /// Parses human input for this game: `e2e4` for chess, a column number for
    /// Connect 4, a direction for 2048
    pub fn parse_move(&self, input: &str) -> Result<MoveWrapper, MoveParseError> {
        match self {
            GameWrapper::Chess(g) => g.parse_move(input).map(MoveWrapper::Chess),
            GameWrapper::Connect4(_) => input.parse().map(MoveWrapper::Connect4),
            GameWrapper::Merge2048(_) => input.parse().map(MoveWrapper::Merge2048),
        }
    }

    /// Notation used in the move history
    pub fn notation(&self, mv: &MoveWrapper) -> String {
        match mv {
            MoveWrapper::Chess(m) => m.notation(),
            MoveWrapper::Connect4(m) => format!("col {}", m),
            MoveWrapper::Merge2048(m) => m.to_string(),
        }
    }

    /// Display name of a player id in this game
    pub fn player_name(&self, player: i32) -> &'static str {
        match (self, player) {
            (GameWrapper::Chess(_), 1) => "White",
            (GameWrapper::Chess(_), _) => "Black",
            (GameWrapper::Connect4(_), 1) => "Red",
            (GameWrapper::Connect4(_), _) => "Yellow",
            (GameWrapper::Merge2048(_), 1) => "Player",
            (GameWrapper::Merge2048(_), _) => "Chance",
        }
    }
}
