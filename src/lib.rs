//! # Game Arcade Search Engine
//!
//! Computer opponents for three turn-based games built on one shared contract:
//! a simplified chess variant, Connect 4 and 2048. Each game supplies a state
//! type implementing [`GameState`]; the generic drivers in [`search`] pick moves
//! for any game that also implements [`Adversarial`] (two-player zero-sum) or
//! [`ChanceGame`] (player versus random tile insertion).
//!
//! Search never touches the authoritative game state. Every explored branch
//! works on its own clone, so sibling branches never observe each other's
//! tentative moves.

pub mod ai_worker;
pub mod config;
pub mod game_controller;
pub mod game_wrapper;
pub mod games;
pub mod search;

pub use config::{AiConfig, ChancePolicy, Difficulty};
pub use search::{SearchResult, SearchStatistics};

/// Current game status, as seen by the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Game is still in progress
    InProgress,
    /// Game ended with a winner
    Win(i32),
    /// Game ended in a draw
    Draw,
}

impl GameStatus {
    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// The state of a game. Must be cloneable so search can branch on copies.
/// `Send` and `Sync` are required to hand states to the AI worker thread.
///
/// Players are identified by `1` and `-1`; `1` always moves first.
pub trait GameState: Clone + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync;

    /// Returns every legal move for the player to move.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies a move to the state, modifying it.
    ///
    /// Callers must only pass moves returned by `get_possible_moves`.
    fn make_move(&mut self, mv: &Self::Move);
    /// Returns whether the game is over and who won.
    fn get_status(&self) -> GameStatus;
    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> i32;

    /// Checks whether `mv` is legal for the player to move.
    fn is_legal(&self, mv: &Self::Move) -> bool {
        self.get_possible_moves().contains(mv)
    }

    /// Returns a copy of this state with `mv` applied, or `None` if the move
    /// is not legal. The receiver is never modified.
    fn apply_move(&self, mv: &Self::Move) -> Option<Self> {
        if !self.is_legal(mv) {
            return None;
        }
        let mut next = self.clone();
        next.make_move(mv);
        Some(next)
    }

    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool {
        self.get_status().is_game_over()
    }

    /// Returns the winner of the game, if any.
    /// `None` means a draw or that the game is not over.
    fn get_winner(&self) -> Option<i32> {
        match self.get_status() {
            GameStatus::Win(player) => Some(player),
            _ => None,
        }
    }
}

/// A two-player zero-sum game that can be searched with minimax.
///
/// Scores are always from the point of view of player `1`, who maximizes.
pub trait Adversarial: GameState {
    /// Static heuristic value of a position.
    fn evaluate(&self) -> i32;
    /// Value of a position in which the player to move has no legal moves.
    fn terminal_score(&self) -> i32;
}

/// A single-player game against random insertions, searched with expectimax.
pub trait ChanceGame: GameState {
    /// True when the next move is made by chance rather than by the player.
    fn is_chance_turn(&self) -> bool;
    /// Heuristic value of a position for the player.
    fn heuristic(&self) -> f64;
    /// True when the player can never move again.
    fn is_lost(&self) -> bool;
    /// Probability of a chance move among all moves from this state.
    fn chance_probability(&self, mv: &Self::Move) -> f64;
}
