//! # Game Controller Module - Central Game State Management
//!
//! This module provides the `GameController` which serves as the single source of truth
//! for the authoritative game state. It ensures proper separation between:
//!
//! - **Authoritative Game State**: The "real" game state owned by the controller
//! - **Search States**: Clones handed to the search drivers or the AI worker
//! - **Render States**: Borrowed views used by the CLI to draw the board
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       GameController                                │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              Authoritative Game State                       │    │
//! │  │  • Single source of truth                                   │    │
//! │  │  • All moves validated here before application              │    │
//! │  │  • Move history maintained                                  │    │
//! │  │  • 2048 tiles inserted here after every slide               │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                           │                                         │
//! │              ┌────────────┼────────────┐                            │
//! │              ▼            ▼            ▼                            │
//! │  ┌───────────────┐ ┌───────────┐ ┌─────────────────┐                │
//! │  │ AI Worker     │ │ CLI       │ │ Human input     │                │
//! │  │ (cloned state)│ │ (view)    │ │ (requests)      │                │
//! │  └───────────────┘ └───────────┘ └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Search never touches the authoritative state: the controller is mutated
//! only after a search (or a human move) completes.

use crate::config::AiConfig;
use crate::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use crate::games::merge2048;
use crate::search::SearchResult;
use crate::{GameState, GameStatus};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::SystemTime;
use thiserror::Error;

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        /// The applied move
        move_made: MoveWrapper,
        /// Player who made the move
        player: i32,
        /// Whether the game is now over
        game_over: bool,
        /// Winner if game is over (None for draw)
        winner: Option<i32>,
    },
    /// Move was rejected as invalid; nothing was changed
    Invalid {
        /// Reason the move was rejected
        reason: MoveValidationError,
    },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// Errors that can occur during move validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveValidationError {
    /// Move is not in the list of legal moves
    #[error("Illegal move")]
    IllegalMove,
    /// Move type doesn't match the current game
    #[error("Move type doesn't match game")]
    MismatchedGameType,
    /// The game is already in a terminal state
    #[error("Game is already over")]
    GameAlreadyOver,
}

/// A single entry in the move history
#[derive(Debug, Clone, PartialEq)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: i32,
    /// The move that was made
    pub move_made: MoveWrapper,
    /// Short notation, e.g. `Nf3` in chess
    pub notation: String,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    /// Create a new move history entry
    pub fn new(player: i32, move_made: MoveWrapper, notation: String, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            notation,
            move_number,
        }
    }
}

/// The central game controller that owns the authoritative game state
///
/// This is the single source of truth for the game state. All moves must
/// go through the controller, which validates them before application.
///
/// # Usage
/// ```rust
/// use arcade::game_controller::{GameController, MoveResult};
/// use arcade::game_wrapper::GameKind;
/// use arcade::AiConfig;
///
/// let mut controller = GameController::new(GameKind::Connect4, 7);
/// let mv = controller.get_render_state().parse_move("3").unwrap();
/// assert!(matches!(controller.try_make_move(mv), MoveResult::Success { .. }));
///
/// // The computer replies on a clone of the authoritative state
/// controller.play_ai_turn(&AiConfig::default());
/// assert_eq!(controller.move_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    /// The authoritative game state
    game_state: GameWrapper,
    /// Complete history of moves made, chance insertions included
    move_history: Vec<MoveHistoryEntry>,
    /// Current game status
    status: GameStatus,
    /// Drives 2048 insertions and randomized opponents
    rng: Xoshiro256PlusPlus,
}

impl GameController {
    /// Create a controller for a fresh game; `seed` makes the session reproducible
    pub fn new(kind: GameKind, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let game_state = GameWrapper::new_game(kind, &mut rng);
        Self::with_rng(game_state, rng)
    }

    /// Create a controller for an arbitrary position
    pub fn from_state(initial_state: GameWrapper, seed: u64) -> Self {
        Self::with_rng(initial_state, Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn with_rng(game_state: GameWrapper, rng: Xoshiro256PlusPlus) -> Self {
        let status = game_state.get_status();
        Self {
            game_state,
            move_history: Vec::new(),
            status,
            rng,
        }
    }

    /// Validate a move without applying it
    ///
    /// Returns Ok(()) if the move is valid, or an error describing why it's invalid.
    pub fn validate_move(&self, mv: &MoveWrapper) -> Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if !self.game_state.accepts(mv) {
            return Err(MoveValidationError::MismatchedGameType);
        }
        if !self.game_state.is_legal(mv) {
            return Err(MoveValidationError::IllegalMove);
        }
        Ok(())
    }

    /// Attempt to make a move
    ///
    /// Validates the move and applies it if valid. A rejected move leaves the
    /// game untouched.
    pub fn try_make_move(&mut self, mv: MoveWrapper) -> MoveResult {
        if let Err(reason) = self.validate_move(&mv) {
            warn!("rejected {} in {}: {}", mv, self.game_state.kind(), reason);
            return MoveResult::Invalid { reason };
        }
        self.apply(mv)
    }

    /// Apply a move without validation (for AI moves that are trusted)
    ///
    /// Should only be used for moves that come from a search over the same
    /// state, which only ever proposes legal moves.
    pub fn apply_trusted_move(&mut self, mv: MoveWrapper) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        if !self.game_state.accepts(&mv) {
            warn!("dropping {} meant for another game than {}", mv, self.game_state.kind());
            return MoveResult::Invalid {
                reason: MoveValidationError::MismatchedGameType,
            };
        }
        self.apply(mv)
    }

    fn apply(&mut self, mv: MoveWrapper) -> MoveResult {
        let player = self.game_state.get_current_player();
        self.record_and_play(player, mv.clone());
        info!(
            "{} plays {}",
            self.game_state.player_name(player),
            self.move_history.last().map_or("", |entry| entry.notation.as_str())
        );

        self.status = self.game_state.get_status();
        if !self.status.is_game_over() {
            self.insert_chance_tile();
        }

        let game_over = self.status.is_game_over();
        let winner = self.get_winner();
        if game_over {
            match winner {
                Some(w) => info!("game over: {} wins", self.game_state.player_name(w)),
                None => info!("game over: draw"),
            }
        }

        MoveResult::Success {
            move_made: mv,
            player,
            game_over,
            winner,
        }
    }

    fn record_and_play(&mut self, player: i32, mv: MoveWrapper) {
        let notation = self.game_state.notation(&mv);
        let move_number = self.move_history.len() + 1;
        self.game_state.make_move(&mv);
        self.move_history
            .push(MoveHistoryEntry::new(player, mv, notation, move_number));
    }

    /// After a 2048 slide the environment drops a new tile into a random empty cell
    fn insert_chance_tile(&mut self) {
        let GameWrapper::Merge2048(state) = &self.game_state else {
            return;
        };
        if state.is_player_turn() {
            return;
        }
        let Some(spawn) = state.random_spawn(&mut self.rng) else {
            return;
        };
        debug!("inserting tile {}", spawn);
        self.record_and_play(merge2048::CHANCE, MoveWrapper::Merge2048(spawn));
        self.status = self.game_state.get_status();
    }

    /// Runs the computer opponent for the player to move on a clone of the
    /// authoritative state, then applies its choice.
    ///
    /// Returns `GameOver` if the game has ended or the player has no move.
    pub fn play_ai_turn(&mut self, config: &AiConfig) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        let result = self.suggest_move(config);
        match result.best_move {
            Some(mv) => {
                debug!(
                    "search picked {} (score {:?}, depth {:?}, {} nodes)",
                    mv, result.score, result.depth_reached, result.stats.nodes
                );
                self.apply_trusted_move(mv)
            }
            None => {
                self.status = self.game_state.get_status();
                MoveResult::GameOver
            }
        }
    }

    /// Asks the computer opponent for a move without applying it (a hint)
    pub fn suggest_move(&mut self, config: &AiConfig) -> SearchResult<MoveWrapper> {
        let state = self.get_state_for_search();
        state.best_move(config, &mut self.rng)
    }

    /// Get a clone of the game state for AI to search
    ///
    /// The returned state can be freely modified without affecting the
    /// authoritative state.
    pub fn get_state_for_search(&self) -> GameWrapper {
        self.game_state.clone()
    }

    /// Get a reference to the game state for rendering
    pub fn get_render_state(&self) -> &GameWrapper {
        &self.game_state
    }

    /// Get the current player
    pub fn get_current_player(&self) -> i32 {
        self.game_state.get_current_player()
    }

    /// Get the current game status
    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Get the winner if the game is over
    pub fn get_winner(&self) -> Option<i32> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    /// Session score, for games that keep one (2048)
    pub fn score(&self) -> Option<u32> {
        match &self.game_state {
            GameWrapper::Merge2048(state) => Some(state.score()),
            _ => None,
        }
    }

    /// Get the complete move history
    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get the last move made, if any
    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    /// Get legal moves for the current player
    pub fn get_legal_moves(&self) -> Vec<MoveWrapper> {
        if self.status.is_game_over() {
            Vec::new()
        } else {
            self.game_state.get_possible_moves()
        }
    }

    /// Start a new game of the same kind, keeping the random stream
    pub fn reset(&mut self) {
        self.game_state = GameWrapper::new_game(self.game_state.kind(), &mut self.rng);
        self.move_history.clear();
        self.status = self.game_state.get_status();
    }

    /// Format move history as plain text
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", self.game_state.kind());

        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                self.game_state.player_name(entry.player),
                entry.notation
            ));
        }

        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", self.game_state.player_name(winner)));
            }
            GameStatus::Draw => {
                output.push_str("\nResult: Draw\n");
            }
            GameStatus::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.game_state.player_name(self.get_current_player())
                ));
            }
        }

        output
    }
}
