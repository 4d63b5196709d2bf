//! # Connect 4 Game Implementation
//!
//! This module implements the classic Connect 4 board game.
//! Players take turns dropping pieces into columns, trying to get 4 pieces
//! in a row (horizontally, vertically, or diagonally).
//!
//! ## Rules
//! - Players alternate dropping pieces into columns
//! - Pieces fall to the lowest available spot in the column due to gravity
//! - First player to get 4 pieces in a row wins
//! - Game is a draw if the board fills up with no winner
//!
//! ## Computer Opponent
//! The opponent looks one ply ahead. It first takes an immediate win, then
//! blocks an immediate opponent win, and otherwise plays the column whose
//! resulting board scores best under [`Connect4State::score_position`].

use crate::games::MoveParseError;
use crate::search::{SearchResult, SearchStatistics};
use crate::{GameState, GameStatus};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Number of pieces in a row needed to win
pub const LINE_SIZE: usize = 4;
/// Standard board width
pub const WIDTH: usize = 7;
/// Standard board height
pub const HEIGHT: usize = 6;

const FOUR_SCORE: i32 = 1000;
const THREE_SCORE: i32 = 50;
const TWO_SCORE: i32 = 10;
const OPPONENT_THREE_SCORE: i32 = -80;
const CENTER_SCORE: i32 = 3;

/// Represents a move in Connect 4
///
/// Contains the column number where a player wants to drop their piece.
/// Column numbers are 0-based indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Connect4Move(pub usize);

impl fmt::Display for Connect4Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents the complete state of a Connect 4 game
///
/// The board uses 1 for player 1 pieces, -1 for player 2 pieces, and 0 for
/// empty spaces, stored row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connect4State {
    /// The game board as a flat vector (row-major)
    board: Vec<i32>,
    /// Current player (1 or -1)
    current_player: i32,
    /// Board width (number of columns)
    width: usize,
    /// Board height (number of rows)
    height: usize,
    /// Last move made, if any (row, column)
    last_move: Option<(usize, usize)>,
    /// Winner and the cells of the first completed line
    winning_line: Option<(i32, [usize; LINE_SIZE])>,
}

impl fmt::Display for Connect4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            for c in 0..self.width {
                let cell = self.board[r * self.width + c];
                let symbol = match cell {
                    1 => "X",
                    -1 => "O",
                    _ => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        for c in 0..self.width {
            write!(f, "{} ", c)?;
        }
        writeln!(f)
    }
}

impl Default for Connect4State {
    fn default() -> Self {
        Self::new(WIDTH, HEIGHT)
    }
}

impl GameState for Connect4State {
    type Move = Connect4Move; // Column to drop a piece

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.winning_line.is_some() {
            return Vec::new();
        }
        (0..self.width)
            .filter(|&c| self.board[c] == 0)
            .map(Connect4Move)
            .collect()
    }

    fn make_move(&mut self, mv: &Self::Move) {
        if self.drop_piece(mv.0, self.current_player).is_some() {
            self.current_player = -self.current_player;
        }
    }

    fn get_status(&self) -> GameStatus {
        if let Some((player, _)) = self.winning_line {
            GameStatus::Win(player)
        } else if self.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }

    fn get_current_player(&self) -> i32 {
        self.current_player
    }

    fn is_legal(&self, mv: &Self::Move) -> bool {
        self.winning_line.is_none() && mv.0 < self.width && self.board[mv.0] == 0
    }
}

impl Connect4State {
    /// Creates a new, empty Connect 4 game; player 1 moves first
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            board: vec![0; width * height],
            current_player: 1,
            width,
            height,
            last_move: None,
            winning_line: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell owner at `(row, col)`; row 0 is the top
    pub fn cell(&self, row: usize, col: usize) -> i32 {
        self.board[row * self.width + col]
    }

    /// Returns the board as rows for rendering
    pub fn get_board(&self) -> Vec<Vec<i32>> {
        self.board.chunks(self.width).map(<[i32]>::to_vec).collect()
    }

    /// Gets the coordinates of the last piece dropped
    pub fn get_last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    /// Flat indices of the winning line, if the game has been won
    pub fn winning_line(&self) -> Option<Vec<usize>> {
        self.winning_line.map(|(_, line)| line.to_vec())
    }

    pub fn is_full(&self) -> bool {
        self.board[..self.width].iter().all(|&cell| cell != 0)
    }

    /// Flat index of the lowest empty cell in `col`
    pub fn lowest_empty_index(&self, col: usize) -> Option<usize> {
        if col >= self.width {
            return None;
        }
        (0..self.height)
            .rev()
            .map(|r| r * self.width + col)
            .find(|&idx| self.board[idx] == 0)
    }

    /// Drops a piece for `player` into `col` without changing whose turn it is.
    ///
    /// Returns the flat index the piece landed on, or `None` if the column is
    /// full or out of range.
    pub fn drop_piece(&mut self, col: usize, player: i32) -> Option<usize> {
        let idx = self.lowest_empty_index(col)?;
        self.board[idx] = player;
        self.last_move = Some((idx / self.width, col));
        if self.winning_line.is_none() {
            self.winning_line = arcade_shared::find_line::<LINE_SIZE>(&self.board, self.width, self.height, player)
                .map(|line| (player, line));
        }
        Some(idx)
    }

    /// Returns a copy with a piece for `player` dropped into `col`
    fn with_piece(&self, col: usize, player: i32) -> Option<Self> {
        let mut next = self.clone();
        next.drop_piece(col, player)?;
        Some(next)
    }

    /// Scores one run of cells for `player`
    pub fn score_window(window: &[i32], player: i32) -> i32 {
        let own = window.iter().filter(|&&c| c == player).count();
        let empty = window.iter().filter(|&&c| c == 0).count();
        let opponent = window.iter().filter(|&&c| c == -player).count();

        if own == 4 {
            FOUR_SCORE
        } else if own == 3 && empty == 1 {
            THREE_SCORE
        } else if own == 2 && empty == 2 {
            TWO_SCORE
        } else if opponent == 3 && empty == 1 {
            OPPONENT_THREE_SCORE
        } else {
            0
        }
    }

    /// Heuristic value of the board for `player`: every 4-cell window in all
    /// four directions plus a bonus for each piece in the center column
    pub fn score_position(&self, player: i32) -> i32 {
        let center = self.width / 2;
        let center_count = (0..self.height).filter(|&r| self.cell(r, center) == player).count() as i32;

        let windows: i32 = arcade_shared::windows::<LINE_SIZE>(self.width, self.height)
            .map(|window| Self::score_window(&window.map(|idx| self.board[idx]), player))
            .sum();

        center_count * CENTER_SCORE + windows
    }

    /// Checks if a move is legal in the current game state
    ///
    /// A move is legal if the column is within bounds and the top row
    /// of that column is empty (pieces can be dropped).
    pub fn column_accepts(&self, col: usize) -> bool {
        col < self.width && self.board[col] == 0
    }
}

/// Picks a column for the player to move.
///
/// Immediate wins are taken first, then immediate opponent wins are blocked,
/// both in column order. Otherwise every legal column is scored by simulating
/// one drop; ties keep the lowest column.
pub fn best_move(state: &Connect4State) -> SearchResult<Connect4Move> {
    let me = state.get_current_player();
    let moves = state.get_possible_moves();
    let mut stats = SearchStatistics::default();

    for &(player, reason) in &[(me, "win"), (-me, "block")] {
        for mv in &moves {
            stats.nodes += 1;
            let wins = state
                .with_piece(mv.0, player)
                .is_some_and(|next| next.get_winner() == Some(player));
            if wins {
                debug!("connect4: column {} is a forced {}", mv.0, reason);
                return SearchResult {
                    best_move: Some(*mv),
                    score: None,
                    depth_reached: Some(1),
                    stats,
                };
            }
        }
    }

    let mut best: Option<(Connect4Move, i32)> = None;
    for mv in moves {
        let Some(next) = state.with_piece(mv.0, me) else {
            continue;
        };
        stats.nodes += 1;
        let score = next.score_position(me);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
    }

    match best {
        Some((mv, score)) => SearchResult {
            best_move: Some(mv),
            score: Some(f64::from(score)),
            depth_reached: Some(1),
            stats,
        },
        None => SearchResult::no_move(),
    }
}

impl FromStr for Connect4Move {
    type Err = MoveParseError;

    /// Creates a Connect4Move from a string representation
    ///
    /// Expected format is just the column number as a string.
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use arcade::games::connect4::Connect4Move;
    /// let mv = Connect4Move::from_str("3").unwrap();
    /// assert_eq!(mv.0, 3);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s
            .trim()
            .parse::<usize>()
            .map_err(|_| MoveParseError::InvalidColumn(s.trim().to_string()))?;
        Ok(Connect4Move(c))
    }
}
