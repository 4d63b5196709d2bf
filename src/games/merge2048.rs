//! # 2048 Game Implementation
//!
//! This module implements the 2048 sliding-tile merge game on a 4x4 grid.
//! The player slides every tile in one direction; afterwards chance inserts a
//! new tile into a random empty cell.
//!
//! ## Rules
//! - Tiles slide as far as possible in the chosen direction
//! - Two equal tiles sliding into contact merge into one tile of double value
//! - A tile created by a merge does not merge again in the same move
//! - A direction is legal only if it changes the board
//! - After each slide a 2 (probability 0.9) or a 4 (probability 0.1) appears
//! - Reaching a 2048 tile wins; a full board with no equal neighbours loses
//!
//! In [`GameState`] terms the player is `1` and chance is `-1`.

use crate::config::AiConfig;
use crate::games::MoveParseError;
use crate::search::{expectimax, SearchResult};
use crate::{ChanceGame, GameState, GameStatus};
use log::debug;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Side length of the grid
pub const SIZE: usize = 4;
/// Tile value that wins the game
pub const TARGET_TILE: u32 = 2048;
/// Player id of the sliding player
pub const PLAYER: i32 = 1;
/// Player id of the tile-inserting chance player
pub const CHANCE: i32 = -1;

/// Probability that an inserted tile is a 2 rather than a 4
pub const TWO_PROBABILITY: f64 = 0.9;

const SMOOTH_WEIGHT: f64 = 0.1;
const MONO_WEIGHT: f64 = 1.0;
const EMPTY_WEIGHT: f64 = 2.7;
const MAX_WEIGHT: f64 = 1.0;

/// Slide direction
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions, in search order
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// The cells of line `index`, ordered from the edge the tiles slide towards
    fn line(self, index: usize) -> [(usize, usize); SIZE] {
        let mut cells = [(0, 0); SIZE];
        for (k, cell) in cells.iter_mut().enumerate() {
            *cell = match self {
                Direction::Left => (index, k),
                Direction::Right => (index, SIZE - 1 - k),
                Direction::Up => (k, index),
                Direction::Down => (SIZE - 1 - k, index),
            };
        }
        cells
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Direction {
    type Err = MoveParseError;

    /// Accepts full names, initials and WASD keys (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "w" => Ok(Direction::Up),
            "right" | "r" | "d" => Ok(Direction::Right),
            "down" | "s" => Ok(Direction::Down),
            "left" | "l" | "a" => Ok(Direction::Left),
            other => Err(MoveParseError::UnknownDirection(other.to_string())),
        }
    }
}

/// Represents a move in 2048: a player slide or a chance insertion
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Merge2048Move {
    Slide(Direction),
    Spawn { row: usize, col: usize, value: u32 },
}

impl fmt::Display for Merge2048Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Merge2048Move::Slide(direction) => write!(f, "{}", direction),
            Merge2048Move::Spawn { row, col, value } => write!(f, "+{}@({},{})", value, row, col),
        }
    }
}

impl FromStr for Merge2048Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Direction>().map(Merge2048Move::Slide)
    }
}

/// What a single slide did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlideOutcome {
    /// At least one tile changed position or merged
    pub moved: bool,
    /// Sum of the values created by merges
    pub score: u32,
    /// A merge produced the target tile
    pub won: bool,
}

/// Collapses one line towards index 0, merging each tile at most once.
/// Returns the new line, the merge score and the largest merged value.
fn collapse(line: [u32; SIZE]) -> ([u32; SIZE], u32, u32) {
    let mut out = [0u32; SIZE];
    let mut len = 0;
    let mut score = 0;
    let mut largest_merge = 0;
    let mut last_merged = false;

    for value in line.into_iter().filter(|&v| v != 0) {
        if len > 0 && out[len - 1] == value && !last_merged {
            out[len - 1] *= 2;
            score += out[len - 1];
            largest_merge = largest_merge.max(out[len - 1]);
            last_merged = true;
        } else {
            out[len] = value;
            len += 1;
            last_merged = false;
        }
    }
    (out, score, largest_merge)
}

/// Represents the complete state of a 2048 game
///
/// Empty cells hold 0; occupied cells hold a power of two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Merge2048State {
    tiles: [[u32; SIZE]; SIZE],
    /// True when the player slides next, false when chance inserts a tile
    player_turn: bool,
    /// Sum of all merge values so far
    score: u32,
}

impl Default for Merge2048State {
    fn default() -> Self {
        Self::new()
    }
}

impl Merge2048State {
    /// Creates an empty board with the player to move
    pub fn new() -> Self {
        Self {
            tiles: [[0; SIZE]; SIZE],
            player_turn: true,
            score: 0,
        }
    }

    /// Creates a board from explicit rows with the player to move
    pub fn from_rows(tiles: [[u32; SIZE]; SIZE]) -> Self {
        Self {
            tiles,
            player_turn: true,
            score: 0,
        }
    }

    /// Starts a game with two 2-tiles in random empty cells
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut state = Self::new();
        for _ in 0..2 {
            let cells = state.empty_cells();
            let (row, col) = cells[rng.random_range(0..cells.len())];
            state.tiles[row][col] = 2;
        }
        state
    }

    pub fn tiles(&self) -> &[[u32; SIZE]; SIZE] {
        &self.tiles
    }

    pub fn tile(&self, row: usize, col: usize) -> u32 {
        self.tiles[row][col]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_player_turn(&self) -> bool {
        self.player_turn
    }

    pub fn max_tile(&self) -> u32 {
        self.tiles.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn tile_sum(&self) -> u32 {
        self.tiles.iter().flatten().sum()
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.tiles[r][c] == 0)
            .collect()
    }

    /// True if any two orthogonally adjacent tiles are equal
    pub fn tile_matches_available(&self) -> bool {
        for r in 0..SIZE {
            for c in 0..SIZE {
                let value = self.tiles[r][c];
                if value == 0 {
                    continue;
                }
                if c + 1 < SIZE && self.tiles[r][c + 1] == value {
                    return true;
                }
                if r + 1 < SIZE && self.tiles[r + 1][c] == value {
                    return true;
                }
            }
        }
        false
    }

    /// True if a slide could still change the board
    pub fn moves_available(&self) -> bool {
        !self.empty_cells().is_empty() || self.tile_matches_available()
    }

    /// Slides every tile in `direction`, merging equal neighbours.
    ///
    /// Does not add to the running score or flip the turn; see
    /// [`GameState::make_move`] for the full transition.
    pub fn slide(&mut self, direction: Direction) -> SlideOutcome {
        let mut outcome = SlideOutcome::default();

        for index in 0..SIZE {
            let cells = direction.line(index);
            let line = cells.map(|(r, c)| self.tiles[r][c]);
            let (collapsed, score, largest_merge) = collapse(line);

            if collapsed != line {
                outcome.moved = true;
            }
            outcome.score += score;
            if largest_merge >= TARGET_TILE {
                outcome.won = true;
            }
            for (&(r, c), value) in cells.iter().zip(collapsed) {
                self.tiles[r][c] = value;
            }
        }
        outcome
    }

    /// Returns the board after sliding, if the slide changes anything
    pub fn slid(&self, direction: Direction) -> Option<(Self, SlideOutcome)> {
        let mut next = self.clone();
        let outcome = next.slide(direction);
        outcome.moved.then_some((next, outcome))
    }

    /// Inserts a random tile the way chance would: a 2 with probability 0.9,
    /// otherwise a 4, into a uniformly chosen empty cell.
    ///
    /// Returns the insertion, or `None` if the board is full.
    pub fn random_spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Merge2048Move> {
        let cells = self.empty_cells();
        if cells.is_empty() {
            return None;
        }
        let value = if rng.random_bool(TWO_PROBABILITY) { 2 } else { 4 };
        let (row, col) = cells[rng.random_range(0..cells.len())];
        Some(Merge2048Move::Spawn { row, col, value })
    }

    fn log2_at(&self, r: usize, c: usize) -> f64 {
        match self.tiles[r][c] {
            0 => 0.0,
            v => f64::from(v).log2(),
        }
    }

    /// Negative sum of log2 differences between each tile and the nearest
    /// occupied tile to its right and below
    pub fn smoothness(&self) -> f64 {
        let mut smoothness = 0.0;
        for r in 0..SIZE {
            for c in 0..SIZE {
                if self.tiles[r][c] == 0 {
                    continue;
                }
                let value = self.log2_at(r, c);
                if let Some(nc) = (c + 1..SIZE).find(|&nc| self.tiles[r][nc] != 0) {
                    smoothness -= (value - self.log2_at(r, nc)).abs();
                }
                if let Some(nr) = (r + 1..SIZE).find(|&nr| self.tiles[nr][c] != 0) {
                    smoothness -= (value - self.log2_at(nr, c)).abs();
                }
            }
        }
        smoothness
    }

    /// Penalty for rows and columns that are not monotone, taking the better
    /// orientation per axis. Zero means every line is monotone.
    pub fn monotonicity(&self) -> f64 {
        let mut totals = [0.0f64; 4];

        for axis in 0..2 {
            for line in 0..SIZE {
                let at = |k: usize| if axis == 0 { (line, k) } else { (k, line) };
                let mut current = 0;
                let mut next = 1;
                while next < SIZE {
                    while next < SIZE && {
                        let (r, c) = at(next);
                        self.tiles[r][c] == 0
                    } {
                        next += 1;
                    }
                    if next >= SIZE {
                        next -= 1;
                    }
                    let (cr, cc) = at(current);
                    let (nr, nc) = at(next);
                    let current_value = self.log2_at(cr, cc);
                    let next_value = self.log2_at(nr, nc);
                    if current_value > next_value {
                        totals[axis * 2] += next_value - current_value;
                    } else if next_value > current_value {
                        totals[axis * 2 + 1] += current_value - next_value;
                    }
                    current = next;
                    next += 1;
                }
            }
        }

        totals[0].max(totals[1]) + totals[2].max(totals[3])
    }

    /// log2 of the largest tile, 0 on an empty board
    pub fn max_value(&self) -> f64 {
        match self.max_tile() {
            0 => 0.0,
            v => f64::from(v).log2(),
        }
    }

    /// Weighted board heuristic used at search leaves
    pub fn evaluate(&self) -> f64 {
        let empty = self.empty_cells().len().max(1) as f64;
        self.smoothness() * SMOOTH_WEIGHT
            + self.monotonicity() * MONO_WEIGHT
            + empty.ln() * EMPTY_WEIGHT
            + self.max_value() * MAX_WEIGHT
    }
}

impl fmt::Display for Merge2048State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.tiles {
            for &value in row {
                if value == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{:>6}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameState for Merge2048State {
    type Move = Merge2048Move;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.player_turn {
            Direction::ALL
                .into_iter()
                .filter(|&d| self.slid(d).is_some())
                .map(Merge2048Move::Slide)
                .collect()
        } else {
            let cells = self.empty_cells();
            [2, 4]
                .into_iter()
                .flat_map(|value| {
                    cells
                        .iter()
                        .map(move |&(row, col)| Merge2048Move::Spawn { row, col, value })
                })
                .collect()
        }
    }

    fn make_move(&mut self, mv: &Self::Move) {
        match *mv {
            Merge2048Move::Slide(direction) => {
                let outcome = self.slide(direction);
                self.score += outcome.score;
                self.player_turn = false;
            }
            Merge2048Move::Spawn { row, col, value } => {
                self.tiles[row][col] = value;
                self.player_turn = true;
            }
        }
    }

    fn get_status(&self) -> GameStatus {
        if self.max_tile() >= TARGET_TILE {
            GameStatus::Win(PLAYER)
        } else if self.is_lost() {
            GameStatus::Win(CHANCE)
        } else {
            GameStatus::InProgress
        }
    }

    fn get_current_player(&self) -> i32 {
        if self.player_turn {
            PLAYER
        } else {
            CHANCE
        }
    }

    fn is_legal(&self, mv: &Self::Move) -> bool {
        match *mv {
            Merge2048Move::Slide(direction) => self.player_turn && self.slid(direction).is_some(),
            Merge2048Move::Spawn { row, col, value } => {
                !self.player_turn
                    && (value == 2 || value == 4)
                    && row < SIZE
                    && col < SIZE
                    && self.tiles[row][col] == 0
            }
        }
    }
}

impl ChanceGame for Merge2048State {
    fn is_chance_turn(&self) -> bool {
        !self.player_turn
    }

    fn heuristic(&self) -> f64 {
        self.evaluate()
    }

    fn is_lost(&self) -> bool {
        !self.moves_available()
    }

    fn chance_probability(&self, mv: &Self::Move) -> f64 {
        match *mv {
            Merge2048Move::Slide(_) => 1.0,
            Merge2048Move::Spawn { value, .. } => {
                let empty = self.empty_cells().len().max(1) as f64;
                let p = if value == 2 { TWO_PROBABILITY } else { 1.0 - TWO_PROBABILITY };
                p / empty
            }
        }
    }
}

/// Picks a slide for the player with expectimax under the configured time
/// budget. On a chance turn the environment's tile insertion is drawn from
/// `rng` instead. Returns no move only when nothing is legal.
pub fn best_move<R: Rng + ?Sized>(
    state: &Merge2048State,
    config: &AiConfig,
    rng: &mut R,
) -> SearchResult<Merge2048Move> {
    if !state.is_player_turn() {
        return match state.random_spawn(rng) {
            Some(spawn) => SearchResult::unscored(spawn),
            None => SearchResult::no_move(),
        };
    }
    let result = expectimax::iterative_deepening(state, config);
    debug!(
        "2048: {:?} at depth {:?} ({} nodes)",
        result.best_move.map(|mv| mv.to_string()),
        result.depth_reached,
        result.stats.nodes
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn row_state(row: [u32; SIZE]) -> Merge2048State {
        Merge2048State::from_rows([row, [0; SIZE], [0; SIZE], [0; SIZE]])
    }

    #[test]
    fn test_merged_tile_does_not_merge_again() {
        let mut state = row_state([2, 2, 4, 0]);
        let outcome = state.slide(Direction::Left);
        assert_eq!(state.tiles()[0], [4, 4, 0, 0]);
        assert_eq!(outcome.score, 4);
        assert!(outcome.moved);
    }

    #[test]
    fn test_two_pairs_merge_separately() {
        let mut state = row_state([2, 2, 2, 2]);
        let outcome = state.slide(Direction::Left);
        assert_eq!(state.tiles()[0], [4, 4, 0, 0]);
        assert_eq!(outcome.score, 8);
    }

    #[test]
    fn test_three_equal_merges_leading_pair() {
        let mut state = row_state([2, 2, 2, 0]);
        state.slide(Direction::Right);
        assert_eq!(state.tiles()[0], [0, 0, 2, 4]);
    }

    #[test]
    fn test_vertical_slides() {
        let mut state = Merge2048State::from_rows([[2, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0]]);
        state.slide(Direction::Down);
        assert_eq!(state.tiles().map(|row| row[0]), [0, 0, 4, 4]);
        state.slide(Direction::Up);
        assert_eq!(state.tiles().map(|row| row[0]), [8, 0, 0, 0]);
    }

    #[test]
    fn test_unchanged_direction_is_illegal() {
        let state = row_state([2, 4, 8, 16]);
        assert!(state.slid(Direction::Left).is_none());
        assert!(state.slid(Direction::Right).is_none());
        assert!(state.slid(Direction::Up).is_none());
        let moves = state.get_possible_moves();
        assert_eq!(moves, vec![Merge2048Move::Slide(Direction::Down)]);
    }

    #[test]
    fn test_make_move_alternates_phases() {
        let mut state = row_state([2, 2, 0, 0]);
        state.make_move(&Merge2048Move::Slide(Direction::Left));
        assert_eq!(state.get_current_player(), CHANCE);
        assert_eq!(state.score(), 4);

        let spawns = state.get_possible_moves();
        assert_eq!(spawns.len(), 2 * 15);
        assert!(spawns[..15].iter().all(|m| matches!(m, Merge2048Move::Spawn { value: 2, .. })));

        state.make_move(&Merge2048Move::Spawn { row: 3, col: 3, value: 4 });
        assert_eq!(state.get_current_player(), PLAYER);
        assert_eq!(state.tile(3, 3), 4);
    }

    #[test]
    fn test_spawn_legality() {
        let mut state = row_state([2, 0, 0, 0]);
        let spawn = Merge2048Move::Spawn { row: 1, col: 1, value: 2 };
        assert!(!state.is_legal(&spawn));
        state.make_move(&Merge2048Move::Slide(Direction::Right));
        assert!(state.is_legal(&spawn));
        assert!(!state.is_legal(&Merge2048Move::Spawn { row: 0, col: 3, value: 2 }));
        assert!(!state.is_legal(&Merge2048Move::Spawn { row: 1, col: 1, value: 8 }));
    }

    #[test]
    fn test_status() {
        let won = row_state([2048, 0, 0, 0]);
        assert_eq!(won.get_status(), GameStatus::Win(PLAYER));

        let lost = Merge2048State::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(lost.is_lost());
        assert_eq!(lost.get_status(), GameStatus::Win(CHANCE));
        assert!(lost.get_possible_moves().is_empty());

        let full_with_pair = Merge2048State::from_rows([[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
        assert!(!full_with_pair.is_lost());
        assert_eq!(full_with_pair.get_status(), GameStatus::InProgress);
    }

    #[test]
    fn test_merge_to_target_flags_win() {
        let mut state = row_state([1024, 1024, 0, 0]);
        let outcome = state.slide(Direction::Left);
        assert!(outcome.won);
        assert_eq!(outcome.score, 2048);
    }

    #[test]
    fn test_monotone_board_has_zero_penalty() {
        let state = Merge2048State::from_rows([[16, 8, 4, 2], [8, 4, 2, 0], [4, 2, 0, 0], [2, 0, 0, 0]]);
        assert_eq!(state.monotonicity(), 0.0);
    }

    #[test]
    fn test_smoothness_of_uniform_row() {
        let even = row_state([4, 4, 4, 4]);
        assert_eq!(even.smoothness(), 0.0);
        let jagged = row_state([2, 32, 2, 0]);
        // |1 - 5| + |5 - 1|
        assert_eq!(jagged.smoothness(), -8.0);
    }

    #[test]
    fn test_evaluate_prefers_open_board() {
        let open = row_state([4, 2, 0, 0]);
        let crowded = Merge2048State::from_rows([[4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2], [2, 0, 0, 0]]);
        assert!(open.evaluate() > crowded.evaluate());
    }

    #[test]
    fn test_new_game_has_two_twos() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let state = Merge2048State::new_game(&mut rng);
        assert_eq!(state.tile_sum(), 4);
        assert_eq!(state.empty_cells().len(), SIZE * SIZE - 2);
        assert!(state.is_player_turn());
    }

    #[test]
    fn test_random_spawn_targets_empty_cell() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let state = Merge2048State::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        for _ in 0..20 {
            match state.random_spawn(&mut rng) {
                Some(Merge2048Move::Spawn { row, col, value }) => {
                    assert_eq!((row, col), (2, 2));
                    assert!(value == 2 || value == 4);
                }
                other => panic!("unexpected spawn {:?}", other),
            }
        }
    }

    #[test]
    fn test_chance_probabilities_sum_to_one() {
        let mut state = row_state([2, 0, 0, 0]);
        state.make_move(&Merge2048Move::Slide(Direction::Right));
        let total: f64 = state
            .get_possible_moves()
            .iter()
            .map(|mv| state.chance_probability(mv))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_move_on_both_turns() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut state = row_state([2, 2, 4, 0]);
        let result = best_move(&state, &AiConfig::default(), &mut rng);
        assert!(matches!(result.best_move, Some(Merge2048Move::Slide(_))));

        state.make_move(&Merge2048Move::Slide(Direction::Left));
        assert!(!state.is_player_turn());
        let insertion = best_move(&state, &AiConfig::default(), &mut rng).best_move;
        assert!(matches!(insertion, Some(Merge2048Move::Spawn { .. })));
        assert!(state.is_legal(&insertion.unwrap()));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("W".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" left ".parse::<Direction>().unwrap(), Direction::Left);
        assert!("north".parse::<Direction>().is_err());
    }
}
