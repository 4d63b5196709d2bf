//! # Chess (Simplified) Game Implementation
//!
//! This module implements a simplified chess variant for two players.
//!
//! ## Rules
//! - Standard piece movement for pawns, knights, bishops, rooks, queens and kings
//! - Pawns may advance two squares from their starting rank and capture en passant
//! - A pawn reaching the farthest rank always becomes a queen
//! - No castling and no draw by repetition or the fifty-move rule
//! - A move that leaves the mover's own king in check is illegal
//! - A side with no legal moves is checkmated if its king is in check,
//!   otherwise the game is a draw by stalemate
//!
//! The board is stored with row 0 at the top (rank 8, Black's back rank) and
//! row 7 at the bottom (rank 1, White's back rank). White is player `1` and
//! maximizes the evaluation.

use crate::config::AiConfig;
use crate::games::MoveParseError;
use crate::search::{alpha_beta, SearchResult};
use crate::{Adversarial, GameState, GameStatus};
use log::debug;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Score of a checkmate, from White's point of view
pub const MATE_SCORE: i32 = 100_000;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)];
const KING_OFFSETS: [(i32, i32); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
const ROOK_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// Positional bonus tables for pawns and knights; other pieces score material only.
// A White piece on row r reads row 7 - r, a Black piece reads row r.
#[rustfmt::skip]
const PAWN_TABLE: [[i32; 8]; 8] = [
    [  0,   0,   0,   0,   0,   0,   0,   0],
    [ 50,  50,  50,  50,  50,  50,  50,  50],
    [ 10,  10,  20,  30,  30,  20,  10,  10],
    [  5,   5,  10,  25,  25,  10,   5,   5],
    [  0,   0,   0,  20,  20,   0,   0,   0],
    [  5,  -5, -10,   0,   0, -10,  -5,   5],
    [  5,  10,  10, -20, -20,  10,  10,   5],
    [  0,   0,   0,   0,   0,   0,   0,   0],
];

#[rustfmt::skip]
const KNIGHT_TABLE: [[i32; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   0,   0,   0, -20, -40],
    [-30,   0,  10,  15,  15,  10,   0, -30],
    [-30,   5,  15,  20,  20,  15,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

/// One of the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Player id used by [`GameState`]: `1` for White, `-1` for Black
    pub fn player(self) -> i32 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    pub fn from_player(player: i32) -> Self {
        if player >= 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Row step of a pawn advance
    fn forward(self) -> i32 {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }

    fn pawn_start_row(self) -> usize {
        match self {
            Side::White => 6,
            Side::Black => 1,
        }
    }

    fn promotion_row(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in centipawns
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20_000,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    fn table(self) -> Option<&'static [[i32; 8]; 8]> {
        match self {
            PieceKind::Pawn => Some(&PAWN_TABLE),
            PieceKind::Knight => Some(&KNIGHT_TABLE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Parses a board symbol: uppercase for White, lowercase for Black
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let kind = match symbol.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => return None,
        };
        let side = if symbol.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Self { kind, side })
    }

    pub fn symbol(self) -> char {
        match self.side {
            Side::White => self.kind.letter(),
            Side::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    /// Material plus positional bonus on `square`, always positive
    fn worth(self, square: Square) -> i32 {
        let row = match self.side {
            Side::White => 7 - square.row,
            Side::Black => square.row,
        };
        let bonus = self.kind.table().map_or(0, |table| table[row][square.col]);
        self.kind.value() + bonus
    }
}

/// A board square; row 0 is rank 8, column 0 is file a
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The square `(dr, dc)` away, if it is on the board
    pub fn offset(self, dr: i32, dc: i32) -> Option<Square> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col as u8) as char;
        write!(f, "{}{}", file, 8 - self.row)
    }
}

impl FromStr for Square {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let invalid = || MoveParseError::InvalidSquare(s.to_string());
        if bytes.len() != 2 {
            return Err(invalid());
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(invalid());
        }
        Ok(Square::new(7 - (rank - b'1') as usize, (file - b'a') as usize))
    }
}

/// A move: origin, destination and the piece being moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
}

impl ChessMove {
    /// Short notation used in the move history: piece letter (omitted for
    /// pawns) followed by the destination, e.g. `Nf3` or `e4`
    pub fn notation(&self) -> String {
        match self.piece.kind {
            PieceKind::Pawn => self.to.to_string(),
            kind => format!("{}{}", kind.letter(), self.to),
        }
    }

    fn is_double_pawn_push(&self) -> bool {
        self.piece.kind == PieceKind::Pawn && self.from.row.abs_diff(self.to.row) == 2
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Represents the complete state of a chess game
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChessState {
    /// Row-major board, row 0 is rank 8
    board: [[Option<Piece>; 8]; 8],
    side_to_move: Side,
    /// Needed to decide en passant captures
    last_move: Option<ChessMove>,
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessState {
    /// Creates the standard initial position with White to move
    pub fn new() -> Self {
        Self::from_rows(
            [
                "rnbqkbnr", "pppppppp", "........", "........", "........", "........", "PPPPPPPP",
                "RNBQKBNR",
            ],
            Side::White,
        )
    }

    /// Builds a position from eight rows of piece symbols, rank 8 first.
    /// Any character that is not a piece symbol is an empty square.
    pub fn from_rows(rows: [&str; 8], side_to_move: Side) -> Self {
        let mut board = [[None; 8]; 8];
        for (r, row) in rows.iter().enumerate() {
            for (c, symbol) in row.chars().take(8).enumerate() {
                board[r][c] = Piece::from_symbol(symbol);
            }
        }
        Self {
            board,
            side_to_move,
            last_move: None,
        }
    }

    /// Sets the previous move, which decides en passant rights
    pub fn with_last_move(mut self, last_move: ChessMove) -> Self {
        self.last_move = Some(last_move);
        self
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.row][square.col]
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn last_move(&self) -> Option<ChessMove> {
        self.last_move
    }

    fn squares() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|row| (0..8).map(move |col| Square::new(row, col)))
    }

    fn find_king(&self, side: Side) -> Option<Square> {
        Self::squares().find(|&sq| self.piece_at(sq) == Some(Piece::new(PieceKind::King, side)))
    }

    /// True if any piece of `by` attacks `target`
    pub fn is_attacked(&self, target: Square, by: Side) -> bool {
        let holds = |sq: Option<Square>, kinds: &[PieceKind]| {
            sq.and_then(|sq| self.piece_at(sq))
                .is_some_and(|p| p.side == by && kinds.contains(&p.kind))
        };

        // A pawn attacks diagonally forward, so it sits one row behind the target
        if [-1, 1]
            .iter()
            .any(|&dc| holds(target.offset(-by.forward(), dc), &[PieceKind::Pawn]))
        {
            return true;
        }
        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dr, dc)| holds(target.offset(dr, dc), &[PieceKind::Knight]))
        {
            return true;
        }
        if KING_OFFSETS
            .iter()
            .any(|&(dr, dc)| holds(target.offset(dr, dc), &[PieceKind::King]))
        {
            return true;
        }

        let rays = ROOK_DIRECTIONS
            .iter()
            .map(|d| (d, [PieceKind::Rook, PieceKind::Queen]))
            .chain(BISHOP_DIRECTIONS.iter().map(|d| (d, [PieceKind::Bishop, PieceKind::Queen])));
        for (&(dr, dc), sliders) in rays {
            let mut current = target.offset(dr, dc);
            while let Some(sq) = current {
                if let Some(piece) = self.piece_at(sq) {
                    if piece.side == by && sliders.contains(&piece.kind) {
                        return true;
                    }
                    break;
                }
                current = sq.offset(dr, dc);
            }
        }
        false
    }

    /// True if `side`'s king is attacked. A side without a king counts as in check.
    pub fn in_check(&self, side: Side) -> bool {
        match self.find_king(side) {
            Some(king) => self.is_attacked(king, side.opponent()),
            None => true,
        }
    }

    /// Moves of the piece on `from` that obey its movement rules, ignoring
    /// whether they expose the mover's king. Sorted by destination square.
    fn pseudo_legal_moves_from(&self, from: Square, piece: Piece) -> Vec<ChessMove> {
        let mut targets = Vec::new();
        let enemy_or_empty = |sq: Square| self.piece_at(sq).map_or(true, |p| p.side != piece.side);

        match piece.kind {
            PieceKind::Pawn => {
                let dir = piece.side.forward();
                if let Some(one) = from.offset(dir, 0).filter(|&sq| self.piece_at(sq).is_none()) {
                    targets.push(one);
                    if from.row == piece.side.pawn_start_row() {
                        if let Some(two) = from.offset(2 * dir, 0).filter(|&sq| self.piece_at(sq).is_none()) {
                            targets.push(two);
                        }
                    }
                }
                for dc in [-1, 1] {
                    let Some(diag) = from.offset(dir, dc) else {
                        continue;
                    };
                    match self.piece_at(diag) {
                        Some(target) if target.side != piece.side => targets.push(diag),
                        Some(_) => {}
                        None if self.en_passant_target(from) == Some(diag) => targets.push(diag),
                        None => {}
                    }
                }
            }
            PieceKind::Knight | PieceKind::King => {
                let offsets = if piece.kind == PieceKind::Knight {
                    &KNIGHT_OFFSETS
                } else {
                    &KING_OFFSETS
                };
                targets.extend(
                    offsets
                        .iter()
                        .filter_map(|&(dr, dc)| from.offset(dr, dc))
                        .filter(|&sq| enemy_or_empty(sq)),
                );
            }
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                let directions: Vec<(i32, i32)> = match piece.kind {
                    PieceKind::Bishop => BISHOP_DIRECTIONS.to_vec(),
                    PieceKind::Rook => ROOK_DIRECTIONS.to_vec(),
                    _ => ROOK_DIRECTIONS.iter().chain(BISHOP_DIRECTIONS.iter()).copied().collect(),
                };
                for (dr, dc) in directions {
                    let mut current = from.offset(dr, dc);
                    while let Some(sq) = current {
                        match self.piece_at(sq) {
                            None => targets.push(sq),
                            Some(blocker) => {
                                if blocker.side != piece.side {
                                    targets.push(sq);
                                }
                                break;
                            }
                        }
                        current = sq.offset(dr, dc);
                    }
                }
            }
        }

        targets.sort_by_key(|sq| (sq.row, sq.col));
        targets
            .into_iter()
            .map(|to| ChessMove { from, to, piece })
            .collect()
    }

    /// Square a pawn on `from` may capture onto en passant, if any
    fn en_passant_target(&self, from: Square) -> Option<Square> {
        let last = self.last_move?;
        if !last.is_double_pawn_push() || last.to.row != from.row || last.to.col.abs_diff(from.col) != 1 {
            return None;
        }
        last.to.offset(self.side_to_move.forward(), 0)
    }

    /// Moves a piece without any legality check. Handles en passant removal
    /// and auto-queen promotion, records the move and passes the turn.
    fn play_unchecked(&mut self, mv: &ChessMove) {
        let Some(mut piece) = self.board[mv.from.row][mv.from.col].take() else {
            return;
        };

        if piece.kind == PieceKind::Pawn {
            let diagonal = mv.from.col != mv.to.col;
            if diagonal && self.piece_at(mv.to).is_none() {
                self.board[mv.from.row][mv.to.col] = None;
            }
            if mv.to.row == piece.side.promotion_row() {
                piece.kind = PieceKind::Queen;
            }
        }

        self.board[mv.to.row][mv.to.col] = Some(piece);
        self.last_move = Some(*mv);
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Parses coordinate input such as `e2e4`, `e2-e4` or `e2 e4` into a move
    /// of the piece standing on the origin square. The move is not checked
    /// for legality.
    pub fn parse_move(&self, input: &str) -> Result<ChessMove, MoveParseError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if compact.len() != 4 || !compact.is_ascii() {
            return Err(MoveParseError::MalformedSquarePair(input.trim().to_string()));
        }
        let from: Square = compact[..2].parse()?;
        let to: Square = compact[2..].parse()?;
        let piece = self
            .piece_at(from)
            .ok_or_else(|| MoveParseError::EmptySquare(from.to_string()))?;
        Ok(ChessMove { from, to, piece })
    }
}

impl GameState for ChessState {
    type Move = ChessMove;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        let side = self.side_to_move;
        let mut moves = Vec::new();
        for from in Self::squares() {
            let Some(piece) = self.piece_at(from).filter(|p| p.side == side) else {
                continue;
            };
            for mv in self.pseudo_legal_moves_from(from, piece) {
                let mut scratch = self.clone();
                scratch.play_unchecked(&mv);
                if !scratch.in_check(side) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    fn make_move(&mut self, mv: &Self::Move) {
        self.play_unchecked(mv);
    }

    fn get_status(&self) -> GameStatus {
        if !self.get_possible_moves().is_empty() {
            GameStatus::InProgress
        } else if self.in_check(self.side_to_move) {
            GameStatus::Win(self.side_to_move.opponent().player())
        } else {
            GameStatus::Draw
        }
    }

    fn get_current_player(&self) -> i32 {
        self.side_to_move.player()
    }
}

impl Adversarial for ChessState {
    fn evaluate(&self) -> i32 {
        Self::squares()
            .filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
            .map(|(sq, piece)| piece.worth(sq) * piece.side.player())
            .sum()
    }

    fn terminal_score(&self) -> i32 {
        if !self.in_check(self.side_to_move) {
            return 0;
        }
        match self.side_to_move {
            Side::White => -MATE_SCORE,
            Side::Black => MATE_SCORE,
        }
    }
}

impl fmt::Display for ChessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.board.iter().enumerate() {
            write!(f, "{} ", 8 - r)?;
            for cell in row {
                let symbol = cell.map_or('.', Piece::symbol);
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

/// Picks a move for the side to move.
///
/// Difficulty sets the search depth; easier tiers may skip the search and
/// play a uniformly random legal move instead.
pub fn best_move<R: Rng + ?Sized>(state: &ChessState, config: &AiConfig, rng: &mut R) -> SearchResult<ChessMove> {
    let moves = state.get_possible_moves();
    if moves.is_empty() {
        return SearchResult::no_move();
    }

    let randomness = config.difficulty.random_move_probability();
    if randomness > 0.0 && rng.random_bool(randomness) {
        let mv = moves[rng.random_range(0..moves.len())];
        debug!("chess ({}): playing random move {}", config.difficulty, mv);
        return SearchResult::unscored(mv);
    }

    alpha_beta::search(state, config.difficulty.chess_depth())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn play(state: &mut ChessState, moves: &[&str]) {
        for text in moves {
            let mv = state.parse_move(text).unwrap();
            assert!(state.is_legal(&mv), "{} should be legal", text);
            state.make_move(&mv);
        }
    }

    fn mirrored(state: &ChessState) -> ChessState {
        let mut board = [[None; 8]; 8];
        for r in 0..8 {
            for c in 0..8 {
                board[7 - r][c] = state.board[r][c].map(|p| Piece::new(p.kind, p.side.opponent()));
            }
        }
        ChessState {
            board,
            side_to_move: state.side_to_move.opponent(),
            last_move: None,
        }
    }

    #[test]
    fn test_square_names() {
        assert_eq!(sq("a8"), Square::new(0, 0));
        assert_eq!(sq("e2"), Square::new(6, 4));
        assert_eq!(Square::new(7, 7).to_string(), "h1");
        assert!("i9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn test_initial_position() {
        let state = ChessState::new();
        assert_eq!(state.get_current_player(), 1);
        assert_eq!(state.get_possible_moves().len(), 20);
        assert_eq!(state.get_status(), GameStatus::InProgress);
        assert_eq!(state.evaluate(), 0);
    }

    #[test]
    fn test_pawn_double_step() {
        let mut state = ChessState::new();
        play(&mut state, &["e2e4"]);
        assert_eq!(
            state.piece_at(Square::new(4, 4)),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
        assert_eq!(state.piece_at(Square::new(6, 4)), None);
        assert_eq!(state.side_to_move(), Side::Black);
    }

    #[test]
    fn test_knight_jumps_over_pieces() {
        let state = ChessState::new();
        let targets: Vec<String> = state
            .get_possible_moves()
            .into_iter()
            .filter(|mv| mv.from == sq("g1"))
            .map(|mv| mv.to.to_string())
            .collect();
        assert_eq!(targets, vec!["f3", "h3"]);
    }

    #[test]
    fn test_blocked_pawn_cannot_advance() {
        let mut state = ChessState::new();
        play(&mut state, &["e2e4", "e7e5"]);
        assert!(!state
            .get_possible_moves()
            .iter()
            .any(|mv| mv.from == sq("e4")));
    }

    #[test]
    fn test_en_passant_removes_captured_pawn() {
        let mut state = ChessState::from_rows(
            [
                "....k...", "...p....", "........", "....P...", "........", "........", "........",
                "....K...",
            ],
            Side::Black,
        );
        play(&mut state, &["d7d5"]);
        let capture = state.parse_move("e5d6").unwrap();
        assert!(state.is_legal(&capture));

        state.make_move(&capture);
        assert_eq!(state.piece_at(sq("d5")), None);
        assert_eq!(
            state.piece_at(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
    }

    #[test]
    fn test_en_passant_expires_after_one_move() {
        let mut state = ChessState::from_rows(
            [
                "....k...", "...p....", "........", "....P...", "........", "........", "........",
                "....K...",
            ],
            Side::Black,
        );
        play(&mut state, &["d7d5", "e1f1", "e8f8"]);
        let capture = state.parse_move("e5d6").unwrap();
        assert!(!state.is_legal(&capture));
    }

    #[test]
    fn test_en_passant_from_given_last_move() {
        let state = ChessState::from_rows(
            [
                "....k...", "........", "........", "...pP...", "........", "........", "........",
                "....K...",
            ],
            Side::White,
        );
        assert!(state.parse_move("e5d6").map(|mv| !state.is_legal(&mv)).unwrap());

        let push = ChessMove {
            from: sq("d7"),
            to: sq("d5"),
            piece: Piece::new(PieceKind::Pawn, Side::Black),
        };
        let state = state.with_last_move(push);
        assert_eq!(state.last_move(), Some(push));
        assert!(state.is_legal(&state.parse_move("e5d6").unwrap()));
        assert_eq!(Side::from_player(state.get_current_player()), Side::White);
    }

    #[test]
    fn test_promotion_to_queen() {
        let mut state = ChessState::from_rows(
            [
                "........", "P.......", "....k...", "........", "........", "........", ".......p",
                "K.......",
            ],
            Side::White,
        );
        play(&mut state, &["a7a8", "h2h1"]);
        assert_eq!(
            state.piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Queen, Side::White))
        );
        assert_eq!(
            state.piece_at(sq("h1")),
            Some(Piece::new(PieceKind::Queen, Side::Black))
        );
    }

    #[test]
    fn test_pinned_rook_stays_on_file() {
        let state = ChessState::from_rows(
            [
                "....r..k", "........", "........", "........", "........", "........", "....R...",
                "....K...",
            ],
            Side::White,
        );
        let rook_moves: Vec<ChessMove> = state
            .get_possible_moves()
            .into_iter()
            .filter(|mv| mv.from == sq("e2"))
            .collect();
        assert_eq!(rook_moves.len(), 6);
        assert!(rook_moves.iter().all(|mv| mv.to.col == 4));
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        let state = ChessState::from_rows(
            [
                "...r...k", "........", "........", "........", "........", "........", "........",
                "....K...",
            ],
            Side::White,
        );
        let king_moves = state.get_possible_moves();
        assert!(!king_moves.iter().any(|mv| mv.to.col == 3));
        assert_eq!(king_moves.len(), 3);
    }

    #[test]
    fn test_checkmate() {
        let mut state = ChessState::new();
        play(&mut state, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(state.in_check(Side::White));
        assert!(state.get_possible_moves().is_empty());
        assert_eq!(state.get_status(), GameStatus::Win(-1));
        assert_eq!(state.terminal_score(), -MATE_SCORE);
    }

    #[test]
    fn test_stalemate() {
        let state = ChessState::from_rows(
            [
                "k.......", "..Q.....", "..K.....", "........", "........", "........", "........",
                "........",
            ],
            Side::Black,
        );
        assert!(!state.in_check(Side::Black));
        assert_eq!(state.get_status(), GameStatus::Draw);
        assert_eq!(state.terminal_score(), 0);
    }

    #[test]
    fn test_missing_king_counts_as_check() {
        let state = ChessState::from_rows(
            [
                "........", "........", "........", "........", "........", "........", "........",
                "....K...",
            ],
            Side::Black,
        );
        assert!(state.in_check(Side::Black));
        assert!(!state.in_check(Side::White));
    }

    #[test]
    fn test_mirrored_evaluation_negates() {
        let mut state = ChessState::new();
        play(&mut state, &["e2e4", "g8f6", "d1h5", "b7b6", "h5f7"]);
        let score = state.evaluate();
        assert_ne!(score, 0);
        assert_eq!(mirrored(&state).evaluate(), -score);
    }

    #[test]
    fn test_evaluation_values() {
        let mut state = ChessState::new();
        assert_eq!(state.evaluate(), 0);
        play(&mut state, &["e2e4"]);
        assert_eq!(state.evaluate(), -25);

        // Only pawns and knights carry positional bonuses.
        let rook = ChessState::from_rows(
            ["....k...", "R.......", "........", "........", "........", "........", "........", "....K..."],
            Side::White,
        );
        assert_eq!(rook.evaluate(), 500);
    }

    #[test]
    fn test_notation() {
        let state = ChessState::new();
        assert_eq!(state.parse_move("g1f3").unwrap().notation(), "Nf3");
        assert_eq!(state.parse_move("e2-e4").unwrap().notation(), "e4");
        assert_eq!(state.parse_move("e2 e4").unwrap().to_string(), "e2e4");
    }

    #[test]
    fn test_parse_errors() {
        let state = ChessState::new();
        assert!(matches!(
            state.parse_move("e2"),
            Err(MoveParseError::MalformedSquarePair(_))
        ));
        assert!(matches!(
            state.parse_move("z9e4"),
            Err(MoveParseError::InvalidSquare(_))
        ));
        assert!(matches!(
            state.parse_move("e4e5"),
            Err(MoveParseError::EmptySquare(_))
        ));
    }

    #[test]
    fn test_search_finds_back_rank_mate() {
        let state = ChessState::from_rows(
            [
                "......k.", ".....ppp", "........", "........", "........", "........", "........",
                "R.....K.",
            ],
            Side::White,
        );
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let config = AiConfig::with_difficulty(Difficulty::Medium);
        let result = best_move(&state, &config, &mut rng);
        assert_eq!(result.best_move.map(|mv| mv.to_string()), Some("a1a8".to_string()));
        assert_eq!(result.score, Some(f64::from(MATE_SCORE)));
    }

    #[test]
    fn test_search_value_matches_minimax() {
        let mut state = ChessState::new();
        play(&mut state, &["e2e4", "d7d5"]);
        let result = alpha_beta::search(&state, 2);
        assert_eq!(result.score, Some(f64::from(alpha_beta::minimax(&state, 2))));
    }

    #[test]
    fn test_easy_moves_are_legal() {
        let state = ChessState::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let config = AiConfig::with_difficulty(Difficulty::Easy);
        for _ in 0..10 {
            let mv = best_move(&state, &config, &mut rng).best_move.unwrap();
            assert!(state.is_legal(&mv));
        }
    }

    #[test]
    fn test_easy_sometimes_skips_search() {
        let state = ChessState::new();
        let searched = alpha_beta::search(&state, Difficulty::Easy.chess_depth()).best_move;
        let easy = AiConfig::with_difficulty(Difficulty::Easy);
        let medium = AiConfig::with_difficulty(Difficulty::Medium);

        let mut differed = 0;
        for seed in 0..16 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            if best_move(&state, &easy, &mut rng).best_move != searched {
                differed += 1;
            }
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            assert_eq!(best_move(&state, &medium, &mut rng).best_move, searched);
        }
        assert!(differed > 0);
    }

    #[test]
    fn test_no_move_when_mated() {
        let mut state = ChessState::new();
        play(&mut state, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let result = best_move(&state, &AiConfig::default(), &mut rng);
        assert!(result.best_move.is_none());
    }
}
