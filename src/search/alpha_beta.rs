//! Depth-limited minimax with alpha-beta pruning.
//!
//! Player `1` maximizes and player `-1` minimizes a single zero-sum score.
//! Moves are explored in generation order; there is no move ordering, so
//! pruning is not optimal, which is acceptable at the shallow depths used.

use crate::search::{SearchResult, SearchStatistics};
use crate::Adversarial;
use log::debug;

/// Exhaustive minimax without pruning.
///
/// Used to cross-check [`alpha_beta`]; pruning must never change a value.
pub fn minimax<S: Adversarial>(state: &S, depth: u32) -> i32 {
    if depth == 0 {
        return state.evaluate();
    }
    let moves = state.get_possible_moves();
    if moves.is_empty() {
        return state.terminal_score();
    }
    let values = moves.iter().map(|mv| {
        let mut child = state.clone();
        child.make_move(mv);
        minimax(&child, depth - 1)
    });
    let best = if state.get_current_player() == 1 {
        values.max()
    } else {
        values.min()
    };
    best.unwrap_or_else(|| state.terminal_score())
}

/// Minimax value of `state` searched `depth` plies deep inside the
/// `(alpha, beta)` window.
///
/// A node stops exploring siblings as soon as `beta <= alpha`. A state whose
/// player to move has no legal moves is scored with
/// [`Adversarial::terminal_score`] instead of being expanded.
pub fn alpha_beta<S: Adversarial>(
    state: &S,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    stats: &mut SearchStatistics,
) -> i32 {
    stats.nodes += 1;
    if depth == 0 {
        return state.evaluate();
    }

    let moves = state.get_possible_moves();
    if moves.is_empty() {
        return state.terminal_score();
    }

    if state.get_current_player() == 1 {
        let mut best = i32::MIN;
        for mv in &moves {
            let mut child = state.clone();
            child.make_move(mv);
            let value = alpha_beta(&child, depth - 1, alpha, beta, stats);
            best = best.max(value);
            alpha = alpha.max(value);
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for mv in &moves {
            let mut child = state.clone();
            child.make_move(mv);
            let value = alpha_beta(&child, depth - 1, alpha, beta, stats);
            best = best.min(value);
            beta = beta.min(value);
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        best
    }
}

/// Picks the best move for the player to move, searching `depth` plies
/// including the root move.
///
/// Ties keep the first move in generation order. Returns a result without a
/// move when the player to move has no legal moves.
pub fn search<S: Adversarial>(state: &S, depth: u32) -> SearchResult<S::Move> {
    let moves = state.get_possible_moves();
    if moves.is_empty() {
        return SearchResult::no_move();
    }

    let maximizing = state.get_current_player() == 1;
    let mut stats = SearchStatistics::default();
    let mut alpha = i32::MIN;
    let mut beta = i32::MAX;
    let mut best: Option<(S::Move, i32)> = None;

    for mv in moves {
        let mut child = state.clone();
        child.make_move(&mv);
        let value = alpha_beta(&child, depth.saturating_sub(1), alpha, beta, &mut stats);
        let improves = match &best {
            None => true,
            Some((_, best_value)) if maximizing => value > *best_value,
            Some((_, best_value)) => value < *best_value,
        };
        if improves {
            if maximizing {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            best = Some((mv, value));
        }
    }

    debug!(
        "alpha-beta depth {}: {} nodes, {} cutoffs",
        depth, stats.nodes, stats.cutoffs
    );

    match best {
        Some((mv, value)) => SearchResult {
            best_move: Some(mv),
            score: Some(f64::from(value)),
            depth_reached: Some(depth),
            stats,
        },
        None => SearchResult::no_move(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameState, GameStatus};

    /// Uniform game tree whose leaves carry pseudo-random values.
    #[derive(Debug, Clone, PartialEq)]
    struct TreeGame {
        path: Vec<usize>,
        depth: usize,
        branching: usize,
    }

    impl TreeGame {
        fn new(depth: usize, branching: usize) -> Self {
            Self {
                path: Vec::new(),
                depth,
                branching,
            }
        }
    }

    impl GameState for TreeGame {
        type Move = usize;

        fn get_possible_moves(&self) -> Vec<usize> {
            if self.path.len() < self.depth {
                (0..self.branching).collect()
            } else {
                Vec::new()
            }
        }

        fn make_move(&mut self, mv: &usize) {
            self.path.push(*mv);
        }

        fn get_status(&self) -> GameStatus {
            if self.path.len() < self.depth {
                GameStatus::InProgress
            } else {
                GameStatus::Draw
            }
        }

        fn get_current_player(&self) -> i32 {
            if self.path.len() % 2 == 0 {
                1
            } else {
                -1
            }
        }
    }

    impl Adversarial for TreeGame {
        fn evaluate(&self) -> i32 {
            self.path
                .iter()
                .fold(17i32, |acc, &m| (acc * 31 + m as i32 * 7 + 3) % 101)
                - 50
        }

        fn terminal_score(&self) -> i32 {
            self.evaluate()
        }
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        for depth in 1..=5 {
            let game = TreeGame::new(depth, 3);
            let mut stats = SearchStatistics::default();
            let pruned = alpha_beta(&game, depth as u32, i32::MIN, i32::MAX, &mut stats);
            assert_eq!(pruned, minimax(&game, depth as u32), "depth {}", depth);
        }
    }

    #[test]
    fn test_pruning_skips_nodes() {
        let game = TreeGame::new(4, 4);
        let mut stats = SearchStatistics::default();
        alpha_beta(&game, 4, i32::MIN, i32::MAX, &mut stats);
        // A full tree of branching 4 and depth 4 has 341 nodes
        assert!(stats.nodes < 341);
        assert!(stats.cutoffs > 0);
    }

    #[test]
    fn test_root_search_value_is_exact() {
        let game = TreeGame::new(4, 3);
        let result = search(&game, 4);
        let best_move = result.best_move.expect("tree has moves");
        let mut child = game.clone();
        child.make_move(&best_move);
        assert_eq!(result.score, Some(f64::from(minimax(&child, 3))));
        assert_eq!(result.score, Some(f64::from(minimax(&game, 4))));
    }

    #[test]
    fn test_search_does_not_mutate_input() {
        let game = TreeGame::new(3, 3);
        let before = game.clone();
        let _ = search(&game, 3);
        assert_eq!(game, before);
    }

    #[test]
    fn test_no_moves_yields_no_result() {
        let game = TreeGame::new(0, 3);
        let result = search(&game, 2);
        assert!(result.best_move.is_none());
        assert!(result.score.is_none());
    }

    #[test]
    fn test_depth_zero_is_static_evaluation() {
        let game = TreeGame::new(3, 3);
        let mut stats = SearchStatistics::default();
        assert_eq!(alpha_beta(&game, 0, i32::MIN, i32::MAX, &mut stats), game.evaluate());
        assert_eq!(stats.nodes, 1);
    }
}
