//! Expectimax with iterative deepening under a wall-clock budget.
//!
//! The tree alternates between player nodes, where the best move is taken,
//! and chance nodes, where every possible insertion is considered. With
//! [`ChancePolicy::Bounded`] a chance node keeps the worst child value,
//! pruned against the running `(alpha, beta)` bound; this trades the true
//! expectation for speed. [`ChancePolicy::Weighted`] computes the
//! probability-weighted average instead.

use crate::config::{AiConfig, ChancePolicy};
use crate::search::{SearchResult, SearchStatistics};
use crate::ChanceGame;
use log::debug;
use std::time::Instant;

/// Score of a position in which the player can never move again
pub const LOSS_SCORE: f64 = -10_000.0;

/// Half-width of the initial search window
pub const WINDOW: f64 = 10_000.0;

/// Searches `state` to `depth` and returns the chosen player move, if any,
/// with its score.
///
/// `depth` counts player moves beyond the first: at depth 0 every player
/// move is scored with the heuristic right after it is made.
pub fn search_depth<S: ChanceGame>(
    state: &S,
    depth: u32,
    alpha: f64,
    beta: f64,
    policy: ChancePolicy,
    stats: &mut SearchStatistics,
) -> (Option<S::Move>, f64) {
    if state.is_chance_turn() {
        (None, chance_node(state, depth, alpha, beta, policy, stats))
    } else {
        player_node(state, depth, alpha, beta, policy, stats)
    }
}

fn player_node<S: ChanceGame>(
    state: &S,
    depth: u32,
    alpha: f64,
    beta: f64,
    policy: ChancePolicy,
    stats: &mut SearchStatistics,
) -> (Option<S::Move>, f64) {
    let mut best_score = alpha;
    let mut best_move = None;

    for mv in state.get_possible_moves() {
        let mut child = state.clone();
        child.make_move(&mv);
        stats.nodes += 1;

        if child.is_lost() {
            return (Some(mv), LOSS_SCORE);
        }

        let score = if depth == 0 {
            child.heuristic()
        } else {
            search_depth(&child, depth - 1, best_score, beta, policy, stats).1
        };

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if best_score > beta {
            stats.cutoffs += 1;
            return (best_move, beta);
        }
    }

    (best_move, best_score)
}

fn chance_node<S: ChanceGame>(
    state: &S,
    depth: u32,
    alpha: f64,
    beta: f64,
    policy: ChancePolicy,
    stats: &mut SearchStatistics,
) -> f64 {
    let moves = state.get_possible_moves();

    match policy {
        ChancePolicy::Bounded => {
            let mut best_score = beta;
            for mv in moves {
                let mut child = state.clone();
                child.make_move(&mv);
                stats.nodes += 1;

                let score = search_depth(&child, depth, alpha, best_score, policy, stats).1;
                if score < best_score {
                    best_score = score;
                }
                if best_score < alpha {
                    stats.cutoffs += 1;
                    return alpha;
                }
            }
            best_score
        }
        ChancePolicy::Weighted => {
            if moves.is_empty() {
                return state.heuristic();
            }
            let mut total = 0.0;
            let mut weight = 0.0;
            for mv in moves {
                let p = state.chance_probability(&mv);
                let mut child = state.clone();
                child.make_move(&mv);
                stats.nodes += 1;

                let (child_move, score) = search_depth(&child, depth, -WINDOW, WINDOW, policy, stats);
                // A player node without any move is stuck; score it as lost.
                let score = if child_move.is_none() && !child.is_chance_turn() {
                    LOSS_SCORE
                } else {
                    score
                };
                total += p * score;
                weight += p;
            }
            if weight > 0.0 {
                total / weight
            } else {
                state.heuristic()
            }
        }
    }
}

/// Runs [`search_depth`] at depth 0, 1, 2, … and keeps the deepest result.
///
/// A new iteration is started only while the time budget has not elapsed
/// and the depth cap has not been reached; an iteration in flight is never
/// interrupted. Stops early if an iteration finds no move.
pub fn iterative_deepening<S: ChanceGame>(state: &S, config: &AiConfig) -> SearchResult<S::Move> {
    let start = Instant::now();
    let mut result = SearchResult::no_move();
    let mut stats = SearchStatistics::default();
    let mut depth = 0;

    loop {
        let mut iteration = SearchStatistics::default();
        let (best_move, score) = search_depth(
            state,
            depth,
            -WINDOW,
            WINDOW,
            config.chance_policy,
            &mut iteration,
        );
        stats.merge(iteration);

        let Some(best_move) = best_move else {
            break;
        };
        debug!(
            "expectimax depth {} complete: score {:.3}, {} nodes, {} cutoffs",
            depth, score, iteration.nodes, iteration.cutoffs
        );
        result = SearchResult {
            best_move: Some(best_move),
            score: Some(score),
            depth_reached: Some(depth),
            stats,
        };

        depth += 1;
        if start.elapsed() >= config.time_budget || depth >= config.max_depth {
            break;
        }
    }

    result.stats = stats;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::merge2048::{Direction, Merge2048Move, Merge2048State};
    use crate::GameState;
    use std::time::Duration;

    fn sample_board() -> Merge2048State {
        Merge2048State::from_rows([
            [2, 4, 8, 16],
            [0, 2, 4, 8],
            [0, 0, 2, 4],
            [0, 0, 0, 2],
        ])
    }

    #[test]
    fn test_depth_zero_picks_best_heuristic_move() {
        let state = sample_board();
        let mut stats = SearchStatistics::default();
        let (mv, score) = search_depth(&state, 0, -WINDOW, WINDOW, ChancePolicy::Bounded, &mut stats);

        let expected = state
            .get_possible_moves()
            .into_iter()
            .map(|mv| {
                let mut child = state.clone();
                child.make_move(&mv);
                child.heuristic()
            })
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(mv.is_some());
        assert_eq!(score, expected);
    }

    #[test]
    fn test_stuck_player_has_no_move() {
        let state = Merge2048State::from_rows([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        let mut stats = SearchStatistics::default();
        let (mv, _) = search_depth(&state, 2, -WINDOW, WINDOW, ChancePolicy::Bounded, &mut stats);
        assert!(mv.is_none());
        assert_eq!(stats.nodes, 0);
    }

    #[test]
    fn test_iterative_deepening_respects_depth_cap() {
        let state = sample_board();
        let config = AiConfig {
            time_budget: Duration::from_secs(60),
            max_depth: 2,
            ..AiConfig::default()
        };
        let result = iterative_deepening(&state, &config);
        assert_eq!(result.depth_reached, Some(1));
        assert!(matches!(result.best_move, Some(Merge2048Move::Slide(_))));
    }

    #[test]
    fn test_zero_budget_still_completes_one_iteration() {
        let state = sample_board();
        let config = AiConfig {
            time_budget: Duration::ZERO,
            ..AiConfig::default()
        };
        let result = iterative_deepening(&state, &config);
        assert_eq!(result.depth_reached, Some(0));
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_weighted_policy_returns_legal_move() {
        let state = sample_board();
        let config = AiConfig {
            time_budget: Duration::from_secs(60),
            max_depth: 2,
            chance_policy: ChancePolicy::Weighted,
            ..AiConfig::default()
        };
        let result = iterative_deepening(&state, &config);
        let mv = result.best_move.expect("board has moves");
        assert!(state.is_legal(&mv));
    }

    #[test]
    fn test_single_legal_direction_is_chosen() {
        // Only sliding up changes this board
        let state = Merge2048State::from_rows([
            [0, 0, 0, 0],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
        ]);
        let result = iterative_deepening(&state, &AiConfig::default());
        assert_eq!(result.best_move, Some(Merge2048Move::Slide(Direction::Up)));
    }
}
