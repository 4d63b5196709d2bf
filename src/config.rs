//! # AI Configuration
//!
//! Knobs shared by every computer opponent: difficulty tier, the wall-clock
//! budget for time-bounded search, the depth cap and the chance-node policy.

use clap::ValueEnum;
use std::fmt;
use std::time::Duration;

/// Difficulty tier of the computer opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Minimax depth in plies for the chess engine
    pub fn chess_depth(self) -> u32 {
        match self {
            Difficulty::Easy | Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Probability of skipping search and playing a uniformly random legal move
    pub fn random_move_probability(self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium | Difficulty::Hard => 0.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

/// How chance nodes combine the values of their children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ChancePolicy {
    /// Worst case over all insertions, pruned against the running bound
    #[default]
    Bounded,
    /// Probability-weighted average over all insertions (2 at 0.9, 4 at 0.1)
    Weighted,
}

/// Configuration for a single `best_move` request
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// Soft budget for iterative deepening; checked between iterations only
    pub time_budget: Duration,
    /// Deepest iteration the iterative-deepening driver may start
    pub max_depth: u32,
    pub chance_policy: ChancePolicy,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            time_budget: Duration::from_millis(100),
            max_depth: 4,
            chance_policy: ChancePolicy::default(),
        }
    }
}

impl AiConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}
