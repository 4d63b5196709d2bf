//! # Search Drivers
//!
//! Game-independent search algorithms. [`alpha_beta`] serves two-player
//! zero-sum games, [`expectimax`] serves games against random insertions.
//! Both branch by cloning the state; no search ever mutates its input.

pub mod alpha_beta;
pub mod expectimax;

/// Counters collected while searching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Positions visited
    pub nodes: u64,
    /// Branches abandoned because the search window closed
    pub cutoffs: u64,
}

impl SearchStatistics {
    pub fn merge(&mut self, other: SearchStatistics) {
        self.nodes += other.nodes;
        self.cutoffs += other.cutoffs;
    }
}

/// Outcome of a `best_move` request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<M> {
    /// The chosen move, `None` only when no legal move exists
    pub best_move: Option<M>,
    /// Diagnostic score of the chosen move, if a search produced one
    pub score: Option<f64>,
    /// Deepest completed iteration of a time-bounded search
    pub depth_reached: Option<u32>,
    pub stats: SearchStatistics,
}

impl<M> SearchResult<M> {
    /// A result for a position without legal moves
    pub fn no_move() -> Self {
        Self {
            best_move: None,
            score: None,
            depth_reached: None,
            stats: SearchStatistics::default(),
        }
    }

    /// A result for a move chosen without searching
    pub fn unscored(mv: M) -> Self {
        Self {
            best_move: Some(mv),
            ..Self::no_move()
        }
    }

    /// Converts the move type, keeping score and statistics
    pub fn map_move<N>(self, f: impl FnOnce(M) -> N) -> SearchResult<N> {
        SearchResult {
            best_move: self.best_move.map(f),
            score: self.score,
            depth_reached: self.depth_reached,
            stats: self.stats,
        }
    }
}
