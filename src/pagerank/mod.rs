//! PageRank over the link graph
//!
//! This module provides the power-iteration solver and its result type.

pub mod standard;

pub use standard::{PageRankSolver, PARALLEL_MIN_NODES};

/// Result of a PageRank computation
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Scores for each node (indexed by node ID)
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final convergence delta (L1 change of the last step)
    pub delta: f64,
    /// Whether the change fell below the threshold with every score finite.
    ///
    /// Always `false` when the final vector holds a NaN or infinity, even if
    /// the L1 change reached zero.
    pub converged: bool,
    /// Non-finite entries seen across all iterations; zero for a healthy run
    pub non_finite: usize,
}

impl PageRankResult {
    /// Create a new PageRank result
    pub fn new(scores: Vec<f64>, iterations: usize, delta: f64, converged: bool) -> Self {
        Self {
            scores,
            iterations,
            delta,
            converged,
            non_finite: 0,
        }
    }

    pub(crate) fn with_non_finite(mut self, non_finite: usize) -> Self {
        self.non_finite = non_finite;
        self
    }

    /// Get top N nodes by score
    pub fn top_n(&self, n: usize) -> Vec<(u32, f64)> {
        let mut indexed: Vec<_> = self
            .scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (i as u32, s))
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(n);
        indexed
    }

    /// Get the score for a specific node
    pub fn score(&self, node: u32) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }

    /// Sum of all scores
    pub fn total_mass(&self) -> f64 {
        self.scores.iter().sum()
    }
}
