//! Standard PageRank algorithm
//!
//! Power iteration with a uniform teleportation floor and uniform
//! redistribution of dangling-node mass. Every node starts at the configured
//! constant initial value and the vector is never renormalized, so scores
//! converge to a fixed point that sums to one only in the limit.

use rayon::prelude::*;

use super::PageRankResult;
use crate::errors::{RankError, Result};
use crate::graph::csr::LinkGraph;
use crate::types::{Parallelism, RankConfig};

/// Graphs at least this large use the parallel pull pass under [`Parallelism::Auto`].
pub const PARALLEL_MIN_NODES: usize = 4096;

/// Standard PageRank implementation
///
/// Construction validates the configuration, so a solver that exists can
/// always run.
#[derive(Debug, Clone)]
pub struct PageRankSolver {
    config: RankConfig,
}

impl Default for PageRankSolver {
    fn default() -> Self {
        Self {
            config: RankConfig::default(),
        }
    }
}

impl PageRankSolver {
    /// Create a solver, rejecting invalid configurations before any iteration runs.
    pub fn new(config: RankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Run PageRank on a graph from the configured initial value
    ///
    /// Returns the result even if convergence wasn't achieved, with `converged=false`.
    pub fn run(&self, graph: &LinkGraph) -> PageRankResult {
        self.iterate(graph, vec![self.config.initial_value; graph.num_nodes])
    }

    /// Run PageRank starting from an explicit rank vector
    ///
    /// `initial` must have one finite, non-negative entry per node.
    pub fn run_from(&self, graph: &LinkGraph, initial: Vec<f64>) -> Result<PageRankResult> {
        if initial.len() != graph.num_nodes {
            return Err(RankError::InvalidInitialState(format!(
                "expected {} initial values, got {}",
                graph.num_nodes,
                initial.len()
            )));
        }
        if let Some((node, value)) = initial
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(RankError::InvalidInitialState(format!(
                "node {node} has initial value {value}"
            )));
        }

        Ok(self.iterate(graph, initial))
    }

    fn use_parallel(&self, num_nodes: usize) -> bool {
        match self.config.parallelism {
            Parallelism::Sequential => false,
            Parallelism::Parallel => true,
            Parallelism::Auto => num_nodes >= PARALLEL_MIN_NODES,
        }
    }

    fn iterate(&self, graph: &LinkGraph, mut scores: Vec<f64>) -> PageRankResult {
        let n = graph.num_nodes;
        if n == 0 {
            return PageRankResult::new(vec![], 0, 0.0, true);
        }

        let damping = self.config.damping_factor;
        let threshold = self.config.convergence_threshold;
        // Validated at construction to be at least 1
        let budget = usize::try_from(self.config.max_iterations).unwrap_or(0);
        let parallel = self.use_parallel(n);

        let mut new_scores = vec![0.0; n];
        let mut shares = if parallel { vec![0.0; n] } else { Vec::new() };

        let teleport = (1.0 - damping) / n as f64;
        let mut iterations = 0;
        let mut delta = f64::INFINITY;
        let mut converged = false;
        let mut non_finite = 0;

        while iterations < budget {
            iterations += 1;

            // Dangling mass is spread over every node, so it folds into the base value
            let dangling_mass: f64 = graph
                .dangling_nodes()
                .iter()
                .map(|&d| scores[d as usize])
                .sum();
            let base = teleport + damping * dangling_mass / n as f64;

            if parallel {
                pull_contributions(graph, &scores, &mut shares, &mut new_scores, base, damping);
            } else {
                push_contributions(graph, &scores, &mut new_scores, base, damping);
            }

            delta = l1_change(&scores, &new_scores);

            let bad = new_scores.iter().filter(|s| !s.is_finite()).count();
            if bad > 0 {
                non_finite += bad;
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    iteration = iterations,
                    count = bad,
                    first = ?new_scores.iter().position(|s| !s.is_finite()),
                    "non-finite rank values produced"
                );
            }

            std::mem::swap(&mut scores, &mut new_scores);

            #[cfg(feature = "tracing")]
            tracing::debug!(iteration = iterations, delta, "pagerank step");

            // A zero change over an overflowed vector is not a fixed point
            if delta < threshold {
                converged = bad == 0;
                break;
            }
        }

        #[cfg(feature = "tracing")]
        if !converged && iterations == budget {
            tracing::warn!(
                iterations,
                delta,
                threshold,
                "pagerank did not converge within the iteration budget"
            );
        }

        PageRankResult::new(scores, iterations, delta, converged).with_non_finite(non_finite)
    }
}

/// Sequential pass: each source pushes its share along its out-edges.
fn push_contributions(
    graph: &LinkGraph,
    scores: &[f64],
    new_scores: &mut [f64],
    base: f64,
    damping: f64,
) {
    new_scores.fill(base);

    for (node, &node_score) in scores.iter().enumerate() {
        let degree = graph.degree(node as u32);

        if degree > 0 {
            let contribution = damping * node_score / degree as f64;
            for &target in graph.neighbors(node as u32) {
                new_scores[target as usize] += contribution;
            }
        }
    }
}

/// Parallel pass: each target pulls from its in-edges.
///
/// Every slot of `new_scores` is written by exactly one task, so no
/// synchronization is needed.
fn pull_contributions(
    graph: &LinkGraph,
    scores: &[f64],
    shares: &mut [f64],
    new_scores: &mut [f64],
    base: f64,
    damping: f64,
) {
    shares
        .par_iter_mut()
        .zip(scores.par_iter())
        .zip(graph.out_degree.par_iter())
        .for_each(|((share, &score), &degree)| {
            *share = if degree > 0 {
                damping * score / degree as f64
            } else {
                0.0
            };
        });

    let shares = &*shares;
    new_scores
        .par_iter_mut()
        .enumerate()
        .for_each(|(target, slot)| {
            let incoming: f64 = graph
                .in_neighbors(target as u32)
                .iter()
                .map(|&source| shares[source as usize])
                .sum();
            *slot = base + incoming;
        });
}

/// L1 distance between two rank vectors; non-finite terms count as zero.
fn l1_change(old: &[f64], new: &[f64]) -> f64 {
    old.iter()
        .zip(new.iter())
        .map(|(o, n)| {
            let diff = (n - o).abs();
            if diff.is_finite() {
                diff
            } else {
                0.0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn page(url: &str, links: &[&str]) -> Record {
        Record::new(url, links.iter().copied())
    }

    fn build_cycle_graph() -> LinkGraph {
        LinkGraph::from_records(&[page("a", &["b"]), page("b", &["c"]), page("c", &["a"])])
    }

    fn build_hub_graph() -> LinkGraph {
        // Three spokes link to the hub; the hub links back to one of them
        LinkGraph::from_records(&[
            page("hub", &["s1"]),
            page("s1", &["hub"]),
            page("s2", &["hub"]),
            page("s3", &["hub"]),
        ])
    }

    fn solver(config: RankConfig) -> PageRankSolver {
        PageRankSolver::new(config).unwrap()
    }

    /// A deterministic graph large enough to be interesting, with every
    /// tenth node dangling.
    fn build_synthetic_graph(n: usize) -> LinkGraph {
        let url = |i: usize| format!("https://news.example.edu/{i}");
        let records: Vec<Record> = (0..n)
            .map(|i| {
                let links = if i % 10 == 0 {
                    vec![]
                } else {
                    vec![url((i * 7 + 3) % n), url((i * 13 + 1) % n), url(i)]
                };
                Record::new(url(i), links)
            })
            .collect();
        LinkGraph::from_records(&records)
    }

    #[test]
    fn test_empty_graph() {
        let result = PageRankSolver::default().run(&LinkGraph::default());

        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert!(result.scores.is_empty());
    }

    #[test]
    fn test_two_node_first_iteration() {
        // a -> b, b dangling
        let graph = LinkGraph::from_records(&[page("a", &["b"]), page("b", &[])]);
        let pr = solver(RankConfig::default().with_max_iterations(1));
        let result = pr.run(&graph);

        // a: 0.15/2 + 0.85 * 0.3 / 2
        assert!((result.scores[0] - 0.2025).abs() < 1e-12);
        // b: 0.15/2 + 0.85 * 0.3 + 0.85 * 0.3 / 2
        assert!((result.scores[1] - 0.4575).abs() < 1e-12);
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
    }

    #[test]
    fn test_isolated_node_converges_to_one() {
        let graph = LinkGraph::from_records(&[page("only", &[])]);
        let result = PageRankSolver::default().run(&graph);

        assert!(result.converged);
        assert!(result.iterations < 100);
        assert!((result.scores[0] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_first_iteration_mass_without_dangling_nodes() {
        let graph = build_cycle_graph();
        let pr = solver(RankConfig::default().with_max_iterations(1));
        let result = pr.run(&graph);

        // (1 - d) + d * N * v0
        let expected = 0.15 + 0.85 * 3.0 * 0.3;
        assert!((result.total_mass() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_dangling_mass_is_not_lost() {
        let graph = LinkGraph::from_records(&[
            page("a", &["b"]),
            page("b", &["c"]),
            page("c", &[]),
            page("d", &[]),
        ]);
        let pr = solver(RankConfig::default().with_max_iterations(1));
        let result = pr.run(&graph);

        let expected = 0.15 + 0.85 * 4.0 * 0.3;
        assert!((result.total_mass() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cycle_graph_equal_scores() {
        let result = PageRankSolver::default().run(&build_cycle_graph());

        assert!(result.converged);
        for score in &result.scores {
            assert!((score - 1.0 / 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_hub_scores_highest() {
        let result = PageRankSolver::default().run(&build_hub_graph());

        assert!(result.converged);
        let hub_score = result.scores[0];
        for &score in &result.scores[1..] {
            assert!(hub_score > score);
        }
        assert_eq!(result.top_n(1)[0].0, 0);
    }

    #[test]
    fn test_rerun_from_converged_output_is_stable() {
        let graph = build_synthetic_graph(200);
        // 200 nodes at 0.3 start far from the fixed point, so allow extra steps
        let config = RankConfig::default().with_max_iterations(300);
        let first = solver(config.clone()).run(&graph);
        assert!(first.converged);

        let again = solver(config.with_max_iterations(1))
            .run_from(&graph, first.scores.clone())
            .unwrap();
        assert!(again.delta < 1e-6);
    }

    #[test]
    fn test_max_iterations_returns_partial() {
        let pr = solver(RankConfig::default().with_max_iterations(2).with_threshold(1e-300));
        let result = pr.run(&build_hub_graph());

        assert_eq!(result.iterations, 2);
        assert!(!result.converged);
        assert_eq!(result.scores.len(), 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let graph = build_synthetic_graph(1000);
        let seq = solver(RankConfig::default().with_parallelism(Parallelism::Sequential)).run(&graph);
        let par = solver(RankConfig::default().with_parallelism(Parallelism::Parallel)).run(&graph);

        assert_eq!(seq.iterations, par.iterations);
        for (a, b) in seq.scores.iter().zip(par.scores.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_damping_factor_sharpens_hub() {
        let graph = build_hub_graph();
        let low = solver(RankConfig::default().with_damping(0.5)).run(&graph);
        let high = solver(RankConfig::default().with_damping(0.95)).run(&graph);

        let advantage_low = low.scores[0] - low.scores[2];
        let advantage_high = high.scores[0] - high.scores[2];
        assert!(advantage_high > advantage_low);
    }

    #[test]
    fn test_invalid_damping_rejected() {
        for damping in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let err = PageRankSolver::new(RankConfig::default().with_damping(damping)).unwrap_err();
            assert!(matches!(err, RankError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_non_finite_initial_value_rejected() {
        let err =
            PageRankSolver::new(RankConfig::default().with_initial_value(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, RankError::InvalidInitialState(_)));
    }

    #[test]
    fn test_run_from_rejects_bad_vectors() {
        let graph = build_cycle_graph();
        let pr = PageRankSolver::default();

        assert!(matches!(
            pr.run_from(&graph, vec![0.3; 2]),
            Err(RankError::InvalidInitialState(_))
        ));
        assert!(matches!(
            pr.run_from(&graph, vec![0.3, f64::NAN, 0.3]),
            Err(RankError::InvalidInitialState(_))
        ));
        assert!(matches!(
            pr.run_from(&graph, vec![0.3, -1.0, 0.3]),
            Err(RankError::InvalidInitialState(_))
        ));
    }

    #[test]
    fn test_overflow_is_counted_not_hidden() {
        // Two sources pour f64::MAX-scale mass into "c"
        let graph = LinkGraph::from_records(&[page("a", &["c"]), page("b", &["c"]), page("c", &["a"])]);
        let pr = solver(RankConfig::default().with_max_iterations(1));
        let result = pr.run_from(&graph, vec![f64::MAX; 3]).unwrap();

        assert!(result.non_finite > 0);
        assert!(result.scores[2].is_infinite());
    }

    #[test]
    fn test_overflowed_vector_never_reports_convergence() {
        // Once every changing term is infinite the L1 change collapses to 0
        let graph = LinkGraph::from_records(&[page("a", &["c"]), page("b", &["c"]), page("c", &["a"])]);
        let pr = solver(RankConfig::default().with_max_iterations(3));
        let result = pr.run_from(&graph, vec![f64::MAX; 3]).unwrap();

        assert_eq!(result.delta, 0.0);
        assert!(!result.converged);
        assert!(result.non_finite > 0);
        assert!(result.scores.iter().any(|s| s.is_infinite()));
    }

    #[test]
    fn test_l1_change_skips_non_finite_terms() {
        let change = l1_change(&[1.0, 0.0, 2.0], &[1.5, f64::INFINITY, 1.0]);
        assert!((change - 1.5).abs() < 1e-12);
    }
}
