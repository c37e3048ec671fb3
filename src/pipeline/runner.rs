//! Pipeline runner: orchestrates stage execution and artifact flow.
//!
//! A [`RankPipeline`] runs the three in-memory stages in order:
//!
//! 1. Build the link graph from the record store
//! 2. Solve PageRank over the graph
//! 3. Write the scores back onto a copy of the records
//!
//! An optional [`PipelineObserver`] is notified at each boundary.

use crate::errors::Result;
use crate::graph::builder::GraphBuilder;
use crate::graph::csr::LinkGraph;
use crate::pagerank::{PageRankResult, PageRankSolver};
use crate::pipeline::observer::{
    PipelineObserver, StageClock, StageReportBuilder, STAGE_GRAPH, STAGE_RANK, STAGE_SCORES,
};
use crate::pipeline::spec::RankSpec;
use crate::scores::ScoreWriter;
use crate::store::RecordStore;
use crate::types::RankConfig;

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for a pipeline stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    /// The input records with `score` populated, in input order
    pub store: RecordStore,
    /// Raw solver output, indexed by graph node
    pub result: PageRankResult,
    /// Links discarded because their target is outside the corpus
    pub dropped_links: usize,
}

/// Record store → graph → solver → score writer.
#[derive(Debug, Clone, Default)]
pub struct RankPipeline {
    pub solver: PageRankSolver,
    pub writer: ScoreWriter,
}

impl RankPipeline {
    /// Build a pipeline, rejecting an invalid configuration up front.
    pub fn new(config: RankConfig) -> Result<Self> {
        Ok(Self {
            solver: PageRankSolver::new(config)?,
            writer: ScoreWriter,
        })
    }

    /// Build a pipeline from a validated run spec.
    ///
    /// Warnings are logged; the first error aborts.
    pub fn from_spec(spec: &RankSpec) -> Result<Self> {
        let report = crate::pipeline::validation::ValidationEngine::with_defaults().validate(spec);
        #[cfg(feature = "tracing")]
        for warning in report.warnings() {
            tracing::warn!(%warning, "run spec");
        }
        report.into_result()?;
        Self::new(spec.rank.clone())
    }

    /// Execute the pipeline over `store`.
    ///
    /// Pass [`NoopObserver`](crate::pipeline::observer::NoopObserver) when no
    /// callbacks are needed.
    pub fn run(
        &self,
        store: &RecordStore,
        observer: &mut impl PipelineObserver,
    ) -> Result<RankOutcome> {
        // Stage 1: Build graph
        trace_stage!(STAGE_GRAPH);
        observer.on_stage_start(STAGE_GRAPH);
        let clock = StageClock::start();
        let builder = GraphBuilder::from_records(store.records());
        let dropped_links = builder.dropped_links();
        let graph = LinkGraph::from_builder(&builder);
        let report = StageReportBuilder::new(clock.elapsed())
            .nodes(graph.num_nodes)
            .edges(graph.num_edges())
            .dropped_links(dropped_links)
            .build();
        observer.on_stage_end(STAGE_GRAPH, &report);
        observer.on_graph(&graph);

        #[cfg(feature = "tracing")]
        tracing::info!(
            nodes = graph.num_nodes,
            edges = graph.num_edges(),
            dangling = graph.dangling_nodes().len(),
            dropped_links,
            "link graph built"
        );

        // Stage 2: Rank
        trace_stage!(STAGE_RANK);
        observer.on_stage_start(STAGE_RANK);
        let clock = StageClock::start();
        let result = self.solver.run(&graph);
        let report = StageReportBuilder::new(clock.elapsed())
            .iterations(result.iterations)
            .converged(result.converged)
            .residual(result.delta)
            .build();
        observer.on_stage_end(STAGE_RANK, &report);
        observer.on_rank(&result);

        #[cfg(feature = "tracing")]
        tracing::info!(
            iterations = result.iterations,
            converged = result.converged,
            delta = result.delta,
            "pagerank finished"
        );

        // Stage 3: Write scores
        trace_stage!(STAGE_SCORES);
        observer.on_stage_start(STAGE_SCORES);
        let clock = StageClock::start();
        let scored = self.writer.write(store, &result.scores, &graph)?;
        let report = StageReportBuilder::new(clock.elapsed())
            .nodes(scored.len())
            .build();
        observer.on_stage_end(STAGE_SCORES, &report);

        Ok(RankOutcome {
            store: scored,
            result,
            dropped_links,
        })
    }
}
