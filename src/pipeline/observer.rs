//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Use cases include timing stages, inspecting the graph or the
//! raw rank vector, and emitting structured telemetry.

use std::time::{Duration, Instant};

use crate::graph::csr::LinkGraph;
use crate::pagerank::PageRankResult;

pub const STAGE_GRAPH: &str = "graph";
pub const STAGE_RANK: &str = "rank";
pub const STAGE_SCORES: &str = "scores";

/// Wall-clock timer for one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    started: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a stage reports when it finishes. Fields not relevant to the stage
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    pub duration: Duration,
    pub nodes: Option<usize>,
    pub edges: Option<usize>,
    pub dropped_links: Option<usize>,
    pub iterations: Option<usize>,
    pub converged: Option<bool>,
    pub residual: Option<f64>,
}

impl StageReport {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
}

/// Fluent constructor for [`StageReport`].
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(duration: Duration) -> Self {
        Self {
            report: StageReport::new(duration),
        }
    }

    pub fn nodes(mut self, nodes: usize) -> Self {
        self.report.nodes = Some(nodes);
        self
    }

    pub fn edges(mut self, edges: usize) -> Self {
        self.report.edges = Some(edges);
        self
    }

    pub fn dropped_links(mut self, dropped: usize) -> Self {
        self.report.dropped_links = Some(dropped);
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.report.iterations = Some(iterations);
        self
    }

    pub fn converged(mut self, converged: bool) -> Self {
        self.report.converged = Some(converged);
        self
    }

    pub fn residual(mut self, residual: f64) -> Self {
        self.report.residual = Some(residual);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

/// Callbacks invoked by [`super::runner::RankPipeline::run`].
///
/// Every method has an empty default body, so implementors override only
/// what they need.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    fn on_graph(&mut self, _graph: &LinkGraph) {}

    fn on_rank(&mut self, _result: &PageRankResult) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that keeps each stage's report, in completion order.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    pub stages: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|(_, r)| r.duration).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.stages.push((stage, report.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let report = StageReportBuilder::new(Duration::from_millis(3))
            .nodes(4)
            .edges(5)
            .iterations(7)
            .converged(true)
            .build();

        assert_eq!(report.nodes, Some(4));
        assert_eq!(report.edges, Some(5));
        assert_eq!(report.iterations, Some(7));
        assert_eq!(report.converged, Some(true));
        assert_eq!(report.residual, None);
    }

    #[test]
    fn test_timing_observer_collects_in_order() {
        let mut observer = StageTimingObserver::new();
        observer.on_stage_end(STAGE_GRAPH, &StageReport::new(Duration::from_millis(2)));
        observer.on_stage_end(STAGE_RANK, &StageReport::new(Duration::from_millis(5)));

        assert_eq!(observer.stages.len(), 2);
        assert_eq!(observer.stages[0].0, STAGE_GRAPH);
        assert_eq!(observer.total_duration(), Duration::from_millis(7));
        assert!(observer.report(STAGE_SCORES).is_none());
    }
}
