//! Core data types: crawled page records and solver configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single crawled page after cleaning.
///
/// Identity is the `url`. Any fields the crawler emitted beyond the ones
/// named here are kept in `metadata` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub url: String,
    /// Outgoing link targets in page order. May point outside the corpus.
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Link-importance score, populated by the score writer.
    #[serde(rename = "pr", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Record {
    /// Create a record with no title, content, score, or metadata.
    pub fn new<I, S>(url: impl Into<String>, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            links: links.into_iter().map(Into::into).collect(),
            title: None,
            content: None,
            score: None,
            metadata: Map::new(),
        }
    }

    /// Set the page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// How the per-iteration edge accumulation is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallelism {
    /// Push contributions along out-edges on the calling thread.
    Sequential,
    /// Pull contributions along in-edges across the rayon pool.
    Parallel,
    /// Parallel once the graph reaches [`crate::pagerank::PARALLEL_MIN_NODES`].
    #[default]
    Auto,
}

/// Solver configuration.
///
/// `initial_value` defaults to the constant `0.3` rather than `1/N`; scores
/// are never renormalized, so they do not sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Probability of following a link instead of teleporting, in (0, 1)
    pub damping_factor: f64,
    /// Absolute L1 change below which iteration stops
    pub convergence_threshold: f64,
    /// Iteration cap; signed so a negative value in a spec file reaches
    /// validation instead of failing to parse
    pub max_iterations: i64,
    /// Starting rank of every node
    pub initial_value: f64,
    pub parallelism: Parallelism,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            convergence_threshold: 1e-6,
            max_iterations: 100,
            initial_value: 0.3,
            parallelism: Parallelism::Auto,
        }
    }
}

impl RankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping_factor = damping;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: i64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let cfg = RankConfig::default();
        assert_eq!(cfg.damping_factor, 0.85);
        assert_eq!(cfg.convergence_threshold, 1e-6);
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.initial_value, 0.3);
        assert_eq!(cfg.parallelism, Parallelism::Auto);
    }

    #[test]
    fn test_partial_config_json_fills_defaults() {
        let cfg: RankConfig = serde_json::from_str(r#"{"damping_factor": 0.5}"#).unwrap();
        assert_eq!(cfg.damping_factor, 0.5);
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.initial_value, 0.3);
    }

    #[test]
    fn test_misspelled_config_field_rejected() {
        let parsed = serde_json::from_str::<RankConfig>(r#"{"dampng_factor": 0.5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let json = r#"{
            "url": "https://news.example.edu/1",
            "links": ["https://news.example.edu/2"],
            "title": "Campus news",
            "keywords": "campus,news",
            "seq": 7
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.url, "https://news.example.edu/1");
        assert_eq!(record.title.as_deref(), Some("Campus news"));
        assert_eq!(record.score, None);
        assert_eq!(record.metadata.get("seq"), Some(&Value::from(7)));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["keywords"], "campus,news");
        assert!(back.get("pr").is_none());
    }

    #[test]
    fn test_record_score_serializes_as_pr() {
        let mut record = Record::new("https://news.example.edu/1", Vec::<String>::new());
        record.score = Some(0.5);
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["pr"], 0.5);
    }

    #[test]
    fn test_record_without_links_field() {
        let record: Record = serde_json::from_str(r#"{"url": "u"}"#).unwrap();
        assert!(record.links.is_empty());
    }
}
