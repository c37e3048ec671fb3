//! # linkrank
//!
//! Link-importance scoring for a crawled page corpus.
//!
//! Records (one per URL) are turned into a directed link graph, PageRank is
//! solved over it by power iteration, and each record gets its score back
//! for the downstream search index.
//!
//! ```rust
//! use linkrank::{NoopObserver, RankPipeline, Record, RecordStore};
//!
//! let store = RecordStore::new(vec![
//!     Record::new("https://news.example.edu/a", ["https://news.example.edu/b"]),
//!     Record::new("https://news.example.edu/b", Vec::<String>::new()),
//! ]);
//!
//! let outcome = RankPipeline::default().run(&store, &mut NoopObserver).unwrap();
//! let ranked = outcome.store.ranked();
//! assert_eq!(ranked[0].url, "https://news.example.edu/b");
//! ```

pub mod errors;
pub mod graph;
pub mod pagerank;
pub mod pipeline;
pub mod scores;
pub mod store;
pub mod types;

pub use errors::{RankError, Result};
pub use graph::{GraphBuilder, LinkGraph};
pub use pagerank::{PageRankResult, PageRankSolver};
pub use pipeline::observer::{NoopObserver, PipelineObserver, StageTimingObserver};
pub use pipeline::runner::{RankOutcome, RankPipeline};
pub use pipeline::spec::RankSpec;
pub use scores::ScoreWriter;
pub use store::RecordStore;
pub use types::{Parallelism, RankConfig, Record};
