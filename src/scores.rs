//! Score write-back: attach computed ranks to records by URL.

use crate::errors::{RankError, Result};
use crate::graph::csr::LinkGraph;
use crate::store::RecordStore;
use crate::types::Record;

/// Merges a rank vector back into the record store it was computed from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreWriter;

impl ScoreWriter {
    /// Produce a copy of `store` with every record's `score` set to its rank.
    ///
    /// All records are resolved before anything is written, so an error
    /// leaves no partially scored output behind. Only `score` changes.
    pub fn write(&self, store: &RecordStore, ranks: &[f64], graph: &LinkGraph) -> Result<RecordStore> {
        if ranks.len() != graph.num_nodes {
            return Err(RankError::RankLengthMismatch {
                expected: graph.num_nodes,
                actual: ranks.len(),
            });
        }

        let indices = store
            .iter()
            .map(|record| {
                graph
                    .index_of(&record.url)
                    .ok_or_else(|| RankError::MissingIndex {
                        url: record.url.clone(),
                    })
            })
            .collect::<Result<Vec<u32>>>()?;

        let records = store
            .iter()
            .zip(indices)
            .map(|(record, index)| Record {
                score: Some(ranks[index as usize]),
                ..record.clone()
            })
            .collect();

        Ok(RecordStore::new(records))
    }
}
