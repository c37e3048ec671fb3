//! The record store: the cleaned dataset in input order.
//!
//! Record order is load-bearing. Graph node indices are assigned by
//! position, so loading the same file twice yields identical rankings.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::errors::{RankError, Result};
use crate::types::Record;

/// Ordered collection of page records, at most one per URL.
///
/// Uniqueness is assumed, not enforced; [`RecordStore::dedup_by_url`] is
/// available for inputs that have not been through cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Read a JSON array of records.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RankError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        let records: Vec<Record> = serde_json::from_reader(BufReader::new(file))?;

        #[cfg(feature = "tracing")]
        tracing::info!(path = %path.display(), records = records.len(), "loaded record store");

        Ok(Self { records })
    }

    /// Write the records as a pretty-printed JSON array.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| RankError::Io {
            source,
            path: path.to_path_buf(),
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.records)?;
        writer.flush().map_err(io_err)?;

        #[cfg(feature = "tracing")]
        tracing::info!(path = %path.display(), records = self.records.len(), "saved record store");

        Ok(())
    }

    /// Drop every record whose URL was already seen, keeping the first.
    ///
    /// Returns the removed duplicates in the order they were encountered.
    pub fn dedup_by_url(&mut self) -> Vec<Record> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut kept = Vec::with_capacity(self.records.len());
        let mut removed = Vec::new();

        for record in self.records.drain(..) {
            if seen.insert(record.url.clone()) {
                kept.push(record);
            } else {
                removed.push(record);
            }
        }
        self.records = kept;

        #[cfg(feature = "tracing")]
        if !removed.is_empty() {
            tracing::warn!(removed = removed.len(), "dropped duplicate urls");
        }

        removed
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Records sorted by descending score; unscored records sort last.
    pub fn ranked(&self) -> Vec<&Record> {
        let mut ranked: Vec<&Record> = self.records.iter().collect();
        ranked.sort_by(|a, b| {
            let a = a.score.unwrap_or(f64::NEG_INFINITY);
            let b = b.score.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });
        ranked
    }
}

impl From<Vec<Record>> for RecordStore {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, links: &[&str]) -> Record {
        Record::new(url, links.iter().copied())
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut store = RecordStore::new(vec![
            page("a", &["b"]),
            page("b", &[]),
            page("a", &["c"]),
        ]);

        let removed = store.dedup_by_url();

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].links, vec!["b".to_string()]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].links, vec!["c".to_string()]);
    }

    #[test]
    fn test_dedup_preserves_order() {
        let mut store = RecordStore::new(vec![page("c", &[]), page("a", &[]), page("c", &[])]);
        store.dedup_by_url();
        let urls: Vec<_> = store.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["c", "a"]);
    }

    #[test]
    fn test_ranked_orders_by_score() {
        let mut a = page("a", &[]);
        a.score = Some(0.1);
        let mut b = page("b", &[]);
        b.score = Some(0.9);
        let c = page("c", &[]);
        let store = RecordStore::new(vec![a, b, c]);

        let urls: Vec<_> = store.ranked().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = RecordStore::load_json("/nonexistent/linkrank/input.json").unwrap_err();
        assert!(matches!(err, RankError::Io { .. }));
    }
}
