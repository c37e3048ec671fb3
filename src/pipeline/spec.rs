//! Run specification types.
//!
//! A [`RankSpec`] is the JSON document a ranking run is configured from. It
//! is the input to the [`super::validation::ValidationEngine`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "rank": {
//!     "damping_factor": 0.85,
//!     "convergence_threshold": 1e-6,
//!     "max_iterations": 100,
//!     "initial_value": 0.3,
//!     "parallelism": "auto"
//!   },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{RankError, Result};
use crate::types::RankConfig;

/// Top-level run specification (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSpec {
    /// Spec version (currently `1`).
    #[serde(default = "default_version")]
    pub v: u32,

    /// Solver settings. Omitted fields take their defaults.
    #[serde(default)]
    pub rank: RankConfig,

    /// If `true`, unrecognized top-level fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

fn default_version() -> u32 {
    1
}

impl RankSpec {
    /// Read a spec from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RankError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for RankSpec {
    fn default() -> Self {
        RankConfig::default().into()
    }
}

impl From<RankConfig> for RankSpec {
    fn from(rank: RankConfig) -> Self {
        Self {
            v: default_version(),
            rank,
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Parallelism;

    #[test]
    fn test_minimal_spec() {
        let spec: RankSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.v, 1);
        assert_eq!(spec.rank, RankConfig::default());
        assert!(!spec.strict);
        assert!(spec.unknown_fields.is_empty());
    }

    #[test]
    fn test_full_spec() {
        let json = r#"{
            "v": 1,
            "rank": {
                "damping_factor": 0.9,
                "convergence_threshold": 1e-8,
                "max_iterations": 250,
                "initial_value": 0.3,
                "parallelism": "sequential"
            },
            "strict": true
        }"#;
        let spec: RankSpec = serde_json::from_str(json).unwrap();

        assert_eq!(spec.rank.damping_factor, 0.9);
        assert_eq!(spec.rank.max_iterations, 250);
        assert_eq!(spec.rank.parallelism, Parallelism::Sequential);
        assert!(spec.strict);
    }

    #[test]
    fn test_unknown_fields_captured() {
        let spec: RankSpec = serde_json::from_str(r#"{"ranking": {}, "output": "x"}"#).unwrap();
        assert_eq!(spec.unknown_fields.len(), 2);
        assert!(spec.unknown_fields.contains_key("ranking"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        std::fs::write(&path, r#"{"rank": {"max_iterations": 20}}"#).unwrap();

        let spec = RankSpec::load(&path).unwrap();
        assert_eq!(spec.rank.max_iterations, 20);
    }
}
