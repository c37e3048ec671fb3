//! Graph construction and representation
//!
//! This module turns a record store into an index-addressed directed link
//! graph stored in CSR form.

pub mod builder;
pub mod csr;

pub use builder::GraphBuilder;
pub use csr::LinkGraph;
