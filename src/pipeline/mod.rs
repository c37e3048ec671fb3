//! Ranking pipeline: run specification, validation, stage observers, and
//! the runner that chains graph building, solving, and score write-back.

pub mod observer;
pub mod runner;
pub mod spec;
pub mod validation;
