// src/lib.rs

//! Mines version-control history into a dataset that pairs refactoring
//! commits with per-file structural and process metrics.

pub mod assembler;
pub mod batch;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod history;
pub mod logging;
pub mod model;
pub mod process;
pub mod structural;
pub mod syntax;

pub use error::{MinerError, Result};
