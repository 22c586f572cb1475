//! Library side of the `rowtrace` binary: config loading, runs, and reports.

pub mod commands;
pub mod config;
pub mod logging;
pub mod report;
pub mod summary;
