//! Error types for the load generator.

use thiserror::Error;

/// Errors that reject a run before any cycle begins.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Duration expression contains no recognized unit.
    #[error("Invalid duration format: '{0}' (use '10min', '1hr 30m', etc.)")]
    InvalidFormat(String),

    /// Requested file count is zero.
    #[error("File count must be greater than zero")]
    InvalidCount,

    /// IO error while preparing directories or log sinks.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single failed creation attempt.
///
/// Returned by the per-event creation step and absorbed by the scheduler;
/// never fatal to the run.
#[derive(Error, Debug)]
pub enum CreateError {
    /// Injected probabilistic failure; no filesystem activity was performed.
    #[error("simulated disk write failure")]
    Simulated,

    /// Real IO failure from the artifact writer.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
