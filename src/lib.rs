//! Synthetic file load generator.
//!
//! Produces randomly-sized placeholder files at a configurable pace into a
//! designated input directory, recording one metric row per created file and
//! one error row per failed attempt. The files feed a downstream ingestion
//! pipeline under test; this crate only paces and produces, it never reads
//! them back.
//!
//! # Example
//!
//! ```ignore
//! use ingest_loadgen::{Generator, GeneratorConfig, MetricsLog, ErrorLog};
//!
//! let metrics = MetricsLog::open("logs/metrics.log")?;
//! let errors = ErrorLog::open("logs/errors.log")?;
//! let config = GeneratorConfig {
//!     input_dir: "input".into(),
//!     max_size: 5 * 1024,
//!     failure_probability: 0.01,
//!     seed: None,
//! };
//! let mut generator = Generator::new(config, metrics, errors, stop_flag);
//!
//! // 100 files spread evenly across half an hour, one cycle.
//! let summary = generator.run(1800, 100, false)?;
//! println!("{} files in {:?}", summary.files_created, summary.total_duration);
//! ```

pub mod artifact;
pub mod duration;
pub mod error;
pub mod scheduler;
pub mod shutdown;
pub mod sink;

pub use artifact::{
    ensure_layout, Artifact, ArtifactWriter, DEFAULT_FAILURE_PROBABILITY, DEFAULT_MAX_SIZE,
    EXTENSIONS,
};
pub use duration::parse_duration;
pub use error::{CreateError, GeneratorError};
pub use scheduler::{Generator, GeneratorConfig, RunMetrics};
pub use shutdown::install_signal_handler;
pub use sink::{
    ErrorLog, ErrorSink, FailureEvent, FileEvent, MetricsLog, MetricsSink, METRICS_HEADER,
};
