//! Pacing scheduler: distributes file-creation events evenly across a cycle.

use crate::artifact::{Artifact, ArtifactWriter, EXTENSIONS};
use crate::error::{CreateError, GeneratorError};
use crate::sink::{ErrorSink, FailureEvent, FileEvent, MetricsSink};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Poll granularity for the idle wait between repeated cycles, so a stop
/// request does not have to wait out the remainder of a long cycle.
const IDLE_POLL: Duration = Duration::from_millis(200);

/// Knobs for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory the artifacts are written into.
    pub input_dir: PathBuf,
    /// Upper bound for payload sizes, inclusive.
    pub max_size: u64,
    /// Probability in [0, 1] that an attempt fails without touching disk.
    pub failure_probability: f64,
    /// Seed for deterministic payloads and failure injection.
    pub seed: Option<u64>,
}

/// Summary of a completed (or interrupted) run.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Number of files successfully created.
    pub files_created: u64,
    /// Number of failed creation attempts.
    pub failures: u64,
    /// Total payload bytes written.
    pub bytes_written: u64,
    /// Number of cycles that ran to completion.
    pub cycles_completed: u64,
    /// True when the run ended because the stop flag was observed.
    pub stopped: bool,
    /// Total wall-clock duration of the run.
    pub total_duration: Duration,
}

impl RunMetrics {
    /// Files successfully created per wall-clock second.
    pub fn files_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.files_created as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Drives the pacing loop.
///
/// Sinks are injected so tests can capture records in memory; the stop flag
/// has a single writer (the signal handler) and is only read here.
pub struct Generator<M, E> {
    writer: ArtifactWriter,
    max_size: u64,
    failure_probability: f64,
    metrics: M,
    errors: E,
    stop: Arc<AtomicBool>,
    rng: StdRng,
}

impl<M: MetricsSink, E: ErrorSink> Generator<M, E> {
    pub fn new(config: GeneratorConfig, metrics: M, errors: E, stop: Arc<AtomicBool>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            writer: ArtifactWriter::new(config.input_dir),
            max_size: config.max_size,
            failure_probability: config.failure_probability,
            metrics,
            errors,
            stop,
            rng,
        }
    }

    /// Runs cycles of `count` creation events spread evenly over
    /// `total_seconds`, until one cycle completes (`repeat` false) or the
    /// stop flag is observed (`repeat` true).
    ///
    /// Event `i` (0-indexed) is paced to complete no earlier than
    /// `cycle_start + (i + 1) * interval`, measured from cycle start, so a
    /// slow iteration shrinks the following sleep instead of compounding
    /// delay. Individual failures are recorded to the error sink and never
    /// abort the run; there is no failure-count circuit breaker.
    pub fn run(
        &mut self,
        total_seconds: u64,
        count: u64,
        repeat: bool,
    ) -> Result<RunMetrics, GeneratorError> {
        if count == 0 {
            return Err(GeneratorError::InvalidCount);
        }

        // Saturated durations can exceed the Duration range; clamp rather
        // than panic.
        let interval = Duration::try_from_secs_f64(total_seconds as f64 / count as f64)
            .unwrap_or(Duration::MAX);
        let cycle_len = Duration::from_secs(total_seconds);
        let run_start = Instant::now();
        let mut summary = RunMetrics::default();

        info!(
            total_seconds,
            count,
            repeat,
            interval_secs = interval.as_secs_f64(),
            "Starting generator run"
        );

        'run: loop {
            let cycle_start = Instant::now();

            for index in 0..count {
                if self.stop_requested() {
                    summary.stopped = true;
                    break 'run;
                }

                self.attempt(index, cycle_start, &mut summary);

                // A clamped interval can also push the target past what an
                // Instant can represent; skip the pacing sleep in that case.
                let offset = Duration::try_from_secs_f64(
                    interval.as_secs_f64() * (index + 1) as f64,
                )
                .unwrap_or(Duration::MAX);
                if let Some(target) = cycle_start.checked_add(offset) {
                    let remaining = target.saturating_duration_since(Instant::now());
                    if !remaining.is_zero() {
                        thread::sleep(remaining);
                    }
                }

                if self.stop_requested() {
                    summary.stopped = true;
                    break 'run;
                }
            }

            summary.cycles_completed += 1;
            if !repeat {
                break;
            }

            // Idle out the remainder so cycle starts stay aligned to the
            // requested cadence, polling the stop flag between slices.
            loop {
                if self.stop_requested() {
                    summary.stopped = true;
                    break 'run;
                }
                let remaining = cycle_len.saturating_sub(cycle_start.elapsed());
                if remaining.is_zero() {
                    break;
                }
                thread::sleep(remaining.min(IDLE_POLL));
            }
        }

        summary.total_duration = run_start.elapsed();
        info!(
            files_created = summary.files_created,
            failures = summary.failures,
            cycles_completed = summary.cycles_completed,
            stopped = summary.stopped,
            "Generator run finished ({:.2} files/sec)",
            summary.files_per_second()
        );
        Ok(summary)
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// One creation attempt; failures are recorded and absorbed.
    fn attempt(&mut self, index: u64, cycle_start: Instant, summary: &mut RunMetrics) {
        match self.create_one() {
            Ok((artifact, extension, size_bytes)) => {
                summary.files_created += 1;
                summary.bytes_written += size_bytes;
                debug!(filename = %artifact.filename, size_bytes, "Created file");

                let event = FileEvent {
                    timestamp: Utc::now(),
                    filename: artifact.filename,
                    extension: extension.to_string(),
                    size_bytes,
                    elapsed: cycle_start.elapsed(),
                };
                if let Err(e) = self.metrics.record(&event) {
                    warn!("Failed to record metrics row: {e}");
                }
            }
            Err(err) => {
                summary.failures += 1;
                warn!(index, "File creation failed: {err}");

                let failure = FailureEvent {
                    timestamp: Utc::now(),
                    index,
                    reason: err.to_string(),
                };
                if let Err(e) = self.errors.record(&failure) {
                    warn!("Failed to record error row: {e}");
                }
            }
        }
    }

    fn create_one(&mut self) -> Result<(Artifact, &'static str, u64), CreateError> {
        if self.rng.random::<f64>() < self.failure_probability {
            return Err(CreateError::Simulated);
        }

        let size_bytes = if self.max_size > 1 {
            self.rng.random_range(1..=self.max_size)
        } else {
            1
        };
        let extension = EXTENSIONS[self.rng.random_range(0..EXTENSIONS.len())];
        let artifact = self.writer.create(&mut self.rng, extension, size_bytes)?;
        Ok((artifact, extension, size_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct MemoryMetrics(Arc<Mutex<Vec<FileEvent>>>);

    impl MetricsSink for MemoryMetrics {
        fn record(&mut self, event: &FileEvent) -> io::Result<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryErrors(Arc<Mutex<Vec<FailureEvent>>>);

    impl ErrorSink for MemoryErrors {
        fn record(&mut self, failure: &FailureEvent) -> io::Result<()> {
            self.0.lock().unwrap().push(failure.clone());
            Ok(())
        }
    }

    fn config(dir: &TempDir, failure_probability: f64) -> GeneratorConfig {
        GeneratorConfig {
            input_dir: dir.path().to_path_buf(),
            max_size: 64,
            failure_probability,
            seed: Some(42),
        }
    }

    fn unstopped() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_zero_count_is_rejected_before_any_activity() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let errors = MemoryErrors::default();
        let mut generator =
            Generator::new(config(&tmp, 0.0), metrics.clone(), errors.clone(), unstopped());

        let result = generator.run(10, 0, false);

        assert!(matches!(result, Err(GeneratorError::InvalidCount)));
        assert!(metrics.0.lock().unwrap().is_empty());
        assert!(errors.0.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_single_cycle_emits_one_record_per_event() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let errors = MemoryErrors::default();
        let mut generator =
            Generator::new(config(&tmp, 0.0), metrics.clone(), errors.clone(), unstopped());

        let summary = generator.run(0, 25, false).unwrap();

        assert_eq!(summary.files_created, 25);
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.cycles_completed, 1);
        assert!(!summary.stopped);
        assert_eq!(metrics.0.lock().unwrap().len(), 25);
        assert!(errors.0.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 25);
    }

    #[test]
    fn test_cycle_duration_approximates_total_seconds() {
        let tmp = TempDir::new().unwrap();
        let mut generator = Generator::new(
            config(&tmp, 0.0),
            MemoryMetrics::default(),
            MemoryErrors::default(),
            unstopped(),
        );

        let start = Instant::now();
        let summary = generator.run(1, 4, false).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(summary.files_created, 4);
        assert!(
            elapsed >= Duration::from_millis(900),
            "cycle finished early: {elapsed:?}"
        );
        assert!(elapsed < Duration::from_secs(3), "cycle overran: {elapsed:?}");
    }

    #[test]
    fn test_sustained_failures_are_absorbed() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let errors = MemoryErrors::default();
        let mut generator =
            Generator::new(config(&tmp, 1.0), metrics.clone(), errors.clone(), unstopped());

        let summary = generator.run(0, 10, false).unwrap();

        assert_eq!(summary.files_created, 0);
        assert_eq!(summary.failures, 10);
        assert!(metrics.0.lock().unwrap().is_empty());
        let recorded = errors.0.lock().unwrap();
        assert_eq!(recorded.len(), 10);
        assert!(recorded
            .iter()
            .enumerate()
            .all(|(i, f)| f.index == i as u64));
        assert!(recorded
            .iter()
            .all(|f| f.reason == "simulated disk write failure"));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_preset_stop_flag_prevents_all_creation() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let errors = MemoryErrors::default();
        let stop = Arc::new(AtomicBool::new(true));
        let mut generator =
            Generator::new(config(&tmp, 0.0), metrics.clone(), errors.clone(), stop);

        let summary = generator.run(60, 100, false).unwrap();

        assert!(summary.stopped);
        assert_eq!(summary.files_created, 0);
        assert_eq!(summary.cycles_completed, 0);
        assert!(metrics.0.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_stop_mid_cycle_bounds_emitted_records() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let errors = MemoryErrors::default();
        let stop = unstopped();
        let mut generator = Generator::new(
            config(&tmp, 0.0),
            metrics.clone(),
            errors.clone(),
            stop.clone(),
        );

        let setter = {
            let stop = stop.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(300));
                stop.store(true, Ordering::SeqCst);
            })
        };

        // 100 events over 20 seconds is a 200ms cadence, so the stop lands
        // around the second event and is observed at the next checkpoint.
        let start = Instant::now();
        let summary = generator.run(20, 100, false).unwrap();
        setter.join().unwrap();

        assert!(summary.stopped);
        assert!(summary.files_created <= 3);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(
            metrics.0.lock().unwrap().len() as u64,
            summary.files_created
        );
        assert!(errors.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_saturated_duration_runs_without_panicking() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let mut generator = Generator::new(
            config(&tmp, 0.0),
            metrics.clone(),
            MemoryErrors::default(),
            unstopped(),
        );

        // A huge expression parses to a saturated second count; the run must
        // clamp the cadence instead of aborting.
        let total = crate::duration::parse_duration(&format!("{}h", "9".repeat(40))).unwrap();
        assert_eq!(total, u64::MAX);

        let summary = generator.run(total, 1, false).unwrap();

        assert_eq!(summary.files_created, 1);
        assert_eq!(summary.cycles_completed, 1);
        assert_eq!(metrics.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_repeat_cycles_until_stopped() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let stop = unstopped();
        let mut generator = Generator::new(
            config(&tmp, 0.0),
            metrics.clone(),
            MemoryErrors::default(),
            stop.clone(),
        );

        let setter = {
            let stop = stop.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(2500));
                stop.store(true, Ordering::SeqCst);
            })
        };

        // One event per 1-second cycle; by 2.5s at least two full cycles
        // have completed and the run is inside a third.
        let summary = generator.run(1, 1, true).unwrap();
        setter.join().unwrap();

        assert!(summary.stopped);
        assert!(summary.cycles_completed >= 2);

        // Each cycle's single event fires at cycle start, so consecutive
        // event timestamps track the cycle cadence.
        let events = metrics.0.lock().unwrap();
        assert!(events.len() >= 2);
        for pair in events.windows(2) {
            let gap = (pair[1].timestamp - pair[0].timestamp).to_std().unwrap();
            assert!(
                gap >= Duration::from_millis(900) && gap <= Duration::from_millis(1500),
                "cycle starts drifted apart: {gap:?}"
            );
        }
    }

    #[test]
    fn test_artifact_sizes_and_extensions_within_bounds() {
        let tmp = TempDir::new().unwrap();
        let metrics = MemoryMetrics::default();
        let mut generator = Generator::new(
            config(&tmp, 0.0),
            metrics.clone(),
            MemoryErrors::default(),
            unstopped(),
        );

        generator.run(0, 50, false).unwrap();

        let events = metrics.0.lock().unwrap();
        assert_eq!(events.len(), 50);
        for event in events.iter() {
            assert!((1..=64).contains(&event.size_bytes));
            assert!(EXTENSIONS.contains(&event.extension.as_str()));
            let on_disk = std::fs::metadata(tmp.path().join(&event.filename))
                .unwrap()
                .len();
            assert_eq!(on_disk, event.size_bytes);
        }
    }
}
