//! Artifact materialization: random payloads written under the input directory.

use chrono::Utc;
use rand::Rng;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Category tags for generated files.
pub const EXTENSIONS: [&str; 5] = [".payf", ".deb", ".transfer", ".credit", ".cash"];

/// Default maximum payload size in bytes.
pub const DEFAULT_MAX_SIZE: u64 = 5 * 1024;

/// Default probability of a simulated write failure per attempt.
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.01;

/// A file produced by [`ArtifactWriter::create`].
#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: String,
    pub path: PathBuf,
}

/// Writes randomly-filled placeholder files into the input directory.
pub struct ArtifactWriter {
    input_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    /// Materializes one artifact of `size_bytes` random bytes.
    ///
    /// The filename stem combines a millisecond timestamp, the process id and
    /// 20 random bits, so names stay unique per call even when several
    /// generator processes write into the same directory.
    pub fn create<R: Rng>(
        &self,
        rng: &mut R,
        extension: &str,
        size_bytes: u64,
    ) -> io::Result<Artifact> {
        let filename = format!("{}{extension}", unique_stem(rng));
        let path = self.input_dir.join(&filename);

        let mut payload = vec![0u8; size_bytes as usize];
        rng.fill(&mut payload[..]);
        fs::write(&path, &payload)?;

        Ok(Artifact { filename, path })
    }
}

fn unique_stem<R: Rng>(rng: &mut R) -> String {
    let millis = Utc::now().timestamp_millis();
    let pid = std::process::id();
    let salt: u32 = rng.random_range(0..1 << 20);
    format!("{millis}-{pid}-{salt}")
}

/// Creates the `input/` and `logs/` directories under the base path and
/// returns them in that order.
pub fn ensure_layout(base: &Path) -> io::Result<(PathBuf, PathBuf)> {
    let input_dir = base.join("input");
    let logs_dir = base.join("logs");
    fs::create_dir_all(&input_dir)?;
    fs::create_dir_all(&logs_dir)?;
    Ok((input_dir, logs_dir))
}
