//! Source content loading behind a bounded file-handle pool

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::sync::Semaphore;

/// Default cap on simultaneously open source files across all scans.
pub const DEFAULT_MAX_OPEN_FILES: usize = 100;

/// Everything from the inline comment marker to the end of the line.
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*--.*").expect("comment pattern is valid"));

static SHARED_PERMITS: LazyLock<Arc<ReadPermits>> =
    LazyLock::new(|| Arc::new(ReadPermits::new(DEFAULT_MAX_OPEN_FILES)));

/// A scan attempt failed partway through.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The file disappeared or became unreadable between the staleness
    /// check and the content read, or is not valid UTF-8.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Bounded pool of file-handle permits shared by concurrent scans.
///
/// Injectable so callers (and tests) can size it themselves; `shared()` is
/// the process-wide pool every plainly constructed `SourceFile` draws from.
#[derive(Debug)]
pub struct ReadPermits {
    permits: Semaphore,
}

impl ReadPermits {
    pub fn new(capacity: usize) -> Self {
        ReadPermits {
            permits: Semaphore::new(capacity),
        }
    }

    /// The process-wide default pool, capacity [`DEFAULT_MAX_OPEN_FILES`].
    pub fn shared() -> Arc<ReadPermits> {
        SHARED_PERMITS.clone()
    }

    /// Permits currently available (diagnostic).
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Read a source file as normalized lines: inline `--` comments stripped,
/// everything lowercased.
///
/// One pool permit is held strictly around the read itself, so arbitrarily
/// many concurrent scans cannot exhaust file descriptors.
pub async fn load_source_lines(
    path: &Path,
    permits: &ReadPermits,
) -> Result<Vec<String>, ScanError> {
    let text = {
        let _permit = permits
            .permits
            .acquire()
            .await
            .expect("permit pool is never closed");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?
    };

    Ok(text
        .split('\n')
        .map(|line| COMMENT.replace(line, "").to_lowercase())
        .collect())
}
