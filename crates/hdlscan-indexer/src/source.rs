//! Per-file source model with modification-time-driven revalidation

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Result;
use hdlscan_core::{Dependency, DesignUnit, DesignUnitKind, WORK_LIBRARY};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::deps::extract_dependencies;
use crate::loader::{ReadPermits, ScanError, load_source_lines};
use crate::scanner::scan_lines;

/// Collections derived by the last successful scan, plus its watermark.
///
/// Replaced as a whole under the state lock; readers never see a scan in
/// progress.
#[derive(Debug, Default)]
struct ScanState {
    /// Modification time observed by the last successful scan. `None`
    /// until one succeeds, which keeps the instance stale and retryable.
    scanned_at: Option<SystemTime>,
    units: Vec<DesignUnit>,
    deps: Vec<Dependency>,
}

/// A VHDL source file and the design units / dependencies it was last
/// scanned to provide and consume.
///
/// Every accessor re-validates against the file's current modification
/// time before returning, so results are never staler than the start of
/// that call. Scans are serialized per instance by the state lock.
pub struct SourceFile {
    /// Path as given at construction; used for display.
    path: PathBuf,
    /// Absolute form; identity for scanning and staleness checks.
    abs_path: PathBuf,
    library: String,
    /// Opaque compiler flags carried alongside the file, not interpreted
    /// by the scanner.
    flags: Vec<String>,
    permits: Arc<ReadPermits>,
    state: Mutex<ScanState>,
}

impl SourceFile {
    /// Create a lazily scanned source file owned by `library`.
    pub fn new(path: impl AsRef<Path>, library: impl Into<String>) -> Self {
        Self::with_permits(path, library, ReadPermits::shared())
    }

    /// [`SourceFile::new`] with the default `work` library.
    pub fn in_work_library(path: impl AsRef<Path>) -> Self {
        Self::new(path, WORK_LIBRARY)
    }

    /// Create a source file drawing read permits from a caller-supplied
    /// pool instead of the process-wide one.
    pub fn with_permits(
        path: impl AsRef<Path>,
        library: impl Into<String>,
        permits: Arc<ReadPermits>,
    ) -> Self {
        let path = path.as_ref().to_path_buf();
        let abs_path = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
        SourceFile {
            path,
            abs_path,
            library: library.into(),
            flags: Vec::new(),
            permits,
            state: Mutex::new(ScanState::default()),
        }
    }

    /// Create a source file and warm its cache in the background.
    ///
    /// Purely a first-access latency optimization: accessors re-validate
    /// either way, so correctness does not depend on the spawned task.
    /// Requires an ambient tokio runtime.
    pub fn prefetched(path: impl AsRef<Path>, library: impl Into<String>) -> Arc<Self> {
        let file = Arc::new(Self::new(path, library));
        file.spawn_prefetch();
        file
    }

    /// Spawn one fire-and-forget scan attempt. Failures are logged at
    /// `warn` and never surfaced.
    pub fn spawn_prefetch(self: &Arc<Self>) {
        let file = Arc::clone(self);
        tokio::spawn(async move {
            let mut state = file.state.lock().await;
            if let Err(e) = file.refresh_if_stale(&mut state).await {
                warn!("background scan of {} failed: {}", file, e);
            }
        });
    }

    /// Path as given at construction.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path used for scanning.
    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }

    /// Owning library name.
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Opaque flags carried with the file.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn set_flags(&mut self, flags: Vec<String>) {
        self.flags = flags;
    }

    /// Design units this file provides, rescanning first if the file
    /// changed. Package bodies are folded into dependencies and never
    /// listed here.
    pub async fn design_units(&self) -> Result<Vec<DesignUnit>> {
        let mut state = self.state.lock().await;
        self.refresh_if_stale(&mut state).await?;
        Ok(state.units.clone())
    }

    /// Provided units in `library.name` form.
    pub async fn qualified_units(&self) -> Result<HashSet<String>> {
        Ok(self
            .design_units()
            .await?
            .into_iter()
            .map(|unit| format!("{}.{}", self.library, unit.name))
            .collect())
    }

    /// The `library.unit` references this file consumes, rescanning first
    /// if the file changed. Deduplicated, first occurrence first.
    pub async fn dependencies(&self) -> Result<Vec<Dependency>> {
        let mut state = self.state.lock().await;
        self.refresh_if_stale(&mut state).await?;
        Ok(state.deps.clone())
    }

    /// Whether the file on disk is newer than the last successful scan.
    /// `false` when the modification time cannot be read.
    pub async fn is_changed(&self) -> bool {
        let scanned_at = self.state.lock().await.scanned_at;
        match self.modified_time().await {
            Some(mtime) => scanned_at.is_none_or(|seen| mtime > seen),
            None => false,
        }
    }

    /// Raw filesystem modification time, if the file can be stat'ed.
    pub async fn modified_time(&self) -> Option<SystemTime> {
        let meta = tokio::fs::metadata(&self.abs_path).await.ok()?;
        meta.modified().ok()
    }

    /// The single scan-if-stale path. Callers already hold the state
    /// lock; this routine never takes it, so the background task and
    /// accessors share one transition rule without re-entrancy.
    async fn refresh_if_stale(&self, state: &mut ScanState) -> Result<(), ScanError> {
        let mtime = match tokio::fs::metadata(&self.abs_path)
            .await
            .and_then(|meta| meta.modified())
        {
            Ok(mtime) => mtime,
            Err(e) => {
                // Stat failure: keep whatever we have, retry on next access.
                warn!("could not check {} for changes: {}", self, e);
                return Ok(());
            }
        };
        if state.scanned_at.is_some_and(|seen| mtime <= seen) {
            return Ok(());
        }

        debug!("scanning {}", self);
        let lines = load_source_lines(&self.abs_path, &self.permits).await?;
        let scan = scan_lines(&lines);
        let mut deps = extract_dependencies(&lines, &scan.libraries, &self.library);

        // A package body is implicit coupling to its own declaration, not
        // a provided unit.
        let mut units = Vec::new();
        for unit in scan.candidates {
            if unit.kind == DesignUnitKind::PackageBody {
                let dep = Dependency::new(self.library.clone(), unit.name);
                if !deps.contains(&dep) {
                    deps.push(dep);
                }
            } else {
                units.push(unit);
            }
        }

        info!(
            "{} depends on: {}",
            self,
            deps.iter()
                .map(Dependency::qualified)
                .collect::<Vec<_>>()
                .join(", ")
        );
        state.units = units;
        state.deps = deps;
        // Watermark moves only after a successful scan; a failed attempt
        // leaves the instance stale and eligible for retry.
        state.scanned_at = Some(mtime);
        Ok(())
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.library, self.path.display())
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.abs_path)
            .field("library", &self.library)
            .finish()
    }
}
