//! Copy, sync and clean execution against a destination directory.
//!
//! Sync mode uses file size as the only freshness check, so a run that was
//! interrupted mid-copy converges on the next invocation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::LibError;
use crate::scan::{self, AssetIndex};

/// How existing destination files are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Copy every file, overwriting the destination.
    Copy,
    /// Copy only when the destination is absent or its size differs.
    Sync,
}

/// A single planned file copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl CopyJob {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

/// What a job will do to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Copy,
    Update,
    Skip,
}

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum SyncProgress {
    /// Processing one job
    File {
        name: String,
        index: usize,
        total: usize,
    },
    /// Removing a destination entry during cleanup
    Removing { name: String },
}

/// Counters for one asset kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub copied: usize,
    pub updated: usize,
    pub skipped: usize,
    pub removed: usize,
    pub errors: Vec<String>,
}

impl SyncSummary {
    pub fn merge(&mut self, other: SyncSummary) {
        self.copied += other.copied;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.removed += other.removed;
        self.errors.extend(other.errors);
    }

    /// True when nothing was written or removed.
    pub fn is_noop(&self) -> bool {
        self.copied == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Decide the action for a job without touching the destination.
pub fn action_for(job: &CopyJob, mode: SyncMode) -> io::Result<SyncAction> {
    let dest = match fs::metadata(&job.dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SyncAction::Copy),
        Err(e) => return Err(e),
    };
    match mode {
        SyncMode::Copy => Ok(SyncAction::Copy),
        SyncMode::Sync => {
            let source = fs::metadata(&job.source)?;
            if source.len() == dest.len() {
                Ok(SyncAction::Skip)
            } else {
                Ok(SyncAction::Update)
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run every job. Per-file failures are collected, never fatal.
pub fn execute(
    jobs: &[CopyJob],
    mode: SyncMode,
    dry_run: bool,
    progress: &dyn Fn(SyncProgress),
) -> SyncSummary {
    let mut summary = SyncSummary::default();
    let total = jobs.len();

    for (index, job) in jobs.iter().enumerate() {
        progress(SyncProgress::File {
            name: display_name(&job.dest),
            index,
            total,
        });

        let action = match action_for(job, mode) {
            Ok(action) => action,
            Err(e) => {
                summary
                    .errors
                    .push(format!("Failed to inspect {}: {}", job.dest.display(), e));
                continue;
            }
        };

        let verb = match action {
            SyncAction::Skip => {
                log::debug!("Unchanged: {}", job.dest.display());
                summary.skipped += 1;
                continue;
            }
            SyncAction::Copy => "copy",
            SyncAction::Update => "update",
        };

        if dry_run {
            log::info!(
                "Would {verb} {} -> {}",
                job.source.display(),
                job.dest.display()
            );
        } else if let Err(e) = copy_file(job) {
            summary.errors.push(format!(
                "Failed to copy {} -> {}: {}",
                job.source.display(),
                job.dest.display(),
                e
            ));
            continue;
        } else {
            log::debug!("{verb}: {} -> {}", job.source.display(), job.dest.display());
        }

        match action {
            SyncAction::Update => summary.updated += 1,
            _ => summary.copied += 1,
        }
    }

    summary
}

fn copy_file(job: &CopyJob) -> io::Result<()> {
    if let Some(parent) = job.dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&job.source, &job.dest)?;
    Ok(())
}

/// Remove a file (or announce it in dry-run mode).
pub(crate) fn remove_entry(
    path: &Path,
    dry_run: bool,
    summary: &mut SyncSummary,
    progress: &dyn Fn(SyncProgress),
) {
    progress(SyncProgress::Removing {
        name: display_name(path),
    });
    if dry_run {
        log::info!("Would remove {}", path.display());
        summary.removed += 1;
        return;
    }
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {
            log::debug!("Removed {}", path.display());
            summary.removed += 1;
        }
        Err(e) => summary
            .errors
            .push(format!("Failed to remove {}: {}", path.display(), e)),
    }
}

/// Delete every file in `dir` with a matching extension whose identifier is
/// not in `keep`. A missing directory has nothing to clean.
pub fn clean(
    dir: &Path,
    extensions: &HashSet<String>,
    keep: &BTreeSet<&str>,
    dry_run: bool,
    progress: &dyn Fn(SyncProgress),
) -> Result<SyncSummary, LibError> {
    let mut summary = SyncSummary::default();
    let files = match scan::collect_matching_files(dir, extensions) {
        Ok(files) => files,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(summary),
        Err(e) => return Err(LibError::source_dir(dir, e)),
    };

    for path in files {
        let Some(id) = scan::file_stem(&path) else {
            continue;
        };
        if !keep.contains(id) {
            remove_entry(&path, dry_run, &mut summary, progress);
        }
    }
    Ok(summary)
}

/// Clean an auxiliary media root: drop machine directories not in `keep`,
/// and media files a kept machine no longer lists.
pub fn clean_aux(
    dir: &Path,
    keep: &BTreeMap<String, Vec<String>>,
    dry_run: bool,
    progress: &dyn Fn(SyncProgress),
) -> Result<SyncSummary, LibError> {
    let mut summary = SyncSummary::default();
    let machines = AssetIndex::scan_subdirs(dir)?;
    let extensions = scan::extension_set(scan::AUX_EXTENSIONS);

    for (machine, path) in machines.iter() {
        let Some(media) = keep.get(machine) else {
            remove_entry(path, dry_run, &mut summary, progress);
            continue;
        };
        let wanted: BTreeSet<&str> = media.iter().map(String::as_str).collect();
        let files = scan::collect_matching_files(path, &extensions)
            .map_err(|e| LibError::source_dir(path, e))?;
        for file in files {
            if scan::file_stem(&file).is_some_and(|stem| !wanted.contains(stem)) {
                remove_entry(&file, dry_run, &mut summary, progress);
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
