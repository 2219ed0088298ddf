//! Spinner shared by the long-running verbs.

use indicatif::{ProgressBar, ProgressStyle};

use retro_curate_dat::CacheProgress;
use retro_curate_lib::SyncProgress;

/// A single-line spinner, hidden in quiet mode.
pub(crate) fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("/-\\|"));
    }
    pb
}

pub(crate) fn cache_message(progress: &CacheProgress) -> String {
    match progress {
        CacheProgress::Parsing { machines } => {
            format!("Reading machine database ({machines} machines)")
        }
        CacheProgress::Writing { path } => format!("Writing {}", path.display()),
    }
}

pub(crate) fn sync_message(progress: &SyncProgress) -> String {
    match progress {
        SyncProgress::File { name, index, total } => {
            format!("[{}/{}] {}", index + 1, total, name)
        }
        SyncProgress::Removing { name } => format!("Removing {name}"),
    }
}
