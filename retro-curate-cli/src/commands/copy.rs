use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_curate_lib::{Session, SyncMode, SyncOptions, SyncProgress};

use crate::error::CliError;
use crate::progress;

/// Which assets an executing verb writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Roms,
    Artwork,
    Aux,
}

/// Select, then copy or sync one kind of asset into the destination and
/// print the run report.
pub(crate) fn run_sync(
    session: &mut Session,
    target: Target,
    mode: SyncMode,
    opts: &SyncOptions,
    quiet: bool,
) -> Result<(), CliError> {
    let plan = session.select()?;

    if opts.dry_run {
        log::info!(
            "{}",
            "Dry run: no files will be changed".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let pb = progress::spinner(quiet);
    let progress_callback = |p: SyncProgress| {
        pb.set_message(progress::sync_message(&p));
        pb.tick();
    };
    let result = match target {
        Target::Roms => session.sync_roms(&plan, mode, opts, &progress_callback),
        Target::Artwork => session.sync_artwork(&plan, mode, opts, &progress_callback),
        Target::Aux => session.sync_aux(&plan, mode, opts, &progress_callback),
    };
    pb.finish_and_clear();
    result?;

    let report = session.report();
    report.log();
    if report.error_count() == 0 {
        log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            if opts.dry_run { "Dry run complete" } else { "Done" },
        );
    } else {
        log::warn!(
            "{} Finished with {} failed file operations",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.error_count(),
        );
    }
    Ok(())
}
