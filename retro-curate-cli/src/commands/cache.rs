use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_curate_dat::CacheProgress;
use retro_curate_lib::{Config, rebuild_cache};

use crate::error::CliError;
use crate::progress;

/// Regenerate the reduced machine database cache.
pub(crate) fn run_rebuild_cache(config: &Config, quiet: bool) -> Result<(), CliError> {
    let pb = progress::spinner(quiet);
    let progress_callback = |p: CacheProgress| {
        pb.set_message(progress::cache_message(&p));
        pb.tick();
    };
    let result = rebuild_cache(config, &progress_callback);
    pb.finish_and_clear();
    let db = result?;

    log::info!(
        "{} Machine cache rebuilt ({} machines, build {})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        db.machines.len(),
        db.upstream_build.if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
