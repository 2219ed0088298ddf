pub(crate) mod cache;
pub(crate) mod check;
pub(crate) mod copy;
pub(crate) mod filters;
pub(crate) mod universe;

use retro_curate_dat::CacheProgress;
use retro_curate_lib::{Config, Session, SyncMode, config};

use crate::cli_types::{Cli, Commands};
use crate::error::CliError;
use crate::progress;

/// Dispatch the parsed command line.
pub(crate) fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::ListFilters => filters::run_list_filters(&load_config(cli)?),
        Commands::ListUniverse(args) => {
            universe::run_list_universe(&open_session(cli, &args.filter)?)?
        }
        Commands::CheckUniverse(args) => {
            universe::run_check_universe(&open_session(cli, &args.filter)?)
        }
        Commands::ListTags(args) => universe::run_list_tags(&open_session(cli, &args.filter)?),
        Commands::Check(args) => check::run_check(&mut open_session(cli, &args.filter)?)?,
        Commands::CheckArtwork(args) => {
            check::run_check_artwork(&mut open_session(cli, &args.filter)?)?
        }
        Commands::Copy(args) | Commands::Update(args) => {
            let mut session = open_session(cli, &args.target.filter)?;
            copy::run_sync(
                &mut session,
                copy::Target::Roms,
                sync_mode(&cli.command),
                &args.options(),
                cli.quiet,
            )?
        }
        Commands::CopyArtwork(args) | Commands::UpdateArtwork(args) => {
            let mut session = open_session(cli, &args.target.filter)?;
            copy::run_sync(
                &mut session,
                copy::Target::Artwork,
                sync_mode(&cli.command),
                &args.options(),
                cli.quiet,
            )?
        }
        Commands::CopyAux(args) | Commands::UpdateAux(args) => {
            let mut session = open_session(cli, &args.target.filter)?;
            copy::run_sync(
                &mut session,
                copy::Target::Aux,
                sync_mode(&cli.command),
                &args.options(),
                cli.quiet,
            )?
        }
        Commands::RebuildCache => cache::run_rebuild_cache(&load_config(cli)?, cli.quiet)?,
    }
    Ok(())
}

/// `update*` verbs skip files whose size already matches.
pub(crate) fn sync_mode(command: &Commands) -> SyncMode {
    match command {
        Commands::Update(_) | Commands::UpdateArtwork(_) | Commands::UpdateAux(_) => {
            SyncMode::Sync
        }
        _ => SyncMode::Copy,
    }
}

pub(crate) fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let path = cli.config.clone().unwrap_or_else(config::default_path);
    log::debug!("Loading filters from {}", path.display());
    Ok(Config::load(&path)?)
}

/// Load config, universe and inventory for `filter`, with a spinner while
/// the machine cache is (re)built.
pub(crate) fn open_session(cli: &Cli, filter: &str) -> Result<Session, CliError> {
    let config = load_config(cli)?;
    let pb = progress::spinner(cli.quiet);
    let progress_callback = |p: CacheProgress| {
        pb.set_message(progress::cache_message(&p));
        pb.tick();
    };
    let result = Session::open(&config, filter, false, &progress_callback);
    pb.finish_and_clear();
    let session = result?;
    if let Some(status) = session.cache_status() {
        log::debug!("Machine cache: {}", status.describe());
    }
    Ok(session)
}
