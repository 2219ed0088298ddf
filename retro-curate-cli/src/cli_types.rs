//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use retro_curate_lib::SyncOptions;

#[derive(Parser)]
#[command(name = "retro-curate", version)]
#[command(about = "Select one dump per game from ROM sets and keep a destination in sync", long_about = None)]
pub(crate) struct Cli {
    /// Filters file (defaults to ~/.config/retro-curate/filters.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log detail: verbose adds debug messages, vverbose adds trace
    /// messages, debug adds timestamps and module names
    #[arg(long, global = true, value_enum, default_value_t = Verbosity::Info)]
    pub verbosity: Verbosity,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Verbosity {
    Info,
    Verbose,
    Vverbose,
    Debug,
}

/// The filter a command operates on.
#[derive(Args, Clone)]
pub(crate) struct FilterArg {
    /// Filter name from the filters file
    pub filter: String,
}

/// Arguments for commands that write ROMs.
#[derive(Args, Clone)]
pub(crate) struct RomSyncArgs {
    #[command(flatten)]
    pub target: FilterArg,

    /// Show planned operations without touching the destination
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Remove destination ROMs that are no longer selected
    #[arg(long)]
    pub clean_primary: bool,

    /// Remove sidecars whose ROM is not in the destination
    #[arg(long)]
    pub clean_sidecar: bool,

    /// Write a metadata sidecar next to every selected ROM
    #[arg(long)]
    pub generate_sidecar: bool,
}

impl RomSyncArgs {
    pub(crate) fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            clean_primary: self.clean_primary,
            clean_sidecar: self.clean_sidecar,
            generate_sidecar: self.generate_sidecar,
            ..Default::default()
        }
    }
}

/// Arguments for commands that write artwork.
#[derive(Args, Clone)]
pub(crate) struct ArtworkSyncArgs {
    #[command(flatten)]
    pub target: FilterArg,

    /// Show planned operations without touching the destination
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Remove destination artwork for games that are no longer selected
    #[arg(long)]
    pub clean_artwork: bool,
}

impl ArtworkSyncArgs {
    pub(crate) fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            clean_artwork: self.clean_artwork,
            ..Default::default()
        }
    }
}

/// Arguments for commands that write auxiliary media.
#[derive(Args, Clone)]
pub(crate) struct AuxSyncArgs {
    #[command(flatten)]
    pub target: FilterArg,

    /// Show planned operations without touching the destination
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Remove media directories and files that are no longer needed
    #[arg(long)]
    pub clean_aux: bool,
}

impl AuxSyncArgs {
    pub(crate) fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            clean_aux: self.clean_aux,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the filters defined in the filters file
    ListFilters,

    /// List every class in the filter's universe with member scores
    ListUniverse(FilterArg),

    /// Compare the universe with the source directory
    CheckUniverse(FilterArg),

    /// Count tags over the source directory
    ListTags(FilterArg),

    /// Show the selection without touching the destination
    Check(FilterArg),

    /// Copy the selection to the destination, overwriting existing files
    Copy(RomSyncArgs),

    /// Copy the selection, skipping files whose size already matches
    Update(RomSyncArgs),

    /// Show which selections have artwork and which borrow it from a clone
    CheckArtwork(FilterArg),

    /// Copy artwork for the selection, overwriting existing files
    CopyArtwork(ArtworkSyncArgs),

    /// Copy artwork for the selection, skipping files whose size already matches
    UpdateArtwork(ArtworkSyncArgs),

    /// Copy auxiliary media (CHDs) for the selection (arcade filters)
    CopyAux(AuxSyncArgs),

    /// Copy auxiliary media, skipping files whose size already matches
    UpdateAux(AuxSyncArgs),

    /// Regenerate the reduced machine database cache
    RebuildCache,
}
