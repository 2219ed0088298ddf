use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_curate_core::ArtworkKind;
use retro_curate_lib::{LibError, Session};

use crate::error::CliError;

/// Show the selection plan without touching the destination.
pub(crate) fn run_check(session: &mut Session) -> Result<(), CliError> {
    let plan = session.select()?;

    log::info!(
        "{}",
        format!(
            "Selection for '{}' ({}):",
            session.filter().name,
            session.filter().dest_dir.display()
        )
        .if_supports_color(Stdout, |t| t.bold()),
    );
    for entry in &plan.primaries {
        if entry.is_swapped() {
            log::info!(
                "  {} {} {}",
                entry.destination,
                "\u{2190}".if_supports_color(Stdout, |t| t.cyan()),
                entry.source.if_supports_color(Stdout, |t| t.dimmed()),
            );
        } else {
            log::info!("  {}", entry.source);
        }
    }

    if !plan.dependencies.is_empty() {
        log::info!("");
        log::info!(
            "{}",
            "Required by the selection:".if_supports_color(Stdout, |t| t.bold()),
        );
        for dep in &plan.dependencies {
            let glyph = if session.roms().contains(dep) {
                format!("{}", "\u{2714}".if_supports_color(Stdout, |t| t.green()))
            } else {
                format!("{}", "\u{2718}".if_supports_color(Stdout, |t| t.red()))
            };
            log::info!("  {} {}", glyph, dep);
        }
    }

    let media: usize = plan.aux_media.values().map(Vec::len).sum();
    log::info!("");
    log::info!(
        "{} games, {} dependencies, {} aux media",
        plan.primaries.len(),
        plan.dependencies.len(),
        media
    );
    session.report().log();
    Ok(())
}

/// Show which selections have their own artwork, which borrow it from
/// another class member and which have none.
pub(crate) fn run_check_artwork(session: &mut Session) -> Result<(), CliError> {
    let kinds: Vec<ArtworkKind> = ArtworkKind::ALL
        .into_iter()
        .filter(|k| session.filter().artwork_dirs(*k).is_some())
        .collect();
    if kinds.is_empty() {
        return Err(LibError::config(format!(
            "filter '{}' has no [filter.thumbs] or [filter.fanart] directories",
            session.filter().name
        ))
        .into());
    }

    let plan = session.select()?;

    for kind in kinds {
        log::info!(
            "{}",
            format!("{kind}:").if_supports_color(Stdout, |t| t.bold())
        );
        let mut own = 0usize;
        let mut borrowed = 0usize;
        for (destination, art) in plan.artwork_pairs(kind) {
            if destination == art {
                own += 1;
            } else {
                borrowed += 1;
                log::info!(
                    "  {} {} {}",
                    destination,
                    "\u{2190}".if_supports_color(Stdout, |t| t.cyan()),
                    art.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
        let missing = plan.missing_artwork.get(&kind).map_or(0, Vec::len);
        for id in plan.missing_artwork.get(&kind).into_iter().flatten() {
            log::info!("  {} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), id);
        }
        log::info!("  {own} own, {borrowed} borrowed, {missing} missing");
        log::info!("");
    }
    Ok(())
}
