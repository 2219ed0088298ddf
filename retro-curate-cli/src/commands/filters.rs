use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_curate_core::ArtworkKind;
use retro_curate_lib::Config;

pub(crate) fn run_list_filters(config: &Config) {
    if config.filters.is_empty() {
        log::info!(
            "{}",
            "No filters defined.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return;
    }

    log::info!("{}", "Filters:".if_supports_color(Stdout, |t| t.bold()));
    log::info!("");

    for filter in &config.filters {
        log::info!(
            "  {} [{}]{}",
            filter.name.if_supports_color(Stdout, |t| t.bold()),
            filter.mode.if_supports_color(Stdout, |t| t.cyan()),
            match &filter.platform {
                Some(p) => format!(" {}", p.if_supports_color(Stdout, |t| t.dimmed())),
                None => String::new(),
            },
        );
        log::info!(
            "    ROMs: {} -> {}",
            filter.source_dir.display(),
            filter.dest_dir.display()
        );
        if let Some(dat) = &filter.dat {
            log::info!("    DAT: {}", dat.display());
        }
        for kind in ArtworkKind::ALL {
            if let Some(dirs) = filter.artwork_dirs(kind) {
                log::info!(
                    "    {}: {} -> {}",
                    kind,
                    dirs.source.display(),
                    dirs.dest.display()
                );
            }
        }
        if let Some(aux) = &filter.aux {
            log::info!(
                "    Aux media: {} -> {}",
                aux.source.display(),
                aux.dest.display()
            );
        }
        if !filter.spec.identifier_swap.is_empty() {
            log::info!("    Swaps: {}", filter.spec.identifier_swap.len());
        }
    }
}
