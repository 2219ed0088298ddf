use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_curate_lib::Session;

use crate::error::CliError;

/// Print every class, parent first, with each member's score and verdict.
pub(crate) fn run_list_universe(session: &Session) -> Result<(), CliError> {
    let ranked = session.rank()?;

    for class in &ranked {
        log::info!("{}", class.parent.if_supports_color(Stdout, |t| t.bold()));
        let preferred = class.preferred().map(|m| m.id.as_str());
        for member in &class.members {
            let on_disk = if session.roms().contains(&member.id) {
                format!("{}", "\u{2714}".if_supports_color(Stdout, |t| t.green()))
            } else {
                format!("{}", "\u{2718}".if_supports_color(Stdout, |t| t.red()))
            };
            let marker = if preferred == Some(member.id.as_str()) {
                "*"
            } else {
                " "
            };
            let verdict = member.verdict.describe();
            log::info!(
                "  {} {} {:>6}  {}  {}",
                on_disk,
                marker,
                member.score,
                member.id,
                if member.verdict.is_eligible() {
                    format!("{}", verdict.if_supports_color(Stdout, |t| t.dimmed()))
                } else {
                    format!("{}", verdict.if_supports_color(Stdout, |t| t.yellow()))
                },
            );
        }
    }

    log::info!("");
    log::info!(
        "{} classes, {} records",
        ranked.len(),
        session.universe().len()
    );
    Ok(())
}

/// Report universe records missing from the source and archives the
/// universe does not know.
pub(crate) fn run_check_universe(session: &Session) {
    let check = session.check_universe();

    if check.missing.is_empty() && check.unknown.is_empty() {
        log::info!(
            "{} Source matches the universe ({} archives)",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            session.roms().len(),
        );
        return;
    }

    if !check.missing.is_empty() {
        log::info!(
            "{}",
            format!("Missing from {}:", session.filter().source_dir.display())
                .if_supports_color(Stdout, |t| t.bold()),
        );
        for id in &check.missing {
            log::info!("  {} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), id);
        }
        log::info!("");
    }

    if !check.unknown.is_empty() {
        log::info!(
            "{}",
            format!("Not in {}:", session.universe().source())
                .if_supports_color(Stdout, |t| t.bold()),
        );
        for id in &check.unknown {
            log::info!("  {} {}", "?".if_supports_color(Stdout, |t| t.yellow()), id);
        }
        log::info!("");
    }

    log::info!(
        "{} missing, {} unknown",
        check.missing.len(),
        check.unknown.len()
    );
}

/// Print how often each tag occurs over the source archives.
pub(crate) fn run_list_tags(session: &Session) {
    let mut counts: Vec<(String, usize)> = session.tag_histogram().into_iter().collect();
    if counts.is_empty() {
        log::info!(
            "{}",
            "No tagged archives.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return;
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (tag, count) in &counts {
        log::info!(
            "  {:>6}  {}",
            count,
            tag.if_supports_color(Stdout, |t| t.cyan())
        );
    }
    log::info!("");
    log::info!("{} distinct tags", counts.len());
}
