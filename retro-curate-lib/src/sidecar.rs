//! Per-game `.nfo` sidecar files for front-ends.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <game>
//!     <title>Metal Slug</title>
//!     <platform>Arcade</platform>
//!     <year>1996</year>
//!     <publisher>Nazca</publisher>
//!     <genre>Platform / Run Gun</genre>
//!     <plot>neogeo.cpp, 2 players, 4 buttons (joy)</plot>
//! </game>
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use retro_curate_core::tags::base_name;
use retro_curate_core::{Record, SelectionPlan, Universe};

use crate::error::LibError;
use crate::scan;
use crate::sync::{self, SyncProgress, SyncSummary};

pub const SIDECAR_EXTENSION: &str = "nfo";

const UNKNOWN: &str = "Unknown";
const UNKNOWN_YEAR: &str = "????";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    pub title: String,
    pub platform: String,
    pub year: String,
    pub publisher: String,
    pub genre: String,
    pub plot: String,
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

impl Sidecar {
    pub fn for_record(record: &Record, platform: Option<&str>) -> Self {
        let platform = platform.unwrap_or_default();
        match record {
            Record::Dump(d) => Sidecar {
                title: or_default(base_name(&d.name), UNKNOWN),
                platform: or_default(platform, UNKNOWN),
                year: UNKNOWN_YEAR.to_string(),
                publisher: UNKNOWN.to_string(),
                genre: UNKNOWN.to_string(),
                plot: or_default(&d.tags.join(", "), UNKNOWN),
            },
            Record::Machine(m) => {
                let title = if m.description.trim().is_empty() {
                    m.name.as_str()
                } else {
                    base_name(&m.description)
                };
                let mut plot = or_default(&m.driver_file, UNKNOWN);
                plot.push_str(&format!(", {} players, {} buttons", m.players, m.buttons));
                if !m.controls.is_empty() {
                    plot.push_str(&format!(" ({})", m.controls.join(", ")));
                }
                Sidecar {
                    title: or_default(title, UNKNOWN),
                    platform: or_default(platform, "Arcade"),
                    year: or_default(&m.year, UNKNOWN_YEAR),
                    publisher: or_default(&m.manufacturer, UNKNOWN),
                    genre: or_default(&m.category, UNKNOWN),
                    plot,
                }
            }
        }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<game>\n");
        write_tag(&mut xml, "title", &self.title);
        write_tag(&mut xml, "platform", &self.platform);
        write_tag(&mut xml, "year", &self.year);
        write_tag(&mut xml, "publisher", &self.publisher);
        write_tag(&mut xml, "genre", &self.genre);
        write_tag(&mut xml, "plot", &self.plot);
        xml.push_str("</game>\n");
        xml
    }
}

fn write_tag(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("    <");
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Write one sidecar per primary, named after its destination identifier.
/// Unchanged files are left alone.
pub fn write_sidecars(
    universe: &Universe,
    plan: &SelectionPlan,
    dir: &Path,
    platform: Option<&str>,
    dry_run: bool,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for entry in &plan.primaries {
        let Some(record) = universe.get(&entry.destination) else {
            summary.errors.push(format!(
                "No metadata for '{}', sidecar skipped",
                entry.destination
            ));
            continue;
        };
        let path = dir.join(format!("{}.{SIDECAR_EXTENSION}", entry.destination));
        let contents = Sidecar::for_record(record, platform).to_xml();

        let existing = fs::read_to_string(&path).ok();
        if existing.as_deref() == Some(contents.as_str()) {
            summary.skipped += 1;
            continue;
        }
        if dry_run {
            log::info!("Would write {}", path.display());
        } else {
            let result = fs::create_dir_all(dir).and_then(|()| fs::write(&path, &contents));
            if let Err(e) = result {
                summary
                    .errors
                    .push(format!("Failed to write {}: {}", path.display(), e));
                continue;
            }
        }
        if existing.is_some() {
            summary.updated += 1;
        } else {
            summary.copied += 1;
        }
    }

    summary
}

/// Remove sidecars whose identifier is not among `primaries`, the ROMs
/// present in the destination.
pub fn clean_sidecars(
    dir: &Path,
    primaries: &BTreeSet<&str>,
    dry_run: bool,
    progress: &dyn Fn(SyncProgress),
) -> Result<SyncSummary, LibError> {
    sync::clean(
        dir,
        &scan::extension_set(&[SIDECAR_EXTENSION]),
        primaries,
        dry_run,
        progress,
    )
}
