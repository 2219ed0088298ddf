//! End-of-run report of non-fatal conditions and counters.

use std::collections::BTreeMap;

use retro_curate_core::{ArtworkKind, InventoryWarning, SelectionPlan};

use crate::sync::SyncSummary;

pub const ROMS: &str = "ROMs";
pub const SIDECARS: &str = "sidecars";
pub const AUX_MEDIA: &str = "aux media";

/// Everything worth telling the user after a verb finishes.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub warnings: Vec<InventoryWarning>,
    /// Other non-fatal conditions, already formatted.
    pub notes: Vec<String>,
    pub missing_artwork: BTreeMap<ArtworkKind, Vec<String>>,
    /// Counters per asset kind, in the order they were first recorded.
    pub sections: Vec<(String, SyncSummary)>,
}

impl RunReport {
    pub fn record_plan(&mut self, plan: &SelectionPlan) {
        self.warnings.extend(plan.warnings.iter().cloned());
        for (kind, ids) in &plan.missing_artwork {
            self.missing_artwork
                .entry(*kind)
                .or_default()
                .extend(ids.iter().cloned());
        }
    }

    pub fn note(&mut self, msg: impl Into<String>) {
        self.notes.push(msg.into());
    }

    /// Add counters to a section, merging with an earlier one of the same label.
    pub fn add(&mut self, label: &str, summary: SyncSummary) {
        match self.sections.iter_mut().find(|(l, _)| l == label) {
            Some((_, existing)) => existing.merge(summary),
            None => self.sections.push((label.to_string(), summary)),
        }
    }

    pub fn section(&self, label: &str) -> Option<&SyncSummary> {
        self.sections
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| s)
    }

    pub fn error_count(&self) -> usize {
        self.sections.iter().map(|(_, s)| s.errors.len()).sum()
    }

    pub fn log(&self) {
        for warning in &self.warnings {
            log::warn!("{warning}");
        }
        for note in &self.notes {
            log::warn!("{note}");
        }
        for (kind, ids) in &self.missing_artwork {
            if ids.is_empty() {
                continue;
            }
            log::warn!("{} selections have no {kind} artwork", ids.len());
            for id in ids {
                log::debug!("  no {kind}: {id}");
            }
        }
        for (label, s) in &self.sections {
            log::info!(
                "{label}: {} copied, {} updated, {} unchanged, {} removed",
                s.copied,
                s.updated,
                s.skipped,
                s.removed
            );
            for e in &s.errors {
                log::error!("  {e}");
            }
        }
        let errors = self.error_count();
        if errors > 0 {
            log::error!("{errors} file operations failed");
        }
    }
}
