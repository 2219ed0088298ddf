//! The selector's output, handed to the sync executor.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::CurateError;
use crate::record::Mode;
use crate::universe::Universe;

/// One primary archive to materialise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlanEntry {
    /// Identifier of the archive read from the source directory.
    pub source: String,
    /// Identifier the archive is written under. Differs from `source` only
    /// through an identifier swap.
    pub destination: String,
}

impl PlanEntry {
    pub fn identity(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            source: id.clone(),
            destination: id,
        }
    }

    pub fn is_swapped(&self) -> bool {
        self.source != self.destination
    }
}

/// Artwork asset kinds tracked per primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtworkKind {
    Thumb,
    Fanart,
}

impl ArtworkKind {
    pub const ALL: [ArtworkKind; 2] = [ArtworkKind::Thumb, ArtworkKind::Fanart];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkKind::Thumb => "thumb",
            ArtworkKind::Fanart => "fanart",
        }
    }
}

impl std::fmt::Display for ArtworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal availability problems found while selecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryWarning {
    /// The best-ranked eligible member of a class is not in the source
    /// directory. `fallback` is what was picked instead, if anything.
    PreferredMissing {
        preferred: String,
        fallback: Option<String>,
    },
    /// A required dependency is in the universe but not on disk.
    DependencyNotOnDisk { machine: String, dependency: String },
}

impl std::fmt::Display for InventoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryWarning::PreferredMissing {
                preferred,
                fallback: Some(fallback),
            } => write!(f, "'{preferred}' not on disk, using '{fallback}'"),
            InventoryWarning::PreferredMissing {
                preferred,
                fallback: None,
            } => write!(f, "'{preferred}' not on disk, class skipped"),
            InventoryWarning::DependencyNotOnDisk {
                machine,
                dependency,
            } => write!(f, "'{machine}' requires '{dependency}', which is not on disk"),
        }
    }
}

/// Everything the executor needs for one filter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPlan {
    pub mode: Mode,
    /// One entry per selected class, sorted by destination.
    pub primaries: Vec<PlanEntry>,
    /// Machines pulled in to make the primaries runnable.
    pub dependencies: BTreeSet<String>,
    /// Per kind: destination identifier to the artwork identifier to copy.
    pub artwork: BTreeMap<ArtworkKind, BTreeMap<String, String>>,
    /// Per kind: destination identifiers with no artwork anywhere in the class.
    pub missing_artwork: BTreeMap<ArtworkKind, Vec<String>>,
    /// Source identifier to its auxiliary media names.
    pub aux_media: BTreeMap<String, Vec<String>>,
    pub warnings: Vec<InventoryWarning>,
}

impl SelectionPlan {
    pub fn is_empty(&self) -> bool {
        self.primaries.is_empty() && self.dependencies.is_empty()
    }

    /// True when `id` is sourced as a primary or a dependency.
    pub fn is_selected(&self, id: &str) -> bool {
        self.dependencies.contains(id) || self.primaries.iter().any(|e| e.source == id)
    }

    /// Every identifier the destination ROM directory should contain.
    pub fn destination_ids(&self) -> BTreeSet<&str> {
        self.primaries
            .iter()
            .map(|e| e.destination.as_str())
            .chain(self.dependencies.iter().map(String::as_str))
            .collect()
    }

    /// Source/destination pairs for primaries and dependencies, primaries first.
    pub fn rom_pairs(&self) -> Vec<(&str, &str)> {
        self.primaries
            .iter()
            .map(|e| (e.source.as_str(), e.destination.as_str()))
            .chain(self.dependencies.iter().map(|d| (d.as_str(), d.as_str())))
            .collect()
    }

    /// Artwork substitutions for one kind, empty when the kind is not tracked.
    pub fn artwork_pairs(&self, kind: ArtworkKind) -> impl Iterator<Item = (&str, &str)> {
        self.artwork
            .get(&kind)
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Check the structural guarantees of a plan against its universe.
    ///
    /// A failure here is a bug in the selector, reported as an internal error.
    pub fn verify(&self, universe: &Universe) -> Result<(), CurateError> {
        let mut classes = HashSet::new();
        let mut destinations = HashSet::new();
        for entry in &self.primaries {
            let Some(class) = universe.class_of(&entry.destination) else {
                return Err(CurateError::internal(format!(
                    "planned '{}' is not in the universe",
                    entry.destination
                )));
            };
            if !classes.insert(class.parent()) {
                return Err(CurateError::internal(format!(
                    "class '{}' has more than one primary",
                    class.parent()
                )));
            }
            if !destinations.insert(entry.destination.as_str()) {
                return Err(CurateError::internal(format!(
                    "destination '{}' planned twice",
                    entry.destination
                )));
            }
        }
        if !self
            .primaries
            .windows(2)
            .all(|w| w[0].destination <= w[1].destination)
        {
            return Err(CurateError::internal("primaries are not sorted"));
        }
        if let Some(dep) = self.dependencies.iter().find(|d| !universe.contains(d)) {
            return Err(CurateError::internal(format!(
                "dependency '{dep}' is not in the universe"
            )));
        }
        Ok(())
    }
}
