//! Directory scanner for source and destination asset directories.
//!
//! Every asset is identified by its file stem: `Game (USA).zip` and
//! `Game (USA).png` both belong to `Game (USA)`. Auxiliary media live one
//! level down, in a directory per machine (`kinst/kinst.chd`).

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use retro_curate_core::OnDiskInventory;

use crate::error::LibError;

/// Image formats accepted for artwork.
pub const ARTWORK_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Auxiliary media format.
pub const AUX_EXTENSIONS: &[&str] = &["chd"];

/// Build a lowercase extension set.
pub fn extension_set<S: AsRef<str>>(extensions: &[S]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .collect()
}

/// Check if a path has an extension in the allowed set.
pub(crate) fn has_matching_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

pub(crate) fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Identifier to file for one directory.
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    dir: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl AssetIndex {
    /// Scan a directory that must exist. Failure to list it is fatal.
    pub fn scan(dir: &Path, extensions: &HashSet<String>) -> Result<Self, LibError> {
        let files = collect_matching_files(dir, extensions)
            .map_err(|e| LibError::source_dir(dir, e))?;
        Ok(Self::from_files(dir, files))
    }

    /// Scan a directory that may not exist yet; a missing directory is empty.
    pub fn scan_optional(dir: &Path, extensions: &HashSet<String>) -> Result<Self, LibError> {
        match collect_matching_files(dir, extensions) {
            Ok(files) => Ok(Self::from_files(dir, files)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::empty(dir)),
            Err(e) => Err(LibError::source_dir(dir, e)),
        }
    }

    /// Scan the per-machine subdirectories of an auxiliary media root.
    /// Identifiers are the subdirectory names.
    pub fn scan_subdirs(dir: &Path) -> Result<Self, LibError> {
        let mut entries: Vec<std::fs::DirEntry> = match std::fs::read_dir(dir) {
            Ok(entries) => entries.flatten().collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::empty(dir)),
            Err(e) => return Err(LibError::source_dir(dir, e)),
        };
        entries.sort_by_key(|e| e.path());

        let files = entries
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?.to_string();
                Some((name, p))
            })
            .collect();
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    fn empty(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            files: BTreeMap::new(),
        }
    }

    fn from_files(dir: &Path, paths: Vec<PathBuf>) -> Self {
        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in paths {
            let Some(stem) = file_stem(&path) else {
                continue;
            };
            if let Some(existing) = files.get(stem) {
                log::debug!(
                    "Ignoring {}: '{}' already provided by {}",
                    path.display(),
                    stem,
                    existing.display()
                );
                continue;
            }
            files.insert(stem.to_string(), path);
        }
        log::debug!("{} assets in {}", files.len(), dir.display());
        Self {
            dir: dir.to_path_buf(),
            files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    pub fn path(&self, id: &str) -> Option<&Path> {
        self.files.get(id).map(PathBuf::as_path)
    }

    /// Identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn inventory(&self) -> OnDiskInventory {
        self.ids().collect()
    }
}

/// Collect all files with matching extensions from a directory (sorted).
pub(crate) fn collect_matching_files(dir: &Path, extensions: &HashSet<String>) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_matching_extension(p, extensions))
        .collect();
    files.sort();
    Ok(files)
}
