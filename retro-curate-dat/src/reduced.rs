//! Reduced machine database cache.
//!
//! Parsing the full machine XML takes seconds and hundreds of megabytes, so
//! the retained fields are written to a JSON file next to the other caches
//! (`~/.cache/retro-curate/machines.json`) and reused until the upstream
//! build changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use retro_curate_core::MachineRecord;

use crate::error::DatError;
use crate::mame;

/// Cache format version. Bump this when changing the retained fields to
/// invalidate stale caches automatically.
pub const CACHE_VERSION: u32 = 1;

/// On-disk form of the reduced database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducedDatabase {
    #[serde(default)]
    pub cache_version: u32,
    /// `build` attribute of the machine XML this was built from.
    pub upstream_build: String,
    /// RFC 3339 timestamp of the build.
    pub built: String,
    pub machines: Vec<MachineRecord>,
}

/// Why a cache was or wasn't reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Reused,
    Missing,
    Stale { cached: String, upstream: String },
    Forced,
}

impl CacheStatus {
    pub fn describe(&self) -> String {
        match self {
            CacheStatus::Reused => "up to date".to_string(),
            CacheStatus::Missing => "no cache".to_string(),
            CacheStatus::Stale { cached, upstream } => {
                format!("cache is for {cached}, machine database is {upstream}")
            }
            CacheStatus::Forced => "rebuild requested".to_string(),
        }
    }
}

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum CacheProgress {
    /// Parsing the machine XML; `machines` read so far
    Parsing { machines: usize },
    /// Writing the cache file
    Writing { path: PathBuf },
}

/// Default location of the reduced cache.
pub fn default_cache_path() -> Result<PathBuf, DatError> {
    let base =
        dirs::cache_dir().ok_or_else(|| DatError::cache("Could not determine cache directory"))?;
    Ok(base.join("retro-curate").join("machines.json"))
}

/// Parse the machine XML into a fresh reduced database.
pub fn build(xml: &Path, progress: &dyn Fn(CacheProgress)) -> Result<ReducedDatabase, DatError> {
    let parsed = mame::parse_machine_xml_file(xml, &|machines| {
        progress(CacheProgress::Parsing { machines })
    })?;
    log::info!(
        "Parsed {} machines from {} ({})",
        parsed.machines.len(),
        xml.display(),
        parsed.build
    );
    Ok(ReducedDatabase {
        cache_version: CACHE_VERSION,
        upstream_build: parsed.build,
        built: chrono::Utc::now().to_rfc3339(),
        machines: parsed.machines,
    })
}

/// Read a cache file. A missing or unreadable cache is `None`.
pub fn read(path: &Path) -> Result<Option<ReducedDatabase>, DatError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|e| DatError::file(path, e))?;
    match serde_json::from_str::<ReducedDatabase>(&contents) {
        Ok(db) => Ok(Some(db)),
        Err(e) => {
            log::warn!("Ignoring unreadable cache {}: {e}", path.display());
            Ok(None)
        }
    }
}

/// Write a cache file, creating parent directories.
pub fn write(path: &Path, db: &ReducedDatabase) -> Result<(), DatError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string(db)?;
    fs::write(path, contents).map_err(|e| DatError::file(path, e))?;
    Ok(())
}

/// Load the reduced database, rebuilding the cache when it is missing, from
/// another cache version, or from another upstream build.
pub fn load_or_build(
    xml: &Path,
    cache: &Path,
    force: bool,
    progress: &dyn Fn(CacheProgress),
) -> Result<(ReducedDatabase, CacheStatus), DatError> {
    let upstream = mame::read_build(xml)?;

    let status = if force {
        CacheStatus::Forced
    } else {
        match read(cache)? {
            Some(db) if db.cache_version == CACHE_VERSION && db.upstream_build == upstream => {
                log::debug!("Reusing {} ({})", cache.display(), db.upstream_build);
                return Ok((db, CacheStatus::Reused));
            }
            Some(db) if db.cache_version != CACHE_VERSION => CacheStatus::Stale {
                cached: format!("cache format {}", db.cache_version),
                upstream: format!("cache format {CACHE_VERSION}"),
            },
            Some(db) => CacheStatus::Stale {
                cached: db.upstream_build,
                upstream,
            },
            None => CacheStatus::Missing,
        }
    };

    log::info!("Rebuilding machine cache: {}", status.describe());
    let db = build(xml, progress)?;
    progress(CacheProgress::Writing {
        path: cache.to_path_buf(),
    });
    write(cache, &db)?;
    Ok((db, status))
}
