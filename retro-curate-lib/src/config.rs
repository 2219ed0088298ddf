//! Filter definitions file.
//!
//! The CLI reads `~/.config/retro-curate/filters.toml` unless `--config`
//! points elsewhere:
//!
//! ```toml
//! [arcade]
//! machine_xml = "/data/mame/mame0262.xml"
//! catver = "/data/mame/catver.ini"
//!
//! [[filter]]
//! name = "snes"
//! source_dir = "/roms/nointro/snes"
//! dest_dir = "/cabinet/snes"
//! dat = "/dats/snes.dat"
//! up_tags = ["USA", "Europe"]
//! exclude_tags = ["Beta", "Proto"]
//!
//! [filter.thumbs]
//! source = "/art/snes/boxart"
//! dest = "/cabinet/snes/images"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use retro_curate_core::{ArtworkKind, CompiledFilter, FilterSpec, Mode, YearBounds};
use retro_curate_dat::ArcadeSources;
use retro_curate_dat::reduced;

use crate::error::LibError;

/// Canonical path to the filters file: `~/.config/retro-curate/filters.toml`.
pub fn default_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("retro-curate").join("filters.toml")
}

/// Global arcade metadata files.
#[derive(Debug, Clone, Deserialize)]
pub struct ArcadeConfig {
    pub machine_xml: PathBuf,
    /// Defaults to `~/.cache/retro-curate/machines.json`.
    #[serde(default)]
    pub reduced_cache: Option<PathBuf>,
    #[serde(default)]
    pub catver: Option<PathBuf>,
}

/// A source/destination directory pair for one asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetDirs {
    pub source: PathBuf,
    pub dest: PathBuf,
}

fn default_rom_extensions() -> Vec<String> {
    vec!["zip".to_string()]
}

/// One `[[filter]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    #[serde(default)]
    pub mode: Mode,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Parent/clone DAT for console filters.
    #[serde(default)]
    pub dat: Option<PathBuf>,
    /// Platform string written into sidecars.
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default = "default_rom_extensions")]
    pub rom_extensions: Vec<String>,
    #[serde(default)]
    pub thumbs: Option<AssetDirs>,
    #[serde(default)]
    pub fanart: Option<AssetDirs>,
    /// Per-machine media directories (arcade only).
    #[serde(default)]
    pub aux: Option<AssetDirs>,
    #[serde(default)]
    pub sidecar_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub spec: FilterSpec,
    /// Keys neither the filter nor its rules recognise.
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

impl FilterConfig {
    pub fn compile(&self, bounds: YearBounds) -> Result<CompiledFilter, LibError> {
        Ok(CompiledFilter::compile(&self.spec, self.mode, bounds)?)
    }

    pub fn artwork_dirs(&self, kind: ArtworkKind) -> Option<&AssetDirs> {
        match kind {
            ArtworkKind::Thumb => self.thumbs.as_ref(),
            ArtworkKind::Fanart => self.fanart.as_ref(),
        }
    }

    /// Where sidecars are written; the ROM destination unless overridden.
    pub fn sidecar_dir(&self) -> &Path {
        self.sidecar_dir.as_deref().unwrap_or(&self.dest_dir)
    }

    /// Lowercased ROM extensions without the leading dot.
    pub fn rom_extension_set(&self) -> HashSet<String> {
        self.rom_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect()
    }

    fn validate(&self, config: &Config) -> Result<(), LibError> {
        let fail = |what: &str| LibError::config(format!("filter '{}': {what}", self.name));

        if let Some(key) = self.unknown.keys().next() {
            return Err(fail(&format!("unknown key '{key}'")));
        }
        if self.source_dir.as_os_str().is_empty() {
            return Err(fail("source_dir is empty"));
        }
        if self.dest_dir.as_os_str().is_empty() {
            return Err(fail("dest_dir is empty"));
        }
        if self.source_dir == self.dest_dir {
            return Err(fail("source_dir and dest_dir are the same directory"));
        }
        if self.rom_extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            return Err(fail("rom_extensions is empty"));
        }
        match self.mode {
            Mode::Arcade if config.arcade.is_none() => {
                return Err(fail("arcade filters need an [arcade] section"));
            }
            Mode::Console if self.aux.is_some() => {
                return Err(fail("auxiliary media only applies to arcade filters"));
            }
            _ => {}
        }
        for (from, to) in &self.spec.identifier_swap {
            if from.is_empty() || to.is_empty() {
                return Err(fail("identifier_swap entries must not be empty"));
            }
        }

        self.compile(config.year_bounds).map_err(|e| match e {
            LibError::Curate(inner) => LibError::config(format!("filter '{}': {inner}", self.name)),
            other => other,
        })?;
        Ok(())
    }
}

/// The whole filters file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arcade: Option<ArcadeConfig>,
    #[serde(default)]
    pub year_bounds: YearBounds,
    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterConfig>,
}

impl Config {
    /// Parse and validate a filters document.
    pub fn parse(text: &str) -> Result<Self, LibError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, LibError> {
        let text = std::fs::read_to_string(path).map_err(|e| LibError::file(path, e))?;
        let config = Self::parse(&text)?;
        log::debug!(
            "Loaded {} filters from {}",
            config.filters.len(),
            path.display()
        );
        Ok(config)
    }

    /// Reject the whole file if any filter is unusable, before any work starts.
    pub fn validate(&self) -> Result<(), LibError> {
        let mut seen = HashSet::new();
        for filter in &self.filters {
            if filter.name.trim().is_empty() {
                return Err(LibError::config("filter with an empty name"));
            }
            if !seen.insert(filter.name.as_str()) {
                return Err(LibError::config(format!(
                    "filter '{}' is defined more than once",
                    filter.name
                )));
            }
            filter.validate(self)?;
        }
        Ok(())
    }

    pub fn filter(&self, name: &str) -> Result<&FilterConfig, LibError> {
        self.filters
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LibError::UnknownFilter(name.to_string()))
    }

    /// Arcade metadata paths with the cache location resolved.
    pub fn arcade_sources(&self) -> Result<ArcadeSources, LibError> {
        let arcade = self
            .arcade
            .as_ref()
            .ok_or_else(|| LibError::config("no [arcade] section in the config file"))?;
        let reduced_cache = match &arcade.reduced_cache {
            Some(path) => path.clone(),
            None => reduced::default_cache_path()?,
        };
        Ok(ArcadeSources {
            machine_xml: arcade.machine_xml.clone(),
            reduced_cache,
            catver: arcade.catver.clone(),
        })
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
