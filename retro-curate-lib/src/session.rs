//! One filter run: config → compiled filter → universe → inventory →
//! selection → execution.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use retro_curate_core::tags::extract_tags;
use retro_curate_core::{
    ArtworkKind, CompiledFilter, Mode, OnDiskInventory, RankedClass, SelectionPlan, Selector,
    Universe,
};
use retro_curate_dat::reduced::{self, ReducedDatabase};
use retro_curate_dat::{CacheProgress, CacheStatus, load_arcade_universe, load_console_universe};

use crate::config::{Config, FilterConfig};
use crate::error::LibError;
use crate::report::{self, RunReport};
use crate::scan::{self, AssetIndex};
use crate::sidecar;
use crate::sync::{self, CopyJob, SyncMode, SyncProgress};

/// Flags shared by the executing verbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub clean_primary: bool,
    pub clean_sidecar: bool,
    pub clean_artwork: bool,
    pub clean_aux: bool,
    pub generate_sidecar: bool,
}

/// Universe records absent from the source, and source archives the
/// universe does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniverseCheck {
    pub missing: Vec<String>,
    pub unknown: Vec<String>,
}

#[derive(Debug)]
pub struct Session {
    filter: FilterConfig,
    compiled: CompiledFilter,
    universe: Universe,
    roms: AssetIndex,
    artwork: BTreeMap<ArtworkKind, AssetIndex>,
    cache_status: Option<CacheStatus>,
    report: RunReport,
}

impl Session {
    /// Load everything a filter needs before selection.
    pub fn open(
        config: &Config,
        filter_name: &str,
        force_rebuild: bool,
        progress: &dyn Fn(CacheProgress),
    ) -> Result<Self, LibError> {
        let filter = config.filter(filter_name)?.clone();
        let compiled = filter.compile(config.year_bounds)?;

        let roms = AssetIndex::scan(&filter.source_dir, &filter.rom_extension_set())?;
        log::info!(
            "{}: {} archives in {}",
            filter.name,
            roms.len(),
            filter.source_dir.display()
        );

        let (universe, cache_status) = match filter.mode {
            Mode::Console => (load_console_universe(filter.dat.as_deref(), roms.ids())?, None),
            Mode::Arcade => {
                let (universe, status) =
                    load_arcade_universe(&config.arcade_sources()?, force_rebuild, progress)?;
                (universe, Some(status))
            }
        };
        log::info!(
            "Universe: {} records in {} classes ({})",
            universe.len(),
            universe.classes().len(),
            universe.source()
        );

        let mut report = RunReport::default();
        let mut artwork = BTreeMap::new();
        let image_exts = scan::extension_set(scan::ARTWORK_EXTENSIONS);
        for kind in ArtworkKind::ALL {
            if let Some(dirs) = filter.artwork_dirs(kind) {
                let index = AssetIndex::scan_optional(&dirs.source, &image_exts)?;
                if !dirs.source.is_dir() {
                    report.note(format!(
                        "{kind} source {} does not exist",
                        dirs.source.display()
                    ));
                }
                artwork.insert(kind, index);
            }
        }

        Ok(Self {
            filter,
            compiled,
            universe,
            roms,
            artwork,
            cache_status,
            report,
        })
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn compiled(&self) -> &CompiledFilter {
        &self.compiled
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn roms(&self) -> &AssetIndex {
        &self.roms
    }

    pub fn artwork(&self, kind: ArtworkKind) -> Option<&AssetIndex> {
        self.artwork.get(&kind)
    }

    pub fn cache_status(&self) -> Option<&CacheStatus> {
        self.cache_status.as_ref()
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut RunReport {
        &mut self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }

    /// Every class with its members' scores and verdicts.
    pub fn rank(&self) -> Result<Vec<RankedClass>, LibError> {
        Ok(Selector::new(&self.universe, &self.compiled)?.rank()?)
    }

    /// Build and verify the selection plan.
    pub fn select(&mut self) -> Result<SelectionPlan, LibError> {
        let selector = Selector::new(&self.universe, &self.compiled)?;
        let artwork: BTreeMap<ArtworkKind, OnDiskInventory> = self
            .artwork
            .iter()
            .map(|(kind, index)| (*kind, index.inventory()))
            .collect();
        let plan = selector.select(&self.roms.inventory(), &artwork)?;
        plan.verify(&self.universe)?;
        self.report.record_plan(&plan);
        log::info!(
            "Selected {} of {} classes, {} dependencies",
            plan.primaries.len(),
            self.universe.classes().len(),
            plan.dependencies.len()
        );
        Ok(plan)
    }

    /// Copy or sync primaries and dependencies, then clean and write sidecars
    /// as requested.
    pub fn sync_roms(
        &mut self,
        plan: &SelectionPlan,
        mode: SyncMode,
        opts: &SyncOptions,
        progress: &dyn Fn(SyncProgress),
    ) -> Result<(), LibError> {
        let dest_dir = self.filter.dest_dir.clone();
        let mut jobs = Vec::new();
        let mut planned: BTreeSet<&str> = BTreeSet::new();
        for (source, destination) in plan.rom_pairs() {
            // dependencies missing on disk were already reported
            let Some(path) = self.roms.path(source) else {
                continue;
            };
            jobs.push(CopyJob::new(path, with_extension(&dest_dir, destination, path)));
            planned.insert(destination);
        }

        let summary = sync::execute(&jobs, mode, opts.dry_run, progress);
        self.report.add(report::ROMS, summary);

        let exts = self.filter.rom_extension_set();
        if opts.clean_primary {
            let keep = plan.destination_ids();
            let summary = sync::clean(&dest_dir, &exts, &keep, opts.dry_run, progress)?;
            self.report.add(report::ROMS, summary);
        }

        let sidecar_dir = self.filter.sidecar_dir().to_path_buf();
        if opts.generate_sidecar {
            let summary = sidecar::write_sidecars(
                &self.universe,
                plan,
                &sidecar_dir,
                self.filter.platform.as_deref(),
                opts.dry_run,
            );
            self.report.add(report::SIDECARS, summary);
        }
        if opts.clean_sidecar {
            let on_disk = AssetIndex::scan_optional(&dest_dir, &exts)?;
            let mut present: BTreeSet<&str> = on_disk.ids().collect();
            if opts.dry_run {
                // the destination still shows the state before this run
                present.extend(planned.iter().copied());
                if opts.clean_primary {
                    let keep = plan.destination_ids();
                    present.retain(|id| keep.contains(id));
                }
            }
            let summary =
                sidecar::clean_sidecars(&sidecar_dir, &present, opts.dry_run, progress)?;
            self.report.add(report::SIDECARS, summary);
        }
        Ok(())
    }

    /// Copy or sync artwork for every configured kind.
    pub fn sync_artwork(
        &mut self,
        plan: &SelectionPlan,
        mode: SyncMode,
        opts: &SyncOptions,
        progress: &dyn Fn(SyncProgress),
    ) -> Result<(), LibError> {
        let kinds: Vec<ArtworkKind> = ArtworkKind::ALL
            .into_iter()
            .filter(|k| self.filter.artwork_dirs(*k).is_some())
            .collect();
        if kinds.is_empty() {
            return Err(LibError::config(format!(
                "filter '{}' has no [filter.thumbs] or [filter.fanart] directories",
                self.filter.name
            )));
        }

        let image_exts = scan::extension_set(scan::ARTWORK_EXTENSIONS);
        for kind in kinds {
            let Some(dirs) = self.filter.artwork_dirs(kind).cloned() else {
                continue;
            };
            if !dirs.source.is_dir() {
                return Err(LibError::source_dir(
                    &dirs.source,
                    io::Error::from(io::ErrorKind::NotFound),
                ));
            }
            let Some(index) = self.artwork.get(&kind) else {
                continue;
            };

            let mut jobs = Vec::new();
            for (destination, art) in plan.artwork_pairs(kind) {
                if let Some(path) = index.path(art) {
                    jobs.push(CopyJob::new(path, with_extension(&dirs.dest, destination, path)));
                }
            }
            let mut summary = sync::execute(&jobs, mode, opts.dry_run, progress);

            if opts.clean_artwork {
                let keep: BTreeSet<&str> = plan.artwork_pairs(kind).map(|(d, _)| d).collect();
                summary.merge(sync::clean(
                    &dirs.dest,
                    &image_exts,
                    &keep,
                    opts.dry_run,
                    progress,
                )?);
            }
            self.report.add(kind.as_str(), summary);
        }
        Ok(())
    }

    /// Copy or sync auxiliary media into per-machine directories.
    ///
    /// Media follow their machine's destination name, so a swapped pick's
    /// media land under the name the front-end will look for.
    pub fn sync_aux(
        &mut self,
        plan: &SelectionPlan,
        mode: SyncMode,
        opts: &SyncOptions,
        progress: &dyn Fn(SyncProgress),
    ) -> Result<(), LibError> {
        if self.filter.mode != Mode::Arcade {
            return Err(LibError::config(format!(
                "filter '{}' is not an arcade filter",
                self.filter.name
            )));
        }
        let Some(dirs) = self.filter.aux.clone() else {
            return Err(LibError::config(format!(
                "filter '{}' has no [filter.aux] directories",
                self.filter.name
            )));
        };
        if !dirs.source.is_dir() {
            return Err(LibError::source_dir(
                &dirs.source,
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }

        let renamed: BTreeMap<&str, &str> = plan
            .primaries
            .iter()
            .map(|e| (e.source.as_str(), e.destination.as_str()))
            .collect();

        let mut jobs = Vec::new();
        // everything the plan wants kept, whether or not the source has it
        let mut targets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (machine, media) in &plan.aux_media {
            let target = renamed.get(machine.as_str()).copied().unwrap_or(machine.as_str());
            targets
                .entry(target.to_string())
                .or_default()
                .extend(media.iter().cloned());
            for name in media {
                let file = format!("{name}.chd");
                let source = dirs.source.join(machine).join(&file);
                if !source.is_file() {
                    self.report.note(format!(
                        "'{machine}' needs media '{name}', not found at {}",
                        source.display()
                    ));
                    continue;
                }
                jobs.push(CopyJob::new(source, dirs.dest.join(target).join(&file)));
            }
        }

        let mut summary = sync::execute(&jobs, mode, opts.dry_run, progress);
        if opts.clean_aux {
            summary.merge(sync::clean_aux(&dirs.dest, &targets, opts.dry_run, progress)?);
        }
        self.report.add(report::AUX_MEDIA, summary);
        Ok(())
    }

    /// Compare the universe with the source directory.
    pub fn check_universe(&self) -> UniverseCheck {
        let missing = self
            .universe
            .iter()
            .filter(|r| r.machine().is_none_or(|m| m.flags.has_roms))
            .map(|r| r.id())
            .filter(|id| !self.roms.contains(id))
            .map(str::to_string)
            .collect();
        let unknown = self
            .roms
            .ids()
            .filter(|id| !self.universe.contains(id))
            .map(str::to_string)
            .collect();
        UniverseCheck { missing, unknown }
    }

    /// Tag counts over the source directory.
    pub fn tag_histogram(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for id in self.roms.ids() {
            let tags = match self.universe.get(id) {
                Some(record) => record.tags().to_vec(),
                None => extract_tags(id),
            };
            for tag in tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// `dir/<id>.<ext of source>`
fn with_extension(dir: &Path, id: &str, source: &Path) -> PathBuf {
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => dir.join(format!("{id}.{ext}")),
        None => dir.join(id),
    }
}

/// Regenerate the reduced machine cache regardless of its state.
pub fn rebuild_cache(
    config: &Config,
    progress: &dyn Fn(CacheProgress),
) -> Result<ReducedDatabase, LibError> {
    let sources = config.arcade_sources()?;
    let (db, _) = reduced::load_or_build(
        &sources.machine_xml,
        &sources.reduced_cache,
        true,
        progress,
    )?;
    log::info!(
        "Wrote {} machines to {}",
        db.machines.len(),
        sources.reduced_cache.display()
    );
    Ok(db)
}
