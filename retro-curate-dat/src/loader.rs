//! Universe construction for both collection modes.

use std::path::{Path, PathBuf};

use retro_curate_core::Universe;

use crate::catver::CategoryIndex;
use crate::dat;
use crate::error::DatError;
use crate::reduced::{self, CacheProgress, CacheStatus};

/// Files backing an arcade universe.
#[derive(Debug, Clone)]
pub struct ArcadeSources {
    pub machine_xml: PathBuf,
    pub reduced_cache: PathBuf,
    pub catver: Option<PathBuf>,
}

/// Build a console universe from a parent/clone DAT, or from the source
/// directory's archive names when no DAT is configured.
pub fn load_console_universe<I, S>(dat: Option<&Path>, names: I) -> Result<Universe, DatError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    match dat {
        Some(path) => dat::load_dat_universe(path),
        None => Ok(Universe::from_dump_names(names, "source directory")?),
    }
}

/// Build an arcade universe from the reduced cache (rebuilt when stale) and
/// the optional category index.
pub fn load_arcade_universe(
    sources: &ArcadeSources,
    force_rebuild: bool,
    progress: &dyn Fn(CacheProgress),
) -> Result<(Universe, CacheStatus), DatError> {
    let (db, status) = reduced::load_or_build(
        &sources.machine_xml,
        &sources.reduced_cache,
        force_rebuild,
        progress,
    )?;

    let mut machines = db.machines;
    let index = match &sources.catver {
        Some(path) => CategoryIndex::from_file(path)?,
        None => CategoryIndex::default(),
    };
    index.apply(&mut machines);

    let universe = Universe::from_machines(machines, format!("MAME {}", db.upstream_build))?;
    Ok((universe, status))
}
