//! Transitive BIOS and device dependencies of arcade picks.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::CurateError;
use crate::record::MachineRecord;
use crate::universe::Universe;

/// BIOS first, then devices, in record order.
pub fn direct_dependencies(machine: &MachineRecord) -> impl Iterator<Item = &str> {
    machine
        .bios
        .iter()
        .chain(machine.devices.iter())
        .map(String::as_str)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Expand the picks in `roots` to the set of machines they need at runtime.
///
/// Every referenced identifier must exist in the universe. Devices without
/// ROMs are walked through but not returned, since there is nothing to copy
/// for them. Dependencies in `present`, the identifiers that already land in
/// the destination under their own name, are not returned either.
///
/// A swapped pick walks from its source archive while `present` holds its
/// destination name, so a machine that is only a swap source is still
/// returned when something depends on it.
///
/// Returns each dependency with the machine that first required it.
pub fn resolve<'a, I>(
    universe: &Universe,
    roots: I,
    present: &BTreeSet<&str>,
) -> Result<BTreeMap<String, String>, CurateError>
where
    I: IntoIterator<Item = &'a str>,
{
    let roots: BTreeSet<&str> = roots.into_iter().collect();
    let mut state: HashMap<&str, Visit> = HashMap::new();
    let mut out = BTreeMap::new();

    for &id in &roots {
        let Some(record) = universe.get(id) else {
            return Err(CurateError::internal(format!(
                "selected '{id}' is not in the universe"
            )));
        };
        visit(universe, record.id(), present, &mut state, &mut out)?;
    }

    log::debug!(
        "{} dependencies for {} primaries",
        out.len(),
        roots.len()
    );
    Ok(out)
}

fn visit<'u>(
    universe: &'u Universe,
    id: &'u str,
    present: &BTreeSet<&str>,
    state: &mut HashMap<&'u str, Visit>,
    out: &mut BTreeMap<String, String>,
) -> Result<(), CurateError> {
    match state.get(id) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => return Err(CurateError::DependencyCycle(id.to_string())),
        None => {}
    }
    let Some(machine) = universe.machine(id) else {
        // console records have no dependencies
        state.insert(id, Visit::Done);
        return Ok(());
    };
    state.insert(id, Visit::InProgress);

    for dep in direct_dependencies(machine) {
        let Some(target) = universe.machine(dep) else {
            return Err(CurateError::DependencyMissing {
                machine: id.to_string(),
                dependency: dep.to_string(),
            });
        };
        let dep: &'u str = target.name.as_str();
        visit(universe, dep, present, state, out)?;
        if target.flags.has_roms && !present.contains(dep) {
            out.entry(dep.to_string()).or_insert_with(|| id.to_string());
        }
    }

    state.insert(id, Visit::Done);
    Ok(())
}
