//! Per-class selection: rank, filter, intersect with the inventory, pick.

use std::collections::{BTreeMap, BTreeSet};

use crate::deps;
use crate::error::CurateError;
use crate::filter::{CompiledFilter, Verdict};
use crate::inventory::OnDiskInventory;
use crate::plan::{ArtworkKind, InventoryWarning, PlanEntry, SelectionPlan};
use crate::record::Mode;
use crate::universe::{EquivalenceClass, Universe};

/// One class member with its score and filter outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMember {
    pub id: String,
    pub score: i64,
    pub verdict: Verdict,
}

/// A class with members sorted by score, best first. Equal scores keep
/// class order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedClass {
    pub parent: String,
    pub members: Vec<RankedMember>,
}

impl RankedClass {
    /// The best-ranked member that passed every filter step, on disk or not.
    pub fn preferred(&self) -> Option<&RankedMember> {
        self.members.iter().find(|m| m.verdict.is_eligible())
    }
}

/// Runs a compiled filter over a universe.
pub struct Selector<'a> {
    universe: &'a Universe,
    filter: &'a CompiledFilter,
}

impl<'a> Selector<'a> {
    /// Pair a universe with a filter compiled for the same mode.
    ///
    /// Identifier swaps must name records of the universe on both sides.
    pub fn new(universe: &'a Universe, filter: &'a CompiledFilter) -> Result<Self, CurateError> {
        if universe.mode() != filter.mode() {
            return Err(CurateError::internal(format!(
                "{} filter applied to a {} universe",
                filter.mode(),
                universe.mode()
            )));
        }
        for (from, to) in &filter.spec().identifier_swap {
            for id in [from, to] {
                if !universe.contains(id) {
                    return Err(CurateError::config(format!(
                        "identifier swap '{from}' -> '{to}': '{id}' is not in the universe"
                    )));
                }
            }
        }
        Ok(Self { universe, filter })
    }

    pub fn universe(&self) -> &Universe {
        self.universe
    }

    pub fn filter(&self) -> &CompiledFilter {
        self.filter
    }

    /// Steps 1-6 for every class, without consulting the inventory.
    pub fn rank(&self) -> Result<Vec<RankedClass>, CurateError> {
        self.universe
            .classes()
            .iter()
            .map(|class| self.rank_class(class))
            .collect()
    }

    fn rank_class(&self, class: &EquivalenceClass) -> Result<RankedClass, CurateError> {
        let mut members = Vec::with_capacity(class.len());
        for id in class.members() {
            let Some(record) = self.universe.get(id) else {
                return Err(CurateError::internal(format!("class member '{id}' has no record")));
            };
            let eval = self.filter.evaluate(record)?;
            members.push(RankedMember {
                id: id.clone(),
                score: eval.score,
                verdict: eval.verdict,
            });
        }
        // stable: ties stay in class order
        members.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(RankedClass {
            parent: class.parent().to_string(),
            members,
        })
    }

    /// Run the full selection against the source inventory.
    ///
    /// `artwork` holds one inventory per tracked artwork kind; kinds absent
    /// from the map are not planned.
    pub fn select(
        &self,
        roms: &OnDiskInventory,
        artwork: &BTreeMap<ArtworkKind, OnDiskInventory>,
    ) -> Result<SelectionPlan, CurateError> {
        let mut plan = SelectionPlan {
            mode: self.universe.mode(),
            ..Default::default()
        };

        // best eligible member on disk, per class
        for ranked in self.rank()? {
            let pick = ranked
                .members
                .iter()
                .filter(|m| m.verdict.is_eligible())
                .find_map(|m| self.available_entry(&m.id, roms));

            if let Some(preferred) = ranked.preferred() {
                let preferred_picked = pick.as_ref().is_some_and(|p| p.destination == preferred.id);
                if !preferred_picked {
                    plan.warnings.push(InventoryWarning::PreferredMissing {
                        preferred: preferred.id.clone(),
                        fallback: pick.as_ref().map(|p| p.destination.clone()),
                    });
                }
            }
            if let Some(entry) = pick {
                if entry.is_swapped() {
                    log::debug!("'{}' sourced from '{}'", entry.destination, entry.source);
                }
                plan.primaries.push(entry);
            }
        }
        plan.primaries
            .sort_by(|a, b| a.destination.cmp(&b.destination));

        for (&kind, inventory) in artwork {
            self.plan_artwork(&mut plan, kind, inventory);
        }

        if self.universe.mode() == Mode::Arcade {
            let landed: BTreeSet<&str> =
                plan.primaries.iter().map(|e| e.destination.as_str()).collect();
            let required = deps::resolve(
                self.universe,
                plan.primaries.iter().map(|e| e.source.as_str()),
                &landed,
            )?;
            for (dependency, machine) in required {
                if !roms.contains(&dependency) {
                    plan.warnings.push(InventoryWarning::DependencyNotOnDisk {
                        machine,
                        dependency: dependency.clone(),
                    });
                }
                plan.dependencies.insert(dependency);
            }
            self.plan_aux_media(&mut plan);
        }

        log::debug!(
            "selected {} primaries, {} dependencies from {} classes",
            plan.primaries.len(),
            plan.dependencies.len(),
            self.universe.classes().len()
        );
        Ok(plan)
    }

    /// The plan entry for `id` if its archive, or its swap target's, is on disk.
    fn available_entry(&self, id: &str, roms: &OnDiskInventory) -> Option<PlanEntry> {
        if let Some(to) = self.filter.spec().identifier_swap.get(id) {
            if roms.contains(to) {
                return Some(PlanEntry {
                    source: to.clone(),
                    destination: id.to_string(),
                });
            }
        }
        roms.contains(id).then(|| PlanEntry::identity(id))
    }

    fn plan_artwork(&self, plan: &mut SelectionPlan, kind: ArtworkKind, inventory: &OnDiskInventory) {
        let mut pairs = BTreeMap::new();
        let mut missing = Vec::new();

        for entry in &plan.primaries {
            let id = entry.destination.as_str();
            let art = if inventory.contains(id) {
                Some(id)
            } else if self.universe.mode() == Mode::Console {
                self.universe.class_of(id).and_then(|class| {
                    class
                        .members()
                        .iter()
                        .map(String::as_str)
                        .find(|m| inventory.contains(m))
                })
            } else {
                None
            };
            match art {
                Some(art) => {
                    pairs.insert(id.to_string(), art.to_string());
                }
                None => missing.push(id.to_string()),
            }
        }

        plan.artwork.insert(kind, pairs);
        plan.missing_artwork.insert(kind, missing);
    }

    fn plan_aux_media(&self, plan: &mut SelectionPlan) {
        let ids = plan
            .primaries
            .iter()
            .map(|e| e.source.as_str())
            .chain(plan.dependencies.iter().map(String::as_str));
        let mut aux = BTreeMap::new();
        for id in ids {
            if let Some(m) = self.universe.machine(id) {
                if !m.aux_media.is_empty() {
                    aux.insert(id.to_string(), m.aux_media.clone());
                }
            }
        }
        plan.aux_media = aux;
    }
}

#[cfg(test)]
#[path = "tests/select_tests.rs"]
mod tests;
