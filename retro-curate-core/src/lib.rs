//! Selection engine for curated ROM collections.
//!
//! A [`Universe`] of records grouped into parent/clone classes is ranked
//! and filtered by a [`CompiledFilter`], intersected with what is on disk,
//! and reduced to one pick per class by the [`Selector`]. Arcade picks are
//! then closed over their BIOS and device dependencies.

pub mod deps;
pub mod error;
pub mod expr;
pub mod filter;
pub mod inventory;
pub mod plan;
pub mod record;
pub mod score;
pub mod select;
pub mod tags;
pub mod universe;
pub mod year;

pub use error::{CurateError, ErrorKind};
pub use expr::{ExprError, Predicate};
pub use filter::{CompiledFilter, Evaluation, FilterSpec, MainFlag, Polarity, Verdict};
pub use inventory::OnDiskInventory;
pub use plan::{ArtworkKind, InventoryWarning, PlanEntry, SelectionPlan};
pub use record::{DisplayType, DumpRecord, MachineFlags, MachineRecord, Mode, Orientation, Record};
pub use select::{RankedClass, RankedMember, Selector};
pub use universe::{EquivalenceClass, Universe};
pub use year::{YearBounds, YearValue};
