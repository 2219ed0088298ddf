pub mod catver;
pub mod dat;
pub mod error;
pub mod loader;
pub mod mame;
pub mod reduced;

pub use catver::CategoryIndex;
pub use dat::{DatFile, DatGame};
pub use error::DatError;
pub use loader::{ArcadeSources, load_arcade_universe, load_console_universe};
pub use mame::MachineXml;
pub use reduced::{CacheProgress, CacheStatus, ReducedDatabase};
