//! Filesystem side of curation: the filters file, directory scans, the
//! sync executor and sidecars, tied together per run by [`Session`].

pub mod config;
pub mod error;
pub mod report;
pub mod scan;
pub mod session;
pub mod sidecar;
pub mod sync;

pub use config::{ArcadeConfig, AssetDirs, Config, FilterConfig};
pub use error::LibError;
pub use report::RunReport;
pub use scan::AssetIndex;
pub use session::{Session, SyncOptions, UniverseCheck, rebuild_cache};
pub use sidecar::Sidecar;
pub use sync::{CopyJob, SyncAction, SyncMode, SyncProgress, SyncSummary};
