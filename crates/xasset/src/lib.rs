//! # xasset
//!
//! Asset extraction from the memory of running games.
//!
//! This crate provides:
//! - Read-only access to a foreign process (Windows, or Wine/Proton on Linux)
//! - Signature scanning with wildcard bytes
//! - Per-title catalog location and sentinel validation
//! - Asset pool enumeration and per-type export
//! - A session that ties these together with parallel export and reports
//!
//! ## Feature Flags
//!
//! - `debug-tools`: Enables pool table dumps for diagnosing layout changes.
//!   This feature is intended for CLI tools and development, not production use.

pub mod asset;
pub mod config;
#[cfg(feature = "debug-tools")]
pub mod debug;
pub mod error;
pub mod locator;
pub mod memory;
pub mod pool;
pub mod prelude;
pub mod process;
pub mod report;
pub mod session;
pub mod title;

pub use asset::{AssetHandler, ExportResult, ExportStatus, export_asset, output_path};
pub use config::{ExtractorConfig, ExtractorConfigBuilder};
pub use error::{Error, Result};
pub use locator::{CatalogBase, CatalogLocator};
pub use memory::{
    Address, MAX_STRING_LEN, PatternScan, PointerWidth, ReadMemory, ReadMemoryExt, Signature,
};
pub use pool::{AssetDescriptor, PoolMetadata};
pub use process::{AttachedProcess, ProcessEntry, list_processes};
pub use report::{ExportSummary, PoolReportEntry, SkippedPool, write_results};
pub use session::{Session, SessionState};
pub use title::{TitleDescriptor, find_by_id, find_by_process_name, registry};

// Debug utilities (requires debug-tools feature)
#[cfg(feature = "debug-tools")]
pub use debug::{PoolDump, PoolDumpEntry};
