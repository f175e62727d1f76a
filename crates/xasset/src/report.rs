//! Reports written next to the exported files

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::asset::{ExportResult, ExportStatus};
use crate::error::Result;
use crate::locator::CatalogBase;
use crate::memory::ReadMemory;
use crate::pool::PoolMetadata;
use crate::title::{PoolLayout, TitleDescriptor};

pub const POOL_REPORT_FILE: &str = "DBAssetPools.json";

/// Element size of one declared asset type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReportEntry {
    #[serde(rename = "Name")]
    pub name: &'static str,
    #[serde(rename = "ElementSize")]
    pub element_size: u32,
}

/// Element sizes of every declared type, in table order.
///
/// Returns `None` for layouts that do not record element sizes.
pub fn pool_report<R: ReadMemory + ?Sized>(
    reader: &R,
    title: &TitleDescriptor,
    catalog: &CatalogBase,
) -> Result<Option<Vec<PoolReportEntry>>> {
    if title.layout != PoolLayout::Records {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(title.asset_types.len());
    for ty in title.asset_types {
        let metadata = PoolMetadata::read(reader, title, catalog, ty.index)?;
        entries.push(PoolReportEntry {
            name: ty.name,
            element_size: metadata.element_size.unwrap_or(0),
        });
    }
    Ok(Some(entries))
}

/// Write `entries` to `DBAssetPools.json` below `output_dir`
pub fn write_pool_report(output_dir: &Path, entries: &[PoolReportEntry]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(POOL_REPORT_FILE);
    fs::write(&path, serde_json::to_string_pretty(entries)?)?;
    Ok(path)
}

/// A pool that could not be enumerated
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPool {
    pub pool: &'static str,
    pub type_index: u32,
    pub error: String,
}

/// Totals for a finished session
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub title: &'static str,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub discovered: usize,
    pub success: usize,
    pub memory_changed: usize,
    pub read_fault: usize,
    pub decode_error: usize,
    pub io_error: usize,
    pub cancelled: bool,
    pub skipped_pools: Vec<SkippedPool>,
}

impl ExportSummary {
    pub fn new(title: &'static str, started_at: DateTime<Local>) -> Self {
        Self {
            title,
            started_at,
            finished_at: started_at,
            discovered: 0,
            success: 0,
            memory_changed: 0,
            read_fault: 0,
            decode_error: 0,
            io_error: 0,
            cancelled: false,
            skipped_pools: Vec::new(),
        }
    }

    pub fn record(&mut self, status: ExportStatus) {
        let counter = match status {
            ExportStatus::Success => &mut self.success,
            ExportStatus::MemoryChanged => &mut self.memory_changed,
            ExportStatus::ReadFault => &mut self.read_fault,
            ExportStatus::DecodeError => &mut self.decode_error,
            ExportStatus::IoError => &mut self.io_error,
        };
        *counter += 1;
    }

    /// Export attempts made
    pub fn attempted(&self) -> usize {
        self.success + self.failed()
    }

    pub fn failed(&self) -> usize {
        self.memory_changed + self.read_fault + self.decode_error + self.io_error
    }
}

#[derive(Serialize)]
struct ResultsReport<'a> {
    summary: &'a ExportSummary,
    results: &'a [ExportResult],
}

/// Write the summary and every per-asset result as pretty JSON
pub fn write_results(path: &Path, summary: &ExportSummary, results: &[ExportResult]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&ResultsReport { summary, results })?;
    fs::write(path, json)?;
    Ok(())
}
