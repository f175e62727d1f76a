//! End-to-end extraction session.
//!
//! A session walks `Idle -> Attached -> CatalogResolved -> PoolsEnumerated ->
//! Exporting -> Done`. Attach and catalog failures end the session. A pool
//! that cannot be enumerated is skipped, and every export attempt yields one
//! [`ExportResult`] whether it succeeded or not.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use rayon::prelude::*;
use strum::{Display, IntoStaticStr};
use tracing::{debug, info, warn};

use crate::asset::{ExportResult, export_asset};
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use crate::locator::{CatalogBase, CatalogLocator};
use crate::memory::ReadMemory;
use crate::pool::{self, AssetDescriptor};
use crate::report::{ExportSummary, SkippedPool, pool_report, write_pool_report};
use crate::title::TitleDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SessionState {
    Idle,
    Attached,
    CatalogResolved,
    PoolsEnumerated,
    Exporting,
    Done,
}

pub struct Session<R> {
    reader: R,
    title: &'static TitleDescriptor,
    config: ExtractorConfig,
    state: SessionState,
    catalog: Option<CatalogBase>,
    assets: Vec<AssetDescriptor>,
    summary: ExportSummary,
}

impl<R: ReadMemory + Sync> Session<R> {
    pub fn new(reader: R, title: &'static TitleDescriptor, config: ExtractorConfig) -> Self {
        Self {
            reader,
            title,
            config,
            state: SessionState::Idle,
            catalog: None,
            assets: Vec::new(),
            summary: ExportSummary::new(title.name, Local::now()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn title(&self) -> &'static TitleDescriptor {
        self.title
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn catalog(&self) -> Option<&CatalogBase> {
        self.catalog.as_ref()
    }

    /// Assets found by [`Session::enumerate`]
    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn summary(&self) -> &ExportSummary {
        &self.summary
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState {
                expected: expected.into(),
                actual: self.state.into(),
            });
        }
        Ok(())
    }

    /// Confirm the main module is readable
    pub fn attach(&mut self) -> Result<()> {
        self.expect_state(SessionState::Idle)?;

        let base = self.reader.base_address();
        self.reader.read_bytes(base, 2).map_err(|e| {
            Error::ProcessOpenFailed(format!("module at {base} is not readable: {e}"))
        })?;

        debug!(
            "{}: module {} + 0x{:X}",
            self.title.name,
            base,
            self.reader.module_size()
        );
        self.state = SessionState::Attached;
        Ok(())
    }

    /// Find and validate the asset catalog, then write the pool report
    pub fn locate(&mut self) -> Result<CatalogBase> {
        self.expect_state(SessionState::Attached)?;

        let catalog = CatalogLocator::new(&self.reader, self.title).locate()?;
        self.catalog = Some(catalog);
        self.state = SessionState::CatalogResolved;

        if self.config.pool_report {
            match pool_report(&self.reader, self.title, &catalog) {
                Ok(Some(entries)) => match write_pool_report(self.config.output_dir(), &entries) {
                    Ok(path) => info!("Wrote pool report to {}", path.display()),
                    Err(e) => warn!("Failed to write pool report: {}", e),
                },
                Ok(None) => debug!("{}: layout has no element sizes to report", self.title.name),
                Err(e) => warn!("Failed to read pool report: {}", e),
            }
        }

        Ok(catalog)
    }

    fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = self.config.jobs {
            builder = builder.num_threads(jobs);
        }
        builder.build().map_err(|e| Error::ThreadPool(e.to_string()))
    }

    /// Enumerate every selected pool that has a handler.
    ///
    /// Pools fail independently: a layout mismatch or read fault is logged
    /// and recorded in the summary, and the remaining pools still load.
    pub fn enumerate(&mut self, cancel: &AtomicBool) -> Result<&[AssetDescriptor]> {
        self.expect_state(SessionState::CatalogResolved)?;
        let catalog = self.catalog.ok_or(Error::InvalidState {
            expected: SessionState::CatalogResolved.into(),
            actual: self.state.into(),
        })?;

        let handlers: Vec<_> = self
            .title
            .handlers
            .iter()
            .copied()
            .filter(|h| self.config.wants_type(h.type_name()))
            .collect();

        let reader = &self.reader;
        let title = self.title;
        let loaded: Vec<_> = self.thread_pool()?.install(|| {
            handlers
                .par_iter()
                .filter(|_| !cancel.load(Ordering::Relaxed))
                .map(|handler| (*handler, pool::load(reader, title, &catalog, *handler)))
                .collect()
        });

        let mut assets = Vec::new();
        for (handler, result) in loaded {
            match result {
                Ok(found) => {
                    info!("Found {} {} assets", found.len(), handler.display_name());
                    assets.extend(found.into_iter().filter(|a| self.config.wants_name(&a.name)));
                }
                Err(e) => {
                    warn!("Skipping pool {}: {}", handler.type_name(), e);
                    self.summary.skipped_pools.push(SkippedPool {
                        pool: handler.type_name(),
                        type_index: handler.type_index(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.summary.discovered = assets.len();
        self.assets = assets;
        self.state = SessionState::PoolsEnumerated;
        Ok(&self.assets)
    }

    /// Export every enumerated asset.
    ///
    /// Returns one result per attempted asset. When `cancel` is raised,
    /// assets not yet started are left out.
    pub fn export(&mut self, cancel: &AtomicBool) -> Result<Vec<ExportResult>> {
        self.expect_state(SessionState::PoolsEnumerated)?;
        let workers = self.thread_pool()?;
        self.state = SessionState::Exporting;

        let assets = std::mem::take(&mut self.assets);
        let total = assets.len();
        let reader: &(dyn ReadMemory + Sync) = &self.reader;
        let title = self.title;
        let output_dir = self.config.output_dir.clone();

        let results: Vec<ExportResult> = workers.install(|| {
            assets
                .into_par_iter()
                .filter(|_| !cancel.load(Ordering::Relaxed))
                .filter_map(|asset| {
                    let handler = title.handler(asset.type_index)?;
                    Some(export_asset(handler, reader, asset, &output_dir))
                })
                .collect()
        });

        for result in &results {
            self.summary.record(result.status);
        }
        self.summary.cancelled = results.len() < total;
        self.summary.finished_at = Local::now();

        info!(
            "Exported {} of {} assets ({} failed)",
            self.summary.success,
            total,
            self.summary.failed()
        );
        if self.summary.cancelled {
            warn!("Export cancelled after {} assets", results.len());
        }

        self.state = SessionState::Done;
        Ok(results)
    }

    /// Run every step in order
    pub fn run(&mut self, cancel: &AtomicBool) -> Result<Vec<ExportResult>> {
        self.attach()?;
        self.locate()?;
        self.enumerate(cancel)?;
        self.export(cancel)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    use super::*;
    use crate::asset::ExportStatus;
    use crate::memory::mock::{MockMemoryBuilder, MockMemoryReader};
    use crate::report::POOL_REPORT_FILE;
    use crate::title::modern_warfare::{MODERN_WARFARE, RAWFILE, XMODEL};

    const BASE: u64 = 0x1_4000_0000;
    const POOLS_RVA: u64 = 0x20_0000;
    const RAW_ENTRIES: u64 = BASE + 0x30_0000;
    const XMODEL_ENTRIES: u64 = BASE + 0x40_0000;
    const STRINGS: u64 = BASE + 0x50_0000;
    const PAYLOADS: u64 = BASE + 0x60_0000;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn record(entries: u64, capacity: u32, element_size: u32) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&entries.to_le_bytes());
        record.extend_from_slice(&0u64.to_le_bytes());
        record.extend_from_slice(&capacity.to_le_bytes());
        record.extend_from_slice(&element_size.to_le_bytes());
        record
    }

    /// Modern Warfare image with a validated catalog and the given raw files
    /// in consecutive slots of a 4-slot pool
    fn mw_process(files: &[(&str, &[u8])], rawfile_element_size: u32) -> MockMemoryReader {
        let mut sig = vec![0x48, 0x8D, 0x04, 0x40, 0x4C, 0x8D, 0x8E];
        sig.extend_from_slice(&(POOLS_RVA as i32).to_le_bytes());
        sig.extend_from_slice(&[0x4D, 0x8D, 0x0C, 0xC1, 0x8D, 0x42, 0xFF]);

        let pools = BASE + POOLS_RVA;
        let mut builder = MockMemoryBuilder::new(BASE)
            .zeroed(BASE, 0x2000)
            .bytes(BASE + 0x100, &sig)
            .zeroed(pools, (MODERN_WARFARE.max_type_index() as usize + 1) * 24)
            .bytes(pools + u64::from(XMODEL) * 24, &record(XMODEL_ENTRIES, 1, 0x100))
            .u64(XMODEL_ENTRIES, STRINGS)
            .cstring(STRINGS, "axis_guide_createfx")
            .bytes(
                pools + u64::from(RAWFILE) * 24,
                &record(RAW_ENTRIES, 4, rawfile_element_size),
            )
            .zeroed(RAW_ENTRIES, 4 * 24)
            .module_size(0x2000);

        for (slot, (name, body)) in files.iter().enumerate() {
            let slot = slot as u64;
            let name_at = STRINGS + 0x100 * (slot + 1);
            let payload_at = PAYLOADS + 0x1000 * slot;
            let packed = zlib(body);

            let mut header = Vec::new();
            header.extend_from_slice(&name_at.to_le_bytes());
            header.extend_from_slice(&(packed.len() as i32).to_le_bytes());
            header.extend_from_slice(&(body.len() as i32).to_le_bytes());
            header.extend_from_slice(&payload_at.to_le_bytes());

            builder = builder
                .bytes(RAW_ENTRIES + slot * 24, &header)
                .cstring(name_at, name)
                .bytes(payload_at, &packed);
        }
        builder.build()
    }

    fn config(dir: &std::path::Path) -> ExtractorConfig {
        ExtractorConfig::builder().output_dir(dir).jobs(2).build()
    }

    #[test]
    fn test_run_exports_every_asset() {
        let reader = mw_process(
            &[
                ("scripts/cp/cp_main.gsc", b"main() {}\n"),
                ("maps/mp/mp_m_speed.csv", b"a,b\n1,2\n"),
            ],
            24,
        );
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(reader, &MODERN_WARFARE, config(dir.path()));
        let cancel = AtomicBool::new(false);

        let results = session.run(&cancel).unwrap();

        assert_eq!(session.state(), SessionState::Done);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_success()));
        assert_eq!(
            fs::read(dir.path().join("scripts/cp/cp_main.gsc")).unwrap(),
            b"main() {}\n"
        );
        assert_eq!(session.summary().success, 2);
        assert!(!session.summary().cancelled);
        assert!(dir.path().join(POOL_REPORT_FILE).exists());
    }

    #[test]
    fn test_layout_mismatch_skips_pool() {
        let reader = mw_process(&[("a.txt", b"a")], 32);
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(reader, &MODERN_WARFARE, config(dir.path()));
        let cancel = AtomicBool::new(false);

        let results = session.run(&cancel).unwrap();
        assert!(results.is_empty());
        assert_eq!(session.state(), SessionState::Done);
        assert_eq!(session.summary().skipped_pools.len(), 1);
        assert_eq!(session.summary().skipped_pools[0].pool, "rawfile");
    }

    #[test]
    fn test_stale_asset_is_reported_not_written() {
        let reader = mw_process(&[("keep.txt", b"keep"), ("gone.txt", b"gone")], 24);
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(reader, &MODERN_WARFARE, config(dir.path()));
        let cancel = AtomicBool::new(false);

        session.attach().unwrap();
        session.locate().unwrap();
        assert_eq!(session.enumerate(&cancel).unwrap().len(), 2);

        // Slot 1 is released before export
        session.reader().write_u64(RAW_ENTRIES + 24, 0);

        let results = session.export(&cancel).unwrap();
        let gone = results.iter().find(|r| r.asset.name == "gone.txt").unwrap();
        assert_eq!(gone.status, ExportStatus::MemoryChanged);
        assert!(!dir.path().join("gone.txt").exists());
        assert!(dir.path().join("keep.txt").exists());
        assert_eq!(session.summary().memory_changed, 1);
    }

    #[test]
    fn test_wrong_sentinel_is_fatal() {
        let reader = mw_process(&[], 24);
        reader.write_cstring(STRINGS, "defaultvehicle");
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(reader, &MODERN_WARFARE, config(dir.path()));

        let err = session.run(&AtomicBool::new(false)).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { .. }));
        assert!(err.is_session_fatal());
        assert_eq!(session.state(), SessionState::Attached);
    }

    #[test]
    fn test_steps_out_of_order() {
        let reader = mw_process(&[], 24);
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(reader, &MODERN_WARFARE, config(dir.path()));

        let err = session.export(&AtomicBool::new(false)).unwrap_err();
        match err {
            Error::InvalidState { expected, actual } => {
                assert_eq!(expected, "PoolsEnumerated");
                assert_eq!(actual, "Idle");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cancelled_before_export() {
        let reader = mw_process(&[("a.txt", b"a"), ("b.txt", b"b")], 24);
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(reader, &MODERN_WARFARE, config(dir.path()));
        let cancel = AtomicBool::new(false);

        session.attach().unwrap();
        session.locate().unwrap();
        session.enumerate(&cancel).unwrap();

        cancel.store(true, Ordering::SeqCst);
        let results = session.export(&cancel).unwrap();
        assert!(results.is_empty());
        assert!(session.summary().cancelled);
        assert_eq!(session.state(), SessionState::Done);
    }

    #[test]
    fn test_filters_apply() {
        let reader = mw_process(&[("scripts/a.gsc", b"a"), ("tables/b.csv", b"b")], 24);
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractorConfig::builder()
            .output_dir(dir.path())
            .name_filter("scripts/")
            .pool_report(false)
            .build();
        let mut session = Session::new(reader, &MODERN_WARFARE, config);

        let results = session.run(&AtomicBool::new(false)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].asset.name, "scripts/a.gsc");
        assert!(!dir.path().join(POOL_REPORT_FILE).exists());
    }
}
