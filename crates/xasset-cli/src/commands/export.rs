//! Export command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use xasset::{ExportResult, ExportStatus, Session, write_results};

use super::{attach, extractor_config};
use crate::cli::{SelectionArgs, TargetArgs};
use crate::shutdown::ShutdownSignal;

/// Run a full extraction session
pub fn run(
    target: &TargetArgs,
    selection: &SelectionArgs,
    output: PathBuf,
    pool_report: bool,
    report: Option<&Path>,
) -> Result<()> {
    let current_version = env!("CARGO_PKG_VERSION");
    eprintln!("xasset {} - Export Mode", current_version);

    let shutdown = ShutdownSignal::install()?;
    let (process, title) = attach(target)?;

    let mut config = extractor_config(title, selection)?;
    config.output_dir = output;
    config.pool_report = pool_report;
    let output_dir = config.output_dir.clone();

    let mut session = Session::new(process, title, config);
    let results = session.run(shutdown.as_atomic())?;

    for result in results.iter().filter(|r| !r.is_success()) {
        eprintln!(
            "  {} {}: {}",
            result.status.red(),
            result.asset.name,
            result.message.as_deref().unwrap_or("")
        );
    }

    let summary = session.summary();
    print_counts(&results);
    for skipped in &summary.skipped_pools {
        eprintln!("Skipped pool {}: {}", skipped.pool.yellow(), skipped.error);
    }
    if shutdown.is_shutdown() || summary.cancelled {
        eprintln!(
            "{}",
            format!(
                "Interrupted: {} of {} assets attempted",
                results.len(),
                summary.discovered
            )
            .yellow()
        );
    }
    eprintln!("Output: {}", output_dir.display());

    if let Some(path) = report {
        write_results(path, summary, &results)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_counts(results: &[ExportResult]) {
    for status in ExportStatus::iter() {
        let count = results.iter().filter(|r| r.status == status).count();
        if count == 0 {
            continue;
        }
        if status == ExportStatus::Success {
            eprintln!("{:>15}: {}", status.green(), count);
        } else {
            eprintln!("{:>15}: {}", status.red(), count);
        }
    }
}
