//! List command implementation.

use anyhow::Result;
use xasset::Session;

use super::{attach, extractor_config};
use crate::cli::{SelectionArgs, TargetArgs};
use crate::shutdown::ShutdownSignal;

/// Enumerate the selected assets and print them
pub fn run(target: &TargetArgs, selection: &SelectionArgs, json: bool) -> Result<()> {
    let shutdown = ShutdownSignal::install()?;
    let (process, title) = attach(target)?;

    let mut config = extractor_config(title, selection)?;
    config.pool_report = false;

    let mut session = Session::new(process, title, config);
    session.attach()?;
    session.locate()?;
    let assets = session.enumerate(shutdown.as_atomic())?;

    if json {
        println!("{}", serde_json::to_string_pretty(assets)?);
    } else {
        for asset in assets {
            println!(
                "{:<10} {:>6} {}  {}",
                asset.type_name, asset.slot, asset.header_address, asset.name
            );
        }
    }

    let summary = session.summary();
    eprintln!("{} assets", summary.discovered);
    for skipped in &summary.skipped_pools {
        eprintln!("Skipped pool {}: {}", skipped.pool, skipped.error);
    }
    Ok(())
}
