//! Scan command implementation.

use anyhow::Result;
use xasset::{ReadMemory, ReadMemoryExt, Signature};

use super::open_process;
use crate::cli::TargetArgs;

/// Print the first `limit` matches of `pattern` in the main module
pub fn run(target: &TargetArgs, pattern: &str, limit: usize) -> Result<()> {
    let signature = Signature::parse(pattern)?;
    let process = open_process(target)?;
    let base = process.base_address();

    let mut scan = process.scan_module(&signature, false);
    let mut found = 0;
    for hit in scan.by_ref().take(limit) {
        let rva = hit.distance_from(base).unwrap_or(0);
        println!("{}  (base + 0x{:X})", hit, rva);
        found += 1;
    }

    eprintln!("{} matches shown", found);
    if scan.skipped_chunks() > 0 {
        eprintln!("{} unreadable chunks skipped", scan.skipped_chunks());
    }
    Ok(())
}
