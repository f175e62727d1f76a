//! Pools command implementation.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use xasset::{CatalogLocator, PoolDump};

use super::attach;
use crate::cli::TargetArgs;

/// Print the live metadata of every declared pool
pub fn run(target: &TargetArgs, dump: Option<&Path>) -> Result<()> {
    let (process, title) = attach(target)?;
    let catalog = CatalogLocator::new(&process, title).locate()?;
    eprintln!("Asset pools at {}", catalog.pools);

    let snapshot = PoolDump::from_catalog(&process, title, &catalog);

    println!(
        "{:>4}  {:<24} {:>18} {:>9} {:>8}  first asset",
        "idx", "type", "entries", "capacity", "size"
    );
    for entry in &snapshot.pools {
        let marker = if title.handler(entry.type_index).is_some() {
            "*"
        } else {
            " "
        };
        match &entry.metadata {
            Ok(metadata) => {
                let size = metadata
                    .element_size
                    .map(|s| format!("0x{s:X}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>4}{} {:<24} {:>18} {:>9} {:>8}  {}",
                    entry.type_index,
                    marker,
                    entry.name,
                    metadata.entries.to_string(),
                    metadata.capacity,
                    size,
                    entry.first_name.as_deref().unwrap_or("-")
                );
            }
            Err(e) => println!(
                "{:>4}{} {:<24} {}",
                entry.type_index,
                marker,
                entry.name,
                e.red()
            ),
        }
    }
    println!();
    println!("* = exportable");

    if let Some(path) = dump {
        snapshot.save(path)?;
        eprintln!("Dump saved to: {}", path.display());
    }

    Ok(())
}
