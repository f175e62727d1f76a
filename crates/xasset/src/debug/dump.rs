use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::locator::CatalogBase;
use crate::memory::{Address, ReadMemory};
use crate::pool::{self, PoolMetadata};
use crate::title::TitleDescriptor;

/// Bytes sampled from the first slot of each pool
const SAMPLE_LEN: usize = 32;

/// Snapshot of every declared pool, for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct PoolDump {
    pub title: &'static str,
    pub base_address: Address,
    pub module_size: String,
    pub catalog: CatalogBase,
    pub pools: Vec<PoolDumpEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolDumpEntry {
    pub name: &'static str,
    pub type_index: u32,
    /// Metadata, or why it could not be read
    pub metadata: std::result::Result<PoolMetadata, String>,
    pub first_name: Option<String>,
    pub first_slot: String,
}

impl PoolDump {
    pub fn from_catalog<R: ReadMemory + ?Sized>(
        reader: &R,
        title: &'static TitleDescriptor,
        catalog: &CatalogBase,
    ) -> Self {
        let pools = title
            .asset_types
            .iter()
            .map(|ty| {
                let metadata = PoolMetadata::read(reader, title, catalog, ty.index);
                let (first_name, first_slot) = match &metadata {
                    Ok(m) => (
                        pool::first_name(reader, title, m).ok().flatten(),
                        Self::read_memory_hex(reader, m.entries, SAMPLE_LEN),
                    ),
                    Err(_) => (None, "(no metadata)".to_string()),
                };
                PoolDumpEntry {
                    name: ty.name,
                    type_index: ty.index,
                    metadata: metadata.map_err(|e| e.to_string()),
                    first_name,
                    first_slot,
                }
            })
            .collect();

        Self {
            title: title.name,
            base_address: reader.base_address(),
            module_size: format!("0x{:X}", reader.module_size()),
            catalog: *catalog,
            pools,
        }
    }

    fn read_memory_hex<R: ReadMemory + ?Sized>(reader: &R, address: Address, size: usize) -> String {
        if address.is_null() {
            return "(address is 0)".to_string();
        }

        match reader.read_bytes(address, size) {
            Ok(bytes) => bytes
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => "(read failed)".to_string(),
        }
    }

    /// Save dump to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
