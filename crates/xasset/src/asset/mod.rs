//! Per-type export logic.
//!
//! Each supported asset type of a title is an [`AssetHandler`]. Handlers
//! re-read the asset header, check that it still names the same asset,
//! decode the payload and write it under the output root.

pub mod decode;
pub mod rawfile;

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory};
use crate::pool::AssetDescriptor;

pub trait AssetHandler: Send + Sync {
    /// Pool identifier, as in the title's type table
    fn type_name(&self) -> &'static str;

    /// Human-readable type name
    fn display_name(&self) -> &'static str;

    fn type_index(&self) -> u32;

    /// Size of the in-memory header; must equal the pool's element size
    fn header_size(&self) -> u32;

    /// Export one asset below `output_root`, returning the written path
    fn export(
        &self,
        reader: &dyn ReadMemory,
        asset: &AssetDescriptor,
        output_root: &Path,
    ) -> Result<PathBuf>;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr, EnumIter,
)]
pub enum ExportStatus {
    Success,
    MemoryChanged,
    ReadFault,
    DecodeError,
    IoError,
}

/// Outcome of one export attempt
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub asset: AssetDescriptor,
    pub status: ExportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExportResult {
    pub fn is_success(&self) -> bool {
        self.status == ExportStatus::Success
    }
}

/// Run `handler` on `asset`, turning any failure into a status
pub fn export_asset(
    handler: &dyn AssetHandler,
    reader: &dyn ReadMemory,
    asset: AssetDescriptor,
    output_root: &Path,
) -> ExportResult {
    match handler.export(reader, &asset, output_root) {
        Ok(path) => {
            debug!("Exported {} {}", handler.display_name(), asset.name);
            ExportResult {
                asset,
                status: ExportStatus::Success,
                path: Some(path),
                message: None,
            }
        }
        Err(e) => {
            warn!("Failed to export {}: {}", asset.name, e);
            ExportResult {
                status: e.export_status(),
                message: Some(e.to_string()),
                asset,
                path: None,
            }
        }
    }
}

/// Fail with `MemoryChanged` unless the name at `name_ptr` is still `asset.name`
pub(crate) fn ensure_unchanged(
    reader: &dyn ReadMemory,
    asset: &AssetDescriptor,
    name_ptr: Address,
) -> Result<()> {
    let found = if name_ptr.is_null() {
        String::new()
    } else {
        reader.read_cstring(name_ptr)?
    };

    if found != asset.name {
        return Err(Error::MemoryChanged {
            asset: asset.name.clone(),
            address: asset.header_address,
            found,
        });
    }
    Ok(())
}

/// Destination for an asset name below `root`.
///
/// Both `/` and `\` separate components. Empty, `.` and `..` components and
/// drive prefixes are dropped so the result always stays below `root`.
pub fn output_path(root: &Path, asset_name: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    let mut pushed = false;

    for part in asset_name.split(['/', '\\']) {
        if part.is_empty() || part == "." || part == ".." || part.ends_with(':') {
            continue;
        }
        // Anything the platform would still treat specially
        if !matches!(Path::new(part).components().next(), Some(Component::Normal(_))) {
            continue;
        }
        path.push(part);
        pushed = true;
    }

    if !pushed {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("asset name {asset_name:?} has no usable path components"),
        )));
    }
    Ok(path)
}

/// Create parent directories and write `data`, replacing any existing file
pub(crate) fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    Ok(())
}
