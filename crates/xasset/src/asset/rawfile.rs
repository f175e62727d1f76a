//! Raw files: scripts, tables and config text stored verbatim or zlib-packed

use std::path::{Path, PathBuf};

use tracing::debug;
use zerocopy::{FromBytes, FromZeroes};

use super::decode::{ZLIB_HEADER_LEN, inflate_zlib_body};
use super::{AssetHandler, ensure_unchanged, output_path, write_output};
use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory, ReadMemoryExt};
use crate::pool::AssetDescriptor;
use crate::title::{black_ops2, modern_warfare};

/// Largest payload a single raw file may declare
const MAX_PAYLOAD_LEN: usize = super::decode::MAX_INFLATED_LEN;

#[derive(Debug, Clone, Copy, FromZeroes, FromBytes)]
#[repr(C)]
struct MwRawFileHeader {
    name: u64,           // 0x00
    compressed_len: i32, // 0x08
    len: i32,            // 0x0c
    buffer: u64,         // 0x10
}
const _: () = assert!(std::mem::size_of::<MwRawFileHeader>() == 0x18);

#[derive(Debug, Clone, Copy, FromZeroes, FromBytes)]
#[repr(C)]
struct Bo2RawFileHeader {
    name: u32,   // 0x00
    len: i32,    // 0x04
    buffer: u32, // 0x08
}
const _: () = assert!(std::mem::size_of::<Bo2RawFileHeader>() == 0x0c);

fn payload_len(asset: &AssetDescriptor, field: &str, value: i32) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&len| len <= MAX_PAYLOAD_LEN)
        .ok_or_else(|| Error::DecodeError {
            asset: asset.name.clone(),
            message: format!("implausible {field} {value}"),
        })
}

fn read_payload(reader: &dyn ReadMemory, buffer: Address, len: usize) -> Result<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    reader.read_bytes(buffer, len)
}

/// Modern Warfare raw file. Payloads are zlib containers unless
/// `compressed_len` is zero, in which case `len` bytes are stored as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModernWarfareRawFile;

impl AssetHandler for ModernWarfareRawFile {
    fn type_name(&self) -> &'static str {
        "rawfile"
    }

    fn display_name(&self) -> &'static str {
        "Raw File"
    }

    fn type_index(&self) -> u32 {
        modern_warfare::RAWFILE
    }

    fn header_size(&self) -> u32 {
        std::mem::size_of::<MwRawFileHeader>() as u32
    }

    fn export(
        &self,
        reader: &dyn ReadMemory,
        asset: &AssetDescriptor,
        output_root: &Path,
    ) -> Result<PathBuf> {
        let header: MwRawFileHeader = reader.read_struct(asset.header_address)?;
        ensure_unchanged(reader, asset, Address::new(header.name))?;

        let path = output_path(output_root, &asset.name)?;
        let len = payload_len(asset, "length", header.len)?;
        let buffer = Address::new(header.buffer);

        let data = if header.compressed_len == 0 {
            read_payload(reader, buffer, len)?
        } else {
            let compressed_len = payload_len(asset, "compressed length", header.compressed_len)?;
            if compressed_len < ZLIB_HEADER_LEN {
                return Err(Error::DecodeError {
                    asset: asset.name.clone(),
                    message: format!("compressed length {compressed_len} is shorter than the zlib header"),
                });
            }

            // An overrunning compressed length is a decode failure
            let body = buffer.add(ZLIB_HEADER_LEN as u64);
            let packed = reader
                .read_bytes(body, compressed_len - ZLIB_HEADER_LEN)
                .map_err(|e| Error::DecodeError {
                    asset: asset.name.clone(),
                    message: format!("compressed payload at {body} is truncated: {e}"),
                })?;
            let data = inflate_zlib_body(&packed, len, MAX_PAYLOAD_LEN).map_err(|e| Error::DecodeError {
                asset: asset.name.clone(),
                message: e.to_string(),
            })?;
            if data.len() != len {
                debug!(
                    "{}: inflated {} bytes, header declares {}",
                    asset.name,
                    data.len(),
                    len
                );
            }
            data
        };

        write_output(&path, &data)?;
        Ok(path)
    }
}

/// Black Ops II raw file, stored uncompressed
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackOps2RawFile;

impl AssetHandler for BlackOps2RawFile {
    fn type_name(&self) -> &'static str {
        "rawfile"
    }

    fn display_name(&self) -> &'static str {
        "Raw File"
    }

    fn type_index(&self) -> u32 {
        black_ops2::RAWFILE
    }

    fn header_size(&self) -> u32 {
        std::mem::size_of::<Bo2RawFileHeader>() as u32
    }

    fn export(
        &self,
        reader: &dyn ReadMemory,
        asset: &AssetDescriptor,
        output_root: &Path,
    ) -> Result<PathBuf> {
        let header: Bo2RawFileHeader = reader.read_struct(asset.header_address)?;
        ensure_unchanged(reader, asset, Address::new(u64::from(header.name)))?;

        let path = output_path(output_root, &asset.name)?;
        let len = payload_len(asset, "length", header.len)?;
        let data = read_payload(reader, Address::new(u64::from(header.buffer)), len)?;

        write_output(&path, &data)?;
        Ok(path)
    }
}
