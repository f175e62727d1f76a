//! Asset pool enumeration.
//!
//! A pool is a fixed-capacity array of same-type asset headers. Every header
//! starts with a pointer to the asset's name; unused slots hold a null name or,
//! for titles that chain free slots together, a link to the next free slot.

use serde::Serialize;
use tracing::{debug, warn};
use zerocopy::{FromBytes, FromZeroes};

use crate::asset::AssetHandler;
use crate::error::{Error, Result};
use crate::locator::CatalogBase;
use crate::memory::{Address, PointerWidth, ReadMemory, ReadMemoryExt};
use crate::title::{PoolLayout, SlotPolicy, TitleDescriptor};

/// Slots fetched per read while walking a pool
const SLOTS_PER_READ: u64 = 1024;

/// Pool record of titles using [`PoolLayout::Records`]
#[derive(Debug, Clone, Copy, FromZeroes, FromBytes)]
#[repr(C)]
struct DbAssetPool {
    entries: u64,      // 0x00
    free_head: u64,    // 0x08
    pool_size: u32,    // 0x10
    element_size: u32, // 0x14
}
const _: () = assert!(std::mem::size_of::<DbAssetPool>() == 0x18);

const DB_ASSET_POOL_SIZE: u64 = std::mem::size_of::<DbAssetPool>() as u64;

/// Live metadata of one pool. Re-read on every enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolMetadata {
    pub type_index: u32,
    /// Address of slot 0
    pub entries: Address,
    pub free_head: Address,
    pub capacity: u32,
    /// Stride between slots, when the layout records one
    pub element_size: Option<u32>,
}

impl PoolMetadata {
    /// Read the metadata of pool `type_index` through a validated catalog
    pub fn read<R: ReadMemory + ?Sized>(
        reader: &R,
        title: &TitleDescriptor,
        catalog: &CatalogBase,
        type_index: u32,
    ) -> Result<Self> {
        match title.layout {
            PoolLayout::Records => {
                let record: DbAssetPool = reader
                    .read_struct(catalog.pools.index(u64::from(type_index), DB_ASSET_POOL_SIZE))?;
                Ok(Self {
                    type_index,
                    entries: Address::new(record.entries),
                    free_head: Address::new(record.free_head),
                    capacity: record.pool_size,
                    element_size: Some(record.element_size),
                })
            }
            PoolLayout::PointerTable => {
                let width = title.pointer_width;
                let pool = reader
                    .read_pointer(catalog.pools.index(u64::from(type_index), width.size()), width)?;
                let capacity = match catalog.pool_sizes {
                    Some(sizes) => reader.read_u32(sizes.index(u64::from(type_index), 4))?,
                    None => 0,
                };

                if pool.is_null() {
                    return Ok(Self {
                        type_index,
                        entries: Address::NULL,
                        free_head: Address::NULL,
                        capacity: 0,
                        element_size: None,
                    });
                }

                Ok(Self {
                    type_index,
                    entries: pool.add(width.size()),
                    free_head: reader.read_pointer(pool, width)?,
                    capacity,
                    element_size: None,
                })
            }
        }
    }

    /// One byte past the last slot, for a given stride
    pub fn end(&self, stride: u32) -> Address {
        self.entries.index(u64::from(self.capacity), u64::from(stride))
    }
}

/// One asset found in a pool, without its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetDescriptor {
    pub name: String,
    pub type_name: &'static str,
    /// Ordinal of the owning pool
    pub type_index: u32,
    pub element_size: u32,
    pub slot: u32,
    pub header_address: Address,
}

/// Enumerate the live assets of the pool served by `handler`.
///
/// Fails with [`Error::LayoutMismatch`] when the pool's recorded element size
/// differs from the handler's header size. Descriptors come back in slot order.
pub fn load<R: ReadMemory + ?Sized>(
    reader: &R,
    title: &TitleDescriptor,
    catalog: &CatalogBase,
    handler: &dyn AssetHandler,
) -> Result<Vec<AssetDescriptor>> {
    let type_index = handler.type_index();
    let metadata = PoolMetadata::read(reader, title, catalog, type_index)?;

    let expected = handler.header_size();
    let stride = match metadata.element_size {
        Some(actual) if actual != expected => {
            return Err(Error::LayoutMismatch {
                pool: handler.type_name().to_string(),
                expected,
                actual,
            });
        }
        Some(actual) => actual,
        None => expected,
    };

    debug!(
        "Pool {} at {}: capacity {}, stride {}",
        handler.type_name(),
        metadata.entries,
        metadata.capacity,
        stride
    );

    walk_slots(reader, title, &metadata, stride, |slot, header, name_ptr| {
        let name = reader.read_cstring(name_ptr)?;
        Ok(AssetDescriptor {
            name,
            type_name: handler.type_name(),
            type_index,
            element_size: stride,
            slot,
            header_address: header,
        })
    })
}

/// Read the first live name in a pool, for sentinel checks
pub(crate) fn first_name<R: ReadMemory + ?Sized>(
    reader: &R,
    title: &TitleDescriptor,
    metadata: &PoolMetadata,
) -> Result<Option<String>> {
    if metadata.entries.is_null() {
        return Ok(None);
    }
    let name_ptr = reader.read_pointer(metadata.entries, title.pointer_width)?;
    if name_ptr.is_null() {
        return Ok(None);
    }
    reader.read_cstring(name_ptr).map(Some)
}

fn walk_slots<R, F>(
    reader: &R,
    title: &TitleDescriptor,
    metadata: &PoolMetadata,
    stride: u32,
    mut visit: F,
) -> Result<Vec<AssetDescriptor>>
where
    R: ReadMemory + ?Sized,
    F: FnMut(u32, Address, Address) -> Result<AssetDescriptor>,
{
    let mut assets = Vec::new();
    let capacity = u64::from(metadata.capacity);
    if capacity == 0 || metadata.entries.is_null() {
        return Ok(assets);
    }

    let width = title.pointer_width;
    let stride = u64::from(stride);
    let pool_end = metadata.end(stride as u32);

    let mut first = 0u64;
    while first < capacity {
        let count = SLOTS_PER_READ.min(capacity - first);
        let block_start = metadata.entries.index(first, stride);
        let block = reader.read_bytes(block_start, (count * stride) as usize)?;

        for i in 0..count {
            let at = (i * stride) as usize;
            let name_ptr = decode_pointer(&block[at..], width);
            if name_ptr.is_null() {
                continue;
            }
            if title.slot_policy == SlotPolicy::NullOrFreeListLink
                && name_ptr >= metadata.entries
                && name_ptr < pool_end
            {
                continue;
            }

            let slot = first + i;
            let header = block_start.add(i * stride);
            match visit(slot as u32, header, name_ptr) {
                Ok(asset) => assets.push(asset),
                // The slot may be recycled while we walk; its neighbours are still good
                Err(e) => warn!("Skipping slot {} at {}: {}", slot, header, e),
            }
        }
        first += count;
    }

    Ok(assets)
}

fn decode_pointer(bytes: &[u8], width: PointerWidth) -> Address {
    let value = match width {
        PointerWidth::Bits32 => u64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        PointerWidth::Bits64 => u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
    };
    Address::new(value)
}
