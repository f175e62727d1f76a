//! Static per-title configuration.
//!
//! A [`TitleDescriptor`] holds everything needed to find and walk the asset
//! pools of one game: the process names it runs under, the code signatures
//! that reference the pool tables, the pool table layout, the asset type
//! ordinals, and the sentinel used to confirm a scan result.

pub mod black_ops2;
pub mod modern_warfare;

use std::fmt;

use crate::asset::AssetHandler;
use crate::error::Result;
use crate::memory::{Address, PointerWidth, ReadMemory};
use crate::process::process_name_matches;

/// How a catalog address is derived from a signature match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressDerivation {
    /// A 32-bit absolute address stored at `match + offset`
    Absolute32 { offset: i64 },
    /// A 32-bit displacement stored at `match + offset`, relative to the module base
    ModuleRelative32 { offset: i64 },
}

impl AddressDerivation {
    pub fn resolve<R: ReadMemory + ?Sized>(&self, reader: &R, hit: Address) -> Result<Address> {
        match *self {
            AddressDerivation::Absolute32 { offset } => {
                let value = reader.read_u32(hit.offset(offset))?;
                Ok(Address::new(u64::from(value)))
            }
            AddressDerivation::ModuleRelative32 { offset } => {
                let value = reader.read_i32(hit.offset(offset))?;
                Ok(reader.base_address().offset(i64::from(value)))
            }
        }
    }
}

/// A code signature and the catalog addresses derived from its first match
#[derive(Debug, Clone, Copy)]
pub struct SignatureSpec {
    pub pattern: &'static str,
    pub pools: AddressDerivation,
    /// Separate capacity table, for layouts that keep one
    pub pool_sizes: Option<AddressDerivation>,
}

/// Shape of the pool table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolLayout {
    /// Array of 24-byte records: entries, free head, capacity, element size
    Records,
    /// Array of pool pointers plus a parallel capacity table. Each pool starts
    /// with a free-list head and its slots follow immediately after.
    PointerTable,
}

/// Which slots of a pool hold live assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPolicy {
    /// Every slot with a non-null name pointer
    #[default]
    NullName,
    /// As `NullName`, and also skip slots whose first field points back into
    /// the pool's own slot range (free-list links)
    NullOrFreeListLink,
}

/// Asset type ordinal as used by the title's pool table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetType {
    pub name: &'static str,
    pub index: u32,
}

impl AssetType {
    pub const fn new(name: &'static str, index: u32) -> Self {
        Self { name, index }
    }
}

/// Confirms a candidate catalog: the first slot of `type_index` names `expected`
#[derive(Debug, Clone, Copy)]
pub struct Sentinel {
    pub type_index: u32,
    pub expected: &'static str,
}

pub struct TitleDescriptor {
    /// Short identifier used on the command line
    pub id: &'static str,
    pub name: &'static str,
    pub process_names: &'static [&'static str],
    pub pointer_width: PointerWidth,
    pub signatures: &'static [SignatureSpec],
    pub layout: PoolLayout,
    pub slot_policy: SlotPolicy,
    pub asset_types: &'static [AssetType],
    pub sentinel: Sentinel,
    pub handlers: &'static [&'static dyn AssetHandler],
}

impl TitleDescriptor {
    /// First declared name for an ordinal
    pub fn asset_type(&self, index: u32) -> Option<&'static AssetType> {
        self.asset_types.iter().find(|t| t.index == index)
    }

    pub fn asset_type_by_name(&self, name: &str) -> Option<&'static AssetType> {
        self.asset_types
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn handler(&self, type_index: u32) -> Option<&'static dyn AssetHandler> {
        self.handlers
            .iter()
            .copied()
            .find(|h| h.type_index() == type_index)
    }

    /// Largest ordinal in the type table
    pub fn max_type_index(&self) -> u32 {
        self.asset_types.iter().map(|t| t.index).max().unwrap_or(0)
    }

    pub fn matches_process(&self, process_name: &str) -> bool {
        self.process_names
            .iter()
            .any(|n| process_name_matches(process_name, n))
    }
}

impl fmt::Debug for TitleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("process_names", &self.process_names)
            .field("layout", &self.layout)
            .field("asset_types", &self.asset_types.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

static TITLES: &[&TitleDescriptor] = &[&black_ops2::BLACK_OPS_2, &modern_warfare::MODERN_WARFARE];

/// Every supported title
pub fn registry() -> &'static [&'static TitleDescriptor] {
    TITLES
}

/// Title whose process list contains `process_name`
pub fn find_by_process_name(process_name: &str) -> Option<&'static TitleDescriptor> {
    TITLES.iter().copied().find(|t| t.matches_process(process_name))
}

/// Title by id (`bo2`) or display name, case-insensitive
pub fn find_by_id(id: &str) -> Option<&'static TitleDescriptor> {
    TITLES
        .iter()
        .copied()
        .find(|t| t.id.eq_ignore_ascii_case(id) || t.name.eq_ignore_ascii_case(id))
}

/// Process names of every registered title
pub fn all_process_names() -> Vec<&'static str> {
    TITLES
        .iter()
        .flat_map(|t| t.process_names.iter().copied())
        .collect()
}
