//! Locating and validating a title's asset catalog

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory, ReadMemoryExt, Signature};
use crate::pool::{self, PoolMetadata};
use crate::title::{SignatureSpec, TitleDescriptor};

/// Validated addresses from which every pool is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogBase {
    pub pools: Address,
    /// Capacity table, for layouts that keep capacities apart from the pools
    pub pool_sizes: Option<Address>,
}

pub struct CatalogLocator<'a, R: ?Sized> {
    reader: &'a R,
    title: &'static TitleDescriptor,
}

impl<'a, R: ReadMemory + ?Sized> CatalogLocator<'a, R> {
    pub fn new(reader: &'a R, title: &'static TitleDescriptor) -> Self {
        Self { reader, title }
    }

    /// Scan the module for the title's signatures and validate the result.
    ///
    /// Signatures are tried in order and the first one with a match decides
    /// the candidate. No match at all is [`Error::GameNotSupported`]; a
    /// candidate whose sentinel does not check out is [`Error::ValidationFailed`].
    pub fn locate(&self) -> Result<CatalogBase> {
        for spec in self.title.signatures {
            let signature = Signature::parse(spec.pattern)?;
            let Some(hit) = self.reader.scan_module(&signature, true).next() else {
                debug!("{}: no match for {}", self.title.name, spec.pattern);
                continue;
            };
            debug!("{}: signature matched at {}", self.title.name, hit);

            let candidate = self.derive(spec, hit).map_err(|e| {
                warn!("{}: could not derive catalog from {}: {}", self.title.name, hit, e);
                self.validation_failed(format!("unreadable derivation at {hit}"))
            })?;

            self.validate(&candidate)?;
            info!(
                "{}: asset pools at {} (validated)",
                self.title.name, candidate.pools
            );
            return Ok(candidate);
        }

        Err(Error::GameNotSupported {
            title: self.title.name.to_string(),
        })
    }

    fn derive(&self, spec: &SignatureSpec, hit: Address) -> Result<CatalogBase> {
        let pools = spec.pools.resolve(self.reader, hit)?;
        let pool_sizes = spec
            .pool_sizes
            .map(|d| d.resolve(self.reader, hit))
            .transpose()?;
        debug!("{}: candidate pools {}, sizes {:?}", self.title.name, pools, pool_sizes);
        Ok(CatalogBase { pools, pool_sizes })
    }

    /// Check the sentinel asset name through `candidate`
    pub fn validate(&self, candidate: &CatalogBase) -> Result<()> {
        let sentinel = self.title.sentinel;
        let found = PoolMetadata::read(self.reader, self.title, candidate, sentinel.type_index)
            .and_then(|metadata| pool::first_name(self.reader, self.title, &metadata));

        match found {
            Ok(Some(name)) if name == sentinel.expected => Ok(()),
            Ok(Some(name)) => Err(self.validation_failed(name)),
            Ok(None) => Err(self.validation_failed("<empty pool>".to_string())),
            Err(e) => Err(self.validation_failed(format!("<unreadable: {e}>"))),
        }
    }

    fn validation_failed(&self, found: String) -> Error {
        Error::ValidationFailed {
            title: self.title.name.to_string(),
            expected: self.title.sentinel.expected.to_string(),
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::mock::MockMemoryBuilder;
    use crate::title::black_ops2::{self, BLACK_OPS_2};
    use crate::title::modern_warfare::{self, MODERN_WARFARE};

    const MW_BASE: u64 = 0x1_4000_0000;
    const MW_SIG: [u8; 18] = [
        0x48, 0x8D, 0x04, 0x40, 0x4C, 0x8D, 0x8E, 0x00, 0x00, 0x00, 0x00, 0x4D, 0x8D, 0x0C, 0xC1,
        0x8D, 0x42, 0xFF,
    ];

    /// Module image with the MW signature at `code`, whose displacement points
    /// at a pool table `pools_rva` bytes past the base
    fn mw_image(code: u64, pools_rva: i32, sentinel: &str) -> MockMemoryBuilder {
        let mut sig = MW_SIG;
        sig[7..11].copy_from_slice(&pools_rva.to_le_bytes());

        let pools = MW_BASE + pools_rva as u64;
        let xmodel_entries = MW_BASE + 0x50_0000;
        let name = MW_BASE + 0x60_0000;

        let mut record = Vec::new();
        record.extend_from_slice(&xmodel_entries.to_le_bytes());
        record.extend_from_slice(&0u64.to_le_bytes());
        record.extend_from_slice(&16u32.to_le_bytes());
        record.extend_from_slice(&0x100u32.to_le_bytes());

        MockMemoryBuilder::new(MW_BASE)
            .zeroed(MW_BASE, 0x1000)
            .bytes(code, &sig)
            .bytes(pools + u64::from(modern_warfare::XMODEL) * 24, &record)
            .u64(xmodel_entries, name)
            .cstring(name, sentinel)
            .module_size(0x1000)
    }

    #[test]
    fn test_locate_resolves_validated_catalog() {
        let reader = mw_image(MW_BASE + 0x400, 0x20_0000, "axis_guide_createfx").build();
        let catalog = CatalogLocator::new(&reader, &MODERN_WARFARE).locate().unwrap();

        assert_eq!(catalog.pools, Address::new(MW_BASE + 0x20_0000));
        assert_eq!(catalog.pool_sizes, None);
    }

    #[test]
    fn test_locate_wrong_sentinel() {
        let reader = mw_image(MW_BASE + 0x400, 0x20_0000, "axis_guide_createfy").build();
        let err = CatalogLocator::new(&reader, &MODERN_WARFARE).locate().unwrap_err();

        match err {
            Error::ValidationFailed {
                expected, found, ..
            } => {
                assert_eq!(expected, "axis_guide_createfx");
                assert_eq!(found, "axis_guide_createfy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_locate_no_signature() {
        let reader = MockMemoryBuilder::new(MW_BASE).zeroed(MW_BASE, 0x1000).build();
        let err = CatalogLocator::new(&reader, &MODERN_WARFARE).locate().unwrap_err();
        assert!(matches!(err, Error::GameNotSupported { .. }));
        assert!(err.is_session_fatal());
    }

    #[test]
    fn test_locate_unreadable_candidate() {
        // Displacement points at memory that is not mapped
        let mut sig = MW_SIG;
        sig[7..11].copy_from_slice(&0x70_0000i32.to_le_bytes());
        let reader = MockMemoryBuilder::new(MW_BASE)
            .zeroed(MW_BASE, 0x1000)
            .bytes(MW_BASE + 0x10, &sig)
            .build();

        let err = CatalogLocator::new(&reader, &MODERN_WARFARE).locate().unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { .. }));
    }

    #[test]
    fn test_locate_bo2_absolute_derivation() {
        let base = 0x0040_0000u64;
        let code = base + 0x800;
        let pools = 0x0200_0000u64;
        let sizes = 0x0200_1000u64;
        let xmodel_pool = 0x0300_0000u64;
        let name = 0x0400_0000u64;

        let reader = MockMemoryBuilder::new(base)
            .zeroed(base, 0x1000)
            .u32(code - 0xB, pools as u32)
            .bytes(code, &[0x56, 0x51, 0xFF, 0xD2, 0x8B, 0xF0, 0x83, 0xC4, 0x04, 0x85, 0xF6])
            .u32(code + 0x3B, sizes as u32)
            .u32(pools + u64::from(black_ops2::XMODEL) * 4, xmodel_pool as u32)
            .u32(sizes + u64::from(black_ops2::XMODEL) * 4, 8)
            .u32(xmodel_pool, 0)
            .u32(xmodel_pool + 4, name as u32)
            .cstring(name, "defaultvehicle")
            .module_size(0x1000)
            .build();

        let catalog = CatalogLocator::new(&reader, &BLACK_OPS_2).locate().unwrap();
        assert_eq!(catalog.pools, Address::new(pools));
        assert_eq!(catalog.pool_sizes, Some(Address::new(sizes)));
    }
}
