//! In-memory stand-in for an attached process.
//!
//! Builds a sparse synthetic address space out of byte regions. Reads that
//! are not fully inside one region fail like an unmapped page would. The
//! reader can be mutated after construction to simulate a live target.

use std::sync::Mutex;

use super::{Address, ReadMemory};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Region {
    start: u64,
    data: Vec<u8>,
}

impl Region {
    fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }
}

#[derive(Debug, Clone, Default)]
struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    /// Place `data` at `address`, merging with any touching regions
    fn write(&mut self, address: u64, data: &[u8]) {
        let end = address + data.len() as u64;
        if let Some(region) = self
            .regions
            .iter_mut()
            .find(|r| r.start <= address && end <= r.end())
        {
            let at = (address - region.start) as usize;
            region.data[at..at + data.len()].copy_from_slice(data);
            return;
        }

        let (touching, mut kept): (Vec<Region>, Vec<Region>) = self
            .regions
            .drain(..)
            .partition(|r| r.start <= end && r.end() >= address);

        let start = touching.iter().map(|r| r.start).fold(address, u64::min);
        let stop = touching.iter().map(|r| r.end()).fold(end, u64::max);

        let mut merged = vec![0u8; (stop - start) as usize];
        for region in &touching {
            let at = (region.start - start) as usize;
            merged[at..at + region.data.len()].copy_from_slice(&region.data);
        }
        let at = (address - start) as usize;
        merged[at..at + data.len()].copy_from_slice(data);

        kept.push(Region {
            start,
            data: merged,
        });
        kept.sort_by_key(|r| r.start);
        self.regions = kept;
    }

    fn read(&self, address: u64, len: usize) -> Option<Vec<u8>> {
        let end = address.checked_add(len as u64)?;
        self.regions
            .iter()
            .find(|r| r.start <= address && end <= r.end())
            .map(|r| {
                let at = (address - r.start) as usize;
                r.data[at..at + len].to_vec()
            })
    }

    fn unmap(&mut self, address: u64) {
        self.regions
            .retain(|r| !(r.start <= address && address < r.end()));
    }

    fn extent_from(&self, base: u64) -> u64 {
        self.regions
            .iter()
            .map(|r| r.end())
            .max()
            .map(|end| end.saturating_sub(base))
            .unwrap_or(0)
    }
}

/// Builder for [`MockMemoryReader`]
#[derive(Debug, Clone)]
pub struct MockMemoryBuilder {
    base: u64,
    module_size: Option<u64>,
    map: RegionMap,
}

impl MockMemoryBuilder {
    /// Start an address space whose main module begins at `base`
    pub fn new(base: u64) -> Self {
        Self {
            base,
            module_size: None,
            map: RegionMap::default(),
        }
    }

    /// Module size; defaults to the extent of everything written past `base`
    pub fn module_size(mut self, size: u64) -> Self {
        self.module_size = Some(size);
        self
    }

    pub fn bytes(mut self, address: u64, data: &[u8]) -> Self {
        self.map.write(address, data);
        self
    }

    /// Reserve `len` zeroed bytes
    pub fn zeroed(self, address: u64, len: usize) -> Self {
        self.bytes(address, &vec![0u8; len])
    }

    pub fn u32(self, address: u64, value: u32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn i32(self, address: u64, value: i32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u64(self, address: u64, value: u64) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    /// NUL-terminated string
    pub fn cstring(self, address: u64, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.bytes(address, &data)
    }

    pub fn build(self) -> MockMemoryReader {
        let module_size = self
            .module_size
            .unwrap_or_else(|| self.map.extent_from(self.base));
        MockMemoryReader {
            base: self.base,
            module_size,
            map: Mutex::new(self.map),
        }
    }
}

/// Synthetic process image used by tests
#[derive(Debug)]
pub struct MockMemoryReader {
    base: u64,
    module_size: u64,
    map: Mutex<RegionMap>,
}

impl MockMemoryReader {
    /// Simulate the target writing to its own memory
    pub fn write_bytes(&self, address: u64, data: &[u8]) {
        self.map.lock().unwrap().write(address, data);
    }

    pub fn write_u64(&self, address: u64, value: u64) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_cstring(&self, address: u64, value: &str) {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.write_bytes(address, &data);
    }

    /// Simulate the target releasing the region containing `address`
    pub fn unmap(&self, address: u64) {
        self.map.lock().unwrap().unmap(address);
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>> {
        self.map
            .lock()
            .unwrap()
            .read(address.get(), len)
            .ok_or_else(|| Error::read_fault(address, len, "address not mapped"))
    }

    fn base_address(&self) -> Address {
        Address::new(self.base)
    }

    fn module_size(&self) -> u64 {
        self.module_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reads_little_endian() {
        let reader = MockMemoryBuilder::new(0x1000)
            .u32(0x1000, 0x04030201)
            .u64(0x1004, 0x0807060504030201)
            .build();

        assert_eq!(reader.read_u32(Address::new(0x1000)).unwrap(), 0x04030201);
        assert_eq!(
            reader.read_u64(Address::new(0x1004)).unwrap(),
            0x0807060504030201
        );
        assert_eq!(reader.module_size(), 12);
    }

    #[test]
    fn test_mock_read_out_of_bounds() {
        let reader = MockMemoryBuilder::new(0x1000)
            .bytes(0x1000, &[0x41, 0x42, 0x43, 0x44])
            .build();

        assert!(reader.read_bytes(Address::new(0x1002), 10).is_err());
        assert!(reader.read_bytes(Address::new(0x500), 4).is_err());
    }

    #[test]
    fn test_adjacent_writes_merge() {
        let reader = MockMemoryBuilder::new(0x1000)
            .bytes(0x1000, &[1, 2])
            .bytes(0x1002, &[3, 4])
            .build();

        assert_eq!(
            reader.read_bytes(Address::new(0x1000), 4).unwrap(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_cstring_at_region_end() {
        // Terminator is the very last mapped byte
        let reader = MockMemoryBuilder::new(0x2000).cstring(0x2000, "rawfile").build();
        assert_eq!(reader.read_cstring(Address::new(0x2000)).unwrap(), "rawfile");
    }

    #[test]
    fn test_cstring_unterminated_faults() {
        let reader = MockMemoryBuilder::new(0x2000).bytes(0x2000, b"abc").build();
        assert!(reader.read_cstring(Address::new(0x2000)).is_err());
        assert!(reader.read_cstring(Address::new(0x9000)).is_err());
    }

    #[test]
    fn test_cstring_capped_at_max_len() {
        let long = "a".repeat(super::super::MAX_STRING_LEN + 100);
        let reader = MockMemoryBuilder::new(0x3000).cstring(0x3000, &long).build();
        let read = reader.read_cstring(Address::new(0x3000)).unwrap();
        assert_eq!(read.len(), super::super::MAX_STRING_LEN);
    }

    #[test]
    fn test_mutation_and_unmap() {
        let reader = MockMemoryBuilder::new(0x1000).cstring(0x1000, "old").build();
        reader.write_cstring(0x1000, "new");
        assert_eq!(reader.read_cstring(Address::new(0x1000)).unwrap(), "new");

        reader.unmap(0x1000);
        assert!(reader.read_bytes(Address::new(0x1000), 1).is_err());
    }
}
