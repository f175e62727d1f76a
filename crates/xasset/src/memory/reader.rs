use zerocopy::FromBytes;

use super::Address;
use super::pattern::{PatternScan, Signature};
use crate::error::{Error, Result};

/// Longest string `read_cstring` will return
pub const MAX_STRING_LEN: usize = 1024;

/// Bytes requested per step while reading a string
const STRING_CHUNK: usize = 64;

/// Width of pointers stored in the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    pub const fn size(self) -> u64 {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

/// Read-only access to the address space of an attached process.
///
/// Implementations only ever read. Every accessor either returns the
/// requested bytes or fails with [`Error::ReadFault`].
pub trait ReadMemory {
    /// Read exactly `len` bytes starting at `address`
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>>;

    /// Start of the target's main module
    fn base_address(&self) -> Address;

    /// Mapped size of the target's main module in bytes
    fn module_size(&self) -> u64;

    fn read_u32(&self, address: Address) -> Result<u32> {
        Ok(u32::from_le_bytes(read_array(self, address)?))
    }

    fn read_i32(&self, address: Address) -> Result<i32> {
        Ok(i32::from_le_bytes(read_array(self, address)?))
    }

    fn read_u64(&self, address: Address) -> Result<u64> {
        Ok(u64::from_le_bytes(read_array(self, address)?))
    }

    /// Read a pointer stored with the given width
    fn read_pointer(&self, address: Address, width: PointerWidth) -> Result<Address> {
        let value = match width {
            PointerWidth::Bits32 => u64::from(self.read_u32(address)?),
            PointerWidth::Bits64 => self.read_u64(address)?,
        };
        Ok(Address::new(value))
    }

    /// Read a NUL-terminated string of at most [`MAX_STRING_LEN`] bytes.
    ///
    /// Reads are issued in small steps that never cross a page boundary, so
    /// a short string at the very end of a mapping can still be read.
    fn read_cstring(&self, address: Address) -> Result<String> {
        read_cstring(self, address)
    }
}

fn read_array<R: ReadMemory + ?Sized, const N: usize>(
    reader: &R,
    address: Address,
) -> Result<[u8; N]> {
    let bytes = reader.read_bytes(address, N)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::read_fault(address, N, format!("short read of {} bytes", bytes.len())))
}

const PAGE_SIZE: u64 = 0x1000;

fn read_cstring<R: ReadMemory + ?Sized>(reader: &R, address: Address) -> Result<String> {
    let mut bytes: Vec<u8> = Vec::new();
    let mut cursor = address;

    while bytes.len() < MAX_STRING_LEN {
        let to_page_end = (PAGE_SIZE - cursor.get() % PAGE_SIZE) as usize;
        let len = to_page_end
            .min(STRING_CHUNK)
            .min(MAX_STRING_LEN - bytes.len());

        let chunk = match reader.read_bytes(cursor, len) {
            Ok(chunk) => chunk,
            // The mapping may end inside this chunk; fall back to single bytes
            Err(e) => {
                let partial = read_bytewise(reader, cursor, len);
                if partial.is_empty() {
                    return Err(e);
                }
                partial
            }
        };

        if let Some(end) = memchr::memchr(0, &chunk) {
            bytes.extend_from_slice(&chunk[..end]);
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        let read = chunk.len();
        bytes.extend_from_slice(&chunk);
        if read < len {
            // Unreadable memory before the terminator
            return Err(Error::read_fault(
                cursor.add(read as u64),
                1,
                "string runs into unreadable memory",
            ));
        }
        cursor = cursor.add(len as u64);
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read up to `len` bytes one at a time, stopping at the first fault or NUL
fn read_bytewise<R: ReadMemory + ?Sized>(reader: &R, address: Address, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for i in 0..len as u64 {
        match reader.read_bytes(address.add(i), 1) {
            Ok(byte) => {
                out.push(byte[0]);
                if byte[0] == 0 {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    out
}

/// Operations that are generic over their output type, available on every
/// reader including `dyn ReadMemory`.
pub trait ReadMemoryExt: ReadMemory {
    /// Read `size_of::<T>()` bytes and reinterpret them as a `#[repr(C)]` record
    fn read_struct<T: FromBytes>(&self, address: Address) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(address, size)?;
        T::read_from(bytes.as_slice())
            .ok_or_else(|| Error::read_fault(address, size, "short read for record"))
    }

    /// Scan `[start, end)` for `signature`, yielding match addresses lazily in
    /// ascending order
    fn find_pattern<'a>(
        &'a self,
        signature: &'a Signature,
        start: Address,
        end: Address,
        first_only: bool,
    ) -> PatternScan<'a, Self> {
        PatternScan::new(self, signature, start, end, first_only)
    }

    /// Scan the whole main module
    fn scan_module<'a>(&'a self, signature: &'a Signature, first_only: bool) -> PatternScan<'a, Self> {
        let start = self.base_address();
        let end = start.add(self.module_size());
        PatternScan::new(self, signature, start, end, first_only)
    }
}

impl<R: ReadMemory + ?Sized> ReadMemoryExt for R {}

impl<R: ReadMemory + ?Sized> ReadMemory for &R {
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, len)
    }

    fn base_address(&self) -> Address {
        (**self).base_address()
    }

    fn module_size(&self) -> u64 {
        (**self).module_size()
    }
}
