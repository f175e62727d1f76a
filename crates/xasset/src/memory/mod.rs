mod address;
pub mod pattern;
mod reader;

#[cfg(test)]
pub mod mock;

pub use address::Address;
pub use pattern::{PatternScan, SCAN_CHUNK_SIZE, Signature, format_pattern, parse_pattern};
pub use reader::{MAX_STRING_LEN, PointerWidth, ReadMemory, ReadMemoryExt};
