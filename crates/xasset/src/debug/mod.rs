//! Diagnostics for inspecting a title's pool table
//!
//! - Dumping live pool metadata with slot samples (`PoolDump`)

mod dump;

pub use dump::{PoolDump, PoolDumpEntry};
