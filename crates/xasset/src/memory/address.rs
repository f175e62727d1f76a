//! Addresses in the attached process's address space
//!
//! Pointers read out of foreign memory are plain integers that only mean
//! something to the target process. They are wrapped in `Address` so they
//! can only be resolved through a [`ReadMemory`](super::ReadMemory).

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    pub const NULL: Address = Address(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Address `count` bytes further on
    pub const fn add(self, count: u64) -> Self {
        Self(self.0.wrapping_add(count))
    }

    /// Apply a signed displacement
    pub const fn offset(self, delta: i64) -> Self {
        Self(self.0.wrapping_add_signed(delta))
    }

    /// Address of element `index` in a table of `stride`-byte elements
    pub const fn index(self, index: u64, stride: u64) -> Self {
        Self(self.0.wrapping_add(index.wrapping_mul(stride)))
    }

    /// Bytes between `base` and `self`, or `None` if `self` is below `base`
    pub fn distance_from(self, base: Address) -> Option<u64> {
        self.0.checked_sub(base.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
