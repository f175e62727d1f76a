//! Byte signatures with wildcards and the lazy scanner that finds them.

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use tracing::debug;

use super::{Address, ReadMemory};
use crate::error::{Error, Result};

/// Bytes fetched from the target per scan step (4MB)
pub const SCAN_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// A byte sequence where `None` positions match any byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    bytes: Vec<Option<u8>>,
    /// First non-wildcard position, used to skip ahead with memchr
    anchor: Option<(usize, u8)>,
}

impl Signature {
    pub fn new(bytes: Vec<Option<u8>>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidSignature("Signature pattern is empty".to_string()));
        }

        let anchor = bytes
            .iter()
            .enumerate()
            .find_map(|(i, b)| b.map(|value| (i, value)));

        Ok(Self { bytes, anchor })
    }

    /// Parse the usual `"48 8D ?? ?? 4C"` notation
    pub fn parse(pattern: &str) -> Result<Self> {
        Self::new(parse_pattern(pattern)?)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether `window` starts with a match. Wildcards accept anything.
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= self.bytes.len()
            && self
                .bytes
                .iter()
                .zip(window)
                .all(|(expected, actual)| expected.is_none_or(|value| value == *actual))
    }

    /// First match at or after `pos`
    fn find_from(&self, buffer: &[u8], pos: usize) -> Option<usize> {
        let len = self.bytes.len();
        if buffer.len() < len || pos > buffer.len() - len {
            return None;
        }
        let last = buffer.len() - len;

        let Some((anchor_at, anchor_byte)) = self.anchor else {
            // All wildcards: every position matches
            return Some(pos);
        };

        let mut candidate = pos;
        while candidate <= last {
            let haystack = &buffer[candidate + anchor_at..=last + anchor_at];
            let hit = memchr::memchr(anchor_byte, haystack)?;
            let start = candidate + hit;
            if self.matches(&buffer[start..]) {
                return Some(start);
            }
            candidate = start + 1;
        }

        None
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pattern(&self.bytes))
    }
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<Option<u8>>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            bytes.push(None);
            continue;
        }

        let value = u8::from_str_radix(token, 16).map_err(|e| {
            Error::InvalidSignature(format!("Invalid signature token '{}': {}", token, e))
        })?;
        bytes.push(Some(value));
    }

    if bytes.is_empty() {
        return Err(Error::InvalidSignature("Signature pattern is empty".to_string()));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[Option<u8>]) -> String {
    bytes
        .iter()
        .map(|b| match b {
            Some(value) => format!("{:02X}", value),
            None => "??".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lazy signature scan over `[start, end)` of a foreign address space.
///
/// Memory is fetched in [`SCAN_CHUNK_SIZE`] steps, keeping the last
/// `signature.len() - 1` bytes of each step so matches straddling a chunk
/// boundary are still found. A chunk that cannot be read is skipped and
/// counted; matches never span it. The iterator yields addresses in
/// ascending order and cannot be restarted.
pub struct PatternScan<'a, R: ?Sized> {
    reader: &'a R,
    signature: &'a Signature,
    cursor: Address,
    end: Address,
    chunk_size: usize,
    buffer: Vec<u8>,
    buffer_base: Address,
    pos: usize,
    first_only: bool,
    done: bool,
    skipped_chunks: usize,
}

impl<'a, R: ReadMemory + ?Sized> PatternScan<'a, R> {
    pub(crate) fn new(
        reader: &'a R,
        signature: &'a Signature,
        start: Address,
        end: Address,
        first_only: bool,
    ) -> Self {
        Self {
            reader,
            signature,
            cursor: start,
            end,
            chunk_size: SCAN_CHUNK_SIZE,
            buffer: Vec::new(),
            buffer_base: start,
            pos: 0,
            first_only,
            done: start >= end,
            skipped_chunks: 0,
        }
    }

    /// Override the read step. Mostly useful to exercise chunk boundaries.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Number of chunks that could not be read so far
    pub fn skipped_chunks(&self) -> usize {
        self.skipped_chunks
    }

    /// Fetch the next chunk, carrying over bytes not yet fully examined.
    /// Returns `false` once the range is exhausted.
    fn refill(&mut self) -> bool {
        if self.cursor >= self.end {
            return false;
        }

        let keep = self.signature.len() - 1;
        let tail_start = self
            .buffer
            .len()
            .saturating_sub(keep)
            .max(self.pos)
            .min(self.buffer.len());

        let remaining = self.end.get() - self.cursor.get();
        let read_size = (remaining as usize).min(self.chunk_size);
        let address = self.cursor;
        self.cursor = self.cursor.add(read_size as u64);

        match self.reader.read_bytes(address, read_size) {
            Ok(chunk) => {
                self.buffer_base = self.buffer_base.add(tail_start as u64);
                self.buffer.drain(..tail_start);
                self.buffer.extend_from_slice(&chunk);
            }
            Err(e) => {
                debug!(
                    "Pattern scan skipped {:#x} bytes at {}: {}",
                    read_size, address, e
                );
                self.skipped_chunks += 1;
                self.buffer.clear();
                self.buffer_base = self.cursor;
            }
        }
        self.pos = 0;
        true
    }
}

impl<R: ReadMemory + ?Sized> Iterator for PatternScan<'_, R> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        while !self.done {
            if let Some(found) = self.signature.find_from(&self.buffer, self.pos) {
                self.pos = found + 1;
                if self.first_only {
                    self.done = true;
                }
                return Some(self.buffer_base.add(found as u64));
            }

            // Everything that can still start a match lives in the tail
            self.pos = self
                .buffer
                .len()
                .saturating_sub(self.signature.len() - 1)
                .max(self.pos);

            if !self.refill() {
                self.done = true;
            }
        }

        None
    }
}

impl<R: ReadMemory + ?Sized> FusedIterator for PatternScan<'_, R> {}
