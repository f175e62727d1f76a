//! Compressed payload containers

use flate2::{Decompress, FlushDecompress, Status};
use thiserror::Error;

/// Length of the zlib header that precedes the deflate stream
pub const ZLIB_HEADER_LEN: usize = 2;

/// Length of the big-endian Adler-32 trailer
const ADLER_LEN: usize = 4;

const GROW_STEP: usize = 64 * 1024;

/// Largest output a single container may inflate to
pub const MAX_INFLATED_LEN: usize = 256 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InflateError {
    #[error("corrupt deflate stream: {0}")]
    Corrupt(String),

    #[error("deflate stream is truncated after {consumed} of {available} bytes")]
    Truncated { consumed: usize, available: usize },

    #[error("{0} unexpected bytes after the end of the deflate stream")]
    TrailingBytes(usize),

    #[error("adler-32 mismatch: stored {stored:08x}, computed {computed:08x}")]
    Checksum { stored: u32, computed: u32 },

    #[error("inflated output exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Inflate the body of a zlib container whose 2-byte header was already skipped.
///
/// `size_hint` only sizes the first allocation; the output grows as needed up
/// to `max_len` bytes. After the deflate stream ends the remaining input must
/// be empty or exactly the Adler-32 of the output. Any other leftover means
/// the declared length does not describe this stream and is rejected.
pub fn inflate_zlib_body(
    data: &[u8],
    size_hint: usize,
    max_len: usize,
) -> Result<Vec<u8>, InflateError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(size_hint.min(max_len).max(64));

    loop {
        if out.len() == out.capacity() {
            if out.len() > max_len {
                return Err(InflateError::TooLarge { limit: max_len });
            }
            let room = (max_len + 1 - out.len()).max(1);
            out.reserve(out.capacity().clamp(GROW_STEP, 16 * GROW_STEP).min(room));
        }

        let in_before = inflater.total_in();
        let out_before = inflater.total_out();
        let consumed = in_before as usize;

        let status = inflater
            .decompress_vec(&data[consumed..], &mut out, FlushDecompress::None)
            .map_err(|e| InflateError::Corrupt(e.to_string()))?;

        if out.len() > max_len {
            return Err(InflateError::TooLarge { limit: max_len });
        }
        if status == Status::StreamEnd {
            break;
        }

        // No progress with output room left: the input ran out mid-stream
        let stalled = inflater.total_in() == in_before && inflater.total_out() == out_before;
        if stalled && out.len() < out.capacity() {
            return Err(InflateError::Truncated {
                consumed: inflater.total_in() as usize,
                available: data.len(),
            });
        }
    }

    let trailer = &data[inflater.total_in() as usize..];
    match trailer.len() {
        0 => Ok(out),
        ADLER_LEN => {
            let stored = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
            let computed = adler::adler32_slice(&out);
            if stored != computed {
                return Err(InflateError::Checksum { stored, computed });
            }
            Ok(out)
        }
        n => Err(InflateError::TrailingBytes(n)),
    }
}
