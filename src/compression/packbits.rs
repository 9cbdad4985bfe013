//! Handler for PackBits run-length encoded data

use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// PackBits handler (compression code 32773)
///
/// Each run starts with a signed header byte `n`: `0..=127` copies the next
/// `n + 1` bytes literally, `-127..=-1` repeats the next byte `1 - n` times,
/// and `-128` is a no-op.
pub struct PackBitsHandler;

impl CompressionHandler for PackBitsHandler {
    fn decompress(&self, data: &[u8], expected_size: usize) -> TiffResult<Vec<u8>> {
        let mut out = Vec::with_capacity(expected_size);
        let mut pos = 0;

        while pos < data.len() && out.len() < expected_size {
            let header = data[pos] as i8;
            pos += 1;

            match header {
                0..=127 => {
                    let count = header as usize + 1;
                    let literal = data.get(pos..pos + count).ok_or_else(|| {
                        TiffError::GenericError(format!("PackBits literal run of {} bytes truncated", count))
                    })?;
                    out.extend_from_slice(literal);
                    pos += count;
                }
                -128 => {}
                _ => {
                    let count = 1 - header as isize;
                    let value = *data.get(pos).ok_or_else(|| {
                        TiffError::GenericError("PackBits repeat run truncated".to_string())
                    })?;
                    out.resize(out.len() + count as usize, value);
                    pos += 1;
                }
            }
        }

        out.truncate(expected_size);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "PackBits"
    }

    fn code(&self) -> u16 {
        32773
    }
}
