//! Decompression of `LZ77\x10` compressed buffers.
//!
//! The header is the 5 byte magic followed by a 24 bit little endian uncompressed size.
//! The body is a sequence of flag bytes, each describing the next 8 chunks MSB first:
//! a set bit is a big endian back reference token (12 bit distance - 1, 4 bit length - 3),
//! a clear bit is a literal byte.

use std::borrow::Cow;

use crate::GXError;

/// The magic bytes at the start of a compressed buffer.
pub const LZ77_MAGIC: &[u8; 5] = b"LZ77\x10";

const HEADER_SIZE: usize = 8;

/// Returns true if `src` starts with the LZ77 magic.
pub fn is_lz77(src: &[u8]) -> bool {
    src.starts_with(LZ77_MAGIC)
}

/// Reads the declared uncompressed size from the header.
pub fn uncompressed_size(src: &[u8]) -> Result<usize, GXError> {
    if !is_lz77(src) {
        return Err(GXError::NotLz77);
    }
    let header = src
        .get(4..HEADER_SIZE)
        .ok_or(GXError::TruncatedLz77 { offset: src.len() })?;
    let word = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    Ok((word >> 8) as usize)
}

/// Decompresses an LZ77 buffer.
///
/// Output stops as soon as the declared size is reached, even partway through a flag
/// byte or a back reference.
pub fn decompress(src: &[u8]) -> Result<Vec<u8>, GXError> {
    let size = uncompressed_size(src)?;
    let mut dst: Vec<u8> = Vec::with_capacity(size);
    let mut src_offset = HEADER_SIZE;

    let read_u8 = |offset: usize| -> Result<u8, GXError> {
        src.get(offset)
            .copied()
            .ok_or(GXError::TruncatedLz77 { offset })
    };

    while dst.len() < size {
        let flags = read_u8(src_offset)?;
        src_offset += 1;

        for bit in (0..8).rev() {
            if flags & (1 << bit) != 0 {
                let token = u16::from_be_bytes([read_u8(src_offset)?, read_u8(src_offset + 1)?]);
                src_offset += 2;

                let distance = (token & 0x0FFF) as usize + 1;
                let length = (token >> 12) as usize + 3;
                if distance > dst.len() {
                    return Err(GXError::InvalidLz77BackReference {
                        distance,
                        position: dst.len(),
                    });
                }

                // Byte by byte, since the source may overlap bytes written by this copy
                let start = dst.len() - distance;
                let length = length.min(size - dst.len());
                for i in 0..length {
                    let b = dst[start + i];
                    dst.push(b);
                }
            } else {
                dst.push(read_u8(src_offset)?);
                src_offset += 1;
            }

            if dst.len() >= size {
                break;
            }
        }
    }

    log::trace!(
        "lz77: {} compressed bytes -> {} bytes",
        src_offset,
        dst.len()
    );
    Ok(dst)
}

/// Decompresses `src` if it has an LZ77 header, otherwise returns it unchanged.
pub fn maybe_decompress(src: &[u8]) -> Result<Cow<'_, [u8]>, GXError> {
    if is_lz77(src) {
        Ok(Cow::Owned(decompress(src)?))
    } else {
        Ok(Cow::Borrowed(src))
    }
}
