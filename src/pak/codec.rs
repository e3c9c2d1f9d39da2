//! Fixed-width field encoding shared by the header and the directory table.
//!
//! All integers are little-endian `u32`. Names live in fixed-width,
//! null-padded fields.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{PakError, PakResult};

/// Read a little-endian `u32` at `pos`.
pub fn read_u32_le(buf: &[u8], pos: usize) -> PakResult<u32> {
    let field = pos
        .checked_add(4)
        .and_then(|end| buf.get(pos..end))
        .ok_or(PakError::OutOfBounds {
            pos,
            len: 4,
            available: buf.len(),
        })?;
    Ok(LittleEndian::read_u32(field))
}

/// Encode a `u32` as 4 little-endian bytes.
pub fn write_u32_le(value: u32) -> [u8; 4] {
    let mut out = [0u8; 4];
    LittleEndian::write_u32(&mut out, value);
    out
}

/// Read a null-terminated name from a `width`-byte field at `pos`.
///
/// Stops at the first null byte, or after `width` bytes if there is none.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_fixed_name(buf: &[u8], pos: usize, width: usize) -> PakResult<String> {
    let field = pos
        .checked_add(width)
        .and_then(|end| buf.get(pos..end))
        .ok_or(PakError::Truncated {
            pos,
            width,
            available: buf.len(),
        })?;
    let len = field.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(String::from_utf8_lossy(&field[..len]).into_owned())
}

/// Encode `name` into a `width`-byte, null-padded field.
///
/// Names longer than `width - 1` bytes are silently cut so the field always
/// keeps its terminator. This is lossy: two long names sharing a prefix end
/// up identical in the archive. See [`name_fits`] to detect it up front.
pub fn write_fixed_name(name: &str, width: usize) -> Vec<u8> {
    let mut field = vec![0u8; width];
    let bytes = name.as_bytes();
    let len = bytes.len().min(width.saturating_sub(1));
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Whether `name` survives [`write_fixed_name`] unchanged.
pub fn name_fits(name: &str, width: usize) -> bool {
    name.len() < width
}
