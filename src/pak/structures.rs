use log::trace;

use super::codec::{read_fixed_name, read_u32_le, write_fixed_name, write_u32_le};
use crate::error::{PakError, PakResult};

/// `PACK`, read as a little-endian u32
pub const PAK_MAGIC: u32 = u32::from_le_bytes(*b"PACK");

/// Header: magic + index offset + index length
pub const HEADER_SIZE: usize = 12;

/// One directory table record: name + offset + length
pub const ENTRY_SIZE: usize = 64;

/// Width of the null-padded name field
pub const NAME_WIDTH: usize = 56;

/// Longest name that is stored without truncation
pub const MAX_NAME_LEN: usize = NAME_WIDTH - 1;

const ENTRY_OFFSET_POS: usize = 56;
const ENTRY_LENGTH_POS: usize = 60;

/// Value written into the header's index fields until the writer backpatches them
pub const PLACEHOLDER: u32 = u32::MAX;

/// The fixed 12-byte archive header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PakHeader {
    pub magic: u32,
    pub index_offset: u32,
    pub index_length: u32,
}

impl PakHeader {
    /// Header with the real magic and the given index location
    pub fn new(index_offset: u32, index_length: u32) -> Self {
        Self {
            magic: PAK_MAGIC,
            index_offset,
            index_length,
        }
    }

    /// Header written before any file bodies, with both index fields unknown
    pub fn provisional() -> Self {
        Self::new(PLACEHOLDER, PLACEHOLDER)
    }

    /// Decode and validate a header.
    ///
    /// The magic is checked before anything else is decoded.
    pub fn from_bytes(data: &[u8]) -> PakResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(PakError::InvalidFormat(format!(
                "file is {} bytes, too small for the {HEADER_SIZE}-byte header",
                data.len()
            )));
        }

        let magic = read_u32_le(data, 0)?;
        if magic != PAK_MAGIC {
            return Err(PakError::InvalidFormat(format!(
                "bad magic {:02x?}, expected \"PACK\"",
                magic.to_le_bytes()
            )));
        }

        let header = Self {
            magic,
            index_offset: read_u32_le(data, 4)?,
            index_length: read_u32_le(data, 8)?,
        };
        trace!("{:?}", header);

        if header.index_length as usize % ENTRY_SIZE != 0 {
            return Err(PakError::InvalidFormat(format!(
                "index length {} is not a multiple of {ENTRY_SIZE}",
                header.index_length
            )));
        }

        Ok(header)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&write_u32_le(self.magic));
        out[4..8].copy_from_slice(&write_u32_le(self.index_offset));
        out[8..12].copy_from_slice(&write_u32_le(self.index_length));
        out
    }

    /// Number of directory entries the index holds
    pub fn entry_count(&self) -> usize {
        self.index_length as usize / ENTRY_SIZE
    }
}

/// Parsed directory table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Stored name, at most [`MAX_NAME_LEN`] bytes once read back
    pub name: String,
    /// Absolute position of the entry's data in the archive
    pub offset: u32,
    /// Size of the entry's data in bytes
    pub length: u32,
}

impl PakEntry {
    pub fn new(name: impl Into<String>, offset: u32, length: u32) -> Self {
        Self {
            name: name.into(),
            offset,
            length,
        }
    }

    /// Decode one 64-byte record starting at `pos`
    pub fn from_bytes(data: &[u8], pos: usize) -> PakResult<Self> {
        Ok(Self {
            name: read_fixed_name(data, pos, NAME_WIDTH)?,
            offset: read_u32_le(data, pos + ENTRY_OFFSET_POS)?,
            length: read_u32_le(data, pos + ENTRY_LENGTH_POS)?,
        })
    }

    /// Append this entry's 64-byte record to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&write_fixed_name(&self.name, NAME_WIDTH));
        out.extend_from_slice(&write_u32_le(self.offset));
        out.extend_from_slice(&write_u32_le(self.length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_spells_pack() {
        assert_eq!(PAK_MAGIC.to_le_bytes(), *b"PACK");
        let shifted = ((b'K' as u32) << 24)
            + ((b'C' as u32) << 16)
            + ((b'A' as u32) << 8)
            + b'P' as u32;
        assert_eq!(PAK_MAGIC, shifted);
    }

    #[test]
    fn header_layout() {
        let header = PakHeader::new(15, 128);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"PACK");
        assert_eq!(&bytes[4..8], &[15, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[128, 0, 0, 0]);
        assert_eq!(PakHeader::from_bytes(&bytes).unwrap(), header);
        assert_eq!(header.entry_count(), 2);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = PakHeader::new(12, 0).to_bytes();
        bytes[0..4].copy_from_slice(b"PK\x03\x04");
        assert!(matches!(
            PakHeader::from_bytes(&bytes),
            Err(PakError::InvalidFormat(_))
        ));
    }

    #[test]
    fn misaligned_index_rejected() {
        let bytes = PakHeader::new(12, 65).to_bytes();
        assert!(matches!(
            PakHeader::from_bytes(&bytes),
            Err(PakError::InvalidFormat(_))
        ));
    }

    #[test]
    fn short_header_rejected() {
        assert!(matches!(
            PakHeader::from_bytes(b"PACK"),
            Err(PakError::InvalidFormat(_))
        ));
    }

    #[test]
    fn entry_layout() {
        let entry = PakEntry::new("maps/base1.bsp", 0x0102_0304, 7);
        let mut out = Vec::new();
        entry.write_to(&mut out);
        assert_eq!(out.len(), ENTRY_SIZE);
        assert_eq!(&out[..14], b"maps/base1.bsp");
        assert!(out[14..56].iter().all(|&b| b == 0));
        assert_eq!(&out[56..60], &[4, 3, 2, 1]);
        assert_eq!(&out[60..64], &[7, 0, 0, 0]);
        assert_eq!(PakEntry::from_bytes(&out, 0).unwrap(), entry);
    }
}
