use log::debug;

use super::structures::{ENTRY_SIZE, PakEntry};
use crate::error::{PakError, PakResult};

/// The directory table: every entry in the order it appears in the archive.
///
/// Nothing is sorted or deduplicated; a name may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PakIndex {
    entries: Vec<PakEntry>,
}

impl PakIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `entry_count` consecutive 64-byte records from `data`.
    pub fn parse(data: &[u8], entry_count: usize) -> PakResult<Self> {
        let needed = entry_count
            .checked_mul(ENTRY_SIZE)
            .ok_or_else(|| PakError::InvalidFormat(format!("{entry_count} entries overflow")))?;
        if data.len() < needed {
            return Err(PakError::OutOfBounds {
                pos: 0,
                len: needed,
                available: data.len(),
            });
        }

        let mut entries = Vec::with_capacity(entry_count);
        for i in 0..entry_count {
            let entry = PakEntry::from_bytes(data, i * ENTRY_SIZE)?;
            debug!(
                "entry {i}: {} at {} ({} bytes)",
                entry.name, entry.offset, entry.length
            );
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Encode the table, one 64-byte record per entry.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for entry in &self.entries {
            entry.write_to(&mut out);
        }
        out
    }

    /// Size of the encoded table; this is the header's `index_length`
    pub fn byte_len(&self) -> usize {
        self.entries.len() * ENTRY_SIZE
    }

    pub fn push(&mut self, entry: PakEntry) {
        self.entries.push(entry);
    }

    /// First entry stored under exactly `name`
    pub fn find(&self, name: &str) -> Option<&PakEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PakEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry lengths
    pub fn total_length(&self) -> u64 {
        self.entries.iter().map(|e| e.length as u64).sum()
    }
}

impl From<Vec<PakEntry>> for PakIndex {
    fn from(entries: Vec<PakEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a PakIndex {
    type Item = &'a PakEntry;
    type IntoIter = std::slice::Iter<'a, PakEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
