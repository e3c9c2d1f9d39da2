//! Low-level PAK archive parser.
//!
//! This module handles opening an archive from any source that implements
//! the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! 1. Read the 12-byte header and check the `PACK` magic
//! 2. Work out the entry count from the index length
//! 3. Read the whole directory table in one go and decode it
//! 4. For extraction, read each entry's bytes straight from its offset
//!
//! Every step happens once in [`PakParser::open`]; a parser that exists has
//! a validated header and a loaded index.

use log::debug;
use std::sync::Arc;

use crate::error::{PakError, PakResult};
use crate::io::ReadAt;

use super::index::PakIndex;
use super::structures::{HEADER_SIZE, PakEntry, PakHeader};

/// An opened archive, ready for random-access reads.
///
/// ## Example
///
/// ```ignore
/// let parser = PakParser::open(reader).await?;
/// for entry in parser.index() {
///     let data = parser.read_entry_bytes(entry).await?;
///     // ...
/// }
/// ```
pub struct PakParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    header: PakHeader,
    index: PakIndex,
}

impl<R: ReadAt> PakParser<R> {
    /// Validate the header and load the directory table.
    ///
    /// # Errors
    ///
    /// Returns [`PakError::InvalidFormat`] if the magic is wrong or the index
    /// length is not a whole number of entries. Nothing past the header is
    /// read in that case. A table that runs past the end of the source fails
    /// as an I/O error.
    pub async fn open(reader: Arc<R>) -> PakResult<Self> {
        let header = Self::read_header(&*reader).await?;
        let index = Self::read_index(&*reader, &header).await?;
        Ok(Self {
            reader,
            header,
            index,
        })
    }

    async fn read_header(reader: &R) -> PakResult<PakHeader> {
        let len = (reader.size() as usize).min(HEADER_SIZE);
        let mut buf = vec![0u8; len];
        reader.read_exact_at(0, &mut buf).await?;
        let header = PakHeader::from_bytes(&buf)?;
        debug!(
            "header: index at {} ({} bytes, {} entries)",
            header.index_offset,
            header.index_length,
            header.entry_count()
        );
        Ok(header)
    }

    async fn read_index(reader: &R, header: &PakHeader) -> PakResult<PakIndex> {
        reader.check_range(header.index_offset as u64, header.index_length as u64)?;
        let mut table = vec![0u8; header.index_length as usize];
        reader
            .read_exact_at(header.index_offset as u64, &mut table)
            .await?;
        PakIndex::parse(&table, header.entry_count())
    }

    /// Read exactly `entry.length` bytes from `entry.offset`.
    ///
    /// Offsets are trusted as stored; entries need not be contiguous.
    ///
    /// # Errors
    ///
    /// Fails with an I/O error if the entry runs past the end of the archive.
    pub async fn read_entry_bytes(&self, entry: &PakEntry) -> PakResult<Vec<u8>> {
        let with_entry = |e: PakError| match e {
            PakError::Io { source, .. } => PakError::io(
                format!(
                    "reading '{}' ({} bytes at offset {})",
                    entry.name, entry.length, entry.offset
                ),
                source,
            ),
            other => other,
        };

        self.reader
            .check_range(entry.offset as u64, entry.length as u64)
            .map_err(with_entry)?;

        let mut buf = vec![0u8; entry.length as usize];
        self.reader
            .read_exact_at(entry.offset as u64, &mut buf)
            .await
            .map_err(with_entry)?;
        Ok(buf)
    }

    pub fn header(&self) -> &PakHeader {
        &self.header
    }

    pub fn index(&self) -> &PakIndex {
        &self.index
    }
}
