//! PAK archive reading and writing.
//!
//! ## Architecture
//!
//! - [`codec`]: fixed-width little-endian integers and null-padded names
//! - [`structures`]: the header and directory entry records
//! - [`index`]: the directory table as an ordered list of entries
//! - [`parser`]: opening an archive and random-access entry reads
//! - [`writer`]: building an archive from files on disk or in memory
//! - [`extractor`]: listing and extracting for end users
//!
//! ## PAK Format Overview
//!
//! | Offset | Size           | Field                                   |
//! |--------|----------------|-----------------------------------------|
//! | 0      | 4              | magic, `PACK`                           |
//! | 4      | 4              | index offset                            |
//! | 8      | 4              | index length, a multiple of 64          |
//! | 12     | ...            | file bodies, back to back               |
//! | index  | index length   | directory table, 64 bytes per entry     |
//!
//! Each directory entry is a 56-byte null-padded name followed by the data's
//! offset and length. Integers are little-endian `u32`. Bodies carry no
//! framing of their own; the table is the only map of the archive.
//!
//! ## Limitations
//!
//! - Names are capped at 55 bytes; longer ones are cut when written
//! - Offsets are 32-bit, so archives stop at 4 GiB
//! - No compression, permissions, or timestamps

pub mod codec;
mod extractor;
mod index;
mod parser;
mod structures;
mod writer;

pub use extractor::{PakExtractor, output_path};
pub use index::PakIndex;
pub use parser::PakParser;
pub use structures::*;
pub use writer::{
    FinishedPak, PakWriter, WriteOptions, archive_name, collect_source_files, create_pak,
};
