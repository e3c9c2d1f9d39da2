//! # runpak
//!
//! A Rust reader and writer for Quake II style `.pak` archives.
//!
//! A PAK file is a 12-byte header, the packed files back to back, and a
//! trailing directory of 64-byte entries giving each file's name, offset and
//! length. This crate lists, extracts and creates such archives.
//!
//! ## Features
//!
//! - List entries, optionally with offsets and lengths
//! - Extract everything into a directory, recreating subdirectories
//! - Extract entries to stdout
//! - Create an archive from a directory tree
//! - Parse archives from files or from memory
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use runpak::{LocalFileReader, PakExtractor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new(Path::new("pak0.pak"))?);
//!     let extractor = PakExtractor::open(reader).await?;
//!
//!     for name in extractor.list() {
//!         println!("{}", name);
//!     }
//!
//!     extractor.extract_all(Path::new("out"), |_| {}).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod pak;

pub use cli::Cli;
pub use error::{PakError, PakResult};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use pak::{PakEntry, PakExtractor, PakIndex, PakParser, PakWriter, WriteOptions};
