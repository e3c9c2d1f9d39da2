use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{PakError, PakResult};
use crate::io::ReadAt;

use super::index::PakIndex;
use super::parser::PakParser;
use super::structures::PakEntry;

/// PAK file extractor
pub struct PakExtractor<R: ReadAt> {
    parser: PakParser<R>,
}

impl<R: ReadAt> PakExtractor<R> {
    /// Open the archive behind `reader`
    pub async fn open(reader: Arc<R>) -> PakResult<Self> {
        Ok(Self {
            parser: PakParser::open(reader).await?,
        })
    }

    pub fn parser(&self) -> &PakParser<R> {
        &self.parser
    }

    /// All entries, in table order
    pub fn index(&self) -> &PakIndex {
        self.parser.index()
    }

    /// Entry names in table order, duplicates included
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.parser.index().iter().map(|e| e.name.as_str())
    }

    /// Extract file data to memory
    pub async fn extract_to_memory(&self, entry: &PakEntry) -> PakResult<Vec<u8>> {
        self.parser.read_entry_bytes(entry).await
    }

    /// Extract one entry under `dest`, creating parent directories as needed.
    ///
    /// An existing file at the target path is replaced. Returns the path written.
    pub async fn extract_to_file(&self, entry: &PakEntry, dest: &Path) -> PakResult<PathBuf> {
        let output_path = output_path(dest, &entry.name)?;

        // Create parent directories if needed
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PakError::io(format!("creating {}", parent.display()), e))?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        fs::write(&output_path, &data)
            .await
            .map_err(|e| PakError::io(format!("writing {}", output_path.display()), e))?;
        debug!("wrote {} ({} bytes)", output_path.display(), data.len());

        Ok(output_path)
    }

    /// Extract every entry under `dest`, in table order.
    ///
    /// Stops at the first entry that fails; files already written stay on disk.
    /// `on_entry` is called before each entry is extracted.
    pub async fn extract_all<F>(&self, dest: &Path, mut on_entry: F) -> PakResult<()>
    where
        F: FnMut(&PakEntry),
    {
        for entry in self.parser.index() {
            on_entry(entry);
            self.extract_to_file(entry, dest).await?;
        }
        Ok(())
    }

    /// Write one entry's bytes to `out` and flush it.
    pub async fn extract_to_writer<W>(&self, entry: &PakEntry, out: &mut W) -> PakResult<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let data = self.extract_to_memory(entry).await?;
        out.write_all(&data)
            .await
            .map_err(|e| PakError::io(format!("writing '{}'", entry.name), e))?;
        out.flush()
            .await
            .map_err(|e| PakError::io(format!("flushing '{}'", entry.name), e))
    }

    /// Write every entry to `out`, in table order.
    ///
    /// With more than one entry, each body is preceded by a `--- name ---`
    /// line. Everything goes through the one writer, so markers and bodies
    /// stay in order.
    pub async fn extract_all_to_writer<W>(&self, out: &mut W) -> PakResult<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let multiple_files = self.parser.index().len() > 1;
        for entry in self.parser.index() {
            if multiple_files {
                let marker = format!("--- {} ---\n", entry.name);
                out.write_all(marker.as_bytes())
                    .await
                    .map_err(|e| PakError::io("writing an entry marker", e))?;
            }
            self.extract_to_writer(entry, out).await?;
        }
        Ok(())
    }
}

/// Where an entry named `name` lands under `dest`.
///
/// The name is split on `/`. Empty and `.` segments are dropped; absolute
/// names and `..` segments are refused so nothing is written outside `dest`.
pub fn output_path(dest: &Path, name: &str) -> PakResult<PathBuf> {
    let unsafe_path = || PakError::UnsafePath(name.to_string());
    if name.starts_with('/') {
        return Err(unsafe_path());
    }

    let mut path = dest.to_path_buf();
    let mut pushed = false;
    for segment in name.split('/') {
        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => {
                    path.push(part);
                    pushed = true;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(unsafe_path());
                }
            }
        }
    }

    if !pushed {
        return Err(unsafe_path());
    }
    Ok(path)
}
