//! Building PAK archives.
//!
//! The index location is only known once every body has been written, so an
//! archive is written in one pass with a backpatch at the end:
//!
//! 1. a provisional header whose index fields are
//!    [`PLACEHOLDER`](super::structures::PLACEHOLDER)
//! 2. each file's bytes, appended in the order given
//! 3. the directory table, right after the last body
//! 4. the real index offset and length, written over the placeholders
//!
//! [`PakWriter`] is the building state; [`PakWriter::finish`] consumes it and
//! hands back a [`FinishedPak`]. If anything fails before that, the output
//! keeps its placeholder header and every reader rejects it.

use log::{debug, warn};
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio::io::{
    AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt, BufWriter,
};
use walkdir::WalkDir;

use crate::error::{PakError, PakResult};

use super::codec::{name_fits, write_u32_le};
use super::index::PakIndex;
use super::structures::{HEADER_SIZE, MAX_NAME_LEN, NAME_WIDTH, PakEntry, PakHeader};

/// Knobs for archive creation
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Fail with [`PakError::NameTooLong`] instead of truncating long names
    pub strict_names: bool,
}

/// An archive under construction
pub struct PakWriter<W> {
    inner: W,
    /// Where the next body starts. Tracked by hand, never asked of `inner`.
    cursor: u64,
    index: PakIndex,
    options: WriteOptions,
}

/// A finalized archive: header backpatched, table written, output flushed
#[derive(Debug)]
pub struct FinishedPak<W> {
    pub inner: W,
    pub header: PakHeader,
    pub index: PakIndex,
}

impl<W: AsyncWrite + AsyncSeek + Unpin> PakWriter<W> {
    /// Start an archive by writing the provisional header.
    pub async fn new(mut inner: W, options: WriteOptions) -> PakResult<Self> {
        inner
            .write_all(&PakHeader::provisional().to_bytes())
            .await
            .map_err(|e| PakError::io("writing the provisional header", e))?;
        Ok(Self {
            inner,
            cursor: HEADER_SIZE as u64,
            index: PakIndex::new(),
            options,
        })
    }

    /// Append an in-memory body under `name`.
    pub async fn append_bytes(&mut self, name: &str, data: &[u8]) -> PakResult<&PakEntry> {
        self.check_name(name)?;
        self.check_fits(data.len() as u64)?;
        self.inner
            .write_all(data)
            .await
            .map_err(|e| PakError::io(format!("writing '{name}'"), e))?;
        self.record(name, data.len() as u64)
    }

    /// Stream everything `source` yields into the archive under `name`.
    pub async fn append_reader<S>(&mut self, name: &str, source: &mut S) -> PakResult<&PakEntry>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        self.check_name(name)?;
        let length = tokio::io::copy(source, &mut self.inner)
            .await
            .map_err(|e| PakError::io(format!("copying '{name}' into the archive"), e))?;
        self.check_fits(length)?;
        self.record(name, length)
    }

    /// Append the file at `path`, stored under `name`.
    ///
    /// Only the bytes present when the file is opened are copied, so a file
    /// that keeps growing cannot stall the archive.
    pub async fn append_file(&mut self, name: &str, path: &Path) -> PakResult<&PakEntry> {
        let source = File::open(path)
            .await
            .map_err(|e| PakError::open(path, e))?;
        let len = source
            .metadata()
            .await
            .map_err(|e| PakError::io(format!("reading metadata of {}", path.display()), e))?
            .len();
        self.check_fits(len)?;
        self.append_reader(name, &mut source.take(len)).await
    }

    fn check_name(&self, name: &str) -> PakResult<()> {
        if name_fits(name, NAME_WIDTH) {
            return Ok(());
        }
        if self.options.strict_names {
            return Err(PakError::NameTooLong {
                name: name.to_string(),
                max: MAX_NAME_LEN,
            });
        }
        warn!(
            "'{name}' is {} bytes long; only the first {MAX_NAME_LEN} will be stored",
            name.len()
        );
        Ok(())
    }

    fn check_fits(&self, length: u64) -> PakResult<()> {
        let end = self.cursor + length;
        if end > u32::MAX as u64 {
            return Err(PakError::TooLarge(end));
        }
        Ok(())
    }

    fn record(&mut self, name: &str, length: u64) -> PakResult<&PakEntry> {
        let entry = PakEntry::new(
            name,
            u32::try_from(self.cursor).map_err(|_| PakError::TooLarge(self.cursor))?,
            u32::try_from(length).map_err(|_| PakError::TooLarge(length))?,
        );
        debug!("{} at {} ({} bytes)", entry.name, entry.offset, entry.length);
        self.cursor += length;
        self.index.push(entry);
        Ok(&self.index.entries()[self.index.len() - 1])
    }

    /// Entries appended so far
    pub fn index(&self) -> &PakIndex {
        &self.index
    }

    /// Write the directory table, backpatch the header, and flush.
    pub async fn finish(mut self) -> PakResult<FinishedPak<W>> {
        let index_offset =
            u32::try_from(self.cursor).map_err(|_| PakError::TooLarge(self.cursor))?;
        let table = self.index.serialize();
        let index_length =
            u32::try_from(table.len()).map_err(|_| PakError::TooLarge(table.len() as u64))?;

        self.inner
            .write_all(&table)
            .await
            .map_err(|e| PakError::io("writing the directory table", e))?;

        // Backpatch right after the magic
        self.inner
            .seek(SeekFrom::Start(4))
            .await
            .map_err(|e| PakError::io("seeking back to the header", e))?;
        let mut fields = [0u8; 8];
        fields[..4].copy_from_slice(&write_u32_le(index_offset));
        fields[4..].copy_from_slice(&write_u32_le(index_length));
        self.inner
            .write_all(&fields)
            .await
            .map_err(|e| PakError::io("backpatching the header", e))?;
        self.inner
            .flush()
            .await
            .map_err(|e| PakError::io("flushing the archive", e))?;

        debug!(
            "finished: {} entries, index at {index_offset} ({index_length} bytes)",
            self.index.len()
        );
        Ok(FinishedPak {
            inner: self.inner,
            header: PakHeader::new(index_offset, index_length),
            index: self.index,
        })
    }
}

/// Every regular file under `root`, sorted by name within each directory.
///
/// Paths keep `root` as their prefix; directories are skipped. Symlinks are
/// followed, so a linked file is packed under the link's name.
pub fn collect_source_files(root: &Path) -> PakResult<Vec<PathBuf>> {
    std::fs::metadata(root).map_err(|e| PakError::open(root, e))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry =
            entry.map_err(|e| PakError::io(format!("walking {}", root.display()), e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Name a walked path is stored under: the path as walked, minus `.` components
pub fn archive_name(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Pack every regular file under `source` into a new archive at `dest`.
///
/// `dest` itself is never packed, even when it lies under `source`.
/// `on_entry` is called after each file is appended.
pub async fn create_pak<F>(
    dest: &Path,
    source: &Path,
    options: WriteOptions,
    mut on_entry: F,
) -> PakResult<FinishedPak<()>>
where
    F: FnMut(&PakEntry),
{
    let files = collect_source_files(source)?;

    let file = File::create(dest)
        .await
        .map_err(|e| PakError::io(format!("creating {}", dest.display()), e))?;
    let mut writer = PakWriter::new(BufWriter::new(file), options).await?;

    let dest_canonical = tokio::fs::canonicalize(dest)
        .await
        .map_err(|e| PakError::io(format!("resolving {}", dest.display()), e))?;

    for path in &files {
        if is_same_file(path, &dest_canonical).await {
            debug!("skipping {}, it is the archive being written", path.display());
            continue;
        }
        let entry = writer.append_file(&archive_name(path), path).await?;
        on_entry(entry);
    }

    let finished = writer.finish().await?;
    finished
        .inner
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| PakError::io(format!("syncing {}", dest.display()), e))?;

    Ok(FinishedPak {
        inner: (),
        header: finished.header,
        index: finished.index,
    })
}

async fn is_same_file(path: &Path, canonical: &Path) -> bool {
    match tokio::fs::canonicalize(path).await {
        Ok(resolved) => resolved == canonical,
        Err(_) => false,
    }
}
