mod local;
mod memory;

pub use local::LocalFileReader;
pub use memory::MemoryReader;

use async_trait::async_trait;

use crate::error::{PakError, PakResult};

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer, returning how many bytes were read
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> PakResult<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fail unless `len` bytes starting at `offset` lie inside the source.
    ///
    /// Call before sizing a buffer from untrusted offsets and lengths.
    fn check_range(&self, offset: u64, len: u64) -> PakResult<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(PakError::io(
                format!(
                    "reading {} bytes at offset {} ({} bytes available)",
                    len,
                    offset,
                    self.size().saturating_sub(offset)
                ),
                std::io::ErrorKind::UnexpectedEof.into(),
            )),
        }
    }

    /// Fill the whole buffer from `offset`, failing on a short read
    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> PakResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_at(offset + filled as u64, &mut buf[filled..]).await?;
            if n == 0 {
                // The source shrank under us, or a reader returned short
                self.check_range(offset, buf.len() as u64)?;
                return Err(PakError::io(
                    format!("reading {} bytes at offset {}", buf.len(), offset),
                    std::io::ErrorKind::UnexpectedEof.into(),
                ));
            }
            filled += n;
        }
        Ok(())
    }
}
