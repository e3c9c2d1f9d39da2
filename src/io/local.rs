use super::ReadAt;
use crate::error::{PakError, PakResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local file reader with random access support
///
/// Reads are positional, so no seek cursor is shared between calls.
pub struct LocalFileReader {
    #[cfg(any(unix, windows))]
    file: std::fs::File,
    #[cfg(not(any(unix, windows)))]
    file: std::sync::Mutex<std::fs::File>,
    path: PathBuf,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> PakResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| PakError::open(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| PakError::io(format!("reading metadata of {}", path.display()), e))?
            .len();

        #[cfg(not(any(unix, windows)))]
        let file = std::sync::Mutex::new(file);

        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> PakResult<usize> {
        let context = || format!("reading {} at offset {}", self.path.display(), offset);

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file
                .read_at(buf, offset)
                .map_err(|e| PakError::io(context(), e))
        }

        #[cfg(windows)]
        {
            // seek_read moves the handle's cursor, but every read names its own offset
            use std::os::windows::fs::FileExt;
            self.file
                .seek_read(buf, offset)
                .map_err(|e| PakError::io(context(), e))
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = self
                .file
                .lock()
                .map_err(|_| PakError::io(context(), std::io::Error::other("poisoned lock")))?;
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| PakError::io(context(), e))?;
            file.read(buf).map_err(|e| PakError::io(context(), e))
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
