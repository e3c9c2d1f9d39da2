//! Error types and the related `PakResult<T>`

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type PakResult<T> = Result<T, PakError>;

#[derive(Debug, Error)]
pub enum PakError {
    /// The archive does not follow the PAK layout (bad magic, misaligned index, ...)
    #[error("Invalid PAK archive: {0}")]
    InvalidFormat(String),

    /// A fixed-width integer read would run past the end of the buffer
    #[error("Read of {len} bytes at offset {pos} is out of bounds ({available} bytes available)")]
    OutOfBounds {
        pos: usize,
        len: usize,
        available: usize,
    },

    /// A fixed-width name field would run past the end of the buffer
    #[error("Name field of {width} bytes at offset {pos} is truncated ({available} bytes available)")]
    Truncated {
        pos: usize,
        width: usize,
        available: usize,
    },

    /// The archive or source directory does not exist
    #[error("No such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    /// An error from underlying I/O, tagged with what we were doing
    #[error("I/O error while {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A name does not fit the 56-byte name field (only raised in strict mode)
    #[error("Name '{name}' is longer than {max} bytes")]
    NameTooLong { name: String, max: usize },

    /// The archive would grow past what 32-bit offsets can address
    #[error("Archive too large: {0} bytes does not fit a 32-bit offset")]
    TooLarge(u64),

    /// An entry name would escape the extraction directory
    #[error("Refusing to extract unsafe path '{0}'")]
    UnsafePath(String),
}

impl PakError {
    /// Wrap an I/O error with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        PakError::Io {
            context: context.into(),
            source,
        }
    }

    /// Like [`PakError::io`], but reports missing files as [`PakError::NotFound`].
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            PakError::NotFound(path)
        } else {
            PakError::io(format!("opening {}", path.display()), source)
        }
    }
}

impl From<io::Error> for PakError {
    fn from(source: io::Error) -> Self {
        PakError::io("accessing the archive", source)
    }
}
