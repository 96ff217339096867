use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("no directory entry named '{0}'")]
    PathNotFound(String),
    #[error("file '{0}' does not exist")]
    FileNotFound(String),
    #[error("'{0}' is not a directory")]
    NotADirectory(String),
    #[error("'{0}' is not a data file")]
    NotADataFile(String),
    #[error("'{0}' already exists")]
    AlreadyExists(String),
    #[error("directory '{0}' is not empty")]
    NotEmpty(String),
    #[error("directory block {0} has no free entry")]
    DirectoryFull(u16),
    #[error("no free {0} left")]
    AllocationExhausted(&'static str),
    #[error("path has {depth} components, at most {max} are supported")]
    PathTooDeep { depth: usize, max: usize },
    #[error("file of {0} bytes exceeds the direct block capacity")]
    FileTooLarge(usize),
    #[error("data files must hold at least one byte")]
    EmptyFile,
    #[error("file name '{0}' is too long")]
    NameTooLong(String),
    #[error("invalid path '{0}'")]
    InvalidPath(String),
    #[error("block {0} is out of range")]
    InvalidBlockId(usize),
    #[error("bad superblock magic {0:#x}")]
    InvalidMagic(u32),
    #[error("corrupted file system: {0}")]
    Corrupted(&'static str),
    #[error("device error: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    /// Errors raised by the medium itself. These behave like a crash: nothing
    /// more is written and the safety snapshot is left for recovery.
    pub fn is_device_error(&self) -> bool {
        matches!(self, FsError::Io(_) | FsError::InvalidBlockId(_))
    }
}

pub type Result<T> = core::result::Result<T, FsError>;
