use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("index file is too small ({0} bytes)")]
    IndexTooSmall(u64),

    #[error("index file is version {0} and is not supported")]
    UnsupportedVersion(u32),

    #[error("non-monotonic index fan-out at slot {0}")]
    NonMonotonicFanOut(usize),

    #[error("wrong index v{version} file size: {actual} bytes for {objects} objects")]
    WrongIndexSize {
        version: u32,
        objects: u32,
        actual: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PackResult<T> = Result<T, PackError>;
