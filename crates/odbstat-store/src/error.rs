use std::path::PathBuf;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A condition that validation should have made impossible. Aborts the
    /// scan; it signals a bug, not bad data.
    #[error("internal error: {0}")]
    InternalInvariant(String),

    /// No object directory could be located from the environment.
    #[error("not a git repository (or any of the parent directories): {}", .0.display())]
    NotARepository(PathBuf),

    /// A `.git` file that does not point at a git directory.
    #[error("invalid gitfile format: {}", .0.display())]
    InvalidGitFile(PathBuf),

    /// I/O error outside the per-entry scan.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
