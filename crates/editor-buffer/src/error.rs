use thiserror::Error;

#[derive(Debug, Error)]
/// Errors surfaced by buffer operations.
///
/// Out-of-range cursor requests and no-op edits are not errors: they clamp or
/// return `None`/`false` instead.
pub enum BufferError {
    #[error("invalid search pattern: {0}")]
    /// A search pattern failed to compile. The buffer is left untouched.
    InvalidPattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    /// Reading an existing source file or writing a save target failed.
    Io(#[from] std::io::Error),
}

/// Result alias used throughout `editor-buffer`.
pub type Result<T> = std::result::Result<T, BufferError>;
