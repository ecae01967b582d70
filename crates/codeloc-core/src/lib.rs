use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Lightweight error type for fatal setup conditions (missing root,
/// unwritable output). Per-item failures are outcomes, not errors.
#[derive(Debug, Error)]
pub enum CodelocError {
    #[error("{0}")]
    Setup(String),
}
