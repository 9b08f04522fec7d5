//! Patch errors

use thiserror::Error;

use molt_frame::LayoutError;
use molt_markers::UnmatchedResumePoint;

/// Errors raised while applying one method edit
#[derive(Debug, Error)]
pub enum PatchError {
    /// Front-end input violated the allocation contract
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The edit cannot be applied while a frame may be suspended inside a
    /// construct the new body no longer has
    #[error("edit rejected: {0}")]
    EditRejected(#[from] UnmatchedResumePoint),
}

/// Result type for patch operations
pub type Result<T> = std::result::Result<T, PatchError>;
