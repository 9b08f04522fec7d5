//! Layout errors

use thiserror::Error;

use crate::descriptor::SlotKey;

/// Errors raised while building or decoding a generation's slot table
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Two live declarations in one generation share an identity key
    #[error("duplicate slot key in one generation: {0}")]
    DuplicateKey(SlotKey),

    /// A declaration violates the front-end input contract
    #[error("malformed declaration at position {index}: {reason}")]
    MalformedDeclaration {
        /// Position in the declaration sequence
        index: usize,
        /// What was wrong
        reason: &'static str,
    },

    /// Persisted table header is missing or not a slot table
    #[error("invalid slot table header")]
    InvalidHeader,

    /// Persisted table was written by an unknown format version
    #[error("unsupported slot table version: {0}")]
    UnsupportedVersion(u32),

    /// Persisted table contains an unparseable slot entry
    #[error("malformed slot entry at line {line}: {text:?}")]
    MalformedEntry {
        /// 1-based line number within the encoding
        line: usize,
        /// Offending line
        text: String,
    },
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
