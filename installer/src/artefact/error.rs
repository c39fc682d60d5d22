//! Error types for release metadata, checksum manifests, and digests.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// A checksum manifest line is not `<digest>  <file name>`.
    #[error("malformed checksum line {line_number}: {reason}")]
    MalformedChecksumLine {
        /// One-based line number within the manifest.
        line_number: usize,
        /// Description of the validation failure.
        reason: String,
    },

    /// The release metadata did not carry a usable tag.
    #[error("invalid release tag: {reason}")]
    InvalidReleaseTag {
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
