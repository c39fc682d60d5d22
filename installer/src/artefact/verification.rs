//! Verification policy and outcomes for downloaded archives.
//!
//! Fetching the checksum manifest is best-effort, but comparing against it
//! is strict. [`VerificationResult`] keeps those two cases apart so that an
//! unavailable manifest is never confused with a mismatching one.

use super::checksums::{ChecksumManifest, ManifestMatch};
use super::sha256_digest::Sha256Digest;
use std::fmt;

/// Policy governing whether a downloaded archive is checked against the
/// published checksum manifest.
///
/// # Examples
///
/// ```
/// use devenv_installer::artefact::verification::VerificationPolicy;
///
/// let policy = VerificationPolicy::default();
/// assert!(policy.require_checksum());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    require_checksum: bool,
}

impl VerificationPolicy {
    /// Create a policy with the given checksum requirement.
    #[must_use]
    pub const fn new(require_checksum: bool) -> Self {
        Self { require_checksum }
    }

    /// Return whether checksum verification should be attempted.
    #[must_use]
    pub const fn require_checksum(&self) -> bool {
        self.require_checksum
    }
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Display for VerificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.require_checksum {
            write!(f, "checksum verification enabled")
        } else {
            write!(f, "checksum verification disabled")
        }
    }
}

/// Outcome of checking an archive against the checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The archive digest matched the manifest.
    Verified {
        /// Digest of the archive.
        digest: Sha256Digest,
    },
    /// No manifest could be obtained; the archive was not checked.
    SkippedNoManifest {
        /// Why the manifest was unavailable.
        reason: String,
    },
    /// The manifest was obtained and the archive digest did not match it.
    FailedMismatch {
        /// Digest published for the archive, if the archive was listed.
        expected: Option<Sha256Digest>,
        /// Digest of the downloaded archive.
        actual: Sha256Digest,
    },
}

impl VerificationResult {
    /// Compare `actual` with the manifest entry for `file_name`.
    #[must_use]
    pub fn from_manifest(
        manifest: &ChecksumManifest,
        file_name: &str,
        actual: Sha256Digest,
    ) -> Self {
        match manifest.lookup(file_name, &actual) {
            ManifestMatch::Exact | ManifestMatch::DigestOnly { .. } => {
                Self::Verified { digest: actual }
            }
            ManifestMatch::Mismatch { expected } => Self::FailedMismatch {
                expected: Some(expected),
                actual,
            },
            ManifestMatch::Absent => Self::FailedMismatch {
                expected: None,
                actual,
            },
        }
    }

    /// Return true when the result must abort provisioning.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::FailedMismatch { .. })
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified { digest } => write!(f, "verified (sha256 {digest})"),
            Self::SkippedNoManifest { reason } => write!(f, "skipped: {reason}"),
            Self::FailedMismatch { actual, .. } => {
                write!(f, "checksum mismatch (sha256 {actual})")
            }
        }
    }
}
