//! Release artefact acquisition and integrity checking.
//!
//! # Sub-modules
//!
//! - [`checksums`] - Checksum manifest parsing (`ChecksumManifest`).
//! - [`download`] - Download trait and HTTP implementation.
//! - [`error`] - Semantic error types for validation failures.
//! - [`extraction`] - Binary extraction with path traversal protection.
//! - [`naming`] - Release URLs and archive names (`ReleaseSource`).
//! - [`release_tag`] - Latest-release tag resolution (`ReleaseTag`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - Verification policy and outcome types.

pub mod checksums;
pub mod download;
pub mod error;
pub mod extraction;
pub mod naming;
pub mod release_tag;
pub mod sha256_digest;
pub mod verification;
