//! Error types for the devenv installer.
//!
//! Every fatal condition in the provisioning run maps to one variant here so
//! that the final log line names the step that failed. Recoverable conditions
//! (missing checksum manifest, unresolvable release tag, an existing PATH
//! line) never surface as errors; they are logged where they occur.

use crate::artefact::download::DownloadError;
use crate::artefact::extraction::ExtractionError;
use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during a provisioning run.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The host operating system or architecture has no upstream build.
    #[error("unsupported platform {os}/{arch}")]
    UnsupportedPlatform {
        /// Operating system reported by the standard library.
        os: String,
        /// Architecture reported by the standard library.
        arch: String,
    },

    /// The user's home directory could not be determined.
    #[error("could not determine the home directory; is HOME set?")]
    HomeDirectoryUnavailable,

    /// A download required by the named step failed.
    #[error("{step} download failed: {source}")]
    Download {
        /// Pipeline step that issued the download.
        step: &'static str,
        /// Underlying download failure.
        source: DownloadError,
    },

    /// The private directory for a step's downloads could not be created.
    #[error("{step} download failed: could not create a temporary directory: {source}")]
    TempDir {
        /// Pipeline step that needed the directory.
        step: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The archive digest did not match the published checksum manifest.
    #[error("checksum mismatch for {file_name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Archive file name looked up in the manifest.
        file_name: String,
        /// Digest published in the manifest, or `none` when the digest was
        /// absent from every entry.
        expected: String,
        /// Digest computed from the downloaded bytes.
        actual: String,
    },

    /// The archive could not be read to compute its digest.
    #[error("failed to hash {}: {source}", .path.display())]
    ChecksumCompute {
        /// Archive that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The tool binary could not be extracted from the archive.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The extracted binary could not be moved into the install directory.
    #[error("failed to place binary at {}: {source}", .path.display())]
    Placement {
        /// Destination path of the binary.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The placed binary could not be marked executable.
    #[error("failed to set executable permission on {}: {source}", .path.display())]
    Permissions {
        /// Path of the binary.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No supported editor command-line entry point exists on this host.
    #[error("no supported editor found (searched: {searched})")]
    EditorNotFound {
        /// Comma-separated list of the probed locations.
        searched: String,
    },

    /// The editor rejected the extension install request.
    #[error("extension install via {} failed: {message}", .editor.display())]
    ExtensionInstall {
        /// Editor command that was invoked.
        editor: PathBuf,
        /// Captured standard error or exit description.
        message: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the read or parse error.
        reason: String,
    },

    /// An external command could not be started.
    #[error("failed to start {}: {source}", .program.display())]
    CommandSpawn {
        /// Program that was launched.
        program: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An external command did not finish within its time limit.
    #[error("{program} timed out after {seconds} seconds")]
    CommandTimeout {
        /// Program that was running.
        program: String,
        /// Time limit that was exceeded.
        seconds: u64,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl InstallerError {
    /// Wrap a download failure with the step that issued it.
    #[must_use]
    pub const fn download(step: &'static str, source: DownloadError) -> Self {
        Self::Download { step, source }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
