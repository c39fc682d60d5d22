//! Binary extraction from release archives.
//!
//! Release archives are gzip-compressed tarballs that may carry READMEs and
//! licences alongside the tool. Only the entry whose file name equals the
//! expected binary name is unpacked. Every entry path is checked for
//! traversal before anything is written.

use std::ffi::OsStr;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

/// Trait for extracting a binary from an archive, enabling test mocking.
///
/// # Examples
///
/// ```no_run
/// use devenv_installer::artefact::extraction::{ArchiveExtractor, TarGzExtractor};
/// use std::path::Path;
///
/// let binary = TarGzExtractor.extract_binary(
///     Path::new("/tmp/tool.tar.gz"),
///     "vulncheck",
///     Path::new("/tmp/out"),
/// )?;
/// # Ok::<(), devenv_installer::artefact::extraction::ExtractionError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the entry named `binary_name` from `archive_path` into
    /// `dest_dir` and return the extracted file's path.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination, [`ExtractionError::BinaryNotFound`] if no
    /// regular file carries the expected name, and [`ExtractionError::Io`]
    /// on read or decompression failures.
    fn extract_binary(
        &self,
        archive_path: &Path,
        binary_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O or decompression error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive does not contain the expected binary.
    #[error("archive does not contain a file named {name}")]
    BinaryNotFound {
        /// The binary name that was searched for.
        name: String,
    },
}

/// Extractor for `.tar.gz` archives using the `tar` and `flate2` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn extract_binary(
        &self,
        archive_path: &Path,
        binary_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ExtractionError> {
        let file = std::fs::File::open(archive_path)?;
        let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
        let mut archive = tar::Archive::new(decoder);
        let wanted = OsStr::new(binary_name);

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            let entry_path = entry.path()?.into_owned();
            validate_entry_path(&entry_path)?;

            if !entry.header().entry_type().is_file() {
                continue;
            }
            if entry_path.file_name() == Some(wanted) {
                std::fs::create_dir_all(dest_dir)?;
                let dest_path = dest_dir.join(binary_name);
                entry.unpack(&dest_path)?;
                return Ok(dest_path);
            }
        }

        Err(ExtractionError::BinaryNotFound {
            name: binary_name.to_owned(),
        })
    }
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
