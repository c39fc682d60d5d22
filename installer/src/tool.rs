//! Tool provisioning: presence check, download, verify, extract, place.
//!
//! [`ensure_tool`] makes the configured tool callable. When the search path
//! already resolves it, nothing else happens. Otherwise the newest archive
//! for the host platform is downloaded into a private temporary directory,
//! checked against the release's checksum manifest when one can be fetched,
//! and the binary is moved into the install directory with mode `0o755`.
//!
//! Fetching the manifest is best-effort: an unresolvable release tag or an
//! unreachable manifest downgrades verification to a logged skip. A manifest
//! that is present but disagrees with the archive aborts the run. The
//! temporary directory is owned by a [`tempfile::TempDir`] and is removed on
//! every return path.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use crate::artefact::checksums::ChecksumManifest;
use crate::artefact::download::{ArtefactDownloader, DownloadError, HttpDownloader};
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::{ArchiveExtractor, TarGzExtractor};
use crate::artefact::naming::ReleaseSource;
use crate::artefact::release_tag::ReleaseTag;
use crate::artefact::sha256_digest::compute_sha256;
use crate::artefact::verification::{VerificationPolicy, VerificationResult};
use crate::error::{InstallerError, Result};
use crate::platform::PlatformDescriptor;
use crate::profile::{ProfileUpdate, register_path};
use crate::search_path::SearchPath;

/// Prefix of the per-run temporary directory.
pub const TEMP_DIR_PREFIX: &str = "devenv-installer-";

/// Configuration for one provisioning attempt.
#[derive(Debug)]
pub struct ToolConfig<'a> {
    /// Where releases and release metadata are published.
    pub source: &'a ReleaseSource,
    /// Target platform; detected from the host when `None`.
    pub platform: Option<PlatformDescriptor>,
    /// Directory that receives the binary.
    pub install_dir: &'a Path,
    /// Checksum policy.
    pub policy: VerificationPolicy,
    /// Shell start-up file to register the install directory in, if any.
    pub profile: Option<&'a Path>,
    /// Parent of the temporary download directory; the system temporary
    /// directory when `None`.
    pub temp_root: Option<&'a Path>,
    /// Timeout applied to each HTTP request.
    pub http_timeout: Duration,
}

/// A freshly installed tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstallation {
    /// Full path of the placed binary.
    pub binary_path: PathBuf,
    /// Directory holding the binary.
    pub install_dir: PathBuf,
    /// How the archive was verified.
    pub verification: VerificationResult,
}

/// Outcome of [`ensure_tool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// The tool was already callable; nothing was downloaded.
    AlreadyPresent {
        /// Path the search path resolved the tool to.
        path: PathBuf,
    },
    /// The tool was downloaded and installed.
    Installed(ToolInstallation),
}

impl ToolStatus {
    /// Path of the callable binary.
    #[must_use]
    pub fn binary_path(&self) -> &Path {
        match self {
            Self::AlreadyPresent { path } => path,
            Self::Installed(installation) => &installation.binary_path,
        }
    }
}

/// Why the checksum manifest could not be used. Never fatal; every variant
/// becomes [`VerificationResult::SkippedNoManifest`].
#[derive(Debug, thiserror::Error)]
enum ManifestUnavailable {
    #[error("latest release lookup failed: {0}")]
    ReleaseLookup(DownloadError),

    #[error("{0}")]
    ReleaseTag(#[from] ArtefactError),

    #[error("checksum manifest download failed: {0}")]
    Download(DownloadError),

    #[error("checksum manifest {file_name} has no valid entries")]
    Empty { file_name: String },
}

/// Ensure the tool is callable using production HTTP and extraction
/// implementations.
///
/// # Errors
///
/// See [`ensure_tool_with`].
pub fn ensure_tool(config: &ToolConfig<'_>, search_path: &mut SearchPath) -> Result<ToolStatus> {
    let downloader = HttpDownloader::new(config.http_timeout);
    ensure_tool_with(config, search_path, &downloader, &TarGzExtractor)
}

/// Testable inner function with injected dependencies.
///
/// On success the install directory is first on `search_path`.
///
/// # Errors
///
/// Returns [`InstallerError::UnsupportedPlatform`] when the host has no
/// upstream build, [`InstallerError::Download`] when the archive cannot be
/// fetched, [`InstallerError::ChecksumMismatch`] when the manifest rejects
/// the archive, [`InstallerError::Extraction`] when the binary cannot be
/// unpacked, and [`InstallerError::Placement`] or
/// [`InstallerError::Permissions`] when it cannot be installed.
pub fn ensure_tool_with(
    config: &ToolConfig<'_>,
    search_path: &mut SearchPath,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArchiveExtractor,
) -> Result<ToolStatus> {
    let tool = config.source.tool();

    // Step 1: Presence check.
    if let Some(path) = search_path.resolve(tool) {
        info!("{tool} is already installed at {}", path.display());
        return Ok(ToolStatus::AlreadyPresent { path });
    }

    // Step 2: Platform.
    let platform = match config.platform {
        Some(platform) => platform,
        None => PlatformDescriptor::detect()?,
    };

    // Step 3: Download into a private temporary directory.
    let temp_dir = create_temp_dir(config.temp_root)?;
    let archive_path = temp_dir.path().join(format!("{tool}.tar.gz"));
    info!("Downloading {tool} for {platform}...");
    let bytes = downloader
        .fetch_to_file(&config.source.archive_url(&platform), &archive_path)
        .map_err(|err| InstallerError::download("archive", err))?;
    debug!("downloaded {bytes} bytes to {}", archive_path.display());

    // Step 4: Verify against the checksum manifest.
    let verification = verify_archive(config, &platform, &archive_path, downloader)?;

    // Step 5: Extract the binary.
    info!("Extracting {tool}...");
    let extracted = extractor.extract_binary(&archive_path, tool, &temp_dir.path().join("extract"))?;

    // Step 6: Place it.
    let binary_path = place_binary(&extracted, config.install_dir, tool)?;
    info!("Installed {tool} to {}", binary_path.display());

    // Step 7: Make it discoverable.
    search_path.prepend(config.install_dir.to_owned());
    if let Some(profile) = config.profile {
        update_profile(profile, config.install_dir);
    }

    // Step 8: Cleanup. Drop covers the error paths above.
    let temp_path = temp_dir.path().to_owned();
    if let Err(err) = temp_dir.close() {
        warn!(
            "could not remove temporary directory {}: {err}",
            temp_path.display()
        );
    }

    Ok(ToolStatus::Installed(ToolInstallation {
        binary_path,
        install_dir: config.install_dir.to_owned(),
        verification,
    }))
}

fn create_temp_dir(temp_root: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_DIR_PREFIX);
    let created = match temp_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    };
    created.map_err(|source| InstallerError::TempDir {
        step: "archive",
        source,
    })
}

/// Check the archive against the release's checksum manifest.
///
/// Returns an error only for a mismatch or an unreadable archive.
fn verify_archive(
    config: &ToolConfig<'_>,
    platform: &PlatformDescriptor,
    archive_path: &Path,
    downloader: &dyn ArtefactDownloader,
) -> Result<VerificationResult> {
    if !config.policy.require_checksum() {
        warn!("Checksum verification is disabled by configuration; installing unverified archive");
        return Ok(VerificationResult::SkippedNoManifest {
            reason: config.policy.to_string(),
        });
    }

    let (tag, manifest) = match fetch_manifest(config.source, downloader) {
        Ok(found) => found,
        Err(err) => {
            let reason = err.to_string();
            warn!("Checksum manifest unavailable ({reason}); skipping verification");
            return Ok(VerificationResult::SkippedNoManifest { reason });
        }
    };

    let file_name = config.source.archive_file_name(&tag, platform);
    let actual = compute_sha256(archive_path).map_err(|source| InstallerError::ChecksumCompute {
        path: archive_path.to_owned(),
        source,
    })?;

    match VerificationResult::from_manifest(&manifest, &file_name, actual) {
        VerificationResult::FailedMismatch { expected, actual } => {
            Err(InstallerError::ChecksumMismatch {
                file_name,
                expected: expected.map_or_else(|| "none".to_owned(), |digest| digest.into_inner()),
                actual: actual.into_inner(),
            })
        }
        result => {
            info!("Checksum verified for {file_name}");
            Ok(result)
        }
    }
}

/// Resolve the latest release tag and fetch its checksum manifest.
fn fetch_manifest(
    source: &ReleaseSource,
    downloader: &dyn ArtefactDownloader,
) -> std::result::Result<(ReleaseTag, ChecksumManifest), ManifestUnavailable> {
    let metadata = downloader
        .fetch_text(&source.latest_release_url())
        .map_err(ManifestUnavailable::ReleaseLookup)?;
    let tag = ReleaseTag::from_latest_release_json(&metadata)?;
    debug!("latest release is {tag}");

    let text = downloader
        .fetch_text(&source.checksums_url(&tag))
        .map_err(ManifestUnavailable::Download)?;
    let manifest = ChecksumManifest::parse(&text);
    if manifest.is_empty() {
        return Err(ManifestUnavailable::Empty {
            file_name: source.checksums_file_name(&tag),
        });
    }
    Ok((tag, manifest))
}

/// Move the extracted binary into `install_dir` and mark it executable.
fn place_binary(extracted: &Path, install_dir: &Path, tool: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(install_dir).map_err(|source| InstallerError::Placement {
        path: install_dir.to_owned(),
        source,
    })?;

    let dest = install_dir.join(tool);
    move_file(extracted, &dest).map_err(|source| InstallerError::Placement {
        path: dest.clone(),
        source,
    })?;
    set_executable(&dest).map_err(|source| InstallerError::Permissions {
        path: dest.clone(),
        source,
    })?;
    Ok(dest)
}

/// Rename, falling back to copy and remove across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) => {
            debug!("rename failed ({err}); copying instead");
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(path: &Path) -> std::io::Result<()> {
    std::fs::metadata(path).map(|_| ())
}

/// Persist the install directory for future shells. Failures are logged.
fn update_profile(profile: &Path, install_dir: &Path) {
    match register_path(profile, install_dir) {
        Ok(ProfileUpdate::Appended) => {
            info!("Added {} to PATH in {}", install_dir.display(), profile.display());
        }
        Ok(ProfileUpdate::AlreadyPresent) => {
            info!("{} already exports {}", profile.display(), install_dir.display());
        }
        Err(err) => {
            warn!(
                "could not update {}: {err}; add {} to PATH manually",
                profile.display(),
                install_dir.display()
            );
        }
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
