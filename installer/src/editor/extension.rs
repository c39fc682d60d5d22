//! Editor extension installation.
//!
//! The extension package is downloaded to a fixed path, handed to the
//! editor's `--install-extension` command, and removed afterwards. Removal
//! is tied to a guard value so the package never outlives the call,
//! whichever step fails.

use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artefact::download::{ArtefactDownloader, HttpDownloader};
use crate::editor::discovery::describe_search;
use crate::error::{InstallerError, Result};
use crate::process::{CommandExecutor, Invocation, SystemCommandExecutor, failure_message};
use crate::search_path::SearchPath;

/// A downloadable extension package and where it is stored locally.
///
/// # Examples
///
/// ```
/// use devenv_installer::editor::extension::ExtensionArtifact;
///
/// let artifact = ExtensionArtifact::in_temp_dir("https://example.test/ext.vsix", "ext.vsix");
/// assert!(artifact.local_path().ends_with("ext.vsix"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionArtifact {
    url: String,
    local_path: PathBuf,
}

impl ExtensionArtifact {
    /// Describe a package fetched from `url` into `local_path`.
    #[must_use]
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
        }
    }

    /// Describe a package stored as `file_name` in the system temporary
    /// directory.
    #[must_use]
    pub fn in_temp_dir(url: impl Into<String>, file_name: &str) -> Self {
        Self::new(url, std::env::temp_dir().join(file_name))
    }

    /// Download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Local file the package is written to.
    #[must_use]
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }
}

/// Inputs for one extension install.
#[derive(Debug)]
pub struct ExtensionRequest<'a> {
    /// Editor CLI found by discovery, if any.
    pub editor_cmd: Option<&'a Path>,
    /// Directories discovery searched, for the not-found message.
    pub searched: &'a [PathBuf],
    /// Package to install.
    pub artifact: &'a ExtensionArtifact,
    /// Search path handed to the editor process as `PATH`.
    pub search_path: &'a SearchPath,
}

/// Removes the artifact file when dropped.
struct ArtifactGuard<'a> {
    path: &'a Path,
}

impl Drop for ArtifactGuard<'_> {
    fn drop(&mut self) {
        match std::fs::remove_file(self.path) {
            Ok(()) => debug!("removed {}", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not remove {}: {err}", self.path.display()),
        }
    }
}

/// Install the extension using production HTTP and process
/// implementations.
///
/// # Errors
///
/// See [`install_extension_with`].
pub fn install_extension(
    request: &ExtensionRequest<'_>,
    http_timeout: Duration,
    editor_timeout: Duration,
) -> Result<()> {
    let downloader = HttpDownloader::new(http_timeout);
    let executor = SystemCommandExecutor::new(editor_timeout);
    install_extension_with(request, &downloader, &executor)
}

/// Testable inner function with injected dependencies.
///
/// # Errors
///
/// Returns [`InstallerError::EditorNotFound`] before any download when no
/// editor was found, [`InstallerError::Download`] when the package cannot
/// be fetched, and [`InstallerError::ExtensionInstall`] when the editor
/// cannot be started or exits unsuccessfully. Timeouts propagate from the
/// executor.
pub fn install_extension_with(
    request: &ExtensionRequest<'_>,
    downloader: &dyn ArtefactDownloader,
    executor: &dyn CommandExecutor,
) -> Result<()> {
    let Some(editor) = request.editor_cmd else {
        return Err(InstallerError::EditorNotFound {
            searched: describe_search(request.searched),
        });
    };

    let artifact_path = request.artifact.local_path();
    let _guard = ArtifactGuard {
        path: artifact_path,
    };

    info!("Downloading editor extension from {}...", request.artifact.url());
    downloader
        .fetch_to_file(request.artifact.url(), artifact_path)
        .map_err(|err| InstallerError::download("extension", err))?;

    info!("Installing extension with {}...", editor.display());
    let invocation = Invocation::new(
        editor,
        [
            OsString::from("--install-extension"),
            artifact_path.as_os_str().to_owned(),
            OsString::from("--force"),
        ],
    )
    .with_path_env(request.search_path.to_os_string());
    let output = executor.run(&invocation).map_err(|err| match err {
        InstallerError::CommandSpawn { source, .. } => InstallerError::ExtensionInstall {
            editor: editor.to_owned(),
            message: format!("could not start the editor: {source}"),
        },
        other => other,
    })?;
    if !output.status.success() {
        return Err(InstallerError::ExtensionInstall {
            editor: editor.to_owned(),
            message: failure_message(&output),
        });
    }

    info!("Extension installed");
    Ok(())
}
