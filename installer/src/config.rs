//! Layered installer configuration.
//!
//! Settings start from compiled defaults, are replaced by any keys present
//! in a TOML file, and finally by command-line flags. The file is optional
//! unless named explicitly with `--config`.

use crate::artefact::download::DEFAULT_TIMEOUT;
use crate::artefact::naming::ReleaseSource;
use crate::artefact::verification::VerificationPolicy;
use crate::cli::Cli;
use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::process::DEFAULT_COMMAND_TIMEOUT;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Installer settings after all layers have been applied.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Name of the tool binary, also used in release URLs.
    pub tool_name: String,
    /// Organisation that publishes the tool's releases.
    pub tool_org: String,
    /// Base URL of the release download server.
    pub release_server: String,
    /// Base URL of the release metadata API.
    pub api_base: String,
    /// Location of the packaged editor extension.
    pub extension_url: String,
    /// File name the extension is saved under before installing.
    pub extension_file_name: String,
    /// Editor application bundle names, in preference order.
    pub editor_apps: Vec<String>,
    /// Directories searched for editor applications. A leading `~` is
    /// expanded to the home directory.
    pub editor_search_dirs: Vec<String>,
    /// Path of the editor's command-line entry point inside a bundle.
    pub editor_cli_suffix: String,
    /// Timeout in seconds applied to every HTTP request.
    pub http_timeout_secs: u64,
    /// Timeout in seconds for the editor's extension install command.
    pub editor_timeout_secs: u64,
    /// Whether downloaded archives are checked against the checksum
    /// manifest.
    pub verify_checksums: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            tool_name: "vulncheck".to_owned(),
            tool_org: "vulncheck-oss".to_owned(),
            release_server: "https://get.vulncheck.dev".to_owned(),
            api_base: "https://api.github.com".to_owned(),
            extension_url: "https://get.vulncheck.dev/vscode/vulncheck.vsix".to_owned(),
            extension_file_name: "vulncheck.vsix".to_owned(),
            editor_apps: vec![
                "Visual Studio Code.app".to_owned(),
                "Cursor.app".to_owned(),
                "Windsurf.app".to_owned(),
            ],
            editor_search_dirs: vec!["/Applications".to_owned(), "~/Applications".to_owned()],
            editor_cli_suffix: "Contents/Resources/app/bin/code".to_owned(),
            http_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            editor_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            verify_checksums: true,
        }
    }
}

impl InstallerConfig {
    /// Load the configuration file layer.
    ///
    /// An `explicit` path must exist. Without one, the default location
    /// under the user's configuration directory is used when present and
    /// compiled defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] when the file cannot be read, is
    /// not valid TOML, contains unknown keys, or holds invalid values.
    pub fn load(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => match dirs.config_file() {
                Some(path) if path.is_file() => lossy_utf8(path),
                _ => {
                    log::debug!("no configuration file found; using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let source =
            std::fs::read_to_string(path.as_std_path()).map_err(|err| InstallerError::Config {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        let config = Self::from_toml_str(&source, &path)?;
        log::debug!("loaded configuration from {path}");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] naming `path` on parse or
    /// validation failure.
    pub fn from_toml_str(source: &str, path: &Utf8Path) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|err| InstallerError::Config {
            path: path.to_owned(),
            reason: err.message().to_owned(),
        })?;
        config.validate().map_err(|reason| InstallerError::Config {
            path: path.to_owned(),
            reason,
        })?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the file layer.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(tool) = &cli.tool {
            self.tool_name.clone_from(tool);
        }
        if let Some(url) = &cli.extension_url {
            self.extension_url.clone_from(url);
        }
    }

    /// Editor search directories with `~` expanded against `home`.
    #[must_use]
    pub fn editor_search_dirs(&self, home: &Path) -> Vec<PathBuf> {
        self.editor_search_dirs
            .iter()
            .map(|dir| expand_home(dir, home))
            .collect()
    }

    /// Timeout applied to every HTTP request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Timeout applied to the editor's install command.
    #[must_use]
    pub const fn editor_timeout(&self) -> Duration {
        Duration::from_secs(self.editor_timeout_secs)
    }

    /// Where the tool's releases are published.
    #[must_use]
    pub fn release_source(&self) -> ReleaseSource {
        ReleaseSource::new(
            &self.tool_name,
            &self.tool_org,
            &self.release_server,
            &self.api_base,
        )
    }

    /// Checksum policy for downloaded archives.
    #[must_use]
    pub const fn verification_policy(&self) -> VerificationPolicy {
        VerificationPolicy::new(self.verify_checksums)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.tool_name.trim().is_empty() {
            return Err("tool_name must not be empty".to_owned());
        }
        if self.tool_name.contains(['/', '\\']) {
            return Err(format!(
                "tool_name must be a plain file name, got {}",
                self.tool_name
            ));
        }
        if self.extension_file_name.trim().is_empty() || self.extension_file_name.contains('/') {
            return Err("extension_file_name must be a plain, non-empty file name".to_owned());
        }
        if self.http_timeout_secs == 0 || self.editor_timeout_secs == 0 {
            return Err("timeouts must be at least one second".to_owned());
        }
        Ok(())
    }
}

fn expand_home(dir: &str, home: &Path) -> PathBuf {
    if dir == "~" {
        return home.to_owned();
    }
    match dir.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(dir),
    }
}

fn lossy_utf8(path: PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path)
        .unwrap_or_else(|path| Utf8PathBuf::from(path.to_string_lossy().into_owned()))
}
