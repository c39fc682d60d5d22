//! Directory resolution abstraction for platform-specific paths.
//!
//! Production code resolves directories through `directories-next`, which
//! honours `HOME` on Unix. Tests substitute fixed directories.

use std::path::PathBuf;

/// Application directory name used under the configuration root.
pub const APP_DIR_NAME: &str = "devenv-installer";

/// Provides the directories the installer reads from and writes to.
pub trait BaseDirs {
    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The per-user configuration root (for example `~/.config`).
    fn config_dir(&self) -> Option<PathBuf>;

    /// The user-owned directory that receives the tool binary.
    fn bin_dir(&self) -> Option<PathBuf> {
        self.home_dir().map(|home| home.join(".local").join("bin"))
    }

    /// Default location of the installer's configuration file.
    fn config_file(&self) -> Option<PathBuf> {
        self.config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }
}

/// Resolves directories on the host system.
///
/// # Examples
///
/// ```no_run
/// use devenv_installer::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs::new().expect("home directory");
/// println!("{:?}", dirs.bin_dir());
/// ```
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    inner: directories_next::BaseDirs,
}

impl SystemBaseDirs {
    /// Resolve the host directories, or `None` when no home directory can
    /// be found.
    #[must_use]
    pub fn new() -> Option<Self> {
        directories_next::BaseDirs::new().map(|inner| Self { inner })
    }
}

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.inner.home_dir().to_owned())
    }

    fn config_dir(&self) -> Option<PathBuf> {
        Some(self.inner.config_dir().to_owned())
    }
}
