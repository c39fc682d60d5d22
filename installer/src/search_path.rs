//! Executable search path handling.
//!
//! The run keeps its own copy of `PATH` as a [`SearchPath`] value. The tool
//! provisioner prepends its install directory to that value and later steps
//! receive it explicitly, so nothing relies on mutating the process
//! environment.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// An ordered list of directories searched for executables.
///
/// # Examples
///
/// ```
/// use devenv_installer::search_path::SearchPath;
/// use std::path::PathBuf;
///
/// let mut path = SearchPath::new(vec![PathBuf::from("/usr/bin")]);
/// path.prepend(PathBuf::from("/home/user/.local/bin"));
/// assert_eq!(path.dirs()[0], PathBuf::from("/home/user/.local/bin"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Create a search path from explicit directories.
    #[must_use]
    pub const fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Split a `PATH`-style value into directories. Empty segments are
    /// dropped.
    #[must_use]
    pub fn from_os_str(value: &OsStr) -> Self {
        let dirs = std::env::split_paths(value)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        Self { dirs }
    }

    /// Read the current process's `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var_os("PATH")
            .map(|value| Self::from_os_str(&value))
            .unwrap_or_default()
    }

    /// Return the directories in search order.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Return true if `dir` is one of the search directories.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|entry| entry == dir)
    }

    /// Put `dir` first, removing any later occurrence.
    pub fn prepend(&mut self, dir: PathBuf) {
        self.dirs.retain(|entry| *entry != dir);
        self.dirs.insert(0, dir);
    }

    /// Resolve `command` to the first executable file named `command` in
    /// the search directories.
    #[must_use]
    pub fn resolve(&self, command: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate))
    }

    /// Join the directories back into a `PATH` value.
    ///
    /// Returns `None` when a directory contains the platform separator and
    /// cannot be represented.
    #[must_use]
    pub fn to_os_string(&self) -> Option<OsString> {
        std::env::join_paths(&self.dirs).ok()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
