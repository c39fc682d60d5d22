//! Host platform detection.
//!
//! The release server names archives with Go-style identifiers
//! (`darwin`, `linux`, `arm64`, `x86_64`), so the standard library's
//! `std::env::consts` values are translated once at start-up.

use crate::error::{InstallerError, Result};
use std::fmt;

/// Operating system and architecture in the release server's vocabulary.
///
/// # Examples
///
/// ```
/// use devenv_installer::platform::PlatformDescriptor;
///
/// let platform = PlatformDescriptor::from_parts("macos", "aarch64").unwrap();
/// assert_eq!(platform.os(), "darwin");
/// assert_eq!(platform.arch(), "arm64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    os: &'static str,
    arch: &'static str,
}

impl PlatformDescriptor {
    /// Describe the platform this binary was compiled for.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] when no upstream
    /// archive exists for the host.
    pub fn detect() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust's OS and architecture names.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] for any pair outside
    /// macOS and Linux on `aarch64` or `x86_64`.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || InstallerError::UnsupportedPlatform {
            os: os.to_owned(),
            arch: arch.to_owned(),
        };
        let upstream_os = match os {
            "macos" => "darwin",
            "linux" => "linux",
            _ => return Err(unsupported()),
        };
        let upstream_arch = match arch {
            "aarch64" => "arm64",
            "x86_64" => "x86_64",
            _ => return Err(unsupported()),
        };
        Ok(Self {
            os: upstream_os,
            arch: upstream_arch,
        })
    }

    /// Upstream operating system identifier.
    #[must_use]
    pub const fn os(&self) -> &'static str {
        self.os
    }

    /// Upstream architecture identifier.
    #[must_use]
    pub const fn arch(&self) -> &'static str {
        self.arch
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
