//! Release URL and archive naming policy.
//!
//! The upstream release server serves the newest archive for a platform
//! from a query endpoint, and publishes a checksum manifest per tagged
//! release. Manifest entries are named
//! `<tool>_<version>_<os>_<arch>.tar.gz`.

use crate::platform::PlatformDescriptor;

use super::release_tag::ReleaseTag;

/// The fixed archive extension requested from the release server.
const ARCHIVE_TYPE: &str = "tar.gz";

/// Where a tool's releases and release metadata are published.
///
/// # Examples
///
/// ```
/// use devenv_installer::artefact::naming::ReleaseSource;
///
/// let source = ReleaseSource::new(
///     "vulncheck",
///     "vulncheck-oss",
///     "https://get.vulncheck.dev/",
///     "https://api.github.com",
/// );
/// assert_eq!(
///     source.latest_release_url(),
///     "https://api.github.com/repos/vulncheck-oss/vulncheck/releases/latest"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    tool: String,
    org: String,
    release_server: String,
    api_base: String,
}

impl ReleaseSource {
    /// Create a release source. Trailing slashes on the base URLs are
    /// ignored.
    #[must_use]
    pub fn new(tool: &str, org: &str, release_server: &str, api_base: &str) -> Self {
        Self {
            tool: tool.to_owned(),
            org: org.to_owned(),
            release_server: release_server.trim_end_matches('/').to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
        }
    }

    /// Return the tool name.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// URL of the newest archive for `platform`.
    #[must_use]
    pub fn archive_url(&self, platform: &PlatformDescriptor) -> String {
        format!(
            "{}/{}?os={}&arch={}&type={ARCHIVE_TYPE}",
            self.release_server,
            self.tool,
            platform.os(),
            platform.arch()
        )
    }

    /// URL of the latest-release metadata document.
    #[must_use]
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base, self.org, self.tool
        )
    }

    /// URL of the checksum manifest published for `tag`.
    #[must_use]
    pub fn checksums_url(&self, tag: &ReleaseTag) -> String {
        format!(
            "{}/releases/download/v{tag}/{}",
            self.release_server,
            self.checksums_file_name(tag)
        )
    }

    /// File name of the checksum manifest for `tag`.
    #[must_use]
    pub fn checksums_file_name(&self, tag: &ReleaseTag) -> String {
        format!("{}_{tag}_checksums.txt", self.tool)
    }

    /// Name under which the manifest lists the archive for `platform`.
    #[must_use]
    pub fn archive_file_name(&self, tag: &ReleaseTag, platform: &PlatformDescriptor) -> String {
        format!(
            "{}_{tag}_{}_{}.{ARCHIVE_TYPE}",
            self.tool,
            platform.os(),
            platform.arch()
        )
    }
}
