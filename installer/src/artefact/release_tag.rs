//! Latest-release tag resolution.
//!
//! The upstream metadata endpoint returns a JSON document describing the
//! most recent release. Only its `tag_name` field is consumed; the leading
//! `v` is stripped so the bare version can be substituted into checksum
//! manifest URLs and file names.

use super::error::{ArtefactError, Result};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
}

/// A release version with its `v` prefix removed (for example `1.4.2`).
///
/// # Examples
///
/// ```
/// use devenv_installer::artefact::release_tag::ReleaseTag;
///
/// let tag = ReleaseTag::from_latest_release_json(r#"{"tag_name": "v1.4.2"}"#).unwrap();
/// assert_eq!(tag.as_str(), "1.4.2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Extract the tag from a latest-release JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidReleaseTag`] when the document is not
    /// JSON, lacks `tag_name`, or the tag is not a `v`-prefixed version.
    pub fn from_latest_release_json(json: &str) -> Result<Self> {
        let release: LatestRelease =
            serde_json::from_str(json).map_err(|err| ArtefactError::InvalidReleaseTag {
                reason: format!("release metadata is not valid JSON: {err}"),
            })?;
        let tag = release
            .tag_name
            .ok_or_else(|| ArtefactError::InvalidReleaseTag {
                reason: "release metadata has no tag_name".to_owned(),
            })?;
        Self::parse(&tag)
    }

    /// Parse a `v`-prefixed tag such as `v1.4.2`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidReleaseTag`] when the prefix is
    /// missing, the version is empty, or it contains characters that cannot
    /// appear in a release file name.
    pub fn parse(tag: &str) -> Result<Self> {
        let version = tag
            .trim()
            .strip_prefix('v')
            .ok_or_else(|| ArtefactError::InvalidReleaseTag {
                reason: format!("tag \"{tag}\" does not start with 'v'"),
            })?;
        if version.is_empty() {
            return Err(ArtefactError::InvalidReleaseTag {
                reason: "tag has no version after 'v'".to_owned(),
            });
        }
        if let Some(bad) = version
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+')))
        {
            return Err(ArtefactError::InvalidReleaseTag {
                reason: format!("unexpected character '{bad}' in tag \"{tag}\""),
            });
        }
        Ok(Self(version.to_owned()))
    }

    /// Return the bare version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn reads_tag_from_github_style_payload() {
        let json = r#"{"url": "https://api.example.test/releases/1", "tag_name": "v0.9.0-rc.1", "draft": false}"#;
        let tag = ReleaseTag::from_latest_release_json(json).expect("tag");
        assert_eq!(tag.as_str(), "0.9.0-rc.1");
    }

    #[rstest]
    #[case::not_json("<html>rate limited</html>")]
    #[case::missing_field(r#"{"name": "latest"}"#)]
    #[case::null_field(r#"{"tag_name": null}"#)]
    #[case::no_prefix(r#"{"tag_name": "1.2.3"}"#)]
    #[case::bare_prefix(r#"{"tag_name": "v"}"#)]
    #[case::path_characters(r#"{"tag_name": "v1.0/../../x"}"#)]
    fn unusable_metadata_is_rejected(#[case] json: &str) {
        assert!(matches!(
            ReleaseTag::from_latest_release_json(json),
            Err(ArtefactError::InvalidReleaseTag { .. })
        ));
    }
}
