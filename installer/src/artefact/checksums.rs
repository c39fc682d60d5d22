//! Checksum manifest parsing.
//!
//! Release checksum files carry one `<hex digest>  <file name>` pair per
//! line, in the layout produced by `sha256sum`. The manifest is parsed into
//! structured entries so that lookups compare whole digests against a named
//! file instead of searching the raw text.

use super::error::{ArtefactError, Result};
use super::sha256_digest::Sha256Digest;
use log::debug;

/// One `(digest, file name)` pair from a checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    digest: Sha256Digest,
    file_name: String,
}

impl ChecksumEntry {
    /// Return the published digest.
    #[must_use]
    pub const fn digest(&self) -> &Sha256Digest {
        &self.digest
    }

    /// Return the file name the digest was published for.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// How a computed digest relates to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestMatch {
    /// The manifest lists the expected file with the computed digest.
    Exact,
    /// The expected file is not listed, but another entry carries the
    /// computed digest in full.
    DigestOnly {
        /// File name of the entry that matched.
        listed_as: String,
    },
    /// The manifest lists the expected file with a different digest.
    Mismatch {
        /// Digest published for the expected file.
        expected: Sha256Digest,
    },
    /// Neither the file name nor the digest appears in the manifest.
    Absent,
}

/// An ordered set of checksum entries.
///
/// # Examples
///
/// ```
/// use devenv_installer::artefact::checksums::ChecksumManifest;
///
/// let text = format!("{}  tool_1.0.0_darwin_arm64.tar.gz\n", "a".repeat(64));
/// let manifest = ChecksumManifest::parse(&text);
/// assert_eq!(manifest.entries().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: Vec<ChecksumEntry>,
}

impl ChecksumManifest {
    /// Parse manifest text, skipping blank and malformed lines.
    ///
    /// Malformed lines are logged at debug level; a manifest with no valid
    /// lines parses as empty.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match parse_line(index + 1, line) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!("skipping checksum line: {err}");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    /// Return the parsed entries in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[ChecksumEntry] {
        &self.entries
    }

    /// Return true when no valid entry was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the digest published for `file_name`, if listed.
    #[must_use]
    pub fn digest_for(&self, file_name: &str) -> Option<&Sha256Digest> {
        self.entries
            .iter()
            .find(|entry| entry.file_name == file_name)
            .map(ChecksumEntry::digest)
    }

    /// Classify `actual` against the entry for `file_name`.
    ///
    /// An entry for the expected name always decides the outcome. Only when
    /// the name is not listed at all does a full-digest match on another
    /// entry count.
    #[must_use]
    pub fn lookup(&self, file_name: &str, actual: &Sha256Digest) -> ManifestMatch {
        if let Some(expected) = self.digest_for(file_name) {
            return if expected == actual {
                ManifestMatch::Exact
            } else {
                ManifestMatch::Mismatch {
                    expected: expected.clone(),
                }
            };
        }
        self.entries
            .iter()
            .find(|entry| &entry.digest == actual)
            .map_or(ManifestMatch::Absent, |entry| ManifestMatch::DigestOnly {
                listed_as: entry.file_name.clone(),
            })
    }
}

/// Parse one non-blank manifest line.
fn parse_line(line_number: usize, line: &str) -> Result<ChecksumEntry> {
    let mut fields = line.split_whitespace();
    let (Some(digest), Some(name), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ArtefactError::MalformedChecksumLine {
            line_number,
            reason: "expected exactly two fields".to_owned(),
        });
    };
    let digest = Sha256Digest::try_from(digest).map_err(|err| {
        ArtefactError::MalformedChecksumLine {
            line_number,
            reason: err.to_string(),
        }
    })?;
    // `sha256sum --binary` marks names with a leading asterisk.
    let file_name = name.strip_prefix('*').unwrap_or(name).to_owned();
    Ok(ChecksumEntry { digest, file_name })
}
