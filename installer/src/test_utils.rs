//! Shared test utilities for the installer crate.

use crate::artefact::download::{ArtefactDownloader, DownloadError};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::process::{CommandExecutor, Invocation};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program expected to run.
    pub program: PathBuf,
    /// The arguments expected, rendered lossily as UTF-8.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    seen: RefCell<Vec<Invocation>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Returns the invocations received so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        self.seen.borrow_mut().push(invocation.clone());
        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(InstallerError::StubMismatch {
                message: format!("unexpected invocation of {}", invocation.program.display()),
            });
        };

        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        if call.program != invocation.program || call.args != args {
            return Err(InstallerError::StubMismatch {
                message: format!(
                    "expected {} {:?}, got {} {:?}",
                    call.program.display(),
                    call.args,
                    invocation.program.display(),
                    args
                ),
            });
        }

        call.result
    }
}

/// Fixed directories rooted at a test home directory.
#[derive(Debug, Clone)]
pub struct TestBaseDirs {
    home: Option<PathBuf>,
}

impl TestBaseDirs {
    /// Directories rooted at `home`; configuration lives in `home/.config`.
    #[must_use]
    pub fn new(home: &Path) -> Self {
        Self {
            home: Some(home.to_owned()),
        }
    }

    /// Directories for a host with no resolvable home.
    #[must_use]
    pub const fn homeless() -> Self {
        Self { home: None }
    }
}

impl BaseDirs for TestBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(".config"))
    }
}

/// Hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of_bytes(bytes).into_inner()
}

/// Build a gzip-compressed tarball holding `entries` as regular files with
/// mode `0o755`.
///
/// # Panics
///
/// Panics if the in-memory archive cannot be written.
#[must_use]
pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *data)
            .unwrap_or_else(|err| panic!("append {name}: {err}"));
    }
    let encoder = builder
        .into_inner()
        .unwrap_or_else(|err| panic!("finish tar: {err}"));
    encoder
        .finish()
        .unwrap_or_else(|err| panic!("finish gzip: {err}"))
}

/// Render a checksum manifest with one line per `(digest, file name)`.
#[must_use]
pub fn checksum_manifest_text(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .map(|(digest, name)| format!("{digest}  {name}\n"))
        .collect()
}

/// Render a minimal latest-release JSON payload for `tag`.
#[must_use]
pub fn latest_release_json(tag: &str) -> String {
    format!(r#"{{"tag_name": "{tag}", "name": "Release {tag}", "draft": false}}"#)
}

/// Canned answer served by [`StubDownloader`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Respond with these bytes.
    Body(Vec<u8>),
    /// Respond with HTTP 404.
    NotFound,
    /// Fail the request with this reason.
    Fail(String),
}

/// An in-memory `ArtefactDownloader` keyed by exact URL.
///
/// Unknown URLs answer [`StubResponse::NotFound`]. Every requested URL is
/// recorded in order.
#[derive(Debug, Default)]
pub struct StubDownloader {
    responses: BTreeMap<String, StubResponse>,
    requests: RefCell<Vec<String>>,
}

impl StubDownloader {
    /// Creates a downloader that answers every URL with 404.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `url`, replacing any earlier answer.
    pub fn serve(&mut self, url: impl Into<String>, response: StubResponse) {
        self.responses.insert(url.into(), response);
    }

    /// Serve `body` for `url`.
    pub fn serve_body(&mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.serve(url, StubResponse::Body(body.into()));
    }

    /// Returns the URLs requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn respond(&self, url: &str) -> std::result::Result<Vec<u8>, DownloadError> {
        self.requests.borrow_mut().push(url.to_owned());
        match self.responses.get(url) {
            Some(StubResponse::Body(body)) => Ok(body.clone()),
            Some(StubResponse::Fail(reason)) => Err(DownloadError::HttpError {
                url: url.to_owned(),
                reason: reason.clone(),
            }),
            Some(StubResponse::NotFound) | None => Err(DownloadError::NotFound {
                url: url.to_owned(),
            }),
        }
    }
}

impl ArtefactDownloader for StubDownloader {
    fn fetch_text(&self, url: &str) -> std::result::Result<String, DownloadError> {
        let body = self.respond(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn fetch_to_file(&self, url: &str, dest: &Path) -> std::result::Result<u64, DownloadError> {
        let body = self.respond(url)?;
        std::fs::write(dest, &body)?;
        if body.is_empty() {
            return Err(DownloadError::Empty {
                url: url.to_owned(),
            });
        }
        Ok(body.len() as u64)
    }
}
