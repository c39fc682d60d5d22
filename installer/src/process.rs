//! External command execution.
//!
//! Commands are described by an [`Invocation`] and run through the
//! [`CommandExecutor`] trait, which returns the captured output and exit
//! status. Callers judge success from the status alone.

use crate::error::{InstallerError, Result};
use log::debug;
use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default time limit for external commands.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run.
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
    /// Value for the child's `PATH`, when it should differ from ours.
    pub path_env: Option<OsString>,
}

impl Invocation {
    /// Describe `program` with `args` and the inherited `PATH`.
    #[must_use]
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            path_env: None,
        }
    }

    /// Override the child's `PATH`.
    #[must_use]
    pub fn with_path_env(mut self, path_env: Option<OsString>) -> Self {
        self.path_env = path_env;
        self
    }
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs the invocation and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::CommandSpawn`] if the program cannot be
    /// started, [`InstallerError::CommandTimeout`] if it does not finish in
    /// time, and any I/O error raised while waiting for it.
    fn run(&self, invocation: &Invocation) -> Result<Output>;
}

/// Executes commands on the host system with a time limit.
///
/// # Examples
///
/// ```no_run
/// use devenv_installer::process::{CommandExecutor, Invocation, SystemCommandExecutor};
///
/// let executor = SystemCommandExecutor::default();
/// let output = executor.run(&Invocation::new("code", ["--version"]))?;
/// assert!(output.status.success());
/// # Ok::<(), devenv_installer::error::InstallerError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandExecutor {
    timeout: Duration,
}

impl SystemCommandExecutor {
    /// Create an executor that kills commands running longer than
    /// `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(path) = &invocation.path_env {
            cmd.env("PATH", path);
        }

        let mut child = cmd.spawn().map_err(|source| InstallerError::CommandSpawn {
            program: invocation.program.clone(),
            source,
        })?;

        // Pipes are read concurrently with the wait.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        match child.wait_timeout(self.timeout)? {
            Some(status) => Ok(Output {
                status,
                stdout: join_reader(stdout)?,
                stderr: join_reader(stderr)?,
            }),
            None => {
                if let Err(err) = child.kill() {
                    debug!("could not kill {}: {err}", invocation.program.display());
                }
                if let Err(err) = child.wait() {
                    debug!("could not reap {}: {err}", invocation.program.display());
                }
                Err(InstallerError::CommandTimeout {
                    program: invocation.program.display().to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

type PipeReader = JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(mut pipe: R) -> PipeReader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_reader(reader: Option<PipeReader>) -> Result<Vec<u8>> {
    let Some(handle) = reader else {
        return Ok(Vec::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| std::io::Error::other("output reader thread panicked"))??;
    Ok(bytes)
}

/// Summarise a failed command's output for an error message.
#[must_use]
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_owned()
    }
}
