//! Shell start-up file registration.
//!
//! After the tool is placed, its install directory is persisted for future
//! sessions by appending an `export PATH=...` block to the user's shell
//! start-up file. The append is skipped when the file already mentions the
//! directory on a `PATH` line, so repeated runs leave exactly one entry.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Marker comment written above the export line.
const BLOCK_MARKER: &str = "# Added by devenv-installer";

/// Shell whose start-up file receives the `PATH` export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShellKind {
    /// zsh, the default on macOS.
    #[default]
    Zsh,
    /// bash.
    Bash,
}

impl ShellKind {
    /// Pick the shell from a `SHELL` value. Anything that is not bash is
    /// treated as zsh.
    ///
    /// # Examples
    ///
    /// ```
    /// use devenv_installer::profile::ShellKind;
    ///
    /// assert_eq!(ShellKind::from_shell_var(Some("/bin/bash")), ShellKind::Bash);
    /// assert_eq!(ShellKind::from_shell_var(None), ShellKind::Zsh);
    /// ```
    #[must_use]
    pub fn from_shell_var(shell: Option<&str>) -> Self {
        let program = shell
            .map(Path::new)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str());
        match program {
            Some("bash") => Self::Bash,
            _ => Self::Zsh,
        }
    }

    /// File name of the shell's start-up file in the home directory.
    #[must_use]
    pub const fn profile_file_name(self) -> &'static str {
        match self {
            Self::Zsh => ".zshrc",
            Self::Bash => ".bash_profile",
        }
    }

    /// Full path of the start-up file under `home`.
    #[must_use]
    pub fn profile_path(self, home: &Path) -> PathBuf {
        home.join(self.profile_file_name())
    }
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// The export block was appended.
    Appended,
    /// The file already exported the directory; nothing was written.
    AlreadyPresent,
}

/// Render the export line for `dir`.
#[must_use]
pub fn export_line(dir: &Path) -> String {
    format!("export PATH=\"{}:$PATH\"", dir.display())
}

/// Return true if any line of `contents` mentions both `PATH` and `dir`.
///
/// When `home` is given and contains `dir`, the `$HOME/...`, `${HOME}/...`
/// and `~/...` spellings of `dir` count as well.
///
/// # Examples
///
/// ```
/// use devenv_installer::profile::mentions_dir_on_path;
/// use std::path::Path;
///
/// let contents = "export PATH=\"$HOME/.local/bin:$PATH\"\n";
/// let dir = Path::new("/Users/dev/.local/bin");
/// assert!(mentions_dir_on_path(contents, dir, Some(Path::new("/Users/dev"))));
/// assert!(!mentions_dir_on_path(contents, dir, None));
/// ```
#[must_use]
pub fn mentions_dir_on_path(contents: &str, dir: &Path, home: Option<&Path>) -> bool {
    let spellings = dir_spellings(dir, home);
    contents.lines().any(|line| {
        line.contains("PATH")
            && spellings
                .iter()
                .any(|spelling| line.contains(spelling.as_str()))
    })
}

fn dir_spellings(dir: &Path, home: Option<&Path>) -> Vec<String> {
    let mut spellings = vec![dir.display().to_string()];
    let relative = home
        .and_then(|home| dir.strip_prefix(home).ok())
        .filter(|rest| !rest.as_os_str().is_empty());
    if let Some(rest) = relative {
        let rest = rest.display();
        spellings.extend([
            format!("$HOME/{rest}"),
            format!("${{HOME}}/{rest}"),
            format!("~/{rest}"),
        ]);
    }
    spellings
}

/// Append the export block for `dir` to `profile` unless it is already
/// present. The file is created if it does not exist.
///
/// The profile's parent directory is taken as the home directory when
/// recognising `$HOME`-relative exports.
///
/// # Errors
///
/// Returns any I/O error raised while reading or appending to the file.
pub fn register_path(profile: &Path, dir: &Path) -> std::io::Result<ProfileUpdate> {
    let contents = match std::fs::read_to_string(profile) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };
    if mentions_dir_on_path(&contents, dir, profile.parent()) {
        return Ok(ProfileUpdate::AlreadyPresent);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(profile)?;
    let separator = if contents.is_empty() || contents.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    write!(
        file,
        "{separator}\n{BLOCK_MARKER}\n{}\n",
        export_line(dir)
    )?;
    Ok(ProfileUpdate::Appended)
}
