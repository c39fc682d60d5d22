//! Editor command-line entry point discovery.
//!
//! Supported editors ship as application bundles with their CLI at a fixed
//! path inside the bundle. Discovery probes every search directory in order
//! and, within each, every application name in preference order. The first
//! entry point that exists wins, so an editor in an earlier directory beats
//! a preferred editor in a later one.

use std::path::{Path, PathBuf};

/// An editor whose command-line entry point exists on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCandidate {
    /// Application bundle name, for example `Cursor.app`.
    pub app_name: String,
    /// Directory the bundle was found in.
    pub install_dir: PathBuf,
    /// Full path of the command-line entry point.
    pub cli_path: PathBuf,
}

/// Find the first existing `dir/app/cli_suffix` with directories as the
/// outer loop and application names as the inner loop.
///
/// # Examples
///
/// ```no_run
/// use devenv_installer::editor::discovery::find_editor_command;
/// use std::path::{Path, PathBuf};
///
/// let found = find_editor_command(
///     &["Visual Studio Code.app".to_owned()],
///     &[PathBuf::from("/Applications")],
///     Path::new("Contents/Resources/app/bin/code"),
/// );
/// if let Some(editor) = found {
///     println!("{}", editor.cli_path.display());
/// }
/// ```
#[must_use]
pub fn find_editor_command(
    app_names: &[String],
    search_dirs: &[PathBuf],
    cli_suffix: &Path,
) -> Option<EditorCandidate> {
    for dir in search_dirs {
        for app_name in app_names {
            let cli_path = dir.join(app_name).join(cli_suffix);
            log::debug!("probing {}", cli_path.display());
            if cli_path.is_file() {
                return Some(EditorCandidate {
                    app_name: app_name.clone(),
                    install_dir: dir.clone(),
                    cli_path,
                });
            }
        }
    }
    None
}

/// Render the probed directories for an error message.
#[must_use]
pub fn describe_search(search_dirs: &[PathBuf]) -> String {
    if search_dirs.is_empty() {
        return "no search directories configured".to_owned();
    }
    search_dirs
        .iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
