//! Output formatting for the installer CLI.
//!
//! Progress is reported through the `log` facade. This module covers the
//! plain-text blocks written straight to stderr: the dry-run plan and the
//! closing summary.

use std::io::Write;
use std::path::Path;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// What a run would do, shown by `--dry-run`.
///
/// # Example
///
/// ```
/// use devenv_installer::output::DryRunInfo;
/// use std::path::Path;
///
/// let info = DryRunInfo {
///     tool: "vulncheck",
///     tool_path: None,
///     archive_url: Some("https://get.vulncheck.dev/vulncheck?os=darwin&arch=arm64&type=tar.gz"),
///     install_dir: Path::new("/Users/dev/.local/bin"),
///     profile: Some(Path::new("/Users/dev/.zshrc")),
///     verify_checksums: true,
///     editor: None,
///     extension_url: "https://get.vulncheck.dev/vscode/vulncheck.vsix",
///     skip_tool: false,
///     skip_extension: false,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("not installed"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Tool binary name.
    pub tool: &'a str,
    /// Where the tool already resolves, if it does.
    pub tool_path: Option<&'a Path>,
    /// Archive that would be downloaded; `None` when the platform is
    /// unsupported.
    pub archive_url: Option<&'a str>,
    /// Directory that would receive the binary.
    pub install_dir: &'a Path,
    /// Shell start-up file that would be updated.
    pub profile: Option<&'a Path>,
    /// Whether the archive would be checked against the manifest.
    pub verify_checksums: bool,
    /// Editor CLI that would receive the extension.
    pub editor: Option<&'a Path>,
    /// Extension package URL.
    pub extension_url: &'a str,
    /// Whether the tool step is skipped.
    pub skip_tool: bool,
    /// Whether the extension step is skipped.
    pub skip_extension: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec!["Dry run - no files will be modified".to_owned(), String::new()];

        if self.skip_tool {
            lines.push(format!("Tool: {} (skipped)", self.tool));
        } else if let Some(path) = self.tool_path {
            lines.push(format!("Tool: {} (already installed at {})", self.tool, path.display()));
        } else {
            lines.push(format!("Tool: {} (not installed)", self.tool));
            lines.push(format!(
                "Archive: {}",
                self.archive_url.unwrap_or("unavailable for this platform")
            ));
            lines.push(format!("Install directory: {}", self.install_dir.display()));
            lines.push(format!("Verify checksums: {}", self.verify_checksums));
            lines.push(format!(
                "Shell profile: {}",
                self.profile
                    .map_or_else(|| "unchanged".to_owned(), |path| path.display().to_string())
            ));
        }

        lines.push(String::new());
        if self.skip_extension {
            lines.push("Extension: skipped".to_owned());
        } else {
            lines.push(format!("Extension: {}", self.extension_url));
            lines.push(format!(
                "Editor: {}",
                self.editor
                    .map_or_else(|| "none found".to_owned(), |path| path.display().to_string())
            ));
        }

        lines.join("\n")
    }
}

/// Format the closing line after a successful run.
#[must_use]
pub fn success_message(tool: &str, tool_path: Option<&Path>, extension_installed: bool) -> String {
    let tool_part = tool_path.map_or_else(
        || format!("{tool} skipped"),
        |path| format!("{tool} ready at {}", path.display()),
    );
    let extension_part = if extension_installed {
        "extension installed"
    } else {
        "extension skipped"
    };
    format!("Done: {tool_part}; {extension_part}.")
}
