//! CLI argument definitions for the devenv installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::Parser;

/// Provision the security scanner and its editor extension.
#[derive(Parser, Debug, Clone)]
#[command(name = "devenv-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Provision the security scanner and its editor extension.\n\n",
    "The installer first makes sure the scanner binary is on PATH. When it is ",
    "missing, the newest release archive for this platform is downloaded, checked ",
    "against the published SHA-256 manifest, and installed into ~/.local/bin. ",
    "The directory is added to your shell start-up file.\n\n",
    "It then finds a supported editor (Visual Studio Code, Cursor or Windsurf) ",
    "and installs the scanner's extension into it.",
))]
#[command(after_help = concat!(
    "CONFIGURATION:\n",
    "  Settings are read from ~/.config/devenv-installer/config.toml when present.\n",
    "  Command-line flags override the file.\n\n",
    "EXAMPLES:\n",
    "  Provision the scanner and the extension:\n",
    "    $ devenv-installer\n\n",
    "  Only install the scanner binary:\n",
    "    $ devenv-installer --skip-extension\n\n",
    "  Preview without downloading anything:\n",
    "    $ devenv-installer --dry-run\n\n",
    "  Show debug logging:\n",
    "    $ devenv-installer -v\n",
))]
pub struct Cli {
    /// Read settings from this TOML file instead of the default location.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Override the tool binary name.
    #[arg(long, value_name = "NAME")]
    pub tool: Option<String>,

    /// Override the editor extension download URL.
    #[arg(long, value_name = "URL")]
    pub extension_url: Option<String>,

    /// Do not check for or install the tool binary.
    #[arg(long)]
    pub skip_tool: bool,

    /// Do not install the editor extension.
    #[arg(long)]
    pub skip_extension: bool,

    /// Do not modify the shell start-up file.
    #[arg(long)]
    pub no_profile: bool,

    /// Show the resolved plan and exit without downloading or writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter directive implied by `-v` and `-q`.
    ///
    /// `RUST_LOG` takes precedence over this value when set.
    ///
    /// # Examples
    ///
    /// ```
    /// use devenv_installer::cli::Cli;
    ///
    /// let cli = Cli { verbosity: 1, ..Cli::default() };
    /// assert_eq!(cli.log_directive(), "debug");
    /// ```
    #[must_use]
    pub const fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

impl Default for Cli {
    /// Creates a `Cli` with no overrides and every step enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use devenv_installer::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert!(!cli.dry_run);
    /// assert!(cli.tool.is_none());
    /// ```
    fn default() -> Self {
        Self {
            config: None,
            tool: None,
            extension_url: None,
            skip_tool: false,
            skip_extension: false,
            no_profile: false,
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
