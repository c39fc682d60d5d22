//! Run orchestration: tool provisioning followed by extension install.
//!
//! The two pipelines run in order and the run stops at the first fatal
//! error. The tool step hands its updated [`SearchPath`] to the extension
//! step, which passes it to the editor process as `PATH`.

use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::artefact::download::{ArtefactDownloader, HttpDownloader};
use crate::artefact::extraction::{ArchiveExtractor, TarGzExtractor};
use crate::cli::Cli;
use crate::config::InstallerConfig;
use crate::dirs::BaseDirs;
use crate::editor::discovery::{EditorCandidate, find_editor_command};
use crate::editor::extension::{ExtensionArtifact, ExtensionRequest, install_extension_with};
use crate::error::{InstallerError, Result};
use crate::output::{DryRunInfo, success_message, write_stderr_line};
use crate::platform::PlatformDescriptor;
use crate::process::{CommandExecutor, SystemCommandExecutor};
use crate::profile::ShellKind;
use crate::search_path::SearchPath;
use crate::tool::{ToolConfig, ToolStatus, ensure_tool_with};

/// Which steps run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the tool pipeline.
    pub skip_tool: bool,
    /// Skip the extension pipeline.
    pub skip_extension: bool,
    /// Leave the shell start-up file alone.
    pub no_profile: bool,
    /// Print the plan instead of acting on it.
    pub dry_run: bool,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            skip_tool: cli.skip_tool,
            skip_extension: cli.skip_extension,
            no_profile: cli.no_profile,
            dry_run: cli.dry_run,
        }
    }
}

/// Host state the run reads and updates.
pub struct RunEnvironment<'a> {
    /// Directory provider.
    pub dirs: &'a dyn BaseDirs,
    /// Value of `SHELL`.
    pub shell: Option<String>,
    /// The run's executable search path.
    pub search_path: SearchPath,
    /// Target platform; detected from the host when `None`.
    pub platform: Option<PlatformDescriptor>,
    /// Parent of the temporary download directory.
    pub temp_root: Option<PathBuf>,
    /// Where the extension package is written; the system temporary
    /// directory when `None`.
    pub extension_path: Option<PathBuf>,
}

impl<'a> RunEnvironment<'a> {
    /// Capture `SHELL` and `PATH` from the current process.
    #[must_use]
    pub fn from_process(dirs: &'a dyn BaseDirs) -> Self {
        Self {
            dirs,
            shell: std::env::var("SHELL").ok(),
            search_path: SearchPath::from_env(),
            platform: None,
            temp_root: None,
            extension_path: None,
        }
    }
}

/// Network, archive, and process implementations used by a run.
pub struct Collaborators<'a> {
    /// HTTP client.
    pub downloader: &'a dyn ArtefactDownloader,
    /// Archive reader.
    pub extractor: &'a dyn ArchiveExtractor,
    /// Process runner.
    pub executor: &'a dyn CommandExecutor,
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Outcome of the tool step, unless skipped.
    pub tool: Option<ToolStatus>,
    /// Editor that received the extension, unless skipped.
    pub editor: Option<EditorCandidate>,
}

/// Run both pipelines with production collaborators.
///
/// # Errors
///
/// Returns the first fatal error from either pipeline.
pub fn run(
    config: &InstallerConfig,
    options: RunOptions,
    env: &mut RunEnvironment<'_>,
    stderr: &mut dyn Write,
) -> Result<RunSummary> {
    let downloader = HttpDownloader::new(config.http_timeout());
    let executor = SystemCommandExecutor::new(config.editor_timeout());
    let collaborators = Collaborators {
        downloader: &downloader,
        extractor: &TarGzExtractor,
        executor: &executor,
    };
    run_with(config, options, env, &collaborators, stderr)
}

/// Testable inner function with injected collaborators.
///
/// # Errors
///
/// Returns [`InstallerError::HomeDirectoryUnavailable`] when no home
/// directory is known, otherwise the first fatal error from either
/// pipeline.
pub fn run_with(
    config: &InstallerConfig,
    options: RunOptions,
    env: &mut RunEnvironment<'_>,
    collaborators: &Collaborators<'_>,
    stderr: &mut dyn Write,
) -> Result<RunSummary> {
    let home = env
        .dirs
        .home_dir()
        .ok_or(InstallerError::HomeDirectoryUnavailable)?;
    let install_dir = env
        .dirs
        .bin_dir()
        .ok_or(InstallerError::HomeDirectoryUnavailable)?;
    let profile = (!options.no_profile)
        .then(|| ShellKind::from_shell_var(env.shell.as_deref()).profile_path(&home));
    let search_dirs = config.editor_search_dirs(&home);
    let source = config.release_source();

    if options.dry_run {
        let platform = env.platform.map_or_else(PlatformDescriptor::detect, Ok);
        let archive_url = platform.ok().map(|platform| source.archive_url(&platform));
        let tool_path = env.search_path.resolve(source.tool());
        let editor = find_editor(config, &search_dirs);
        let info = DryRunInfo {
            tool: source.tool(),
            tool_path: tool_path.as_deref(),
            archive_url: archive_url.as_deref(),
            install_dir: &install_dir,
            profile: profile.as_deref(),
            verify_checksums: config.verify_checksums,
            editor: editor.as_ref().map(|found| found.cli_path.as_path()),
            extension_url: &config.extension_url,
            skip_tool: options.skip_tool,
            skip_extension: options.skip_extension,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(RunSummary::default());
    }

    let mut summary = RunSummary::default();

    if !options.skip_tool {
        let tool_config = ToolConfig {
            source: &source,
            platform: env.platform,
            install_dir: &install_dir,
            policy: config.verification_policy(),
            profile: profile.as_deref(),
            temp_root: env.temp_root.as_deref(),
            http_timeout: config.http_timeout(),
        };
        let status = ensure_tool_with(
            &tool_config,
            &mut env.search_path,
            collaborators.downloader,
            collaborators.extractor,
        )?;
        summary.tool = Some(status);
    }

    if !options.skip_extension {
        let editor = find_editor(config, &search_dirs);
        let artifact = match &env.extension_path {
            Some(path) => ExtensionArtifact::new(config.extension_url.as_str(), path.clone()),
            None => ExtensionArtifact::in_temp_dir(
                config.extension_url.as_str(),
                &config.extension_file_name,
            ),
        };
        let request = ExtensionRequest {
            editor_cmd: editor.as_ref().map(|found| found.cli_path.as_path()),
            searched: &search_dirs,
            artifact: &artifact,
            search_path: &env.search_path,
        };
        install_extension_with(&request, collaborators.downloader, collaborators.executor)?;
        summary.editor = editor;
    }

    write_stderr_line(
        stderr,
        success_message(
            source.tool(),
            summary.tool.as_ref().map(ToolStatus::binary_path),
            summary.editor.is_some(),
        ),
    );
    Ok(summary)
}

fn find_editor(config: &InstallerConfig, search_dirs: &[PathBuf]) -> Option<EditorCandidate> {
    let editor = find_editor_command(
        &config.editor_apps,
        search_dirs,
        Path::new(&config.editor_cli_suffix),
    );
    if let Some(found) = &editor {
        info!("Found {} in {}", found.app_name, found.install_dir.display());
    }
    editor
}

#[cfg(test)]
#[path = "install_flow_tests.rs"]
mod tests;
