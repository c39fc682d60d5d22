//! BDD tests for editor discovery and extension installation.

use devenv_installer::artefact::extraction::TarGzExtractor;
use devenv_installer::config::InstallerConfig;
use devenv_installer::editor::discovery::{EditorCandidate, find_editor_command};
use devenv_installer::error::InstallerError;
use devenv_installer::install_flow::{
    Collaborators, RunEnvironment, RunOptions, RunSummary, run_with,
};
use devenv_installer::platform::PlatformDescriptor;
use devenv_installer::search_path::SearchPath;
use devenv_installer::test_utils::{
    ExpectedCall, StubDownloader, StubExecutor, StubResponse, TestBaseDirs, success_output,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::path::{Path, PathBuf};

const SUFFIX: &str = "Contents/Resources/app/bin/code";

struct ExtensionWorld {
    root: tempfile::TempDir,
    dirs: TestBaseDirs,
    config: InstallerConfig,
    downloader: StubDownloader,
    expected_calls: Vec<ExpectedCall>,
    editor_cli: Option<PathBuf>,
    executor: Option<StubExecutor>,
    result: Option<Result<RunSummary, InstallerError>>,
    discovered: Option<EditorCandidate>,
}

impl ExtensionWorld {
    fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    fn package_path(&self) -> PathBuf {
        self.path("downloads/vulncheck.vsix")
    }

    fn result(&self) -> &Result<RunSummary, InstallerError> {
        self.result.as_ref().expect("installer ran")
    }

    fn executor(&self) -> &StubExecutor {
        self.executor.as_ref().expect("installer ran")
    }
}

#[fixture]
fn world() -> ExtensionWorld {
    let root = tempfile::tempdir().expect("temp dir");
    for dir in ["home", "tmp", "usr/bin", "downloads", "Applications"] {
        std::fs::create_dir_all(root.path().join(dir)).expect("create sandbox dir");
    }
    let dirs = TestBaseDirs::new(&root.path().join("home"));
    let config = InstallerConfig {
        editor_apps: vec!["Visual Studio Code.app".to_owned(), "Cursor.app".to_owned()],
        editor_search_dirs: vec![root.path().join("Applications").display().to_string()],
        editor_cli_suffix: SUFFIX.to_owned(),
        ..InstallerConfig::default()
    };
    ExtensionWorld {
        root,
        dirs,
        config,
        downloader: StubDownloader::new(),
        expected_calls: Vec::new(),
        editor_cli: None,
        executor: None,
        result: None,
        discovered: None,
    }
}

#[given("the tool is already installed")]
fn given_tool_present(world: &mut ExtensionWorld) {
    let tool = world.path("usr/bin/vulncheck");
    std::fs::write(&tool, b"#!/bin/sh\n").expect("write tool");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    }
}

#[given("\"{app}\" is installed in \"{dir}\"")]
fn given_editor_installed(world: &mut ExtensionWorld, app: String, dir: String) {
    let cli = world.path(&dir).join(&app).join(SUFFIX);
    std::fs::create_dir_all(cli.parent().expect("bundle dir")).expect("create bundle");
    std::fs::write(&cli, b"#!/bin/sh\n").expect("write editor cli");
    world.editor_cli = Some(cli);
}

#[given("no supported editor is installed")]
fn given_no_editor(world: &mut ExtensionWorld) {
    world.editor_cli = None;
}

#[given("the extension is published")]
fn given_extension_published(world: &mut ExtensionWorld) {
    world
        .downloader
        .serve_body(world.config.extension_url.as_str(), b"PK\x03\x04".to_vec());
    let editor = world.editor_cli.clone().expect("editor installed first");
    let package = world.package_path();
    world.expected_calls.push(ExpectedCall {
        program: editor,
        args: vec![
            "--install-extension".to_owned(),
            package.display().to_string(),
            "--force".to_owned(),
        ],
        result: Ok(success_output()),
    });
}

#[given("the extension download fails")]
fn given_extension_download_fails(world: &mut ExtensionWorld) {
    world.downloader.serve(
        world.config.extension_url.as_str(),
        StubResponse::Fail("connection reset by peer".to_owned()),
    );
}

#[given("editors \"{first}\" and \"{second}\" are searched for in \"{near}\" then \"{far}\"")]
fn given_search_order(
    world: &mut ExtensionWorld,
    first: String,
    second: String,
    near: String,
    far: String,
) {
    world.config.editor_apps = vec![first, second];
    world.config.editor_search_dirs = [near, far]
        .iter()
        .map(|dir| world.path(dir).display().to_string())
        .collect();
}

#[when("the installer runs")]
fn when_installer_runs(world: &mut ExtensionWorld) {
    let executor = StubExecutor::new(std::mem::take(&mut world.expected_calls));
    let platform = PlatformDescriptor::from_parts("darwin", "arm64").expect("supported platform");
    let mut env = RunEnvironment {
        dirs: &world.dirs,
        shell: Some("/bin/zsh".to_owned()),
        search_path: SearchPath::new(vec![world.path("usr/bin")]),
        platform: Some(platform),
        temp_root: Some(world.path("tmp")),
        extension_path: Some(world.package_path()),
    };
    let collaborators = Collaborators {
        downloader: &world.downloader,
        extractor: &TarGzExtractor,
        executor: &executor,
    };
    let mut stderr = Vec::new();
    let result = run_with(
        &world.config,
        RunOptions::default(),
        &mut env,
        &collaborators,
        &mut stderr,
    );
    world.result = Some(result);
    world.executor = Some(executor);
}

#[when("editors are discovered")]
fn when_editors_discovered(world: &mut ExtensionWorld) {
    let home = world.path("home");
    world.discovered = find_editor_command(
        &world.config.editor_apps,
        &world.config.editor_search_dirs(&home),
        Path::new(SUFFIX),
    );
}

#[then("the run succeeds")]
fn then_run_succeeds(world: &mut ExtensionWorld) {
    let result = world.result();
    assert!(result.is_ok(), "expected success, got {result:?}");
}

#[then("the editor was asked to install the package")]
fn then_editor_invoked(world: &mut ExtensionWorld) {
    let executor = world.executor();
    executor.assert_finished();
    let invocations = executor.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].args.first().and_then(|arg| arg.to_str()),
        Some("--install-extension")
    );
}

#[then("no extension package remains")]
fn then_no_package(world: &mut ExtensionWorld) {
    assert!(!world.package_path().exists());
}

#[then("the run fails because no editor was found")]
fn then_editor_not_found(world: &mut ExtensionWorld) {
    let result = world.result();
    assert!(
        matches!(result, Err(InstallerError::EditorNotFound { .. })),
        "expected EditorNotFound, got {result:?}"
    );
}

#[then("no extension download was attempted")]
fn then_no_download(world: &mut ExtensionWorld) {
    assert!(
        !world
            .downloader
            .requests()
            .contains(&world.config.extension_url)
    );
    assert!(world.executor().invocations().is_empty());
}

#[then("the run fails with an extension download error")]
fn then_download_error(world: &mut ExtensionWorld) {
    let result = world.result();
    assert!(
        matches!(
            result,
            Err(InstallerError::Download {
                step: "extension",
                ..
            })
        ),
        "expected extension download error, got {result:?}"
    );
    assert!(world.executor().invocations().is_empty());
}

#[then("the editor found is \"{app}\" in \"{dir}\"")]
fn then_editor_found(world: &mut ExtensionWorld, app: String, dir: String) {
    let found = world.discovered.as_ref().expect("an editor was found");
    assert_eq!(found.app_name, app);
    assert_eq!(found.install_dir, world.path(&dir));
}

#[scenario(
    path = "tests/features/install_extension.feature",
    name = "Extension is installed into the discovered editor"
)]
fn scenario_extension_installed(world: ExtensionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install_extension.feature",
    name = "No editor aborts before any download"
)]
fn scenario_no_editor(world: ExtensionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install_extension.feature",
    name = "Failed extension download leaves no package behind"
)]
fn scenario_download_failure(world: ExtensionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install_extension.feature",
    name = "Earlier search directories win over preferred editors"
)]
fn scenario_search_order(world: ExtensionWorld) {
    let _ = world;
}
