//! End-to-end exit status tests for `devenv-installer`.
//!
//! These scenarios run the installer binary against a sandboxed home
//! directory, `PATH`, and temporary directory. Nothing here reaches the
//! network: the unreachable server is a closed local port.
#![cfg(unix)]

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SUFFIX: &str = "Contents/Resources/app/bin/code";

struct CliWorld {
    root: TempDir,
    extension_url: RefCell<String>,
    output: RefCell<Option<Output>>,
}

impl CliWorld {
    fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    fn config_path(&self) -> PathBuf {
        self.path("config.toml")
    }

    fn write_config(&self) {
        let config = format!(
            "extension_url = \"{}\"\n\
             editor_apps = [\"Cursor.app\"]\n\
             editor_search_dirs = [\"{}\"]\n\
             editor_cli_suffix = \"{SUFFIX}\"\n\
             http_timeout_secs = 5\n",
            self.extension_url.borrow(),
            self.path("Applications").display(),
        );
        std::fs::write(self.config_path(), config).expect("write config");
    }

    fn run(&self, args: &[&str]) {
        self.write_config();
        let search_path = format!("{}:/usr/bin:/bin", self.path("bin").display());
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_devenv-installer"));
        cmd.arg("--config")
            .arg(self.config_path())
            .args(args)
            .env("HOME", self.path("home"))
            .env("TMPDIR", self.path("tmp"))
            .env("PATH", search_path)
            .env("SHELL", "/bin/zsh")
            .env_remove("RUST_LOG");
        for proxy in ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY", "http_proxy", "https_proxy"] {
            cmd.env_remove(proxy);
        }
        let output = cmd.output().expect("failed to run devenv-installer");
        self.output.replace(Some(output));
    }

    fn stderr(&self) -> String {
        let output = self.output.borrow();
        let output = output.as_ref().expect("output not set");
        String::from_utf8_lossy(&output.stderr).into_owned()
    }

    fn exit_code(&self) -> Option<i32> {
        self.output
            .borrow()
            .as_ref()
            .expect("output not set")
            .status
            .code()
    }
}

fn write_executable(path: &Path) {
    std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create parent dir");
    std::fs::write(path, b"#!/bin/sh\nexit 0\n").expect("write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
}

#[fixture]
fn cli_world() -> CliWorld {
    let root = tempfile::tempdir().expect("temp dir");
    for dir in ["home", "tmp", "bin"] {
        std::fs::create_dir_all(root.path().join(dir)).expect("create sandbox dir");
    }
    CliWorld {
        root,
        extension_url: RefCell::new("http://127.0.0.1:9/vulncheck.vsix".to_owned()),
        output: RefCell::new(None),
    }
}

#[given("a home directory where the tool is already installed")]
fn given_tool_installed(cli_world: &CliWorld) {
    write_executable(&cli_world.path("bin/vulncheck"));
}

#[given("no editor application directory exists")]
fn given_no_editor_dir(cli_world: &CliWorld) {
    assert!(!cli_world.path("Applications").exists());
}

#[given("an editor is installed")]
fn given_editor_installed(cli_world: &CliWorld) {
    let cli = cli_world.path("Applications/Cursor.app").join(SUFFIX);
    write_executable(&cli);
}

#[given("the extension server refuses connections")]
fn given_server_refuses(cli_world: &CliWorld) {
    // Port 9 is the discard service, which is not served on test hosts.
    cli_world
        .extension_url
        .replace("http://127.0.0.1:9/vulncheck.vsix".to_owned());
}

#[when("the installer binary runs")]
fn when_binary_runs(cli_world: &CliWorld) {
    cli_world.run(&[]);
}

#[when("the installer binary runs with \"{args}\"")]
fn when_binary_runs_with(cli_world: &CliWorld, args: String) {
    let args: Vec<&str> = args.split_whitespace().collect();
    cli_world.run(&args);
}

#[then("the exit status is 1")]
fn then_exit_one(cli_world: &CliWorld) {
    assert_eq!(
        cli_world.exit_code(),
        Some(1),
        "stderr: {}",
        cli_world.stderr()
    );
}

#[then("the exit status is 0")]
fn then_exit_zero(cli_world: &CliWorld) {
    assert_eq!(
        cli_world.exit_code(),
        Some(0),
        "stderr: {}",
        cli_world.stderr()
    );
}

#[then("stderr names the missing editor")]
fn then_stderr_names_editor(cli_world: &CliWorld) {
    let stderr = cli_world.stderr();
    assert!(
        stderr.contains("no supported editor found"),
        "unexpected stderr: {stderr}"
    );
    assert!(
        stderr.contains(&cli_world.path("Applications").display().to_string()),
        "unexpected stderr: {stderr}"
    );
}

#[then("no extension package remains in the temporary directory")]
fn then_no_package(cli_world: &CliWorld) {
    assert!(!cli_world.path("tmp/vulncheck.vsix").exists());
}

#[scenario(
    path = "tests/features/cli_exit_status.feature",
    name = "Missing editor exits with status 1"
)]
fn scenario_missing_editor(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario(
    path = "tests/features/cli_exit_status.feature",
    name = "Unreachable extension server exits with status 1"
)]
fn scenario_unreachable_server(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario(
    path = "tests/features/cli_exit_status.feature",
    name = "Skipping both steps exits with status 0"
)]
fn scenario_skip_both(cli_world: CliWorld) {
    let _ = cli_world;
}
