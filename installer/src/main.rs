//! Developer environment installer CLI entrypoint.
//!
//! This binary makes sure the security scanner is installed and verified,
//! then installs its extension into the first supported editor it finds.
//! Progress is logged to stderr; any fatal error exits with status 1.

use clap::Parser;
use devenv_installer::cli::Cli;
use devenv_installer::config::InstallerConfig;
use devenv_installer::dirs::SystemBaseDirs;
use devenv_installer::error::{InstallerError, Result};
use devenv_installer::install_flow::{RunEnvironment, RunOptions, run};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run_cli(&cli, &mut stderr));
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run_cli(cli: &Cli, stderr: &mut dyn std::io::Write) -> Result<()> {
    let dirs = SystemBaseDirs::new().ok_or(InstallerError::HomeDirectoryUnavailable)?;
    let mut config = InstallerConfig::load(cli.config.as_deref(), &dirs)?;
    config.apply_overrides(cli);

    let mut env = RunEnvironment::from_process(&dirs);
    run(&config, RunOptions::from(cli), &mut env, stderr)?;
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`/`-q`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        log::debug!("keeping the existing log subscriber: {err}");
    }
}

fn exit_code_for_run_result(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{err}");
            1
        }
    }
}
