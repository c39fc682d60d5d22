//! Developer environment installer library.
//!
//! This crate provisions a security scanner binary and installs its editor
//! extension. Release archives are verified against the published SHA-256
//! manifest before the binary is placed in `~/.local/bin`. It is used by
//! the `devenv-installer` CLI binary and can be driven programmatically with
//! injected downloaders, extractors, and command executors.
//!
//! # Modules
//!
//! - [`artefact`] - Release naming, download, checksum, and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered TOML configuration
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`editor`] - Editor discovery and extension installation
//! - [`error`] - Semantic error types for each failing step
//! - [`install_flow`] - Orchestration of both pipelines
//! - [`output`] - Dry-run and summary formatting
//! - [`platform`] - Host OS and architecture mapping
//! - [`process`] - External command execution with timeouts
//! - [`profile`] - Shell start-up file `PATH` registration
//! - [`search_path`] - The run's explicit executable search path
//! - [`tool`] - Tool presence check and provisioning

pub mod artefact;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod editor;
pub mod error;
pub mod install_flow;
pub mod output;
pub mod platform;
pub mod process;
pub mod profile;
pub mod search_path;
pub mod tool;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
