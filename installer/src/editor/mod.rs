//! Editor discovery and extension installation.
//!
//! # Sub-modules
//!
//! - [`discovery`] - Locate a supported editor's CLI (`EditorCandidate`).
//! - [`extension`] - Download and install the extension package.

pub mod discovery;
pub mod extension;
