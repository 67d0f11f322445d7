//! Loading and validation of `fgen.toml` project manifests.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;

pub use error::{Error, Result, SourceContext};
pub use manifest::{
    DEFAULT_EXCLUDE, DEFAULT_SOURCES, FgenToml, MANIFEST_FILE, Manifest, OutputConfig,
    ProjectConfig, parse_manifest,
};
