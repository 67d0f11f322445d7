//! Core utilities and types for the fgen code generator.
//!
//! This crate provides the project model handed to the pipeline by the build
//! integration, and the file writing primitives used when emitting artifacts.

mod file;
mod project;
mod utils;

// File operations
pub use file::{WriteResult, write_file};
// Project model
pub use project::{BuildTarget, DEFAULT_CONFIGURATIONS, FileId, Project, SourceFile};
// Path utilities
pub use utils::{file_stem, is_path_segment};
