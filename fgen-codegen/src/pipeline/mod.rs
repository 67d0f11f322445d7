//! Generation pipeline.
//!
//! A [`Pipeline`] takes a [`Project`](fgen_core::Project) through four
//! phases:
//!
//! - parse every file once into a shared [`CompilationContext`]
//! - scan each tree for `generate` directives; files without any stop here
//! - fold the registered generators over each remaining file
//! - emit the final text of every modified file into each build target
//!
//! Failures are isolated per file and collected as [`Diagnostic`]s in the
//! returned [`GenerationReport`].
//!
//! # Example
//!
//! ```ignore
//! use fgen_codegen::pipeline::Pipeline;
//!
//! let report = Pipeline::new().run(&project)?;
//! if report.has_errors() {
//!     eprintln!("{}", report.to_json()?);
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
mod report;
mod runner;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use report::{FileOutcome, FileReport, GenerationReport};
pub use runner::Pipeline;
