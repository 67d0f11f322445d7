//! Source-to-source generation for fgen.
//!
//! # Module Organization
//!
//! - [`directive`] - `// generate <tag>` directives on type declarations
//! - [`generator`] - The [`Generator`] trait and its results
//! - [`registry`] - Ordered, statically declared generator descriptors
//! - [`generators`] - Builtin generators (`QueryType` aggregation)
//! - [`pipeline`] - Parse, scan, generate and emit a whole project
//! - [`emit`] - Banner, canonical formatting and multi-target writes
//! - [`testing`] - Test utilities (feature-gated)

pub mod directive;
pub mod emit;
pub mod generator;
pub mod generators;
pub mod pipeline;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use directive::{DeclarationId, Directive, DirectiveMap, scan};
pub use emit::{Emitter, OutputArtifact, TargetWrite, WriteStatus};
pub use generator::{GenerationContext, GenerationResult, Generated, Generator};
pub use pipeline::{Diagnostic, GenerationReport, Phase, Pipeline, Severity};
pub use registry::{GeneratorDescriptor, Registry};
