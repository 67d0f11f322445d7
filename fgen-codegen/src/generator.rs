//! Generator interface.

use eyre::Result;
use fgen_core::{FileId, SourceFile};
use fgen_syntax::{CompilationUnit, Scope, SyntaxNode};

use crate::{directive::DirectiveMap, pipeline::CompilationContext, pipeline::Diagnostic};

/// What a generator sees of the file it runs on.
///
/// `text` and `tree` are the current state of the file: the original source
/// for the first generator, the output of the previous applied generator
/// after that. `directives` always describes the original source.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    pub file: FileId,
    pub source: &'a SourceFile,
    pub text: &'a str,
    pub tree: &'a CompilationUnit,
    pub directives: &'a DirectiveMap,
    pub compilation: &'a CompilationContext<'a>,
}

/// A source-to-source generator.
///
/// A fresh instance is created for every file, so implementations can keep
/// per-file state in `self` without resetting it.
///
/// The pipeline calls [`prepare`](Generator::prepare) once, then
/// [`visit`](Generator::visit) for every node of the current tree in
/// pre-order, then [`generate`](Generator::generate) once.
pub trait Generator: Send {
    /// Capture whatever the generator needs from the context.
    ///
    /// # Errors
    ///
    /// An error aborts generation for the file.
    #[allow(unused_variables)]
    fn prepare(&mut self, cx: &GenerationContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Observe one node along with the declarations enclosing it.
    fn visit(&mut self, node: SyntaxNode<'_>, scope: &Scope<'_>);

    /// Produce the result for the file.
    ///
    /// # Errors
    ///
    /// An error aborts generation for the file; nothing is written for it.
    fn generate(&mut self) -> Result<GenerationResult>;
}

/// Outcome of one generator on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Nothing to do; the file state is passed on untouched.
    Skipped,
    Generated(Generated),
}

impl GenerationResult {
    pub fn is_skipped(&self) -> bool {
        matches!(self, GenerationResult::Skipped)
    }
}

/// New text for a file, replacing the text consumed by later generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub source: String,
    /// Tree of `source`, when the generator already has one. Otherwise the
    /// pipeline parses `source` itself.
    pub tree: Option<CompilationUnit>,
    /// Artifact name without extension, e.g. `QueryType`.
    pub expected_name: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            tree: None,
            expected_name: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_tree(mut self, tree: CompilationUnit) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn expected_name(mut self, name: impl Into<String>) -> Self {
        self.expected_name = Some(name.into());
        self
    }

    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

impl From<Generated> for GenerationResult {
    fn from(generated: Generated) -> Self {
        GenerationResult::Generated(generated)
    }
}
