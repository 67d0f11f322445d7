//! Parsed view of a whole project, shared by every generator in a run.

use std::sync::Arc;

use fgen_core::{FileId, Project};
use fgen_syntax::{CompilationUnit, ParseError, parse};
use indexmap::IndexMap;
use log::{debug, warn};

/// Every file of a project, parsed once at the start of a run.
///
/// The context is never mutated after [`build`](CompilationContext::build);
/// generators only borrow it.
#[derive(Debug)]
pub struct CompilationContext<'p> {
    project: &'p Project,
    trees: IndexMap<FileId, Arc<CompilationUnit>>,
    failures: IndexMap<FileId, ParseError>,
}

impl<'p> CompilationContext<'p> {
    /// Parse every file of `project`. Files that fail to parse are kept
    /// aside and left out of [`trees`](CompilationContext::trees).
    pub fn build(project: &'p Project) -> Self {
        let mut trees = IndexMap::new();
        let mut failures = IndexMap::new();
        for (id, file) in project.files() {
            match parse(&file.content) {
                Ok(tree) => {
                    trees.insert(id, Arc::new(tree));
                }
                Err(e) => {
                    warn!(
                        "failed to parse {} (line {}): {}",
                        file.path.display(),
                        e.line,
                        e.message
                    );
                    failures.insert(id, e);
                }
            }
        }
        debug!(
            "parsed {} of {} files in project {}",
            trees.len(),
            project.file_count(),
            project.name
        );
        Self {
            project,
            trees,
            failures,
        }
    }

    pub fn project(&self) -> &'p Project {
        self.project
    }

    pub fn tree(&self, id: FileId) -> Option<&Arc<CompilationUnit>> {
        self.trees.get(&id)
    }

    /// Successfully parsed files, in project order.
    pub fn trees(&self) -> impl Iterator<Item = (FileId, &Arc<CompilationUnit>)> {
        self.trees.iter().map(|(id, tree)| (*id, tree))
    }

    pub fn parse_error(&self, id: FileId) -> Option<&ParseError> {
        self.failures.get(&id)
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}
