//! Check command report data structures.

use std::path::PathBuf;

use fgen_codegen::Diagnostic;

use super::output::{Output, Report};

/// A directive found while scanning.
#[derive(Debug)]
pub struct DirectiveInfo {
    /// `path:line` of the tagged declaration.
    pub location: String,
    /// Qualified name of the declaration.
    pub declaration: String,
    pub tags: Vec<String>,
}

/// Report data from parsing and scanning a project.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    pub project: String,
    pub file_count: usize,
    /// Build targets as `configuration/framework`.
    pub targets: Vec<String>,
    pub directives: Vec<DirectiveInfo>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.severity.is_error())
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for diagnostic in &self.diagnostics {
            out.diagnostic(&diagnostic.to_string());
        }

        if !self.diagnostics.is_empty() {
            out.newline();
        }

        if self.is_valid() {
            out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
            out.newline();
        }

        out.key_value("Project", &self.project);
        out.key_value("Files", &self.file_count.to_string());
        out.key_value("Targets", &self.targets.join(", "));
        out.newline();

        if self.directives.is_empty() {
            out.preformatted("No `// generate` directives found.");
            return;
        }

        out.section(&format!(
            "{} directive{}",
            self.directives.len(),
            if self.directives.len() == 1 { "" } else { "s" }
        ));
        for directive in &self.directives {
            out.list_item(&format!(
                "{} {} [{}]",
                directive.location,
                directive.declaration,
                directive.tags.join(", ")
            ));
        }
    }
}
