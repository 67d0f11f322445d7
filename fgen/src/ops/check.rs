//! Check operation - parse and scan without generating.

use eyre::Result;
use fgen_codegen::{Diagnostic, Phase, pipeline::CompilationContext, scan};
use fgen_manifest::FgenToml;

use super::project::load_project;
use crate::reports::{CheckReport, DirectiveInfo};

/// Execute the check operation.
///
/// Parses every source file and lists the directives found. Nothing is
/// generated or written.
pub fn check(fgen_toml: &FgenToml) -> Result<CheckReport> {
    let project = load_project(fgen_toml)?;
    let context = CompilationContext::build(&project);

    let mut directives = Vec::new();
    let mut diagnostics = Vec::new();
    for (id, file) in project.files() {
        let location = file.path.display().to_string();

        if let Some(err) = context.parse_error(id) {
            diagnostics.push(Diagnostic::error(Phase::Parse, err.to_string()).at(location));
            continue;
        }
        let Some(tree) = context.tree(id) else {
            continue;
        };

        let map = scan(id, tree);
        diagnostics.extend(map.malformed().iter().map(|m| m.to_diagnostic(&location)));
        directives.extend(map.iter().map(|directive| DirectiveInfo {
            location: format!("{location}:{}", directive.line),
            declaration: directive.declaration.qualified_name.clone(),
            tags: directive.tags.clone(),
        }));
    }

    Ok(CheckReport {
        config_path: fgen_toml.path().to_path_buf(),
        project: project.name.clone(),
        file_count: project.file_count(),
        targets: project.build_targets().iter().map(|t| t.to_string()).collect(),
        directives,
        diagnostics,
    })
}
