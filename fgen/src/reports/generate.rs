//! Generate command report data structures.

use std::path::{Path, PathBuf};

use fgen_codegen::{GenerationReport, WriteStatus, pipeline::FileOutcome};

use super::output::{Output, Report};

/// Report data from a generation run.
#[derive(Debug)]
pub struct GenerateReport {
    /// Project root; paths are shown relative to it.
    pub root: PathBuf,
    pub generation: GenerationReport,
}

impl GenerateReport {
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn emitted_count(&self) -> usize {
        self.generation
            .files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Emitted { .. }))
            .count()
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        let generation = &self.generation;

        for diagnostic in &generation.diagnostics {
            out.diagnostic(&diagnostic.to_string());
        }
        if !generation.diagnostics.is_empty() {
            out.newline();
        }

        if generation.dry_run {
            for artifact in generation.artifacts() {
                out.divider(&artifact.file_name);
                out.preformatted(&artifact.content);
            }
        }

        out.key_value("Project", &generation.project);
        out.key_value(
            "Files",
            &format!(
                "{} scanned, {} emitted",
                generation.files.len(),
                self.emitted_count()
            ),
        );

        if generation.artifacts().next().is_none() {
            out.newline();
            out.preformatted("Nothing to generate.");
            return;
        }

        out.newline();
        if generation.dry_run {
            out.section("Would write");
        } else {
            out.section("Generated");
        }
        for write in generation.writes() {
            let path = self.display_path(&write.path);
            match &write.status {
                WriteStatus::Written => out.added_item(&path),
                WriteStatus::Unchanged => out.list_item(&format!("{path} (unchanged)")),
                WriteStatus::Failed(reason) => out.list_item(&format!("! {path}: {reason}")),
                WriteStatus::DryRun => out.list_item(&path),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fgen_codegen::Pipeline;
    use fgen_core::Project;
    use tempfile::TempDir;

    use super::*;
    use crate::reports::output::RecordingOutput;

    fn render(report: &GenerateReport) -> Vec<String> {
        let mut out = RecordingOutput::default();
        report.render(&mut out);
        out.lines
    }

    #[test]
    fn test_written_paths_are_relative_to_root() {
        let temp = TempDir::new().unwrap();
        let project = Project::new("P", temp.path())
            .framework("net7.0")
            .with_configurations(["Debug"])
            .file(
                "Q.cs",
                "namespace N;\n// generate query\npublic class Q { public int X() { return 1; } }\n",
            );
        let report = GenerateReport {
            root: temp.path().to_path_buf(),
            generation: Pipeline::new().run(&project).unwrap(),
        };

        let lines = render(&report);
        assert!(lines.contains(&"Files: 1 scanned, 1 emitted".to_string()));
        assert!(lines.contains(&format!(
            "+ {}",
            Path::new("obj/Debug/net7.0/fgen_generated/QueryType.g.cs").display()
        )));
    }

    #[test]
    fn test_nothing_to_generate() {
        let temp = TempDir::new().unwrap();
        let project = Project::new("P", temp.path())
            .framework("net7.0")
            .file("Plain.cs", "class Plain { }");
        let report = GenerateReport {
            root: temp.path().to_path_buf(),
            generation: Pipeline::new().preview(&project).unwrap(),
        };

        assert_eq!(render(&report).last().map(String::as_str), Some("Nothing to generate."));
    }
}
