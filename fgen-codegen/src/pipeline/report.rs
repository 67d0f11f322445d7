//! What a pipeline run did, file by file.

use std::path::PathBuf;

use eyre::Result;
use fgen_core::FileId;
use serde::Serialize;

use super::{Diagnostic, Phase, Severity};
use crate::emit::{OutputArtifact, TargetWrite, WriteStatus};

/// Result of [`Pipeline::run`](super::Pipeline::run) or
/// [`Pipeline::preview`](super::Pipeline::preview).
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub project: String,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: FileId,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file could not be parsed.
    ParseFailed { message: String },
    /// No declaration carries a directive.
    NoDirectives,
    /// Every generator skipped the file.
    Skipped,
    /// Generators ran and the artifact was handed to the emitter.
    Emitted {
        artifact: OutputArtifact,
        generators: Vec<String>,
        writes: Vec<TargetWrite>,
    },
    /// A generator failed; nothing was written for the file.
    Failed { generator: String, message: String },
}

impl GenerationReport {
    pub fn new(project: impl Into<String>, dry_run: bool) -> Self {
        Self {
            project: project.into(),
            dry_run,
            files: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    pub fn add_error(&mut self, phase: Phase, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    pub fn add_warning(&mut self, phase: Phase, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    pub fn add_info(&mut self, phase: Phase, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// Artifacts produced in this run, in file order.
    pub fn artifacts(&self) -> impl Iterator<Item = &OutputArtifact> {
        self.files.iter().filter_map(|f| match &f.outcome {
            FileOutcome::Emitted { artifact, .. } => Some(artifact),
            _ => None,
        })
    }

    /// Every target write, in file order.
    pub fn writes(&self) -> impl Iterator<Item = &TargetWrite> {
        self.files.iter().flat_map(|f| match &f.outcome {
            FileOutcome::Emitted { writes, .. } => writes.as_slice(),
            _ => &[][..],
        })
    }

    /// Number of paths whose content actually changed on disk.
    pub fn written_count(&self) -> usize {
        self.writes()
            .filter(|w| matches!(w.status, WriteStatus::Written))
            .count()
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| {
            matches!(
                f.outcome,
                FileOutcome::Failed { .. } | FileOutcome::ParseFailed { .. }
            )
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
