//! Formatting and writing of generated artifacts.
//!
//! Every artifact is canonicalized, stamped with [`BANNER`] and written to
//! `obj/<configuration>/<framework>/<folder>/<name>.g.<ext>` for each build
//! target of the project.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use fgen_core::{BuildTarget, Project, WriteResult, is_path_segment, write_file};
use fgen_syntax::format;
use log::{debug, error, info};
use serde::Serialize;

/// Header placed above every artifact, followed by one blank line.
pub const BANNER: &str = "\
// ------------------------------------------------------------------------------
// <auto-generated>
// This file was automatically generated by fgen.
// It is a compilation of all `generate query` classes, related to GraphQL APIs.
// All methods were modified to include execution time and call tracking.
// [Do not modify this file directly, as it will be overwritten.]
// [Do not check this file into source control.]
// [To regenerate this file, run the *fgen* tool.]
// </auto-generated>
// ------------------------------------------------------------------------------
";

/// Folder below each target directory that holds generated files.
pub const DEFAULT_FOLDER: &str = "fgen_generated";

pub const DEFAULT_EXTENSION: &str = "cs";

/// A finished artifact, identical for every build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputArtifact {
    /// Name without extension, e.g. `QueryType`.
    pub name: String,
    /// e.g. `QueryType.g.cs`.
    pub file_name: String,
    #[serde(skip)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum WriteStatus {
    Written,
    /// The file already had this exact content.
    Unchanged,
    Failed(String),
    /// Not attempted: preview run.
    DryRun,
}

/// One artifact copy for one build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetWrite {
    pub target: BuildTarget,
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// Writes artifacts into every build target of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitter {
    folder: String,
    extension: String,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `folder` instead of [`DEFAULT_FOLDER`].
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Use `extension` (without the dot) instead of [`DEFAULT_EXTENSION`].
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Canonicalize `source` and prepend the banner.
    pub fn render(&self, source: &str) -> Result<String> {
        let formatted = format(source).wrap_err("generated source does not parse")?;
        Ok(format!("{BANNER}\n{formatted}"))
    }

    pub fn file_name(&self, name: &str) -> String {
        format!("{name}.g.{}", self.extension)
    }

    /// Build the artifact called `name` from generated `source`.
    pub fn artifact(&self, name: &str, source: &str) -> Result<OutputArtifact> {
        if !is_path_segment(name) {
            bail!("invalid artifact name `{name}`");
        }
        Ok(OutputArtifact {
            name: name.to_string(),
            file_name: self.file_name(name),
            content: self.render(source)?,
        })
    }

    /// Generated folder of `target`.
    pub fn output_dir(&self, project: &Project, target: &BuildTarget) -> PathBuf {
        target.output_dir(&project.root, &self.folder)
    }

    pub fn path(&self, project: &Project, target: &BuildTarget, artifact: &OutputArtifact) -> PathBuf {
        self.output_dir(project, target).join(&artifact.file_name)
    }

    /// Paths `artifact` would be written to, without touching the disk.
    pub fn plan(&self, project: &Project, artifact: &OutputArtifact) -> Vec<TargetWrite> {
        project
            .build_targets()
            .into_iter()
            .map(|target| TargetWrite {
                path: self.path(project, &target, artifact),
                target,
                status: WriteStatus::DryRun,
            })
            .collect()
    }

    /// Write `artifact` for every build target.
    ///
    /// A failing path does not stop the others; its status carries the
    /// error.
    pub fn write(&self, project: &Project, artifact: &OutputArtifact) -> Vec<TargetWrite> {
        let mut writes = self.plan(project, artifact);
        for write in &mut writes {
            write.status = match write_file(&write.path, &artifact.content) {
                Ok(WriteResult::Written) => {
                    debug!("wrote {}", write.path.display());
                    WriteStatus::Written
                }
                Ok(WriteResult::Unchanged) => WriteStatus::Unchanged,
                Err(e) => {
                    error!("failed to write {}: {e:#}", write.path.display());
                    WriteStatus::Failed(format!("{e:#}"))
                }
            };
        }
        writes
    }

    /// Remove the generated folder of every build target.
    ///
    /// Returns the folders that existed. With `dry_run` nothing is removed.
    pub fn clean(&self, project: &Project, dry_run: bool) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for target in project.build_targets() {
            let dir = self.output_dir(project, &target);
            if !dir.is_dir() {
                continue;
            }
            if !dry_run {
                remove_dir(&dir)?;
                info!("removed {}", dir.display());
            }
            removed.push(dir);
        }
        Ok(removed)
    }
}

fn remove_dir(dir: &Path) -> Result<()> {
    std::fs::remove_dir_all(dir).wrap_err_with(|| format!("failed to remove '{}'", dir.display()))
}
