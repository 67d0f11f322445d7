//! Manifest types for fgen.toml files.

mod file;
mod parse;

use std::path::PathBuf;

use fgen_core::Project;
pub use file::FgenToml;
pub use parse::parse_manifest;
use serde::Deserialize;
use toml::Spanned;

/// File name looked up when no manifest path is given.
pub const MANIFEST_FILE: &str = "fgen.toml";

/// Source directories walked when `project.sources` is absent.
pub const DEFAULT_SOURCES: &[&str] = &["."];

/// Directory names skipped when `project.exclude` is absent.
pub const DEFAULT_EXCLUDE: &[&str] = &["bin", "obj"];

/// Root manifest for fgen.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project: ProjectConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: Spanned<String>,

    /// Target framework monikers, e.g. `net7.0`.
    pub frameworks: Spanned<Vec<Spanned<String>>>,

    /// Build configurations; `Debug` and `Release` when absent.
    #[serde(default)]
    pub configurations: Option<Spanned<Vec<Spanned<String>>>>,

    /// Directories holding source files, relative to the manifest.
    #[serde(default)]
    pub sources: Option<Vec<String>>,

    /// Directory names skipped while looking for source files.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

impl ProjectConfig {
    pub fn name(&self) -> &str {
        self.name.get_ref()
    }

    pub fn frameworks(&self) -> Vec<String> {
        values(self.frameworks.get_ref())
    }

    /// Configured build configurations, if any.
    pub fn configurations(&self) -> Option<Vec<String>> {
        self.configurations.as_ref().map(|c| values(c.get_ref()))
    }

    pub fn sources(&self) -> Vec<String> {
        self.sources
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect())
    }

    pub fn exclude(&self) -> Vec<String> {
        self.exclude
            .clone()
            .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect())
    }
}

/// `[output]` section. Unset keys fall back to the emitter defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Folder below `obj/<configuration>/<framework>`.
    pub folder: Option<Spanned<String>>,

    /// Extension of generated files, without the dot.
    pub extension: Option<Spanned<String>>,
}

impl OutputConfig {
    pub fn folder(&self) -> Option<&str> {
        self.folder.as_ref().map(|f| f.get_ref().as_str())
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_ref().map(|e| e.get_ref().as_str())
    }
}

impl Manifest {
    /// A project with no files yet, rooted at `root`.
    pub fn to_project(&self, root: impl Into<PathBuf>) -> Project {
        let project = Project::new(self.project.name(), root).with_frameworks(self.project.frameworks());
        match self.project.configurations() {
            Some(configurations) => project.with_configurations(configurations),
            None => project,
        }
    }
}

fn values(list: &[Spanned<String>]) -> Vec<String> {
    list.iter().map(|v| v.get_ref().clone()).collect()
}
