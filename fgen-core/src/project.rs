//! Project model consumed by the generation pipeline.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::utils::file_stem;

/// Build configurations used when a project does not name its own.
pub const DEFAULT_CONFIGURATIONS: [&str; 2] = ["Debug", "Release"];

/// Identifier of a source file within a [`Project`].
///
/// Ids are assigned in insertion order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(usize);

impl FileId {
    /// The raw index of this id.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source file handed to the pipeline.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name including extension (e.g. `Query.cs`).
    pub name: String,
    /// Path of the file, relative to the project root when known.
    pub path: PathBuf,
    /// Raw text of the file.
    pub content: String,
}

impl SourceFile {
    /// Create a source file from a path and its content.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            content: content.into(),
        }
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        file_stem(&self.name)
    }
}

/// One `(configuration, framework)` pair that receives its own copy of
/// every generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuildTarget {
    /// Build configuration name (e.g. `Debug`).
    pub configuration: String,
    /// Target framework moniker (e.g. `net7.0`).
    pub framework: String,
}

impl BuildTarget {
    pub fn new(configuration: impl Into<String>, framework: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            framework: framework.into(),
        }
    }

    /// Directory that holds generated files for this target:
    /// `<root>/obj/<configuration>/<framework>/<folder>`.
    pub fn output_dir(&self, root: &Path, folder: &str) -> PathBuf {
        root.join("obj")
            .join(&self.configuration)
            .join(&self.framework)
            .join(folder)
    }
}

impl std::fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.configuration, self.framework)
    }
}

/// A project: a named set of source files plus the targets it builds for.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project name.
    pub name: String,
    /// Root directory; generated files are written below `<root>/obj`.
    pub root: PathBuf,
    files: IndexMap<FileId, SourceFile>,
    frameworks: Vec<String>,
    configurations: Vec<String>,
}

impl Project {
    /// Create an empty project with the default configurations.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            files: IndexMap::new(),
            frameworks: Vec::new(),
            configurations: DEFAULT_CONFIGURATIONS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Add a target framework.
    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.frameworks.push(framework.into());
        self
    }

    /// Replace the target frameworks.
    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the build configurations.
    pub fn with_configurations<I, S>(mut self, configurations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configurations = configurations.into_iter().map(Into::into).collect();
        self
    }

    /// Add a source file and return its id.
    pub fn add_file(&mut self, file: SourceFile) -> FileId {
        let id = FileId(self.files.len());
        self.files.insert(id, file);
        id
    }

    /// Builder form of [`Project::add_file`].
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add_file(SourceFile::new(path, content));
        self
    }

    /// Look up a source file.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(&id)
    }

    /// Iterate over source files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().map(|(id, file)| (*id, file))
    }

    /// Number of source files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn frameworks(&self) -> &[String] {
        &self.frameworks
    }

    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }

    /// Every `(configuration, framework)` pair, configuration-major.
    pub fn build_targets(&self) -> Vec<BuildTarget> {
        self.configurations
            .iter()
            .flat_map(|configuration| {
                self.frameworks
                    .iter()
                    .map(move |framework| BuildTarget::new(configuration, framework))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_name_and_stem() {
        let file = SourceFile::new("Types/Query.cs", "class Query {}");
        assert_eq!(file.name, "Query.cs");
        assert_eq!(file.stem(), "Query");
    }

    #[test]
    fn test_file_ids_follow_insertion_order() {
        let mut project = Project::new("app", "/tmp/app");
        let a = project.add_file(SourceFile::new("A.cs", ""));
        let b = project.add_file(SourceFile::new("B.cs", ""));

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        let names: Vec<_> = project.files().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, ["A.cs", "B.cs"]);
    }

    #[test]
    fn test_build_targets_cross_product() {
        let project = Project::new("app", "/tmp/app")
            .framework("net6.0")
            .framework("net7.0");

        let targets = project.build_targets();
        assert_eq!(
            targets,
            vec![
                BuildTarget::new("Debug", "net6.0"),
                BuildTarget::new("Debug", "net7.0"),
                BuildTarget::new("Release", "net6.0"),
                BuildTarget::new("Release", "net7.0"),
            ]
        );
    }

    #[test]
    fn test_no_frameworks_means_no_targets() {
        let project = Project::new("app", "/tmp/app");
        assert!(project.build_targets().is_empty());
    }

    #[test]
    fn test_output_dir_layout() {
        let target = BuildTarget::new("Release", "net7.0");
        let dir = target.output_dir(Path::new("/src/app"), "fgen_generated");
        assert_eq!(
            dir,
            Path::new("/src/app/obj/Release/net7.0/fgen_generated")
        );
    }
}
