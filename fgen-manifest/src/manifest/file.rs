use std::path::{Path, PathBuf};

use fgen_core::Project;

use super::{Manifest, parse_manifest};
use crate::{Error, Result};

/// Represents an fgen.toml file with both raw content and parsed manifest.
#[derive(Debug)]
pub struct FgenToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl FgenToml {
    /// Open and parse an fgen.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let manifest = parse_manifest(&content, &path.display().to_string())?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Directory containing the manifest; the project root.
    pub fn root(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Source directories, resolved against [`root`](FgenToml::root).
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        self.manifest
            .project
            .sources()
            .iter()
            .map(|s| self.root().join(s))
            .collect()
    }

    /// The project described by this manifest, without files.
    pub fn project(&self) -> Project {
        self.manifest.to_project(self.root())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_open_resolves_paths_against_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fgen.toml");
        std::fs::write(
            &path,
            "[project]\nname = \"Reality.Services.UPx\"\nframeworks = [\"net7.0\"]\nsources = [\"src\", \"lib\"]\n",
        )
        .unwrap();

        let file = FgenToml::open(&path).unwrap();
        assert_eq!(file.root(), temp.path());
        assert_eq!(
            file.source_dirs(),
            [temp.path().join("src"), temp.path().join("lib")]
        );

        let project = file.project();
        assert_eq!(project.name, "Reality.Services.UPx");
        assert_eq!(project.root, temp.path());
        assert_eq!(project.build_targets().len(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = FgenToml::open(temp.path().join("fgen.toml")).unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }

    #[test]
    fn test_relative_manifest_root_is_current_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fgen.toml");
        std::fs::write(&path, "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\n").unwrap();
        let mut file = FgenToml::open(&path).unwrap();
        file.path = PathBuf::from("fgen.toml");
        assert_eq!(file.root(), Path::new("."));
    }
}
