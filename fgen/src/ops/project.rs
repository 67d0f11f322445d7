//! Loading the sources a manifest points at.

use std::{collections::HashSet, path::Path};

use eyre::{Context, Result, bail};
use fgen_codegen::Emitter;
use fgen_core::{Project, SourceFile};
use fgen_manifest::FgenToml;
use log::debug;
use walkdir::{DirEntry, WalkDir};

/// Extension of the files fed to the pipeline.
const SOURCE_EXTENSION: &str = "cs";

/// The manifest's project with every source file below its source dirs.
///
/// Files are added in path order so runs are reproducible. Excluded
/// directory names are pruned at any depth, as are previously generated
/// files.
pub fn load_project(fgen_toml: &FgenToml) -> Result<Project> {
    let root = fgen_toml.root();
    let exclude = fgen_toml.manifest().project.exclude();
    let generated_suffix = format!(".g.{}", emitter(fgen_toml).extension());

    let mut project = fgen_toml.project();
    let mut seen = HashSet::new();
    for dir in fgen_toml.source_dirs() {
        if !dir.is_dir() {
            bail!("source directory '{}' does not exist", dir.display());
        }

        let walker = WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry, &exclude));

        for entry in walker {
            let entry = entry.wrap_err_with(|| format!("failed to walk '{}'", dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_source(path, &generated_suffix) {
                continue;
            }
            if !seen.insert(path.to_path_buf()) {
                continue;
            }

            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
            let relative = path.strip_prefix(root).unwrap_or(path);
            debug!("loaded {}", relative.display());
            project.add_file(SourceFile::new(relative, content));
        }
    }

    Ok(project)
}

/// Emitter configured by the `[output]` section.
pub fn emitter(fgen_toml: &FgenToml) -> Emitter {
    let output = &fgen_toml.manifest().output;
    let mut emitter = Emitter::new();
    if let Some(folder) = output.folder() {
        emitter = emitter.with_folder(folder);
    }
    if let Some(extension) = output.extension() {
        emitter = emitter.with_extension(extension);
    }
    emitter
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && exclude.iter().any(|name| entry.file_name() == name.as_str())
}

fn is_source(path: &Path, generated_suffix: &str) -> bool {
    let is_cs = path
        .extension()
        .is_some_and(|ext| ext == SOURCE_EXTENSION);
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    is_cs && !name.ends_with(generated_suffix)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn open(root: &Path, manifest: &str) -> FgenToml {
        write(root, "fgen.toml", manifest);
        FgenToml::open(root.join("fgen.toml")).unwrap()
    }

    fn paths(project: &Project) -> Vec<PathBuf> {
        project.files().map(|(_, f)| f.path.clone()).collect()
    }

    #[test]
    fn test_loads_sources_in_path_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Types/UserQuery.cs", "class A { }");
        write(temp.path(), "Api.cs", "class B { }");
        write(temp.path(), "notes.md", "# notes");
        write(temp.path(), "obj/Debug/net7.0/fgen_generated/QueryType.g.cs", "class Q { }");
        write(temp.path(), "bin/Debug/Stale.cs", "class S { }");
        write(temp.path(), "Types/Cached.g.cs", "class C { }");

        let fgen_toml = open(temp.path(), "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\n");
        let project = load_project(&fgen_toml).unwrap();

        assert_eq!(
            paths(&project),
            [PathBuf::from("Api.cs"), PathBuf::from("Types/UserQuery.cs")]
        );
        assert_eq!(project.get(project.files().next().unwrap().0).unwrap().content, "class B { }");
    }

    #[test]
    fn test_overlapping_source_dirs_load_once() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/Query.cs", "class A { }");
        write(temp.path(), "src/vendor/Lib.cs", "class L { }");

        let fgen_toml = open(
            temp.path(),
            "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\nsources = [\"src\", \"src\"]\nexclude = [\"vendor\"]\n",
        );
        let project = load_project(&fgen_toml).unwrap();
        assert_eq!(paths(&project), [PathBuf::from("src/Query.cs")]);
    }

    #[test]
    fn test_missing_source_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let fgen_toml = open(
            temp.path(),
            "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\nsources = [\"missing\"]\n",
        );
        let err = load_project(&fgen_toml).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_emitter_follows_output_section() {
        let temp = TempDir::new().unwrap();
        let fgen_toml = open(
            temp.path(),
            "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\n[output]\nfolder = \"gen\"\n",
        );
        let emitter = emitter(&fgen_toml);
        assert_eq!(emitter.folder(), "gen");
        assert_eq!(emitter.extension(), "cs");
    }
}
