//! Test utilities for generators.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::path::Path;

use eyre::Result;
use fgen_core::Project;
use tempfile::TempDir;

use crate::pipeline::{GenerationReport, Pipeline};

/// Framework given to projects built by [`project_in_temp`].
pub const TEST_FRAMEWORK: &str = "net7.0";

/// Assert that two strings are equal, with a nice diff on failure.
pub fn assert_content_eq(expected: &str, actual: &str) {
    if expected != actual {
        let expected_lines: Vec<&str> = expected.lines().collect();
        let actual_lines: Vec<&str> = actual.lines().collect();

        let mut diff = String::new();
        let max_lines = expected_lines.len().max(actual_lines.len());

        for i in 0..max_lines {
            let exp = expected_lines.get(i).copied().unwrap_or("<missing>");
            let act = actual_lines.get(i).copied().unwrap_or("<missing>");

            if exp != act {
                diff.push_str(&format!("Line {}:\n", i + 1));
                diff.push_str(&format!("  expected: {}\n", exp));
                diff.push_str(&format!("  actual:   {}\n", act));
            }
        }

        panic!("Content mismatch:\n{}", diff);
    }
}

/// Write `files` below a fresh temporary directory and build a project
/// rooted there, targeting [`TEST_FRAMEWORK`].
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn project_in_temp(files: &[(&str, &str)]) -> Result<(TempDir, Project)> {
    let temp_dir = TempDir::new()?;
    let mut project = Project::new("Test", temp_dir.path()).framework(TEST_FRAMEWORK);
    for (path, content) in files {
        let full = temp_dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, content)?;
        project = project.file(*path, *content);
    }
    Ok((temp_dir, project))
}

/// Run the builtin pipeline over `files` in a temporary project.
pub fn generate_to_temp(files: &[(&str, &str)]) -> Result<(TempDir, GenerationReport)> {
    let (temp_dir, project) = project_in_temp(files)?;
    let report = Pipeline::new().run(&project)?;
    Ok((temp_dir, report))
}

/// Read a generated artifact of the Debug configuration.
pub fn read_generated(root: &Path, file_name: &str) -> Result<String> {
    let path = root
        .join("obj/Debug")
        .join(TEST_FRAMEWORK)
        .join(crate::emit::DEFAULT_FOLDER)
        .join(file_name);
    Ok(std::fs::read_to_string(path)?)
}
