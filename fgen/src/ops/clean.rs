//! Clean operation - remove generated folders.

use eyre::{Context, Result};
use fgen_manifest::FgenToml;

use super::project::emitter;
use crate::reports::CleanReport;

/// Options for the clean operation.
pub struct CleanOptions {
    /// Whether to preview without deleting.
    pub dry_run: bool,
}

/// Execute the clean operation.
///
/// Removes the generated folder of every build target. Sources are not read.
pub fn clean(fgen_toml: &FgenToml, opts: CleanOptions) -> Result<CleanReport> {
    let project = fgen_toml.project();
    let removed = emitter(fgen_toml)
        .clean(&project, opts.dry_run)
        .wrap_err("Failed to clean generated folders")?;

    Ok(CleanReport {
        dry_run: opts.dry_run,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_clean_respects_custom_folder() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("fgen.toml"),
            "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\n[output]\nfolder = \"gen\"\n",
        )
        .unwrap();
        let generated = temp.path().join("obj/Release/net7.0/gen");
        std::fs::create_dir_all(&generated).unwrap();
        std::fs::write(generated.join("QueryType.g.cs"), "// old").unwrap();
        let untouched = temp.path().join("obj/Release/net7.0/fgen_generated");
        std::fs::create_dir_all(&untouched).unwrap();

        let fgen_toml = FgenToml::open(temp.path().join("fgen.toml")).unwrap();

        let preview = clean(&fgen_toml, CleanOptions { dry_run: true }).unwrap();
        assert_eq!(preview.removed, [generated.clone()]);
        assert!(generated.exists());

        let report = clean(&fgen_toml, CleanOptions { dry_run: false }).unwrap();
        assert_eq!(report.removed, [generated.clone()]);
        assert!(!generated.exists());
        assert!(untouched.exists());
    }
}
