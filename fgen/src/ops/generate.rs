//! Generate operation - run the pipeline over the manifest's project.

use eyre::{Context, Result};
use fgen_codegen::Pipeline;
use fgen_manifest::FgenToml;
use log::info;

use super::project::{emitter, load_project};
use crate::reports::GenerateReport;

/// Options for the generate operation.
pub struct GenerateOptions {
    /// Whether to plan writes without touching the disk.
    pub dry_run: bool,
}

/// Execute the generate operation.
pub fn generate(fgen_toml: &FgenToml, opts: GenerateOptions) -> Result<GenerateReport> {
    let project = load_project(fgen_toml)?;
    info!(
        "{}: {} source files, {} build targets",
        project.name,
        project.file_count(),
        project.build_targets().len()
    );

    let pipeline = Pipeline::new().with_emitter(emitter(fgen_toml));
    let generation = if opts.dry_run {
        pipeline.preview(&project)
    } else {
        pipeline.run(&project)
    }
    .wrap_err("Generation failed")?;

    Ok(GenerateReport {
        root: project.root.clone(),
        generation,
    })
}
