use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use fgen_manifest::{FgenToml, MANIFEST_FILE};

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CleanCommand {
    /// Path to fgen.toml (defaults to ./fgen.toml)
    #[arg(short, long, default_value = MANIFEST_FILE)]
    pub config: PathBuf,

    /// Preview what would be deleted without actually deleting
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanCommand {
    pub fn run(&self) -> Result<()> {
        let fgen_toml = FgenToml::open(&self.config).unwrap_or_exit();

        let report = ops::clean(
            &fgen_toml,
            ops::clean::CleanOptions {
                dry_run: self.dry_run,
            },
        )?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
