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
pub struct CheckCommand {
    /// Path to fgen.toml (defaults to ./fgen.toml)
    #[arg(short, long, default_value = MANIFEST_FILE)]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let fgen_toml = FgenToml::open(&self.config).unwrap_or_exit();

        let report = ops::check(&fgen_toml)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
