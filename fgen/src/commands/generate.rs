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
pub struct GenerateCommand {
    /// Path to fgen.toml (defaults to ./fgen.toml)
    #[arg(short, long, default_value = MANIFEST_FILE)]
    pub config: PathBuf,

    /// Preview generated files without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let fgen_toml = FgenToml::open(&self.config).unwrap_or_exit();

        let report = ops::generate(
            &fgen_toml,
            ops::generate::GenerateOptions {
                dry_run: self.dry_run,
            },
        )?;

        if self.json {
            println!("{}", report.generation.to_json()?);
        } else {
            report.render(&mut TerminalOutput::new());
        }

        if report.generation.has_errors() {
            std::process::exit(1);
        }
        Ok(())
    }
}
