//! Inspect command - print a save file as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use warband_core::FileSaveStore;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Save file (.wbsave)
    pub save: PathBuf,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let save = FileSaveStore::load(&args.save)
        .with_context(|| format!("Failed to load save {}", args.save.display()))?;
    let json = serde_json::to_string_pretty(&save).context("Failed to encode save as JSON")?;
    println!("{json}");
    Ok(())
}
