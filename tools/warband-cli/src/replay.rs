//! Replay command - play back a replay save

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use warband_core::headless::{ScriptFile, ScriptedEngine};
use warband_core::{FileSaveStore, HeadlessDisplay, Outcome, SaveKind, play_replay};

/// Arguments for the replay command
#[derive(Args)]
pub struct ReplayArgs {
    /// Replay save (.wbsave)
    pub save: PathBuf,

    /// Gameplay script (.toml) deciding how the replayed scenario ends
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Log errors and report defeat instead of showing them
    #[arg(long)]
    pub unit_test: bool,
}

/// Execute the replay command
pub fn execute(args: ReplayArgs) -> Result<Outcome> {
    let save = FileSaveStore::load(&args.save)
        .with_context(|| format!("Failed to load save {}", args.save.display()))?;
    if save.kind != SaveKind::Replay {
        bail!("{} is not a replay save", args.save.display());
    }

    let scripts = match &args.script {
        Some(path) => ScriptFile::load(path)?,
        None => ScriptFile::default(),
    };

    let mut state = save.into_session();
    let mut display = HeadlessDisplay::default();
    let mut engine = ScriptedEngine::new(scripts);

    tracing::info!(
        label = %state.classification.label,
        actions = state.replay_data.commands.len(),
        "Playing replay"
    );
    let outcome = play_replay(&mut display, &mut engine, &mut state, args.unit_test)
        .context("Replay aborted")?;

    println!("=== Replay finished ===");
    println!("  Outcome: {outcome}");
    Ok(outcome)
}
