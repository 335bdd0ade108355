//! Play command - run a campaign headlessly
//!
//! Gameplay is scripted: each scenario plays out as described in the
//! script file (see `warband_core::headless`). Everything else is real:
//! saves are written to disk, maps are read from the map directory and
//! multiplayer transitions go through a loopback negotiator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use warband_core::headless::{ScriptFile, ScriptedEngine};
use warband_core::{
    AutoNegotiator, Collaborators, DirectoryMapStore, DisabledGenerator, FileSaveStore,
    HeadlessDisplay, IoMode, Outcome, PlayOptions, Preferences, ScenarioCatalog, SessionState,
    play_game, preferences,
};

/// Session topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Single-player
    Local,
    /// Multiplayer host
    Host,
    /// Multiplayer client
    Client,
}

impl From<Mode> for IoMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Local => IoMode::None,
            Mode::Host => IoMode::Server,
            Mode::Client => IoMode::Client,
        }
    }
}

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Campaign file (.toml)
    pub campaign: PathBuf,

    /// Gameplay script (.toml); without one every scenario is won
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Session topology
    #[arg(long, value_enum, default_value_t = Mode::Local)]
    pub mode: Mode,

    /// Save directory (defaults to the preferences' save directory)
    #[arg(long)]
    pub saves: Option<PathBuf>,

    /// Map directory (defaults to the campaign file's directory)
    #[arg(long)]
    pub maps: Option<PathBuf>,

    /// Start at this scenario instead of the campaign's first one
    #[arg(long, conflicts_with = "resume")]
    pub scenario: Option<String>,

    /// Resume from a start-of-scenario save
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Stop after the first scenario and report its outcome
    #[arg(long)]
    pub unit_test: bool,

    /// Remote participants take part
    #[arg(long)]
    pub network: bool,

    /// Answer "yes" when asked to keep observing a campaign
    #[arg(long)]
    pub continue_as_observer: bool,
}

/// Execute the play command
pub fn execute(args: PlayArgs) -> Result<Outcome> {
    let preferences = preferences::load();
    run(&args, &preferences)
}

fn run(args: &PlayArgs, preferences: &Preferences) -> Result<Outcome> {
    let catalog = ScenarioCatalog::load(&args.campaign)
        .with_context(|| format!("Failed to load campaign {}", args.campaign.display()))?;

    let scripts = match &args.script {
        Some(path) => ScriptFile::load(path)?,
        None => ScriptFile::default(),
    };

    let save_dir = args
        .saves
        .clone()
        .or_else(|| preferences.save_dir())
        .context("No save directory available, pass --saves")?;
    let map_dir = args
        .maps
        .clone()
        .unwrap_or_else(|| campaign_dir(&args.campaign));

    let mut state = initial_state(args, &catalog)?;

    let mut display = HeadlessDisplay::new(args.continue_as_observer);
    let mut engine = ScriptedEngine::new(scripts);
    let mut generator = DisabledGenerator;
    let maps = DirectoryMapStore::new(map_dir);
    let mut persistence = FileSaveStore::new(save_dir, preferences.saves.compression);
    let mut negotiator = AutoNegotiator::with_catalog(catalog.clone());

    let options = PlayOptions {
        io_mode: args.mode.into(),
        network_game: args.network,
        unit_test: args.unit_test,
        ..Default::default()
    };

    tracing::info!(
        campaign = %catalog.header().name,
        scenarios = catalog.len(),
        mode = ?args.mode,
        saves = %persistence.dir().display(),
        "Starting campaign"
    );

    let collaborators = Collaborators {
        display: &mut display,
        engine: &mut engine,
        generator: &mut generator,
        maps: &maps,
        persistence: &mut persistence,
        negotiator: &mut negotiator,
        catalog: &catalog,
        preferences,
    };
    let outcome = play_game(collaborators, &mut state, options).context("Campaign aborted")?;

    println!("=== Campaign finished ===");
    println!("  Outcome:   {outcome}");
    println!("  Scenarios: {}", engine.launches().len());
    if !state.classification.label.is_empty() {
        println!("  Last save: {}", state.classification.label);
    }

    Ok(outcome)
}

fn initial_state(args: &PlayArgs, catalog: &ScenarioCatalog) -> Result<SessionState> {
    if let Some(path) = &args.resume {
        let save = FileSaveStore::load(path)
            .with_context(|| format!("Failed to load save {}", path.display()))?;
        return Ok(save.into_session());
    }

    let header = catalog.header();
    let first = args
        .scenario
        .clone()
        .unwrap_or_else(|| header.first_scenario.clone());
    Ok(SessionState::new(header.classification(), first))
}

fn campaign_dir(campaign: &Path) -> PathBuf {
    campaign
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
