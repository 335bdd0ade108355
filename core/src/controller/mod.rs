//! Session mode controllers
//!
//! A controller drives exactly one scenario from a prepared starting
//! position to an [`Outcome`]. All controllers follow the same sequence:
//!
//! 1. Expand carryover into the starting position.
//! 2. Launch the scenario runtime and play it.
//! 3. Record end-of-level data and the unit id counter.
//! 4. Compute carryover (before linger, so the summary shows first).
//! 5. Linger unless the display is headless. Quitting there wins.
//! 6. Snapshot the final runtime state.
//!
//! The controller used for each [`IoMode`] comes from [`ControllerTable`].

mod multiplayer;
mod replay;
mod single;
mod table;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use warband_shared::StoryPart;

pub use multiplayer::MultiplayerController;
pub use replay::ReplayController;
pub use single::SinglePlayerController;
pub use table::{ControllerTable, controller};

use crate::display::GameDisplay;
use crate::error::CampaignError;
use crate::outcome::{EndLevelData, IoMode, Outcome};
use crate::preferences::EconomyConfig;
use crate::runtime::{GameplayEngine, LingerResult, ScenarioLaunch, ScenarioRuntime};
use crate::state::SessionState;

/// Which controller drives a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Local single-player play
    SinglePlayer,
    /// Networked play (host or client)
    Multiplayer,
    /// Playback of a recorded scenario
    Replay,
}

/// Collaborators a controller works with.
pub struct ScenarioContext<'a> {
    pub display: &'a mut dyn GameDisplay,
    pub engine: &'a mut dyn GameplayEngine,
    pub economy: EconomyConfig,
}

/// Per-scenario options.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioRequest<'a> {
    /// Story shown before play
    pub story: &'a [StoryPart],
    /// Skip replaying recorded turns
    pub skip_replay: bool,
    /// Hide the map while replaying (multiplayer)
    pub blindfold_replay: bool,
    /// Topology the scenario is played in
    pub io_mode: IoMode,
}

/// What a controller hands back to the campaign loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    pub outcome: Outcome,
    pub end_level: EndLevelData,
    /// Topology for the following scenarios (a client may have become host)
    pub io_mode: IoMode,
}

/// Drives one scenario to completion.
pub trait SessionModeController {
    fn kind(&self) -> ControllerKind;

    /// Play the current starting position of `state`.
    ///
    /// `state` is only borrowed for this scenario.
    fn run(
        &self,
        ctx: &mut ScenarioContext<'_>,
        state: &mut SessionState,
        request: &ScenarioRequest<'_>,
    ) -> Result<ScenarioResult, CampaignError>;
}

/// Build the runtime for the current starting position.
fn launch(
    ctx: &mut ScenarioContext<'_>,
    state: &SessionState,
    kind: ControllerKind,
    request: &ScenarioRequest<'_>,
) -> Result<Box<dyn ScenarioRuntime>, CampaignError> {
    let scenario = state
        .starting_pos()
        .ok_or_else(|| CampaignError::LoadFailure("no starting position".to_string()))?;

    let started = Instant::now();
    tracing::info!(target: "engine", scenario = %scenario.id, ?kind, "Creating objects");
    let runtime = ctx.engine.launch(ScenarioLaunch {
        scenario,
        kind,
        skip_replay: request.skip_replay,
        blindfold_replay: request.blindfold_replay,
        is_server: request.io_mode == IoMode::Server,
        next_unit_id: state.next_unit_id(),
        replay: &state.replay_data,
    })?;
    tracing::info!(target: "engine", elapsed = ?started.elapsed(), "Created objects");
    Ok(runtime)
}

/// Store end-of-level data and the unit id counter for the transition.
fn record_end_level(state: &mut SessionState, runtime: &dyn ScenarioRuntime) -> EndLevelData {
    let end_level = runtime.end_level_data();
    state.carryover_end.end_level = Some(end_level.clone());
    state.carryover_end.next_underlying_unit_id = Some(runtime.next_unit_id());
    end_level
}

/// Enter linger mode unless the display is headless or the scenario opts out.
fn linger(
    display: &dyn GameDisplay,
    runtime: &mut dyn ScenarioRuntime,
    end_level: &EndLevelData,
) -> LingerResult {
    if display.is_headless() || !end_level.linger_mode {
        return LingerResult::Proceed;
    }
    runtime.linger()
}

/// Move the final runtime state and the recorded actions into `state`.
fn finish(state: &mut SessionState, runtime: &mut dyn ScenarioRuntime) {
    state.set_snapshot(runtime.snapshot());
    state.replay_data = runtime.take_replay();
}
