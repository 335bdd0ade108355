//! Replay playback entry point

use crate::controller::{ReplayController, ScenarioContext, ScenarioRequest, SessionModeController};
use crate::display::GameDisplay;
use crate::error::CampaignError;
use crate::outcome::{IoMode, Outcome};
use crate::preferences::EconomyConfig;
use crate::runtime::GameplayEngine;
use crate::state::SessionState;

/// Play back the replay stored in `state`.
///
/// Playback starts from the replay start, whose variables replace the
/// carried variables. An existing label is kept. The replay data is
/// cleared once playback finishes.
///
/// Fatal errors are shown and yield [`Outcome::None`]. In unit test mode
/// they are logged and yield [`Outcome::Defeat`] instead.
pub fn play_replay(
    display: &mut dyn GameDisplay,
    engine: &mut dyn GameplayEngine,
    state: &mut SessionState,
    unit_test: bool,
) -> Result<Outcome, CampaignError> {
    match replay_level(display, engine, state) {
        Ok(outcome) => {
            state.replay_data.clear();
            Ok(outcome)
        }
        Err(err) if err.is_fatal_scenario_error() => {
            if unit_test {
                tracing::error!(target: "engine", "{err}");
                if let CampaignError::ScriptDocument { dev_message, .. } = &err {
                    tracing::error!(target: "engine", "Dev message: {dev_message}");
                }
                return Ok(Outcome::Defeat);
            }
            display.show_error(&err.to_string());
            Ok(Outcome::None)
        }
        Err(err) => Err(err),
    }
}

fn replay_level(
    display: &mut dyn GameDisplay,
    engine: &mut dyn GameplayEngine,
    state: &mut SessionState,
) -> Result<Outcome, CampaignError> {
    let start = state
        .replay_start
        .clone()
        .ok_or_else(|| CampaignError::LoadFailure("the save contains no replay".to_string()))?;

    state.carryover_start.variables = start.variables.clone();
    if state.classification.label.is_empty() {
        state.classification.label = start.name.clone();
    }

    let story = start.story.clone();
    state.set_starting_pos(start);

    tracing::info!(target: "engine", label = %state.classification.label, "Playing replay");
    let mut ctx = ScenarioContext {
        display,
        engine,
        economy: EconomyConfig::default(),
    };
    let request = ScenarioRequest {
        story: &story,
        skip_replay: false,
        blindfold_replay: false,
        io_mode: IoMode::None,
    };
    let result = ReplayController.run(&mut ctx, state, &request)?;
    Ok(result.outcome)
}
