//! Save checkpoints
//!
//! [`CheckpointManager`] decides what gets persisted around a scenario
//! boundary. The actual storage sits behind [`Persistence`].
//!
//! - Game end (victory, or defeat in a networked game): optionally delete
//!   older saves of the campaign, then optionally write a replay save.
//! - Transition into the next scenario: optionally write a start-of-scenario
//!   save. Campaign saves carry no starting position so the scenario is
//!   reloaded from the campaign file. Multiplayer saves keep it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warband_shared::{Classification, ScenarioConfig, sanitize_save_name};

use crate::error::SaveError;
use crate::network::MpGameSettings;
use crate::outcome::{EndLevelData, IoMode, Outcome};
use crate::preferences::SavePreferences;
use crate::state::{CarryoverStart, FinishedScenario, ReplayData, SessionState};

/// Kind of automatic save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveKind {
    /// Recording of a finished scenario
    Replay,
    /// Start of the next scenario
    ScenarioStart,
}

/// Document handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub kind: SaveKind,
    pub created_at: DateTime<Utc>,
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_pos: Option<ScenarioConfig>,
    #[serde(default)]
    pub carryover_start: CarryoverStart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_start: Option<ScenarioConfig>,
    #[serde(default)]
    pub replay: ReplayData,
    #[serde(default)]
    pub mp_settings: MpGameSettings,
    #[serde(default)]
    pub next_unit_id: u64,
}

impl SaveGame {
    /// Replay save of a finished scenario.
    pub fn replay(state: &SessionState, finished: &FinishedScenario) -> Self {
        Self {
            kind: SaveKind::Replay,
            created_at: Utc::now(),
            classification: state.classification.clone(),
            starting_pos: finished.starting_pos.clone(),
            carryover_start: CarryoverStart::default(),
            replay_start: finished.replay_start.clone(),
            replay: finished.replay.clone(),
            mp_settings: state.mp_settings.clone(),
            next_unit_id: state.next_unit_id(),
        }
    }

    /// Start-of-scenario save of the upcoming scenario.
    pub fn scenario_start(state: &SessionState, io_mode: IoMode) -> Self {
        let starting_pos = if io_mode.is_networked() {
            state.starting_pos().cloned()
        } else {
            None
        };
        Self {
            kind: SaveKind::ScenarioStart,
            created_at: Utc::now(),
            classification: state.classification.clone(),
            starting_pos,
            carryover_start: state.carryover_start.clone(),
            replay_start: None,
            replay: ReplayData::default(),
            mp_settings: state.mp_settings.clone(),
            next_unit_id: state.next_unit_id(),
        }
    }

    /// File-safe save name derived from the label.
    pub fn name(&self) -> String {
        match self.kind {
            SaveKind::Replay => {
                sanitize_save_name(&format!("{} replay", self.classification.label))
            }
            SaveKind::ScenarioStart => sanitize_save_name(&self.classification.label),
        }
    }

    /// Rebuild a session from this save.
    ///
    /// Replay saves put the recorded scenario in the replay start slot and
    /// the recorded actions in the replay data.
    pub fn into_session(self) -> SessionState {
        let mut state = SessionState::default();
        state.classification = self.classification;
        state.carryover_start = self.carryover_start;
        state.replay_start = self.replay_start;
        state.replay_data = self.replay;
        state.mp_settings = self.mp_settings;
        state.set_next_unit_id(self.next_unit_id);
        if let Some(pos) = self.starting_pos {
            state.set_starting_pos(pos);
        }
        state
    }
}

/// Storage for automatic saves.
pub trait Persistence {
    /// Write a save. Either the whole save is stored or nothing is.
    fn write_automatic_save(&mut self, save: &SaveGame) -> Result<(), SaveError>;

    /// Delete every save belonging to `label`.
    fn delete_saves(&mut self, label: &str) -> Result<(), SaveError>;
}

/// Whether an outcome ends the game for save housekeeping.
///
/// In networked games defeat ends the session as well.
pub fn is_game_end(outcome: Outcome, io_mode: IoMode) -> bool {
    outcome == Outcome::Victory || (io_mode.is_networked() && outcome == Outcome::Defeat)
}

/// Applies the save preferences at scenario boundaries.
pub struct CheckpointManager<'a> {
    persistence: &'a mut dyn Persistence,
    preferences: &'a SavePreferences,
}

impl<'a> CheckpointManager<'a> {
    pub fn new(persistence: &'a mut dyn Persistence, preferences: &'a SavePreferences) -> Self {
        Self {
            persistence,
            preferences,
        }
    }

    /// Save housekeeping after a finished scenario.
    pub fn end_of_scenario(
        &mut self,
        state: &SessionState,
        finished: &FinishedScenario,
        outcome: Outcome,
        io_mode: IoMode,
        end_level: &EndLevelData,
    ) -> Result<(), SaveError> {
        if !is_game_end(outcome, io_mode) {
            return Ok(());
        }

        if self.preferences.delete_saves_on_end {
            self.delete(&state.classification.label)?;
        }

        if self.preferences.save_replays && end_level.replay_save {
            let save = SaveGame::replay(state, finished);
            tracing::info!(target: "savegame", name = %save.name(), "Writing replay save");
            self.persistence.write_automatic_save(&save)?;
        }
        Ok(())
    }

    /// Start-of-scenario save for the scenario about to be played.
    pub fn scenario_start(&mut self, state: &SessionState, io_mode: IoMode) -> Result<(), SaveError> {
        let save = SaveGame::scenario_start(state, io_mode);
        tracing::info!(target: "savegame", name = %save.name(), "Writing start-of-scenario save");
        self.persistence.write_automatic_save(&save)
    }

    /// Cleanup after a standalone scenario was won.
    pub fn campaign_end(&mut self, state: &SessionState) -> Result<(), SaveError> {
        if self.preferences.delete_saves_on_end {
            self.delete(&state.classification.label)?;
        }
        Ok(())
    }

    fn delete(&mut self, label: &str) -> Result<(), SaveError> {
        tracing::info!(target: "savegame", label, "Deleting saves");
        self.persistence.delete_saves(label)
    }
}
