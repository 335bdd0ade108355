//! Long-lived session state
//!
//! [`SessionState`] is the aggregate the campaign loop owns for the whole
//! campaign. Controllers borrow it for one scenario at a time.
//!
//! # Lifecycle of one scenario
//!
//! 1. [`SessionState::expand_scenario`] adopts the next scenario from the
//!    catalog as the starting position.
//! 2. [`SessionState::expand_carryover`] applies carried gold and variables.
//! 3. The controller records end-of-level data, carried gold and the unit id
//!    counter into [`CarryoverEnd`], and stores a [`ScenarioSnapshot`].
//! 4. [`SessionState::convert_to_start_save`] commits all of that into
//!    [`CarryoverStart`] for the next scenario.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warband_shared::{Classification, ScenarioConfig, Variables};

use crate::catalog::ScenarioCatalog;
use crate::network::MpGameSettings;
use crate::outcome::EndLevelData;
use crate::team::Team;

/// Gold carried over for one side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SideCarryover {
    /// Gold the side starts the next scenario with
    pub gold: i32,
    /// Player display name
    pub name: String,
}

/// Carryover waiting to be applied to the next scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryoverStart {
    /// Id of the next scenario ("" or "null" = none)
    pub next_scenario: String,
    /// Carried gold by side save id
    pub sides: BTreeMap<String, SideCarryover>,
    /// Carried variables
    pub variables: Variables,
    /// End-level data of the previous scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_level: Option<EndLevelData>,
}

/// Carryover produced by the scenario that just ended.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryoverEnd {
    /// End-level data of the finished scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_level: Option<EndLevelData>,
    /// Unit id counter after the finished scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_underlying_unit_id: Option<u64>,
    /// Carried gold by side save id
    pub sides: BTreeMap<String, SideCarryover>,
}

/// One recorded player action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayCommand {
    pub turn: u32,
    pub side: u32,
    pub action: serde_json::Value,
}

/// Recorded actions of the current scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayData {
    pub commands: Vec<ReplayCommand>,
}

impl ReplayData {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Final runtime state of a scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSnapshot {
    /// Id of the scenario the snapshot was taken from
    pub scenario_id: String,
    /// Next scenario as decided during play
    pub next_scenario: String,
    /// Turn the scenario ended on
    pub turn: u32,
    /// Variables at the end of the scenario
    pub variables: Variables,
    /// Teams at the end of the scenario
    pub teams: Vec<Team>,
}

/// Pieces of a finished scenario removed by [`SessionState::convert_to_start_save`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinishedScenario {
    /// Starting position the scenario was played from
    pub starting_pos: Option<ScenarioConfig>,
    /// Start-of-scenario snapshot used by replays
    pub replay_start: Option<ScenarioConfig>,
    /// Recorded actions
    pub replay: ReplayData,
}

/// Mutable state of a running campaign.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Campaign identity and label
    pub classification: Classification,
    /// Starting position of the current scenario
    starting_pos: Option<ScenarioConfig>,
    /// Start-of-scenario snapshot (replays, multiplayer hand-off)
    pub replay_start: Option<ScenarioConfig>,
    /// Final runtime state of the last played scenario
    snapshot: Option<ScenarioSnapshot>,
    /// Carryover for the next scenario
    pub carryover_start: CarryoverStart,
    /// Carryover produced by the scenario that just ended
    pub carryover_end: CarryoverEnd,
    /// Recorded actions of the current scenario
    pub replay_data: ReplayData,
    /// Multiplayer game settings
    pub mp_settings: MpGameSettings,
    /// Unit id counter
    next_unit_id: u64,
}

impl SessionState {
    /// New session starting at scenario `first_scenario`.
    pub fn new(classification: Classification, first_scenario: impl Into<String>) -> Self {
        Self {
            classification,
            carryover_start: CarryoverStart {
                next_scenario: first_scenario.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Whether a playable starting position is present.
    pub fn valid(&self) -> bool {
        self.starting_pos.is_some()
    }

    pub fn starting_pos(&self) -> Option<&ScenarioConfig> {
        self.starting_pos.as_ref()
    }

    /// Replace the starting position.
    pub fn set_starting_pos(&mut self, scenario: ScenarioConfig) {
        self.starting_pos = Some(scenario);
    }

    /// Id of the next scenario recorded for the upcoming transition.
    pub fn next_scenario(&self) -> &str {
        &self.carryover_start.next_scenario
    }

    pub fn snapshot(&self) -> Option<&ScenarioSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn set_snapshot(&mut self, snapshot: ScenarioSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Current unit id counter.
    pub fn next_unit_id(&self) -> u64 {
        self.next_unit_id
    }

    /// Restore the unit id counter from a save.
    pub fn set_next_unit_id(&mut self, id: u64) {
        self.next_unit_id = id;
    }

    /// Adopt the next scenario from the catalog if no starting position is present.
    ///
    /// Returns true if a starting position is present afterwards.
    pub fn expand_scenario(&mut self, catalog: &ScenarioCatalog) -> bool {
        if self.starting_pos.is_none() {
            if let Some(scenario) = catalog.get(&self.carryover_start.next_scenario) {
                tracing::debug!(target: "engine", scenario = %scenario.id, "Expanding scenario");
                self.starting_pos = Some(scenario.clone());
            }
        }
        self.valid()
    }

    /// Apply carried gold and variables to the starting position.
    ///
    /// Carried sides are consumed, so calling this twice does not add gold
    /// twice. The result also becomes the replay start.
    pub fn expand_carryover(&mut self) {
        let Some(pos) = self.starting_pos.as_mut() else {
            return;
        };

        for side in &mut pos.sides {
            if let Some(carried) = self.carryover_start.sides.remove(&side.save_id) {
                side.gold = if side.carryover_add {
                    side.gold.saturating_add(carried.gold)
                } else {
                    side.gold.max(carried.gold)
                };
                if side.name.is_empty() {
                    side.name = carried.name;
                }
            }
        }
        merge_variables(&mut pos.variables, &self.carryover_start.variables);

        self.replay_start = Some(pos.clone());
    }

    /// Merge carried variables only, leaving carried gold untouched.
    ///
    /// Used for replay playback, whose replay start already contains the
    /// carried-over sides.
    pub fn expand_carryover_variables(&mut self) {
        if let Some(pos) = self.starting_pos.as_mut() {
            merge_variables(&mut pos.variables, &self.carryover_start.variables);
        }
    }

    /// Adopt the scenario delivered in the replay start slot (multiplayer client).
    ///
    /// The slot is cleared. Returns false if nothing was delivered.
    pub fn adopt_replay_start(&mut self) -> bool {
        match self.replay_start.take() {
            Some(scenario) => {
                self.starting_pos = Some(scenario);
                true
            }
            None => false,
        }
    }

    /// Commit the finished scenario's carryover for the next scenario.
    ///
    /// The starting position, snapshot, replay start and replay data are
    /// cleared. The removed replay pieces are returned so a replay save can
    /// still be written.
    pub fn convert_to_start_save(&mut self) -> FinishedScenario {
        let end = std::mem::take(&mut self.carryover_end);

        if let Some(snapshot) = self.snapshot.take() {
            self.carryover_start.next_scenario = snapshot.next_scenario;
            self.carryover_start.variables = snapshot.variables;
        }
        self.carryover_start.sides.extend(end.sides);
        self.carryover_start.end_level = end.end_level;
        if let Some(id) = end.next_underlying_unit_id {
            self.next_unit_id = id;
        }

        FinishedScenario {
            starting_pos: self.starting_pos.take(),
            replay_start: self.replay_start.take(),
            replay: std::mem::take(&mut self.replay_data),
        }
    }

    /// Put back what [`convert_to_start_save`](Self::convert_to_start_save)
    /// removed, after the finished scenario could not be checkpointed.
    ///
    /// The committed carryover stays in place.
    pub fn restore_finished(&mut self, finished: FinishedScenario) {
        self.starting_pos = finished.starting_pos;
        self.replay_start = finished.replay_start;
        self.replay_data = finished.replay;
    }
}

fn merge_variables(into: &mut Variables, from: &Variables) {
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}
