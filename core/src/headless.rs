//! Scripted gameplay for headless runs
//!
//! [`ScriptedEngine`] stands in for the turn-by-turn simulation. Each
//! scenario plays out as described by a [`ScenarioScript`]: the outcome,
//! final gold, turn reached and so on. Scripts are loaded from TOML:
//!
//! ```toml
//! [default]
//! outcome = "victory"
//!
//! [scenario.01_bay]
//! villages = 12
//! turn = 9
//! gold = { Konrad = 180 }
//!
//! [scenario.02_blackwater]
//! outcome = "defeat"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use warband_shared::{ScenarioConfig, StoryPart, Variables};

use crate::controller::ControllerKind;
use crate::error::CampaignError;
use crate::outcome::{EndLevelData, Outcome};
use crate::runtime::{
    GameplayEngine, LingerResult, ScenarioLaunch, ScenarioRuntime, TurnCounter,
};
use crate::state::{ReplayCommand, ReplayData, ScenarioSnapshot};
use crate::team::Team;

/// Error categories a script can raise during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Load,
    Runtime,
    Map,
    Document,
}

/// A scripted error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedFailure {
    pub kind: FailureKind,
    #[serde(default)]
    pub message: String,
}

impl ScriptedFailure {
    fn to_error(&self) -> CampaignError {
        let message = self.message.clone();
        match self.kind {
            FailureKind::Load => CampaignError::LoadFailure(message),
            FailureKind::Runtime => CampaignError::RuntimeGame(message),
            FailureKind::Map => CampaignError::MapFormat(message),
            FailureKind::Document => CampaignError::ScriptDocument {
                user_message: message.clone(),
                dev_message: message,
            },
        }
    }
}

/// How one scenario plays out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioScript {
    pub outcome: Outcome,
    /// Final gold by side save id
    pub gold: BTreeMap<String, i32>,
    /// Added to the starting gold of sides not listed in `gold`
    pub gold_delta: i32,
    /// Save ids of defeated sides
    pub lost: Vec<String>,
    /// Villages on the map
    pub villages: u32,
    /// Turn the scenario ends on
    pub turn: u32,
    /// End-of-level data (default: proceed only on victory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_level: Option<EndLevelData>,
    /// Overrides the scenario's next scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scenario: Option<String>,
    /// Answer of linger mode
    pub linger: LingerResult,
    /// The local client became host during play
    pub host: bool,
    /// The local participant only observes
    pub observer: bool,
    /// Units created during play
    pub units_created: u64,
    /// Variables set during play
    pub variables: Variables,
    /// Raise an error instead of finishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail: Option<ScriptedFailure>,
}

impl Default for ScenarioScript {
    fn default() -> Self {
        Self {
            outcome: Outcome::Victory,
            gold: BTreeMap::new(),
            gold_delta: 0,
            lost: Vec::new(),
            villages: 0,
            turn: 1,
            end_level: None,
            next_scenario: None,
            linger: LingerResult::Proceed,
            host: false,
            observer: false,
            units_created: 0,
            variables: Variables::new(),
            fail: None,
        }
    }
}

impl ScenarioScript {
    pub fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            ..Default::default()
        }
    }

    fn end_level(&self) -> EndLevelData {
        self.end_level.clone().unwrap_or_else(|| EndLevelData {
            proceed_to_next_level: self.outcome == Outcome::Victory,
            ..Default::default()
        })
    }
}

/// Script file: a default plus per-scenario entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptFile {
    pub default: ScenarioScript,
    pub scenario: BTreeMap<String, ScenarioScript>,
}

impl ScriptFile {
    pub fn load(path: &Path) -> Result<Self, CampaignError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CampaignError::LoadFailure(format!("{}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| CampaignError::ScriptDocument {
            user_message: format!("invalid script file {}", path.display()),
            dev_message: e.to_string(),
        })
    }
}

/// One scenario launch as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRecord {
    pub scenario_id: String,
    pub kind: ControllerKind,
    pub is_server: bool,
    pub next_unit_id: u64,
    /// Starting gold by side save id, carryover applied
    pub starting_gold: BTreeMap<String, i32>,
    pub map_data: String,
    pub replayed_commands: usize,
}

/// Gameplay engine driven by scripts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    scripts: ScriptFile,
    max_launches: Option<usize>,
    launches: Vec<LaunchRecord>,
}

impl ScriptedEngine {
    pub fn new(scripts: ScriptFile) -> Self {
        Self {
            scripts,
            max_launches: None,
            launches: Vec::new(),
        }
    }

    /// Script for `scenario_id`.
    pub fn with_script(mut self, scenario_id: &str, script: ScenarioScript) -> Self {
        self.scripts.scenario.insert(scenario_id.to_string(), script);
        self
    }

    /// Fail every launch after `max` launches.
    pub fn with_launch_limit(mut self, max: usize) -> Self {
        self.max_launches = Some(max);
        self
    }

    pub fn launches(&self) -> &[LaunchRecord] {
        &self.launches
    }

    fn script_for(&self, scenario_id: &str) -> ScenarioScript {
        self.scripts
            .scenario
            .get(scenario_id)
            .unwrap_or(&self.scripts.default)
            .clone()
    }
}

impl GameplayEngine for ScriptedEngine {
    fn launch(&mut self, launch: ScenarioLaunch<'_>) -> Result<Box<dyn ScenarioRuntime>, CampaignError> {
        if self.max_launches.is_some_and(|max| self.launches.len() >= max) {
            return Err(CampaignError::RuntimeGame(format!(
                "launch limit of {} scenarios reached",
                self.launches.len()
            )));
        }

        let scenario = launch.scenario;
        self.launches.push(LaunchRecord {
            scenario_id: scenario.id.clone(),
            kind: launch.kind,
            is_server: launch.is_server,
            next_unit_id: launch.next_unit_id,
            starting_gold: scenario
                .sides
                .iter()
                .map(|s| (s.save_id.clone(), s.gold))
                .collect(),
            map_data: scenario.map_data.clone(),
            replayed_commands: launch.replay.commands.len(),
        });

        Ok(Box::new(ScriptedRuntime {
            script: self.script_for(&scenario.id),
            teams: scenario.sides.iter().map(Team::from_side).collect(),
            scenario: scenario.clone(),
            kind: launch.kind,
            next_unit_id: launch.next_unit_id,
            replay: ReplayData::default(),
        }))
    }
}

struct ScriptedRuntime {
    script: ScenarioScript,
    scenario: ScenarioConfig,
    teams: Vec<Team>,
    kind: ControllerKind,
    next_unit_id: u64,
    replay: ReplayData,
}

impl ScenarioRuntime for ScriptedRuntime {
    fn play_scenario(&mut self, story: &[StoryPart], skip_replay: bool) -> Result<Outcome, CampaignError> {
        tracing::debug!(
            target: "engine",
            scenario = %self.scenario.id,
            story_parts = story.len(),
            skip_replay,
            "Playing scripted scenario"
        );
        if let Some(failure) = &self.script.fail {
            return Err(failure.to_error());
        }

        for team in &mut self.teams {
            team.gold = match self.script.gold.get(&team.save_id) {
                Some(gold) => *gold,
                None => team.gold + self.script.gold_delta,
            };
            team.lost = self.script.lost.contains(&team.save_id);
        }
        self.next_unit_id += self.script.units_created;

        if self.kind != ControllerKind::Replay {
            self.replay.commands.push(ReplayCommand {
                turn: self.script.turn,
                side: 1,
                action: serde_json::json!({
                    "scenario": self.scenario.id,
                    "result": self.script.outcome.as_str(),
                }),
            });
        }

        Ok(self.script.outcome)
    }

    fn end_level_data(&self) -> EndLevelData {
        self.script.end_level()
    }

    fn teams(&self) -> &[Team] {
        &self.teams
    }

    fn village_count(&self) -> u32 {
        self.script.villages
    }

    fn turns(&self) -> TurnCounter {
        TurnCounter {
            turn: self.script.turn,
            number_of_turns: self.scenario.turns,
        }
    }

    fn next_scenario(&self) -> &str {
        self.script
            .next_scenario
            .as_deref()
            .unwrap_or(&self.scenario.next_scenario)
    }

    fn next_unit_id(&self) -> u64 {
        self.next_unit_id
    }

    fn is_observer(&self) -> bool {
        self.script.observer
    }

    fn is_host(&self) -> bool {
        self.script.host
    }

    fn linger(&mut self) -> LingerResult {
        self.script.linger
    }

    fn snapshot(&self) -> ScenarioSnapshot {
        let mut variables = self.scenario.variables.clone();
        variables.extend(self.script.variables.clone());
        ScenarioSnapshot {
            scenario_id: self.scenario.id.clone(),
            next_scenario: self.next_scenario().to_string(),
            turn: self.script.turn,
            variables,
            teams: self.teams.clone(),
        }
    }

    fn take_replay(&mut self) -> ReplayData {
        std::mem::take(&mut self.replay)
    }
}
