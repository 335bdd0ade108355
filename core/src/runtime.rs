//! Gameplay collaborator
//!
//! The turn-by-turn simulation (movement, combat, AI) lives outside this
//! crate. Controllers reach it through [`GameplayEngine`], which builds one
//! [`ScenarioRuntime`] per scenario. The runtime owns the teams, map,
//! time of day and turn counter for as long as the scenario runs.

use warband_shared::{ScenarioConfig, StoryPart};

use crate::controller::ControllerKind;
use crate::error::CampaignError;
use crate::outcome::{EndLevelData, Outcome};
use crate::state::{ReplayData, ScenarioSnapshot};
use crate::team::Team;

/// Turn position of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnCounter {
    /// Current turn (1-based)
    pub turn: u32,
    /// Turn limit (None = unlimited)
    pub number_of_turns: Option<u32>,
}

impl TurnCounter {
    /// Turns remaining before the limit, never negative.
    ///
    /// Unlimited scenarios have no turns left to award a bonus for.
    pub fn turns_left(&self) -> u32 {
        self.number_of_turns
            .map_or(0, |limit| limit.saturating_sub(self.turn))
    }
}

/// How linger mode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LingerResult {
    /// The player moved on
    #[default]
    Proceed,
    /// The player quit from linger mode
    Quit,
}

/// Everything the gameplay engine needs to build a scenario.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioLaunch<'a> {
    /// Starting position with carryover applied
    pub scenario: &'a ScenarioConfig,
    /// Controller driving the scenario
    pub kind: ControllerKind,
    /// Skip replaying already recorded turns
    pub skip_replay: bool,
    /// Hide the map while replaying (multiplayer)
    pub blindfold_replay: bool,
    /// This process hosts the multiplayer game
    pub is_server: bool,
    /// Unit id counter to continue from
    pub next_unit_id: u64,
    /// Recorded actions (replay playback)
    pub replay: &'a ReplayData,
}

/// Builds scenario runtimes.
pub trait GameplayEngine {
    /// Construct the runtime state for one scenario.
    fn launch(&mut self, launch: ScenarioLaunch<'_>) -> Result<Box<dyn ScenarioRuntime>, CampaignError>;
}

/// One scenario being played.
pub trait ScenarioRuntime {
    /// Run the scenario until it ends or reaches linger mode.
    fn play_scenario(&mut self, story: &[StoryPart], skip_replay: bool)
    -> Result<Outcome, CampaignError>;

    /// End-of-level data decided during play.
    fn end_level_data(&self) -> EndLevelData;

    /// Teams at the end of play.
    fn teams(&self) -> &[Team];

    /// Number of villages on the map.
    fn village_count(&self) -> u32;

    /// Turn position.
    fn turns(&self) -> TurnCounter;

    /// Next scenario as decided during play.
    fn next_scenario(&self) -> &str;

    /// Unit id counter after play.
    fn next_unit_id(&self) -> u64;

    /// Whether the local participant only observes.
    fn is_observer(&self) -> bool {
        false
    }

    /// Whether this process became the multiplayer host during play.
    fn is_host(&self) -> bool {
        false
    }

    /// Post-scenario review mode.
    fn linger(&mut self) -> LingerResult;

    /// Final runtime state.
    fn snapshot(&self) -> ScenarioSnapshot;

    /// Hand over the recorded actions.
    fn take_replay(&mut self) -> ReplayData;
}
