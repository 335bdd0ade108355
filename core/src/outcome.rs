//! Scenario outcomes, session topology and end-of-level data

use serde::{Deserialize, Serialize};

/// Result of running one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The local side won
    Victory,
    /// The local side lost
    Defeat,
    /// The player quit
    Quit,
    /// The scenario ended for an observer
    ObserverEnd,
    /// The scenario was loaded straight into linger mode
    SkipToLinger,
    /// No result (replay errors shown interactively)
    #[default]
    None,
}

impl Outcome {
    /// Short lowercase name, as used in logs and scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Quit => "quit",
            Self::ObserverEnd => "observer_end",
            Self::SkipToLinger => "skip_to_linger",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network topology of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoMode {
    /// Local single-player
    #[default]
    None,
    /// Multiplayer host
    Server,
    /// Multiplayer client
    Client,
}

impl IoMode {
    /// Whether the session involves other machines.
    pub fn is_networked(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Settings applied to the multiplayer setup of the next scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextScenarioSettings {
    /// Overrides the next scenario's `allow_new_game`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_new_game: Option<bool>,
}

/// Record produced when a scenario ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndLevelData {
    /// Continue to the next scenario
    pub proceed_to_next_level: bool,
    /// Award the early-finish bonus
    pub gold_bonus: bool,
    /// Share of gold carried to the next scenario, in percent
    pub carryover_percentage: u32,
    /// Write a start-of-scenario save for the next scenario
    pub prescenario_save: bool,
    /// Write a replay save of the finished scenario
    pub replay_save: bool,
    /// Show the carryover summary
    pub carryover_report: bool,
    /// Enter linger mode after the scenario
    pub linger_mode: bool,
    /// Multiplayer setup overrides for the next scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scenario_settings: Option<NextScenarioSettings>,
}

/// Default share of gold carried over, in percent.
pub const DEFAULT_CARRYOVER_PERCENTAGE: u32 = 80;

impl Default for EndLevelData {
    fn default() -> Self {
        Self {
            proceed_to_next_level: true,
            gold_bonus: true,
            carryover_percentage: DEFAULT_CARRYOVER_PERCENTAGE,
            prescenario_save: true,
            replay_save: true,
            carryover_report: true,
            linger_mode: true,
            next_scenario_settings: None,
        }
    }
}

impl EndLevelData {
    /// `allow_new_game` override for the next scenario, if any.
    pub fn allow_new_game_override(&self) -> Option<bool> {
        self.next_scenario_settings
            .as_ref()
            .and_then(|s| s.allow_new_game)
    }
}
