//! Scenario documents
//!
//! A [`ScenarioConfig`] is the structured description of one playable
//! scenario: its identity, map source, story, sides and the reference to the
//! scenario that follows it. Campaign files hold one per scenario; the session
//! keeps the current one as its starting position.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Free-form scenario variables carried between scenarios.
pub type Variables = BTreeMap<String, serde_json::Value>;

/// Parameters handed to a scenario or map generator.
pub type GeneratorParams = BTreeMap<String, serde_json::Value>;

/// Sentinel "next scenario" reference marking the intended end of a campaign.
pub const NULL_SCENARIO: &str = "null";

/// Returns true if `id` refers to a real follow-up scenario.
///
/// Both the empty reference and [`NULL_SCENARIO`] mean "no next scenario".
pub fn is_scenario_reference(id: &str) -> bool {
    !id.is_empty() && id != NULL_SCENARIO
}

/// Who controls a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideController {
    /// Local human player
    #[default]
    Human,
    /// Computer player
    Ai,
    /// Remote human player (multiplayer)
    Network,
    /// Empty side
    Null,
}

/// Static definition of one side in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideConfig {
    /// Side number (1-based)
    pub side: u32,
    /// Identifier used to match carried-over state across scenarios
    pub save_id: String,
    /// Display name of the controlling player
    pub name: String,
    /// Starting gold
    pub gold: i32,
    /// Whether this side carries state forward to the next scenario
    pub persistent: bool,
    /// Add carried gold to `gold` instead of taking the larger of the two
    pub carryover_add: bool,
    /// Controller type
    pub controller: SideController,
    /// Team name (sides sharing a team are allied)
    pub team_name: String,
}

impl Default for SideConfig {
    fn default() -> Self {
        Self {
            side: 1,
            save_id: String::new(),
            name: String::new(),
            gold: 100,
            persistent: false,
            carryover_add: false,
            controller: SideController::Human,
            team_name: String::new(),
        }
    }
}

/// One page of the narrative shown before a scenario starts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryPart {
    pub title: String,
    pub text: String,
}

/// Scenario generator sub-configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Generator name (e.g. "cave", "default")
    pub name: String,
    /// Generator-specific settings
    pub settings: GeneratorParams,
}

/// Structured description of one scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Unique scenario id within the campaign
    pub id: String,
    /// Display name
    pub name: String,
    /// Id of the scenario that follows a victory (empty or "null" ends the campaign)
    pub next_scenario: String,
    /// Turn limit (None = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turns: Option<u32>,
    /// Reference to a map file in the map store
    pub map: String,
    /// Inline map data
    pub map_data: String,
    /// Map generation parameters (non-empty requests a generated map)
    pub map_generation: GeneratorParams,
    /// Scenario generation parameters (non-empty requests a generated scenario)
    pub scenario_generation: GeneratorParams,
    /// Generator sub-configuration used by either kind of generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
    /// Story shown before the scenario
    pub story: Vec<StoryPart>,
    /// Side definitions
    pub sides: Vec<SideConfig>,
    /// Scenario variables
    pub variables: Variables,
    /// Whether the multiplayer setup screen may be shown before this scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_new_game: Option<bool>,
    /// Lock game settings to the scenario's values in multiplayer setup
    pub force_lock_settings: bool,
    /// Unit id counter value the scenario starts from (multiplayer hand-off)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_underlying_unit_id: Option<u64>,
}

impl ScenarioConfig {
    /// Create a scenario with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the whole scenario should be produced by a generator.
    pub fn wants_scenario_generation(&self) -> bool {
        !self.scenario_generation.is_empty()
    }

    /// Whether the map should be produced by a generator.
    pub fn wants_map_generation(&self) -> bool {
        !self.map_generation.is_empty()
    }

    /// Find a side by its save id.
    pub fn side_mut(&mut self, save_id: &str) -> Option<&mut SideConfig> {
        self.sides.iter_mut().find(|s| s.save_id == save_id)
    }

    /// Stable content hash, hex-encoded.
    ///
    /// Computed over the canonical JSON encoding. Map fields are ordered, so
    /// equal scenarios always produce equal hashes.
    pub fn hash(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:016x}", xxh3_64(&bytes))
    }
}
