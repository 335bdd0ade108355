//! Campaign classification and save labels

use serde::{Deserialize, Serialize};

/// Kind of game session being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    /// A single standalone scenario
    Scenario,
    /// A multi-scenario campaign
    #[default]
    Campaign,
    /// Multiplayer game
    Multiplayer,
    /// Test campaign (carryover is computed even without a next scenario)
    Test,
}

/// Identity of the running game, used for labels and save names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Classification {
    /// Session kind
    pub campaign_type: CampaignType,
    /// Campaign id
    pub campaign: String,
    /// Short campaign abbreviation used as a label prefix
    pub abbrev: String,
    /// Current save label
    pub label: String,
    /// Selected difficulty
    pub difficulty: String,
}

impl Classification {
    /// Create a classification for the given session kind.
    pub fn new(campaign_type: CampaignType) -> Self {
        Self {
            campaign_type,
            ..Default::default()
        }
    }

    /// Label for a scenario: `"<abbrev>-<name>"`, or just the name without abbreviation.
    pub fn label_for(&self, scenario_name: &str) -> String {
        if self.abbrev.is_empty() {
            scenario_name.to_string()
        } else {
            format!("{}-{}", self.abbrev, scenario_name)
        }
    }

    /// Assign the label for `scenario_name` unless one is already set.
    ///
    /// Returns true if the label changed.
    pub fn assign_label_if_empty(&mut self, scenario_name: &str) -> bool {
        if !self.label.is_empty() {
            return false;
        }
        self.label = self.label_for(scenario_name);
        true
    }
}
