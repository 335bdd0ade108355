//! Scenario catalog and campaign files
//!
//! A campaign file is TOML with a `[campaign]` header and one
//! `[[scenario]]` table per scenario:
//!
//! ```toml
//! [campaign]
//! id = "heir"
//! name = "Heir to the Throne"
//! abbrev = "HttT"
//! type = "campaign"
//! first_scenario = "01_bay"
//!
//! [[scenario]]
//! id = "01_bay"
//! name = "The Elves Besieged"
//! next_scenario = "02_blackwater"
//! turns = 12
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warband_shared::{CampaignType, Classification, ScenarioConfig, is_scenario_reference};

/// Failure to load a campaign file.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read campaign file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse campaign file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate scenario id '{0}'")]
    DuplicateScenario(String),
    #[error("first scenario '{0}' is not defined")]
    MissingFirstScenario(String),
}

/// `[campaign]` header of a campaign file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignHeader {
    pub id: String,
    pub name: String,
    pub abbrev: String,
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    pub first_scenario: String,
    pub difficulty: String,
}

impl CampaignHeader {
    /// Classification for a new playthrough of this campaign.
    pub fn classification(&self) -> Classification {
        Classification {
            campaign_type: self.campaign_type,
            campaign: self.id.clone(),
            abbrev: self.abbrev.clone(),
            label: String::new(),
            difficulty: self.difficulty.clone(),
        }
    }
}

#[derive(Deserialize)]
struct CampaignFile {
    #[serde(default)]
    campaign: CampaignHeader,
    #[serde(default)]
    scenario: Vec<ScenarioConfig>,
}

/// Scenario definitions available to the campaign loop, by id.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    header: CampaignHeader,
    scenarios: BTreeMap<String, ScenarioConfig>,
}

impl ScenarioCatalog {
    /// Load a campaign file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a campaign file.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CampaignFile = toml::from_str(content)?;

        let mut catalog = Self {
            header: file.campaign,
            scenarios: BTreeMap::new(),
        };
        for scenario in file.scenario {
            if catalog.scenarios.contains_key(&scenario.id) {
                return Err(CatalogError::DuplicateScenario(scenario.id));
            }
            catalog.insert(scenario);
        }

        let first = &catalog.header.first_scenario;
        if is_scenario_reference(first) && !catalog.scenarios.contains_key(first) {
            return Err(CatalogError::MissingFirstScenario(first.clone()));
        }

        Ok(catalog)
    }

    pub fn header(&self) -> &CampaignHeader {
        &self.header
    }

    /// Add or replace a scenario.
    pub fn insert(&mut self, scenario: ScenarioConfig) {
        self.scenarios.insert(scenario.id.clone(), scenario);
    }

    /// Look up a scenario. Empty and "null" references never resolve.
    pub fn get(&self, id: &str) -> Option<&ScenarioConfig> {
        if !is_scenario_reference(id) {
            return None;
        }
        self.scenarios.get(id)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl FromIterator<ScenarioConfig> for ScenarioCatalog {
    fn from_iter<T: IntoIterator<Item = ScenarioConfig>>(iter: T) -> Self {
        let mut catalog = Self::default();
        for scenario in iter {
            catalog.insert(scenario);
        }
        catalog
    }
}
