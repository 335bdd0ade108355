//! Per-side state at the end of a scenario

use serde::{Deserialize, Serialize};
use warband_shared::{SideConfig, SideController};

/// A side as seen by the carryover calculator.
///
/// Teams belong to the running scenario and do not outlive it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    /// Side number (1-based)
    pub side: u32,
    /// Identifier matching the side across scenarios
    pub save_id: String,
    /// Display name of the controlling player
    pub name: String,
    /// Current gold balance (may be negative)
    pub gold: i32,
    /// Carries state forward to the next scenario
    pub persistent: bool,
    /// Controlled by a local human
    pub human: bool,
    /// Defeated
    pub lost: bool,
}

impl Team {
    /// Build a team from its scenario definition with the starting gold.
    pub fn from_side(side: &SideConfig) -> Self {
        Self {
            side: side.side,
            save_id: side.save_id.clone(),
            name: side.name.clone(),
            gold: side.gold,
            persistent: side.persistent,
            human: side.controller == SideController::Human,
            lost: false,
        }
    }

    /// Whether this team's gold is carried to the next scenario.
    pub fn qualifies_for_carryover(&self) -> bool {
        self.persistent && !self.lost && self.human
    }
}
