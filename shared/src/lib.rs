//! Shared types for the Warband campaign engine.
//!
//! Scenario documents, campaign classification and the small helpers both the
//! core orchestration crate and the command-line tools need.

pub mod classification;
pub mod fs;
pub mod ids;
pub mod scenario;

pub use classification::{CampaignType, Classification};
pub use ids::{is_safe_save_name, sanitize_save_name};
pub use scenario::{
    GeneratorConfig, GeneratorParams, NULL_SCENARIO, ScenarioConfig, SideConfig, SideController,
    StoryPart, Variables, is_scenario_reference,
};
