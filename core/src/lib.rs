//! Warband Core - campaign session orchestration
//!
//! This crate sequences the scenarios of a campaign for a turn-based
//! strategy engine. It decides which scenario runs next and under which
//! mode, carries gold and variables across scenario boundaries, and writes
//! checkpoints. Gameplay, rendering and network transport are collaborators
//! reached through traits.
//!
//! # Architecture
//!
//! - [`CampaignLoop`] - Top-level state machine over a campaign
//! - [`SessionModeController`] - Drives one scenario (single-player, multiplayer, replay)
//! - [`carryover`] - Gold carryover at scenario end
//! - [`ScenarioResolver`] - Scenario and map generation, map loading
//! - [`CheckpointManager`] - Automatic saves around scenario boundaries
//! - [`SessionState`] - Long-lived state owned by the loop

pub mod campaign;
pub mod carryover;
pub mod catalog;
pub mod checkpoint;
pub mod controller;
pub mod display;
pub mod error;
pub mod headless;
#[cfg(test)]
mod integration;
pub mod map_store;
pub mod network;
pub mod outcome;
pub mod playback;
pub mod preferences;
pub mod resolver;
pub mod runtime;
pub mod save_store;
pub mod state;
pub mod team;

// Re-export the main entry points
pub use campaign::{CampaignLoop, Collaborators, PlayOptions, play_game};
pub use catalog::{CampaignHeader, CatalogError, ScenarioCatalog};
pub use checkpoint::{CheckpointManager, Persistence, SaveGame, SaveKind};
pub use controller::{
    ControllerKind, ControllerTable, ScenarioContext, ScenarioRequest, ScenarioResult,
    SessionModeController,
};
pub use display::{GameDisplay, HeadlessDisplay};
pub use error::{CampaignError, GenerationError, MapLoadError, SaveError};
pub use map_store::DirectoryMapStore;
pub use network::{AutoNegotiator, ConnectEngine, MpGameSettings, NegotiationResult, NetworkNegotiator};
pub use outcome::{EndLevelData, IoMode, Outcome};
pub use playback::play_replay;
pub use preferences::Preferences;
pub use resolver::{DisabledGenerator, MapStore, NoMaps, ScenarioGenerator, ScenarioResolver};
pub use runtime::{GameplayEngine, LingerResult, ScenarioLaunch, ScenarioRuntime, TurnCounter};
pub use save_store::FileSaveStore;
pub use state::SessionState;
pub use team::Team;
