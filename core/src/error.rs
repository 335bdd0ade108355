//! Error types for campaign orchestration
//!
//! [`CampaignError`] is the taxonomy the campaign loop reacts to. Its
//! `Display` output is the text shown to the player in error dialogs.

use std::io;

use thiserror::Error;

/// Errors raised while setting up or playing a scenario.
#[derive(Error, Debug)]
pub enum CampaignError {
    /// The game state could not be loaded or is inconsistent.
    #[error("The game could not be loaded: {0}")]
    LoadFailure(String),

    /// The gameplay simulation failed while running.
    #[error("Error while playing the game: {0}")]
    RuntimeGame(String),

    /// The scenario map could not be read or parsed.
    #[error("The game map could not be loaded: {0}")]
    MapFormat(String),

    /// The scenario document is malformed.
    #[error("Error while reading the scenario document: {user_message}")]
    ScriptDocument {
        /// Message suitable for players
        user_message: String,
        /// Details for content authors
        dev_message: String,
    },

    /// Scenario or map generation failed.
    #[error("Scenario generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The campaign ended pointing at a scenario that does not exist.
    #[error("Unknown scenario: '{0}'")]
    UnknownScenario(String),

    /// A checkpoint could not be written.
    #[error("The game could not be saved: {0}")]
    Persistence(#[from] SaveError),
}

impl CampaignError {
    /// Whether this error aborts the campaign with a dialog instead of propagating.
    ///
    /// Setup and execution failures are shown to the player and end the loop
    /// with QUIT. Persistence failures are returned to the caller.
    pub fn is_fatal_scenario_error(&self) -> bool {
        matches!(
            self,
            Self::LoadFailure(_)
                | Self::RuntimeGame(_)
                | Self::MapFormat(_)
                | Self::ScriptDocument { .. }
                | Self::Generation(_)
        )
    }
}

impl From<MapLoadError> for CampaignError {
    fn from(err: MapLoadError) -> Self {
        Self::MapFormat(err.to_string())
    }
}

/// Failure to resolve a map reference.
#[derive(Error, Debug)]
pub enum MapLoadError {
    #[error("map '{0}' not found")]
    NotFound(String),
    #[error("map reference '{0}' is outside the map directory")]
    InvalidReference(String),
    #[error("map '{reference}' is not valid UTF-8")]
    InvalidEncoding { reference: String },
    #[error("failed to read map '{reference}': {source}")]
    Io {
        reference: String,
        #[source]
        source: io::Error,
    },
}

/// Failure reported by a scenario or map generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{generator}: {message}")]
pub struct GenerationError {
    /// Generator name
    pub generator: String,
    /// What went wrong
    pub message: String,
}

impl GenerationError {
    pub fn new(generator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            message: message.into(),
        }
    }
}

/// Failure while reading or writing a save.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode save: {0}")]
    Encode(String),
    #[error("failed to decode save: {0}")]
    Decode(String),
    #[error("not a save file (bad magic)")]
    BadMagic,
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
}
