//! Preferences management (`preferences.toml`)
//!
//! Handles loading, saving, and providing defaults for the settings the
//! campaign loop consults: save housekeeping, debug overrides and the economy
//! constants used for carryover. Stored in TOML format in the platform-specific
//! config directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User preferences consulted by the campaign loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preferences {
    /// Save housekeeping settings
    #[serde(default)]
    pub saves: SavePreferences,
    /// Debug overrides
    #[serde(default)]
    pub debug: DebugPreferences,
    /// Economy constants
    #[serde(default)]
    pub economy: EconomyConfig,
}

/// Compression applied to save payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SaveCompression {
    /// Plain JSON payload
    None,
    /// LZ4 block compression
    #[default]
    Lz4,
}

/// Save housekeeping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePreferences {
    /// Delete the campaign's saves once it is won (default: false)
    #[serde(default)]
    pub delete_saves_on_end: bool,
    /// Write a replay save after each finished scenario (default: true)
    #[serde(default = "default_true")]
    pub save_replays: bool,
    /// Save payload compression (default: lz4)
    #[serde(default)]
    pub compression: SaveCompression,
    /// Save directory override (default: `<data dir>/saves`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Debug overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DebugPreferences {
    /// Debug mode: offers the multiplayer setup screen even when the scenario
    /// disallows it, as long as nobody is connected (default: false)
    #[serde(default)]
    pub enabled: bool,
    /// Run local games through the multiplayer controller (default: false)
    #[serde(default)]
    pub always_use_mp_controller: bool,
}

/// Economy constants used by the finishing bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Gold per owned village per turn (default: 2)
    #[serde(default = "default_village_income")]
    pub village_income: i32,
    /// Base gold per turn (default: 2)
    #[serde(default = "default_base_income")]
    pub base_income: i32,
}

fn default_true() -> bool {
    true
}
fn default_village_income() -> i32 {
    2
}
fn default_base_income() -> i32 {
    2
}

impl Default for SavePreferences {
    fn default() -> Self {
        Self {
            delete_saves_on_end: false,
            save_replays: default_true(),
            compression: SaveCompression::default(),
            directory: None,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            village_income: default_village_income(),
            base_income: default_base_income(),
        }
    }
}

impl Preferences {
    /// Directory saves are written to.
    ///
    /// Returns the configured override, else `<data dir>/saves`, or `None` if
    /// no home directory can be determined.
    pub fn save_dir(&self) -> Option<PathBuf> {
        self.saves
            .directory
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("saves")))
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Warband\config`
/// On macOS: `~/Library/Application Support/io.warband.Warband`
/// On Linux: `~/.config/Warband`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.warband", "", "Warband")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory (saves, downloaded campaigns).
///
/// Returns `None` if the home directory cannot be determined.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.warband", "", "Warband")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the preferences from disk.
///
/// Reads `preferences.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Preferences {
    let Some(path) = config_dir().map(|dir| dir.join("preferences.toml")) else {
        return Preferences::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
            Preferences::default()
        }),
        Err(_) => Preferences::default(),
    }
}

/// Parses preferences from TOML text.
pub fn parse(content: &str) -> Result<Preferences, toml::de::Error> {
    toml::from_str(content)
}

/// Saves the preferences to disk.
///
/// Writes `preferences.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(preferences: &Preferences) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(preferences)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(dir.join("preferences.toml"), content)?;
    }
    Ok(())
}
