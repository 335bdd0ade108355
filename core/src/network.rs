//! Multiplayer negotiation between scenarios
//!
//! Between two networked scenarios the party is re-assembled. A client
//! waits for the host to hand over the next scenario. The host prepares
//! [`MpGameSettings`], builds a [`ConnectEngine`] and either shows the
//! setup screen or starts at once. Transport and lobby UI live behind
//! [`NetworkNegotiator`].

use serde::{Deserialize, Serialize};
use warband_shared::ScenarioConfig;

use crate::catalog::ScenarioCatalog;
use crate::state::SessionState;

/// Settings of a hosted multiplayer game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpGameSettings {
    /// Game name shown in the lobby
    pub name: String,
    /// Hash of the unmodified scenario, checked by joining clients
    pub hash: String,
    /// Scenario sent to clients (carryover applied)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_data: Option<ScenarioConfig>,
    /// Scenario id
    pub mp_scenario: String,
    /// Scenario display name
    pub mp_scenario_name: String,
    /// Turn limit, -1 when unlimited
    pub num_turns: i32,
    /// Whether the game was started from a save
    pub saved_game: bool,
    /// Lock settings to the scenario's values
    pub use_map_settings: bool,
}

impl Default for MpGameSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            hash: String::new(),
            scenario_data: None,
            mp_scenario: String::new(),
            mp_scenario_name: String::new(),
            num_turns: -1,
            saved_game: false,
            use_map_settings: false,
        }
    }
}

impl MpGameSettings {
    /// Fill the per-scenario fields from the scenario about to be hosted.
    pub fn prepare_for(&mut self, scenario: &ScenarioConfig, next_unit_id: u64) {
        let mut data = scenario.clone();
        data.next_underlying_unit_id = Some(next_unit_id);
        self.scenario_data = Some(data);
        self.mp_scenario = scenario.id.clone();
        self.mp_scenario_name = scenario.name.clone();
        self.num_turns = scenario
            .turns
            .and_then(|t| i32::try_from(t).ok())
            .unwrap_or(-1);
        self.saved_game = false;
        self.use_map_settings = scenario.force_lock_settings;
    }
}

/// Answer of a blocking negotiation screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationResult {
    Proceed,
    Quit,
}

/// How users are assigned to sides when a game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportUsers {
    /// Keep the assignments made on the setup screen
    Keep,
    /// Re-import every connected user into the sides they held before
    Force,
}

/// Host-side game setup for the next scenario.
#[derive(Debug, Clone)]
pub struct ConnectEngine {
    params: MpGameSettings,
    local_game: bool,
    first_scenario: bool,
    started: Option<ImportUsers>,
}

impl ConnectEngine {
    pub fn new(params: MpGameSettings, local_game: bool, first_scenario: bool) -> Self {
        Self {
            params,
            local_game,
            first_scenario,
            started: None,
        }
    }

    pub fn params(&self) -> &MpGameSettings {
        &self.params
    }

    /// Settings may be adjusted on the setup screen before starting.
    pub fn params_mut(&mut self) -> &mut MpGameSettings {
        &mut self.params
    }

    /// Whether the game only has local participants.
    pub fn is_local_game(&self) -> bool {
        self.local_game
    }

    pub fn is_first_scenario(&self) -> bool {
        self.first_scenario
    }

    /// Start the game.
    pub fn start_game(&mut self, import: ImportUsers) {
        tracing::info!(
            target: "network",
            scenario = %self.params.mp_scenario,
            ?import,
            local = self.local_game,
            "Starting multiplayer game"
        );
        self.started = Some(import);
    }

    /// How the game was started, if it was.
    pub fn started(&self) -> Option<ImportUsers> {
        self.started
    }

    /// Scenario the started game runs. None if the game never started.
    pub fn into_scenario(self) -> Option<ScenarioConfig> {
        self.started?;
        self.params.scenario_data
    }
}

/// Lobby and transport surface used between networked scenarios.
///
/// All calls block until the participants have decided.
pub trait NetworkNegotiator {
    /// Client: wait for the host to deliver the next scenario.
    ///
    /// The host's scenario is delivered into `state.replay_start`.
    fn open_wait_screen(&mut self, state: &mut SessionState, observer: bool) -> NegotiationResult;

    /// Host: show the game setup screen. Proceeding starts the game.
    fn open_connect_screen(&mut self, engine: &mut ConnectEngine, game_name: &str)
    -> NegotiationResult;

    /// Host: start without showing the setup screen.
    fn start_immediately(&mut self, engine: &mut ConnectEngine) {
        engine.start_game(ImportUsers::Force);
    }

    /// Number of live network connections.
    fn connection_count(&self) -> usize;
}

/// Negotiator that never waits on anyone.
///
/// The setup screen proceeds at once. On the client side it stands in for
/// the host and delivers the next scenario from its own catalog.
#[derive(Debug, Clone, Default)]
pub struct AutoNegotiator {
    catalog: Option<ScenarioCatalog>,
}

impl AutoNegotiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve client wait screens from `catalog`.
    pub fn with_catalog(catalog: ScenarioCatalog) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }
}

impl NetworkNegotiator for AutoNegotiator {
    fn open_wait_screen(&mut self, state: &mut SessionState, observer: bool) -> NegotiationResult {
        if state.replay_start.is_none() {
            let next = self
                .catalog
                .as_ref()
                .and_then(|catalog| catalog.get(state.next_scenario()));
            match next {
                Some(scenario) => state.replay_start = Some(scenario.clone()),
                None => {
                    tracing::warn!(
                        target: "network",
                        next = %state.next_scenario(),
                        "No host delivered the next scenario"
                    );
                    return NegotiationResult::Quit;
                }
            }
        }
        tracing::debug!(target: "network", observer, "Wait screen finished");
        NegotiationResult::Proceed
    }

    fn open_connect_screen(
        &mut self,
        engine: &mut ConnectEngine,
        game_name: &str,
    ) -> NegotiationResult {
        tracing::debug!(target: "network", game = game_name, "Connect screen accepted");
        engine.start_game(ImportUsers::Keep);
        NegotiationResult::Proceed
    }

    fn connection_count(&self) -> usize {
        0
    }
}
