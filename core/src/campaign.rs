//! The campaign loop
//!
//! [`CampaignLoop::play`] runs scenarios back to back until the campaign
//! ends. It is a state machine over [`Step`]:
//!
//! ```text
//! Resolving ──▶ Running ──▶ ApplyingCarryover ──▶ Checkpointing ──┬──▶ Resolving
//!     │            │                                   │          └──▶ Negotiating ──▶ Resolving
//!     └────────────┴───────────────────────────────────┴─────────────────────┴──▶ Terminated
//! ```
//!
//! Quitting anywhere goes straight to `Terminated`. Fatal setup and play
//! errors are shown to the player and end the loop with [`Outcome::Quit`].

use warband_shared::{CampaignType, ScenarioConfig, is_scenario_reference};

use crate::catalog::ScenarioCatalog;
use crate::checkpoint::{CheckpointManager, Persistence};
use crate::controller::{ControllerTable, ScenarioContext, ScenarioRequest, ScenarioResult};
use crate::display::GameDisplay;
use crate::error::CampaignError;
use crate::network::{ConnectEngine, NegotiationResult, NetworkNegotiator};
use crate::outcome::{IoMode, Outcome};
use crate::preferences::Preferences;
use crate::resolver::{MapStore, ScenarioGenerator, ScenarioResolver};
use crate::runtime::GameplayEngine;
use crate::state::{FinishedScenario, SessionState};

/// Options of one campaign run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Initial topology
    pub io_mode: IoMode,
    /// Skip replaying recorded turns
    pub skip_replay: bool,
    /// Remote participants take part (multiplayer)
    pub network_game: bool,
    /// Hide the map while replaying (multiplayer)
    pub blindfold_replay: bool,
    /// Non-interactive run: return right after the first scenario
    pub unit_test: bool,
}

/// External collaborators of the campaign loop.
pub struct Collaborators<'a> {
    pub display: &'a mut dyn GameDisplay,
    pub engine: &'a mut dyn GameplayEngine,
    pub generator: &'a mut dyn ScenarioGenerator,
    pub maps: &'a dyn MapStore,
    pub persistence: &'a mut dyn Persistence,
    pub negotiator: &'a mut dyn NetworkNegotiator,
    pub catalog: &'a ScenarioCatalog,
    pub preferences: &'a Preferences,
}

/// Carried from a finished scenario into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    /// Write a start-of-scenario save once the next scenario is known
    prescenario_save: bool,
}

/// States of the campaign loop.
#[derive(Debug)]
enum Step {
    /// Find the scenario to play, or finish the campaign
    Resolving { transition: Option<Transition> },
    /// Play the current starting position
    Running,
    /// Commit the finished scenario's carryover
    ApplyingCarryover(ScenarioResult),
    /// Save housekeeping and the continuation decision
    Checkpointing {
        result: ScenarioResult,
        finished: FinishedScenario,
    },
    /// Re-assemble the multiplayer party
    Negotiating {
        transition: Transition,
        observer: bool,
    },
    Terminated(Outcome),
}

/// Drives a campaign from its current scenario to the end.
pub struct CampaignLoop<'a> {
    c: Collaborators<'a>,
    table: ControllerTable,
    options: PlayOptions,
    io_mode: IoMode,
}

impl<'a> CampaignLoop<'a> {
    pub fn new(collaborators: Collaborators<'a>, options: PlayOptions) -> Self {
        let table = ControllerTable::resolve(collaborators.preferences);
        Self {
            c: collaborators,
            table,
            options,
            io_mode: options.io_mode,
        }
    }

    /// Current topology. A client may have been promoted to server.
    pub fn io_mode(&self) -> IoMode {
        self.io_mode
    }

    /// Play until the campaign ends.
    ///
    /// Persistence failures are returned as errors. `state` keeps whatever
    /// progress was made, so nothing is lost when a save cannot be written.
    pub fn play(&mut self, state: &mut SessionState) -> Result<Outcome, CampaignError> {
        state.expand_scenario(self.c.catalog);

        let mut step = Step::Resolving { transition: None };
        loop {
            tracing::trace!(target: "campaign", ?step, "Campaign step");
            step = match step {
                Step::Resolving { transition } => self.resolve(state, transition)?,
                Step::Running => self.run_scenario(state)?,
                Step::ApplyingCarryover(result) => {
                    let finished = state.convert_to_start_save();
                    Step::Checkpointing { result, finished }
                }
                Step::Checkpointing { result, finished } => {
                    match self.checkpoint(state, result, &finished) {
                        Ok(step) => step,
                        Err(err) => {
                            state.restore_finished(finished);
                            return Err(err);
                        }
                    }
                }
                Step::Negotiating {
                    transition,
                    observer,
                } => self.negotiate(state, transition, observer),
                Step::Terminated(outcome) => {
                    tracing::info!(target: "campaign", %outcome, "Campaign finished");
                    return Ok(outcome);
                }
            };
        }
    }

    fn checkpoints(&mut self) -> CheckpointManager<'_> {
        CheckpointManager::new(&mut *self.c.persistence, &self.c.preferences.saves)
    }

    fn resolve(
        &mut self,
        state: &mut SessionState,
        transition: Option<Transition>,
    ) -> Result<Step, CampaignError> {
        let Some(name) = state.starting_pos().map(|pos| pos.name.clone()) else {
            return self.finish_campaign(state);
        };

        if let Some(transition) = transition {
            state.classification.label = state.classification.label_for(&name);
            if transition.prescenario_save {
                let io_mode = self.io_mode;
                self.checkpoints().scenario_start(state, io_mode)?;
            }
        } else {
            state.classification.assign_label_if_empty(&name);
        }

        tracing::info!(
            target: "campaign",
            label = %state.classification.label,
            "Starting scenario"
        );
        Ok(Step::Running)
    }

    /// No playable scenario is left.
    fn finish_campaign(&mut self, state: &SessionState) -> Result<Step, CampaignError> {
        let next = state.next_scenario();
        if is_scenario_reference(next) {
            let err = CampaignError::UnknownScenario(next.to_string());
            tracing::error!(target: "campaign", "{err}");
            self.c.display.show_error(&err.to_string());
            return Ok(Step::Terminated(Outcome::Quit));
        }

        if state.classification.campaign_type == CampaignType::Scenario {
            self.checkpoints().campaign_end(state)?;
        }
        Ok(Step::Terminated(Outcome::Victory))
    }

    fn run_scenario(&mut self, state: &mut SessionState) -> Result<Step, CampaignError> {
        let result = match self.play_current(state) {
            Ok(result) => result,
            Err(err) if err.is_fatal_scenario_error() => {
                tracing::error!(target: "engine", "{err}");
                if let CampaignError::ScriptDocument { dev_message, .. } = &err {
                    tracing::error!(target: "engine", dev_message = %dev_message, "Scenario document error");
                }
                if self.options.unit_test {
                    return Ok(Step::Terminated(Outcome::Defeat));
                }
                self.c.display.show_error(&err.to_string());
                return Ok(Step::Terminated(Outcome::Quit));
            }
            Err(err) => return Err(err),
        };

        self.io_mode = result.io_mode;
        tracing::info!(target: "campaign", outcome = %result.outcome, "Scenario finished");

        if self.options.unit_test || result.outcome == Outcome::Quit {
            return Ok(Step::Terminated(result.outcome));
        }
        Ok(Step::ApplyingCarryover(result))
    }

    fn play_current(&mut self, state: &mut SessionState) -> Result<ScenarioResult, CampaignError> {
        let pos = state
            .starting_pos()
            .ok_or_else(|| CampaignError::LoadFailure("no starting position".to_string()))?;
        let resolved = ScenarioResolver::new(&mut *self.c.generator, self.c.maps).resolve(pos)?;
        let story = resolved.story.clone();
        state.set_starting_pos(resolved);

        let controller = self.table.controller_for(self.io_mode);
        let mut ctx = ScenarioContext {
            display: &mut *self.c.display,
            engine: &mut *self.c.engine,
            economy: self.c.preferences.economy,
        };
        let request = ScenarioRequest {
            story: &story,
            skip_replay: self.options.skip_replay,
            blindfold_replay: self.options.blindfold_replay,
            io_mode: self.io_mode,
        };
        controller.run(&mut ctx, state, &request)
    }

    fn checkpoint(
        &mut self,
        state: &mut SessionState,
        result: ScenarioResult,
        finished: &FinishedScenario,
    ) -> Result<Step, CampaignError> {
        let ScenarioResult {
            outcome, end_level, ..
        } = result;
        let io_mode = self.io_mode;

        self.checkpoints()
            .end_of_scenario(state, finished, outcome, io_mode, &end_level)?;

        if io_mode.is_networked() && outcome == Outcome::Defeat {
            tracing::info!(target: "campaign", "Defeat ends the networked session");
            return Ok(Step::Terminated(outcome));
        }
        if !end_level.proceed_to_next_level || state.next_scenario().is_empty() {
            return Ok(Step::Terminated(outcome));
        }

        if outcome == Outcome::ObserverEnd
            && !self.c.display.show_yes_no(
                "Game Over",
                "This scenario has ended. Do you want to continue the campaign?",
            )
        {
            return Ok(Step::Terminated(outcome));
        }

        if !is_scenario_reference(state.next_scenario()) {
            // The campaign is complete, finish through the resolver.
            return Ok(Step::Resolving { transition: None });
        }

        let transition = Transition {
            prescenario_save: end_level.prescenario_save,
        };
        if io_mode.is_networked() {
            return Ok(Step::Negotiating {
                transition,
                observer: outcome == Outcome::ObserverEnd,
            });
        }

        state.expand_scenario(self.c.catalog);
        Ok(Step::Resolving {
            transition: Some(transition),
        })
    }

    fn negotiate(&mut self, state: &mut SessionState, transition: Transition, observer: bool) -> Step {
        match self.io_mode {
            IoMode::Client => {
                if self.c.negotiator.open_wait_screen(state, observer) == NegotiationResult::Quit {
                    return Step::Terminated(Outcome::Quit);
                }
                // Carryover start is kept, the host's scenario does not contain it.
                state.adopt_replay_start();
            }
            IoMode::Server => {
                if self.host_next_scenario(state) == NegotiationResult::Quit {
                    return Step::Terminated(Outcome::Quit);
                }
            }
            IoMode::None => {
                state.expand_scenario(self.c.catalog);
            }
        }
        Step::Resolving {
            transition: Some(transition),
        }
    }

    fn host_next_scenario(&mut self, state: &mut SessionState) -> NegotiationResult {
        if !state.expand_scenario(self.c.catalog) {
            return NegotiationResult::Proceed;
        }
        // Clients verify against the scenario as defined, before carryover.
        let hash = state
            .starting_pos()
            .map(ScenarioConfig::hash)
            .unwrap_or_default();
        state.mp_settings.hash = hash;

        state.expand_carryover();
        let Some(scenario) = state.starting_pos().cloned() else {
            return NegotiationResult::Proceed;
        };

        let allow_new_game = state
            .carryover_start
            .end_level
            .as_ref()
            .and_then(|e| e.allow_new_game_override())
            .unwrap_or(scenario.allow_new_game.unwrap_or(true));

        let next_unit_id = state.next_unit_id();
        state.mp_settings.prepare_for(&scenario, next_unit_id);
        let params = state.mp_settings.clone();
        let mut engine = ConnectEngine::new(params, !self.options.network_game, false);

        let debug_solo = self.c.preferences.debug.enabled && self.c.negotiator.connection_count() == 0;
        if allow_new_game || debug_solo {
            let name = state.mp_settings.name.clone();
            if self.c.negotiator.open_connect_screen(&mut engine, &name) == NegotiationResult::Quit {
                return NegotiationResult::Quit;
            }
        } else {
            self.c.negotiator.start_immediately(&mut engine);
        }

        if let Some(started) = engine.into_scenario() {
            state.replay_start = Some(started.clone());
            state.set_starting_pos(started);
        }
        NegotiationResult::Proceed
    }
}

/// Play a campaign from the current state of `state`.
pub fn play_game(
    collaborators: Collaborators<'_>,
    state: &mut SessionState,
    options: PlayOptions,
) -> Result<Outcome, CampaignError> {
    CampaignLoop::new(collaborators, options).play(state)
}
