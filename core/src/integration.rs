//! Campaign-level tests across all components

use warband_shared::{CampaignType, Classification, ScenarioConfig};

use crate::campaign::{Collaborators, PlayOptions, play_game};
use crate::catalog::ScenarioCatalog;
use crate::checkpoint::SaveKind;
use crate::controller::ControllerKind;
use crate::error::CampaignError;
use crate::headless::{FailureKind, ScenarioScript, ScriptedEngine, ScriptedFailure};
use crate::network::NegotiationResult;
use crate::outcome::{EndLevelData, IoMode, NextScenarioSettings, Outcome};
use crate::playback::play_replay;
use crate::preferences::Preferences;
use crate::runtime::LingerResult;
use crate::state::{ReplayCommand, SessionState};
use crate::test_utils::{
    FixedGenerator, MemoryMapStore, MemoryPersistence, RecordingDisplay, ScriptedNegotiator,
    chain, scenario_with_sides,
};

struct Harness {
    display: RecordingDisplay,
    engine: ScriptedEngine,
    generator: FixedGenerator,
    maps: MemoryMapStore,
    persistence: MemoryPersistence,
    negotiator: ScriptedNegotiator,
    catalog: ScenarioCatalog,
    preferences: Preferences,
    classification: Classification,
}

impl Harness {
    fn new(catalog: ScenarioCatalog) -> Self {
        let mut classification = Classification::new(CampaignType::Campaign);
        classification.abbrev = "HttT".to_string();
        Self {
            display: RecordingDisplay::headless(),
            engine: ScriptedEngine::default(),
            generator: FixedGenerator::default(),
            maps: MemoryMapStore::default(),
            persistence: MemoryPersistence::default(),
            negotiator: ScriptedNegotiator::default(),
            catalog,
            preferences: Preferences::default(),
            classification,
        }
    }

    fn script(mut self, scenario_id: &str, script: ScenarioScript) -> Self {
        self.engine = self.engine.with_script(scenario_id, script);
        self
    }

    fn session(&self, first: &str) -> SessionState {
        SessionState::new(self.classification.clone(), first)
    }

    fn play(&mut self, state: &mut SessionState, options: PlayOptions) -> Result<Outcome, CampaignError> {
        let collaborators = Collaborators {
            display: &mut self.display,
            engine: &mut self.engine,
            generator: &mut self.generator,
            maps: &self.maps,
            persistence: &mut self.persistence,
            negotiator: &mut self.negotiator,
            catalog: &self.catalog,
            preferences: &self.preferences,
        };
        play_game(collaborators, state, options)
    }

    fn run(&mut self, first: &str, options: PlayOptions) -> (Result<Outcome, CampaignError>, SessionState) {
        let mut state = self.session(first);
        let result = self.play(&mut state, options);
        (result, state)
    }

    fn launched(&self) -> Vec<&str> {
        self.engine
            .launches()
            .iter()
            .map(|l| l.scenario_id.as_str())
            .collect()
    }
}

fn local() -> PlayOptions {
    PlayOptions::default()
}

fn networked(io_mode: IoMode) -> PlayOptions {
    PlayOptions {
        io_mode,
        network_game: true,
        ..Default::default()
    }
}

fn full_carryover() -> EndLevelData {
    EndLevelData {
        carryover_percentage: 100,
        gold_bonus: false,
        ..Default::default()
    }
}

// ============================================================================
// Campaign progression
// ============================================================================

#[test]
fn campaign_plays_every_scenario_and_ends_in_victory() {
    let mut h = Harness::new(chain(&["01", "02", "03"], &[("Konrad", 100)]));
    let (result, state) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert_eq!(h.launched(), vec!["01", "02", "03"]);
    assert!(h.display.errors.is_empty());
    assert!(!state.valid());
}

#[test]
fn full_carryover_keeps_ending_gold_exactly() {
    let mut catalog = ScenarioCatalog::default();
    catalog.insert(scenario_with_sides("01", "02", &[("Konrad", 100), ("Delfador", 200)]));
    catalog.insert(scenario_with_sides("02", "null", &[("Konrad", 0), ("Delfador", 0)]));

    let mut h = Harness::new(catalog).script(
        "01",
        ScenarioScript {
            gold: [("Konrad".to_string(), 137), ("Delfador".to_string(), 71)].into(),
            end_level: Some(full_carryover()),
            ..Default::default()
        },
    );
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Victory);
    let second = &h.engine.launches()[1];
    assert_eq!(second.starting_gold["Konrad"], 137);
    assert_eq!(second.starting_gold["Delfador"], 71);
}

#[test]
fn finishing_bonus_only_when_granted() {
    let mut first = scenario_with_sides("01", "02", &[("Konrad", 100)]);
    first.turns = Some(10);
    let mut catalog = ScenarioCatalog::default();
    catalog.insert(first);
    catalog.insert(scenario_with_sides("02", "null", &[("Konrad", 0)]));

    let script = |gold_bonus| ScenarioScript {
        turn: 6,
        villages: 5,
        end_level: Some(EndLevelData {
            gold_bonus,
            carryover_percentage: 100,
            ..Default::default()
        }),
        ..Default::default()
    };

    let mut h = Harness::new(catalog.clone()).script("01", script(true));
    h.run("01", local()).0.unwrap();
    // (5 villages * 2 + 2) * 4 turns left = 48
    assert_eq!(h.engine.launches()[1].starting_gold["Konrad"], 148);

    let mut h = Harness::new(catalog).script("01", script(false));
    h.run("01", local()).0.unwrap();
    assert_eq!(h.engine.launches()[1].starting_gold["Konrad"], 100);
}

#[test]
fn scenarios_without_teams_still_advance() {
    let mut h = Harness::new(chain(&["01", "02"], &[]));
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert_eq!(h.launched(), vec!["01", "02"]);
    assert!(h.display.messages.is_empty());
}

#[test]
fn next_scenario_decided_during_play_is_followed() {
    let mut catalog = chain(&["01", "02"], &[]);
    catalog.insert(scenario_with_sides("secret", "null", &[]));
    let mut h = Harness::new(catalog).script(
        "01",
        ScenarioScript {
            next_scenario: Some("secret".into()),
            ..Default::default()
        },
    );
    h.run("01", local()).0.unwrap();
    assert_eq!(h.launched(), vec!["01", "secret"]);
}

#[test]
fn null_next_scenario_ends_in_victory() {
    let mut h = Harness::new(chain(&["01"], &[("Konrad", 100)]));
    let (result, state) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert_eq!(state.next_scenario(), "null");
    assert!(h.display.errors.is_empty());
}

#[test]
fn unknown_next_scenario_reports_error_and_quits() {
    let mut h = Harness::new(
        [scenario_with_sides("01", "99_missing", &[])]
            .into_iter()
            .collect(),
    );
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(h.display.errors, vec!["Unknown scenario: '99_missing'".to_string()]);
    // The finished scenario was still checkpointed.
    assert!(h.persistence.saves.iter().any(|s| s.kind == SaveKind::Replay));
}

#[test]
fn cyclic_chain_keeps_playing_until_play_stops_it() {
    let mut catalog = ScenarioCatalog::default();
    catalog.insert(scenario_with_sides("a", "b", &[]));
    catalog.insert(scenario_with_sides("b", "a", &[]));
    let mut h = Harness::new(catalog);
    h.engine = ScriptedEngine::default().with_launch_limit(5);

    let (result, _) = h.run("a", local());

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(h.launched(), vec!["a", "b", "a", "b", "a"]);
    assert_eq!(h.display.errors.len(), 1);
    assert!(h.display.errors[0].starts_with("Error while playing the game"));
}

#[test]
fn self_referencing_scenario_repeats() {
    let mut h = Harness::new([scenario_with_sides("loop", "loop", &[])].into_iter().collect());
    h.engine = ScriptedEngine::default().with_launch_limit(3);

    let (result, _) = h.run("loop", local());
    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(h.launched(), vec!["loop", "loop", "loop"]);
}

#[test]
fn local_defeat_ends_the_campaign() {
    let mut h = Harness::new(chain(&["01", "02"], &[("Konrad", 100)]))
        .script("01", ScenarioScript::with_outcome(Outcome::Defeat));
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Defeat);
    assert_eq!(h.launched(), vec!["01"]);
    assert!(h.persistence.saves.is_empty());
}

#[test]
fn final_scenario_ends_in_victory_whatever_the_outcome() {
    for outcome in [Outcome::SkipToLinger, Outcome::Defeat] {
        let mut h = Harness::new(chain(&["01"], &[("Konrad", 100)])).script(
            "01",
            ScenarioScript {
                outcome,
                end_level: Some(EndLevelData::default()),
                ..Default::default()
            },
        );
        let (result, _) = h.run("01", local());

        assert_eq!(result.unwrap(), Outcome::Victory, "{outcome}");
        assert_eq!(h.launched(), vec!["01"]);
    }
}

#[test]
fn observer_at_the_final_scenario_is_asked_before_victory() {
    for (answer, expected) in [(true, Outcome::Victory), (false, Outcome::ObserverEnd)] {
        let mut h = Harness::new(chain(&["mp1"], &[])).script(
            "mp1",
            ScenarioScript {
                outcome: Outcome::ObserverEnd,
                observer: true,
                end_level: Some(EndLevelData::default()),
                ..Default::default()
            },
        );
        h.display = RecordingDisplay::interactive(answer);
        let (result, _) = h.run("mp1", networked(IoMode::Client));

        assert_eq!(result.unwrap(), expected);
        assert_eq!(h.display.questions.len(), 1);
        assert!(h.negotiator.waits.is_empty());
    }
}

#[test]
fn unit_id_counter_threads_through_scenarios() {
    let mut h = Harness::new(chain(&["01", "02", "03"], &[]))
        .script(
            "01",
            ScenarioScript {
                units_created: 5,
                ..Default::default()
            },
        )
        .script(
            "02",
            ScenarioScript {
                units_created: 3,
                ..Default::default()
            },
        );
    let (_, state) = h.run("01", local());

    let ids: Vec<u64> = h.engine.launches().iter().map(|l| l.next_unit_id).collect();
    assert_eq!(ids, vec![0, 5, 8]);
    assert_eq!(state.next_unit_id(), 8);
}

#[test]
fn variables_carry_to_the_next_scenario() {
    let mut h = Harness::new(chain(&["01", "02"], &[])).script(
        "01",
        ScenarioScript {
            variables: [("met_elves".to_string(), serde_json::json!(true))].into(),
            ..Default::default()
        },
    );
    let (_, state) = h.run("01", local());
    assert_eq!(
        state.carryover_start.variables.get("met_elves"),
        Some(&serde_json::json!(true))
    );
}

// ============================================================================
// Quitting
// ============================================================================

#[test]
fn quit_during_scenario_skips_checkpoints() {
    let mut h = Harness::new(chain(&["01", "02"], &[("Konrad", 100)]))
        .script("01", ScenarioScript::with_outcome(Outcome::Quit));
    let (result, state) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(h.launched(), vec!["01"]);
    assert!(h.persistence.saves.is_empty());
    assert!(h.persistence.deleted.is_empty());
    // Nothing was committed for the next scenario.
    assert_eq!(state.next_scenario(), "01");
}

#[test]
fn quit_during_linger_skips_checkpoints() {
    let mut h = Harness::new(chain(&["01", "02"], &[("Konrad", 100)])).script(
        "01",
        ScenarioScript {
            linger: LingerResult::Quit,
            ..Default::default()
        },
    );
    h.display = RecordingDisplay::interactive(true);
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert!(h.persistence.saves.is_empty());
    // The victory summary was shown before linger.
    assert_eq!(h.display.messages.len(), 1);
}

#[test]
fn quit_in_client_wait_screen_terminates() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[]));
    h.negotiator.wait_answers.push_back(NegotiationResult::Quit);
    let (result, _) = h.run("mp1", networked(IoMode::Client));

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(h.launched(), vec!["mp1"]);
}

#[test]
fn quit_in_connect_screen_terminates() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[]));
    h.negotiator.connect_answer = Some(NegotiationResult::Quit);
    let (result, _) = h.run("mp1", networked(IoMode::Server));

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(h.launched(), vec!["mp1"]);
    assert_eq!(h.negotiator.connects.len(), 1);
    // No start-of-scenario save for a game that never started.
    assert!(h.persistence.saves.iter().all(|s| s.kind == SaveKind::Replay));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn fatal_error_shows_dialog_and_quits() {
    let mut h = Harness::new(chain(&["01", "02"], &[])).script(
        "01",
        ScenarioScript {
            fail: Some(ScriptedFailure {
                kind: FailureKind::Map,
                message: "bad tile".into(),
            }),
            ..Default::default()
        },
    );
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert_eq!(
        h.display.errors,
        vec!["The game map could not be loaded: bad tile".to_string()]
    );
}

#[test]
fn missing_map_is_fatal() {
    let mut scenario = scenario_with_sides("01", "null", &[]);
    scenario.map = "gone.map".into();
    let mut h = Harness::new([scenario].into_iter().collect());
    let (result, _) = h.run("01", local());

    assert_eq!(result.unwrap(), Outcome::Quit);
    assert!(h.display.errors[0].contains("map 'gone.map' not found"));
    assert!(h.launched().is_empty());
}

#[test]
fn checkpoint_failure_is_returned_and_state_survives() {
    let mut h = Harness::new(chain(&["01", "02"], &[("Konrad", 100)]));
    h.persistence = MemoryPersistence::failing();
    let (result, state) = h.run("01", local());

    assert!(matches!(result, Err(CampaignError::Persistence(_))));
    assert_eq!(state.next_scenario(), "02");
    assert!(state.carryover_start.sides.contains_key("Konrad"));
    // The played scenario can still be saved once the disk recovers.
    assert_eq!(state.starting_pos().unwrap().id, "01");
    assert!(state.replay_start.is_some());
    assert_eq!(state.replay_data.commands.len(), 1);
}

// ============================================================================
// Unit test mode
// ============================================================================

#[test]
fn unit_test_mode_returns_after_first_scenario() {
    let mut h = Harness::new(chain(&["01", "02"], &[]));
    let options = PlayOptions {
        unit_test: true,
        ..Default::default()
    };
    let (result, _) = h.run("01", options);

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert_eq!(h.launched(), vec!["01"]);
    assert!(h.persistence.saves.is_empty());
}

#[test]
fn unit_test_mode_maps_fatal_errors_to_defeat() {
    let mut h = Harness::new(chain(&["01"], &[])).script(
        "01",
        ScenarioScript {
            fail: Some(ScriptedFailure {
                kind: FailureKind::Runtime,
                message: "desync".into(),
            }),
            ..Default::default()
        },
    );
    let options = PlayOptions {
        unit_test: true,
        ..Default::default()
    };
    let (result, _) = h.run("01", options);

    assert_eq!(result.unwrap(), Outcome::Defeat);
    assert!(h.display.errors.is_empty());
}

// ============================================================================
// Saves and labels
// ============================================================================

#[test]
fn labels_follow_the_current_scenario() {
    let mut h = Harness::new(chain(&["01", "02"], &[]));
    let (_, state) = h.run("01", local());

    assert_eq!(state.classification.label, "HttT-Scenario 02");
    let replay_names: Vec<String> = h
        .persistence
        .saves
        .iter()
        .filter(|s| s.kind == SaveKind::Replay)
        .map(|s| s.name())
        .collect();
    assert_eq!(
        replay_names,
        vec!["HttT-Scenario 01 replay".to_string(), "HttT-Scenario 02 replay".to_string()]
    );
}

#[test]
fn existing_label_is_preserved_for_the_first_scenario() {
    let mut h = Harness::new(chain(&["01"], &[]));
    let mut state = h.session("01");
    state.classification.label = "My Game".into();
    h.play(&mut state, local()).unwrap();

    assert_eq!(h.persistence.saves[0].classification.label, "My Game");
}

#[test]
fn campaign_scenario_start_save_has_no_starting_position() {
    let mut h = Harness::new(chain(&["01", "02"], &[("Konrad", 100)]));
    h.run("01", local()).0.unwrap();

    let start = h
        .persistence
        .saves
        .iter()
        .find(|s| s.kind == SaveKind::ScenarioStart)
        .unwrap();
    assert!(start.starting_pos.is_none());
    assert_eq!(start.classification.label, "HttT-Scenario 02");
    assert_eq!(start.carryover_start.next_scenario, "02");
    assert!(start.carryover_start.sides.contains_key("Konrad"));
}

#[test]
fn multiplayer_scenario_start_save_keeps_starting_position() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[]));
    h.run("mp1", networked(IoMode::Server)).0.unwrap();

    let start = h
        .persistence
        .saves
        .iter()
        .find(|s| s.kind == SaveKind::ScenarioStart)
        .unwrap();
    assert_eq!(start.starting_pos.as_ref().unwrap().id, "mp2");
}

#[test]
fn prescenario_save_can_be_disabled() {
    let mut h = Harness::new(chain(&["01", "02"], &[])).script(
        "01",
        ScenarioScript {
            end_level: Some(EndLevelData {
                prescenario_save: false,
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    h.run("01", local()).0.unwrap();

    assert!(h.persistence.saves.iter().all(|s| s.kind != SaveKind::ScenarioStart));
    assert_eq!(h.launched(), vec!["01", "02"]);
}

#[test]
fn victory_deletes_old_saves_when_configured() {
    let mut h = Harness::new(chain(&["01"], &[]));
    h.preferences.saves.delete_saves_on_end = true;
    h.run("01", local()).0.unwrap();

    assert_eq!(h.persistence.deleted, vec!["HttT-Scenario 01".to_string()]);
}

#[test]
fn standalone_scenario_cleans_up_at_the_end() {
    let mut h = Harness::new(chain(&["skirmish"], &[]));
    h.classification = Classification::new(CampaignType::Scenario);
    h.preferences.saves.delete_saves_on_end = true;
    h.run("skirmish", local()).0.unwrap();

    // Once for the victory, once for the end of the standalone scenario.
    assert_eq!(h.persistence.deleted.len(), 2);
}

#[test]
fn replay_saves_can_be_disabled() {
    let mut h = Harness::new(chain(&["01"], &[]));
    h.preferences.saves.save_replays = false;
    h.run("01", local()).0.unwrap();
    assert!(h.persistence.saves.is_empty());
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn generated_map_reaches_the_engine() {
    let mut scenario = scenario_with_sides("cave", "null", &[]);
    scenario
        .map_generation
        .insert("size".into(), serde_json::json!(30));
    let mut h = Harness::new([scenario].into_iter().collect());
    h.run("cave", local()).0.unwrap();

    assert_eq!(h.engine.launches()[0].map_data, FixedGenerator::MAP);
    assert_eq!(h.generator.map_calls, 1);
}

#[test]
fn referenced_map_is_loaded() {
    let mut scenario = scenario_with_sides("bay", "null", &[]);
    scenario.map = "bay.map".into();
    let mut h = Harness::new([scenario].into_iter().collect());
    h.maps = MemoryMapStore::from([("bay.map", "Ww, Ww")]);
    h.run("bay", local()).0.unwrap();

    assert_eq!(h.engine.launches()[0].map_data, "Ww, Ww");
}

// ============================================================================
// Multiplayer
// ============================================================================

#[test]
fn networked_defeat_ends_the_session() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[("p1", 100)])).script(
        "mp1",
        ScenarioScript {
            outcome: Outcome::Defeat,
            end_level: Some(EndLevelData::default()),
            ..Default::default()
        },
    );
    let (result, _) = h.run("mp1", networked(IoMode::Server));

    assert_eq!(result.unwrap(), Outcome::Defeat);
    assert_eq!(h.launched(), vec!["mp1"]);
    assert!(h.negotiator.connects.is_empty());
    assert!(h.persistence.saves.iter().any(|s| s.kind == SaveKind::Replay));
}

#[test]
fn observer_declining_ends_with_observer_end() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[("p1", 100)])).script(
        "mp1",
        ScenarioScript {
            outcome: Outcome::ObserverEnd,
            observer: true,
            end_level: Some(EndLevelData::default()),
            ..Default::default()
        },
    );
    h.display = RecordingDisplay::interactive(false);
    let (result, state) = h.run("mp1", networked(IoMode::Client));

    assert_eq!(result.unwrap(), Outcome::ObserverEnd);
    assert_eq!(h.display.questions.len(), 1);
    assert_eq!(h.display.questions[0].0, "Game Over");
    assert!(h.display.messages.is_empty());
    assert!(h.negotiator.waits.is_empty());
    assert!(state.carryover_start.sides.is_empty());
}

#[test]
fn observer_continuing_waits_as_observer() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[])).script(
        "mp1",
        ScenarioScript {
            outcome: Outcome::ObserverEnd,
            observer: true,
            end_level: Some(EndLevelData::default()),
            ..Default::default()
        },
    );
    h.negotiator.deliver = Some(scenario_with_sides("mp2", "null", &[]));
    let (result, _) = h.run("mp1", networked(IoMode::Client));

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert_eq!(h.negotiator.waits, vec![true]);
    assert_eq!(h.launched(), vec!["mp1", "mp2"]);
}

#[test]
fn client_adopts_the_hosts_scenario() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[("p1", 100)])).script(
        "mp1",
        ScenarioScript {
            gold_delta: 100,
            end_level: Some(full_carryover()),
            ..Default::default()
        },
    );
    let mut hosted = scenario_with_sides("mp2", "null", &[("p1", 0)]);
    hosted.name = "Hosted".into();
    h.negotiator.deliver = Some(hosted);
    let (result, _) = h.run("mp1", networked(IoMode::Client));

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert_eq!(h.negotiator.waits, vec![false]);
    let second = &h.engine.launches()[1];
    assert_eq!(second.kind, ControllerKind::Multiplayer);
    assert!(!second.is_server);
    // Carryover start was kept and applied to the host's scenario.
    assert_eq!(second.starting_gold["p1"], 200);
}

#[test]
fn client_promoted_to_host_serves_the_next_scenario() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[])).script(
        "mp1",
        ScenarioScript {
            host: true,
            ..Default::default()
        },
    );
    let (result, _) = h.run("mp1", networked(IoMode::Client));

    assert_eq!(result.unwrap(), Outcome::Victory);
    assert!(h.negotiator.waits.is_empty());
    assert_eq!(h.negotiator.connects.len(), 1);
    assert!(!h.engine.launches()[0].is_server);
    assert!(h.engine.launches()[1].is_server);
}

#[test]
fn server_prepares_settings_and_hashes_unmodified_scenario() {
    let catalog = chain(&["mp1", "mp2"], &[("p1", 50)]);
    let expected_hash = catalog.get("mp2").unwrap().hash();
    let mut h = Harness::new(catalog).script(
        "mp1",
        ScenarioScript {
            gold_delta: 100,
            units_created: 9,
            end_level: Some(full_carryover()),
            ..Default::default()
        },
    );
    let mut state = h.session("mp1");
    state.mp_settings.name = "Friday game".into();
    h.play(&mut state, networked(IoMode::Server)).unwrap();

    assert_eq!(state.mp_settings.hash, expected_hash);
    assert_eq!(state.mp_settings.mp_scenario, "mp2");
    assert_eq!(state.mp_settings.num_turns, -1);
    let data = state.mp_settings.scenario_data.as_ref().unwrap();
    assert_eq!(data.next_underlying_unit_id, Some(9));
    // The hosted scenario carries the carried-over gold.
    assert_eq!(data.sides[0].gold, 150);
    assert_eq!(h.negotiator.connects, vec!["Friday game".to_string()]);
    assert_eq!(h.engine.launches()[1].starting_gold["p1"], 150);
}

#[test]
fn disallowed_setup_screen_starts_immediately() {
    let mut h = Harness::new(chain(&["mp1", "mp2"], &[])).script(
        "mp1",
        ScenarioScript {
            end_level: Some(EndLevelData {
                next_scenario_settings: Some(NextScenarioSettings {
                    allow_new_game: Some(false),
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    h.negotiator.connections = 2;
    h.run("mp1", networked(IoMode::Server)).0.unwrap();

    assert!(h.negotiator.connects.is_empty());
    assert_eq!(h.negotiator.immediate_starts, 1);
    assert_eq!(h.launched(), vec!["mp1", "mp2"]);
}

#[test]
fn debug_mode_offers_setup_screen_when_alone() {
    let mut catalog = ScenarioCatalog::default();
    catalog.insert(scenario_with_sides("mp1", "mp2", &[]));
    let mut second = scenario_with_sides("mp2", "null", &[]);
    second.allow_new_game = Some(false);
    catalog.insert(second);

    let mut h = Harness::new(catalog);
    h.preferences.debug.enabled = true;
    h.run("mp1", networked(IoMode::Server)).0.unwrap();

    assert_eq!(h.negotiator.connects.len(), 1);
    assert_eq!(h.negotiator.immediate_starts, 0);
}

#[test]
fn mp_controller_override_runs_local_games_as_multiplayer() {
    let mut h = Harness::new(chain(&["01"], &[]));
    h.preferences.debug.always_use_mp_controller = true;
    h.run("01", local()).0.unwrap();

    assert_eq!(h.engine.launches()[0].kind, ControllerKind::Multiplayer);
    assert!(h.negotiator.connects.is_empty());
}

// ============================================================================
// Replay playback
// ============================================================================

fn replay_session() -> SessionState {
    let mut start = ScenarioConfig::new("01", "The Elves Besieged");
    start
        .variables
        .insert("weather".into(), serde_json::json!("rain"));
    let mut state = SessionState::new(Classification::new(CampaignType::Campaign), "");
    state.replay_start = Some(start);
    state.replay_data.commands.push(ReplayCommand::default());
    state.replay_data.commands.push(ReplayCommand::default());
    state
}

#[test]
fn replay_plays_recorded_actions_and_clears_them() {
    let mut engine = ScriptedEngine::default();
    let mut display = RecordingDisplay::headless();
    let mut state = replay_session();

    let outcome = play_replay(&mut display, &mut engine, &mut state, false).unwrap();

    assert_eq!(outcome, Outcome::Victory);
    assert_eq!(engine.launches()[0].kind, ControllerKind::Replay);
    assert_eq!(engine.launches()[0].replayed_commands, 2);
    assert!(state.replay_data.is_empty());
    assert_eq!(state.classification.label, "The Elves Besieged");
    assert_eq!(
        state.carryover_start.variables.get("weather"),
        Some(&serde_json::json!("rain"))
    );
}

#[test]
fn replay_errors_depend_on_mode() {
    let failing = || {
        ScriptedEngine::default().with_script(
            "01",
            ScenarioScript {
                fail: Some(ScriptedFailure {
                    kind: FailureKind::Load,
                    message: "corrupt".into(),
                }),
                ..Default::default()
            },
        )
    };

    let mut engine = failing();
    let mut display = RecordingDisplay::headless();
    let mut state = replay_session();
    assert_eq!(
        play_replay(&mut display, &mut engine, &mut state, true).unwrap(),
        Outcome::Defeat
    );
    assert!(display.errors.is_empty());

    let mut engine = failing();
    let mut state = replay_session();
    assert_eq!(
        play_replay(&mut display, &mut engine, &mut state, false).unwrap(),
        Outcome::None
    );
    assert_eq!(
        display.errors,
        vec!["The game could not be loaded: corrupt".to_string()]
    );
}

#[test]
fn replay_without_replay_start_is_a_load_failure() {
    let mut engine = ScriptedEngine::default();
    let mut display = RecordingDisplay::headless();
    let mut state = SessionState::default();

    let outcome = play_replay(&mut display, &mut engine, &mut state, false).unwrap();
    assert_eq!(outcome, Outcome::None);
    assert_eq!(display.errors.len(), 1);
}
