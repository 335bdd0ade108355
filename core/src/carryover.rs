//! End-of-scenario gold carryover
//!
//! Only persistent, undefeated, human-controlled teams carry gold. When a
//! next scenario exists (or the campaign is a test campaign) each of them
//! carries `round((gold + bonus) * percentage / 100)`, where the early
//! finish bonus is `(villages * village_income + base_income) * turns_left`
//! and only applies if the end-of-level data grants it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use warband_shared::{CampaignType, is_scenario_reference};

use crate::display::GameDisplay;
use crate::outcome::{EndLevelData, Outcome};
use crate::preferences::EconomyConfig;
use crate::runtime::{ScenarioRuntime, TurnCounter};
use crate::state::{SessionState, SideCarryover};
use crate::team::Team;

/// Divide by 100, rounding halves away from zero.
pub fn div100rounded(value: i64) -> i64 {
    if value < 0 {
        -((-value + 50) / 100)
    } else {
        (value + 50) / 100
    }
}

/// Early finish bonus of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishingBonus {
    /// Income per remaining turn
    pub per_turn: i32,
    /// Turns left before the limit
    pub turns_left: u32,
    /// Bonus awarded (0 unless granted by the end-of-level data)
    pub total: i32,
}

impl FinishingBonus {
    pub fn compute(
        village_count: u32,
        turns: TurnCounter,
        economy: EconomyConfig,
        granted: bool,
    ) -> Self {
        let villages = i32::try_from(village_count).unwrap_or(i32::MAX);
        let per_turn = villages
            .saturating_mul(economy.village_income)
            .saturating_add(economy.base_income);
        let turns_left = turns.turns_left();
        let total = if granted {
            per_turn.saturating_mul(i32::try_from(turns_left).unwrap_or(i32::MAX))
        } else {
            0
        };
        Self {
            per_turn,
            turns_left,
            total,
        }
    }
}

/// Everything the calculator reads from a finished scenario.
#[derive(Debug, Clone, Copy)]
pub struct CarryoverInput<'a> {
    pub teams: &'a [Team],
    pub outcome: Outcome,
    pub end_level: &'a EndLevelData,
    pub village_count: u32,
    pub turns: TurnCounter,
    /// Next scenario as decided during play
    pub next_scenario: &'a str,
    pub campaign_type: CampaignType,
    /// The local participant only observed
    pub observer: bool,
}

/// Result of the carryover computation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CarryoverSummary {
    /// Report title
    pub title: String,
    /// Report text
    pub body: String,
    /// Carried gold by side save id
    pub carried: BTreeMap<String, SideCarryover>,
}

/// Compute carried gold and the summary report.
///
/// Returns None when there are no teams at all.
pub fn compute(input: &CarryoverInput<'_>, economy: EconomyConfig) -> Option<CarryoverSummary> {
    if input.teams.is_empty() {
        return None;
    }

    let mut summary = CarryoverSummary::default();
    if input.observer {
        summary.title = "Scenario Report".to_string();
    } else if input.outcome == Outcome::Victory {
        summary.title = "Victory".to_string();
        summary.body.push_str("You have emerged victorious!\n\n");
    } else {
        summary.title = "Defeat".to_string();
        summary.body.push_str("You have been defeated!\n");
    }

    let persistent_teams = input.teams.iter().filter(|t| t.persistent).count();
    let has_next_scenario = is_scenario_reference(input.next_scenario);
    let carries = persistent_teams > 0
        && ((has_next_scenario && input.end_level.proceed_to_next_level)
            || input.campaign_type == CampaignType::Test);
    if !carries {
        return Some(summary);
    }

    let bonus = FinishingBonus::compute(
        input.village_count,
        input.turns,
        economy,
        input.end_level.gold_bonus,
    );

    for team in input.teams.iter().filter(|t| t.qualifies_for_carryover()) {
        let gold = div100rounded(
            (i64::from(team.gold) + i64::from(bonus.total))
                * i64::from(input.end_level.carryover_percentage),
        );
        let gold = i32::try_from(gold).unwrap_or(if gold < 0 { i32::MIN } else { i32::MAX });

        if persistent_teams > 1 {
            let _ = writeln!(summary.body, "\n{}", team.name);
        }
        write_team_report(&mut summary.body, team.gold, gold, bonus);

        summary.carried.insert(
            team.save_id.clone(),
            SideCarryover {
                gold,
                name: team.name.clone(),
            },
        );
    }

    Some(summary)
}

fn write_team_report(report: &mut String, remaining: i32, carried: i32, bonus: FinishingBonus) {
    let _ = writeln!(report, "Remaining gold: {remaining}");
    if bonus.total > 0 {
        let _ = writeln!(report, "Early finish bonus: {} per turn", bonus.per_turn);
        let _ = writeln!(report, "Turns finished early: {}", bonus.turns_left);
        let _ = writeln!(report, "Bonus: {}", bonus.total);
        let _ = writeln!(report, "Gold: {}", remaining.saturating_add(bonus.total));
    }
    let _ = writeln!(
        report,
        "You will start the next scenario with {carried} or its defined minimum starting gold, \
         whichever is higher."
    );
}

/// Compute carryover for a finished scenario and record it in `state`.
///
/// With no teams the next scenario reference is recorded directly and
/// nothing else happens. The summary is shown if the end-of-level data
/// asks for it.
pub fn store_carryover(
    state: &mut SessionState,
    runtime: &dyn ScenarioRuntime,
    display: &mut dyn GameDisplay,
    end_level: &EndLevelData,
    outcome: Outcome,
    economy: EconomyConfig,
) -> Option<CarryoverSummary> {
    let input = CarryoverInput {
        teams: runtime.teams(),
        outcome,
        end_level,
        village_count: runtime.village_count(),
        turns: runtime.turns(),
        next_scenario: runtime.next_scenario(),
        campaign_type: state.classification.campaign_type,
        observer: runtime.is_observer(),
    };

    let Some(summary) = compute(&input, economy) else {
        tracing::debug!(target: "engine", "No teams, recording next scenario only");
        state.carryover_start.next_scenario = runtime.next_scenario().to_string();
        return None;
    };

    tracing::info!(
        target: "engine",
        %outcome,
        carried = summary.carried.len(),
        "Stored carryover"
    );
    state
        .carryover_end
        .sides
        .extend(summary.carried.iter().map(|(k, v)| (k.clone(), v.clone())));

    if end_level.carryover_report {
        display.show_transient_message(&summary.title, &summary.body);
    }
    Some(summary)
}
