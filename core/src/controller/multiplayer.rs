use super::{
    ControllerKind, ScenarioContext, ScenarioRequest, ScenarioResult, SessionModeController,
    finish, launch, linger, record_end_level,
};
use crate::carryover::store_carryover;
use crate::error::CampaignError;
use crate::outcome::{IoMode, Outcome};
use crate::runtime::LingerResult;
use crate::state::SessionState;

/// Networked controller, used for both host and client.
///
/// A client that became host during play is reported back as
/// [`IoMode::Server`] for the following scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplayerController;

impl SessionModeController for MultiplayerController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Multiplayer
    }

    fn run(
        &self,
        ctx: &mut ScenarioContext<'_>,
        state: &mut SessionState,
        request: &ScenarioRequest<'_>,
    ) -> Result<ScenarioResult, CampaignError> {
        state.expand_carryover();

        let mut runtime = launch(ctx, state, self.kind(), request)?;
        let outcome = runtime.play_scenario(request.story, request.skip_replay)?;
        let end_level = record_end_level(state, runtime.as_ref());

        let mut io_mode = request.io_mode;
        if io_mode == IoMode::Client && runtime.is_host() {
            tracing::info!(target: "network", "Client became host, switching to server mode");
            io_mode = IoMode::Server;
        }

        if outcome != Outcome::Quit {
            if matches!(outcome, Outcome::ObserverEnd | Outcome::SkipToLinger) {
                state.carryover_start.next_scenario = runtime.next_scenario().to_string();
            } else {
                // Before linger, so the victory or defeat summary shows first.
                store_carryover(
                    state,
                    runtime.as_ref(),
                    &mut *ctx.display,
                    &end_level,
                    outcome,
                    ctx.economy,
                );
            }
            if linger(&*ctx.display, runtime.as_mut(), &end_level) == LingerResult::Quit {
                return Ok(ScenarioResult {
                    outcome: Outcome::Quit,
                    end_level,
                    io_mode,
                });
            }
        }

        finish(state, runtime.as_mut());
        Ok(ScenarioResult {
            outcome,
            end_level,
            io_mode,
        })
    }
}
