use super::{
    ControllerKind, ScenarioContext, ScenarioRequest, ScenarioResult, SessionModeController,
    finish, launch, linger, record_end_level,
};
use crate::carryover::store_carryover;
use crate::error::CampaignError;
use crate::outcome::Outcome;
use crate::runtime::LingerResult;
use crate::state::SessionState;

/// Local single-player controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePlayerController;

impl SessionModeController for SinglePlayerController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::SinglePlayer
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

        if outcome != Outcome::Quit {
            // A game loaded into linger mode already stored its carryover.
            if outcome != Outcome::SkipToLinger {
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
                    io_mode: request.io_mode,
                });
            }
        }

        finish(state, runtime.as_mut());
        Ok(ScenarioResult {
            outcome,
            end_level,
            io_mode: request.io_mode,
        })
    }
}
