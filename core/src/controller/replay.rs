use super::{
    ControllerKind, ScenarioContext, ScenarioRequest, ScenarioResult, SessionModeController,
    launch, record_end_level,
};
use crate::error::CampaignError;
use crate::state::SessionState;

/// Plays back a recorded scenario.
///
/// The replay start already contains the carried-over sides, so only
/// carried variables are merged. Nothing is carried over and there is no
/// linger mode. The recorded actions stay in the session untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayController;

impl SessionModeController for ReplayController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Replay
    }

    fn run(
        &self,
        ctx: &mut ScenarioContext<'_>,
        state: &mut SessionState,
        request: &ScenarioRequest<'_>,
    ) -> Result<ScenarioResult, CampaignError> {
        state.expand_carryover_variables();

        let mut runtime = launch(ctx, state, self.kind(), request)?;
        let outcome = runtime.play_scenario(request.story, request.skip_replay)?;
        let end_level = record_end_level(state, runtime.as_ref());
        state.set_snapshot(runtime.snapshot());

        tracing::info!(target: "engine", %outcome, "Replay finished");
        Ok(ScenarioResult {
            outcome,
            end_level,
            io_mode: request.io_mode,
        })
    }
}
