use super::{
    ControllerKind, MultiplayerController, ReplayController, SessionModeController,
    SinglePlayerController,
};
use crate::outcome::IoMode;
use crate::preferences::Preferences;

/// Mapping from session topology to controller, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTable {
    local: ControllerKind,
    server: ControllerKind,
    client: ControllerKind,
}

impl Default for ControllerTable {
    fn default() -> Self {
        Self {
            local: ControllerKind::SinglePlayer,
            server: ControllerKind::Multiplayer,
            client: ControllerKind::Multiplayer,
        }
    }
}

impl ControllerTable {
    /// Build the table from preferences.
    ///
    /// `always_use_mp_controller` routes local games through the
    /// multiplayer controller.
    pub fn resolve(preferences: &Preferences) -> Self {
        let mut table = Self::default();
        if preferences.debug.always_use_mp_controller {
            table.local = ControllerKind::Multiplayer;
        }
        tracing::debug!(target: "campaign", ?table, "Controller table resolved");
        table
    }

    pub fn kind_for(&self, io_mode: IoMode) -> ControllerKind {
        match io_mode {
            IoMode::None => self.local,
            IoMode::Server => self.server,
            IoMode::Client => self.client,
        }
    }

    /// Controller for the given topology.
    pub fn controller_for(&self, io_mode: IoMode) -> &'static dyn SessionModeController {
        controller(self.kind_for(io_mode))
    }
}

/// Controller implementing `kind`.
pub fn controller(kind: ControllerKind) -> &'static dyn SessionModeController {
    match kind {
        ControllerKind::SinglePlayer => &SinglePlayerController,
        ControllerKind::Multiplayer => &MultiplayerController,
        ControllerKind::Replay => &ReplayController,
    }
}
