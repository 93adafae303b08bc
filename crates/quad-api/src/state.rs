use std::sync::Arc;

use quad_unlock::UnlockOrchestrator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub orchestrator: UnlockOrchestrator,
}
