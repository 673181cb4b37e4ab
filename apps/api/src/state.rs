use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationService;
use crate::session::Sessions;
use crate::thesis::cycle::Workspaces;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Upstream generator. `LlmClient` in production; swapped for fakes in tests.
    pub generator: Arc<dyn GenerationService>,
    pub sessions: Sessions,
    /// Per-session, per-page generation cycles.
    pub workspaces: Workspaces,
}

impl AppState {
    pub fn new(config: &Config, generator: Arc<dyn GenerationService>) -> Self {
        let workspaces = Workspaces::new(config.error_display());
        Self {
            generator,
            sessions: Sessions::default(),
            workspaces,
        }
    }
}
