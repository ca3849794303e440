use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatDelegate;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion delegate. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn ChatDelegate>,
    pub sessions: SessionStore,
    pub config: Config,
}
