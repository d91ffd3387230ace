use crate::config::Config;
use crate::evaluation::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Two-call evaluation pipeline wrapping the configured completion service.
    pub evaluator: Evaluator,
}
