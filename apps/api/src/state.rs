use crate::config::Config;
use crate::resume::ResumeParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Parser holding the process-wide advisory tagger, built lazily on first parse.
    pub parser: ResumeParser,
}
