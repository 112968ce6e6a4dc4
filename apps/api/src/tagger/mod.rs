//! Advisory entity tagger: pluggable, trait-based enrichment for the parser.
//!
//! Default: `LexiconTagger` behind a `LazyTagger` (built on first use).
//! `NoopTagger` is always unavailable and leaves the parser on pure heuristics.
//!
//! `AppState` holds an `Arc<dyn Tagger>`, selected at startup via `TAGGER`.
//! Hints only refine fields the regex stages left empty; a hint that resolves
//! to nothing is dropped without error.

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, TaggerKind};
use crate::resume::models::NamedEntityHint;

pub mod lexicon;

pub use lexicon::LexiconTagger;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("Lexicon I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexicon parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Tagger unavailable")]
    Unavailable,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The tagger capability. Implement this to swap enrichment backends without
/// touching the pipeline.
pub trait Tagger: Send + Sync {
    fn is_available(&self) -> bool;

    fn entities(&self, text: &str) -> Result<Vec<NamedEntityHint>, TaggerError>;
}

/// Always unavailable.
pub struct NoopTagger;

impl Tagger for NoopTagger {
    fn is_available(&self) -> bool {
        false
    }

    fn entities(&self, _text: &str) -> Result<Vec<NamedEntityHint>, TaggerError> {
        Ok(vec![])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LazyTagger: build once on first use, cache success or failure
// ────────────────────────────────────────────────────────────────────────────

type TaggerFactory = Box<dyn Fn() -> Result<Box<dyn Tagger>, TaggerError> + Send + Sync>;

/// Constructs its inner tagger the first time it is asked for one. A failed
/// construction is cached as "unavailable" and never retried.
pub struct LazyTagger {
    cell: OnceLock<Option<Box<dyn Tagger>>>,
    factory: TaggerFactory,
}

impl LazyTagger {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Tagger>, TaggerError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            factory: Box::new(factory),
        }
    }

    fn inner(&self) -> Option<&dyn Tagger> {
        self.cell
            .get_or_init(|| match (self.factory)() {
                Ok(tagger) => {
                    info!("Advisory tagger initialized");
                    Some(tagger)
                }
                Err(e) => {
                    warn!("Advisory tagger unavailable, using heuristics only: {e}");
                    None
                }
            })
            .as_deref()
    }
}

impl Tagger for LazyTagger {
    fn is_available(&self) -> bool {
        self.inner().is_some_and(|t| t.is_available())
    }

    fn entities(&self, text: &str) -> Result<Vec<NamedEntityHint>, TaggerError> {
        self.inner().ok_or(TaggerError::Unavailable)?.entities(text)
    }
}

/// Builds the process-wide tagger selected by configuration.
pub fn from_config(config: &Config) -> Arc<dyn Tagger> {
    match config.tagger {
        TaggerKind::None => Arc::new(NoopTagger),
        TaggerKind::Lexicon => {
            let path = config.tagger_lexicon.clone();
            Arc::new(LazyTagger::new(move || {
                let tagger = match &path {
                    Some(path) => LexiconTagger::from_path(path)?,
                    None => LexiconTagger::new(),
                };
                Ok(Box::new(tagger) as Box<dyn Tagger>)
            }))
        }
    }
}

/// Hints for `text`, or nothing when the tagger is unavailable or fails.
pub fn advisory_hints(tagger: &dyn Tagger, text: &str) -> Vec<NamedEntityHint> {
    if !tagger.is_available() {
        return vec![];
    }
    match tagger.entities(text) {
        Ok(hints) => hints,
        Err(e) => {
            debug!("Tagger call failed, ignoring hints: {e}");
            vec![]
        }
    }
}
