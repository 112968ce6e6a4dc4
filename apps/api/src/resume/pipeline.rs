//! Entry point: raw resume text in, [`ParsedProfile`] out.

use std::sync::Arc;

use tracing::{debug, info};

use crate::resume::assemble::assemble;
use crate::resume::career::structure_all;
use crate::resume::classify::{classify, Classification};
use crate::resume::header::{self, HeaderOutcome};
use crate::resume::merge::merge_fragments;
use crate::resume::models::{EducationRecord, ParsedProfile};
use crate::resume::normalize::clean;
use crate::resume::segment::segment;
use crate::tagger::{NoopTagger, Tagger};

const DEBUG_PREVIEW_CHARS: usize = 40;

/// Owns the advisory tagger so handlers can share one parser across requests.
#[derive(Clone)]
pub struct ResumeParser {
    tagger: Arc<dyn Tagger>,
}

impl ResumeParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self { tagger }
    }

    /// A parser with no tagger: regex heuristics only.
    pub fn heuristic() -> Self {
        Self::new(Arc::new(NoopTagger))
    }

    pub fn parse(&self, text: &str, debug: bool) -> ParsedProfile {
        parse_resume(text, self.tagger.as_ref(), debug)
    }
}

/// Parses one resume. Never fails: missing fields stay absent. `debug` logs
/// every block with its scores and the rule that decided it.
pub fn parse_resume(text: &str, tagger: &dyn Tagger, debug: bool) -> ParsedProfile {
    if text.trim().is_empty() {
        return ParsedProfile::default();
    }

    let cleaned = clean(text);
    let HeaderOutcome { mut info, body } = header::extract(&cleaned, tagger);
    let blocks = segment(&body);

    let mut careers = Vec::new();
    let mut education = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        let verdict = classify(block, tagger);
        if debug {
            let preview: String = block.text().chars().take(DEBUG_PREVIEW_CHARS).collect();
            info!(
                "block {i}: {:?} via {} {:?} | {}",
                verdict.classification,
                verdict.rule,
                verdict.scores,
                preview.replace('\n', " / ")
            );
        }
        match verdict.classification {
            Classification::Education => {
                let text = block.body_text();
                if !text.is_empty() {
                    education.push(EducationRecord::new(text));
                }
            }
            Classification::Career => careers.push(block.clone()),
            Classification::Discard => {}
        }
    }

    let entries = merge_fragments(careers);
    let records = structure_all(&entries, tagger, &mut info);
    if debug {
        for (i, record) in records.iter().enumerate() {
            info!(
                "career {i}: company={:?} title={:?} period={:?} responsibilities={} technologies={:?}",
                record.company,
                record.title,
                record.period,
                record.responsibilities.len(),
                record.technologies
            );
        }
    }

    let profile = assemble(info, records, education, &body);
    if debug {
        info!("profile: {}", serde_json::Value::Object(profile.to_map()));
    }
    debug!(
        "Parsed resume: {} blocks, {} careers, {} education",
        blocks.len(),
        profile.careers.len(),
        profile.education.len()
    );
    profile
}
