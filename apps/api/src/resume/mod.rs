//! Heuristic resume structuring.
//!
//! Stages, in the order a parse runs them:
//! - `normalize`: whitespace, export noise and noisy lines
//! - `header`: name / phone / email / age / sex from the top lines
//! - `segment`: blocks split at section titles and company lines
//! - `classify`: ordered rule list deciding education / career / discard
//! - `merge`: short career fragments re-attached to their entry
//! - `career`: company / title / period / responsibilities / technologies
//! - `assemble`: dedup and the education fallback
//!
//! `pipeline::parse_resume` wires them together.

pub mod assemble;
pub mod career;
pub mod classify;
pub mod handlers;
pub mod header;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod patterns;
pub mod pipeline;
pub mod segment;

pub use pipeline::ResumeParser;
