//! Fragment merger: re-attaches career blocks that were cut off from their
//! entry by stray blank lines.

use crate::resume::models::Block;
use crate::resume::patterns::{is_company_line, is_title_line, RE_DATE_RANGE, RE_NUMBERED_MARKER};

const FRAGMENT_MAX_CHARS: usize = 120;
const SHORT_LINE_MAX_CHARS: usize = 40;
const SUBSTANTIAL_ENTRY_CHARS: usize = 200;

pub fn is_fragment(block: &Block) -> bool {
    if block.tag.is_some() || is_company_line(block.first_line()) {
        return false;
    }
    block.char_len() < FRAGMENT_MAX_CHARS
        || (block.lines().len() == 1 && block.char_len() <= SHORT_LINE_MAX_CHARS)
        || RE_NUMBERED_MARKER.is_match(block.first_line())
}

/// True when `block` already reads as a job or project entry.
pub fn looks_like_entry(block: &Block) -> bool {
    let body = block.body_lines();
    body.first().is_some_and(|l| is_company_line(l))
        || body.iter().take(2).any(|l| is_title_line(l))
        || RE_DATE_RANGE.is_match(&block.text())
        || block.char_len() > SUBSTANTIAL_ENTRY_CHARS
}

/// Folds fragments into the preceding entry. Order is preserved.
pub fn merge_fragments(entries: Vec<Block>) -> Vec<Block> {
    let mut merged: Vec<Block> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.last_mut() {
            Some(prev) if is_fragment(&entry) && looks_like_entry(prev) => prev.absorb(entry),
            _ => merged.push(entry),
        }
    }
    merged
}
