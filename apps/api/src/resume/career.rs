//! Career structurer.
//!
//! Turns each merged career block into a [`CareerRecord`]. Regex extraction
//! runs first; tagger hints only fill what it left empty.

use tracing::debug;

use crate::resume::models::{Block, CareerRecord, EntityKind, NamedEntityHint, PersonalInfo};
use crate::resume::patterns::{
    clean_company, has_year, is_company_line, is_title_line, tech_hits, RE_COMPANY_SUFFIX,
    RE_DATE_RANGE, RE_TITLE_LABEL,
};
use crate::tagger::{advisory_hints, Tagger};

/// Largest character gap between two date hints that still reads as one range.
const DATE_HINT_MAX_GAP: usize = 2;

const FIELD_PUNCTUATION: &str = "|｜,，;；:：-–—~～()（）";

/// Structures every entry and folds company-less records into the one before
/// them; the earlier record keeps its own title and period when it has them.
/// Fills `info.name` from tagger hints if still unset.
pub fn structure_all(
    entries: &[Block],
    tagger: &dyn Tagger,
    info: &mut PersonalInfo,
) -> Vec<CareerRecord> {
    let mut records: Vec<CareerRecord> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(record) = structure(entry, tagger, info) else {
            continue;
        };
        match records.last_mut() {
            Some(prev) if record.company.is_none() => {
                debug!("Folding company-less career fragment into previous record");
                prev.absorb(record);
            }
            _ => records.push(record),
        }
    }
    records
}

/// Structures one entry. Returns `None` for a section title with no body.
pub fn structure(
    entry: &Block,
    tagger: &dyn Tagger,
    info: &mut PersonalInfo,
) -> Option<CareerRecord> {
    let lines = entry.body_lines();
    let first = lines.first()?;
    let mut record = CareerRecord {
        text: lines.join("\n"),
        ..CareerRecord::default()
    };

    let heads_entry = is_company_line(first)
        || (lines.get(1).is_some_and(|l| has_year(l))
            && !RE_DATE_RANGE.is_match(first)
            && !is_title_line(first)
            && first.chars().count() <= 60);
    let body = if heads_entry {
        let head = split_company_line(first);
        record.company = head.company;
        record.title = head.title;
        record.period = head.period;
        &lines[1..]
    } else {
        lines
    };

    let company = record.company.clone();
    for line in body {
        read_body_line(line, company.as_deref(), &mut record);
    }
    for tech in tech_hits(&record.text) {
        record.add_technology(tech);
    }

    apply_hints(&mut record, tagger, info);
    Some(record)
}

struct CompanyLine {
    company: Option<String>,
    title: Option<String>,
    period: Option<String>,
}

/// `某某科技有限公司 | 2019.07-2021.03 | 后端工程师` and the whitespace
/// separated variant both yield all three fields.
fn split_company_line(line: &str) -> CompanyLine {
    let period = RE_DATE_RANGE.find(line).map(|m| tidy_period(m.as_str()));
    let rest = RE_DATE_RANGE.replace(line, " ");

    let parts: Vec<&str> = if rest.contains(['|', '｜']) {
        rest.split(['|', '｜']).collect()
    } else {
        rest.split_whitespace().collect()
    };

    let mut title = None;
    let mut company_parts = Vec::new();
    for part in parts.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        if title.is_none() && is_title_line(part) && !RE_COMPANY_SUFFIX.is_match(part) {
            title = clean_title(part, None);
        } else {
            company_parts.push(part);
        }
    }
    let company = clean_company(&company_parts.join(" "));

    CompanyLine {
        company,
        title,
        period,
    }
}

fn read_body_line(line: &str, company: Option<&str>, record: &mut CareerRecord) {
    if let Some(m) = RE_DATE_RANGE.find(line) {
        if record.period.is_none() {
            record.period = Some(tidy_period(m.as_str()));
        }
        let remainder = format!("{}{}", &line[..m.start()], &line[m.end()..]);
        let remainder =
            remainder.trim_matches(|c: char| c.is_whitespace() || FIELD_PUNCTUATION.contains(c));
        if remainder.is_empty() {
            return;
        }
        if is_title_line(&RE_TITLE_LABEL.replace(remainder, "")) {
            if record.title.is_none() {
                record.title = clean_title(remainder, company);
            }
            return;
        }
        record.add_responsibility(line);
        return;
    }

    let unlabelled = RE_TITLE_LABEL.replace(line, "");
    if is_title_line(&unlabelled) {
        if record.title.is_none() {
            record.title = clean_title(&unlabelled, company);
        }
        return;
    }
    record.add_responsibility(line);
}

fn clean_title(raw: &str, company: Option<&str>) -> Option<String> {
    let mut title = RE_TITLE_LABEL.replace(raw.trim(), "").into_owned();
    if let Some(company) = company {
        title = title.replace(company, " ");
    }
    let title = RE_DATE_RANGE.replace_all(&title, " ");
    let title = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || FIELD_PUNCTUATION.contains(c))
        .to_string();
    (!title.is_empty()).then_some(title)
}

fn tidy_period(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tagger hints
// ────────────────────────────────────────────────────────────────────────────

fn apply_hints(record: &mut CareerRecord, tagger: &dyn Tagger, info: &mut PersonalInfo) {
    let hints = advisory_hints(tagger, &record.text);
    if hints.is_empty() {
        return;
    }

    if record.company.is_none() {
        record.company = hints
            .iter()
            .filter(|h| h.kind == EntityKind::Organization)
            .max_by_key(|h| h.text.chars().count())
            .and_then(|h| clean_company(&h.text));
    }

    if info.name.is_none() {
        info.name = hints
            .iter()
            .filter(|h| h.kind == EntityKind::Person)
            .map(|h| h.text.trim())
            .find(|t| (2..=4).contains(&t.chars().count()))
            .map(String::from);
    }

    if record.period.is_none() {
        let dates: Vec<&NamedEntityHint> = hints
            .iter()
            .filter(|h| h.kind == EntityKind::Date)
            .filter(|h| !is_age(&h.text, info.age.as_deref()))
            .collect();
        record.period = merge_date_hints(&record.text, &dates);
    }
}

/// A date hint whose digits equal the extracted age is the age, not a year.
fn is_age(hint: &str, age: Option<&str>) -> bool {
    let digits: String = hint.chars().filter(char::is_ascii_digit).collect();
    age.is_some_and(|age| !digits.is_empty() && digits == age)
}

/// Merges date hints into one period string. Offset-carrying hints are
/// grouped by adjacency in `text`; hints without offsets are glued by their
/// separators. Any hint with bad offsets makes the whole merge give up.
pub fn merge_date_hints(text: &str, hints: &[&NamedEntityHint]) -> Option<String> {
    if hints.is_empty() {
        return None;
    }
    if hints.iter().all(|h| h.start.is_some() && h.end.is_some()) {
        merge_by_offsets(text, hints)
    } else {
        merge_by_tokens(hints)
    }
}

fn merge_by_offsets(text: &str, hints: &[&NamedEntityHint]) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(hints.len());
    for hint in hints {
        let (start, end) = (hint.start?, hint.end?);
        if start >= end || end > chars.len() {
            debug!("Discarding date hints with out-of-range offsets {start}..{end}");
            return None;
        }
        spans.push((start, end));
    }
    spans.sort_unstable();

    let mut groups: Vec<(usize, usize, usize)> = Vec::new();
    for (start, end) in spans {
        match groups.last_mut() {
            Some((_, group_end, count)) if start <= *group_end + DATE_HINT_MAX_GAP => {
                *group_end = (*group_end).max(end);
                *count += 1;
            }
            _ => groups.push((start, end, 1)),
        }
    }

    let (start, end, _) = groups
        .iter()
        .find(|(_, _, count)| *count > 1)
        .or(groups.first())
        .copied()?;
    let period: String = chars.get(start..end)?.iter().collect();
    let period = tidy_period(period.trim());
    (!period.is_empty()).then_some(period)
}

fn merge_by_tokens(hints: &[&NamedEntityHint]) -> Option<String> {
    let mut groups: Vec<(String, usize)> = Vec::new();
    for hint in hints {
        let token = hint.text.trim();
        if token.is_empty() {
            continue;
        }
        match groups.last_mut() {
            Some((current, count))
                if has_date_separator(current.as_str()) || has_date_separator(token) =>
            {
                if glues_directly(current.as_str(), token) {
                    current.push_str(token);
                } else {
                    current.push_str(" - ");
                    current.push_str(token);
                }
                *count += 1;
            }
            _ => groups.push((token.to_string(), 1)),
        }
    }

    groups
        .iter()
        .find(|(_, count)| *count > 1)
        .or(groups.first())
        .map(|(period, _)| period.clone())
}

fn has_date_separator(token: &str) -> bool {
    token.contains(['年', '月', '.', '-', '/'])
}

/// `2019年` + `7月` is one date; `2019.07` + `2021.03` is a range.
fn glues_directly(prev: &str, next: &str) -> bool {
    let next_is_year = next.len() >= 4 && next.as_bytes()[..4].iter().all(u8::is_ascii_digit);
    (prev.ends_with(['年', '.', '-', '/']) && !next_is_year) || next.starts_with(['-', '.', '月'])
}
