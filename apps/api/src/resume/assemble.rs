//! Deduplication and final assembly.

use std::collections::HashSet;

use tracing::debug;

use crate::resume::models::{CareerRecord, EducationRecord, ParsedProfile, PersonalInfo};
use crate::resume::patterns::{has_year, RE_EDU_DOMAIN};

/// Builds the profile. `document` is the text the education fallback scans
/// when no education block survived classification.
pub fn assemble(
    info: PersonalInfo,
    careers: Vec<CareerRecord>,
    education: Vec<EducationRecord>,
    document: &str,
) -> ParsedProfile {
    let careers = dedup_by_text(careers, |c| c.text.as_str());
    let mut education = dedup_by_text(education, |e| e.text.as_str());
    if education.is_empty() {
        education = dedup_by_text(education_fallback(document), |e| e.text.as_str());
        if !education.is_empty() {
            debug!("Education recovered by fallback scan: {} entries", education.len());
        }
    }
    ParsedProfile::from_parts(info, careers, education)
}

/// Keeps the first entry for each trimmed text, in order.
pub fn dedup_by_text<T>(items: Vec<T>, key: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item).trim().to_string()))
        .collect()
}

/// Lines naming a school or degree, each with the following line when that
/// line carries a year.
pub fn education_fallback(document: &str) -> Vec<EducationRecord> {
    let lines: Vec<&str> = document
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if !RE_EDU_DOMAIN.is_match(lines[i]) {
            i += 1;
            continue;
        }
        match lines.get(i + 1) {
            Some(next) if has_year(next) && !has_year(lines[i]) => {
                out.push(EducationRecord::new(format!("{}\n{}", lines[i], next)));
                i += 2;
            }
            _ => {
                out.push(EducationRecord::new(lines[i]));
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn career(text: &str) -> CareerRecord {
        CareerRecord {
            text: text.into(),
            ..CareerRecord::default()
        }
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let careers = vec![career("A"), career("B"), career(" A "), career("C")];
        let texts: Vec<_> = dedup_by_text(careers, |c| c.text.as_str())
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_education_fallback_pairs_year_line() {
        let doc = "张三\n某某大学 计算机科学\n2015-2019\n负责开发\n硕士 2019-2022";
        let found: Vec<_> = education_fallback(doc).into_iter().map(|e| e.text).collect();
        assert_eq!(found, vec!["某某大学 计算机科学\n2015-2019", "硕士 2019-2022"]);
    }

    #[test]
    fn test_fallback_only_when_segmentation_found_nothing() {
        let doc = "某某大学";
        let profile = assemble(
            PersonalInfo::default(),
            vec![],
            vec![EducationRecord::new("本科")],
            doc,
        );
        assert_eq!(profile.education, vec![EducationRecord::new("本科")]);

        let profile = assemble(PersonalInfo::default(), vec![], vec![], doc);
        assert_eq!(profile.education, vec![EducationRecord::new("某某大学")]);
    }
}
