//! Block classifier.
//!
//! Each block is scored once, then run through [`RULES`] in order; the first
//! rule that returns a classification wins. Rules are plain functions over a
//! precomputed [`BlockView`] so each can be tested on its own.

use serde::Serialize;

use crate::resume::models::{Block, EntityKind, SectionTag, Sex};
use crate::resume::patterns::{
    count_keywords, is_company_line, is_title_line, tech_hits, EDUCATION_KEYWORDS,
    PERSONAL_KEYWORDS, PROJECT_KEYWORDS, PROJECT_SPECIFIC_KEYWORDS, RE_EDU_DOMAIN, RE_HAN_RUN,
    RE_NAME_SEX, WORK_KEYWORDS,
};
use crate::tagger::{advisory_hints, Tagger};

const EDUCATION_WEIGHT: u32 = 3;
const WORK_WEIGHT: u32 = 2;
const PROJECT_WEIGHT: u32 = 2;
const TECH_WEIGHT: u32 = 1;
const ORGANIZATION_WEIGHT: u32 = 2;
const PERSONAL_PENALTY: u32 = 2;

/// Blocks shorter than this with several personal keywords are contact info.
const PERSONAL_BLOCK_MAX_CHARS: usize = 200;

/// Phrases that mark a block as a job description on their own.
const EXPLICIT_WORK_MARKERS: &[&str] = &[
    "工作内容", "工作职责", "岗位职责", "主要职责", "任职", "responsibilities",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Education,
    Career,
    Discard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub education: u32,
    pub work: u32,
    pub project: u32,
    pub personal: u32,
    pub tech: u32,
}

/// A block plus everything the rules look at.
pub struct BlockView<'a> {
    pub block: &'a Block,
    /// Body with leading name/company/title meta lines removed.
    pub body: String,
    pub scores: Scores,
    pub explicit_work: bool,
    pub project_specific: bool,
}

impl<'a> BlockView<'a> {
    pub fn new(block: &'a Block, tagger: &dyn Tagger) -> Self {
        let body = strip_leading_meta(block.body_lines()).join("\n");
        let scores = score(&body, tagger);
        let lower = body.to_lowercase();
        Self {
            block,
            explicit_work: EXPLICIT_WORK_MARKERS.iter().any(|m| lower.contains(m)),
            project_specific: PROJECT_SPECIFIC_KEYWORDS.iter().any(|k| lower.contains(k)),
            body,
            scores,
        }
    }
}

/// Weighted keyword scores. Personal keywords pull work and project down.
pub fn score(text: &str, tagger: &dyn Tagger) -> Scores {
    let tech = tech_hits(text).len() as u32;
    let personal = count_keywords(text, PERSONAL_KEYWORDS);
    let mut work = count_keywords(text, WORK_KEYWORDS) * WORK_WEIGHT;
    let mut project = count_keywords(text, PROJECT_KEYWORDS) * PROJECT_WEIGHT + tech * TECH_WEIGHT;

    if RE_HAN_RUN.is_match(text) {
        let organizations = advisory_hints(tagger, text)
            .iter()
            .filter(|h| h.kind == EntityKind::Organization)
            .count() as u32;
        work += organizations * ORGANIZATION_WEIGHT;
    }

    let penalty = personal * PERSONAL_PENALTY;
    work = work.saturating_sub(penalty);
    project = project.saturating_sub(penalty);

    Scores {
        education: count_keywords(text, EDUCATION_KEYWORDS) * EDUCATION_WEIGHT,
        work,
        project,
        personal,
        tech,
    }
}

fn strip_leading_meta(lines: &[String]) -> &[String] {
    let skip = lines.iter().take_while(|l| is_meta_line(l)).count();
    &lines[skip..]
}

fn is_meta_line(line: &str) -> bool {
    is_name_sex_line(line) || is_company_line(line) || is_title_line(line)
}

fn is_name_sex_line(line: &str) -> bool {
    line.chars().count() <= 12 && (RE_NAME_SEX.is_match(line) || Sex::from_token(line).is_some())
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&BlockView) -> Option<Classification>,
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "section_title",
        apply: by_section_title,
    },
    Rule {
        name: "company_first_line",
        apply: by_company_first_line,
    },
    Rule {
        name: "education_domain",
        apply: by_education_domain,
    },
    Rule {
        name: "education_score",
        apply: by_education_score,
    },
    Rule {
        name: "personal_info_heavy",
        apply: by_personal_info,
    },
    Rule {
        name: "work_score",
        apply: by_work_score,
    },
    Rule {
        name: "project_score",
        apply: by_project_score,
    },
    Rule {
        name: "fallback",
        apply: |_| Some(Classification::Discard),
    },
];

fn by_section_title(view: &BlockView) -> Option<Classification> {
    view.block.tag.map(|tag| match tag {
        SectionTag::Education => Classification::Education,
        SectionTag::Project | SectionTag::Career => Classification::Career,
        SectionTag::Other => Classification::Discard,
    })
}

fn by_company_first_line(view: &BlockView) -> Option<Classification> {
    is_company_line(view.block.first_line()).then_some(Classification::Career)
}

fn by_education_domain(view: &BlockView) -> Option<Classification> {
    RE_EDU_DOMAIN
        .is_match(&view.body)
        .then_some(Classification::Education)
}

fn by_education_score(view: &BlockView) -> Option<Classification> {
    (view.scores.education >= 3).then_some(Classification::Education)
}

fn by_personal_info(view: &BlockView) -> Option<Classification> {
    (view.scores.personal >= 2 && view.block.char_len() < PERSONAL_BLOCK_MAX_CHARS)
        .then_some(Classification::Discard)
}

fn by_work_score(view: &BlockView) -> Option<Classification> {
    (view.scores.work >= 2 || view.explicit_work).then_some(Classification::Career)
}

fn by_project_score(view: &BlockView) -> Option<Classification> {
    (view.scores.project >= 2 && (view.project_specific || view.scores.tech > 0))
        .then_some(Classification::Career)
}

/// The outcome of classifying one block, with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub classification: Classification,
    pub rule: &'static str,
    pub scores: Scores,
}

pub fn classify(block: &Block, tagger: &dyn Tagger) -> Verdict {
    let view = BlockView::new(block, tagger);
    RULES
        .iter()
        .find_map(|rule| {
            (rule.apply)(&view).map(|classification| Verdict {
                classification,
                rule: rule.name,
                scores: view.scores,
            })
        })
        .unwrap_or(Verdict {
            classification: Classification::Discard,
            rule: "fallback",
            scores: view.scores,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::NamedEntityHint;
    use crate::tagger::{NoopTagger, TaggerError};

    struct OrgTagger;

    impl Tagger for OrgTagger {
        fn is_available(&self) -> bool {
            true
        }

        fn entities(&self, _text: &str) -> Result<Vec<NamedEntityHint>, TaggerError> {
            Ok(vec![NamedEntityHint::new("某某集团", EntityKind::Organization)])
        }
    }

    fn block(text: &str, tag: Option<SectionTag>) -> Block {
        Block::new(text.lines().map(String::from).collect(), tag).unwrap()
    }

    fn verdict(text: &str) -> Verdict {
        classify(&block(text, None), &NoopTagger)
    }

    #[test]
    fn test_section_tag_bypasses_scoring() {
        let b = block("项目经验\n随便写点什么", Some(SectionTag::Project));
        let v = classify(&b, &NoopTagger);
        assert_eq!(v.classification, Classification::Career);
        assert_eq!(v.rule, "section_title");

        let b = block("专业技能\n负责 Python 项目", Some(SectionTag::Other));
        assert_eq!(classify(&b, &NoopTagger).classification, Classification::Discard);
    }

    #[test]
    fn test_company_first_line_is_career() {
        let v = verdict("某某科技有限公司\n2019-2021");
        assert_eq!(v.classification, Classification::Career);
        assert_eq!(v.rule, "company_first_line");
    }

    #[test]
    fn test_education_domain_after_meta_strip() {
        let v = verdict("某某大学\n计算机科学 2015-2019");
        assert_eq!(v.classification, Classification::Education);
        assert_eq!(v.rule, "education_domain");
    }

    #[test]
    fn test_scores_count_every_occurrence() {
        let s = score("项目 项目 使用 Python 和 Rust", &NoopTagger);
        assert_eq!(s.project, 2 * 2 + 2);
        assert_eq!(s.tech, 2);
    }

    #[test]
    fn test_personal_keywords_reduce_scores_to_zero() {
        let s = score("电话 邮箱 负责", &NoopTagger);
        assert_eq!(s.personal, 2);
        assert_eq!(s.work, 0);
        assert_eq!(s.project, 0);
    }

    #[test]
    fn test_personal_heavy_short_block_discarded() {
        let v = verdict("微信：zs_2020\n邮箱见上\n负责人联系方式");
        assert_eq!(v.classification, Classification::Discard);
        assert_eq!(v.rule, "personal_info_heavy");
    }

    #[test]
    fn test_work_keywords_make_career() {
        let v = verdict("负责订单系统的开发与维护\n参与部门技术分享");
        assert_eq!(v.classification, Classification::Career);
        assert_eq!(v.rule, "work_score");
    }

    #[test]
    fn test_project_needs_specific_keyword_or_tech() {
        let v = verdict("使用 Python 实现数据清洗");
        assert_eq!(v.classification, Classification::Career);
        assert_eq!(v.rule, "project_score");

        let v = verdict("优化了很多东西");
        assert_eq!(v.classification, Classification::Discard);
        assert_eq!(v.rule, "fallback");
    }

    #[test]
    fn test_tagger_organizations_add_work_score() {
        let without = score("曾在某某集团工作", &NoopTagger);
        let with = score("曾在某某集团工作", &OrgTagger);
        assert_eq!(with.work, without.work + 2);
    }

    #[test]
    fn test_rules_are_ordered_and_end_in_fallback() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names.first(), Some(&"section_title"));
        assert_eq!(names.last(), Some(&"fallback"));
    }
}
