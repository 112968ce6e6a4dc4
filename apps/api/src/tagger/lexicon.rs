//! Dictionary-driven tagger. No model download, deterministic output.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::resume::models::{EntityKind, NamedEntityHint};
use crate::resume::patterns::RE_HAN_RUN;
use crate::tagger::{Tagger, TaggerError};

const SURNAMES: &str = "王李张刘陈杨赵黄周吴徐孙胡朱高林何郭马罗梁宋郑谢韩唐冯于董萧程曹袁邓许傅沈曾彭吕苏卢蒋蔡贾丁魏薛叶阎余潘杜戴夏钟汪田任姜范方石姚谭廖邹熊金陆郝孔白崔康毛邱秦江史顾侯邵孟龙万段雷钱汤尹黎易常武乔贺赖龚文";

/// Surname-initial words that are not names.
const PERSON_STOP_WORDS: &[&str] = &[
    "高级", "高效", "高中", "程序", "任职", "任务", "方案", "方向", "方法", "方面", "文档", "文件",
    "常用", "金融", "周期", "曾经", "于是", "万元", "江苏", "高校", "黄金", "石油", "安全",
];

static RE_ORG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Han}A-Za-z（）()]{1,30}?(?:有限责任公司|股份有限公司|有限公司|公司|集团|研究院|大学|学院|银行|医院)")
        .unwrap()
});

static RE_ORG_LEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?(?:就职于|任职于|供职于|加入|入职|在|于)").unwrap());

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").unwrap());

static RE_MONTH_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[.\-/年]\s*(?:1[0-2]|0?[1-9])\s*月?").unwrap());

/// User-supplied additions, loaded from JSON.
#[derive(Debug, Default, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub persons: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
}

pub struct LexiconTagger {
    surnames: HashSet<char>,
    lexicon: Lexicon,
}

impl LexiconTagger {
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::default())
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self {
            surnames: SURNAMES.chars().collect(),
            lexicon,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, TaggerError> {
        let raw = std::fs::read_to_string(path)?;
        let lexicon: Lexicon = serde_json::from_str(&raw)?;
        Ok(Self::with_lexicon(lexicon))
    }

    fn persons(&self, text: &str, hints: &mut Vec<NamedEntityHint>) {
        for m in RE_HAN_RUN.find_iter(text) {
            let run = m.as_str();
            let len = run.chars().count();
            let starts_with_surname = run.chars().next().is_some_and(|c| self.surnames.contains(&c));
            if (2..=3).contains(&len) && starts_with_surname && !PERSON_STOP_WORDS.contains(&run) {
                hints.push(hint_at(text, m.start(), m.end(), EntityKind::Person));
            }
        }
        exact_matches(text, &self.lexicon.persons, EntityKind::Person, hints);
    }

    fn organizations(&self, text: &str, hints: &mut Vec<NamedEntityHint>) {
        for m in RE_ORG.find_iter(text) {
            let lead = RE_ORG_LEAD.find(m.as_str()).map_or(0, |l| l.end());
            let name = &m.as_str()[lead..];
            if name.chars().count() >= 4 {
                hints.push(hint_at(text, m.start() + lead, m.end(), EntityKind::Organization));
            }
        }
        exact_matches(
            text,
            &self.lexicon.organizations,
            EntityKind::Organization,
            hints,
        );
    }

    /// Year or year-month tokens, plus "至今".
    fn dates(&self, text: &str, hints: &mut Vec<NamedEntityHint>) {
        for m in RE_YEAR.find_iter(text) {
            let digit_before = text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit());
            if digit_before {
                continue;
            }
            let mut end = m.end();
            if let Some(tail) = RE_MONTH_TAIL.find(&text[end..]) {
                end += tail.end();
            } else if text[end..].starts_with('年') {
                end += '年'.len_utf8();
            }
            let digit_after = text[end..].chars().next().is_some_and(|c| c.is_ascii_digit());
            if !digit_after {
                hints.push(hint_at(text, m.start(), end, EntityKind::Date));
            }
        }
        for (start, word) in text.match_indices("至今") {
            hints.push(hint_at(text, start, start + word.len(), EntityKind::Date));
        }
    }
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for LexiconTagger {
    fn is_available(&self) -> bool {
        true
    }

    fn entities(&self, text: &str) -> Result<Vec<NamedEntityHint>, TaggerError> {
        let mut hints = Vec::new();
        self.persons(text, &mut hints);
        self.organizations(text, &mut hints);
        self.dates(text, &mut hints);
        hints.sort_by_key(|h| h.start);
        Ok(hints)
    }
}

fn exact_matches(
    text: &str,
    entries: &[String],
    kind: EntityKind,
    hints: &mut Vec<NamedEntityHint>,
) {
    for entry in entries.iter().filter(|e| !e.is_empty()) {
        for (start, found) in text.match_indices(entry.as_str()) {
            let already = hints.iter().any(|h| h.kind == kind && h.text == *found);
            if !already {
                hints.push(hint_at(text, start, start + found.len(), kind));
            }
        }
    }
}

/// Builds a hint from byte offsets, storing character offsets.
fn hint_at(text: &str, start: usize, end: usize, kind: EntityKind) -> NamedEntityHint {
    let char_start = text[..start].chars().count();
    let char_end = char_start + text[start..end].chars().count();
    NamedEntityHint::new(&text[start..end], kind).at(char_start, char_end)
}
