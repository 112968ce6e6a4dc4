use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resume::patterns::section_title;

/// Section a block belongs to: opened by a recognised title line, or carried
/// across a blank line inside a skills / self-assessment section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Education,
    Project,
    Career,
    /// Skills, self-assessment, training and contact-info sections.
    Other,
}

/// A contiguous run of non-blank lines treated as one classification unit.
///
/// A block is never empty: [`Block::new`] refuses to build one without at
/// least one non-blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    lines: Vec<String>,
    pub tag: Option<SectionTag>,
}

impl Block {
    pub fn new(lines: Vec<String>, tag: Option<SectionTag>) -> Option<Self> {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return None;
        }
        Some(Self { lines, tag })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn first_line(&self) -> &str {
        &self.lines[0]
    }

    /// Lines after the section title, or every line when the block does not
    /// open with one.
    pub fn body_lines(&self) -> &[String] {
        if self.tag.is_some() && section_title(&self.lines[0]).is_some() {
            &self.lines[1..]
        } else {
            &self.lines
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn body_text(&self) -> String {
        self.body_lines().join("\n")
    }

    pub fn char_len(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }

    /// Appends another block's lines, keeping this block's tag.
    pub fn absorb(&mut self, other: Block) {
        self.lines.extend(other.lines);
    }
}

/// Canonical sex marker. Serialized as the Chinese marker regardless of the
/// language it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
}

impl Sex {
    /// Exact-match token lookup (`男`, `女`, `male`, `female`, any case).
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        match token {
            "男" => Some(Sex::Male),
            "女" => Some(Sex::Female),
            _ if token.eq_ignore_ascii_case("male") => Some(Sex::Male),
            _ if token.eq_ignore_ascii_case("female") => Some(Sex::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub age: Option<String>,
    pub sex: Option<Sex>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// One job or project entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub company: Option<String>,
    pub title: Option<String>,
    pub period: Option<String>,
    pub responsibilities: Vec<String>,
    pub technologies: Vec<String>,
    /// Full text of the (merged) entry. Deduplication key.
    pub text: String,
}

impl CareerRecord {
    /// Adds a responsibility unless this record already holds it.
    pub fn add_responsibility(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() && !self.responsibilities.iter().any(|r| r == line) {
            self.responsibilities.push(line.to_string());
        }
    }

    /// Adds a technology, deduplicating case-insensitively.
    pub fn add_technology(&mut self, tech: &str) {
        if !self
            .technologies
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tech))
        {
            self.technologies.push(tech.to_string());
        }
    }

    /// Folds a later company-less fragment into this record.
    pub fn absorb(&mut self, other: CareerRecord) {
        if self.title.is_none() {
            self.title = other.title;
        }
        if self.period.is_none() {
            self.period = other.period;
        }
        for r in &other.responsibilities {
            self.add_responsibility(r);
        }
        for t in &other.technologies {
            self.add_technology(t);
        }
        if !other.text.is_empty() {
            if !self.text.is_empty() {
                self.text.push('\n');
            }
            self.text.push_str(&other.text);
        }
    }
}

/// Education entries are kept as raw block text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EducationRecord {
    pub text: String,
}

impl EducationRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Person,
    Date,
}

/// Advisory entity produced by a [`crate::tagger::Tagger`]. Offsets are
/// character (not byte) positions into the text that was tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntityHint {
    pub text: String,
    pub kind: EntityKind,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl NamedEntityHint {
    pub fn new(text: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            text: text.into(),
            kind,
            start: None,
            end: None,
        }
    }

    pub fn at(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// The only value handed back to callers of the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProfile {
    pub name: Option<String>,
    pub age: Option<String>,
    pub sex: Option<Sex>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub careers: Vec<CareerRecord>,
    pub education: Vec<EducationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParsedProfile {
    pub fn from_parts(
        info: PersonalInfo,
        careers: Vec<CareerRecord>,
        education: Vec<EducationRecord>,
    ) -> Self {
        Self {
            name: info.name,
            age: info.age,
            sex: info.sex,
            phone: info.phone,
            email: info.email,
            careers,
            education,
            error: None,
        }
    }

    /// An otherwise-empty profile carrying an upstream extraction failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Flat mapping of primitive fields and lists, for persistence and web callers.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
