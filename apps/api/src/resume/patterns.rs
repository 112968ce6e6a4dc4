//! Regexes and vocabularies shared by the pipeline stages.
//!
//! Everything here is compiled once and read-only afterwards, so concurrent
//! parses share it freely.

use regex::Regex;
use std::sync::LazyLock;

use crate::resume::models::SectionTag;

// ────────────────────────────────────────────────────────────────────────────
// Normalizer / line filter
// ────────────────────────────────────────────────────────────────────────────

pub static RE_CJK_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Han})[ \t\x{3000}]+(\p{Han})").unwrap());

pub static RE_HSPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x{3000}\x{a0}]+").unwrap());

pub static RE_PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)第\s*\d+\s*页|共\s*\d+\s*页|\bpage\s*\d+(?:\s*(?:of|/)\s*\d+)?\b").unwrap()
});

pub static RE_HEX_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9A-Fa-f]{16,}\b").unwrap());

pub static RE_OPAQUE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9_-]{12,}\b").unwrap());

pub static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:图片|照片|头像|image|photo|logo|空)\]|\{\{[^{}]*\}\}|<(?:placeholder|blank)>")
        .unwrap()
});

pub static RE_SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-=_*~#·•—─━＝]{4,}").unwrap());

pub static RE_LINE_HEX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9A-Fa-f]{12,}").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Personal info
// ────────────────────────────────────────────────────────────────────────────

/// Mainland mobile number, optionally prefixed with `+86`/`86`, not embedded
/// in a longer digit run. Group 1 is the bare 11-digit number.
pub static RE_PHONE_STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])(?:\+?86[-\s]?)?(1[3-9][0-9]{9})(?:[^0-9]|$)").unwrap()
});

pub static RE_PHONE_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s-]?)?(?:\(?0\d{2,3}\)?[\s-]?)?\d{3,4}[\s-]?\d{4}(?:[\s-]?\d{4})?").unwrap()
});

pub static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

pub static RE_AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:年龄|\bage\b)\s*[:：]?\s*(\d{1,3})(?:\s*周?岁)?|(\d{1,3})\s*周?岁").unwrap()
});

pub static RE_BIRTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:出生(?:年月|日期|年份)?|生日|\bbirth(?:day|\s*date)?\b|\bborn\b|\bdob\b)\s*[:：]?\s*((?:19|20)\d{2})",
    )
    .unwrap()
});

pub static RE_SEX_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:性别|\bgender\b|\bsex\b)\s*[:：]?\s*(男|女|male|female)").unwrap()
});

/// A short CJK name immediately followed by a sex marker. Group 2 is the marker.
pub static RE_NAME_SEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{Han}{2,4}?)\s*[,，]?\s*(男|女)(?:[^\p{Han}]|$)").unwrap()
});

pub static RE_SEX_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(male|female)\b").unwrap());

pub static RE_NAME_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:姓\s*名|name)\s*[:：]\s*").unwrap());

pub static RE_INFO_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:联系电话|联系方式|电话|手机|电子邮箱|邮箱|年龄|性别|出生(?:年月|日期|年份)?|生日|\b(?:e-?mail|phone|tel|mobile|gender|sex|age|birth(?:day)?)\b)\s*[:：]?",
    )
    .unwrap()
});

pub static RE_HAN_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Han}+").unwrap());

pub static RE_ENGLISH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+\s+[A-Z][a-z]+)\b").unwrap());

/// Whole-document personal-info lines that must never seed a block.
pub static RE_PERSONAL_INFO_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:年龄|性别|婚姻状况|婚姻|婚否|现居住地|现居地|居住地|所在地|现住址|籍贯|户口|政治面貌|目前公司|当前公司|现任公司|目前职位|当前职位|现任职位|\bcurrent\s+(?:company|title|position)\b|\bmarital\b|\bgender\b|\baddress\b)\s*[:：]|\d{1,3}\s*周?岁|^\s*(?:男|女)\s*$",
    )
    .unwrap()
});

pub const PERSONAL_KEYWORDS: &[&str] = &[
    "电话", "手机", "邮箱", "年龄", "性别", "婚姻", "籍贯", "民族", "政治面貌", "现居", "户口",
    "出生", "微信", "qq", "email", "phone",
];

/// Tokens that are never a person name even though they look like one.
pub const NAME_STOP_WORDS: &[&str] = &[
    "年龄", "性别", "男", "女", "简历", "个人简历", "求职简历", "求职意向", "基本信息", "个人信息",
    "联系方式", "联系电话", "电话", "手机", "邮箱", "籍贯", "民族", "汉族", "未婚", "已婚", "本科",
    "硕士", "博士", "大专", "学历", "学位", "专业", "工作", "项目", "经验", "经历", "现居", "出生",
    "地址", "期望薪资", "期望职位", "到岗时间", "政治面貌", "党员", "群众", "团员",
];

// ────────────────────────────────────────────────────────────────────────────
// Sections and companies
// ────────────────────────────────────────────────────────────────────────────

pub const SECTION_TITLES: &[(&str, SectionTag)] = &[
    ("教育背景", SectionTag::Education),
    ("教育经历", SectionTag::Education),
    ("教育情况", SectionTag::Education),
    ("学习经历", SectionTag::Education),
    ("学历背景", SectionTag::Education),
    ("education", SectionTag::Education),
    ("education background", SectionTag::Education),
    ("academic background", SectionTag::Education),
    ("项目经验", SectionTag::Project),
    ("项目经历", SectionTag::Project),
    ("项目描述", SectionTag::Project),
    ("主要项目", SectionTag::Project),
    ("projects", SectionTag::Project),
    ("project experience", SectionTag::Project),
    ("工作经历", SectionTag::Career),
    ("工作经验", SectionTag::Career),
    ("工作履历", SectionTag::Career),
    ("职业经历", SectionTag::Career),
    ("任职经历", SectionTag::Career),
    ("work experience", SectionTag::Career),
    ("professional experience", SectionTag::Career),
    ("employment history", SectionTag::Career),
    ("experience", SectionTag::Career),
    ("实习经历", SectionTag::Career),
    ("实习经验", SectionTag::Career),
    ("internship", SectionTag::Career),
    ("internship experience", SectionTag::Career),
    ("自我评价", SectionTag::Other),
    ("自我介绍", SectionTag::Other),
    ("个人评价", SectionTag::Other),
    ("个人总结", SectionTag::Other),
    ("self assessment", SectionTag::Other),
    ("self-assessment", SectionTag::Other),
    ("summary", SectionTag::Other),
    ("专业技能", SectionTag::Other),
    ("技能特长", SectionTag::Other),
    ("个人技能", SectionTag::Other),
    ("技能证书", SectionTag::Other),
    ("skills", SectionTag::Other),
    ("technical skills", SectionTag::Other),
    ("培训经历", SectionTag::Other),
    ("培训经验", SectionTag::Other),
    ("training", SectionTag::Other),
    ("基本信息", SectionTag::Other),
    ("个人信息", SectionTag::Other),
    ("联系方式", SectionTag::Other),
];

static RE_TITLE_DECORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[一二三四五六七八九十]{1,3}[、.．]|\d{1,2}[、.．]|[#*]+)?\s*[【\[〖<《]?\s*|\s*[】\]〗>》]?\s*[:：]?\s*$")
        .unwrap()
});

/// Looks a trimmed line up in the section-title vocabulary.
pub fn section_title(line: &str) -> Option<SectionTag> {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > 30 {
        return None;
    }
    let bare = RE_TITLE_DECORATION.replace_all(line, "");
    let bare = RE_HSPACE_RUN.replace_all(bare.trim(), " ").to_lowercase();
    SECTION_TITLES
        .iter()
        .find(|(title, _)| *title == bare)
        .map(|(_, tag)| *tag)
}

pub static RE_COMPANY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"有限责任公司|股份有限公司|有限公司|分公司|公司|集团|科技|研究院|研究所|事务所|工作室|(?i:\bco\.,?\s*ltd\b\.?|\bcompany\b|\binc\b\.?|\bcorp(?:oration)?\b|\bgroup\b|\btechnolog(?:y|ies)\b|\blimited\b|\bllc\b|\bltd\b)",
    )
    .unwrap()
});

static RE_SENTENCE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:负责|参与|主导|协助|完成|通过|使用|带领|推动|主要|独立|配合|维护|开发|设计|实现|编写|优化|搭建|与|在|对|为)",
    )
    .unwrap()
});

pub static RE_COMPANY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:公司(?:名称)?|工作单位|单位|company)\s*[:：]\s*").unwrap()
});

/// Residue stripped from company names. Deliberately as aggressive as the
/// document-level opaque-token rule; see DESIGN.md.
pub static RE_COMPANY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]{12,}").unwrap());

/// A short line naming an organization rather than describing work.
pub fn is_company_line(line: &str) -> bool {
    let line = line.trim();
    let len = line.chars().count();
    if len < 3 || len > 60 {
        return false;
    }
    if RE_NUMBERED_MARKER.is_match(line) || RE_SENTENCE_START.is_match(line) {
        return false;
    }
    if line.ends_with('。') || line.ends_with('；') || line.ends_with(';') {
        return false;
    }
    RE_COMPANY_SUFFIX.is_match(line)
}

/// Strips labels and noise tokens from a company candidate.
pub fn clean_company(raw: &str) -> Option<String> {
    let stripped = RE_COMPANY_LABEL.replace(raw.trim(), "");
    let stripped = RE_COMPANY_NOISE.replace_all(&stripped, "");
    let cleaned = RE_HSPACE_RUN
        .replace_all(stripped.trim(), " ")
        .trim_matches(|c: char| c.is_whitespace() || "|,，;；:：-–—()（）".contains(c))
        .to_string();
    if cleaned.chars().count() < 2 {
        None
    } else {
        Some(cleaned)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Career fields
// ────────────────────────────────────────────────────────────────────────────

pub static RE_DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:19|20)\d{2}(?:\s*[.\-/年]\s*\d{1,2}\s*月?)?\s*(?:-|–|—|~|～|至|到|\bto\b)\s*(?:(?:19|20)\d{2}(?:\s*[.\-/年]\s*\d{1,2}\s*月?)?|至今|今|现在|\bpresent\b|\bnow\b|\bto\s+date\b)",
    )
    .unwrap()
});

pub static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])(?:19|20)\d{2}(?:[^0-9]|$)").unwrap());

pub static RE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)工程师|经理|总监|主管|架构师|负责人|组长|专员|顾问|分析师|设计师|开发者|实习生|\bengineer\b|\bmanager\b|\bdirector\b|\bdeveloper\b|\blead\b|\barchitect\b|\banalyst\b|\bconsultant\b|\bintern\b|\bcto\b",
    )
    .unwrap()
});

pub static RE_TITLE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:职位|职务|岗位|担任|title|position)\s*[:：]?\s*").unwrap()
});

pub static RE_NUMBERED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d{1,2}\s*[.、．)）]|[（(]\d{1,2}[)）]|[①-⑳]|[一二三四五六七八九十]{1,3}[、．])").unwrap()
});

/// A short line that names a role rather than describing work.
pub fn is_title_line(line: &str) -> bool {
    let line = line.trim();
    line.chars().count() <= 30
        && RE_TITLE.is_match(line)
        && !RE_SENTENCE_START.is_match(line)
        && !line.ends_with('。')
}

pub fn has_year(text: &str) -> bool {
    RE_YEAR.is_match(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Classifier vocabularies
// ────────────────────────────────────────────────────────────────────────────

pub const EDUCATION_KEYWORDS: &[&str] = &[
    "学校", "学位", "毕业", "本科", "硕士", "博士", "专业", "大学", "学院", "gpa", "bachelor",
    "master", "degree", "university", "college",
];

pub const WORK_KEYWORDS: &[&str] = &[
    "公司", "任职", "职位", "职责", "负责", "工作内容", "入职", "部门", "岗位", "company",
    "responsibilities",
];

pub const PROJECT_KEYWORDS: &[&str] = &[
    "项目", "project", "实现", "功能", "优化", "技术栈", "github", "仓库", "负责", "解决",
];

/// Keywords that tie a block to project work specifically (rule 7).
pub const PROJECT_SPECIFIC_KEYWORDS: &[&str] = &["项目", "project", "技术栈", "github", "仓库"];

pub static RE_EDU_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)大学|学院|学校|中学|高中|本科|硕士|博士|学士|大专|专科|研究生|\buniversity\b|\bcollege\b|\binstitute\b|\bbachelor|\bmaster'?s?\b|\bph\.?d\b|\bmba\b",
    )
    .unwrap()
});

/// Canonical spellings; matching is case-insensitive.
pub const TECH_VOCABULARY: &[&str] = &[
    "Python", "Java", "C++", "C#", "Golang", "Rust", "JavaScript", "TypeScript", "PHP", "Kotlin",
    "Swift", "Scala", "React", "Vue", "Angular", "Node.js", "Django", "Flask", "FastAPI", "Spring",
    "SpringBoot", "MyBatis", "Docker", "Kubernetes", "K8s", "MySQL", "PostgreSQL", "SQL", "Redis",
    "MongoDB", "Kafka", "RabbitMQ", "Elasticsearch", "Nginx", "Linux", "Git", "Hadoop", "Spark",
    "Flink", "TensorFlow", "PyTorch", "AWS", "HTML", "CSS", "gRPC", "GraphQL",
];

static RE_TECH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+#.]*").unwrap());

/// Every technology-vocabulary occurrence, in text order, canonical spelling.
pub fn tech_hits(text: &str) -> Vec<&'static str> {
    RE_TECH_TOKEN
        .find_iter(text)
        .filter_map(|m| {
            let token = m.as_str().trim_end_matches('.');
            TECH_VOCABULARY
                .iter()
                .find(|t| t.eq_ignore_ascii_case(token))
                .copied()
        })
        .collect()
}

/// Counts every occurrence of every keyword. Keywords are stored lowercase.
pub fn count_keywords(text: &str, keywords: &[&str]) -> u32 {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .map(|kw| lower.matches(kw).count() as u32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_title_exact_and_decorated() {
        assert_eq!(section_title("教育背景"), Some(SectionTag::Education));
        assert_eq!(section_title("【项目经验】"), Some(SectionTag::Project));
        assert_eq!(section_title("二、工作经历："), Some(SectionTag::Career));
        assert_eq!(section_title("Work Experience"), Some(SectionTag::Career));
        assert_eq!(section_title("专业技能"), Some(SectionTag::Other));
        assert_eq!(section_title("教育背景很重要"), None);
    }

    #[test]
    fn test_company_line_detection() {
        assert!(is_company_line("某某科技有限公司"));
        assert!(is_company_line("Acme Technology Co., Ltd."));
        assert!(!is_company_line("负责公司核心系统的开发与维护"));
        assert!(!is_company_line("1. 优化公司内部流程"));
        assert!(!is_company_line("本科：计算机科学，某某大学"));
    }

    #[test]
    fn test_clean_company_strips_label_and_noise() {
        assert_eq!(
            clean_company("公司名称：某某科技有限公司 a1b2c3d4e5f6g7").as_deref(),
            Some("某某科技有限公司")
        );
        assert_eq!(clean_company("  |  "), None);
    }

    #[test]
    fn test_strict_phone_not_embedded() {
        let caps = RE_PHONE_STRICT.captures("电话：+86 13812345678").unwrap();
        assert_eq!(&caps[1], "13812345678");
        assert!(RE_PHONE_STRICT.captures("id 1381234567890").is_none());
    }

    #[test]
    fn test_title_line_detection() {
        assert!(is_title_line("高级后端开发工程师"));
        assert!(is_title_line("Senior Engineer"));
        assert!(!is_title_line("负责协调工程师团队"));
        assert!(!is_title_line("在团队中与多位产品经理和设计师紧密合作完成了整个系统的交付工作"));
    }

    #[test]
    fn test_date_range_variants() {
        for text in ["2019.07 - 2021.03", "2020-2021", "2018年3月至今", "2015/09 ~ present"] {
            assert!(RE_DATE_RANGE.is_match(text), "{text}");
        }
        assert!(!RE_DATE_RANGE.is_match("13812345678"));
    }

    #[test]
    fn test_tech_hits_handles_symbols_and_cjk_glue() {
        let hits = tech_hits("使用Python和Flask，熟悉C++、C#与node.js。");
        assert_eq!(hits, vec!["Python", "Flask", "C++", "C#", "Node.js"]);
    }

    #[test]
    fn test_count_keywords_counts_every_occurrence() {
        assert_eq!(count_keywords("项目A 项目B Project C", &["项目", "project"]), 3);
    }
}
