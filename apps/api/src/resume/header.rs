//! Header / personal-info extractor.
//!
//! Identity and contact fields live at the top of a resume, so only the first
//! few non-blank lines are scanned for them. Whatever is consumed here is cut
//! out of the text handed to the segmenter.

use chrono::{Datelike, Local};
use tracing::debug;

use crate::resume::models::{EntityKind, PersonalInfo, Sex};
use crate::resume::patterns::{
    section_title, RE_AGE, RE_BIRTH_YEAR, RE_COMPANY_SUFFIX, RE_DATE_RANGE, RE_EDU_DOMAIN,
    RE_EMAIL, RE_ENGLISH_NAME, RE_HAN_RUN, RE_INFO_LABEL, RE_NAME_LABEL, RE_NAME_SEX,
    RE_PHONE_LOOSE, RE_PHONE_STRICT, RE_SEX_EN, RE_SEX_LABEL, RE_TITLE, NAME_STOP_WORDS,
};
use crate::tagger::{advisory_hints, Tagger};

/// Number of non-blank lines treated as the header region.
pub const HEADER_LINES: usize = 6;

const ITEM_DELIMITERS: &[char] = &['|', '｜', '/', ';', '；'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOutcome {
    pub info: PersonalInfo,
    /// The cleaned text with consumed header items removed.
    pub body: String,
}

enum ItemUse {
    Untouched,
    Consumed,
    Partly(String),
}

/// Extracts personal info from `cleaned` text and returns the remaining body.
pub fn extract(cleaned: &str, tagger: &dyn Tagger) -> HeaderOutcome {
    let mut lines: Vec<Option<String>> = cleaned.lines().map(|l| Some(l.to_string())).collect();
    let header_idx: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.as_deref().is_some_and(|l| !l.trim().is_empty()))
        .map(|(i, _)| i)
        .take(HEADER_LINES)
        .collect();
    let header_text = header_idx
        .iter()
        .filter_map(|&i| lines[i].clone())
        .collect::<Vec<_>>()
        .join("\n");

    let mut info = PersonalInfo::default();
    let mut pool: Vec<String> = Vec::new();
    // A mobile number anywhere outranks every looser digit run in the header.
    let allow_loose = !RE_PHONE_STRICT.is_match(cleaned);

    for &idx in &header_idx {
        let Some(line) = lines[idx].clone() else {
            continue;
        };
        let mut kept = Vec::new();
        let mut consumed_any = false;
        for item in split_items(&line) {
            match consume_item(&item, &mut info, allow_loose) {
                ItemUse::Untouched => kept.push(item),
                ItemUse::Consumed => consumed_any = true,
                ItemUse::Partly(rest) => {
                    consumed_any = true;
                    kept.push(rest);
                }
            }
        }
        pool.extend(kept.iter().cloned());
        if consumed_any {
            lines[idx] = if kept.is_empty() {
                None
            } else {
                Some(kept.join(" | "))
            };
        }
    }

    let sex_from_suffix = detect_sex(&header_text, &mut info);
    info.name = detect_name(&pool, &header_text, cleaned, tagger, sex_from_suffix);
    document_fallbacks(cleaned, &mut info);

    debug!(
        "Header extracted: name={} phone={} email={} age={} sex={}",
        info.name.is_some(),
        info.phone.is_some(),
        info.email.is_some(),
        info.age.is_some(),
        info.sex.is_some()
    );

    HeaderOutcome {
        info,
        body: lines.into_iter().flatten().collect::<Vec<_>>().join("\n"),
    }
}

fn split_items(line: &str) -> Vec<String> {
    if line.contains(ITEM_DELIMITERS) {
        line.split(ITEM_DELIMITERS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    } else {
        vec![line.trim().to_string()]
    }
}

/// Tries phone, email, age and sex on one header item, in that order.
fn consume_item(item: &str, info: &mut PersonalInfo, allow_loose: bool) -> ItemUse {
    let mut rest = item.to_string();
    let mut hit = false;

    if let Some((phone, span)) = find_phone(&rest, allow_loose) {
        info.phone.get_or_insert(phone);
        rest = rest.replacen(&span, " ", 1);
        hit = true;
    }

    if let Some(m) = RE_EMAIL.find(&rest) {
        let email = m.as_str().to_string();
        info.email.get_or_insert(email.clone());
        rest = rest.replacen(&email, " ", 1);
        hit = true;
    }

    if let Some((age, span)) = find_age(&rest) {
        info.age.get_or_insert(age);
        rest = rest.replacen(&span, " ", 1);
        hit = true;
    }

    let labelled = RE_SEX_LABEL
        .captures(&rest)
        .and_then(|caps| Sex::from_token(&caps[1]).map(|sex| (sex, caps[0].to_string())));
    if let Some((sex, span)) = labelled {
        info.sex.get_or_insert(sex);
        rest = rest.replacen(&span, " ", 1);
        hit = true;
    } else if let Some(sex) = Sex::from_token(&rest) {
        info.sex.get_or_insert(sex);
        rest.clear();
        hit = true;
    }

    if !hit {
        return ItemUse::Untouched;
    }
    let residue = RE_INFO_LABEL.replace_all(&rest, "");
    let residue = residue
        .trim_matches(|c: char| c.is_whitespace() || ",，:：、".contains(c))
        .to_string();
    if residue.chars().any(char::is_alphanumeric) {
        ItemUse::Partly(residue)
    } else {
        ItemUse::Consumed
    }
}

/// Returns the normalized phone and the matched text to remove. A strict
/// mobile match always wins over the looser digit-run pattern, which is only
/// tried when `allow_loose` is set.
fn find_phone(text: &str, allow_loose: bool) -> Option<(String, String)> {
    if let Some(caps) = RE_PHONE_STRICT.captures(text) {
        let span = caps[0]
            .trim_matches(|c: char| !c.is_ascii_digit() && c != '+')
            .to_string();
        return Some((caps[1].to_string(), span));
    }
    if !allow_loose || RE_DATE_RANGE.is_match(text) {
        return None;
    }
    let m = RE_PHONE_LOOSE.find(text)?;
    let embedded = text[..m.start()].ends_with(|c: char| c.is_ascii_digit())
        || text[m.end()..].starts_with(|c: char| c.is_ascii_digit());
    if embedded {
        return None;
    }
    let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
    let all_years = m
        .as_str()
        .split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .all(|g| g.len() == 4 && (g.starts_with("19") || g.starts_with("20")));
    if !(7..=15).contains(&digits.len()) || all_years {
        return None;
    }
    let phone = if m.as_str().trim_start().starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    };
    Some((phone, m.as_str().to_string()))
}

/// `NN岁`, an age label, or a birth year subtracted from the current year.
fn find_age(text: &str) -> Option<(String, String)> {
    if let Some(caps) = RE_AGE.captures(text) {
        let value = caps.get(1).or_else(|| caps.get(2))?.as_str();
        let age: u32 = value.parse().ok()?;
        if (1..=120).contains(&age) {
            return Some((age.to_string(), caps[0].to_string()));
        }
    }
    let caps = RE_BIRTH_YEAR.captures(text)?;
    let birth: i32 = caps[1].parse().ok()?;
    let age = Local::now().year() - birth;
    if (1..=120).contains(&age) {
        Some((age.to_string(), caps[0].to_string()))
    } else {
        None
    }
}

/// Label, name+marker, then English token. Returns true when the marker was
/// read off the end of a name ("张三男"), so name detection can drop it.
fn detect_sex(header: &str, info: &mut PersonalInfo) -> bool {
    if info.sex.is_some() {
        return false;
    }
    if let Some(sex) = RE_SEX_LABEL
        .captures(header)
        .and_then(|c| Sex::from_token(&c[1]))
    {
        info.sex = Some(sex);
        return false;
    }
    if let Some(caps) = RE_NAME_SEX.captures(header) {
        let name_len = caps[1].chars().count();
        let tail = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if let Some(sex) = Sex::from_token(tail) {
            info.sex = Some(sex);
            return name_len <= 4;
        }
    }
    if let Some(sex) = RE_SEX_EN
        .captures(header)
        .and_then(|c| Sex::from_token(&c[1]))
    {
        info.sex = Some(sex);
    }
    false
}

fn detect_name(
    pool: &[String],
    header: &str,
    document: &str,
    tagger: &dyn Tagger,
    sex_from_suffix: bool,
) -> Option<String> {
    // (a) a pure CJK token among the remaining header items
    for item in pool {
        let token = RE_NAME_LABEL.replace(item.trim(), "");
        let token = token.trim();
        if !token.chars().all(is_han) {
            continue;
        }
        if let Some(name) = name_candidate(token, sex_from_suffix) {
            return Some(name);
        }
    }

    // (b) the advisory tagger
    if header.chars().any(is_han) {
        let person = advisory_hints(tagger, header)
            .into_iter()
            .filter(|h| h.kind == EntityKind::Person)
            .map(|h| h.text.trim().to_string())
            .find(|t| (2..=4).contains(&t.chars().count()) && !is_stop_word(t));
        if person.is_some() {
            return person;
        }
    }

    // (c) first short CJK run in the header, then an English two-word name
    if let Some(name) = first_han_name(header, sex_from_suffix) {
        return Some(name);
    }
    if let Some(caps) = RE_ENGLISH_NAME.captures(header) {
        let name = caps[1].to_string();
        if section_title(&name).is_none() {
            return Some(name);
        }
    }

    // (d) the same search over the whole document
    first_han_name(document, sex_from_suffix)
}

fn first_han_name(text: &str, sex_from_suffix: bool) -> Option<String> {
    RE_HAN_RUN
        .find_iter(text)
        .find_map(|m| name_candidate(m.as_str(), sex_from_suffix))
}

/// A 2–4 character CJK run that is not vocabulary, optionally carrying a
/// trailing sex marker.
fn name_candidate(run: &str, sex_from_suffix: bool) -> Option<String> {
    let len = run.chars().count();
    let trimmed = if sex_from_suffix && (3..=5).contains(&len) {
        run.strip_suffix(['男', '女']).unwrap_or(run)
    } else {
        run
    };
    let len = trimmed.chars().count();
    if !(2..=4).contains(&len) || is_stop_word(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

fn is_stop_word(token: &str) -> bool {
    NAME_STOP_WORDS.contains(&token)
        || section_title(token).is_some()
        || RE_EDU_DOMAIN.is_match(token)
        || RE_COMPANY_SUFFIX.is_match(token)
        || RE_TITLE.is_match(token)
        || RE_INFO_LABEL.is_match(token)
}

fn is_han(c: char) -> bool {
    RE_HAN_RUN.is_match(c.encode_utf8(&mut [0; 4]))
}

/// Phone and email may sit anywhere; fill what the header left empty. Age is
/// only read from the header region.
fn document_fallbacks(document: &str, info: &mut PersonalInfo) {
    if info.phone.is_none() {
        info.phone = RE_PHONE_STRICT
            .captures(document)
            .map(|caps| caps[1].to_string());
    }
    if info.email.is_none() {
        info.email = RE_EMAIL.find(document).map(|m| m.as_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::NamedEntityHint;
    use crate::tagger::{NoopTagger, TaggerError};

    struct PersonTagger(&'static str);

    impl Tagger for PersonTagger {
        fn is_available(&self) -> bool {
            true
        }

        fn entities(&self, _text: &str) -> Result<Vec<NamedEntityHint>, TaggerError> {
            Ok(vec![NamedEntityHint::new(self.0, EntityKind::Person)])
        }
    }

    #[test]
    fn test_delimited_header_line_is_consumed() {
        let out = extract("张三\n男 | 年龄：28岁 | 13812345678\n\n教育背景", &NoopTagger);
        assert_eq!(out.info.name.as_deref(), Some("张三"));
        assert_eq!(out.info.sex, Some(Sex::Male));
        assert_eq!(out.info.age.as_deref(), Some("28"));
        assert_eq!(out.info.phone.as_deref(), Some("13812345678"));
        assert_eq!(out.body, "张三\n\n教育背景");
    }

    #[test]
    fn test_labelled_email_and_phone_removed_from_body() {
        let out = extract(
            "李四\n电话：+86 13900001111；邮箱：lisi@example.com",
            &NoopTagger,
        );
        assert_eq!(out.info.phone.as_deref(), Some("13900001111"));
        assert_eq!(out.info.email.as_deref(), Some("lisi@example.com"));
        assert_eq!(out.body, "李四");
    }

    #[test]
    fn test_strict_phone_beats_loose() {
        let (phone, _) = find_phone("手机 8613912345678", true).unwrap();
        assert_eq!(phone, "13912345678");
    }

    #[test]
    fn test_dashed_landline_via_loose_pattern() {
        let (phone, _) = find_phone("Tel: +86 139-0000-1111", true).unwrap();
        assert_eq!(phone, "+8613900001111");
    }

    #[test]
    fn test_loose_match_inside_longer_run_is_rejected() {
        assert!(find_phone("订单号 99138123456781", true).is_none());
    }

    #[test]
    fn test_date_range_is_not_a_phone() {
        assert!(find_phone("2019 2020 - 2021 2022", true).is_none());
    }

    #[test]
    fn test_birth_year_derives_age() {
        let out = extract("王五\n出生：1990", &NoopTagger);
        let expected = Local::now().year() - 1990;
        assert_eq!(out.info.age, Some(expected.to_string()));
    }

    #[test]
    fn test_name_with_sex_suffix() {
        let out = extract("张三男\n13812345678", &NoopTagger);
        assert_eq!(out.info.name.as_deref(), Some("张三"));
        assert_eq!(out.info.sex, Some(Sex::Male));
    }

    #[test]
    fn test_name_ending_in_marker_kept_when_sex_labelled() {
        let out = extract("李亚男\n性别：女", &NoopTagger);
        assert_eq!(out.info.name.as_deref(), Some("李亚男"));
        assert_eq!(out.info.sex, Some(Sex::Female));
    }

    #[test]
    fn test_english_sex_token_normalized() {
        let out = extract("John Smith\nFemale | john@example.com", &NoopTagger);
        assert_eq!(out.info.sex, Some(Sex::Female));
        assert_eq!(out.info.name.as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_tagger_person_used_when_no_pure_token() {
        let out = extract("求职意向：后端开发 赵六\n13812345678", &PersonTagger("赵六"));
        assert_eq!(out.info.name.as_deref(), Some("赵六"));
    }

    #[test]
    fn test_stop_words_never_become_names() {
        let out = extract("个人简历\n年龄：30\n教育背景\n某某大学", &NoopTagger);
        assert_eq!(out.info.name, None);
        assert_eq!(out.info.age.as_deref(), Some("30"));
    }

    #[test]
    fn test_strict_mobile_beats_earlier_loose_digits() {
        let out = extract("张三\nQQ：12345678\n手机：13812345678", &NoopTagger);
        assert_eq!(out.info.phone.as_deref(), Some("13812345678"));
        assert!(out.body.contains("QQ：12345678"));

        let out = extract("张三 | 工号 20190312 | 13812345678", &NoopTagger);
        assert_eq!(out.info.phone.as_deref(), Some("13812345678"));
        assert_eq!(out.info.name.as_deref(), Some("张三"));
    }

    #[test]
    fn test_mobile_below_header_beats_header_landline() {
        let text = "张三\nTel: 010-62345678\n工作经历\n某某科技有限公司\n负责接口开发\n负责性能优化\n联系：13712345678";
        let out = extract(text, &NoopTagger);
        assert_eq!(out.info.phone.as_deref(), Some("13712345678"));
    }

    #[test]
    fn test_loose_number_used_without_any_mobile() {
        let out = extract("张三\nTel: 010-62345678", &NoopTagger);
        assert_eq!(out.info.phone.as_deref(), Some("01062345678"));
    }

    #[test]
    fn test_age_in_career_text_is_ignored() {
        let text = "张三\n13812345678\nzhangsan@example.com\n\n工作经历\n某某科技有限公司\n2019-2021 产品经理\n负责社区运营\n负责面向18岁以上用户的社区产品";
        let out = extract(text, &NoopTagger);
        assert_eq!(out.info.age, None);
    }

    #[test]
    fn test_phone_found_outside_header() {
        let text = "张三\n工作经历\n某某科技有限公司\n后端开发工程师\n负责接口开发\n负责性能优化\n参与架构设计\n联系我：13712345678";
        let out = extract(text, &NoopTagger);
        assert_eq!(out.info.phone.as_deref(), Some("13712345678"));
        assert!(out.body.ends_with("联系我：13712345678"));
    }

    #[test]
    fn test_empty_input_has_no_fields() {
        let out = extract("", &NoopTagger);
        assert_eq!(out.info, PersonalInfo::default());
        assert_eq!(out.body, "");
    }
}
