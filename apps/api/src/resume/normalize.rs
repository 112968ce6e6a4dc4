//! Text normalizer and line filter.
//!
//! Every step is idempotent: normalizing already-normalized text is a no-op.

use crate::resume::patterns::{
    RE_CJK_GAP, RE_EMAIL, RE_HEX_TOKEN, RE_HSPACE_RUN, RE_LINE_HEX_RUN, RE_OPAQUE_TOKEN,
    RE_PAGE_MARKER, RE_PHONE_STRICT, RE_PLACEHOLDER, RE_SEPARATOR_RUN,
};

/// Runs the whole cleaning stage: document-level normalization then the
/// per-line filter. Blank lines survive (collapsed to one) as block boundaries.
pub fn clean(text: &str) -> String {
    filter_lines(&normalize(text))
}

/// Document-level normalization.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text: String = text.chars().filter(|c| !is_zero_width(*c)).collect();
    let text = RE_PAGE_MARKER.replace_all(&text, "");
    let text = RE_PLACEHOLDER.replace_all(&text, "");
    let text = RE_SEPARATOR_RUN.replace_all(&text, "");
    let text = RE_HEX_TOKEN.replace_all(&text, "");
    let text = strip_opaque_tokens(&text);
    // Token removal can leave CJK characters separated by spaces, so this runs last.
    let text = collapse_cjk_gaps(&text);

    text.lines()
        .map(|line| RE_HSPACE_RUN.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}

/// Deletes whitespace sitting between two CJK characters. One pass cannot
/// bridge `甲 乙 丙` because matches may not overlap, so repeat until stable.
fn collapse_cjk_gaps(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = RE_CJK_GAP.replace_all(&current, "$1$2").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Removes every 12+ character `[A-Za-z0-9_-]` run (export/OCR residue),
/// including real words of that length. Runs glued to `@`, `.`, `/` or `:`
/// belong to an email or URL and runs carrying a mobile number are contact
/// data; both are kept.
fn strip_opaque_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in RE_OPAQUE_TOKEN.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let glued = [before, after]
            .iter()
            .flatten()
            .any(|c| matches!(c, '@' | '.' | '/' | ':'));
        if !glued && !RE_PHONE_STRICT.is_match(m.as_str()) {
            out.push_str(&text[last..m.start()]);
            last = m.end();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Drops individually noisy lines and collapses blank-line runs.
pub fn filter_lines(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if kept.last().is_some_and(|l| !l.is_empty()) {
                kept.push("");
            }
            continue;
        }
        if is_noise_line(line) {
            continue;
        }
        kept.push(line);
    }
    while kept.last().is_some_and(|l| l.is_empty()) {
        kept.pop();
    }
    kept.join("\n")
}

fn is_noise_line(line: &str) -> bool {
    if RE_PAGE_MARKER.is_match(line) && RE_PAGE_MARKER.replace_all(line, "").trim().is_empty() {
        return true;
    }
    if RE_LINE_HEX_RUN
        .find_iter(line)
        .any(|m| !is_contact_span(line, m.start(), m.end()))
    {
        return true;
    }
    let len = line.chars().count();
    let has_content = line.chars().any(char::is_alphanumeric);
    if !has_content && len > 4 {
        return true;
    }
    !has_content && len < 4
}

/// True when `start..end` sits inside an email address or a mobile number.
fn is_contact_span(line: &str, start: usize, end: usize) -> bool {
    RE_EMAIL
        .find_iter(line)
        .chain(RE_PHONE_STRICT.find_iter(line))
        .any(|m| m.start() <= start && end <= m.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces_between_cjk() {
        assert_eq!(normalize("张 三  丰"), "张三丰");
        assert_eq!(normalize("教 育 背 景"), "教育背景");
    }

    #[test]
    fn test_keeps_spaces_next_to_latin() {
        assert_eq!(normalize("使用 Python 和 Flask"), "使用 Python 和 Flask");
    }

    #[test]
    fn test_strips_zero_width_and_page_markers() {
        let text = "张\u{200B}三\n第 2 页 共 5 页\nPage 3 of 5";
        assert_eq!(clean(text), "张三");
    }

    #[test]
    fn test_strips_hex_and_opaque_tokens() {
        let text = "项目 deadbeefdeadbeef01 完成 a1b2c3d4e5f6g7h8 上线";
        assert_eq!(normalize(text), "项目完成上线");
    }

    #[test]
    fn test_strips_long_plain_words_and_identifiers() {
        let text = "代号 ProjectPhoenixAlpha 和 zhangsan_resume_export 上线";
        assert_eq!(normalize(text), "代号和上线");
    }

    #[test]
    fn test_keeps_short_ids_and_emails() {
        let text = "ID a1b2c3 duties zhangsan2020abc@example.com";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_keeps_prefixed_mobile_numbers() {
        assert_eq!(normalize("联系 +86-13912345678 可"), "联系 +86-13912345678 可");
        assert_eq!(clean("电话 8613812345678"), "电话 8613812345678");
    }

    #[test]
    fn test_drops_lines_with_long_digit_runs() {
        assert_eq!(clean("张三\n流水号202301011234567\n教育背景"), "张三\n教育背景");
    }

    #[test]
    fn test_keeps_phone_with_country_prefix() {
        assert_eq!(clean("电话：+8613812345678"), "电话：+8613812345678");
    }

    #[test]
    fn test_drops_noise_lines() {
        let text = "张三\n!!\nhash:3f9a0b1c2d3e4f\n教育背景";
        assert_eq!(clean(text), "张三\n教育背景");
    }

    #[test]
    fn test_blank_lines_preserved_and_collapsed() {
        let text = "张三\n\n\n\n教育背景\n本科\n\n";
        assert_eq!(clean(text), "张三\n\n教育背景\n本科");
    }

    #[test]
    fn test_separator_runs_become_block_boundaries() {
        let text = "张三\n==========\n教育背景";
        assert_eq!(clean(text), "张三\n\n教育背景");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let text = "张 三\n\n第1页\n项目 a1b2c3d4e5f6g7h8\n\n\n教育 背景";
        let once = clean(text);
        assert_eq!(clean(&once), once);
    }
}
