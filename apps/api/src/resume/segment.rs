//! Block segmenter.

use crate::resume::models::{Block, SectionTag};
use crate::resume::patterns::{
    is_company_line, section_title, RE_EMAIL, RE_PERSONAL_INFO_LINE, RE_PHONE_STRICT,
};

/// Lines at least this long are prose, even when they mention personal info.
const PERSONAL_LINE_MAX_CHARS: usize = 120;

/// Splits header-stripped text into blocks, in document order.
pub fn segment(body: &str) -> Vec<Block> {
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !is_personal_info_line(l))
        .collect();

    let blocks = split_at_titles(&lines);
    let blocks = absorb_title_only(blocks);
    blocks.into_iter().flat_map(split_at_companies).collect()
}

pub fn is_personal_info_line(line: &str) -> bool {
    if line.is_empty() || line.chars().count() >= PERSONAL_LINE_MAX_CHARS {
        return false;
    }
    RE_PERSONAL_INFO_LINE.is_match(line) || RE_PHONE_STRICT.is_match(line) || RE_EMAIL.is_match(line)
}

fn split_at_titles(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut tag = None;
    let mut section = None;

    for line in lines {
        if line.is_empty() {
            blocks.extend(Block::new(std::mem::take(&mut current), tag.take()));
            // Skills and self-assessment paragraphs stay in their section
            // until the next title.
            tag = section.filter(|t| *t == SectionTag::Other);
            continue;
        }
        if let Some(title) = section_title(line) {
            blocks.extend(Block::new(std::mem::take(&mut current), tag.take()));
            tag = Some(title);
            section = Some(title);
        }
        current.push(line.to_string());
    }
    blocks.extend(Block::new(current, tag));
    blocks
}

/// A title followed by a blank line still owns the block after it.
fn absorb_title_only(blocks: Vec<Block>) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match out.last_mut() {
            Some(prev)
                if prev.tag.is_some()
                    && prev.lines().len() == 1
                    && (block.tag.is_none() || block.tag == prev.tag) =>
            {
                prev.absorb(block);
            }
            _ => out.push(block),
        }
    }
    out
}

/// Splits before every interior company line. The line right after a section
/// title is that section's first entry and stays put.
fn split_at_companies(block: Block) -> Vec<Block> {
    let first_entry = if block.tag.is_some() { 1 } else { 0 };
    let cuts: Vec<usize> = block
        .lines()
        .iter()
        .enumerate()
        .skip(first_entry + 1)
        .filter(|(_, line)| is_company_line(line))
        .map(|(i, _)| i)
        .collect();
    if cuts.is_empty() {
        return vec![block];
    }

    let lines = block.lines();
    let mut out = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    let mut tag = block.tag;
    for cut in cuts.into_iter().chain(std::iter::once(lines.len())) {
        out.extend(Block::new(lines[start..cut].to_vec(), tag.take()));
        start = cut;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks.iter().map(Block::text).collect()
    }

    #[test]
    fn test_splits_at_blank_lines_and_titles() {
        let blocks = segment("张三\n\n教育背景\n某某大学 本科\n项目经验\n项目A");
        assert_eq!(texts(&blocks), vec!["张三", "教育背景\n某某大学 本科", "项目经验\n项目A"]);
        assert_eq!(blocks[1].tag, Some(SectionTag::Education));
        assert_eq!(blocks[2].tag, Some(SectionTag::Project));
    }

    #[test]
    fn test_title_only_block_absorbs_next() {
        let blocks = segment("工作经历\n\n某某科技有限公司\n后端开发");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tag, Some(SectionTag::Career));
        assert_eq!(blocks[0].body_text(), "某某科技有限公司\n后端开发");
    }

    #[test]
    fn test_splits_back_to_back_companies() {
        let text = "工作经历\n甲科技有限公司\n负责接口开发\n乙网络有限公司\n负责运维";
        let blocks = segment(text);
        assert_eq!(
            texts(&blocks),
            vec!["工作经历\n甲科技有限公司\n负责接口开发", "乙网络有限公司\n负责运维"]
        );
        assert_eq!(blocks[1].tag, None);
    }

    #[test]
    fn test_skills_section_survives_blank_lines() {
        let text = "专业技能\n熟悉 Java\n\n熟悉 Docker、Kubernetes 项目部署\n\n工作经历\n\n某某科技有限公司";
        let blocks = segment(text);
        assert_eq!(
            texts(&blocks),
            vec![
                "专业技能\n熟悉 Java",
                "熟悉 Docker、Kubernetes 项目部署",
                "工作经历\n某某科技有限公司",
            ]
        );
        assert_eq!(blocks[1].tag, Some(SectionTag::Other));
        assert_eq!(blocks[1].body_text(), "熟悉 Docker、Kubernetes 项目部署");
        assert_eq!(blocks[2].tag, Some(SectionTag::Career));
    }

    #[test]
    fn test_career_section_entries_rescored_after_blank_line() {
        let blocks = segment("工作经历\n甲科技有限公司\n\n负责运维");
        assert_eq!(blocks[1].tag, None);
    }

    #[test]
    fn test_first_line_company_is_not_a_cut() {
        let blocks = segment("甲科技有限公司\n2019-2021 工程师");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_personal_info_lines_removed() {
        let blocks = segment("婚姻状况：未婚\n现居住地：北京\n某某科技有限公司\n负责开发");
        assert_eq!(texts(&blocks), vec!["某某科技有限公司\n负责开发"]);
    }

    #[test]
    fn test_long_line_mentioning_age_is_kept() {
        let long = format!("负责{}，团队平均年龄：28", "系统设计与开发".repeat(20));
        assert!(!is_personal_info_line(&long));
    }

    #[test]
    fn test_empty_body_has_no_blocks() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n").is_empty());
    }
}
