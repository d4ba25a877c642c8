//! 内容分类服务 - 业务能力层
//!
//! 把题干文字逐行分类为排版块，优先级固定：
//! 表格 → 选项 (a)~(d) → 嵌套小题 (i)~(iv) → 段落

use crate::infrastructure::text_metrics::Span;
use regex::Regex;
use std::sync::LazyLock;

static OPTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(([a-d])\)\s*(.*)$").expect("option pattern is valid"));

static NESTED_ROMAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\((iv|i{1,3})\)\s*(.*)$").expect("nested pattern is valid"));

static NESTED_LETTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(([a-c])\)\s*(.*)$").expect("nested letter pattern is valid"));

/// 加粗片段，大小写和标点都必须完全一致
static EMPHASIS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Assertion \(A\):|Reason \(R\):)").expect("emphasis pattern is valid"));

static SEPARATOR_CELL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-{3,}:?$").expect("separator pattern is valid"));

/// 分类上下文：题干，或小题内部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyContext {
    Stem,
    SubPart,
}

/// 带标签的条目（选项或嵌套小题）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledItem {
    pub label: String,
    pub text: String,
}

/// 排版块
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// 至少两行、每行多个单元格
    Table { rows: Vec<Vec<String>> },
    /// 选择题选项
    Options { items: Vec<LabeledItem> },
    /// 嵌套小题
    Nested { items: Vec<LabeledItem> },
    Paragraph(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Options,
    Nested,
}

/// 对一段文字分类
pub fn classify(text: &str, context: ClassifyContext) -> Vec<ContentBlock> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut blocks = Vec::new();
    let mut list: Option<(ListKind, Vec<LabeledItem>)> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.is_empty() {
            flush_list(&mut list, &mut blocks);
            i += 1;
            continue;
        }

        // 1. 表格：连续至少两行，每行多个单元格
        let run = table_run(&lines[i..]);
        if run >= 2 {
            flush_list(&mut list, &mut blocks);
            let rows = lines[i..i + run]
                .iter()
                .filter_map(|l| table_cells(l))
                .filter(|cells| !cells.iter().all(|c| SEPARATOR_CELL_PATTERN.is_match(c)))
                .collect();
            blocks.push(ContentBlock::Table { rows });
            i += run;
            continue;
        }

        // 2. 选项 / 3. 嵌套小题
        if let Some((kind, item)) = labeled_line(line, context) {
            match &mut list {
                Some((current, items)) if *current == kind => items.push(item),
                _ => {
                    flush_list(&mut list, &mut blocks);
                    list = Some((kind, vec![item]));
                }
            }
            i += 1;
            continue;
        }

        // 续行归入上一个条目
        if let Some((_, items)) = &mut list {
            if let Some(last) = items.last_mut() {
                if !last.text.is_empty() {
                    last.text.push(' ');
                }
                last.text.push_str(line);
                i += 1;
                continue;
            }
        }

        // 4. 段落
        blocks.push(ContentBlock::Paragraph(line.to_string()));
        i += 1;
    }

    flush_list(&mut list, &mut blocks);
    blocks
}

fn flush_list(list: &mut Option<(ListKind, Vec<LabeledItem>)>, blocks: &mut Vec<ContentBlock>) {
    if let Some((kind, items)) = list.take() {
        blocks.push(match kind {
            ListKind::Options => ContentBlock::Options { items },
            ListKind::Nested => ContentBlock::Nested { items },
        });
    }
}

fn labeled_line(line: &str, context: ClassifyContext) -> Option<(ListKind, LabeledItem)> {
    let item = |caps: regex::Captures<'_>| LabeledItem {
        label: format!("({})", caps[1].to_lowercase()),
        text: caps[2].trim().to_string(),
    };
    if context == ClassifyContext::Stem {
        if let Some(caps) = OPTION_PATTERN.captures(line) {
            return Some((ListKind::Options, item(caps)));
        }
    }
    if let Some(caps) = NESTED_ROMAN_PATTERN.captures(line) {
        return Some((ListKind::Nested, item(caps)));
    }
    if context == ClassifyContext::SubPart {
        if let Some(caps) = NESTED_LETTER_PATTERN.captures(line) {
            return Some((ListKind::Nested, item(caps)));
        }
    }
    None
}

// 从开头起连续的表格行数
fn table_run(lines: &[&str]) -> usize {
    lines
        .iter()
        .take_while(|l| table_cells(l).is_some())
        .count()
}

/// 把一行拆为表格单元格；不是表格行时返回 None
///
/// 选项行和 "Select the option" 提示行不算表格行，首尾空单元格会被去掉
pub fn table_cells(line: &str) -> Option<Vec<String>> {
    if line.is_empty()
        || OPTION_PATTERN.is_match(line)
        || line.to_lowercase().starts_with("select the option")
    {
        return None;
    }
    let delimiter = if line.contains('|') {
        '|'
    } else if line.contains('\t') {
        '\t'
    } else {
        return None;
    };
    let mut cells: Vec<String> = line.split(delimiter).map(|c| c.trim().to_string()).collect();
    while cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    (cells.len() >= 2).then_some(cells)
}

/// 把文字拆为普通/加粗片段（"Assertion (A):" 和 "Reason (R):" 加粗）
pub fn emphasis_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for m in EMPHASIS_PATTERN.find_iter(text) {
        if m.start() > last {
            spans.push(Span::regular(&text[last..m.start()]));
        }
        spans.push(Span::bold(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::regular(&text[last..]));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::text_metrics::FontWeight;

    #[test]
    fn test_options_after_stem() {
        let blocks = classify(
            "The Great Bath was found at:\n(a) Harappa\n(b) Lothal\n(c) Mohenjo-daro\n(d) Kalibangan",
            ClassifyContext::Stem,
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            ContentBlock::Paragraph("The Great Bath was found at:".to_string())
        );
        match &blocks[1] {
            ContentBlock::Options { items } => {
                assert_eq!(items.len(), 4);
                assert_eq!(items[2].label, "(c)");
                assert_eq!(items[2].text, "Mohenjo-daro");
            }
            other => panic!("expected options, got {:?}", other),
        }
    }

    #[test]
    fn test_uppercase_option_labels_are_lowercased() {
        let blocks = classify("Which is correct?\n(A) One\n(B) Two\n(C) Three\n(D) Four", ClassifyContext::Stem);
        assert_eq!(blocks.len(), 2);
        match &blocks[1] {
            ContentBlock::Options { items } => {
                let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
                assert_eq!(labels, vec!["(a)", "(b)", "(c)", "(d)"]);
                assert_eq!(items[3].text, "Four");
            }
            other => panic!("expected options, got {:?}", other),
        }

        let nested = classify("Explain:\n(A) the first cause\n(B) the second cause", ClassifyContext::SubPart);
        assert!(matches!(&nested[1], ContentBlock::Nested { items } if items[1].label == "(b)"));
    }

    #[test]
    fn test_table_takes_precedence_and_strips_edge_cells() {
        let blocks = classify(
            "Study the table.\n| Feature | Description |\n|---|---|\n| Sovereign | Free |\n(a) Both\n(b) Neither",
            ClassifyContext::Stem,
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            ContentBlock::Table {
                rows: vec![
                    vec!["Feature".to_string(), "Description".to_string()],
                    vec!["Sovereign".to_string(), "Free".to_string()],
                ]
            }
        );
        assert!(matches!(blocks[2], ContentBlock::Options { .. }));
    }

    #[test]
    fn test_single_pipe_line_is_not_a_table() {
        let blocks = classify("Column A | Column B\nPlain text", ClassifyContext::Stem);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Paragraph("Column A | Column B".to_string()),
                ContentBlock::Paragraph("Plain text".to_string()),
            ]
        );
    }

    #[test]
    fn test_letter_items_are_nested_inside_sub_part() {
        let text = "Explain:\n(a) the first cause\n(b) the second cause";
        let blocks = classify(text, ClassifyContext::SubPart);
        match &blocks[1] {
            ContentBlock::Nested { items } => assert_eq!(items.len(), 2),
            other => panic!("expected nested, got {:?}", other),
        }
    }

    #[test]
    fn test_continuation_line_appends_to_previous_item() {
        let blocks = classify("(i) Name the ruler\nwho built it.\n(ii) State its use.", ClassifyContext::Stem);
        match &blocks[0] {
            ContentBlock::Nested { items } => {
                assert_eq!(items[0].text, "Name the ruler who built it.");
                assert_eq!(items[1].label, "(ii)");
            }
            other => panic!("expected nested, got {:?}", other),
        }
    }

    #[test]
    fn test_emphasis_is_exact_match() {
        let spans = emphasis_spans("Assertion (A): Bricks were burnt. reason (r): lowercase");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].weight, FontWeight::Bold);
        assert_eq!(spans[0].text, "Assertion (A):");
        assert_eq!(spans[1].weight, FontWeight::Regular);
    }
}
