//! 小题与分值解析服务 - 业务能力层
//!
//! 从题干自由文本中恢复 (i)~(iv) 小题结构及每个小题的分值：
//! - 第一个标记之前的文字是引言
//! - 每个标记到下一个标记（或文本结尾）是一个小题
//! - 小题末尾的 `[n]` 是该小题分值，解析后从文本中去掉
//! - 否则按小题键查评分细则；仍找不到则按 0 分处理并给出警告

use crate::error::GenerationWarning;
use crate::models::{CandidateQuestion, Rubric};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// 小题标记 (i) (ii) (iii) (iv)，不区分大小写
static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((iv|i{1,3})\)").expect("marker pattern is valid"));

/// 小题末尾的分值 [n]
static TRAILING_MARKS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(\d+)\s*\]\s*$").expect("marks pattern is valid"));

/// 从题干中解析出的一个小题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPart {
    /// 小写标签，例如 "(ii)"
    pub label: String,
    /// 评分细则键，例如 "ii"
    pub key: String,
    /// 去掉标记和末尾分值后的文字
    pub text: String,
    /// 题干中写明的分值
    pub marks_from_text: Option<u32>,
}

/// 题干解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub intro: String,
    pub parts: Vec<SubPart>,
}

impl ParsedQuestion {
    pub fn has_parts(&self) -> bool {
        !self.parts.is_empty()
    }
}

/// 分值已确定的小题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubPart {
    pub label: String,
    pub text: String,
    pub marks: u32,
}

/// 一道题的完整结构：引言 + 已确定分值的小题 + 解析过程中的警告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionStructure {
    pub intro: String,
    pub parts: Vec<ResolvedSubPart>,
    pub warnings: Vec<GenerationWarning>,
}

/// 把题干切分为引言和小题
///
/// 没有任何标记时整段文字作为引言，不产生小题
pub fn parse_sub_parts(text: &str) -> ParsedQuestion {
    let markers: Vec<regex::Match<'_>> = MARKER_PATTERN.find_iter(text).collect();
    if markers.is_empty() {
        return ParsedQuestion {
            intro: text.trim().to_string(),
            parts: Vec::new(),
        };
    }

    let intro = text[..markers[0].start()].trim().to_string();
    let parts = markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let end = markers.get(i + 1).map(|next| next.start()).unwrap_or(text.len());
            let segment = text[marker.end()..end].trim();
            let label = marker.as_str().to_lowercase();
            let key = label.trim_matches(|c| c == '(' || c == ')').to_string();

            match TRAILING_MARKS_PATTERN.captures(segment) {
                Some(caps) => {
                    let marks = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
                    let stripped_end = caps.get(0).map(|m| m.start()).unwrap_or(segment.len());
                    SubPart {
                        label,
                        key,
                        text: segment[..stripped_end].trim_end().to_string(),
                        marks_from_text: marks,
                    }
                }
                None => SubPart {
                    label,
                    key,
                    text: segment.to_string(),
                    marks_from_text: None,
                },
            }
        })
        .collect();

    ParsedQuestion { intro, parts }
}

/// 确定每个小题的分值
///
/// # 参数
/// - `parsed`: 题干解析结果
/// - `question_id`: 题目 id（用于警告）
/// - `declared`: 题目声明的总分
/// - `rubric`: 评分细则（可选）
///
/// # 返回
/// 带分值的题目结构及警告
pub fn resolve_sub_marks(
    parsed: ParsedQuestion,
    question_id: &str,
    declared: u32,
    rubric: Option<&Rubric>,
) -> QuestionStructure {
    let mut warnings = Vec::new();
    let all_from_text = parsed.has_parts() && parsed.parts.iter().all(|p| p.marks_from_text.is_some());

    let parts: Vec<ResolvedSubPart> = parsed
        .parts
        .into_iter()
        .enumerate()
        .map(|(position, part)| {
            let marks = part
                .marks_from_text
                .or_else(|| rubric.and_then(|r| rubric_marks(r, &part.key, position)))
                .unwrap_or_else(|| {
                    warnings.push(GenerationWarning::UnparsableSubPartMarks {
                        question_id: question_id.to_string(),
                        sub_part: part.label.clone(),
                    });
                    0
                });
            ResolvedSubPart {
                label: part.label,
                text: part.text,
                marks,
            }
        })
        .collect();

    if all_from_text {
        let parsed_total: u32 = parts.iter().map(|p| p.marks).sum();
        if parsed_total != declared {
            debug!(
                "题目 {} 小题分值之和 {} 与声明分值 {} 不一致",
                question_id, parsed_total, declared
            );
            warnings.push(GenerationWarning::SubPartMarksMismatch {
                question_id: question_id.to_string(),
                declared,
                parsed: parsed_total,
            });
        }
    }

    QuestionStructure {
        intro: parsed.intro,
        parts,
        warnings,
    }
}

// 先按小题键查找；没有任何带键的块时按位置对应（i→第一块，ii→第二块）
fn rubric_marks(rubric: &Rubric, key: &str, position: usize) -> Option<u32> {
    if let Some(marks) = rubric.marks_for(key) {
        return Some(marks);
    }
    if rubric.blocks.iter().all(|b| b.key().is_none()) {
        return rubric.blocks.get(position).and_then(|b| b.mark_value());
    }
    None
}

/// 解析一道候选题目（题干取渲染用文本）
pub fn analyze_question(question: &CandidateQuestion, body: &str) -> QuestionStructure {
    resolve_sub_marks(
        parse_sub_parts(body),
        &question.id,
        question.marks,
        question.rubric.as_ref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RubricBlock;

    #[test]
    fn test_parses_trailing_marks() {
        let text = "Answer the following:\n(i) Explain sovereignty. [3]\n(ii) Describe the Assembly. [3]\n(iii) Discuss the Preamble. [ 4 ]";
        let parsed = parse_sub_parts(text);
        assert_eq!(parsed.intro, "Answer the following:");
        let marks: Vec<Option<u32>> = parsed.parts.iter().map(|p| p.marks_from_text).collect();
        assert_eq!(marks, vec![Some(3), Some(3), Some(4)]);
        assert_eq!(parsed.parts[0].text, "Explain sovereignty.");
        assert_eq!(parsed.parts[2].label, "(iii)");

        let structure = resolve_sub_marks(parsed, "q1", 10, None);
        assert!(structure.warnings.is_empty());
        assert_eq!(
            structure.parts.iter().map(|p| p.marks).collect::<Vec<_>>(),
            vec![3, 3, 4]
        );
    }

    #[test]
    fn test_single_line_body_splits_on_markers() {
        let parsed = parse_sub_parts("(i) Explain X. [3] (ii) Explain Y. [3] (iii) Explain Z. [4]");
        assert_eq!(parsed.intro, "");
        let texts: Vec<&str> = parsed.parts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Explain X.", "Explain Y.", "Explain Z."]);

        let structure = resolve_sub_marks(parsed, "q1", 10, None);
        assert_eq!(
            structure.parts.iter().map(|p| p.marks).collect::<Vec<_>>(),
            vec![3, 3, 4]
        );
        assert!(structure.warnings.is_empty());
    }

    #[test]
    fn test_no_markers_yields_no_parts() {
        let parsed = parse_sub_parts("Explain the causes of the Revolt of 1857.");
        assert!(!parsed.has_parts());
        assert_eq!(parsed.intro, "Explain the causes of the Revolt of 1857.");
        let structure = resolve_sub_marks(parsed, "q1", 10, None);
        assert!(structure.parts.is_empty());
        assert!(structure.warnings.is_empty());
    }

    #[test]
    fn test_markers_are_case_insensitive_and_single_marker_counts() {
        let parsed = parse_sub_parts("(I) Name the ruler. [2]");
        assert_eq!(parsed.parts.len(), 1);
        assert_eq!(parsed.parts[0].label, "(i)");
        assert_eq!(parsed.intro, "");
    }

    #[test]
    fn test_rubric_fallback_by_key() {
        let rubric = Rubric {
            blocks: vec![
                RubricBlock {
                    block_name: Some("(i)".to_string()),
                    max_marks: Some(3),
                    ..Default::default()
                },
                RubricBlock {
                    block_name: Some("(ii)".to_string()),
                    max_marks: Some(3),
                    ..Default::default()
                },
                RubricBlock {
                    sub_part_key: Some("iii".to_string()),
                    marks: Some(4),
                    ..Default::default()
                },
            ],
            total_marks: Some(10),
        };
        let parsed = parse_sub_parts("(i) Identify.\n(ii) State.\n(iii) Mention.");
        let structure = resolve_sub_marks(parsed, "q1", 10, Some(&rubric));
        assert_eq!(
            structure.parts.iter().map(|p| p.marks).collect::<Vec<_>>(),
            vec![3, 3, 4]
        );
        assert!(structure.warnings.is_empty());
    }

    #[test]
    fn test_rubric_sub_part_keys_only() {
        let block = |key: &str, marks: u32| RubricBlock {
            sub_part_key: Some(key.to_string()),
            marks: Some(marks),
            ..Default::default()
        };
        let rubric = Rubric {
            blocks: vec![block("i", 3), block("ii", 3), block("iii", 4)],
            total_marks: Some(10),
        };
        let parsed = parse_sub_parts("(i) Explain X. (ii) Explain Y. (iii) Explain Z.");
        let structure = resolve_sub_marks(parsed, "q1", 10, Some(&rubric));
        assert_eq!(
            structure.parts.iter().map(|p| p.marks).collect::<Vec<_>>(),
            vec![3, 3, 4]
        );
        assert!(structure.warnings.is_empty());
    }

    #[test]
    fn test_rubric_positional_fallback_without_keys() {
        let rubric = Rubric {
            blocks: vec![
                RubricBlock {
                    marks: Some(5),
                    ..Default::default()
                },
                RubricBlock {
                    marks: Some(5),
                    ..Default::default()
                },
            ],
            total_marks: None,
        };
        let parsed = parse_sub_parts("(i) One.\n(ii) Two.");
        let structure = resolve_sub_marks(parsed, "q1", 10, Some(&rubric));
        assert_eq!(
            structure.parts.iter().map(|p| p.marks).collect::<Vec<_>>(),
            vec![5, 5]
        );
    }

    #[test]
    fn test_missing_marks_default_to_zero_with_warning() {
        let parsed = parse_sub_parts("(i) One. [4]\n(ii) Two.");
        let structure = resolve_sub_marks(parsed, "q9", 10, None);
        assert_eq!(
            structure.parts.iter().map(|p| p.marks).collect::<Vec<_>>(),
            vec![4, 0]
        );
        assert_eq!(
            structure.warnings,
            vec![GenerationWarning::UnparsableSubPartMarks {
                question_id: "q9".to_string(),
                sub_part: "(ii)".to_string(),
            }]
        );
    }

    #[test]
    fn test_mismatch_warning_when_text_marks_disagree() {
        let parsed = parse_sub_parts("(i) One. [3]\n(ii) Two. [3]");
        let structure = resolve_sub_marks(parsed, "q2", 10, None);
        assert_eq!(
            structure.warnings,
            vec![GenerationWarning::SubPartMarksMismatch {
                question_id: "q2".to_string(),
                declared: 10,
                parsed: 6,
            }]
        );
    }
}
