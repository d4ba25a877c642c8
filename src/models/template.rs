//! 试卷模板
//!
//! 模板声明试卷结构：有序的 section，每个 section 要么包含 subsection，
//! 要么直接声明题目槽位；编号方案也由模板声明，而不是写死在渲染器里。

use crate::error::TemplateError;
use crate::models::discipline::Discipline;
use serde::{Deserialize, Serialize};

/// 试卷模板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperTemplate {
    #[serde(default)]
    pub paper_header: PaperHeader,
    #[serde(default)]
    pub answer_key: AnswerKeyHeader,
    #[serde(default)]
    pub sections: Vec<TemplateSection>,
}

/// 试卷页眉信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperHeader {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_grade")]
    pub grade_display: String,
    #[serde(default = "default_marks_display")]
    pub marks_display: String,
    #[serde(default = "default_time_display")]
    pub time_display: String,
    #[serde(default = "default_reading_time")]
    pub reading_time_display: String,
    /// 试卷识别码（右上角）
    #[serde(default = "default_uid")]
    pub paper_uid: String,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default = "default_examiner_heading")]
    pub examiner_heading: String,
    #[serde(default = "default_examiner_note")]
    pub examiner_note: String,
}

impl Default for PaperHeader {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: String::new(),
            grade_display: default_grade(),
            marks_display: default_marks_display(),
            time_display: default_time_display(),
            reading_time_display: default_reading_time(),
            paper_uid: default_uid(),
            instructions: Vec::new(),
            examiner_heading: default_examiner_heading(),
            examiner_note: default_examiner_note(),
        }
    }
}

impl PaperHeader {
    /// 按 order 排序后编号的说明文字
    pub fn numbered_instructions(&self) -> Vec<String> {
        let mut sorted: Vec<&Instruction> = self.instructions.iter().collect();
        sorted.sort_by_key(|i| i.order);
        sorted
            .iter()
            .enumerate()
            .map(|(i, inst)| format!("{}. {}", i + 1, inst.text))
            .collect()
    }
}

fn default_title() -> String {
    "HISTORY & CIVICS".to_string()
}
fn default_grade() -> String {
    "Class-9th".to_string()
}
fn default_marks_display() -> String {
    "Maximum Marks: 80".to_string()
}
fn default_time_display() -> String {
    "Time Allotted: Two Hours".to_string()
}
fn default_reading_time() -> String {
    "Reading Time: Additional Fifteen Minutes".to_string()
}
fn default_uid() -> String {
    "UID: STUB-001".to_string()
}
fn default_examiner_heading() -> String {
    "Instructions for the Supervising Examiner".to_string()
}
fn default_examiner_note() -> String {
    "Kindly read aloud the Instructions given above to all the candidates present in the Examination Hall."
        .to_string()
}

/// 一条考试说明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(default)]
    pub order: i32,
    pub text: String,
}

/// 答案页页眉
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerKeyHeader {
    #[serde(default = "default_answer_key_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// 长答题型答案的截断字符数
    #[serde(default = "default_answer_budget")]
    pub long_answer_char_budget: usize,
}

impl Default for AnswerKeyHeader {
    fn default() -> Self {
        Self {
            title: default_answer_key_title(),
            subtitle: String::new(),
            long_answer_char_budget: default_answer_budget(),
        }
    }
}

fn default_answer_key_title() -> String {
    "ANSWER KEY".to_string()
}
fn default_answer_budget() -> usize {
    600
}

/// 题目编号方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum NumberingScheme {
    /// 每个槽位组是一道大题，组内小题用 i. ii. iii. 编号并按组重新开始
    RomanSubItems,
    /// 每道选中的题目都是独立大题，从 first_question 开始连续编号（未声明则接着上一个题号）
    WholeQuestions {
        #[serde(default)]
        first_question: Option<u32>,
    },
}

impl NumberingScheme {
    pub fn name(&self) -> &'static str {
        match self {
            NumberingScheme::RomanSubItems => "roman_sub_items",
            NumberingScheme::WholeQuestions { .. } => "whole_questions",
        }
    }
}

/// section 标题行（例如 "PART II (50 Marks)" 及其说明）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHeading {
    pub text: String,
    #[serde(default)]
    pub instruction: Option<String>,
}

/// 模板中的一个 section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSection {
    pub section_id: String,
    pub display_name: String,
    #[serde(default)]
    pub instruction: Option<String>,
    /// 出现在 display_name 之前的上级标题
    #[serde(default)]
    pub headings: Vec<SectionHeading>,
    /// 进入该 section 时强制换页
    #[serde(default)]
    pub start_new_page: bool,
    pub numbering: NumberingScheme,
    /// 独立大题无小题分值时右侧显示的分值（例如 10 → "[10]"）
    #[serde(default)]
    pub marks_per_question: Option<u32>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    #[serde(default)]
    pub shuffle_selection: bool,
}

/// section 下的 subsection（罗马数字编号方案中对应一道大题）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subsection {
    pub label: String,
    #[serde(default)]
    pub question_number: Option<u32>,
    /// 标签右侧的分值说明（例如 "[16]"）
    #[serde(default)]
    pub marks_display: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    #[serde(default)]
    pub shuffle_selection: bool,
}

/// 题目槽位：N 道某题型的题目及其学科比例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSpec {
    pub question_type: String,
    pub count: usize,
    #[serde(default)]
    pub discipline_ratio: DisciplineRatio,
    /// 显式替代链；未声明时使用内置默认替代链
    #[serde(default)]
    pub substitutes: Option<Vec<String>>,
}

/// 学科比例（history : civics，和为 1）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisciplineRatio {
    #[serde(default)]
    pub history: f64,
    #[serde(default)]
    pub civics: f64,
}

impl Default for DisciplineRatio {
    fn default() -> Self {
        Self {
            history: 0.5,
            civics: 0.5,
        }
    }
}

impl DisciplineRatio {
    /// 比例是否合法：非负且和为 1
    pub fn is_valid(&self) -> bool {
        self.history >= 0.0 && self.civics >= 0.0 && ((self.history + self.civics) - 1.0).abs() < 1e-6
    }

    /// 按比例拆分数量：先列学科（history）四舍五入（.5 向上），余数归第二个学科
    pub fn split(&self, count: usize) -> [(Discipline, usize); 2] {
        let first = ((count as f64) * self.history + 0.5).floor().max(0.0) as usize;
        let first = first.min(count);
        [
            (Discipline::ORDER[0], first),
            (Discipline::ORDER[1], count - first),
        ]
    }
}

/// 槽位组：一个 subsection，或直接声明槽位的 section 本身
#[derive(Debug, Clone, Copy)]
pub struct SlotGroup<'t> {
    pub section_index: usize,
    pub subsection_index: Option<usize>,
    pub section: &'t TemplateSection,
    pub label: &'t str,
    pub question_number: Option<u32>,
    pub slots: &'t [SlotSpec],
    pub shuffle_selection: bool,
}

impl TemplateSection {
    /// 该 section 的槽位组（有 subsection 时每个 subsection 一组，否则 section 本身一组）
    pub fn slot_groups(&self, section_index: usize) -> Vec<SlotGroup<'_>> {
        if self.subsections.is_empty() {
            return vec![SlotGroup {
                section_index,
                subsection_index: None,
                section: self,
                label: &self.display_name,
                question_number: None,
                slots: &self.slots,
                shuffle_selection: self.shuffle_selection,
            }];
        }
        self.subsections
            .iter()
            .enumerate()
            .map(|(i, sub)| SlotGroup {
                section_index,
                subsection_index: Some(i),
                section: self,
                label: &sub.label,
                question_number: sub.question_number,
                slots: &sub.slots,
                shuffle_selection: sub.shuffle_selection,
            })
            .collect()
    }
}

impl PaperTemplate {
    /// 所有槽位组（模板顺序）
    pub fn slot_groups(&self) -> Vec<SlotGroup<'_>> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.slot_groups(i))
            .collect()
    }

    /// 模板请求的题目总数
    pub fn requested_total(&self) -> usize {
        self.slot_groups()
            .iter()
            .flat_map(|g| g.slots.iter())
            .map(|s| s.count)
            .sum()
    }

    /// 校验模板结构，缺失的结构是致命错误
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.sections.is_empty() {
            return Err(TemplateError::NoSections);
        }
        for section in &self.sections {
            if section.subsections.is_empty() && section.slots.is_empty() {
                return Err(TemplateError::NumberingStructure {
                    section_id: section.section_id.clone(),
                    scheme: section.numbering.name(),
                });
            }
            for sub in &section.subsections {
                if sub.slots.is_empty() {
                    return Err(TemplateError::MissingSlots {
                        section_id: section.section_id.clone(),
                        container: sub.label.clone(),
                    });
                }
            }
            for group in section.slot_groups(0) {
                for slot in group.slots {
                    if !slot.discipline_ratio.is_valid() {
                        return Err(TemplateError::InvalidDisciplineRatio {
                            section_id: section.section_id.clone(),
                            question_type: slot.question_type.clone(),
                            history: slot.discipline_ratio.history,
                            civics: slot.discipline_ratio.civics,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_split_rounds_half_up_on_first_discipline() {
        let ratio = DisciplineRatio::default();
        assert_eq!(
            ratio.split(7),
            [(Discipline::History, 4), (Discipline::Civics, 3)]
        );
        assert_eq!(
            ratio.split(10),
            [(Discipline::History, 5), (Discipline::Civics, 5)]
        );
    }

    #[test]
    fn test_ratio_split_single_discipline() {
        let civics_only = DisciplineRatio {
            history: 0.0,
            civics: 1.0,
        };
        assert_eq!(
            civics_only.split(3),
            [(Discipline::History, 0), (Discipline::Civics, 3)]
        );
        assert!(civics_only.is_valid());
        assert!(!DisciplineRatio {
            history: 0.7,
            civics: 0.7
        }
        .is_valid());
    }

    #[test]
    fn test_validate_rejects_missing_structure() {
        let template: PaperTemplate = toml::from_str(
            r#"
            [[sections]]
            section_id = "part_1"
            display_name = "PART I"
            numbering = { scheme = "roman_sub_items" }
            "#,
        )
        .unwrap();
        assert!(matches!(
            template.validate(),
            Err(TemplateError::NumberingStructure { .. })
        ));

        let empty = PaperTemplate {
            paper_header: PaperHeader::default(),
            answer_key: AnswerKeyHeader::default(),
            sections: Vec::new(),
        };
        assert!(matches!(empty.validate(), Err(TemplateError::NoSections)));
    }

    #[test]
    fn test_slot_groups_follow_subsections() {
        let template: PaperTemplate = toml::from_str(
            r#"
            [[sections]]
            section_id = "part_1"
            display_name = "PART I"
            numbering = { scheme = "roman_sub_items" }

            [[sections.subsections]]
            label = "Question 1"
            question_number = 1
            [[sections.subsections.slots]]
            question_type = "mcq_standard"
            count = 4

            [[sections.subsections]]
            label = "Question 2"
            [[sections.subsections.slots]]
            question_type = "short_answer"
            count = 3

            [[sections]]
            section_id = "part_2"
            display_name = "SECTION A"
            numbering = { scheme = "whole_questions", first_question = 3 }
            [[sections.slots]]
            question_type = "structured_essay"
            count = 2
            discipline_ratio = { civics = 1.0 }
            "#,
        )
        .unwrap();
        template.validate().unwrap();
        let groups = template.slot_groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].label, "Question 1");
        assert_eq!(groups[1].subsection_index, Some(1));
        assert_eq!(groups[2].label, "SECTION A");
        assert_eq!(template.requested_total(), 9);
        assert_eq!(
            template.sections[1].numbering,
            NumberingScheme::WholeQuestions {
                first_question: Some(3)
            }
        );
    }
}
