use crate::models::discipline::Discipline;
use crate::utils::numerals::to_roman;
use serde::{Deserialize, Serialize};

/// 题目情境数据（图片说明等）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_placeholder_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_instruction: Option<String>,
}

/// 评分细则中的一个评分块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_part_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_marks: Option<u32>,
}

impl RubricBlock {
    /// 小题键（i / ii / iii / iv），优先 sub_part_key，否则由 block_name 去掉括号和空白得到
    pub fn key(&self) -> Option<String> {
        let raw = self
            .sub_part_key
            .clone()
            .or_else(|| {
                self.block_name.as_ref().map(|name| {
                    name.chars()
                        .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
                        .collect()
                })
            })?
            .to_lowercase();
        if raw.is_empty() {
            None
        } else {
            Some(raw)
        }
    }

    /// 块分值，优先 marks，否则 max_marks
    pub fn mark_value(&self) -> Option<u32> {
        self.marks.or(self.max_marks)
    }
}

/// 评分细则
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    #[serde(default)]
    pub blocks: Vec<RubricBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<u32>,
}

impl Rubric {
    /// 按小题键查找分值
    pub fn marks_for(&self, key: &str) -> Option<u32> {
        self.blocks
            .iter()
            .rev()
            .find(|b| b.key().as_deref() == Some(key) && b.mark_value().is_some())
            .and_then(RubricBlock::mark_value)
    }
}

/// 候选题目（来自内容库，流水线中不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuestion {
    pub id: String,
    pub question_text: String,
    pub question_type: String,
    pub discipline: Discipline,
    #[serde(deserialize_with = "deserialize_difficulty", default = "default_difficulty")]
    pub difficulty_level: u8,
    pub marks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_answer_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_data: Option<ScenarioData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_material_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, alias = "rubric_json", skip_serializing_if = "Option::is_none")]
    pub rubric: Option<Rubric>,
}

impl CandidateQuestion {
    /// 是否需要在题干前插入图片占位说明
    pub fn needs_image_placeholder(&self) -> bool {
        self.question_type == "picture_study_linked"
            || (self.question_type == "mcq_visual_scenario" && self.source_material_url.is_none())
    }

    /// 图片占位说明文字
    pub fn image_placeholder_text(&self) -> Option<String> {
        let sd = self.scenario_data.as_ref()?;
        if let Some(caption) = sd.image_placeholder_caption.as_deref().filter(|c| !c.trim().is_empty()) {
            let mut c = caption.trim();
            if let Some(rest) = c.strip_prefix("[Image:") {
                c = rest.trim_start();
            }
            let c = c.strip_suffix(']').unwrap_or(c);
            return Some(format!("Image to be inserted – {}", c.trim()));
        }
        sd.image_instruction
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .map(|i| format!("Image to be inserted – {}", i))
    }

    /// 渲染用题干：必要时在前面加上图片占位说明
    pub fn body_with_placeholder(&self) -> String {
        match self.needs_image_placeholder().then(|| self.image_placeholder_text()).flatten() {
            Some(placeholder) => format!("{}\n\n{}", placeholder, self.question_text),
            None => self.question_text.clone(),
        }
    }
}

fn default_difficulty() -> u8 {
    1
}

// 难度既可能是整数等级，也可能是 easy / medium / difficult / complex 标签
fn deserialize_difficulty<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct DifficultyVisitor;

    impl<'de> Visitor<'de> for DifficultyVisitor {
        type Value = u8;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer level or one of easy/medium/difficult/complex")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            match value.trim().to_lowercase().as_str() {
                "easy" => Ok(1),
                "medium" => Ok(2),
                "difficult" => Ok(3),
                "complex" => Ok(4),
                other => other
                    .parse::<u8>()
                    .map_err(|_| E::custom(format!("未知难度: {}", value))),
            }
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u8::try_from(value).map_err(|_| E::custom(format!("难度超出范围: {}", value)))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u8::try_from(value).map_err(|_| E::custom(format!("难度超出范围: {}", value)))
        }
    }

    deserializer.deserialize_any(DifficultyVisitor)
}

/// 已选题目：候选题目 + 全局序号 + 所属 section 标签
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedQuestion {
    #[serde(flatten)]
    pub question: CandidateQuestion,
    /// 全局序号（从 1 开始，严格递增）
    pub display_index: usize,
    /// 所属 section / subsection 在模板中声明的标签
    pub section_label: String,
    pub section_id: String,
    pub section_index: usize,
    pub subsection_index: Option<usize>,
    /// 试卷上的大题号
    pub question_number: u32,
    /// 大题内的小题序号（罗马数字编号方案下才有）
    pub sub_index: Option<u32>,
}

impl SelectedQuestion {
    /// 试卷上显示的题号（"iii." 或 "Question 6"）
    pub fn question_label(&self) -> String {
        match self.sub_index {
            Some(n) => format!("{}.", to_roman(n)),
            None => format!("Question {}", self.question_number),
        }
    }

    /// 答案页上的短标签（"Q1.3" 或 "Q6."）
    pub fn answer_key_label(&self) -> String {
        match self.sub_index {
            Some(n) => format!("Q{}.{}", self.question_number, n),
            None => format!("Q{}.", self.question_number),
        }
    }
}

/// 选题结果中未选满的槽位
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotShortfall {
    pub section_label: String,
    pub question_type: String,
    pub requested: usize,
    pub selected: usize,
}

/// 一次生成的完整选题结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionResult {
    pub questions: Vec<SelectedQuestion>,
    pub shortfalls: Vec<SlotShortfall>,
    /// 模板请求的题目总数
    pub requested: usize,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 属于某个 section 的题目（保持选题顺序）
    pub fn in_section(&self, section_index: usize) -> impl Iterator<Item = &SelectedQuestion> {
        self.questions
            .iter()
            .filter(move |q| q.section_index == section_index)
    }
}
