//! 分区组装服务 - 业务能力层
//!
//! 把各槽位组的选题结果按模板声明的编号方案组装成有序的 SelectionResult

use crate::models::{NumberingScheme, SelectedQuestion, SelectionResult};
use crate::services::slot_selector::GroupSelection;
use tracing::debug;

/// 组装选题结果
///
/// # 参数
/// - `groups`: 模板顺序的槽位组选题结果
/// - `requested`: 模板请求的题目总数
///
/// # 返回
/// 全局序号连续递增、题号按各 section 编号方案分配的选题结果
pub fn assemble(groups: Vec<GroupSelection<'_, '_>>, requested: usize) -> SelectionResult {
    let mut questions = Vec::new();
    let mut shortfalls = Vec::new();
    let mut display_index = 0usize;
    // 最近一次分配的大题号
    let mut last_number = 0u32;
    let mut current_section: Option<usize> = None;

    for selection in groups {
        let group = selection.group;
        let section = group.section;
        let entering_section = current_section != Some(group.section_index);
        current_section = Some(group.section_index);
        shortfalls.extend(selection.shortfalls);

        match section.numbering {
            NumberingScheme::RomanSubItems => {
                if selection.picks.is_empty() {
                    continue;
                }
                let number = group.question_number.unwrap_or(last_number + 1);
                last_number = number;
                for (i, question) in selection.picks.into_iter().enumerate() {
                    display_index += 1;
                    questions.push(SelectedQuestion {
                        question: question.clone(),
                        display_index,
                        section_label: group.label.to_string(),
                        section_id: section.section_id.clone(),
                        section_index: group.section_index,
                        subsection_index: group.subsection_index,
                        question_number: number,
                        sub_index: Some(i as u32 + 1),
                    });
                }
            }
            NumberingScheme::WholeQuestions { first_question } => {
                let mut number = match (entering_section, first_question) {
                    (true, Some(first)) => first,
                    _ => last_number + 1,
                };
                for question in selection.picks {
                    display_index += 1;
                    questions.push(SelectedQuestion {
                        question: question.clone(),
                        display_index,
                        section_label: group.label.to_string(),
                        section_id: section.section_id.clone(),
                        section_index: group.section_index,
                        subsection_index: group.subsection_index,
                        question_number: number,
                        sub_index: None,
                    });
                    last_number = number;
                    number += 1;
                }
            }
        }
    }

    debug!("组装完成: {} 道题目, {} 个缺口", questions.len(), shortfalls.len());
    SelectionResult {
        questions,
        shortfalls,
        requested,
    }
}
