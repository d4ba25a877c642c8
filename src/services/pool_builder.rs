//! 题目池构建服务 - 业务能力层
//!
//! 只负责把候选题目按 (题型, 学科) 分组，不关心选题策略

use crate::models::{CandidateQuestion, Discipline};
use std::collections::HashMap;
use tracing::debug;

/// 按 (题型, 学科) 分组的候选题目池
///
/// 每个池内保持输入顺序；池本身不拥有题目，只借用输入列表
#[derive(Debug, Default)]
pub struct QuestionPools<'a> {
    pools: HashMap<(String, Discipline), Vec<&'a CandidateQuestion>>,
    total: usize,
}

impl<'a> QuestionPools<'a> {
    /// 构建题目池（纯函数，O(n)）
    pub fn build(candidates: &'a [CandidateQuestion]) -> Self {
        let mut pools: HashMap<(String, Discipline), Vec<&'a CandidateQuestion>> = HashMap::new();
        for candidate in candidates {
            pools
                .entry((candidate.question_type.clone(), candidate.discipline))
                .or_default()
                .push(candidate);
        }
        debug!(
            "题目池构建完成: {} 道题目, {} 个 (题型, 学科) 分组",
            candidates.len(),
            pools.len()
        );
        Self {
            pools,
            total: candidates.len(),
        }
    }

    /// 获取某个 (题型, 学科) 的池，不存在时返回空切片
    pub fn get(&self, question_type: &str, discipline: Discipline) -> &[&'a CandidateQuestion] {
        self.pools
            .get(&(question_type.to_string(), discipline))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 候选题目总数
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// 便捷函数：构建题目池
pub fn build_pools(candidates: &[CandidateQuestion]) -> QuestionPools<'_> {
    QuestionPools::build(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, question_type: &str, discipline: Discipline) -> CandidateQuestion {
        CandidateQuestion {
            id: id.to_string(),
            question_text: format!("Question {}", id),
            question_type: question_type.to_string(),
            discipline,
            difficulty_level: 1,
            marks: 1,
            model_answer_text: None,
            scenario_data: None,
            source_material_url: None,
            chapter_id: None,
            rubric: None,
        }
    }

    #[test]
    fn test_pools_group_by_type_and_discipline_in_order() {
        let candidates = vec![
            candidate("h1", "mcq_standard", Discipline::History),
            candidate("c1", "mcq_standard", Discipline::Civics),
            candidate("h2", "mcq_standard", Discipline::History),
            candidate("h3", "short_answer", Discipline::History),
        ];
        let pools = build_pools(&candidates);

        let ids: Vec<&str> = pools
            .get("mcq_standard", Discipline::History)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["h1", "h2"]);
        assert_eq!(pools.get("mcq_standard", Discipline::Civics).len(), 1);
        assert_eq!(pools.get("short_answer", Discipline::History).len(), 1);
        assert!(pools.get("short_answer", Discipline::Civics).is_empty());
        assert_eq!(pools.total(), 4);
    }

    #[test]
    fn test_empty_input_gives_empty_pools() {
        let pools = build_pools(&[]);
        assert!(pools.is_empty());
        assert!(pools.get("mcq_standard", Discipline::History).is_empty());
    }
}
