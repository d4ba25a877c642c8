//! 槽位选题服务 - 业务能力层
//!
//! 按模板顺序逐个槽位随机抽题：
//! 1. 按学科比例拆分数量（先列学科四舍五入，余数归第二个学科）
//! 2. 每个学科先从主题型池抽取，不足时沿替代链依次补齐
//! 3. 抽中的题目立即进入全局已用集合，整卷不重复
//! 4. 替代链用尽仍不足时记录缺口，不中断生成

use crate::models::{CandidateQuestion, Discipline, PaperTemplate, SlotGroup, SlotShortfall, SlotSpec};
use crate::services::pool_builder::QuestionPools;
use phf::phf_map;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 内置默认替代链（模板中的 substitutes 可覆盖）
static DEFAULT_SUBSTITUTES: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "mcq_logic_table" => &["mcq_relationship_analogy", "mcq_standard"],
    "mcq_visual_scenario" => &["mcq_standard", "mcq_source_connection"],
    "mcq_assertion_reason" => &["mcq_standard"],
    "short_source_interpretation" => &["short_answer"],
    "picture_study_linked" => &["structured_essay"],
};

/// 某题型的默认替代链
pub fn default_substitutes(question_type: &str) -> &'static [&'static str] {
    DEFAULT_SUBSTITUTES.get(question_type).copied().unwrap_or(&[])
}

/// 一个槽位组的选题结果
#[derive(Debug, Clone)]
pub struct GroupSelection<'t, 'a> {
    pub group: SlotGroup<'t>,
    /// 组内选中的题目（槽位顺序，组声明 shuffle_selection 时已整体打乱）
    pub picks: Vec<&'a CandidateQuestion>,
    pub shortfalls: Vec<SlotShortfall>,
}

/// 槽位选题器
///
/// 持有题目池、全局已用集合和注入的随机数生成器；每次生成新建一个
pub struct SlotSelector<'p, 'a, R: Rng> {
    pools: &'p QuestionPools<'a>,
    used: HashSet<String>,
    rng: R,
}

impl<'p, 'a, R: Rng> SlotSelector<'p, 'a, R> {
    pub fn new(pools: &'p QuestionPools<'a>, rng: R) -> Self {
        Self {
            pools,
            used: HashSet::new(),
            rng,
        }
    }

    /// 已选中的题目 id 数量
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// 按模板顺序为所有槽位组选题
    pub fn select_template<'t>(&mut self, template: &'t PaperTemplate) -> Vec<GroupSelection<'t, 'a>> {
        template
            .slot_groups()
            .into_iter()
            .map(|group| self.select_group(group))
            .collect()
    }

    /// 为一个槽位组选题
    pub fn select_group<'t>(&mut self, group: SlotGroup<'t>) -> GroupSelection<'t, 'a> {
        let mut picks = Vec::new();
        let mut shortfalls = Vec::new();

        for slot in group.slots {
            let slot_picks = self.select_slot(slot);
            if slot_picks.len() < slot.count {
                warn!(
                    "⚠️ 槽位供给不足: {} / {} 需要 {} 道, 实际 {} 道",
                    group.label,
                    slot.question_type,
                    slot.count,
                    slot_picks.len()
                );
                shortfalls.push(SlotShortfall {
                    section_label: group.label.to_string(),
                    question_type: slot.question_type.clone(),
                    requested: slot.count,
                    selected: slot_picks.len(),
                });
            }
            picks.extend(slot_picks);
        }

        if group.shuffle_selection {
            picks.shuffle(&mut self.rng);
        }

        debug!("槽位组 '{}' 选中 {} 道题目", group.label, picks.len());
        GroupSelection {
            group,
            picks,
            shortfalls,
        }
    }

    /// 为单个槽位选题（先 history 后 civics，每个学科内主题型优先）
    pub fn select_slot(&mut self, slot: &SlotSpec) -> Vec<&'a CandidateQuestion> {
        let chain: Vec<&str> = std::iter::once(slot.question_type.as_str())
            .chain(match &slot.substitutes {
                Some(explicit) => explicit.iter().map(String::as_str).collect::<Vec<_>>(),
                None => default_substitutes(&slot.question_type).to_vec(),
            })
            .collect();

        let mut picks = Vec::with_capacity(slot.count);
        for (discipline, needed) in slot.discipline_ratio.split(slot.count) {
            let mut remaining = needed;
            for question_type in &chain {
                if remaining == 0 {
                    break;
                }
                let drawn = self.draw(question_type, discipline, remaining);
                if !drawn.is_empty() && *question_type != slot.question_type {
                    debug!(
                        "替代题型 {} → {} ({}): {} 道",
                        slot.question_type,
                        question_type,
                        discipline,
                        drawn.len()
                    );
                }
                remaining -= drawn.len();
                picks.extend(drawn);
            }
        }
        picks
    }

    // 从池中去掉已用题目后打乱并取前 n 道，取出的 id 立即记入已用集合
    fn draw(&mut self, question_type: &str, discipline: Discipline, n: usize) -> Vec<&'a CandidateQuestion> {
        let mut available: Vec<&'a CandidateQuestion> = self
            .pools
            .get(question_type, discipline)
            .iter()
            .copied()
            .filter(|q| !self.used.contains(&q.id))
            .collect();
        available.shuffle(&mut self.rng);
        available.truncate(n);
        for q in &available {
            self.used.insert(q.id.clone());
        }
        available
    }
}
