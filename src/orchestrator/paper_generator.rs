//! 单次试卷生成 - 编排层
//!
//! 同步流水线：校验模板 → 构建题目池 → 槽位选题 → 分区组装 → 渲染
//!
//! 所有致命错误都在生成任何文档字节之前返回

use crate::error::{AppError, AppResult, GenerationWarning};
use crate::infrastructure::document::PageSpec;
use crate::infrastructure::pdf_document::PdfDocument;
use crate::models::{CandidateQuestion, PaperTemplate, SelectionResult};
use crate::services::pool_builder::build_pools;
use crate::services::section_assembler::assemble;
use crate::services::slot_selector::SlotSelector;
use crate::workflow::answer_key_renderer::AnswerKeyRenderer;
use crate::workflow::paper_renderer::PaperRenderer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// 已渲染的文档
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub warnings: Vec<GenerationWarning>,
}

/// 随机数生成器：给定种子可复现，否则取系统熵
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            debug!("使用固定随机种子: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

/// 按模板为候选题目选题
///
/// # 参数
/// - `template`: 试卷模板
/// - `candidates`: 范围内的候选题目
/// - `chapter_scope`: 章节范围（仅用于错误信息）
/// - `rng`: 注入的随机数生成器
///
/// # 返回
/// 选题结果；模板结构缺失或候选题目为空时返回致命错误
pub fn select_paper<R: Rng>(
    template: &PaperTemplate,
    candidates: &[CandidateQuestion],
    chapter_scope: &[String],
    rng: R,
) -> AppResult<SelectionResult> {
    template.validate()?;
    if candidates.is_empty() {
        return Err(AppError::empty_pool(chapter_scope));
    }

    let pools = build_pools(candidates);
    let mut selector = SlotSelector::new(&pools, rng);
    let groups = selector.select_template(template);
    let selection = assemble(groups, template.requested_total());

    info!(
        "✓ 选题完成: {}/{} 道 ({} 个槽位缺口)",
        selection.len(),
        selection.requested,
        selection.shortfalls.len()
    );
    Ok(selection)
}

/// 槽位缺口转换为警告
pub fn shortfall_warnings(selection: &SelectionResult) -> Vec<GenerationWarning> {
    selection
        .shortfalls
        .iter()
        .map(|s| GenerationWarning::InsufficientSlotSupply {
            section_label: s.section_label.clone(),
            question_type: s.question_type.clone(),
            requested: s.requested,
            selected: s.selected,
        })
        .collect()
}

/// 渲染试卷 PDF
pub fn render_paper_pdf(template: &PaperTemplate, selection: &SelectionResult) -> RenderedDocument {
    let mut doc = PdfDocument::new(PageSpec::A4);
    let outcome = PaperRenderer::new(template).render(selection, &mut doc);
    RenderedDocument {
        bytes: doc.finish(),
        pages: outcome.pages,
        warnings: outcome.warnings,
    }
}

/// 渲染答案页 PDF
pub fn render_answer_key_pdf(template: &PaperTemplate, selection: &SelectionResult) -> RenderedDocument {
    let mut doc = PdfDocument::new(PageSpec::A4);
    let pages = AnswerKeyRenderer::new(&template.answer_key).render(selection, &mut doc);
    RenderedDocument {
        bytes: doc.finish(),
        pages,
        warnings: Vec::new(),
    }
}
