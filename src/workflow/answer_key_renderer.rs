//! 答案页渲染流程 - 流程层
//!
//! 与试卷使用同一份选题结果、同样的顺序：每题一行粗体短标签 + 参考答案，
//! 长答题型按字符预算截断。分页策略和页脚与试卷一致。

use crate::infrastructure::document::{Align, DocumentBuilder};
use crate::infrastructure::text_metrics::{FontWeight, Span};
use crate::models::{AnswerKeyHeader, SelectedQuestion, SelectionResult};
use crate::utils::logging::truncate_text;
use crate::workflow::layout::{LayoutEngine, PageLayout};
use phf::phf_set;
use tracing::info;

/// 需要截断答案的长答题型
static LONG_FORM_TYPES: phf::Set<&'static str> = phf_set! {
    "match_columns",
    "structured_essay",
    "picture_study_linked",
    "source_passage_analysis",
    "deductive_application",
};

/// 是否为长答题型
pub fn is_long_form(question_type: &str) -> bool {
    LONG_FORM_TYPES.contains(question_type)
}

/// 答案页上显示的答案文字
pub fn answer_text(question: &SelectedQuestion, budget: usize) -> String {
    match question.question.model_answer_text.as_deref() {
        None => "—".to_string(),
        Some(text) if is_long_form(&question.question.question_type) => truncate_text(text, budget),
        Some(text) => text.to_string(),
    }
}

/// 答案页渲染器
pub struct AnswerKeyRenderer<'t> {
    header: &'t AnswerKeyHeader,
    layout: PageLayout,
}

impl<'t> AnswerKeyRenderer<'t> {
    pub fn new(header: &'t AnswerKeyHeader) -> Self {
        Self {
            header,
            layout: PageLayout::default(),
        }
    }

    /// 渲染答案页，返回总页数
    pub fn render<D: DocumentBuilder>(&self, selection: &SelectionResult, doc: &mut D) -> usize {
        let mut engine = LayoutEngine::new(doc, self.layout);
        let layout = engine.layout;

        engine.heading(&self.header.title, &layout.title);
        if !self.header.subtitle.is_empty() {
            engine.plain(
                &self.header.subtitle,
                FontWeight::Regular,
                &layout.body.with_align(Align::Center),
            );
        }
        engine.move_down_lines(1.0);

        let style = layout.body.with_align(Align::Left);
        for question in &selection.questions {
            engine.break_if_past_threshold();
            let spans = [
                Span::bold(question.answer_key_label()),
                Span::regular(format!(
                    " {}",
                    answer_text(question, self.header.long_answer_char_budget)
                )),
            ];
            engine.ensure_room(style.line_height());
            let (x, width) = (engine.left(), engine.content_width());
            engine.flow_text(&spans, x, width, &style);
            engine.move_down_lines(0.3);
        }

        let pages = engine.finish();
        info!("✓ 答案页排版完成: {} 道题目, {} 页", selection.len(), pages);
        pages
    }
}
