//! 试卷渲染流程 - 流程层
//!
//! 核心职责：按模板顺序把选题结果排版为试卷
//!
//! 流程顺序：
//! 1. 页眉（标题、识别码、考试信息、说明框）
//! 2. 逐个 section：换页策略 → 标题 → 题目
//! 3. 罗马数字小题：大题标签 + 分值，随后 i. ii. iii. …
//! 4. 独立大题："Question N" + 分值，引言，(i)(ii)(iii) 小题及各自分值
//! 5. 最后一页页脚

use crate::error::GenerationWarning;
use crate::infrastructure::document::{Align, DocumentBuilder};
use crate::infrastructure::text_metrics::{FontWeight, Span};
use crate::models::{NumberingScheme, PaperTemplate, SelectedQuestion, SelectionResult, TemplateSection};
use crate::services::content_classifier::{classify, emphasis_spans, ClassifyContext, ContentBlock, LabeledItem};
use crate::services::subpart_parser::analyze_question;
use crate::workflow::layout::{LayoutEngine, PageLayout};
use tracing::{debug, info};

/// 一次渲染的结果
#[derive(Debug, Clone, Default)]
pub struct RenderOutcome {
    pub pages: usize,
    pub warnings: Vec<GenerationWarning>,
}

/// 试卷渲染器
pub struct PaperRenderer<'t> {
    template: &'t PaperTemplate,
    layout: PageLayout,
}

impl<'t> PaperRenderer<'t> {
    pub fn new(template: &'t PaperTemplate) -> Self {
        Self {
            template,
            layout: PageLayout::default(),
        }
    }

    pub fn with_layout(template: &'t PaperTemplate, layout: PageLayout) -> Self {
        Self { template, layout }
    }

    /// 渲染整张试卷
    ///
    /// # 返回
    /// 总页数及解析小题分值时产生的警告
    pub fn render<D: DocumentBuilder>(&self, selection: &SelectionResult, doc: &mut D) -> RenderOutcome {
        let mut engine = LayoutEngine::new(doc, self.layout);
        let mut warnings = Vec::new();

        self.header(&mut engine);

        for (index, section) in self.template.sections.iter().enumerate() {
            let questions: Vec<&SelectedQuestion> = selection.in_section(index).collect();
            if questions.is_empty() {
                debug!("section '{}' 没有选中题目，跳过", section.section_id);
                continue;
            }
            if section.start_new_page {
                engine.start_new_page();
            } else {
                engine.break_if_past_threshold();
            }
            self.section_heading(&mut engine, section);

            match section.numbering {
                NumberingScheme::RomanSubItems => self.roman_section(&mut engine, section, &questions),
                NumberingScheme::WholeQuestions { .. } => {
                    for question in &questions {
                        warnings.extend(self.whole_question(&mut engine, section, question));
                    }
                }
            }
        }

        let pages = engine.finish();
        info!("✓ 试卷排版完成: {} 道题目, {} 页", selection.len(), pages);
        RenderOutcome { pages, warnings }
    }

    // ========== 页眉 ==========

    fn header<D: DocumentBuilder>(&self, engine: &mut LayoutEngine<'_, D>) {
        let header = &self.template.paper_header;
        let layout = engine.layout;

        // 识别码与标题同一行，靠右
        let uid_width = 120.0;
        let uid_x = engine.right() - uid_width;
        engine.draw_at_cursor(
            &[Span::regular(header.paper_uid.as_str())],
            uid_x,
            uid_width,
            &layout.small.with_align(Align::Right),
        );
        engine.heading(&header.title, &layout.title);

        let centered = layout.body.with_align(Align::Center);
        if !header.subtitle.is_empty() {
            engine.plain(&header.subtitle, FontWeight::Regular, &centered);
        }
        engine.plain(&header.grade_display, FontWeight::Regular, &centered);
        engine.move_down_lines(0.5);

        for line in [&header.marks_display, &header.time_display, &header.reading_time_display] {
            engine.plain(line, FontWeight::Regular, &layout.small);
        }
        engine.move_down_lines(1.0);

        let instructions = header.numbered_instructions();
        if !instructions.is_empty() {
            engine.boxed_text(&[Span::regular(instructions.join("\n"))], Align::Justify);
        }
        engine.boxed_text(
            &[
                Span::bold(header.examiner_heading.as_str()),
                Span::regular(format!("\n{}", header.examiner_note)),
            ],
            Align::Center,
        );
        engine.move_down_lines(1.0);
    }

    fn section_heading<D: DocumentBuilder>(&self, engine: &mut LayoutEngine<'_, D>, section: &TemplateSection) {
        let layout = engine.layout;
        let instruction_style = layout.body.with_align(Align::Center);
        for heading in &section.headings {
            engine.heading(&heading.text, &layout.heading);
            if let Some(instruction) = &heading.instruction {
                engine.plain(instruction, FontWeight::Regular, &instruction_style);
            }
            engine.move_down_lines(0.6);
        }
        engine.heading(&section.display_name, &layout.heading);
        if let Some(instruction) = &section.instruction {
            engine.plain(instruction, FontWeight::Regular, &instruction_style);
        }
        engine.move_down_lines(0.6);
    }

    // ========== 罗马数字小题 ==========

    fn roman_section<D: DocumentBuilder>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        section: &TemplateSection,
        questions: &[&SelectedQuestion],
    ) {
        let layout = engine.layout;
        let mut current_group: Option<Option<usize>> = None;

        for question in questions {
            engine.break_if_past_threshold();

            if current_group != Some(question.subsection_index) {
                current_group = Some(question.subsection_index);
                let sub = question.subsection_index.and_then(|i| section.subsections.get(i));
                // 直接声明槽位的 section 没有 subsection 标签，用大题号代替
                let label = match sub {
                    Some(sub) => sub.label.clone(),
                    None => format!("Question {}", question.question_number),
                };
                engine.ensure_room(3.0 * layout.body.line_height());
                let x = engine.left();
                let width = engine.content_width();
                engine.draw_at_cursor(&[Span::bold(label)], x, width, &layout.body);
                if let Some(marks) = sub.and_then(|s| s.marks_display.as_ref()) {
                    engine.mark_at_cursor(marks, layout.marks_width);
                }
                engine.move_down(layout.body.line_height());
                if let Some(instruction) = sub.and_then(|s| s.instruction.as_ref()) {
                    engine.plain(instruction, FontWeight::Regular, &layout.small);
                }
                engine.move_down_lines(0.4);
            }

            let x = engine.left();
            let body_x = x + layout.question_number_width;
            let body_width = engine.content_width() - layout.marks_width - layout.question_number_width;
            let blocks = classify(&question.question.body_with_placeholder(), ClassifyContext::Stem);

            self.keep_with_first_block(engine, &blocks, body_width);
            engine.draw_at_cursor(
                &[Span::regular(question.question_label())],
                x,
                layout.question_number_width,
                &layout.body.with_align(Align::Left),
            );
            self.blocks(engine, &blocks, body_x, body_width);
            engine.move_down_lines(layout.space_after_item);
        }
    }

    // ========== 独立大题 ==========

    fn whole_question<D: DocumentBuilder>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        section: &TemplateSection,
        question: &SelectedQuestion,
    ) -> Vec<GenerationWarning> {
        let layout = engine.layout;
        let lh = layout.body.line_height();
        let body = question.question.body_with_placeholder();
        let structure = analyze_question(&question.question, &body);

        engine.break_if_past_threshold();
        engine.ensure_room(2.0 * lh);

        let x = engine.left();
        let full_width = engine.content_width();
        engine.draw_at_cursor(&[Span::bold(question.question_label())], x, full_width, &layout.body);
        if structure.parts.is_empty() {
            let marks = section.marks_per_question.unwrap_or(question.question.marks);
            engine.mark_at_cursor(&format!("[{}]", marks), layout.marks_width);
        }
        engine.move_down(lh);

        if structure.parts.is_empty() {
            let blocks = classify(&body, ClassifyContext::Stem);
            self.blocks(engine, &blocks, x, full_width);
        } else {
            if !structure.intro.is_empty() {
                let blocks = classify(&structure.intro, ClassifyContext::Stem);
                self.blocks(engine, &blocks, x, full_width);
            }
            let part_x = x + layout.subpart_label_width;
            let part_width = full_width - layout.marks_width - layout.subpart_label_width;
            for part in &structure.parts {
                let blocks = classify(&part.text, ClassifyContext::SubPart);
                self.keep_with_first_block(engine, &blocks, part_width);
                engine.draw_at_cursor(
                    &[Span::regular(part.label.as_str())],
                    x,
                    layout.subpart_label_width,
                    &layout.body.with_align(Align::Left),
                );
                if part.marks > 0 {
                    engine.mark_at_cursor(&part.marks.to_string(), layout.submark_width);
                }
                if blocks.is_empty() {
                    engine.move_down(lh);
                }
                self.blocks(engine, &blocks, part_x, part_width);
            }
        }

        engine.move_down_lines(layout.space_after_question);
        structure.warnings
    }

    // ========== 内容块 ==========

    // 标签与第一块的第一行（或表格第一行）放在同一页
    fn keep_with_first_block<D: DocumentBuilder>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        blocks: &[ContentBlock],
        width: f32,
    ) {
        let layout = engine.layout;
        let needed = match blocks.first() {
            Some(ContentBlock::Table { rows }) => layout
                .table
                .layout(rows, width)
                .row_heights
                .first()
                .copied()
                .unwrap_or(0.0),
            _ => layout.body.line_height(),
        };
        engine.ensure_room(needed);
    }

    fn blocks<D: DocumentBuilder>(&self, engine: &mut LayoutEngine<'_, D>, blocks: &[ContentBlock], x: f32, width: f32) {
        let layout = engine.layout;
        for block in blocks {
            match block {
                ContentBlock::Paragraph(text) => {
                    engine.flow_text(&emphasis_spans(text), x, width, &layout.body);
                }
                ContentBlock::Table { rows } => {
                    engine.table(rows, x, width);
                }
                ContentBlock::Options { items } => {
                    self.labeled_items(engine, items, x, layout.option_label_width, width);
                }
                ContentBlock::Nested { items } => {
                    self.labeled_items(engine, items, x, layout.nested_label_width, width);
                }
            }
        }
    }

    fn labeled_items<D: DocumentBuilder>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        items: &[LabeledItem],
        x: f32,
        label_width: f32,
        width: f32,
    ) {
        for item in items {
            engine.labeled_text(
                &[Span::regular(item.label.as_str())],
                x,
                label_width,
                &emphasis_spans(&item.text),
                width - label_width,
                None,
            );
        }
    }
}
