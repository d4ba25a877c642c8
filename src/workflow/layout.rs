//! 排版与分页引擎 - 流程层
//!
//! 单遍、有状态地在 `DocumentBuilder` 上排版：
//! - 每道题之前检查游标是否越过内容底线，越过则画页脚并换页
//! - 长文字按行拆分到下一页，不会压到页脚
//! - 题号标签与正文第一行不拆开
//! - 每页页脚（居中页码）只画一次，最后一页在 `finish` 时补画

use crate::infrastructure::document::{
    Align, DocumentBuilder, Point, TableLayout, TableStyle, TextStyle,
};
use crate::infrastructure::text_metrics::{self, FontWeight, Line, Span};
use tracing::debug;

/// 版面常量（单位 pt）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// 页脚在下边距之上的预留高度
    pub footer_offset: f32,
    /// 内容底线在页脚之上再预留的高度
    pub bottom_reserve: f32,
    pub marks_width: f32,
    pub question_number_width: f32,
    pub option_label_width: f32,
    pub subpart_label_width: f32,
    pub nested_label_width: f32,
    pub submark_width: f32,
    pub body: TextStyle,
    pub small: TextStyle,
    pub heading: TextStyle,
    pub title: TextStyle,
    pub footer: TextStyle,
    pub table: TableStyle,
    /// 罗马数字小题之后的留白（行）
    pub space_after_item: f32,
    /// 独立大题之后的留白（行）
    pub space_after_question: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            footer_offset: 24.0,
            bottom_reserve: 80.0,
            marks_width: 44.0,
            question_number_width: 28.0,
            option_label_width: 24.0,
            subpart_label_width: 28.0,
            nested_label_width: 24.0,
            submark_width: 20.0,
            body: TextStyle::new(10.0).with_align(Align::Justify),
            small: TextStyle::new(9.0),
            heading: TextStyle::new(11.0).with_align(Align::Center),
            title: TextStyle::new(14.0).with_align(Align::Center),
            footer: TextStyle::new(9.0).with_align(Align::Center),
            table: TableStyle::default(),
            space_after_item: 0.7,
            space_after_question: 1.0,
        }
    }
}

/// 排版引擎
///
/// 借用文档构建器，独占修改其游标
pub struct LayoutEngine<'d, D: DocumentBuilder> {
    doc: &'d mut D,
    pub layout: PageLayout,
    /// 已画过页脚的最后一页
    footer_done: usize,
}

impl<'d, D: DocumentBuilder> LayoutEngine<'d, D> {
    pub fn new(doc: &'d mut D, layout: PageLayout) -> Self {
        Self {
            doc,
            layout,
            footer_done: 0,
        }
    }

    // ========== 位置 ==========

    pub fn left(&self) -> f32 {
        self.doc.page_spec().margin
    }

    pub fn right(&self) -> f32 {
        let spec = self.doc.page_spec();
        spec.width - spec.margin
    }

    pub fn content_width(&self) -> f32 {
        self.doc.page_spec().content_width()
    }

    pub fn y(&self) -> f32 {
        self.doc.cursor().y
    }

    pub fn page(&self) -> usize {
        self.doc.cursor().page
    }

    /// 页脚所在 y
    pub fn footer_y(&self) -> f32 {
        let spec = self.doc.page_spec();
        spec.height - spec.margin - self.layout.footer_offset
    }

    /// 正文可以流到的最低位置（页脚之上）
    pub fn flow_bottom(&self) -> f32 {
        self.footer_y() - 4.0
    }

    /// 题目开始前的换页阈值
    pub fn content_bottom(&self) -> f32 {
        self.footer_y() - self.layout.bottom_reserve
    }

    /// 游标是否位于空白页顶部
    pub fn at_page_top(&self) -> bool {
        self.y() <= self.doc.page_spec().margin + 0.01
    }

    pub fn move_down(&mut self, dy: f32) {
        self.doc.cursor_mut().y += dy;
    }

    /// 按行数下移（以正文行高计）
    pub fn move_down_lines(&mut self, lines: f32) {
        let lh = self.layout.body.line_height();
        self.move_down(lines * lh);
    }

    // ========== 分页 ==========

    fn draw_footer(&mut self) {
        let page = self.page();
        if self.footer_done >= page {
            return;
        }
        let style = self.layout.footer;
        let spec = self.doc.page_spec();
        let y = self.footer_y();
        self.doc
            .draw_text(&[Span::regular(page.to_string())], Point::new(0.0, y), spec.width, &style);
        self.footer_done = page;
    }

    /// 画当前页页脚并换页
    pub fn page_break(&mut self) {
        self.draw_footer();
        self.doc.new_page();
        let spec = self.doc.page_spec();
        let page = self.page();
        let cursor = self.doc.cursor_mut();
        cursor.x = spec.margin;
        cursor.y = spec.margin;
        debug!("换页 → 第 {} 页", page);
    }

    /// 游标越过内容底线时换页
    pub fn break_if_past_threshold(&mut self) -> bool {
        if self.y() > self.content_bottom() {
            self.page_break();
            true
        } else {
            false
        }
    }

    /// 剩余空间不足 `height` 时换页（空白页顶部除外）
    pub fn ensure_room(&mut self, height: f32) {
        if self.y() + height > self.flow_bottom() && !self.at_page_top() {
            self.page_break();
        }
    }

    /// 强制从新页开始（已在空白页顶部时不动）
    pub fn start_new_page(&mut self) {
        if !self.at_page_top() {
            self.page_break();
        }
    }

    /// 结束排版：补画最后一页页脚
    pub fn finish(&mut self) -> usize {
        self.draw_footer();
        self.page()
    }

    // ========== 绘制 ==========

    /// 逐行排版，跨页时按行拆分；返回第一行所在的 (页码, y)
    pub fn flow_lines(&mut self, lines: &[Line], x: f32, width: f32, style: &TextStyle) -> Option<(usize, f32)> {
        let lh = style.line_height();
        let mut first = None;
        let mut rest = lines;
        while !rest.is_empty() {
            let y = self.y();
            let mut fit = ((self.flow_bottom() - y) / lh + 1e-3).floor().max(0.0) as usize;
            if fit == 0 {
                if !self.at_page_top() {
                    self.page_break();
                    continue;
                }
                fit = 1;
            }
            let n = fit.min(rest.len());
            self.doc.draw_lines(&rest[..n], Point::new(x, y), width, style);
            first.get_or_insert((self.page(), y));
            self.move_down(n as f32 * lh);
            rest = &rest[n..];
        }
        first
    }

    /// 断行后排版
    pub fn flow_text(&mut self, spans: &[Span], x: f32, width: f32, style: &TextStyle) -> Option<(usize, f32)> {
        let lines = text_metrics::wrap(spans, width, style.font_size);
        self.flow_lines(&lines, x, width, style)
    }

    /// 整个版心宽度的一行或多行文字
    pub fn block(&mut self, spans: &[Span], style: &TextStyle) {
        let (x, width) = (self.left(), self.content_width());
        self.flow_text(spans, x, width, style);
    }

    /// 在当前游标位置画文字但不移动游标（用于题号标签和右侧分值）
    pub fn draw_at_cursor(&mut self, spans: &[Span], x: f32, width: f32, style: &TextStyle) {
        let y = self.y();
        self.doc.draw_text(spans, Point::new(x, y), width, style);
    }

    /// 右侧分值栏（右对齐，与当前行同高）
    pub fn mark_at_cursor(&mut self, mark: &str, column_width: f32) {
        let x = self.right() - column_width;
        let style = self.layout.body.with_align(Align::Right);
        self.draw_at_cursor(&[Span::regular(mark)], x, column_width, &style);
    }

    /// 标签 + 正文的一行：标签与正文第一行保持在同一页
    ///
    /// # 参数
    /// - `label`: 标签文字（左栏）
    /// - `x`: 标签栏起点
    /// - `label_width`: 标签栏宽度
    /// - `body`: 正文片段
    /// - `body_width`: 正文宽度
    /// - `mark`: 右侧分值栏文字及栏宽
    pub fn labeled_text(
        &mut self,
        label: &[Span],
        x: f32,
        label_width: f32,
        body: &[Span],
        body_width: f32,
        mark: Option<(&str, f32)>,
    ) {
        let style = self.layout.body;
        let label_style = style.with_align(Align::Left);
        let lines = text_metrics::wrap(body, body_width, style.font_size);
        self.ensure_room(style.line_height());
        self.draw_at_cursor(label, x, label_width, &label_style);
        if let Some((text, column)) = mark {
            self.mark_at_cursor(text, column);
        }
        if lines.is_empty() {
            self.move_down(style.line_height());
        } else {
            self.flow_lines(&lines, x + label_width, body_width, &style);
        }
    }

    /// 表格：按行拆分到多页，第一行放不下时先换页
    pub fn table(&mut self, rows: &[Vec<String>], x: f32, width: f32) {
        let style = self.layout.table;
        let table = style.layout(rows, width);
        let mut start = 0;
        while start < table.row_heights.len() {
            let mut end = start;
            let mut height = 0.0;
            while end < table.row_heights.len() && self.y() + height + table.row_heights[end] <= self.flow_bottom() {
                height += table.row_heights[end];
                end += 1;
            }
            if end == start {
                if !self.at_page_top() {
                    self.page_break();
                    continue;
                }
                end = start + 1;
            }
            let y = self.y();
            let drawn = self.doc.draw_table(&table.slice(start..end), Point::new(x, y), &style);
            self.move_down(drawn);
            start = end;
        }
    }

    /// 版心宽的单格边框文字框（页眉说明框），高度随内容
    pub fn boxed_text(&mut self, spans: &[Span], align: Align) {
        let mut style = self.layout.table;
        style.align = align;
        let (x, width) = (self.left(), self.content_width());
        let inner = width - 2.0 * style.cell_padding;
        let lines = text_metrics::wrap(spans, inner, style.font_size);
        let height = lines.len() as f32 * style.text_style().line_height() + 2.0 * style.cell_padding;
        let table = TableLayout {
            col_widths: vec![width],
            row_heights: vec![height],
            cells: vec![vec![lines]],
        };
        self.ensure_room(height);
        let y = self.y();
        let drawn = self.doc.draw_table(&table, Point::new(x, y), &style);
        self.move_down(drawn);
    }

    /// 居中粗体标题
    pub fn heading(&mut self, text: &str, style: &TextStyle) {
        self.block(&[Span::bold(text)], style);
    }

    /// 纯文本（指定字重）
    pub fn plain(&mut self, text: &str, weight: FontWeight, style: &TextStyle) {
        let span = Span {
            text: text.to_string(),
            weight,
        };
        self.block(&[span], style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::document::PageSpec;
    use crate::infrastructure::recording_document::{DrawOp, RecordingDocument};

    fn long_text(words: usize) -> String {
        (0..words)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_threshold_constants() {
        let mut doc = RecordingDocument::new(PageSpec::A4);
        let engine = LayoutEngine::new(&mut doc, PageLayout::default());
        assert!((engine.footer_y() - (841.89 - 72.0 - 24.0)).abs() < 1e-3);
        assert!((engine.content_bottom() - (841.89 - 72.0 - 24.0 - 80.0)).abs() < 1e-3);
    }

    #[test]
    fn test_long_text_splits_onto_next_page_above_footer() {
        let mut doc = RecordingDocument::new(PageSpec::A4);
        let mut engine = LayoutEngine::new(&mut doc, PageLayout::default());
        engine.move_down(600.0);
        let style = engine.layout.body;
        engine.flow_text(&[Span::regular(long_text(400))], 72.0, 400.0, &style);
        let last_page = engine.finish();
        let flow_bottom = engine.flow_bottom();
        assert_eq!(last_page, 2);

        for op in &doc.ops {
            if let DrawOp::Text { y, height, align, .. } = op {
                if *align != Align::Center {
                    assert!(y + height <= flow_bottom + 1e-3);
                }
            }
        }
        let footers = doc.footer_numbers(841.89 - 72.0 - 24.0);
        assert_eq!(
            footers,
            vec![(1, "1".to_string()), (2, "2".to_string())]
        );
    }

    #[test]
    fn test_label_stays_with_first_line() {
        let mut doc = RecordingDocument::new(PageSpec::A4);
        let mut engine = LayoutEngine::new(&mut doc, PageLayout::default());
        let bottom = engine.flow_bottom();
        engine.move_down(bottom - 72.0 - 5.0);
        engine.labeled_text(
            &[Span::regular("iv.")],
            72.0,
            28.0,
            &[Span::regular("Name the river on whose banks Harappa was located.")],
            379.0,
            None,
        );
        engine.finish();

        let label = doc.find_text("iv.").cloned();
        let body = doc.find_text("Harappa").cloned();
        match (label, body) {
            (Some(DrawOp::Text { page: lp, y: ly, .. }), Some(DrawOp::Text { page: bp, y: by, .. })) => {
                assert_eq!(lp, 2);
                assert_eq!(lp, bp);
                assert!((ly - by).abs() < 1e-3);
            }
            other => panic!("unexpected ops: {:?}", other),
        }
    }

    #[test]
    fn test_break_if_past_threshold_adds_exactly_one_page() {
        let mut doc = RecordingDocument::new(PageSpec::A4);
        let mut engine = LayoutEngine::new(&mut doc, PageLayout::default());
        let threshold = engine.content_bottom();
        engine.move_down(threshold - 72.0 + 1.0);
        assert!(engine.break_if_past_threshold());
        assert!(!engine.break_if_past_threshold());
        assert!(engine.at_page_top());
        engine.start_new_page();
        assert_eq!(engine.finish(), 2);
    }

    #[test]
    fn test_table_rows_split_across_pages() {
        let mut doc = RecordingDocument::new(PageSpec::A4);
        let mut engine = LayoutEngine::new(&mut doc, PageLayout::default());
        engine.move_down(560.0);
        let rows: Vec<Vec<String>> = (0..6)
            .map(|i| vec![format!("Event {}", i), format!("Year {}", 1850 + i)])
            .collect();
        engine.table(&rows, 100.0, 300.0);
        engine.finish();

        let tables: Vec<(usize, usize)> = doc
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Table { page, rows, .. } => Some((*page, *rows)),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].0, 1);
        assert_eq!(tables[1].0, 2);
        assert_eq!(tables[0].1 + tables[1].1, 6);
    }
}
