//! PDF 文档后端
//!
//! 每页一个内容流，全部页面在内存中生成，`finish` 时一次性输出 PDF 字节

use crate::infrastructure::document::{
    word_offsets, Cursor, DocumentBuilder, PageSpec, Point, TableLayout, TableStyle, TextStyle,
};
use crate::infrastructure::text_metrics::{encode_winansi, FontWeight, Line};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

fn font_name(weight: FontWeight) -> Name<'static> {
    match weight {
        FontWeight::Regular => FONT_REGULAR,
        FontWeight::Bold => FONT_BOLD,
    }
}

/// 基于 pdf-writer 的文档构建器（Helvetica 内置字体）
pub struct PdfDocument {
    spec: PageSpec,
    cursor: Cursor,
    pages: Vec<Content>,
}

impl PdfDocument {
    pub fn new(spec: PageSpec) -> Self {
        Self {
            spec,
            cursor: Cursor::top_of_page(&spec, 1),
            pages: vec![Content::new()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    // 当前页内容流
    fn content(&mut self) -> &mut Content {
        let index = self.cursor.page.saturating_sub(1).min(self.pages.len() - 1);
        &mut self.pages[index]
    }

    // 自上而下坐标转换为 PDF 坐标
    fn pdf_y(&self, y: f32) -> f32 {
        self.spec.height - y
    }

    fn draw_line_at(&mut self, line: &Line, x: f32, top: f32, width: f32, style: &TextStyle) {
        if line.words.is_empty() {
            return;
        }
        let baseline = self.pdf_y(top + style.font_size);
        let offsets = word_offsets(line, width, style);
        let content = self.content();
        content.begin_text();
        let mut previous = (0.0_f32, 0.0_f32);
        for (word, offset) in line.words.iter().zip(offsets) {
            let at = (x + offset, baseline);
            content.next_line(at.0 - previous.0, at.1 - previous.1);
            previous = at;
            for run in &word.runs {
                content
                    .set_font(font_name(run.weight), style.font_size)
                    .show(Str(&encode_winansi(&run.text)));
            }
        }
        content.end_text();
    }

    /// 输出 PDF 字节
    pub fn finish(self) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let regular_id = Ref::new(3);
        let bold_id = Ref::new(4);

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|i| Ref::new(5 + 2 * i as i32)).collect();
        let content_ids: Vec<Ref> = (0..n).map(|i| Ref::new(6 + 2 * i as i32)).collect();

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, self.spec.width, self.spec.height))
                .parent(page_tree_id)
                .contents(content_ids[i]);
            page.resources()
                .fonts()
                .pair(FONT_REGULAR, regular_id)
                .pair(FONT_BOLD, bold_id);
        }

        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for (i, content) in self.pages.into_iter().enumerate() {
            pdf.stream(content_ids[i], &content.finish());
        }

        let bytes = pdf.finish();
        debug!("PDF 输出完成: {} 页, {} 字节", n, bytes.len());
        bytes
    }
}

impl DocumentBuilder for PdfDocument {
    fn page_spec(&self) -> PageSpec {
        self.spec
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn draw_lines(&mut self, lines: &[Line], position: Point, width: f32, style: &TextStyle) -> f32 {
        let lh = style.line_height();
        for (i, line) in lines.iter().enumerate() {
            self.draw_line_at(line, position.x, position.y + i as f32 * lh, width, style);
        }
        lines.len() as f32 * lh
    }

    fn draw_table(&mut self, table: &TableLayout, position: Point, style: &TableStyle) -> f32 {
        let text_style = style.text_style();
        let mut top = position.y;
        for (row, height) in table.cells.iter().zip(&table.row_heights) {
            let mut x = position.x;
            for (cell, col_width) in row.iter().zip(&table.col_widths) {
                let bottom = self.pdf_y(top + height);
                self.content()
                    .set_line_width(style.line_width)
                    .rect(x, bottom, *col_width, *height)
                    .stroke();
                let inner = col_width - 2.0 * style.cell_padding;
                self.draw_lines(
                    cell,
                    Point::new(x + style.cell_padding, top + style.cell_padding),
                    inner,
                    &text_style,
                );
                x += col_width;
            }
            top += height;
        }
        top - position.y
    }

    fn new_page(&mut self) {
        self.pages.push(Content::new());
        self.cursor = Cursor::top_of_page(&self.spec, self.pages.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::text_metrics::Span;

    #[test]
    fn test_output_is_pdf_with_all_pages() {
        let mut doc = PdfDocument::new(PageSpec::A4);
        let style = TextStyle::new(10.0);
        doc.draw_text(&[Span::bold("HISTORY & CIVICS")], Point::new(72.0, 72.0), 451.0, &style);
        doc.new_page();
        doc.draw_text(&[Span::regular("Second page – continued…")], Point::new(72.0, 72.0), 451.0, &style);
        let table = TableStyle::default().layout(&[vec!["a".to_string(), "b".to_string()]], 200.0);
        doc.draw_table(&table, Point::new(72.0, 100.0), &TableStyle::default());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.cursor().page, 2);

        let bytes = doc.finish();
        assert!(bytes.starts_with(b"%PDF"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("Helvetica-Bold"));
    }
}
