//! 文档构建接口
//!
//! 排版引擎只通过 `DocumentBuilder` 操作文档：画文字、画表格、换页，
//! 以及读写游标。坐标原点在页面左上角，y 向下增长。

use crate::infrastructure::text_metrics::{self, FontWeight, Line, Span};

/// A4 页面及页边距
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSpec {
    pub const A4: PageSpec = PageSpec {
        width: 595.28,
        height: 841.89,
        margin: 72.0,
    };

    /// 版心宽度
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::A4
    }
}

/// 渲染游标：当前位置和页码（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
    pub page: usize,
}

impl Cursor {
    /// 页面左上角版心起点
    pub fn top_of_page(spec: &PageSpec, page: usize) -> Self {
        Self {
            x: spec.margin,
            y: spec.margin,
            page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// 两端对齐（段落最后一行左对齐）
    Justify,
}

/// 文字样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub align: Align,
    pub line_gap: f32,
}

impl TextStyle {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            align: Align::Left,
            line_gap: 2.0,
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn line_height(&self) -> f32 {
        text_metrics::line_height(self.font_size, self.line_gap)
    }
}

/// 表格样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub line_gap: f32,
    pub cell_padding: f32,
    /// 固定行高（约 2.5 行文字）；None 时按内容自适应
    pub fixed_row_lines: Option<f32>,
    pub align: Align,
    pub line_width: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 9.0,
            line_gap: 2.0,
            cell_padding: 4.0,
            fixed_row_lines: Some(2.5),
            align: Align::Left,
            line_width: 0.5,
        }
    }
}

impl TableStyle {
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: self.font_size,
            align: self.align,
            line_gap: self.line_gap,
        }
    }

    /// 计算表格几何：等宽列、每格断行结果、每行高度
    ///
    /// 固定行高放不下内容时该行按内容增高
    pub fn layout(&self, rows: &[Vec<String>], width: f32) -> TableLayout {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let col_width = width / columns as f32;
        let inner = (col_width - 2.0 * self.cell_padding).max(1.0);
        let lh = self.text_style().line_height();

        let cells: Vec<Vec<Vec<Line>>> = rows
            .iter()
            .map(|row| {
                (0..columns)
                    .map(|c| {
                        let text = row.get(c).map(String::as_str).unwrap_or("");
                        text_metrics::wrap_plain(text, FontWeight::Regular, inner, self.font_size)
                    })
                    .collect()
            })
            .collect();

        let row_heights = cells
            .iter()
            .map(|row| {
                let needed = row.iter().map(Vec::len).max().unwrap_or(0) as f32 * lh + 2.0 * self.cell_padding;
                match self.fixed_row_lines {
                    Some(lines) => needed.max(lines * lh + 2.0 * self.cell_padding),
                    None => needed.max(lh + 2.0 * self.cell_padding),
                }
            })
            .collect();

        TableLayout {
            col_widths: vec![col_width; columns],
            row_heights,
            cells,
        }
    }
}

/// 表格几何
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub col_widths: Vec<f32>,
    pub row_heights: Vec<f32>,
    pub cells: Vec<Vec<Vec<Line>>>,
}

impl TableLayout {
    pub fn height(&self) -> f32 {
        self.row_heights.iter().sum()
    }

    /// 取部分行（跨页拆分表格时使用）
    pub fn slice(&self, range: std::ops::Range<usize>) -> TableLayout {
        TableLayout {
            col_widths: self.col_widths.clone(),
            row_heights: self.row_heights[range.clone()].to_vec(),
            cells: self.cells[range].to_vec(),
        }
    }
}

/// 行内每个单词的起始 x（相对行首）
///
/// 两端对齐只拉伸非段落末行；居中和右对齐整体平移
pub fn word_offsets(line: &Line, width: f32, style: &TextStyle) -> Vec<f32> {
    let space = text_metrics::space_width(style.font_size);
    let gaps = line.words.len().saturating_sub(1);
    let (start, extra) = match style.align {
        Align::Left => (0.0, 0.0),
        Align::Center => (((width - line.width) / 2.0).max(0.0), 0.0),
        Align::Right => ((width - line.width).max(0.0), 0.0),
        Align::Justify if !line.ends_paragraph && gaps > 0 => (0.0, ((width - line.width) / gaps as f32).max(0.0)),
        Align::Justify => (0.0, 0.0),
    };
    let mut x = start;
    line.words
        .iter()
        .map(|w| {
            let at = x;
            x += w.width + space + extra;
            at
        })
        .collect()
}

/// 文档构建器
///
/// 游标由构建器持有，只由排版引擎修改
pub trait DocumentBuilder {
    fn page_spec(&self) -> PageSpec;

    fn cursor(&self) -> Cursor;

    fn cursor_mut(&mut self) -> &mut Cursor;

    /// 从 `position`（首行顶部）开始画已断好的行，返回占用高度
    fn draw_lines(&mut self, lines: &[Line], position: Point, width: f32, style: &TextStyle) -> f32;

    /// 断行后画文字，返回占用高度
    fn draw_text(&mut self, content: &[Span], position: Point, width: f32, style: &TextStyle) -> f32 {
        let lines = text_metrics::wrap(content, width, style.font_size);
        self.draw_lines(&lines, position, width, style)
    }

    /// 画带边框的表格，返回占用高度
    fn draw_table(&mut self, table: &TableLayout, position: Point, style: &TableStyle) -> f32;

    /// 开始新页，游标回到新页版心左上角
    fn new_page(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_row_height_is_two_and_a_half_lines() {
        let style = TableStyle::default();
        let rows = vec![
            vec!["Feature".to_string(), "Description".to_string()],
            vec!["Sovereign".to_string(), "Free from external control".to_string()],
        ];
        let layout = style.layout(&rows, 400.0);
        let lh = style.text_style().line_height();
        assert_eq!(layout.col_widths.len(), 2);
        assert!((layout.row_heights[0] - (2.5 * lh + 8.0)).abs() < 1e-4);
        assert!((layout.height() - 2.0 * (2.5 * lh + 8.0)).abs() < 1e-3);
    }

    #[test]
    fn test_justify_stretches_all_but_last_line() {
        let style = TextStyle::new(10.0).with_align(Align::Justify);
        let lines = text_metrics::wrap_plain(
            "Answers to this paper must be written on the paper provided separately.",
            FontWeight::Regular,
            120.0,
            10.0,
        );
        let first = &lines[0];
        let offsets = word_offsets(first, 120.0, &style);
        let last_word = first.words.last().map(|w| w.width).unwrap_or(0.0);
        let end = offsets.last().copied().unwrap_or(0.0) + last_word;
        assert!((end - 120.0).abs() < 1e-3);

        let tail = lines.last().unwrap();
        let offsets = word_offsets(tail, 120.0, &style);
        assert_eq!(offsets[0], 0.0);
        let end = offsets.last().copied().unwrap_or(0.0) + tail.words.last().map(|w| w.width).unwrap_or(0.0);
        assert!((end - tail.width).abs() < 1e-3);
    }

    #[test]
    fn test_right_align_offsets() {
        let style = TextStyle::new(10.0).with_align(Align::Right);
        let lines = text_metrics::wrap_plain("[16]", FontWeight::Regular, 44.0, 10.0);
        let offsets = word_offsets(&lines[0], 44.0, &style);
        assert!((offsets[0] + lines[0].width - 44.0).abs() < 1e-4);
    }
}
