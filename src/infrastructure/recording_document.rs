//! 记录型文档后端
//!
//! 不生成任何字节，只记录每次绘制调用，供排版测试断言位置、页码和顺序

use crate::infrastructure::document::{
    Align, Cursor, DocumentBuilder, PageSpec, Point, TableLayout, TableStyle, TextStyle,
};
use crate::infrastructure::text_metrics::Line;

/// 一次绘制调用
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        lines: Vec<String>,
        bold: bool,
        align: Align,
        height: f32,
    },
    Table {
        page: usize,
        x: f32,
        y: f32,
        rows: usize,
        height: f32,
    },
    NewPage {
        page: usize,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Text { page, .. } | DrawOp::Table { page, .. } | DrawOp::NewPage { page } => *page,
        }
    }
}

/// 记录所有绘制调用的文档构建器
#[derive(Debug, Clone)]
pub struct RecordingDocument {
    spec: PageSpec,
    cursor: Cursor,
    pub ops: Vec<DrawOp>,
}

impl RecordingDocument {
    pub fn new(spec: PageSpec) -> Self {
        Self {
            spec,
            cursor: Cursor::top_of_page(&spec, 1),
            ops: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.cursor.page
    }

    /// 所有文字调用（页码, y, 文本）
    pub fn texts(&self) -> impl Iterator<Item = (usize, f32, String)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { page, y, lines, .. } => Some((*page, *y, lines.join("\n"))),
            _ => None,
        })
    }

    /// 第一个包含 `needle` 的文字调用
    pub fn find_text(&self, needle: &str) -> Option<&DrawOp> {
        self.ops.iter().find(|op| match op {
            DrawOp::Text { lines, .. } => lines.iter().any(|l| l.contains(needle)),
            _ => false,
        })
    }

    /// 每页页脚上的页码（按出现顺序）
    pub fn footer_numbers(&self, footer_y: f32) -> Vec<(usize, String)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    page,
                    y,
                    lines,
                    align: Align::Center,
                    ..
                } if (*y - footer_y).abs() < 0.01 => Some((*page, lines.join(" "))),
                _ => None,
            })
            .collect()
    }
}

impl DocumentBuilder for RecordingDocument {
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
        let height = lines.len() as f32 * style.line_height();
        self.ops.push(DrawOp::Text {
            page: self.cursor.page,
            x: position.x,
            y: position.y,
            width,
            lines: lines.iter().map(Line::text).collect(),
            bold: lines.iter().any(Line::is_bold),
            align: style.align,
            height,
        });
        height
    }

    fn draw_table(&mut self, table: &TableLayout, position: Point, _style: &TableStyle) -> f32 {
        let height = table.height();
        self.ops.push(DrawOp::Table {
            page: self.cursor.page,
            x: position.x,
            y: position.y,
            rows: table.row_heights.len(),
            height,
        });
        height
    }

    fn new_page(&mut self) {
        let page = self.cursor.page + 1;
        self.ops.push(DrawOp::NewPage { page });
        self.cursor = Cursor::top_of_page(&self.spec, page);
    }
}
