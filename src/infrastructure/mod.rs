//! 基础设施层：文档构建接口及其后端（PDF、记录型），以及文字度量

pub mod document;
pub mod pdf_document;
pub mod recording_document;
pub mod text_metrics;

pub use document::{
    Align, Cursor, DocumentBuilder, PageSpec, Point, TableLayout, TableStyle, TextStyle,
};
pub use pdf_document::PdfDocument;
pub use recording_document::{DrawOp, RecordingDocument};
pub use text_metrics::{FontWeight, Line, Span};
