//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `paper_generator` - 单次生成流水线
//! - 校验模板、构建题目池、槽位选题、分区组装
//! - 把同一份选题结果分别渲染为试卷和答案页
//!
//! ### `app` - 应用生命周期
//! - 加载模板和题库
//! - 两个文档并行渲染，成对写出
//! - 警告文件和最终统计
//!
//! ## 层次关系
//!
//! ```text
//! app (加载 / 写文件 / 统计)
//!     ↓
//! paper_generator (选题 + 渲染)
//!     ↓
//! workflow (PaperRenderer / AnswerKeyRenderer / LayoutEngine)
//!     ↓
//! services (pool_builder / slot_selector / section_assembler / subpart_parser / content_classifier)
//!     ↓
//! infrastructure (DocumentBuilder / PdfDocument / text_metrics)
//! ```

pub mod app;
pub mod paper_generator;

// 重新导出主要类型
pub use app::{App, GenerationReport};
pub use paper_generator::{
    render_answer_key_pdf, render_paper_pdf, rng_from_seed, select_paper, shortfall_warnings, RenderedDocument,
};
