//! # Question Paper Gen
//!
//! 根据试卷模板从题库中抽题，生成试卷 PDF 和对应的答案页 PDF
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 文档后端抽象和字体度量
//! - `DocumentBuilder` - 光标、文字、表格、分页能力
//! - `PdfDocument` - 基于 pdf-writer 的 PDF 后端
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `QuestionPools` - 按（题型, 学科）分池
//! - `SlotSelector` - 槽位选题（学科比例 + 替代题型 + 全局去重）
//! - `assemble` - 分区组装和题号分配
//! - `subpart_parser` / `content_classifier` - 题干结构识别
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `LayoutEngine` - 分页、页脚、保持标签与首行同页
//! - `PaperRenderer` - 试卷排版
//! - `AnswerKeyRenderer` - 答案页排版
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/paper_generator` - 单次生成流水线
//! - `orchestrator/app` - 加载、并行渲染、写文件、统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, GenerationWarning};
pub use infrastructure::{DocumentBuilder, PdfDocument, RecordingDocument};
pub use models::{CandidateQuestion, Discipline, PaperTemplate, SelectedQuestion, SelectionResult};
pub use orchestrator::{select_paper, App, GenerationReport};
pub use workflow::{AnswerKeyRenderer, PaperRenderer};
