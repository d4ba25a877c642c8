//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **加载**：读取模板和题库（按章节范围过滤）
//! 2. **选题**：同步选题流水线，致命错误在此之前全部检出
//! 3. **渲染**：试卷和答案页在两个阻塞任务中并行排版，共享同一份选题结果
//! 4. **写出**：两个文档都在内存中生成完毕后才写文件；第二个写失败时删除第一个
//! 5. **统计**：输出警告和最终统计信息

use crate::config::Config;
use crate::error::{AppError, GenerationWarning, RenderError};
use crate::models::{load_question_bank, load_template};
use crate::orchestrator::paper_generator::{
    render_answer_key_pdf, render_paper_pdf, rng_from_seed, select_paper, shortfall_warnings,
};
use crate::services::warn_writer::WarnWriter;
use crate::utils::logging;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 一次生成的汇总
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub loaded: usize,
    pub selected: usize,
    pub requested: usize,
    pub paper_path: PathBuf,
    pub answer_key_path: PathBuf,
    pub paper_pages: usize,
    pub answer_key_pages: usize,
    pub warnings: Vec<GenerationWarning>,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 运行一次完整生成
    pub async fn run(&self) -> Result<GenerationReport> {
        logging::log_startup(&self.config.template_path, &self.config.question_bank_path);

        let template = load_template(Path::new(&self.config.template_path))
            .await
            .context("加载试卷模板失败")?;
        let candidates = load_question_bank(
            Path::new(&self.config.question_bank_path),
            &self.config.chapter_scope,
        )
        .await
        .context("加载题库失败")?;
        logging::log_candidates_loaded(candidates.len());

        let selection = select_paper(
            &template,
            &candidates,
            &self.config.chapter_scope,
            rng_from_seed(self.config.seed),
        )?;
        logging::log_selection(selection.len(), selection.requested);

        // 两个渲染任务共享只读的模板和选题结果
        let template = Arc::new(template);
        let selection = Arc::new(selection);
        let paper_task = {
            let (template, selection) = (Arc::clone(&template), Arc::clone(&selection));
            tokio::task::spawn_blocking(move || render_paper_pdf(&template, &selection))
        };
        let key_task = {
            let (template, selection) = (Arc::clone(&template), Arc::clone(&selection));
            tokio::task::spawn_blocking(move || render_answer_key_pdf(&template, &selection))
        };
        let paper = paper_task
            .await
            .map_err(|source| RenderError::TaskFailed {
                document: "试卷",
                source,
            })
            .map_err(AppError::from)?;
        let key = key_task
            .await
            .map_err(|source| RenderError::TaskFailed {
                document: "答案页",
                source,
            })
            .map_err(AppError::from)?;

        let stamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let out_dir = PathBuf::from(&self.config.out_dir);
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|e| AppError::file_write_failed(out_dir.display().to_string(), e))?;
        let paper_path = out_dir.join(format!("test_paper_{}.pdf", stamp));
        let answer_key_path = out_dir.join(format!("test_paper_answer_key_{}.pdf", stamp));

        write_pair(&paper_path, &paper.bytes, &answer_key_path, &key.bytes).await?;
        info!("📝 已写入: {}", paper_path.display());
        info!("📝 已写入: {}", answer_key_path.display());

        let mut warnings = shortfall_warnings(&selection);
        warnings.extend(paper.warnings.iter().cloned());
        logging::log_warnings(&warnings);
        if let Some(name) = &self.config.warn_file {
            let writer = WarnWriter::with_path(out_dir.join(name));
            if let Err(e) = writer.write_all(&stamp, &warnings).await {
                warn!("⚠️ 警告文件写入失败: {}", e);
            }
        }

        let report = GenerationReport {
            loaded: candidates.len(),
            selected: selection.len(),
            requested: selection.requested,
            paper_path,
            answer_key_path,
            paper_pages: paper.pages,
            answer_key_pages: key.pages,
            warnings,
        };
        logging::print_final_stats(
            report.loaded,
            report.selected,
            report.warnings.len(),
            &[
                report.paper_path.display().to_string(),
                report.answer_key_path.display().to_string(),
            ],
        );
        Ok(report)
    }
}

// 两个文件要么都写成功，要么都不留下
async fn write_pair(first: &Path, first_bytes: &[u8], second: &Path, second_bytes: &[u8]) -> Result<(), AppError> {
    tokio::fs::write(first, first_bytes)
        .await
        .map_err(|e| AppError::file_write_failed(first.display().to_string(), e))?;
    if let Err(e) = tokio::fs::write(second, second_bytes).await {
        error!("❌ 写入 {} 失败, 删除已写入的 {}", second.display(), first.display());
        let _ = tokio::fs::remove_file(first).await;
        return Err(AppError::file_write_failed(second.display().to_string(), e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_second_write_removes_first() {
        let dir = std::env::temp_dir().join(format!("app_write_pair_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let first = dir.join("paper.pdf");
        // 目标目录不存在，第二次写入必然失败
        let second = dir.join("missing").join("key.pdf");

        let result = write_pair(&first, b"%PDF-1.7", &second, b"%PDF-1.7").await;
        assert!(result.is_err());
        assert!(!first.exists());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
