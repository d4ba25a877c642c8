//! 警告写入服务 - 业务能力层
//!
//! 只负责"写警告文件"能力，不关心流程

use crate::error::GenerationWarning;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 警告写入服务
///
/// 职责：
/// - 把一次生成中的非致命警告追加到警告文件
/// - 每条警告一行，带生成时间戳
/// - 没有警告时不创建文件
pub struct WarnWriter {
    warn_file_path: PathBuf,
}

impl WarnWriter {
    /// 使用指定文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入警告信息
    ///
    /// # 参数
    /// - `run_stamp`: 本次生成的时间戳
    /// - `warnings`: 本次生成的全部警告
    ///
    /// # 返回
    /// 写入的条数
    pub async fn write_all(&self, run_stamp: &str, warnings: &[GenerationWarning]) -> Result<usize> {
        if warnings.is_empty() {
            return Ok(0);
        }
        debug!(
            "写入 {} 条警告到 {}",
            warnings.len(),
            self.warn_file_path.display()
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path.display()))?;

        let mut content = String::new();
        for warning in warnings {
            content.push_str(&format_line(run_stamp, warning));
        }
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(warnings.len())
    }
}

fn format_line(run_stamp: &str, warning: &GenerationWarning) -> String {
    format!("生成 {} | {}\n", run_stamp, warning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_one_line_per_warning() {
        let dir = std::env::temp_dir().join(format!("warn_writer_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("warn.txt");
        let _ = std::fs::remove_file(&path);

        let writer = WarnWriter::with_path(&path);
        let warnings = vec![
            GenerationWarning::UnparsableSubPartMarks {
                question_id: "q1".to_string(),
                sub_part: "(ii)".to_string(),
            },
            GenerationWarning::InsufficientSlotSupply {
                section_label: "Question 1".to_string(),
                question_type: "mcq_logic_table".to_string(),
                requested: 2,
                selected: 1,
            },
        ];
        let written = tokio_test::block_on(writer.write_all("2026-01-01T00-00-00", &warnings)).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("q1"));
        assert!(content.contains("mcq_logic_table"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_warnings_creates_no_file() {
        let path = std::env::temp_dir().join(format!("warn_writer_empty_{}.txt", std::process::id()));
        let writer = WarnWriter::with_path(&path);
        let written = tokio_test::block_on(writer.write_all("stamp", &[])).unwrap();
        assert_eq!(written, 0);
        assert!(!path.exists());
    }
}
