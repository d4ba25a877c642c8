use crate::error::{AppError, AppResult, FileError};
use crate::models::template::PaperTemplate;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载试卷模板
pub async fn load_template(template_path: &Path) -> AppResult<PaperTemplate> {
    if !template_path.exists() {
        return Err(FileError::NotFound {
            path: template_path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(template_path)
        .await
        .map_err(|e| AppError::file_read_failed(template_path.display().to_string(), e))?;

    let template = parse_template(&content, &template_path.display().to_string())?;

    tracing::info!(
        "正在加载模板: {} ({} 个 section)",
        template_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        template.sections.len()
    );

    Ok(template)
}

/// 解析模板文本，`origin` 只用于错误信息
pub fn parse_template(content: &str, origin: &str) -> AppResult<PaperTemplate> {
    let template: PaperTemplate =
        toml::from_str(content).map_err(|source| FileError::TomlParseFailed {
            path: origin.to_string(),
            source,
        })?;
    Ok(template)
}
