use crate::error::{AppError, AppResult, FileError};
use crate::models::discipline::Discipline;
use crate::models::question::CandidateQuestion;
use std::path::Path;
use tokio::fs;
use tracing::warn;

/// 从内容库导出的 JSON 文件加载候选题目
///
/// `chapter_scope` 为空时加载全部题目，否则只保留属于这些章节的题目
pub async fn load_question_bank(
    bank_path: &Path,
    chapter_scope: &[String],
) -> AppResult<Vec<CandidateQuestion>> {
    if !bank_path.exists() {
        return Err(FileError::NotFound {
            path: bank_path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(bank_path)
        .await
        .map_err(|e| AppError::file_read_failed(bank_path.display().to_string(), e))?;

    let questions = parse_question_bank(&content, &bank_path.display().to_string())?;
    let total = questions.len();
    let scoped = filter_by_scope(questions, chapter_scope);

    tracing::info!(
        "正在加载题库: {} (共 {} 道, 范围内 {} 道)",
        bank_path.file_name().unwrap_or_default().to_string_lossy(),
        total,
        scoped.len()
    );

    Ok(scoped)
}

/// 解析题库 JSON（题目数组）
///
/// 学科不属于历史/公民的记录直接跳过（记一条警告），不影响其余题目
pub fn parse_question_bank(content: &str, origin: &str) -> AppResult<Vec<CandidateQuestion>> {
    let json_error = |source: serde_json::Error| -> AppError {
        FileError::JsonParseFailed {
            path: origin.to_string(),
            source,
        }
        .into()
    };

    let rows: Vec<serde_json::Value> = serde_json::from_str(content).map_err(json_error)?;
    let mut questions = Vec::with_capacity(rows.len());
    for mut row in rows {
        let discipline = row
            .get("discipline")
            .and_then(serde_json::Value::as_str)
            .map(str::parse::<Discipline>);
        match discipline {
            Some(Ok(discipline)) => {
                row["discipline"] = serde_json::Value::from(discipline.name());
            }
            Some(Err(e)) => {
                warn!("⚠️ 跳过题目 {}: {}", row_id(&row), e);
                continue;
            }
            // 缺少学科字段交给反序列化报错
            None => {}
        }
        questions.push(serde_json::from_value(row).map_err(json_error)?);
    }
    Ok(questions)
}

fn row_id(row: &serde_json::Value) -> String {
    match row.get("id") {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<无 id>".to_string(),
    }
}

/// 按章节范围过滤
pub fn filter_by_scope(
    questions: Vec<CandidateQuestion>,
    chapter_scope: &[String],
) -> Vec<CandidateQuestion> {
    if chapter_scope.is_empty() {
        return questions;
    }
    questions
        .into_iter()
        .filter(|q| {
            q.chapter_id
                .as_ref()
                .is_some_and(|c| chapter_scope.iter().any(|s| s == c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/question_bank.json")
    }

    #[test]
    fn test_load_fixture_bank() {
        let questions = tokio_test::block_on(load_question_bank(&fixture_path(), &[])).unwrap();
        assert!(!questions.is_empty());
        assert!(questions.iter().any(|q| q.discipline == Discipline::Civics));
        let essay = questions
            .iter()
            .find(|q| q.question_type == "structured_essay")
            .unwrap();
        assert!(essay.rubric.is_some());
    }

    #[test]
    fn test_scope_filters_by_chapter() {
        let all = tokio_test::block_on(load_question_bank(&fixture_path(), &[])).unwrap();
        let scoped = tokio_test::block_on(load_question_bank(
            &fixture_path(),
            &["ch1-civics".to_string()],
        ))
        .unwrap();
        assert!(scoped.len() < all.len());
        assert!(scoped
            .iter()
            .all(|q| q.chapter_id.as_deref() == Some("ch1-civics")));
    }

    #[test]
    fn test_bad_json_is_file_error() {
        let err = parse_question_bank("{not json", "inline").unwrap_err();
        assert!(matches!(err, AppError::File(FileError::JsonParseFailed { .. })));
    }

    #[test]
    fn test_foreign_discipline_is_skipped() {
        let content = r#"[
            {"id": "g1", "chapter_id": "ch3-geo", "question_text": "Name a river.", "question_type": "short_answer", "discipline": "geography", "difficulty_level": 1, "marks": 2},
            {"id": "h1", "chapter_id": "ch1-history", "question_text": "Who built it?", "question_type": "short_answer", "discipline": "History", "difficulty_level": "easy", "marks": 2}
        ]"#;
        let questions = parse_question_bank(content, "inline").unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "h1");
        assert_eq!(questions[0].discipline, Discipline::History);

        let scoped = filter_by_scope(questions, &["ch1-history".to_string()]);
        assert_eq!(scoped.len(), 1);
    }
}
