use crate::error::ConfigError;
use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 试卷模板 TOML 文件
    pub template_path: String,
    /// 内容库导出的题库 JSON 文件
    pub question_bank_path: String,
    /// 输出目录
    pub out_dir: String,
    /// 章节范围（为空表示全部章节）
    pub chapter_scope: Vec<String>,
    /// 随机种子（设置后选题可复现）
    pub seed: Option<u64>,
    /// 警告文件名（写在输出目录下），None 表示不写
    pub warn_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_path: "templates/icse-grade9-history-civics.toml".to_string(),
            question_bank_path: "question_bank.json".to_string(),
            out_dir: "out".to_string(),
            chapter_scope: Vec::new(),
            seed: None,
            warn_file: Some("warn.txt".to_string()),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            template_path: std::env::var("PAPER_TEMPLATE").unwrap_or(default.template_path),
            question_bank_path: std::env::var("QUESTION_BANK").unwrap_or(default.question_bank_path),
            out_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.out_dir),
            chapter_scope: std::env::var("CHAPTER_SCOPE")
                .map(|v| parse_scope(&v))
                .unwrap_or(default.chapter_scope),
            seed: parse_env::<u64>("PAPER_SEED", "u64")?.or(default.seed),
            warn_file: std::env::var("WARN_FILE").ok().or(default.warn_file),
            verbose_logging: parse_env::<bool>("VERBOSE_LOGGING", "bool")?.unwrap_or(default.verbose_logging),
        })
    }
}

/// 逗号分隔的章节列表
pub fn parse_scope(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// 未设置返回 None；设置了但无法解析时报错
fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scope() {
        assert_eq!(
            parse_scope(" ch1-history, ch1-civics ,,"),
            vec!["ch1-history".to_string(), "ch1-civics".to_string()]
        );
        assert!(parse_scope("").is_empty());
    }

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.template_path, "templates/icse-grade9-history-civics.toml");
        assert!(config.seed.is_none());
        assert!(config.chapter_scope.is_empty());
    }
}
