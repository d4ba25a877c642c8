use thiserror::Error;

/// 应用程序错误类型
///
/// 所有致命错误都在生成任何文档字节之前被检测出来
#[derive(Debug, Error)]
pub enum AppError {
    /// 模板相关错误
    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),
    /// 候选题库相关错误
    #[error("题库错误: {0}")]
    Pool(#[from] PoolError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 模板错误（MissingTemplateSection）
#[derive(Debug, Error)]
pub enum TemplateError {
    /// 模板中没有任何 section
    #[error("模板没有任何 section")]
    NoSections,
    /// 某个 section 或 subsection 没有声明任何 slot
    #[error("section '{section_id}' 缺少题目槽位定义 ({container})")]
    MissingSlots {
        section_id: String,
        container: String,
    },
    /// 罗马数字编号的 section 必须声明 subsection 或直接 slot
    #[error("section '{section_id}' 的编号方案 '{scheme}' 缺少必需的结构")]
    NumberingStructure {
        section_id: String,
        scheme: &'static str,
    },
    /// 学科比例不合法（必须非负且和为 1）
    #[error("section '{section_id}' 中题型 '{question_type}' 的学科比例不合法: history={history}, civics={civics}")]
    InvalidDisciplineRatio {
        section_id: String,
        question_type: String,
        history: f64,
        civics: f64,
    },
}

/// 候选题库错误
#[derive(Debug, Error)]
pub enum PoolError {
    /// 指定范围内没有任何候选题目（EmptyCandidatePool）
    #[error("范围 [{scope}] 内没有可用的候选题目")]
    EmptyCandidatePool { scope: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 后台渲染任务异常退出
    #[error("渲染任务 '{document}' 执行失败: {source}")]
    TaskFailed {
        document: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 非致命的生成警告
///
/// 生成过程继续，警告随成功结果一起返回给调用方
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationWarning {
    /// 槽位在用尽替代链后仍未选满（InsufficientSlotSupply）
    #[error("槽位供给不足: {section_label} / {question_type} 需要 {requested} 道, 实际选中 {selected} 道")]
    InsufficientSlotSupply {
        section_label: String,
        question_type: String,
        requested: usize,
        selected: usize,
    },
    /// 小题分值既不在题干中也不在评分细则中（UnparsableSubPartMarks）
    #[error("题目 {question_id} 的小题 {sub_part} 无法解析分值, 按 0 分处理")]
    UnparsableSubPartMarks {
        question_id: String,
        sub_part: String,
    },
    /// 题干中的小题分值之和与题目声明分值不一致
    #[error("题目 {question_id} 小题分值之和 {parsed} 与声明分值 {declared} 不一致")]
    SubPartMarksMismatch {
        question_id: String,
        declared: u32,
        parsed: u32,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建空题库错误
    pub fn empty_pool(scope: &[String]) -> Self {
        let scope = if scope.is_empty() {
            "全部章节".to_string()
        } else {
            scope.join(", ")
        };
        AppError::Pool(PoolError::EmptyCandidatePool { scope })
    }

    /// 是否为致命的模板错误
    pub fn is_template_error(&self) -> bool {
        matches!(self, AppError::Template(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
