/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::GenerationWarning;

/// 初始化日志（RUST_LOG 优先，否则默认 info，verbose 时为 debug）
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "question_paper_gen=debug"
    } else {
        "question_paper_gen=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(template: &str, question_bank: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷生成模式");
    info!("📄 模板: {}", template);
    info!("📚 题库: {}", question_bank);
    info!("{}", "=".repeat(60));
}

/// 记录候选题目加载信息
pub fn log_candidates_loaded(total: usize) {
    info!("✓ 已加载 {} 道候选题目", total);
}

/// 记录选题信息
pub fn log_selection(selected: usize, requested: usize) {
    info!("✓ 已选中 {} 道题目 (模板请求 {} 道)", selected, requested);
    if selected < requested {
        warn!("⚠️ 有 {} 道题目未能选出", requested - selected);
    }
}

/// 逐条输出非致命警告
pub fn log_warnings(warnings: &[GenerationWarning]) {
    for w in warnings {
        warn!("⚠️ {}", w);
    }
}

/// 打印最终统计信息
pub fn print_final_stats(loaded: usize, selected: usize, warnings: usize, outputs: &[String]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 试卷生成完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📚 候选题目: {}", loaded);
    info!("✅ 选中题目: {}", selected);
    info!("⚠️ 警告: {}", warnings);
    for path in outputs {
        info!("📝 已写入: {}", path);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本
///
/// 按字符计数，超过 `max_len` 时截断并追加 "..."
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
