use anyhow::Result;
use clap::Parser;
use question_paper_gen::config::{parse_scope, Config};
use question_paper_gen::utils::logging;
use question_paper_gen::App;
use tracing::error;

/// 生成试卷 PDF 及答案页 PDF
#[derive(Parser, Debug)]
#[command(name = "question-paper-gen", version, about)]
struct Cli {
    /// 输出目录
    #[arg(long)]
    out_dir: Option<String>,

    /// 试卷模板 TOML 文件
    #[arg(long)]
    template: Option<String>,

    /// 题库 JSON 文件
    #[arg(long)]
    questions: Option<String>,

    /// 随机种子（设置后选题可复现）
    #[arg(long)]
    seed: Option<u64>,

    /// 章节范围，逗号分隔
    #[arg(long)]
    chapters: Option<String>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    // 命令行参数优先于环境变量
    fn apply(self, mut config: Config) -> Config {
        if let Some(out_dir) = self.out_dir {
            config.out_dir = out_dir;
        }
        if let Some(template) = self.template {
            config.template_path = template;
        }
        if let Some(questions) = self.questions {
            config.question_bank_path = questions;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(chapters) = self.chapters {
            config.chapter_scope = parse_scope(&chapters);
        }
        config.verbose_logging |= self.verbose;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.apply(Config::from_env()?);

    // 初始化日志
    logging::init(config.verbose_logging);

    // 运行一次生成
    if let Err(e) = App::new(config).run().await {
        error!("❌ 生成失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
