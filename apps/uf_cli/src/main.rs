// apps/uf_cli/src/main.rs

//! UrbanFlood 命令行界面
//!
//! 不带子命令时等价于 `uf_cli run`：以内置 `york1` 场景读取 `data/york`。

mod commands;
mod pipeline;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// UrbanFlood 城市洪水模拟命令行工具
#[derive(Parser)]
#[command(name = "uf_cli")]
#[command(author = "UrbanFlood Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "UrbanFlood 2D shallow water flood scenarios", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行场景
    Run(commands::run::RunArgs),
    /// 校验场景（建网格、检查边界，不推进）
    Validate(commands::validate::ValidateArgs),
    /// 绘制 .sww 结果
    Plot(commands::plot::PlotArgs),
    /// 显示版本与默认参数
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or_else(|| Commands::Run(Default::default())) {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Plot(args) => commands::plot::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
