// apps/mh_cli/src/main.rs

//! MariHydro 时变映射边界命令行工具
//!
//! 读取 `<data>/points.json` + `<data>/<time>/<table>.json` 形式的边界数据，
//! 检查、列出或按时间步驱动时变映射入流/出流边界。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**，只通过 `mh_mapped_bc` 的公开接口工作。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// MariHydro 时变映射边界命令行工具
#[derive(Parser)]
#[command(name = "mh_cli")]
#[command(author = "MariHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MariHydro time-varying mapped inlet/outlet boundary tool", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 按时间步驱动边界并输出面值
    Run(commands::run::RunArgs),
    /// 显示边界数据信息
    Info(commands::info::InfoArgs),
    /// 验证配置与边界数据
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
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

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
