// apps/mh_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出边界数据目录中某个数据表的采样时刻与源点数，以及默认配置。

use anyhow::{Context, Result};
use clap::Args;
use mh_mapped_bc::{BoundaryDataSource, DirectoryDataSource, MappedBcConfig};
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 边界数据目录
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// 场名（数据表名）
    #[arg(short, long, default_value = "T")]
    pub field: String,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== MariHydro 边界数据信息 ===");

    if let Some(data) = &args.data {
        print_data_info(data, &args.field)?;
    }

    if args.defaults || args.data.is_none() {
        if args.data.is_some() {
            println!();
        }
        print_default_config()?;
    }

    Ok(())
}

fn print_data_info(data: &PathBuf, field: &str) -> Result<()> {
    let source = DirectoryDataSource::new(data);
    // 采样时刻与源点不依赖值类型
    let times = BoundaryDataSource::<f64>::sample_times(&source, field)
        .with_context(|| format!("无法枚举采样时刻: {}", data.display()))?;
    let points = BoundaryDataSource::<f64>::points(&source)
        .with_context(|| format!("无法读取源点: {}", data.display()))?;

    println!("=== 边界数据 ===");
    println!("目录: {}", data.display());
    println!("数据表: {}", field);
    println!("源点数: {}", points.len());
    println!("采样时刻数: {}", times.len());
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        println!("时间范围: {} .. {}", first.value, last.value);
    }
    for t in &times {
        println!("  - {}", t.name);
    }
    Ok(())
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = MappedBcConfig::<f64>::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
