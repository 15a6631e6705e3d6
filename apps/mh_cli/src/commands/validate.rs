// apps/mh_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证边界配置文件，并（给定数据目录时）检查边界数据的一致性：
//! 源点数与每个采样的值数一致、`setAverage` 时每个采样都带平均值。

use anyhow::{bail, Result};
use clap::Args;
use glam::DVec3;
use mh_mapped_bc::{
    BoundaryDataSource, DirectoryDataSource, FieldValue, MapMethod, MappedBcConfig,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 边界配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 边界数据目录
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// 场名（配置未给出 fieldTableName 时作为数据表名）
    #[arg(short, long, default_value = "T")]
    pub field: String,

    /// 矢量场（值为 [x, y, z]）
    #[arg(long)]
    pub vector: bool,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MariHydro 边界配置验证 ===");

    if args.config.is_none() && args.data.is_none() {
        println!("用法: mh_cli validate --config <配置文件> [--data <数据目录>] [--field <场名>]");
        println!("      mh_cli validate --data <数据目录> --field <场名>");
        return Ok(());
    }

    let mut result = ValidationResult::default();
    if args.vector {
        validate_all::<DVec3>(&args, &mut result);
    } else {
        validate_all::<f64>(&args, &mut result);
    }

    print_validation_result(&result, args.strict)
}

fn validate_all<T: FieldValue>(args: &ValidateArgs, result: &mut ValidationResult) {
    let config = match &args.config {
        Some(path) => match validate_config::<T>(path, result) {
            Some(c) => c,
            None => return,
        },
        None => MappedBcConfig::default(),
    };

    if let Some(data) = &args.data {
        validate_data(data, config.table_name(&args.field), &config, result);
    }
}

fn validate_config<T: FieldValue>(
    path: &Path,
    result: &mut ValidationResult,
) -> Option<MappedBcConfig<T>> {
    println!("\n检查配置文件: {}", path.display());

    let config = match MappedBcConfig::<T>::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(e.to_string());
            return None;
        }
    };

    if config.perturb == 0.0 && config.map_method == MapMethod::PlanarInterpolation {
        result.add_warning("perturb = 0：规则排列的源点可能无法三角化");
    } else if config.perturb > 1e-2 {
        result.add_warning(format!("perturb = {} 较大，会明显移动源点", config.perturb));
    }

    println!("  ✓ 配置文件有效 (映射={}, setAverage={})", config.map_method, config.set_average);
    Some(config)
}

fn validate_data<T: FieldValue>(
    data: &Path,
    table: &str,
    config: &MappedBcConfig<T>,
    result: &mut ValidationResult,
) {
    println!("\n检查边界数据: {} (表 '{}')", data.display(), table);
    let source = DirectoryDataSource::new(data);

    let points = match BoundaryDataSource::<T>::points(&source) {
        Ok(p) => p,
        Err(e) => {
            result.add_error(e.to_string());
            return;
        }
    };
    let min_points = match config.map_method {
        MapMethod::PlanarInterpolation => 3,
        MapMethod::Nearest => 1,
    };
    if points.len() < min_points {
        result.add_error(format!(
            "{} 映射至少需要 {} 个源点, 实际 {}",
            config.map_method,
            min_points,
            points.len()
        ));
    }

    let times = match BoundaryDataSource::<T>::sample_times(&source, table) {
        Ok(t) => t,
        Err(e) => {
            result.add_error(e.to_string());
            return;
        }
    };
    match times.len() {
        0 => {
            result.add_error(format!("数据表 '{}' 没有任何采样时刻", table));
            return;
        }
        1 => result.add_warning("只有一个采样时刻，边界值不随时间变化"),
        _ => {}
    }

    for time in &times {
        let sample = match BoundaryDataSource::<T>::load(&source, table, time) {
            Ok(s) => s,
            Err(e) => {
                result.add_error(e.to_string());
                continue;
            }
        };
        if sample.values.len() != points.len() {
            result.add_error(format!(
                "时刻 {}: {} 个值, 源点 {} 个",
                time.name,
                sample.values.len(),
                points.len()
            ));
        }
        if config.set_average && sample.average.is_none() {
            result.add_error(format!("时刻 {}: setAverage 需要平均值", time.name));
        }
        if let Some(i) = sample.values.iter().position(|v| !v.is_finite()) {
            result.add_error(format!("时刻 {}: 第 {} 个值不是有限值", time.name, i));
        }
    }

    println!("  ✓ {} 个源点, {} 个采样时刻", points.len(), times.len());
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
