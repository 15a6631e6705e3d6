// apps/mh_cli/src/commands/run.rs

//! 运行命令
//!
//! 以固定时间步驱动标量场的时变映射入流/出流边界，输出每个面的值与
//! 值分数（CSV），可选写出续算状态。
//!
//! 面文件格式：
//!
//! ```text
//! {"centres": [[x, y, z], ...], "areas": [a, ...]}
//! ```
//!
//! `areas` 可省略（全部取 1）。

use anyhow::{bail, Context, Result};
use clap::Args;
use glam::DVec3;
use mh_mapped_bc::{
    DirectoryDataSource, MappedBcConfig, PatchGeometry, RestartState, TimeVaryingMappedInletOutlet,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 边界数据目录
    #[arg(short, long)]
    pub data: PathBuf,

    /// 面几何文件 (JSON)
    #[arg(long)]
    pub faces: PathBuf,

    /// 场名
    #[arg(short, long, default_value = "T")]
    pub field: String,

    /// 边界配置文件 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 起始时间 [s]
    #[arg(long, default_value = "0.0")]
    pub start: f64,

    /// 结束时间 [s]
    #[arg(long)]
    pub end: f64,

    /// 时间步长 [s]
    #[arg(long)]
    pub dt: f64,

    /// 所有面的通量（出流为正）
    #[arg(long, default_value = "-1.0", allow_hyphen_values = true)]
    pub flux: f64,

    /// 输出 CSV 文件
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 从续算状态恢复 (JSON)
    #[arg(long)]
    pub restart: Option<PathBuf>,

    /// 结束时写出续算状态 (JSON)
    #[arg(long)]
    pub state: Option<PathBuf>,
}

/// 面几何文件
#[derive(Debug, Deserialize)]
pub struct FacesFile {
    /// 面中心
    pub centres: Vec<DVec3>,
    /// 面积
    #[serde(default)]
    pub areas: Option<Vec<f64>>,
}

impl FacesFile {
    /// 从 JSON 文件读取
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取面文件: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("面文件解析错误: {}", path.display()))
    }

    /// 转为面几何
    pub fn into_geometry(self) -> Result<PatchGeometry> {
        let areas = self.areas.unwrap_or_else(|| vec![1.0; self.centres.len()]);
        Ok(PatchGeometry::new(self.centres, areas)?)
    }
}

/// 单次运行允许的最大时间步数
const MAX_TIME_STEPS: usize = 1_000_000;

/// 时间步序列 start, start+dt, ..., 不超过 end
pub fn time_steps(start: f64, end: f64, dt: f64) -> Result<Vec<f64>> {
    if !(dt > 0.0) || !dt.is_finite() {
        bail!("时间步长必须为正: {}", dt);
    }
    if !(end >= start) {
        bail!("结束时间 {} 早于起始时间 {}", end, start);
    }
    let n = ((end - start) / dt + 1e-9).floor();
    if !(n < MAX_TIME_STEPS as f64) {
        bail!(
            "时间步数 {} 超过上限 {}，请增大 --dt 或缩短时间范围",
            n,
            MAX_TIME_STEPS
        );
    }
    let n = n as usize;
    Ok((0..=n).map(|k| start + k as f64 * dt).collect())
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MariHydro 时变映射边界 ===");

    let config = match &args.config {
        Some(path) => MappedBcConfig::<f64>::from_file(path)
            .with_context(|| format!("配置加载失败: {}", path.display()))?,
        None => MappedBcConfig::default(),
    };
    let geometry = FacesFile::load(&args.faces)?.into_geometry()?;
    let n_faces = geometry.n_faces();
    let source = DirectoryDataSource::new(&args.data);

    let mut bc = TimeVaryingMappedInletOutlet::new(args.field.as_str(), config, source, geometry)
        .context("构建边界失败")?;
    info!(
        "数据表 '{}': {} 个采样时刻, {} 个面",
        bc.table_name(),
        bc.sample_times().len(),
        n_faces
    );

    if let Some(path) = &args.restart {
        let state = RestartState::<f64>::from_file(path)
            .with_context(|| format!("续算状态读取失败: {}", path.display()))?;
        bc.restore(state).context("续算状态恢复失败")?;
    }

    let steps = time_steps(args.start, args.end, args.dt)?;
    let flux = vec![args.flux; n_faces];

    let mut writer: Option<BufWriter<File>> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("无法创建输出文件: {}", path.display()))?;
            let mut w = BufWriter::new(file);
            writeln!(w, "time,face,value,value_fraction")?;
            Some(w)
        }
        None => None,
    };

    let started = Instant::now();
    let mut notices = 0usize;
    for &t in &steps {
        let eval = bc
            .update_and_evaluate(t, &flux)
            .with_context(|| format!("t={} 评估失败", t))?;
        if let Some(notice) = eval.notice {
            notices += 1;
            if notices == 1 {
                warn!("{}", notice);
            }
        }

        match writer.as_mut() {
            Some(w) => {
                for (face, (v, f)) in eval.values.iter().zip(&eval.value_fraction).enumerate() {
                    writeln!(w, "{},{},{},{}", t, face, v, f)?;
                }
            }
            None => {
                let mean = eval.values.iter().sum::<f64>() / n_faces.max(1) as f64;
                info!("t={:.4}: 面值均值={:.6}", t, mean);
            }
        }
    }

    if let Some(mut w) = writer {
        w.flush()?;
    }

    if let Some(path) = &args.state {
        match bc.restart_state() {
            Some(state) => state
                .save_to_file(path)
                .with_context(|| format!("续算状态写出失败: {}", path.display()))?,
            None => warn!("没有可写出的续算状态"),
        }
    }

    info!("=== 完成 ===");
    info!("时间步数: {}", steps.len());
    info!("越界时间步: {}", notices);
    info!("计算时间: {:.3} s", started.elapsed().as_secs_f64());

    Ok(())
}
