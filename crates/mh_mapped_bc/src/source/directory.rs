// crates/mh_mapped_bc/src/source/directory.rs

//! 目录数据源
//!
//! 目录布局：
//!
//! ```text
//! <root>/points.json            [[x, y, z], ...]
//! <root>/<time>/<table>.json    [v, ...]  或  {"values": [...], "average": v}
//! ```
//!
//! 名称能解析为数字的子目录是采样时刻，只有包含 `<table>.json` 的时刻
//! 才计入该表。标量为 JSON 数字，矢量为 JSON 数组。

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec3;
use mh_foundation::{MhError, MhResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{sort_sample_times, BoundaryDataSource, SampleData, SampleTime};
use crate::value::FieldValue;

/// 源点文件名
pub const POINTS_FILE: &str = "points.json";

/// 采样文件的两种写法
#[derive(Debug, Deserialize)]
#[serde(untagged)]
#[serde(bound = "T: FieldValue")]
enum SampleFile<T: FieldValue> {
    Plain(Vec<T>),
    Full {
        values: Vec<T>,
        #[serde(default)]
        average: Option<T>,
    },
}

impl<T: FieldValue> From<SampleFile<T>> for SampleData<T> {
    fn from(file: SampleFile<T>) -> Self {
        match file {
            SampleFile::Plain(values) => SampleData::new(values),
            SampleFile::Full { values, average } => SampleData { values, average },
        }
    }
}

/// 读取 JSON 文件
fn read_json<D: DeserializeOwned>(path: &Path) -> MhResult<D> {
    if !path.exists() {
        return Err(MhError::file_not_found(path));
    }
    let content = fs::read_to_string(path)
        .map_err(|e| MhError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
    serde_json::from_str(&content).map_err(|e| MhError::parse(path, e.to_string()))
}

/// 写入 JSON 文件
fn write_json<S: Serialize + ?Sized>(path: &Path, value: &S) -> MhResult<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| MhError::parse(path, e.to_string()))?;
    fs::write(path, content)
        .map_err(|e| MhError::io_with_source(format!("写入 {} 失败", path.display()), e))
}

/// 目录数据源
#[derive(Debug, Clone)]
pub struct DirectoryDataSource {
    root: PathBuf,
}

impl DirectoryDataSource {
    /// 以数据根目录创建
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 数据根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 采样文件路径
    pub fn sample_path(&self, table: &str, time: &SampleTime) -> PathBuf {
        self.root.join(&time.name).join(format!("{}.json", table))
    }

    /// 写入源点云
    pub fn write_points(&self, points: &[DVec3]) -> MhResult<()> {
        fs::create_dir_all(&self.root)?;
        write_json(&self.root.join(POINTS_FILE), points)
    }

    /// 写入一个采样；无平均值时写成纯数组
    pub fn write_sample<T: FieldValue>(
        &self,
        table: &str,
        time: &SampleTime,
        data: &SampleData<T>,
    ) -> MhResult<()> {
        fs::create_dir_all(self.root.join(&time.name))?;
        let path = self.sample_path(table, time);
        match data.average {
            None => write_json(&path, &data.values),
            Some(_) => write_json(&path, data),
        }
    }

    /// 所有数字命名的子目录（未排序）
    fn time_dirs(&self) -> MhResult<Vec<SampleTime>> {
        if !self.root.is_dir() {
            return Err(MhError::file_not_found(&self.root));
        }
        let mut times = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.parse::<f64>() {
                Ok(v) if v.is_finite() => times.push(SampleTime::named(v, name)),
                _ => {}
            }
        }
        Ok(times)
    }
}

impl<T: FieldValue> BoundaryDataSource<T> for DirectoryDataSource {
    fn sample_times(&self, table: &str) -> MhResult<Vec<SampleTime>> {
        let times: Vec<SampleTime> = self
            .time_dirs()?
            .into_iter()
            .filter(|t| self.sample_path(table, t).is_file())
            .collect();
        debug!(
            "数据目录 {}: 表 '{}' 共 {} 个采样时刻",
            self.root.display(),
            table,
            times.len()
        );
        sort_sample_times(times)
    }

    fn points(&self) -> MhResult<Vec<DVec3>> {
        read_json(&self.root.join(POINTS_FILE))
    }

    fn load(&self, table: &str, time: &SampleTime) -> MhResult<SampleData<T>> {
        let path = self.sample_path(table, time);
        debug!("加载边界采样 {}", path.display());
        let file: SampleFile<T> = read_json(&path)?;
        Ok(file.into())
    }
}
