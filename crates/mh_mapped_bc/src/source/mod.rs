// crates/mh_mapped_bc/src/source/mod.rs

//! 边界数据源
//!
//! 数据源负责枚举采样时刻、提供静态源点云并按需加载某一时刻的采样值。
//! 提供者只通过 [`BoundaryDataSource`] 访问数据，不关心存储格式。
//!
//! 内置实现：
//! - [`MemoryDataSource`]: 内存数据，用于测试和嵌入
//! - [`DirectoryDataSource`]: `<root>/points.json` + `<root>/<time>/<table>.json`

pub mod directory;

use std::collections::BTreeMap;

use glam::DVec3;
use mh_foundation::{MhError, MhResult};
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

pub use directory::DirectoryDataSource;

/// 采样时刻
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTime {
    /// 时间值 [s]
    pub value: f64,
    /// 时刻名称（目录名）
    pub name: String,
}

impl SampleTime {
    /// 由时间值创建，名称取其最短十进制表示
    pub fn new(value: f64) -> Self {
        Self {
            value,
            name: format!("{}", value),
        }
    }

    /// 指定名称
    pub fn named(value: f64, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
        }
    }
}

/// 单个采样时刻的数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: FieldValue")]
pub struct SampleData<T: FieldValue> {
    /// 每个源点的值
    pub values: Vec<T>,
    /// 可选的目标平均值
    #[serde(default)]
    pub average: Option<T>,
}

impl<T: FieldValue> SampleData<T> {
    /// 不带平均值
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            average: None,
        }
    }

    /// 带平均值
    pub fn with_average(values: Vec<T>, average: T) -> Self {
        Self {
            values,
            average: Some(average),
        }
    }
}

/// 边界数据源
pub trait BoundaryDataSource<T: FieldValue> {
    /// 数据表的全部采样时刻（按时间升序）
    fn sample_times(&self, table: &str) -> MhResult<Vec<SampleTime>>;

    /// 源点云（所有时刻共用）
    fn points(&self) -> MhResult<Vec<DVec3>>;

    /// 加载某一时刻的采样
    fn load(&self, table: &str, time: &SampleTime) -> MhResult<SampleData<T>>;
}

impl<T: FieldValue, S: BoundaryDataSource<T> + ?Sized> BoundaryDataSource<T> for &S {
    fn sample_times(&self, table: &str) -> MhResult<Vec<SampleTime>> {
        (**self).sample_times(table)
    }

    fn points(&self) -> MhResult<Vec<DVec3>> {
        (**self).points()
    }

    fn load(&self, table: &str, time: &SampleTime) -> MhResult<SampleData<T>> {
        (**self).load(table, time)
    }
}

/// 按时间值排序，重复时刻报错
pub(crate) fn sort_sample_times(mut times: Vec<SampleTime>) -> MhResult<Vec<SampleTime>> {
    times.sort_by(|a, b| a.value.total_cmp(&b.value));
    if let Some(w) = times.windows(2).find(|w| w[0].value == w[1].value) {
        return Err(MhError::invalid_input(format!(
            "重复的采样时刻: '{}' 与 '{}'",
            w[0].name, w[1].name
        )));
    }
    Ok(times)
}

// ============================================================
// 内存数据源
// ============================================================

/// 内存数据源
#[derive(Debug, Clone)]
pub struct MemoryDataSource<T: FieldValue> {
    points: Vec<DVec3>,
    tables: BTreeMap<String, Vec<(SampleTime, SampleData<T>)>>,
}

impl<T: FieldValue> MemoryDataSource<T> {
    /// 以源点云创建空数据源
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            tables: BTreeMap::new(),
        }
    }

    /// 添加采样（构建器风格）
    pub fn with_sample(mut self, table: &str, time: f64, data: SampleData<T>) -> Self {
        self.insert(table, time, data);
        self
    }

    /// 添加或替换采样
    pub fn insert(&mut self, table: &str, time: f64, data: SampleData<T>) {
        let samples = self.tables.entry(table.to_string()).or_default();
        samples.retain(|(t, _)| t.value != time);
        samples.push((SampleTime::new(time), data));
        samples.sort_by(|a, b| a.0.value.total_cmp(&b.0.value));
    }

    /// 替换源点云
    pub fn set_points(&mut self, points: Vec<DVec3>) {
        self.points = points;
    }
}

impl<T: FieldValue> BoundaryDataSource<T> for MemoryDataSource<T> {
    fn sample_times(&self, table: &str) -> MhResult<Vec<SampleTime>> {
        Ok(self
            .tables
            .get(table)
            .map(|s| s.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default())
    }

    fn points(&self) -> MhResult<Vec<DVec3>> {
        Ok(self.points.clone())
    }

    fn load(&self, table: &str, time: &SampleTime) -> MhResult<SampleData<T>> {
        self.tables
            .get(table)
            .and_then(|s| s.iter().find(|(t, _)| t.value == time.value))
            .map(|(_, d)| d.clone())
            .ok_or_else(|| MhError::not_found(format!("{}@{}", table, time.name)))
    }
}
