// crates/mh_mapped_bc/src/restart.rs

//! 续算状态
//!
//! 保存当前时间区间的采样索引以及（可选）两端映射后的采样值。带采样值
//! 恢复后，在同一模拟时间评估不会触发任何数据读取；只有索引时，恢复时
//! 立即重新加载两端采样。
//!
//! # 文件格式 (JSON)
//!
//! ```text
//! {
//!   "startIndex": 3,
//!   "endIndex": 4,
//!   "startSample": {"values": [...], "average": v},
//!   "endSample": {"values": [...]}
//! }
//! ```

use std::path::Path;

use mh_foundation::{MhError, MhResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{Bracket, BracketState, MappedSample};
use crate::error::{MappedBcError, MappedResult};
use crate::provider::{load_mapped, TimeVaryingMappedInletOutlet};
use crate::source::{BoundaryDataSource, SampleData};
use crate::value::FieldValue;

/// 续算状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "T: FieldValue")]
pub struct RestartState<T: FieldValue> {
    /// 区间起始采样索引
    pub start_index: usize,
    /// 区间结束采样索引
    pub end_index: usize,
    /// 起始采样映射值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_sample: Option<SampleData<T>>,
    /// 结束采样映射值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_sample: Option<SampleData<T>>,
}

impl<T: FieldValue> RestartState<T> {
    /// 只含索引
    pub fn indices(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
            start_sample: None,
            end_sample: None,
        }
    }

    /// 区间
    pub fn bracket(&self) -> Bracket {
        Bracket::new(self.start_index, self.end_index)
    }

    /// 丢弃采样值，只保留索引
    pub fn without_samples(mut self) -> Self {
        self.start_sample = None;
        self.end_sample = None;
        self
    }

    /// 保存到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> MhResult<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).map_err(|e| MhError::parse(path, e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| MhError::io_with_source(format!("写入 {} 失败", path.display()), e))
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> MhResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MhError::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| MhError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| MhError::parse(path, e.to_string()))
    }
}

impl<T: FieldValue, S: BoundaryDataSource<T>> TimeVaryingMappedInletOutlet<T, S> {
    /// 当前续算状态，尚未评估过时返回 None
    pub fn restart_state(&self) -> Option<RestartState<T>> {
        let state = self.cache.state()?;
        let sample = |m: &MappedSample<T>| SampleData {
            values: m.values.clone(),
            average: m.average,
        };
        Some(RestartState {
            start_index: state.start.index,
            end_index: state.end.index,
            start_sample: Some(sample(&state.start)),
            end_sample: Some(sample(&state.end)),
        })
    }

    /// 恢复续算状态
    ///
    /// 索引超出采样列表或采样值长度与面数不一致时返回 `GeometryMismatch`。
    pub fn restore(&mut self, state: RestartState<T>) -> MappedResult<()> {
        let n_times = self.cache.times().len();
        for index in [state.start_index, state.end_index] {
            if index >= n_times {
                return Err(MappedBcError::mismatch("采样索引上界", n_times, index));
            }
        }
        if state.start_index > state.end_index {
            return Err(MappedBcError::mismatch(
                "区间结束索引下界",
                state.start_index,
                state.end_index,
            ));
        }

        let n_faces = self.n_faces();
        for sample in [&state.start_sample, &state.end_sample].into_iter().flatten() {
            MappedBcError::check_count("续算采样值", n_faces, sample.values.len())?;
        }

        let bracket = state.bracket();
        let restored = match (state.start_sample, state.end_sample) {
            (Some(start), Some(end)) => BracketState {
                start: MappedSample::new(bracket.start, start.values, start.average),
                end: MappedSample::new(bracket.end, end.values, end.average),
            },
            _ => {
                self.ensure_mapping()?;
                let mapping = self
                    .mapping
                    .as_ref()
                    .ok_or_else(|| MappedBcError::degenerate("映射未建立"))?;
                let source = &self.source;
                let table = self.table.as_str();
                let times = self.cache.times();
                let set_average = self.config.set_average;
                BracketState::transition(None, bracket, |i| {
                    load_mapped(source, table, mapping, i, &times[i], set_average)
                })?
            }
        };

        info!(
            "边界 '{}': 恢复续算状态，区间 [{}, {}]",
            self.field_name, bracket.start, bracket.end
        );
        self.cache.install(restored)
    }
}
