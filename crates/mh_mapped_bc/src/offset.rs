// crates/mh_mapped_bc/src/offset.rs

//! 时变偏移
//!
//! 平均值修正之后，每个面加上同一个随时间变化的偏移量。
//!
//! 配置写法（JSON）：
//!
//! ```text
//! {"type": "constant", "value": 0.5}
//! {"type": "table", "times": [0, 10], "values": [0, 1]}
//! {"type": "ramp", "start": 5, "duration": 20, "amplitude": 2}
//! ```
//!
//! 表格在时间范围外取端点值（截断外推）。

use serde::{Deserialize, Serialize};

use crate::error::{MappedBcError, MappedResult};
use crate::temporal::blend_value;
use crate::value::FieldValue;

/// 偏移函数配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", bound = "T: FieldValue")]
pub enum OffsetSpec<T: FieldValue> {
    /// 常数
    Constant {
        /// 偏移量
        value: T,
    },
    /// 分段线性表
    Table {
        /// 严格递增的时刻
        times: Vec<f64>,
        /// 各时刻的偏移量
        values: Vec<T>,
    },
    /// 线性斜坡：`amplitude × clamp((t - start) / duration, 0, 1)`
    Ramp {
        /// 起始时间
        start: f64,
        /// 持续时间 (> 0)
        duration: f64,
        /// 最终幅值
        amplitude: T,
    },
}

impl<T: FieldValue> Default for OffsetSpec<T> {
    fn default() -> Self {
        Self::Constant { value: T::ZERO }
    }
}

impl<T: FieldValue> OffsetSpec<T> {
    /// 校验并构造偏移函数
    pub fn build(&self) -> MappedResult<OffsetFunction<T>> {
        match self {
            Self::Constant { value } => {
                if !value.is_finite() {
                    return Err(invalid("常数偏移不是有限值"));
                }
            }
            Self::Table { times, values } => {
                if times.is_empty() {
                    return Err(invalid("偏移表为空"));
                }
                if times.len() != values.len() {
                    return Err(invalid(format!(
                        "偏移表长度不一致: times {} 个, values {} 个",
                        times.len(),
                        values.len()
                    )));
                }
                if times.iter().any(|t| !t.is_finite()) || values.iter().any(|v| !v.is_finite()) {
                    return Err(invalid("偏移表包含非有限值"));
                }
                if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
                    return Err(invalid(format!(
                        "偏移表时刻必须严格递增: {} 之后为 {}",
                        w[0], w[1]
                    )));
                }
            }
            Self::Ramp {
                start,
                duration,
                amplitude,
            } => {
                if !(*duration > 0.0) || !duration.is_finite() {
                    return Err(invalid(format!("斜坡持续时间必须为正: {}", duration)));
                }
                if !start.is_finite() || !amplitude.is_finite() {
                    return Err(invalid("斜坡参数不是有限值"));
                }
            }
        }
        Ok(OffsetFunction { spec: self.clone() })
    }
}

fn invalid(reason: impl Into<String>) -> MappedBcError {
    MappedBcError::invalid_config("offset", reason)
}

/// 已校验的偏移函数
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetFunction<T: FieldValue> {
    spec: OffsetSpec<T>,
}

impl<T: FieldValue> Default for OffsetFunction<T> {
    fn default() -> Self {
        Self {
            spec: OffsetSpec::default(),
        }
    }
}

impl<T: FieldValue> OffsetFunction<T> {
    /// 原始配置
    pub fn spec(&self) -> &OffsetSpec<T> {
        &self.spec
    }

    /// t 时刻的偏移量
    pub fn value(&self, t: f64) -> T {
        match &self.spec {
            OffsetSpec::Constant { value } => *value,
            OffsetSpec::Table { times, values } => table_value(times, values, t),
            OffsetSpec::Ramp {
                start,
                duration,
                amplitude,
            } => *amplitude * ((t - start) / duration).clamp(0.0, 1.0),
        }
    }

    /// 每个面加上 t 时刻的偏移量
    pub fn apply(&self, values: &mut [T], t: f64) {
        let offset = self.value(t);
        if offset == T::ZERO {
            return;
        }
        for v in values.iter_mut() {
            *v = *v + offset;
        }
    }
}

fn table_value<T: FieldValue>(times: &[f64], values: &[T], t: f64) -> T {
    let n = times.len();
    if t <= times[0] {
        return values[0];
    }
    if t >= times[n - 1] {
        return values[n - 1];
    }
    let i = times.partition_point(|&x| x <= t) - 1;
    let frac = (t - times[i]) / (times[i + 1] - times[i]);
    blend_value(values[i], values[i + 1], frac)
}
