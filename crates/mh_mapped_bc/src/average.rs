// crates/mh_mapped_bc/src/average.rs

//! 平均值修正
//!
//! 使面积加权平均 `Σ fᵢwᵢ / Σ wᵢ` 等于采样给出的目标平均值。
//! 累加使用 Kahan 补偿求和，矢量按分量分别累加。

use std::fmt;
use std::str::FromStr;

use mh_foundation::{KahanSum, MhError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MappedBcError, MappedResult};
use crate::value::FieldValue;

/// 缩放策略切换阈值：|actual| / |target| 超过该值才缩放
pub const RESCALE_THRESHOLD: f64 = 0.5;

/// 平均值修正策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AveragePolicy {
    /// 所有面加上 (target - actual)
    #[default]
    Shift,
    /// 按模长比例缩放，比值过小时退回平移
    ///
    /// 对矢量只保证模长比例，不保证平均值逐分量相等。
    Rescale,
}

impl AveragePolicy {
    /// 配置名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Rescale => "rescale",
        }
    }
}

impl fmt::Display for AveragePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AveragePolicy {
    type Err = MappedBcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shift" => Ok(Self::Shift),
            "rescale" => Ok(Self::Rescale),
            other => Err(MappedBcError::invalid_config(
                "averagePolicy",
                format!("未知策略 '{}'，可选 shift | rescale", other),
            )),
        }
    }
}

/// 加权平均
///
/// 权重总和为零时无法定义平均值，返回 `InvalidInput`。
pub fn weighted_average<T: FieldValue>(values: &[T], weights: &[f64]) -> MappedResult<T> {
    MappedBcError::check_count("面积权重", values.len(), weights.len())?;

    let total = KahanSum::sum_iter(weights.iter().copied());
    if total == 0.0 || !total.is_finite() {
        return Err(MhError::invalid_input(format!("权重总和为 {}，无法计算平均值", total)).into());
    }

    // 与 KahanSum 相同的补偿步骤，直接作用在 T 上（矢量逐分量）
    let mut sum = T::ZERO;
    let mut compensation = T::ZERO;
    for (&v, &w) in values.iter().zip(weights) {
        let y = v * w - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    Ok(sum * (1.0 / total))
}

/// 平均值修正器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AverageAdjuster {
    policy: AveragePolicy,
}

impl AverageAdjuster {
    /// 以指定策略创建
    pub fn new(policy: AveragePolicy) -> Self {
        Self { policy }
    }

    /// 修正策略
    pub fn policy(&self) -> AveragePolicy {
        self.policy
    }

    /// 原地修正 `values`，使加权平均等于 `target`
    pub fn adjust<T: FieldValue>(
        &self,
        values: &mut [T],
        weights: &[f64],
        target: T,
    ) -> MappedResult<()> {
        let actual = weighted_average(values, weights)?;

        match self.policy {
            AveragePolicy::Rescale => {
                let actual_mag = actual.magnitude();
                let target_mag = target.magnitude();
                if target_mag > 0.0 && actual_mag / target_mag > RESCALE_THRESHOLD {
                    let factor = target_mag / actual_mag;
                    debug!("平均值修正: 缩放因子 {}", factor);
                    for v in values.iter_mut() {
                        *v = *v * factor;
                    }
                    return Ok(());
                }
                shift(values, target - actual);
            }
            AveragePolicy::Shift => shift(values, target - actual),
        }
        Ok(())
    }
}

fn shift<T: FieldValue>(values: &mut [T], delta: T) {
    debug!("平均值修正: 平移 {:?}", delta);
    for v in values.iter_mut() {
        *v = *v + delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_shift_scenario() {
        let mut values = vec![2.0, 4.0];
        AverageAdjuster::default()
            .adjust(&mut values, &[1.0, 1.0], 5.0)
            .unwrap();
        assert_eq!(values, vec![4.0, 6.0]);
    }

    #[test]
    fn test_shift_non_uniform_weights() {
        let mut values = vec![1.0, 7.5, -3.0, 2.25];
        let weights = [0.1, 2.0, 0.35, 11.0];
        AverageAdjuster::new(AveragePolicy::Shift)
            .adjust(&mut values, &weights, 1.234)
            .unwrap();
        assert!(approx_eq(weighted_average(&values, &weights).unwrap(), 1.234));
    }

    #[test]
    fn test_shift_vector_component_wise() {
        let mut values = vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(3.0, 2.0, 0.0)];
        let weights = [1.0, 3.0];
        let target = DVec3::new(0.0, 1.0, -1.0);
        AverageAdjuster::default()
            .adjust(&mut values, &weights, target)
            .unwrap();
        let avg = weighted_average(&values, &weights).unwrap();
        assert!(approx_eq(avg.x, 0.0));
        assert!(approx_eq(avg.y, 1.0));
        assert!(approx_eq(avg.z, -1.0));
    }

    #[test]
    fn test_rescale_same_sign_scalar() {
        let mut values = vec![2.0, 4.0];
        AverageAdjuster::new(AveragePolicy::Rescale)
            .adjust(&mut values, &[1.0, 1.0], 4.5)
            .unwrap();
        assert!(approx_eq(values[0], 3.0));
        assert!(approx_eq(values[1], 6.0));
    }

    #[test]
    fn test_rescale_falls_back_to_shift() {
        // 实际平均 0.1，目标 10：比值 0.01 不超过阈值
        let mut values = vec![0.0, 0.2];
        AverageAdjuster::new(AveragePolicy::Rescale)
            .adjust(&mut values, &[1.0, 1.0], 10.0)
            .unwrap();
        assert!(approx_eq(values[0], 9.9));
        assert!(approx_eq(values[1], 10.1));
    }

    #[test]
    fn test_zero_weight_is_error() {
        let mut values = vec![1.0, 2.0];
        let err = AverageAdjuster::default()
            .adjust(&mut values, &[0.0, 0.0], 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            MappedBcError::Source(MhError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("rescale".parse::<AveragePolicy>().unwrap(), AveragePolicy::Rescale);
        assert!("scale".parse::<AveragePolicy>().is_err());
    }
}
