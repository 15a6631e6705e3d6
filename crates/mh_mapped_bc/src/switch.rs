// crates/mh_mapped_bc/src/switch.rs

//! 入流/出流切换
//!
//! 每个面按本地通量符号独立决定边界类型：
//!
//! | 通量 | 状态 | 值分数 | 行为 |
//! |------|------|--------|------|
//! | ≤ 0  | 入流 | 1 | 固定值（映射结果） |
//! | > 0  | 出流 | 0 | 零梯度（取相邻内部值） |
//!
//! 每次调用都重新判断，无滞回。

use serde::{Deserialize, Serialize};

use crate::error::{MappedBcError, MappedResult};
use crate::value::FieldValue;

/// 面的流动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceRegime {
    /// 流入计算域
    Inflow,
    /// 流出计算域
    Outflow,
}

impl FaceRegime {
    /// 由通量判断（出流为正）
    #[inline]
    pub fn from_flux(flux: f64) -> Self {
        if flux > 0.0 {
            Self::Outflow
        } else {
            Self::Inflow
        }
    }

    /// 对应的边界条件
    #[inline]
    pub fn condition(&self) -> FaceCondition {
        match self {
            Self::Inflow => FaceCondition::FixedValue,
            Self::Outflow => FaceCondition::ZeroGradient,
        }
    }
}

/// 面的边界条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceCondition {
    /// Dirichlet
    FixedValue,
    /// Neumann，法向梯度为零
    ZeroGradient,
}

impl FaceCondition {
    /// 值分数
    #[inline]
    pub fn value_fraction(&self) -> f64 {
        match self {
            Self::FixedValue => 1.0,
            Self::ZeroGradient => 0.0,
        }
    }

    /// 面值：固定值取参考值，零梯度取内部值
    #[inline]
    pub fn face_value<T: FieldValue>(&self, reference: T, interior: T) -> T {
        match self {
            Self::FixedValue => reference,
            Self::ZeroGradient => interior,
        }
    }
}

/// 入流/出流切换器
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryTypeSwitch;

impl BoundaryTypeSwitch {
    /// 每个面的流动状态
    pub fn regimes(&self, flux: &[f64]) -> Vec<FaceRegime> {
        flux.iter().map(|&f| FaceRegime::from_flux(f)).collect()
    }

    /// 每个面的值分数
    pub fn value_fractions(&self, flux: &[f64], n_faces: usize) -> MappedResult<Vec<f64>> {
        MappedBcError::check_count("面通量", n_faces, flux.len())?;
        Ok(flux
            .iter()
            .map(|&f| FaceRegime::from_flux(f).condition().value_fraction())
            .collect())
    }
}

/// 混合边界面值 `f·reference + (1-f)·interior`
///
/// 值分数为 0 或 1 时直接取对应一侧。
#[inline]
pub fn mixed_value<T: FieldValue>(fraction: f64, reference: T, interior: T) -> T {
    if fraction == 1.0 {
        reference
    } else if fraction == 0.0 {
        interior
    } else {
        reference * fraction + interior * (1.0 - fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flux_sign() {
        assert_eq!(FaceRegime::from_flux(-1.0), FaceRegime::Inflow);
        assert_eq!(FaceRegime::from_flux(0.0), FaceRegime::Inflow);
        assert_eq!(FaceRegime::from_flux(1e-300), FaceRegime::Outflow);
    }

    #[test]
    fn test_value_fractions() {
        let switch = BoundaryTypeSwitch;
        let fr = switch.value_fractions(&[-2.0, 0.0, 3.0], 3).unwrap();
        assert_eq!(fr, vec![1.0, 1.0, 0.0]);
        assert!(switch.value_fractions(&[1.0], 3).is_err());
    }

    #[test]
    fn test_sign_flip_is_immediate() {
        let switch = BoundaryTypeSwitch;
        assert_eq!(switch.value_fractions(&[1.0], 1).unwrap(), vec![0.0]);
        assert_eq!(switch.value_fractions(&[-1.0], 1).unwrap(), vec![1.0]);
        assert_eq!(switch.value_fractions(&[1.0], 1).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_face_condition_values() {
        assert_eq!(FaceCondition::FixedValue.face_value(5.0, 1.0), 5.0);
        assert_eq!(FaceCondition::ZeroGradient.face_value(5.0, 1.0), 1.0);
        assert_eq!(mixed_value(0.5, 4.0, 2.0), 3.0);
        assert_eq!(
            FaceRegime::Outflow.condition().value_fraction(),
            0.0
        );
    }
}
