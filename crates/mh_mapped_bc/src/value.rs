// crates/mh_mapped_bc/src/value.rs

//! 边界场值类型
//!
//! 提供者对值类型泛型：标量（温度、湍动能）、二维/三维矢量（速度）。
//! 映射、时间插值和平均值修正只需要线性运算和模长。

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use glam::{DVec2, DVec3};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 边界场值
///
/// 要求构成 f64 上的线性空间。序列化形式与 JSON 数据文件一致：
/// 标量为数字，矢量为数组。
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// 零元
    const ZERO: Self;

    /// 类型名（日志与诊断用）
    const TYPE_NAME: &'static str;

    /// 模长
    fn magnitude(&self) -> f64;

    /// 所有分量是否有限
    fn is_finite(&self) -> bool;
}

impl FieldValue for f64 {
    const ZERO: Self = 0.0;
    const TYPE_NAME: &'static str = "scalar";

    #[inline]
    fn magnitude(&self) -> f64 {
        self.abs()
    }

    #[inline]
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl FieldValue for DVec2 {
    const ZERO: Self = DVec2::ZERO;
    const TYPE_NAME: &'static str = "vector2";

    #[inline]
    fn magnitude(&self) -> f64 {
        self.length()
    }

    #[inline]
    fn is_finite(&self) -> bool {
        DVec2::is_finite(*self)
    }
}

impl FieldValue for DVec3 {
    const ZERO: Self = DVec3::ZERO;
    const TYPE_NAME: &'static str = "vector";

    #[inline]
    fn magnitude(&self) -> f64 {
        self.length()
    }

    #[inline]
    fn is_finite(&self) -> bool {
        DVec3::is_finite(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_magnitude() {
        assert_eq!((-3.0f64).magnitude(), 3.0);
        assert!(!FieldValue::is_finite(&f64::NAN));
    }

    #[test]
    fn test_vector_linear_ops() {
        let a = DVec3::new(1.0, 2.0, 2.0);
        assert_eq!(a.magnitude(), 3.0);
        assert_eq!(a * 2.0 - a, a);
        assert_eq!(DVec3::ZERO + a, a);
    }

    #[test]
    fn test_vector_json_shape() {
        let v: DVec3 = serde_json::from_str("[1.0, 2.0, 3.0]").unwrap();
        assert_eq!(v, DVec3::new(1.0, 2.0, 3.0));
        let s: f64 = serde_json::from_str("4.5").unwrap();
        assert_eq!(s, 4.5);
    }
}
