// crates/mh_mapped_bc/src/temporal.rs

//! 时间插值
//!
//! 区间两端的映射值按 `start·(1-frac) + end·frac` 线性混合。
//! `frac` 恰为 0 或 1 时直接复制端点，不做任何算术，采样时刻上的
//! 结果与采样值逐位相同。
//!
//! # 示例
//!
//! ```
//! use mh_mapped_bc::temporal::blend_value;
//!
//! assert_eq!(blend_value(10.0, 20.0, 0.25), 12.5);
//! assert_eq!(blend_value(0.1, 7.0, 0.0), 0.1);
//! ```

use crate::cache::MappedSample;
use crate::error::{MappedBcError, MappedResult};
use crate::value::FieldValue;

/// 混合后的边界值
#[derive(Debug, Clone, PartialEq)]
pub struct BlendedSample<T: FieldValue> {
    /// 每个面的值
    pub values: Vec<T>,
    /// 混合后的平均值（两端都提供时）
    pub average: Option<T>,
}

/// 混合单个值
#[inline]
pub fn blend_value<T: FieldValue>(start: T, end: T, frac: f64) -> T {
    if frac == 0.0 {
        start
    } else if frac == 1.0 {
        end
    } else {
        start * (1.0 - frac) + end * frac
    }
}

/// 逐面混合
pub fn blend<T: FieldValue>(start: &[T], end: &[T], frac: f64) -> MappedResult<Vec<T>> {
    MappedBcError::check_count("区间结束采样", start.len(), end.len())?;
    if frac == 0.0 {
        return Ok(start.to_vec());
    }
    if frac == 1.0 {
        return Ok(end.to_vec());
    }
    Ok(start
        .iter()
        .zip(end)
        .map(|(&s, &e)| blend_value(s, e, frac))
        .collect())
}

/// 混合两个映射后的采样（值与平均值）
pub fn blend_samples<T: FieldValue>(
    start: &MappedSample<T>,
    end: &MappedSample<T>,
    frac: f64,
) -> MappedResult<BlendedSample<T>> {
    let values = blend(&start.values, &end.values, frac)?;
    let average = match (start.average, end.average) {
        (Some(a), Some(b)) => Some(blend_value(a, b, frac)),
        _ => None,
    };
    Ok(BlendedSample { values, average })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_endpoints_are_exact_copies() {
        let start = [0.1, 0.2, 0.3];
        let end = [1.7, 2.9, 3.3];
        assert_eq!(blend(&start, &end, 0.0).unwrap(), start.to_vec());
        assert_eq!(blend(&start, &end, 1.0).unwrap(), end.to_vec());
    }

    #[test]
    fn test_linear_inside_bracket() {
        let start = [0.0, 10.0];
        let end = [4.0, 30.0];
        let quarter = blend(&start, &end, 0.25).unwrap();
        let half = blend(&start, &end, 0.5).unwrap();
        assert!(approx_eq(quarter[0], 1.0));
        assert!(approx_eq(half[1], 20.0));
        // 线性：中点为四分之一点与四分之三点的平均
        let three = blend(&start, &end, 0.75).unwrap();
        assert!(approx_eq(half[0], 0.5 * (quarter[0] + three[0])));
    }

    #[test]
    fn test_vector_blend() {
        let v = blend_value(DVec3::X, DVec3::Y, 0.5);
        assert!(approx_eq(v.x, 0.5));
        assert!(approx_eq(v.y, 0.5));
    }

    #[test]
    fn test_average_requires_both_ends() {
        let a = MappedSample::new(0, vec![1.0], Some(1.0));
        let b = MappedSample::new(1, vec![3.0], Some(5.0));
        let c = MappedSample::new(2, vec![3.0], None);
        assert_eq!(blend_samples(&a, &b, 0.5).unwrap().average, Some(3.0));
        assert_eq!(blend_samples(&a, &c, 0.5).unwrap().average, None);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            blend(&[1.0], &[1.0, 2.0], 0.5),
            Err(MappedBcError::GeometryMismatch { .. })
        ));
    }
}
