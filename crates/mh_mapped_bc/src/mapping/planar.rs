// crates/mh_mapped_bc/src/mapping/planar.rs

//! 平面投影与确定性扰动
//!
//! 边界数据点通常来自一个近似平面的入口截面。将点云投影到以第一个源点为
//! 原点的局部坐标系 (e1, e2) 后即可做二维三角化。
//!
//! 规则排列的输入（共线行、重复点、共圆点）会让 Delaunay 剖分退化，
//! 因此在投影前对源点施加固定种子的伪随机扰动。种子固定，
//! 各进程得到完全相同的扰动和映射。

use glam::{DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 扰动伪随机序列种子
pub const PERTURB_SEED: u64 = 123456;

/// 判定共线的相对容差（|e1 × d| / 包围盒对角线）
const COLLINEAR_TOL: f64 = 1e-10;

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    /// 最小角点
    pub min: DVec3,
    /// 最大角点
    pub max: DVec3,
}

impl BoundBox {
    /// 点集包围盒，空点集返回 None
    pub fn of(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    /// 对角线长度
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }
}

/// 局部平面坐标系
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    /// 原点（第一个源点）
    pub origin: DVec3,
    /// 面内第一轴
    pub e1: DVec3,
    /// 面内第二轴
    pub e2: DVec3,
    /// 法向
    pub e3: DVec3,
}

impl PlaneBasis {
    /// 由点集构造坐标系
    ///
    /// - 原点取 `points[0]`
    /// - e1 指向距原点最远的点（并列时取第一个）
    /// - 法向取使 |e1 × (p - p0)| 最大的点（并列时取第一个）
    ///
    /// 点集全部重合或共线时返回 None。
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let bb = BoundBox::of(points)?;
        let scale = bb.diagonal();
        if scale <= 0.0 {
            return None;
        }
        let tol = COLLINEAR_TOL * scale;

        let origin = points[0];
        let mut far = DVec3::ZERO;
        for p in points.iter().skip(1) {
            let d = *p - origin;
            if d.length_squared() > far.length_squared() {
                far = d;
            }
        }
        if far.length() <= tol {
            return None;
        }
        let e1 = far.normalize();

        let mut best: Option<(f64, DVec3)> = None;
        for p in points.iter().skip(1) {
            let n = e1.cross(*p - origin);
            let mag = n.length();
            if best.map_or(true, |(m, _)| mag > m) {
                best = Some((mag, n));
            }
        }
        let (mag, n) = best?;
        if mag <= tol {
            return None;
        }

        let e3 = n / mag;
        let e2 = e3.cross(e1);
        Some(Self { origin, e1, e2, e3 })
    }

    /// 投影到局部二维坐标
    #[inline]
    pub fn project(&self, p: DVec3) -> DVec2 {
        let d = p - self.origin;
        DVec2::new(d.dot(self.e1), d.dot(self.e2))
    }
}

/// 对点集施加确定性扰动
///
/// 每个坐标加上 `fraction × 包围盒对角线 × r`，`r ∈ [0, 1)` 按点序、
/// 分量序从固定种子序列中抽取。`fraction == 0` 时原样返回。
pub fn perturb_points(points: &[DVec3], fraction: f64) -> Vec<DVec3> {
    let Some(bb) = BoundBox::of(points) else {
        return Vec::new();
    };
    let magnitude = fraction * bb.diagonal();
    if magnitude == 0.0 {
        return points.to_vec();
    }

    let mut rng = StdRng::seed_from_u64(PERTURB_SEED);
    points
        .iter()
        .map(|p| {
            let r = DVec3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
            *p + r * magnitude
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_basis_xy_plane() {
        let pts = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 3.0, 0.0),
        ];
        let basis = PlaneBasis::from_points(&pts).unwrap();
        // e1 指向最远的 (0, 3, 0)
        assert_eq!(basis.e1, DVec3::Y);
        assert_eq!(basis.e3, DVec3::NEG_Z);
        assert_eq!(basis.e2, DVec3::X);

        let local = basis.project(DVec3::new(1.0, 2.0, 5.0));
        assert!(approx_eq(local.x, 2.0));
        assert!(approx_eq(local.y, 1.0));
    }

    #[test]
    fn test_basis_ignores_duplicate_point() {
        let pts = [
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(1.0, 2.0, 1.0),
            DVec3::new(1.0, 1.0, 3.0),
        ];
        let basis = PlaneBasis::from_points(&pts).unwrap();
        assert_eq!(basis.e1, DVec3::Z);
        assert!(approx_eq(basis.e3.dot(DVec3::X).abs(), 1.0));
    }

    #[test]
    fn test_basis_farthest_point_ties_take_first() {
        let pts = [
            DVec3::ZERO,
            DVec3::new(1e-7, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 4.0),
            DVec3::new(0.0, 4.0, 0.0),
        ];
        let basis = PlaneBasis::from_points(&pts).unwrap();
        assert_eq!(basis.e1, DVec3::Z);
        assert!(approx_eq(basis.e3.dot(DVec3::X).abs(), 1.0));
    }

    #[test]
    fn test_basis_collinear_is_none() {
        let pts: Vec<DVec3> = (0..5).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
        assert!(PlaneBasis::from_points(&pts).is_none());
        assert!(PlaneBasis::from_points(&[DVec3::ONE; 4]).is_none());
    }

    #[test]
    fn test_perturb_is_deterministic_and_bounded() {
        let pts: Vec<DVec3> = (0..10).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
        let a = perturb_points(&pts, 1e-3);
        let b = perturb_points(&pts, 1e-3);
        assert_eq!(a, b);

        let bound = 1e-3 * 9.0;
        for (p, q) in pts.iter().zip(&a) {
            let d = *q - *p;
            assert!(d.min_element() >= 0.0);
            assert!(d.max_element() < bound);
        }
        // 扰动后不再共线
        assert!(PlaneBasis::from_points(&a).is_some());
    }

    #[test]
    fn test_perturb_zero_is_identity() {
        let pts = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        assert_eq!(perturb_points(&pts, 0.0), pts);
    }
}
