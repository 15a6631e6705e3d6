// crates/mh_mapped_bc/src/mapping/delaunay.rs

//! 二维 Delaunay 三角化与重心权重
//!
//! 构造分两步：
//! 1. 扫描三角化：点按 (x, y) 排序后逐个加入，新点总在当前凸包之外，
//!    与所有可见凸包边连成三角形。结果恰好覆盖整个凸包。
//! 2. Lawson 翻边：对违反空外接圆条件的内部边反复翻转，直到全部合法。
//!
//! 最终三角形统一为逆时针、最小顶点在首位，并按字典序排序。该顺序即定位时的
//! "扫描顺序"，目标点落在两个三角形的公共边上时取扫描顺序中的第一个。
//! 定位用三角形包围盒的 R-tree 做候选筛选，候选再按扫描顺序逐个检验。

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec2;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::{MappedBcError, MappedResult};

/// 重心坐标的包含容差
const INSIDE_TOL: f64 = 1e-10;

/// 面积过滤的相对容差（相对于包围盒尺寸平方）
const AREA_TOL: f64 = 1e-14;

/// 共圆判定的相对容差（相对于行列式各项绝对值之和）
const INCIRCLE_TOL: f64 = 1e-12;

/// 有向面积的两倍（逆时针为正）
#[inline]
fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// 共圆判定：d 在逆时针三角形 abc 外接圆内时行列式为正
///
/// 返回 (行列式, 各项绝对值之和)，后者为舍入误差的尺度。
fn incircle(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> (f64, f64) {
    let (ad, bd, cd) = (a - d, b - d, c - d);
    let (al, bl, cl) = (
        ad.length_squared(),
        bd.length_squared(),
        cd.length_squared(),
    );
    let det = al * bd.perp_dot(cd) + bl * cd.perp_dot(ad) + cl * ad.perp_dot(bd);
    let permanent = al * ((bd.x * cd.y).abs() + (bd.y * cd.x).abs())
        + bl * ((cd.x * ad.y).abs() + (cd.y * ad.x).abs())
        + cl * ((ad.x * bd.y).abs() + (ad.y * bd.x).abs());
    (det, permanent)
}

/// 重心坐标 [λa, λb, λc]，退化三角形返回 None
fn barycentric(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> Option<[f64; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let den = v0.perp_dot(v1);
    if den.abs() < f64::MIN_POSITIVE {
        return None;
    }
    let lb = v2.perp_dot(v1) / den;
    let lc = v0.perp_dot(v2) / den;
    Some([1.0 - lb - lc, lb, lc])
}

/// 线段 ab 上距 p 最近的点参数 s ∈ [0, 1]
#[inline]
fn segment_param(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

// ============================================================
// 三角形包围盒索引
// ============================================================

/// 三角形包围盒（R-tree 条目）
#[derive(Debug, Clone)]
struct TriangleEnvelope {
    /// 三角形在扫描顺序中的序号
    index: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl TriangleEnvelope {
    fn new(index: usize, a: DVec2, b: DVec2, c: DVec2) -> Self {
        let lo = a.min(b).min(c);
        let hi = a.max(b).max(c);
        let slack = (hi - lo).max_element() * INSIDE_TOL;
        Self {
            index,
            min: [lo.x - slack, lo.y - slack],
            max: [hi.x + slack, hi.y + slack],
        }
    }
}

impl RTreeObject for TriangleEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for TriangleEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

// ============================================================
// 三角剖分
// ============================================================

/// 二维 Delaunay 三角剖分
#[derive(Clone)]
pub struct Triangulation {
    points: Vec<DVec2>,
    /// 逆时针、排序后的三角形
    triangles: Vec<[usize; 3]>,
    /// 三角形包围盒索引
    index: RTree<TriangleEnvelope>,
}

impl fmt::Debug for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("n_points", &self.points.len())
            .field("n_triangles", &self.triangles.len())
            .finish()
    }
}

impl Triangulation {
    /// 对点集做 Delaunay 三角化
    ///
    /// 少于 3 个点、点全部重合或共线时返回 `DegenerateGeometry`。
    /// 完全重合的点只保留索引最小的一个作为顶点。
    pub fn new(points: &[DVec2]) -> MappedResult<Self> {
        let n = points.len();
        if n < 3 {
            return Err(MappedBcError::degenerate(format!(
                "三角化至少需要 3 个点, 实际 {}",
                n
            )));
        }

        let (lo, hi) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        let span = (hi - lo).max_element();
        if !(span > 0.0) || !span.is_finite() {
            return Err(MappedBcError::degenerate("源点全部重合或坐标非有限"));
        }

        let area_tol = AREA_TOL * span * span;
        let mut triangles = sweep(points, area_tol)?;
        legalize(points, &mut triangles);

        let mut triangles: Vec<[usize; 3]> = triangles
            .into_iter()
            .filter(|t| orient(points[t[0]], points[t[1]], points[t[2]]) > area_tol)
            .map(canonical)
            .collect();
        triangles.sort_unstable();

        if triangles.is_empty() {
            return Err(MappedBcError::degenerate("三角化结果为空（点共线）"));
        }

        let envelopes = triangles
            .iter()
            .enumerate()
            .map(|(k, t)| TriangleEnvelope::new(k, points[t[0]], points[t[1]], points[t[2]]))
            .collect();

        Ok(Self {
            points: points.to_vec(),
            triangles,
            index: RTree::bulk_load(envelopes),
        })
    }

    /// 三角形列表（扫描顺序）
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// 顶点坐标
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// 目标点的插值权重
    ///
    /// 返回三个 (顶点索引, 权重)，权重非负且和为 1。
    /// 点在凸包内时取包含它的第一个三角形；否则取所有三角形上距其
    /// 最近的点（并列取扫描顺序第一个），再用该点的重心坐标。
    pub fn weights_at(&self, p: DVec2) -> [(usize, f64); 3] {
        if let Some(w) = self.containing_weights(p) {
            return w;
        }
        self.nearest_weights(p)
    }

    fn containing_weights(&self, p: DVec2) -> Option<[(usize, f64); 3]> {
        let mut candidates: Vec<usize> = self
            .index
            .locate_all_at_point(&[p.x, p.y])
            .map(|env| env.index)
            .collect();
        candidates.sort_unstable();

        for k in candidates {
            let tri = &self.triangles[k];
            let (a, b, c) = self.corners(tri);
            let Some(l) = barycentric(p, a, b, c) else {
                continue;
            };
            if l.iter().all(|&x| x >= -INSIDE_TOL) {
                let clamped = l.map(|x| x.max(0.0));
                let sum: f64 = clamped.iter().sum();
                return Some([
                    (tri[0], clamped[0] / sum),
                    (tri[1], clamped[1] / sum),
                    (tri[2], clamped[2] / sum),
                ]);
            }
        }
        None
    }

    fn nearest_weights(&self, p: DVec2) -> [(usize, f64); 3] {
        // (距离², 三角形序号, 边起点局部序号, 边参数)
        let mut best: Option<(f64, usize, usize, f64)> = None;
        // 包围盒距离是三角形距离的下界，按其升序遍历即可提前终止
        let query = [p.x, p.y];
        for env in self.index.nearest_neighbor_iter(&query) {
            let box_d2 = env.distance_2(&query);
            if best.map_or(false, |(bd, ..)| box_d2 > bd) {
                break;
            }
            let k = env.index;
            let tri = self.triangles[k];
            for e in 0..3 {
                let a = self.points[tri[e]];
                let b = self.points[tri[(e + 1) % 3]];
                let s = segment_param(p, a, b);
                let q = a + (b - a) * s;
                let d = (q - p).length_squared();
                let better = match best {
                    None => true,
                    Some((bd, bk, ..)) => d < bd || (d == bd && k < bk),
                };
                if better {
                    best = Some((d, k, e, s));
                }
            }
        }

        // 构造时保证至少一个三角形
        let (_, k, e, s) = best.unwrap_or((0.0, 0, 0, 0.0));
        let tri = self.triangles[k];
        let mut w = [(tri[0], 0.0), (tri[1], 0.0), (tri[2], 0.0)];
        w[e].1 = 1.0 - s;
        w[(e + 1) % 3].1 = s;
        w
    }

    #[inline]
    fn corners(&self, tri: &[usize; 3]) -> (DVec2, DVec2, DVec2) {
        (
            self.points[tri[0]],
            self.points[tri[1]],
            self.points[tri[2]],
        )
    }
}

/// 旋转顶点使最小索引在首位（保持环向）
fn canonical(t: [usize; 3]) -> [usize; 3] {
    let k = (0..3).min_by_key(|&i| t[i]).unwrap_or(0);
    [t[k], t[(k + 1) % 3], t[(k + 2) % 3]]
}

/// 扫描三角化，返回覆盖凸包的逆时针三角形（未必 Delaunay）
fn sweep(points: &[DVec2], area_tol: f64) -> MappedResult<Vec<[usize; 3]>> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        let (p, q) = (points[i], points[j]);
        p.x.total_cmp(&q.x)
            .then(p.y.total_cmp(&q.y))
            .then(i.cmp(&j))
    });
    order.dedup_by(|later, kept| points[*later] == points[*kept]);

    let collinear = || MappedBcError::degenerate("源点共线，无法三角化");
    if order.len() < 3 {
        return Err(collinear());
    }

    // 前 k 个点共线（按坐标排序即沿直线有序），第 k 个点首次离开该直线
    let (p0, p1) = (points[order[0]], points[order[1]]);
    let k = (2..order.len())
        .find(|&k| orient(p0, p1, points[order[k]]).abs() > area_tol)
        .ok_or_else(collinear)?;
    let apex = order[k];

    let mut triangles = Vec::with_capacity(2 * points.len());
    for w in order[..k].windows(2) {
        let (a, b) = (w[0], w[1]);
        if orient(points[a], points[b], points[apex]) > 0.0 {
            triangles.push([a, b, apex]);
        } else {
            triangles.push([b, a, apex]);
        }
    }

    // 逆时针凸包
    let mut hull: Vec<usize> = if orient(p0, p1, points[apex]) > 0.0 {
        order[..k].to_vec()
    } else {
        order[..k].iter().rev().copied().collect()
    };
    hull.push(apex);

    for &q in &order[k + 1..] {
        let h = hull.len();
        let mut visible: Vec<bool> = (0..h)
            .map(|i| orient(points[hull[i]], points[hull[(i + 1) % h]], points[q]) < 0.0)
            .collect();
        // 可见边在凸包上连续，从第一段的起点开始
        let Some(start) = (0..h).find(|&i| visible[i] && !visible[(i + h - 1) % h]) else {
            continue;
        };
        hull.rotate_left(start);
        visible.rotate_left(start);
        let run = visible.iter().take_while(|&&v| v).count();

        for i in 0..run {
            triangles.push([hull[i], q, hull[i + 1]]);
        }

        let mut next = Vec::with_capacity(h - run + 2);
        next.push(hull[0]);
        next.push(q);
        next.extend_from_slice(&hull[run..]);
        hull = next;
    }

    Ok(triangles)
}

/// 三角形中除 a、b 外的顶点
#[inline]
fn third(t: [usize; 3], a: usize, b: usize) -> usize {
    t.into_iter().find(|&v| v != a && v != b).unwrap_or(t[0])
}

/// Lawson 翻边，直到所有内部边满足空外接圆条件
fn legalize(points: &[DVec2], triangles: &mut [[usize; 3]]) {
    // 有向边 → 所在三角形
    let mut owner: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (t, tri) in triangles.iter().enumerate() {
        for e in 0..3 {
            owner.insert((tri[e], tri[(e + 1) % 3]), t);
        }
    }

    let mut stack: Vec<(usize, usize)> = owner.keys().copied().filter(|(a, b)| a < b).collect();
    let mut budget = points.len().saturating_mul(points.len()).saturating_add(64);

    while let Some((a, b)) = stack.pop() {
        let (Some(&t1), Some(&t2)) = (owner.get(&(a, b)), owner.get(&(b, a))) else {
            continue;
        };
        let c = third(triangles[t1], a, b);
        let d = third(triangles[t2], b, a);
        let (pa, pb, pc, pd) = (points[a], points[b], points[c], points[d]);

        let (det, permanent) = incircle(pa, pb, pc, pd);
        if det <= INCIRCLE_TOL * permanent || orient(pc, pa, pd) <= 0.0 || orient(pd, pb, pc) <= 0.0
        {
            continue;
        }

        triangles[t1] = [c, a, d];
        triangles[t2] = [d, b, c];
        owner.remove(&(a, b));
        owner.remove(&(b, a));
        for t in [t1, t2] {
            let tri = triangles[t];
            for e in 0..3 {
                owner.insert((tri[e], tri[(e + 1) % 3]), t);
            }
        }
        stack.extend([(a, d), (d, b), (b, c), (c, a)]);

        budget -= 1;
        if budget == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn weight_sum(w: &[(usize, f64); 3]) -> f64 {
        w.iter().map(|(_, x)| x).sum()
    }

    /// 三点外接圆（圆心, 半径²）
    fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> (DVec2, f64) {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        let a2 = a.length_squared();
        let b2 = b.length_squared();
        let c2 = c.length_squared();
        let center = DVec2::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        );
        (center, (a - center).length_squared())
    }

    /// 单调链的半个凸包顶点数（含两端点）
    fn half_hull(points: impl Iterator<Item = DVec2>) -> usize {
        let mut chain: Vec<DVec2> = Vec::new();
        for p in points {
            while chain.len() >= 2 && orient(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0.0
            {
                chain.pop();
            }
            chain.push(p);
        }
        chain.len()
    }

    /// 凸包顶点数（不含共线点）
    fn hull_size(pts: &[DVec2]) -> usize {
        let mut sorted = pts.to_vec();
        sorted.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
        half_hull(sorted.iter().copied()) + half_hull(sorted.iter().rev().copied()) - 2
    }

    #[test]
    fn test_single_triangle() {
        let pts = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)];
        let tri = Triangulation::new(&pts).unwrap();
        assert_eq!(tri.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let pts = [DVec2::new(0.0, 0.0), DVec2::new(0.0, 1.0), DVec2::new(1.0, 0.0)];
        let tri = Triangulation::new(&pts).unwrap();
        let t = tri.triangles()[0];
        assert!(orient(pts[t[0]], pts[t[1]], pts[t[2]]) > 0.0);
        assert_eq!(t[0], 0);
    }

    #[test]
    fn test_square_covers_area() {
        let pts = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.1),
        ];
        let tri = Triangulation::new(&pts).unwrap();
        assert_eq!(tri.triangles().len(), 2);
        let area: f64 = tri
            .triangles()
            .iter()
            .map(|t| 0.5 * orient(pts[t[0]], pts[t[1]], pts[t[2]]))
            .sum();
        assert!((area - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_delaunay_empty_circle() {
        let pts: Vec<DVec2> = (0..20)
            .map(|i| {
                let x = (i as f64 * 0.37).sin() * 3.0 + i as f64 * 0.05;
                let y = (i as f64 * 1.13).cos() * 2.0;
                DVec2::new(x, y)
            })
            .collect();
        let tri = Triangulation::new(&pts).unwrap();
        for t in tri.triangles() {
            let (c, r2) = circumcircle(pts[t[0]], pts[t[1]], pts[t[2]]);
            for (k, p) in pts.iter().enumerate() {
                if t.contains(&k) {
                    continue;
                }
                assert!((c - *p).length_squared() >= r2 * (1.0 - 1e-9));
            }
        }
    }

    #[test]
    fn test_random_clouds_cover_convex_hull() {
        let mut rng = StdRng::seed_from_u64(20_240_611);
        let field = |p: DVec2| 3.0 * p.x - 2.0 * p.y;

        for _ in 0..200 {
            let pts: Vec<DVec2> = (0..30).map(|_| DVec2::new(rng.gen(), rng.gen())).collect();
            let tri = Triangulation::new(&pts).unwrap();

            // 覆盖凸包的三角剖分恰有 2n - h - 2 个三角形
            let h = hull_size(&pts);
            assert_eq!(tri.triangles().len(), 2 * pts.len() - h - 2);

            // 两源点中点必在凸包内，线性场被精确重现
            for i in 0..pts.len() {
                for j in i + 1..pts.len() {
                    let mid = (pts[i] + pts[j]) * 0.5;
                    let w = tri.weights_at(mid);
                    let v: f64 = w.iter().map(|&(k, x)| x * field(pts[k])).sum();
                    assert!((v - field(mid)).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_random_cloud_is_delaunay() {
        let mut rng = StdRng::seed_from_u64(7);
        let pts: Vec<DVec2> = (0..300)
            .map(|_| DVec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(0.0..2.0)))
            .collect();
        let tri = Triangulation::new(&pts).unwrap();
        assert_eq!(tri.triangles().len(), 2 * pts.len() - hull_size(&pts) - 2);
        for t in tri.triangles() {
            let (c, r2) = circumcircle(pts[t[0]], pts[t[1]], pts[t[2]]);
            for (k, p) in pts.iter().enumerate() {
                if !t.contains(&k) {
                    assert!((c - *p).length_squared() >= r2 * (1.0 - 1e-9));
                }
            }
        }
    }

    #[test]
    fn test_duplicate_points_keep_lowest_index() {
        let pts = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 0.0),
        ];
        let tri = Triangulation::new(&pts).unwrap();
        assert_eq!(tri.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_deterministic_order() {
        let pts: Vec<DVec2> = (0..30)
            .map(|i| DVec2::new((i * 7 % 11) as f64 + 0.01 * i as f64, (i * 5 % 13) as f64))
            .collect();
        let a = Triangulation::new(&pts).unwrap();
        let b = Triangulation::new(&pts).unwrap();
        assert_eq!(a.triangles(), b.triangles());
        let mut sorted = a.triangles().to_vec();
        sorted.sort();
        assert_eq!(sorted, a.triangles());
    }

    #[test]
    fn test_inside_weights() {
        let pts = [DVec2::new(0.0, 0.0), DVec2::new(3.0, 0.0), DVec2::new(0.0, 3.0)];
        let tri = Triangulation::new(&pts).unwrap();
        let w = tri.weights_at(DVec2::new(1.0, 1.0));
        for (_, x) in w {
            assert!((x - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_vertex_gets_unit_weight() {
        let pts = [DVec2::new(0.0, 0.0), DVec2::new(3.0, 0.0), DVec2::new(0.0, 3.0)];
        let tri = Triangulation::new(&pts).unwrap();
        let w = tri.weights_at(DVec2::new(3.0, 0.0));
        let unit = w.iter().find(|(v, _)| *v == 1).unwrap();
        assert_eq!(unit.1, 1.0);
    }

    #[test]
    fn test_outside_projects_to_nearest_edge() {
        let pts = [DVec2::new(0.0, 0.0), DVec2::new(2.0, 0.0), DVec2::new(0.0, 2.0)];
        let tri = Triangulation::new(&pts).unwrap();
        // 在 x 轴下方，最近点为 (0.5, 0)
        let w = tri.weights_at(DVec2::new(0.5, -1.0));
        assert!((weight_sum(&w) - 1.0).abs() < 1e-12);
        let get = |v: usize| w.iter().find(|(i, _)| *i == v).map(|(_, x)| *x).unwrap();
        assert!((get(0) - 0.75).abs() < 1e-12);
        assert!((get(1) - 0.25).abs() < 1e-12);
        assert_eq!(get(2), 0.0);

        // 远离顶点方向，权重全部落在最近顶点
        let w = tri.weights_at(DVec2::new(5.0, -5.0));
        let get = |v: usize| w.iter().find(|(i, _)| *i == v).map(|(_, x)| *x).unwrap();
        assert_eq!(get(1), 1.0);
    }

    #[test]
    fn test_outside_matches_exhaustive_search() {
        let mut rng = StdRng::seed_from_u64(99);
        let pts: Vec<DVec2> = (0..60)
            .map(|_| DVec2::new(rng.gen_range(0.0..4.0), rng.gen_range(0.0..1.0)))
            .collect();
        let tri = Triangulation::new(&pts).unwrap();

        for _ in 0..100 {
            let p = DVec2::new(rng.gen_range(-3.0..7.0), rng.gen_range(-3.0..4.0));
            let w = tri.weights_at(p);
            let q = w.iter().fold(DVec2::ZERO, |acc, &(k, x)| acc + pts[k] * x);

            // 逐边穷举的最近距离
            let best = tri
                .triangles()
                .iter()
                .flat_map(|t| (0..3).map(move |e| (t[e], t[(e + 1) % 3])))
                .map(|(a, b)| {
                    let s = segment_param(p, pts[a], pts[b]);
                    (pts[a] + (pts[b] - pts[a]) * s - p).length_squared()
                })
                .fold(f64::INFINITY, f64::min);
            if tri.containing_weights(p).is_none() {
                assert!(((q - p).length_squared() - best).abs() < 1e-9);
            } else {
                assert!((q - p).length_squared() < 1e-18);
            }
        }
    }

    #[test]
    fn test_shared_edge_tie_uses_first_triangle() {
        let pts = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.2),
        ];
        let tri = Triangulation::new(&pts).unwrap();
        let first = tri.triangles()[0];
        // 找到两三角形公共边的中点
        let second = tri.triangles()[1];
        let shared: Vec<usize> = first.iter().copied().filter(|v| second.contains(v)).collect();
        assert_eq!(shared.len(), 2);
        let mid = (pts[shared[0]] + pts[shared[1]]) * 0.5;

        let w = tri.weights_at(mid);
        for (v, _) in w {
            assert!(first.contains(&v));
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            Triangulation::new(&[DVec2::ZERO, DVec2::X]),
            Err(MappedBcError::DegenerateGeometry(_))
        ));
        assert!(matches!(
            Triangulation::new(&[DVec2::ONE; 5]),
            Err(MappedBcError::DegenerateGeometry(_))
        ));
        let line: Vec<DVec2> = (0..6).map(|i| DVec2::new(i as f64, 0.0)).collect();
        assert!(matches!(
            Triangulation::new(&line),
            Err(MappedBcError::DegenerateGeometry(_))
        ));
    }
}
