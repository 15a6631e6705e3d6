// crates/mh_mapped_bc/src/mapping/mod.rs

//! 空间映射
//!
//! 将稀疏、不规则分布的源点值映射到边界面中心。映射只依赖几何，
//! 建立一次后对所有采样时刻复用：
//!
//! ```text
//! 源点 ──(扰动 + 平面投影 + Delaunay)──> 每面 (源点, 权重) 列表
//! 采样值 ──evaluate──> 每面值
//! ```
//!
//! 权重按 CSR 布局扁平存储，`offsets[i]..offsets[i+1]` 为第 i 个面的权重区间。

pub mod delaunay;
pub mod planar;

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MappedBcError, MappedResult};
use crate::value::FieldValue;

pub use delaunay::Triangulation;
pub use planar::{perturb_points, BoundBox, PlaneBasis, PERTURB_SEED};

/// 权重和的校验容差
pub const WEIGHT_SUM_TOL: f64 = 1e-9;

/// 映射方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapMethod {
    /// 平面三角化 + 重心插值
    #[default]
    PlanarInterpolation,
    /// 最近源点
    Nearest,
}

impl MapMethod {
    /// 配置文件中的名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlanarInterpolation => "planarInterpolation",
            Self::Nearest => "nearest",
        }
    }
}

impl fmt::Display for MapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapMethod {
    type Err = MappedBcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planarInterpolation" => Ok(Self::PlanarInterpolation),
            "nearest" => Ok(Self::Nearest),
            other => Err(MappedBcError::invalid_config(
                "mapMethod",
                format!("未知映射方法 '{}'，可选 planarInterpolation | nearest", other),
            )),
        }
    }
}

/// 单个 (源点, 权重) 对
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceWeight {
    /// 源点索引
    pub source: usize,
    /// 权重
    pub weight: f64,
}

/// 源点到目标面的映射
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    weights: Vec<FaceWeight>,
    offsets: Vec<usize>,
    n_sources: usize,
    method: MapMethod,
}

impl Mapping {
    fn with_capacity(n_faces: usize, n_sources: usize, method: MapMethod) -> Self {
        let mut offsets = Vec::with_capacity(n_faces + 1);
        offsets.push(0);
        Self {
            weights: Vec::with_capacity(n_faces * 3),
            offsets,
            n_sources,
            method,
        }
    }

    fn push_face(&mut self, pairs: impl IntoIterator<Item = (usize, f64)>) {
        for (source, weight) in pairs {
            if weight > 0.0 {
                self.weights.push(FaceWeight { source, weight });
            }
        }
        self.offsets.push(self.weights.len());
    }

    /// 目标面数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.offsets.len() - 1
    }

    /// 建立映射时的源点数
    #[inline]
    pub fn n_sources(&self) -> usize {
        self.n_sources
    }

    /// 建立映射的方法
    #[inline]
    pub fn method(&self) -> MapMethod {
        self.method
    }

    /// 第 `face` 个面的权重列表
    #[inline]
    pub fn face_weights(&self, face: usize) -> &[FaceWeight] {
        &self.weights[self.offsets[face]..self.offsets[face + 1]]
    }

    /// 将源点值映射到每个面
    ///
    /// 只有一个权重为 1 的面直接复制源值，不参与乘法。
    pub fn evaluate<T: FieldValue>(&self, values: &[T]) -> MappedResult<Vec<T>> {
        MappedBcError::check_count("源点值", self.n_sources, values.len())?;

        Ok((0..self.n_faces())
            .map(|face| match self.face_weights(face) {
                [single] if single.weight == 1.0 => values[single.source],
                pairs => pairs
                    .iter()
                    .fold(T::ZERO, |acc, w| acc + values[w.source] * w.weight),
            })
            .collect())
    }

    /// 检查每个面的权重和为 1
    pub fn validate(&self, tol: f64) -> MappedResult<()> {
        for face in 0..self.n_faces() {
            let sum: f64 = self.face_weights(face).iter().map(|w| w.weight).sum();
            if (sum - 1.0).abs() > tol {
                return Err(MappedBcError::degenerate(format!(
                    "面 {} 的权重和为 {}",
                    face, sum
                )));
            }
            if let Some(w) = self
                .face_weights(face)
                .iter()
                .find(|w| w.source >= self.n_sources)
            {
                return Err(MappedBcError::mismatch("源点索引", self.n_sources, w.source));
            }
        }
        Ok(())
    }
}

/// 空间插值器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialInterpolator {
    /// 映射方法
    pub method: MapMethod,
    /// 扰动比例（相对包围盒对角线）
    pub perturb: f64,
}

impl SpatialInterpolator {
    /// 创建插值器
    pub fn new(method: MapMethod, perturb: f64) -> Self {
        Self { method, perturb }
    }

    /// 建立源点到目标点的映射
    pub fn build(&self, source: &[DVec3], targets: &[DVec3]) -> MappedResult<Mapping> {
        let mapping = match self.method {
            MapMethod::PlanarInterpolation => self.build_planar(source, targets)?,
            MapMethod::Nearest => build_nearest(source, targets)?,
        };
        mapping.validate(WEIGHT_SUM_TOL)?;

        info!(
            "建立边界映射: 方法={}, 源点={}, 目标面={}",
            self.method,
            source.len(),
            targets.len()
        );
        Ok(mapping)
    }

    fn build_planar(&self, source: &[DVec3], targets: &[DVec3]) -> MappedResult<Mapping> {
        if source.len() < 3 {
            return Err(MappedBcError::degenerate(format!(
                "平面插值至少需要 3 个源点, 实际 {}",
                source.len()
            )));
        }

        let perturbed = perturb_points(source, self.perturb);

        let basis = match PlaneBasis::from_points(source) {
            Some(b) => b,
            None => {
                warn!(
                    "源点共线或重合，改用扰动后的点确定投影平面 (perturb={})",
                    self.perturb
                );
                PlaneBasis::from_points(&perturbed).ok_or_else(|| {
                    MappedBcError::degenerate("扰动后源点仍然共线或重合，无法确定投影平面")
                })?
            }
        };

        let local: Vec<_> = perturbed.iter().map(|p| basis.project(*p)).collect();
        let tri = Triangulation::new(&local)?;

        let mut mapping = Mapping::with_capacity(targets.len(), source.len(), self.method);
        for t in targets {
            mapping.push_face(tri.weights_at(basis.project(*t)));
        }
        Ok(mapping)
    }
}

/// 源点条目（R-tree）
#[derive(Debug, Clone)]
struct SourceEntry {
    index: usize,
    point: [f64; 3],
}

impl RTreeObject for SourceEntry {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for SourceEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// 最近点映射（三维距离，并列取最小索引）
fn build_nearest(source: &[DVec3], targets: &[DVec3]) -> MappedResult<Mapping> {
    if source.is_empty() {
        return Err(MappedBcError::degenerate("最近点映射没有源点"));
    }

    let tree = RTree::bulk_load(
        source
            .iter()
            .enumerate()
            .map(|(index, p)| SourceEntry {
                index,
                point: p.to_array(),
            })
            .collect(),
    );

    let mut mapping = Mapping::with_capacity(targets.len(), source.len(), MapMethod::Nearest);
    for t in targets {
        let query = t.to_array();
        let mut hits = tree.nearest_neighbor_iter(&query);
        let Some(first) = hits.next() else {
            return Err(MappedBcError::degenerate("最近点映射没有源点"));
        };
        let d0 = first.distance_2(&query);
        // 等距的源点依次出现，取其中索引最小者
        let nearest = hits
            .take_while(|entry| entry.distance_2(&query) == d0)
            .fold(first.index, |best, entry| best.min(entry.index));
        mapping.push_face([(nearest, 1.0)]);
    }
    Ok(mapping)
}
