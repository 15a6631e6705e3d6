// crates/mh_mapped_bc/src/provider.rs

//! 时变映射入流/出流边界
//!
//! 每次查询的处理流程：
//!
//! ```text
//! SampleTimeCache.update(t) ──区间变化时──> 加载采样 + 空间映射
//!          │
//!          v
//! 时间插值 ──> 平均值修正 (setAverage) ──> 时变偏移 ──> 入流/出流切换
//! ```
//!
//! # 使用示例
//!
//! ```
//! use glam::DVec3;
//! use mh_mapped_bc::{
//!     MappedBcConfig, MemoryDataSource, PatchGeometry, SampleData, TimeVaryingMappedInletOutlet,
//! };
//!
//! let source = MemoryDataSource::new(vec![
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//! ])
//! .with_sample("T", 0.0, SampleData::new(vec![1.0, 2.0, 3.0]))
//! .with_sample("T", 10.0, SampleData::new(vec![4.0, 5.0, 6.0]));
//!
//! let geometry = PatchGeometry::new(vec![DVec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)], vec![1.0])?;
//! let config = MappedBcConfig { perturb: 0.0, ..Default::default() };
//! let mut bc = TimeVaryingMappedInletOutlet::new("T", config, source, geometry)?;
//!
//! let eval = bc.update_and_evaluate(5.0, &[-1.0])?;
//! assert!((eval.values[0] - 3.5).abs() < 1e-12);
//! assert_eq!(eval.value_fraction, vec![1.0]);
//! # Ok::<(), mh_mapped_bc::MappedBcError>(())
//! ```

use glam::DVec3;
use mh_foundation::MhError;
use tracing::{debug, info};

use crate::average::AverageAdjuster;
use crate::cache::{MappedSample, SampleTimeCache, TimeRangeNotice};
use crate::config::MappedBcConfig;
use crate::error::{MappedBcError, MappedResult};
use crate::mapping::{Mapping, SpatialInterpolator};
use crate::offset::OffsetFunction;
use crate::source::{BoundaryDataSource, SampleTime};
use crate::switch::{mixed_value, BoundaryTypeSwitch, FaceCondition};
use crate::temporal::{blend_samples, BlendedSample};
use crate::value::FieldValue;

/// 采样值数与源点数不一致时的对象名
const SAMPLE_VALUES: &str = "采样值";

// ============================================================
// 面几何
// ============================================================

/// 边界面几何：面中心与面积
#[derive(Debug, Clone, PartialEq)]
pub struct PatchGeometry {
    centres: Vec<DVec3>,
    areas: Vec<f64>,
}

impl PatchGeometry {
    /// 创建面几何
    ///
    /// 面积用作平均值的权重，必须为非负有限值。
    pub fn new(centres: Vec<DVec3>, areas: Vec<f64>) -> MappedResult<Self> {
        MappedBcError::check_count("面积", centres.len(), areas.len())?;
        if let Some((i, a)) = areas
            .iter()
            .enumerate()
            .find(|(_, a)| !a.is_finite() || **a < 0.0)
        {
            return Err(MhError::invalid_input(format!("面 {} 的面积无效: {}", i, a)).into());
        }
        if let Some(i) = centres.iter().position(|c| !c.is_finite()) {
            return Err(MhError::invalid_input(format!("面 {} 的中心坐标不是有限值", i)).into());
        }
        Ok(Self { centres, areas })
    }

    /// 所有面积均为 1
    pub fn with_unit_areas(centres: Vec<DVec3>) -> Self {
        let areas = vec![1.0; centres.len()];
        Self { centres, areas }
    }

    /// 面数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.centres.len()
    }

    /// 面中心
    #[inline]
    pub fn centres(&self) -> &[DVec3] {
        &self.centres
    }

    /// 面积
    #[inline]
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }
}

// ============================================================
// 评估结果
// ============================================================

/// 一次评估的结果
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryEvaluation<T: FieldValue> {
    /// 每个面的参考值（入流时施加）
    pub values: Vec<T>,
    /// 每个面的值分数：1 固定值，0 零梯度
    pub value_fraction: Vec<f64>,
    /// 查询时间超出采样范围时的提示
    pub notice: Option<TimeRangeNotice>,
}

impl<T: FieldValue> BoundaryEvaluation<T> {
    /// 每个面的边界条件
    pub fn conditions(&self) -> Vec<FaceCondition> {
        self.value_fraction
            .iter()
            .map(|&f| {
                if f > 0.0 {
                    FaceCondition::FixedValue
                } else {
                    FaceCondition::ZeroGradient
                }
            })
            .collect()
    }

    /// 混合面值 `f·value + (1-f)·interior`
    pub fn face_values(&self, interior: &[T]) -> MappedResult<Vec<T>> {
        MappedBcError::check_count("内部值", self.values.len(), interior.len())?;
        Ok(self
            .values
            .iter()
            .zip(&self.value_fraction)
            .zip(interior)
            .map(|((&v, &f), &i)| mixed_value(f, v, i))
            .collect())
    }
}

// ============================================================
// 提供者
// ============================================================

/// 时变映射入流/出流边界
#[derive(Debug)]
pub struct TimeVaryingMappedInletOutlet<T: FieldValue, S: BoundaryDataSource<T>> {
    pub(crate) field_name: String,
    pub(crate) table: String,
    pub(crate) config: MappedBcConfig<T>,
    pub(crate) source: S,
    pub(crate) geometry: PatchGeometry,
    pub(crate) source_points: Vec<DVec3>,
    pub(crate) interpolator: SpatialInterpolator,
    pub(crate) mapping: Option<Mapping>,
    pub(crate) cache: SampleTimeCache<T>,
    pub(crate) offset: OffsetFunction<T>,
    pub(crate) adjuster: AverageAdjuster,
    pub(crate) switch: BoundaryTypeSwitch,
}

impl<T: FieldValue, S: BoundaryDataSource<T>> TimeVaryingMappedInletOutlet<T, S> {
    /// 创建边界
    ///
    /// 校验配置、枚举采样时刻并读取源点云。数据表没有任何采样时返回
    /// `MissingData`。映射在第一次需要时建立。
    pub fn new(
        field_name: impl Into<String>,
        config: MappedBcConfig<T>,
        source: S,
        geometry: PatchGeometry,
    ) -> MappedResult<Self> {
        config.validate()?;
        let field_name = field_name.into();
        let table = config.table_name(&field_name).to_string();

        let times = source.sample_times(&table)?;
        let cache = SampleTimeCache::new(table.as_str(), times)?;
        let source_points = source.points()?;
        let offset = config.offset_function()?;

        info!(
            "时变映射边界 '{}' ({}): 表 '{}', {} 个采样时刻, {} 个源点, {} 个面, 映射={}",
            field_name,
            T::TYPE_NAME,
            table,
            cache.times().len(),
            source_points.len(),
            geometry.n_faces(),
            config.map_method
        );

        Ok(Self {
            interpolator: SpatialInterpolator::new(config.map_method, config.perturb),
            adjuster: AverageAdjuster::new(config.average_policy),
            switch: BoundaryTypeSwitch,
            field_name,
            table,
            config,
            source,
            geometry,
            source_points,
            mapping: None,
            cache,
            offset,
        })
    }

    /// 场名
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// 数据表名
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// 配置
    pub fn config(&self) -> &MappedBcConfig<T> {
        &self.config
    }

    /// 是否声明为固定值边界
    pub fn fixes_value(&self) -> bool {
        self.config.fixes_value
    }

    /// 面数
    pub fn n_faces(&self) -> usize {
        self.geometry.n_faces()
    }

    /// 面几何
    pub fn geometry(&self) -> &PatchGeometry {
        &self.geometry
    }

    /// 采样时刻
    pub fn sample_times(&self) -> &[SampleTime] {
        self.cache.times()
    }

    /// 数据源
    pub fn source(&self) -> &S {
        &self.source
    }

    /// 已建立的映射
    pub fn mapping(&self) -> Option<&Mapping> {
        self.mapping.as_ref()
    }

    /// 最近一次区间起始采样的映射值（诊断用）
    pub fn last_start_sample_values(&self) -> Option<&[T]> {
        self.cache.state().map(|s| s.start.values.as_slice())
    }

    /// 建立映射（已存在时不做任何事）
    pub fn ensure_mapping(&mut self) -> MappedResult<&Mapping> {
        mapping_or_build(
            &mut self.mapping,
            &self.interpolator,
            &self.source_points,
            self.geometry.centres(),
        )
    }

    /// 在时间 t 评估边界
    ///
    /// `flux` 为每个面的通量（出流为正）。采样值数与源点数不一致时重新读取
    /// 源点云，点数变化则重建映射并重试一次。
    pub fn update_and_evaluate(&mut self, t: f64, flux: &[f64]) -> MappedResult<BoundaryEvaluation<T>> {
        if !t.is_finite() {
            return Err(MhError::invalid_input(format!("查询时间不是有限值: {}", t)).into());
        }
        MappedBcError::check_count("面通量", self.n_faces(), flux.len())?;

        let (blended, notice) = match self.blend_at(t) {
            Err(err @ MappedBcError::GeometryMismatch { what: SAMPLE_VALUES, .. }) => {
                if !self.reload_source_points()? {
                    return Err(err);
                }
                self.blend_at(t)?
            }
            other => other?,
        };
        let mut values = blended.values;

        if self.config.set_average {
            let target = blended.average.ok_or_else(|| {
                MappedBcError::missing_data(self.table.as_str(), "setAverage 需要两端采样都提供平均值")
            })?;
            self.adjuster.adjust(&mut values, self.geometry.areas(), target)?;
        }

        self.offset.apply(&mut values, t);
        let value_fraction = self.switch.value_fractions(flux, self.n_faces())?;

        Ok(BoundaryEvaluation {
            values,
            value_fraction,
            notice,
        })
    }

    /// 更新缓存区间并做时间插值
    ///
    /// 映射只在需要加载采样时建立；区间未变（包括重启后恢复的区间）时不触碰几何。
    fn blend_at(&mut self, t: f64) -> MappedResult<(BlendedSample<T>, Option<TimeRangeNotice>)> {
        let mapping = &mut self.mapping;
        let interpolator = &self.interpolator;
        let source_points = self.source_points.as_slice();
        let centres = self.geometry.centres();
        let source = &self.source;
        let table = self.table.as_str();
        let set_average = self.config.set_average;

        let view = self.cache.update(t, |index, time| {
            let mapping = mapping_or_build(mapping, interpolator, source_points, centres)?;
            load_mapped(source, table, mapping, index, time, set_average)
        })?;
        let blended = blend_samples(view.start, view.end, view.frac)?;
        Ok((blended, view.notice))
    }

    /// 重新读取源点云，点数变化时作废映射与缓存
    ///
    /// 返回点数是否变化。
    fn reload_source_points(&mut self) -> MappedResult<bool> {
        let points = self.source.points()?;
        if points.len() == self.source_points.len() {
            return Ok(false);
        }
        info!(
            "边界 '{}': 源点数 {} -> {}，重建映射",
            self.field_name,
            self.source_points.len(),
            points.len()
        );
        self.source_points = points;
        self.mapping = None;
        self.cache.invalidate();
        Ok(true)
    }

    /// 面重排后更新目标几何
    ///
    /// `addressing[i]` 为新面 i 对应的旧面索引。映射与缓存的采样全部作废，
    /// 下一次评估时重新建立。
    pub fn remap_faces(&mut self, addressing: &[usize], geometry: PatchGeometry) -> MappedResult<()> {
        MappedBcError::check_count("面映射地址", geometry.n_faces(), addressing.len())?;
        let old = self.n_faces();
        if let Some(&bad) = addressing.iter().find(|&&a| a >= old) {
            return Err(MappedBcError::mismatch("旧面索引上界", old, bad));
        }

        debug!(
            "边界 '{}': 面重排 {} -> {}，映射与采样缓存作废",
            self.field_name,
            old,
            geometry.n_faces()
        );
        self.geometry = geometry;
        self.mapping = None;
        self.cache.invalidate();
        Ok(())
    }
}

/// 取已建立的映射，没有时用当前源点与面中心建立
fn mapping_or_build<'a>(
    slot: &'a mut Option<Mapping>,
    interpolator: &SpatialInterpolator,
    source_points: &[DVec3],
    centres: &[DVec3],
) -> MappedResult<&'a Mapping> {
    if slot.is_none() {
        *slot = Some(interpolator.build(source_points, centres)?);
    }
    slot.as_ref()
        .ok_or_else(|| MappedBcError::degenerate("映射未建立"))
}

/// 加载一个采样并映射到边界面
pub(crate) fn load_mapped<T: FieldValue, S: BoundaryDataSource<T>>(
    source: &S,
    table: &str,
    mapping: &Mapping,
    index: usize,
    time: &SampleTime,
    set_average: bool,
) -> MappedResult<MappedSample<T>> {
    let data = source.load(table, time)?;
    MappedBcError::check_count(SAMPLE_VALUES, mapping.n_sources(), data.values.len())?;
    if set_average && data.average.is_none() {
        return Err(MappedBcError::missing_data(
            table,
            format!("时刻 {} 缺少平均值", time.name),
        ));
    }

    debug!("加载采样: 表 '{}', 时刻 {} (#{})", table, time.name, index);
    let values = mapping.evaluate(&data.values)?;
    Ok(MappedSample::new(index, values, data.average))
}
