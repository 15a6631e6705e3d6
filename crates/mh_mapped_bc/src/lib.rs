// crates/mh_mapped_bc/src/lib.rs

//! 时变映射入流/出流边界条件
//!
//! 在每个查询时间、对每个边界面回答两个问题：
//! - 由稀疏、不规则分布、在离散历史时刻记录的源点数据空间插值得到的值
//! - 该面按本地通量符号取固定值还是零梯度
//!
//! 模块组成：
//! - 空间映射 (mapping): 平面投影 + Delaunay 三角化 / 最近点
//! - 采样缓存 (cache): 时间区间定位与采样复用
//! - 时间插值 (temporal)
//! - 平均值修正 (average)
//! - 时变偏移 (offset)
//! - 入流/出流切换 (switch)
//! - 提供者 (provider) 与续算状态 (restart)
//!
//! 相同输入在任何进程上得到逐位相同的结果：扰动使用固定种子，
//! 三角化不依赖哈希顺序。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod average;
pub mod cache;
pub mod config;
pub mod error;
pub mod mapping;
pub mod offset;
pub mod provider;
pub mod restart;
pub mod source;
pub mod switch;
pub mod temporal;
pub mod value;

pub use average::{AverageAdjuster, AveragePolicy};
pub use cache::{
    locate_bracket, Bracket, BracketLocation, BracketState, MappedSample, SampleTimeCache,
    TimeRangeNotice,
};
pub use config::MappedBcConfig;
pub use error::{MappedBcError, MappedResult};
pub use mapping::{FaceWeight, MapMethod, Mapping, SpatialInterpolator};
pub use offset::{OffsetFunction, OffsetSpec};
pub use provider::{BoundaryEvaluation, PatchGeometry, TimeVaryingMappedInletOutlet};
pub use restart::RestartState;
pub use source::{
    BoundaryDataSource, DirectoryDataSource, MemoryDataSource, SampleData, SampleTime,
};
pub use switch::{BoundaryTypeSwitch, FaceCondition, FaceRegime};
pub use value::FieldValue;
