// crates/mh_mapped_bc/src/cache.rs

//! 采样时刻缓存
//!
//! 查询时间 t 落在两个相邻采样时刻之间（"时间区间"）。缓存保存这两个
//! 采样映射到边界面后的值，区间不变时直接复用，区间推进时只加载缺失的
//! 一侧：
//!
//! ```text
//! times:  t0 ── t1 ── t2 ── t3
//! 区间:        [1,   2]           t ∈ [t1, t2)
//! 推进到      [2, 3]             槽 2 移动复用，只加载 3
//! ```
//!
//! 任意时刻最多持有两个采样。

use std::fmt;

use tracing::debug;

use crate::error::{MappedBcError, MappedResult};
use crate::source::SampleTime;
use crate::value::FieldValue;

// ============================================================
// 区间定位
// ============================================================

/// 时间区间（采样索引对）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bracket {
    /// 起始采样索引
    pub start: usize,
    /// 结束采样索引
    pub end: usize,
}

impl Bracket {
    /// 创建区间
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// 查询时间超出采样范围的提示
///
/// 不是错误：超出范围时值被钳制到端点采样。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeRangeNotice {
    /// 早于第一个采样
    BeforeFirst {
        /// 查询时间
        time: f64,
        /// 第一个采样时刻
        first: f64,
    },
    /// 晚于最后一个采样
    AfterLast {
        /// 查询时间
        time: f64,
        /// 最后一个采样时刻
        last: f64,
    },
}

impl fmt::Display for TimeRangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeFirst { time, first } => {
                write!(f, "时间 {} 早于第一个采样 {}，使用第一个采样", time, first)
            }
            Self::AfterLast { time, last } => {
                write!(f, "时间 {} 晚于最后一个采样 {}，使用最后一个采样", time, last)
            }
        }
    }
}

/// 区间定位结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketLocation {
    /// 区间
    pub bracket: Bracket,
    /// 区间内插值分数 ∈ [0, 1]
    pub frac: f64,
    /// 越界提示
    pub notice: Option<TimeRangeNotice>,
}

/// 在升序采样时刻中定位查询时间
///
/// - 只有一个采样：`(0, 0)`
/// - 早于第一个：`(0, 0)`
/// - 晚于最后一个：`(n-2, n-1)`，分数钳制为 1
/// - 其余：i 为满足 `times[i] <= t` 的最大索引，`i == n-1` 时为 `(i, i)`，
///   否则 `(i, i+1)`
///
/// 空列表返回 None。
pub fn locate_bracket(times: &[f64], t: f64) -> Option<BracketLocation> {
    let n = times.len();
    let first = *times.first()?;
    let last = times[n - 1];

    if t < first {
        return Some(BracketLocation {
            bracket: Bracket::new(0, 0),
            frac: 0.0,
            notice: Some(TimeRangeNotice::BeforeFirst { time: t, first }),
        });
    }

    let notice = (t > last).then_some(TimeRangeNotice::AfterLast { time: t, last });

    if n == 1 {
        return Some(BracketLocation {
            bracket: Bracket::new(0, 0),
            frac: 0.0,
            notice,
        });
    }

    let bracket = if notice.is_some() {
        Bracket::new(n - 2, n - 1)
    } else {
        let i = times.partition_point(|&x| x <= t).saturating_sub(1);
        if i == n - 1 {
            Bracket::new(i, i)
        } else {
            Bracket::new(i, i + 1)
        }
    };

    Some(BracketLocation {
        bracket,
        frac: interpolation_fraction(times, bracket, t),
        notice,
    })
}

/// 区间内的线性插值分数，钳制到 [0, 1]
pub fn interpolation_fraction(times: &[f64], bracket: Bracket, t: f64) -> f64 {
    if bracket.start == bracket.end {
        return 0.0;
    }
    let ts = times[bracket.start];
    let te = times[bracket.end];
    ((t - ts) / (te - ts)).clamp(0.0, 1.0)
}

// ============================================================
// 区间状态
// ============================================================

/// 映射到边界面后的采样
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSample<T: FieldValue> {
    /// 采样索引
    pub index: usize,
    /// 每个面的值
    pub values: Vec<T>,
    /// 平均值（若采样提供）
    pub average: Option<T>,
}

impl<T: FieldValue> MappedSample<T> {
    /// 创建映射后的采样
    pub fn new(index: usize, values: Vec<T>, average: Option<T>) -> Self {
        Self {
            index,
            values,
            average,
        }
    }
}

/// 区间状态：起止两个采样
#[derive(Debug, Clone, PartialEq)]
pub struct BracketState<T: FieldValue> {
    /// 起始采样
    pub start: MappedSample<T>,
    /// 结束采样
    pub end: MappedSample<T>,
}

impl<T: FieldValue> BracketState<T> {
    /// 当前区间
    pub fn bracket(&self) -> Bracket {
        Bracket::new(self.start.index, self.end.index)
    }

    /// 转移到目标区间
    ///
    /// 旧状态中已持有的索引（无论在哪个槽）直接移动，只有缺失的索引调用
    /// `load`。起止相同时结束槽复制起始槽。
    pub fn transition<F>(previous: Option<Self>, target: Bracket, mut load: F) -> MappedResult<Self>
    where
        F: FnMut(usize) -> MappedResult<MappedSample<T>>,
    {
        let mut held: Vec<MappedSample<T>> = match previous {
            Some(s) => vec![s.start, s.end],
            None => Vec::new(),
        };
        let mut take = |index: usize| {
            held.iter()
                .position(|m| m.index == index)
                .map(|p| held.swap_remove(p))
        };

        let start = match take(target.start) {
            Some(m) => m,
            None => load(target.start)?,
        };
        let end = if target.end == target.start {
            start.clone()
        } else {
            match take(target.end) {
                Some(m) => m,
                None => load(target.end)?,
            }
        };
        Ok(Self { start, end })
    }
}

// ============================================================
// 缓存
// ============================================================

/// 一次更新的结果视图
#[derive(Debug)]
pub struct BracketView<'a, T: FieldValue> {
    /// 起始采样
    pub start: &'a MappedSample<T>,
    /// 结束采样
    pub end: &'a MappedSample<T>,
    /// 插值分数
    pub frac: f64,
    /// 越界提示
    pub notice: Option<TimeRangeNotice>,
}

/// 采样时刻缓存
#[derive(Debug, Clone)]
pub struct SampleTimeCache<T: FieldValue> {
    table: String,
    times: Vec<SampleTime>,
    time_values: Vec<f64>,
    state: Option<BracketState<T>>,
}

impl<T: FieldValue> SampleTimeCache<T> {
    /// 创建缓存，采样列表为空时返回 `MissingData`
    pub fn new(table: impl Into<String>, times: Vec<SampleTime>) -> MappedResult<Self> {
        let table = table.into();
        if times.is_empty() {
            return Err(MappedBcError::missing_data(table, "没有任何采样时刻"));
        }
        let time_values = times.iter().map(|t| t.value).collect();
        Ok(Self {
            table,
            times,
            time_values,
            state: None,
        })
    }

    /// 数据表名
    pub fn table(&self) -> &str {
        &self.table
    }

    /// 采样时刻
    pub fn times(&self) -> &[SampleTime] {
        &self.times
    }

    /// 当前区间
    pub fn bracket(&self) -> Option<Bracket> {
        self.state.as_ref().map(BracketState::bracket)
    }

    /// 当前区间状态
    pub fn state(&self) -> Option<&BracketState<T>> {
        self.state.as_ref()
    }

    /// 丢弃已缓存的采样
    pub fn invalidate(&mut self) {
        self.state = None;
    }

    /// 安装外部提供的区间状态（续算）
    pub fn install(&mut self, state: BracketState<T>) -> MappedResult<()> {
        let n = self.times.len();
        for index in [state.start.index, state.end.index] {
            if index >= n {
                return Err(MappedBcError::mismatch("采样索引上界", n, index));
            }
        }
        self.state = Some(state);
        Ok(())
    }

    /// 更新到时间 t
    ///
    /// 区间不变时不调用 `load`；区间变化时 `load(index, time)` 最多调用两次。
    pub fn update<F>(&mut self, t: f64, mut load: F) -> MappedResult<BracketView<'_, T>>
    where
        F: FnMut(usize, &SampleTime) -> MappedResult<MappedSample<T>>,
    {
        let loc = locate_bracket(&self.time_values, t)
            .ok_or_else(|| MappedBcError::missing_data(self.table.as_str(), "没有任何采样时刻"))?;

        if let Some(notice) = loc.notice {
            debug!("表 '{}': {}", self.table, notice);
        }

        if self.bracket() != Some(loc.bracket) {
            debug!(
                "表 '{}': 时间区间 {:?} -> [{}, {}]",
                self.table,
                self.bracket().map(|b| (b.start, b.end)),
                loc.bracket.start,
                loc.bracket.end
            );
            let times = &self.times;
            let previous = self.state.take();
            let next =
                BracketState::transition(previous, loc.bracket, |i| load(i, &times[i]))?;
            self.state = Some(next);
        }

        let state = self
            .state
            .as_ref()
            .ok_or_else(|| MappedBcError::missing_data(self.table.as_str(), "区间状态缺失"))?;
        Ok(BracketView {
            start: &state.start,
            end: &state.end,
            frac: loc.frac,
            notice: loc.notice,
        })
    }
}
