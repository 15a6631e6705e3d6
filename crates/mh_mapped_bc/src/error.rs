// crates/mh_mapped_bc/src/error.rs

//! 时变映射边界错误类型
//!
//! 除 [`MappedBcError::Source`] 外均为致命错误：错误的边界值会悄无声息地
//! 污染整个模拟，因此不做任何静默回退。时间越界不是错误，见
//! [`crate::cache::TimeRangeNotice`]。

use mh_foundation::MhError;
use thiserror::Error;

/// 时变映射边界结果类型
pub type MappedResult<T> = Result<T, MappedBcError>;

/// 时变映射边界错误
#[derive(Debug, Error)]
pub enum MappedBcError {
    /// 数据表中没有可用的采样
    #[error("边界数据缺失: 表 '{table}': {reason}")]
    MissingData {
        /// 数据表名
        table: String,
        /// 具体原因
        reason: String,
    },

    /// 源点云退化，扰动后仍无法三角化
    #[error("源点几何退化: {0}")]
    DegenerateGeometry(String),

    /// 源点数、采样值数或面数与已建立的映射不一致
    #[error("几何不匹配: {what} 期望 {expected}, 实际 {actual}")]
    GeometryMismatch {
        /// 不一致的对象
        what: &'static str,
        /// 映射建立时的数量
        expected: usize,
        /// 当前数量
        actual: usize,
    },

    /// 配置无效
    #[error("配置无效: {key}: {reason}")]
    InvalidConfig {
        /// 配置键
        key: String,
        /// 原因
        reason: String,
    },

    /// 数据源读取失败
    #[error(transparent)]
    Source(#[from] MhError),
}

impl MappedBcError {
    /// 数据缺失
    pub fn missing_data(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingData {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// 几何退化
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry(message.into())
    }

    /// 几何不匹配
    pub fn mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::GeometryMismatch {
            what,
            expected,
            actual,
        }
    }

    /// 配置无效
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// 检查数量一致
    #[inline]
    pub fn check_count(what: &'static str, expected: usize, actual: usize) -> MappedResult<()> {
        if expected != actual {
            Err(Self::mismatch(what, expected, actual))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display() {
        let err = MappedBcError::mismatch("flux", 4, 3);
        let msg = err.to_string();
        assert!(msg.contains("flux"));
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_source_conversion() {
        let err: MappedBcError = MhError::file_not_found("points.json").into();
        assert!(matches!(err, MappedBcError::Source(_)));
        assert!(err.to_string().contains("points.json"));
    }

    #[test]
    fn test_check_count() {
        assert!(MappedBcError::check_count("faces", 2, 2).is_ok());
        assert!(matches!(
            MappedBcError::check_count("faces", 2, 3),
            Err(MappedBcError::GeometryMismatch { expected: 2, actual: 3, .. })
        ));
    }
}
