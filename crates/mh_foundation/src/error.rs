// crates/mh_foundation/src/error.rs

//! 基础错误类型
//!
//! `MhError` 只描述边界数据读写中与领域无关的失败：文件缺失、读写、
//! JSON 解析、输入值无效、表项缺失。映射与时间插值相关的错误由
//! `mh_mapped_bc::MappedBcError` 包装本类型后扩展。
//!
//! # 示例
//!
//! ```
//! use mh_foundation::error::{MhError, MhResult};
//!
//! fn parse_count(text: &str) -> MhResult<usize> {
//!     text.trim()
//!         .parse()
//!         .map_err(|_| MhError::parse("points.json", format!("'{}' 不是点数", text)))
//! }
//!
//! assert_eq!(parse_count(" 3 ").unwrap(), 3);
//! assert!(matches!(parse_count("x"), Err(MhError::ParseError { .. })));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 基础层结果类型
pub type MhResult<T> = Result<T, MhError>;

/// 边界数据读写错误
#[derive(Error, Debug)]
pub enum MhError {
    /// 读写失败
    #[error("IO错误: {message}")]
    Io {
        /// 失败的操作
        message: String,
        /// 底层 IO 错误
        #[source]
        source: Option<std::io::Error>,
    },

    /// 文件或目录不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 缺失的路径
        path: PathBuf,
    },

    /// JSON 解析失败
    #[error("文件解析错误: {file}: {message}")]
    ParseError {
        /// 出错的文件
        file: PathBuf,
        /// 解析器给出的原因
        message: String,
    },

    /// 输入值无效（面积、坐标、时间等）
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 无效原因
        message: String,
    },

    /// 数据表中没有请求的项
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 表项名称
        resource: String,
    },
}

impl MhError {
    /// 带底层错误的读写失败
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 表项缺失
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

impl From<std::io::Error> for MhError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_parse_error_display() {
        let err = MhError::parse("boundaryData/inlet/points.json", "期望数组");
        let msg = err.to_string();
        assert!(msg.contains("points.json"));
        assert!(msg.contains("期望数组"));
    }

    #[test]
    fn test_file_not_found() {
        let err = MhError::file_not_found("/path/to/points.json");
        assert!(err.to_string().contains("/path/to/points.json"));
    }

    #[test]
    fn test_io_with_source_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MhError::io_with_source("写入 restart.json 失败", cause);
        assert!(err.to_string().contains("restart.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let mh_err: MhError = io_err.into();
        assert!(matches!(mh_err, MhError::Io { source: Some(_), .. }));
    }

    #[test]
    fn test_not_found_names_entry() {
        let err = MhError::not_found("T@0.5");
        assert!(matches!(&err, MhError::NotFound { resource } if resource == "T@0.5"));
    }
}
