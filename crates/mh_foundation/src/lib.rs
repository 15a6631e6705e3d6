// crates/mh_foundation/src/lib.rs

//! MariHydro Foundation Layer
//!
//! 基础层，提供整个工作区共享的最小抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `MhError` / `MhResult`
//! - [`kahan`]: Kahan 补偿求和
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: mh_cli        ─> 驱动程序
//! Layer 3: mh_mapped_bc  ─> 时变映射边界条件
//! Layer 1: mh_foundation ─> 错误类型、数值工具 (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kahan;

pub use error::{MhError, MhResult};
pub use kahan::KahanSum;
