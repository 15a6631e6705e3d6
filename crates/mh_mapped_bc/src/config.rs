// crates/mh_mapped_bc/src/config.rs

//! 时变映射边界配置
//!
//! ```json
//! {
//!   "setAverage": false,
//!   "perturb": 1e-5,
//!   "fieldTableName": "T",
//!   "mapMethod": "planarInterpolation",
//!   "offset": {"type": "constant", "value": 0},
//!   "fixesValue": false,
//!   "phi": "phi",
//!   "averagePolicy": "shift"
//! }
//! ```
//!
//! 所有键均可省略，构造后不可变。

use std::path::Path;

use mh_foundation::MhError;
use serde::{Deserialize, Serialize};

use crate::average::AveragePolicy;
use crate::error::{MappedBcError, MappedResult};
use crate::mapping::MapMethod;
use crate::offset::{OffsetFunction, OffsetSpec};
use crate::value::FieldValue;

/// 时变映射边界配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "T: FieldValue")]
pub struct MappedBcConfig<T: FieldValue> {
    /// 是否修正面积加权平均值
    #[serde(default)]
    pub set_average: bool,

    /// 源点扰动比例（相对包围盒对角线）
    #[serde(default = "default_perturb")]
    pub perturb: f64,

    /// 数据表名，缺省为场名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_table_name: Option<String>,

    /// 空间映射方法
    #[serde(default)]
    pub map_method: MapMethod,

    /// 时变偏移
    #[serde(default)]
    pub offset: OffsetSpec<T>,

    /// 是否声明为固定值边界
    #[serde(default)]
    pub fixes_value: bool,

    /// 通量场名称
    #[serde(default = "default_phi")]
    pub phi: String,

    /// 平均值修正策略
    #[serde(default)]
    pub average_policy: AveragePolicy,
}

fn default_perturb() -> f64 { 1e-5 }
fn default_phi() -> String { "phi".to_string() }

impl<T: FieldValue> Default for MappedBcConfig<T> {
    fn default() -> Self {
        Self {
            set_average: false,
            perturb: default_perturb(),
            field_table_name: None,
            map_method: MapMethod::default(),
            offset: OffsetSpec::default(),
            fixes_value: false,
            phi: default_phi(),
            average_policy: AveragePolicy::default(),
        }
    }
}

impl<T: FieldValue> MappedBcConfig<T> {
    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> MappedResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| MappedBcError::invalid_config("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> MappedResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MhError::file_not_found(path).into());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| MhError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
        Self::from_json_str(&content)
    }

    /// 语义校验
    pub fn validate(&self) -> MappedResult<()> {
        if !self.perturb.is_finite() || self.perturb < 0.0 {
            return Err(MappedBcError::invalid_config(
                "perturb",
                format!("必须为非负有限值: {}", self.perturb),
            ));
        }
        if matches!(&self.field_table_name, Some(name) if name.trim().is_empty()) {
            return Err(MappedBcError::invalid_config("fieldTableName", "不能为空"));
        }
        if self.phi.trim().is_empty() {
            return Err(MappedBcError::invalid_config("phi", "不能为空"));
        }
        self.offset.build()?;
        Ok(())
    }

    /// 数据表名
    pub fn table_name<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.field_table_name.as_deref().unwrap_or(field_name)
    }

    /// 构造偏移函数
    pub fn offset_function(&self) -> MappedResult<OffsetFunction<T>> {
        self.offset.build()
    }
}
