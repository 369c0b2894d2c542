// crates/rh_config/src/lib.rs

//! RiverHab Config Layer
//!
//! 配置层，定义核心识别的全部选项及其默认值与取值范围。
//!
//! # 模块概览
//!
//! - [`options`]: 插值方式、节点传递方式、主导底质判定等枚举
//! - [`pipeline_config`]: `PipelineConfig` 整体配置（JSON）
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```
//! use rh_config::{InterpolationMode, PipelineConfig};
//!
//! let mut config = PipelineConfig::default();
//! config.grid.mode = InterpolationMode::Linear;
//! config.grid.nb_add_profile = 5;
//! assert!(config.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod options;
pub mod pipeline_config;

// 重导出核心类型
pub use error::ConfigError;
pub use options::{DominantCase, InterpolationMode, OptionParseError, TransferMethod};
pub use pipeline_config::{
    GridConfig, ManningConfig, PipelineConfig, SubstrateConfig, TransferConfig, WetConfig,
    MAX_ADD_PROFILE, MIN_ADD_PROFILE,
};
