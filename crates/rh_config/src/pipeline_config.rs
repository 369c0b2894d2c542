// crates/rh_config/src/pipeline_config.rs

//! 流程配置
//!
//! JSON 格式，所有字段均可省略并取默认值。

use crate::error::ConfigError;
use crate::options::{DominantCase, InterpolationMode, TransferMethod};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 插入剖面数下限
pub const MIN_ADD_PROFILE: usize = 1;
/// 插入剖面数上限
pub const MAX_ADD_PROFILE: usize = 500;

/// 剖面网格配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// 插值方式
    #[serde(default)]
    pub mode: InterpolationMode,

    /// 相邻观测剖面之间插入的剖面数（仅 linear/nearest 使用）
    #[serde(default = "default_nb_add_profile")]
    pub nb_add_profile: usize,
}

fn default_nb_add_profile() -> usize { 2 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            mode: InterpolationMode::default(),
            nb_add_profile: default_nb_add_profile(),
        }
    }
}

/// 干湿裁剪配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WetConfig {
    /// 最小水深 [m]
    #[serde(default)]
    pub min_depth: f64,
}

impl Default for WetConfig {
    fn default() -> Self {
        Self { min_depth: 0.0 }
    }
}

/// 曼宁糙率配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManningConfig {
    /// 常数糙率
    #[serde(default = "default_manning")]
    pub coefficient: f64,

    /// 糙率表文件（`profile, distance, n`），给出时优先于常数
    #[serde(default)]
    pub table: Option<PathBuf>,

    /// 流速分布的等距采样点数，`None` 表示在剖面原有点上计算
    #[serde(default = "default_nb_point_vel")]
    pub nb_point_vel: Option<usize>,
}

fn default_manning() -> f64 { 0.025 }
fn default_nb_point_vel() -> Option<usize> { Some(70) }

impl Default for ManningConfig {
    fn default() -> Self {
        Self {
            coefficient: default_manning(),
            table: None,
            nb_point_vel: default_nb_point_vel(),
        }
    }
}

/// 底质配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateConfig {
    /// 未匹配单元使用的默认底质代码（Cemagref 1..=8）
    #[serde(default = "default_substrate_code")]
    pub default_code: u8,

    /// 主导底质判定规则
    #[serde(default)]
    pub dominant_case: DominantCase,
}

fn default_substrate_code() -> u8 { 1 }

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            default_code: default_substrate_code(),
            dominant_case: DominantCase::default(),
        }
    }
}

/// 单元到节点传递配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// 传递方式
    #[serde(default)]
    pub method: TransferMethod,
}

/// 整体流程配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 剖面网格
    #[serde(default)]
    pub grid: GridConfig,
    /// 干湿裁剪
    #[serde(default)]
    pub wet: WetConfig,
    /// 曼宁糙率
    #[serde(default)]
    pub manning: ManningConfig,
    /// 底质
    #[serde(default)]
    pub substrate: SubstrateConfig,
    /// 单元到节点传递
    #[serde(default)]
    pub transfer: TransferConfig,
    /// 是否并行处理时间步
    #[serde(default)]
    pub parallel: bool,
}

impl PipelineConfig {
    /// 从 JSON 文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n_add = self.grid.nb_add_profile;
        if !(MIN_ADD_PROFILE..=MAX_ADD_PROFILE).contains(&n_add) {
            return Err(ConfigError::invalid(
                "grid.nb_add_profile",
                n_add,
                format!("必须在 [{}, {}] 范围内", MIN_ADD_PROFILE, MAX_ADD_PROFILE),
            ));
        }

        let min_depth = self.wet.min_depth;
        if !min_depth.is_finite() || min_depth < 0.0 {
            return Err(ConfigError::invalid(
                "wet.min_depth",
                min_depth,
                "必须为非负有限值",
            ));
        }

        let n = self.manning.coefficient;
        if !n.is_finite() || n <= 0.0 {
            return Err(ConfigError::invalid(
                "manning.coefficient",
                n,
                "糙率必须为正",
            ));
        }

        if let Some(nb) = self.manning.nb_point_vel {
            if nb < 2 {
                return Err(ConfigError::invalid(
                    "manning.nb_point_vel",
                    nb,
                    "采样点数至少为 2",
                ));
            }
        }

        let code = self.substrate.default_code;
        if !(1..=8).contains(&code) {
            return Err(ConfigError::invalid(
                "substrate.default_code",
                code,
                "默认底质必须在 [1, 8] 范围内",
            ));
        }

        Ok(())
    }

    /// 保存为 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.mode, InterpolationMode::Block);
        assert_eq!(config.grid.nb_add_profile, 2);
        assert!((config.manning.coefficient - 0.025).abs() < 1e-12);
        assert_eq!(config.manning.nb_point_vel, Some(70));
        assert_eq!(config.substrate.default_code, 1);
        assert_eq!(config.substrate.dominant_case, DominantCase::Coarsest);
        assert_eq!(config.transfer.method, TransferMethod::Linear);
        assert!(!config.parallel);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "grid": { "mode": "nearest", "nb_add_profile": 10 },
            "substrate": { "dominant_case": -1 },
            "parallel": true
        }"#;
        let config = PipelineConfig::from_json(json).unwrap();
        assert_eq!(config.grid.mode, InterpolationMode::Nearest);
        assert_eq!(config.grid.nb_add_profile, 10);
        assert_eq!(config.substrate.dominant_case, DominantCase::Finest);
        assert_eq!(config.substrate.default_code, 1);
        assert!(config.parallel);
    }

    #[test]
    fn test_invalid_nb_add_profile() {
        let mut config = PipelineConfig::default();
        config.grid.nb_add_profile = 0;
        assert!(config.validate().is_err());
        config.grid.nb_add_profile = 501;
        assert!(config.validate().is_err());
        config.grid.nb_add_profile = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = PipelineConfig::default();
        config.substrate.default_code = 9;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.wet.min_depth = -0.1;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.manning.coefficient = 0.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.manning.nb_point_vel = Some(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let json = r#"{ "grid": { "mode": "cubic" } }"#;
        assert!(matches!(
            PipelineConfig::from_json(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");

        let mut config = PipelineConfig::default();
        config.grid.mode = InterpolationMode::Linear;
        config.wet.min_depth = 0.05;
        config.manning.table = Some(PathBuf::from("manning.txt"));
        config.save_to_file(&path).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let result = PipelineConfig::from_file("/nonexistent/pipeline.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
