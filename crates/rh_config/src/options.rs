// crates/rh_config/src/options.rs

//! 核心识别的选项枚举
//!
//! - [`InterpolationMode`]: 剖面网格插值方式（序号 0/1/2 与界面下拉框一致）
//! - [`TransferMethod`]: 单元值到节点值的传递方式
//! - [`DominantCase`]: 主导底质并列时的判定规则
//!
//! 所有枚举都支持 `FromStr`，解析失败返回 [`OptionParseError`]。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 选项解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionParseError {
    /// 选项名称
    pub option: &'static str,
    /// 输入值
    pub value: String,
    /// 可接受的取值
    pub expected: &'static str,
}

impl fmt::Display for OptionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "无效的{}: '{}', 期望 {}",
            self.option, self.value, self.expected
        )
    }
}

impl std::error::Error for OptionParseError {}

// ============================================================================
// InterpolationMode
// ============================================================================

/// 剖面网格插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// 直接连接相邻剖面，不生成新剖面
    Block,
    /// 剖面间线性插值
    Linear,
    /// 剖面间几何插值，数值取最近的观测点
    Nearest,
}

impl InterpolationMode {
    const EXPECTED: &'static str = "'block', 'linear', 'nearest' 或 0/1/2";

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Linear => "linear",
            Self::Nearest => "nearest",
        }
    }

    /// 序号（0 = block, 1 = linear, 2 = nearest）
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Block => 0,
            Self::Linear => 1,
            Self::Nearest => 2,
        }
    }

    /// 由序号构造
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Block),
            1 => Some(Self::Linear),
            2 => Some(Self::Nearest),
            _ => None,
        }
    }

    /// 是否在剖面之间插入新剖面
    #[inline]
    pub fn adds_profiles(&self) -> bool {
        !matches!(self, Self::Block)
    }
}

impl Default for InterpolationMode {
    fn default() -> Self {
        Self::Block
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InterpolationMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "block" | "0" => Ok(Self::Block),
            "linear" | "1" => Ok(Self::Linear),
            "nearest" | "2" => Ok(Self::Nearest),
            _ => Err(OptionParseError {
                option: "插值方式",
                value: s.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

// ============================================================================
// TransferMethod
// ============================================================================

/// 单元值到节点值的传递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    /// 单元中心局部三角化上的重心插值
    Linear,
    /// 最近单元中心
    Nearest,
}

impl TransferMethod {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Nearest => "nearest",
        }
    }
}

impl Default for TransferMethod {
    fn default() -> Self {
        Self::Linear
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TransferMethod {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "nearest" => Ok(Self::Nearest),
            _ => Err(OptionParseError {
                option: "传递方式",
                value: s.to_string(),
                expected: "'linear' 或 'nearest'",
            }),
        }
    }
}

// ============================================================================
// DominantCase
// ============================================================================

/// 主导底质并列时的判定规则
///
/// 配置文件中以整数保存：-1 取最细，0 不判定，1 取最粗。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum DominantCase {
    /// 并列时取最细的类（类序号最小）
    Finest,
    /// 并列时不判定，返回哨兵值
    Undetermined,
    /// 并列时取最粗的类（类序号最大）
    Coarsest,
}

impl DominantCase {
    /// 整数值
    pub fn value(&self) -> i8 {
        match self {
            Self::Finest => -1,
            Self::Undetermined => 0,
            Self::Coarsest => 1,
        }
    }
}

impl Default for DominantCase {
    fn default() -> Self {
        Self::Coarsest
    }
}

impl TryFrom<i8> for DominantCase {
    type Error = OptionParseError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Finest),
            0 => Ok(Self::Undetermined),
            1 => Ok(Self::Coarsest),
            other => Err(OptionParseError {
                option: "主导底质判定",
                value: other.to_string(),
                expected: "-1, 0 或 1",
            }),
        }
    }
}

impl From<DominantCase> for i8 {
    fn from(case: DominantCase) -> Self {
        case.value()
    }
}

impl fmt::Display for DominantCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for DominantCase {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finest" => Ok(Self::Finest),
            "undetermined" => Ok(Self::Undetermined),
            "coarsest" => Ok(Self::Coarsest),
            other => other
                .parse::<i8>()
                .map_err(|_| OptionParseError {
                    option: "主导底质判定",
                    value: s.to_string(),
                    expected: "-1, 0, 1 或 'finest'/'undetermined'/'coarsest'",
                })
                .and_then(Self::try_from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_ordinal() {
        for ord in 0..3u8 {
            let mode = InterpolationMode::from_ordinal(ord).unwrap();
            assert_eq!(mode.ordinal(), ord);
        }
        assert!(InterpolationMode::from_ordinal(3).is_none());
        assert_eq!(InterpolationMode::default(), InterpolationMode::Block);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Linear".parse::<InterpolationMode>().unwrap(), InterpolationMode::Linear);
        assert_eq!("2".parse::<InterpolationMode>().unwrap(), InterpolationMode::Nearest);
        let err = "cubic".parse::<InterpolationMode>().unwrap_err();
        assert!(err.to_string().contains("cubic"));
    }

    #[test]
    fn test_transfer_parse() {
        assert_eq!("nearest".parse::<TransferMethod>().unwrap(), TransferMethod::Nearest);
        assert!("idw".parse::<TransferMethod>().is_err());
    }

    #[test]
    fn test_dominant_case() {
        assert_eq!(DominantCase::try_from(-1).unwrap(), DominantCase::Finest);
        assert_eq!("0".parse::<DominantCase>().unwrap(), DominantCase::Undetermined);
        assert_eq!("coarsest".parse::<DominantCase>().unwrap(), DominantCase::Coarsest);
        assert!(DominantCase::try_from(2).is_err());
        assert_eq!(i8::from(DominantCase::default()), 1);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&InterpolationMode::Nearest).unwrap();
        assert_eq!(json, "\"nearest\"");
        let case: DominantCase = serde_json::from_str("-1").unwrap();
        assert_eq!(case, DominantCase::Finest);
        assert!(serde_json::from_str::<DominantCase>("5").is_err());
    }
}
