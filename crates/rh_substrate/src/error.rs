// crates/rh_substrate/src/error.rs
//! 底质层错误类型
//!
//! 所有错误可转换为 `rh_foundation::RhError` 向上传播

use rh_foundation::RhError;
use thiserror::Error;

/// 底质错误枚举
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubstrateError {
    /// 分类编码超出该编码体系的范围
    #[error("{system} 底质编码无效: {code} (有效范围 1..={max})")]
    InvalidCode {
        /// 编码体系名称
        system: &'static str,
        /// 编码
        code: u8,
        /// 最大编码
        max: u8,
    },

    /// 百分比向量长度与分类数不一致
    #[error("{system} 百分比向量长度 {actual}, 应为 {expected}")]
    PercentageLength {
        /// 编码体系名称
        system: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 百分比含负值或非有限值
    #[error("底质百分比无效: 第 {class} 类为 {value}")]
    InvalidPercentage {
        /// 分类编号（从 1 开始）
        class: usize,
        /// 数值
        value: f64,
    },

    /// 编码体系之间不支持的转换
    #[error("不支持从 {from} 转换到 {to}")]
    UnsupportedConversion {
        /// 源编码体系
        from: &'static str,
        /// 目标编码体系
        to: &'static str,
    },

    /// 未知的编码体系名称
    #[error("未知的底质编码体系: '{name}'")]
    UnknownSystem {
        /// 输入的名称
        name: String,
    },

    /// 底质网格没有多边形
    #[error("底质网格没有多边形")]
    EmptySubstrate,

    /// 多边形顶点编号越界或顶点不足
    #[error("底质多边形 {polygon} 无效: {reason}")]
    InvalidPolygon {
        /// 多边形编号
        polygon: usize,
        /// 原因
        reason: String,
    },
}

/// 转换到基础层错误
impl From<SubstrateError> for RhError {
    fn from(err: SubstrateError) -> Self {
        match err {
            SubstrateError::InvalidCode { code, max, .. } => {
                RhError::out_of_range("substrate_code", f64::from(code), 1.0, f64::from(max))
            }
            SubstrateError::EmptySubstrate => RhError::empty_data("底质网格没有多边形"),
            SubstrateError::InvalidPolygon { .. } => RhError::invalid_mesh(err.to_string()),
            other => RhError::invalid_input(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_rh_error() {
        let err: RhError = SubstrateError::InvalidCode {
            system: "Cemagref",
            code: 9,
            max: 8,
        }
        .into();
        assert!(matches!(err, RhError::OutOfRange { .. }));

        let err: RhError = SubstrateError::EmptySubstrate.into();
        assert!(matches!(err, RhError::EmptyData { .. }));
    }
}
