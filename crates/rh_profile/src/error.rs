// crates/rh_profile/src/error.rs
//! 剖面层错误类型
//!
//! 所有错误可转换为 `rh_foundation::RhError` 向上传播

use rh_foundation::RhError;
use thiserror::Error;

/// 剖面错误枚举
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// 横向距离递减
    #[error("剖面横向距离递减: 采样点 {sample} ({value} < {previous})")]
    NonMonotonicLateral {
        /// 采样点编号
        sample: usize,
        /// 当前值
        value: f64,
        /// 前一个值
        previous: f64,
    },

    /// 采样值非有限
    #[error("剖面采样点 {sample} 含非有限值")]
    NonFiniteSample {
        /// 采样点编号
        sample: usize,
    },

    /// 水力数据与采样点数不一致
    #[error("剖面 {profile}: {field} 长度 {actual}, 采样点数 {expected}")]
    HydroLength {
        /// 剖面编号
        profile: usize,
        /// 字段名
        field: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 河段划分无效
    #[error("河段划分无效: {reason}")]
    InvalidLayout {
        /// 原因
        reason: String,
    },

    /// 糙率表中找不到剖面
    #[error("糙率表中没有剖面 {profile} 或更小编号的剖面")]
    MissingRoughness {
        /// 剖面编号
        profile: usize,
    },

    /// 糙率无效
    #[error("剖面 {profile} 距离 {distance} 处糙率无效: {n}")]
    InvalidRoughness {
        /// 剖面编号
        profile: usize,
        /// 距离
        distance: f64,
        /// 糙率
        n: f64,
    },

    /// 剖面全干但流量为正
    #[error("剖面 {profile} 在水位 {water_level} 下无过水面积, 无法分配流量 {discharge}")]
    DryProfile {
        /// 剖面编号
        profile: usize,
        /// 水位
        water_level: f64,
        /// 流量
        discharge: f64,
    },
}

/// 转换到基础层错误
impl From<ProfileError> for RhError {
    fn from(err: ProfileError) -> Self {
        RhError::invalid_input(err.to_string())
    }
}
