// crates/rh_pipeline/src/error.rs

//! 流程错误
//!
//! 只有文件级错误（配置无效、底质为空、输入整体不一致）会中止运行；
//! 单个时间步的失败记录在 [`crate::TimestepFailure`] 中。

use rh_config::ConfigError;
use rh_foundation::RhError;
use thiserror::Error;

/// 流程错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 准备阶段失败（糙率表、底质网格、网格拆分等）
    #[error("准备失败: {0}")]
    Setup(#[from] RhError),

    /// 时间步数不一致
    #[error("时间步数不一致: {what} 有 {actual} 步, 应为 {expected} 步")]
    TimestepCount {
        /// 数据名称
        what: &'static str,
        /// 期望步数
        expected: usize,
        /// 实际步数
        actual: usize,
    },
}

/// 流程结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<PipelineError> for RhError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Config(e) => e.into(),
            PipelineError::Setup(e) => e,
            PipelineError::TimestepCount {
                what,
                expected,
                actual,
            } => RhError::size_mismatch(what, expected, actual),
        }
    }
}
