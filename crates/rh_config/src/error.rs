// crates/rh_config/src/error.rs

//! 配置层错误类型

use rh_foundation::RhError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },
}

impl ConfigError {
    /// 构造无效值错误
    pub fn invalid(key: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// 转换到基础层错误
impl From<ConfigError> for RhError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(source) => RhError::io_with_source("读取配置文件失败", source),
            ConfigError::Parse(message) => RhError::config(message),
            ConfigError::InvalidValue { key, value, reason } => {
                RhError::invalid_config(key, value, reason)
            }
        }
    }
}
