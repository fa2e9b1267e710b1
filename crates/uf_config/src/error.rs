// crates/uf_config/src/error.rs

//! 配置层错误类型

use std::path::PathBuf;

use uf_foundation::UfError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 读写场景文件失败
    #[error("IO 错误: {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialize(String),

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

    /// 未知预设
    #[error("未知预设 '{name}'，可用: {available}")]
    UnknownPreset {
        /// 请求的名称
        name: String,
        /// 可用预设（逗号分隔）
        available: String,
    },
}

impl ConfigError {
    /// 构造无效值错误
    pub fn invalid(key: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for UfError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { path, source } => UfError::open_failed(path, source),
            other => UfError::config(other.to_string()),
        }
    }
}
