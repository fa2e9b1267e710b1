// crates/uf_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，所有错误最终可转换为 UfError。

use std::path::PathBuf;

use thiserror::Error;
use uf_foundation::UfError;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件读写失败
    #[error("文件读写失败: {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 文件格式错误
    #[error("文件格式错误: {path}, {reason}")]
    Format { path: PathBuf, reason: String },

    /// 版本不兼容
    #[error("版本不兼容: 文件版本 {file}, 当前版本 {current}")]
    Version { file: u32, current: u32 },

    /// 数据长度与网格不匹配
    #[error("数据长度不匹配: {name} 期望 {expected}, 实际 {found}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    /// 时间片索引越界
    #[error("时间片 {index} 不存在（共 {count} 个）")]
    SliceOutOfRange { index: usize, count: usize },

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] UfError),
}

impl IoError {
    /// 带路径的 IO 错误
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// 格式错误
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<IoError> for UfError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::File { path, source } => UfError::open_failed(path, source),
            IoError::Format { path, reason } => {
                UfError::io(format!("文件格式错误 [{}]: {reason}", path.display()))
            }
            IoError::Version { file, current } => {
                UfError::io(format!("版本不兼容 (文件 {file}, 当前 {current})"))
            }
            IoError::LengthMismatch {
                name,
                expected,
                found,
            } => UfError::size_mismatch(name, expected, found),
            IoError::SliceOutOfRange { index, count } => {
                UfError::invalid_input(format!("时间片 {index} 不存在（共 {count} 个）"))
            }
            IoError::Foundation(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err = IoError::file(
            "/tmp/none.sww",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let uf: UfError = err.into();
        assert!(matches!(uf, UfError::FileNotFound { .. }));
    }

    #[test]
    fn test_length_mismatch_conversion() {
        let uf: UfError = IoError::LengthMismatch {
            name: "stage",
            expected: 4,
            found: 3,
        }
        .into();
        assert!(matches!(uf, UfError::SizeMismatch { expected: 4, actual: 3, .. }));
    }
}
