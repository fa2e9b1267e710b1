// crates/uf_viz/src/error.rs

//! 可视化错误类型

use std::path::{Path, PathBuf};

use thiserror::Error;
use uf_foundation::UfError;
use uf_io::IoError;

/// 可视化结果类型别名
pub type VizResult<T> = Result<T, VizError>;

/// 可视化错误
#[derive(Error, Debug)]
pub enum VizError {
    /// 文件读写失败
    #[error("文件读写失败: {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 图像编解码失败
    #[error("图像处理失败: {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 没有可合成的帧
    #[error("目录 {dir} 中没有匹配 {pattern} 的帧")]
    NoFrames { dir: PathBuf, pattern: String },

    /// 没有可绘制的数据
    #[error("没有可绘制的数据: {0}")]
    Empty(String),

    /// 数据长度与网格不匹配
    #[error("数据长度不匹配: {name} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 结果文件错误
    #[error(transparent)]
    Sww(#[from] IoError),
}

impl VizError {
    pub fn file(path: &Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn image(path: &Path, source: image::ImageError) -> Self {
        Self::Image {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<VizError> for UfError {
    fn from(err: VizError) -> Self {
        match err {
            VizError::File { path, source } => UfError::open_failed(path, source),
            VizError::Image { path, source } => {
                UfError::io(format!("图像处理失败 [{}]: {source}", path.display()))
            }
            VizError::NoFrames { dir, pattern } => UfError::invalid_input(format!(
                "目录 {} 中没有匹配 {pattern} 的帧",
                dir.display()
            )),
            VizError::Empty(what) => UfError::invalid_input(format!("没有可绘制的数据: {what}")),
            VizError::SizeMismatch {
                name,
                expected,
                actual,
            } => UfError::size_mismatch(name, expected, actual),
            VizError::Sww(e) => e.into(),
        }
    }
}
