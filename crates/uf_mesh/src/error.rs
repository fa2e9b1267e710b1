// crates/uf_mesh/src/error.rs

//! 网格处理错误类型
//!
//! 包含边界标签、多边形、三角化与拓扑错误定义。
//! 所有错误可转换为 `uf_foundation::UfError` 向上传播。

use thiserror::Error;
use uf_foundation::UfError;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 边界段索引越界
    #[error("边界标签 '{tag}' 引用了不存在的边界段 {segment}（共 {n_segments} 段）")]
    SegmentOutOfRange {
        tag: String,
        segment: usize,
        n_segments: usize,
    },

    /// 同一边界段被多个标签引用
    #[error("边界段 {segment} 同时被标签 '{first}' 与 '{second}' 引用")]
    SegmentTaggedTwice {
        segment: usize,
        first: String,
        second: String,
    },

    /// 洞多边形不在外边界内
    #[error("第 {hole} 个洞的顶点 ({x:.3}, {y:.3}) 位于外边界之外")]
    HoleOutsideBoundary { hole: usize, x: f64, y: f64 },

    /// 洞与外边界接触
    #[error("第 {hole} 个洞与外边界接触")]
    HoleTouchesBoundary { hole: usize },

    /// 两个洞接触或重叠
    #[error("第 {first} 个洞与第 {second} 个洞接触或重叠")]
    HolesIntersect { first: usize, second: usize },

    /// 无效参数
    #[error("无效的网格参数: {0}")]
    InvalidParameter(String),

    /// 三角化失败
    #[error("三角化失败: {0}")]
    Triangulation(String),

    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        operation: &'static str,
        details: String,
    },

    /// 单元数超过上限
    #[error("加密后单元数 {count} 超过上限 {limit}")]
    TooManyTriangles { count: usize, limit: usize },
}

impl MeshError {
    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 无效参数
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// 三角化失败
    pub fn triangulation(message: impl Into<String>) -> Self {
        Self::Triangulation(message.into())
    }
}

/// 转换到 Foundation 层错误
impl From<MeshError> for UfError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidParameter(msg) => UfError::invalid_input(msg),
            other => UfError::invalid_mesh(other.to_string()),
        }
    }
}
