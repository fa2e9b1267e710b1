// crates/uf_physics/src/error.rs

//! 物理求解错误类型

use thiserror::Error;
use uf_foundation::UfError;
use uf_io::IoError;
use uf_mesh::MeshError;

/// 物理模块结果类型
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理求解错误
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// 网格中存在未指定边界条件的标签
    #[error("以下边界标签未指定边界条件: {}", .tags.join(", "))]
    UnassignedBoundary { tags: Vec<String> },

    /// 边界条件指定给了网格中不存在的标签
    #[error("网格中不存在边界标签 '{tag}'（可用: {}）", .available.join(", "))]
    UnknownBoundaryTag { tag: String, available: Vec<String> },

    /// 区域中心不在网格内
    #[error("区域中心 ({x}, {y}) 不在网格内")]
    RegionOutsideMesh { x: f64, y: f64 },

    /// 区域不包含任何单元
    #[error("区域 '{region}' 不包含任何单元")]
    EmptyRegion { region: String },

    /// 数值不稳定
    #[error("数值不稳定 (t = {time:.3} s): {reason}")]
    NumericalInstability { time: f64, reason: String },

    /// 参数无效
    #[error("参数无效: {0}")]
    InvalidParameter(String),

    /// 数组长度与单元数不匹配
    #[error("{name} 长度不匹配: 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 网格错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 输出错误
    #[error(transparent)]
    Io(#[from] IoError),

    /// 基础层错误
    #[error(transparent)]
    Foundation(#[from] UfError),
}

impl PhysicsError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn instability(time: f64, reason: impl Into<String>) -> Self {
        Self::NumericalInstability {
            time,
            reason: reason.into(),
        }
    }
}

impl From<PhysicsError> for UfError {
    fn from(err: PhysicsError) -> Self {
        match err {
            PhysicsError::Mesh(e) => e.into(),
            PhysicsError::Io(e) => e.into(),
            PhysicsError::Foundation(e) => e,
            PhysicsError::SizeMismatch {
                name,
                expected,
                actual,
            } => UfError::size_mismatch(name, expected, actual),
            PhysicsError::NumericalInstability { .. } => UfError::numerical(err.to_string()),
            PhysicsError::InvalidParameter(_) => UfError::invalid_input(err.to_string()),
            other => UfError::validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_message_lists_tags() {
        let err = PhysicsError::UnassignedBoundary {
            tags: vec!["interior".into(), "top".into()],
        };
        assert!(err.to_string().contains("interior, top"));
    }

    #[test]
    fn test_conversion() {
        let uf: UfError = PhysicsError::instability(1.0, "dt = NaN").into();
        assert!(matches!(uf, UfError::Numerical(_)));
        let uf: UfError = PhysicsError::RegionOutsideMesh { x: 0.0, y: 0.0 }.into();
        assert!(matches!(uf, UfError::Validation(_)));
    }
}
