// crates/uf_physics/src/boundary/types.rs

//! 边界条件类型定义

use serde::{Deserialize, Serialize};

/// 边界条件
///
/// 通过边界标签绑定到网格边界边，由幽灵单元状态参与通量计算。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// 固壁（无穿透）
    ///
    /// 水深与切向速度保持，法向速度反向。
    Reflective,

    /// 自由出流
    ///
    /// 幽灵单元复制内部状态。
    Transmissive,

    /// 给定水位与动量
    Dirichlet {
        /// 水位 [m]
        stage: f64,
        /// x 方向单宽流量 [m²/s]
        #[serde(default)]
        xmom: f64,
        /// y 方向单宽流量 [m²/s]
        #[serde(default)]
        ymom: f64,
    },
}

impl BoundaryCondition {
    /// 给定水位、静水的 Dirichlet 边界
    pub fn stage(stage: f64) -> Self {
        Self::Dirichlet {
            stage,
            xmom: 0.0,
            ymom: 0.0,
        }
    }

    /// 是否为固壁
    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Self::Reflective)
    }
}

impl std::fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reflective => write!(f, "Reflective"),
            Self::Transmissive => write!(f, "Transmissive"),
            Self::Dirichlet { stage, xmom, ymom } => {
                write!(f, "Dirichlet(stage={stage}, xmom={xmom}, ymom={ymom})")
            }
        }
    }
}
