// crates/uf_physics/src/boundary/ghost.rs

//! 幽灵状态计算
//!
//! 在边界外虚拟一个单元，按边界条件设置其状态，
//! 边界通量与内部边使用同一个黎曼求解器。幽灵单元底床取内部单元底床。

use glam::DVec2;

use super::types::BoundaryCondition;
use crate::state::ConservedState;

/// 计算幽灵单元状态
///
/// - `interior`: 内部单元状态
/// - `z_bed`: 内部单元底床高程
/// - `normal`: 边界边单位外法向
pub fn ghost_state(
    condition: &BoundaryCondition,
    interior: ConservedState,
    z_bed: f64,
    normal: DVec2,
) -> ConservedState {
    match *condition {
        BoundaryCondition::Reflective => {
            let m = interior.momentum();
            let mirrored = m - 2.0 * m.dot(normal) * normal;
            ConservedState::new(interior.h, mirrored.x, mirrored.y)
        }
        BoundaryCondition::Transmissive => interior,
        BoundaryCondition::Dirichlet { stage, xmom, ymom } => {
            ConservedState::new((stage - z_bed).max(0.0), xmom, ymom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reflective_negates_normal_component() {
        let s = ConservedState::new(1.0, 0.3, 0.4);
        let g = ghost_state(&BoundaryCondition::Reflective, s, 0.0, DVec2::X);
        assert_eq!(g, ConservedState::new(1.0, -0.3, 0.4));

        let n = DVec2::new(1.0, 1.0).normalize();
        let g = ghost_state(&BoundaryCondition::Reflective, s, 0.0, n);
        // 切向分量不变，法向分量反号
        let t = DVec2::new(-n.y, n.x);
        assert_relative_eq!(g.momentum().dot(t), s.momentum().dot(t), epsilon = 1e-14);
        assert_relative_eq!(g.momentum().dot(n), -s.momentum().dot(n), epsilon = 1e-14);
    }

    #[test]
    fn test_transmissive_copies() {
        let s = ConservedState::new(0.7, -0.1, 0.2);
        assert_eq!(ghost_state(&BoundaryCondition::Transmissive, s, 3.0, DVec2::Y), s);
    }

    #[test]
    fn test_dirichlet_depth_from_stage() {
        let s = ConservedState::ZERO;
        let g = ghost_state(&BoundaryCondition::stage(2.5), s, 1.0, DVec2::X);
        assert_eq!(g.h, 1.5);
        let g = ghost_state(&BoundaryCondition::stage(0.5), s, 1.0, DVec2::X);
        assert_eq!(g.h, 0.0);
    }
}
