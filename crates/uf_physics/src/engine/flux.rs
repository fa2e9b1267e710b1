// crates/uf_physics/src/engine/flux.rs

//! 单元通量累加
//!
//! 一阶有限体积格式，配合 Audusse 静水重构保证静水平衡：
//!
//! ```text
//! z_f  = max(z_i, z_j)
//! h_i* = max(0, h_i + z_i - z_f)
//! h_j* = max(0, h_j + z_j - z_f)
//! dU_i/dt = -1/A_i Σ_k l_k [F(U_i*, U_j*, n_k) + (0, g/2 (h_i² - h_i*²) n_k)]
//! ```
//!
//! 每个单元独立计算自身三条边的通量，单元之间无写冲突，
//! 并行结果与线程数无关。

use glam::DVec2;
use rayon::prelude::*;
use uf_foundation::Tolerance;
use uf_mesh::{FrozenMesh, Neighbor};

use crate::boundary::{ghost_state, BoundaryCondition};
use crate::schemes::HllcSolver;
use crate::state::ConservedState;

/// 单元变化率
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellRate {
    /// dh/dt [m/s]
    pub dh: f64,
    /// d(hu)/dt [m²/s²]
    pub dhu: f64,
    /// d(hv)/dt [m²/s²]
    pub dhv: f64,
    /// 单元允许的时间步 `inradius / 最大波速`（未乘 CFL）
    pub dt_limit: f64,
}

/// 通量计算所需的只读数据
pub struct FluxContext<'a> {
    pub mesh: &'a FrozenMesh,
    pub elevation: &'a [f64],
    /// 按边界标签编号索引的边界条件
    pub conditions: &'a [BoundaryCondition],
    pub solver: HllcSolver,
    pub tolerance: Tolerance,
}

impl FluxContext<'_> {
    #[inline]
    fn state(&self, cell: usize, stage: &[f64], xmom: &[f64], ymom: &[f64]) -> ConservedState {
        ConservedState::new(
            (stage[cell] - self.elevation[cell]).max(0.0),
            xmom[cell],
            ymom[cell],
        )
    }

    /// 单个单元的变化率
    pub fn cell_rate(&self, cell: usize, stage: &[f64], xmom: &[f64], ymom: &[f64]) -> CellRate {
        let mesh = self.mesh;
        let g = self.solver.gravity();
        let z_i = self.elevation[cell];
        let own = self.state(cell, stage, xmom, ymom);
        let vel_i = own.velocity(&self.tolerance);

        let mut mass = 0.0;
        let mut momentum = DVec2::ZERO;
        let mut max_speed: f64 = 0.0;

        for k in 0..3 {
            let n = mesh.edge_normals[cell][k];
            let normal = DVec2::new(n.x, n.y);
            let length = mesh.edge_lengths[cell][k];

            let (z_j, other) = match mesh.neighbors[cell][k] {
                Neighbor::Cell(j) => (self.elevation[j], self.state(j, stage, xmom, ymom)),
                Neighbor::Boundary(b) => {
                    let tag = mesh.boundary_edges[b].tag;
                    (z_i, ghost_state(&self.conditions[tag], own, z_i, normal))
                }
            };

            let z_face = z_i.max(z_j);
            let h_left = (own.h + z_i - z_face).max(0.0);
            let h_right = (other.h + z_j - z_face).max(0.0);
            let flux = self.solver.solve(
                h_left,
                h_right,
                vel_i,
                other.velocity(&self.tolerance),
                normal,
            );

            let correction = 0.5 * g * (own.h * own.h - h_left * h_left);
            mass -= length * flux.mass;
            momentum -= length * (flux.momentum + correction * normal);
            max_speed = max_speed.max(flux.max_speed);
        }

        let inv_area = 1.0 / mesh.areas[cell];
        CellRate {
            dh: mass * inv_area,
            dhu: momentum.x * inv_area,
            dhv: momentum.y * inv_area,
            dt_limit: if max_speed > 1e-12 {
                mesh.inradii[cell] / max_speed
            } else {
                f64::INFINITY
            },
        }
    }

    /// 并行计算全部单元变化率，返回最小的 `dt_limit`
    pub fn compute_rates(
        &self,
        stage: &[f64],
        xmom: &[f64],
        ymom: &[f64],
        rates: &mut [CellRate],
    ) -> f64 {
        rates
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, rate)| *rate = self.cell_rate(i, stage, xmom, ymom));

        rates
            .par_iter()
            .map(|r| r.dt_limit)
            .reduce(|| f64::INFINITY, |a, b| if b < a || b.is_nan() { b } else { a })
    }
}
