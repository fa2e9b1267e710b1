// crates/uf_physics/src/engine/friction.rs

//! Manning 摩擦
//!
//! 摩擦源项:
//! ```text
//! S_f = -g * n^2 * |V| / h^(4/3) * q
//! ```
//!
//! 浅水时摩擦项刚性很强，采用半隐式更新:
//! ```text
//! q^{n+1} = q^n / (1 + dt * C_f),  C_f = g * n^2 * |V| / h^(4/3)
//! ```

use rayon::prelude::*;
use uf_foundation::Tolerance;

/// Manning 摩擦计算器
#[derive(Debug, Clone, Copy)]
pub struct ManningFriction {
    g: f64,
    tolerance: Tolerance,
}

impl ManningFriction {
    pub fn new(g: f64, tolerance: Tolerance) -> Self {
        Self { g, tolerance }
    }

    /// 摩擦系数 C_f，干单元为 0
    #[inline]
    pub fn coefficient(&self, h: f64, hu: f64, hv: f64, manning_n: f64) -> f64 {
        if self.tolerance.is_dry(h) || manning_n <= 0.0 {
            return 0.0;
        }
        let u = hu / h;
        let v = hv / h;
        let speed = (u * u + v * v).sqrt();
        self.g * manning_n * manning_n * speed / h.powf(4.0 / 3.0)
    }

    /// 单个单元的半隐式更新
    #[inline]
    pub fn apply_semi_implicit(&self, h: f64, hu: f64, hv: f64, manning_n: f64, dt: f64) -> (f64, f64) {
        let cf = self.coefficient(h, hu, hv, manning_n);
        let factor = 1.0 / (1.0 + dt * cf);
        (hu * factor, hv * factor)
    }

    /// 并行作用于全部单元
    pub fn apply(
        &self,
        depth: &[f64],
        friction: &[f64],
        xmom: &mut [f64],
        ymom: &mut [f64],
        dt: f64,
    ) {
        xmom.par_iter_mut()
            .zip(ymom.par_iter_mut())
            .enumerate()
            .for_each(|(i, (hu, hv))| {
                let (new_hu, new_hv) = self.apply_semi_implicit(depth[i], *hu, *hv, friction[i], dt);
                *hu = new_hu;
                *hv = new_hv;
            });
    }
}
