// crates/uf_physics/src/schemes/hllc.rs

//! HLLC 近似黎曼求解器
//!
//! 在边的局部坐标系（法向 n，切向 t = (-n.y, n.x)）中求解一维黎曼问题：
//! 质量与法向动量取 HLL 通量，切向动量由接触波速度 `s_star` 决定上风侧。
//!
//! 波速采用 Einfeldt 估计；一侧为干时使用干床前锋速度 `u ∓ 2c`。

use glam::DVec2;

/// 边上的数值通量（全局坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiemannFlux {
    /// 质量通量 [m²/s]
    pub mass: f64,
    /// 动量通量 [m³/s²]
    pub momentum: DVec2,
    /// 最大波速 [m/s]，用于 CFL
    pub max_speed: f64,
}

impl RiemannFlux {
    pub const ZERO: Self = Self {
        mass: 0.0,
        momentum: DVec2::ZERO,
        max_speed: 0.0,
    };
}

/// HLLC 求解器
#[derive(Debug, Clone, Copy)]
pub struct HllcSolver {
    gravity: f64,
    h_min: f64,
}

impl HllcSolver {
    /// `h_min` 以下的水深按干处理
    pub fn new(gravity: f64, h_min: f64) -> Self {
        Self { gravity, h_min }
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// 物理通量 (h un, h un² + g h²/2, h un ut)
    #[inline]
    fn physical_flux(&self, h: f64, un: f64, ut: f64) -> [f64; 3] {
        [h * un, h * un * un + 0.5 * self.gravity * h * h, h * un * ut]
    }

    /// Einfeldt 波速估计
    #[inline]
    fn wave_speeds(&self, h_l: f64, h_r: f64, un_l: f64, un_r: f64) -> (f64, f64) {
        let c_l = (self.gravity * h_l).sqrt();
        let c_r = (self.gravity * h_r).sqrt();
        let sqrt_l = h_l.sqrt();
        let sqrt_r = h_r.sqrt();
        let u_roe = (sqrt_l * un_l + sqrt_r * un_r) / (sqrt_l + sqrt_r);
        let c_roe = (0.5 * self.gravity * (h_l + h_r)).sqrt();
        (
            (un_l - c_l).min(u_roe - c_roe),
            (un_r + c_r).max(u_roe + c_roe),
        )
    }

    /// 求解边上的黎曼问题
    ///
    /// `normal` 为单位外法向，由左单元指向右单元。
    pub fn solve(
        &self,
        h_left: f64,
        h_right: f64,
        vel_left: DVec2,
        vel_right: DVec2,
        normal: DVec2,
    ) -> RiemannFlux {
        let dry_l = h_left <= self.h_min;
        let dry_r = h_right <= self.h_min;
        if dry_l && dry_r {
            return RiemannFlux::ZERO;
        }

        let (h_l, vel_l) = if dry_l { (0.0, DVec2::ZERO) } else { (h_left, vel_left) };
        let (h_r, vel_r) = if dry_r { (0.0, DVec2::ZERO) } else { (h_right, vel_right) };

        let tangent = DVec2::new(-normal.y, normal.x);
        let un_l = vel_l.dot(normal);
        let un_r = vel_r.dot(normal);
        let ut_l = vel_l.dot(tangent);
        let ut_r = vel_r.dot(tangent);

        let (s_l, s_r) = if dry_l {
            let c_r = (self.gravity * h_r).sqrt();
            (un_r - 2.0 * c_r, un_r + c_r)
        } else if dry_r {
            let c_l = (self.gravity * h_l).sqrt();
            (un_l - c_l, un_l + 2.0 * c_l)
        } else {
            self.wave_speeds(h_l, h_r, un_l, un_r)
        };
        let max_speed = s_l.abs().max(s_r.abs());

        let f_l = self.physical_flux(h_l, un_l, ut_l);
        let f_r = self.physical_flux(h_r, un_r, ut_r);

        let [mass, mom_n, mom_t] = if s_l >= 0.0 {
            f_l
        } else if s_r <= 0.0 {
            f_r
        } else {
            let inv = 1.0 / (s_r - s_l);
            let mass = (s_r * f_l[0] - s_l * f_r[0] + s_l * s_r * (h_r - h_l)) * inv;
            let mom_n =
                (s_r * f_l[1] - s_l * f_r[1] + s_l * s_r * (h_r * un_r - h_l * un_l)) * inv;

            let denom = h_r * (un_r - s_r) - h_l * (un_l - s_l);
            let s_star = if denom.abs() < 1e-14 {
                0.5 * (un_l + un_r)
            } else {
                (s_l * h_r * (un_r - s_r) - s_r * h_l * (un_l - s_l)) / denom
            };
            let mom_t = if s_star >= 0.0 { mass * ut_l } else { mass * ut_r };
            [mass, mom_n, mom_t]
        };

        RiemannFlux {
            mass,
            momentum: normal * mom_n + tangent * mom_t,
            max_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver() -> HllcSolver {
        HllcSolver::new(9.81, 1e-6)
    }

    #[test]
    fn test_still_water_pressure_only() {
        let n = DVec2::X;
        let f = solver().solve(2.0, 2.0, DVec2::ZERO, DVec2::ZERO, n);
        assert_eq!(f.mass, 0.0);
        assert_relative_eq!(f.momentum.x, 0.5 * 9.81 * 4.0, max_relative = 1e-14);
        assert_relative_eq!(f.momentum.y, 0.0);
    }

    #[test]
    fn test_mirror_state_has_no_mass_flux() {
        let n = DVec2::new(0.6, 0.8);
        let v = DVec2::new(1.3, -0.4);
        let mirrored = v - 2.0 * v.dot(n) * n;
        let f = solver().solve(1.5, 1.5, v, mirrored, n);
        assert!(f.mass.abs() < 1e-12);

        let f = solver().solve(1.5, 1.5, DVec2::new(0.7, 0.0), DVec2::new(-0.7, 0.0), DVec2::X);
        assert_eq!(f.mass, 0.0);
    }

    #[test]
    fn test_antisymmetric_mass_flux() {
        let n = DVec2::new(0.0, 1.0);
        let (vl, vr) = (DVec2::new(0.2, 0.5), DVec2::new(-0.1, 0.1));
        let a = solver().solve(1.0, 0.4, vl, vr, n);
        let b = solver().solve(0.4, 1.0, vr, vl, -n);
        assert_relative_eq!(a.mass, -b.mass, max_relative = 1e-12);
        assert_relative_eq!(a.momentum.x, -b.momentum.x, max_relative = 1e-12, epsilon = 1e-14);
        assert_relative_eq!(a.momentum.y, -b.momentum.y, max_relative = 1e-12);
    }

    #[test]
    fn test_dam_break_flows_into_dry() {
        let f = solver().solve(1.0, 0.0, DVec2::ZERO, DVec2::ZERO, DVec2::X);
        assert!(f.mass > 0.0);
        // 干床前锋速度 2c
        assert_relative_eq!(f.max_speed, 2.0 * 9.81f64.sqrt(), max_relative = 1e-12);

        let none = solver().solve(0.0, 0.0, DVec2::ZERO, DVec2::ZERO, DVec2::X);
        assert_eq!(none, RiemannFlux::ZERO);
    }

    #[test]
    fn test_supercritical_upwind() {
        // 左侧超临界流，通量等于左侧物理通量
        let h = 0.5;
        let u = 5.0;
        let f = solver().solve(h, h, DVec2::new(u, 0.0), DVec2::new(u, 0.0), DVec2::X);
        assert_relative_eq!(f.mass, h * u, max_relative = 1e-14);
        assert_relative_eq!(f.momentum.x, h * u * u + 0.5 * 9.81 * h * h, max_relative = 1e-14);
    }
}
