// crates/uf_physics/src/state.rs

//! 单元守恒状态

use glam::DVec2;
use uf_foundation::Tolerance;

/// 单个单元的守恒状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConservedState {
    /// 水深 [m]
    pub h: f64,
    /// x 方向动量 [m²/s]
    pub hu: f64,
    /// y 方向动量 [m²/s]
    pub hv: f64,
}

impl ConservedState {
    pub const ZERO: Self = Self {
        h: 0.0,
        hu: 0.0,
        hv: 0.0,
    };

    #[inline]
    pub const fn new(h: f64, hu: f64, hv: f64) -> Self {
        Self { h, hu, hv }
    }

    /// 由水深与速度构造
    #[inline]
    pub fn from_velocity(h: f64, velocity: DVec2) -> Self {
        Self {
            h,
            hu: h * velocity.x,
            hv: h * velocity.y,
        }
    }

    /// 动量向量
    #[inline]
    pub fn momentum(&self) -> DVec2 {
        DVec2::new(self.hu, self.hv)
    }

    /// 速度（干单元为零）
    #[inline]
    pub fn velocity(&self, tol: &Tolerance) -> DVec2 {
        DVec2::new(tol.velocity(self.h, self.hu), tol.velocity(self.h, self.hv))
    }

    /// 状态是否有效
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.h.is_finite() && self.hu.is_finite() && self.hv.is_finite() && self.h >= 0.0
    }
}
