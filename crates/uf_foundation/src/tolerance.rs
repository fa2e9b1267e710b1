// crates/uf_foundation/src/tolerance.rs

//! 数值容差
//!
//! 所有阈值通过参数注入传递，不使用全局状态。

/// 数值容差配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// 干单元水深阈值 [m]，低于此值的单元动量清零
    pub h_dry: f64,
    /// 最小水深 [m]，用于速度计算的正则化
    pub h_min: f64,
    /// 几何比较容差 [m]
    pub spatial: f64,
    /// 最小允许单元面积 [m²]
    pub min_area: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            h_dry: 1e-3,
            h_min: 1e-6,
            spatial: 1e-9,
            min_area: 1e-10,
        }
    }
}

impl Tolerance {
    /// 判断水深是否为干
    #[inline]
    pub fn is_dry(&self, h: f64) -> bool {
        h < self.h_dry
    }

    /// 带正则化的速度 `q / h`，干单元返回 0
    #[inline]
    pub fn velocity(&self, h: f64, q: f64) -> f64 {
        if h < self.h_dry {
            0.0
        } else {
            q / h.max(self.h_min)
        }
    }
}
