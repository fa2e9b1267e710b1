// crates/uf_physics/src/types.rs

//! 求解器参数

use serde::{Deserialize, Serialize};
use uf_foundation::Tolerance;

use crate::error::{PhysicsError, PhysicsResult};

/// 一阶有限体积求解器参数
///
/// 所有字段可由场景文件覆盖，缺省字段取默认值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// 重力加速度 [m/s²]
    pub gravity: f64,
    /// CFL 数，时间步为 `cfl * 内切圆半径 / 波速`
    pub cfl: f64,
    /// 最大时间步 [s]
    pub max_timestep: f64,
    /// 最小时间步 [s]，低于此值视为数值不稳定
    pub min_timestep: f64,
    /// 干单元阈值 [m]，低于此值速度视为 0
    pub h_dry: f64,
    /// 参与通量计算的最小水深 [m]
    pub h_min: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        let tol = Tolerance::default();
        Self {
            gravity: 9.81,
            cfl: 0.5,
            max_timestep: 1.0,
            min_timestep: 1e-6,
            h_dry: tol.h_dry,
            h_min: tol.h_min,
        }
    }
}

impl SolverParams {
    /// 对应的数值容差
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            h_dry: self.h_dry,
            h_min: self.h_min,
            ..Tolerance::default()
        }
    }

    /// 校验参数
    pub fn validate(&self) -> PhysicsResult<()> {
        let positive = [
            ("gravity", self.gravity),
            ("cfl", self.cfl),
            ("max_timestep", self.max_timestep),
            ("min_timestep", self.min_timestep),
            ("h_dry", self.h_dry),
            ("h_min", self.h_min),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::invalid_parameter(format!(
                    "{name} 必须为正数, 实际 {value}"
                )));
            }
        }
        if self.cfl > 1.0 {
            return Err(PhysicsError::invalid_parameter(format!(
                "cfl 不能超过 1, 实际 {}",
                self.cfl
            )));
        }
        if self.min_timestep >= self.max_timestep {
            return Err(PhysicsError::invalid_parameter(
                "min_timestep 必须小于 max_timestep",
            ));
        }
        if self.h_min > self.h_dry {
            return Err(PhysicsError::invalid_parameter("h_min 不能大于 h_dry"));
        }
        Ok(())
    }
}
