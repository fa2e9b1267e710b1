// crates/uf_physics/src/engine/timestep.rs

//! 时间步选择与统计
//!
//! ```text
//! dt = min(cfl * min_i(r_i / λ_i), max_timestep, 距下一输出时刻的剩余时间)
//! ```
//! 其中 r_i 为单元内切圆半径，λ_i 为单元各边的最大波速。

use serde::Serialize;

use crate::error::{PhysicsError, PhysicsResult};
use crate::types::SolverParams;

/// 由单元最小 `dt_limit` 计算 CFL 时间步
///
/// 全干或静止时返回 `max_timestep`。CFL 步长非有限或小于 `min_timestep` 视为不稳定。
pub fn cfl_timestep(min_limit: f64, params: &SolverParams, time: f64) -> PhysicsResult<f64> {
    if min_limit.is_nan() {
        return Err(PhysicsError::instability(time, "时间步计算得到 NaN"));
    }
    let dt = params.cfl * min_limit;
    if dt < params.min_timestep {
        return Err(PhysicsError::instability(
            time,
            format!("时间步 {dt:.3e} s 小于允许的最小值 {:.3e} s", params.min_timestep),
        ));
    }
    Ok(dt.min(params.max_timestep))
}

/// 两次输出之间的时间步统计
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimesteppingStatistics {
    /// 当前模拟时间 [s]
    pub time: f64,
    /// 自上次输出以来的步数
    pub steps: usize,
    /// 自上次输出以来的最小时间步 [s]
    pub min_dt: f64,
    /// 自上次输出以来的最大时间步 [s]
    pub max_dt: f64,
    /// 累计步数
    pub total_steps: usize,
}

impl std::fmt::Display for TimesteppingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.steps == 0 {
            write!(f, "Time = {:.4}, steps = 0", self.time)
        } else {
            write!(
                f,
                "Time = {:.4}, delta t in [{:.8}, {:.8}], steps = {} (total {})",
                self.time, self.min_dt, self.max_dt, self.steps, self.total_steps
            )
        }
    }
}

/// 时间步计数器
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepCounter {
    steps: usize,
    total: usize,
    min_dt: f64,
    max_dt: f64,
}

impl Default for StepCounter {
    fn default() -> Self {
        Self {
            steps: 0,
            total: 0,
            min_dt: f64::INFINITY,
            max_dt: 0.0,
        }
    }
}

impl StepCounter {
    /// 记录一步
    pub(crate) fn record(&mut self, dt: f64) {
        self.steps += 1;
        self.total += 1;
        self.min_dt = self.min_dt.min(dt);
        self.max_dt = self.max_dt.max(dt);
    }

    /// 开始新的输出间隔
    pub(crate) fn reset_interval(&mut self) {
        self.steps = 0;
        self.min_dt = f64::INFINITY;
        self.max_dt = 0.0;
    }

    pub(crate) fn snapshot(&self, time: f64) -> TimesteppingStatistics {
        TimesteppingStatistics {
            time,
            steps: self.steps,
            min_dt: if self.steps == 0 { 0.0 } else { self.min_dt },
            max_dt: self.max_dt,
            total_steps: self.total,
        }
    }
}
