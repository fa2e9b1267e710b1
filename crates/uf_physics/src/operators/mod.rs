// crates/uf_physics/src/operators/mod.rs

//! 算子
//!
//! 算子在每个时间步的通量更新之后作用于单元状态，
//! 用于点源入流等无法用边界条件表达的局部过程。

pub mod inlet;

use uf_foundation::Tolerance;

use crate::error::PhysicsResult;

pub use inlet::{set_stages_evenly, InletOperator};

/// 算子可修改的单元场
pub struct CellFields<'a> {
    /// 水位
    pub stage: &'a mut [f64],
    /// x 方向单宽流量
    pub xmom: &'a mut [f64],
    /// y 方向单宽流量
    pub ymom: &'a mut [f64],
    /// 底床高程
    pub elevation: &'a [f64],
    /// 单元面积
    pub areas: &'a [f64],
    /// 数值容差
    pub tolerance: Tolerance,
}

impl CellFields<'_> {
    /// 单元水深
    #[inline]
    pub fn depth(&self, cell: usize) -> f64 {
        (self.stage[cell] - self.elevation[cell]).max(0.0)
    }
}

/// 算子 trait
pub trait Operator: Send {
    /// 名称
    fn name(&self) -> &str;

    /// 在 `[time, time + dt]` 时间步上作用
    fn apply(&mut self, fields: &mut CellFields<'_>, time: f64, dt: f64) -> PhysicsResult<()>;

    /// 累计实际注入（正）或抽出（负）的水量 [m³]
    fn applied_volume(&self) -> f64 {
        0.0
    }
}
