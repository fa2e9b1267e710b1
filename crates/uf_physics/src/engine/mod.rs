// crates/uf_physics/src/engine/mod.rs

//! 求解引擎
//!
//! - [`flux`]: 静水重构 + HLLC 通量累加
//! - [`friction`]: 半隐式 Manning 摩擦
//! - [`timestep`]: CFL 时间步与统计
//! - [`evolve`]: 时间推进迭代器

pub mod evolve;
pub mod flux;
pub mod friction;
pub mod timestep;

pub use evolve::Evolve;
pub use flux::{CellRate, FluxContext};
pub use friction::ManningFriction;
pub use timestep::{cfl_timestep, TimesteppingStatistics};
