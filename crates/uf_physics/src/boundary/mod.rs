// crates/uf_physics/src/boundary/mod.rs

//! 边界条件
//!
//! - [`types`]: 边界条件枚举
//! - [`ghost`]: 幽灵单元状态计算

pub mod ghost;
pub mod types;

pub use ghost::ghost_state;
pub use types::BoundaryCondition;
