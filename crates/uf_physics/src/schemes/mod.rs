// crates/uf_physics/src/schemes/mod.rs

//! 数值格式

pub mod hllc;

pub use hllc::{HllcSolver, RiemannFlux};
