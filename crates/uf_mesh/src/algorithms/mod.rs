// crates/uf_mesh/src/algorithms/mod.rs

//! 网格算法
//!
//! - `triangulate`: 带洞多边形耳切三角化
//! - `refine`: LEPP 二分加密与约束翻边

pub mod refine;
pub mod triangulate;

pub use refine::{edge_key, EdgeKey, WorkMesh};
pub use triangulate::triangulate_with_holes;
