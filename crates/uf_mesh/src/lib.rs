// crates/uf_mesh/src/lib.rs

//! UrbanFlood 网格模块
//!
//! 由外边界多边形、加密区与洞生成带边界标签的非结构三角网格。
//!
//! # 核心类型
//!
//! - [`RegionMeshBuilder`]: 区域网格生成器
//! - [`FrozenMesh`]: 只读计算网格（几何量、邻接、边界标签、点定位）
//!
//! # 模块结构
//!
//! - [`algorithms`]: 三角化与加密
//! - [`frozen`]: 冻结网格
//! - [`generation`]: 网格生成
//! - [`locator`]: R-tree 点定位
//! - [`quality`]: 形状指标
//!
//! # 示例
//!
//! ```rust
//! use uf_mesh::generation::RectMeshGenerator;
//!
//! let mesh = RectMeshGenerator::new(10, 10, 100.0, 100.0).build().unwrap();
//! assert_eq!(mesh.n_cells(), 200);
//! ```

pub mod algorithms;
pub mod error;
pub mod frozen;
pub mod generation;
pub mod locator;
pub mod quality;

pub use error::{MeshError, MeshResult};
pub use frozen::{BoundaryEdge, FrozenMesh, MeshStatistics, Neighbor};
pub use generation::{
    create_mesh_from_regions, RectMeshGenerator, RegionMeshBuilder, DEFAULT_TAG, HOLE_TAG,
};
pub use locator::MeshLocator;
