// crates/uf_terrain/src/lib.rs

//! 地形数据管理
//!
//! 提供栅格地形的读取、存储与采样。
//!
//! # 模块
//!
//! - `asc`: ESRI ASCII 栅格读取与双线性采样
//! - `raster`: 栅格数据存储
//! - `provider`: 数据提供者

pub mod asc;
pub mod provider;
pub mod raster;

pub use asc::{AscGrid, GridHeader};
pub use provider::TerrainProvider;
pub use raster::RasterData;
