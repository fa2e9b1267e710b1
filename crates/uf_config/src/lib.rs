// crates/uf_config/src/lib.rs

//! UrbanFlood 场景配置
//!
//! 一个场景描述完整的洪水计算流程：输入数据、网格、初始条件、
//! 边界条件、入流、推进参数与输出选项。
//!
//! # 模块概览
//!
//! - [`scenario`]: ScenarioConfig 及其子配置（YAML，字段缺省取默认值）
//! - [`presets`]: 内置场景 `york1`、`york2`
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```ignore
//! use uf_config::ScenarioConfig;
//!
//! let config = ScenarioConfig::load("scenarios/york1.yaml")?;
//! let extent = config.data_path(&config.mesh.bounding_polygon);
//! ```

pub mod error;
pub mod presets;
pub mod scenario;

pub use error::ConfigError;
pub use presets::PRESET_NAMES;
pub use scenario::{
    EvolveConfig, HousesConfig, InletConfig, MeshConfig, OutputConfig, RegionConfig,
    ScenarioConfig, TerrainConfig,
};
