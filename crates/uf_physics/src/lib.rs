// crates/uf_physics/src/lib.rs

//! 浅水方程求解
//!
//! 在非结构三角形网格上求解二维浅水方程：一阶有限体积、HLLC 通量、
//! 静水重构、半隐式 Manning 摩擦、显式 Euler 时间推进。
//!
//! # 模块
//!
//! - [`domain`]: 计算域（网格 + 单元物理量 + 边界 + 算子）
//! - [`quantity`]: 物理量与赋值来源
//! - [`boundary`]: 边界条件与幽灵状态
//! - [`schemes`]: 黎曼求解器
//! - [`engine`]: 通量、摩擦、时间步与推进迭代器
//! - [`operators`]: 入流等算子
//! - [`region`]: 单元区域
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use uf_physics::{BoundaryCondition, Domain, InletOperator, Quantity, QuantitySource, Region};
//!
//! let mut domain = Domain::from_regions(bounding, tags, 100.0, regions, vec![])?;
//! domain.set_quantity(Quantity::Elevation, QuantitySource::Raster(&grid))?;
//! domain.set_quantity(Quantity::Stage, QuantitySource::Quantity(Quantity::Elevation))?;
//! domain.set_boundary([("left", BoundaryCondition::Reflective)])?;
//! let region = Region::circle(domain.mesh(), center, 10.0)?;
//! domain.add_operator(InletOperator::new(region, 400.0)?);
//!
//! for t in domain.evolve(20.0, 300.0) {
//!     let t = t?;
//! }
//! ```

pub mod boundary;
pub mod domain;
pub mod engine;
pub mod error;
pub mod operators;
pub mod quantity;
pub mod region;
pub mod schemes;
pub mod state;
pub mod types;

pub use boundary::BoundaryCondition;
pub use domain::Domain;
pub use engine::{Evolve, TimesteppingStatistics};
pub use error::{PhysicsError, PhysicsResult};
pub use operators::{CellFields, InletOperator, Operator};
pub use quantity::{Quantity, QuantitySource};
pub use region::Region;
pub use state::ConservedState;
pub use types::SolverParams;
