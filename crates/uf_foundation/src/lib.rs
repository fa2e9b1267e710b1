// crates/uf_foundation/src/lib.rs

//! UrbanFlood Foundation Layer
//!
//! 整个工作区共用的最底层抽象，不依赖任何其它内部 crate。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `UfError` 与 `UfResult`
//! - [`tolerance`]: 干湿判定、面积下限等数值容差
//!
//! # 示例
//!
//! ```
//! use uf_foundation::{ensure, UfError, UfResult};
//!
//! fn positive(v: f64) -> UfResult<f64> {
//!     ensure!(v > 0.0, UfError::invalid_input("value must be positive"));
//!     Ok(v)
//! }
//!
//! assert!(positive(1.0).is_ok());
//! assert!(positive(-1.0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod tolerance;

pub use error::{UfError, UfResult};
pub use tolerance::Tolerance;
