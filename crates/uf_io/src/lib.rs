// crates/uf_io/src/lib.rs

//! 模拟结果输入输出
//!
//! # 模块
//!
//! - [`sww`]: `.sww` 结果文件的写入与读取
//! - [`vtu`]: VTU/PVD 导出，用于 ParaView
//! - [`error`]: 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use uf_io::{SwwFile, VtuExporter};
//!
//! let sww = SwwFile::read("york1.sww")?;
//! let depth = sww.depth(sww.n_slices() - 1)?;
//! VtuExporter::new().export_sww(&sww, "vtu", "york1")?;
//! ```

pub mod error;
pub mod sww;
pub mod vtu;

pub use error::{IoError, IoResult};
pub use sww::{SwwFile, SwwHeader, SwwSlice, SwwStatic, SwwWriter, SWW_VERSION};
pub use vtu::{VtuExporter, VtuFrame};
