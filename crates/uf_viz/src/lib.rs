// crates/uf_viz/src/lib.rs

//! 结果可视化
//!
//! 将单元场栅格化为 PNG，并把逐帧图片合成为 GIF 动画。
//!
//! # 模块
//!
//! - [`colormap`]: 色带（viridis、反向灰度）与数值归一化
//! - [`canvas`]: 世界坐标到像素的视口、三角形填充、线段与色标
//! - [`domain_plotter`]: 推进过程中保存水深帧、生成动画、网格图与高程图
//! - [`sww_plotter`]: 读取 `.sww` 文件，绘制深度/流速面板
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use uf_viz::{DomainPlotter, SwwPlotter};
//!
//! let mut plotter = DomainPlotter::new(&domain, "_plot")?;
//! let mut evolve = domain.evolve(20.0, 300.0);
//! while let Some(t) = evolve.next() {
//!     t?;
//!     plotter.save_depth_frame(evolve.domain())?;
//! }
//! plotter.make_depth_animation()?;
//!
//! let splotter = SwwPlotter::open("york1.sww")?;
//! splotter.plot_depth_speed(splotter.last_slice()?, "york1_depth-speed.png")?;
//! ```

pub mod canvas;
pub mod colormap;
pub mod domain_plotter;
pub mod error;
pub mod sww_plotter;

pub use canvas::{Canvas, Viewport};
pub use colormap::{ColorScale, Colormap};
pub use domain_plotter::DomainPlotter;
pub use error::{VizError, VizResult};
pub use sww_plotter::SwwPlotter;
