// crates/uf_geo/src/lib.rs

//! UrbanFlood 几何模块
//!
//! 投影平面坐标下的点与多边形类型，以及多边形 CSV 文件的读取。
//!
//! # 模块
//!
//! - `geometry`: `Point2D` 及向量运算
//! - `polygon`: `Polygon`、面积、点包含与相交判定、CSV 读取、按面积过滤、接触合并
//!
//! # 示例
//!
//! ```
//! use uf_geo::{Point2D, Polygon};
//!
//! let square = Polygon::new(vec![
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(10.0, 0.0),
//!     Point2D::new(10.0, 10.0),
//!     Point2D::new(0.0, 10.0),
//! ]).unwrap();
//! assert_eq!(square.area(), 100.0);
//! assert!(square.contains(Point2D::new(5.0, 5.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod geometry;
pub mod polygon;

pub use geometry::Point2D;
pub use polygon::{
    convex_hull, merge_touching, read_polygon, read_polygons_matching, retain_larger_than, Polygon,
};
