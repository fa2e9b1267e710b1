// crates/uf_terrain/src/provider.rs

//! 地形数据提供者
//!
//! 抽象地形数据的获取接口。

use uf_foundation::error::{UfError, UfResult};
use uf_geo::Point2D;

/// 地形数据提供者 trait
pub trait TerrainProvider: Send + Sync {
    /// 获取单点高程
    fn elevation_at(&self, point: Point2D) -> UfResult<f64>;

    /// 批量获取高程
    fn elevations_at(&self, points: &[Point2D], output: &mut [f64]) -> UfResult<()> {
        UfError::check_size("elevation output", points.len(), output.len())?;
        for (out, &p) in output.iter_mut().zip(points) {
            *out = self.elevation_at(p)?;
        }
        Ok(())
    }
}
