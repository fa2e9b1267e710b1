// crates/uf_terrain/src/raster.rs

//! 栅格数据管理
//!
//! 提供栅格地形数据的存储和访问。行按从上到下（北到南）存储。

use uf_foundation::error::{UfError, UfResult};

/// 栅格数据
#[derive(Debug, Clone)]
pub struct RasterData {
    /// 数据（行主序，第 0 行为最北一行）
    pub data: Vec<f64>,
    /// 宽度（列数）
    pub width: usize,
    /// 高度（行数）
    pub height: usize,
    /// 无数据值
    pub nodata: f64,
}

impl RasterData {
    /// 创建新的栅格数据
    pub fn new(width: usize, height: usize, nodata: f64) -> Self {
        Self {
            data: vec![nodata; width * height],
            width,
            height,
            nodata,
        }
    }

    /// 从数据创建
    pub fn from_data(data: Vec<f64>, width: usize, height: usize, nodata: f64) -> UfResult<Self> {
        UfError::check_size("raster data", width * height, data.len())?;
        Ok(Self {
            data,
            width,
            height,
            nodata,
        })
    }

    /// 获取像素值
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col < self.width && row < self.height {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    /// 获取有效像素值（无数据返回 `None`）
    #[inline]
    pub fn get_valid(&self, col: usize, row: usize) -> Option<f64> {
        self.get(col, row).filter(|&v| !self.is_nodata(v))
    }

    /// 设置像素值
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: f64) {
        if col < self.width && row < self.height {
            self.data[row * self.width + col] = value;
        }
    }

    /// 判断是否为无数据
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || (self.nodata.is_finite() && (value - self.nodata).abs() < 1e-10)
    }

    /// 有效像素数
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| !self.is_nodata(v)).count()
    }

    /// 有效像素的最小/最大值
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|&v| !self.is_nodata(v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodata_handling() {
        let mut raster = RasterData::new(2, 2, -9999.0);
        assert_eq!(raster.valid_count(), 0);
        raster.set(1, 0, 4.5);
        raster.set(0, 1, f64::NAN);
        assert_eq!(raster.get_valid(1, 0), Some(4.5));
        assert_eq!(raster.get_valid(0, 0), None);
        assert_eq!(raster.get_valid(0, 1), None);
        assert_eq!(raster.get(5, 5), None);
        assert_eq!(raster.value_range(), Some((4.5, 4.5)));
    }

    #[test]
    fn test_from_data_size_check() {
        assert!(RasterData::from_data(vec![0.0; 5], 2, 3, -9999.0).is_err());
        assert!(RasterData::from_data(vec![0.0; 6], 2, 3, -9999.0).is_ok());
    }
}
