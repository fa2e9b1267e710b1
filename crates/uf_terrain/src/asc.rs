// crates/uf_terrain/src/asc.rs

//! ESRI ASCII 栅格 (`.asc`)
//!
//! 文件头：
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     460000.0     (或 xllcenter)
//! yllcorner     451000.0     (或 yllcenter)
//! cellsize      1.0
//! NODATA_value  -9999        (可选)
//! ```
//!
//! 键名不区分大小写。文件头之后是 `nrows` 行数据，从北到南排列。
//!
//! 采样在相邻四个像元中心之间做双线性插值；无数据像元不参与插值，
//! 其余权重重新归一化。超出栅格范围（最外层像元中心再向外半个像元）的点报错。

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};
use uf_foundation::error::{UfError, UfResult};
use uf_geo::Point2D;

use crate::provider::TerrainProvider;
use crate::raster::RasterData;

/// 缺省无数据值
pub const DEFAULT_NODATA: f64 = -9999.0;

/// 范围判定容差（像元尺寸的比例）
const EXTENT_EPS: f64 = 1e-9;

/// 栅格文件头
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHeader {
    /// 列数
    pub ncols: usize,
    /// 行数
    pub nrows: usize,
    /// 左下角 x（像元角点）
    pub xll_corner: f64,
    /// 左下角 y（像元角点）
    pub yll_corner: f64,
    /// 像元尺寸
    pub cellsize: f64,
    /// 无数据值
    pub nodata: f64,
}

impl GridHeader {
    /// 栅格外包范围 `(min, max)`
    pub fn extent(&self) -> (Point2D, Point2D) {
        (
            Point2D::new(self.xll_corner, self.yll_corner),
            Point2D::new(
                self.xll_corner + self.ncols as f64 * self.cellsize,
                self.yll_corner + self.nrows as f64 * self.cellsize,
            ),
        )
    }
}

/// ASCII 栅格
#[derive(Debug, Clone)]
pub struct AscGrid {
    header: GridHeader,
    raster: RasterData,
}

impl AscGrid {
    /// 读取 `.asc` 文件
    pub fn load(path: impl AsRef<Path>) -> UfResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| UfError::open_failed(path, e))?;
        let grid = Self::parse(&content, path)?;
        info!(
            "读取栅格 {}: {}x{}, 像元 {} m, 有效像元 {}",
            path.display(),
            grid.header.ncols,
            grid.header.nrows,
            grid.header.cellsize,
            grid.raster.valid_count()
        );
        Ok(grid)
    }

    /// 解析 `.asc` 文本，`origin` 仅用于错误信息
    pub fn parse(content: &str, origin: &Path) -> UfResult<Self> {
        let mut ncols = None;
        let mut nrows = None;
        let mut xll = None;
        let mut yll = None;
        let mut cellsize = None;
        let mut nodata = None;
        let mut values: Vec<f64> = Vec::new();
        let mut in_body = false;

        for (idx, line) in content.lines().enumerate() {
            let lineno = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if !in_body {
                let mut tokens = trimmed.split_whitespace();
                let key = tokens.next().unwrap_or_default();
                if key.parse::<f64>().is_err() {
                    let raw = tokens.next().ok_or_else(|| {
                        UfError::parse(origin, lineno, format!("文件头 '{key}' 缺少取值"))
                    })?;
                    let value: f64 = raw.parse().map_err(|_| {
                        UfError::parse(origin, lineno, format!("文件头 '{key}' 的值无法解析: {raw}"))
                    })?;
                    match key.to_ascii_lowercase().as_str() {
                        "ncols" => ncols = Some(parse_count(value, key, origin, lineno)?),
                        "nrows" => nrows = Some(parse_count(value, key, origin, lineno)?),
                        "xllcorner" => xll = Some((value, false)),
                        "xllcenter" => xll = Some((value, true)),
                        "yllcorner" => yll = Some((value, false)),
                        "yllcenter" => yll = Some((value, true)),
                        "cellsize" => cellsize = Some(value),
                        "nodata_value" => nodata = Some(value),
                        _ => {
                            return Err(UfError::parse(
                                origin,
                                lineno,
                                format!("未知的文件头关键字 '{key}'"),
                            ))
                        }
                    }
                    continue;
                }
                in_body = true;
            }

            for token in trimmed.split_whitespace() {
                let v: f64 = token.parse().map_err(|_| {
                    UfError::parse(origin, lineno, format!("数据值无法解析: {token}"))
                })?;
                values.push(v);
            }
        }

        let missing = |name: &str| UfError::parse(origin, 0, format!("文件头缺少 '{name}'"));
        let ncols = ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = nrows.ok_or_else(|| missing("nrows"))?;
        let (xll, x_is_center) = xll.ok_or_else(|| missing("xllcorner"))?;
        let (yll, y_is_center) = yll.ok_or_else(|| missing("yllcorner"))?;
        let cellsize = cellsize.ok_or_else(|| missing("cellsize"))?;
        if !(cellsize.is_finite() && cellsize > 0.0) {
            return Err(UfError::parse(origin, 0, format!("cellsize 必须为正: {cellsize}")));
        }
        if values.len() != ncols * nrows {
            return Err(UfError::parse(
                origin,
                0,
                format!("数据值个数 {} 与 {}x{} 不符", values.len(), ncols, nrows),
            ));
        }

        let half = 0.5 * cellsize;
        let header = GridHeader {
            ncols,
            nrows,
            xll_corner: if x_is_center { xll - half } else { xll },
            yll_corner: if y_is_center { yll - half } else { yll },
            cellsize,
            nodata: nodata.unwrap_or(DEFAULT_NODATA),
        };
        Self::from_parts(header, values)
    }

    /// 由文件头和数据构建（数据从北到南按行排列）
    pub fn from_parts(header: GridHeader, values: Vec<f64>) -> UfResult<Self> {
        if header.ncols == 0 || header.nrows == 0 {
            return Err(UfError::invalid_input("栅格行列数必须为正"));
        }
        let raster = RasterData::from_data(values, header.ncols, header.nrows, header.nodata)?;
        Ok(Self { header, raster })
    }

    /// 文件头
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// 栅格数据
    pub fn raster(&self) -> &RasterData {
        &self.raster
    }

    /// 双线性采样
    pub fn sample(&self, p: Point2D) -> UfResult<f64> {
        let h = &self.header;
        let fx = (p.x - h.xll_corner) / h.cellsize - 0.5;
        let fy = (p.y - h.yll_corner) / h.cellsize - 0.5;

        let max_x = h.ncols as f64 - 0.5;
        let max_y = h.nrows as f64 - 0.5;
        if !(fx >= -0.5 - EXTENT_EPS
            && fx <= max_x + EXTENT_EPS
            && fy >= -0.5 - EXTENT_EPS
            && fy <= max_y + EXTENT_EPS)
        {
            return Err(UfError::invalid_input(format!(
                "点 ({:.3}, {:.3}) 超出栅格范围",
                p.x, p.y
            )));
        }

        let (c0, c1, tx) = bracket(fx, h.ncols);
        let (r0, r1, ty) = bracket(fy, h.nrows);

        // 行号转换为从北数
        let top = |r: usize| h.nrows - 1 - r;
        let corners = [
            (c0, top(r0), (1.0 - tx) * (1.0 - ty)),
            (c1, top(r0), tx * (1.0 - ty)),
            (c0, top(r1), (1.0 - tx) * ty),
            (c1, top(r1), tx * ty),
        ];

        let mut sum = 0.0;
        let mut weight = 0.0;
        let mut plain_sum = 0.0;
        let mut plain_count = 0usize;
        for (col, row, w) in corners {
            if let Some(v) = self.raster.get_valid(col, row) {
                sum += w * v;
                weight += w;
                plain_sum += v;
                plain_count += 1;
            }
        }

        if weight > 1e-12 {
            Ok(sum / weight)
        } else if plain_count > 0 {
            Ok(plain_sum / plain_count as f64)
        } else {
            Err(UfError::invalid_input(format!(
                "点 ({:.3}, {:.3}) 周围像元全部为无数据",
                p.x, p.y
            )))
        }
    }
}

/// 一维插值区间：返回两侧索引与局部权重
fn bracket(f: f64, n: usize) -> (usize, usize, f64) {
    if n == 1 {
        return (0, 0, 0.0);
    }
    let clamped = f.clamp(0.0, (n - 1) as f64);
    let i0 = (clamped.floor() as usize).min(n - 2);
    (i0, i0 + 1, clamped - i0 as f64)
}

fn parse_count(value: f64, key: &str, origin: &Path, line: usize) -> UfResult<usize> {
    if value >= 1.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(UfError::parse(origin, line, format!("'{key}' 必须是正整数: {value}")))
    }
}

impl TerrainProvider for AscGrid {
    fn elevation_at(&self, point: Point2D) -> UfResult<f64> {
        self.sample(point)
    }

    fn elevations_at(&self, points: &[Point2D], output: &mut [f64]) -> UfResult<()> {
        UfError::check_size("elevation output", points.len(), output.len())?;
        output
            .par_iter_mut()
            .zip(points.par_iter())
            .try_for_each(|(out, &p)| {
                *out = self.sample(p)?;
                Ok::<(), UfError>(())
            })?;
        debug!("栅格采样 {} 个点", points.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GRID: &str = "\
ncols 3
nrows 2
xllcorner 100.0
yllcorner 200.0
cellsize 10.0
NODATA_value -9999
1 2 3
4 5 6
";

    fn grid() -> AscGrid {
        AscGrid::parse(GRID, Path::new("test.asc")).unwrap()
    }

    #[test]
    fn test_header() {
        let g = grid();
        assert_eq!(g.header().ncols, 3);
        assert_eq!(g.header().nrows, 2);
        let (min, max) = g.header().extent();
        assert_eq!(min, Point2D::new(100.0, 200.0));
        assert_eq!(max, Point2D::new(130.0, 220.0));
    }

    #[test]
    fn test_sample_at_cell_centres() {
        let g = grid();
        // 第一行数据在北侧
        assert_relative_eq!(g.sample(Point2D::new(105.0, 215.0)).unwrap(), 1.0);
        assert_relative_eq!(g.sample(Point2D::new(125.0, 205.0)).unwrap(), 6.0);
    }

    #[test]
    fn test_bilinear_between_centres() {
        let g = grid();
        // 四个像元中心 (105,205)=4 (115,205)=5 (105,215)=1 (115,215)=2 的中点
        assert_relative_eq!(g.sample(Point2D::new(110.0, 210.0)).unwrap(), 3.0);
    }

    #[test]
    fn test_edge_band_and_outside() {
        let g = grid();
        // 外侧半个像元内取边缘值
        assert_relative_eq!(g.sample(Point2D::new(100.0, 219.0)).unwrap(), 1.0);
        assert!(g.sample(Point2D::new(99.0, 210.0)).is_err());
        assert!(g.sample(Point2D::new(110.0, 221.0)).is_err());
    }

    #[test]
    fn test_nodata_renormalised() {
        let text = GRID.replace("1 2 3", "-9999 2 3");
        let g = AscGrid::parse(&text, Path::new("test.asc")).unwrap();
        // 剩余三个角权重各 0.25，重新归一化后为 (2+4+5)/3
        assert_relative_eq!(
            g.sample(Point2D::new(110.0, 210.0)).unwrap(),
            11.0 / 3.0,
            epsilon = 1e-12
        );
        // 正好落在无数据像元中心：有效邻居权重为零，取其平均
        assert_relative_eq!(g.sample(Point2D::new(105.0, 215.0)).unwrap(), 11.0 / 3.0);
    }

    #[test]
    fn test_all_nodata_is_error() {
        let text = "ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -1\n-1\n";
        let g = AscGrid::parse(text, Path::new("t.asc")).unwrap();
        assert!(g.sample(Point2D::new(0.5, 0.5)).is_err());
    }

    #[test]
    fn test_center_registration_and_case() {
        let text = "NCOLS 2\nNROWS 1\nXLLCENTER 0.5\nYLLCENTER 0.5\nCELLSIZE 1\n7 9\n";
        let g = AscGrid::parse(text, Path::new("t.asc")).unwrap();
        assert_eq!(g.header().xll_corner, 0.0);
        assert_eq!(g.header().nodata, DEFAULT_NODATA);
        assert_relative_eq!(g.sample(Point2D::new(1.0, 0.5)).unwrap(), 8.0);
    }

    #[test]
    fn test_bad_value_reports_line() {
        let text = GRID.replace("4 5 6", "4 x 6");
        let err = AscGrid::parse(&text, Path::new("dtm.asc")).unwrap_err();
        match err {
            UfError::ParseError { line, .. } => assert_eq!(line, 8),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_value_count_mismatch() {
        let text = GRID.replace("4 5 6\n", "4 5\n");
        assert!(AscGrid::parse(&text, Path::new("t.asc")).is_err());
    }

    #[test]
    fn test_batch_sampling() {
        let g = grid();
        let points = [Point2D::new(105.0, 215.0), Point2D::new(110.0, 210.0)];
        let mut out = [0.0; 2];
        g.elevations_at(&points, &mut out).unwrap();
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], 3.0);
    }
}
