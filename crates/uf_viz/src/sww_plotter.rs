// crates/uf_viz/src/sww_plotter.rs

//! `.sww` 结果绘图

use std::path::{Path, PathBuf};

use tracing::info;
use uf_geo::Point2D;
use uf_io::SwwFile;

use crate::canvas::{hconcat, save_image, Canvas, Viewport};
use crate::colormap::{ColorScale, Colormap};
use crate::error::{VizError, VizResult};

/// 面板间隔 [px]
const PANEL_GAP: u32 = 16;

/// 结果文件绘图器
#[derive(Debug, Clone)]
pub struct SwwPlotter {
    sww: SwwFile,
    viewport: Viewport,
}

impl SwwPlotter {
    /// 读取结果文件
    pub fn open(path: impl AsRef<Path>) -> VizResult<Self> {
        Self::from_file(SwwFile::read(path)?)
    }

    pub fn from_file(sww: SwwFile) -> VizResult<Self> {
        let viewport = Viewport::fit(&sww.nodes, 600)?;
        Ok(Self { sww, viewport })
    }

    pub fn sww(&self) -> &SwwFile {
        &self.sww
    }

    pub fn n_slices(&self) -> usize {
        self.sww.n_slices()
    }

    pub fn times(&self) -> Vec<f64> {
        self.sww.times()
    }

    /// 最后一个时间片的索引
    pub fn last_slice(&self) -> VizResult<usize> {
        self.n_slices()
            .checked_sub(1)
            .ok_or_else(|| VizError::Empty(format!("{} 没有时间片", self.sww.header.name)))
    }

    /// 第 `index` 个时间片的单元水深
    pub fn depth(&self, index: usize) -> VizResult<Vec<f64>> {
        Ok(self.sww.depth(index)?)
    }

    /// 第 `index` 个时间片的单元流速大小
    pub fn speed(&self, index: usize) -> VizResult<Vec<f64>> {
        Ok(self.sww.speed(index)?)
    }

    fn panel(&self, values: &[f64]) -> Canvas {
        let scale = ColorScale::from_values(values).unwrap_or(ColorScale::new(0.0, 1.0));
        let mut canvas = Canvas::new(self.viewport, true);
        for (tri, &v) in self.sww.triangles.iter().zip(values) {
            let vertices: [Point2D; 3] = tri.map(|n| self.sww.nodes[n]);
            canvas.fill_triangle(vertices, scale.color(Colormap::Viridis, v));
        }
        canvas.draw_colorbar(Colormap::Viridis);
        canvas
    }

    /// 绘制第 `index` 个时间片的水深（左）与流速（右）面板
    pub fn plot_depth_speed(&self, index: usize, path: impl AsRef<Path>) -> VizResult<PathBuf> {
        let path = path.as_ref();
        let depth = self.depth(index)?;
        let speed = self.speed(index)?;
        let image = hconcat(
            &[
                self.panel(&depth).into_image(),
                self.panel(&speed).into_image(),
            ],
            PANEL_GAP,
        );
        save_image(&image, path)?;

        let max_of = |v: &[f64]| v.iter().copied().fold(0.0_f64, f64::max);
        info!(
            "t = {:.2} s 水深/流速图: {} (最大水深 {:.3} m, 最大流速 {:.3} m/s)",
            self.sww.slices[index].time,
            path.display(),
            max_of(&depth),
            max_of(&speed)
        );
        Ok(path.to_path_buf())
    }
}
