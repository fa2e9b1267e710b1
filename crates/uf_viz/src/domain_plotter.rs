// crates/uf_viz/src/domain_plotter.rs

//! 计算域绘图
//!
//! 推进循环中逐帧保存水深图，结束后合成 GIF 动画：
//!
//! ```text
//! <plot_dir>/<name>_depth_0000.png
//! <plot_dir>/<name>_depth_0001.png
//! ...
//! <plot_dir>/<name>_depth.gif
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use tracing::{debug, info};
use uf_foundation::Tolerance;
use uf_geo::Point2D;
use uf_physics::{Domain, Quantity};

use crate::canvas::{Canvas, Viewport};
use crate::colormap::{ColorScale, Colormap, DRY_COLOR, INK};
use crate::error::{VizError, VizResult};

/// 默认图像长边 [px]
const DEFAULT_SIZE: u32 = 800;

/// 计算域绘图器
///
/// 创建时复制网格几何；每次绘图从传入的 [`Domain`] 读取单元场。
#[derive(Debug, Clone)]
pub struct DomainPlotter {
    name: String,
    plot_dir: PathBuf,
    nodes: Vec<Point2D>,
    triangles: Vec<[usize; 3]>,
    viewport: Viewport,
    tolerance: Tolerance,
    depth_scale: ColorScale,
    frame_delay_ms: u32,
    frames: Vec<PathBuf>,
}

impl DomainPlotter {
    /// 以计算域名称为前缀，图片写入 `plot_dir`
    pub fn new(domain: &Domain, plot_dir: impl Into<PathBuf>) -> VizResult<Self> {
        let mesh = domain.mesh();
        Ok(Self {
            name: domain.name().to_string(),
            plot_dir: plot_dir.into(),
            nodes: mesh.nodes.clone(),
            triangles: mesh.triangles.clone(),
            viewport: Viewport::fit(&mesh.nodes, DEFAULT_SIZE)?,
            tolerance: domain.params().tolerance(),
            depth_scale: ColorScale::new(0.0, 1.0),
            frame_delay_ms: 200,
            frames: Vec::new(),
        })
    }

    /// 图像长边像素数
    pub fn with_size(mut self, size: u32) -> VizResult<Self> {
        self.viewport = Viewport::fit(&self.nodes, size)?;
        Ok(self)
    }

    /// 水深色带范围 [m]，默认 0 ~ 1
    pub fn with_depth_range(mut self, min: f64, max: f64) -> Self {
        self.depth_scale = ColorScale::new(min, max);
        self
    }

    /// 动画帧间隔 [ms]
    pub fn with_frame_delay_ms(mut self, delay: u32) -> Self {
        self.frame_delay_ms = delay;
        self
    }

    pub fn plot_dir(&self) -> &Path {
        &self.plot_dir
    }

    /// 已保存的帧数
    pub fn frames_saved(&self) -> usize {
        self.frames.len()
    }

    /// 本绘图器已保存的帧
    pub fn frames(&self) -> &[PathBuf] {
        &self.frames
    }

    fn check_cells(&self, name: &'static str, len: usize) -> VizResult<()> {
        if len != self.triangles.len() {
            return Err(VizError::SizeMismatch {
                name,
                expected: self.triangles.len(),
                actual: len,
            });
        }
        Ok(())
    }

    fn vertices(&self, cell: usize) -> [Point2D; 3] {
        self.triangles[cell].map(|n| self.nodes[n])
    }

    fn frame_prefix(&self) -> String {
        format!("{}_depth_", self.name)
    }

    /// 文件名是否为本计算域的水深帧 `<name>_depth_<数字>.png`
    fn is_frame_name(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(&self.frame_prefix())
            .and_then(|rest| rest.strip_suffix(".png"))
            .is_some_and(|digits| {
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            })
    }

    /// 删除此前运行遗留在 `plot_dir` 中的同名水深帧
    fn remove_stale_frames(&self) -> VizResult<()> {
        let entries = match std::fs::read_dir(&self.plot_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(VizError::file(&self.plot_dir, e)),
        };
        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| VizError::file(&self.plot_dir, e))?;
            let is_frame = entry.file_name().to_str().is_some_and(|n| self.is_frame_name(n));
            if is_frame {
                let path = entry.path();
                std::fs::remove_file(&path).map_err(|e| VizError::file(&path, e))?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("删除 {} 个旧水深帧: {}", removed, self.plot_dir.display());
        }
        Ok(())
    }

    /// 将当前水深保存为下一帧，返回图片路径
    ///
    /// 保存第一帧前清除 `plot_dir` 中同名的旧帧。
    pub fn save_depth_frame(&mut self, domain: &Domain) -> VizResult<PathBuf> {
        let depth = domain.depth();
        self.check_cells("depth", depth.len())?;
        if self.frames.is_empty() {
            self.remove_stale_frames()?;
        }

        let mut canvas = Canvas::new(self.viewport, true);
        for (cell, &h) in depth.iter().enumerate() {
            let color = if self.tolerance.is_dry(h) {
                DRY_COLOR
            } else {
                self.depth_scale.color(Colormap::Viridis, h)
            };
            canvas.fill_triangle(self.vertices(cell), color);
        }
        canvas.draw_colorbar(Colormap::Viridis);

        let path = self.plot_dir.join(format!(
            "{}{:04}.png",
            self.frame_prefix(),
            self.frames.len()
        ));
        canvas.save(&path)?;
        debug!("t = {:.2} s 水深帧: {}", domain.time(), path.display());
        self.frames.push(path.clone());
        Ok(path)
    }

    /// 将本绘图器保存的帧按保存顺序合成为 `<plot_dir>/<name>_depth.gif`
    pub fn make_depth_animation(&self) -> VizResult<PathBuf> {
        if self.frames.is_empty() {
            return Err(VizError::NoFrames {
                dir: self.plot_dir.clone(),
                pattern: format!("{}NNNN.png", self.frame_prefix()),
            });
        }
        let frames = &self.frames;
        let path = self.plot_dir.join(format!("{}_depth.gif", self.name));
        let file = File::create(&path).map_err(|e| VizError::file(&path, e))?;

        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| VizError::image(&path, e))?;
        let delay = Delay::from_numer_denom_ms(self.frame_delay_ms, 1);
        for frame_path in frames {
            let image = image::open(frame_path)
                .map_err(|e| VizError::image(frame_path, e))?
                .to_rgba8();
            encoder
                .encode_frame(Frame::from_parts(image, 0, 0, delay))
                .map_err(|e| VizError::image(&path, e))?;
        }
        info!("动画 {} ({} 帧)", path.display(), frames.len());
        Ok(path)
    }

    /// 绘制网格三角形边
    pub fn triplot(&self, path: impl AsRef<Path>) -> VizResult<PathBuf> {
        let path = path.as_ref();
        let mut canvas = Canvas::new(self.viewport, false);
        for cell in 0..self.triangles.len() {
            let [a, b, c] = self.vertices(cell);
            canvas.draw_segment(a, b, INK);
            canvas.draw_segment(b, c, INK);
            canvas.draw_segment(c, a, INK);
        }
        canvas.save(path)?;
        info!("网格图: {} ({} 个三角形)", path.display(), self.triangles.len());
        Ok(path.to_path_buf())
    }

    /// 以反向灰度绘制单元高程
    pub fn plot_elevation(&self, domain: &Domain, path: impl AsRef<Path>) -> VizResult<PathBuf> {
        let path = path.as_ref();
        let elevation = domain.quantity(Quantity::Elevation);
        self.check_cells("elevation", elevation.len())?;
        let scale = ColorScale::from_values(elevation)
            .ok_or_else(|| VizError::Empty("高程".to_string()))?;

        let mut canvas = Canvas::new(self.viewport, true);
        for (cell, &z) in elevation.iter().enumerate() {
            canvas.fill_triangle(self.vertices(cell), scale.color(Colormap::GreysR, z));
        }
        canvas.draw_colorbar(Colormap::GreysR);
        canvas.save(path)?;
        info!(
            "高程图: {} (范围 {:.2} ~ {:.2} m)",
            path.display(),
            scale.min,
            scale.max
        );
        Ok(path.to_path_buf())
    }
}
