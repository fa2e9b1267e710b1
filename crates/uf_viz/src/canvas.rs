// crates/uf_viz/src/canvas.rs

//! 栅格画布
//!
//! 世界坐标 y 轴向上，像素坐标 y 轴向下。画布右侧可预留色标区域。

use std::path::Path;

use image::{imageops, Rgb, RgbImage};
use uf_geo::Point2D;

use crate::colormap::{Colormap, BACKGROUND, INK};
use crate::error::{VizError, VizResult};

/// 图边距 [px]
const MARGIN: u32 = 10;

/// 色标区域宽度 [px]
pub const COLORBAR_WIDTH: u32 = 40;

/// 世界坐标到像素坐标的映射，保持纵横比
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// 左上角对应的世界坐标 (min_x, max_y)
    origin: Point2D,
    /// 像素 / 米
    scale: f64,
    width: u32,
    height: u32,
}

impl Viewport {
    /// 使所有点落入长边为 `size` 像素的图中
    pub fn fit(points: &[Point2D], size: u32) -> VizResult<Self> {
        let mut iter = points.iter().filter(|p| p.is_finite());
        let first = iter
            .next()
            .ok_or_else(|| VizError::Empty("网格节点".to_string()))?;
        let (mut min, mut max) = (*first, *first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        let span = (max.x - min.x).max(max.y - min.y);
        let inner = size.saturating_sub(2 * MARGIN).max(1) as f64;
        let scale = if span > 0.0 { inner / span } else { 1.0 };
        Ok(Self {
            origin: Point2D::new(min.x, max.y),
            scale,
            width: ((max.x - min.x) * scale).ceil() as u32 + 2 * MARGIN,
            height: ((max.y - min.y) * scale).ceil() as u32 + 2 * MARGIN,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 世界坐标 → 像素坐标（浮点）
    pub fn to_pixel(&self, p: Point2D) -> (f64, f64) {
        (
            MARGIN as f64 + (p.x - self.origin.x) * self.scale,
            MARGIN as f64 + (self.origin.y - p.y) * self.scale,
        )
    }
}

/// 带视口的 RGB 画布
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
    viewport: Viewport,
}

impl Canvas {
    /// 新建白底画布；`colorbar` 为真时在右侧预留色标区域
    pub fn new(viewport: Viewport, colorbar: bool) -> Self {
        let extra = if colorbar { COLORBAR_WIDTH } else { 0 };
        Self {
            image: RgbImage::from_pixel(viewport.width + extra, viewport.height, BACKGROUND),
            viewport,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// 填充三角形：像素中心落在三角形内（含边）即着色
    pub fn fill_triangle(&mut self, vertices: [Point2D; 3], color: Rgb<u8>) {
        let [a, b, c] = vertices.map(|p| self.viewport.to_pixel(p));
        let area = edge(a, b, c);
        if area.abs() < f64::EPSILON || !area.is_finite() {
            return;
        }

        let (w, h) = (self.viewport.width, self.viewport.height);
        let x0 = a.0.min(b.0).min(c.0).floor().max(0.0) as u32;
        let y0 = a.1.min(b.1).min(c.1).floor().max(0.0) as u32;
        let x1 = (a.0.max(b.0).max(c.0).ceil() as u32).min(w);
        let y1 = (a.1.max(b.1).max(c.1).ceil() as u32).min(h);

        const EPS: f64 = 1e-9;
        for py in y0..y1 {
            for px in x0..x1 {
                let p = (px as f64 + 0.5, py as f64 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 >= -EPS && w1 >= -EPS && w2 >= -EPS {
                    self.image.put_pixel(px, py, color);
                }
            }
        }
    }

    /// 画线段
    pub fn draw_segment(&mut self, from: Point2D, to: Point2D, color: Rgb<u8>) {
        let (a, b) = (self.viewport.to_pixel(from), self.viewport.to_pixel(to));
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            self.put(x, y, color);
        }
    }

    fn put(&mut self, x: f64, y: f64, color: Rgb<u8>) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (px, py) = (x as u32, y as u32);
        if px < self.image.width() && py < self.image.height() {
            self.image.put_pixel(px, py, color);
        }
    }

    /// 在右侧预留区域绘制竖直色标（底部为最小值）
    pub fn draw_colorbar(&mut self, colormap: Colormap) {
        let left = self.viewport.width + 10;
        let right = left + 15;
        if right + 1 >= self.image.width() || self.viewport.height <= 2 * MARGIN + 1 {
            return;
        }
        let top = MARGIN;
        let bottom = self.viewport.height - MARGIN;
        let span = (bottom - top) as f64;
        for y in top..bottom {
            let color = colormap.sample(1.0 - (y - top) as f64 / span);
            for x in left..right {
                self.image.put_pixel(x, y, color);
            }
        }
        // 边框与上、中、下刻度
        for x in left..=right {
            self.image.put_pixel(x, top, INK);
            self.image.put_pixel(x, bottom, INK);
        }
        for y in top..=bottom {
            self.image.put_pixel(left, y, INK);
            self.image.put_pixel(right, y, INK);
        }
        for y in [top, (top + bottom) / 2, bottom] {
            for x in right..=(right + 4).min(self.image.width() - 1) {
                self.image.put_pixel(x, y, INK);
            }
        }
    }

    /// 保存为图片（格式由扩展名决定），自动创建父目录
    pub fn save(&self, path: &Path) -> VizResult<()> {
        save_image(&self.image, path)
    }
}

/// 有向面积（两倍）
fn edge(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// 水平拼接多幅图，间隔 `gap` 像素
pub fn hconcat(panels: &[RgbImage], gap: u32) -> RgbImage {
    let width = panels.iter().map(|p| p.width()).sum::<u32>()
        + gap * panels.len().saturating_sub(1) as u32;
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let mut out = RgbImage::from_pixel(width.max(1), height.max(1), BACKGROUND);
    let mut x = 0i64;
    for panel in panels {
        imageops::replace(&mut out, panel, x, 0);
        x += (panel.width() + gap) as i64;
    }
    out
}

pub(crate) fn save_image(image: &RgbImage, path: &Path) -> VizResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| VizError::file(parent, e))?;
    }
    image.save(path).map_err(|e| VizError::image(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(100.0, 200.0),
            Point2D::new(300.0, 200.0),
            Point2D::new(300.0, 300.0),
            Point2D::new(100.0, 300.0),
        ]
    }

    #[test]
    fn test_viewport_keeps_aspect() {
        let vp = Viewport::fit(&square(), 220).unwrap();
        assert_eq!((vp.width(), vp.height()), (220, 120));
        assert_eq!(vp.to_pixel(Point2D::new(100.0, 300.0)), (10.0, 10.0));
        assert_eq!(vp.to_pixel(Point2D::new(300.0, 200.0)), (210.0, 110.0));
        assert!(Viewport::fit(&[], 100).is_err());
    }

    #[test]
    fn test_fill_triangle_covers_interior_only() {
        let pts = square();
        let vp = Viewport::fit(&pts, 220).unwrap();
        let mut canvas = Canvas::new(vp, false);
        let red = Rgb([255, 0, 0]);
        canvas.fill_triangle([pts[0], pts[1], pts[2]], red);

        // 右下三角形内
        assert_eq!(*canvas.image().get_pixel(200, 100), red);
        // 左上三角形内与边距
        assert_eq!(*canvas.image().get_pixel(20, 20), BACKGROUND);
        assert_eq!(*canvas.image().get_pixel(5, 5), BACKGROUND);
    }

    #[test]
    fn test_two_triangles_tile_square() {
        let pts = square();
        let vp = Viewport::fit(&pts, 220).unwrap();
        let mut canvas = Canvas::new(vp, false);
        let c = Rgb([0, 0, 255]);
        canvas.fill_triangle([pts[0], pts[1], pts[2]], c);
        canvas.fill_triangle([pts[0], pts[2], pts[3]], c);
        for y in 10..110 {
            for x in 10..210 {
                assert_eq!(*canvas.image().get_pixel(x, y), c, "gap at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_colorbar_and_concat() {
        let vp = Viewport::fit(&square(), 220).unwrap();
        let mut canvas = Canvas::new(vp, true);
        canvas.draw_colorbar(Colormap::GreysR);
        let img = canvas.into_image();
        assert_eq!(img.width(), 220 + COLORBAR_WIDTH);
        // 色标顶部接近白、底部接近黑
        assert!(img.get_pixel(vp.width() + 15, 12).0[0] > 240);
        assert!(img.get_pixel(vp.width() + 15, 107).0[0] < 15);

        let joined = hconcat(&[img.clone(), img], 8);
        assert_eq!(joined.width(), 2 * (220 + COLORBAR_WIDTH) + 8);
        assert_eq!(joined.height(), 120);
    }
}
