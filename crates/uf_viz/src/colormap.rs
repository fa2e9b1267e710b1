// crates/uf_viz/src/colormap.rs

//! 色带
//!
//! 色带由等间距的 sRGB 控制点定义，中间值线性插值。

use image::Rgb;

/// viridis 控制点（t = 0, 1/8, ..., 1）
const VIRIDIS: [[f64; 3]; 9] = [
    [0.267004, 0.004874, 0.329415],
    [0.282623, 0.140926, 0.457517],
    [0.229739, 0.322361, 0.545706],
    [0.172719, 0.448791, 0.557885],
    [0.127568, 0.566949, 0.550556],
    [0.157851, 0.683765, 0.501686],
    [0.369214, 0.788888, 0.382914],
    [0.678489, 0.863742, 0.189503],
    [0.993248, 0.906157, 0.143936],
];

/// 反向灰度：低值黑、高值白
const GREYS_R: [[f64; 3]; 2] = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

/// 干单元颜色（浅灰）
pub const DRY_COLOR: Rgb<u8> = Rgb([220, 220, 220]);

/// 背景色
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// 线条颜色
pub const INK: Rgb<u8> = Rgb([40, 40, 40]);

/// 连续色带
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// 感知均匀的紫-绿-黄色带，用于水深与流速
    Viridis,
    /// 反向灰度，用于高程
    GreysR,
}

impl Colormap {
    fn points(&self) -> &'static [[f64; 3]] {
        match self {
            Self::Viridis => &VIRIDIS,
            Self::GreysR => &GREYS_R,
        }
    }

    /// 在 `t ∈ [0, 1]` 处取色（越界截断，NaN 取 0）
    pub fn sample(&self, t: f64) -> Rgb<u8> {
        let points = self.points();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let max_idx = (points.len() - 1) as f64;
        let scaled = t * max_idx;
        let lo = (scaled as usize).min(points.len() - 2);
        let frac = scaled - lo as f64;
        let (a, b) = (points[lo], points[lo + 1]);
        let channel = |k: usize| ((a[k] + (b[k] - a[k]) * frac) * 255.0).round() as u8;
        Rgb([channel(0), channel(1), channel(2)])
    }
}

/// 数值到 `[0, 1]` 的线性映射
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 由数据的有限值范围确定；无有限值时返回 `None`
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        (min <= max).then_some(Self { min, max })
    }

    /// 归一化；常值场映射到 0
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (value - self.min) / span
        } else {
            0.0
        }
    }

    pub fn color(&self, colormap: Colormap, value: f64) -> Rgb<u8> {
        colormap.sample(self.normalize(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(Colormap::Viridis.sample(0.0), Rgb([68, 1, 84]));
        assert_eq!(Colormap::Viridis.sample(1.0), Rgb([253, 231, 37]));
        assert_eq!(Colormap::GreysR.sample(0.0), Rgb([0, 0, 0]));
        assert_eq!(Colormap::GreysR.sample(1.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::GreysR.sample(0.5), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_out_of_range_clamped() {
        assert_eq!(Colormap::Viridis.sample(-3.0), Colormap::Viridis.sample(0.0));
        assert_eq!(Colormap::Viridis.sample(7.0), Colormap::Viridis.sample(1.0));
        assert_eq!(Colormap::Viridis.sample(f64::NAN), Colormap::Viridis.sample(0.0));
    }

    #[test]
    fn test_scale_from_values() {
        let s = ColorScale::from_values(&[2.0, f64::NAN, -1.0, 5.0]).unwrap();
        assert_eq!((s.min, s.max), (-1.0, 5.0));
        assert_eq!(s.normalize(2.0), 0.5);
        assert!(ColorScale::from_values(&[f64::NAN]).is_none());
        assert_eq!(ColorScale::new(3.0, 3.0).normalize(3.0), 0.0);
    }
}
