// crates/uf_mesh/src/quality.rs

//! 网格质量评估
//!
//! 单个三角形的形状指标。

use uf_geo::Point2D;

/// 计算三角形的长宽比（最长边 / 最短边）
///
/// 等边三角形返回 1.0，退化三角形返回 `None`
pub fn aspect_ratio(a: Point2D, b: Point2D, c: Point2D) -> Option<f64> {
    let lengths = [a.distance_to(&b), b.distance_to(&c), c.distance_to(&a)];
    let max_len = lengths.iter().copied().fold(0.0f64, f64::max);
    let min_len = lengths.iter().copied().fold(f64::MAX, f64::min);
    (min_len > 1e-14).then(|| max_len / min_len)
}

/// 计算三角形的最小内角（度）
pub fn min_angle(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    let corners = [(a, b, c), (b, c, a), (c, a, b)];
    corners
        .iter()
        .map(|&(p, q, r)| {
            let u = q - p;
            let v = r - p;
            let denom = u.length() * v.length();
            if denom < 1e-28 {
                0.0
            } else {
                (u.dot(&v) / denom).clamp(-1.0, 1.0).acos().to_degrees()
            }
        })
        .fold(180.0, f64::min)
}

/// 内切圆半径 = 2A / 周长
pub fn inradius(a: Point2D, b: Point2D, c: Point2D, area: f64) -> f64 {
    let perimeter = a.distance_to(&b) + b.distance_to(&c) + c.distance_to(&a);
    if perimeter > 0.0 {
        2.0 * area / perimeter
    } else {
        0.0
    }
}
