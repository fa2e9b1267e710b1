// crates/uf_geo/src/polygon.rs

//! 多边形类型与 CSV 读取
//!
//! 多边形文件为每行一个 `x,y` 坐标对的 CSV：
//!
//! ```text
//! x,y
//! 459800.0,451700.0
//! 460300.0,451700.0
//! 460300.0,452200.0
//! 459800.0,452200.0
//! ```
//!
//! - 空行和以 `#` 开头的行被跳过
//! - 首行若无法解析为数字则视为表头
//! - 多余的列被忽略
//! - 与首点重合的闭合点被去除

use std::path::{Path, PathBuf};

use tracing::debug;
use uf_foundation::ensure;
use uf_foundation::error::{UfError, UfResult};

use crate::geometry::{orient2d, Point2D};

/// 简单多边形（顶点有序，首尾不重复）
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2D>,
}

impl Polygon {
    /// 由顶点列表创建多边形
    ///
    /// 末尾与首点重合的闭合点会被去除；有效顶点少于 3 个时报错。
    pub fn new(mut vertices: Vec<Point2D>) -> UfResult<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        ensure!(
            vertices.len() >= 3,
            UfError::invalid_input(format!("多边形至少需要 3 个顶点, 实际 {}", vertices.len()))
        );
        if let Some(bad) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(UfError::invalid_input(format!("多边形顶点 {} 坐标非有限值", bad)));
        }
        Ok(Self { vertices })
    }

    /// 轴对齐矩形（逆时针，从左下角开始）
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            vertices: vec![
                Point2D::new(x0, y0),
                Point2D::new(x1, y0),
                Point2D::new(x1, y1),
                Point2D::new(x0, y1),
            ],
        }
    }

    /// 顶点切片
    #[inline]
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// 顶点数
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// 是否为空（构造保证非空，保留以满足惯例）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// 第 `i` 条边 `(v[i], v[i+1 mod n])`
    #[inline]
    pub fn segment(&self, i: usize) -> (Point2D, Point2D) {
        let n = self.vertices.len();
        (self.vertices[i % n], self.vertices[(i + 1) % n])
    }

    /// 有符号面积（逆时针为正，鞋带公式）
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            sum += p.x * q.y - q.x * p.y;
        }
        0.5 * sum
    }

    /// 面积（无符号）
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// 是否逆时针
    #[inline]
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// 返回逆时针方向的副本
    pub fn to_ccw(&self) -> Self {
        let mut vertices = self.vertices.clone();
        if !self.is_ccw() {
            vertices.reverse();
        }
        Self { vertices }
    }

    /// 点是否在多边形内（射线法，边界上的点视为内部）
    pub fn contains(&self, p: Point2D) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if on_segment(a, b, p) {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// 包围盒 `(min, max)`
    pub fn bounds(&self) -> (Point2D, Point2D) {
        let mut min = Point2D::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.vertices {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// 两个多边形的边是否相交（含端点接触与共线重叠）
    pub fn edges_intersect(&self, other: &Polygon) -> bool {
        if !bounds_overlap(self.bounds(), other.bounds()) {
            return false;
        }
        (0..self.len()).any(|i| {
            let (a, b) = self.segment(i);
            (0..other.len()).any(|j| {
                let (c, d) = other.segment(j);
                segments_intersect(a, b, c, d)
            })
        })
    }

    /// 两个闭多边形是否有公共点（接触、重叠或包含）
    pub fn intersects(&self, other: &Polygon) -> bool {
        bounds_overlap(self.bounds(), other.bounds())
            && (self.edges_intersect(other)
                || self.contains(other.vertices[0])
                || other.contains(self.vertices[0]))
    }
}

/// 点集的凸包（逆时针）；点数不足或全部共线时返回 `None`
pub fn convex_hull(points: &[Point2D]) -> Option<Polygon> {
    let mut pts: Vec<Point2D> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return None;
    }

    // Andrew 单调链：先下链后上链
    let mut hull: Vec<Point2D> = Vec::with_capacity(2 * pts.len());
    push_chain(&mut hull, pts.iter().copied());
    push_chain(&mut hull, pts.iter().rev().copied());
    if hull.len() < 3 {
        return None;
    }
    Some(Polygon { vertices: hull })
}

/// 向凸包追加一条单调链（去掉链尾，它是下一条链的起点）
fn push_chain(hull: &mut Vec<Point2D>, points: impl Iterator<Item = Point2D>) {
    let start = hull.len();
    for p in points {
        while hull.len() >= start + 2
            && orient2d(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
}

/// 并查集根节点（路径减半）
fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// 合并相互接触或重叠的多边形
///
/// 相连的一组多边形以其凸包代替，反复合并直到两两不相交；
/// 孤立的多边形原样保留。结果按每组首个成员的输入顺序排列。
pub fn merge_touching(polygons: Vec<Polygon>) -> Vec<Polygon> {
    let total = polygons.len();
    let mut current = polygons;
    loop {
        let n = current.len();
        let mut parent: Vec<usize> = (0..n).collect();

        let mut merged_any = false;
        for i in 0..n {
            for j in (i + 1)..n {
                if current[i].intersects(&current[j]) {
                    let (ri, rj) = (find_root(&mut parent, i), find_root(&mut parent, j));
                    if ri != rj {
                        parent[ri.max(rj)] = ri.min(rj);
                    }
                    merged_any = true;
                }
            }
        }
        if !merged_any {
            break;
        }

        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        for i in 0..n {
            let root = find_root(&mut parent, i);
            match groups.iter_mut().find(|(r, _)| *r == root) {
                Some((_, members)) => members.push(i),
                None => groups.push((root, vec![i])),
            }
        }

        let mut next = Vec::with_capacity(groups.len());
        for (_, members) in groups {
            if members.len() == 1 {
                next.push(current[members[0]].clone());
                continue;
            }
            let points: Vec<Point2D> = members
                .iter()
                .flat_map(|&m| current[m].vertices.iter().copied())
                .collect();
            match convex_hull(&points) {
                Some(hull) => next.push(hull),
                None => next.extend(members.iter().map(|&m| current[m].clone())),
            }
        }
        if next.len() == n {
            // 凸包退化，无法继续合并
            current = next;
            break;
        }
        current = next;
    }
    if current.len() < total {
        debug!("合并接触多边形: {} → {}", total, current.len());
    }
    current
}

/// 包围盒是否相交（闭区间，带少量容差）
fn bounds_overlap(a: (Point2D, Point2D), b: (Point2D, Point2D)) -> bool {
    let eps = 1e-9 * (1.0 + a.1.x.abs().max(a.1.y.abs()));
    a.0.x <= b.1.x + eps && b.0.x <= a.1.x + eps && a.0.y <= b.1.y + eps && b.0.y <= a.1.y + eps
}

/// 闭线段 `ab` 与 `cd` 是否相交
fn segments_intersect(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> bool {
    let d1 = orient2d(c, d, a);
    let d2 = orient2d(c, d, b);
    let d3 = orient2d(a, b, c);
    let d4 = orient2d(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    on_segment(c, d, a) || on_segment(c, d, b) || on_segment(a, b, c) || on_segment(a, b, d)
}

/// 点是否落在线段上（含端点）
fn on_segment(a: Point2D, b: Point2D, p: Point2D) -> bool {
    let scale = (b - a).length().max(1.0);
    if orient2d(a, b, p).abs() > 1e-12 * scale * scale {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

// ============================================================
// 读取
// ============================================================

/// 从 CSV 文件读取多边形
pub fn read_polygon(path: impl AsRef<Path>) -> UfResult<Polygon> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| UfError::open_failed(path, e))?;
    parse_polygon(&content, path)
}

/// 从字符串解析多边形（`origin` 仅用于错误信息）
pub fn parse_polygon(content: &str, origin: &Path) -> UfResult<Polygon> {
    let mut vertices = Vec::new();
    let mut first_data_line = true;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split(',').map(str::trim);
        let x = parts.next().map(str::parse::<f64>);
        let y = parts.next().map(str::parse::<f64>);

        match (x, y) {
            (Some(Ok(x)), Some(Ok(y))) if x.is_finite() && y.is_finite() => {
                vertices.push(Point2D::new(x, y));
            }
            _ if first_data_line => {
                // 表头
                debug!("{}: 跳过表头 '{}'", origin.display(), trimmed);
            }
            _ => {
                return Err(UfError::parse(
                    origin,
                    line_num + 1,
                    format!("无法解析坐标 '{}'", trimmed),
                ));
            }
        }
        first_data_line = false;
    }

    Polygon::new(vertices).map_err(|e| match e {
        UfError::InvalidInput { message } => UfError::parse(origin, 0, message),
        other => other,
    })
}

/// 读取目录中所有匹配 `pattern` 的多边形文件，按文件名排序
///
/// `pattern` 支持单个 `*` 通配符，例如 `house*.csv`。
pub fn read_polygons_matching(dir: impl AsRef<Path>, pattern: &str) -> UfResult<Vec<Polygon>> {
    let dir = dir.as_ref();
    let (prefix, suffix) = match pattern.split_once('*') {
        Some((p, s)) => (p, s),
        None => (pattern, ""),
    };
    let exact = !pattern.contains('*');

    let entries = std::fs::read_dir(dir).map_err(|e| UfError::open_failed(dir, e))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let matched = if exact {
            name == pattern
        } else {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        };
        if matched && entry.path().is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    debug!("{}: {} 个文件匹配 '{}'", dir.display(), paths.len(), pattern);
    paths.iter().map(read_polygon).collect()
}

/// 保留面积严格大于 `min_area` 的多边形
///
/// ```
/// use uf_geo::{retain_larger_than, Polygon};
///
/// let small = Polygon::rectangle(0.0, 0.0, 6.0, 10.0); // 60 m²
/// let large = Polygon::rectangle(0.0, 0.0, 6.001, 10.0); // 60.01 m²
/// let kept = retain_larger_than(vec![small, large.clone()], 60.0);
/// assert_eq!(kept, vec![large]);
/// ```
pub fn retain_larger_than(polygons: Vec<Polygon>, min_area: f64) -> Vec<Polygon> {
    let total = polygons.len();
    let kept: Vec<Polygon> = polygons
        .into_iter()
        .filter(|p| p.area() > min_area)
        .collect();
    debug!("面积过滤 (> {} m²): 保留 {}/{}", min_area, kept.len(), total);
    kept
}
