// crates/uf_mesh/src/algorithms/triangulate.rs

//! 多边形三角化算法
//!
//! 带洞多边形的耳切法 (Ear Clipping)：
//!
//! 1. 外环统一为逆时针，洞统一为顺时针；
//! 2. 按最右顶点从右到左依次把每个洞"桥接"到当前外环上。桥接点从
//!    R-tree 最近邻迭代器中按距离取第一个互相可见的顶点；
//! 3. 对合并后的单一环执行耳切。桥接产生的重复顶点按顶点编号识别。

use std::collections::HashMap;

use rstar::primitives::GeomWithData;
use rstar::RTree;
use uf_geo::geometry::orient2d;
use uf_geo::Point2D;

use crate::error::{MeshError, MeshResult};

type VertexEntry = GeomWithData<[f64; 2], usize>;

/// 三角化带洞多边形
///
/// # 参数
/// - `points`: 全部顶点坐标
/// - `outer`: 外环顶点编号（任意方向）
/// - `holes`: 洞的顶点编号（任意方向）
///
/// # 返回
/// 逆时针三角形列表，顶点编号指向 `points`
pub fn triangulate_with_holes(
    points: &[Point2D],
    outer: &[usize],
    holes: &[Vec<usize>],
) -> MeshResult<Vec<[usize; 3]>> {
    if outer.len() < 3 {
        return Err(MeshError::triangulation("外环顶点少于 3 个"));
    }
    if let Some(&bad) = outer
        .iter()
        .chain(holes.iter().flatten())
        .find(|&&v| v >= points.len())
    {
        return Err(MeshError::triangulation(format!("顶点编号 {bad} 越界")));
    }

    let ring = oriented(points, outer, true);
    let mut hole_rings: Vec<Vec<usize>> = holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| oriented(points, h, false))
        .collect();
    hole_rings.sort_by(|a, b| max_x(points, b).total_cmp(&max_x(points, a)));

    let ring = bridge_holes(points, ring, &hole_rings)?;
    ear_clip(points, &ring)
}

/// 环的有向面积（逆时针为正）
fn ring_signed_area(points: &[Point2D], ring: &[usize]) -> f64 {
    let n = ring.len();
    let origin = points[ring[0]];
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[ring[i]] - origin;
        let b = points[ring[(i + 1) % n]] - origin;
        sum += a.cross(&b);
    }
    0.5 * sum
}

fn oriented(points: &[Point2D], ring: &[usize], ccw: bool) -> Vec<usize> {
    let mut out = ring.to_vec();
    if (ring_signed_area(points, ring) > 0.0) != ccw {
        out.reverse();
    }
    out
}

fn max_x(points: &[Point2D], ring: &[usize]) -> f64 {
    ring.iter()
        .map(|&v| points[v].x)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// 依次把洞接入外环
fn bridge_holes(
    points: &[Point2D],
    mut ring: Vec<usize>,
    holes: &[Vec<usize>],
) -> MeshResult<Vec<usize>> {
    if holes.is_empty() {
        return Ok(ring);
    }

    let mut occurrences: HashMap<usize, u32> = HashMap::new();
    for &v in &ring {
        *occurrences.entry(v).or_insert(0) += 1;
    }
    let mut tree: RTree<VertexEntry> = RTree::bulk_load(
        ring.iter()
            .map(|&v| GeomWithData::new(points[v].to_array(), v))
            .collect(),
    );

    for (k, hole) in holes.iter().enumerate() {
        // 最右顶点，x 相同时取 y 最小者
        let m_pos = (0..hole.len())
            .max_by(|&i, &j| {
                let (pi, pj) = (points[hole[i]], points[hole[j]]);
                pi.x.total_cmp(&pj.x).then(pj.y.total_cmp(&pi.y))
            })
            .unwrap_or(0);
        let m = hole[m_pos];
        let pm = points[m];

        let bridge = tree
            .nearest_neighbor_iter(&pm.to_array())
            .map(|entry| entry.data)
            .filter(|v| occurrences.get(v).copied() == Some(1))
            .find(|&p| is_visible(points, &ring, &holes[k..], m, p));
        let p = bridge.ok_or_else(|| {
            MeshError::triangulation(format!(
                "第 {k} 个洞找不到可见的桥接顶点 (最右点 {:.3}, {:.3})",
                pm.x, pm.y
            ))
        })?;
        let pos = ring
            .iter()
            .position(|&v| v == p)
            .ok_or_else(|| MeshError::triangulation("桥接顶点不在外环中"))?;

        let mut merged = Vec::with_capacity(ring.len() + hole.len() + 2);
        merged.extend_from_slice(&ring[..=pos]);
        for i in 0..=hole.len() {
            merged.push(hole[(m_pos + i) % hole.len()]);
        }
        merged.push(p);
        merged.extend_from_slice(&ring[pos + 1..]);
        ring = merged;

        *occurrences.entry(p).or_insert(0) += 1;
        for &v in hole {
            *occurrences.entry(v).or_insert(0) += 1;
            tree.insert(GeomWithData::new(points[v].to_array(), v));
        }
        *occurrences.entry(m).or_insert(0) += 1;
    }

    Ok(ring)
}

/// 线段 m-p 是否与环和尚未接入的洞都不相交
fn is_visible(
    points: &[Point2D],
    ring: &[usize],
    pending_holes: &[Vec<usize>],
    m: usize,
    p: usize,
) -> bool {
    let (pm, pp) = (points[m], points[p]);
    if pm == pp {
        return false;
    }

    let blocked = |a: usize, b: usize| {
        if a == p || b == p || a == m || b == m {
            return false;
        }
        segments_intersect(pm, pp, points[a], points[b])
    };

    let n = ring.len();
    if (0..n).any(|i| blocked(ring[i], ring[(i + 1) % n])) {
        return false;
    }
    for hole in pending_holes {
        let h = hole.len();
        if (0..h).any(|i| blocked(hole[i], hole[(i + 1) % h])) {
            return false;
        }
    }

    // 桥接线不能穿过当前洞的内部
    let mid = pm.midpoint(&pp);
    !pending_holes
        .first()
        .is_some_and(|hole| strictly_inside_ring(points, hole, mid))
}

fn on_segment(a: Point2D, b: Point2D, p: Point2D) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// 线段相交判定（含端点接触与共线重叠）
pub(crate) fn segments_intersect(p1: Point2D, p2: Point2D, q1: Point2D, q2: Point2D) -> bool {
    let d1 = orient2d(q1, q2, p1);
    let d2 = orient2d(q1, q2, p2);
    let d3 = orient2d(p1, p2, q1);
    let d4 = orient2d(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn strictly_inside_ring(points: &[Point2D], ring: &[usize], p: Point2D) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (points[ring[i]], points[ring[j]]);
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// 点在三角形内或边上（逆时针三角形）
fn point_in_triangle(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    orient2d(a, b, p) >= 0.0 && orient2d(b, c, p) >= 0.0 && orient2d(c, a, p) >= 0.0
}

/// 对单一逆时针环执行耳切
fn ear_clip(points: &[Point2D], ring: &[usize]) -> MeshResult<Vec<[usize; 3]>> {
    let n = ring.len();
    if n < 3 {
        return Err(MeshError::triangulation("环顶点少于 3 个"));
    }

    let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
    let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    let mut remaining = n;
    let mut cur = 0;
    let mut stalled = 0;

    while remaining > 3 {
        let (a, b, c) = (prev[cur], cur, next[cur]);
        if is_ear(points, ring, &next, a, b, c) {
            triangles.push([ring[a], ring[b], ring[c]]);
            next[a] = c;
            prev[c] = a;
            remaining -= 1;
            stalled = 0;
            cur = c;
        } else {
            cur = c;
            stalled += 1;
            if stalled > remaining {
                return Err(MeshError::triangulation(format!(
                    "剩余 {remaining} 个顶点时找不到可切除的耳，输入多边形可能自交或洞重叠"
                )));
            }
        }
    }

    let (a, b, c) = (prev[cur], cur, next[cur]);
    if orient2d(points[ring[a]], points[ring[b]], points[ring[c]]) <= 0.0 {
        return Err(MeshError::triangulation("最后一个三角形退化"));
    }
    triangles.push([ring[a], ring[b], ring[c]]);
    Ok(triangles)
}

fn is_ear(
    points: &[Point2D],
    ring: &[usize],
    next: &[usize],
    a: usize,
    b: usize,
    c: usize,
) -> bool {
    let (ia, ib, ic) = (ring[a], ring[b], ring[c]);
    let (pa, pb, pc) = (points[ia], points[ib], points[ic]);
    if orient2d(pa, pb, pc) <= 0.0 {
        return false;
    }

    let mut node = next[c];
    while node != a {
        let v = ring[node];
        if v != ia && v != ib && v != ic {
            let p = points[v];
            if p != pa && p != pb && p != pc && point_in_triangle(p, pa, pb, pc) {
                return false;
            }
        }
        node = next[node];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use uf_geo::geometry::triangle_area;

    fn total_area(points: &[Point2D], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| triangle_area(points[t[0]], points[t[1]], points[t[2]]))
            .sum()
    }

    fn all_ccw(points: &[Point2D], tris: &[[usize; 3]]) -> bool {
        tris.iter()
            .all(|t| orient2d(points[t[0]], points[t[1]], points[t[2]]) > 0.0)
    }

    #[test]
    fn test_square() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        let tris = triangulate_with_holes(&points, &[0, 1, 2, 3], &[]).unwrap();
        assert_eq!(tris.len(), 2);
        assert!((total_area(&points, &tris) - 1.0).abs() < 1e-12);
        assert!(all_ccw(&points, &tris));
    }

    #[test]
    fn test_clockwise_concave_polygon() {
        // L 形，顺时针给出
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 2.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(2.0, 0.0),
        ];
        let tris = triangulate_with_holes(&points, &[0, 1, 2, 3, 4, 5], &[]).unwrap();
        assert_eq!(tris.len(), 4);
        assert!((total_area(&points, &tris) - 3.0).abs() < 1e-12);
        assert!(all_ccw(&points, &tris));
    }

    #[test]
    fn test_square_with_two_holes() {
        let mut points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];
        for (x0, y0) in [(2.0, 2.0), (6.0, 5.0)] {
            points.push(Point2D::new(x0, y0));
            points.push(Point2D::new(x0 + 2.0, y0));
            points.push(Point2D::new(x0 + 2.0, y0 + 2.0));
            points.push(Point2D::new(x0, y0 + 2.0));
        }
        let holes = vec![vec![4, 5, 6, 7], vec![8, 9, 10, 11]];
        let tris = triangulate_with_holes(&points, &[0, 1, 2, 3], &holes).unwrap();

        // 欧拉公式：n + 2h - 2 个三角形
        assert_eq!(tris.len(), 12 + 2 * 2 - 2);
        assert!((total_area(&points, &tris) - (100.0 - 8.0)).abs() < 1e-9);
        assert!(all_ccw(&points, &tris));
    }

    #[test]
    fn test_segments_intersect() {
        let p = |x, y| Point2D::new(x, y);
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)));
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)));
    }

    #[test]
    fn test_out_of_range_vertex() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)];
        assert!(triangulate_with_holes(&points, &[0, 1, 5], &[]).is_err());
    }
}
