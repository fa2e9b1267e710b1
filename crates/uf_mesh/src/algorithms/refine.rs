// crates/uf_mesh/src/algorithms/refine.rs

//! 网格细化算法
//!
//! 在可编辑三角网格 [`WorkMesh`] 上提供：
//!
//! - 最长边传播路径 (LEPP) 二分加密，保持网格协调（无悬挂节点）；
//! - 约束 Lawson 翻边，改善三角形形状，边界段与洞边界段永不翻转。
//!
//! 边界段在二分时把标签传给两个子段。

use std::collections::HashMap;

use tracing::debug;
use uf_geo::geometry::{orient2d, triangle_area};
use uf_geo::Point2D;

use crate::error::{MeshError, MeshResult};

/// 无向边键（小编号在前）
pub type EdgeKey = (usize, usize);

const NONE: usize = usize::MAX;

/// 构造无向边键
#[inline]
pub fn edge_key(a: usize, b: usize) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// 可编辑三角网格
///
/// 三角形始终保持逆时针；`edges` 记录每条边两侧的三角形，
/// `segments` 记录受约束的边界段及其标签编号。
#[derive(Debug, Clone)]
pub struct WorkMesh {
    points: Vec<Point2D>,
    triangles: Vec<[usize; 3]>,
    edges: HashMap<EdgeKey, [usize; 2]>,
    segments: HashMap<EdgeKey, usize>,
}

impl WorkMesh {
    /// 从三角化结果构建
    ///
    /// 每条约束段必须恰好是一个三角形的边（网格边界）。
    pub fn new(
        points: Vec<Point2D>,
        triangles: Vec<[usize; 3]>,
        segments: HashMap<EdgeKey, usize>,
    ) -> MeshResult<Self> {
        let mut edges: HashMap<EdgeKey, [usize; 2]> = HashMap::with_capacity(triangles.len() * 2);
        for (t, tri) in triangles.iter().enumerate() {
            if orient2d(points[tri[0]], points[tri[1]], points[tri[2]]) <= 0.0 {
                return Err(MeshError::invalid_topology(
                    "build_work_mesh",
                    format!("三角形 {t} 不是逆时针或面积为零"),
                ));
            }
            for k in 0..3 {
                let key = edge_key(tri[(k + 1) % 3], tri[(k + 2) % 3]);
                let slot = edges.entry(key).or_insert([NONE, NONE]);
                if slot[0] == NONE {
                    slot[0] = t;
                } else if slot[1] == NONE {
                    slot[1] = t;
                } else {
                    return Err(MeshError::invalid_topology(
                        "build_work_mesh",
                        format!("边 {key:?} 被三个以上三角形共享"),
                    ));
                }
            }
        }

        let mut sorted: Vec<&EdgeKey> = segments.keys().collect();
        sorted.sort_unstable();
        for key in sorted {
            match edges.get(key) {
                Some(slot) if slot[1] == NONE => {}
                Some(_) => {
                    return Err(MeshError::invalid_topology(
                        "build_work_mesh",
                        format!("边界段 {key:?} 位于网格内部"),
                    ))
                }
                None => {
                    return Err(MeshError::invalid_topology(
                        "build_work_mesh",
                        format!("边界段 {key:?} 未出现在三角化结果中"),
                    ))
                }
            }
        }

        Ok(Self {
            points,
            triangles,
            edges,
            segments,
        })
    }

    /// 节点坐标
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// 三角形
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// 拆分为节点、三角形与约束段
    pub fn into_parts(self) -> (Vec<Point2D>, Vec<[usize; 3]>, HashMap<EdgeKey, usize>) {
        (self.points, self.triangles, self.segments)
    }

    /// 三角形面积
    pub fn area(&self, t: usize) -> f64 {
        let [a, b, c] = self.triangles[t];
        triangle_area(self.points[a], self.points[b], self.points[c])
    }

    /// 三角形形心
    pub fn centroid(&self, t: usize) -> Point2D {
        let [a, b, c] = self.triangles[t];
        let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
        Point2D::new((pa.x + pb.x + pc.x) / 3.0, (pa.y + pb.y + pc.y) / 3.0)
    }

    /// 最长边；长度相同时按边键取较大者，保证全序
    fn longest_edge(&self, t: usize) -> EdgeKey {
        let tri = self.triangles[t];
        let mut best = edge_key(tri[1], tri[2]);
        let mut best_len = self.edge_length_sq(best);
        for k in 1..3 {
            let key = edge_key(tri[(k + 1) % 3], tri[(k + 2) % 3]);
            let len = self.edge_length_sq(key);
            if len > best_len || (len == best_len && key > best) {
                best = key;
                best_len = len;
            }
        }
        best
    }

    fn edge_length_sq(&self, key: EdgeKey) -> f64 {
        self.points[key.0].distance_squared_to(&self.points[key.1])
    }

    fn other_side(&self, key: EdgeKey, t: usize) -> Option<usize> {
        let slot = self.edges.get(&key)?;
        let other = if slot[0] == t { slot[1] } else { slot[0] };
        (other != NONE).then_some(other)
    }

    fn add_owner(&mut self, key: EdgeKey, t: usize) {
        let slot = self.edges.entry(key).or_insert([NONE, NONE]);
        if slot[0] == NONE {
            slot[0] = t;
        } else {
            slot[1] = t;
        }
    }

    fn replace_owner(&mut self, key: EdgeKey, old: usize, new: usize) {
        if let Some(slot) = self.edges.get_mut(&key) {
            if slot[0] == old {
                slot[0] = new;
            } else if slot[1] == old {
                slot[1] = new;
            }
        }
    }

    /// 在边中点处二分，两侧三角形各分成两个
    ///
    /// 原三角形编号保留给含边起点的一半，另一半追加在末尾。
    fn split_edge(&mut self, key: EdgeKey) -> usize {
        let owners = self.edges.remove(&key).unwrap_or([NONE, NONE]);
        let (a, b) = key;
        let m = self.points.len();
        self.points.push(self.points[a].midpoint(&self.points[b]));

        for t in owners.into_iter().filter(|&t| t != NONE) {
            let tri = self.triangles[t];
            let k = (0..3).find(|&k| tri[k] != a && tri[k] != b).unwrap_or(0);
            let (c, p, q) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);

            let new_t = self.triangles.len();
            self.triangles[t] = [c, p, m];
            self.triangles.push([c, m, q]);

            self.add_owner(edge_key(p, m), t);
            self.add_owner(edge_key(m, q), new_t);
            self.add_owner(edge_key(c, m), t);
            self.add_owner(edge_key(c, m), new_t);
            self.replace_owner(edge_key(q, c), t, new_t);
        }

        if let Some(tag) = self.segments.remove(&key) {
            self.segments.insert(edge_key(a, m), tag);
            self.segments.insert(edge_key(m, b), tag);
        }
        m
    }

    /// LEPP 二分：沿最长边传播路径找到终端边对后二分，直到 `t0` 自身被分裂
    fn lepp_bisect(&mut self, t0: usize) -> MeshResult<()> {
        loop {
            let mut t = t0;
            let mut steps = 0usize;
            loop {
                let e = self.longest_edge(t);
                match self.other_side(e, t) {
                    Some(n) if self.longest_edge(n) != e => t = n,
                    _ => {
                        self.split_edge(e);
                        break;
                    }
                }
                steps += 1;
                if steps > self.triangles.len() {
                    return Err(MeshError::invalid_topology(
                        "lepp_bisect",
                        format!("三角形 {t0} 的最长边路径未收敛"),
                    ));
                }
            }
            if t == t0 {
                return Ok(());
            }
        }
    }

    /// 按目标面积加密
    ///
    /// `target(centroid)` 给出三角形允许的最大面积。返回新增的三角形数。
    pub fn refine<F>(&mut self, target: F, max_triangles: usize) -> MeshResult<usize>
    where
        F: Fn(Point2D) -> f64,
    {
        let start = self.triangles.len();
        loop {
            let mut changed = false;
            let mut t = 0;
            while t < self.triangles.len() {
                if self.area(t) > target(self.centroid(t)) * (1.0 + 1e-9) {
                    self.lepp_bisect(t)?;
                    changed = true;
                    if self.triangles.len() > max_triangles {
                        return Err(MeshError::TooManyTriangles {
                            count: self.triangles.len(),
                            limit: max_triangles,
                        });
                    }
                } else {
                    t += 1;
                }
            }
            if !changed {
                break;
            }
        }
        let added = self.triangles.len() - start;
        debug!("LEPP 加密新增 {} 个三角形，共 {} 个", added, self.triangles.len());
        Ok(added)
    }

    /// 约束 Lawson 翻边，返回翻转次数
    pub fn improve_delaunay(&mut self) -> usize {
        let mut stack: Vec<EdgeKey> = self
            .triangles
            .iter()
            .flat_map(|tri| (0..3).map(move |k| edge_key(tri[(k + 1) % 3], tri[(k + 2) % 3])))
            .collect();
        stack.sort_unstable();
        stack.dedup();
        stack.reverse();

        let limit = 20 * stack.len() + 100;
        let mut flips = 0;
        while let Some(key) = stack.pop() {
            if self.segments.contains_key(&key) {
                continue;
            }
            let Some(&[t1, t2]) = self.edges.get(&key) else {
                continue;
            };
            if t1 == NONE || t2 == NONE {
                continue;
            }
            if let Some(outer) = self.try_flip(key, t1, t2) {
                stack.extend(outer);
                flips += 1;
                if flips >= limit {
                    break;
                }
            }
        }
        debug!("Lawson 翻边 {} 次", flips);
        flips
    }

    /// 若对角顶点落在外接圆内且四边形为凸则翻边，返回四条外边
    fn try_flip(&mut self, key: EdgeKey, t1: usize, t2: usize) -> Option<[EdgeKey; 4]> {
        let (a, b) = key;
        let tri1 = self.triangles[t1];
        let k1 = (0..3).find(|&k| tri1[k] != a && tri1[k] != b)?;
        let (c, p, q) = (tri1[k1], tri1[(k1 + 1) % 3], tri1[(k1 + 2) % 3]);
        let tri2 = self.triangles[t2];
        let d = *tri2.iter().find(|&&v| v != a && v != b)?;

        let (pc, pp, pq, pd) = (self.points[c], self.points[p], self.points[q], self.points[d]);
        if orient2d(pp, pd, pc) <= 0.0 || orient2d(pd, pq, pc) <= 0.0 {
            return None;
        }
        if !in_circumcircle(pc, pp, pq, pd) {
            return None;
        }

        self.triangles[t1] = [p, d, c];
        self.triangles[t2] = [d, q, c];
        self.edges.remove(&key);
        self.edges.insert(edge_key(c, d), [t1, t2]);
        self.replace_owner(edge_key(p, d), t2, t1);
        self.replace_owner(edge_key(q, c), t1, t2);

        Some([
            edge_key(p, d),
            edge_key(d, q),
            edge_key(q, c),
            edge_key(c, p),
        ])
    }
}

/// `d` 是否严格位于逆时针三角形 `abc` 的外接圆内（带相对容差）
fn in_circumcircle(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> bool {
    let (ad, bd, cd) = (a - d, b - d, c - d);
    let det = ad.dot(&ad) * bd.cross(&cd) - bd.dot(&bd) * ad.cross(&cd) + cd.dot(&cd) * ad.cross(&bd);
    let scale = ad.dot(&ad).max(bd.dot(&bd)).max(cd.dot(&cd));
    det > 1e-10 * scale * scale
}
