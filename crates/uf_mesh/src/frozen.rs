// crates/uf_mesh/src/frozen.rs

//! 冻结网格
//!
//! 加密完成后的只读三角网格，供有限体积求解器直接使用。
//!
//! # 约定
//!
//! 1. 三角形节点逆时针排列；
//! 2. 单元的第 k 条边与第 k 个顶点相对，即连接顶点 k+1 与 k+2；
//! 3. 法向量为单位外法向；
//! 4. 每条边界边带有一个标签编号，指向 `tags`。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uf_geo::geometry::orient2d;
use uf_geo::Point2D;

use crate::algorithms::refine::{edge_key, EdgeKey};
use crate::error::{MeshError, MeshResult};
use crate::locator::MeshLocator;
use crate::quality;

/// 单元某条边对面的邻居
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// 相邻单元编号
    Cell(usize),
    /// 边界边编号（指向 `boundary_edges`）
    Boundary(usize),
}

/// 边界边
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEdge {
    /// 所属单元
    pub cell: usize,
    /// 单元内的局部边号 (0..3)
    pub local_edge: usize,
    /// 标签编号
    pub tag: usize,
}

/// 冻结网格
#[derive(Debug, Clone)]
pub struct FrozenMesh {
    /// 节点坐标
    pub nodes: Vec<Point2D>,
    /// 三角形节点（逆时针）
    pub triangles: Vec<[usize; 3]>,
    /// 单元形心
    pub centroids: Vec<Point2D>,
    /// 单元面积
    pub areas: Vec<f64>,
    /// 单元内切圆半径（CFL 长度尺度）
    pub inradii: Vec<f64>,
    /// 边单位外法向
    pub edge_normals: Vec<[Point2D; 3]>,
    /// 边长
    pub edge_lengths: Vec<[f64; 3]>,
    /// 每条边对面的邻居
    pub neighbors: Vec<[Neighbor; 3]>,
    /// 边界边列表
    pub boundary_edges: Vec<BoundaryEdge>,
    /// 标签名称
    pub tags: Vec<String>,
    locator: MeshLocator,
}

impl FrozenMesh {
    /// 从三角形与带标签的边界段构建
    ///
    /// 每条只属于一个三角形的边都必须出现在 `segments` 中。
    pub fn from_parts(
        nodes: Vec<Point2D>,
        triangles: Vec<[usize; 3]>,
        segments: &HashMap<EdgeKey, usize>,
        tags: Vec<String>,
    ) -> MeshResult<Self> {
        let n_cells = triangles.len();
        if n_cells == 0 {
            return Err(MeshError::invalid_topology("freeze", "网格没有单元"));
        }

        let mut centroids = Vec::with_capacity(n_cells);
        let mut areas = Vec::with_capacity(n_cells);
        let mut inradii = Vec::with_capacity(n_cells);
        let mut edge_normals = Vec::with_capacity(n_cells);
        let mut edge_lengths = Vec::with_capacity(n_cells);
        let mut owners: HashMap<EdgeKey, Vec<(usize, usize)>> = HashMap::with_capacity(n_cells * 2);

        for (t, tri) in triangles.iter().enumerate() {
            if let Some(&v) = tri.iter().find(|&&v| v >= nodes.len()) {
                return Err(MeshError::invalid_topology(
                    "freeze",
                    format!("单元 {t} 引用了不存在的节点 {v}"),
                ));
            }
            let [a, b, c] = [nodes[tri[0]], nodes[tri[1]], nodes[tri[2]]];
            let area2 = orient2d(a, b, c);
            if area2 <= 0.0 {
                return Err(MeshError::invalid_topology(
                    "freeze",
                    format!("单元 {t} 不是逆时针或面积为零"),
                ));
            }
            let area = 0.5 * area2;
            centroids.push(Point2D::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0));
            areas.push(area);
            inradii.push(quality::inradius(a, b, c, area));

            let corners = [a, b, c];
            let mut normals = [Point2D::ZERO; 3];
            let mut lengths = [0.0; 3];
            for k in 0..3 {
                let p1 = corners[(k + 1) % 3];
                let p2 = corners[(k + 2) % 3];
                let d = p2 - p1;
                let len = d.length();
                normals[k] = Point2D::new(d.y / len, -d.x / len);
                lengths[k] = len;
                owners
                    .entry(edge_key(tri[(k + 1) % 3], tri[(k + 2) % 3]))
                    .or_default()
                    .push((t, k));
            }
            edge_normals.push(normals);
            edge_lengths.push(lengths);
        }

        let mut neighbors = Vec::with_capacity(n_cells);
        let mut boundary_edges = Vec::new();
        for (t, tri) in triangles.iter().enumerate() {
            let mut row = [Neighbor::Boundary(0); 3];
            for (k, slot) in row.iter_mut().enumerate() {
                let key = edge_key(tri[(k + 1) % 3], tri[(k + 2) % 3]);
                let sharing = owners.get(&key).map(Vec::as_slice).unwrap_or(&[]);
                match sharing {
                    [_] => {
                        let tag = *segments.get(&key).ok_or_else(|| {
                            MeshError::invalid_topology(
                                "freeze",
                                format!("单元 {t} 的边界边 {key:?} 没有标签"),
                            )
                        })?;
                        if tag >= tags.len() {
                            return Err(MeshError::invalid_topology(
                                "freeze",
                                format!("标签编号 {tag} 越界"),
                            ));
                        }
                        *slot = Neighbor::Boundary(boundary_edges.len());
                        boundary_edges.push(BoundaryEdge {
                            cell: t,
                            local_edge: k,
                            tag,
                        });
                    }
                    [(t1, _), (t2, _)] => {
                        *slot = Neighbor::Cell(if *t1 == t { *t2 } else { *t1 });
                    }
                    _ => {
                        return Err(MeshError::invalid_topology(
                            "freeze",
                            format!("边 {key:?} 被 {} 个单元共享", sharing.len()),
                        ))
                    }
                }
            }
            neighbors.push(row);
        }

        let locator = MeshLocator::build(&nodes, &triangles);
        Ok(Self {
            nodes,
            triangles,
            centroids,
            areas,
            inradii,
            edge_normals,
            edge_lengths,
            neighbors,
            boundary_edges,
            tags,
            locator,
        })
    }

    /// 节点数量
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.triangles.len()
    }

    /// 单元三个顶点坐标
    #[inline]
    pub fn cell_corners(&self, cell: usize) -> [Point2D; 3] {
        let [a, b, c] = self.triangles[cell];
        [self.nodes[a], self.nodes[b], self.nodes[c]]
    }

    /// 网格总面积
    pub fn total_area(&self) -> f64 {
        self.areas.iter().sum()
    }

    /// 查找包含点的单元
    pub fn locate(&self, p: Point2D) -> Option<usize> {
        self.locator.locate_point(p)
    }

    /// 空间索引
    pub fn locator(&self) -> &MeshLocator {
        &self.locator
    }

    /// 标签编号
    pub fn tag_index(&self, name: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == name)
    }

    /// 网格中实际出现在边界边上的标签
    pub fn boundary_tags(&self) -> BTreeSet<&str> {
        self.boundary_edges
            .iter()
            .map(|e| self.tags[e.tag].as_str())
            .collect()
    }

    /// 边界边的标签名称
    #[inline]
    pub fn boundary_tag(&self, boundary: usize) -> &str {
        &self.tags[self.boundary_edges[boundary].tag]
    }

    /// 统计信息
    pub fn statistics(&self) -> MeshStatistics {
        let mut min_area = f64::MAX;
        let mut max_area = f64::MIN;
        for &area in &self.areas {
            min_area = min_area.min(area);
            max_area = max_area.max(area);
        }

        let min_angle = (0..self.n_cells())
            .map(|i| {
                let [a, b, c] = self.cell_corners(i);
                quality::min_angle(a, b, c)
            })
            .fold(180.0, f64::min);

        let mut boundary_edges_per_tag: BTreeMap<String, usize> = BTreeMap::new();
        for edge in &self.boundary_edges {
            *boundary_edges_per_tag
                .entry(self.tags[edge.tag].clone())
                .or_insert(0) += 1;
        }

        let n_boundary = self.boundary_edges.len();
        MeshStatistics {
            n_nodes: self.n_nodes(),
            n_cells: self.n_cells(),
            n_interior_edges: (3 * self.n_cells() - n_boundary) / 2,
            n_boundary_edges: n_boundary,
            total_area: self.total_area(),
            min_cell_area: min_area,
            max_cell_area: max_area,
            min_angle_deg: min_angle,
            boundary_edges_per_tag,
        }
    }
}

/// 网格统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStatistics {
    pub n_nodes: usize,
    pub n_cells: usize,
    pub n_interior_edges: usize,
    pub n_boundary_edges: usize,
    pub total_area: f64,
    pub min_cell_area: f64,
    pub max_cell_area: f64,
    pub min_angle_deg: f64,
    pub boundary_edges_per_tag: BTreeMap<String, usize>,
}

impl std::fmt::Display for MeshStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 网格统计 ===")?;
        writeln!(f, "节点数: {}", self.n_nodes)?;
        writeln!(f, "单元数: {}", self.n_cells)?;
        writeln!(
            f,
            "边数: 内部 {}, 边界 {}",
            self.n_interior_edges, self.n_boundary_edges
        )?;
        writeln!(f, "总面积: {:.2} m²", self.total_area)?;
        writeln!(
            f,
            "单元面积: {:.3} ~ {:.3} m²",
            self.min_cell_area, self.max_cell_area
        )?;
        writeln!(f, "最小内角: {:.2}°", self.min_angle_deg)?;
        for (tag, count) in &self.boundary_edges_per_tag {
            writeln!(f, "  边界 '{}': {} 条边", tag, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> FrozenMesh {
        let nodes = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        let segments: HashMap<EdgeKey, usize> = [
            (edge_key(0, 1), 0),
            (edge_key(1, 2), 1),
            (edge_key(2, 3), 0),
            (edge_key(3, 0), 1),
        ]
        .into_iter()
        .collect();
        FrozenMesh::from_parts(
            nodes,
            vec![[0, 1, 2], [0, 2, 3]],
            &segments,
            vec!["wall".into(), "open".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_geometry() {
        let mesh = unit_square();
        assert_eq!(mesh.n_cells(), 2);
        assert_relative_eq!(mesh.total_area(), 1.0);
        assert_relative_eq!(mesh.centroids[0].x, 2.0 / 3.0);

        // 单元 0 的第 0 条边 (1,0)-(1,1)，外法向 +x
        let n = mesh.edge_normals[0][0];
        assert_relative_eq!(n.x, 1.0);
        assert_relative_eq!(n.y, 0.0);
        assert_relative_eq!(mesh.edge_lengths[0][0], 1.0);
    }

    #[test]
    fn test_neighbors_and_boundary() {
        let mesh = unit_square();
        // 单元 0 的第 1 条边是对角线 (1,1)-(0,0)
        assert_eq!(mesh.neighbors[0][1], Neighbor::Cell(1));
        assert_eq!(mesh.boundary_edges.len(), 4);
        let tags = mesh.boundary_tags();
        assert!(tags.contains("wall") && tags.contains("open"));

        let stats = mesh.statistics();
        assert_eq!(stats.n_interior_edges, 1);
        assert_eq!(stats.boundary_edges_per_tag["wall"], 2);
    }

    #[test]
    fn test_missing_tag_rejected() {
        let nodes = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ];
        let result = FrozenMesh::from_parts(nodes, vec![[0, 1, 2]], &HashMap::new(), vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_locate() {
        let mesh = unit_square();
        assert_eq!(mesh.locate(Point2D::new(0.9, 0.1)), Some(0));
        assert_eq!(mesh.locate(Point2D::new(0.1, 0.9)), Some(1));
        assert_eq!(mesh.locate(Point2D::new(1.5, 0.5)), None);
    }
}
