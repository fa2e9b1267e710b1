// crates/uf_mesh/src/locator.rs

//! 网格点定位
//!
//! 基于 R-Tree 的三角形包围盒索引。先用包围盒筛选候选单元，
//! 再用重心坐标做精确判定；点落在公共边上时返回编号最小的单元。

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use uf_geo::geometry::orient2d;
use uf_geo::Point2D;

/// 重心坐标容差（相对三角形面积）
const BARY_EPS: f64 = 1e-12;

/// 单元包围盒
#[derive(Debug, Clone)]
pub struct CellEnvelope {
    /// 单元索引
    pub cell_index: usize,
    /// 三角形顶点
    pub corners: [Point2D; 3],
    min: [f64; 2],
    max: [f64; 2],
}

impl CellEnvelope {
    /// 由三角形顶点创建
    pub fn new(cell_index: usize, corners: [Point2D; 3]) -> Self {
        let mut min = [f64::MAX, f64::MAX];
        let mut max = [f64::MIN, f64::MIN];
        for p in &corners {
            min[0] = min[0].min(p.x);
            min[1] = min[1].min(p.y);
            max[0] = max[0].max(p.x);
            max[1] = max[1].max(p.y);
        }
        Self {
            cell_index,
            corners,
            min,
            max,
        }
    }

    /// 点是否在三角形内或边上
    pub fn contains_exact(&self, p: Point2D) -> bool {
        let [a, b, c] = self.corners;
        let area2 = orient2d(a, b, c);
        if area2 <= 0.0 {
            return false;
        }
        let eps = -BARY_EPS * area2;
        orient2d(b, c, p) >= eps && orient2d(c, a, p) >= eps && orient2d(a, b, p) >= eps
    }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for CellEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// 网格点定位器
#[derive(Debug, Clone)]
pub struct MeshLocator {
    tree: RTree<CellEnvelope>,
}

impl MeshLocator {
    /// 由节点与三角形构建
    pub fn build(nodes: &[Point2D], triangles: &[[usize; 3]]) -> Self {
        let envelopes = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| CellEnvelope::new(i, [nodes[t[0]], nodes[t[1]], nodes[t[2]]]))
            .collect();
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// 查找包含指定点的单元
    pub fn locate_point(&self, p: Point2D) -> Option<usize> {
        self.tree
            .locate_all_at_point(&p.to_array())
            .filter(|env| env.contains_exact(p))
            .map(|env| env.cell_index)
            .min()
    }

    /// 包围盒距离最近的单元
    pub fn locate_nearest(&self, p: Point2D) -> Option<usize> {
        self.tree
            .nearest_neighbor(&p.to_array())
            .map(|env| env.cell_index)
    }

    /// 与矩形相交的单元（按编号排序）
    pub fn locate_in_rect(&self, min: Point2D, max: Point2D) -> Vec<usize> {
        let envelope = AABB::from_corners(min.to_array(), max.to_array());
        let mut cells: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|env| env.cell_index)
            .collect();
        cells.sort_unstable();
        cells
    }

    /// 索引中的单元数
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 索引是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> MeshLocator {
        // (0,1)---(1,1)
        //   |  1  / |
        //   |   /   |
        //   | /  0  |
        // (0,0)---(1,0)
        let nodes = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        MeshLocator::build(&nodes, &[[0, 1, 2], [0, 2, 3]])
    }

    #[test]
    fn test_locate_point() {
        let locator = two_triangles();
        assert_eq!(locator.locate_point(Point2D::new(0.8, 0.2)), Some(0));
        assert_eq!(locator.locate_point(Point2D::new(0.2, 0.8)), Some(1));
        assert_eq!(locator.locate_point(Point2D::new(2.0, 2.0)), None);
    }

    #[test]
    fn test_shared_edge_picks_lowest_index() {
        let locator = two_triangles();
        assert_eq!(locator.locate_point(Point2D::new(0.5, 0.5)), Some(0));
    }

    #[test]
    fn test_locate_in_rect() {
        let locator = two_triangles();
        assert_eq!(
            locator.locate_in_rect(Point2D::new(-1.0, -1.0), Point2D::new(2.0, 2.0)),
            vec![0, 1]
        );
        assert_eq!(locator.len(), 2);
        assert!(locator.locate_nearest(Point2D::new(5.0, 0.5)).is_some());
    }
}
