// crates/uf_mesh/src/generation.rs

//! 网格生成模块
//!
//! - [`RegionMeshBuilder`]: 由外边界、加密区与洞生成非结构三角网格
//! - [`RectMeshGenerator`]: 矩形结构化网格生成器，用于测试和验证
//!
//! # 使用示例
//!
//! ```rust
//! use uf_geo::Polygon;
//! use uf_mesh::generation::RegionMeshBuilder;
//!
//! let bounding = Polygon::rectangle(0.0, 0.0, 100.0, 50.0);
//! let mesh = RegionMeshBuilder::new(bounding, 200.0)
//!     .with_boundary_tag("bottom", [0])
//!     .with_boundary_tag("right", [1])
//!     .with_boundary_tag("top", [2])
//!     .with_boundary_tag("left", [3])
//!     .with_interior_region(Polygon::rectangle(40.0, 10.0, 60.0, 40.0), 20.0)
//!     .build()
//!     .unwrap();
//!
//! assert!((mesh.total_area() - 5000.0).abs() < 1e-6);
//! assert!(mesh.areas.iter().all(|&a| a <= 200.0 + 1e-6));
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};
use uf_geo::{Point2D, Polygon};

use crate::algorithms::refine::{edge_key, EdgeKey, WorkMesh};
use crate::algorithms::triangulate::triangulate_with_holes;
use crate::error::{MeshError, MeshResult};
use crate::frozen::FrozenMesh;

/// 未显式标记的外边界段使用的标签
pub const DEFAULT_TAG: &str = "exterior";

/// 洞边界使用的标签
pub const HOLE_TAG: &str = "interior";

/// 加密后单元数上限
const DEFAULT_MAX_TRIANGLES: usize = 5_000_000;

/// 加密与翻边交替轮数
const DEFAULT_SMOOTHING_PASSES: usize = 3;

/// 区域网格生成器
///
/// 外边界第 i 段连接顶点 i 与 i+1 (mod n)。
#[derive(Debug, Clone)]
pub struct RegionMeshBuilder {
    bounding_polygon: Polygon,
    boundary_tags: BTreeMap<String, Vec<usize>>,
    maximum_triangle_area: f64,
    interior_regions: Vec<(Polygon, f64)>,
    interior_holes: Vec<Polygon>,
    max_triangles: usize,
    smoothing_passes: usize,
}

impl RegionMeshBuilder {
    /// 创建生成器
    pub fn new(bounding_polygon: Polygon, maximum_triangle_area: f64) -> Self {
        Self {
            bounding_polygon,
            boundary_tags: BTreeMap::new(),
            maximum_triangle_area,
            interior_regions: Vec::new(),
            interior_holes: Vec::new(),
            max_triangles: DEFAULT_MAX_TRIANGLES,
            smoothing_passes: DEFAULT_SMOOTHING_PASSES,
        }
    }

    /// 为一组外边界段设置标签
    pub fn with_boundary_tag(
        mut self,
        tag: impl Into<String>,
        segments: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.boundary_tags
            .entry(tag.into())
            .or_default()
            .extend(segments);
        self
    }

    /// 一次设置全部边界标签
    pub fn with_boundary_tags(mut self, tags: BTreeMap<String, Vec<usize>>) -> Self {
        self.boundary_tags = tags;
        self
    }

    /// 添加加密区
    pub fn with_interior_region(mut self, polygon: Polygon, max_area: f64) -> Self {
        self.interior_regions.push((polygon, max_area));
        self
    }

    /// 添加洞
    pub fn with_interior_holes(mut self, holes: impl IntoIterator<Item = Polygon>) -> Self {
        self.interior_holes.extend(holes);
        self
    }

    /// 设置单元数上限
    pub fn with_max_triangles(mut self, limit: usize) -> Self {
        self.max_triangles = limit;
        self
    }

    /// 设置加密与翻边交替轮数
    pub fn with_smoothing_passes(mut self, passes: usize) -> Self {
        self.smoothing_passes = passes;
        self
    }

    /// 某点处允许的最大三角形面积
    pub fn target_area(&self, p: Point2D) -> f64 {
        self.interior_regions
            .iter()
            .filter(|(poly, _)| poly.contains(p))
            .map(|(_, area)| *area)
            .fold(self.maximum_triangle_area, f64::min)
    }

    fn validate_parameters(&self) -> MeshResult<()> {
        if !(self.maximum_triangle_area.is_finite() && self.maximum_triangle_area > 0.0) {
            return Err(MeshError::invalid_parameter(format!(
                "最大三角形面积必须为正: {}",
                self.maximum_triangle_area
            )));
        }
        for (i, (_, area)) in self.interior_regions.iter().enumerate() {
            if !(area.is_finite() && *area > 0.0) {
                return Err(MeshError::invalid_parameter(format!(
                    "第 {i} 个加密区的最大面积必须为正: {area}"
                )));
            }
        }
        Ok(())
    }

    /// 每个外边界段的标签编号
    fn resolve_segment_tags(&self, tags: &mut Vec<String>) -> MeshResult<Vec<usize>> {
        let n = self.bounding_polygon.len();
        let mut seg_tag: Vec<Option<usize>> = vec![None; n];

        for (name, segments) in &self.boundary_tags {
            let idx = intern(tags, name);
            for &s in segments {
                if s >= n {
                    return Err(MeshError::SegmentOutOfRange {
                        tag: name.clone(),
                        segment: s,
                        n_segments: n,
                    });
                }
                match seg_tag[s] {
                    Some(prev) if prev != idx => {
                        return Err(MeshError::SegmentTaggedTwice {
                            segment: s,
                            first: tags[prev].clone(),
                            second: name.clone(),
                        })
                    }
                    _ => seg_tag[s] = Some(idx),
                }
            }
        }

        let untagged = seg_tag.iter().filter(|t| t.is_none()).count();
        if untagged > 0 {
            warn!("{} 个外边界段未标记，使用默认标签 '{}'", untagged, DEFAULT_TAG);
            let idx = intern(tags, DEFAULT_TAG);
            for slot in seg_tag.iter_mut().filter(|t| t.is_none()) {
                *slot = Some(idx);
            }
        }

        Ok(seg_tag.into_iter().flatten().collect())
    }

    /// 洞必须严格位于外边界内且两两分离
    ///
    /// 共墙或重叠的房屋轮廓需先用 [`uf_geo::merge_touching`] 合并。
    fn validate_holes(&self) -> MeshResult<()> {
        for (k, hole) in self.interior_holes.iter().enumerate() {
            if let Some(p) = hole
                .vertices()
                .iter()
                .find(|&&p| !self.bounding_polygon.contains(p))
            {
                return Err(MeshError::HoleOutsideBoundary {
                    hole: k,
                    x: p.x,
                    y: p.y,
                });
            }
            if hole.edges_intersect(&self.bounding_polygon) {
                return Err(MeshError::HoleTouchesBoundary { hole: k });
            }
        }
        for (i, a) in self.interior_holes.iter().enumerate() {
            for (j, b) in self.interior_holes.iter().enumerate().skip(i + 1) {
                if a.intersects(b) {
                    return Err(MeshError::HolesIntersect {
                        first: i,
                        second: j,
                    });
                }
            }
        }
        Ok(())
    }

    /// 生成网格
    pub fn build(&self) -> MeshResult<FrozenMesh> {
        self.validate_parameters()?;

        let mut tags: Vec<String> = Vec::new();
        let seg_tags = self.resolve_segment_tags(&mut tags)?;

        let outer = self.bounding_polygon.vertices();
        let n = outer.len();
        let mut points: Vec<Point2D> = outer.to_vec();
        let mut segments: HashMap<EdgeKey, usize> = HashMap::new();
        for i in 0..n {
            let j = (i + 1) % n;
            if points[i] == points[j] {
                return Err(MeshError::invalid_parameter(format!(
                    "外边界第 {i} 段长度为零"
                )));
            }
            segments.insert(edge_key(i, j), seg_tags[i]);
        }
        let outer_ring: Vec<usize> = (0..n).collect();

        self.validate_holes()?;

        let mut hole_rings = Vec::with_capacity(self.interior_holes.len());
        if !self.interior_holes.is_empty() {
            let hole_tag = intern(&mut tags, HOLE_TAG);
            for hole in &self.interior_holes {
                let base = points.len();
                let m = hole.len();
                points.extend_from_slice(hole.vertices());
                for i in 0..m {
                    segments.insert(edge_key(base + i, base + (i + 1) % m), hole_tag);
                }
                hole_rings.push((base..base + m).collect::<Vec<_>>());
            }
        }

        let triangles = triangulate_with_holes(&points, &outer_ring, &hole_rings)?;
        let mut work = WorkMesh::new(points, triangles, segments)?;

        let target = |c: Point2D| self.target_area(c);
        for _ in 0..self.smoothing_passes {
            work.refine(&target, self.max_triangles)?;
            work.improve_delaunay();
        }
        work.refine(&target, self.max_triangles)?;

        let (points, triangles, segments) = work.into_parts();
        let mesh = FrozenMesh::from_parts(points, triangles, &segments, tags)?;

        info!(
            "区域网格生成完成: {} 个节点, {} 个单元, {} 个洞, {} 个加密区",
            mesh.n_nodes(),
            mesh.n_cells(),
            self.interior_holes.len(),
            self.interior_regions.len()
        );
        Ok(mesh)
    }
}

fn intern(tags: &mut Vec<String>, name: &str) -> usize {
    match tags.iter().position(|t| t == name) {
        Some(i) => i,
        None => {
            tags.push(name.to_string());
            tags.len() - 1
        }
    }
}

/// 由区域描述生成网格
///
/// 与 [`RegionMeshBuilder`] 等价的函数形式。
pub fn create_mesh_from_regions(
    bounding_polygon: Polygon,
    boundary_tags: BTreeMap<String, Vec<usize>>,
    maximum_triangle_area: f64,
    interior_regions: Vec<(Polygon, f64)>,
    interior_holes: Vec<Polygon>,
) -> MeshResult<FrozenMesh> {
    let mut builder = RegionMeshBuilder::new(bounding_polygon, maximum_triangle_area)
        .with_boundary_tags(boundary_tags)
        .with_interior_holes(interior_holes);
    for (polygon, area) in interior_regions {
        builder = builder.with_interior_region(polygon, area);
    }
    builder.build()
}

/// 矩形结构化网格生成器
///
/// 每个矩形分为 2 个三角形，边界标签为 `left`、`right`、`top`、`bottom`
#[derive(Debug, Clone)]
pub struct RectMeshGenerator {
    /// x 方向单元数
    nx: usize,
    /// y 方向单元数
    ny: usize,
    /// x 方向域长度 [m]
    lx: f64,
    /// y 方向域长度 [m]
    ly: f64,
    /// x 方向起点
    x0: f64,
    /// y 方向起点
    y0: f64,
}

impl RectMeshGenerator {
    /// 创建矩形网格生成器
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            x0: 0.0,
            y0: 0.0,
        }
    }

    /// 设置原点偏移
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.x0 = x0;
        self.y0 = y0;
        self
    }

    /// 单元总数
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * 2
    }

    /// 构建网格
    pub fn build(&self) -> MeshResult<FrozenMesh> {
        if self.nx == 0 || self.ny == 0 || self.lx <= 0.0 || self.ly <= 0.0 {
            return Err(MeshError::invalid_parameter("矩形网格尺寸必须为正"));
        }
        let dx = self.lx / self.nx as f64;
        let dy = self.ly / self.ny as f64;
        let idx = |i: usize, j: usize| j * (self.nx + 1) + i;

        let mut nodes = Vec::with_capacity((self.nx + 1) * (self.ny + 1));
        for j in 0..=self.ny {
            for i in 0..=self.nx {
                nodes.push(Point2D::new(
                    self.x0 + i as f64 * dx,
                    self.y0 + j as f64 * dy,
                ));
            }
        }

        let mut triangles = Vec::with_capacity(self.n_cells());
        for j in 0..self.ny {
            for i in 0..self.nx {
                let v00 = idx(i, j);
                let v10 = idx(i + 1, j);
                let v11 = idx(i + 1, j + 1);
                let v01 = idx(i, j + 1);
                triangles.push([v00, v10, v11]);
                triangles.push([v00, v11, v01]);
            }
        }

        let tags: Vec<String> = ["left", "right", "top", "bottom"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut segments = HashMap::new();
        for j in 0..self.ny {
            segments.insert(edge_key(idx(0, j), idx(0, j + 1)), 0);
            segments.insert(edge_key(idx(self.nx, j), idx(self.nx, j + 1)), 1);
        }
        for i in 0..self.nx {
            segments.insert(edge_key(idx(i, self.ny), idx(i + 1, self.ny)), 2);
            segments.insert(edge_key(idx(i, 0), idx(i + 1, 0)), 3);
        }

        FrozenMesh::from_parts(nodes, triangles, &segments, tags)
    }
}
