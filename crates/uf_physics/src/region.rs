// crates/uf_physics/src/region.rs

//! 单元区域
//!
//! 区域是网格单元索引的有序集合，用于入流算子等局部操作。

use tracing::debug;
use uf_geo::{Point2D, Polygon};
use uf_mesh::FrozenMesh;

use crate::error::{PhysicsError, PhysicsResult};

/// 网格单元区域
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    label: String,
    indices: Vec<usize>,
}

impl Region {
    /// 圆形区域
    ///
    /// 选取形心距圆心不超过 `radius` 的单元；若没有，退化为包含圆心的单元。
    /// 圆心不在网格内时报错。
    pub fn circle(mesh: &FrozenMesh, center: Point2D, radius: f64) -> PhysicsResult<Self> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(PhysicsError::invalid_parameter(format!(
                "区域半径必须为非负数, 实际 {radius}"
            )));
        }
        let label = format!("circle({}, {}, r={radius})", center.x, center.y);

        let offset = Point2D::new(radius, radius);
        let r2 = radius * radius;
        let mut indices: Vec<usize> = mesh
            .locator()
            .locate_in_rect(center - offset, center + offset)
            .into_iter()
            .filter(|&i| mesh.centroids[i].distance_squared_to(&center) <= r2)
            .collect();
        indices.sort_unstable();

        if indices.is_empty() {
            let cell = mesh.locate(center).ok_or(PhysicsError::RegionOutsideMesh {
                x: center.x,
                y: center.y,
            })?;
            debug!("{label} 内没有单元形心，使用包含圆心的单元 {cell}");
            indices.push(cell);
        } else if mesh.locate(center).is_none() {
            return Err(PhysicsError::RegionOutsideMesh {
                x: center.x,
                y: center.y,
            });
        }

        Ok(Self { label, indices })
    }

    /// 多边形区域：形心落在多边形内（含边界）的单元
    pub fn polygon(mesh: &FrozenMesh, polygon: &Polygon) -> PhysicsResult<Self> {
        let (min, max) = polygon.bounds();
        let mut indices: Vec<usize> = mesh
            .locator()
            .locate_in_rect(min, max)
            .into_iter()
            .filter(|&i| polygon.contains(mesh.centroids[i]))
            .collect();
        indices.sort_unstable();

        let label = format!("polygon({} vertices)", polygon.len());
        if indices.is_empty() {
            return Err(PhysicsError::EmptyRegion { region: label });
        }
        Ok(Self { label, indices })
    }

    /// 由单元索引直接构造
    pub fn from_indices(mesh: &FrozenMesh, mut indices: Vec<usize>) -> PhysicsResult<Self> {
        indices.sort_unstable();
        indices.dedup();
        if let Some(&bad) = indices.iter().find(|&&i| i >= mesh.n_cells()) {
            return Err(PhysicsError::invalid_parameter(format!(
                "单元索引 {bad} 越界（共 {} 个单元）",
                mesh.n_cells()
            )));
        }
        if indices.is_empty() {
            return Err(PhysicsError::EmptyRegion {
                region: "cells".into(),
            });
        }
        Ok(Self {
            label: format!("cells({})", indices.len()),
            indices,
        })
    }

    /// 单元索引（升序）
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 区域总面积
    pub fn area(&self, mesh: &FrozenMesh) -> f64 {
        self.indices.iter().map(|&i| mesh.areas[i]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uf_mesh::RectMeshGenerator;

    fn mesh() -> FrozenMesh {
        RectMeshGenerator::new(10, 10, 10.0, 10.0).build().unwrap()
    }

    #[test]
    fn test_circle_selects_by_centroid() {
        let mesh = mesh();
        let region = Region::circle(&mesh, Point2D::new(5.0, 5.0), 1.5).unwrap();
        assert!(region.len() >= 4);
        for &i in region.indices() {
            assert!(mesh.centroids[i].distance_to(&Point2D::new(5.0, 5.0)) <= 1.5);
        }
        assert!(region.indices().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tiny_circle_falls_back_to_containing_cell() {
        let mesh = mesh();
        let center = Point2D::new(3.2, 7.9);
        let region = Region::circle(&mesh, center, 0.01).unwrap();
        assert_eq!(region.len(), 1);
        assert_eq!(Some(region.indices()[0]), mesh.locate(center));
    }

    #[test]
    fn test_circle_outside_mesh() {
        let mesh = mesh();
        let err = Region::circle(&mesh, Point2D::new(50.0, 50.0), 1.0).unwrap_err();
        assert!(matches!(err, PhysicsError::RegionOutsideMesh { .. }));
    }

    #[test]
    fn test_polygon_region() {
        let mesh = mesh();
        let region = Region::polygon(&mesh, &Polygon::rectangle(0.0, 0.0, 2.0, 2.0)).unwrap();
        // 4 个正方形，8 个三角形
        assert_eq!(region.len(), 8);
        approx::assert_relative_eq!(region.area(&mesh), 4.0, max_relative = 1e-12);
        assert!(Region::polygon(&mesh, &Polygon::rectangle(20.0, 20.0, 21.0, 21.0)).is_err());
    }
}
