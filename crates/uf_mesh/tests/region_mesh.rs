// crates/uf_mesh/tests/region_mesh.rs

//! 区域网格生成集成测试
//!
//! # 测试覆盖
//!
//! - 覆盖性：单元面积之和等于外边界面积减去洞面积
//! - 协调性：内部边恰被两个单元共享，边界边都带标签
//! - 面积约束：每个单元不超过其形心处的目标面积
//! - 确定性：同样输入生成完全相同的网格
//! - 相邻、重叠与贴边的洞报错；合并后的连排房屋可正常剖分

use std::collections::{BTreeMap, HashMap};

use approx::assert_relative_eq;
use uf_geo::{Point2D, Polygon};
use uf_mesh::{FrozenMesh, MeshError, Neighbor, RegionMeshBuilder, HOLE_TAG};

// ============================================================================
// 测试辅助函数
// ============================================================================

/// 不规则五边形外边界（顺时针给出，检验方向无关）
fn catchment() -> Polygon {
    Polygon::new(vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(-10.0, 60.0),
        Point2D::new(70.0, 80.0),
        Point2D::new(120.0, 30.0),
        Point2D::new(90.0, -5.0),
    ])
    .unwrap()
}

fn houses() -> Vec<Polygon> {
    vec![
        Polygon::rectangle(20.0, 20.0, 30.0, 28.0),
        Polygon::rectangle(50.0, 40.0, 58.0, 50.0),
        Polygon::new(vec![
            Point2D::new(80.0, 10.0),
            Point2D::new(92.0, 14.0),
            Point2D::new(88.0, 24.0),
            Point2D::new(78.0, 20.0),
        ])
        .unwrap(),
    ]
}

fn builder() -> RegionMeshBuilder {
    RegionMeshBuilder::new(catchment(), 60.0)
        .with_boundary_tag("west", [0])
        .with_boundary_tag("north", [1, 2])
        .with_boundary_tag("east", [3, 4])
        .with_interior_region(Polygon::rectangle(40.0, 30.0, 70.0, 60.0), 8.0)
}

fn perimeter(polygon: &Polygon) -> f64 {
    (0..polygon.len())
        .map(|i| {
            let (a, b) = polygon.segment(i);
            a.distance_to(&b)
        })
        .sum()
}

fn assert_conforming(mesh: &FrozenMesh) {
    let mut count: HashMap<(usize, usize), usize> = HashMap::new();
    for tri in &mesh.triangles {
        for k in 0..3 {
            let (a, b) = (tri[(k + 1) % 3], tri[(k + 2) % 3]);
            *count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    let boundary = count.values().filter(|&&n| n == 1).count();
    assert!(count.values().all(|&n| n == 1 || n == 2));
    assert_eq!(boundary, mesh.boundary_edges.len());

    for (cell, row) in mesh.neighbors.iter().enumerate() {
        for (k, nb) in row.iter().enumerate() {
            match *nb {
                Neighbor::Cell(other) => {
                    assert!(mesh.neighbors[other].contains(&Neighbor::Cell(cell)));
                }
                Neighbor::Boundary(b) => {
                    let edge = mesh.boundary_edges[b];
                    assert_eq!((edge.cell, edge.local_edge), (cell, k));
                    assert!(edge.tag < mesh.tags.len());
                }
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[test]
fn test_mesh_covers_polygon_exactly() {
    let mesh = builder().build().unwrap();
    assert_relative_eq!(mesh.total_area(), catchment().area(), max_relative = 1e-10);
    assert_conforming(&mesh);
}

#[test]
fn test_every_cell_respects_target_area() {
    let builder = builder();
    let mesh = builder.build().unwrap();
    for (i, &area) in mesh.areas.iter().enumerate() {
        let target = builder.target_area(mesh.centroids[i]);
        assert!(area <= target * (1.0 + 1e-9), "cell {i}: {area} > {target}");
    }
    // 加密区比外围更密
    let inside = mesh
        .centroids
        .iter()
        .filter(|c| c.x > 40.0 && c.x < 70.0 && c.y > 30.0 && c.y < 60.0)
        .count();
    assert!(inside > 60, "only {inside} cells inside the refinement region");
}

#[test]
fn test_holes_removed_and_tagged_interior() {
    let holes = houses();
    let hole_area: f64 = holes.iter().map(Polygon::area).sum();
    let mesh = builder().with_interior_holes(holes.clone()).build().unwrap();

    assert_relative_eq!(
        mesh.total_area(),
        catchment().area() - hole_area,
        max_relative = 1e-10
    );
    assert_conforming(&mesh);
    assert!(mesh.boundary_tags().contains(HOLE_TAG));

    // 洞内没有单元
    for c in &mesh.centroids {
        assert!(holes.iter().all(|h| !h.contains(*c)));
    }

    // 洞边界总长等于洞周长之和
    let interior = mesh.tag_index(HOLE_TAG).unwrap();
    let length: f64 = mesh
        .boundary_edges
        .iter()
        .filter(|e| e.tag == interior)
        .map(|e| mesh.edge_lengths[e.cell][e.local_edge])
        .sum();
    let perimeter: f64 = holes.iter().map(perimeter).sum();
    assert_relative_eq!(length, perimeter, max_relative = 1e-10);
}

#[test]
fn test_boundary_tags_follow_segments() {
    let mesh = builder().build().unwrap();
    let stats = mesh.statistics();
    let tags: Vec<&str> = stats.boundary_edges_per_tag.keys().map(String::as_str).collect();
    assert_eq!(tags, vec!["east", "north", "west"]);

    // west 段 (0,0)-(-10,60) 上的边界边中点都在该线段上
    let west = mesh.tag_index("west").unwrap();
    for e in mesh.boundary_edges.iter().filter(|e| e.tag == west) {
        let tri = mesh.triangles[e.cell];
        let a = mesh.nodes[tri[(e.local_edge + 1) % 3]];
        let b = mesh.nodes[tri[(e.local_edge + 2) % 3]];
        let m = a.midpoint(&b);
        // 直线 6x + y = 0
        assert!((6.0 * m.x + m.y).abs() < 1e-6);
    }
}

#[test]
fn test_mesh_is_deterministic() {
    let a = builder().with_interior_holes(houses()).build().unwrap();
    let b = builder().with_interior_holes(houses()).build().unwrap();
    assert_eq!(a.triangles, b.triangles);
    assert_eq!(a.nodes, b.nodes);
}

#[test]
fn test_create_mesh_from_regions() {
    let mut tags = BTreeMap::new();
    tags.insert("bottom".to_string(), vec![0]);
    tags.insert("right".to_string(), vec![1]);
    tags.insert("top".to_string(), vec![2]);
    tags.insert("left".to_string(), vec![3]);
    let mesh = uf_mesh::create_mesh_from_regions(
        Polygon::rectangle(0.0, 0.0, 40.0, 20.0),
        tags,
        25.0,
        vec![(Polygon::rectangle(10.0, 5.0, 20.0, 15.0), 4.0)],
        vec![Polygon::rectangle(30.0, 8.0, 34.0, 12.0)],
    )
    .unwrap();
    assert_relative_eq!(mesh.total_area(), 800.0 - 16.0, max_relative = 1e-10);
    assert_eq!(mesh.boundary_tags().len(), 5);
    assert!(mesh.locate(Point2D::new(32.0, 10.0)).is_none());
    assert!(mesh.locate(Point2D::new(5.0, 5.0)).is_some());
}

// ============================================================================
// 相邻、重叠与贴边的洞
// ============================================================================

fn square_domain() -> RegionMeshBuilder {
    RegionMeshBuilder::new(Polygon::rectangle(0.0, 0.0, 100.0, 100.0), 50.0)
}

#[test]
fn test_adjacent_holes_rejected() {
    // 共墙的两座房屋
    let result = square_domain()
        .with_interior_holes([
            Polygon::rectangle(40.0, 40.0, 50.0, 50.0),
            Polygon::rectangle(50.0, 40.0, 60.0, 50.0),
        ])
        .build();
    assert!(matches!(
        result,
        Err(MeshError::HolesIntersect { first: 0, second: 1 })
    ));

    // 仅共一个角点
    let result = square_domain()
        .with_interior_holes([
            Polygon::rectangle(20.0, 20.0, 30.0, 30.0),
            Polygon::rectangle(60.0, 60.0, 70.0, 70.0),
            Polygon::rectangle(30.0, 30.0, 40.0, 40.0),
        ])
        .build();
    assert!(matches!(
        result,
        Err(MeshError::HolesIntersect { first: 0, second: 2 })
    ));
}

#[test]
fn test_overlapping_holes_rejected() {
    let result = square_domain()
        .with_interior_holes([
            Polygon::rectangle(40.0, 40.0, 55.0, 50.0),
            Polygon::rectangle(50.0, 45.0, 60.0, 55.0),
        ])
        .build();
    assert!(matches!(
        result,
        Err(MeshError::HolesIntersect { first: 0, second: 1 })
    ));

    // 一个洞完全包含另一个
    let result = square_domain()
        .with_interior_holes([
            Polygon::rectangle(30.0, 30.0, 70.0, 70.0),
            Polygon::rectangle(40.0, 40.0, 50.0, 50.0),
        ])
        .build();
    assert!(matches!(result, Err(MeshError::HolesIntersect { .. })));
}

#[test]
fn test_hole_touching_boundary_rejected() {
    let result = square_domain()
        .with_interior_holes([
            Polygon::rectangle(20.0, 20.0, 30.0, 30.0),
            Polygon::rectangle(0.0, 40.0, 10.0, 50.0),
        ])
        .build();
    assert!(matches!(
        result,
        Err(MeshError::HoleTouchesBoundary { hole: 1 })
    ));
}

#[test]
fn test_merged_terrace_meshes() {
    let terrace = vec![
        Polygon::rectangle(40.0, 40.0, 50.0, 50.0),
        Polygon::rectangle(50.0, 40.0, 60.0, 50.0),
        Polygon::rectangle(60.0, 40.0, 70.0, 50.0),
        Polygon::rectangle(20.0, 70.0, 30.0, 80.0),
    ];
    let holes = uf_geo::merge_touching(terrace);
    assert_eq!(holes.len(), 2);

    let mesh = square_domain()
        .with_boundary_tag("bottom", [0])
        .with_interior_holes(holes)
        .build()
        .unwrap();
    assert_relative_eq!(mesh.total_area(), 10000.0 - 300.0 - 100.0, max_relative = 1e-10);
    assert_conforming(&mesh);
    assert!(mesh.locate(Point2D::new(55.0, 45.0)).is_none());
    assert!(mesh.locate(Point2D::new(55.0, 35.0)).is_some());
}
