// crates/uf_physics/tests/evolve.rs

//! 时间推进集成测试
//!
//! # 测试覆盖
//!
//! - 输出时刻序列与 `.sww` 时间片
//! - 边界标签未指定时在第一步之前失败
//! - 质量守恒（全固壁 + 入流）
//! - 静水平衡（起伏底床，含露出的干单元）
//! - 自由出流边界排水
//! - 确定性
//! - `.sww` 流速沿用计算域的干湿阈值

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use uf_geo::{Point2D, Polygon};
use uf_io::SwwFile;
use uf_mesh::RectMeshGenerator;
use uf_physics::{
    BoundaryCondition, Domain, InletOperator, PhysicsError, Quantity, QuantitySource, Region,
    SolverParams,
};

// ============================================================================
// 测试辅助函数
// ============================================================================

fn rect_domain(nx: usize, ny: usize, lx: f64, ly: f64) -> Domain {
    let mut domain = Domain::new(RectMeshGenerator::new(nx, ny, lx, ly).build().unwrap());
    domain.set_store(false);
    domain
}

fn all_walls(domain: &mut Domain) {
    domain
        .set_boundary(
            ["left", "right", "top", "bottom"].map(|t| (t, BoundaryCondition::Reflective)),
        )
        .unwrap();
}

fn run(domain: &mut Domain, yieldstep: f64, duration: f64) -> Vec<f64> {
    domain
        .evolve(yieldstep, duration)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// 缓坡 + 中心入流
fn sloped_inflow_domain() -> Domain {
    let mut domain = rect_domain(10, 10, 20.0, 20.0);
    let slope = |p: Point2D| 0.02 * p.x + 0.01 * p.y;
    domain
        .set_quantity(Quantity::Elevation, QuantitySource::Function(&slope))
        .unwrap();
    domain
        .set_quantity(Quantity::Stage, QuantitySource::Quantity(Quantity::Elevation))
        .unwrap();
    domain
        .set_quantity(Quantity::Friction, QuantitySource::Constant(0.03))
        .unwrap();
    all_walls(&mut domain);
    let region = Region::circle(domain.mesh(), Point2D::new(10.0, 10.0), 3.0).unwrap();
    domain.add_operator(InletOperator::new(region, 1.0).unwrap());
    domain
}

// ============================================================================
// 测试
// ============================================================================

#[test]
fn test_yield_times_and_slices() {
    let dir = tempfile::tempdir().unwrap();
    let mut domain = rect_domain(4, 4, 8.0, 8.0);
    domain.set_store(true);
    domain.set_name("yields");
    domain.set_output_dir(dir.path());
    domain
        .set_quantity(Quantity::Stage, QuantitySource::Constant(0.5))
        .unwrap();
    all_walls(&mut domain);

    let times = run(&mut domain, 3.0, 10.0);
    assert_eq!(times, vec![0.0, 3.0, 6.0, 9.0, 10.0]);
    assert_eq!(domain.time(), 10.0);

    let sww = SwwFile::read(domain.sww_path()).unwrap();
    assert_eq!(sww.header.name, "yields");
    assert_eq!(sww.times(), times);
    assert_eq!(sww.header.n_cells, domain.n_cells());
}

#[test]
fn test_evolve_is_fused_and_starts_at_starttime() {
    let mut domain = rect_domain(2, 2, 2.0, 2.0);
    all_walls(&mut domain);
    domain.set_starttime(100.0);

    let mut evolve = domain.evolve(5.0, 10.0);
    let times: Vec<f64> = evolve.by_ref().map(|t| t.unwrap()).collect();
    assert_eq!(times, vec![100.0, 105.0, 110.0]);
    assert!(evolve.next().is_none());
}

#[test]
fn test_zero_duration_yields_once() {
    let mut domain = rect_domain(2, 2, 2.0, 2.0);
    all_walls(&mut domain);
    assert_eq!(run(&mut domain, 1.0, 0.0), vec![0.0]);
}

#[test]
fn test_unassigned_boundary_fails_before_first_step() {
    let dir = tempfile::tempdir().unwrap();
    let mut domain = rect_domain(2, 2, 2.0, 2.0);
    domain.set_store(true);
    domain.set_output_dir(dir.path());
    domain
        .set_boundary([
            ("left", BoundaryCondition::Reflective),
            ("right", BoundaryCondition::Transmissive),
            ("top", BoundaryCondition::Transmissive),
        ])
        .unwrap();

    let mut evolve = domain.evolve(1.0, 5.0);
    match evolve.next() {
        Some(Err(PhysicsError::UnassignedBoundary { tags })) => assert_eq!(tags, vec!["bottom"]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(evolve.next().is_none());
    drop(evolve);

    assert_eq!(domain.time(), 0.0);
    assert!(!domain.sww_path().exists());
}

#[test]
fn test_invalid_yieldstep() {
    let mut domain = rect_domain(2, 2, 2.0, 2.0);
    all_walls(&mut domain);
    let first = domain.evolve(0.0, 5.0).next();
    assert!(matches!(first, Some(Err(PhysicsError::InvalidParameter(_)))));
}

#[test]
fn test_mass_conservation_with_inlet() {
    let mut domain = sloped_inflow_domain();
    let duration = 20.0;
    run(&mut domain, 5.0, duration);

    let injected = 1.0 * duration;
    assert_relative_eq!(domain.applied_volume(), injected, max_relative = 1e-12);
    let volume = domain.get_water_volume() - domain.clipped_volume();
    assert_relative_eq!(volume, injected, max_relative = 1e-9);
    assert!(domain.clipped_volume() < 1e-3 * injected);

    let stats = domain.timestepping_statistics();
    assert!(stats.total_steps > 0);
    assert_eq!(stats.time, duration);
}

#[test]
fn test_lake_at_rest_over_uneven_bed() {
    let mut domain = rect_domain(12, 8, 12.0, 8.0);
    let bed = |p: Point2D| {
        let bump = 1.3 * (-((p.x - 4.0).powi(2) + (p.y - 4.0).powi(2)) / 2.0).exp();
        0.2 + 0.05 * p.y + bump
    };
    domain
        .set_quantity(Quantity::Elevation, QuantitySource::Function(&bed))
        .unwrap();
    let still = |p: Point2D| bed(p).max(1.0);
    domain
        .set_quantity(Quantity::Stage, QuantitySource::Function(&still))
        .unwrap();
    domain
        .set_quantity(Quantity::Friction, QuantitySource::Constant(0.02))
        .unwrap();
    all_walls(&mut domain);
    // 有露出水面的干单元
    assert!(domain.depth().iter().any(|&h| h == 0.0));

    let stage0 = domain.quantity(Quantity::Stage).to_vec();
    run(&mut domain, 5.0, 20.0);

    for (w, w0) in domain.quantity(Quantity::Stage).iter().zip(&stage0) {
        assert!((w - w0).abs() < 1e-9, "stage drift {}", w - w0);
    }
    for q in [Quantity::XMomentum, Quantity::YMomentum] {
        assert!(domain.quantity(q).iter().all(|m| m.abs() < 1e-9));
    }
}

#[test]
fn test_transmissive_boundary_drains() {
    let mut domain = rect_domain(20, 2, 20.0, 2.0);
    let dam = |p: Point2D| if p.x < 10.0 { 1.0 } else { 0.2 };
    domain
        .set_quantity(Quantity::Stage, QuantitySource::Function(&dam))
        .unwrap();
    domain
        .set_boundary([
            ("left", BoundaryCondition::Reflective),
            ("right", BoundaryCondition::Transmissive),
            ("top", BoundaryCondition::Reflective),
            ("bottom", BoundaryCondition::Reflective),
        ])
        .unwrap();

    let initial = domain.get_water_volume();
    run(&mut domain, 5.0, 15.0);
    assert!(domain.get_water_volume() < initial);
    assert!(domain.depth().iter().all(|&h| h >= 0.0));
}

#[test]
fn test_runs_are_deterministic() {
    let mut a = sloped_inflow_domain();
    let mut b = sloped_inflow_domain();
    run(&mut a, 5.0, 10.0);
    run(&mut b, 5.0, 10.0);
    for q in [Quantity::Stage, Quantity::XMomentum, Quantity::YMomentum] {
        assert_eq!(a.quantity(q), b.quantity(q));
    }
}

#[test]
fn test_domain_from_regions_with_holes() {
    let mut tags = BTreeMap::new();
    tags.insert("bottom".to_string(), vec![0]);
    tags.insert("right".to_string(), vec![1]);
    tags.insert("top".to_string(), vec![2]);
    tags.insert("left".to_string(), vec![3]);
    let mut domain = Domain::from_regions(
        Polygon::rectangle(0.0, 0.0, 30.0, 20.0),
        tags,
        20.0,
        vec![(Polygon::rectangle(5.0, 5.0, 15.0, 15.0), 5.0)],
        vec![Polygon::rectangle(20.0, 8.0, 24.0, 12.0)],
    )
    .unwrap();
    domain.set_store(false);
    domain
        .set_boundary([
            ("bottom", BoundaryCondition::Reflective),
            ("right", BoundaryCondition::Transmissive),
            ("top", BoundaryCondition::Transmissive),
            ("left", BoundaryCondition::Reflective),
        ])
        .unwrap();
    assert_eq!(domain.unassigned_boundary_tags(), vec!["interior"]);
    assert!(domain.evolve(1.0, 1.0).next().unwrap().is_err());

    domain
        .set_boundary([("interior", BoundaryCondition::Reflective)])
        .unwrap();
    let region = Region::circle(domain.mesh(), Point2D::new(10.0, 10.0), 2.0).unwrap();
    domain.add_operator(InletOperator::new(region, 2.0).unwrap());
    let times = run(&mut domain, 2.0, 4.0);
    assert_eq!(times, vec![0.0, 2.0, 4.0]);
    assert!(domain.get_water_volume() > 0.0);
}

#[test]
fn test_sww_speed_uses_domain_dry_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let mut domain = sloped_inflow_domain();
    domain.set_store(true);
    domain.set_name("drythreshold");
    domain.set_output_dir(dir.path());
    domain
        .set_params(SolverParams {
            h_dry: 0.05,
            ..SolverParams::default()
        })
        .unwrap();
    run(&mut domain, 2.0, 4.0);

    let sww = SwwFile::read(domain.sww_path()).unwrap();
    assert_eq!(sww.header.tolerance.h_dry, 0.05);
    let last = sww.n_slices() - 1;
    assert_eq!(sww.speed(last).unwrap(), domain.speed());
    // 入流区边缘的浅水单元按 0.05 m 阈值视为干
    let depth = domain.depth();
    for (h, v) in depth.iter().zip(sww.speed(last).unwrap()) {
        if *h < 0.05 {
            assert_eq!(v, 0.0);
        }
    }
}
