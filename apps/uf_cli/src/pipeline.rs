// apps/uf_cli/src/pipeline.rs

//! 场景流程
//!
//! ```text
//! 读取多边形与高程 → 建网格 → 初始条件 → 边界 → 入流 → 推进（逐帧）→ 动画 → 结果图
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use uf_config::ScenarioConfig;
use uf_geo::{
    merge_touching, read_polygon, read_polygons_matching, retain_larger_than, Point2D, Polygon,
};
use uf_io::VtuExporter;
use uf_physics::{Domain, InletOperator, Quantity, QuantitySource, Region};
use uf_terrain::AscGrid;
use uf_viz::{DomainPlotter, SwwPlotter};

/// 场景输入数据
pub struct ScenarioInputs {
    pub bounding: Polygon,
    pub regions: Vec<(Polygon, f64)>,
    pub houses: Vec<Polygon>,
    pub terrain: AscGrid,
}

/// 读取场景引用的全部输入文件
pub fn load_inputs(config: &ScenarioConfig) -> Result<ScenarioInputs> {
    let bounding_path = config.data_path(&config.mesh.bounding_polygon);
    let bounding = read_polygon(&bounding_path)
        .with_context(|| format!("读取外边界 {}", bounding_path.display()))?;

    let mut regions = Vec::with_capacity(config.mesh.interior_regions.len());
    for region in &config.mesh.interior_regions {
        let path = config.data_path(&region.polygon);
        let polygon =
            read_polygon(&path).with_context(|| format!("读取加密区 {}", path.display()))?;
        regions.push((polygon, region.max_area));
    }

    let houses = match &config.mesh.houses {
        Some(houses) => {
            let all = read_polygons_matching(&config.data_dir, &houses.pattern)
                .with_context(|| format!("读取房屋轮廓 {}", houses.pattern))?;
            let total = all.len();
            let kept = retain_larger_than(all, houses.min_area);
            info!(
                "房屋: {}/{} 个面积大于 {} m²，作为洞",
                kept.len(),
                total,
                houses.min_area
            );
            separate_houses(&bounding, kept)
        }
        None => Vec::new(),
    };

    let terrain_path = config.data_path(&config.terrain.topography);
    let terrain = AscGrid::load(&terrain_path)
        .with_context(|| format!("读取高程 {}", terrain_path.display()))?;

    Ok(ScenarioInputs {
        bounding,
        regions,
        houses,
        terrain,
    })
}

/// 把房屋轮廓整理为可作洞的多边形
///
/// 共墙或重叠的轮廓合并为一个洞；与外边界接触或越出外边界的洞无法挖出，
/// 记录警告后丢弃。
pub fn separate_houses(bounding: &Polygon, houses: Vec<Polygon>) -> Vec<Polygon> {
    let before = houses.len();
    let merged = merge_touching(houses);
    if merged.len() < before {
        info!("相邻房屋合并: {} → {} 个洞", before, merged.len());
    }

    let mut holes = Vec::with_capacity(merged.len());
    for hole in merged {
        let inside = hole.vertices().iter().all(|&p| bounding.contains(p))
            && !hole.edges_intersect(bounding);
        if inside {
            holes.push(hole);
        } else {
            let (min, max) = hole.bounds();
            warn!(
                "房屋 ({:.1}, {:.1})-({:.1}, {:.1}) 接触或越出外边界，不作为洞",
                min.x, min.y, max.x, max.y
            );
        }
    }
    holes
}

/// 建网格并设置初始条件、边界与入流
pub fn build_domain(config: &ScenarioConfig, inputs: &ScenarioInputs) -> Result<Domain> {
    let start = Instant::now();
    let mut domain = Domain::from_regions(
        inputs.bounding.clone(),
        config.mesh.boundary_tags.clone(),
        config.mesh.base_resolution,
        inputs.regions.clone(),
        inputs.houses.clone(),
    )
    .context("生成网格失败")?;
    info!(
        "网格: {} 个单元, {} 个节点 ({:.2} s)",
        domain.n_cells(),
        domain.mesh().n_nodes(),
        start.elapsed().as_secs_f64()
    );

    domain.set_name(config.name.as_str());
    domain.set_output_dir(&config.output_dir);
    domain.set_store(config.output.store);
    domain.set_starttime(config.evolve.starttime);
    domain.set_params(config.solver)?;

    domain
        .set_quantity(Quantity::Elevation, QuantitySource::Raster(&inputs.terrain))
        .context("高程赋值失败")?;
    domain.set_quantity(Quantity::Friction, QuantitySource::Constant(config.terrain.friction))?;
    domain.set_quantity(Quantity::Stage, QuantitySource::Quantity(Quantity::Elevation))?;

    domain
        .set_boundary(config.boundaries.iter().map(|(tag, bc)| (tag.clone(), *bc)))
        .context("边界条件设置失败")?;

    for inlet in &config.inlets {
        let center = Point2D::new(inlet.center[0], inlet.center[1]);
        let region = Region::circle(domain.mesh(), center, inlet.radius)
            .with_context(|| format!("入流区 ({}, {})", center.x, center.y))?;
        info!(
            "入流: Q = {} m³/s, {} 个单元, 面积 {:.1} m²",
            inlet.discharge,
            region.len(),
            region.area(domain.mesh())
        );
        domain.add_operator(InletOperator::new(region, inlet.discharge)?);
    }
    Ok(domain)
}

/// 运行结果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub n_cells: usize,
    pub yields: usize,
    pub final_time: f64,
    pub water_volume: f64,
    pub inflow_volume: f64,
    pub sww: Option<PathBuf>,
    pub animation: Option<PathBuf>,
    pub depth_speed: Option<PathBuf>,
    pub vtu: Option<PathBuf>,
}

/// 执行完整场景
pub fn run_scenario(config: &ScenarioConfig, frames: bool) -> Result<RunReport> {
    let inputs = load_inputs(config)?;
    let mut domain = build_domain(config, &inputs)?;
    domain.check_boundaries()?;

    let plot_dir = config.plot_dir();
    let mut plotter = if frames {
        let [lo, hi] = config.output.depth_range;
        let plotter = DomainPlotter::new(&domain, &plot_dir)?.with_depth_range(lo, hi);
        plotter.triplot(plot_dir.join(format!("{}_mesh.png", config.name)))?;
        plotter.plot_elevation(&domain, plot_dir.join(format!("{}_elevation.png", config.name)))?;
        Some(plotter)
    } else {
        None
    };

    let start = Instant::now();
    let mut yields = 0;
    let mut evolve = domain.evolve(config.evolve.yieldstep, config.evolve.duration);
    while let Some(t) = evolve.next() {
        let t = t.context("推进失败")?;
        yields += 1;
        if let Some(plotter) = plotter.as_mut() {
            plotter.save_depth_frame(evolve.domain())?;
        }
        evolve.domain().timestepping_statistics();
        tracing::debug!("yield t = {t}");
    }
    drop(evolve);
    info!("推进完成: {:.2} s", start.elapsed().as_secs_f64());

    let animation = match &plotter {
        Some(plotter) => Some(plotter.make_depth_animation()?),
        None => None,
    };

    let (sww, depth_speed, vtu) = if config.output.store {
        let sww_path = domain.sww_path();
        let splotter = SwwPlotter::open(&sww_path)
            .with_context(|| format!("读取结果 {}", sww_path.display()))?;
        let panel = splotter.plot_depth_speed(
            splotter.last_slice()?,
            plot_dir.join(format!("{}_depth-speed.png", config.name)),
        )?;
        let vtu = if config.output.vtu {
            let dir = config.output_dir.join("vtu");
            Some(VtuExporter::new().export_sww(splotter.sww(), &dir, &config.name)?)
        } else {
            None
        };
        (Some(sww_path), Some(panel), vtu)
    } else {
        (None, None, None)
    };

    let water_volume = domain.get_water_volume();
    let inflow_volume = domain.applied_volume();
    if domain.clipped_volume() > 0.0 {
        warn!("负水深截断引入水量 {:.3e} m³", domain.clipped_volume());
    }
    info!("水量 {water_volume:.3} m³, 入流累计 {inflow_volume:.3} m³");

    Ok(RunReport {
        name: config.name.clone(),
        n_cells: domain.n_cells(),
        yields,
        final_time: domain.time(),
        water_volume,
        inflow_volume,
        sww,
        animation,
        depth_speed,
        vtu,
    })
}
