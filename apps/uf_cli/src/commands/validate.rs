// apps/uf_cli/src/commands/validate.rs

//! 场景校验命令
//!
//! 读取输入、生成网格并检查边界标签是否全部指定，不做时间推进。
//! 结果以 JSON 输出到标准输出。

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use tracing::{error, info, warn};
use uf_geo::Point2D;
use uf_mesh::MeshStatistics;
use uf_physics::{Domain, Quantity, Region};

use super::ScenarioArgs;
use crate::pipeline::{build_domain, load_inputs};

/// 校验参数
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

/// 入流区摘要
#[derive(Debug, Serialize)]
struct InletSummary {
    center: [f64; 2],
    discharge: f64,
    cells: usize,
    area: f64,
}

/// 校验结果
#[derive(Debug, Serialize)]
struct ValidationReport {
    scenario: String,
    mesh: MeshStatistics,
    houses: usize,
    boundaries: BTreeMap<String, String>,
    unassigned: Vec<String>,
    inlets: Vec<InletSummary>,
    elevation_range: [f64; 2],
}

impl ValidationReport {
    fn is_ok(&self) -> bool {
        self.unassigned.is_empty()
    }
}

fn elevation_range(domain: &Domain) -> [f64; 2] {
    domain
        .quantity(Quantity::Elevation)
        .iter()
        .fold([f64::INFINITY, f64::NEG_INFINITY], |[lo, hi], &z| {
            [lo.min(z), hi.max(z)]
        })
}

/// 执行校验命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    let config = args.scenario.load()?;
    info!("=== UrbanFlood 场景校验: {} ===", config.name);

    let inputs = load_inputs(&config)?;
    let domain = build_domain(&config, &inputs)?;
    let mesh = domain.mesh();

    let inlets = config
        .inlets
        .iter()
        .map(|inlet| -> Result<InletSummary> {
            let center = Point2D::new(inlet.center[0], inlet.center[1]);
            let region = Region::circle(mesh, center, inlet.radius)?;
            Ok(InletSummary {
                center: inlet.center,
                discharge: inlet.discharge,
                cells: region.len(),
                area: region.area(mesh),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = ValidationReport {
        scenario: config.name.clone(),
        mesh: mesh.statistics(),
        houses: inputs.houses.len(),
        boundaries: domain
            .boundary_map()
            .iter()
            .map(|(tag, bc)| (tag.clone(), bc.to_string()))
            .collect(),
        unassigned: domain.unassigned_boundary_tags(),
        inlets,
        elevation_range: elevation_range(&domain),
    };

    eprintln!("{}", report.mesh);
    println!("{}", serde_json::to_string_pretty(&report)?);

    for tag in &config.expected_boundary_tags() {
        if !mesh.boundary_tags().contains(tag.as_str()) {
            warn!("标签 '{tag}' 未出现在网格中");
        }
    }

    if report.is_ok() {
        info!("✓ 校验通过");
        Ok(())
    } else {
        for tag in &report.unassigned {
            error!("  ✗ 边界标签 '{tag}' 未指定边界条件");
        }
        bail!("校验失败：{} 个边界标签未指定", report.unassigned.len())
    }
}
