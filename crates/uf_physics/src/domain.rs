// crates/uf_physics/src/domain.rs

//! 计算域
//!
//! 计算域持有网格、单元物理量（SoA 布局）、边界条件映射、算子和输出设置。
//! 生命周期：由网格构建 → 设置初始条件与边界 → `evolve` 推进。
//!
//! ```text
//! stage:     [w_0, w_1, ...]
//! elevation: [z_0, z_1, ...]
//! friction:  [n_0, n_1, ...]
//! xmomentum: [hu_0, ...]
//! ymomentum: [hv_0, ...]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use uf_geo::Polygon;
use uf_io::SwwWriter;
use uf_mesh::{create_mesh_from_regions, FrozenMesh};

use crate::boundary::BoundaryCondition;
use crate::engine::evolve::Evolve;
use crate::engine::flux::CellRate;
use crate::engine::timestep::{StepCounter, TimesteppingStatistics};
use crate::error::{PhysicsError, PhysicsResult};
use crate::operators::Operator;
use crate::quantity::{Quantity, QuantitySource};
use crate::types::SolverParams;

/// 浅水方程计算域
pub struct Domain {
    pub(crate) name: String,
    pub(crate) mesh: FrozenMesh,
    pub(crate) stage: Vec<f64>,
    pub(crate) elevation: Vec<f64>,
    pub(crate) friction: Vec<f64>,
    pub(crate) xmom: Vec<f64>,
    pub(crate) ymom: Vec<f64>,
    pub(crate) boundary_map: BTreeMap<String, BoundaryCondition>,
    pub(crate) operators: Vec<Box<dyn Operator>>,
    pub(crate) params: SolverParams,
    pub(crate) time: f64,
    pub(crate) output_dir: PathBuf,
    pub(crate) store: bool,
    pub(crate) writer: Option<SwwWriter>,
    pub(crate) counter: StepCounter,
    pub(crate) rates: Vec<CellRate>,
    pub(crate) clipped_volume: f64,
}

impl Domain {
    /// 由网格创建，所有物理量初始为 0
    pub fn new(mesh: FrozenMesh) -> Self {
        let n = mesh.n_cells();
        Self {
            name: "domain".to_string(),
            mesh,
            stage: vec![0.0; n],
            elevation: vec![0.0; n],
            friction: vec![0.0; n],
            xmom: vec![0.0; n],
            ymom: vec![0.0; n],
            boundary_map: BTreeMap::new(),
            operators: Vec::new(),
            params: SolverParams::default(),
            time: 0.0,
            output_dir: PathBuf::from("."),
            store: true,
            writer: None,
            counter: StepCounter::default(),
            rates: vec![CellRate::default(); n],
            clipped_volume: 0.0,
        }
    }

    /// 由外边界、边界标签、加密区与洞生成网格并创建计算域
    pub fn from_regions(
        bounding_polygon: Polygon,
        boundary_tags: BTreeMap<String, Vec<usize>>,
        maximum_triangle_area: f64,
        interior_regions: Vec<(Polygon, f64)>,
        interior_holes: Vec<Polygon>,
    ) -> PhysicsResult<Self> {
        let mesh = create_mesh_from_regions(
            bounding_polygon,
            boundary_tags,
            maximum_triangle_area,
            interior_regions,
            interior_holes,
        )?;
        Ok(Self::new(mesh))
    }

    // ------------------------------------------------------------------
    // 基本属性
    // ------------------------------------------------------------------

    /// 设置名称，决定输出文件名 `<name>.sww`
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 输出目录
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = dir.into();
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 是否写出 `.sww`
    pub fn set_store(&mut self, store: bool) {
        self.store = store;
    }

    /// `.sww` 文件路径
    pub fn sww_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.sww", self.name))
    }

    pub fn set_params(&mut self, params: SolverParams) -> PhysicsResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// 设置起始时间
    pub fn set_starttime(&mut self, time: f64) {
        self.time = time;
    }

    /// 当前模拟时间 [s]
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn mesh(&self) -> &FrozenMesh {
        &self.mesh
    }

    pub fn n_cells(&self) -> usize {
        self.mesh.n_cells()
    }

    // ------------------------------------------------------------------
    // 物理量
    // ------------------------------------------------------------------

    fn quantity_mut(&mut self, quantity: Quantity) -> &mut Vec<f64> {
        match quantity {
            Quantity::Stage => &mut self.stage,
            Quantity::Elevation => &mut self.elevation,
            Quantity::Friction => &mut self.friction,
            Quantity::XMomentum => &mut self.xmom,
            Quantity::YMomentum => &mut self.ymom,
        }
    }

    /// 读取物理量
    pub fn quantity(&self, quantity: Quantity) -> &[f64] {
        match quantity {
            Quantity::Stage => &self.stage,
            Quantity::Elevation => &self.elevation,
            Quantity::Friction => &self.friction,
            Quantity::XMomentum => &self.xmom,
            Quantity::YMomentum => &self.ymom,
        }
    }

    /// 在单元形心处为物理量赋值
    pub fn set_quantity(&mut self, quantity: Quantity, source: QuantitySource<'_>) -> PhysicsResult<()> {
        let n = self.n_cells();
        let values: Vec<f64> = match source {
            QuantitySource::Constant(v) => vec![v; n],
            QuantitySource::Values(values) => {
                if values.len() != n {
                    return Err(PhysicsError::SizeMismatch {
                        name: "quantity values",
                        expected: n,
                        actual: values.len(),
                    });
                }
                values.to_vec()
            }
            QuantitySource::Raster(provider) => {
                let mut out = vec![0.0; n];
                provider.elevations_at(&self.mesh.centroids, &mut out)?;
                out
            }
            QuantitySource::Function(f) => self.mesh.centroids.par_iter().map(|&c| f(c)).collect(),
            QuantitySource::Quantity(other) => self.quantity(other).to_vec(),
        };

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(PhysicsError::invalid_parameter(format!(
                "{quantity} 在单元 {i} 处的值非有限: {}",
                values[i]
            )));
        }
        if quantity == Quantity::Friction && values.iter().any(|&v| v < 0.0) {
            return Err(PhysicsError::invalid_parameter("糙率不能为负"));
        }

        debug!("设置 {quantity}: {n} 个单元");
        *self.quantity_mut(quantity) = values;
        Ok(())
    }

    /// 单元水深
    pub fn depth(&self) -> Vec<f64> {
        self.stage
            .iter()
            .zip(&self.elevation)
            .map(|(w, z)| (w - z).max(0.0))
            .collect()
    }

    /// 单元流速大小（干单元为 0）
    pub fn speed(&self) -> Vec<f64> {
        let tol = self.params.tolerance();
        self.depth()
            .iter()
            .enumerate()
            .map(|(i, &h)| tol.velocity(h, self.xmom[i]).hypot(tol.velocity(h, self.ymom[i])))
            .collect()
    }

    /// 域内总水量 [m³]
    pub fn get_water_volume(&self) -> f64 {
        self.depth()
            .iter()
            .zip(&self.mesh.areas)
            .map(|(h, a)| h * a)
            .sum()
    }

    /// 负水深截断累计丢弃的水量 [m³]
    pub fn clipped_volume(&self) -> f64 {
        self.clipped_volume
    }

    // ------------------------------------------------------------------
    // 边界与算子
    // ------------------------------------------------------------------

    /// 为边界标签指定边界条件
    ///
    /// 多次调用会合并，同名标签以后一次为准。
    /// 任一标签不在网格中时整批拒绝，不做任何修改。
    pub fn set_boundary<K, I>(&mut self, map: I) -> PhysicsResult<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, BoundaryCondition)>,
    {
        let available = self.mesh.boundary_tags();
        let mut staged = Vec::new();
        for (tag, condition) in map {
            let tag = tag.into();
            if !available.contains(tag.as_str()) {
                return Err(PhysicsError::UnknownBoundaryTag {
                    tag,
                    available: available.iter().map(|s| s.to_string()).collect(),
                });
            }
            staged.push((tag, condition));
        }
        for (tag, condition) in staged {
            debug!("边界 {tag}: {condition}");
            self.boundary_map.insert(tag, condition);
        }
        Ok(())
    }

    pub fn boundary_map(&self) -> &BTreeMap<String, BoundaryCondition> {
        &self.boundary_map
    }

    /// 尚未指定边界条件的标签（升序）
    pub fn unassigned_boundary_tags(&self) -> Vec<String> {
        self.mesh
            .boundary_tags()
            .into_iter()
            .filter(|t| !self.boundary_map.contains_key(*t))
            .map(str::to_string)
            .collect()
    }

    /// 检查所有边界标签均已指定
    pub fn check_boundaries(&self) -> PhysicsResult<()> {
        let tags = self.unassigned_boundary_tags();
        if tags.is_empty() {
            Ok(())
        } else {
            Err(PhysicsError::UnassignedBoundary { tags })
        }
    }

    /// 按标签编号排列的边界条件
    pub(crate) fn conditions_by_tag(&self) -> PhysicsResult<Vec<BoundaryCondition>> {
        self.check_boundaries()?;
        Ok(self
            .mesh
            .tags
            .iter()
            .map(|t| {
                self.boundary_map
                    .get(t)
                    .copied()
                    .unwrap_or(BoundaryCondition::Reflective)
            })
            .collect())
    }

    /// 添加算子，返回其编号
    pub fn add_operator(&mut self, operator: impl Operator + 'static) -> usize {
        info!("添加算子 {}", operator.name());
        self.operators.push(Box::new(operator));
        self.operators.len() - 1
    }

    pub fn operators(&self) -> impl Iterator<Item = &dyn Operator> {
        self.operators.iter().map(|op| op.as_ref())
    }

    /// 所有算子累计注入的水量 [m³]
    pub fn applied_volume(&self) -> f64 {
        self.operators.iter().map(|op| op.applied_volume()).sum()
    }

    // ------------------------------------------------------------------
    // 时间推进
    // ------------------------------------------------------------------

    /// 以 `yieldstep` 为间隔推进 `duration` 秒
    ///
    /// 返回惰性迭代器：先产出起始时间，之后每隔 `yieldstep` 产出一次，
    /// 最后一次恰为 `起始时间 + duration`。每次产出都会写入一个 `.sww` 时间片。
    /// 迭代器只能消费一次；出错后不再产出。
    pub fn evolve(&mut self, yieldstep: f64, duration: f64) -> Evolve<'_> {
        Evolve::new(self, yieldstep, duration)
    }

    /// 当前输出间隔的时间步统计，同时写入日志
    pub fn timestepping_statistics(&self) -> TimesteppingStatistics {
        let stats = self.counter.snapshot(self.time);
        info!("{stats}");
        stats
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("n_cells", &self.mesh.n_cells())
            .field("time", &self.time)
            .field("boundary_map", &self.boundary_map)
            .field("operators", &self.operators.len())
            .finish()
    }
}
