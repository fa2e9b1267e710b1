// crates/uf_physics/src/engine/evolve.rs

//! 时间推进迭代器
//!
//! 每一步:
//! 1. 边界幽灵状态 + HLLC 通量（并行）
//! 2. 显式 Euler 更新，截断负水深
//! 3. 半隐式 Manning 摩擦
//! 4. 算子（入流）
//!
//! 输出时刻为 `start + k * yieldstep`，最后一次恰为 `start + duration`。

use rayon::prelude::*;
use tracing::{debug, info, warn};
use uf_io::{SwwStatic, SwwWriter};

use crate::boundary::BoundaryCondition;
use crate::domain::Domain;
use crate::engine::flux::FluxContext;
use crate::engine::friction::ManningFriction;
use crate::engine::timestep::cfl_timestep;
use crate::error::{PhysicsError, PhysicsResult};
use crate::operators::CellFields;
use crate::schemes::HllcSolver;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Pending,
    Running { start: f64, end: f64, index: u64 },
    Done,
}

/// `Domain::evolve` 返回的迭代器
///
/// 产出每个输出时刻的模拟时间。迭代期间可通过 [`Evolve::domain`] 读取计算域状态。
pub struct Evolve<'a> {
    domain: &'a mut Domain,
    yieldstep: f64,
    duration: f64,
    phase: Phase,
    conditions: Vec<BoundaryCondition>,
}

impl<'a> Evolve<'a> {
    pub(crate) fn new(domain: &'a mut Domain, yieldstep: f64, duration: f64) -> Self {
        Self {
            domain,
            yieldstep,
            duration,
            phase: Phase::Pending,
            conditions: Vec::new(),
        }
    }

    /// 当前计算域（只读）
    pub fn domain(&self) -> &Domain {
        self.domain
    }

    /// 第一次调用：检查设置、打开输出并产出起始时间
    fn begin(&mut self) -> PhysicsResult<f64> {
        if !(self.yieldstep.is_finite() && self.yieldstep > 0.0) {
            return Err(PhysicsError::invalid_parameter(format!(
                "yieldstep 必须为正数, 实际 {}",
                self.yieldstep
            )));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(PhysicsError::invalid_parameter(format!(
                "duration 不能为负, 实际 {}",
                self.duration
            )));
        }
        let domain = &mut *self.domain;
        domain.params.validate()?;
        self.conditions = domain.conditions_by_tag()?;

        let mut raised = 0usize;
        for (w, &z) in domain.stage.iter_mut().zip(&domain.elevation) {
            if *w < z {
                *w = z;
                raised += 1;
            }
        }
        if raised > 0 {
            warn!("{raised} 个单元的水位低于底床，已抬升到底床高程");
        }

        if domain.store {
            let path = domain.sww_path();
            let writer = SwwWriter::create(
                &path,
                &domain.name,
                SwwStatic {
                    nodes: &domain.mesh.nodes,
                    triangles: &domain.mesh.triangles,
                    elevation: &domain.elevation,
                    friction: &domain.friction,
                    tolerance: domain.params.tolerance(),
                },
            )?;
            info!("输出文件: {}", path.display());
            domain.writer = Some(writer);
        }

        let start = domain.time;
        info!(
            "开始推进 {}: t = {start} s, yieldstep = {} s, duration = {} s, {} 个单元",
            domain.name,
            self.yieldstep,
            self.duration,
            domain.n_cells()
        );
        domain.counter.reset_interval();
        self.write_slice()?;
        self.phase = Phase::Running {
            start,
            end: start + self.duration,
            index: 0,
        };
        Ok(start)
    }

    fn write_slice(&mut self) -> PhysicsResult<()> {
        let d = &mut *self.domain;
        if let Some(writer) = d.writer.as_mut() {
            writer.write_slice(d.time, &d.stage, &d.xmom, &d.ymom)?;
        }
        Ok(())
    }

    fn finish_output(&mut self) -> PhysicsResult<()> {
        if let Some(writer) = self.domain.writer.take() {
            let slices = writer.slices_written();
            let path = writer.finish()?;
            info!("{} 写入完成 ({slices} 个时间片)", path.display());
        }
        Ok(())
    }

    /// 推进到 `target`
    fn advance_to(&mut self, target: f64) -> PhysicsResult<()> {
        self.domain.counter.reset_interval();
        while self.domain.time < target {
            self.step(target)?;
        }
        Ok(())
    }

    /// 单步推进，步长不越过 `target`
    fn step(&mut self, target: f64) -> PhysicsResult<()> {
        let d = &mut *self.domain;
        let params = d.params;
        let tolerance = params.tolerance();

        let ctx = FluxContext {
            mesh: &d.mesh,
            elevation: &d.elevation,
            conditions: &self.conditions,
            solver: HllcSolver::new(params.gravity, params.h_min),
            tolerance,
        };
        let min_limit = ctx.compute_rates(&d.stage, &d.xmom, &d.ymom, &mut d.rates);
        let dt_cfl = cfl_timestep(min_limit, &params, d.time)?;

        let remaining = target - d.time;
        let (dt, reaches_target) = if dt_cfl >= remaining {
            (remaining, true)
        } else {
            (dt_cfl, false)
        };

        // 显式 Euler 更新
        let areas = &d.mesh.areas;
        let elevation = &d.elevation;
        let rates = &d.rates;
        let clipped: f64 = d
            .stage
            .par_iter_mut()
            .zip(d.xmom.par_iter_mut())
            .zip(d.ymom.par_iter_mut())
            .enumerate()
            .map(|(i, ((w, hu), hv))| {
                let r = rates[i];
                let z = elevation[i];
                let h = (*w - z).max(0.0) + dt * r.dh;
                *hu += dt * r.dhu;
                *hv += dt * r.dhv;
                if h < 0.0 {
                    *w = z;
                    *hu = 0.0;
                    *hv = 0.0;
                    -h * areas[i]
                } else {
                    *w = z + h;
                    if tolerance.is_dry(h) {
                        *hu = 0.0;
                        *hv = 0.0;
                    }
                    0.0
                }
            })
            .sum();
        if clipped > 0.0 {
            d.clipped_volume += clipped;
            debug!("t = {:.4} s: 截断负水深，质量偏差 {clipped:.3e} m³", d.time);
        }

        let depth = d.depth();
        ManningFriction::new(params.gravity, tolerance).apply(
            &depth,
            &d.friction,
            &mut d.xmom,
            &mut d.ymom,
            dt,
        );

        let mut fields = CellFields {
            stage: &mut d.stage,
            xmom: &mut d.xmom,
            ymom: &mut d.ymom,
            elevation: &d.elevation,
            areas: &d.mesh.areas,
            tolerance,
        };
        for op in d.operators.iter_mut() {
            op.apply(&mut fields, d.time, dt)?;
        }

        let bad = d
            .stage
            .par_iter()
            .zip(d.xmom.par_iter())
            .zip(d.ymom.par_iter())
            .position_any(|((w, hu), hv)| !(w.is_finite() && hu.is_finite() && hv.is_finite()));
        if let Some(i) = bad {
            return Err(PhysicsError::instability(
                d.time,
                format!("单元 {i} 出现非有限值"),
            ));
        }

        d.time = if reaches_target { target } else { d.time + dt };
        d.counter.record(dt);
        Ok(())
    }

    /// 第 `index + 1` 个输出时刻
    fn next_target(start: f64, end: f64, yieldstep: f64, index: u64) -> f64 {
        let t = start + (index + 1) as f64 * yieldstep;
        if t >= end - 1e-9 * yieldstep {
            end
        } else {
            t
        }
    }

    fn resume(&mut self, start: f64, end: f64, index: u64) -> PhysicsResult<Option<f64>> {
        if self.domain.time >= end {
            return Ok(None);
        }
        let target = Self::next_target(start, end, self.yieldstep, index);
        self.advance_to(target)?;
        self.write_slice()?;
        self.phase = Phase::Running {
            start,
            end,
            index: index + 1,
        };
        Ok(Some(target))
    }
}

impl Iterator for Evolve<'_> {
    type Item = PhysicsResult<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match self.phase {
            Phase::Done => return None,
            Phase::Pending => self.begin().map(Some),
            Phase::Running { start, end, index } => self.resume(start, end, index),
        };

        match result {
            Ok(Some(time)) => {
                if let Phase::Running { end, .. } = self.phase {
                    if time >= end {
                        self.phase = Phase::Done;
                        if let Err(e) = self.finish_output() {
                            return Some(Err(e));
                        }
                    }
                }
                Some(Ok(time))
            }
            Ok(None) => {
                self.phase = Phase::Done;
                None
            }
            Err(e) => {
                self.phase = Phase::Done;
                self.domain.writer = None;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Evolve<'_> {}
