// crates/uf_physics/src/operators/inlet.rs

//! 入流算子
//!
//! 每个时间步向区域注入 `Q * dt` 的水量。
//!
//! 注入时先抬高区域内最低的水面，使它们齐平到同一水位，直到水量用完
//! （等水位分配）。抽水（Q < 0）按各单元水深比例扣除，单元不会被抽成负水深。

use glam::DVec2;
use tracing::warn;

use super::{CellFields, Operator};
use crate::error::{PhysicsError, PhysicsResult};
use crate::region::Region;

/// 固定流量入流算子
#[derive(Debug, Clone)]
pub struct InletOperator {
    name: String,
    region: Region,
    discharge: f64,
    velocity: Option<DVec2>,
    applied: f64,
}

impl InletOperator {
    /// 以流量 `discharge` [m³/s] 作用于区域
    pub fn new(region: Region, discharge: f64) -> PhysicsResult<Self> {
        if !discharge.is_finite() {
            return Err(PhysicsError::invalid_parameter(format!(
                "入流流量必须为有限值, 实际 {discharge}"
            )));
        }
        Ok(Self {
            name: format!("inlet[{}]", region.label()),
            region,
            discharge,
            velocity: None,
            applied: 0.0,
        })
    }

    /// 设置入流速度，区域内动量取 `h * velocity`
    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// 流量 [m³/s]
    pub fn discharge(&self) -> f64 {
        self.discharge
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// 抽水：按水深比例扣除，返回实际扣除量（正数）
    fn withdraw(&self, fields: &mut CellFields<'_>, volume: f64) -> f64 {
        let cells = self.region.indices();
        let available: f64 = cells
            .iter()
            .map(|&i| fields.areas[i] * fields.depth(i))
            .sum();
        if available <= 0.0 {
            return 0.0;
        }
        let removed = volume.min(available);
        let factor = 1.0 - removed / available;
        for &i in cells {
            let h = fields.depth(i) * factor;
            fields.stage[i] = fields.elevation[i] + h;
            fields.xmom[i] *= factor;
            fields.ymom[i] *= factor;
        }
        removed
    }
}

impl Operator for InletOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, fields: &mut CellFields<'_>, time: f64, dt: f64) -> PhysicsResult<()> {
        let volume = self.discharge * dt;
        if volume > 0.0 {
            set_stages_evenly(fields.stage, fields.areas, self.region.indices(), volume);
            self.applied += volume;
        } else if volume < 0.0 {
            let removed = self.withdraw(fields, -volume);
            if removed < -volume {
                warn!(
                    "{} 在 t = {time:.3} s 可抽水量不足: 需要 {:.3} m³, 实际 {removed:.3} m³",
                    self.name, -volume
                );
            }
            self.applied -= removed;
        }

        if let Some(v) = self.velocity {
            for &i in self.region.indices() {
                let h = fields.depth(i);
                fields.xmom[i] = h * v.x;
                fields.ymom[i] = h * v.y;
            }
        }
        Ok(())
    }

    fn applied_volume(&self) -> f64 {
        self.applied
    }
}

/// 把 `volume` 的水量分配给 `cells`：从最低水面开始逐步抬升到同一水位
///
/// 水位相同时按单元编号排序，结果与输入顺序无关。
pub fn set_stages_evenly(stage: &mut [f64], areas: &[f64], cells: &[usize], volume: f64) {
    if cells.is_empty() || volume <= 0.0 {
        return;
    }
    let mut order: Vec<usize> = cells.to_vec();
    order.sort_by(|&a, &b| stage[a].total_cmp(&stage[b]).then(a.cmp(&b)));

    let mut area = 0.0;
    let mut weighted = 0.0;
    for (k, &cell) in order.iter().enumerate() {
        area += areas[cell];
        weighted += areas[cell] * stage[cell];
        let level = (volume + weighted) / area;
        let next = order.get(k + 1).map(|&c| stage[c]);
        if next.map_or(true, |w| level <= w) {
            for &c in &order[..=k] {
                stage[c] = level;
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use uf_foundation::Tolerance;
    use uf_mesh::RectMeshGenerator;

    #[test]
    fn test_lowest_cells_filled_first() {
        let mut stage = vec![1.0, 0.0, 0.5, 3.0];
        let areas = vec![1.0; 4];
        // 体积 0.5 只够把 0.0 抬到 0.5
        set_stages_evenly(&mut stage, &areas, &[0, 1, 2, 3], 0.5);
        assert_eq!(stage, vec![1.0, 0.5, 0.5, 3.0]);

        // 再加 1.0：两个 0.5 单元抬到 1.0 后，剩余 0 体积
        set_stages_evenly(&mut stage, &areas, &[0, 1, 2, 3], 1.0);
        assert_relative_eq!(stage[1], 1.0);
        assert_relative_eq!(stage[2], 1.0);
        assert_eq!(stage[3], 3.0);
    }

    #[test]
    fn test_volume_conserved_with_unequal_areas() {
        let mut stage = vec![2.0, 1.0, 0.0];
        let areas = vec![2.0, 3.0, 5.0];
        let before: f64 = stage.iter().zip(&areas).map(|(w, a)| w * a).sum();
        set_stages_evenly(&mut stage, &areas, &[2, 0, 1], 20.0);
        let after: f64 = stage.iter().zip(&areas).map(|(w, a)| w * a).sum();
        assert_relative_eq!(after - before, 20.0, max_relative = 1e-12);
        // 全部齐平
        assert_relative_eq!(stage[0], stage[2]);
    }

    #[test]
    fn test_inlet_records_volume() {
        let mesh = RectMeshGenerator::new(4, 4, 4.0, 4.0).build().unwrap();
        let region = Region::circle(&mesh, uf_geo::Point2D::new(2.0, 2.0), 1.0).unwrap();
        let mut inlet = InletOperator::new(region, 2.0).unwrap();

        let n = mesh.n_cells();
        let elevation = vec![0.0; n];
        let mut stage = vec![0.0; n];
        let mut xmom = vec![0.0; n];
        let mut ymom = vec![0.0; n];
        let mut fields = CellFields {
            stage: &mut stage,
            xmom: &mut xmom,
            ymom: &mut ymom,
            elevation: &elevation,
            areas: &mesh.areas,
            tolerance: Tolerance::default(),
        };
        inlet.apply(&mut fields, 0.0, 0.5).unwrap();
        let volume: f64 = (0..n).map(|i| fields.depth(i) * mesh.areas[i]).sum();
        assert_relative_eq!(volume, 1.0, max_relative = 1e-12);
        assert_relative_eq!(inlet.applied_volume(), 1.0);
    }

    #[test]
    fn test_inlet_velocity_sets_momentum() {
        let mesh = RectMeshGenerator::new(4, 4, 4.0, 4.0).build().unwrap();
        let region = Region::circle(&mesh, uf_geo::Point2D::new(2.0, 2.0), 1.0).unwrap();
        let cells = region.indices().to_vec();
        let mut inlet = InletOperator::new(region, 2.0)
            .unwrap()
            .with_velocity(DVec2::new(1.0, -0.5));

        let n = mesh.n_cells();
        let elevation = vec![0.0; n];
        let mut stage = vec![0.0; n];
        let mut xmom = vec![0.0; n];
        let mut ymom = vec![0.0; n];
        let mut fields = CellFields {
            stage: &mut stage,
            xmom: &mut xmom,
            ymom: &mut ymom,
            elevation: &elevation,
            areas: &mesh.areas,
            tolerance: Tolerance::default(),
        };
        inlet.apply(&mut fields, 0.0, 0.5).unwrap();
        for &i in &cells {
            let h = fields.depth(i);
            assert!(h > 0.0);
            assert_relative_eq!(fields.xmom[i], h);
            assert_relative_eq!(fields.ymom[i], -0.5 * h);
        }
    }

    #[test]
    fn test_withdraw_never_below_dry() {
        let mesh = RectMeshGenerator::new(2, 2, 2.0, 2.0).build().unwrap();
        let region = Region::from_indices(&mesh, vec![0, 1]).unwrap();
        let mut outlet = InletOperator::new(region, -10.0).unwrap();

        let n = mesh.n_cells();
        let elevation = vec![0.0; n];
        let mut stage = vec![0.1; n];
        let mut xmom = vec![0.0; n];
        let mut ymom = vec![0.0; n];
        let mut fields = CellFields {
            stage: &mut stage,
            xmom: &mut xmom,
            ymom: &mut ymom,
            elevation: &elevation,
            areas: &mesh.areas,
            tolerance: Tolerance::default(),
        };
        outlet.apply(&mut fields, 0.0, 1.0).unwrap();
        assert_eq!(fields.depth(0), 0.0);
        assert_eq!(fields.depth(1), 0.0);
        assert_eq!(fields.depth(2), 0.1);
        // 两个三角形各 0.5 m²，水深 0.1
        assert_relative_eq!(outlet.applied_volume(), -0.1, max_relative = 1e-12);
    }
}
