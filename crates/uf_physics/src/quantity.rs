// crates/uf_physics/src/quantity.rs

//! 单元物理量及其赋值来源

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uf_geo::Point2D;
use uf_terrain::TerrainProvider;

use crate::error::PhysicsError;

/// 单元物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// 水位 [m]
    Stage,
    /// 底床高程 [m]
    Elevation,
    /// Manning 糙率
    Friction,
    /// x 方向单宽流量 [m²/s]
    XMomentum,
    /// y 方向单宽流量 [m²/s]
    YMomentum,
}

impl Quantity {
    pub const ALL: [Quantity; 5] = [
        Self::Stage,
        Self::Elevation,
        Self::Friction,
        Self::XMomentum,
        Self::YMomentum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Elevation => "elevation",
            Self::Friction => "friction",
            Self::XMomentum => "xmomentum",
            Self::YMomentum => "ymomentum",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PhysicsError::invalid_parameter(format!("未知物理量 '{s}'")))
    }
}

/// 物理量赋值来源，均在单元形心处取值
pub enum QuantitySource<'a> {
    /// 常数
    Constant(f64),
    /// 逐单元给定
    Values(&'a [f64]),
    /// 从地形栅格采样
    Raster(&'a dyn TerrainProvider),
    /// 坐标函数
    Function(&'a (dyn Fn(Point2D) -> f64 + Sync)),
    /// 复制另一个物理量（如干床：水位 = 高程）
    Quantity(Quantity),
}

impl std::fmt::Debug for QuantitySource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "Constant({v})"),
            Self::Values(v) => write!(f, "Values(len={})", v.len()),
            Self::Raster(_) => write!(f, "Raster"),
            Self::Function(_) => write!(f, "Function"),
            Self::Quantity(q) => write!(f, "Quantity({q})"),
        }
    }
}
