// crates/uf_config/src/presets.rs

//! 内置场景
//!
//! - `york1`: York 城区，中心加密，固定入流 400 m³/s（默认场景）
//! - `york2`: 在 `york1` 基础上将面积大于 60 m² 的房屋作为洞，
//!   洞边界 `interior` 为固壁，入流 19.7 m³/s

use std::collections::BTreeMap;
use std::path::PathBuf;

use uf_physics::{BoundaryCondition, SolverParams};

use crate::error::ConfigError;
use crate::scenario::{
    EvolveConfig, HousesConfig, InletConfig, MeshConfig, OutputConfig, RegionConfig,
    ScenarioConfig, TerrainConfig,
};

/// 可用预设名称
pub const PRESET_NAMES: [&str; 2] = ["york1", "york2"];

impl ScenarioConfig {
    /// 按名称取内置场景
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "york1" => Ok(Self::york1()),
            "york2" => Ok(Self::york2()),
            _ => Err(ConfigError::UnknownPreset {
                name: name.to_string(),
                available: PRESET_NAMES.join(", "),
            }),
        }
    }

    /// York 城区场景
    pub fn york1() -> Self {
        let boundary_tags: BTreeMap<String, Vec<usize>> = [
            ("bottom", 0),
            ("right", 1),
            ("top", 2),
            ("left", 3),
        ]
        .into_iter()
        .map(|(tag, segment)| (tag.to_string(), vec![segment]))
        .collect();

        let boundaries = [
            ("bottom", BoundaryCondition::Reflective),
            ("right", BoundaryCondition::Transmissive),
            ("top", BoundaryCondition::Transmissive),
            ("left", BoundaryCondition::Reflective),
        ]
        .into_iter()
        .map(|(tag, bc)| (tag.to_string(), bc))
        .collect();

        Self {
            name: "york1".to_string(),
            data_dir: PathBuf::from("data/york"),
            output_dir: PathBuf::from("."),
            mesh: MeshConfig {
                bounding_polygon: PathBuf::from("extent.csv"),
                boundary_tags,
                base_resolution: 100.0,
                interior_regions: vec![RegionConfig {
                    polygon: PathBuf::from("york_selection.csv"),
                    max_area: 50.0,
                }],
                houses: None,
            },
            terrain: TerrainConfig {
                topography: PathBuf::from("se6051_dtm_1m.asc"),
                friction: 0.01,
            },
            boundaries,
            inlets: vec![InletConfig {
                center: [460000.0, 451920.0],
                radius: 10.0,
                discharge: 400.0,
            }],
            evolve: EvolveConfig {
                yieldstep: 20.0,
                duration: 300.0,
                starttime: 0.0,
            },
            solver: SolverParams::default(),
            output: OutputConfig::default(),
        }
    }

    /// 含房屋洞的 York 场景
    pub fn york2() -> Self {
        let mut config = Self::york1();
        config.name = "york2".to_string();
        config.mesh.houses = Some(HousesConfig::default());
        config
            .boundaries
            .insert("interior".to_string(), BoundaryCondition::Reflective);
        config.inlets = vec![InletConfig {
            center: [382270.0, 6354285.0],
            radius: 10.0,
            discharge: 19.7,
        }];
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        for name in PRESET_NAMES {
            let config = ScenarioConfig::preset(name).unwrap();
            assert_eq!(config.name, name);
            config.validate().unwrap();
            // 每个标签都已指定边界条件
            for tag in config.expected_boundary_tags() {
                assert!(config.boundaries.contains_key(&tag), "{name}: {tag}");
            }
        }
    }

    #[test]
    fn test_york2_differs() {
        let (a, b) = (ScenarioConfig::york1(), ScenarioConfig::york2());
        assert!(a.mesh.houses.is_none());
        assert_eq!(b.mesh.houses.as_ref().map(|h| h.min_area), Some(60.0));
        assert_eq!(b.inlets[0].discharge, 19.7);
        assert_eq!(a.mesh.boundary_tags, b.mesh.boundary_tags);
    }

    #[test]
    fn test_unknown_preset() {
        let err = ScenarioConfig::preset("york3").unwrap_err();
        assert!(err.to_string().contains("york1, york2"));
    }
}
