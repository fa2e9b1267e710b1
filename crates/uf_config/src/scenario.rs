// crates/uf_config/src/scenario.rs

//! ScenarioConfig - 洪水场景配置
//!
//! 场景文件中的相对数据路径相对于 `data_dir` 解析，`data_dir` 与
//! `output_dir` 本身相对于当前工作目录。

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uf_physics::{BoundaryCondition, SolverParams};

use crate::error::ConfigError;

/// 场景配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// 场景名称，决定输出文件名 `<name>.sww`
    pub name: String,

    /// 输入数据目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 网格
    pub mesh: MeshConfig,

    /// 地形与糙率
    pub terrain: TerrainConfig,

    /// 边界标签 → 边界条件
    #[serde(default)]
    pub boundaries: BTreeMap<String, BoundaryCondition>,

    /// 入流
    #[serde(default)]
    pub inlets: Vec<InletConfig>,

    /// 时间推进
    #[serde(default)]
    pub evolve: EvolveConfig,

    /// 求解器参数
    #[serde(default)]
    pub solver: SolverParams,

    /// 输出选项
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_data_dir() -> PathBuf { PathBuf::from("data/york") }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

/// 网格配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// 外边界多边形 CSV
    pub bounding_polygon: PathBuf,

    /// 边界标签 → 外边界线段编号
    pub boundary_tags: BTreeMap<String, Vec<usize>>,

    /// 全域最大三角形面积 [m²]
    #[serde(default = "default_base_resolution")]
    pub base_resolution: f64,

    /// 加密区
    #[serde(default)]
    pub interior_regions: Vec<RegionConfig>,

    /// 房屋轮廓（作为洞）
    #[serde(default)]
    pub houses: Option<HousesConfig>,
}

fn default_base_resolution() -> f64 { 100.0 }

/// 加密区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// 区域多边形 CSV
    pub polygon: PathBuf,
    /// 区域内最大三角形面积 [m²]
    pub max_area: f64,
}

/// 房屋轮廓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousesConfig {
    /// 文件名模式，至多一个 `*`
    #[serde(default = "default_house_pattern")]
    pub pattern: String,
    /// 面积严格大于此值的房屋才作为洞 [m²]
    #[serde(default = "default_house_min_area")]
    pub min_area: f64,
}

fn default_house_pattern() -> String { "house*.csv".to_string() }
fn default_house_min_area() -> f64 { 60.0 }

impl Default for HousesConfig {
    fn default() -> Self {
        Self {
            pattern: default_house_pattern(),
            min_area: default_house_min_area(),
        }
    }
}

/// 地形与糙率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// ESRI ASCII 高程栅格
    pub topography: PathBuf,
    /// 全域常数 Manning 糙率
    #[serde(default = "default_friction")]
    pub friction: f64,
}

fn default_friction() -> f64 { 0.01 }

/// 圆形入流区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InletConfig {
    /// 圆心 [x, y]
    pub center: [f64; 2],
    /// 半径 [m]
    #[serde(default = "default_inlet_radius")]
    pub radius: f64,
    /// 流量 Q [m³/s]
    pub discharge: f64,
}

fn default_inlet_radius() -> f64 { 10.0 }

/// 时间推进
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolveConfig {
    /// 输出间隔 [s]
    #[serde(default = "default_yieldstep")]
    pub yieldstep: f64,
    /// 总时长 [s]
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// 起始时间 [s]
    #[serde(default)]
    pub starttime: f64,
}

fn default_yieldstep() -> f64 { 20.0 }
fn default_duration() -> f64 { 300.0 }

impl Default for EvolveConfig {
    fn default() -> Self {
        Self {
            yieldstep: default_yieldstep(),
            duration: default_duration(),
            starttime: 0.0,
        }
    }
}

/// 输出选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 是否写出 `.sww`
    #[serde(default = "default_true")]
    pub store: bool,
    /// 推进中是否保存水深帧并生成动画
    #[serde(default = "default_true")]
    pub frames: bool,
    /// 图片目录（相对于 `output_dir`）
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
    /// 水深帧色带范围 [m]
    #[serde(default = "default_depth_range")]
    pub depth_range: [f64; 2],
    /// 结束后导出 VTU 序列
    #[serde(default)]
    pub vtu: bool,
}

fn default_true() -> bool { true }
fn default_plot_dir() -> PathBuf { PathBuf::from("_plot") }
fn default_depth_range() -> [f64; 2] { [0.0, 1.0] }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store: default_true(),
            frames: default_true(),
            plot_dir: default_plot_dir(),
            depth_range: default_depth_range(),
            vtu: false,
        }
    }
}

impl ScenarioConfig {
    /// 从 YAML 文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        debug!("加载场景 {} ({})", config.name, path.display());
        Ok(config)
    }

    /// 从 YAML 字符串解析并校验
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 转换为 YAML 字符串
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// 保存到 YAML 文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_yaml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 替换数据目录
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// 替换输出目录
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// 数据文件的完整路径
    pub fn data_path(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    /// 图片目录的完整路径
    pub fn plot_dir(&self) -> PathBuf {
        self.output_dir.join(&self.output.plot_dir)
    }

    /// 网格会产生的全部边界标签（含默认标签与洞标签）
    ///
    /// `exterior` 仅在存在未标记的外边界线段时出现，需要网格才能确定，这里不计入。
    pub fn expected_boundary_tags(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> = self.mesh.boundary_tags.keys().cloned().collect();
        if self.mesh.houses.is_some() {
            tags.insert("interior".to_string());
        }
        tags
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() || self.name.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                "name",
                &self.name,
                "不能为空且不能包含路径分隔符",
            ));
        }

        positive("mesh.base_resolution", self.mesh.base_resolution)?;
        for (i, region) in self.mesh.interior_regions.iter().enumerate() {
            positive(&format!("mesh.interior_regions[{i}].max_area"), region.max_area)?;
        }

        if self.mesh.boundary_tags.is_empty() {
            return Err(ConfigError::invalid("mesh.boundary_tags", "{}", "至少需要一个标签"));
        }
        let mut seen = BTreeMap::new();
        for (tag, segments) in &self.mesh.boundary_tags {
            for &segment in segments {
                if let Some(previous) = seen.insert(segment, tag) {
                    return Err(ConfigError::invalid(
                        format!("mesh.boundary_tags.{tag}"),
                        segment,
                        format!("线段已标记为 '{previous}'"),
                    ));
                }
            }
        }

        if let Some(houses) = &self.mesh.houses {
            if houses.pattern.matches('*').count() > 1 {
                return Err(ConfigError::invalid(
                    "mesh.houses.pattern",
                    &houses.pattern,
                    "至多一个 '*'",
                ));
            }
            if !(houses.min_area.is_finite() && houses.min_area >= 0.0) {
                return Err(ConfigError::invalid(
                    "mesh.houses.min_area",
                    houses.min_area,
                    "不能为负",
                ));
            }
        }

        if !(self.terrain.friction.is_finite() && self.terrain.friction >= 0.0) {
            return Err(ConfigError::invalid(
                "terrain.friction",
                self.terrain.friction,
                "不能为负",
            ));
        }

        for (i, inlet) in self.inlets.iter().enumerate() {
            positive(&format!("inlets[{i}].radius"), inlet.radius)?;
            if !inlet.discharge.is_finite() || inlet.center.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::invalid(
                    format!("inlets[{i}]"),
                    format!("{:?} Q={}", inlet.center, inlet.discharge),
                    "必须为有限值",
                ));
            }
        }

        positive("evolve.yieldstep", self.evolve.yieldstep)?;
        if !(self.evolve.duration.is_finite() && self.evolve.duration >= 0.0) {
            return Err(ConfigError::invalid(
                "evolve.duration",
                self.evolve.duration,
                "不能为负",
            ));
        }
        if !self.evolve.starttime.is_finite() {
            return Err(ConfigError::invalid(
                "evolve.starttime",
                self.evolve.starttime,
                "必须为有限值",
            ));
        }

        let [lo, hi] = self.output.depth_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ConfigError::invalid(
                "output.depth_range",
                format!("[{lo}, {hi}]"),
                "下限必须小于上限",
            ));
        }

        self.solver
            .validate()
            .map_err(|e| ConfigError::invalid("solver", "", e.to_string()))?;
        Ok(())
    }
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "必须为正数"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: tiny
mesh:
  bounding_polygon: extent.csv
  boundary_tags:
    south: [0]
    rest: [1, 2, 3]
terrain:
  topography: dem.asc
"#;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ScenarioConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data/york"));
        assert_eq!(config.mesh.base_resolution, 100.0);
        assert_eq!(config.terrain.friction, 0.01);
        assert_eq!(config.evolve, EvolveConfig::default());
        assert_eq!(config.solver, SolverParams::default());
        assert!(config.output.store && config.output.frames);
        assert!(config.boundaries.is_empty());
        assert_eq!(
            config.expected_boundary_tags().into_iter().collect::<Vec<_>>(),
            vec!["rest", "south"]
        );
    }

    #[test]
    fn test_boundaries_parse_tagged() {
        let yaml = format!(
            "{MINIMAL}boundaries:\n  south: {{kind: reflective}}\n  rest: {{kind: dirichlet, stage: 2.5}}\n"
        );
        let config = ScenarioConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.boundaries["south"], BoundaryCondition::Reflective);
        assert_eq!(config.boundaries["rest"], BoundaryCondition::stage(2.5));
    }

    #[test]
    fn test_segment_tagged_twice() {
        let yaml = MINIMAL.replace("rest: [1, 2, 3]", "rest: [0, 1]");
        let err = ScenarioConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let base = ScenarioConfig::from_yaml(MINIMAL).unwrap();

        let mut c = base.clone();
        c.evolve.yieldstep = 0.0;
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.terrain.friction = -0.1;
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.name = "../escape".to_string();
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.solver.cfl = 1.5;
        assert!(c.validate().is_err());

        let mut c = base;
        c.mesh.houses = Some(HousesConfig {
            pattern: "*house*.csv".to_string(),
            min_area: 60.0,
        });
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_parse_error_reported() {
        let err = ScenarioConfig::from_yaml("name: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_paths_resolved() {
        let config = ScenarioConfig::from_yaml(MINIMAL)
            .unwrap()
            .with_data_dir("/data")
            .with_output_dir("out");
        assert_eq!(
            config.data_path(&config.mesh.bounding_polygon),
            PathBuf::from("/data/extent.csv")
        );
        assert_eq!(config.plot_dir(), PathBuf::from("out/_plot"));
    }
}
