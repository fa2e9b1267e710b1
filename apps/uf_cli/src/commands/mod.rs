// apps/uf_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod plot;
pub mod run;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use uf_config::ScenarioConfig;

/// 场景来源：文件或内置预设
#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    /// 场景文件 (YAML)
    #[arg(short, long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// 内置预设 (york1, york2)，缺省为 york1
    #[arg(short, long)]
    pub preset: Option<String>,

    /// 覆盖数据目录
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// 覆盖输出目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ScenarioArgs {
    /// 加载场景并应用命令行覆盖
    pub fn load(&self) -> Result<ScenarioConfig> {
        let mut config = match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::load(path)
                .with_context(|| format!("加载场景文件 {} 失败", path.display()))?,
            (None, Some(name)) => ScenarioConfig::preset(name)?,
            (None, None) => ScenarioConfig::york1(),
        };
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.output {
            config = config.with_output_dir(dir);
        }
        Ok(config)
    }
}
