// apps/uf_cli/src/commands/info.rs

//! 信息显示命令

use anyhow::Result;
use clap::Args;
use uf_config::{ScenarioConfig, PRESET_NAMES};
use uf_io::SWW_VERSION;
use uf_physics::SolverParams;

/// 信息显示参数
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// 以 YAML 打印指定预设
    #[arg(long)]
    pub preset: Option<String>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    if let Some(name) = args.preset {
        print!("{}", ScenarioConfig::preset(&name)?.to_yaml()?);
        return Ok(());
    }

    println!("=== UrbanFlood ===");
    println!("版本: {}", env!("CARGO_PKG_VERSION"));
    println!(".sww 格式版本: {SWW_VERSION}");
    println!("内置预设: {}", PRESET_NAMES.join(", "));
    println!("线程数: {}", std::thread::available_parallelism().map_or(1, |n| n.get()));

    let params = SolverParams::default();
    println!("\n=== 默认求解器参数 ===");
    println!("重力加速度: {} m/s²", params.gravity);
    println!("CFL 数: {}", params.cfl);
    println!("最大时间步: {} s", params.max_timestep);
    println!("最小时间步: {} s", params.min_timestep);
    println!("干单元阈值: {} m", params.h_dry);
    println!("最小水深: {} m", params.h_min);
    Ok(())
}
