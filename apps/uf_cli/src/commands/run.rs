// apps/uf_cli/src/commands/run.rs

//! 运行场景命令
//!
//! 完整流程：建网格、推进、逐帧保存水深、合成动画、绘制最终深度/流速。

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::ScenarioArgs;
use crate::pipeline::run_scenario;

/// 运行参数
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// 不保存水深帧与动画
    #[arg(long)]
    pub no_frames: bool,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    let config = args.scenario.load()?;
    info!("=== UrbanFlood 场景 {} ===", config.name);
    info!(
        "数据: {}, 输出: {}",
        config.data_dir.display(),
        config.output_dir.display()
    );

    let frames = config.output.frames && !args.no_frames;
    let report = run_scenario(&config, frames)?;

    info!("=== 模拟完成 ===");
    info!("单元数: {}", report.n_cells);
    info!("输出次数: {}, 结束时间: {} s", report.yields, report.final_time);
    for path in [&report.sww, &report.animation, &report.depth_speed, &report.vtu]
        .into_iter()
        .flatten()
    {
        info!("输出: {}", path.display());
    }
    Ok(())
}
