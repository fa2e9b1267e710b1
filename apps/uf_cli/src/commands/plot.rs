// apps/uf_cli/src/commands/plot.rs

//! 结果绘图命令

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use uf_io::VtuExporter;
use uf_viz::SwwPlotter;

/// 绘图参数
#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// 结果文件 (.sww)
    #[arg(long)]
    pub sww: PathBuf,

    /// 时间片索引，缺省为最后一个
    #[arg(long)]
    pub slice: Option<usize>,

    /// 输出目录
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// 同时导出 VTU 序列
    #[arg(long)]
    pub vtu: bool,
}

/// 执行绘图命令
pub fn execute(args: PlotArgs) -> Result<()> {
    let plotter = SwwPlotter::open(&args.sww)
        .with_context(|| format!("读取结果 {}", args.sww.display()))?;
    let name = plotter.sww().header.name.clone();
    info!(
        "{}: {} 个单元, {} 个时间片, 创建于 {}",
        name,
        plotter.sww().header.n_cells,
        plotter.n_slices(),
        plotter.sww().header.created_at.to_rfc3339()
    );

    let slice = match args.slice {
        Some(slice) => slice,
        None => plotter.last_slice()?,
    };
    let path = plotter.plot_depth_speed(
        slice,
        args.output.join(format!("{name}_depth-speed.png")),
    )?;
    println!("{}", path.display());

    if args.vtu {
        let pvd = VtuExporter::new().export_sww(plotter.sww(), args.output.join("vtu"), &name)?;
        println!("{}", pvd.display());
    }
    Ok(())
}
