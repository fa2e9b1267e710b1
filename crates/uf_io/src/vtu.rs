// crates/uf_io/src/vtu.rs

//! VTU 格式导出
//!
//! 把 `.sww` 结果转换为 VTK Unstructured Grid 文件，供 ParaView 查看。
//! 每个时间切片一个 `.vtu`，另写一个 `.pvd` 集合文件串起时间序列。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use uf_foundation::Tolerance;
use uf_geo::Point2D;

use crate::error::{IoError, IoResult};
use crate::sww::SwwFile;

/// VTK 三角形单元类型编号
const VTK_TRIANGLE: u8 = 5;

/// 单帧导出所需数据
#[derive(Debug, Clone, Copy)]
pub struct VtuFrame<'a> {
    pub nodes: &'a [Point2D],
    pub triangles: &'a [[usize; 3]],
    pub elevation: &'a [f64],
    pub stage: &'a [f64],
    pub xmom: &'a [f64],
    pub ymom: &'a [f64],
    pub time: f64,
}

/// VTU 导出器
#[derive(Debug, Clone)]
pub struct VtuExporter {
    tolerance: Tolerance,
    precision: usize,
}

impl Default for VtuExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl VtuExporter {
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::default(),
            precision: 6,
        }
    }

    /// 设置干湿阈值
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 设置小数位数
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// 导出单帧
    pub fn export(&self, path: impl AsRef<Path>, frame: &VtuFrame<'_>) -> IoResult<()> {
        let path = path.as_ref();
        let n_cells = frame.triangles.len();
        for (name, len) in [
            ("elevation", frame.elevation.len()),
            ("stage", frame.stage.len()),
            ("xmom", frame.xmom.len()),
            ("ymom", frame.ymom.len()),
        ] {
            if len != n_cells {
                return Err(IoError::LengthMismatch {
                    name,
                    expected: n_cells,
                    found: len,
                });
            }
        }

        let file = File::create(path).map_err(|e| IoError::file(path, e))?;
        let mut w = BufWriter::new(file);
        self.write_document(&mut w, frame)
            .and_then(|_| w.flush())
            .map_err(|e| IoError::file(path, e))
    }

    /// 导出 `.sww` 全部时间切片，返回 `.pvd` 路径
    ///
    /// 流速按文件记录的干湿阈值计算。
    pub fn export_sww(&self, sww: &SwwFile, dir: impl AsRef<Path>, prefix: &str) -> IoResult<PathBuf> {
        let exporter = self.clone().with_tolerance(sww.header.tolerance);
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| IoError::file(dir, e))?;

        let mut files = Vec::with_capacity(sww.n_slices());
        for (i, slice) in sww.slices.iter().enumerate() {
            let filename = format!("{prefix}_{i:06}.vtu");
            let frame = VtuFrame {
                nodes: &sww.nodes,
                triangles: &sww.triangles,
                elevation: &sww.elevation,
                stage: &slice.stage,
                xmom: &slice.xmom,
                ymom: &slice.ymom,
                time: slice.time,
            };
            exporter.export(dir.join(&filename), &frame)?;
            files.push((filename, slice.time));
        }

        let pvd = dir.join(format!("{prefix}.pvd"));
        write_pvd(&pvd, &files)?;
        Ok(pvd)
    }

    fn write_document<W: Write>(&self, w: &mut W, frame: &VtuFrame<'_>) -> std::io::Result<()> {
        let p = self.precision;
        writeln!(w, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            w,
            r#"<VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian">"#
        )?;
        writeln!(w, r#"  <UnstructuredGrid>"#)?;
        writeln!(w, r#"    <FieldData>"#)?;
        writeln!(
            w,
            r#"      <DataArray type="Float64" Name="TimeValue" NumberOfTuples="1">{}</DataArray>"#,
            frame.time
        )?;
        writeln!(w, r#"    </FieldData>"#)?;
        writeln!(
            w,
            r#"    <Piece NumberOfPoints="{}" NumberOfCells="{}">"#,
            frame.nodes.len(),
            frame.triangles.len()
        )?;

        writeln!(w, r#"      <Points>"#)?;
        writeln!(
            w,
            r#"        <DataArray type="Float64" NumberOfComponents="3" format="ascii">"#
        )?;
        for node in frame.nodes {
            writeln!(w, "          {:.p$} {:.p$} 0", node.x, node.y)?;
        }
        writeln!(w, r#"        </DataArray>"#)?;
        writeln!(w, r#"      </Points>"#)?;

        writeln!(w, r#"      <Cells>"#)?;
        writeln!(
            w,
            r#"        <DataArray type="Int32" Name="connectivity" format="ascii">"#
        )?;
        for [a, b, c] in frame.triangles {
            writeln!(w, "          {a} {b} {c}")?;
        }
        writeln!(w, r#"        </DataArray>"#)?;
        writeln!(
            w,
            r#"        <DataArray type="Int32" Name="offsets" format="ascii">"#
        )?;
        for i in 0..frame.triangles.len() {
            writeln!(w, "          {}", 3 * (i + 1))?;
        }
        writeln!(w, r#"        </DataArray>"#)?;
        writeln!(
            w,
            r#"        <DataArray type="UInt8" Name="types" format="ascii">"#
        )?;
        for _ in frame.triangles {
            writeln!(w, "          {VTK_TRIANGLE}")?;
        }
        writeln!(w, r#"        </DataArray>"#)?;
        writeln!(w, r#"      </Cells>"#)?;

        let tol = self.tolerance;
        let depth = |i: usize| (frame.stage[i] - frame.elevation[i]).max(0.0);
        writeln!(w, r#"      <CellData>"#)?;
        self.write_scalar(w, "depth", frame.stage.len(), depth)?;
        self.write_scalar(w, "stage", frame.stage.len(), |i| frame.stage[i])?;
        self.write_scalar(w, "elevation", frame.stage.len(), |i| frame.elevation[i])?;
        self.write_scalar(w, "u", frame.stage.len(), |i| tol.velocity(depth(i), frame.xmom[i]))?;
        self.write_scalar(w, "v", frame.stage.len(), |i| tol.velocity(depth(i), frame.ymom[i]))?;
        self.write_scalar(w, "speed", frame.stage.len(), |i| {
            let h = depth(i);
            tol.velocity(h, frame.xmom[i]).hypot(tol.velocity(h, frame.ymom[i]))
        })?;
        writeln!(w, r#"      </CellData>"#)?;

        writeln!(w, r#"    </Piece>"#)?;
        writeln!(w, r#"  </UnstructuredGrid>"#)?;
        writeln!(w, r#"</VTKFile>"#)?;
        Ok(())
    }

    fn write_scalar<W, F>(&self, w: &mut W, name: &str, n: usize, f: F) -> std::io::Result<()>
    where
        W: Write,
        F: Fn(usize) -> f64,
    {
        let p = self.precision;
        writeln!(
            w,
            r#"        <DataArray type="Float64" Name="{name}" format="ascii">"#
        )?;
        for i in 0..n {
            writeln!(w, "          {:.p$}", f(i))?;
        }
        writeln!(w, r#"        </DataArray>"#)
    }
}

/// 写入 PVD 集合文件
fn write_pvd(path: &Path, files: &[(String, f64)]) -> IoResult<()> {
    let file = File::create(path).map_err(|e| IoError::file(path, e))?;
    let mut w = BufWriter::new(file);
    let result = (|| -> std::io::Result<()> {
        writeln!(w, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            w,
            r#"<VTKFile type="Collection" version="0.1" byte_order="LittleEndian">"#
        )?;
        writeln!(w, r#"  <Collection>"#)?;
        for (filename, time) in files {
            writeln!(w, r#"    <DataSet timestep="{time}" file="{filename}"/>"#)?;
        }
        writeln!(w, r#"  </Collection>"#)?;
        writeln!(w, r#"</VTKFile>"#)?;
        w.flush()
    })();
    result.map_err(|e| IoError::file(path, e))
}
