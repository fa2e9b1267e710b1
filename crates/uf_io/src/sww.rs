// crates/uf_io/src/sww.rs

//! `.sww` 模拟结果文件
//!
//! 一个文件保存一次模拟：网格、静态量和按时间追加的状态切片。
//!
//! # 文件格式 (v2，小端)
//!
//! ```text
//! [魔数: 4 bytes] "UFSW"
//! [版本: u32]
//! [节点数: u64]
//! [单元数: u64]
//! [名称: u32 长度 + UTF-8]
//! [创建时间: u32 长度 + RFC 3339 文本]
//! [干单元阈值 h_dry: f64]
//! [最小水深 h_min: f64]
//! [节点 x: n_nodes * f64]
//! [节点 y: n_nodes * f64]
//! [三角形: n_cells * 3 * u32]
//! [底床高程: n_cells * f64]
//! [糙率: n_cells * f64]
//! 重复直到文件结束:
//!   [时间: f64]
//!   [水位: n_cells * f64]
//!   [x 动量: n_cells * f64]
//!   [y 动量: n_cells * f64]
//! ```
//!
//! 每写完一个切片立即刷新，模拟中途失败时已写出的切片仍可读取。

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;
use uf_foundation::Tolerance;
use uf_geo::Point2D;

use crate::error::{IoError, IoResult};

/// 文件格式版本
pub const SWW_VERSION: u32 = 2;

/// 魔数
const SWW_MAGIC: &[u8; 4] = b"UFSW";

/// 文件头
#[derive(Debug, Clone, PartialEq)]
pub struct SwwHeader {
    /// 版本号
    pub version: u32,
    /// 模拟名称
    pub name: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 节点数
    pub n_nodes: usize,
    /// 单元数
    pub n_cells: usize,
    /// 写入时的干湿阈值（`h_dry`、`h_min`），读取流速时沿用
    pub tolerance: Tolerance,
}

/// 一个时间切片
#[derive(Debug, Clone, PartialEq)]
pub struct SwwSlice {
    /// 模拟时间 [s]
    pub time: f64,
    /// 水位
    pub stage: Vec<f64>,
    /// x 方向单宽流量
    pub xmom: Vec<f64>,
    /// y 方向单宽流量
    pub ymom: Vec<f64>,
}

/// 写入时的静态数据
#[derive(Debug, Clone, Copy)]
pub struct SwwStatic<'a> {
    /// 节点坐标
    pub nodes: &'a [Point2D],
    /// 三角形
    pub triangles: &'a [[usize; 3]],
    /// 底床高程
    pub elevation: &'a [f64],
    /// 糙率
    pub friction: &'a [f64],
    /// 干湿阈值
    pub tolerance: Tolerance,
}

/// `.sww` 写入器
pub struct SwwWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    n_cells: usize,
    n_slices: usize,
    last_time: Option<f64>,
}

impl SwwWriter {
    /// 创建文件并写入文件头与静态数据
    pub fn create(path: impl AsRef<Path>, name: &str, data: SwwStatic<'_>) -> IoResult<Self> {
        Self::create_at(path, name, data, Utc::now())
    }

    /// 指定创建时间
    pub fn create_at(
        path: impl AsRef<Path>,
        name: &str,
        data: SwwStatic<'_>,
        created_at: DateTime<Utc>,
    ) -> IoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let n_cells = data.triangles.len();
        check_len("elevation", n_cells, data.elevation.len())?;
        check_len("friction", n_cells, data.friction.len())?;
        if let Some(&bad) = data.triangles.iter().flatten().find(|&&v| v >= data.nodes.len()) {
            return Err(IoError::LengthMismatch {
                name: "triangle node index",
                expected: data.nodes.len(),
                found: bad,
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| IoError::file(&path, e))?;

        let mut buf = Vec::with_capacity(64 + data.nodes.len() * 16 + n_cells * 28);
        buf.extend_from_slice(SWW_MAGIC);
        buf.extend_from_slice(&SWW_VERSION.to_le_bytes());
        buf.extend_from_slice(&(data.nodes.len() as u64).to_le_bytes());
        buf.extend_from_slice(&(n_cells as u64).to_le_bytes());
        put_str(&mut buf, name);
        put_str(&mut buf, &created_at.to_rfc3339());
        buf.extend_from_slice(&data.tolerance.h_dry.to_le_bytes());
        buf.extend_from_slice(&data.tolerance.h_min.to_le_bytes());
        for p in data.nodes {
            buf.extend_from_slice(&p.x.to_le_bytes());
        }
        for p in data.nodes {
            buf.extend_from_slice(&p.y.to_le_bytes());
        }
        for tri in data.triangles {
            for &v in tri {
                buf.extend_from_slice(&(v as u32).to_le_bytes());
            }
        }
        put_f64s(&mut buf, data.elevation);
        put_f64s(&mut buf, data.friction);

        let mut writer = BufWriter::new(file);
        writer.write_all(&buf).map_err(|e| IoError::file(&path, e))?;
        writer.flush().map_err(|e| IoError::file(&path, e))?;

        debug!("创建 {}: {} 个节点, {} 个单元", path.display(), data.nodes.len(), n_cells);
        Ok(Self {
            path,
            writer,
            n_cells,
            n_slices: 0,
            last_time: None,
        })
    }

    /// 追加一个时间切片
    pub fn write_slice(&mut self, time: f64, stage: &[f64], xmom: &[f64], ymom: &[f64]) -> IoResult<()> {
        check_len("stage", self.n_cells, stage.len())?;
        check_len("xmom", self.n_cells, xmom.len())?;
        check_len("ymom", self.n_cells, ymom.len())?;
        if let Some(last) = self.last_time {
            if time < last {
                return Err(IoError::format(
                    &self.path,
                    format!("时间片必须按时间递增写入: {time} < {last}"),
                ));
            }
        }

        let mut buf = Vec::with_capacity(8 + self.n_cells * 24);
        buf.extend_from_slice(&time.to_le_bytes());
        put_f64s(&mut buf, stage);
        put_f64s(&mut buf, xmom);
        put_f64s(&mut buf, ymom);
        self.writer
            .write_all(&buf)
            .and_then(|_| self.writer.flush())
            .map_err(|e| IoError::file(&self.path, e))?;

        self.n_slices += 1;
        self.last_time = Some(time);
        Ok(())
    }

    /// 已写入的切片数
    pub fn slices_written(&self) -> usize {
        self.n_slices
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 结束写入
    pub fn finish(mut self) -> IoResult<PathBuf> {
        self.writer
            .flush()
            .map_err(|e| IoError::file(&self.path, e))?;
        debug!("{} 写入完成, 共 {} 个时间片", self.path.display(), self.n_slices);
        Ok(self.path)
    }
}

impl std::fmt::Debug for SwwWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwwWriter")
            .field("path", &self.path)
            .field("n_cells", &self.n_cells)
            .field("n_slices", &self.n_slices)
            .finish()
    }
}

/// 已读取的 `.sww` 文件
#[derive(Debug, Clone)]
pub struct SwwFile {
    /// 文件头
    pub header: SwwHeader,
    /// 节点坐标
    pub nodes: Vec<Point2D>,
    /// 三角形
    pub triangles: Vec<[usize; 3]>,
    /// 底床高程
    pub elevation: Vec<f64>,
    /// 糙率
    pub friction: Vec<f64>,
    /// 时间切片
    pub slices: Vec<SwwSlice>,
}

impl SwwFile {
    /// 读取整个文件
    pub fn read(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut bytes))
            .map_err(|e| IoError::file(path, e))?;

        let mut r = ByteReader {
            data: &bytes,
            offset: 0,
            path,
        };

        if r.take(4)? != SWW_MAGIC {
            return Err(IoError::format(path, "无效的 .sww 文件（魔数不符）"));
        }
        let version = r.u32()?;
        if version != SWW_VERSION {
            return Err(IoError::Version {
                file: version,
                current: SWW_VERSION,
            });
        }
        let n_nodes = r.u64()? as usize;
        let n_cells = r.u64()? as usize;
        let name = r.string()?;
        let stamp = r.string()?;
        let created_at = DateTime::parse_from_rfc3339(&stamp)
            .map_err(|e| IoError::format(path, format!("创建时间无法解析: {e}")))?
            .with_timezone(&Utc);
        let tolerance = Tolerance {
            h_dry: r.f64()?,
            h_min: r.f64()?,
            ..Tolerance::default()
        };

        let xs = r.f64s(n_nodes)?;
        let ys = r.f64s(n_nodes)?;
        let nodes = xs.into_iter().zip(ys).map(|(x, y)| Point2D::new(x, y)).collect();
        let mut triangles = Vec::with_capacity(n_cells);
        for _ in 0..n_cells {
            let tri = [r.u32()? as usize, r.u32()? as usize, r.u32()? as usize];
            if tri.iter().any(|&v| v >= n_nodes) {
                return Err(IoError::format(path, "三角形节点编号越界"));
            }
            triangles.push(tri);
        }
        let elevation = r.f64s(n_cells)?;
        let friction = r.f64s(n_cells)?;

        let mut slices = Vec::new();
        while !r.is_empty() {
            let time = r.f64()?;
            let stage = r.f64s(n_cells)?;
            let xmom = r.f64s(n_cells)?;
            let ymom = r.f64s(n_cells)?;
            slices.push(SwwSlice {
                time,
                stage,
                xmom,
                ymom,
            });
        }

        Ok(Self {
            header: SwwHeader {
                version,
                name,
                created_at,
                n_nodes,
                n_cells,
                tolerance,
            },
            nodes,
            triangles,
            elevation,
            friction,
            slices,
        })
    }

    /// 切片数
    pub fn n_slices(&self) -> usize {
        self.slices.len()
    }

    /// 全部切片时间
    pub fn times(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.time).collect()
    }

    /// 取切片
    pub fn slice(&self, index: usize) -> IoResult<&SwwSlice> {
        self.slices.get(index).ok_or(IoError::SliceOutOfRange {
            index,
            count: self.slices.len(),
        })
    }

    /// 第 `index` 个切片的水深
    pub fn depth(&self, index: usize) -> IoResult<Vec<f64>> {
        let s = self.slice(index)?;
        Ok(s.stage
            .iter()
            .zip(&self.elevation)
            .map(|(w, z)| (w - z).max(0.0))
            .collect())
    }

    /// 第 `index` 个切片的流速大小（按文件记录的干湿阈值，干单元为 0）
    pub fn speed(&self, index: usize) -> IoResult<Vec<f64>> {
        let tol = self.header.tolerance;
        let s = self.slice(index)?;
        Ok((0..self.header.n_cells)
            .map(|i| {
                let h = (s.stage[i] - self.elevation[i]).max(0.0);
                tol.velocity(h, s.xmom[i]).hypot(tol.velocity(h, s.ymom[i]))
            })
            .collect())
    }
}

fn check_len(name: &'static str, expected: usize, found: usize) -> IoResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(IoError::LengthMismatch {
            name,
            expected,
            found,
        })
    }
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn put_f64s(buf: &mut Vec<u8>, values: &[f64]) {
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

/// 顺序字节读取
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
    path: &'a Path,
}

impl<'a> ByteReader<'a> {
    fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    fn take(&mut self, n: usize) -> IoResult<&'a [u8]> {
        let end = self.offset.checked_add(n).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => {
                let out = &self.data[self.offset..end];
                self.offset = end;
                Ok(out)
            }
            None => Err(IoError::format(
                self.path,
                format!("文件在偏移 {} 处被截断", self.offset),
            )),
        }
    }

    fn array<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> IoResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> IoResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f64(&mut self) -> IoResult<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn f64s(&mut self, n: usize) -> IoResult<Vec<f64>> {
        let bytes = self.take(n.checked_mul(8).unwrap_or(usize::MAX))?;
        Ok(bytes
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                f64::from_le_bytes(b)
            })
            .collect())
    }

    fn string(&mut self) -> IoResult<String> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| IoError::format(self.path, "字符串不是有效的 UTF-8"))
    }
}
