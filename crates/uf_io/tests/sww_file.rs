// crates/uf_io/tests/sww_file.rs

//! `.sww` 文件集成测试

use chrono::{TimeZone, Utc};
use uf_foundation::Tolerance;
use uf_geo::Point2D;
use uf_io::{IoError, SwwFile, SwwStatic, SwwWriter, VtuExporter};

fn square() -> (Vec<Point2D>, Vec<[usize; 3]>) {
    (
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 2.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

#[test]
fn test_slices_readable_before_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/partial.sww");
    let (nodes, tris) = square();
    let elevation = [0.0, 0.5];
    let stamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut writer = SwwWriter::create_at(
        &path,
        "partial",
        SwwStatic {
            nodes: &nodes,
            triangles: &tris,
            elevation: &elevation,
            friction: &[0.03, 0.03],
            tolerance: Tolerance::default(),
        },
        stamp,
    )
    .unwrap();
    writer.write_slice(0.0, &[1.0, 1.0], &[0.0; 2], &[0.0; 2]).unwrap();
    writer.write_slice(1.0, &[1.1, 0.9], &[0.2; 2], &[0.0; 2]).unwrap();

    // 写入器仍然存活
    let sww = SwwFile::read(&path).unwrap();
    assert_eq!(sww.header.created_at, stamp);
    assert_eq!(sww.header.n_cells, 2);
    assert_eq!(sww.times(), vec![0.0, 1.0]);
    assert_eq!(sww.triangles, tris);
    assert_eq!(sww.nodes, nodes);
    assert_eq!(writer.slices_written(), 2);
    drop(writer);
}

#[test]
fn test_truncated_slice_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.sww");
    let (nodes, tris) = square();
    let mut writer = SwwWriter::create(
        &path,
        "cut",
        SwwStatic {
            nodes: &nodes,
            triangles: &tris,
            elevation: &[0.0, 0.0],
            friction: &[0.0, 0.0],
            tolerance: Tolerance::default(),
        },
    )
    .unwrap();
    writer.write_slice(0.0, &[1.0, 1.0], &[0.0; 2], &[0.0; 2]).unwrap();
    writer.finish().unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 5);
    std::fs::write(&path, bytes).unwrap();
    assert!(matches!(SwwFile::read(&path), Err(IoError::Format { .. })));
}

#[test]
fn test_export_series_to_vtu() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.sww");
    let (nodes, tris) = square();
    let mut writer = SwwWriter::create(
        &path,
        "series",
        SwwStatic {
            nodes: &nodes,
            triangles: &tris,
            elevation: &[0.0, 0.0],
            friction: &[0.0, 0.0],
            tolerance: Tolerance::default(),
        },
    )
    .unwrap();
    for k in 0..3 {
        let t = k as f64 * 10.0;
        writer.write_slice(t, &[1.0, 1.0], &[0.0; 2], &[0.0; 2]).unwrap();
    }
    writer.finish().unwrap();

    let sww = SwwFile::read(&path).unwrap();
    let pvd = VtuExporter::new()
        .export_sww(&sww, dir.path().join("vtu"), "series")
        .unwrap();
    let text = std::fs::read_to_string(pvd).unwrap();
    assert_eq!(text.matches("<DataSet").count(), 3);
    assert!(dir.path().join("vtu/series_000002.vtu").exists());
}

#[test]
fn test_speed_uses_recorded_dry_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shallow.sww");
    let (nodes, tris) = square();
    let tolerance = Tolerance {
        h_dry: 0.5,
        ..Tolerance::default()
    };
    let mut writer = SwwWriter::create(
        &path,
        "shallow",
        SwwStatic {
            nodes: &nodes,
            triangles: &tris,
            elevation: &[0.0, 0.0],
            friction: &[0.0, 0.0],
            tolerance,
        },
    )
    .unwrap();
    writer.write_slice(0.0, &[0.3, 1.0], &[0.3, 1.0], &[0.0; 2]).unwrap();
    writer.finish().unwrap();

    let sww = SwwFile::read(&path).unwrap();
    assert_eq!(sww.header.tolerance.h_dry, 0.5);
    assert_eq!(sww.header.tolerance.h_min, tolerance.h_min);
    // 0.3 m 低于记录的阈值，按默认 1 mm 阈值则为 1 m/s
    assert_eq!(sww.speed(0).unwrap(), vec![0.0, 1.0]);
}
