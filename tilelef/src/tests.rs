//!
//! # End-to-end LEF export tests
//!

use std::path::{Path, PathBuf};

use super::*;
use crate::utils::{SerdeFile, SerializationFormat};

/// Install a test-mode logger, once
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Layer types of the test technology
struct Types {
    poly: LayerId,
    m1: LayerId,
    m2: LayerId,
    via1: LayerId,
    bound: LayerId,
}

/// Create the test technology: two metals, a via between them,
/// poly without a LEF mapping, and a boundary layer.
fn tech() -> LefResult<(Technology, Types)> {
    let mut tech = Technology::new("demo");
    let poly = tech.add_type("poly", 0, &[]);
    let m1 = tech.add_type("m1", 1, &[]);
    let m2 = tech.add_type("m2", 2, &[]);
    let via1 = tech.add_type("via1", 1, &[m1, m2]);
    let bound = tech.add_type("prbound", 3, &[]);
    let routing = |width, direction| {
        LefClass::Routing(RouteInfo {
            pitch: 2 * width,
            width,
            spacing: width,
            direction,
        })
    };
    let layer = |name: &str, layer, class| LefLayer {
        name: name.into(),
        layer: Some(layer),
        obs: None,
        class,
    };
    tech.add_lef_layer(
        layer("metal1", m1, routing(100, RouteDirection::Horizontal)),
        &["met1", "m1"],
    )?;
    tech.add_lef_layer(layer("metal2", m2, routing(140, RouteDirection::Vertical)), &["met2"])?;
    tech.add_lef_layer(layer("via1", via1, LefClass::Cut { area: None }), &[])?;
    tech.add_lef_layer(layer("boundary", bound, LefClass::Boundary), &[])?;
    let types = Types {
        poly,
        m1,
        m2,
        via1,
        bound,
    };
    Ok((tech, types))
}

/// Export the hierarchy under cell `root` to a string
fn export(lib: &Library, root: &str, opts: ExportOptions) -> LefResult<(String, ExportSummary)> {
    let key = lib.cell_key(root).ok_or("root")?;
    let mut buf = Vec::new();
    let summary = LefExporter::new(lib, opts).write_hierarchy(key, &mut buf)?;
    let s = String::from_utf8(buf).map_err(|e| LefError::msg(e.to_string()))?;
    Ok((s, summary))
}
/// Export options without the layer header
fn no_tech() -> ExportOptions {
    ExportOptions {
        write_tech: false,
        ..Default::default()
    }
}
/// Content lines of `s`, without indentation
fn lines(s: &str) -> Vec<&str> {
    s.lines().map(|l| l.trim()).collect()
}
/// Parse a four-decimal micron value into database units
fn units(s: &str) -> i128 {
    s.replace('.', "").parse::<i128>().unwrap() / 10
}
/// Twice the signed area of a polygon, by the shoelace formula
fn shoelace2(pts: &[(i128, i128)]) -> i128 {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let (a, b) = (pts[i], pts[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum()
}
/// Twice the area of every `RECT` and `POLYGON` record in `s`
fn record_area2(s: &str) -> i128 {
    let mut total = 0;
    for line in lines(s) {
        let words: Vec<&str> = line.trim_end_matches(" ;").split_whitespace().collect();
        match words.first() {
            Some(&"RECT") => {
                let v: Vec<i128> = words[1..].iter().map(|w| units(w)).collect();
                total += 2 * (v[2] - v[0]) * (v[3] - v[1]);
            }
            Some(&"POLYGON") => {
                let v: Vec<i128> = words[1..].iter().map(|w| units(w)).collect();
                let pts: Vec<(i128, i128)> = v.chunks(2).map(|c| (c[0], c[1])).collect();
                total += shoelace2(&pts).abs();
            }
            _ => (),
        }
    }
    total
}

#[test]
fn single_pin() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("pad");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    cell.add_pin(Pin::new("a", Rect::new(0, 0, 10, 10), t.m1));
    lib.add_cell(cell);

    let (s, summary) = export(&lib, "pad", no_tech())?;
    assert!(s.starts_with("VERSION 5.3 ;\n"));
    assert!(s.ends_with("END LIBRARY ;\n"));
    let lines = lines(&s);
    let port = [
        "PORT",
        "LAYER metal1 ;",
        "RECT 0.0000 0.0000 0.0100 0.0100 ;",
        "END",
    ];
    assert!(lines.windows(4).any(|w| w == port));
    assert!(!lines.contains(&"OBS"));
    assert_eq!(summary.macros, vec!["pad".to_string()]);
    assert!(summary.warnings.is_empty());
    Ok(())
}

#[test]
fn pin_index_gap() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("gap");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    cell.add_tile(Tile::new(Rect::new(100, 0, 110, 10), t.m1));
    cell.add_pin(Pin::new("two", Rect::new(100, 0, 110, 10), t.m1).index(2));
    cell.add_pin(Pin::new("zero", Rect::new(0, 0, 10, 10), t.m1).index(0));
    lib.add_cell(cell);

    let (s, summary) = export(&lib, "gap", no_tech())?;
    let pins: Vec<&str> = lines(&s).into_iter().filter(|l| l.starts_with("PIN ")).collect();
    assert_eq!(pins, vec!["PIN zero", "PIN two"]);
    assert!(summary.warnings.is_empty());
    assert!(summary.failed.is_empty());
    Ok(())
}

#[test]
fn duplicate_pin_index() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("dup");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    cell.add_tile(Tile::new(Rect::new(100, 0, 110, 10), t.m2));
    cell.add_pin(Pin::new("p", Rect::new(0, 0, 10, 10), t.m1).index(3));
    cell.add_pin(Pin::new("q", Rect::new(100, 0, 110, 10), t.m2).index(3));
    lib.add_cell(cell);

    let (s, summary) = export(&lib, "dup", no_tech())?;
    assert_eq!(summary.macros, vec!["dup".to_string()]);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("Port index 3"));
    // Both pins still get their own geometry
    let lines = lines(&s);
    assert_eq!(lines.iter().filter(|l| **l == "PORT").count(), 2);
    assert!(lines.contains(&"LAYER metal1 ;"));
    assert!(lines.contains(&"LAYER metal2 ;"));
    Ok(())
}

#[test]
fn area_conservation() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);

    let mut leaf = Cell::new("leaf");
    leaf.add_tile(Tile::new(Rect::new(0, 0, 40, 10), t.m1));
    leaf.add_tile(Tile::split(Rect::new(40, 0, 50, 10), t.m1, Side::Left, Diagonal::Rising));
    leaf.add_tile(Tile::split(Rect::new(40, 0, 50, 10), t.m2, Side::Right, Diagonal::Rising));
    leaf.add_tile(Tile::new(Rect::new(0, 20, 30, 30), t.poly));
    let leaf = lib.add_cell(leaf);

    let mut top = Cell::new("top");
    top.add_tile(Tile::new(Rect::new(0, 100, 10, 200), t.m1));
    top.add_tile(Tile::new(Rect::new(0, 190, 10, 200), t.via1));
    top.add_tile(Tile::new(Rect::new(0, 190, 80, 200), t.m2));
    top.add_tile(Tile::new(Rect::new(200, 100, 210, 200), t.m2));
    top.add_pin(Pin::new("a", Rect::new(5, 150, 5, 150), t.m1));
    top.add_pin(Pin::new("g", Rect::new(0, 20, 30, 30), t.poly));
    top.add_inst("i0", leaf, Point::new(0, 0), false);
    top.add_inst("i1", leaf, Point::new(0, 60), true);
    let top = lib.add_cell(top);

    let (s, summary) = export(&lib, "top", no_tech())?;
    assert!(summary.failed.is_empty());
    let top_block = s.split("MACRO top").nth(1).ok_or("no top macro")?;

    // Union of the routing geometry, doubled. Plane one: both leaf copies of metal
    // and its split half, plus the top metal with the contact painted over its end.
    // Plane two: both split halves, and the two top metal2 shapes.
    let plane1 = 2 * (400 + 50) + 1000;
    let plane2 = 2 * 50 + 800 + 1000;
    let expected = 2 * (plane1 + plane2);
    assert_eq!(record_area2(top_block), expected);
    // The flattened cell holds the same area, all but the poly
    let flat: TilePlane = lib.flatten(top)?;
    let flat_area2: i128 = flat
        .tiles()
        .iter()
        .filter(|tile| tile.layer != t.poly)
        .map(|tile| tile.area2())
        .sum();
    assert_eq!(flat_area2, expected);

    // Pin `a` claims the via and the metal2 it connects to
    let lines = lines(top_block);
    let pin_a = lines.iter().position(|l| *l == "PIN a").ok_or("pin a")?;
    let end_a = lines.iter().position(|l| *l == "END a").ok_or("end a")?;
    assert!(lines[pin_a..end_a].contains(&"RECT 0.0000 0.1900 0.0800 0.2000 ;"));
    // The poly pin has no port
    let pin_g = lines.iter().position(|l| *l == "PIN g").ok_or("pin g")?;
    assert_eq!(lines[pin_g + 1], "END g");
    Ok(())
}

#[test]
fn overlapping_instances() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut leaf = Cell::new("leaf");
    leaf.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let leaf = lib.add_cell(leaf);
    let mut top = Cell::new("top");
    top.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    top.add_inst("i0", leaf, Point::new(5, 0), false);
    lib.add_cell(top);

    let (s, _) = export(&lib, "top", no_tech())?;
    let top_block = s.split("MACRO top").nth(1).ok_or("no top macro")?;
    let rects: Vec<&str> = lines(top_block).into_iter().filter(|l| l.starts_with("RECT")).collect();
    assert_eq!(
        rects,
        vec![
            "RECT 0.0000 0.0000 0.0050 0.0100 ;",
            "RECT 0.0050 0.0000 0.0150 0.0100 ;",
        ]
    );
    // Each point of the overlap is reported once
    assert_eq!(record_area2(top_block), 2 * 150);
    Ok(())
}

#[test]
fn layer_statements_on_change() -> LefResult<()> {
    init_logging();
    let (mut tech, t) = tech()?;
    // A contact drawn on the metal2 plane, reported as metal1
    let via2 = tech.add_type("via1top", 2, &[t.m1, t.m2]);
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("c");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    cell.add_tile(Tile::new(Rect::new(10, 0, 20, 10), t.m1));
    cell.add_tile(Tile::new(Rect::new(15, 2, 18, 8), via2));
    cell.add_tile(Tile::new(Rect::new(14, 8, 30, 40), t.m2));
    cell.add_pin(Pin::new("a", Rect::new(1, 1, 2, 2), t.m1));
    lib.add_cell(cell);

    let (s, summary) = export(&lib, "c", no_tech())?;
    assert!(summary.warnings.is_empty());
    let lines = lines(&s);
    let port_at = lines.iter().position(|l| *l == "PORT").ok_or("no port")?;
    let port = [
        "PORT",
        "LAYER metal1 ;",
        "RECT 0.0000 0.0000 0.0100 0.0100 ;",
        "RECT 0.0100 0.0000 0.0200 0.0100 ;",
        "LAYER metal2 ;",
        "RECT 0.0140 0.0080 0.0300 0.0400 ;",
        "LAYER metal1 ;",
        "RECT 0.0150 0.0020 0.0180 0.0080 ;",
        "END",
    ];
    assert_eq!(&lines[port_at..port_at + port.len()], &port[..]);
    assert!(!lines.contains(&"OBS"));
    Ok(())
}

#[test]
fn split_polygons() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("tri");
    let rect = Rect::new(0, 0, 30, 20);
    cell.add_tile(Tile::split(rect, t.m1, Side::Right, Diagonal::Falling));
    cell.add_tile(Tile::split(Rect::new(100, 0, 130, 20), t.m2, Side::Left, Diagonal::Rising));
    lib.add_cell(cell);

    let (s, _) = export(&lib, "tri", no_tech())?;
    let polys: Vec<&str> = lines(&s).into_iter().filter(|l| l.starts_with("POLYGON")).collect();
    assert_eq!(
        polys,
        vec![
            // Upper-right half of a falling split
            "POLYGON 0.0000 0.0200 0.0300 0.0200 0.0300 0.0000 ;",
            // Upper-left half of a rising split
            "POLYGON 0.1000 0.0200 0.1300 0.0200 0.1000 0.0000 ;",
        ]
    );
    for poly in polys {
        let words: Vec<&str> = poly.trim_end_matches(" ;").split_whitespace().collect();
        assert_eq!(words.len(), 7);
        let v: Vec<i128> = words[1..].iter().map(|w| units(w)).collect();
        let pts: Vec<(i128, i128)> = v.chunks(2).map(|c| (c[0], c[1])).collect();
        // Clockwise, enclosing half the rectangle
        assert_eq!(shoelace2(&pts), -rect.area());
    }
    Ok(())
}

#[test]
fn layer_header_once() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut leaf = Cell::new("leaf");
    leaf.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let leaf = lib.add_cell(leaf);
    let mut top = Cell::new("top");
    top.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    top.add_inst("i0", leaf, Point::new(20, 0), false);
    top.add_inst("i1", leaf, Point::new(40, 0), false);
    lib.add_cell(top);

    let (s, _) = export(&lib, "top", ExportOptions::default())?;
    let lines = lines(&s);
    for name in ["metal1", "metal2", "via1"] {
        let block = format!("LAYER {}", name);
        assert_eq!(lines.iter().filter(|l| **l == block).count(), 1);
    }
    assert!(!lines.contains(&"LAYER boundary"));
    Ok(())
}

#[test]
fn descendants_first() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut leaf = Cell::new("leaf");
    leaf.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let leaf = lib.add_cell(leaf);
    let mut mid = Cell::new("mid");
    mid.add_inst("l0", leaf, Point::new(0, 0), false);
    let mid = lib.add_cell(mid);
    let mut top = Cell::new("top");
    top.add_inst("m0", mid, Point::new(0, 0), false);
    top.add_inst("l0", leaf, Point::new(100, 0), false);
    lib.add_cell(top);

    let (s, summary) = export(&lib, "top", no_tech())?;
    assert_eq!(summary.macros, vec!["leaf", "mid", "top"]);
    let leaf_at = s.find("MACRO leaf").ok_or("leaf")?;
    let mid_at = s.find("MACRO mid").ok_or("mid")?;
    let top_at = s.find("MACRO top").ok_or("top")?;
    assert!(leaf_at < mid_at && mid_at < top_at);
    assert_eq!(s.matches("MACRO leaf").count(), 1);

    let opts = ExportOptions {
        write_top_cell: false,
        ..no_tech()
    };
    let (s, summary) = export(&lib, "top", opts)?;
    assert_eq!(summary.macros, vec!["leaf", "mid"]);
    assert!(!s.contains("MACRO top"));
    Ok(())
}

#[test]
fn interrupted() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("c");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let key = lib.add_cell(cell);

    let exporter = LefExporter::new(&lib, no_tech());
    exporter.interrupt().set();
    let mut buf = Vec::new();
    let summary = exporter.write_hierarchy(key, &mut buf)?;
    let s = String::from_utf8_lossy(&buf);
    assert!(summary.interrupted);
    assert!(summary.macros.is_empty());
    assert!(!s.contains("MACRO"));
    assert!(s.ends_with("END LIBRARY ;\n"));
    Ok(())
}

#[test]
fn failed_macro_is_omitted() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let gone = lib.add_cell(Cell::new("gone"));
    lib.cells.remove(gone);

    let mut good = Cell::new("good");
    good.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let good = lib.add_cell(good);
    let mut bad = Cell::new("bad");
    bad.add_inst("x", gone, Point::new(0, 0), false);
    let bad = lib.add_cell(bad);
    let mut top = Cell::new("top");
    top.add_inst("g", good, Point::new(0, 0), false);
    top.add_inst("b", bad, Point::new(0, 0), false);
    lib.add_cell(top);

    let (s, summary) = export(&lib, "top", no_tech())?;
    assert_eq!(summary.macros, vec!["good"]);
    let failed: Vec<&str> = summary.failed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(failed, vec!["bad", "top"]);
    match &summary.failed[0].1 {
        LefError::Export { stack, .. } => {
            assert!(stack.contains(&ErrorContext::Cell("bad".into())));
        }
        other => panic!("Expected an export error, got {:?}", other),
    }
    assert!(s.contains("MACRO good"));
    assert!(!s.contains("MACRO bad"));
    assert!(s.ends_with("END LIBRARY ;\n"));
    Ok(())
}

#[test]
fn boundary_layer_sets_size() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("cell");
    cell.add_tile(Tile::new(Rect::new(-100, -50, 300, 250), t.bound));
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    cell.set_prop(PROP_CLASS, "CORE");
    cell.set_prop(PROP_SYMMETRY, "X Y R90");
    lib.add_cell(cell);

    let (s, _) = export(&lib, "cell", no_tech())?;
    let lines = lines(&s);
    assert!(lines.contains(&"CLASS CORE ;"));
    assert!(lines.contains(&"ORIGIN 0.1000 0.0500 ;"));
    assert!(lines.contains(&"SIZE 0.4000 BY 0.3000 ;"));
    assert!(lines.contains(&"SYMMETRY X Y R90 ;"));
    // Boundary geometry is never an obstruction
    assert!(!s.contains("boundary"));
    Ok(())
}

#[test]
fn sanitized_pin_names() -> LefResult<()> {
    init_logging();
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("c");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    cell.add_pin(Pin::new("vdd!#1", Rect::new(0, 0, 10, 10), t.m1).usage(PinUse::Power));
    lib.add_cell(cell);

    let (s, _) = export(&lib, "c", no_tech())?;
    let lines = lines(&s);
    assert!(lines.contains(&"PIN vdd!_1"));
    assert!(lines.contains(&"USE POWER ;"));
    assert!(lines.contains(&"END vdd!_1"));
    Ok(())
}

#[test]
fn export_to_file() -> LefResult<()> {
    init_logging();
    let dir = tempfile::tempdir()?;
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("inv");
    cell.file = Some(PathBuf::from("layout/inv_x1.mag"));
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let key = lib.add_cell(cell);

    let opts = ExportOptions {
        output_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let exporter = LefExporter::new(&lib, opts);
    let summary = exporter.export_hierarchy(key)?;
    let path = dir.path().join("inv_x1.lef");
    assert_eq!(summary.path.as_deref(), Some(path.as_path()));
    let s = std::fs::read_to_string(&path)?;
    assert!(s.starts_with("VERSION 5.3 ;"));
    assert!(s.contains("LAYER metal1\n"));
    assert!(s.contains("MACRO inv\n"));
    assert!(s.ends_with("END LIBRARY ;\n"));
    Ok(())
}

#[test]
fn output_path_retry() -> LefResult<()> {
    init_logging();
    let dir = tempfile::tempdir()?;
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("inv");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let key = lib.add_cell(cell);

    let opts = ExportOptions {
        output_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let exporter = LefExporter::new(&lib, opts);
    // No such directory: falls back to `inv.lef`
    let summary = exporter.write_cell(key, Some(Path::new("missing/out.lef")), false)?;
    assert_eq!(summary.path, Some(dir.path().join("inv.lef")));
    assert!(dir.path().join("inv.lef").exists());
    Ok(())
}

#[test]
fn single_cell_files() -> LefResult<()> {
    init_logging();
    let dir = tempfile::tempdir()?;
    let (tech, t) = tech()?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("buf");
    cell.add_tile(Tile::new(Rect::new(0, 0, 10, 10), t.m1));
    let key = lib.add_cell(cell);
    let exporter = LefExporter::new(&lib, ExportOptions::default());

    let child = dir.path().join("child.lef");
    exporter.write_cell(key, Some(child.as_path()), false)?;
    let s = std::fs::read_to_string(&child)?;
    assert!(s.starts_with("MACRO buf\n"));
    assert!(!s.contains("VERSION"));
    assert!(!s.contains("END LIBRARY"));

    let root = dir.path().join("root.lef");
    exporter.write_cell(key, Some(root.as_path()), true)?;
    let s = std::fs::read_to_string(&root)?;
    assert!(s.starts_with("VERSION 5.3 ;"));
    assert!(s.contains("LAYER metal1\n"));
    assert!(s.contains("MACRO buf\n"));
    assert!(!s.contains("END LIBRARY"));
    Ok(())
}

#[test]
fn load_config_files() -> LefResult<()> {
    init_logging();
    let dir = tempfile::tempdir()?;
    let tech_path = dir.path().join("tech.yaml");
    std::fs::write(
        &tech_path,
        r#"
name: demo
types:
  - { name: m1, plane: 1 }
  - { name: m2, plane: 2 }
  - { name: via1, plane: 1, residues: [m1, m2] }
lef_layers:
  - name: metal1
    layer: m1
    class: { type: Routing, width: 100, direction: Horizontal }
  - name: metal2
    layer: m2
    class: { type: Routing, width: 140, direction: Vertical }
  - name: via1
    layer: via1
    class: { type: Cut }
"#,
    )?;
    let spec = TechSpec::load(&tech_path)?;
    let tech = Technology::from_spec(&spec)?;
    assert_eq!(tech.names.len(), 3);

    let opts = ExportOptions {
        write_top_cell: false,
        write_tech: true,
        output_dir: Some(dir.path().to_path_buf()),
    };
    let opts_path = dir.path().join("opts.json");
    opts.save(SerializationFormat::Json, &opts_path)?;
    assert_eq!(ExportOptions::load(&opts_path)?, opts);

    // And export with the loaded technology
    let m1 = tech.type_id("m1").ok_or("m1")?;
    let mut lib = Library::new("lib", tech);
    let mut cell = Cell::new("c");
    cell.add_tile(Tile::new(Rect::new(0, 0, 100, 100), m1));
    lib.add_cell(cell);
    let (s, _) = export(&lib, "c", ExportOptions::default())?;
    assert!(s.contains("WIDTH 0.100000 ;"));
    assert!(s.contains("DIRECTION HORIZONTAL ;"));
    Ok(())
}
