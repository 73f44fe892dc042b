//!
//! # Hierarchy Export Scheduling
//!
//! Orders a cell hierarchy so that every cell is written after all of its descendants,
//! and drives the header, layer and macro emitters over that order,
//! to a file or to any [Write] destination.
//!

// Std-Lib
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Crates.io
use log::{error, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::cell::{Cell, CellKey, Library};
use crate::error::{LefError, LefResult};
use crate::macros::{write_macro, Scratch};
use crate::plane::{TileDatabase, TilePlane};
use crate::utils::{DepOrder, SerdeFile};
use crate::write::LefWriter;

///
/// # Export Options
///
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct ExportOptions {
    /// Write the root cell's own macro, in addition to its descendants
    pub write_top_cell: bool,
    /// Write the technology layer header
    pub write_tech: bool,
    /// Directory for output files. Defaults to alongside each cell's source file, or the working directory.
    pub output_dir: Option<PathBuf>,
}
impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            write_top_cell: true,
            write_tech: true,
            output_dir: None,
        }
    }
}
impl SerdeFile for ExportOptions {}

/// # Interrupt Handle
/// Cloneable cancellation flag, checked before each macro is started.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);
impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }
    /// Request that the export stop
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// # Export Summary
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Output file, if exported to one
    pub path: Option<PathBuf>,
    /// Names of the macros written, in order
    pub macros: Vec<String>,
    /// Names of the macros which failed and were omitted, with their errors
    pub failed: Vec<(String, LefError)>,
    /// Warnings raised along the way
    pub warnings: Vec<String>,
    /// Whether the export was interrupted before writing every macro
    pub interrupted: bool,
}

///
/// # Hierarchy Order
///
/// [DepOrder] implementation over the instances of a [Library].
/// Internal cells are skipped, as are instances of unknown cells,
/// which fail when their parent is flattened.
/// Instances closing a cycle are skipped with a warning.
///
struct HierarchyOrder<'l> {
    lib: &'l Library,
    warnings: RefCell<Vec<String>>,
}
impl DepOrder for HierarchyOrder<'_> {
    type Item = CellKey;
    type Error = LefError;

    fn deps(&self, item: &CellKey) -> LefResult<Vec<CellKey>> {
        let cell = self.lib.cell(*item)?;
        let deps = cell
            .insts
            .iter()
            .map(|inst| inst.cell)
            .filter(|key| match self.lib.cells.get(*key) {
                Some(c) => !c.internal,
                None => false,
            })
            .collect();
        Ok(deps)
    }
    fn cycle(&self, item: &CellKey) -> LefResult<()> {
        let name = self.lib.cell(*item)?.name.clone();
        let msg = format!("Cell `{}` instantiates itself, skipping the cyclic instance", name);
        warn!("{}", msg);
        self.warnings.borrow_mut().push(msg);
        Ok(())
    }
}

/// Order the hierarchy under `root` for export: every cell after all of its descendants, `root` last.
/// Returns the order, and any warnings raised.
pub fn hierarchy_order(lib: &Library, root: CellKey) -> LefResult<(Vec<CellKey>, Vec<String>)> {
    if lib.cell(root)?.internal {
        return Ok((Vec::new(), Vec::new()));
    }
    let orderer = HierarchyOrder {
        lib,
        warnings: RefCell::new(Vec::new()),
    };
    let order = orderer.order(&[root])?;
    Ok((order, orderer.warnings.into_inner()))
}

///
/// # LEF Exporter
///
/// Exports cells of a [Library], using tile database `D` for scratch geometry.
///
pub struct LefExporter<'l, D: TileDatabase = TilePlane> {
    lib: &'l Library,
    opts: ExportOptions,
    interrupt: Interrupt,
    db: PhantomData<D>,
}
impl<'l> LefExporter<'l> {
    /// Create a new [LefExporter], with the in-memory [TilePlane] database
    pub fn new(lib: &'l Library, opts: ExportOptions) -> Self {
        Self::with_database(lib, opts)
    }
}
impl<'l, D: TileDatabase> LefExporter<'l, D> {
    /// Create a new [LefExporter] with tile database `D`
    pub fn with_database(lib: &'l Library, opts: ExportOptions) -> Self {
        Self {
            lib,
            opts,
            interrupt: Interrupt::new(),
            db: PhantomData,
        }
    }
    /// Use interrupt handle `interrupt`
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }
    /// Get a handle to our interrupt flag
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }
    /// Export the hierarchy rooted at `root` to a file, named for `root` and placed per our [ExportOptions]
    pub fn export_hierarchy(&self, root: CellKey) -> LefResult<ExportSummary> {
        let cell = self.lib.cell(root)?;
        let (file, path) = self.open_output(cell, None)?;
        info!(
            "Generating LEF output {} for hierarchy rooted at cell `{}`",
            path.display(),
            cell.name
        );
        let mut summary = self.write_hierarchy(root, BufWriter::new(file))?;
        summary.path = Some(path);
        Ok(summary)
    }
    /// Write the hierarchy rooted at `root` to `dest`.
    ///
    /// Macros which fail are logged, recorded in the returned summary, and omitted.
    /// Once interrupted, no further macros are started, but the library is still closed.
    pub fn write_hierarchy(&self, root: CellKey, dest: impl Write) -> LefResult<ExportSummary> {
        let tech = self.lib.tech.read()?;
        let (order, warnings) = hierarchy_order(self.lib, root)?;
        let mut summary = ExportSummary {
            warnings,
            ..Default::default()
        };
        let mut out = LefWriter::new(dest);
        out.write_header()?;
        if self.opts.write_tech {
            out.write_layers(&tech)?;
        }
        let mut scratch = Scratch::<D>::default();
        for key in order.into_iter() {
            if self.interrupt.is_set() {
                warn!("LEF export interrupted");
                summary.interrupted = true;
                break;
            }
            if key == root && !self.opts.write_top_cell {
                continue;
            }
            let name = self.lib.cell(key)?.name.clone();
            match write_macro(&mut out, self.lib, &tech, key, &mut scratch, &mut summary.warnings) {
                Ok(()) => summary.macros.push(name),
                Err(e) => {
                    error!("Failed to write macro `{}`: {}", name, e);
                    summary.failed.push((name, e));
                }
            }
        }
        out.write_end_library()?;
        Ok(summary)
    }
    /// Export the single cell `key` to a file.
    ///
    /// The file is named `out_path` if provided, and otherwise per our [ExportOptions].
    /// Root cells (`is_root`) are preceded by the library header, and by the layer header if configured.
    /// No `END LIBRARY` is written.
    pub fn write_cell(&self, key: CellKey, out_path: Option<&Path>, is_root: bool) -> LefResult<ExportSummary> {
        let tech = self.lib.tech.read()?;
        let cell = self.lib.cell(key)?;
        let (file, path) = self.open_output(cell, out_path)?;
        info!("Generating LEF output {} for cell `{}`", path.display(), cell.name);

        let mut out = LefWriter::new(BufWriter::new(file));
        if is_root {
            out.write_header()?;
            if self.opts.write_tech {
                out.write_layers(&tech)?;
            }
        }
        let mut summary = ExportSummary {
            path: Some(path),
            ..Default::default()
        };
        let mut scratch = Scratch::<D>::default();
        write_macro(&mut out, self.lib, &tech, key, &mut scratch, &mut summary.warnings)?;
        out.flush()?;
        summary.macros.push(cell.name.clone());
        Ok(summary)
    }
    /// Get the output path for `cell`: `explicit` if provided,
    /// else its source path with a `lef` extension, else `<name>.lef`;
    /// placed in our output directory if one is set.
    pub fn output_path(&self, cell: &Cell, explicit: Option<&Path>) -> PathBuf {
        let path = match (explicit, &cell.file) {
            (Some(p), _) if p.extension().is_some() => p.to_path_buf(),
            (Some(p), _) => p.with_extension("lef"),
            (None, Some(src)) => src.with_extension("lef"),
            (None, None) => PathBuf::from(format!("{}.lef", cell.name)),
        };
        match &self.opts.output_dir {
            Some(dir) if explicit.is_none() => match path.file_name() {
                Some(fname) => dir.join(fname),
                None => dir.join(format!("{}.lef", cell.name)),
            },
            Some(dir) => dir.join(path),
            None => path,
        }
    }
    /// Create the output file for `cell`.
    /// If the derived path cannot be created, retry with `<name>.lef`.
    fn open_output(&self, cell: &Cell, explicit: Option<&Path>) -> LefResult<(File, PathBuf)> {
        let path = self.output_path(cell, explicit);
        let err = match File::create(&path) {
            Ok(f) => return Ok((f, path)),
            Err(e) => e,
        };
        let fallback = match &self.opts.output_dir {
            Some(dir) => dir.join(format!("{}.lef", cell.name)),
            None => PathBuf::from(format!("{}.lef", cell.name)),
        };
        if fallback == path {
            return Err(err.into());
        }
        warn!(
            "Cannot open output file {} ({}), using {}",
            path.display(),
            err,
            fallback.display()
        );
        let f = File::create(&fallback)?;
        Ok((f, fallback))
    }
}
