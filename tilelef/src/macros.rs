//!
//! # Macro Emission
//!
//! Writes one cell as a LEF `MACRO` block: class and source properties, boundary,
//! each pin with its port geometry, and the leftover obstructions.
//!
//! Each macro is rendered into its own buffer, and only copied to the output once complete,
//! so that a failing macro leaves no partial text behind.
//!

// Std-Lib
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

// Crates.io
use log::{debug, warn};

// Local imports
use crate::cell::{Cell, CellKey, Library, Pin, PROP_CLASS, PROP_SOURCE, PROP_SYMMETRY};
use crate::error::{LefError, LefResult};
use crate::extract::{ExtractedRecord, Extractor, RecordShape};
use crate::geom::Rect;
use crate::plane::TileDatabase;
use crate::sanitize::legal_name;
use crate::tech::Technology;
use crate::utils::{ErrorContext, ErrorHelper, Unwrapper};
use crate::write::{Coord, LefWriter};

/// # Scratch Geometry
/// The flattened copy of the macro being written, and the per-plane yank buffer.
#[derive(Debug, Default)]
pub struct Scratch<D> {
    pub flat: D,
    pub yank: D,
}

/// # Scratch Guard
/// Exclusive access to a [Scratch] for one macro. Clears both buffers when dropped, on every exit path.
pub struct ScratchGuard<'s, D: TileDatabase>(&'s mut Scratch<D>);
impl<'s, D: TileDatabase> ScratchGuard<'s, D> {
    pub fn new(scratch: &'s mut Scratch<D>) -> Self {
        scratch.flat.clear();
        scratch.yank.clear();
        Self(scratch)
    }
}
impl<'s, D: TileDatabase> Deref for ScratchGuard<'s, D> {
    type Target = Scratch<D>;
    fn deref(&self) -> &Self::Target {
        self.0
    }
}
impl<'s, D: TileDatabase> DerefMut for ScratchGuard<'s, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0
    }
}
impl<'s, D: TileDatabase> Drop for ScratchGuard<'s, D> {
    fn drop(&mut self) {
        self.0.flat.clear();
        self.0.yank.clear();
    }
}

/// # Pin Output Order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinOrder {
    /// Indices into the cell's pins, in output order
    pub order: Vec<usize>,
    /// Port indices used more than once, listed once per extra use
    pub duplicates: Vec<usize>,
}

/// Order `pins` for output.
///
/// If any pin has a port index, pins are written in ascending index order,
/// with pins sharing an index in declaration order, followed by any pins without an index.
/// Otherwise pins are written in declaration order.
pub fn pin_order(pins: &[Pin]) -> PinOrder {
    let mut by_index: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (n, pin) in pins.iter().enumerate() {
        if let Some(idx) = pin.index {
            by_index.entry(idx).or_default().push(n);
        }
    }
    if by_index.is_empty() {
        return PinOrder {
            order: (0..pins.len()).collect(),
            duplicates: Vec::new(),
        };
    }
    let mut rv = PinOrder::default();
    for (idx, ns) in by_index.into_iter() {
        for _ in 1..ns.len() {
            rv.duplicates.push(idx);
        }
        rv.order.extend(ns);
    }
    let unindexed = pins.iter().enumerate().filter(|(_, p)| p.index.is_none());
    rv.order.extend(unindexed.map(|(n, _)| n));
    rv
}

/// Write the cell at `key` as a LEF macro to `out`.
///
/// `scratch` is borrowed for the duration, and left empty on return.
/// Warnings (duplicate port indices, pins without geometry) are logged and appended to `warnings`.
/// On failure nothing is written to `out`.
pub fn write_macro<D: TileDatabase>(
    out: &mut LefWriter,
    lib: &Library,
    tech: &Technology,
    key: CellKey,
    scratch: &mut Scratch<D>,
    warnings: &mut Vec<String>,
) -> LefResult<()> {
    let cell = lib.cell(key)?;
    let mut buf = Vec::new();
    {
        let mut dest = LefWriter::new(&mut buf);
        let mut emitter = MacroEmitter {
            lib,
            tech,
            key,
            cell,
            out: &mut dest,
            scratch: ScratchGuard::new(scratch),
            warnings,
            stack: vec![
                ErrorContext::Library(lib.name.clone()),
                ErrorContext::Cell(cell.name.clone()),
            ],
        };
        emitter.emit()?;
    }
    out.write_raw(&buf)
}

/// # Macro Emitter
/// State for writing a single macro
struct MacroEmitter<'a, 'wr, D: TileDatabase> {
    lib: &'a Library,
    tech: &'a Technology,
    key: CellKey,
    cell: &'a Cell,
    out: &'a mut LefWriter<'wr>,
    scratch: ScratchGuard<'a, D>,
    warnings: &'a mut Vec<String>,
    stack: Vec<ErrorContext>,
}
impl<'a, 'wr, D: TileDatabase> MacroEmitter<'a, 'wr, D> {
    fn emit(&mut self) -> LefResult<()> {
        let cell = self.cell;
        debug!("Writing macro `{}`", cell.name);

        self.stack.push(ErrorContext::Geometry);
        self.lib.flatten_into(self.tech, self.key, &mut self.scratch.flat)?;
        self.stack.pop();
        let extractor = Extractor::new(self.tech, &cell.pins);

        self.out.write_line(format_args!("MACRO {}", cell.name))?;
        self.out.indent += 1;
        let class = cell.prop(PROP_CLASS).unwrap_or("BLOCK");
        self.out.write_line(format_args!("CLASS {} ;", class))?;
        if let Some(source) = cell.prop(PROP_SOURCE) {
            self.out.write_line(format_args!("SOURCE {} ;", source))?;
        }
        self.out.write_line(format_args!("FOREIGN {} ;", cell.name))?;
        let bound = self.boundary();
        self.out.write_line(format_args!(
            "ORIGIN {} {} ;",
            Coord(-bound.left()),
            Coord(-bound.bottom())
        ))?;
        self.out.write_line(format_args!(
            "SIZE {} BY {} ;",
            Coord(bound.width()),
            Coord(bound.height())
        ))?;
        if let Some(symmetry) = cell.prop(PROP_SYMMETRY) {
            self.out.write_line(format_args!("SYMMETRY {} ;", symmetry))?;
        }

        let order = pin_order(&cell.pins);
        for idx in order.duplicates.iter() {
            self.warn(format!(
                "Port index {} is used more than once in cell `{}`",
                idx, cell.name
            ));
        }
        for n in order.order.iter() {
            self.write_pin(&cell.pins[*n], &extractor)?;
        }
        self.write_obstructions(&extractor)?;

        self.out.indent -= 1;
        self.out.write_line(format_args!("END {}", cell.name))?;
        Ok(())
    }
    /// Get the macro boundary: the extent of the cell's own boundary-layer tiles if it has any,
    /// else its stored bounding box, else that of its flattened geometry.
    fn boundary(&self) -> Rect {
        let types = self.tech.boundary_types();
        let own = match types.is_empty() {
            true => None,
            false => self.cell.tiles_bbox(|t| types.contains(t.layer)),
        };
        own.or(self.cell.bbox)
            .or_else(|| self.scratch.flat.bbox())
            .unwrap_or(Rect::new(0, 0, 0, 0))
    }
    /// Write a [Pin] and its port geometry
    fn write_pin(&mut self, pin: &Pin, extractor: &Extractor) -> LefResult<()> {
        self.stack.push(ErrorContext::Pin(pin.name.clone()));
        let msg = format!("Pin `{}` is on an undefined layer type", pin.name);
        self.tech.layer_type(pin.layer).unwrapper(&*self, msg)?;

        let name = legal_name(&pin.name);
        self.out.write_line(format_args!("PIN {}", name))?;
        self.out.indent += 1;
        if let Some(dir) = pin.direction {
            self.out.write_line(format_args!("DIRECTION {} ;", dir))?;
        }
        if let Some(usage) = pin.usage {
            self.out.write_line(format_args!("USE {} ;", usage))?;
        }
        let records = {
            let Scratch { flat, yank } = &mut *self.scratch;
            extractor.extract_pin(pin, flat, yank)
        };
        match records {
            None => debug!("Pin `{}` has no routing layer, writing no port", pin.name),
            Some(records) if records.is_empty() => {
                let msg = format!(
                    "Pin `{}` of cell `{}` is not connected to any routing geometry",
                    pin.name, self.cell.name
                );
                self.warn(msg);
            }
            Some(records) => self.write_records("PORT", &records)?,
        }
        self.out.indent -= 1;
        self.out.write_line(format_args!("END {}", name))?;
        self.stack.pop();
        Ok(())
    }
    /// Write everything left unclaimed by the pins as obstructions
    fn write_obstructions(&mut self, extractor: &Extractor) -> LefResult<()> {
        self.stack.push(ErrorContext::Obstructions);
        let records = {
            let Scratch { flat, yank } = &mut *self.scratch;
            extractor.extract_obstructions(flat, yank)
        };
        if !records.is_empty() {
            self.write_records("OBS", &records)?;
        }
        self.stack.pop();
        Ok(())
    }
    /// Write a `PORT` or `OBS` block of `records`.
    /// `LAYER` statements are written only where the layer changes.
    fn write_records(&mut self, keyword: &str, records: &[ExtractedRecord]) -> LefResult<()> {
        self.out.write_line(format_args!("{}", keyword))?;
        self.out.indent += 1;
        let mut layer: Option<&str> = None;
        for record in records.iter() {
            if layer != Some(record.layer.as_str()) {
                self.out.write_line(format_args!("LAYER {} ;", record.layer))?;
                layer = Some(record.layer.as_str());
            }
            self.out.indent += 1;
            match record.shape {
                RecordShape::Rect(r) => self.out.write_line(format_args!(
                    "RECT {} {} {} {} ;",
                    Coord(r.left()),
                    Coord(r.bottom()),
                    Coord(r.right()),
                    Coord(r.top())
                ))?,
                RecordShape::Polygon([a, b, c]) => self.out.write_line(format_args!(
                    "POLYGON {} {} {} {} {} {} ;",
                    Coord(a.x),
                    Coord(a.y),
                    Coord(b.x),
                    Coord(b.y),
                    Coord(c.x),
                    Coord(c.y)
                ))?,
            }
            self.out.indent -= 1;
        }
        self.out.indent -= 1;
        self.out.write_line(format_args!("END"))?;
        Ok(())
    }
    /// Log and collect a warning
    fn warn(&mut self, msg: String) {
        warn!("{}", msg);
        self.warnings.push(msg);
    }
}
impl<'a, 'wr, D: TileDatabase> ErrorHelper for MacroEmitter<'a, 'wr, D> {
    type Error = LefError;
    fn err(&self, msg: impl Into<String>) -> LefError {
        LefError::Export {
            message: msg.into(),
            stack: self.stack.clone(),
        }
    }
}
