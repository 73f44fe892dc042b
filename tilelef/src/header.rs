//!
//! # Layer Header Emission
//!
//! Writes one `LAYER ... END` block per reportable LEF layer record,
//! in name-table order, however many names refer to the record.
//!

// Std-Lib
use std::collections::HashSet;

// Crates.io
use log::debug;

// Local imports
use crate::error::{ErrorContext, LefError, LefResult};
use crate::tech::{LefClass, LefLayer, Technology};
use crate::write::{microns, square_microns, LefWriter};

impl<'wr> LefWriter<'wr> {
    /// Write the layer header for `tech`. Returns the number of layers written.
    ///
    /// Obstruction-only records (those without an internal type) are skipped,
    /// as are generated vias and boundary layers.
    pub fn write_layers(&mut self, tech: &Technology) -> LefResult<usize> {
        let mut emitted = HashSet::new();
        let mut count = 0;
        for (name, key) in tech.names.iter() {
            if !emitted.insert(*key) {
                continue; // Alias of a layer already written
            }
            let layer = match tech.lef_layers.get(*key) {
                Some(l) => l,
                None => {
                    let msg = format!("Layer name `{}` refers to no layer record", name);
                    return Err(header_error(msg));
                }
            };
            if layer.layer.is_none() {
                continue;
            }
            if matches!(layer.class, LefClass::Via | LefClass::Boundary) {
                continue;
            }
            self.write_layer(layer)?;
            count += 1;
        }
        debug!("Wrote {} layers for technology `{}`", count, tech.name);
        Ok(count)
    }
    /// Write a single [LefLayer] block
    fn write_layer(&mut self, layer: &LefLayer) -> LefResult<()> {
        self.write_line(format_args!("LAYER {}", layer.name))?;
        self.indent += 1;
        match layer.class {
            LefClass::Cut { area } => {
                self.write_line(format_args!("TYPE CUT ;"))?;
                if let Some(area) = area {
                    let area = i64::try_from(area.area()).map_err(|_| {
                        header_error(format!("Cut area of layer `{}` is out of range", layer.name))
                    })?;
                    if area > 0 {
                        self.write_line(format_args!("CUT AREA {:.6} ;", square_microns(area)))?;
                    }
                }
            }
            LefClass::Routing(ref route) => {
                self.write_line(format_args!("TYPE ROUTING ;"))?;
                if route.pitch > 0 {
                    self.write_line(format_args!("PITCH {:.6} ;", microns(route.pitch)))?;
                }
                if route.width > 0 {
                    self.write_line(format_args!("WIDTH {:.6} ;", microns(route.width)))?;
                }
                if route.spacing > 0 {
                    self.write_line(format_args!("SPACING {:.6} ;", microns(route.spacing)))?;
                }
                // Direction is only meaningful alongside a width
                if route.width > 0 {
                    self.write_line(format_args!("DIRECTION {} ;", route.direction))?;
                }
            }
            LefClass::Masterslice => self.write_line(format_args!("TYPE MASTERSLICE ;"))?,
            LefClass::Overlap => self.write_line(format_args!("TYPE OVERLAP ;"))?,
            LefClass::Via | LefClass::Boundary => (),
        }
        self.indent -= 1;
        self.write_line(format_args!("END {}", layer.name))?;
        self.write_blank()?;
        Ok(())
    }
}

/// Create an error raised while writing the layer header
fn header_error(message: String) -> LefError {
    LefError::Export {
        message,
        stack: vec![ErrorContext::Header],
    }
}
