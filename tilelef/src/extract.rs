//!
//! # Geometry Extraction
//!
//! Partitions a flattened cell's routing geometry into per-pin port records
//! and leftover obstruction records.
//!
//! Each pin claims the net connected to its label, from whatever geometry earlier pins left unclaimed.
//! Claimed tiles are subtracted from the remaining geometry,
//! so that no tile is reported by two pins, or by a pin and the obstructions.
//! Split tiles become three-vertex polygons; everything else becomes rectangles.
//!

// Crates.io
use log::trace;

// Local imports
use crate::cell::Pin;
use crate::geom::{Point, Rect};
use crate::plane::{LayerMask, SearchFlow, Tile, TileDatabase};
use crate::tech::{LayerId, LefClass, Technology};

/// # Extracted Record Shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordShape {
    Rect(Rect),
    /// Triangle, in clockwise order
    Polygon([Point; 3]),
}

/// # Extracted Record Role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRole {
    /// Port geometry of the named pin
    Port(String),
    Obstruction,
}

/// # Extracted Record
/// One LEF shape, on LEF layer `layer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub layer: String,
    pub shape: RecordShape,
    pub role: RecordRole,
}

/// Grow zero-width and zero-height rectangles by one unit on each side of their degenerate dimension(s)
pub fn grow_degenerate(rect: &Rect) -> Rect {
    let mut r = *rect;
    if r.width() == 0 {
        r.p0.x -= 1;
        r.p1.x += 1;
    }
    if r.height() == 0 {
        r.p0.y -= 1;
        r.p1.y += 1;
    }
    r
}

///
/// # Geometry Extractor
///
/// Holds the routing set for one macro: the types reported in LEF geometry.
///
#[derive(Debug)]
pub struct Extractor<'t> {
    tech: &'t Technology,
    routing: LayerMask,
}
impl<'t> Extractor<'t> {
    /// Create an [Extractor] for a cell with pins `pins`.
    ///
    /// The routing set includes the types of all routing, cut and via records, and any contact residues thereof,
    /// the obstruction types of every record, and the types of any `pins` with a LEF mapping.
    pub fn new(tech: &'t Technology, pins: &[Pin]) -> Self {
        let mut routing = LayerMask::new();
        for lef in tech.lef_layers.values() {
            if let Some(id) = lef.layer {
                if matches!(lef.class, LefClass::Routing(_) | LefClass::Cut { .. } | LefClass::Via) {
                    routing.insert(id);
                    for residue in tech.residues(id) {
                        routing.insert(*residue);
                    }
                }
            }
            if let Some(obs) = lef.obs {
                routing.insert(obs);
            }
        }
        for pin in pins.iter() {
            if tech.lef_layer_for(pin.layer).is_some() {
                routing.insert(pin.layer);
            }
        }
        Self { tech, routing }
    }
    /// Boolean indication of whether type `id` is in the routing set
    pub fn is_routing(&self, id: LayerId) -> bool {
        self.routing.contains(id)
    }
    /// Resolve type `id` to the routing type it is reported as, if any.
    /// Contacts resolve to their first residue which is both routing and LEF-mapped.
    pub fn resolve(&self, id: LayerId) -> Option<LayerId> {
        let reportable = |t: LayerId| self.routing.contains(t) && self.tech.lef_layer_for(t).is_some();
        if self.tech.is_contact(id) {
            return self.tech.residues(id).iter().copied().find(|r| reportable(*r));
        }
        match reportable(id) {
            true => Some(id),
            false => None,
        }
    }
    /// Extract the port of `pin` from `remaining`, using scratch buffer `yank`.
    /// The selected net is subtracted from `remaining`.
    ///
    /// Returns `None` if the pin's layer is not a routing layer,
    /// in which case nothing is selected or subtracted.
    pub fn extract_pin<D: TileDatabase>(
        &self,
        pin: &Pin,
        remaining: &mut D,
        yank: &mut D,
    ) -> Option<Vec<ExtractedRecord>> {
        if !self.is_routing(pin.layer) {
            trace!("Pin `{}` is not on a routing layer", pin.name);
            return None;
        }
        let seed = grow_degenerate(&pin.rect);
        let selection = remaining.select_net(self.tech, &seed, pin.layer);
        let records = self.extract(&selection, yank, &RecordRole::Port(pin.name.clone()));
        remaining.subtract(&selection);
        Some(records)
    }
    /// Extract everything left in `remaining` as obstructions
    pub fn extract_obstructions<D: TileDatabase>(&self, remaining: &D, yank: &mut D) -> Vec<ExtractedRecord> {
        self.extract(remaining, yank, &RecordRole::Obstruction)
    }
    /// Extract records of role `role` for all routing geometry in `source`.
    ///
    /// Plane by plane: copy each reportable tile into `yank` under its resolved type,
    /// then scan `yank` in scan order, producing one record per tile, and clear it.
    fn extract<D: TileDatabase>(&self, source: &D, yank: &mut D, role: &RecordRole) -> Vec<ExtractedRecord> {
        let mut records = Vec::new();
        let everything = Rect::everything();
        let all = self.tech.all_types();
        for plane in 0..self.tech.num_planes() {
            source.search_area(&everything, &self.tech.plane_types(plane), |tile| {
                if let Some(layer) = self.resolve(tile.layer) {
                    yank.paint(self.tech, tile.with_layer(layer));
                }
                SearchFlow::Continue
            });
            yank.search_area(&everything, &all, |tile| {
                if let Some(record) = self.record(tile, role) {
                    records.push(record);
                }
                SearchFlow::Continue
            });
            yank.clear();
        }
        records
    }
    /// Create the record for (resolved) `tile`
    fn record(&self, tile: &Tile, role: &RecordRole) -> Option<ExtractedRecord> {
        let lef = self.tech.lef_layer_for(tile.layer)?;
        let shape = match tile.split {
            None => RecordShape::Rect(tile.rect),
            Some(split) => RecordShape::Polygon(split.triangle(&tile.rect)),
        };
        Some(ExtractedRecord {
            layer: lef.name.clone(),
            shape,
            role: role.clone(),
        })
    }
}
