//!
//! # Layout Cells and Libraries
//!
//! [Cell]s hold their own tiles, pin labels, properties, and [Instance]s of other cells.
//! All cells live in a [Library] arena, keyed by [CellKey].
//!

// Std-Lib
use std::path::PathBuf;

// Crates.io
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// Local imports
use crate::error::{LefError, LefResult};
use crate::geom::{Point, Rect, Transform};
use crate::plane::{Tile, TileDatabase};
use crate::tech::{LayerId, Technology};
use crate::utils::{enumstr, EnumStr, ErrorContext, Ptr};

new_key_type! {
    /// Keys for [Cell] entries
    pub struct CellKey;
}

/// Property naming the macro's LEF `CLASS`
pub const PROP_CLASS: &str = "LEFclass";
/// Property naming the macro's LEF `SOURCE`
pub const PROP_SOURCE: &str = "LEFsource";
/// Property naming the macro's LEF `SYMMETRY`
pub const PROP_SYMMETRY: &str = "LEFsymmetry";

enumstr!(
    /// # Pin Signal Direction
    PinDirection {
        Input: "INPUT",
        Output: "OUTPUT",
        Tristate: "OUTPUT TRISTATE",
        Inout: "INOUT",
        Feedthru: "FEEDTHRU",
    }
);

enumstr!(
    /// # Pin Usage
    PinUse {
        Signal: "SIGNAL",
        Analog: "ANALOG",
        Power: "POWER",
        Ground: "GROUND",
        Clock: "CLOCK",
    }
);

///
/// # Pin Label
///
/// A named label attached to geometry of layer-type `layer` at `rect`.
/// Its port is everything electrically connected to that point.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Pin Name
    pub name: String,
    /// Label Rectangle. May be zero-width or zero-height.
    pub rect: Rect,
    /// Label Layer-Type
    pub layer: LayerId,
    pub direction: Option<PinDirection>,
    pub usage: Option<PinUse>,
    /// Port Index, setting the pin's output order
    pub index: Option<usize>,
}
impl Pin {
    /// Create a new [Pin] with no direction, usage, or index
    pub fn new(name: impl Into<String>, rect: Rect, layer: LayerId) -> Self {
        Self {
            name: name.into(),
            rect,
            layer,
            direction: None,
            usage: None,
            index: None,
        }
    }
    pub fn direction(mut self, dir: PinDirection) -> Self {
        self.direction = Some(dir);
        self
    }
    pub fn usage(mut self, usage: PinUse) -> Self {
        self.usage = Some(usage);
        self
    }
    pub fn index(mut self, idx: usize) -> Self {
        self.index = Some(idx);
        self
    }
}

/// # Instance of another [Cell]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Instance Name
    pub inst_name: String,
    /// Cell Definition Reference
    pub cell: CellKey,
    /// Location of the cell's origin
    pub loc: Point,
    /// Vertical reflection, applied before translation to `loc`
    pub reflect_vert: bool,
}
impl Instance {
    /// The [Transform] placing the instance's contents in its parent
    pub fn transform(&self) -> Transform {
        Transform::from_instance(&self.loc, self.reflect_vert)
    }
}

///
/// # Layout Cell
///
#[derive(Debug, Clone, Default)]
pub struct Cell {
    /// Cell Name
    pub name: String,
    /// Source file, if loaded from one
    pub file: Option<PathBuf>,
    /// Stored bounding box
    pub bbox: Option<Rect>,
    /// Own (non-instance) geometry
    pub tiles: Vec<Tile>,
    /// Pin labels, in declaration order
    pub pins: Vec<Pin>,
    /// Instances of other cells
    pub insts: Vec<Instance>,
    /// String-valued properties, including [PROP_CLASS], [PROP_SOURCE] and [PROP_SYMMETRY]
    pub props: IndexMap<String, String>,
    /// Marks transient, internal cells, which are never exported
    pub internal: bool,
}
impl Cell {
    /// Create a new and empty [Cell]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }
    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }
    /// Add an instance of `cell` named `inst_name` at `loc`
    pub fn add_inst(&mut self, inst_name: impl Into<String>, cell: CellKey, loc: Point, reflect_vert: bool) {
        self.insts.push(Instance {
            inst_name: inst_name.into(),
            cell,
            loc,
            reflect_vert,
        });
    }
    pub fn set_prop(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.props.insert(key.into(), val.into());
    }
    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(|s| s.as_str())
    }
    /// Bounding box of the cell's own tiles for which `filter` is true, if any
    pub fn tiles_bbox(&self, mut filter: impl FnMut(&Tile) -> bool) -> Option<Rect> {
        self.tiles
            .iter()
            .filter(|t| filter(t))
            .map(|t| t.rect)
            .reduce(|a, b| a.union(&b))
    }
}

///
/// # Cell Library
///
/// Arena of [Cell]s sharing a [Technology].
///
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Library Name
    pub name: String,
    /// Layer Technology
    pub tech: Ptr<Technology>,
    /// Cell Definitions
    pub cells: SlotMap<CellKey, Cell>,
}
impl Library {
    /// Create a new and empty [Library]
    pub fn new(name: impl Into<String>, tech: Technology) -> Self {
        Self {
            name: name.into(),
            tech: Ptr::new(tech),
            cells: SlotMap::with_key(),
        }
    }
    /// Add a [Cell], returning its key
    pub fn add_cell(&mut self, cell: Cell) -> CellKey {
        self.cells.insert(cell)
    }
    /// Get the key of the first cell named `name`
    pub fn cell_key(&self, name: &str) -> Option<CellKey> {
        self.cells
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(k, _)| k)
    }
    /// Get a cell by key, or fail
    pub fn cell(&self, key: CellKey) -> LefResult<&Cell> {
        self.cells.get(key).ok_or_else(|| LefError::Export {
            message: "Reference to unknown cell".into(),
            stack: vec![ErrorContext::Library(self.name.clone())],
        })
    }
    /// Flatten the cell at `key` and everything it instantiates into a new [TileDatabase].
    /// Fails on instances of unknown cells, and on instance cycles.
    pub fn flatten<D: TileDatabase>(&self, key: CellKey) -> LefResult<D> {
        let tech = self.tech.read()?;
        let mut db = D::default();
        self.flatten_into(&tech, key, &mut db)?;
        Ok(db)
    }
    /// Flatten the cell at `key` into existing database `db`, painting with the rules of `tech`
    pub fn flatten_into<D: TileDatabase>(&self, tech: &Technology, key: CellKey, db: &mut D) -> LefResult<()> {
        let mut path = Vec::new();
        self.flatten_helper(tech, key, &Transform::identity(), &mut path, db)
    }
    /// Internal helper and core logic for [Library::flatten].
    /// `path` holds the cells currently being flattened, from the top down.
    fn flatten_helper<D: TileDatabase>(
        &self,
        tech: &Technology,
        key: CellKey,
        trans: &Transform,
        path: &mut Vec<CellKey>,
        db: &mut D,
    ) -> LefResult<()> {
        let cell = self
            .cells
            .get(key)
            .ok_or_else(|| self.flatten_error("Instance of unknown cell", path))?;
        if path.contains(&key) {
            let msg = format!("Cell `{}` instantiates itself", cell.name);
            return Err(self.flatten_error(msg, path));
        }
        for tile in cell.tiles.iter() {
            db.paint(tech, tile.transform(trans));
        }
        path.push(key);
        for inst in cell.insts.iter() {
            let trans = Transform::cascade(trans, &inst.transform());
            self.flatten_helper(tech, inst.cell, &trans, path, db)?;
        }
        path.pop();
        Ok(())
    }
    /// Create a flattening error, with the names along `path` as its context
    fn flatten_error(&self, msg: impl Into<String>, path: &[CellKey]) -> LefError {
        let mut stack = vec![ErrorContext::Library(self.name.clone())];
        for key in path.iter() {
            if let Some(cell) = self.cells.get(*key) {
                stack.push(ErrorContext::Cell(cell.name.clone()));
            }
        }
        stack.push(ErrorContext::Geometry);
        LefError::Export {
            message: msg.into(),
            stack,
        }
    }
}
