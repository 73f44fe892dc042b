//!
//! # Technology Layer Tables
//!
//! Two layers of naming live here:
//!
//! * Internal [LayerType]s, the types painted into tile planes. Each lives on a numbered plane.
//!   Contacts are the types with a non-empty list of residues, the types they electrically join.
//! * [LefLayer] records, the layers reported in LEF. Each optionally maps an internal type,
//!   and optionally a separate obstruction type, under a canonical name plus any aliases.
//!
//! [Technology] holds both, and is generally created from a serialized [TechSpec].
//!

// Crates.io
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// Local imports
use crate::error::{LefError, LefResult};
use crate::geom::Rect;
use crate::plane::LayerMask;
use crate::utils::{enumstr, EnumStr, SerdeFile};
use crate::Int;

new_key_type! {
    /// Keys for [LefLayer] entries
    pub struct LefLayerKey;
}

/// # Internal Layer-Type Identifier
/// Index into [Technology::types].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub usize);

/// # Internal Layer Type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerType {
    /// Type Name
    pub name: String,
    /// Plane Number
    pub plane: usize,
    /// Residue types. Non-empty for contacts.
    pub residues: Vec<LayerId>,
}
impl LayerType {
    /// Boolean indication of whether this is a contact type
    pub fn is_contact(&self) -> bool {
        !self.residues.is_empty()
    }
}

enumstr!(
    /// # Routing-Layer Preferred Direction
    #[derive(JsonSchema)]
    RouteDirection {
        Horizontal: "HORIZONTAL",
        Vertical: "VERTICAL",
    }
);

/// # Routing-Layer Attributes
/// All distances in database units. Non-positive values are not reported.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct RouteInfo {
    #[serde(default)]
    pub pitch: Int,
    #[serde(default)]
    pub width: Int,
    #[serde(default)]
    pub spacing: Int,
    pub direction: RouteDirection,
}

/// # LEF Layer Class
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum LefClass {
    /// Routing Layer
    Routing(RouteInfo),
    /// Cut Layer, with its minimum-cut rectangle
    Cut {
        #[serde(default)]
        area: Option<Rect>,
    },
    /// Generated Via. Never reported in the layer header.
    Via,
    Masterslice,
    Overlap,
    /// Cell-Boundary Layer. Sets macro sizes, and is never reported in the layer header.
    Boundary,
}

/// # LEF Layer Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LefLayer {
    /// Canonical Name
    pub name: String,
    /// Internal type, if any. Records without one are obstruction-only.
    pub layer: Option<LayerId>,
    /// Internal type used for obstruction geometry, if any
    pub obs: Option<LayerId>,
    /// Layer Class
    pub class: LefClass,
}

///
/// # Technology
///
/// The complete layer table.
/// The name table `names` maps every canonical name and alias to its [LefLayer],
/// and preserves declaration order, which sets the order of the layer header.
///
#[derive(Debug, Clone, Default)]
pub struct Technology {
    /// Technology Name
    pub name: String,
    /// Internal layer types, indexed by [LayerId]
    pub types: Vec<LayerType>,
    /// LEF layer records
    pub lef_layers: SlotMap<LefLayerKey, LefLayer>,
    /// Name table: canonical names and aliases
    pub names: IndexMap<String, LefLayerKey>,
    /// Inverse map from each internal type to the LEF record reporting it
    lef_map: Vec<Option<LefLayerKey>>,
}
impl Technology {
    /// Create a new, empty [Technology]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Add an internal layer type. Returns its [LayerId].
    pub fn add_type(&mut self, name: impl Into<String>, plane: usize, residues: &[LayerId]) -> LayerId {
        let id = LayerId(self.types.len());
        self.types.push(LayerType {
            name: name.into(),
            plane,
            residues: residues.to_vec(),
        });
        self.lef_map.push(None);
        id
    }
    /// Add a [LefLayer] record, named by its canonical name and each of `aliases`.
    ///
    /// Each internal type reports under the first record to claim it,
    /// either as its primary type or as its obstruction type.
    pub fn add_lef_layer(&mut self, layer: LefLayer, aliases: &[&str]) -> LefResult<LefLayerKey> {
        for id in [layer.layer, layer.obs].iter().flatten() {
            if id.0 >= self.types.len() {
                return Err(LefError::config(format!(
                    "LEF layer `{}` refers to undefined type {}",
                    layer.name, id.0
                )));
            }
        }
        let mut names = vec![layer.name.clone()];
        names.extend(aliases.iter().map(|s| s.to_string()));
        for name in names.iter() {
            if self.names.contains_key(name) {
                return Err(LefError::config(format!("Duplicate LEF layer name `{}`", name)));
            }
        }
        let ids = [layer.layer, layer.obs];
        let key = self.lef_layers.insert(layer);
        for id in ids.iter().flatten() {
            if self.lef_map[id.0].is_none() {
                self.lef_map[id.0] = Some(key);
            }
        }
        for name in names {
            self.names.insert(name, key);
        }
        Ok(key)
    }
    /// Create a [Technology] from a [TechSpec], resolving all of its type-names
    pub fn from_spec(spec: &TechSpec) -> LefResult<Self> {
        let mut tech = Self::new(&spec.name);
        // Add all types first, so that residues may refer to any of them
        for ty in spec.types.iter() {
            if tech.type_id(&ty.name).is_some() {
                return Err(LefError::config(format!("Duplicate layer type `{}`", ty.name)));
            }
            tech.add_type(&ty.name, ty.plane, &[]);
        }
        for (idx, ty) in spec.types.iter().enumerate() {
            let residues = ty
                .residues
                .iter()
                .map(|r| tech.resolve(r))
                .collect::<LefResult<Vec<_>>>()?;
            tech.types[idx].residues = residues;
        }
        for lspec in spec.lef_layers.iter() {
            let layer = match lspec.layer {
                Some(ref name) => Some(tech.resolve(name)?),
                None => None,
            };
            let obs = match lspec.obs {
                Some(ref name) => Some(tech.resolve(name)?),
                None => None,
            };
            let lef = LefLayer {
                name: lspec.name.clone(),
                layer,
                obs,
                class: lspec.class.clone(),
            };
            let aliases: Vec<&str> = lspec.aliases.iter().map(|s| s.as_str()).collect();
            tech.add_lef_layer(lef, &aliases)?;
        }
        Ok(tech)
    }
    /// Resolve type-name `name`, or fail with a [LefError::Config]
    fn resolve(&self, name: &str) -> LefResult<LayerId> {
        self.type_id(name)
            .ok_or_else(|| LefError::config(format!("Unknown layer type `{}`", name)))
    }
    /// Get the [LayerId] of type-name `name`
    pub fn type_id(&self, name: &str) -> Option<LayerId> {
        self.types.iter().position(|t| t.name == name).map(LayerId)
    }
    /// Get the [LayerType] of `id`
    pub fn layer_type(&self, id: LayerId) -> Option<&LayerType> {
        self.types.get(id.0)
    }
    /// Get the plane of type `id`
    pub fn plane(&self, id: LayerId) -> Option<usize> {
        self.layer_type(id).map(|t| t.plane)
    }
    /// Number of planes, one more than the largest plane-number in use
    pub fn num_planes(&self) -> usize {
        self.types.iter().map(|t| t.plane + 1).max().unwrap_or(0)
    }
    /// Boolean indication of whether `id` is a contact
    pub fn is_contact(&self, id: LayerId) -> bool {
        self.layer_type(id).map(|t| t.is_contact()).unwrap_or(false)
    }
    /// Residues of `id`, in declaration order. Empty for non-contacts.
    pub fn residues(&self, id: LayerId) -> &[LayerId] {
        match self.layer_type(id) {
            Some(t) => &t.residues,
            None => &[],
        }
    }
    /// Mask of every internal type
    pub fn all_types(&self) -> LayerMask {
        (0..self.types.len()).map(LayerId).collect()
    }
    /// Mask of the types on plane `plane`
    pub fn plane_types(&self, plane: usize) -> LayerMask {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| t.plane == plane)
            .map(|(idx, _)| LayerId(idx))
            .collect()
    }
    /// Boolean indication of whether types `a` and `b` connect electrically.
    /// Types connect to themselves, contacts to their residues, and contacts to each other when sharing a residue.
    pub fn connects(&self, a: LayerId, b: LayerId) -> bool {
        if a == b {
            return true;
        }
        let (ra, rb) = (self.residues(a), self.residues(b));
        ra.contains(&b) || rb.contains(&a) || ra.iter().any(|r| rb.contains(r))
    }
    /// Get the [LefLayer] reporting internal type `id`, if any
    pub fn lef_layer_for(&self, id: LayerId) -> Option<&LefLayer> {
        let key = (*self.lef_map.get(id.0)?)?;
        self.lef_layers.get(key)
    }
    /// Get the [LefLayer] named `name`, by canonical name or alias
    pub fn lef_layer(&self, name: &str) -> Option<&LefLayer> {
        let key = self.names.get(name)?;
        self.lef_layers.get(*key)
    }
    /// Mask of the types of every [LefClass::Boundary] record
    pub fn boundary_types(&self) -> LayerMask {
        self.lef_layers
            .values()
            .filter(|l| l.class == LefClass::Boundary)
            .filter_map(|l| l.layer)
            .collect()
    }
}

///
/// # Technology Specification
///
/// Serializable, name-based description of a [Technology].
/// Loaded from JSON, YAML or TOML via [SerdeFile], and converted with [Technology::from_spec].
///
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TechSpec {
    /// Technology Name
    pub name: String,
    /// Internal layer types, in declaration order
    #[serde(default)]
    pub types: Vec<LayerTypeSpec>,
    /// LEF layer records, in declaration order
    #[serde(default)]
    pub lef_layers: Vec<LefLayerSpec>,
}
impl SerdeFile for TechSpec {}

/// # Internal Layer-Type Specification
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LayerTypeSpec {
    pub name: String,
    pub plane: usize,
    /// Residue type-names, for contacts
    #[serde(default)]
    pub residues: Vec<String>,
}

/// # LEF Layer-Record Specification
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LefLayerSpec {
    /// Canonical Name
    pub name: String,
    /// Alternate names
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Internal type-name
    #[serde(default)]
    pub layer: Option<String>,
    /// Obstruction type-name
    #[serde(default)]
    pub obs: Option<String>,
    pub class: LefClass,
}
