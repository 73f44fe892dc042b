//!
//! # Export Contexts
//!

/// Enumerated export contexts.
/// Pushed and popped by tree-walkers as they descend, and attached to errors for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// Export of a library / file, by name
    Library(String),
    /// Cell-definition, by name
    Cell(String),
    /// Pin, by name
    Pin(String),
    /// The obstruction pass of a macro
    Obstructions,
    /// The layer-header pass
    Header,
    /// Flattening or extracting geometry
    Geometry,
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Library(s) => write!(f, "library `{}`", s),
            Self::Cell(s) => write!(f, "cell `{}`", s),
            Self::Pin(s) => write!(f, "pin `{}`", s),
            Self::Obstructions => write!(f, "obstructions"),
            Self::Header => write!(f, "layer header"),
            Self::Geometry => write!(f, "geometry"),
        }
    }
}
