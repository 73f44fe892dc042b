//!
//! # LEF Writer Module
//!
//! Line-oriented writer shared by the header, layer and macro emitters.
//! Distances are converted from database units to microns as exact decimals,
//! printed with four decimal places for coordinates and six for layer attributes.
//!

// Std-Lib
use std::io::Write;
use std::ops::{AddAssign, SubAssign};

// Crates.io
use rust_decimal::Decimal;

// Local imports
use crate::error::LefResult;
use crate::Int;

/// Database units per micron
pub const DB_UNITS_PER_MICRON: i64 = 1000;

/// # Lef Decimal Type
pub type LefDecimal = Decimal;

/// Convert distance `v` from database units to microns
pub fn microns(v: Int) -> LefDecimal {
    Decimal::from(v as i64) / Decimal::from(DB_UNITS_PER_MICRON)
}
/// Convert area `a` from square database units to square microns
pub fn square_microns(a: i64) -> LefDecimal {
    Decimal::from(a) / Decimal::from(DB_UNITS_PER_MICRON * DB_UNITS_PER_MICRON)
}

/// # Coordinate
/// Displays a database-unit distance as microns, with four decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord(pub Int);
impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.4}", microns(self.0))
    }
}

/// # Lef Writing Helper
pub struct LefWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
    /// Indentation Helper
    pub(crate) indent: Indent,
}
impl<'wr> LefWriter<'wr> {
    /// Create a new [LefWriter] to destination `dest`.
    /// Destination is boxed internally.
    pub fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
            indent: Indent::new("   "),
        }
    }
    /// Write the library header: version, naming conventions and units
    pub fn write_header(&mut self) -> LefResult<()> {
        self.write_line(format_args!("VERSION 5.3 ;"))?;
        self.indent += 1;
        self.write_line(format_args!("NAMESCASESENSITIVE ON ;"))?;
        self.write_line(format_args!("NOWIREEXTENSIONATPIN ON ;"))?;
        self.write_line(format_args!("DIVIDERCHAR \"/\" ;"))?;
        self.write_line(format_args!("BUSBITCHARS \"[]\" ;"))?;
        self.indent -= 1;
        self.write_line(format_args!("UNITS"))?;
        self.indent += 1;
        self.write_line(format_args!("DATABASE MICRONS {} ;", DB_UNITS_PER_MICRON))?;
        self.indent -= 1;
        self.write_line(format_args!("END UNITS"))?;
        self.write_blank()?;
        Ok(())
    }
    /// Write the closing `END LIBRARY` and flush
    pub fn write_end_library(&mut self) -> LefResult<()> {
        self.write_line(format_args!("END LIBRARY ;"))?;
        self.flush()
    }
    /// Write pre-rendered content, e.g. a buffered macro, verbatim
    pub fn write_raw(&mut self, bytes: &[u8]) -> LefResult<()> {
        self.dest.write_all(bytes)?;
        Ok(())
    }
    pub fn flush(&mut self) -> LefResult<()> {
        self.dest.flush()?;
        Ok(())
    }
    /// Write a line, prefixed by the current indentation
    pub(crate) fn write_line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        writeln!(self.dest, "{}{}", self.indent.state, args)
    }
    /// Write an empty line
    pub(crate) fn write_blank(&mut self) -> std::io::Result<()> {
        writeln!(self.dest)
    }
}

/// Indentation Helper
pub(crate) struct Indent {
    unit: String,
    level: usize,
    state: String,
}
impl Indent {
    /// Create a new [Indent], initially at level 0
    fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            level: 0,
            state: String::new(),
        }
    }
}
impl AddAssign<usize> for Indent {
    fn add_assign(&mut self, rhs: usize) {
        self.level += rhs;
        self.state = self.unit.repeat(self.level);
    }
}
impl SubAssign<usize> for Indent {
    /// Decrease the indentation, saturating at zero
    fn sub_assign(&mut self, rhs: usize) {
        self.level = self.level.saturating_sub(rhs);
        self.state = self.unit.repeat(self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(Coord(10).to_string(), "0.0100");
        assert_eq!(Coord(-1500).to_string(), "-1.5000");
        assert_eq!(Coord(0).to_string(), "0.0000");
        assert_eq!(format!("{:.6}", microns(200)), "0.200000");
        assert_eq!(format!("{:.6}", square_microns(2500)), "0.002500");
    }
    #[test]
    fn test_header() -> LefResult<()> {
        let mut buf = Vec::new();
        {
            let mut w = LefWriter::new(&mut buf);
            w.write_header()?;
            w.write_end_library()?;
        }
        let s = String::from_utf8_lossy(&buf);
        let expected = "VERSION 5.3 ;\n   NAMESCASESENSITIVE ON ;\n   NOWIREEXTENSIONATPIN ON ;\n   DIVIDERCHAR \"/\" ;\n   BUSBITCHARS \"[]\" ;\nUNITS\n   DATABASE MICRONS 1000 ;\nEND UNITS\n\nEND LIBRARY ;\n";
        assert_eq!(s, expected);
        Ok(())
    }
}
