//!
//! # tilelef Internal Utilities Crate
//!
//! Helpers shared by the LEF exporter: shared pointers, error-helper traits,
//! string-paired enums, dependency ordering, and serialized-file IO.
//!

pub mod ptr;
pub use ptr::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod dep_order;
pub use dep_order::*;

pub mod enumstr;
pub use enumstr::*;
