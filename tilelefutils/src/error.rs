//!
//! # Error-Helper Utilities
//!
//! ```rust
//! use tilelefutils::error::{ErrorHelper, Unwrapper};
//!
//! /// Minimal exporter which reports the cell it is working on upon failure.
//! struct CellExporter {
//!     cell: String,
//! }
//! impl ErrorHelper for CellExporter {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("Error exporting cell `{}`: {}", self.cell, msg.into())
//!     }
//! }
//! impl CellExporter {
//!     fn pin_layer(&self, layer: Option<usize>) -> Result<usize, String> {
//!         layer.unwrapper(self, "Pin has no layer")
//!     }
//! }
//! let e = CellExporter { cell: "inv".into() };
//! assert_eq!(e.pin_layer(Some(3)), Ok(3));
//! assert_eq!(
//!     e.pin_layer(None),
//!     Err("Error exporting cell `inv`: Pin has no layer".to_string())
//! );
//! ```
//!

///
/// # ErrorHelper
///
/// Shared failure-handling for the exporter's tree-walkers.
/// Implementers generally hold some state worth reporting on failure
/// (the cell or pin being written, a context stack), and inject it in `err`.
/// Everything else is default-implemented in terms of `err`.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Unwrap the [Result] `res`, replacing any error with our own.
    fn ok<T, E>(&self, res: Result<T, E>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match res {
            Ok(val) => Ok(val),
            Err(_) => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix application of an [`ErrorHelper`] to [`Option`]s and [`Result`]s,
/// so that lookups read left-to-right:
///
/// ```rust
/// use tilelefutils::error::{ErrorHelper, Unwrapper};
///
/// fn lookup(h: &impl ErrorHelper<Error = String>, names: &[&str]) -> Result<String, String> {
///     let first = names.first().unwrapper(h, "No names")?;
///     Ok(first.to_string())
/// }
/// ```
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

/// # Unwrapper for [`Option`]
///
/// Like [`Option::unwrap`], but routes `None` to the paired [`ErrorHelper`] rather than panicking.
///
impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self, msg)
    }
}

/// # Unwrapper for [`Result`]
///
/// Like [`Result::unwrap`], but routes `Err` to the paired [`ErrorHelper`] rather than panicking.
/// The original error value is discarded in favor of the helper's.
///
impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.ok(self, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper which tags every message with a layer name
    struct LayerHelper(&'static str);
    impl ErrorHelper for LayerHelper {
        type Error = String;
        fn err(&self, msg: impl Into<String>) -> String {
            format!("{}: {}", self.0, msg.into())
        }
    }

    #[test]
    fn test_error_helper() {
        let h = LayerHelper("metal1");
        assert_eq!(h.fail::<()>("bad width"), Err("metal1: bad width".to_string()));
        assert_eq!(h.assert(true, "unused"), Ok(()));
        assert_eq!(h.assert(false, "no pitch"), Err("metal1: no pitch".to_string()));
        assert_eq!(h.unwrap(Some(5), "unused"), Ok(5));
    }
    #[test]
    fn test_unwrapper() {
        let h = LayerHelper("via1");
        let r: Result<u8, ()> = Err(());
        assert_eq!(r.unwrapper(&h, "no cut"), Err("via1: no cut".to_string()));
        assert_eq!(None::<u8>.unwrapper(&h, "missing"), Err("via1: missing".to_string()));
        assert_eq!(Some(2).unwrapper(&h, "unused"), Ok(2));
    }
}
