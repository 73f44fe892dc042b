//!
//! # LEF Export Result and Error Types
//!

// Local Imports
pub use crate::utils::{self, ErrorContext};

/// # [LefError] Result Type
pub type LefResult<T> = Result<T, LefError>;

///
/// # LEF Export Error Enumeration
///
pub enum LefError {
    /// Error Exporting a Cell, with the context stack at the point of failure
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Invalid Technology or Export Configuration
    Config { message: String },
    /// File-System and Output Errors
    Io(std::io::Error),
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
    /// # [Ptr] Locking
    /// Caused by trouble with a [Ptr]: either deadlock, or panic while holding a lock.
    /// Generally caused by a [std::sync::PoisonError], which is not forwardable due to lifetime constraints.
    ///
    /// [Ptr]: crate::utils::Ptr
    PtrLock,
}
impl LefError {
    /// Create a [LefError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [LefError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [LefError::Config] from anything String-convertible
    pub fn config(s: impl Into<String>) -> Self {
        Self::Config { message: s.into() }
    }
}
impl std::fmt::Debug for LefError {
    /// Display a [LefError]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LefError::Export { message, stack } => {
                write!(f, "Export Error: \n - {} \n - {:?}", message, stack)
            }
            LefError::Config { message } => write!(f, "Configuration Error: {}", message),
            LefError::Io(err) => write!(f, "IO Error: {}", err),
            LefError::Boxed(err) => err.fmt(f),
            LefError::Str(err) => err.fmt(f),
            LefError::PtrLock => write!(f, "[std::sync::PoisonError]"),
        }
    }
}
impl std::fmt::Display for LefError {
    /// Display a [LefError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<String> for LefError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for LefError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<std::io::Error> for LefError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
impl From<std::num::TryFromIntError> for LefError {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<utils::ser::Error> for LefError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl<T> From<std::sync::PoisonError<T>> for LefError {
    fn from(_e: std::sync::PoisonError<T>) -> Self {
        Self::PtrLock
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for LefError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}
