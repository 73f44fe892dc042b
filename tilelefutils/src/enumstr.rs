//!
//! # Enum-String Mapping Module
//!
//! Defines the [enumstr] macro and paired [EnumStr] trait,
//! mapping field-less enums to and from the keyword strings of text formats such as LEF.
//!
//! ```rs
//! use tilelefutils::enumstr;
//!
//! enumstr!(
//! /// # Routing-Layer Preferred Direction
//! RouteDirection {
//!     Horizontal: "HORIZONTAL",
//!     Vertical: "VERTICAL",
//!  }
//! );
//! ```
//!

///
/// # String-Enumeration Trait
///
/// * `to_str(&self) -> &'static str` converts the enum to its keyword.
/// * `from_str(&str) -> Option<Self>` does the opposite, returning `None` for unknown keywords.
///
/// Generally implemented by the [enumstr] macro.
///
pub trait EnumStr: std::marker::Sized {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
}

///
/// # Enum-String Pairing Macro
///
/// Creates an `enum` which:
/// * (a) Pairs each variant with a keyword string
/// * (b) Implements [EnumStr] for conversions to and from these keywords
/// * (c) Implements [std::fmt::Display], writing the keyword
///
/// Variants are field-less, and derive the common traits including `serde::{Serialize, Deserialize}`,
/// which must be in scope at the invocation site.
/// Keywords may contain spaces, e.g. LEF's `OUTPUT TRISTATE`.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
                $variant ),*
        }
        impl EnumStr for $enum_name {
            /// Convert a [$enum_name] variant to its paired (static) keyword.
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Create a [$enum_name] from one of its keywords.
            /// Matching is case *sensitive*.
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", self.to_str())
            }
        }
    }
}
