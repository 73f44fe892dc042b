//!
//! # LEF Identifier Sanitizing
//!

// Std-Lib
use std::borrow::Cow;

/// Characters which may not appear in LEF identifiers
pub const ILLEGAL_CHARS: [char; 7] = [';', '#', ' ', '-', '*', '$', '\n'];

/// Replace each character illegal in LEF identifiers with an underscore.
/// Returns `name` itself, without copying, if it is already legal.
pub fn legal_name(name: &str) -> Cow<'_, str> {
    if !name.contains(&ILLEGAL_CHARS[..]) {
        return Cow::Borrowed(name);
    }
    let legal = name
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect();
    Cow::Owned(legal)
}
