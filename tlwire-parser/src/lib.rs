//! Parser for Telegram's [Type Language] (TL) schema files.
//!
//! This crate converts raw `.tl` text into a structured [`Definition`] list
//! which the descriptor compiler (`tlwire-gen`) turns into static codec
//! tables.
//!
//! # Quick start
//!
//! ```rust
//! use tlwire_parser::parse_tl_file;
//!
//! let src = "peerUser#59511722 user_id:long = Peer;";
//! for def in parse_tl_file(src) {
//!     let def = def.unwrap();
//!     assert_eq!(def.id, 0x59511722);
//! }
//! ```
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Parse error types for TL schema parsing.
pub mod errors;
pub mod tl;
mod iterator;
mod utils;

use errors::ParseError;
use tl::Definition;

/// Parses a complete TL schema file, yielding [`Definition`]s one by one.
///
/// Lines starting with `//` are treated as comments and skipped.
/// The special `---functions---` and `---types---` section markers switch
/// the [`tl::Category`] applied to the following definitions.
///
/// Errors carry the line the offending definition ended on, and parsing
/// continues with the next definition, so callers decide whether to skip or
/// hard-fail on bad lines.
pub fn parse_tl_file(contents: &str) -> impl Iterator<Item = Result<Definition, ParseError>> + '_ {
    iterator::TlIterator::new(contents)
}

/// Reads the layer number from a `// LAYER N` header line, if present.
///
/// Only leading comment lines are inspected; the header must come before the
/// first definition.
pub fn layer_of(contents: &str) -> Option<i32> {
    contents
        .lines()
        .map(str::trim)
        .take_while(|l| l.is_empty() || l.starts_with("//"))
        .find_map(|l| l.strip_prefix("// LAYER ")?.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::layer_of;

    #[test]
    fn layer_header() {
        assert_eq!(layer_of("// LAYER 224\nfoo#1 = Foo;"), Some(224));
        assert_eq!(layer_of("\n// comment\n// LAYER 7\n"), Some(7));
        assert_eq!(layer_of("foo#1 = Foo;\n// LAYER 9"), None);
    }
}
