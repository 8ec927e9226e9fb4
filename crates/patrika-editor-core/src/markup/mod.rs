//! Markup round-tripping for the buffer tree.
//!
//! Parsing is lenient: unknown tags are unwrapped, non-content subtrees
//! (scripts, styles, metadata) are dropped, and known translation-tool
//! artifacts are stripped. Serialization is canonical, so parsing a
//! document's own output and re-serializing it is the identity.

mod parse;
mod write;

pub use parse::{parse, parse_fragment};
pub use write::{serialize, serialize_node};
