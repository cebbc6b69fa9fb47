//! unproto
//!
//! Convenience facade over the unproto workspace:
//!
//! - `render_descriptor` — descriptor document text in, schema source out,
//! - `dump_tree` — pretty-printed JSON view of the parsed node tree,
//! - re-exports of the tree types, the renderer and the error type.

pub use unproto_descriptor::{
    EnumDef, Field, MapField, Message, Namespace, Node, OneOf, Root, Rule, BUILTIN_NAMESPACE,
    MAX_FIELD_ID,
};
pub use unproto_renderer::error::UnprotoError;
pub use unproto_renderer::{load_descriptor, Renderer};

/// Reconstruct schema source text from a descriptor document.
///
/// Nodes that render to "no output" are already absent from the line
/// sequence, so the result joins cleanly with newlines.
pub fn render_descriptor(text: &str) -> Result<String, UnprotoError> {
    let root = load_descriptor(text)?;
    let lines = Renderer::new(&root).render_root()?;
    Ok(lines.join("\n"))
}

/// Dump the parsed descriptor tree as pretty-printed JSON.
pub fn dump_tree(text: &str) -> Result<String, UnprotoError> {
    let root = load_descriptor(text)?;
    Ok(serde_json::to_string_pretty(&root).unwrap())
}

pub mod descriptor {
    pub use unproto_descriptor::*;
}

pub mod error {
    pub use unproto_renderer::error::UnprotoError;
}
