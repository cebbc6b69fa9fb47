//! unproto-descriptor
//!
//! Data types for the parsed descriptor tree: the closed set of node kinds
//! (root, namespace, message, field, map field, enum, oneof) plus name lookup
//! across the tree. A loader builds the tree once; consumers treat it as
//! immutable, so renders may run repeatedly and concurrently over it.

pub mod lookup;
pub mod tree;

pub use tree::*;
