//! unproto-renderer
//!
//! This crate implements:
//!  1) A loader for JSON descriptor documents (`load_descriptor` → `Root`),
//!  2) The schema source renderer (`Renderer` → ordered text lines),
//!  3) Identifier and literal helpers (`camel_to_snake`, `json_literal`),
//!  4) Error types (`UnprotoError`).

pub mod error;
pub mod loader;
pub mod render;
pub mod utils;

pub use loader::load_descriptor;
pub use render::Renderer;
