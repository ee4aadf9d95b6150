//! Output rendering and writing.

pub mod generator;

pub use generator::{render_document, write_document};
