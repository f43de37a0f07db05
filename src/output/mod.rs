//! Report output surfaces.
//!
//! HTML rendering lives in the presentation layer; this module only covers
//! the terminal summary:
//! - [`terminal`] - aligned, colored console output

pub mod terminal;

// Re-export public functions
pub use terminal::{format_field, print_summary};
