//! Error re-exports for the parser
//!
//! The parser reports everything through the workspace-wide `DddError`.

pub use ddd_error::{BlendFileErrorKind, DddError as Error, Result};
