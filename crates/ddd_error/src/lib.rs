//! Error type shared by every ddd crate
//!
//! [`DddError`] has one variant per stage of an export (reading the `.blend`
//! file, extracting the scene, writing records, the CLI and its settings).
//! Each variant carries a kind enum from [`kinds`] and whatever context is
//! known: file path, block index or line number.
//! [`DddError::user_message`] renders it for the terminal.

pub use kinds::*;
pub use types::*;

pub mod conversions;
pub mod helpers;
pub mod kinds;
pub mod types;
