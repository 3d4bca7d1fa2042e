pub mod export;
pub mod objects;
pub mod show;

// Re-export command functions for main.rs
pub use export::cmd_export;
pub use objects::cmd_objects;
pub use show::cmd_show;
