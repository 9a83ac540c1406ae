//! modup - a TUI for selectively upgrading outdated Go module dependencies
//!
//! This library exposes the core modules for use by the debug CLI and tests.

pub mod core;
pub mod gomod;
pub mod types;
pub mod ui;
