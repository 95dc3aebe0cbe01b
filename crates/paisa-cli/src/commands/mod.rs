//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config and model loading)
//! - `forecast` - Offline forecast from command-line amounts
//! - `model` - Model artifact inspection
//! - `serve` - Web server command

pub mod core;
pub mod forecast;
pub mod model;
pub mod serve;

// Re-export command functions for main.rs
pub use self::core::*;
pub use forecast::*;
pub use model::*;
pub use serve::*;
