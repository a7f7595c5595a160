//! Command handlers for the KB Query CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod config;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use config::ConfigCommand;
pub use serve::ServeCommand;
