pub mod config;
pub mod error;

// Dataset and matching
pub mod filter;
pub mod recipe;

// External services
pub mod embed;
pub mod generate;
pub mod index;
pub mod upstream;

// Pipelines
pub mod engine;

// HTTP API
pub mod api;

// CLI
pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
