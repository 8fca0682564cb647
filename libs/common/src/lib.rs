//! Common library for the Suno song generator
//!
//! This crate provides the functionality shared by the generator service:
//! environment-driven configuration and the pipeline-wide error type.

pub mod config;
pub mod error;

pub use config::SunoConfig;
pub use error::{SunoError, SunoResult};

/// Example usage of the configuration module
///
/// ```rust,no_run
/// use common::SunoConfig;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SunoConfig::from_env()?;
///     println!("Songs will be written to {}", config.output_dir.display());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
