//! # Core Module
//!
//! Configuration shared by the library and the command-line tool.

pub mod config;

pub use config::{Config, ConfigError, RegistryConfig};
