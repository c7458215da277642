//! Foundation module - Core utilities and types
//!
//! - Collections and key types
//! - Logging utilities

pub mod collections;
pub mod logging;
