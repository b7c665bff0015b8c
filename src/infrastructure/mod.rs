//! Infrastructure layer module
//!
//! - Configuration management
//! - Logging infrastructure
//! - Project initialization and platform bootstrap

pub mod config;
pub mod logging;
pub mod setup;
