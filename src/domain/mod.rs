//! Domain layer for the index patterns service
//!
//! This module contains the models, errors and port traits the service is
//! written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
