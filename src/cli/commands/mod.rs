//! CLI command implementations.

pub mod describe;
pub mod init;
pub mod request;
pub mod run;
pub mod usage;
