//! `Logger` port backed by `tracing` events.

use serde_json::Value;
use std::collections::HashMap;

use crate::domain::ports::{Level, Logger};

/// Emits every entry as a `tracing` event tagged with the logger name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

impl TracingLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Child logger with a dotted name suffix.
    pub fn get(&self, child: &str) -> Self {
        Self::new(format!("{}.{child}", self.name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("plugins.indexPatterns")
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: HashMap<String, Value>) {
        let logger = self.name.as_str();
        let fields = if fields.is_empty() {
            None
        } else {
            serde_json::to_string(&fields).ok()
        };
        let fields = fields.as_deref().unwrap_or("");

        match level {
            Level::Trace => tracing::trace!(logger, fields, "{message}"),
            Level::Debug => tracing::debug!(logger, fields, "{message}"),
            Level::Info => tracing::info!(logger, fields, "{message}"),
            Level::Warn => tracing::warn!(logger, fields, "{message}"),
            Level::Error => tracing::error!(logger, fields, "{message}"),
        }
    }
}
