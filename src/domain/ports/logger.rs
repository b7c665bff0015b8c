use serde_json::Value;
use std::collections::HashMap;

/// Log level enumeration for structured logging
///
/// Levels are ordered from most verbose (Trace) to most severe (Error).
///
/// # Examples
///
/// ```
/// use index_patterns::domain::ports::Level;
///
/// assert!(Level::Error > Level::Warn);
/// assert!(Level::Trace < Level::Debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Most verbose level - detailed trace information
    Trace,
    /// Debug information useful during development
    Debug,
    /// Informational messages about normal operations
    Info,
    /// Warning messages for potentially problematic situations
    Warn,
    /// Error messages for failure conditions
    Error,
}

impl Level {
    /// Returns the string representation of the log level
    ///
    /// ```
    /// use index_patterns::domain::ports::Level;
    ///
    /// assert_eq!(Level::Warn.as_str(), "WARN");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Port trait for leveled logging.
///
/// The factory and the registrar receive a `Logger` from the host and route
/// every error and warning through it. `TracingLogger` is the production
/// implementation.
///
/// Implementations must not block: the service callbacks that feed them are
/// plain closures invoked from async code.
///
/// # Examples
///
/// ```
/// use index_patterns::domain::ports::{Level, Logger};
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// fn report(logger: &dyn Logger, pattern_id: &str) {
///     let mut fields = HashMap::new();
///     fields.insert("pattern_id".to_string(), json!(pattern_id));
///     logger.log(Level::Debug, "Loading index pattern", fields);
///     logger.warn("Index pattern has no time field");
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log a message with a specific level and structured fields
    fn log(&self, level: Level, message: &str, fields: HashMap<String, Value>);

    fn trace(&self, message: &str) {
        self.log(Level::Trace, message, HashMap::new());
    }

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message, HashMap::new());
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message, HashMap::new());
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message, HashMap::new());
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message, HashMap::new());
    }
}
