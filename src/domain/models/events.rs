//! Non-fatal conditions the index patterns service reports through callbacks.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::errors::DomainError;

/// User-facing notice raised while working with index patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Raised when a loaded index pattern still uses a legacy time-interval title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedTimePattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Wildcard index expression that is queried instead.
    pub index: String,
    pub title: String,
}

pub type OnError = Arc<dyn Fn(&DomainError) + Send + Sync>;
pub type OnNotification = Arc<dyn Fn(Notification) + Send + Sync>;
pub type OnUnsupportedTimePattern = Arc<dyn Fn(UnsupportedTimePattern) + Send + Sync>;
