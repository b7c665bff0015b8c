//! Field formats start contract consumed by the service factory.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::field_formats::FieldFormatsRegistry;
use crate::platform::ui_settings::UiSettingsClient;

/// Resolves a field formats registry for a settings scope.
///
/// Resolution may suspend on settings I/O.
#[async_trait]
pub trait FieldFormatsStart: Send + Sync {
    async fn field_format_service_factory(
        &self,
        ui_settings: Arc<dyn UiSettingsClient>,
    ) -> DomainResult<Arc<FieldFormatsRegistry>>;
}
