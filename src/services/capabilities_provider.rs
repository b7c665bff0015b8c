//! Default capabilities contributed by the index patterns service.

use crate::platform::capabilities::Capabilities;

/// `management.kibana.indexPatterns = true`.
pub fn capabilities_provider() -> Capabilities {
    let mut capabilities = Capabilities::default();
    capabilities
        .management
        .entry("kibana".to_string())
        .or_default()
        .insert("indexPatterns".to_string(), true);
    capabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enables_index_patterns_management() {
        let capabilities = capabilities_provider();
        assert!(capabilities.is_enabled("management.kibana.indexPatterns"));
        assert_eq!(capabilities.management.len(), 1);
        assert!(capabilities.nav_links.is_empty());
    }
}
