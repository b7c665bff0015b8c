//! Capabilities: which features and UI sections a request may see.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::platform::http::HttpRequest;

/// Resolved capability flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default)]
    pub nav_links: BTreeMap<String, bool>,
    /// Section to app to flag.
    #[serde(default)]
    pub management: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(default)]
    pub catalogue: BTreeMap<String, bool>,
    /// Feature id to capability to flag.
    #[serde(flatten)]
    pub features: BTreeMap<String, BTreeMap<String, bool>>,
}

impl Capabilities {
    /// Overlay `other` onto `self`; flags in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.nav_links.extend(other.nav_links);
        self.catalogue.extend(other.catalogue);
        for (section, apps) in other.management {
            self.management.entry(section).or_default().extend(apps);
        }
        for (feature, flags) in other.features {
            self.features.entry(feature).or_default().extend(flags);
        }
    }

    /// Look up a dotted path such as `management.kibana.indexPatterns`.
    pub fn is_enabled(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('.').collect();
        let flag = match parts.as_slice() {
            ["navLinks", key] => self.nav_links.get(*key),
            ["catalogue", key] => self.catalogue.get(*key),
            ["management", section, app] => {
                self.management.get(*section).and_then(|apps| apps.get(*app))
            }
            [feature, key] => self.features.get(*feature).and_then(|f| f.get(*key)),
            _ => None,
        };
        flag.copied().unwrap_or(false)
    }
}

/// Contributes default capabilities.
pub type CapabilitiesProvider = Arc<dyn Fn() -> Capabilities + Send + Sync>;

/// Computes per-request overrides from the merged defaults.
pub type CapabilitiesSwitcher = Arc<dyn Fn(&HttpRequest, &Capabilities) -> Capabilities + Send + Sync>;

#[derive(Default)]
pub struct CapabilitiesService {
    providers: RwLock<Vec<CapabilitiesProvider>>,
    switchers: RwLock<Vec<CapabilitiesSwitcher>>,
}

impl std::fmt::Debug for CapabilitiesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilitiesService")
            .field("providers", &self.provider_count())
            .field("switchers", &self.switcher_count())
            .finish()
    }
}

impl CapabilitiesService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_provider(&self, provider: impl Fn() -> Capabilities + Send + Sync + 'static) {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(provider));
    }

    pub fn register_switcher(
        &self,
        switcher: impl Fn(&HttpRequest, &Capabilities) -> Capabilities + Send + Sync + 'static,
    ) {
        self.switchers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(switcher));
    }

    pub fn provider_count(&self) -> usize {
        self.providers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn switcher_count(&self) -> usize {
        self.switchers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Merge every provider, then apply switchers in registration order.
    pub fn resolve(&self, request: &HttpRequest) -> Capabilities {
        let mut capabilities = Capabilities::default();
        for provider in self.providers.read().unwrap_or_else(PoisonError::into_inner).iter() {
            capabilities.merge(provider());
        }
        for switcher in self.switchers.read().unwrap_or_else(PoisonError::into_inner).iter() {
            let overrides = switcher(request, &capabilities);
            capabilities.merge(overrides);
        }
        capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn management(section: &str, app: &str, enabled: bool) -> Capabilities {
        let mut capabilities = Capabilities::default();
        capabilities
            .management
            .entry(section.to_string())
            .or_default()
            .insert(app.to_string(), enabled);
        capabilities
    }

    #[test]
    fn test_resolve_merges_providers() {
        let service = CapabilitiesService::new();
        service.register_provider(|| management("kibana", "indexPatterns", true));
        service.register_provider(|| management("kibana", "objects", true));

        let resolved = service.resolve(&HttpRequest::get("/"));
        assert!(resolved.is_enabled("management.kibana.indexPatterns"));
        assert!(resolved.is_enabled("management.kibana.objects"));
        assert!(!resolved.is_enabled("management.kibana.spaces"));
    }

    #[test]
    fn test_switcher_hides_capability_per_user() {
        let service = CapabilitiesService::new();
        service.register_provider(|| management("kibana", "indexPatterns", true));
        service.register_switcher(|request, _current| {
            if request.user.as_deref() == Some("viewer") {
                management("kibana", "indexPatterns", false)
            } else {
                Capabilities::default()
            }
        });

        let admin = service.resolve(&HttpRequest::get("/").with_user("admin"));
        let viewer = service.resolve(&HttpRequest::get("/").with_user("viewer"));
        assert!(admin.is_enabled("management.kibana.indexPatterns"));
        assert!(!viewer.is_enabled("management.kibana.indexPatterns"));
    }

    #[test]
    fn test_feature_flags_serialize_flat() {
        let mut capabilities = Capabilities::default();
        capabilities
            .features
            .entry("indexPatterns".to_string())
            .or_default()
            .insert("save".to_string(), true);

        let value = serde_json::to_value(&capabilities).unwrap();
        assert_eq!(value["indexPatterns"]["save"], true);
        assert!(capabilities.is_enabled("indexPatterns.save"));
    }
}
