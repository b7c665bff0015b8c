//! Start services: values produced at start, awaited by setup-time closures.

use std::sync::Arc;
use tokio::sync::watch;

use crate::platform::errors::{PlatformError, PlatformResult};
use crate::platform::CoreStart;

/// Everything available once the platform has started.
pub struct StartServicesValue<P, O> {
    pub core: CoreStart,
    /// Start contracts of the plugins this one depends on.
    pub plugins: P,
    /// This plugin's own start contract.
    pub own: O,
}

impl<P: std::fmt::Debug, O: std::fmt::Debug> std::fmt::Debug for StartServicesValue<P, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartServicesValue")
            .field("plugins", &self.plugins)
            .field("own", &self.own)
            .finish_non_exhaustive()
    }
}

/// Accessor handed out at setup, resolved exactly once at start.
pub struct StartServices<P, O> {
    sender: Arc<watch::Sender<Option<Arc<StartServicesValue<P, O>>>>>,
}

impl<P, O> Clone for StartServices<P, O> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<P, O> Default for StartServices<P, O>
where
    P: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, O> StartServices<P, O>
where
    P: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish the start values. Fails if already resolved.
    pub fn resolve(&self, core: CoreStart, plugins: P, own: O) -> PlatformResult<()> {
        let value = Arc::new(StartServicesValue { core, plugins, own });
        let published = self.sender.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(value);
            true
        });
        if published {
            Ok(())
        } else {
            Err(PlatformError::Internal(
                "start services already resolved".to_string(),
            ))
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Wait until the platform has started.
    pub async fn get(&self) -> PlatformResult<Arc<StartServicesValue<P, O>>> {
        let mut receiver = self.sender.subscribe();
        let value = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| PlatformError::Unavailable("platform stopped before start".to_string()))?;
        value
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| PlatformError::Unavailable("start services missing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryElasticsearch, InMemoryElasticsearchService, InMemorySavedObjectsService,
        InMemorySavedObjectsStore, InMemoryUiSettingsService,
    };
    use crate::platform::SavedObjectTypeRegistry;
    use std::collections::BTreeMap;
    use tokio_test::{assert_pending, assert_ready, task};

    fn core() -> CoreStart {
        let store = Arc::new(InMemorySavedObjectsStore::new(Arc::new(
            SavedObjectTypeRegistry::new(),
        )));
        CoreStart {
            saved_objects: Arc::new(InMemorySavedObjectsService::new(store)),
            elasticsearch: Arc::new(InMemoryElasticsearchService::new(Arc::new(
                InMemoryElasticsearch::new(BTreeMap::new()),
            ))),
            ui_settings: Arc::new(InMemoryUiSettingsService::new(&BTreeMap::new())),
        }
    }

    #[test]
    fn test_get_pending_until_resolved() {
        let start_services: StartServices<(), u32> = StartServices::new();
        let mut pending = task::spawn(start_services.get());
        assert_pending!(pending.poll());

        start_services.resolve(core(), (), 7).unwrap();
        assert!(pending.is_woken());
        let value = assert_ready!(pending.poll()).unwrap();
        assert_eq!(value.own, 7);
    }

    #[test]
    fn test_second_resolve_keeps_first_value() {
        let start_services: StartServices<(), u32> = StartServices::new();
        start_services.resolve(core(), (), 1).unwrap();
        assert!(start_services.resolve(core(), (), 2).is_err());

        let value = tokio_test::block_on(start_services.get()).unwrap();
        assert_eq!(value.own, 1);
    }

    #[test]
    fn test_concurrent_resolve_publishes_once() {
        let start_services: StartServices<(), usize> = StartServices::new();
        let successes: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|n| {
                    let start_services = start_services.clone();
                    scope.spawn(move || start_services.resolve(core(), (), n).ok().map(|()| n))
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(successes.len(), 1);
        let value = tokio_test::block_on(start_services.get()).unwrap();
        assert_eq!(value.own, successes[0]);
    }
}
