//! In-memory host adapters.
//!
//! Record-everything implementations of the host ports, for embedding
//! the registry without a live host and for tests.

use crate::error::RegistryError;
use crate::host::contract::{
    ConfigStore, DeltaEvent, EventBus, PutHandler, PutHandlerRegistry, PutResponse,
};
use crate::snapshot::PersistedSnapshot;
use parking_lot::Mutex;
use serde_json::Value;

/// One handler installation observed by [`InMemoryHandlerRegistry`].
#[derive(Clone)]
pub struct InstalledHandler {
    pub context: String,
    pub path: String,
    pub handler: PutHandler,
}

/// PUT handler registry that records installations.
#[derive(Default)]
pub struct InMemoryHandlerRegistry {
    installed: Mutex<Vec<InstalledHandler>>,
}

impl InMemoryHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths a handler has been installed at, in installation order.
    pub fn installed_paths(&self) -> Vec<String> {
        self.installed.lock().iter().map(|h| h.path.clone()).collect()
    }

    /// Drive an installed handler the way the host would on a PUT.
    /// Returns `None` when no handler is bound at the path.
    pub fn invoke(&self, path: &str, value: Value) -> Option<PutResponse> {
        let handler = self
            .installed
            .lock()
            .iter()
            .find(|h| h.path == path)
            .cloned()?;
        Some((*handler.handler)(&handler.context, path, value))
    }
}

impl PutHandlerRegistry for InMemoryHandlerRegistry {
    fn install(
        &self,
        context: &str,
        path: &str,
        handler: PutHandler,
    ) -> Result<(), RegistryError> {
        self.installed.lock().push(InstalledHandler {
            context: context.to_string(),
            path: path.to_string(),
            handler,
        });
        Ok(())
    }
}

/// Event bus that records every published delta.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<DeltaEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every delta published so far.
    pub fn events(&self) -> Vec<DeltaEvent> {
        self.events.lock().clone()
    }

    /// Published `(path, value)` pairs, flattened in publish order.
    pub fn published_values(&self) -> Vec<(String, Value)> {
        self.events
            .lock()
            .iter()
            .flat_map(|e| e.values.iter().map(|v| (v.path.clone(), v.value.clone())))
            .collect()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: DeltaEvent) -> Result<(), RegistryError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Snapshot storage held in memory.
#[derive(Default)]
pub struct InMemoryConfigStore {
    snapshot: Mutex<Option<PersistedSnapshot>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out holding a snapshot, as if one had been saved before.
    pub fn with_snapshot(snapshot: PersistedSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    /// The snapshot as last saved, if any.
    pub fn current(&self) -> Option<PersistedSnapshot> {
        self.snapshot.lock().clone()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load(&self) -> Result<Option<PersistedSnapshot>, RegistryError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), RegistryError> {
        *self.snapshot.lock() = Some(snapshot.clone());
        Ok(())
    }
}
