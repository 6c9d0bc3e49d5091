//! Host port contracts.
//!
//! Trait boundaries for everything the registry consumes from its host:
//! handler installation, delta publication, and snapshot storage. The
//! host delivers calls concurrently across connections, so every port
//! is `Send + Sync`.

use crate::error::RegistryError;
use crate::snapshot::PersistedSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked by the host when a value is written to a command
/// path. Arguments are `(context, path, value)`.
pub type PutHandler = Arc<dyn Fn(&str, &str, Value) -> PutResponse + Send + Sync>;

/// Outcome state of a PUT handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PutState {
    Completed,
}

/// Synchronous completion result returned from a PUT handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    pub state: PutState,
    pub status_code: u16,
}

impl PutResponse {
    pub fn completed() -> Self {
        Self {
            state: PutState::Completed,
            status_code: 200,
        }
    }
}

/// One path/value pair inside a delta event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathValue {
    pub path: String,
    pub value: Value,
}

/// Metadata published alongside a newly created command path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathMeta {
    pub path: String,
    pub units: String,
    pub description: String,
}

/// Delta message published to the host bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaEvent {
    pub context: String,
    pub timestamp: DateTime<Utc>,
    pub source_label: String,
    pub values: Vec<PathValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<PathMeta>,
}

impl DeltaEvent {
    /// Single-value delta without metadata.
    pub fn value(context: &str, source_label: &str, path: &str, value: Value) -> Self {
        Self {
            context: context.to_string(),
            timestamp: Utc::now(),
            source_label: source_label.to_string(),
            values: vec![PathValue {
                path: path.to_string(),
                value,
            }],
            meta: Vec::new(),
        }
    }

    /// Attach path metadata, used when a command path is first created.
    pub fn with_meta(mut self, path: &str, units: &str, description: &str) -> Self {
        self.meta.push(PathMeta {
            path: path.to_string(),
            units: units.to_string(),
            description: description.to_string(),
        });
        self
    }
}

/// Host registry of PUT handlers.
///
/// The host offers no deregistration primitive: an installed handler
/// stays bound until the process restarts. Callers must not assume one
/// exists.
pub trait PutHandlerRegistry: Send + Sync {
    fn install(
        &self,
        context: &str,
        path: &str,
        handler: PutHandler,
    ) -> Result<(), RegistryError>;
}

/// Host delta bus.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: DeltaEvent) -> Result<(), RegistryError>;
}

/// Persisted snapshot storage.
pub trait ConfigStore: Send + Sync {
    /// Read the snapshot; `None` when no snapshot has ever been saved.
    fn load(&self) -> Result<Option<PersistedSnapshot>, RegistryError>;

    /// Replace the snapshot with the given state.
    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), RegistryError>;
}
