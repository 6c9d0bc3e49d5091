//! Registration Service
//!
//! Public mutation surface over the [`CommandStore`]. Every mutation
//! runs under one mutex together with its snapshot write, so concurrent
//! `register` calls for the same name serialize and the loser observes
//! `AlreadyRegistered` instead of installing twice.

use crate::error::RegistryError;
use crate::handler::command_handler;
use crate::host::{ConfigStore, DeltaEvent, EventBus, PutHandlerRegistry};
use crate::snapshot::PersistedSnapshot;
use crate::store::{CommandRegistration, CommandStore};
use crate::types::command_address;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Registry tunables, defaulting to the host conventions.
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Host context every command path lives under.
    pub context: String,
    /// Source label attached to published deltas.
    pub source_label: String,
    /// Delay before a restored command is reset to `false`.
    pub reset_delay: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            context: "vessels.self".to_string(),
            source_label: "tiller-commands".to_string(),
            reset_delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of a register call. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new entry was created and announced to the host.
    Registered { address: String },
    /// The name was already present; nothing changed.
    AlreadyRegistered { address: String },
}

impl RegisterOutcome {
    pub fn address(&self) -> &str {
        match self {
            RegisterOutcome::Registered { address }
            | RegisterOutcome::AlreadyRegistered { address } => address,
        }
    }
}

/// Command registry operations: register, unregister, list, shutdown.
///
/// Holds the store behind a mutex and owns the host ports. Constructed
/// once at startup and shared by handle; no implicit singleton.
pub struct RegistrationService {
    pub(crate) store: Mutex<CommandStore>,
    pub(crate) handlers: Arc<dyn PutHandlerRegistry>,
    pub(crate) bus: Arc<dyn EventBus>,
    pub(crate) config: Arc<dyn ConfigStore>,
    pub(crate) settings: RegistrySettings,
}

impl RegistrationService {
    pub fn new(
        handlers: Arc<dyn PutHandlerRegistry>,
        bus: Arc<dyn EventBus>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self::with_settings(handlers, bus, config, RegistrySettings::default())
    }

    pub fn with_settings(
        handlers: Arc<dyn PutHandlerRegistry>,
        bus: Arc<dyn EventBus>,
        config: Arc<dyn ConfigStore>,
        settings: RegistrySettings,
    ) -> Self {
        Self {
            store: Mutex::new(CommandStore::new()),
            handlers,
            bus,
            config,
            settings,
        }
    }

    /// Register a command, making `commands.{name}` a writable path.
    ///
    /// Re-registering an existing name is a successful no-op. A failed
    /// handler installation or initial publish leaves the store
    /// unmodified.
    pub fn register(&self, name: &str) -> Result<RegisterOutcome, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::InvalidCommand(
                "command name must not be empty".to_string(),
            ));
        }

        let address = command_address(name);
        let mut store = self.store.lock();
        if store.contains(&address) {
            debug!(%address, "command already registered");
            return Ok(RegisterOutcome::AlreadyRegistered { address });
        }

        self.install_and_announce(name, &address)?;
        store.add(name, Utc::now());
        self.persist(&store);
        debug!(%address, "registered new command");
        Ok(RegisterOutcome::Registered { address })
    }

    /// Remove a command from the registry, returning its address.
    ///
    /// The installed PUT handler stays bound until restart; the host
    /// port has no deregistration call. Persisting the removal keeps
    /// the handler from being re-installed on the next startup.
    pub fn unregister(&self, name: &str) -> Result<String, RegistryError> {
        let address = command_address(name.trim());
        let mut store = self.store.lock();
        if !store.remove(&address) {
            return Err(RegistryError::CommandNotFound(address));
        }
        self.persist(&store);
        debug!(%address, "removed command");
        Ok(address)
    }

    /// Snapshot copy of all current registrations.
    pub fn list(&self) -> Vec<CommandRegistration> {
        self.store.lock().list()
    }

    /// In-memory reset only; the durable snapshot is untouched.
    pub fn shutdown(&self) {
        self.store.lock().clear();
        debug!("cleared command store");
    }

    /// Install the host PUT handler and announce the path with its
    /// default value and metadata. Failures surface as
    /// [`RegistryError::RegistrationFailed`].
    pub(crate) fn install_and_announce(
        &self,
        name: &str,
        address: &str,
    ) -> Result<(), RegistryError> {
        let handler = command_handler(self.bus.clone(), self.settings.source_label.clone());
        self.handlers
            .install(&self.settings.context, address, handler)
            .map_err(|e| {
                RegistryError::RegistrationFailed(format!(
                    "handler installation for {} failed: {}",
                    address, e
                ))
            })?;

        let event = DeltaEvent::value(
            &self.settings.context,
            &self.settings.source_label,
            address,
            json!(false),
        )
        .with_meta(address, "bool", &format!("Command: {}", name));
        self.bus.publish(event).map_err(|e| {
            RegistryError::RegistrationFailed(format!(
                "initial publish for {} failed: {}",
                address, e
            ))
        })?;
        Ok(())
    }

    /// Write the current store state through the config port.
    ///
    /// Fire-and-forget from the caller's perspective: a failed write is
    /// logged and the in-memory registry stays authoritative for the
    /// rest of the process, at the accepted risk of losing the change
    /// across a restart.
    pub(crate) fn persist(&self, store: &CommandStore) {
        let snapshot = PersistedSnapshot::from_store(store);
        if let Err(e) = self.config.save(&snapshot) {
            warn!(error = %e, "failed to persist registry snapshot");
        }
    }

    /// One-shot deferred republish of `false` for a restored command.
    ///
    /// The host may hand back a stale `true` from before the restart;
    /// this overwrites it once, after `reset_delay`. Dropped without a
    /// durability guarantee if the process exits first, and skipped when
    /// no async runtime is running.
    pub(crate) fn schedule_reset(&self, address: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(%address, "no async runtime; skipping deferred command reset");
            return;
        };
        let bus = self.bus.clone();
        let context = self.settings.context.clone();
        let label = self.settings.source_label.clone();
        let delay = self.settings.reset_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let event = DeltaEvent::value(&context, &label, &address, json!(false));
            match bus.publish(event) {
                Ok(()) => debug!(%address, "reset command to false after startup"),
                Err(e) => warn!(%address, error = %e, "failed to reset command after startup"),
            }
        });
    }
}
