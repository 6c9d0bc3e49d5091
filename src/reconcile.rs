//! Startup reconciliation.
//!
//! Runs exactly once, before the service takes external calls: prunes
//! store entries the snapshot no longer lists, restores the ones it
//! does, then consumes a pending registration if the snapshot carries
//! one. Pruning runs strictly before restoration so an entry present on
//! both sides is never dropped and re-added.

use crate::error::RegistryError;
use crate::service::{RegisterOutcome, RegistrationService};
use crate::snapshot::PersistedSnapshot;
use crate::types::command_address;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counts of what reconciliation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Entries removed because the snapshot no longer lists them.
    pub pruned: usize,
    /// Entries restored from the snapshot.
    pub restored: usize,
    /// Whether a pending `newCommand` was registered.
    pub pending_registered: bool,
}

/// One-shot merger of the persisted snapshot into the live store.
pub struct Reconciler {
    service: Arc<RegistrationService>,
}

impl Reconciler {
    pub fn new(service: Arc<RegistrationService>) -> Self {
        Self { service }
    }

    /// Merge the snapshot into the store. `None` behaves as an empty
    /// snapshot (first start, nothing persisted yet).
    pub fn run(
        &self,
        snapshot: Option<PersistedSnapshot>,
    ) -> Result<ReconcileSummary, RegistryError> {
        let snapshot = snapshot.unwrap_or_default();
        let mut summary = ReconcileSummary::default();
        let desired = snapshot.desired_addresses();

        {
            let mut store = self.service.store.lock();

            for address in store.addresses() {
                if !desired.contains(&address) {
                    store.remove(&address);
                    summary.pruned += 1;
                    debug!(%address, "pruned command dropped from snapshot");
                }
            }

            for entry in &snapshot.registered_commands {
                let name = entry.command.trim();
                if name.is_empty() {
                    continue;
                }
                let address = command_address(name);
                if store.contains(&address) {
                    continue;
                }
                self.service.install_and_announce(name, &address)?;
                store.add(name, entry.registered.unwrap_or_else(Utc::now));
                self.service.schedule_reset(address.clone());
                summary.restored += 1;
                debug!(%address, "restored command from snapshot");
            }
        }

        if let Some(name) = snapshot
            .new_command
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            match self.service.register(name) {
                Ok(RegisterOutcome::Registered { address }) => {
                    // register() already rewrote the snapshot, which
                    // clears the consumed newCommand.
                    summary.pending_registered = true;
                    debug!(%address, "registered pending command from snapshot");
                }
                Ok(RegisterOutcome::AlreadyRegistered { address }) => {
                    // register() skipped its snapshot write; rewrite so
                    // the pending name is not consumed again next start.
                    let store = self.service.store.lock();
                    self.service.persist(&store);
                    debug!(%address, "pending command already registered");
                }
                Err(e) => {
                    warn!(command = name, error = %e, "failed to register pending command")
                }
            }
        }

        info!(
            pruned = summary.pruned,
            restored = summary.restored,
            "reconciliation complete"
        );
        Ok(summary)
    }
}
