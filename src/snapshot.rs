//! Persisted registry snapshot.
//!
//! Wire-compatible with the host plugin options JSON:
//! `{"registeredCommands":[{"command","path","registered"}],"newCommand"}`.
//! The snapshot is the last known-good registry state, reloaded and
//! reconciled at startup.

use crate::store::CommandStore;
use crate::types::command_address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One persisted registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Command name without the `commands.` prefix.
    pub command: String,
    /// Derived from `command`. Kept in the stored file for readability;
    /// recomputed on read, so a stale or missing value is harmless.
    #[serde(default)]
    pub path: String,
    /// Missing in hand-edited snapshots; restore falls back to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<DateTime<Utc>>,
}

/// Last known-good registry state plus an optional queued registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub registered_commands: Vec<SnapshotEntry>,
    /// One-shot registration request made administratively before the
    /// process started; consumed and cleared during reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_command: Option<String>,
}

impl PersistedSnapshot {
    /// Project the live store into its persisted form.
    ///
    /// Entries are sorted by address so successive writes of the same
    /// state are byte-identical. `newCommand` is never carried forward;
    /// persisting is what consumes it.
    pub fn from_store(store: &CommandStore) -> Self {
        let mut entries: Vec<SnapshotEntry> = store
            .list()
            .into_iter()
            .map(|reg| SnapshotEntry {
                command: reg.name,
                path: reg.address,
                registered: Some(reg.registered_at),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            registered_commands: entries,
            new_command: None,
        }
    }

    /// Addresses this snapshot says should exist after reconciliation.
    /// Entries with blank names are skipped.
    pub fn desired_addresses(&self) -> HashSet<String> {
        self.registered_commands
            .iter()
            .filter(|entry| !entry.command.trim().is_empty())
            .map(|entry| command_address(entry.command.trim()))
            .collect()
    }
}
