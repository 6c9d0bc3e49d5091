//! Command Store
//!
//! Authoritative in-memory mapping of command address to registration
//! metadata. Store membership is the source of truth for which
//! host-side PUT handlers are installed, apart from the bounded startup
//! window before reconciliation completes.

use crate::types::command_address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One registered command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRegistration {
    /// Caller-supplied name, non-empty after trimming.
    pub name: String,
    /// Derived unique key: `commands.{name}`.
    pub address: String,
    /// Time of first successful registration; write-once.
    pub registered_at: DateTime<Utc>,
}

/// In-memory registry state.
///
/// Entries are never mutated in place; registration metadata is
/// write-once except for deletion.
#[derive(Debug, Default)]
pub struct CommandStore {
    entries: HashMap<String, CommandRegistration>,
}

impl CommandStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Pure lookup by derived address.
    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    /// Get a registration by address.
    pub fn get(&self, address: &str) -> Option<&CommandRegistration> {
        self.entries.get(address)
    }

    /// Insert a command if its derived address is not already present.
    ///
    /// Returns whether insertion occurred. Re-adding an existing name
    /// is a no-op, never an overwrite.
    pub fn add(&mut self, name: &str, registered_at: DateTime<Utc>) -> bool {
        let address = command_address(name);
        if self.entries.contains_key(&address) {
            return false;
        }
        self.entries.insert(
            address.clone(),
            CommandRegistration {
                name: name.to_string(),
                address,
                registered_at,
            },
        );
        true
    }

    /// Delete an entry by address, returning whether it was present.
    pub fn remove(&mut self, address: &str) -> bool {
        self.entries.remove(address).is_some()
    }

    /// Snapshot copy of all registrations. No ordering guarantee.
    pub fn list(&self) -> Vec<CommandRegistration> {
        self.entries.values().cloned().collect()
    }

    /// Addresses currently present, for reconciliation set math.
    pub fn addresses(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. In-memory only; persistence is untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
