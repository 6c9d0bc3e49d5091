//! JSON-file snapshot storage adapter.

use crate::error::RegistryError;
use crate::host::contract::ConfigStore;
use crate::snapshot::PersistedSnapshot;
use std::path::PathBuf;

/// [`ConfigStore`] adapter keeping the snapshot as a JSON file on disk.
///
/// Writes go through a temporary file and rename so a crash mid-write
/// never truncates the previous snapshot.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Option<PersistedSnapshot>, RegistryError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            RegistryError::ConfigError(format!(
                "Failed to read snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let snapshot = serde_json::from_str(&content).map_err(|e| {
            RegistryError::ConfigError(format!(
                "Failed to parse snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RegistryError::PersistenceFailed(format!(
                        "Failed to create snapshot directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| {
            RegistryError::PersistenceFailed(format!("Failed to serialize snapshot: {}", e))
        })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| {
            RegistryError::PersistenceFailed(format!(
                "Failed to write snapshot {}: {}",
                tmp.display(),
                e
            ))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            RegistryError::PersistenceFailed(format!(
                "Failed to replace snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CommandStore;
    use chrono::Utc;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("snapshot.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfigStore::new(dir.path().join("snapshot.json"));

        let mut commands = CommandStore::new();
        commands.add("capture", Utc::now());
        let snapshot = PersistedSnapshot::from_store(&commands);

        config.save(&snapshot).unwrap();
        let loaded = config.load().unwrap().unwrap();
        assert_eq!(loaded.registered_commands.len(), 1);
        assert_eq!(loaded.registered_commands[0].command, "capture");
        assert_eq!(loaded.registered_commands[0].path, "commands.capture");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfigStore::new(dir.path().join("nested/deeper/snapshot.json"));
        config.save(&PersistedSnapshot::default()).unwrap();
        assert!(config.path().exists());
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfigStore::new(dir.path().join("snapshot.json"));

        let mut commands = CommandStore::new();
        commands.add("a", Utc::now());
        config.save(&PersistedSnapshot::from_store(&commands)).unwrap();

        commands.remove("commands.a");
        commands.add("b", Utc::now());
        config.save(&PersistedSnapshot::from_store(&commands)).unwrap();

        let loaded = config.load().unwrap().unwrap();
        assert_eq!(loaded.registered_commands.len(), 1);
        assert_eq!(loaded.registered_commands[0].command, "b");
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{not json").unwrap();
        let config = FileConfigStore::new(path);
        assert!(matches!(
            config.load(),
            Err(RegistryError::ConfigError(_))
        ));
    }
}
