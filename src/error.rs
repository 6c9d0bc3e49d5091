//! Error types for the command registry.

use thiserror::Error;

/// Errors surfaced by registry operations.
///
/// `AlreadyRegistered` is deliberately not here: re-registering an
/// existing command is a successful idempotent outcome, reported via
/// [`crate::service::RegisterOutcome`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Command name was empty or otherwise unusable. Client error.
    #[error("Invalid command name: {0}")]
    InvalidCommand(String),

    /// Unregister target is not present in the registry. Client error.
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Host-side handler installation or initial publish failed. The
    /// store is left unmodified when this is returned.
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    /// Snapshot write failed. Logged by the service; never fails the
    /// mutation that triggered it.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    /// Snapshot or logging configuration could not be loaded or parsed.
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl RegistryError {
    /// HTTP-ish status a transport layer would map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::InvalidCommand(_) => 400,
            RegistryError::CommandNotFound(_) => 404,
            RegistryError::RegistrationFailed(_)
            | RegistryError::PersistenceFailed(_)
            | RegistryError::ConfigError(_) => 500,
        }
    }
}
