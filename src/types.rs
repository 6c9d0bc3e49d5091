//! Core types and address derivation for the command registry.

/// Prefix under which every command path lives on the host.
pub const COMMAND_PREFIX: &str = "commands.";

/// Derive the unique host address for a command name.
///
/// The address doubles as the registry key and the host-side binding
/// point for the PUT handler.
pub fn command_address(name: &str) -> String {
    format!("{}{}", COMMAND_PREFIX, name)
}
