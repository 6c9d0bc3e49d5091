//! Tiller: Dynamic Command Registry
//!
//! Registers named commands as writable boolean paths on a host data
//! server and keeps the registry consistent across restarts by
//! reconciling a persisted snapshot with in-memory state.

pub mod error;
pub mod handler;
pub mod host;
pub mod logging;
pub mod reconcile;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod types;
