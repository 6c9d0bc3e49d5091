//! Host server ports and adapters.
//!
//! The registry talks to its host through three narrow ports: PUT
//! handler installation, delta publication, and snapshot persistence.
//! Adapters live alongside the contracts.

pub mod contract;
pub mod file_store;
pub mod memory;

pub use contract::{
    ConfigStore, DeltaEvent, EventBus, PathMeta, PathValue, PutHandler, PutHandlerRegistry,
    PutResponse, PutState,
};
pub use file_store::FileConfigStore;
pub use memory::{InMemoryConfigStore, InMemoryEventBus, InMemoryHandlerRegistry};
