//! Command PUT handler.
//!
//! One stateless callback shared by every registered address: the
//! written value is republished verbatim as a delta (no validation, no
//! coercion) and the write is acknowledged synchronously.

use crate::host::{DeltaEvent, EventBus, PutHandler, PutResponse};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Build the shared PUT handler bound to every command address.
///
/// The handler never blocks on the publish being observed; a publish
/// failure is logged and the write is still acknowledged.
pub fn command_handler(bus: Arc<dyn EventBus>, source_label: String) -> PutHandler {
    Arc::new(move |context: &str, path: &str, value: Value| {
        debug!(path, ?value, "handling PUT for command path");
        let event = DeltaEvent::value(context, &source_label, path, value);
        if let Err(e) = bus.publish(event) {
            warn!(path, error = %e, "failed to publish command delta");
        }
        PutResponse::completed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::host::{InMemoryEventBus, PutState};
    use serde_json::json;

    struct FailingBus;

    impl EventBus for FailingBus {
        fn publish(&self, _event: DeltaEvent) -> Result<(), RegistryError> {
            Err(RegistryError::RegistrationFailed("bus down".to_string()))
        }
    }

    #[test]
    fn test_passes_value_through_unchanged() {
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = command_handler(bus.clone(), "tiller-commands".to_string());

        let response = (*handler)("vessels.self", "commands.capture", json!(true));
        assert_eq!(response.state, PutState::Completed);
        assert_eq!(response.status_code, 200);

        let events = bus.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].context, "vessels.self");
        assert_eq!(events[0].source_label, "tiller-commands");
        assert_eq!(events[0].values[0].path, "commands.capture");
        assert_eq!(events[0].values[0].value, json!(true));
        assert!(events[0].meta.is_empty());
    }

    #[test]
    fn test_forwards_non_boolean_values_verbatim() {
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = command_handler(bus.clone(), "tiller-commands".to_string());

        (*handler)("vessels.self", "commands.capture", json!({"level": 3}));
        assert_eq!(bus.events()[0].values[0].value, json!({"level": 3}));
    }

    #[test]
    fn test_acknowledges_even_when_publish_fails() {
        let handler = command_handler(Arc::new(FailingBus), "tiller-commands".to_string());
        let response = (*handler)("vessels.self", "commands.capture", json!(false));
        assert_eq!(response.status_code, 200);
    }
}
