use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::adapter::AdapterError;
use crate::envelope::CallbackEventType;

/// A callback event accepted by the adapter, handed to listeners as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct CallbackEvent {
    pub event_type: CallbackEventType,
    /// The nested `event` object exactly as Slack delivered it.
    pub payload: Value,
    /// Set when Slack marked the delivery as a retry.
    pub retry: bool,
}

pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &CallbackEvent);
}

/// Notified once for every rejected request, before the response is shaped.
pub trait ErrorListener: Send + Sync {
    fn on_error(&self, error: &AdapterError);
}

/// Explicit event-type → listener mapping. Listeners run synchronously in
/// registration order; an event type nobody registered for is a no-op.
#[derive(Default)]
pub struct EventRegistry {
    listeners: HashMap<CallbackEventType, Vec<Arc<dyn EventListener>>>,
    error_listeners: Vec<Arc<dyn ErrorListener>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<L>(&mut self, event_type: CallbackEventType, listener: L)
    where
        L: EventListener + 'static,
    {
        self.listeners.entry(event_type).or_default().push(Arc::new(listener));
    }

    pub fn register_error<L>(&mut self, listener: L)
    where
        L: ErrorListener + 'static,
    {
        self.error_listeners.push(Arc::new(listener));
    }

    /// Invokes every listener registered for the event's type, in
    /// registration order. Returns how many ran.
    pub fn notify(&self, event: &CallbackEvent) -> usize {
        let Some(listeners) = self.listeners.get(&event.event_type) else {
            return 0;
        };

        for listener in listeners {
            listener.on_event(event);
        }
        listeners.len()
    }

    pub fn notify_error(&self, error: &AdapterError) {
        for listener in &self.error_listeners {
            listener.on_error(error);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum::<usize>() + self.error_listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::{CallbackEvent, ErrorListener, EventListener, EventRegistry};
    use crate::adapter::AdapterError;
    use crate::envelope::CallbackEventType;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl EventListener for Recorder {
        fn on_event(&self, event: &CallbackEvent) {
            self.log
                .lock()
                .expect("log lock")
                .push(format!("{}:{}", self.label, event.event_type));
        }
    }

    struct ErrorRecorder {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ErrorListener for ErrorRecorder {
        fn on_error(&self, error: &AdapterError) {
            self.log.lock().expect("log lock").push(error.to_string());
        }
    }

    fn message_event() -> CallbackEvent {
        CallbackEvent {
            event_type: CallbackEventType::Message,
            payload: json!({"type": "message", "text": "hi"}),
            retry: false,
        }
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EventRegistry::new();
        registry.register(CallbackEventType::Message, Recorder { label: "first", log: log.clone() });
        registry
            .register(CallbackEventType::Message, Recorder { label: "second", log: log.clone() });

        let notified = registry.notify(&message_event());

        assert_eq!(notified, 2);
        assert_eq!(*log.lock().expect("log lock"), vec!["first:message", "second:message"]);
    }

    #[test]
    fn unregistered_event_types_are_a_no_op() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EventRegistry::new();
        registry.register(CallbackEventType::AppMention, Recorder { label: "a", log: log.clone() });

        let notified = registry.notify(&message_event());

        assert_eq!(notified, 0);
        assert!(log.lock().expect("log lock").is_empty());
    }

    #[test]
    fn error_listeners_see_every_rejection() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EventRegistry::new();
        registry.register_error(ErrorRecorder { log: log.clone() });

        registry.notify_error(&AdapterError::MissingEventType);

        assert_eq!(log.lock().expect("log lock").len(), 1);
    }

    #[test]
    fn listener_count_spans_event_and_error_listeners() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EventRegistry::new();
        registry.register(CallbackEventType::Message, Recorder { label: "a", log: log.clone() });
        registry.register(CallbackEventType::TeamJoin, Recorder { label: "b", log: log.clone() });
        registry.register_error(ErrorRecorder { log });

        assert_eq!(registry.listener_count(), 3);
    }
}
