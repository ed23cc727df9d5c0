use std::sync::{Arc, Mutex};

use event_emitter_rs::EventEmitter;
use tracing::warn;

use super::ChangeEvent;

/// Forwards model change events to an [`EventEmitter`].
///
/// Events are emitted under their property name as JSON strings, so listeners
/// run on the emitter's own threads.
///
/// # Example
///
/// ```ignore
/// use schema_model::ModelEmitter;
///
/// let emitter = ModelEmitter::new();
/// emitter.on("name", |event| println!("name is now {}", event.value));
/// model.subscribe_all(emitter.forwarder());
/// model.set("name", "Ada")?;
/// ```
#[derive(Clone)]
pub struct ModelEmitter {
    event_emitter: Arc<Mutex<EventEmitter>>,
}

impl ModelEmitter {
    pub fn new() -> Self {
        Self {
            event_emitter: Arc::new(Mutex::new(EventEmitter::new())),
        }
    }

    /// Register a listener for changes of `property`. Returns the listener id.
    pub fn on<F>(&self, property: &str, listener: F) -> Option<String>
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        let Ok(mut emitter) = self.event_emitter.lock() else {
            warn!(property, "event emitter lock poisoned, listener not registered");
            return None;
        };
        Some(emitter.on(property, move |payload: String| {
            match serde_json::from_str::<ChangeEvent>(&payload) {
                Ok(event) => listener(event),
                Err(error) => warn!(%error, "dropping undecodable change event"),
            }
        }))
    }

    /// Remove a listener registered with [`ModelEmitter::on`].
    pub fn detach(&self, listener_id: &str) -> bool {
        match self.event_emitter.lock() {
            Ok(mut emitter) => emitter.remove_listener(listener_id).is_some(),
            Err(_) => {
                warn!(listener_id, "event emitter lock poisoned, listener not detached");
                false
            }
        }
    }

    /// Emit an event immediately.
    pub fn emit(&self, event: &ChangeEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, property = %event.property, "failed to encode change event");
                return;
            }
        };
        match self.event_emitter.lock() {
            Ok(mut emitter) => {
                emitter.emit(&event.property, payload);
            }
            Err(_) => {
                warn!(property = %event.property, "event emitter lock poisoned, event dropped");
            }
        }
    }

    /// Listener that forwards every event it receives to this emitter.
    pub fn forwarder(&self) -> impl Fn(&ChangeEvent) + Send + Sync + 'static {
        let emitter = self.clone();
        move |event| emitter.emit(event)
    }
}

impl Default for ModelEmitter {
    fn default() -> Self {
        Self::new()
    }
}
