//! Lifecycle of a model's computed properties.
//!
//! The engine owns the dependency subscriptions on the model's
//! [`ChangeChannel`] and guards recomputation against re-entry. The model
//! performs the actual recompute, since it owns storage and filters.

use tracing::{debug, error};

use crate::emitter::{ChangeChannel, SubscriptionId};
use crate::error::ModelError;
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Subscribed,
    /// A recompute failed; no further recompute happens.
    Faulted { property: String },
    Disposed,
}

#[derive(Debug)]
pub struct ComputedEngine {
    state: EngineState,
    subscriptions: Vec<SubscriptionId>,
    stack: Vec<String>,
}

impl Default for ComputedEngine {
    fn default() -> Self {
        ComputedEngine {
            state: EngineState::Idle,
            subscriptions: Vec::new(),
            stack: Vec::new(),
        }
    }
}

impl ComputedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Link every computed property to each of its dependencies.
    pub fn subscribe(&mut self, schema: &Schema, channel: &mut ChangeChannel) {
        if self.state != EngineState::Idle {
            return;
        }
        for (property, descriptor) in schema.iter().filter(|(_, d)| d.is_computed()) {
            for dependency in descriptor.dependencies() {
                self.subscriptions.push(channel.link_computed(dependency, property));
            }
        }
        debug!(links = self.subscriptions.len(), "computed properties subscribed");
        self.state = EngineState::Subscribed;
    }

    /// Start recomputing `property`.
    ///
    /// Returns `Ok(false)` when the engine no longer recomputes. Every
    /// `Ok(true)` must be paired with [`ComputedEngine::leave`].
    pub fn enter(&mut self, property: &str) -> Result<bool, ModelError> {
        match &self.state {
            EngineState::Subscribed => {}
            EngineState::Faulted { property } => {
                return Err(ModelError::ComputedFaulted {
                    property: property.clone(),
                })
            }
            EngineState::Idle | EngineState::Disposed => return Ok(false),
        }
        if let Some(position) = self.stack.iter().position(|p| p == property) {
            let mut path = self.stack[position..].to_vec();
            path.push(property.to_string());
            return Err(ModelError::ComputedCycle { path });
        }
        self.stack.push(property.to_string());
        Ok(true)
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    /// Stop recomputing after a failure of `property`.
    pub fn fault(&mut self, property: &str, cause: &ModelError) {
        if let EngineState::Faulted { .. } | EngineState::Disposed = self.state {
            return;
        }
        error!(property, error = %cause, "computed property faulted");
        self.state = EngineState::Faulted {
            property: property.to_string(),
        };
    }

    /// Fail writes that would need a recompute the engine can no longer run.
    pub fn ensure_writable(&self, has_dependents: bool) -> Result<(), ModelError> {
        match &self.state {
            EngineState::Faulted { property } if has_dependents => {
                Err(ModelError::ComputedFaulted {
                    property: property.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Release every dependency subscription. Terminal.
    pub fn dispose(&mut self, channel: &mut ChangeChannel) {
        for id in self.subscriptions.drain(..) {
            channel.unsubscribe(id);
        }
        self.stack.clear();
        self.state = EngineState::Disposed;
    }

    pub fn is_disposed(&self) -> bool {
        self.state == EngineState::Disposed
    }

    pub fn is_active(&self) -> bool {
        self.state == EngineState::Subscribed
    }
}
