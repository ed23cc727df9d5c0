use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification published after a property changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Top-level property the change is published under.
    pub property: String,
    /// Full path that was written; equals `property` for plain writes.
    pub path: String,
    pub value: Value,
    pub old_value: Option<Value>,
}

/// External change listener.
pub type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle returned by subscriptions, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Subscriber {
    Listener(Listener),
    Computed(String),
}

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every property.
    topic: Option<String>,
    subscriber: Subscriber,
}

/// Work the model must carry out for one published event.
pub(crate) enum Delivery {
    Notify(Listener),
    Recompute(String),
}

/// Publish/subscribe channel keyed by property name.
///
/// Computed properties and external listeners share the channel and are served
/// in subscription order.
#[derive(Default)]
pub struct ChangeChannel {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl ChangeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, property: impl Into<String>, listener: Listener) -> SubscriptionId {
        self.push(Some(property.into()), Subscriber::Listener(listener))
    }

    pub fn subscribe_all(&mut self, listener: Listener) -> SubscriptionId {
        self.push(None, Subscriber::Listener(listener))
    }

    /// Recompute `target` whenever `dependency` changes.
    pub(crate) fn link_computed(&mut self, dependency: &str, target: &str) -> SubscriptionId {
        self.push(
            Some(dependency.to_string()),
            Subscriber::Computed(target.to_string()),
        )
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    /// Work due for a change of `property`, in subscription order.
    pub(crate) fn deliveries(&self, property: &str) -> Vec<Delivery> {
        self.subscriptions
            .iter()
            .filter(|s| s.topic.as_deref().map_or(true, |topic| topic == property))
            .map(|s| match &s.subscriber {
                Subscriber::Listener(listener) => Delivery::Notify(Arc::clone(listener)),
                Subscriber::Computed(target) => Delivery::Recompute(target.clone()),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| matches!(s.subscriber, Subscriber::Listener(_)))
            .count()
    }

    pub fn computed_link_count(&self) -> usize {
        self.subscriptions.len() - self.listener_count()
    }

    fn push(&mut self, topic: Option<String>, subscriber: Subscriber) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            topic,
            subscriber,
        });
        id
    }
}

impl fmt::Debug for ChangeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeChannel")
            .field("listeners", &self.listener_count())
            .field("computed_links", &self.computed_link_count())
            .finish()
    }
}
