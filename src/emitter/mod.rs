//! Change notification.
//!
//! Every model owns a [`ChangeChannel`]. With the `emitter` feature,
//! [`ModelEmitter`] re-publishes channel events through `event_emitter_rs`.

#[cfg(feature = "emitter")]
mod bridge;
mod channel;

#[cfg(feature = "emitter")]
pub use bridge::ModelEmitter;
pub(crate) use channel::Delivery;
pub use channel::{ChangeChannel, ChangeEvent, Listener, SubscriptionId};
