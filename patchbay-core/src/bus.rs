//! The dispatch engine seam.
//!
//! A [`Bus`] owns the subscription registry and runs the publish pipeline.
//! The standard implementation lives in `patchbay-std` (`LocalBus`); a
//! custom engine can be plugged into a hub, keeping the public surface and
//! the rest of the stack unchanged.

use std::sync::{Arc, Mutex};

use crate::envelope::{Envelope, Payload};
use crate::error::{BoxError, DispatchError};
use crate::subscription::Subscription;

/// An observer invoked for every publish on the bus, independent of
/// subscription matching.
///
/// Wire taps run before dispatch, in registration order. A tap returning an
/// error aborts the remainder of that publish call.
pub type WireTap = Arc<dyn Fn(&Payload, &Envelope) -> Result<(), BoxError> + Send + Sync>;

/// Removes the wire tap it was returned for.
///
/// [`remove`](WireTapHandle::remove) is idempotent: the second and later
/// calls are no-ops.
pub struct WireTapHandle {
    remove: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl WireTapHandle {
    /// Wraps the removal action for a just-registered tap.
    pub fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Mutex::new(Some(Box::new(remove))),
        }
    }

    /// Removes the tap. No-op if already removed.
    pub fn remove(&self) {
        if let Some(remove) = self.remove.lock().unwrap().take() {
            remove();
        }
    }
}

/// The underlying dispatch engine of a hub.
///
/// Dispatch is synchronous and reentrant: `publish` runs to completion on
/// the caller's thread, and a subscriber callback may itself publish.
/// Removal requests made while a publish is in flight must be deferred
/// until the outermost publish unwinds.
pub trait Bus: Send + Sync + 'static {
    /// Runs the publish pipeline: stamps the envelope, notifies wire taps,
    /// dispatches to matching subscriptions, and drains deferred removals
    /// once the outermost publish completes. Returns the stamped envelope.
    fn publish(&self, envelope: Envelope) -> Result<Envelope, DispatchError>;

    /// Registers a subscription; append-only bucket ordering.
    fn subscribe(&self, subscription: Arc<Subscription>);

    /// Removes a subscription by reference identity, or queues the removal
    /// when a publish is in flight.
    fn unsubscribe(&self, subscription: &Arc<Subscription>);

    /// Registers a wire tap and returns its removal handle.
    fn add_wire_tap(&self, tap: WireTap) -> WireTapHandle;

    /// The exact-bucket lookup: subscriptions registered under precisely
    /// this (channel, topic) pair, in insertion order. No wildcard
    /// matching is applied.
    fn subscribers_for(&self, channel: &str, topic: &str) -> Vec<Arc<Subscription>>;

    /// A snapshot of every registered subscription.
    fn subscriptions(&self) -> Vec<Arc<Subscription>>;

    /// Drops every subscription. Wire taps survive.
    fn clear(&self);
}
