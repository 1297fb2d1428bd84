//! Subscriptions: the durable association of channel, topic binding,
//! callback chain, and constraints that governs delivery.

use std::{
    any::Any,
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::chain::CallbackChain;
use crate::envelope::{Envelope, Payload};
use crate::strategy::Strategy;

/// A subscriber's terminal callback.
pub type Callback = Arc<dyn Fn(&Payload, &Envelope) + Send + Sync>;

/// A delivery guard. Every constraint on a subscription must pass before
/// its callback chain is invoked.
pub type Constraint = Arc<dyn Fn(&Payload, &Envelope) -> bool + Send + Sync>;

/// An opaque invocation context for middleware links.
pub type Context = Arc<dyn Any + Send + Sync>;

/// A single subscription on the bus.
///
/// Subscriptions are handled through `Arc` and compared by reference
/// identity: two subscriptions are never equal by value. The `active` flag
/// flips to `false` exactly once, on unsubscribe, and is checked at fire
/// time, so an inactive subscription never fires, even while it is still
/// physically present in its bucket during the deferred-removal window.
pub struct Subscription {
    channel: String,
    topic: String,
    chain: CallbackChain,
    constraints: Mutex<Vec<Constraint>>,
    active: AtomicBool,
}

impl Subscription {
    /// Creates an active subscription with an inactive callback chain.
    pub fn new(channel: impl Into<String>, topic: impl Into<String>, callback: Callback) -> Arc<Self> {
        Arc::new(Self {
            channel: channel.into(),
            topic: topic.into(),
            chain: CallbackChain::direct(callback),
            constraints: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        })
    }

    /// The channel this subscription listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The topic binding, possibly containing `*` or `#` wildcards.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The callback chain messages are delivered through.
    pub fn chain(&self) -> &CallbackChain {
        &self.chain
    }

    /// Whether the subscription still fires.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Flips the subscription inactive. Returns `true` on the first call
    /// and `false` ever after.
    pub fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    /// Adds a delivery constraint. All constraints must pass for the
    /// callback chain to be invoked.
    pub fn with_constraint(
        self: Arc<Self>,
        constraint: impl Fn(&Payload, &Envelope) -> bool + Send + Sync + 'static,
    ) -> Arc<Self> {
        self.constraints.lock().unwrap().push(Arc::new(constraint));
        self
    }

    /// Sets the chain-level invocation context (activates the chain).
    pub fn with_context(self: Arc<Self>, context: Context) -> Arc<Self> {
        self.chain.set_context(context);
        self
    }

    /// Installs a middleware link on the callback chain.
    pub fn use_strategy(&self, link: Arc<dyn Strategy>) {
        self.chain.use_strategy(link);
    }

    /// Evaluates every constraint against a message. Logical AND.
    pub fn constraints_pass(&self, data: &Payload, envelope: &Envelope) -> bool {
        let constraints = self.constraints.lock().unwrap().clone();
        constraints.iter().all(|c| c(data, envelope))
    }

    /// Delivers a message: no-op if inactive or any constraint rejects,
    /// otherwise the callback chain is invoked.
    ///
    /// Topic matching is the dispatcher's concern and has already happened
    /// by the time this is called.
    pub fn deliver(&self, envelope: &Envelope) {
        if !self.is_active() {
            return;
        }
        if !self.constraints_pass(&envelope.data, envelope) {
            return;
        }
        self.chain.invoke(&envelope.data, envelope);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("topic", &self.topic)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
