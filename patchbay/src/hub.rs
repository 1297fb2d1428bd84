//! The hub: configuration, public operations, and lifecycle notifications.

use std::sync::Arc;

use once_cell::sync::Lazy;
use patchbay_core::{
    Bus, BusError, Envelope, Payload, Resolver, SubscribeError, Subscription, WireTap,
    WireTapHandle, payload,
};
use patchbay_std::{BindingResolver, LocalBus};

use crate::channel::ChannelHandle;

/// System-channel topic published when a subscription is created.
pub const SUBSCRIPTION_CREATED: &str = "subscription.created";

/// System-channel topic published when a subscription is removed.
pub const SUBSCRIPTION_REMOVED: &str = "subscription.removed";

/// Names the two channels every hub owns.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Where envelopes and subscriptions without an explicit channel go.
    pub default_channel: String,
    /// Where subscription lifecycle events are published. Any component may
    /// subscribe to it like any other channel.
    pub system_channel: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            default_channel: "/".to_string(),
            system_channel: "patchbay".to_string(),
        }
    }
}

/// The payload of [`SUBSCRIPTION_CREATED`] / [`SUBSCRIPTION_REMOVED`]
/// lifecycle events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionEvent {
    /// The lifecycle topic this event was published under.
    pub event: &'static str,
    /// The channel of the subscription concerned.
    pub channel: String,
    /// The topic binding of the subscription concerned.
    pub topic: String,
}

struct HubInner {
    config: BusConfig,
    resolver: Arc<dyn Resolver>,
    bus: Arc<dyn Bus>,
}

/// An in-process message bus.
///
/// A `Hub` is cheap to clone (all clones share the same bus) and safe to
/// use from any thread. Most programs use the process-wide default
/// instance through [`hub()`]; tests usually construct their own with
/// [`Hub::new`] for isolation.
///
/// # Example
///
/// ```rust,ignore
/// let hub = Hub::new();
/// let sub = hub.subscribe("orders", "order.*", |data, envelope| {
///     println!("{}: {:?}", envelope.topic, data.downcast_ref::<u32>());
/// })?;
/// hub.publish(Envelope::new("order.created", payload(7_u32)).on_channel("orders"))?;
/// hub.unsubscribe(&sub)?;
/// ```
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    /// A hub with the default configuration, resolver, and engine.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// A hub with custom channel names and the standard resolver/engine.
    pub fn with_config(config: BusConfig) -> Self {
        let resolver: Arc<dyn Resolver> = Arc::new(BindingResolver::new());
        let bus: Arc<dyn Bus> = Arc::new(LocalBus::new(resolver.clone()));
        Self::with_parts(config, resolver, bus)
    }

    /// A hub with a custom matcher and/or dispatch engine.
    ///
    /// The engine is expected to dispatch through the same `resolver` so
    /// that [`Hub::reset_all`] invalidates the caches it actually uses.
    pub fn with_parts(config: BusConfig, resolver: Arc<dyn Resolver>, bus: Arc<dyn Bus>) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                resolver,
                bus,
            }),
        }
    }

    /// The hub's channel names.
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    fn resolve_channel<'a>(&'a self, channel: &'a str) -> &'a str {
        if channel.is_empty() {
            &self.inner.config.default_channel
        } else {
            channel
        }
    }

    /// Subscribes `callback` to `topic` on `channel`.
    ///
    /// An empty channel name resolves to the default channel; an empty
    /// topic is rejected with [`SubscribeError::EmptyTopic`]. The
    /// subscription is registered first, then a [`SUBSCRIPTION_CREATED`]
    /// event is published on the system channel.
    pub fn subscribe(
        &self,
        channel: &str,
        topic: &str,
        callback: impl Fn(&Payload, &Envelope) + Send + Sync + 'static,
    ) -> Result<Arc<Subscription>, BusError> {
        if topic.is_empty() {
            return Err(SubscribeError::EmptyTopic.into());
        }
        let channel = self.resolve_channel(channel);
        let subscription = Subscription::new(channel, topic, Arc::new(callback));
        self.inner.bus.subscribe(subscription.clone());
        tracing::debug!(channel, topic, "subscription created");
        self.notify(SUBSCRIPTION_CREATED, &subscription)?;
        Ok(subscription)
    }

    /// Publishes an envelope, returning it stamped.
    ///
    /// An empty channel resolves to the default channel. Publishing to a
    /// channel or topic without subscribers is a harmless no-op; the only
    /// error a publish can produce is a failing wire tap.
    pub fn publish(&self, envelope: Envelope) -> Result<Envelope, BusError> {
        let mut envelope = envelope;
        if envelope.channel.is_empty() {
            envelope.channel = self.inner.config.default_channel.clone();
        }
        Ok(self.inner.bus.publish(envelope)?)
    }

    /// Deactivates and removes a subscription.
    ///
    /// Idempotent: the first call flips the subscription inactive, removes
    /// it from the registry (deferred if a publish is in flight) and
    /// publishes a [`SUBSCRIPTION_REMOVED`] event; later calls do nothing.
    pub fn unsubscribe(&self, subscription: &Arc<Subscription>) -> Result<(), BusError> {
        if !subscription.deactivate() {
            return Ok(());
        }
        self.inner.bus.unsubscribe(subscription);
        tracing::debug!(
            channel = subscription.channel(),
            topic = subscription.topic(),
            "subscription removed"
        );
        self.notify(SUBSCRIPTION_REMOVED, subscription)
    }

    /// Registers a wire tap observing every publish on this hub.
    ///
    /// The returned handle removes this exact tap; removing twice is a
    /// no-op.
    pub fn add_wire_tap(&self, tap: WireTap) -> WireTapHandle {
        self.inner.bus.add_wire_tap(tap)
    }

    /// The subscriptions registered under exactly this (channel, topic)
    /// pair, in insertion order. No wildcard matching; empty channel
    /// resolves to the default channel.
    pub fn subscribers_for(&self, channel: &str, topic: &str) -> Vec<Arc<Subscription>> {
        self.inner
            .bus
            .subscribers_for(self.resolve_channel(channel), topic)
    }

    /// A handle for subscribing and publishing on one channel.
    ///
    /// An empty name resolves to the default channel.
    pub fn channel(&self, name: &str) -> ChannelHandle {
        ChannelHandle::new(self.clone(), self.resolve_channel(name).to_string())
    }

    /// Unsubscribes everything and clears every cache.
    ///
    /// Every subscription goes through the normal unsubscribe path, so
    /// system-channel notifications still fire. Afterwards the hub behaves
    /// as if freshly created, except that wire taps survive a reset.
    /// Intended for test isolation.
    pub fn reset_all(&self) -> Result<(), BusError> {
        for subscription in self.inner.bus.subscriptions() {
            self.unsubscribe(&subscription)?;
        }
        self.inner.bus.clear();
        self.inner.resolver.reset();
        Ok(())
    }

    fn notify(&self, event: &'static str, subscription: &Subscription) -> Result<(), BusError> {
        let data = payload(SubscriptionEvent {
            event,
            channel: subscription.channel().to_string(),
            topic: subscription.topic().to_string(),
        });
        self.inner
            .bus
            .publish(Envelope::new(event, data).on_channel(self.inner.config.system_channel.as_str()))?;
        Ok(())
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_HUB: Lazy<Hub> = Lazy::new(Hub::new);

/// The process-wide default hub.
///
/// Call [`Hub::reset_all`] on it between tests that share it.
pub fn hub() -> &'static Hub {
    &DEFAULT_HUB
}
