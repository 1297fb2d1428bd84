//! The message unit carried by the bus.
//!
//! An [`Envelope`] bundles a channel name, a dot-segmented topic, an opaque
//! payload, and the timestamp stamped by the dispatcher. Payloads are shared
//! behind an `Arc`, so cloning an envelope never copies message data.

use std::{any::Any, fmt, sync::Arc};

use chrono::{DateTime, Utc};

/// An opaque, shareable message payload.
///
/// Subscribers recover the concrete type with [`Envelope::data_as`].
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Boxes a value into a [`Payload`].
///
/// # Example
///
/// ```rust,ignore
/// let envelope = Envelope::new("order.created", payload(OrderCreated { id: 7 }));
/// ```
pub fn payload<T: Send + Sync + 'static>(value: T) -> Payload {
    Arc::new(value)
}

/// The message unit carrying channel, topic, payload data, and timestamp.
///
/// An envelope with an empty `channel` is routed to the configured default
/// channel when it is published. The `timestamp` is set by the dispatcher
/// exactly once per publish call, and only if not already present, so a
/// recursive publish from inside a callback gets its own stamp.
#[derive(Clone)]
pub struct Envelope {
    /// The namespace this message is published under.
    pub channel: String,
    /// The dot-segmented topic string, e.g. `"order.created"`.
    pub topic: String,
    /// The message payload.
    pub data: Payload,
    /// Stamped by the dispatcher when the envelope enters `publish`.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Envelope {
    /// Creates an envelope for the default channel.
    pub fn new(topic: impl Into<String>, data: Payload) -> Self {
        Self {
            channel: String::new(),
            topic: topic.into(),
            data,
            timestamp: None,
        }
    }

    /// Addresses the envelope to a specific channel.
    pub fn on_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Downcasts the payload to a concrete type.
    ///
    /// Returns `None` when the payload holds a different type.
    pub fn data_as<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("channel", &self.channel)
            .field("topic", &self.topic)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}
