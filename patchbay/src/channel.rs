//! Per-channel convenience handles.

use std::sync::Arc;

use patchbay_core::{BusError, Envelope, Payload, Subscription};

use crate::hub::Hub;

/// A thin wrapper binding one channel name, so call sites don't repeat it.
///
/// Obtained from [`Hub::channel`]; everything forwards into the hub.
#[derive(Clone)]
pub struct ChannelHandle {
    hub: Hub,
    channel: String,
}

impl ChannelHandle {
    pub(crate) fn new(hub: Hub, channel: String) -> Self {
        Self { hub, channel }
    }

    /// The resolved channel name.
    pub fn name(&self) -> &str {
        &self.channel
    }

    /// Subscribes on this channel. See [`Hub::subscribe`].
    pub fn subscribe(
        &self,
        topic: &str,
        callback: impl Fn(&Payload, &Envelope) + Send + Sync + 'static,
    ) -> Result<Arc<Subscription>, BusError> {
        self.hub.subscribe(&self.channel, topic, callback)
    }

    /// Publishes on this channel. See [`Hub::publish`].
    pub fn publish(&self, topic: &str, data: Payload) -> Result<Envelope, BusError> {
        self.hub
            .publish(Envelope::new(topic, data).on_channel(self.channel.as_str()))
    }
}
