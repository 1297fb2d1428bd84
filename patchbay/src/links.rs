//! Channel links: republish matching messages from source channels onto
//! destination channels, with optional topic remapping.
//!
//! Links are built entirely from the public subscribe/publish operations:
//! each link is an ordinary subscription whose callback clones the inbound
//! envelope, rewrites channel and topic, and republishes. Tearing a link
//! down is therefore just [`Hub::unsubscribe`] on the returned
//! subscriptions.

use std::sync::Arc;

use patchbay_core::{BusError, Envelope, Subscription};

use crate::hub::Hub;

/// One side of the source set of a link: a channel and a topic binding.
///
/// Omitted parts fall back to the default channel and the match-everything
/// binding `#`.
#[derive(Clone, Default)]
pub struct LinkSource {
    channel: Option<String>,
    topic: Option<String>,
}

impl LinkSource {
    /// A source matching everything on the default channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the source to a channel.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Restricts the source to a topic binding (wildcards allowed).
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// How a link rewrites the topic of a republished envelope.
#[derive(Clone)]
pub enum TopicMapping {
    /// Keep the source topic unchanged.
    Source,
    /// Replace it with a fixed topic.
    Fixed(String),
    /// Derive it from the source topic.
    Transform(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl TopicMapping {
    fn apply(&self, original: &str) -> String {
        match self {
            TopicMapping::Source => original.to_string(),
            TopicMapping::Fixed(topic) => topic.clone(),
            TopicMapping::Transform(f) => f(original),
        }
    }
}

/// One side of the destination set of a link.
///
/// An omitted channel falls back to the default channel; the topic mapping
/// defaults to keeping the source topic.
#[derive(Clone)]
pub struct LinkTarget {
    channel: Option<String>,
    topic: TopicMapping,
}

impl LinkTarget {
    /// A target on the default channel keeping the source topic.
    pub fn new() -> Self {
        Self {
            channel: None,
            topic: TopicMapping::Source,
        }
    }

    /// Republishes onto a specific channel.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Republishes under a fixed topic.
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = TopicMapping::Fixed(topic.into());
        self
    }

    /// Republishes under a topic derived from the source topic.
    pub fn map_topic(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.topic = TopicMapping::Transform(Arc::new(f));
        self
    }
}

impl Default for LinkTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    /// Links every source to every destination (cartesian product).
    ///
    /// Each created link subscription clones the inbound envelope,
    /// overwrites its channel and topic per the target, clears the stamp
    /// (the republish gets its own) and publishes it again. The created
    /// subscriptions are returned so the caller can tear the link down via
    /// [`Hub::unsubscribe`].
    pub fn link_channels(
        &self,
        sources: impl IntoIterator<Item = LinkSource>,
        targets: impl IntoIterator<Item = LinkTarget>,
    ) -> Result<Vec<Arc<Subscription>>, BusError> {
        let targets: Vec<LinkTarget> = targets.into_iter().collect();
        let mut links = Vec::new();
        for source in sources {
            let source_channel = source.channel.clone().unwrap_or_default();
            let source_topic = source.topic.clone().unwrap_or_else(|| "#".to_string());
            for target in &targets {
                let hub = self.clone();
                let destination = target
                    .channel
                    .clone()
                    .unwrap_or_else(|| self.config().default_channel.clone());
                let mapping = target.topic.clone();
                let subscription =
                    self.subscribe(&source_channel, &source_topic, move |data, envelope| {
                        let forwarded = Envelope::new(mapping.apply(&envelope.topic), data.clone())
                            .on_channel(destination.as_str());
                        if let Err(err) = hub.publish(forwarded) {
                            tracing::warn!(%err, "channel link republish failed");
                        }
                    })?;
                links.push(subscription);
            }
        }
        Ok(links)
    }
}
