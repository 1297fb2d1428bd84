//! Logging strategy for delivery observation.

use patchbay_core::{Context, Envelope, Next, Payload, Strategy};

/// A strategy that logs every delivery flowing through the chain, then
/// forwards it unchanged.
pub struct LoggingStrategy {
    name: String,
}

impl LoggingStrategy {
    /// Creates the strategy under its default name, `"logging"`.
    pub fn new() -> Self {
        Self::named("logging")
    }

    /// Creates the strategy under a custom name, so several instances can
    /// coexist in one chain.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LoggingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for LoggingStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, _ctx: Option<&Context>, next: Next<'_>, data: &Payload, envelope: &Envelope) {
        tracing::debug!(channel = %envelope.channel, topic = %envelope.topic, "delivering message");
        next(data, envelope);
    }
}
