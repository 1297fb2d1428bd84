//! Middleware links for subscription callback chains.
//!
//! A [`Strategy`] wraps the delivery of a message to a subscriber: it
//! receives the `next` continuation along with the message and decides
//! whether to forward (optionally with transformed arguments) or to
//! short-circuit delivery by not calling `next` at all.
//!
//! Strategies are named. Installing a strategy whose name matches one
//! already in a chain replaces it in place, preserving its position.

use std::sync::Arc;

use crate::envelope::{Envelope, Payload};
use crate::subscription::Context;

/// The continuation handed to a strategy.
///
/// Calling it forwards the message to the next link in the chain (or to the
/// terminal callback). A strategy may pass transformed arguments, or skip
/// the call entirely to stop delivery.
pub type Next<'a> = &'a dyn Fn(&Payload, &Envelope);

/// A named middleware link in a subscription's callback chain.
///
/// # Example
///
/// ```rust,ignore
/// struct Uppercase;
///
/// impl Strategy for Uppercase {
///     fn name(&self) -> &str {
///         "uppercase"
///     }
///
///     fn invoke(&self, _ctx: Option<&Context>, next: Next<'_>, data: &Payload, envelope: &Envelope) {
///         let mut shouted = envelope.clone();
///         shouted.topic = shouted.topic.to_uppercase();
///         next(data, &shouted);
///     }
/// }
/// ```
pub trait Strategy: Send + Sync + 'static {
    /// The name used for replace-in-place semantics.
    fn name(&self) -> &str;

    /// The link's own invocation context, if it carries one.
    ///
    /// When `None`, the chain's context (if any) is passed to `invoke`
    /// instead.
    fn context(&self) -> Option<Context> {
        None
    }

    /// Called for each delivery flowing through the chain.
    fn invoke(&self, ctx: Option<&Context>, next: Next<'_>, data: &Payload, envelope: &Envelope);
}

/// A [`Strategy`] built from a closure.
///
/// The closure receives the resolved invocation context, the `next`
/// continuation, and the message.
pub struct StrategyFn {
    name: String,
    context: Option<Context>,
    f: Box<dyn Fn(Option<&Context>, Next<'_>, &Payload, &Envelope) + Send + Sync>,
}

impl StrategyFn {
    /// Creates a named strategy from a closure.
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(Option<&Context>, Next<'_>, &Payload, &Envelope) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            context: None,
            f: Box::new(f),
        }
    }

    /// Attaches a link-local context, overriding the chain's context.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Wraps the strategy for installation into a chain.
    pub fn into_arc(self) -> Arc<dyn Strategy> {
        Arc::new(self)
    }
}

impl Strategy for StrategyFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn context(&self) -> Option<Context> {
        self.context.clone()
    }

    fn invoke(&self, ctx: Option<&Context>, next: Next<'_>, data: &Payload, envelope: &Envelope) {
        (self.f)(ctx, next, data, envelope)
    }
}
