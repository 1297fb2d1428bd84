//! Filter strategy - gate deliveries on a predicate.

use patchbay_core::{Context, Envelope, Next, Payload, Strategy};

/// A strategy that forwards a delivery only when the predicate passes.
///
/// Unlike a subscription constraint, a filter sits *inside* the callback
/// chain: it can be replaced by name, reordered against other links, and
/// removed with `reset`.
///
/// # Example
///
/// ```rust,ignore
/// subscription.use_strategy(Arc::new(FilterStrategy::new("evens", |data, _| {
///     data.downcast_ref::<u32>().is_some_and(|n| n % 2 == 0)
/// })));
/// ```
pub struct FilterStrategy {
    name: String,
    predicate: Box<dyn Fn(&Payload, &Envelope) -> bool + Send + Sync>,
}

impl FilterStrategy {
    /// Creates a named filter from a predicate.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&Payload, &Envelope) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl Strategy for FilterStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, _ctx: Option<&Context>, next: Next<'_>, data: &Payload, envelope: &Envelope) {
        if (self.predicate)(data, envelope) {
            next(data, envelope);
        }
    }
}
