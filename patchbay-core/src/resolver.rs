//! The topic matching seam.
//!
//! A [`Resolver`] decides whether a subscription's topic binding matches a
//! published topic. The standard implementation lives in `patchbay-std`
//! (`BindingResolver`); a custom resolver can be plugged into a hub to
//! change the binding language without touching the dispatch engine.

/// Matches topic bindings against published topics.
///
/// Implementations are expected to memoize aggressively: `compare` sits on
/// the hot path of every publish and is called once per candidate bucket.
pub trait Resolver: Send + Sync + 'static {
    /// Returns `true` when `binding` matches `topic`.
    fn compare(&self, binding: &str, topic: &str) -> bool;

    /// Drops every cached compilation and match outcome.
    ///
    /// Callers must re-compare after a reset; there is no partial
    /// invalidation.
    fn reset(&self);
}
