//! Error types for Patchbay.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`BusError`] - Top-level error type for all bus operations
//! - [`SubscribeError`] - Validation failures when creating a subscription
//! - [`DispatchError`] - Failures surfaced during a publish call

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all bus operations.
#[derive(Error, Debug)]
pub enum BusError {
    /// A subscription could not be created.
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),

    /// A publish call failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Validation failures when creating a subscription.
///
/// Publishing to a channel or topic nobody subscribed to is *not* an error:
/// unknown destinations are expected and harmless.
#[derive(Error, Debug)]
pub enum SubscribeError {
    /// Topic patterns must contain at least one segment.
    #[error("topic patterns cannot be empty")]
    EmptyTopic,
}

/// Failures surfaced during a publish call.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A wire tap failed. The remainder of the publish call is aborted,
    /// including dispatch to any not-yet-visited subscriptions.
    #[error("wire tap failed")]
    WireTap(#[source] BoxError),
}
