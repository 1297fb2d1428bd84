//! # patchbay-core
//!
//! Core types and traits for the Patchbay in-process message bus.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! custom resolvers, bus engines, and strategies that don't need the full
//! `patchbay-std` implementation.
//!
//! # The pieces
//!
//! ## Envelope
//!
//! The message unit: channel, dot-segmented topic, opaque shared payload,
//! and the timestamp stamped by the dispatcher. See [`Envelope`].
//!
//! ## Subscription + CallbackChain
//!
//! A [`Subscription`] associates a channel and a wildcard topic binding
//! with a [`CallbackChain`] and a set of delivery [`Constraint`]s. The
//! chain starts out as the bare callback and pays no indirection cost
//! until the first [`Strategy`] is installed; from then on deliveries
//! thread a `next` continuation through the ordered middleware links.
//!
//! ## Seams
//!
//! Two traits keep the engine pluggable without touching the public
//! surface: [`Resolver`] (the wildcard topic matcher) and [`Bus`] (the
//! registry + publish pipeline). Standard implementations live in
//! `patchbay-std`.
//!
//! # Error types
//!
//! - [`BusError`] - Top-level error type
//! - [`SubscribeError`] - Subscription validation failures
//! - [`DispatchError`] - Publish pipeline failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bus;
mod chain;
mod envelope;
mod error;
mod resolver;
mod strategy;
mod subscription;

// Re-exports
pub use bus::{Bus, WireTap, WireTapHandle};
pub use chain::CallbackChain;
pub use envelope::{Envelope, Payload, payload};
pub use error::{BoxError, BusError, DispatchError, SubscribeError};
pub use resolver::Resolver;
pub use strategy::{Next, Strategy, StrategyFn};
pub use subscription::{Callback, Constraint, Context, Subscription};
