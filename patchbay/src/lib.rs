//! # patchbay - In-Process Publish/Subscribe Message Bus
//!
//! `patchbay` decouples the components of a single process: producers
//! publish [`Envelope`]s onto named channels under dot-segmented topics,
//! and consumers subscribe with wildcard bindings (`*` = one segment,
//! `#` = zero or more segments). Dispatch is synchronous, ordered, and
//! reentrant: a callback may publish, subscribe, or unsubscribe while a
//! publish is in flight.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use patchbay::{Envelope, hub, payload};
//!
//! let sub = hub().subscribe("orders", "order.*", |data, envelope| {
//!     println!("{} -> {:?}", envelope.topic, data.downcast_ref::<u64>());
//! })?;
//!
//! hub().publish(Envelope::new("order.created", payload(7_u64)).on_channel("orders"))?;
//! hub().unsubscribe(&sub)?;
//! ```
//!
//! ## Beyond the basics
//!
//! - [`Hub::add_wire_tap`] observes every publish, matched or not.
//! - [`Subscription::use_strategy`] installs middleware links on a
//!   subscription's callback chain (lazily activated).
//! - [`Hub::link_channels`] republishes matching messages onto other
//!   channels, with optional topic remapping.
//! - Subscription lifecycle events are published on the system channel
//!   (see [`SUBSCRIPTION_CREATED`] / [`SUBSCRIPTION_REMOVED`]).

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

mod channel;
mod hub;
mod links;

pub use channel::ChannelHandle;
pub use hub::{
    BusConfig, Hub, SUBSCRIPTION_CREATED, SUBSCRIPTION_REMOVED, SubscriptionEvent, hub,
};
pub use links::{LinkSource, LinkTarget, TopicMapping};

// Core data model and seams
pub use patchbay_core::{
    BoxError, Bus, BusError, Callback, CallbackChain, Constraint, Context, DispatchError,
    Envelope, Next, Payload, Resolver, Strategy, StrategyFn, SubscribeError, Subscription,
    WireTap, WireTapHandle, payload,
};

// Standard implementations
pub use patchbay_std::{BindingResolver, LocalBus};

/// Stock middleware strategies.
pub mod strategies {
    #![allow(clippy::wildcard_imports)]
    pub use patchbay_std::strategies::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use patchbay_std::testing::*;
}

/// Prelude module - common imports for Patchbay.
///
/// # Usage
///
/// ```rust,ignore
/// use patchbay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BusError, Envelope, Hub, LinkSource, LinkTarget, Payload, Strategy, StrategyFn,
        Subscription, hub, payload,
    };
}
