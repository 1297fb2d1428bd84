//! # patchbay-std
//!
//! Standard implementations for the Patchbay message bus.
//!
//! This crate provides:
//! - **Topic matching**: [`BindingResolver`], the regex-backed wildcard
//!   matcher with compilation and outcome caches
//! - **Dispatch**: [`LocalBus`], the synchronous, reentrant in-process
//!   engine behind the default hub
//! - **Stock strategies**: logging and filtering middleware links
//! - **Testing utilities**: recording/counting callbacks and wire taps

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use patchbay_core;

// Modules
mod local_bus;
mod resolver;
pub mod strategies;
pub mod testing;

pub use local_bus::LocalBus;
pub use resolver::BindingResolver;
