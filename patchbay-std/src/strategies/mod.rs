//! Stock middleware strategies.
//!
//! These cover the two most common chain uses: observing deliveries
//! ([`LoggingStrategy`]) and gating them ([`FilterStrategy`]). Anything
//! fancier is a small [`StrategyFn`](patchbay_core::StrategyFn) away.

mod filter;
mod logging;

pub use filter::FilterStrategy;
pub use logging::LoggingStrategy;
