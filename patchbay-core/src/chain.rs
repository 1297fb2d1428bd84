//! The lazily-activated callback chain owned by each subscription.
//!
//! A fresh chain is nothing more than the subscriber's callback: invoking it
//! calls the target directly, with no indirection beyond a single tag check.
//! The first [`use_strategy`](CallbackChain::use_strategy) or
//! [`set_context`](CallbackChain::set_context) call activates the chain,
//! installing the dispatcher that threads a `next` continuation through the
//! ordered middleware links. Activation is monotonic: once chained, a chain
//! never reverts to the direct form, even after [`reset`](CallbackChain::reset).

use std::sync::{Arc, Mutex};

use crate::envelope::{Envelope, Payload};
use crate::strategy::Strategy;
use crate::subscription::{Callback, Context};

enum ChainState {
    /// The chain *is* the original callback.
    Direct { target: Callback },
    /// The middleware dispatcher has been installed.
    Chained {
        target: Callback,
        links: Vec<Arc<dyn Strategy>>,
        context: Option<Context>,
    },
}

/// An ordered, lazily-activated middleware pipeline wrapping a subscription's
/// terminal callback.
///
/// The internal lock is never held while user code runs, so a link may
/// safely mutate its own chain (or publish) from inside `invoke`.
pub struct CallbackChain {
    state: Mutex<ChainState>,
}

impl CallbackChain {
    /// Wraps a callback in an inactive chain.
    pub fn direct(target: Callback) -> Self {
        Self {
            state: Mutex::new(ChainState::Direct { target }),
        }
    }

    /// Convenience constructor taking a plain closure.
    pub fn new(target: impl Fn(&Payload, &Envelope) + Send + Sync + 'static) -> Self {
        Self::direct(Arc::new(target))
    }

    /// Delivers a message through the chain.
    pub fn invoke(&self, data: &Payload, envelope: &Envelope) {
        let (target, links, context) = {
            let state = self.state.lock().unwrap();
            match &*state {
                ChainState::Direct { target } => (target.clone(), None, None),
                ChainState::Chained {
                    target,
                    links,
                    context,
                } => (target.clone(), Some(links.clone()), context.clone()),
            }
        };
        match links {
            None => target(data, envelope),
            Some(links) => run_links(&links, &target, context.as_ref(), data, envelope),
        }
    }

    /// Installs a middleware link, activating the chain if necessary.
    ///
    /// A link whose name matches an existing one replaces it in place,
    /// preserving its position; otherwise the link is appended.
    pub fn use_strategy(&self, link: Arc<dyn Strategy>) {
        let mut state = self.state.lock().unwrap();
        match &mut *state {
            ChainState::Direct { target } => {
                let target = target.clone();
                *state = ChainState::Chained {
                    target,
                    links: vec![link],
                    context: None,
                };
            }
            ChainState::Chained { links, .. } => {
                match links.iter().position(|l| l.name() == link.name()) {
                    Some(pos) => links[pos] = link,
                    None => links.push(link),
                }
            }
        }
    }

    /// The chain-level invocation context, if one was set.
    pub fn context(&self) -> Option<Context> {
        match &*self.state.lock().unwrap() {
            ChainState::Direct { .. } => None,
            ChainState::Chained { context, .. } => context.clone(),
        }
    }

    /// Sets the invocation context passed to links without one of their own.
    ///
    /// Like [`use_strategy`](Self::use_strategy), this activates the chain.
    pub fn set_context(&self, context: Context) {
        let mut state = self.state.lock().unwrap();
        match &mut *state {
            ChainState::Direct { target } => {
                let target = target.clone();
                *state = ChainState::Chained {
                    target,
                    links: Vec::new(),
                    context: Some(context),
                };
            }
            ChainState::Chained { context: slot, .. } => *slot = Some(context),
        }
    }

    /// Removes every middleware link.
    ///
    /// The chain stays activated: the dispatcher remains installed and the
    /// context, if any, is kept.
    pub fn reset(&self) {
        if let ChainState::Chained { links, .. } = &mut *self.state.lock().unwrap() {
            links.clear();
        }
    }

    /// The names of the installed links, in chain order.
    pub fn strategy_names(&self) -> Vec<String> {
        match &*self.state.lock().unwrap() {
            ChainState::Direct { .. } => Vec::new(),
            ChainState::Chained { links, .. } => {
                links.iter().map(|l| l.name().to_string()).collect()
            }
        }
    }

    /// Whether the middleware dispatcher has been installed.
    pub fn is_chained(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), ChainState::Chained { .. })
    }

    /// The original terminal callback.
    pub fn target(&self) -> Callback {
        match &*self.state.lock().unwrap() {
            ChainState::Direct { target } | ChainState::Chained { target, .. } => target.clone(),
        }
    }
}

/// Threads the `next` continuation through `links`, terminating at `target`.
fn run_links(
    links: &[Arc<dyn Strategy>],
    target: &Callback,
    chain_ctx: Option<&Context>,
    data: &Payload,
    envelope: &Envelope,
) {
    match links.split_first() {
        None => target(data, envelope),
        Some((head, rest)) => {
            let next = |d: &Payload, e: &Envelope| run_links(rest, target, chain_ctx, d, e);
            let own = head.context();
            head.invoke(own.as_ref().or(chain_ctx), &next, data, envelope);
        }
    }
}
