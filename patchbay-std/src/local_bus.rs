//! The standard in-process dispatch engine.
//!
//! `LocalBus` owns the subscription registry (channel → ordered topic
//! buckets), the wire tap list, and the reentrancy bookkeeping that makes
//! it safe for a callback to publish, subscribe, or unsubscribe while a
//! publish is in flight.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use patchbay_core::{
    Bus, DispatchError, Envelope, Resolver, Subscription, WireTap, WireTapHandle,
};

/// All subscriptions sharing one (channel, topic) pair, in insertion order.
struct Bucket {
    topic: String,
    subscriptions: Vec<Arc<Subscription>>,
}

#[derive(Default)]
struct BusState {
    /// channel -> buckets, bucket order is registration order.
    channels: HashMap<String, Vec<Bucket>>,
    wire_taps: Vec<(u64, WireTap)>,
    next_tap_id: u64,
    /// Publish reentrancy depth, shared across callers.
    depth: usize,
    /// Removals requested while `depth > 0`, drained FIFO at depth zero.
    deferred: VecDeque<Arc<Subscription>>,
}

/// The standard synchronous, reentrant dispatch engine.
///
/// The registry lock is held only while snapshotting or mutating state,
/// never while subscriber callbacks or wire taps run. Dispatch iterates a
/// snapshot of the channel's buckets taken when the publish begins, so a
/// subscription added mid-publish becomes visible to the *next* publish,
/// and a removal requested mid-publish is deferred until the outermost
/// publish unwinds. Inactive subscriptions are filtered at fire time, so a
/// deferred removal still silences its subscription immediately.
pub struct LocalBus {
    resolver: Arc<dyn Resolver>,
    state: Arc<Mutex<BusState>>,
}

impl LocalBus {
    /// Creates an empty bus dispatching through `resolver`.
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            state: Arc::new(Mutex::new(BusState::default())),
        }
    }

    /// Taps first, then every matching bucket in registration order.
    fn fan_out(
        &self,
        envelope: &Envelope,
        taps: &[WireTap],
        buckets: &[(String, Vec<Arc<Subscription>>)],
    ) -> Result<(), DispatchError> {
        for tap in taps {
            tap(&envelope.data, envelope).map_err(DispatchError::WireTap)?;
        }
        for (binding, subscriptions) in buckets {
            if !self.resolver.compare(binding, &envelope.topic) {
                continue;
            }
            for subscription in subscriptions {
                subscription.deliver(envelope);
            }
        }
        Ok(())
    }

    /// Decrements the depth counter; at zero, performs the deferred
    /// removals in request order. Runs on success and failure alike so a
    /// failing wire tap cannot wedge the counter.
    fn unwind(&self) {
        let mut state = self.state.lock().unwrap();
        state.depth -= 1;
        if state.depth == 0 {
            while let Some(subscription) = state.deferred.pop_front() {
                remove_now(&mut state, &subscription);
            }
        }
    }
}

impl Bus for LocalBus {
    fn publish(&self, envelope: Envelope) -> Result<Envelope, DispatchError> {
        let mut envelope = envelope;
        let (taps, buckets) = {
            let mut state = self.state.lock().unwrap();
            state.depth += 1;
            if envelope.timestamp.is_none() {
                envelope.timestamp = Some(Utc::now());
            }
            let taps: Vec<WireTap> = state.wire_taps.iter().map(|(_, tap)| tap.clone()).collect();
            let buckets: Vec<(String, Vec<Arc<Subscription>>)> = state
                .channels
                .get(&envelope.channel)
                .map(|buckets| {
                    buckets
                        .iter()
                        .map(|b| (b.topic.clone(), b.subscriptions.clone()))
                        .collect()
                })
                .unwrap_or_default();
            (taps, buckets)
        };
        tracing::trace!(channel = %envelope.channel, topic = %envelope.topic, "publishing");
        let outcome = self.fan_out(&envelope, &taps, &buckets);
        self.unwind();
        outcome.map(|()| envelope)
    }

    fn subscribe(&self, subscription: Arc<Subscription>) {
        let mut state = self.state.lock().unwrap();
        let buckets = state
            .channels
            .entry(subscription.channel().to_string())
            .or_default();
        match buckets.iter_mut().find(|b| b.topic == subscription.topic()) {
            Some(bucket) => bucket.subscriptions.push(subscription),
            None => buckets.push(Bucket {
                topic: subscription.topic().to_string(),
                subscriptions: vec![subscription],
            }),
        }
    }

    fn unsubscribe(&self, subscription: &Arc<Subscription>) {
        let mut state = self.state.lock().unwrap();
        if state.depth > 0 {
            state.deferred.push_back(subscription.clone());
            return;
        }
        remove_now(&mut state, subscription);
    }

    fn add_wire_tap(&self, tap: WireTap) -> WireTapHandle {
        let id = {
            let mut state = self.state.lock().unwrap();
            let id = state.next_tap_id;
            state.next_tap_id += 1;
            state.wire_taps.push((id, tap));
            id
        };
        let state = Arc::downgrade(&self.state);
        WireTapHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state.lock().unwrap().wire_taps.retain(|(tid, _)| *tid != id);
            }
        })
    }

    fn subscribers_for(&self, channel: &str, topic: &str) -> Vec<Arc<Subscription>> {
        let state = self.state.lock().unwrap();
        state
            .channels
            .get(channel)
            .and_then(|buckets| buckets.iter().find(|b| b.topic == topic))
            .map(|b| b.subscriptions.clone())
            .unwrap_or_default()
    }

    fn subscriptions(&self) -> Vec<Arc<Subscription>> {
        let state = self.state.lock().unwrap();
        state
            .channels
            .values()
            .flat_map(|buckets| buckets.iter())
            .flat_map(|b| b.subscriptions.iter().cloned())
            .collect()
    }

    fn clear(&self) {
        self.state.lock().unwrap().channels.clear();
    }
}

/// Reference-identity removal preserving the order of the survivors.
/// Harmless when the subscription is not registered (already removed).
fn remove_now(state: &mut BusState, subscription: &Arc<Subscription>) {
    let Some(buckets) = state.channels.get_mut(subscription.channel()) else {
        return;
    };
    let Some(bucket) = buckets.iter_mut().find(|b| b.topic == subscription.topic()) else {
        return;
    };
    if let Some(pos) = bucket
        .subscriptions
        .iter()
        .position(|s| Arc::ptr_eq(s, subscription))
    {
        bucket.subscriptions.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::BindingResolver;
    use patchbay_core::payload;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bus() -> LocalBus {
        LocalBus::new(Arc::new(BindingResolver::new()))
    }

    fn recording_sub(
        channel: &str,
        topic: &str,
        id: usize,
        order: &Arc<StdMutex<Vec<usize>>>,
    ) -> Arc<Subscription> {
        let order = order.clone();
        Subscription::new(
            channel,
            topic,
            Arc::new(move |_, _| {
                order.lock().unwrap().push(id);
            }),
        )
    }

    #[test]
    fn buckets_fire_in_registration_order() {
        let bus = bus();
        let order = Arc::new(StdMutex::new(Vec::new()));
        bus.subscribe(recording_sub("/", "a.b", 1, &order));
        bus.subscribe(recording_sub("/", "a.*", 2, &order));
        bus.subscribe(recording_sub("/", "a.b", 3, &order));

        bus.publish(Envelope::new("a.b", payload(())).on_channel("/"))
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 3, 2]);
    }

    #[test]
    fn removal_preserves_sibling_order() {
        let bus = bus();
        let order = Arc::new(StdMutex::new(Vec::new()));
        let first = recording_sub("/", "a.b", 1, &order);
        let second = recording_sub("/", "a.b", 2, &order);
        let third = recording_sub("/", "a.b", 3, &order);
        bus.subscribe(first);
        bus.subscribe(second.clone());
        bus.subscribe(third);

        second.deactivate();
        bus.unsubscribe(&second);
        bus.publish(Envelope::new("a.b", payload(())).on_channel("/"))
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 3]);
    }

    #[test]
    fn tap_handle_removal_is_idempotent() {
        let bus = bus();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let handle = bus.add_wire_tap(Arc::new(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.publish(Envelope::new("a.b", payload(())).on_channel("/"))
            .unwrap();
        handle.remove();
        handle.remove();
        bus.publish(Envelope::new("a.b", payload(())).on_channel("/"))
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_drops_subscriptions_but_keeps_taps() {
        let bus = bus();
        let order = Arc::new(StdMutex::new(Vec::new()));
        bus.subscribe(recording_sub("/", "a.b", 1, &order));
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let _handle = bus.add_wire_tap(Arc::new(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.clear();
        bus.publish(Envelope::new("a.b", payload(())).on_channel("/"))
            .unwrap();
        assert!(order.lock().unwrap().is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publish_stamps_unstamped_envelopes_once() {
        let bus = bus();
        let stamped = bus
            .publish(Envelope::new("a.b", payload(())).on_channel("/"))
            .unwrap();
        let stamp = stamped.timestamp.expect("publish must stamp");
        // A pre-stamped envelope keeps its stamp.
        let again = bus.publish(stamped).unwrap();
        assert_eq!(again.timestamp, Some(stamp));
    }
}
