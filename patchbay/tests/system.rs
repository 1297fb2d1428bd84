//! The system channel, lifecycle events, reset, and the process-wide hub.

use patchbay::testing::{CountingCallback, RecordingCallback, RecordingTap};
use patchbay::{
    Envelope, Hub, SUBSCRIPTION_CREATED, SUBSCRIPTION_REMOVED, SubscriptionEvent, hub, payload,
};

#[test]
fn subscription_lifecycle_events_fire_on_the_system_channel() {
    let hub = Hub::new();
    let system = hub.config().system_channel.clone();
    let recorder = RecordingCallback::new();
    // Registered before its own lifecycle event is published, so the first
    // recorded event is the listener's own creation.
    hub.subscribe(&system, "subscription.#", recorder.callback_fn())
        .unwrap();

    let sub = hub.subscribe("app", "a.b", |_, _| {}).unwrap();
    hub.unsubscribe(&sub).unwrap();

    let events: Vec<SubscriptionEvent> = recorder
        .envelopes()
        .iter()
        .map(|e| e.data_as::<SubscriptionEvent>().unwrap().clone())
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event, SUBSCRIPTION_CREATED);
    assert_eq!(events[0].channel, system);
    assert_eq!(
        events[1],
        SubscriptionEvent {
            event: SUBSCRIPTION_CREATED,
            channel: "app".to_string(),
            topic: "a.b".to_string(),
        }
    );
    assert_eq!(
        events[2],
        SubscriptionEvent {
            event: SUBSCRIPTION_REMOVED,
            channel: "app".to_string(),
            topic: "a.b".to_string(),
        }
    );
}

#[test]
fn unsubscribe_is_idempotent() {
    let hub = Hub::new();
    let sub = hub.subscribe("app", "a.b", |_, _| {}).unwrap();

    let system = hub.config().system_channel.clone();
    let removals = CountingCallback::new();
    hub.subscribe(&system, SUBSCRIPTION_REMOVED, removals.callback_fn())
        .unwrap();

    hub.unsubscribe(&sub).unwrap();
    hub.unsubscribe(&sub).unwrap();

    assert!(!sub.is_active());
    assert_eq!(removals.count(), 1, "the second unsubscribe is a no-op");
}

#[test]
fn reset_all_leaves_a_fresh_bus() {
    let hub = Hub::new();
    let counter = CountingCallback::new();
    hub.subscribe("app", "a.#", counter.callback_fn()).unwrap();
    hub.publish(Envelope::new("a.b", payload(())).on_channel("app"))
        .unwrap();
    assert_eq!(counter.count(), 1);

    hub.reset_all().unwrap();

    // No residual subscriptions fire, no residual cache hits resurrect them.
    hub.publish(Envelope::new("a.b", payload(())).on_channel("app"))
        .unwrap();
    assert_eq!(counter.count(), 1);
    assert_eq!(hub.subscribers_for("app", "a.#").len(), 0);

    // Re-subscribing behaves as if the bus were freshly created.
    hub.subscribe("app", "a.#", counter.callback_fn()).unwrap();
    hub.publish(Envelope::new("a.b", payload(())).on_channel("app"))
        .unwrap();
    assert_eq!(counter.count(), 2);
}

#[test]
fn reset_all_unsubscribes_through_the_normal_path() {
    let hub = Hub::new();
    hub.subscribe("app", "a.b", |_, _| {}).unwrap();
    hub.subscribe("app", "c.d", |_, _| {}).unwrap();

    // Wire taps survive a reset and see every publish, so they observe the
    // removal notifications regardless of unsubscribe order.
    let tap = RecordingTap::new();
    let _keep = hub.add_wire_tap(tap.tap());

    hub.reset_all().unwrap();

    let removed = tap
        .topics()
        .iter()
        .filter(|topic| topic.as_str() == SUBSCRIPTION_REMOVED)
        .count();
    assert_eq!(removed, 2);
}

// The process-wide default instance is shared state, so everything touching
// it lives in this single test.
#[test]
fn the_global_hub_is_shared_and_resettable() {
    let counter = CountingCallback::new();
    hub().subscribe("app", "g.*", counter.callback_fn()).unwrap();
    hub()
        .publish(Envelope::new("g.x", payload(())).on_channel("app"))
        .unwrap();
    assert_eq!(counter.count(), 1);

    hub().reset_all().unwrap();
    hub()
        .publish(Envelope::new("g.x", payload(())).on_channel("app"))
        .unwrap();
    assert_eq!(counter.count(), 1);
}
