//! Channel links: republishing with channel and topic rewrites.

use patchbay::testing::RecordingCallback;
use patchbay::{Envelope, Hub, LinkSource, LinkTarget, payload};

#[test]
fn mapped_topics_reach_subscribers_on_the_destination_channel() {
    let hub = Hub::new();
    let recorder = RecordingCallback::new();
    hub.subscribe("B", "X.Y", recorder.callback_fn()).unwrap();

    hub.link_channels(
        [LinkSource::new().channel("A").topic("x.#")],
        [LinkTarget::new()
            .channel("B")
            .map_topic(|topic| topic.to_uppercase())],
    )
    .unwrap();

    hub.publish(Envelope::new("x.y", payload(7_u32)).on_channel("A"))
        .unwrap();

    let received = recorder.envelopes();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].channel, "B");
    assert_eq!(received[0].topic, "X.Y");
    assert_eq!(received[0].data_as::<u32>(), Some(&7));
}

#[test]
fn omitted_source_topic_forwards_everything() {
    let hub = Hub::new();
    let recorder = RecordingCallback::new();
    hub.subscribe("mirror", "#", recorder.callback_fn()).unwrap();

    hub.link_channels(
        [LinkSource::new().channel("A")],
        [LinkTarget::new().channel("mirror")],
    )
    .unwrap();

    hub.publish(Envelope::new("some.deep.topic", payload(())).on_channel("A"))
        .unwrap();
    hub.publish(Envelope::new("flat", payload(())).on_channel("A"))
        .unwrap();

    // Topics are kept verbatim when the target specifies no mapping.
    assert_eq!(recorder.topics(), vec!["some.deep.topic", "flat"]);
}

#[test]
fn fixed_target_topics_override_the_source_topic() {
    let hub = Hub::new();
    let recorder = RecordingCallback::new();
    hub.subscribe("B", "normalized", recorder.callback_fn()).unwrap();

    hub.link_channels(
        [LinkSource::new().channel("A").topic("raw.*")],
        [LinkTarget::new().channel("B").topic("normalized")],
    )
    .unwrap();

    hub.publish(Envelope::new("raw.input", payload(())).on_channel("A"))
        .unwrap();
    assert_eq!(recorder.topics(), vec!["normalized"]);
}

#[test]
fn links_cover_the_cartesian_product() {
    let hub = Hub::new();
    let links = hub
        .link_channels(
            [
                LinkSource::new().channel("A"),
                LinkSource::new().channel("B"),
            ],
            [
                LinkTarget::new().channel("X"),
                LinkTarget::new().channel("Y"),
            ],
        )
        .unwrap();
    assert_eq!(links.len(), 4);

    let recorder = RecordingCallback::new();
    hub.subscribe("X", "#", recorder.callback_fn()).unwrap();
    hub.publish(Envelope::new("ping", payload(())).on_channel("A"))
        .unwrap();
    hub.publish(Envelope::new("ping", payload(())).on_channel("B"))
        .unwrap();
    assert_eq!(recorder.count(), 2);
}

#[test]
fn unsubscribing_the_returned_subscriptions_tears_the_link_down() {
    let hub = Hub::new();
    let recorder = RecordingCallback::new();
    hub.subscribe("B", "#", recorder.callback_fn()).unwrap();

    let links = hub
        .link_channels(
            [LinkSource::new().channel("A")],
            [LinkTarget::new().channel("B")],
        )
        .unwrap();

    hub.publish(Envelope::new("one", payload(())).on_channel("A"))
        .unwrap();
    for link in &links {
        hub.unsubscribe(link).unwrap();
    }
    hub.publish(Envelope::new("two", payload(())).on_channel("A"))
        .unwrap();

    assert_eq!(recorder.topics(), vec!["one"]);
}

#[test]
fn republished_envelopes_get_their_own_stamp() {
    let hub = Hub::new();
    let recorder = RecordingCallback::new();
    hub.subscribe("B", "#", recorder.callback_fn()).unwrap();
    hub.link_channels(
        [LinkSource::new().channel("A")],
        [LinkTarget::new().channel("B")],
    )
    .unwrap();

    hub.publish(Envelope::new("evt", payload(())).on_channel("A"))
        .unwrap();
    assert!(recorder.envelopes()[0].timestamp.is_some());
}
