//! Testing utilities for Patchbay.
//!
//! This module provides spies for the two sides of the bus:
//!
//! - [`RecordingCallback`] / [`CountingCallback`]: subscriber callbacks
//!   that record or count the envelopes they receive
//! - [`RecordingTap`] / [`FailingTap`]: wire taps that observe every
//!   publish, or fail on purpose to exercise the abort path

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use patchbay_core::{Callback, Envelope, WireTap};

// ============================================================================
// Recording Callback
// ============================================================================

/// A subscriber callback that records every envelope it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingCallback::new();
/// hub.subscribe("/", "order.#", recorder.callback_fn())?;
///
/// hub.publish(Envelope::new("order.created", payload(7_u32)))?;
/// assert_eq!(recorder.topics(), vec!["order.created"]);
/// ```
pub struct RecordingCallback {
    envelopes: Arc<Mutex<Vec<Envelope>>>,
}

impl RecordingCallback {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            envelopes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The callback to subscribe with, as an `Arc`'d [`Callback`].
    pub fn callback(&self) -> Callback {
        let envelopes = self.envelopes.clone();
        Arc::new(move |_, envelope| {
            envelopes.lock().unwrap().push(envelope.clone());
        })
    }

    /// The callback to subscribe with, as a plain closure for APIs taking
    /// `impl Fn`.
    pub fn callback_fn(&self) -> impl Fn(&patchbay_core::Payload, &Envelope) + Send + Sync + use<> {
        let envelopes = self.envelopes.clone();
        move |_, envelope| {
            envelopes.lock().unwrap().push(envelope.clone());
        }
    }

    /// A clone of the recorded envelopes.
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().unwrap().clone()
    }

    /// The recorded topics, in delivery order.
    pub fn topics(&self) -> Vec<String> {
        self.envelopes
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.topic.clone())
            .collect()
    }

    /// How many envelopes were delivered.
    pub fn count(&self) -> usize {
        self.envelopes.lock().unwrap().len()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.envelopes.lock().unwrap().clear();
    }
}

impl Default for RecordingCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingCallback {
    fn clone(&self) -> Self {
        Self {
            envelopes: self.envelopes.clone(),
        }
    }
}

// ============================================================================
// Counting Callback
// ============================================================================

/// A subscriber callback that only counts invocations.
pub struct CountingCallback {
    count: Arc<AtomicUsize>,
}

impl CountingCallback {
    /// Creates a zeroed counter.
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The callback to subscribe with, as an `Arc`'d [`Callback`].
    pub fn callback(&self) -> Callback {
        let count = self.count.clone();
        Arc::new(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// The callback to subscribe with, as a plain closure for APIs taking
    /// `impl Fn`.
    pub fn callback_fn(&self) -> impl Fn(&patchbay_core::Payload, &Envelope) + Send + Sync + use<> {
        let count = self.count.clone();
        move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// The current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Resets the counter to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CountingCallback {
    fn clone(&self) -> Self {
        Self {
            count: self.count.clone(),
        }
    }
}

// ============================================================================
// Wire Taps
// ============================================================================

/// A wire tap that records every envelope crossing the bus.
pub struct RecordingTap {
    envelopes: Arc<Mutex<Vec<Envelope>>>,
}

impl RecordingTap {
    /// Creates an empty tap.
    pub fn new() -> Self {
        Self {
            envelopes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The tap to register with `add_wire_tap`.
    pub fn tap(&self) -> WireTap {
        let envelopes = self.envelopes.clone();
        Arc::new(move |_, envelope| {
            envelopes.lock().unwrap().push(envelope.clone());
            Ok(())
        })
    }

    /// The observed topics, in publish order.
    pub fn topics(&self) -> Vec<String> {
        self.envelopes
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.topic.clone())
            .collect()
    }

    /// How many publishes were observed.
    pub fn count(&self) -> usize {
        self.envelopes.lock().unwrap().len()
    }
}

impl Default for RecordingTap {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingTap {
    fn clone(&self) -> Self {
        Self {
            envelopes: self.envelopes.clone(),
        }
    }
}

/// A wire tap that fails every publish, for exercising the abort path.
pub struct FailingTap {
    message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingTap {
    /// Creates a tap failing with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The tap to register with `add_wire_tap`.
    pub fn tap(&self) -> WireTap {
        let message = self.message.clone();
        let calls = self.calls.clone();
        Arc::new(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(message.clone().into())
        })
    }

    /// How many times the tap was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
