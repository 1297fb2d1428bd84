use std::sync::{Arc, Mutex};

use patchbay::{Envelope, Payload};

/// A callback that appends `label` to the shared order log on every fire.
pub fn labeled(
    order: &Arc<Mutex<Vec<&'static str>>>,
    label: &'static str,
) -> impl Fn(&Payload, &Envelope) + Send + Sync + use<> {
    let order = order.clone();
    move |_, _| order.lock().unwrap().push(label)
}

/// A fresh shared order log.
pub fn order_log() -> Arc<Mutex<Vec<&'static str>>> {
    Arc::new(Mutex::new(Vec::new()))
}
