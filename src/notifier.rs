use std::collections::BTreeSet;

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{Office, SlotTime};

/// Fan-out events, serialized onto every connected subscriber.
///
/// Wire shape matches what clients already consume: a `type` tag plus
/// camelCase fields. `Update` is the full-state snapshot sent once per
/// connection; it never appears on the broadcast channel itself.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "update", rename_all = "camelCase")]
    Update { offices: Vec<Office> },
    #[serde(rename = "availabilityUpdated", rename_all = "camelCase")]
    AvailabilityUpdated {
        office_id: Uuid,
        available_slots: BTreeSet<SlotTime>,
    },
    #[serde(rename = "appointmentBooked", rename_all = "camelCase")]
    AppointmentBooked {
        office_id: Uuid,
        slot: SlotTime,
        patient_name: String,
    },
    /// One aggregate event per reset sweep, not one per office.
    #[serde(rename = "availabilityReset")]
    AvailabilityReset,
}

/// Per-process publish/subscribe fan-out.
///
/// No persistence, no replay: a subscriber that connects late gets a snapshot
/// at connect time and live events from then on. Each replica broadcasts only
/// to its own connected clients.
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Event>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Best-effort: an error just means nobody is listening right now.
    pub fn publish(&self, event: Event) {
        if let Err(e) = self.sender.send(event) {
            tracing::debug!("No subscribers for event: {e}");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
