use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Booking, Office, OfficeProfile, SlotTime};

use super::{CommitOutcome, Store, StoreError};

#[derive(Default)]
struct Inner {
    offices: HashMap<Uuid, Office>,
    bookings: Vec<Booking>,
}

/// In-memory backend for the integration suite and local hacking.
///
/// A single mutex guards all state, so every `Store` operation is atomic with
/// respect to every other. Not durable; canonical deployments use `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn booked_slots(&self, office_id: Uuid) -> BTreeSet<SlotTime> {
        self.bookings
            .iter()
            .filter(|b| b.office_id == office_id)
            .map(|b| b.slot)
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_office(&self, office: &Office) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.offices.insert(office.id, office.clone());
        Ok(())
    }

    async fn get_office(&self, office_id: Uuid) -> Result<Option<Office>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.offices.get(&office_id).cloned())
    }

    async fn list_offices(&self) -> Result<Vec<Office>, StoreError> {
        let inner = self.inner.lock().await;
        let mut offices: Vec<Office> = inner.offices.values().cloned().collect();
        offices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(offices)
    }

    async fn update_profile(
        &self,
        office_id: Uuid,
        profile: OfficeProfile,
    ) -> Result<Option<Office>, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.offices.get_mut(&office_id).map(|office| {
            office.apply_profile(profile);
            office.clone()
        }))
    }

    async fn replace_slots(
        &self,
        office_id: Uuid,
        requested: &BTreeSet<SlotTime>,
    ) -> Result<Option<BTreeSet<SlotTime>>, StoreError> {
        let mut inner = self.inner.lock().await;
        let booked = inner.booked_slots(office_id);
        Ok(match inner.offices.get_mut(&office_id) {
            Some(office) => {
                office.available_slots = requested.difference(&booked).copied().collect();
                Some(office.available_slots.clone())
            }
            None => None,
        })
    }

    async fn booked_slots(&self, office_id: Uuid) -> Result<BTreeSet<SlotTime>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.booked_slots(office_id))
    }

    async fn commit_booking(&self, booking: &Booking) -> Result<CommitOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        let occupied = inner
            .bookings
            .iter()
            .any(|b| b.office_id == booking.office_id && b.slot == booking.slot);
        let Some(office) = inner.offices.get_mut(&booking.office_id) else {
            return Ok(CommitOutcome::OfficeMissing);
        };
        if occupied || !office.available_slots.remove(&booking.slot) {
            return Ok(CommitOutcome::SlotUnavailable);
        }
        let remaining_slots = office.available_slots.clone();
        inner.bookings.push(booking.clone());
        Ok(CommitOutcome::Committed { remaining_slots })
    }

    async fn bookings_for_office(&self, office_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.office_id == office_id)
            .cloned()
            .collect())
    }
}
