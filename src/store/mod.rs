use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Booking, Office, OfficeProfile, SlotTime};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backing store timed out")]
    Timeout(#[source] anyhow::Error),
    #[error("backing store failed")]
    Backend(#[source] anyhow::Error),
}

/// Result of an atomic booking commit.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Slot removed from the office's open set and booking appended, as one
    /// unit. Carries the office's remaining open slots for fan-out.
    Committed { remaining_slots: BTreeSet<SlotTime> },
    OfficeMissing,
    /// The slot was not open at commit time: never offered, or already taken.
    SlotUnavailable,
}

/// Durable office + booking storage.
///
/// The invariant-critical mutations (`replace_slots`, `commit_booking`) must
/// each execute as a single atomic operation of the backend, since the service
/// may run as multiple replicas with no shared in-process lock.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_office(&self, office: &Office) -> Result<(), StoreError>;

    async fn get_office(&self, office_id: Uuid) -> Result<Option<Office>, StoreError>;

    async fn list_offices(&self) -> Result<Vec<Office>, StoreError>;

    /// Overwrites profile fields, leaving the slot set untouched. Returns the
    /// updated office, or `None` if the id is unknown.
    async fn update_profile(
        &self,
        office_id: Uuid,
        profile: OfficeProfile,
    ) -> Result<Option<Office>, StoreError>;

    /// Atomically replaces the office's open set with `requested` minus every
    /// slot that holds a live booking. The subtraction happens inside the same
    /// atomic operation as the replace, so a booking committed concurrently can
    /// never be reintroduced as open. Returns the effective new set, or `None`
    /// if the office does not exist.
    async fn replace_slots(
        &self,
        office_id: Uuid,
        requested: &BTreeSet<SlotTime>,
    ) -> Result<Option<BTreeSet<SlotTime>>, StoreError>;

    /// Slots of the office's live bookings.
    async fn booked_slots(&self, office_id: Uuid) -> Result<BTreeSet<SlotTime>, StoreError>;

    /// Removes `booking.slot` from the office's open set *only if present* and
    /// appends the booking to the ledger, as one atomic unit. Concurrent
    /// commits for the same (office, slot) must yield exactly one
    /// `Committed`.
    async fn commit_booking(&self, booking: &Booking) -> Result<CommitOutcome, StoreError>;

    async fn bookings_for_office(&self, office_id: Uuid) -> Result<Vec<Booking>, StoreError>;
}
