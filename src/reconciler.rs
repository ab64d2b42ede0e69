use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Booking, BookingRequest, Office, SlotTime};
use crate::notifier::{Event, Notifier};
use crate::store::{CommitOutcome, Store, StoreError};
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum ReconcileError {
    #[error("office not found")]
    NotFound,
    #[error("slot is not available")]
    SlotUnavailable,
    #[error("slot has a live booking")]
    Conflict,
    #[error("{0}")]
    Validation(String),
    #[error("backing store unavailable")]
    StoreUnavailable(#[from] StoreError),
}

impl std::fmt::Debug for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Outcome of a best-effort reset sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub cleared: usize,
    pub failed: usize,
}

/// The sole authority for slot state transitions.
///
/// Every mutation goes through here: operator slot edits, patient bookings and
/// the daily reset. Correctness under concurrent requests comes from the
/// store's atomic operations, not from any lock held in this process — the
/// service may run as multiple replicas.
pub struct Reconciler {
    store: Arc<dyn Store>,
    notifier: Notifier,
}

impl Reconciler {
    pub fn new(store: Arc<dyn Store>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Bulk-replaces an office's open slots. Slots holding a live booking are
    /// subtracted from the requested set rather than reopened.
    #[tracing::instrument(name = "Setting office availability", skip(self, requested))]
    pub async fn set_availability(
        &self,
        office_id: Uuid,
        requested: BTreeSet<SlotTime>,
    ) -> Result<Office, ReconcileError> {
        let effective = self
            .store
            .replace_slots(office_id, &requested)
            .await?
            .ok_or(ReconcileError::NotFound)?;
        self.notifier.publish(Event::AvailabilityUpdated {
            office_id,
            available_slots: effective.clone(),
        });
        let mut office = self
            .store
            .get_office(office_id)
            .await?
            .ok_or(ReconcileError::NotFound)?;
        office.available_slots = effective;
        Ok(office)
    }

    /// Flips one slot's membership in the open set. Toggling on a slot with a
    /// live booking fails with `Conflict` instead of silently succeeding.
    #[tracing::instrument(name = "Toggling slot", skip(self), fields(slot = %slot))]
    pub async fn toggle_slot(
        &self,
        office_id: Uuid,
        slot: SlotTime,
    ) -> Result<Office, ReconcileError> {
        let office = self
            .store
            .get_office(office_id)
            .await?
            .ok_or(ReconcileError::NotFound)?;

        let mut target = office.available_slots.clone();
        if !target.remove(&slot) {
            if self.store.booked_slots(office_id).await?.contains(&slot) {
                return Err(ReconcileError::Conflict);
            }
            target.insert(slot);
        }
        self.set_availability(office_id, target).await
    }

    /// The critical path. Availability check, slot removal and ledger append
    /// execute as one atomic store operation: of N concurrent requests for the
    /// same (office, slot), exactly one succeeds.
    #[tracing::instrument(
        name = "Booking slot",
        skip(self, request),
        fields(office_id = %request.office_id, slot = %request.slot)
    )]
    pub async fn book_slot(&self, request: BookingRequest) -> Result<Booking, ReconcileError> {
        let booking = Booking::from_request(request);
        match self.store.commit_booking(&booking).await? {
            CommitOutcome::Committed { remaining_slots } => {
                self.notifier.publish(Event::AvailabilityUpdated {
                    office_id: booking.office_id,
                    available_slots: remaining_slots,
                });
                self.notifier.publish(Event::AppointmentBooked {
                    office_id: booking.office_id,
                    slot: booking.slot,
                    patient_name: booking.patient_name.clone(),
                });
                Ok(booking)
            }
            CommitOutcome::OfficeMissing => Err(ReconcileError::NotFound),
            CommitOutcome::SlotUnavailable => Err(ReconcileError::SlotUnavailable),
        }
    }

    /// Clears every office's open set so operators re-declare the next day's
    /// hours. Bookings are left alone. Best-effort sweep: a failing office is
    /// logged and skipped, the rest proceed. Idempotent.
    #[tracing::instrument(name = "Resetting all availability", skip(self))]
    pub async fn reset_all_availability(&self) -> Result<ResetReport, ReconcileError> {
        let offices = self.store.list_offices().await?;
        let mut report = ResetReport::default();
        for office in offices {
            match self.store.replace_slots(office.id, &BTreeSet::new()).await {
                Ok(Some(_)) => report.cleared += 1,
                // Office vanished mid-sweep; nothing left to clear.
                Ok(None) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Failed to clear slots for office {}: {e:?}", office.id);
                }
            }
        }
        self.notifier.publish(Event::AvailabilityReset);
        tracing::info!(
            "Availability reset complete: {} cleared, {} failed",
            report.cleared,
            report.failed
        );
        Ok(report)
    }
}
