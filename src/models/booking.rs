use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::SlotTime;

/// A committed reservation of one slot by one patient.
///
/// Bookings live in their own collection, never embedded in the office record,
/// and are immutable once created. The ledger is append-only; the daily
/// availability reset does not touch it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub office_id: Uuid,
    pub slot: SlotTime,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated booking request, ready for the reconciler.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub office_id: Uuid,
    pub slot: SlotTime,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub reason: Option<String>,
}

impl Booking {
    pub fn from_request(request: BookingRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            office_id: request.office_id,
            slot: request.slot,
            patient_name: request.patient_name,
            patient_email: request.patient_email,
            patient_phone: request.patient_phone,
            reason: request.reason,
            created_at: Utc::now(),
        }
    }
}
